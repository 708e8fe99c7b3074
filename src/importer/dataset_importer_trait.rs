// ==========================================
// 农作物种植规划系统 - 数据集导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::Dataset;
use crate::importer::error::DataResult;
use crate::importer::file_parser::RawTable;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 单个表格文件 → 原始行（表头已 TRIM）
// 实现者: CsvParser
pub trait FileParser {
    /// 解析单个表格文件
    ///
    /// # 参数
    /// - table: 逻辑表名（用于错误定位）
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(RawTable): 表头 + 非空白行（带源文件行号）
    /// - Err: 文件不存在、格式不支持、CSV 解析失败
    fn parse_table(&self, table: &str, file_path: &Path) -> DataResult<RawTable>;
}

// ==========================================
// DatasetImporter Trait
// ==========================================
// 用途: 数据目录 → 规范化数据集
// 实现者: CsvDatasetImporter
pub trait DatasetImporter {
    /// 从数据目录加载五张表并构建数据集
    ///
    /// # 导入流程
    /// 1. 文件读取与解析
    /// 2. 字段映射与类型转换（含作物分类派生）
    /// 3. 智慧大棚第一季数据补齐
    /// 4. 预期销售量（缺表时由上一年种植派生）
    /// 5. 数据质量校验
    fn load(&self, data_dir: &Path) -> DataResult<Dataset>;
}
