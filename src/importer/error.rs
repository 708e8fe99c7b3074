// ==========================================
// 农作物种植规划系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 任一 DataError 均在建模前终止运行
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum DataError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileRead(String),

    #[error("CSV 解析失败: {0}")]
    CsvParse(String),

    // ===== 表结构错误 =====
    #[error("缺少数据表: {0}")]
    MissingTable(String),

    #[error("数据表 {table} 缺少列: {column}")]
    MissingColumn { table: String, column: String },

    // ===== 字段错误 =====
    #[error("类型转换失败 ({table} 行 {row}, 字段 {field}): {message}")]
    TypeConversion {
        table: String,
        row: usize,
        field: String,
        message: String,
    },

    #[error("未知取值 ({table} 行 {row}): {message}")]
    UnknownValue {
        table: String,
        row: usize,
        message: String,
    },

    // ===== 数据质量错误 =====
    #[error("主键重复 ({table}): {key}")]
    DuplicateKey { table: String, key: String },

    #[error("引用不存在 ({table} 行 {row}): {message}")]
    DanglingReference {
        table: String,
        row: usize,
        message: String,
    },

    #[error("数值范围错误 ({table} 行 {row}, 字段 {field}): 值 {value}")]
    ValueOutOfRange {
        table: String,
        row: usize,
        field: String,
        value: f64,
    },

    #[error("数据集为空: {0}")]
    EmptyDataset(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::FileRead(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::CsvParse(err.to_string())
    }
}

/// Result 类型别名
pub type DataResult<T> = Result<T, DataError>;
