// ==========================================
// 农作物种植规划系统 - 文件解析器实现
// ==========================================
// 支持: CSV (.csv)，UTF-8，可带 BOM
// ==========================================

use crate::importer::dataset_importer_trait::FileParser;
use crate::importer::error::{DataError, DataResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始数据行
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// 源文件行号（表头为第 1 行）
    pub row_number: usize,
    pub cells: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(|s| s.as_str())
    }
}

/// 原始数据表
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_table(&self, table: &str, file_path: &Path) -> DataResult<RawTable> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(DataError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头（去除 BOM 与首尾空白）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(row_idx + 2);

            let mut cells = HashMap::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if !header.is_empty() {
                        cells.insert(header.clone(), value.trim().to_string());
                    }
                }
            }

            // 跳过完全空白的行
            if cells.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawRow { row_number, cells });
        }

        tracing::debug!(table, rows = rows.len(), path = %path.display(), "表格解析完成");

        Ok(RawTable {
            name: table.to_string(),
            headers,
            rows,
        })
    }
}
