// ==========================================
// 农作物种植规划系统 - 导入层
// ==========================================
// 职责: 数据目录（五张 CSV 表）→ 规范化只读 Dataset
// 红线: 导入阶段的任何错误都在建模前终止运行
// ==========================================

pub mod data_cleaner;
pub mod dataset_importer;
pub mod dataset_importer_trait;
pub mod derivation;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use dataset_importer::CsvDatasetImporter;
pub use derivation::DerivationService;
pub use dq_validator::{DatasetValidator, DqSummary};
pub use error::{DataError, DataResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, RawRow, RawTable};

// 重导出 Trait 接口
pub use dataset_importer_trait::{DatasetImporter, FileParser};
