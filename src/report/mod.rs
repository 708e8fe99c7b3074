// ==========================================
// 农作物种植规划系统 - 输出层
// ==========================================

pub mod writer;

pub use writer::{BatchReport, ReportWriter};
