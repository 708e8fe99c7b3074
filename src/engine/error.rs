// ==========================================
// 农作物种植规划系统 - 规划引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 单次运行内的错误；一个方案失败不影响其他方案
// ==========================================

use crate::engine::solver::SolverError;
use crate::importer::error::DataError;
use thiserror::Error;

/// 规划引擎错误类型
#[derive(Error, Debug)]
pub enum PlanningError {
    // ===== 输入数据 =====
    #[error("数据错误: {0}")]
    Data(#[from] DataError),

    // ===== 建模 =====
    #[error("模型构建失败: {0}")]
    ModelBuild(String),

    // ===== 求解 =====
    #[error("模型不可行: 主模型 {primary}; 放松模型 {relaxed}")]
    Infeasible { primary: String, relaxed: String },

    #[error("求解器错误: {0}")]
    Solver(#[from] SolverError),

    // ===== 配置 / 输出 =====
    #[error("配置错误: {0}")]
    Config(String),

    #[error("报表输出失败: {0}")]
    Report(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<csv::Error> for PlanningError {
    fn from(err: csv::Error) -> Self {
        PlanningError::Report(err.to_string())
    }
}

impl From<serde_json::Error> for PlanningError {
    fn from(err: serde_json::Error) -> Self {
        PlanningError::Report(err.to_string())
    }
}

/// Result 类型别名
pub type PlanningResult<T> = Result<T, PlanningError>;
