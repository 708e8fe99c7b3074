// ==========================================
// 农作物种植规划系统 - 规划引擎层
// ==========================================
// 职责: 可种判定 → 可行方案目录 → 经济系数 → 建模 → 求解 → 提取 → 自检 → 汇总
// 红线: 可种判定与作物分类只在 eligibility_core 实现一次，全部方案共用
// ==========================================

pub mod analysis;
pub mod catalog;
pub mod economics;
pub mod eligibility_core;
pub mod error;
pub mod extractor;
pub mod model;
pub mod orchestrator;
pub mod relations;
pub mod solver;
pub mod summary;
pub mod validator;

// 重导出核心类型
pub use catalog::{CatalogSummary, OptionCatalog, ViableOption};
pub use economics::{CoefficientTable, UnitEconomics, YearMultipliers};
pub use eligibility_core::EligibilityCore;
pub use error::{PlanningError, PlanningResult};
pub use extractor::{Extraction, ResultExtractor, AREA_EPSILON};
pub use model::{BuildMode, BuiltModel, ModelBuilder};
pub use orchestrator::{
    PlanningOrchestrator, PlanningRun, RunFailure, RunMetadata, RunOutcome, RunStatus, SeedSource,
};
pub use relations::{CropRelations, MarketCoefficients};
pub use solver::{MicroLpSolver, MipSolver, SolveOutcome, SolverError};
pub use summary::PlanSummary;
pub use validator::{AuditFinding, SolutionValidator, ValidationReport};
