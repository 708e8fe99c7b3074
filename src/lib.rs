// ==========================================
// 农作物种植规划系统 - 核心库
// ==========================================
// 技术栈: Rust + good_lp (microlp 后端)
// 系统定位: 七年种植规划批量求解（2024-2030）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 可种判定 / 建模 / 求解 / 提取 / 自检
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 方案配置与运行配置
pub mod config;

// 输出层 - 结果文件
pub mod report;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CropCategory, LandType, MarketGroup, PlanningVariant, Season};

// 领域实体
pub use domain::{Crop, CropId, Dataset, Parcel, PlanRow, PlanningHorizon, PlantingDecision};

// 配置
pub use config::{RunConfig, ScenarioProfile};

// 引擎
pub use engine::{
    EligibilityCore, MicroLpSolver, MipSolver, OptionCatalog, PlanningError, PlanningOrchestrator,
    PlanningResult, PlanningRun, RunOutcome,
};

// 导入 / 输出
pub use importer::{CsvDatasetImporter, DataError, DatasetImporter};
pub use report::ReportWriter;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "农作物种植规划系统";
