// ==========================================
// 农作物种植规划系统 - 配置层
// ==========================================
// 职责: 方案配置记录（驱动建模/经济系数/结果提取）+ 运行配置
// ==========================================

pub mod config_manager;
pub mod scenario_profile;

pub use config_manager::{config_keys, ConfigSource, RunConfig};
pub use scenario_profile::{
    ConcentrationCap, DemandRule, DiversityRule, DriftModel, FallbackPolicy, LegumeRotationRule,
    LegumeScope, LegumeShareBand, MarketAdjustment, MarketTrend, MonocultureRule, RevenueModel,
    ScenarioProfile,
};
