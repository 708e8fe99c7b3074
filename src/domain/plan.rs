// ==========================================
// 农作物种植规划系统 - 求解输出实体
// ==========================================
// PlantingDecision: 原始面积（用于校验）
// PlanRow: 面向报表的扁平结果行（已四舍五入）
// ==========================================

use crate::domain::crop::CropId;
use crate::domain::types::{CropCategory, LandType, Season};
use serde::{Deserialize, Serialize};

/// 种植决策（求解变量取值 > 阈值的部分）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantingDecision {
    pub parcel: String,
    pub land_type: LandType,
    pub year: i32,
    pub season: Season,
    pub crop_id: CropId,
    pub area: f64,
}

/// 结果行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    pub year: i32,
    pub parcel: String,
    pub land_type: LandType,
    pub season: Season,
    pub crop_id: CropId,
    pub crop_name: String,
    pub category: CropCategory,
    pub is_legume: bool,
    pub area: f64,       // 亩，保留 2 位
    pub production: f64, // 斤，保留 1 位
    pub cost: f64,       // 元
    pub revenue: f64,    // 元
    pub profit: f64,     // 元
    /// 规模经济对成本的影响（%），仅高级方案
    pub scale_effect_pct: Option<f64>,
    /// 需求弹性对价格的影响（%），仅高级方案
    pub elasticity_effect_pct: Option<f64>,
    /// 风险调整扣减（元），仅高级方案
    pub risk_adjustment: Option<f64>,
}
