// ==========================================
// 农作物种植规划系统 - 地块实体
// ==========================================
// 红线: 加载后不可变；name 为唯一键
// ==========================================

use crate::domain::types::LandType;
use serde::{Deserialize, Serialize};

/// 地块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub name: String,       // 地块名称（唯一键，如 A1 / E3）
    pub land_type: LandType,
    pub area: f64,          // 面积（亩）
}

impl Parcel {
    pub fn new(name: impl Into<String>, land_type: LandType, area: f64) -> Self {
        Self {
            name: name.into(),
            land_type,
            area,
        }
    }
}
