// ==========================================
// 农作物种植规划系统 - 作物实体
// ==========================================
// 红线: category 由 EligibilityCore::classify_crop 在导入时派生一次
// ==========================================

use crate::domain::types::CropCategory;
use serde::{Deserialize, Serialize};

/// 作物编号
pub type CropId = u32;

/// 作物
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub id: CropId,
    pub name: String,
    /// 原始作物类型标签（如 "粮食（豆类）"），仅用于追溯
    pub type_label: String,
    pub category: CropCategory,
    pub is_legume: bool,
}

impl Crop {
    pub fn new(
        id: CropId,
        name: impl Into<String>,
        type_label: impl Into<String>,
        category: CropCategory,
        is_legume: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            type_label: type_label.into(),
            category,
            is_legume,
        }
    }
}
