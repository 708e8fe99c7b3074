// ==========================================
// 农作物种植规划系统 - 种植统计与历史种植
// ==========================================
// 职责: 基准年（2023）单位面积产量/成本/价格，以及上一年种植记录
// ==========================================

use crate::domain::crop::CropId;
use crate::domain::types::{LandType, Season};
use serde::{Deserialize, Serialize};

/// 种植统计（按 (land_type, season, crop_id) 唯一）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantingStatistic {
    pub land_type: LandType,
    pub season: Season,
    pub crop_id: CropId,
    pub yield_per_mu: f64, // 亩产量（斤/亩）
    pub cost_per_mu: f64,  // 种植成本（元/亩）
    pub price_avg: f64,    // 平均销售单价（元/斤）
    /// 是否为导入阶段合成的行（智慧大棚第一季沿用普通大棚数据）
    #[serde(default)]
    pub synthetic: bool,
}

impl PlantingStatistic {
    pub fn new(
        land_type: LandType,
        season: Season,
        crop_id: CropId,
        yield_per_mu: f64,
        cost_per_mu: f64,
        price_avg: f64,
    ) -> Self {
        Self {
            land_type,
            season,
            crop_id,
            yield_per_mu,
            cost_per_mu,
            price_avg,
            synthetic: false,
        }
    }

    /// 基准亩利润 = 亩产量 × 单价 − 亩成本
    pub fn unit_profit(&self) -> f64 {
        self.yield_per_mu * self.price_avg - self.cost_per_mu
    }
}

/// 上一年（基准年）种植记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorPlanting {
    pub parcel: String,
    pub crop_id: CropId,
    pub season: Season,
    pub area: f64,
}
