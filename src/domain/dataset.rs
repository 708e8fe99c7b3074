// ==========================================
// 农作物种植规划系统 - 规范化数据集
// ==========================================
// 职责: 地块 / 作物 / 种植统计 / 预期销量 / 上一年种植 五张逻辑表
// 红线: 构建后只读，所有方案共享
// ==========================================

use crate::domain::crop::{Crop, CropId};
use crate::domain::horizon::PlanningHorizon;
use crate::domain::land::Parcel;
use crate::domain::statistics::{PlantingStatistic, PriorPlanting};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// 规范化数据集
#[derive(Debug, Clone)]
pub struct Dataset {
    parcels: Vec<Parcel>,
    parcel_lookup: HashMap<String, usize>,
    crops: BTreeMap<CropId, Crop>,
    statistics: Vec<PlantingStatistic>,
    expected_demand: BTreeMap<CropId, f64>,
    prior_planting: Vec<PriorPlanting>,
    legume_history: BTreeSet<String>,
    horizon: PlanningHorizon,
}

impl Dataset {
    /// 由五张表构建数据集
    ///
    /// 豆类历史由上一年种植记录派生：上一年任一季种过豆类作物的地块
    pub fn new(
        parcels: Vec<Parcel>,
        crops: Vec<Crop>,
        statistics: Vec<PlantingStatistic>,
        expected_demand: BTreeMap<CropId, f64>,
        prior_planting: Vec<PriorPlanting>,
    ) -> Self {
        let crops: BTreeMap<CropId, Crop> = crops.into_iter().map(|c| (c.id, c)).collect();
        let parcel_lookup = parcels
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.name.clone(), idx))
            .collect();
        let legume_history = prior_planting
            .iter()
            .filter(|p| p.area > 0.0)
            .filter(|p| crops.get(&p.crop_id).map(|c| c.is_legume).unwrap_or(false))
            .map(|p| p.parcel.clone())
            .collect();

        Self {
            parcels,
            parcel_lookup,
            crops,
            statistics,
            expected_demand,
            prior_planting,
            legume_history,
            horizon: PlanningHorizon::default(),
        }
    }

    pub fn with_horizon(mut self, horizon: PlanningHorizon) -> Self {
        self.horizon = horizon;
        self
    }

    // ===== 地块 =====

    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    pub fn parcel(&self, idx: usize) -> Option<&Parcel> {
        self.parcels.get(idx)
    }

    pub fn parcel_index(&self, name: &str) -> Option<usize> {
        self.parcel_lookup.get(name).copied()
    }

    /// 全部耕地面积（亩）
    pub fn total_area(&self) -> f64 {
        self.parcels.iter().map(|p| p.area).sum()
    }

    // ===== 作物 =====

    pub fn crops(&self) -> impl Iterator<Item = &Crop> {
        self.crops.values()
    }

    pub fn crop(&self, id: CropId) -> Option<&Crop> {
        self.crops.get(&id)
    }

    pub fn crop_count(&self) -> usize {
        self.crops.len()
    }

    // ===== 统计与需求 =====

    pub fn statistics(&self) -> &[PlantingStatistic] {
        &self.statistics
    }

    /// 基准年预期销售量；缺失视为 0
    pub fn demand(&self, crop_id: CropId) -> f64 {
        self.expected_demand.get(&crop_id).copied().unwrap_or(0.0)
    }

    pub fn expected_demand(&self) -> &BTreeMap<CropId, f64> {
        &self.expected_demand
    }

    pub fn prior_planting(&self) -> &[PriorPlanting] {
        &self.prior_planting
    }

    pub fn has_legume_history(&self, parcel_name: &str) -> bool {
        self.legume_history.contains(parcel_name)
    }

    pub fn legume_history(&self) -> &BTreeSet<String> {
        &self.legume_history
    }

    pub fn horizon(&self) -> &PlanningHorizon {
        &self.horizon
    }
}
