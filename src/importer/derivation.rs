// ==========================================
// 农作物种植规划系统 - 派生数据服务
// ==========================================
// 职责: 智慧大棚第一季数据补齐 / 预期销售量派生
// ==========================================

use crate::domain::crop::{Crop, CropId};
use crate::domain::land::Parcel;
use crate::domain::statistics::{PlantingStatistic, PriorPlanting};
use crate::domain::types::{LandType, Season};
use std::collections::{BTreeMap, HashMap};

/// 名称含以下字样的作物视为食用菌，不补入智慧大棚
const FUNGUS_MARKERS: &[char] = &['菇', '菌'];

pub struct DerivationService;

impl DerivationService {
    /// 补齐智慧大棚第一季统计
    ///
    /// # 规则
    /// - 已存在智慧大棚第一季统计 → 不补
    /// - 否则复制普通大棚第一季的统计行（排除名称含 菇/菌 的作物），
    ///   地块类型改为智慧大棚，标记 synthetic
    ///
    /// # 返回
    /// 补齐的行数
    pub fn supplement_smart_greenhouse(
        &self,
        statistics: &mut Vec<PlantingStatistic>,
        crops: &[Crop],
    ) -> usize {
        let already_present = statistics
            .iter()
            .any(|s| s.land_type == LandType::SmartGreenhouse && s.season == Season::First);
        if already_present {
            return 0;
        }

        let names: HashMap<CropId, &str> = crops.iter().map(|c| (c.id, c.name.as_str())).collect();

        let supplemented: Vec<PlantingStatistic> = statistics
            .iter()
            .filter(|s| s.land_type == LandType::OrdinaryGreenhouse && s.season == Season::First)
            .filter(|s| {
                names
                    .get(&s.crop_id)
                    .map(|name| !name.contains(FUNGUS_MARKERS))
                    .unwrap_or(false)
            })
            .map(|s| PlantingStatistic {
                land_type: LandType::SmartGreenhouse,
                synthetic: true,
                ..s.clone()
            })
            .collect();

        let count = supplemented.len();
        statistics.extend(supplemented);
        count
    }

    /// 由上一年种植派生预期销售量
    ///
    /// # 规则
    /// - 逐行: 面积 × 亩产量（按 作物/地块类型/季次 查统计）
    /// - 找不到地块或统计的行不计入
    pub fn derive_expected_demand(
        &self,
        prior: &[PriorPlanting],
        parcels: &[Parcel],
        statistics: &[PlantingStatistic],
    ) -> BTreeMap<CropId, f64> {
        let land_types: HashMap<&str, LandType> = parcels
            .iter()
            .map(|p| (p.name.as_str(), p.land_type))
            .collect();
        let yields: HashMap<(CropId, LandType, Season), f64> = statistics
            .iter()
            .map(|s| ((s.crop_id, s.land_type, s.season), s.yield_per_mu))
            .collect();

        let mut demand: BTreeMap<CropId, f64> = BTreeMap::new();
        for planting in prior {
            let Some(land_type) = land_types.get(planting.parcel.as_str()) else {
                tracing::debug!(parcel = %planting.parcel, "上一年种植地块不存在，跳过销量派生");
                continue;
            };
            if let Some(yield_per_mu) = yields.get(&(planting.crop_id, *land_type, planting.season)) {
                *demand.entry(planting.crop_id).or_insert(0.0) += planting.area * yield_per_mu;
            }
        }
        demand
    }
}
