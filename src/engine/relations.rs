// ==========================================
// 农作物种植规划系统 - 作物相关性与市场系数
// ==========================================
// 职责: 替代性/互补性矩阵（仅用于事后报告）
//       需求弹性 / 规模经济 / 风险系数（按市场大类）
// ==========================================

use crate::domain::crop::{Crop, CropId};
use crate::domain::dataset::Dataset;
use crate::domain::types::{CropCategory, MarketGroup};
use std::collections::BTreeMap;

// ==========================================
// 市场大类系数表
// ==========================================
pub struct MarketCoefficients;

impl MarketCoefficients {
    /// 需求价格弹性
    pub fn elasticity(category: CropCategory) -> f64 {
        match category.market_group() {
            MarketGroup::Grain => -0.3,
            MarketGroup::Vegetable => -0.8,
            MarketGroup::Mushroom => -1.2,
            MarketGroup::Other => -0.5,
        }
    }

    /// 规模经济系数
    pub fn scale_economy(category: CropCategory) -> f64 {
        match category.market_group() {
            MarketGroup::Grain => 0.15,
            MarketGroup::Vegetable => 0.10,
            MarketGroup::Mushroom => 0.20,
            MarketGroup::Other => 0.05,
        }
    }

    /// 风险系数
    pub fn risk_factor(category: CropCategory) -> f64 {
        match category.market_group() {
            MarketGroup::Grain => 0.10,
            MarketGroup::Vegetable => 0.20,
            MarketGroup::Mushroom => 0.30,
            MarketGroup::Other => 0.15,
        }
    }

    /// 弹性调整后的需求倍数 = 1 + e × (价格倍数 − 1)，不低于 0
    pub fn elastic_demand_factor(category: CropCategory, price_multiplier: f64) -> f64 {
        (1.0 + Self::elasticity(category) * (price_multiplier - 1.0)).max(0.0)
    }
}

// ==========================================
// 作物两两关系
// ==========================================

/// 替代系数
///
/// # 规则
/// - 同一作物 1.0
/// - 同类：粮食/蔬菜 0.8，食用菌 0.6，其他 0.4
/// - 粮食与豆类 0.3
/// - 其余 0.1
pub fn substitution(a: &Crop, b: &Crop) -> f64 {
    if a.id == b.id {
        return 1.0;
    }
    if a.category == b.category {
        return match a.category {
            CropCategory::Grain | CropCategory::Vegetable => 0.8,
            CropCategory::Mushroom => 0.6,
            _ => 0.4,
        };
    }
    let grain_legume = (a.category == CropCategory::Grain && b.is_legume)
        || (b.category == CropCategory::Grain && a.is_legume);
    if grain_legume {
        0.3
    } else {
        0.1
    }
}

/// 互补系数
///
/// # 规则
/// - 同一作物 0
/// - 豆类与非豆类 0.6（固氮互补）
/// - 不同类 0.2
/// - 同类 −0.1（竞争）
pub fn complementarity(a: &Crop, b: &Crop) -> f64 {
    if a.id == b.id {
        0.0
    } else if a.is_legume != b.is_legume {
        0.6
    } else if a.category != b.category {
        0.2
    } else {
        -0.1
    }
}

/// 替代/互补矩阵（按作物编号索引）
#[derive(Debug, Clone)]
pub struct CropRelations {
    substitution: BTreeMap<(CropId, CropId), f64>,
    complementarity: BTreeMap<(CropId, CropId), f64>,
}

impl CropRelations {
    pub fn build(dataset: &Dataset) -> Self {
        let mut sub = BTreeMap::new();
        let mut comp = BTreeMap::new();
        for a in dataset.crops() {
            for b in dataset.crops() {
                sub.insert((a.id, b.id), substitution(a, b));
                comp.insert((a.id, b.id), complementarity(a, b));
            }
        }
        Self {
            substitution: sub,
            complementarity: comp,
        }
    }

    pub fn substitution(&self, a: CropId, b: CropId) -> f64 {
        self.substitution.get(&(a, b)).copied().unwrap_or(0.0)
    }

    pub fn complementarity(&self, a: CropId, b: CropId) -> f64 {
        self.complementarity.get(&(a, b)).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop(id: CropId, category: CropCategory, legume: bool) -> Crop {
        Crop::new(id, format!("c{}", id), "", category, legume)
    }

    #[test]
    fn test_substitution_rules() {
        let wheat = crop(6, CropCategory::Grain, false);
        let corn = crop(7, CropCategory::Grain, false);
        let soybean = crop(1, CropCategory::Grain, true);
        let bean = crop(17, CropCategory::Vegetable, true);
        let shiitake = crop(38, CropCategory::Mushroom, false);
        let morel = crop(39, CropCategory::Mushroom, false);

        assert_eq!(substitution(&wheat, &wheat), 1.0);
        assert_eq!(substitution(&wheat, &corn), 0.8);
        assert_eq!(substitution(&shiitake, &morel), 0.6);
        assert_eq!(substitution(&wheat, &bean), 0.3);
        assert_eq!(substitution(&bean, &wheat), 0.3);
        assert_eq!(substitution(&wheat, &shiitake), 0.1);
        // 同类优先于粮豆规则
        assert_eq!(substitution(&wheat, &soybean), 0.8);
    }

    #[test]
    fn test_complementarity_rules() {
        let wheat = crop(6, CropCategory::Grain, false);
        let corn = crop(7, CropCategory::Grain, false);
        let bean = crop(17, CropCategory::Vegetable, true);
        let pepper = crop(21, CropCategory::Vegetable, false);
        let cabbage = crop(35, CropCategory::WinterVegetable, false);

        assert_eq!(complementarity(&wheat, &wheat), 0.0);
        assert_eq!(complementarity(&wheat, &bean), 0.6);
        assert_eq!(complementarity(&pepper, &cabbage), 0.2);
        assert_eq!(complementarity(&wheat, &corn), -0.1);
    }

    #[test]
    fn test_elastic_demand_factor() {
        // 蔬菜价格上涨 10% → 需求下降 8%
        let f = MarketCoefficients::elastic_demand_factor(CropCategory::Vegetable, 1.1);
        assert!((f - 0.92).abs() < 1e-9);
        // 不会为负
        let f = MarketCoefficients::elastic_demand_factor(CropCategory::Mushroom, 2.0);
        assert_eq!(f, 0.0);
        assert_eq!(MarketCoefficients::risk_factor(CropCategory::Rice), 0.10);
        assert_eq!(MarketCoefficients::scale_economy(CropCategory::WinterVegetable), 0.10);
    }
}
