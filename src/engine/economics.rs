// ==========================================
// 农作物种植规划系统 - 逐年经济系数
// ==========================================
// 职责: 按漂移模型生成 (作物, 年份) → {销量, 亩产, 成本, 价格} 倍数
// 红线: 随机漂移只在此处抽样一次；抽样顺序固定（年份升序 × 作物编号升序）
// ==========================================

use crate::config::scenario_profile::{DriftModel, MarketTrend};
use crate::domain::crop::{Crop, CropId};
use crate::domain::dataset::Dataset;
use crate::domain::types::{CropCategory, MarketGroup};
use crate::engine::catalog::ViableOption;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// YearMultipliers - 相对基准年的倍数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearMultipliers {
    pub sales: f64,
    pub yield_factor: f64,
    pub cost: f64,
    pub price: f64,
}

impl YearMultipliers {
    pub const IDENTITY: YearMultipliers = YearMultipliers {
        sales: 1.0,
        yield_factor: 1.0,
        cost: 1.0,
        price: 1.0,
    };
}

impl Default for YearMultipliers {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 某方案某年份下的单位经济参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitEconomics {
    pub yield_per_mu: f64,
    pub cost_per_mu: f64,
    pub price: f64,
    pub multipliers: YearMultipliers,
}

impl UnitEconomics {
    pub fn from_option(option: &ViableOption, multipliers: YearMultipliers) -> Self {
        Self {
            yield_per_mu: option.yield_per_mu * multipliers.yield_factor,
            cost_per_mu: option.cost_per_mu * multipliers.cost,
            price: option.price_avg * multipliers.price,
            multipliers,
        }
    }

    /// 亩利润 = 亩产 × 单价 − 亩成本
    pub fn unit_profit(&self) -> f64 {
        self.yield_per_mu * self.price - self.cost_per_mu
    }
}

// ==========================================
// 随机漂移的抽样区间
// ==========================================
const SALES_DRIFT_RANGE: (f64, f64) = (-0.05, 0.05);
const YIELD_CHANGE_RANGE: (f64, f64) = (-0.10, 0.10);
const GRAIN_PRICE_RANGE: (f64, f64) = (-0.02, 0.02);
const MUSHROOM_PRICE_RANGE: (f64, f64) = (-0.05, -0.01);

// ==========================================
// CoefficientTable
// ==========================================
#[derive(Debug, Clone)]
pub struct CoefficientTable {
    drift_model: DriftModel,
    seed: Option<u64>,
    cells: BTreeMap<(CropId, i32), YearMultipliers>,
}

impl CoefficientTable {
    /// 不漂移
    pub fn flat() -> Self {
        Self {
            drift_model: DriftModel::Flat,
            seed: None,
            cells: BTreeMap::new(),
        }
    }

    /// 按漂移模型生成系数表
    ///
    /// # 参数
    /// - seed: 仅 Stochastic 使用；调用方负责在未配置时抽取并记录
    pub fn generate(
        dataset: &Dataset,
        model: DriftModel,
        trend: &MarketTrend,
        seed: u64,
    ) -> Self {
        let mut cells = BTreeMap::new();
        let horizon = *dataset.horizon();

        match model {
            DriftModel::Flat => return Self::flat(),
            DriftModel::Compound => {
                for year in horizon.years() {
                    let n = horizon.offset(year);
                    for crop in dataset.crops() {
                        cells.insert((crop.id, year), compound_multipliers(crop, n, trend));
                    }
                }
            }
            DriftModel::Stochastic => {
                let mut rng = StdRng::seed_from_u64(seed);
                for year in horizon.years() {
                    let n = horizon.offset(year);
                    for crop in dataset.crops() {
                        cells.insert(
                            (crop.id, year),
                            stochastic_multipliers(crop, n, trend, &mut rng),
                        );
                    }
                }
            }
        }

        debug!(
            model = ?model,
            cells = cells.len(),
            "经济系数表生成完成"
        );

        Self {
            drift_model: model,
            seed: matches!(model, DriftModel::Stochastic).then_some(seed),
            cells,
        }
    }

    pub fn drift_model(&self) -> DriftModel {
        self.drift_model
    }

    /// 随机漂移实际使用的种子
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn multipliers(&self, crop_id: CropId, year: i32) -> YearMultipliers {
        self.cells
            .get(&(crop_id, year))
            .copied()
            .unwrap_or(YearMultipliers::IDENTITY)
    }

    pub fn economics(&self, option: &ViableOption, year: i32) -> UnitEconomics {
        UnitEconomics::from_option(option, self.multipliers(option.crop_id, year))
    }
}

/// 确定性复利漂移（n = 年份 − 基准年）
fn compound_multipliers(crop: &Crop, n: i32, trend: &MarketTrend) -> YearMultipliers {
    let sales = if trend.is_growth_crop(&crop.name) {
        (1.0 + trend.growth_rate).powi(n)
    } else {
        1.0
    };

    let price = match crop.category {
        CropCategory::Rice | CropCategory::Grain => 1.0,
        CropCategory::Vegetable | CropCategory::WinterVegetable => {
            (1.0 + trend.vegetable_price_rate).powi(n)
        }
        CropCategory::Mushroom if trend.is_declining_mushroom(&crop.name) => {
            (1.0 + trend.declining_mushroom_rate).powi(n)
        }
        CropCategory::Mushroom => (1.0 + trend.mushroom_price_rate).powi(n),
        CropCategory::Other => 1.0,
    };

    YearMultipliers {
        sales,
        yield_factor: trend.yield_factor,
        cost: (1.0 + trend.cost_growth_rate).powi(n),
        price,
    }
}

/// 随机漂移：增长率随机抽取后按年复利；亩产变化不复利
fn stochastic_multipliers(
    crop: &Crop,
    n: i32,
    trend: &MarketTrend,
    rng: &mut StdRng,
) -> YearMultipliers {
    let sales_growth = if trend.is_growth_crop(&crop.name) {
        trend.growth_rate
    } else {
        rng.gen_range(SALES_DRIFT_RANGE.0..SALES_DRIFT_RANGE.1)
    };
    let yield_change = rng.gen_range(YIELD_CHANGE_RANGE.0..YIELD_CHANGE_RANGE.1);

    let price_growth = match crop.category.market_group() {
        MarketGroup::Grain => rng.gen_range(GRAIN_PRICE_RANGE.0..GRAIN_PRICE_RANGE.1),
        MarketGroup::Vegetable => trend.vegetable_price_rate,
        MarketGroup::Mushroom if trend.is_declining_mushroom(&crop.name) => {
            trend.declining_mushroom_rate
        }
        MarketGroup::Mushroom => rng.gen_range(MUSHROOM_PRICE_RANGE.0..MUSHROOM_PRICE_RANGE.1),
        MarketGroup::Other => 0.0,
    };

    YearMultipliers {
        sales: (1.0 + sales_growth).powi(n),
        yield_factor: 1.0 + yield_change,
        cost: (1.0 + trend.cost_growth_rate).powi(n),
        price: (1.0 + price_growth).powi(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LandType, Parcel};
    use std::collections::BTreeMap;

    fn create_test_dataset() -> Dataset {
        let crops = vec![
            Crop::new(6, "小麦", "粮食", CropCategory::Grain, false),
            Crop::new(21, "青椒", "蔬菜", CropCategory::Vegetable, false),
            Crop::new(39, "羊肚菌", "食用菌", CropCategory::Mushroom, false),
            Crop::new(38, "香菇", "食用菌", CropCategory::Mushroom, false),
        ];
        let parcels = vec![Parcel::new("A1", LandType::Plain, 80.0)];
        Dataset::new(parcels, crops, Vec::new(), BTreeMap::new(), Vec::new())
    }

    #[test]
    fn test_compound_drift() {
        let ds = create_test_dataset();
        let table = CoefficientTable::generate(&ds, DriftModel::Compound, &MarketTrend::default(), 0);

        let wheat = table.multipliers(6, 2026);
        assert!((wheat.sales - 1.075f64.powi(3)).abs() < 1e-12);
        assert!((wheat.price - 1.0).abs() < 1e-12);
        assert!((wheat.yield_factor - 0.95).abs() < 1e-12);
        assert!((wheat.cost - 1.05f64.powi(3)).abs() < 1e-12);

        let pepper = table.multipliers(21, 2025);
        assert!((pepper.sales - 1.0).abs() < 1e-12);
        assert!((pepper.price - 1.05f64.powi(2)).abs() < 1e-12);

        assert!((table.multipliers(39, 2024).price - 0.95).abs() < 1e-12);
        assert!((table.multipliers(38, 2024).price - 0.97).abs() < 1e-12);
        assert_eq!(table.seed(), None);
    }

    #[test]
    fn test_stochastic_drift_is_reproducible_with_seed() {
        let ds = create_test_dataset();
        let trend = MarketTrend::default();
        let a = CoefficientTable::generate(&ds, DriftModel::Stochastic, &trend, 42);
        let b = CoefficientTable::generate(&ds, DriftModel::Stochastic, &trend, 42);
        let c = CoefficientTable::generate(&ds, DriftModel::Stochastic, &trend, 43);

        assert_eq!(a.seed(), Some(42));
        for year in 2024..=2030 {
            for crop in [6, 21, 38, 39] {
                assert_eq!(a.multipliers(crop, year), b.multipliers(crop, year));
            }
        }
        let differs = (2024..=2030).any(|y| a.multipliers(21, y) != c.multipliers(21, y));
        assert!(differs);
    }

    #[test]
    fn test_stochastic_bounds() {
        let ds = create_test_dataset();
        let table =
            CoefficientTable::generate(&ds, DriftModel::Stochastic, &MarketTrend::default(), 7);
        for year in 2024..=2030 {
            let n = year - 2023;
            let m = table.multipliers(21, year);
            assert!(m.yield_factor >= 0.9 && m.yield_factor <= 1.1);
            assert!((m.price - 1.05f64.powi(n)).abs() < 1e-12);
            let wheat = table.multipliers(6, year);
            assert!((wheat.sales - 1.075f64.powi(n)).abs() < 1e-12);
            let shiitake = table.multipliers(38, year);
            assert!(shiitake.price <= 1.0);
        }
    }

    #[test]
    fn test_flat_is_identity() {
        let table = CoefficientTable::flat();
        assert_eq!(table.multipliers(6, 2030), YearMultipliers::IDENTITY);
    }
}
