// ==========================================
// 农作物种植规划系统 - 结果提取器
// ==========================================
// 职责: 读取变量取值 → 种植决策 + 结果行（产量/成本/收入/利润）
// 红线: 方案差异化的收入口径只在这里生效，不进入约束
//       纯函数：同一取值重复提取得到完全相同的行
// ==========================================

use crate::config::scenario_profile::{RevenueModel, ScenarioProfile};
use crate::domain::crop::CropId;
use crate::domain::dataset::Dataset;
use crate::domain::plan::{PlanRow, PlantingDecision};
use crate::engine::model::builder::BuiltModel;
use crate::engine::model::index::AreaCell;
use crate::engine::relations::MarketCoefficients;
use std::collections::HashMap;
use tracing::debug;

/// 面积阈值（亩），不超过该值的变量视为未种植
pub const AREA_EPSILON: f64 = 0.01;

/// 规模经济成本系数下限
const MIN_SCALE_EFFECT: f64 = 0.5;

/// 提取结果
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// 原始面积（未四舍五入），供校验使用
    pub decisions: Vec<PlantingDecision>,
    pub rows: Vec<PlanRow>,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
}

// 单行的原始经济量
struct LineItem<'c> {
    cell: &'c AreaCell,
    area: f64,
    production: f64,
    cost: f64,
    revenue: f64,
    profit: f64,
    scale_effect_pct: Option<f64>,
    elasticity_effect_pct: Option<f64>,
    risk_adjustment: Option<f64>,
}

// ==========================================
// ResultExtractor
// ==========================================
pub struct ResultExtractor<'a> {
    dataset: &'a Dataset,
    profile: &'a ScenarioProfile,
}

impl<'a> ResultExtractor<'a> {
    pub fn new(dataset: &'a Dataset, profile: &'a ScenarioProfile) -> Self {
        Self { dataset, profile }
    }

    /// 提取种植决策与结果行
    ///
    /// # 参数
    /// - built: 构建好的模型（提供变量索引）
    /// - values: 求解器返回的变量取值（按 VarId 下标）
    pub fn extract(&self, built: &BuiltModel, values: &[f64]) -> Extraction {
        let mut items: Vec<LineItem> = built
            .index
            .cells()
            .filter_map(|cell| {
                let area = values.get(cell.var.0).copied().unwrap_or(0.0);
                (area > AREA_EPSILON).then(|| self.base_item(cell, area))
            })
            .collect();

        self.apply_revenue_model(&mut items);

        items.sort_by_key(|i| {
            let k = i.cell.key;
            (k.year, k.parcel, k.season, k.crop_id)
        });

        let mut decisions = Vec::with_capacity(items.len());
        let mut rows = Vec::with_capacity(items.len());
        let (mut total_revenue, mut total_cost, mut total_profit) = (0.0, 0.0, 0.0);

        for item in &items {
            let k = item.cell.key;
            let parcel = &self.dataset.parcels()[k.parcel];
            let crop_name = self
                .dataset
                .crop(k.crop_id)
                .map(|c| c.name.clone())
                .unwrap_or_default();

            decisions.push(PlantingDecision {
                parcel: parcel.name.clone(),
                land_type: parcel.land_type,
                year: k.year,
                season: k.season,
                crop_id: k.crop_id,
                area: item.area,
            });

            rows.push(PlanRow {
                year: k.year,
                parcel: parcel.name.clone(),
                land_type: parcel.land_type,
                season: k.season,
                crop_id: k.crop_id,
                crop_name,
                category: item.cell.category,
                is_legume: item.cell.is_legume,
                area: round_to(item.area, 2),
                production: round_to(item.production, 1),
                cost: round_to(item.cost, 1),
                revenue: round_to(item.revenue, 1),
                profit: round_to(item.profit, 1),
                scale_effect_pct: item.scale_effect_pct.map(|v| round_to(v, 1)),
                elasticity_effect_pct: item.elasticity_effect_pct.map(|v| round_to(v, 1)),
                risk_adjustment: item.risk_adjustment.map(|v| round_to(v, 1)),
            });

            total_revenue += item.revenue;
            total_cost += item.cost;
            total_profit += item.profit;
        }

        debug!(
            rows = rows.len(),
            total_profit,
            "结果提取完成"
        );

        Extraction {
            decisions,
            rows,
            total_revenue,
            total_cost,
            total_profit,
        }
    }

    fn base_item<'c>(&self, cell: &'c AreaCell, area: f64) -> LineItem<'c> {
        let production = area * cell.economics.yield_per_mu;
        let cost = area * cell.economics.cost_per_mu;
        let revenue = production * cell.economics.price;
        LineItem {
            cell,
            area,
            production,
            cost,
            revenue,
            profit: revenue - cost,
            scale_effect_pct: None,
            elasticity_effect_pct: None,
            risk_adjustment: None,
        }
    }

    fn apply_revenue_model(&self, items: &mut [LineItem]) {
        match &self.profile.revenue_model {
            RevenueModel::CappedByDemand => self.apply_demand_split(items, 0.0),
            RevenueModel::SurplusDiscount { ratio } => self.apply_demand_split(items, *ratio),
            RevenueModel::DriftedFull => {
                let bonus = self.profile.legume_bonus;
                for item in items.iter_mut().filter(|i| i.cell.is_legume) {
                    item.profit += bonus * item.area;
                }
            }
            RevenueModel::MarketAdjusted {
                risk_aversion,
                elasticity_damping,
                scale_reference_area,
            } => {
                for item in items.iter_mut() {
                    let category = item.cell.category;
                    let econ = &item.cell.economics;

                    let scale = MarketCoefficients::scale_economy(category);
                    let scale_effect = (1.0 - scale * (item.area / scale_reference_area))
                        .clamp(MIN_SCALE_EFFECT, 1.0);
                    item.cost = item.area * econ.cost_per_mu * scale_effect;

                    let elasticity = MarketCoefficients::elasticity(category);
                    let price_effect =
                        1.0 + elasticity * (econ.multipliers.price - 1.0) * elasticity_damping;
                    item.revenue = item.production * econ.price * price_effect;

                    let gross = item.revenue - item.cost;
                    let risk = if gross > 0.0 {
                        gross * MarketCoefficients::risk_factor(category) * risk_aversion
                    } else {
                        0.0
                    };
                    item.profit = gross - risk;
                    item.scale_effect_pct = Some((1.0 - scale_effect) * 100.0);
                    item.elasticity_effect_pct = Some((price_effect - 1.0) * 100.0);
                    item.risk_adjustment = Some(risk);
                }
            }
        }
    }

    /// 按 (作物, 年份) 汇总产量，超出当年预期销量的部分按 surplus_ratio 计价
    ///
    /// 各行按产量比例分摊
    fn apply_demand_split(&self, items: &mut [LineItem], surplus_ratio: f64) {
        let mut totals: HashMap<(CropId, i32), f64> = HashMap::new();
        for item in items.iter() {
            *totals
                .entry((item.cell.key.crop_id, item.cell.key.year))
                .or_insert(0.0) += item.production;
        }

        for item in items.iter_mut() {
            let key = (item.cell.key.crop_id, item.cell.key.year);
            let total = totals.get(&key).copied().unwrap_or(0.0);
            if total <= 0.0 {
                continue;
            }
            let demand = self.dataset.demand(key.0);
            let sold_fraction = (demand / total).min(1.0);
            let factor = sold_fraction + surplus_ratio * (1.0 - sold_fraction);
            item.revenue = item.production * item.cell.economics.price * factor;
            item.profit = item.revenue - item.cost;
        }
    }
}

/// 四舍五入到指定小数位
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
