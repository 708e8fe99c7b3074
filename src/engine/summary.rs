// ==========================================
// 农作物种植规划系统 - 结果汇总
// ==========================================
// 职责: 逐年汇总 / 逐作物汇总 / 利用率 / 市场大类分布 /
//       水浇地种植方式表 / 豆类轮作执行情况
// 红线: 只读结果行，不回写
// ==========================================

use crate::config::scenario_profile::{LegumeScope, ScenarioProfile};
use crate::domain::crop::CropId;
use crate::domain::dataset::Dataset;
use crate::domain::plan::PlanRow;
use crate::domain::types::{CropCategory, LandType, MarketGroup, Season};
use crate::engine::extractor::{round_to, AREA_EPSILON};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlySummary {
    pub year: i32,
    pub planted_area: f64,
    pub production: f64,
    pub cost: f64,
    pub revenue: f64,
    pub profit: f64,
    pub distinct_crops: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropSummary {
    pub crop_id: CropId,
    pub crop_name: String,
    pub category: CropCategory,
    pub is_legume: bool,
    pub area: f64,
    pub production: f64,
    pub cost: f64,
    pub revenue: f64,
    pub profit: f64,
    /// 利润率 = 利润 / 成本 × 100
    pub profit_margin_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub group: MarketGroup,
    pub area: f64,
    pub share_pct: f64,
}

/// 水浇地某年的种植方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrigatedMode {
    Single,
    Double,
    Idle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrrigatedChoice {
    pub parcel: String,
    pub year: i32,
    pub mode: IrrigatedMode,
    pub single_area: f64,
    pub double_area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegumeRotationStatus {
    pub parcel: String,
    pub land_type: LandType,
    pub has_history: bool,
    pub early_window_area: f64,
    pub late_window_area: f64,
    pub required: f64,
    pub compliant: bool,
}

/// 方案结果汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSummary {
    pub total_land_area: f64,
    pub horizon_years: usize,
    pub planted_area: f64,
    /// 利用率 = 种植面积 / (总耕地 × 年数) × 100
    pub utilization_pct: f64,
    pub total_production: f64,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub average_distinct_crops: f64,
    pub yearly: Vec<YearlySummary>,
    pub crops: Vec<CropSummary>,
    pub categories: Vec<CategoryShare>,
    pub irrigated_choices: Vec<IrrigatedChoice>,
    pub legume_rotation: Vec<LegumeRotationStatus>,
}

/// 由结果行生成汇总
pub fn summarize(dataset: &Dataset, profile: &ScenarioProfile, rows: &[PlanRow]) -> PlanSummary {
    let yearly = yearly_summaries(dataset, rows);
    let crops = crop_summaries(rows);

    let total_land_area = dataset.total_area();
    let horizon_years = dataset.horizon().len();
    let planted_area: f64 = rows.iter().map(|r| r.area).sum();
    let capacity = total_land_area * horizon_years as f64;
    let utilization_pct = if capacity > 0.0 {
        planted_area / capacity * 100.0
    } else {
        0.0
    };
    let average_distinct_crops = if yearly.is_empty() {
        0.0
    } else {
        yearly.iter().map(|y| y.distinct_crops as f64).sum::<f64>() / yearly.len() as f64
    };

    PlanSummary {
        total_land_area,
        horizon_years,
        planted_area: round_to(planted_area, 2),
        utilization_pct: round_to(utilization_pct, 2),
        total_production: round_to(rows.iter().map(|r| r.production).sum(), 1),
        total_cost: round_to(rows.iter().map(|r| r.cost).sum(), 1),
        total_revenue: round_to(rows.iter().map(|r| r.revenue).sum(), 1),
        total_profit: round_to(rows.iter().map(|r| r.profit).sum(), 1),
        average_distinct_crops: round_to(average_distinct_crops, 1),
        yearly,
        crops,
        categories: category_shares(rows, planted_area),
        irrigated_choices: irrigated_choices(dataset, rows),
        legume_rotation: legume_rotation_status(dataset, profile, rows),
    }
}

fn yearly_summaries(dataset: &Dataset, rows: &[PlanRow]) -> Vec<YearlySummary> {
    dataset
        .horizon()
        .years()
        .map(|year| {
            let year_rows: Vec<&PlanRow> = rows.iter().filter(|r| r.year == year).collect();
            let distinct: BTreeSet<CropId> = year_rows.iter().map(|r| r.crop_id).collect();
            YearlySummary {
                year,
                planted_area: round_to(year_rows.iter().map(|r| r.area).sum(), 2),
                production: round_to(year_rows.iter().map(|r| r.production).sum(), 1),
                cost: round_to(year_rows.iter().map(|r| r.cost).sum(), 1),
                revenue: round_to(year_rows.iter().map(|r| r.revenue).sum(), 1),
                profit: round_to(year_rows.iter().map(|r| r.profit).sum(), 1),
                distinct_crops: distinct.len(),
            }
        })
        .collect()
}

fn crop_summaries(rows: &[PlanRow]) -> Vec<CropSummary> {
    let mut by_crop: BTreeMap<CropId, CropSummary> = BTreeMap::new();
    for r in rows {
        let entry = by_crop.entry(r.crop_id).or_insert_with(|| CropSummary {
            crop_id: r.crop_id,
            crop_name: r.crop_name.clone(),
            category: r.category,
            is_legume: r.is_legume,
            area: 0.0,
            production: 0.0,
            cost: 0.0,
            revenue: 0.0,
            profit: 0.0,
            profit_margin_pct: 0.0,
        });
        entry.area += r.area;
        entry.production += r.production;
        entry.cost += r.cost;
        entry.revenue += r.revenue;
        entry.profit += r.profit;
    }

    by_crop
        .into_values()
        .map(|mut s| {
            s.profit_margin_pct = if s.cost > 0.0 {
                round_to(s.profit / s.cost * 100.0, 1)
            } else {
                0.0
            };
            s.area = round_to(s.area, 2);
            s.production = round_to(s.production, 1);
            s.cost = round_to(s.cost, 1);
            s.revenue = round_to(s.revenue, 1);
            s.profit = round_to(s.profit, 1);
            s
        })
        .collect()
}

fn category_shares(rows: &[PlanRow], planted_area: f64) -> Vec<CategoryShare> {
    let mut by_group: BTreeMap<MarketGroup, f64> = BTreeMap::new();
    for r in rows {
        *by_group.entry(r.category.market_group()).or_insert(0.0) += r.area;
    }
    by_group
        .into_iter()
        .map(|(group, area)| CategoryShare {
            group,
            area: round_to(area, 2),
            share_pct: if planted_area > 0.0 {
                round_to(area / planted_area * 100.0, 1)
            } else {
                0.0
            },
        })
        .collect()
}

/// 水浇地种植方式（单季水稻 / 两季蔬菜 / 空闲）
fn irrigated_choices(dataset: &Dataset, rows: &[PlanRow]) -> Vec<IrrigatedChoice> {
    let mut out = Vec::new();
    for parcel in dataset.parcels().iter().filter(|p| p.land_type == LandType::Irrigated) {
        for year in dataset.horizon().years() {
            let area_of = |pred: fn(Season) -> bool| -> f64 {
                rows.iter()
                    .filter(|r| r.parcel == parcel.name && r.year == year && pred(r.season))
                    .map(|r| r.area)
                    .sum()
            };
            let single_area = area_of(|s| s == Season::Single);
            let double_area = area_of(|s| s == Season::First);
            let mode = if single_area > AREA_EPSILON {
                IrrigatedMode::Single
            } else if double_area > AREA_EPSILON {
                IrrigatedMode::Double
            } else {
                IrrigatedMode::Idle
            };
            out.push(IrrigatedChoice {
                parcel: parcel.name.clone(),
                year,
                mode,
                single_area: round_to(single_area, 2),
                double_area: round_to(double_area, 2),
            });
        }
    }
    out
}

fn legume_rotation_status(
    dataset: &Dataset,
    profile: &ScenarioProfile,
    rows: &[PlanRow],
) -> Vec<LegumeRotationStatus> {
    let rule = &profile.legume_rotation;
    let horizon = dataset.horizon();
    let early: BTreeSet<i32> = horizon
        .window(rule.early_window.0, rule.early_window.1)
        .into_iter()
        .collect();
    let late: BTreeSet<i32> = horizon
        .window(rule.late_window.0, rule.late_window.1)
        .into_iter()
        .collect();

    dataset
        .parcels()
        .iter()
        .map(|parcel| {
            let legume_area = |years: &BTreeSet<i32>| -> f64 {
                rows.iter()
                    .filter(|r| r.is_legume && r.parcel == parcel.name && years.contains(&r.year))
                    .map(|r| r.area)
                    .sum()
            };
            let has_history = dataset.has_legume_history(&parcel.name);
            let early_window_area = legume_area(&early);
            let late_window_area = legume_area(&late);
            let required = rule.minimum_for(parcel.area);
            let early_applies = match rule.early_scope {
                LegumeScope::AllParcels => true,
                LegumeScope::WithoutHistory => !has_history,
            };
            let compliant = (!early_applies || early_window_area + 1e-6 >= required)
                && late_window_area + 1e-6 >= required;

            LegumeRotationStatus {
                parcel: parcel.name.clone(),
                land_type: parcel.land_type,
                has_history,
                early_window_area: round_to(early_window_area, 2),
                late_window_area: round_to(late_window_area, 2),
                required,
                compliant,
            }
        })
        .collect()
}
