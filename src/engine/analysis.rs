// ==========================================
// 农作物种植规划系统 - 方案附加分析
// ==========================================
// 严格方案: 乐观/基准/悲观 三情景的不确定性分析
// 高级方案: 逐年相关性收益 / 分品类风险收益 / 投资建议
// ==========================================

use crate::domain::crop::CropId;
use crate::domain::plan::PlanRow;
use crate::domain::types::CropCategory;
use crate::engine::extractor::round_to;
use crate::engine::relations::CropRelations;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// 不确定性分析
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UncertaintyScenario {
    pub name: String,
    pub yield_factor: f64,
    pub cost_factor: f64,
    pub price_factor: f64,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    /// 相对基准情景的利润变化（%）
    pub change_pct: f64,
    pub annual_profit: f64,
}

const UNCERTAINTY_CASES: [(&str, f64, f64, f64); 3] = [
    ("optimistic", 1.10, 0.95, 1.05),
    ("base", 1.00, 1.00, 1.00),
    ("pessimistic", 0.90, 1.05, 0.95),
];

/// 收入按 亩产倍数 × 价格倍数 缩放，成本按成本倍数缩放
pub fn uncertainty_analysis(rows: &[PlanRow], years: usize) -> Vec<UncertaintyScenario> {
    let revenue: f64 = rows.iter().map(|r| r.revenue).sum();
    let cost: f64 = rows.iter().map(|r| r.cost).sum();
    let base_profit = revenue - cost;

    UNCERTAINTY_CASES
        .iter()
        .map(|&(name, y, c, p)| {
            let scenario_revenue = revenue * y * p;
            let scenario_cost = cost * c;
            let profit = scenario_revenue - scenario_cost;
            let change_pct = if base_profit.abs() > f64::EPSILON {
                (profit / base_profit - 1.0) * 100.0
            } else {
                0.0
            };
            UncertaintyScenario {
                name: name.to_string(),
                yield_factor: y,
                cost_factor: c,
                price_factor: p,
                revenue: round_to(scenario_revenue, 0),
                cost: round_to(scenario_cost, 0),
                profit: round_to(profit, 0),
                change_pct: round_to(change_pct, 1),
                annual_profit: round_to(profit / years.max(1) as f64, 0),
            }
        })
        .collect()
}

// ==========================================
// 相关性收益
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationBenefit {
    pub year: i32,
    pub crop_count: usize,
    pub pair_count: usize,
    pub mean_complementarity: f64,
    pub mean_substitution: f64,
}

/// 逐年：当年种植作物两两之间的平均互补/替代系数
pub fn correlation_benefits(rows: &[PlanRow], relations: &CropRelations) -> Vec<CorrelationBenefit> {
    let mut by_year: BTreeMap<i32, BTreeSet<CropId>> = BTreeMap::new();
    for r in rows {
        by_year.entry(r.year).or_default().insert(r.crop_id);
    }

    by_year
        .into_iter()
        .map(|(year, crops)| {
            let crops: Vec<CropId> = crops.into_iter().collect();
            let mut pairs = 0usize;
            let (mut comp, mut sub) = (0.0, 0.0);
            for (i, a) in crops.iter().enumerate() {
                for b in &crops[i + 1..] {
                    comp += relations.complementarity(*a, *b);
                    sub += relations.substitution(*a, *b);
                    pairs += 1;
                }
            }
            let mean = |total: f64| if pairs > 0 { round_to(total / pairs as f64, 3) } else { 0.0 };
            CorrelationBenefit {
                year,
                crop_count: crops.len(),
                pair_count: pairs,
                mean_complementarity: mean(comp),
                mean_substitution: mean(sub),
            }
        })
        .collect()
}

// ==========================================
// 风险收益
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskRating {
    Low,
    Medium,
    High,
}

impl RiskRating {
    /// 按平均风险扣减（元/行）评级
    pub fn from_level(level: f64) -> Self {
        if level < 10.0 {
            RiskRating::Low
        } else if level < 30.0 {
            RiskRating::Medium
        } else {
            RiskRating::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentAdvice {
    StronglyRecommended,
    Recommended,
    Moderate,
    Cautious,
}

impl InvestmentAdvice {
    pub fn from_metrics(return_pct: f64, risk_level: f64) -> Self {
        if return_pct > 20.0 && risk_level < 20.0 {
            InvestmentAdvice::StronglyRecommended
        } else if return_pct > 15.0 && risk_level < 30.0 {
            InvestmentAdvice::Recommended
        } else if return_pct > 10.0 {
            InvestmentAdvice::Moderate
        } else {
            InvestmentAdvice::Cautious
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            InvestmentAdvice::StronglyRecommended => "强烈推荐",
            InvestmentAdvice::Recommended => "推荐",
            InvestmentAdvice::Moderate => "适度投资",
            InvestmentAdvice::Cautious => "谨慎投资",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReturn {
    pub category: CropCategory,
    pub area: f64,
    /// 平均利润率 = 风险调整后利润 / 调整后成本 × 100
    pub return_pct: f64,
    pub risk_level: f64,
    pub rating: RiskRating,
    pub advice: InvestmentAdvice,
}

/// 按作物类别统计风险收益，按利润率降序
pub fn risk_return(rows: &[PlanRow]) -> Vec<RiskReturn> {
    #[derive(Default)]
    struct Acc {
        area: f64,
        profit: f64,
        cost: f64,
        risk: f64,
        n: usize,
    }

    let mut by_category: BTreeMap<CropCategory, Acc> = BTreeMap::new();
    for r in rows {
        let acc = by_category.entry(r.category).or_default();
        acc.area += r.area;
        acc.profit += r.profit;
        acc.cost += r.cost;
        acc.risk += r.risk_adjustment.unwrap_or(0.0);
        acc.n += 1;
    }

    let mut out: Vec<RiskReturn> = by_category
        .into_iter()
        .map(|(category, acc)| {
            let return_pct = if acc.cost > 0.0 { acc.profit / acc.cost * 100.0 } else { 0.0 };
            let risk_level = if acc.n > 0 { acc.risk / acc.n as f64 } else { 0.0 };
            RiskReturn {
                category,
                area: round_to(acc.area, 1),
                return_pct: round_to(return_pct, 1),
                risk_level: round_to(risk_level, 1),
                rating: RiskRating::from_level(risk_level),
                advice: InvestmentAdvice::from_metrics(return_pct, risk_level),
            }
        })
        .collect();

    out.sort_by(|a, b| b.return_pct.total_cmp(&a.return_pct));
    out
}

/// 生成建议文本
pub fn advice_lines(risks: &[RiskReturn], benefits: &[CorrelationBenefit]) -> Vec<String> {
    let mut lines: Vec<String> = risks
        .iter()
        .map(|r| {
            format!(
                "{}: 利润率 {:.1}%，风险水平 {:.1}，{}",
                r.category.title_cn(),
                r.return_pct,
                r.risk_level,
                r.advice.title_cn()
            )
        })
        .collect();

    if !benefits.is_empty() {
        let avg_crops =
            benefits.iter().map(|b| b.crop_count as f64).sum::<f64>() / benefits.len() as f64;
        let avg_comp = benefits.iter().map(|b| b.mean_complementarity).sum::<f64>()
            / benefits.len() as f64;
        lines.push(format!(
            "年均种植 {:.1} 种作物，平均互补系数 {:.3}，维持多样性以分散风险",
            avg_crops, avg_comp
        ));
    }
    lines
}
