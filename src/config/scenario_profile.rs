// ==========================================
// 农作物种植规划系统 - 方案配置记录
// ==========================================
// 职责: 用一条配置记录描述一个方案（需求口径/连作约束/多样性/豆类区间/风险调整…）
// 红线: ModelBuilder 只有一条代码路径，方案差异全部落在这里
// ==========================================

use crate::domain::types::{MarketGroup, PlanningVariant};
use serde::{Deserialize, Serialize};

/// 主求解默认时限（秒）
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 1200;

/// 放松模型求解默认时限（秒）
pub const DEFAULT_FALLBACK_TIME_LIMIT_SECS: u64 = 600;

// ==========================================
// 需求上限口径
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DemandRule {
    /// 整个规划期总产量 ≤ factor × 基准年预期销量
    HorizonTotal { factor: f64 },
    /// 逐年：增长作物 ≤ 预期 × 销量倍数；其他作物 ≤ 预期 × other_factor
    YearlyDrift { other_factor: f64 },
    /// 逐年：≤ 预期 × 销量倍数 × (1 + 弹性 × (价格倍数 − 1)) × headroom
    YearlyElastic { headroom: f64 },
}

// ==========================================
// 结果提取时的收入口径
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevenueModel {
    /// 超过当年预期销量的部分滞销
    CappedByDemand,
    /// 超过当年预期销量的部分按 ratio 折价销售
    SurplusDiscount { ratio: f64 },
    /// 全部按漂移后价格销售，豆类另计奖励
    DriftedFull,
    /// 规模经济 + 需求弹性 + 风险调整
    MarketAdjusted {
        risk_aversion: f64,
        elasticity_damping: f64,
        scale_reference_area: f64,
    },
}

// ==========================================
// 系数漂移模型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftModel {
    /// 不漂移
    Flat,
    /// 按年复利的确定性漂移
    Compound,
    /// 每次运行随机抽取一次（需记录种子）
    Stochastic,
}

/// 市场趋势参数（作物名清单 + 增长率）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketTrend {
    /// 销量持续增长的作物（小麦、玉米）
    pub growth_crops: Vec<String>,
    pub growth_rate: f64,
    /// 价格明显下滑的食用菌（羊肚菌）
    pub declining_mushrooms: Vec<String>,
    pub declining_mushroom_rate: f64,
    /// 其余食用菌价格年降幅（确定性漂移）
    pub mushroom_price_rate: f64,
    /// 蔬菜价格年涨幅
    pub vegetable_price_rate: f64,
    /// 种植成本年涨幅
    pub cost_growth_rate: f64,
    /// 亩产量倍数（确定性漂移）
    pub yield_factor: f64,
}

impl Default for MarketTrend {
    fn default() -> Self {
        Self {
            growth_crops: vec!["小麦".to_string(), "玉米".to_string()],
            growth_rate: 0.075,
            declining_mushrooms: vec!["羊肚菌".to_string()],
            declining_mushroom_rate: -0.05,
            mushroom_price_rate: -0.03,
            vegetable_price_rate: 0.05,
            cost_growth_rate: 0.05,
            yield_factor: 0.95,
        }
    }
}

impl MarketTrend {
    pub fn is_growth_crop(&self, name: &str) -> bool {
        self.growth_crops.iter().any(|c| c == name)
    }

    pub fn is_declining_mushroom(&self, name: &str) -> bool {
        self.declining_mushrooms.iter().any(|c| c == name)
    }
}

// ==========================================
// 连作约束
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonocultureRule {
    /// 种植指示变量: b[Y] + b[Y+1] ≤ 1
    Indicator,
    /// 面积容差: x[Y] + x[Y+1] ≤ max_pair_area
    Tolerance { max_pair_area: f64 },
}

impl MonocultureRule {
    /// 校验时使用的相邻两年面积和上限
    pub fn pair_tolerance(&self, area_epsilon: f64) -> f64 {
        match self {
            MonocultureRule::Indicator => area_epsilon,
            MonocultureRule::Tolerance { max_pair_area } => *max_pair_area,
        }
    }
}

// ==========================================
// 豆类轮作
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegumeScope {
    /// 仅基准年未种豆类的地块
    WithoutHistory,
    /// 全部地块
    AllParcels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegumeRotationRule {
    /// 第一轮窗口（规划期偏移，含端点）
    pub early_window: (i32, i32),
    pub early_scope: LegumeScope,
    /// 第二轮窗口，全部地块
    pub late_window: (i32, i32),
    /// 最低豆类面积 = max(min_area_floor, min_area_fraction × 地块面积)
    pub min_area_floor: f64,
    pub min_area_fraction: f64,
}

impl LegumeRotationRule {
    pub fn minimum_for(&self, parcel_area: f64) -> f64 {
        self.min_area_floor
            .max(self.min_area_fraction * parcel_area)
            .min(parcel_area)
    }
}

// ==========================================
// 多样性 / 集中度 / 豆类占比
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityRule {
    /// 每年至少种植的作物种数
    pub min_distinct_crops: usize,
    /// 作物-年份指示变量为 1 时的最小总面积
    pub indicator_min_area: f64,
    /// 每年至少各种一种的市场大类
    #[serde(default)]
    pub required_groups: Vec<MarketGroup>,
    /// 每个作物-年份指示变量的目标奖励
    #[serde(default)]
    pub bonus_per_crop: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegumeShareBand {
    pub min_share: f64,
    pub max_share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationCap {
    /// 单一作物每年面积 ≤ single_crop_share × 总耕地
    pub single_crop_share: f64,
    /// 食用菌每年面积 ≤ mushroom_share × 总耕地
    pub mushroom_share: f64,
}

/// 目标函数中的规模经济/风险调整（元/亩 = 系数 × 权重）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketAdjustment {
    pub scale_weight: f64,
    pub risk_weight: f64,
}

// ==========================================
// 放松模型
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    /// 需求上限放大倍数
    pub demand_scale: f64,
    /// 放松模型使用的豆类奖励（None 沿用主模型）
    pub legume_bonus: Option<f64>,
    pub time_limit_secs: u64,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            demand_scale: 10.0,
            legume_bonus: None,
            time_limit_secs: DEFAULT_FALLBACK_TIME_LIMIT_SECS,
        }
    }
}

// ==========================================
// ScenarioProfile - 方案配置记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProfile {
    pub variant: PlanningVariant,
    pub demand_rule: DemandRule,
    pub revenue_model: RevenueModel,
    pub drift_model: DriftModel,
    #[serde(default)]
    pub market_trend: MarketTrend,
    pub monoculture: MonocultureRule,
    pub legume_rotation: LegumeRotationRule,
    /// 最小种植面积（亩），None 表示不设
    pub min_patch_area: Option<f64>,
    pub diversity: Option<DiversityRule>,
    pub legume_share: Option<LegumeShareBand>,
    pub concentration: Option<ConcentrationCap>,
    /// 豆类每亩奖励（元）
    pub legume_bonus: f64,
    pub market_adjustment: Option<MarketAdjustment>,
    /// 只为有预期销量的作物建变量
    pub tradeable_only: bool,
    /// 水浇地/大棚第一季总面积 = 第二季总面积
    pub pair_double_seasons: bool,
    /// 随机种子（仅随机漂移使用）
    pub random_seed: Option<u64>,
    pub time_limit_secs: u64,
    pub fallback: FallbackPolicy,
}

impl ScenarioProfile {
    fn base(variant: PlanningVariant, factor: f64, revenue_model: RevenueModel) -> Self {
        Self {
            variant,
            demand_rule: DemandRule::HorizonTotal { factor },
            revenue_model,
            drift_model: DriftModel::Flat,
            market_trend: MarketTrend::default(),
            monoculture: MonocultureRule::Indicator,
            legume_rotation: LegumeRotationRule {
                early_window: (1, 3),
                early_scope: LegumeScope::WithoutHistory,
                late_window: (4, 6),
                min_area_floor: 0.1,
                min_area_fraction: 0.05,
            },
            min_patch_area: Some(0.1),
            diversity: None,
            legume_share: None,
            concentration: None,
            legume_bonus: 200.0,
            market_adjustment: None,
            tradeable_only: true,
            pair_double_seasons: true,
            random_seed: None,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            fallback: FallbackPolicy {
                legume_bonus: Some(100.0),
                ..FallbackPolicy::default()
            },
        }
    }

    /// 基础方案-情景一：需求上限 7 倍，超产部分滞销
    pub fn base_scenario_one() -> Self {
        Self::base(
            PlanningVariant::BaseScenarioOne,
            7.0,
            RevenueModel::CappedByDemand,
        )
    }

    /// 基础方案-情景二：需求上限 10 倍，超产部分五折
    pub fn base_scenario_two() -> Self {
        Self::base(
            PlanningVariant::BaseScenarioTwo,
            10.0,
            RevenueModel::SurplusDiscount { ratio: 0.5 },
        )
    }

    /// 严格方案：逐年确定性漂移 + 近零连作容差 + 每年至少 5 种作物
    pub fn strict() -> Self {
        Self {
            variant: PlanningVariant::Strict,
            demand_rule: DemandRule::YearlyDrift { other_factor: 1.05 },
            revenue_model: RevenueModel::DriftedFull,
            drift_model: DriftModel::Compound,
            market_trend: MarketTrend::default(),
            monoculture: MonocultureRule::Tolerance { max_pair_area: 0.1 },
            legume_rotation: LegumeRotationRule {
                early_window: (1, 3),
                early_scope: LegumeScope::WithoutHistory,
                late_window: (4, 6),
                min_area_floor: 0.1,
                min_area_fraction: 0.0,
            },
            min_patch_area: Some(0.1),
            diversity: Some(DiversityRule {
                min_distinct_crops: 5,
                indicator_min_area: 0.01,
                required_groups: Vec::new(),
                bonus_per_crop: 0.0,
            }),
            legume_share: None,
            concentration: None,
            legume_bonus: 100.0,
            market_adjustment: None,
            tradeable_only: false,
            pair_double_seasons: true,
            random_seed: None,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            fallback: FallbackPolicy::default(),
        }
    }

    /// 高级相关性方案：随机漂移 + 需求弹性 + 豆类占比区间 + 集中度上限 + 品类覆盖
    pub fn advanced(seed: Option<u64>) -> Self {
        Self {
            variant: PlanningVariant::Advanced,
            demand_rule: DemandRule::YearlyElastic { headroom: 1.1 },
            revenue_model: RevenueModel::MarketAdjusted {
                risk_aversion: 0.3,
                elasticity_damping: 0.5,
                scale_reference_area: 10.0,
            },
            drift_model: DriftModel::Stochastic,
            market_trend: MarketTrend::default(),
            monoculture: MonocultureRule::Tolerance { max_pair_area: 0.1 },
            legume_rotation: LegumeRotationRule {
                early_window: (1, 3),
                early_scope: LegumeScope::AllParcels,
                late_window: (4, 6),
                min_area_floor: 0.2,
                min_area_fraction: 0.0,
            },
            min_patch_area: Some(0.1),
            diversity: Some(DiversityRule {
                min_distinct_crops: 6,
                indicator_min_area: 0.1,
                required_groups: vec![
                    MarketGroup::Grain,
                    MarketGroup::Vegetable,
                    MarketGroup::Mushroom,
                ],
                bonus_per_crop: 50.0,
            }),
            legume_share: Some(LegumeShareBand {
                min_share: 0.05,
                max_share: 0.25,
            }),
            concentration: Some(ConcentrationCap {
                single_crop_share: 0.4,
                mushroom_share: 0.15,
            }),
            legume_bonus: 100.0,
            market_adjustment: Some(MarketAdjustment {
                scale_weight: 100.0,
                risk_weight: 50.0,
            }),
            tradeable_only: false,
            pair_double_seasons: true,
            random_seed: seed,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            fallback: FallbackPolicy::default(),
        }
    }

    /// 按方案枚举取预设
    pub fn for_variant(variant: PlanningVariant, seed: Option<u64>) -> Self {
        match variant {
            PlanningVariant::BaseScenarioOne => Self::base_scenario_one(),
            PlanningVariant::BaseScenarioTwo => Self::base_scenario_two(),
            PlanningVariant::Strict => Self::strict(),
            PlanningVariant::Advanced => Self::advanced(seed),
        }
    }

    pub fn with_time_limits(mut self, primary_secs: u64, fallback_secs: u64) -> Self {
        self.time_limit_secs = primary_secs;
        self.fallback.time_limit_secs = fallback_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_only_by_record() {
        let one = ScenarioProfile::base_scenario_one();
        let two = ScenarioProfile::base_scenario_two();
        assert_eq!(one.demand_rule, DemandRule::HorizonTotal { factor: 7.0 });
        assert_eq!(two.demand_rule, DemandRule::HorizonTotal { factor: 10.0 });
        assert_eq!(one.monoculture, MonocultureRule::Indicator);

        let strict = ScenarioProfile::strict();
        assert_eq!(strict.diversity.as_ref().unwrap().min_distinct_crops, 5);
        assert_eq!(
            strict.monoculture,
            MonocultureRule::Tolerance { max_pair_area: 0.1 }
        );

        let adv = ScenarioProfile::advanced(Some(42));
        assert_eq!(adv.random_seed, Some(42));
        assert_eq!(adv.diversity.as_ref().unwrap().required_groups.len(), 3);
        assert!(adv.legume_share.is_some());
    }

    #[test]
    fn test_legume_minimum() {
        let rule = ScenarioProfile::base_scenario_one().legume_rotation;
        // max(0.1, 5% × 80) = 4
        assert!((rule.minimum_for(80.0) - 4.0).abs() < 1e-9);
        assert!((rule.minimum_for(1.0) - 0.1).abs() < 1e-9);
        // 不超过地块面积
        assert!((rule.minimum_for(0.05) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_profile_json_roundtrip_keeps_tags() {
        let adv = ScenarioProfile::advanced(None);
        let json = serde_json::to_string(&adv).unwrap();
        assert!(json.contains("\"kind\":\"yearly_elastic\""));
        let back: ScenarioProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, adv);
    }
}
