// ==========================================
// 农作物种植规划系统 - 结果自检
// ==========================================
// 职责: 对提取出的种植决策重新执行可种判定，并审计
//       面积守恒 / 水浇地互斥 / 双季对称 / 连作 / 豆类轮作
// 红线: 只报告，不修正
// ==========================================

use crate::config::scenario_profile::{LegumeScope, MonocultureRule, ScenarioProfile};
use crate::domain::crop::CropId;
use crate::domain::dataset::Dataset;
use crate::domain::plan::PlantingDecision;
use crate::domain::types::{CropCategory, LandType, Season};
use crate::engine::eligibility_core::EligibilityCore;
use crate::engine::extractor::AREA_EPSILON;
use crate::engine::model::index::VariableIndex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// 面积比较容差（亩）
pub const AREA_TOLERANCE: f64 = 1e-6;

/// 双季对称容差：提取阈值会截掉不超过 0.01 亩的零头
pub const SYMMETRY_TOLERANCE: f64 = AREA_TOLERANCE + AREA_EPSILON;

/// 可种判定不一致的决策
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityViolation {
    pub parcel: String,
    pub land_type: LandType,
    pub year: i32,
    pub season: Season,
    pub crop_id: CropId,
    pub crop_name: Option<String>,
    pub category: Option<CropCategory>,
    pub area: f64,
}

/// 审计发现
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditFinding {
    AreaOverflow {
        parcel: String,
        year: i32,
        season: Season,
        planted: f64,
        capacity: f64,
    },
    IrrigatedOverlap {
        parcel: String,
        year: i32,
        single_area: f64,
        double_area: f64,
    },
    SeasonImbalance {
        parcel: String,
        year: i32,
        first_area: f64,
        second_area: f64,
    },
    ConsecutiveReuse {
        parcel: String,
        season: Season,
        crop_id: CropId,
        year: i32,
        measured: f64,
        tolerance: f64,
    },
    LegumeRotationShortfall {
        parcel: String,
        window: (i32, i32),
        legume_area: f64,
        required: f64,
    },
}

impl AuditFinding {
    pub fn kind(&self) -> &'static str {
        match self {
            AuditFinding::AreaOverflow { .. } => "area_overflow",
            AuditFinding::IrrigatedOverlap { .. } => "irrigated_overlap",
            AuditFinding::SeasonImbalance { .. } => "season_imbalance",
            AuditFinding::ConsecutiveReuse { .. } => "consecutive_reuse",
            AuditFinding::LegumeRotationShortfall { .. } => "legume_rotation_shortfall",
        }
    }
}

/// 自检报告
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub checked_decisions: usize,
    pub eligibility_violations: Vec<EligibilityViolation>,
    pub findings: Vec<AuditFinding>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.eligibility_violations.is_empty() && self.findings.is_empty()
    }

    pub fn finding_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for f in &self.findings {
            *counts.entry(f.kind()).or_insert(0) += 1;
        }
        counts
    }
}

// ==========================================
// SolutionValidator
// ==========================================
pub struct SolutionValidator<'a> {
    dataset: &'a Dataset,
    profile: &'a ScenarioProfile,
    index: &'a VariableIndex,
}

impl<'a> SolutionValidator<'a> {
    pub fn new(dataset: &'a Dataset, profile: &'a ScenarioProfile, index: &'a VariableIndex) -> Self {
        Self {
            dataset,
            profile,
            index,
        }
    }

    pub fn validate(&self, decisions: &[PlantingDecision]) -> ValidationReport {
        let mut report = ValidationReport {
            checked_decisions: decisions.len(),
            eligibility_violations: self.check_eligibility(decisions),
            findings: Vec::new(),
        };

        // (地块下标, 年份, 季次) → 面积
        let mut season_area: BTreeMap<(usize, i32, Season), f64> = BTreeMap::new();
        for d in decisions {
            let Some(p) = self.dataset.parcel_index(&d.parcel) else {
                continue;
            };
            *season_area.entry((p, d.year, d.season)).or_insert(0.0) += d.area;
        }

        self.check_area(&season_area, &mut report.findings);
        self.check_seasons(&season_area, &mut report.findings);
        self.check_consecutive(decisions, &mut report.findings);
        self.check_legume_rotation(decisions, &mut report.findings);

        for v in &report.eligibility_violations {
            warn!(
                parcel = %v.parcel,
                year = v.year,
                season = %v.season,
                crop_id = v.crop_id,
                "种植决策不满足可种规则"
            );
        }
        if report.is_clean() {
            info!(decisions = decisions.len(), "结果自检通过");
        } else {
            warn!(
                decisions = decisions.len(),
                eligibility_violations = report.eligibility_violations.len(),
                findings = ?report.finding_counts(),
                "结果自检发现问题"
            );
        }

        report
    }

    fn check_eligibility(&self, decisions: &[PlantingDecision]) -> Vec<EligibilityViolation> {
        decisions
            .iter()
            .filter_map(|d| {
                let crop = self.dataset.crop(d.crop_id);
                let eligible = crop
                    .map(|c| EligibilityCore::is_crop_eligible(d.land_type, d.season, c))
                    .unwrap_or(false);
                (!eligible).then(|| EligibilityViolation {
                    parcel: d.parcel.clone(),
                    land_type: d.land_type,
                    year: d.year,
                    season: d.season,
                    crop_id: d.crop_id,
                    crop_name: crop.map(|c| c.name.clone()),
                    category: crop.map(|c| c.category),
                    area: d.area,
                })
            })
            .collect()
    }

    fn check_area(
        &self,
        season_area: &BTreeMap<(usize, i32, Season), f64>,
        findings: &mut Vec<AuditFinding>,
    ) {
        for (&(p, year, season), &planted) in season_area {
            let Some(parcel) = self.dataset.parcel(p) else {
                continue;
            };
            if planted > parcel.area + AREA_TOLERANCE {
                findings.push(AuditFinding::AreaOverflow {
                    parcel: parcel.name.clone(),
                    year,
                    season,
                    planted,
                    capacity: parcel.area,
                });
            }
        }
    }

    /// 水浇地单季/双季互斥 + 水浇地与大棚的双季对称
    fn check_seasons(
        &self,
        season_area: &BTreeMap<(usize, i32, Season), f64>,
        findings: &mut Vec<AuditFinding>,
    ) {
        let get = |p: usize, year: i32, season: Season| {
            season_area.get(&(p, year, season)).copied().unwrap_or(0.0)
        };

        for (p, parcel) in self.dataset.parcels().iter().enumerate() {
            if !parcel.land_type.supports_double_season() {
                continue;
            }
            for year in self.dataset.horizon().years() {
                let single = get(p, year, Season::Single);
                let first = get(p, year, Season::First);
                let second = get(p, year, Season::Second);

                if parcel.land_type == LandType::Irrigated
                    && single > AREA_EPSILON
                    && first.max(second) > AREA_EPSILON
                {
                    findings.push(AuditFinding::IrrigatedOverlap {
                        parcel: parcel.name.clone(),
                        year,
                        single_area: single,
                        double_area: first.max(second),
                    });
                }

                if (first - second).abs() > SYMMETRY_TOLERANCE {
                    findings.push(AuditFinding::SeasonImbalance {
                        parcel: parcel.name.clone(),
                        year,
                        first_area: first,
                        second_area: second,
                    });
                }
            }
        }
    }

    fn check_consecutive(&self, decisions: &[PlantingDecision], findings: &mut Vec<AuditFinding>) {
        let areas: BTreeMap<(&str, Season, CropId, i32), f64> = decisions
            .iter()
            .map(|d| ((d.parcel.as_str(), d.season, d.crop_id, d.year), d.area))
            .collect();
        let tolerance = self.profile.monoculture.pair_tolerance(AREA_EPSILON);

        for (&(parcel, season, crop_id, year), &area) in &areas {
            let Some(&next) = areas.get(&(parcel, season, crop_id, year + 1)) else {
                continue;
            };
            // 指示变量口径：相邻两年不得同时种植；容差口径：两年面积和不超过容差
            let measured = match self.profile.monoculture {
                MonocultureRule::Indicator => area.min(next),
                MonocultureRule::Tolerance { .. } => area + next,
            };
            if measured > tolerance + AREA_TOLERANCE {
                findings.push(AuditFinding::ConsecutiveReuse {
                    parcel: parcel.to_string(),
                    season,
                    crop_id,
                    year,
                    measured,
                    tolerance,
                });
            }
        }
    }

    /// 早期轮作窗口；只审计模型中确有豆类变量的地块
    fn check_legume_rotation(&self, decisions: &[PlantingDecision], findings: &mut Vec<AuditFinding>) {
        let rule = &self.profile.legume_rotation;
        let years: BTreeSet<i32> = self
            .dataset
            .horizon()
            .window(rule.early_window.0, rule.early_window.1)
            .into_iter()
            .collect();
        let (Some(&first), Some(&last)) = (years.first(), years.last()) else {
            return;
        };

        for (p, parcel) in self.dataset.parcels().iter().enumerate() {
            let applies = match rule.early_scope {
                LegumeScope::AllParcels => true,
                LegumeScope::WithoutHistory => !self.dataset.has_legume_history(&parcel.name),
            };
            let has_legume_vars = years
                .iter()
                .any(|&y| self.index.for_parcel_year(p, y).any(|c| c.is_legume));
            if !applies || !has_legume_vars {
                continue;
            }

            let legume_area: f64 = decisions
                .iter()
                .filter(|d| d.parcel == parcel.name && years.contains(&d.year))
                .filter(|d| self.dataset.crop(d.crop_id).map(|c| c.is_legume).unwrap_or(false))
                .map(|d| d.area)
                .sum();
            let required = rule.minimum_for(parcel.area);
            if legume_area + AREA_TOLERANCE < required {
                findings.push(AuditFinding::LegumeRotationShortfall {
                    parcel: parcel.name.clone(),
                    window: (first, last),
                    legume_area,
                    required,
                });
            }
        }
    }
}
