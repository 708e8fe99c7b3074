// ==========================================
// 农作物种植规划系统 - 规划编排器
// ==========================================
// 用途: 串联 目录 → 经济系数 → 建模 → 求解（失败则放松重解）→ 提取 → 自检 → 汇总
// 红线: 每次运行独占自己的模型与结果；数据集与目录只读共享
//       一个方案失败不阻断批量中的其他方案
// ==========================================

use crate::config::scenario_profile::{DriftModel, ScenarioProfile};
use crate::domain::dataset::Dataset;
use crate::domain::plan::{PlanRow, PlantingDecision};
use crate::domain::types::PlanningVariant;
use crate::engine::analysis::{
    advice_lines, correlation_benefits, risk_return, uncertainty_analysis, CorrelationBenefit,
    RiskReturn, UncertaintyScenario,
};
use crate::engine::catalog::{CatalogSummary, OptionCatalog};
use crate::engine::economics::CoefficientTable;
use crate::engine::error::{PlanningError, PlanningResult};
use crate::engine::extractor::ResultExtractor;
use crate::engine::model::builder::{BuildMode, BuildStats, BuiltModel, ModelBuilder};
use crate::engine::relations::CropRelations;
use crate::engine::solver::{MipSolver, SolveOutcome, SolverError};
use crate::engine::summary::{summarize, PlanSummary};
use crate::engine::validator::{SolutionValidator, ValidationReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

// ==========================================
// 运行元数据
// ==========================================

/// 求解状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// 完整混合整数模型求得最优解
    Optimal,
    /// 主模型失败，放松模型求得解
    RelaxedFallback,
}

/// 随机种子来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedSource {
    /// 方案未使用随机漂移
    NotUsed,
    Configured,
    /// 运行时抽取，结果不可复现
    Drawn,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub variant: PlanningVariant,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub seed: Option<u64>,
    pub seed_source: SeedSource,
    pub status: RunStatus,
    pub solver: String,
    pub objective: f64,
    /// 主模型失败原因（仅放松求解时）
    pub primary_failure: Option<String>,
    pub build_secs: f64,
    pub solve_secs: f64,
}

impl RunMetadata {
    /// run_id 前 8 位，用于输出目录名
    pub fn short_id(&self) -> String {
        self.run_id.simple().to_string()[..8].to_string()
    }
}

/// 方案附加分析
#[derive(Debug, Clone, Default, Serialize)]
pub struct VariantAnalyses {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<Vec<UncertaintyScenario>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<Vec<CorrelationBenefit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_return: Option<Vec<RiskReturn>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub advice: Vec<String>,
}

/// 一次完整运行的结果
#[derive(Debug, Clone, Serialize)]
pub struct PlanningRun {
    pub metadata: RunMetadata,
    pub profile: ScenarioProfile,
    pub catalog: CatalogSummary,
    pub build: BuildStats,
    #[serde(skip)]
    pub decisions: Vec<PlantingDecision>,
    #[serde(skip)]
    pub rows: Vec<PlanRow>,
    pub validation: ValidationReport,
    pub summary: PlanSummary,
    pub analyses: VariantAnalyses,
    /// 主模型的 LP 文本（开启导出时）
    #[serde(skip)]
    pub lp_text: Option<String>,
}

/// 批量运行中失败的一项
#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    pub run_id: Uuid,
    pub variant: PlanningVariant,
    pub error: String,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(Box<PlanningRun>),
    Failed(RunFailure),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn variant(&self) -> PlanningVariant {
        match self {
            RunOutcome::Completed(run) => run.metadata.variant,
            RunOutcome::Failed(f) => f.variant,
        }
    }
}

// ==========================================
// PlanningOrchestrator
// ==========================================

pub struct PlanningOrchestrator<'d, S>
where
    S: MipSolver,
{
    dataset: &'d Dataset,
    catalog: OptionCatalog,
    solver: S,
    export_lp: bool,
}

impl<'d, S> PlanningOrchestrator<'d, S>
where
    S: MipSolver,
{
    /// 创建编排器，并一次性构建可行方案目录
    pub fn new(dataset: &'d Dataset, solver: S) -> Self {
        Self {
            catalog: OptionCatalog::build(dataset),
            dataset,
            solver,
            export_lp: false,
        }
    }

    pub fn with_lp_export(mut self, export_lp: bool) -> Self {
        self.export_lp = export_lp;
        self
    }

    pub fn catalog(&self) -> &OptionCatalog {
        &self.catalog
    }

    /// 执行单个方案
    pub fn run(&self, profile: &ScenarioProfile) -> PlanningResult<PlanningRun> {
        self.run_with_id(profile, Uuid::new_v4())
    }

    /// 依次执行多个方案；任一方案失败只记录，不中断
    pub fn run_batch(&self, profiles: &[ScenarioProfile]) -> Vec<RunOutcome> {
        profiles
            .iter()
            .map(|profile| {
                let run_id = Uuid::new_v4();
                match self.run_with_id(profile, run_id) {
                    Ok(run) => RunOutcome::Completed(Box::new(run)),
                    Err(e) => {
                        error!(
                            run_id = %run_id,
                            variant = %profile.variant,
                            error = %e,
                            "方案运行失败"
                        );
                        RunOutcome::Failed(RunFailure {
                            run_id,
                            variant: profile.variant,
                            error: e.to_string(),
                        })
                    }
                }
            })
            .collect()
    }

    fn run_with_id(&self, profile: &ScenarioProfile, run_id: Uuid) -> PlanningResult<PlanningRun> {
        let started_at = Utc::now();
        info!(
            run_id = %run_id,
            variant = %profile.variant,
            parcels = self.dataset.parcels().len(),
            options = self.catalog.len(),
            "开始执行规划流程"
        );

        if self.catalog.is_empty() {
            return Err(PlanningError::ModelBuild(
                "可行种植方案目录为空".to_string(),
            ));
        }

        // ==========================================
        // 步骤1: 随机种子与经济系数
        // ==========================================
        debug!("步骤1: 生成经济系数");
        let (seed, seed_source) = resolve_seed(profile);
        let coefficients = match profile.drift_model {
            DriftModel::Flat => CoefficientTable::flat(),
            model => CoefficientTable::generate(
                self.dataset,
                model,
                &profile.market_trend,
                seed.unwrap_or_default(),
            ),
        };

        // ==========================================
        // 步骤2: 构建并求解主模型，失败则放松重解
        // ==========================================
        debug!("步骤2: 构建并求解");
        let builder = ModelBuilder::new(self.dataset, &self.catalog, &coefficients, profile);
        let build_start = Instant::now();
        let primary = builder.build(BuildMode::Primary)?;
        let mut build_secs = build_start.elapsed().as_secs_f64();
        let lp_text = self.export_lp.then(|| primary.model.to_lp());

        let (built, outcome, status, primary_failure) =
            match self.solve(&primary, Duration::from_secs(profile.time_limit_secs)) {
                Ok(outcome) => (primary, outcome, RunStatus::Optimal, None),
                Err(primary_err) => {
                    warn!(
                        run_id = %run_id,
                        variant = %profile.variant,
                        error = %primary_err,
                        "主模型求解失败，改用放松模型"
                    );
                    let relaxed_start = Instant::now();
                    let relaxed = builder.build(BuildMode::Relaxed)?;
                    build_secs += relaxed_start.elapsed().as_secs_f64();
                    let limit = Duration::from_secs(profile.fallback.time_limit_secs);
                    match self.solve(&relaxed, limit) {
                        Ok(outcome) => (
                            relaxed,
                            outcome,
                            RunStatus::RelaxedFallback,
                            Some(primary_err.to_string()),
                        ),
                        Err(relaxed_err) => {
                            error!(
                                run_id = %run_id,
                                variant = %profile.variant,
                                error = %relaxed_err,
                                "放松模型求解失败"
                            );
                            return Err(PlanningError::Infeasible {
                                primary: primary_err.to_string(),
                                relaxed: relaxed_err.to_string(),
                            });
                        }
                    }
                }
            };

        // ==========================================
        // 步骤3: 提取结果
        // ==========================================
        debug!("步骤3: 提取结果");
        let extraction = ResultExtractor::new(self.dataset, profile).extract(&built, &outcome.values);

        // ==========================================
        // 步骤4: 结果自检
        // ==========================================
        debug!("步骤4: 结果自检");
        let validation =
            SolutionValidator::new(self.dataset, profile, &built.index).validate(&extraction.decisions);

        // ==========================================
        // 步骤5: 汇总与附加分析
        // ==========================================
        debug!("步骤5: 汇总与分析");
        let summary = summarize(self.dataset, profile, &extraction.rows);
        let analyses = self.analyses(profile.variant, &extraction.rows);

        let metadata = RunMetadata {
            run_id,
            variant: profile.variant,
            started_at,
            finished_at: Utc::now(),
            seed,
            seed_source,
            status,
            solver: self.solver.name().to_string(),
            objective: outcome.objective,
            primary_failure,
            build_secs,
            solve_secs: outcome.elapsed.as_secs_f64(),
        };

        info!(
            run_id = %run_id,
            variant = %profile.variant,
            status = ?status,
            objective = outcome.objective,
            rows = extraction.rows.len(),
            total_profit = summary.total_profit,
            utilization_pct = summary.utilization_pct,
            "规划流程完成"
        );

        Ok(PlanningRun {
            metadata,
            profile: profile.clone(),
            catalog: self.catalog.summary(),
            build: built.stats.clone(),
            decisions: extraction.decisions,
            rows: extraction.rows,
            validation,
            summary,
            analyses,
            lp_text,
        })
    }

    fn solve(&self, built: &BuiltModel, limit: Duration) -> Result<SolveOutcome, SolverError> {
        self.solver.solve(&built.model, limit)
    }

    fn analyses(&self, variant: PlanningVariant, rows: &[PlanRow]) -> VariantAnalyses {
        match variant {
            PlanningVariant::Strict => VariantAnalyses {
                uncertainty: Some(uncertainty_analysis(rows, self.dataset.horizon().len())),
                ..VariantAnalyses::default()
            },
            PlanningVariant::Advanced => {
                let relations = CropRelations::build(self.dataset);
                let correlation = correlation_benefits(rows, &relations);
                let risks = risk_return(rows);
                let advice = advice_lines(&risks, &correlation);
                VariantAnalyses {
                    uncertainty: None,
                    correlation: Some(correlation),
                    risk_return: Some(risks),
                    advice,
                }
            }
            PlanningVariant::BaseScenarioOne | PlanningVariant::BaseScenarioTwo => {
                VariantAnalyses::default()
            }
        }
    }
}

/// 随机漂移方案：使用配置的种子，未配置时抽取一个并告警
fn resolve_seed(profile: &ScenarioProfile) -> (Option<u64>, SeedSource) {
    if profile.drift_model != DriftModel::Stochastic {
        return (None, SeedSource::NotUsed);
    }
    match profile.random_seed {
        Some(seed) => (Some(seed), SeedSource::Configured),
        None => {
            let seed = rand::random::<u64>();
            warn!(
                variant = %profile.variant,
                seed,
                "未配置随机种子，本次结果不可复现（种子已记录在输出中）"
            );
            (Some(seed), SeedSource::Drawn)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_seed() {
        assert_eq!(
            resolve_seed(&ScenarioProfile::strict()),
            (None, SeedSource::NotUsed)
        );
        assert_eq!(
            resolve_seed(&ScenarioProfile::advanced(Some(9))),
            (Some(9), SeedSource::Configured)
        );
        let (seed, source) = resolve_seed(&ScenarioProfile::advanced(None));
        assert!(seed.is_some());
        assert_eq!(source, SeedSource::Drawn);
    }
}
