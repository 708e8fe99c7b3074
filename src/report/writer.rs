// ==========================================
// 农作物种植规划系统 - 结果输出
// ==========================================
// 职责: 每次运行写出一个目录 <out>/<variant>_<run_id8>/
//       plan.csv / yearly_summary.csv / crop_summary.csv / run_summary.json [/ model.lp]
// 红线: 只输出，不修改结果
// ==========================================

use crate::domain::plan::PlanRow;
use crate::engine::error::{PlanningError, PlanningResult};
use crate::engine::orchestrator::{PlanningRun, RunFailure, RunOutcome};
use crate::engine::summary::{CropSummary, YearlySummary};
use csv::Writer;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const PLAN_FILE: &str = "plan.csv";
pub const YEARLY_SUMMARY_FILE: &str = "yearly_summary.csv";
pub const CROP_SUMMARY_FILE: &str = "crop_summary.csv";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";
pub const LP_FILE: &str = "model.lp";
pub const FAILURES_FILE: &str = "failures.json";

// CSV 表头（中文列名）
const PLAN_HEADER: &[&str] = &[
    "年份",
    "地块名称",
    "地块类型",
    "种植季次",
    "作物编号",
    "作物名称",
    "作物类型",
    "是否豆类",
    "种植面积/亩",
    "产量/斤",
    "成本/元",
    "收入/元",
    "利润/元",
    "规模效应/%",
    "弹性效应/%",
    "风险调整/元",
];

const YEARLY_HEADER: &[&str] = &[
    "年份",
    "种植面积/亩",
    "总产量/斤",
    "总成本/元",
    "总收入/元",
    "总利润/元",
    "作物种类数",
];

const CROP_HEADER: &[&str] = &[
    "作物编号",
    "作物名称",
    "作物类型",
    "是否豆类",
    "种植面积/亩",
    "总产量/斤",
    "总成本/元",
    "总收入/元",
    "总利润/元",
    "利润率/%",
];

fn plan_row(row: &PlanRow) -> Vec<String> {
    let optional = |v: Option<f64>| v.map(|x| format!("{:.1}", x)).unwrap_or_default();
    vec![
        row.year.to_string(),
        row.parcel.clone(),
        row.land_type.title_cn().to_string(),
        row.season.title_cn().to_string(),
        row.crop_id.to_string(),
        row.crop_name.clone(),
        row.category.title_cn().to_string(),
        yes_no(row.is_legume),
        format!("{:.2}", row.area),
        format!("{:.1}", row.production),
        format!("{:.1}", row.cost),
        format!("{:.1}", row.revenue),
        format!("{:.1}", row.profit),
        optional(row.scale_effect_pct),
        optional(row.elasticity_effect_pct),
        optional(row.risk_adjustment),
    ]
}

fn yearly_row(s: &YearlySummary) -> Vec<String> {
    vec![
        s.year.to_string(),
        format!("{:.2}", s.planted_area),
        format!("{:.1}", s.production),
        format!("{:.1}", s.cost),
        format!("{:.1}", s.revenue),
        format!("{:.1}", s.profit),
        s.distinct_crops.to_string(),
    ]
}

fn crop_row(s: &CropSummary) -> Vec<String> {
    vec![
        s.crop_id.to_string(),
        s.crop_name.clone(),
        s.category.title_cn().to_string(),
        yes_no(s.is_legume),
        format!("{:.2}", s.area),
        format!("{:.1}", s.production),
        format!("{:.1}", s.cost),
        format!("{:.1}", s.revenue),
        format!("{:.1}", s.profit),
        format!("{:.1}", s.profit_margin_pct),
    ]
}

fn yes_no(flag: bool) -> String {
    if flag { "是" } else { "否" }.to_string()
}

/// 批量输出结果
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub run_dirs: Vec<PathBuf>,
    pub failures_file: Option<PathBuf>,
}

// ==========================================
// ReportWriter
// ==========================================
pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// 单次运行的输出目录
    pub fn run_dir(&self, run: &PlanningRun) -> PathBuf {
        self.out_dir.join(format!(
            "{}_{}",
            run.metadata.variant.as_str(),
            run.metadata.short_id()
        ))
    }

    /// 写出一次运行
    ///
    /// # 返回
    /// 运行目录路径
    pub fn write_run(&self, run: &PlanningRun) -> PlanningResult<PathBuf> {
        let dir = self.run_dir(run);
        fs::create_dir_all(&dir)?;

        write_csv(&dir.join(PLAN_FILE), PLAN_HEADER, run.rows.iter().map(plan_row))?;
        write_csv(
            &dir.join(YEARLY_SUMMARY_FILE),
            YEARLY_HEADER,
            run.summary.yearly.iter().map(yearly_row),
        )?;
        write_csv(
            &dir.join(CROP_SUMMARY_FILE),
            CROP_HEADER,
            run.summary.crops.iter().map(crop_row),
        )?;

        let json = serde_json::to_string_pretty(run)?;
        fs::write(dir.join(RUN_SUMMARY_FILE), json)?;

        if let Some(lp) = &run.lp_text {
            fs::write(dir.join(LP_FILE), lp)?;
        }

        info!(
            variant = %run.metadata.variant,
            run_id = %run.metadata.run_id,
            rows = run.rows.len(),
            dir = %dir.display(),
            "运行结果已写出"
        );
        Ok(dir)
    }

    /// 写出批量中失败的运行；无失败时不建文件
    pub fn write_failures(&self, failures: &[RunFailure]) -> PlanningResult<Option<PathBuf>> {
        if failures.is_empty() {
            return Ok(None);
        }
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(FAILURES_FILE);
        fs::write(&path, serde_json::to_string_pretty(failures)?)?;
        warn!(failures = failures.len(), path = %path.display(), "存在失败的运行");
        Ok(Some(path))
    }

    /// 写出整批结果：成功的逐个写目录，失败的汇总写 failures.json
    pub fn write_outcomes(&self, outcomes: &[RunOutcome]) -> PlanningResult<BatchReport> {
        let mut report = BatchReport::default();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                RunOutcome::Completed(run) => report.run_dirs.push(self.write_run(run)?),
                RunOutcome::Failed(failure) => failures.push(failure.clone()),
            }
        }
        report.failures_file = self.write_failures(&failures)?;
        Ok(report)
    }
}

fn write_csv<I>(path: &Path, header: &[&str], rows: I) -> PlanningResult<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let file = File::create(path)?;
    let mut wtr = Writer::from_writer(file);
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    wtr.flush()
        .map_err(|e| PlanningError::Report(format!("{}: {}", path.display(), e)))?;
    Ok(())
}
