// ==========================================
// 农作物种植规划系统 - 命令行入口
// ==========================================
// 用法:
//   crop-planner run --data <dir> [--variant <base-1|base-2|strict|advanced|all>]
//   crop-planner catalog --data <dir>
// ==========================================

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crop_rotation_planner::config::RunConfig;
use crop_rotation_planner::engine::{OptionCatalog, RunOutcome};
use crop_rotation_planner::importer::CsvDatasetImporter;
use crop_rotation_planner::{logging, MicroLpSolver, PlanningOrchestrator, PlanningVariant, ReportWriter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crop-planner", version)]
#[command(about = "七年农作物种植规划（2024-2030）批量求解", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 求解一个或全部规划方案并写出结果
    Run(RunArgs),

    /// 打印可行种植方案目录概况
    Catalog {
        /// 数据目录
        #[arg(long)]
        data: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// 数据目录（parcels/crops/statistics/demand/prior_planting.csv）
    #[arg(long)]
    data: Option<PathBuf>,

    /// 规划方案；未给出时沿用配置文件中的方案列表
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// 随机种子（高级方案）
    #[arg(long)]
    seed: Option<u64>,

    /// 输出目录
    #[arg(long)]
    out: Option<PathBuf>,

    /// 运行配置文件（JSON）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 同时输出 model.lp
    #[arg(long, default_value = "false")]
    export_lp: bool,

    /// JSON 格式日志
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

impl RunArgs {
    /// 命令行参数只覆盖显式给出的项
    fn apply_to(&self, config: &mut RunConfig) {
        if let Some(data) = &self.data {
            config.data_dir = data.clone();
        }
        if let Some(out) = &self.out {
            config.out_dir = out.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(variant) = self.variant {
            config.variants = variant.variants();
        }
        config.export_lp |= self.export_lp;
        config.json_logs |= self.json_logs;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    #[value(name = "base-1")]
    Base1,
    #[value(name = "base-2")]
    Base2,
    Strict,
    Advanced,
    All,
}

impl VariantArg {
    fn variants(self) -> Vec<PlanningVariant> {
        match self {
            VariantArg::Base1 => vec![PlanningVariant::BaseScenarioOne],
            VariantArg::Base2 => vec![PlanningVariant::BaseScenarioTwo],
            VariantArg::Strict => vec![PlanningVariant::Strict],
            VariantArg::Advanced => vec![PlanningVariant::Advanced],
            VariantArg::All => PlanningVariant::ALL.to_vec(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let (mut run_config, source) = RunConfig::load(args.config.as_deref())?;
            args.apply_to(&mut run_config);

            if run_config.json_logs {
                logging::init_json();
            } else {
                logging::init();
            }
            tracing::info!(version = crop_rotation_planner::VERSION, config = ?source, "{}", crop_rotation_planner::APP_NAME);

            run(&run_config)
        }

        Commands::Catalog { data } => {
            logging::init();
            let dataset = CsvDatasetImporter::new()
                .load_with_summary(&data)
                .map(|(dataset, _)| dataset)
                .with_context(|| format!("导入数据失败: {}", data.display()))?;
            print_catalog(&OptionCatalog::build(&dataset));
            Ok(())
        }
    }
}

fn run(config: &RunConfig) -> Result<()> {
    let (dataset, dq) = CsvDatasetImporter::new()
        .load_with_summary(&config.data_dir)
        .with_context(|| format!("导入数据失败: {}", config.data_dir.display()))?;

    println!("数据集: {} 个地块, {} 种作物, {} 条统计", dq.parcels, dq.crops, dq.statistics);

    let orchestrator =
        PlanningOrchestrator::new(&dataset, MicroLpSolver).with_lp_export(config.export_lp);
    let outcomes = orchestrator.run_batch(&config.profiles());

    let writer = ReportWriter::new(&config.out_dir);
    let report = writer.write_outcomes(&outcomes)?;

    for outcome in &outcomes {
        match outcome {
            RunOutcome::Completed(run) => println!(
                "[{}] {:?} 目标值 {:.1}, 总利润 {:.1} 元, 利用率 {:.1}%, 自检问题 {}",
                run.metadata.variant.title_cn(),
                run.metadata.status,
                run.metadata.objective,
                run.summary.total_profit,
                run.summary.utilization_pct,
                run.validation.eligibility_violations.len() + run.validation.findings.len(),
            ),
            RunOutcome::Failed(f) => println!("[{}] 失败: {}", f.variant.title_cn(), f.error),
        }
    }
    for dir in &report.run_dirs {
        println!("输出: {}", dir.display());
    }

    let failed = outcomes.iter().filter(|o| !o.is_completed()).count();
    if failed > 0 {
        bail!("{} / {} 个方案运行失败", failed, outcomes.len());
    }
    Ok(())
}

fn print_catalog(catalog: &OptionCatalog) {
    let summary = catalog.summary();
    println!("可行种植方案: {} 个（其中合成 {} 个）", summary.total_options, summary.synthetic_options);
    println!("被过滤的统计行: {}", summary.rejected_statistics);
    for (land_type, count) in &summary.by_land_type {
        println!("  {}: {}", land_type.title_cn(), count);
    }
    for rejected in catalog.rejected() {
        println!(
            "  过滤: {} / {} / 作物 {}（{}）",
            rejected.land_type.title_cn(),
            rejected.season.title_cn(),
            rejected.crop_id,
            rejected.reason
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_run(args: &[&str]) -> RunArgs {
        let argv = ["crop-planner", "run"].iter().chain(args.iter()).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(run) => run,
            Commands::Catalog { .. } => panic!("应解析为 run 子命令"),
        }
    }

    #[test]
    fn test_config_variants_kept_without_flag() {
        let args = parse_run(&["--data", "d"]);
        assert_eq!(args.variant, None);

        let mut config = RunConfig {
            variants: vec![PlanningVariant::Strict],
            ..RunConfig::default()
        };
        args.apply_to(&mut config);
        assert_eq!(config.variants, vec![PlanningVariant::Strict]);
        assert_eq!(config.data_dir, PathBuf::from("d"));
    }

    #[test]
    fn test_variant_flag_overrides_config() {
        let args = parse_run(&["--variant", "base-2", "--seed", "9"]);
        assert_eq!(args.variant, Some(VariantArg::Base2));

        let mut config = RunConfig {
            variants: vec![PlanningVariant::Strict],
            ..RunConfig::default()
        };
        args.apply_to(&mut config);
        assert_eq!(config.variants, vec![PlanningVariant::BaseScenarioTwo]);
        assert_eq!(config.seed, Some(9));

        let all = parse_run(&["--variant", "all"]);
        all.apply_to(&mut config);
        assert_eq!(config.variants, PlanningVariant::ALL.to_vec());
    }
}
