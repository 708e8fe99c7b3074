// ==========================================
// 结果提取与自检集成测试
// ==========================================
// 职责: 提取为纯函数（重复提取结果一致）/ 求解结果通过自检 / 人工构造的坏决策被检出
// ==========================================

mod helpers;

use crop_rotation_planner::domain::{LandType, PlanningHorizon, PlantingDecision, Season};
use crop_rotation_planner::engine::model::linear::ConstraintFamily;
use crop_rotation_planner::engine::{
    AuditFinding, BuildMode, BuiltModel, CoefficientTable, MicroLpSolver, MipSolver, ModelBuilder,
    OptionCatalog, ResultExtractor, SolutionValidator,
};
use crop_rotation_planner::{Dataset, ScenarioProfile};
use helpers::test_data_builder::create_small_village_dataset;
use std::time::Duration;

fn short_village_dataset() -> Dataset {
    create_small_village_dataset().with_horizon(PlanningHorizon {
        reference_year: 2023,
        first_year: 2024,
        last_year: 2025,
    })
}

fn build_and_solve(ds: &Dataset, profile: &ScenarioProfile) -> (BuiltModel, Vec<f64>) {
    let catalog = OptionCatalog::build(ds);
    let coefficients = CoefficientTable::flat();
    let built = ModelBuilder::new(ds, &catalog, &coefficients, profile)
        .build(BuildMode::Primary)
        .expect("模型应可构建");
    let outcome = MicroLpSolver
        .solve(&built.model, Duration::from_secs(120))
        .expect("模型应可求解");
    (built, outcome.values)
}

fn decision(parcel: &str, land_type: LandType, year: i32, season: Season, crop_id: u32, area: f64) -> PlantingDecision {
    PlantingDecision {
        parcel: parcel.to_string(),
        land_type,
        year,
        season,
        crop_id,
        area,
    }
}

// ==========================================
// 提取
// ==========================================

#[test]
fn test_extraction_is_idempotent() {
    let ds = short_village_dataset();
    let profile = ScenarioProfile::base_scenario_two();
    let (built, values) = build_and_solve(&ds, &profile);

    let extractor = ResultExtractor::new(&ds, &profile);
    let first = extractor.extract(&built, &values);
    let second = extractor.extract(&built, &values);

    assert!(!first.rows.is_empty());
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.rows).unwrap(),
        serde_json::to_string(&second.rows).unwrap()
    );
}

#[test]
fn test_extracted_rows_respect_area_threshold_and_totals() {
    let ds = short_village_dataset();
    let profile = ScenarioProfile::base_scenario_one();
    let (built, values) = build_and_solve(&ds, &profile);
    let extraction = ResultExtractor::new(&ds, &profile).extract(&built, &values);

    for row in &extraction.rows {
        assert!(row.area > 0.0, "面积为零的行不应输出: {:?}", row);
        assert!(row.production >= 0.0);
    }
    for d in &extraction.decisions {
        assert!(d.area > 0.01);
    }

    let profit: f64 = extraction.rows.iter().map(|r| r.profit).sum();
    assert!((profit - extraction.total_profit).abs() < 1.0);
    assert!((extraction.total_revenue - extraction.total_cost - extraction.total_profit).abs() < 1.0);
}

// ==========================================
// 自检
// ==========================================

#[test]
fn test_solved_plan_passes_validation() {
    let ds = short_village_dataset();
    let profile = ScenarioProfile::base_scenario_one();
    let (built, values) = build_and_solve(&ds, &profile);
    let extraction = ResultExtractor::new(&ds, &profile).extract(&built, &values);

    let report = SolutionValidator::new(&ds, &profile, &built.index).validate(&extraction.decisions);
    assert_eq!(report.checked_decisions, extraction.decisions.len());
    assert!(report.is_clean(), "{:?}", report);
}

#[test]
fn test_solver_values_satisfy_every_model_row() {
    let ds = short_village_dataset();
    let profile = ScenarioProfile::base_scenario_one();
    let (built, values) = build_and_solve(&ds, &profile);

    let violated = built.model.violated(&values, 1e-6);
    assert!(violated.is_empty(), "{:?}", violated);

    // 把一个面积变量推到地块面积以上，面积守恒行必须被检出
    let cell = built.index.cells().next().unwrap();
    let parcel_area = ds.parcel(cell.key.parcel).unwrap().area;
    let mut broken = values.clone();
    broken[cell.var.0] += parcel_area + 1.0;
    let violated = built.model.violated(&broken, 1e-6);
    assert!(violated
        .iter()
        .any(|c| c.family == ConstraintFamily::AreaConservation));
}

#[test]
fn test_validator_flags_ineligible_and_overflowing_decisions() {
    let ds = short_village_dataset();
    let profile = ScenarioProfile::base_scenario_one();
    let (built, _) = build_and_solve(&ds, &profile);

    let decisions = vec![
        // 水稻种在平旱地
        decision("A1", LandType::Plain, 2024, Season::Single, 16, 4.0),
        // 超出地块面积
        decision("A1", LandType::Plain, 2024, Season::Single, 6, 8.0),
        decision("A1", LandType::Plain, 2025, Season::Single, 7, 10.0),
    ];
    let report = SolutionValidator::new(&ds, &profile, &built.index).validate(&decisions);

    assert!(!report.is_clean());
    assert_eq!(report.eligibility_violations.len(), 1);
    let violation = &report.eligibility_violations[0];
    assert_eq!(violation.parcel, "A1");
    assert_eq!(violation.crop_id, 16);
    assert_eq!(violation.crop_name.as_deref(), Some("水稻"));

    assert!(report.findings.iter().any(|f| matches!(
        f,
        AuditFinding::AreaOverflow { parcel, year: 2024, .. } if parcel == "A1"
    )));
    assert_eq!(report.finding_counts().get("area_overflow"), Some(&1));
}

#[test]
fn test_validator_flags_irrigated_overlap_and_consecutive_reuse() {
    let ds = short_village_dataset();
    let profile = ScenarioProfile::base_scenario_one();
    let (built, _) = build_and_solve(&ds, &profile);

    let decisions = vec![
        decision("D1", LandType::Irrigated, 2024, Season::Single, 16, 2.0),
        decision("D1", LandType::Irrigated, 2024, Season::First, 21, 3.0),
        decision("D1", LandType::Irrigated, 2024, Season::Second, 35, 2.0),
        decision("A1", LandType::Plain, 2024, Season::Single, 6, 5.0),
        decision("A1", LandType::Plain, 2025, Season::Single, 6, 5.0),
    ];
    let report = SolutionValidator::new(&ds, &profile, &built.index).validate(&decisions);
    let counts = report.finding_counts();

    assert!(report.eligibility_violations.is_empty());
    assert_eq!(counts.get("irrigated_overlap"), Some(&1));
    assert_eq!(counts.get("season_imbalance"), Some(&1));
    assert_eq!(counts.get("consecutive_reuse"), Some(&1));
}
