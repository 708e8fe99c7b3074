// ==========================================
// 农作物种植规划系统 - 模型构建器
// ==========================================
// 职责: 可行方案目录 + 数据集 + 方案配置 → 混合整数规划模型
// 红线: 三种方案共用一条构建路径；每次构建独占自己的变量与约束
// ==========================================

use crate::config::scenario_profile::ScenarioProfile;
use crate::domain::crop::CropId;
use crate::domain::dataset::Dataset;
use crate::domain::types::CropCategory;
use crate::engine::catalog::OptionCatalog;
use crate::engine::economics::{CoefficientTable, UnitEconomics};
use crate::engine::error::{PlanningError, PlanningResult};
use crate::engine::model::constraints::ConstraintWriter;
use crate::engine::model::index::{AreaCell, CellKey, VariableIndex};
use crate::engine::model::linear::{ConstraintFamily, LinearExpr, MipModel, VarId};
use crate::engine::relations::MarketCoefficients;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// 构建模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    /// 完整混合整数模型
    Primary,
    /// 仅线性约束的放松模型（主模型失败后使用）
    Relaxed,
}

/// 构建统计
#[derive(Debug, Clone, Serialize)]
pub struct BuildStats {
    pub mode: BuildMode,
    pub area_variables: usize,
    pub binary_variables: usize,
    pub constraints: usize,
    pub families: BTreeMap<ConstraintFamily, usize>,
    /// 因无可种豆类而跳过的轮作窗口
    pub skipped_legume_windows: usize,
}

/// 构建结果：模型 + 变量索引 + 各类指示变量
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub mode: BuildMode,
    pub model: MipModel,
    pub index: VariableIndex,
    /// 面积变量存储位置 → 种植指示变量
    pub planted: HashMap<usize, VarId>,
    /// (地块, 年份) → 水浇地单季选择变量
    pub use_single: BTreeMap<(usize, i32), VarId>,
    /// (作物, 年份) → 是否种植
    pub crop_indicators: BTreeMap<(CropId, i32), VarId>,
    pub stats: BuildStats,
}

// ==========================================
// ModelBuilder
// ==========================================
pub struct ModelBuilder<'a> {
    dataset: &'a Dataset,
    catalog: &'a OptionCatalog,
    coefficients: &'a CoefficientTable,
    profile: &'a ScenarioProfile,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(
        dataset: &'a Dataset,
        catalog: &'a OptionCatalog,
        coefficients: &'a CoefficientTable,
        profile: &'a ScenarioProfile,
    ) -> Self {
        Self {
            dataset,
            catalog,
            coefficients,
            profile,
        }
    }

    /// 构建模型
    ///
    /// # 步骤
    /// 1. 面积变量（地块 × 年份 × 该地块类型的可行方案）
    /// 2. 面积守恒 / 水浇地互斥 / 双季配对
    /// 3. 需求上限
    /// 4. 种植指示变量与最小种植面积
    /// 5. 连作约束
    /// 6. 豆类轮作
    /// 7. 多样性与大类覆盖
    /// 8. 集中度上限与豆类占比
    /// 9. 目标函数
    pub fn build(&self, mode: BuildMode) -> PlanningResult<BuiltModel> {
        let variant = self.profile.variant;
        let mut model = MipModel::new(format!("{}_{:?}", variant.as_str(), mode).to_lowercase());

        // 步骤1: 面积变量
        debug!(variant = %variant, mode = ?mode, "步骤1: 创建面积变量");
        let cells = self.create_area_cells(&mut model, mode);
        if cells.is_empty() {
            return Err(PlanningError::ModelBuild(format!(
                "方案 {} 没有任何可用的决策变量（检查可行方案与预期销量）",
                variant.as_str()
            )));
        }
        let index = VariableIndex::from_cells(cells);

        let mut writer = ConstraintWriter {
            model: &mut model,
            index: &index,
            dataset: self.dataset,
            profile: self.profile,
            mode,
        };

        // 步骤2: 面积守恒
        debug!("步骤2: 面积守恒与季次约束");
        let use_single = writer.area_conservation();

        // 步骤3: 需求上限
        debug!("步骤3: 需求上限");
        let demand_rows = writer.demand_ceiling();

        // 步骤4: 种植指示变量
        debug!("步骤4: 种植指示变量与最小种植面积");
        let planted = writer.patch_links();

        // 步骤5: 连作
        debug!("步骤5: 连作约束");
        let mono_rows = writer.monoculture(&planted);

        // 步骤6: 豆类轮作
        debug!("步骤6: 豆类轮作");
        let skipped_legume_windows = writer.legume_rotation();

        // 步骤7: 多样性
        debug!("步骤7: 多样性与大类覆盖");
        let crop_indicators = writer.diversity();

        // 步骤8: 集中度与豆类占比
        debug!("步骤8: 集中度上限与豆类占比");
        writer.concentration_caps();
        writer.legume_share();

        // 步骤9: 目标函数
        debug!("步骤9: 目标函数");
        let mut objective =
            LinearExpr::weighted(index.cells().map(|c| (c.var, c.objective_coef)));
        let bonus = self
            .profile
            .diversity
            .as_ref()
            .map(|d| d.bonus_per_crop)
            .unwrap_or(0.0);
        if bonus != 0.0 {
            for z in crop_indicators.values() {
                objective.add_term(*z, bonus);
            }
        }
        model.set_objective(objective);

        let stats = BuildStats {
            mode,
            area_variables: index.len(),
            binary_variables: model.num_binaries(),
            constraints: model.num_constraints(),
            families: model.family_counts(),
            skipped_legume_windows,
        };

        info!(
            variant = %variant,
            mode = ?mode,
            area_vars = stats.area_variables,
            binaries = stats.binary_variables,
            constraints = stats.constraints,
            demand_rows,
            monoculture_rows = mono_rows,
            "模型构建完成"
        );

        Ok(BuiltModel {
            mode,
            model,
            index,
            planted,
            use_single,
            crop_indicators,
            stats,
        })
    }

    /// 为每个 (地块, 年份, 可行方案) 创建面积变量
    fn create_area_cells(&self, model: &mut MipModel, mode: BuildMode) -> Vec<AreaCell> {
        let mut cells = Vec::new();
        let legume_bonus = match mode {
            BuildMode::Primary => self.profile.legume_bonus,
            BuildMode::Relaxed => self
                .profile
                .fallback
                .legume_bonus
                .unwrap_or(self.profile.legume_bonus),
        };

        for (p, parcel) in self.dataset.parcels().iter().enumerate() {
            for year in self.dataset.horizon().years() {
                for (opt_idx, option) in self.catalog.options_for_land(parcel.land_type) {
                    if self.profile.tradeable_only
                        && !OptionCatalog::is_tradeable(option, self.dataset)
                    {
                        continue;
                    }
                    let Some(crop) = self.dataset.crop(option.crop_id) else {
                        continue;
                    };

                    let economics = self.coefficients.economics(option, year);
                    let objective_coef = self.objective_coefficient(
                        &economics,
                        crop.category,
                        crop.is_legume,
                        legume_bonus,
                    );
                    let var = model.add_continuous(
                        format!(
                            "x_p{}_y{}_{}_c{}",
                            p,
                            year,
                            option.season.as_str(),
                            option.crop_id
                        ),
                        0.0,
                        Some(parcel.area),
                    );

                    cells.push(AreaCell {
                        key: CellKey {
                            parcel: p,
                            year,
                            season: option.season,
                            crop_id: option.crop_id,
                        },
                        var,
                        option: opt_idx,
                        category: crop.category,
                        is_legume: crop.is_legume,
                        economics,
                        objective_coef,
                    });
                }
            }
        }

        cells
    }

    /// 目标系数 = 亩利润 (+ 豆类奖励) (+ 规模经济 − 风险惩罚)
    fn objective_coefficient(
        &self,
        economics: &UnitEconomics,
        category: CropCategory,
        is_legume: bool,
        legume_bonus: f64,
    ) -> f64 {
        let mut coef = economics.unit_profit();
        if is_legume {
            coef += legume_bonus;
        }
        if let Some(adj) = self.profile.market_adjustment {
            coef += MarketCoefficients::scale_economy(category) * adj.scale_weight;
            coef -= MarketCoefficients::risk_factor(category) * adj.risk_weight;
        }
        coef
    }
}
