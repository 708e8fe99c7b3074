// ==========================================
// 农作物种植规划系统 - 约束族生成
// ==========================================
// 职责: 面积守恒 / 水浇地单双季互斥 / 季次配对 / 需求上限 / 连作 /
//       最小种植面积 / 豆类轮作 / 多样性 / 集中度上限 / 豆类占比
// 红线: Big-M 联动只通过本文件的辅助函数生成
// ==========================================

use crate::config::scenario_profile::{DemandRule, LegumeScope, MonocultureRule, ScenarioProfile};
use crate::domain::crop::CropId;
use crate::domain::dataset::Dataset;
use crate::domain::types::{CropCategory, LandType, MarketGroup, Season};
use crate::engine::eligibility_core::EligibilityCore;
use crate::engine::model::builder::BuildMode;
use crate::engine::model::index::{AreaCell, VariableIndex};
use crate::engine::model::linear::{ConstraintFamily, LinearExpr, MipModel, Sense, VarId};
use crate::engine::relations::MarketCoefficients;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

// ==========================================
// Big-M 联动辅助
// ==========================================

/// 指示变量为 0 时表达式被压到 0: expr ≤ M·z
pub fn link_upper(
    model: &mut MipModel,
    name: String,
    family: ConstraintFamily,
    expr: LinearExpr,
    indicator: VarId,
    big_m: f64,
) {
    let mut e = expr;
    e.add_term(indicator, -big_m);
    model.add_constraint(name, family, e, Sense::Le, 0.0);
}

/// 指示变量为 1 时表达式至少为 min: expr ≥ min·z
pub fn link_lower(
    model: &mut MipModel,
    name: String,
    family: ConstraintFamily,
    expr: LinearExpr,
    indicator: VarId,
    min: f64,
) {
    let mut e = expr;
    e.add_term(indicator, -min);
    model.add_constraint(name, family, e, Sense::Ge, 0.0);
}

/// 指示变量为 1 时表达式被压到 0: expr ≤ M·(1 − z)
pub fn link_upper_complement(
    model: &mut MipModel,
    name: String,
    family: ConstraintFamily,
    expr: LinearExpr,
    indicator: VarId,
    big_m: f64,
) {
    let mut e = expr;
    e.add_term(indicator, big_m);
    model.add_constraint(name, family, e, Sense::Le, big_m);
}

fn sum_of<'a, I: IntoIterator<Item = &'a AreaCell>>(cells: I) -> LinearExpr {
    LinearExpr::sum(cells.into_iter().map(|c| c.var))
}

// ==========================================
// ConstraintWriter
// ==========================================
pub(crate) struct ConstraintWriter<'m> {
    pub model: &'m mut MipModel,
    pub index: &'m VariableIndex,
    pub dataset: &'m Dataset,
    pub profile: &'m ScenarioProfile,
    pub mode: BuildMode,
}

impl<'m> ConstraintWriter<'m> {
    fn is_primary(&self) -> bool {
        self.mode == BuildMode::Primary
    }

    /// 面积守恒 + 水浇地单双季互斥 + 双季面积配对
    ///
    /// # 返回
    /// 水浇地选择变量 use_single[(地块, 年份)]（仅主模型）
    pub fn area_conservation(&mut self) -> BTreeMap<(usize, i32), VarId> {
        let mut use_single = BTreeMap::new();
        let years: Vec<i32> = self.dataset.horizon().years().collect();

        for (p, parcel) in self.dataset.parcels().iter().enumerate() {
            let land_type = parcel.land_type;
            for &year in &years {
                let mut by_season: BTreeMap<Season, LinearExpr> = BTreeMap::new();
                for &season in EligibilityCore::seasons_for(land_type) {
                    let expr = sum_of(self.index.for_parcel_year_season(p, year, season));
                    if expr.is_empty() {
                        continue;
                    }
                    self.model.add_constraint(
                        format!("area_p{}_y{}_{}", p, year, season.as_str()),
                        ConstraintFamily::AreaConservation,
                        expr.clone(),
                        Sense::Le,
                        parcel.area,
                    );
                    by_season.insert(season, expr);
                }

                let single = by_season.get(&Season::Single);
                let first = by_season.get(&Season::First);
                let second = by_season.get(&Season::Second);

                if land_type == LandType::Irrigated
                    && single.is_some()
                    && (first.is_some() || second.is_some())
                {
                    let single = single.cloned().unwrap_or_default();
                    if self.is_primary() {
                        let u = self.model.add_binary(format!("u_p{}_y{}", p, year));
                        use_single.insert((p, year), u);
                        link_upper(
                            self.model,
                            format!("irr_single_p{}_y{}", p, year),
                            ConstraintFamily::IrrigatedChoice,
                            single,
                            u,
                            parcel.area,
                        );
                        for (season, expr) in [(Season::First, first), (Season::Second, second)] {
                            if let Some(expr) = expr {
                                link_upper_complement(
                                    self.model,
                                    format!("irr_{}_p{}_y{}", season.as_str(), p, year),
                                    ConstraintFamily::IrrigatedChoice,
                                    expr.clone(),
                                    u,
                                    parcel.area,
                                );
                            }
                        }
                    } else {
                        // 放松模型：单季与任一双季共享地块面积
                        for (season, expr) in [(Season::First, first), (Season::Second, second)] {
                            if let Some(expr) = expr {
                                let mut e = single.clone();
                                e.add_inplace(expr);
                                self.model.add_constraint(
                                    format!("irr_share_{}_p{}_y{}", season.as_str(), p, year),
                                    ConstraintFamily::IrrigatedChoice,
                                    e,
                                    Sense::Le,
                                    parcel.area,
                                );
                            }
                        }
                    }
                }

                if self.profile.pair_double_seasons
                    && land_type.supports_double_season()
                    && (first.is_some() || second.is_some())
                {
                    let mut e = first.cloned().unwrap_or_default();
                    if let Some(second) = second {
                        e.sub_inplace(second);
                    }
                    self.model.add_constraint(
                        format!("pair_p{}_y{}", p, year),
                        ConstraintFamily::SeasonPairing,
                        e,
                        Sense::Eq,
                        0.0,
                    );
                }
            }
        }

        use_single
    }

    /// 需求上限（产量 = 面积 × 漂移后亩产）
    pub fn demand_ceiling(&mut self) -> usize {
        let scale = if self.is_primary() {
            1.0
        } else {
            self.profile.fallback.demand_scale
        };
        let mut added = 0;

        match &self.profile.demand_rule {
            DemandRule::HorizonTotal { factor } => {
                let crops: Vec<CropId> = {
                    let mut ids: Vec<CropId> = self.index.crop_years().map(|(c, _)| c).collect();
                    ids.dedup();
                    ids
                };
                for crop_id in crops {
                    let demand = self.dataset.demand(crop_id);
                    if demand <= 0.0 {
                        continue;
                    }
                    let expr = LinearExpr::weighted(
                        self.index
                            .for_crop(crop_id)
                            .map(|c| (c.var, c.economics.yield_per_mu)),
                    );
                    self.model.add_constraint(
                        format!("demand_c{}", crop_id),
                        ConstraintFamily::DemandCeiling,
                        expr,
                        Sense::Le,
                        factor * demand * scale,
                    );
                    added += 1;
                }
            }
            DemandRule::YearlyDrift { .. } | DemandRule::YearlyElastic { .. } => {
                let keys: Vec<(CropId, i32)> = self.index.crop_years().collect();
                for (crop_id, year) in keys {
                    let demand = self.dataset.demand(crop_id);
                    if demand <= 0.0 {
                        continue;
                    }
                    let cells: Vec<&AreaCell> = self.index.for_crop_year(crop_id, year).collect();
                    let Some(sample) = cells.first() else {
                        continue;
                    };
                    let limit = self.yearly_limit(crop_id, sample, demand) * scale;
                    let expr = LinearExpr::weighted(
                        cells.iter().map(|c| (c.var, c.economics.yield_per_mu)),
                    );
                    self.model.add_constraint(
                        format!("demand_c{}_y{}", crop_id, year),
                        ConstraintFamily::DemandCeiling,
                        expr,
                        Sense::Le,
                        limit,
                    );
                    added += 1;
                }
            }
        }

        added
    }

    /// 逐年需求上限（不含放松倍数）
    fn yearly_limit(&self, crop_id: CropId, sample: &AreaCell, demand: f64) -> f64 {
        let m = sample.economics.multipliers;
        match &self.profile.demand_rule {
            DemandRule::YearlyDrift { other_factor } => {
                let growth = self
                    .dataset
                    .crop(crop_id)
                    .map(|c| self.profile.market_trend.is_growth_crop(&c.name))
                    .unwrap_or(false);
                if growth {
                    demand * m.sales
                } else {
                    demand * other_factor
                }
            }
            DemandRule::YearlyElastic { headroom } => {
                demand
                    * m.sales
                    * MarketCoefficients::elastic_demand_factor(sample.category, m.price)
                    * headroom
            }
            DemandRule::HorizonTotal { factor } => demand * factor,
        }
    }

    /// 种植指示变量 + 最小种植面积
    ///
    /// 主模型中，设置了最小面积或采用指示变量连作规则时建立
    pub fn patch_links(&mut self) -> HashMap<usize, VarId> {
        let mut planted = HashMap::new();
        let needs_indicator = matches!(self.profile.monoculture, MonocultureRule::Indicator);
        if !self.is_primary() || (self.profile.min_patch_area.is_none() && !needs_indicator) {
            return planted;
        }

        let parcels = self.dataset.parcels();
        for cell in self.index.cells() {
            let k = cell.key;
            let Some(pos) = self.index.position(&k) else {
                continue;
            };
            let area = parcels[k.parcel].area;
            let b = self.model.add_binary(format!(
                "b_p{}_y{}_{}_c{}",
                k.parcel,
                k.year,
                k.season.as_str(),
                k.crop_id
            ));
            link_upper(
                self.model,
                format!("patch_max_p{}_y{}_{}_c{}", k.parcel, k.year, k.season.as_str(), k.crop_id),
                ConstraintFamily::PatchLink,
                LinearExpr::from_var(cell.var, 1.0),
                b,
                area,
            );
            if let Some(min_patch) = self.profile.min_patch_area {
                link_lower(
                    self.model,
                    format!("patch_min_p{}_y{}_{}_c{}", k.parcel, k.year, k.season.as_str(), k.crop_id),
                    ConstraintFamily::PatchLink,
                    LinearExpr::from_var(cell.var, 1.0),
                    b,
                    min_patch.min(area),
                );
            }
            planted.insert(pos, b);
        }

        planted
    }

    /// 同一 (地块, 季次, 作物) 不得连续两年种植
    pub fn monoculture(&mut self, planted: &HashMap<usize, VarId>) -> usize {
        let mut added = 0;
        for cell in self.index.cells() {
            let Some(next) = self.index.next_year(&cell.key) else {
                continue;
            };
            let k = cell.key;
            let name = format!(
                "mono_p{}_{}_c{}_y{}",
                k.parcel,
                k.season.as_str(),
                k.crop_id,
                k.year
            );

            match self.profile.monoculture {
                MonocultureRule::Indicator => {
                    let (Some(pos), Some(next_pos)) =
                        (self.index.position(&k), self.index.position(&next.key))
                    else {
                        continue;
                    };
                    let (Some(&b0), Some(&b1)) = (planted.get(&pos), planted.get(&next_pos)) else {
                        continue;
                    };
                    self.model.add_constraint(
                        name,
                        ConstraintFamily::Monoculture,
                        LinearExpr::sum([b0, b1]),
                        Sense::Le,
                        1.0,
                    );
                }
                MonocultureRule::Tolerance { max_pair_area } => {
                    self.model.add_constraint(
                        name,
                        ConstraintFamily::Monoculture,
                        LinearExpr::sum([cell.var, next.var]),
                        Sense::Le,
                        max_pair_area,
                    );
                }
            }
            added += 1;
        }
        added
    }

    /// 豆类轮作窗口
    ///
    /// # 返回
    /// 因地块在窗口内没有任何豆类变量而跳过的窗口数
    pub fn legume_rotation(&mut self) -> usize {
        if !self.is_primary() {
            return 0;
        }

        let rule = self.profile.legume_rotation.clone();
        let horizon = *self.dataset.horizon();
        let early_years = horizon.window(rule.early_window.0, rule.early_window.1);
        let late_years = horizon.window(rule.late_window.0, rule.late_window.1);
        let mut skipped = 0;

        for (p, parcel) in self.dataset.parcels().iter().enumerate() {
            let minimum = rule.minimum_for(parcel.area);
            let early_applies = match rule.early_scope {
                LegumeScope::AllParcels => true,
                LegumeScope::WithoutHistory => {
                    !self.dataset.has_legume_history(&parcel.name)
                }
            };

            let windows = [
                ("early", &early_years, early_applies),
                ("late", &late_years, true),
            ];
            for (label, years, applies) in windows {
                if !applies {
                    continue;
                }
                let expr = LinearExpr::sum(
                    years
                        .iter()
                        .flat_map(|&y| self.index.for_parcel_year(p, y))
                        .filter(|c| c.is_legume)
                        .map(|c| c.var),
                );
                if expr.is_empty() {
                    debug!(parcel = %parcel.name, window = label, "地块无可种豆类，跳过轮作约束");
                    skipped += 1;
                    continue;
                }
                self.model.add_constraint(
                    format!("legume_{}_p{}", label, p),
                    ConstraintFamily::LegumeRotation,
                    expr,
                    Sense::Ge,
                    minimum,
                );
            }
        }

        skipped
    }

    /// 作物-年份指示变量 + 每年种数下限 + 市场大类覆盖
    pub fn diversity(&mut self) -> BTreeMap<(CropId, i32), VarId> {
        let mut indicators = BTreeMap::new();
        let Some(rule) = self.profile.diversity.clone() else {
            return indicators;
        };
        if !self.is_primary() {
            return indicators;
        }

        let parcels = self.dataset.parcels();
        let keys: Vec<(CropId, i32)> = self.index.crop_years().collect();
        for (crop_id, year) in keys {
            let cells: Vec<&AreaCell> = self.index.for_crop_year(crop_id, year).collect();
            let big_m: f64 = cells.iter().map(|c| parcels[c.key.parcel].area).sum();
            let z = self.model.add_binary(format!("z_c{}_y{}", crop_id, year));
            link_upper(
                self.model,
                format!("div_max_c{}_y{}", crop_id, year),
                ConstraintFamily::DiversityLink,
                sum_of(cells.iter().copied()),
                z,
                big_m,
            );
            link_lower(
                self.model,
                format!("div_min_c{}_y{}", crop_id, year),
                ConstraintFamily::DiversityLink,
                sum_of(cells.iter().copied()),
                z,
                rule.indicator_min_area,
            );
            indicators.insert((crop_id, year), z);
        }

        for year in self.dataset.horizon().years() {
            let year_vars: Vec<(CropId, VarId)> = indicators
                .iter()
                .filter(|((_, y), _)| *y == year)
                .map(|((c, _), v)| (*c, *v))
                .collect();

            if rule.min_distinct_crops > 0 {
                if year_vars.len() < rule.min_distinct_crops {
                    warn!(
                        year,
                        available = year_vars.len(),
                        required = rule.min_distinct_crops,
                        "可种作物数少于多样性下限，主模型将不可行"
                    );
                }
                self.model.add_constraint(
                    format!("div_floor_y{}", year),
                    ConstraintFamily::DiversityFloor,
                    LinearExpr::sum(year_vars.iter().map(|(_, v)| *v)),
                    Sense::Ge,
                    rule.min_distinct_crops as f64,
                );
            }

            for group in &rule.required_groups {
                let expr = LinearExpr::sum(
                    year_vars
                        .iter()
                        .filter(|(c, _)| self.group_of(*c) == Some(*group))
                        .map(|(_, v)| *v),
                );
                if expr.is_empty() {
                    warn!(year, group = ?group, "该年没有此大类的可种作物");
                }
                self.model.add_constraint(
                    format!("cover_{:?}_y{}", group, year).to_lowercase(),
                    ConstraintFamily::GroupCoverage,
                    expr,
                    Sense::Ge,
                    1.0,
                );
            }
        }

        indicators
    }

    fn group_of(&self, crop_id: CropId) -> Option<MarketGroup> {
        self.dataset
            .crop(crop_id)
            .map(|c| c.category.market_group())
    }

    /// 单作物 / 食用菌 面积上限（相对总耕地）
    pub fn concentration_caps(&mut self) -> usize {
        let Some(cap) = self.profile.concentration else {
            return 0;
        };
        if !self.is_primary() {
            return 0;
        }
        let total = self.dataset.total_area();
        let mut added = 0;

        let keys: Vec<(CropId, i32)> = self.index.crop_years().collect();
        for (crop_id, year) in keys {
            self.model.add_constraint(
                format!("cap_c{}_y{}", crop_id, year),
                ConstraintFamily::ConcentrationCap,
                sum_of(self.index.for_crop_year(crop_id, year)),
                Sense::Le,
                cap.single_crop_share * total,
            );
            added += 1;
        }

        for year in self.dataset.horizon().years() {
            let expr = sum_of(
                self.index
                    .for_year(year)
                    .filter(|c| c.category == CropCategory::Mushroom),
            );
            if expr.is_empty() {
                continue;
            }
            self.model.add_constraint(
                format!("cap_mushroom_y{}", year),
                ConstraintFamily::ConcentrationCap,
                expr,
                Sense::Le,
                cap.mushroom_share * total,
            );
            added += 1;
        }

        added
    }

    /// 豆类面积占当年种植面积的比例区间
    pub fn legume_share(&mut self) -> usize {
        let Some(band) = self.profile.legume_share else {
            return 0;
        };
        if !self.is_primary() {
            return 0;
        }
        let mut added = 0;

        for year in self.dataset.horizon().years() {
            let cells: Vec<&AreaCell> = self.index.for_year(year).collect();
            if cells.is_empty() {
                continue;
            }
            let share_expr = |share: f64| {
                LinearExpr::weighted(cells.iter().map(|c| {
                    let legume = if c.is_legume { 1.0 } else { 0.0 };
                    (c.var, legume - share)
                }))
            };
            self.model.add_constraint(
                format!("legume_share_min_y{}", year),
                ConstraintFamily::LegumeShare,
                share_expr(band.min_share),
                Sense::Ge,
                0.0,
            );
            self.model.add_constraint(
                format!("legume_share_max_y{}", year),
                ConstraintFamily::LegumeShare,
                share_expr(band.max_share),
                Sense::Le,
                0.0,
            );
            added += 2;
        }

        added
    }
}
