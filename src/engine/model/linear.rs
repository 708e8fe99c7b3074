// ==========================================
// 农作物种植规划系统 - 线性模型表示
// ==========================================
// 职责: 变量 / 线性表达式 / 带族标签的约束 / 目标函数
//       求解前可检查、可计数、可导出 LP 文本
// ==========================================

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

const COEF_EPSILON: f64 = 1e-12;

/// 变量句柄（模型内下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarKind {
    Continuous,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDef {
    /// LP 安全的 ASCII 名称
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: Option<f64>,
}

// ==========================================
// LinearExpr
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: BTreeMap<VarId, f64>,
    constant: f64,
}

impl LinearExpr {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_const(v: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: v,
        }
    }

    pub fn from_var(var: VarId, coef: f64) -> Self {
        let mut e = Self::zero();
        e.add_term(var, coef);
        e
    }

    /// 变量和 Σ x
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self::weighted(vars.into_iter().map(|v| (v, 1.0)))
    }

    /// 加权和 Σ c·x
    pub fn weighted<I: IntoIterator<Item = (VarId, f64)>>(items: I) -> Self {
        let mut e = Self::zero();
        for (v, c) in items {
            e.add_term(v, c);
        }
        e
    }

    pub fn add_term(&mut self, var: VarId, coef: f64) {
        if coef.abs() <= COEF_EPSILON {
            return;
        }
        let entry = self.terms.entry(var).or_insert(0.0);
        *entry += coef;
        if entry.abs() <= COEF_EPSILON {
            self.terms.remove(&var);
        }
    }

    pub fn add_constant(&mut self, v: f64) {
        self.constant += v;
    }

    pub fn add_inplace(&mut self, other: &LinearExpr) {
        self.constant += other.constant;
        for (v, c) in &other.terms {
            self.add_term(*v, *c);
        }
    }

    pub fn sub_inplace(&mut self, other: &LinearExpr) {
        self.constant -= other.constant;
        for (v, c) in &other.terms {
            self.add_term(*v, -*c);
        }
    }

    pub fn scale(&self, k: f64) -> Self {
        let mut e = Self::from_const(self.constant * k);
        for (v, c) in &self.terms {
            e.add_term(*v, c * k);
        }
        e
    }

    pub fn terms(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.terms.iter().map(|(v, c)| (*v, *c))
    }

    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// 按变量取值求表达式值
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values.get(v.0).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

// ==========================================
// Constraint
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl Sense {
    pub fn symbol(&self) -> &'static str {
        match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "=",
        }
    }
}

/// 约束族（用于统计与按族检查）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    AreaConservation,
    IrrigatedChoice,
    SeasonPairing,
    DemandCeiling,
    Monoculture,
    LegumeRotation,
    PatchLink,
    DiversityLink,
    DiversityFloor,
    GroupCoverage,
    ConcentrationCap,
    LegumeShare,
}

impl ConstraintFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintFamily::AreaConservation => "area_conservation",
            ConstraintFamily::IrrigatedChoice => "irrigated_choice",
            ConstraintFamily::SeasonPairing => "season_pairing",
            ConstraintFamily::DemandCeiling => "demand_ceiling",
            ConstraintFamily::Monoculture => "monoculture",
            ConstraintFamily::LegumeRotation => "legume_rotation",
            ConstraintFamily::PatchLink => "patch_link",
            ConstraintFamily::DiversityLink => "diversity_link",
            ConstraintFamily::DiversityFloor => "diversity_floor",
            ConstraintFamily::GroupCoverage => "group_coverage",
            ConstraintFamily::ConcentrationCap => "concentration_cap",
            ConstraintFamily::LegumeShare => "legume_share",
        }
    }
}

/// 约束：expr (sense) rhs，常数项已并入 rhs
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub family: ConstraintFamily,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Le => lhs <= self.rhs + tolerance,
            Sense::Ge => lhs >= self.rhs - tolerance,
            Sense::Eq => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

// ==========================================
// MipModel
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct MipModel {
    name: String,
    variables: Vec<VarDef>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl MipModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_continuous(&mut self, name: impl Into<String>, lower: f64, upper: Option<f64>) -> VarId {
        self.push_var(VarDef {
            name: name.into(),
            kind: VarKind::Continuous,
            lower,
            upper,
        })
    }

    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.push_var(VarDef {
            name: name.into(),
            kind: VarKind::Binary,
            lower: 0.0,
            upper: Some(1.0),
        })
    }

    fn push_var(&mut self, def: VarDef) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(def);
        id
    }

    /// 添加约束；表达式中的常数项移到右端
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        family: ConstraintFamily,
        expr: LinearExpr,
        sense: Sense,
        rhs: f64,
    ) {
        let rhs = rhs - expr.constant();
        let mut expr = expr;
        expr.constant = 0.0;
        self.constraints.push(Constraint {
            name: name.into(),
            family,
            expr,
            sense,
            rhs,
        });
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn variables(&self) -> &[VarDef] {
        &self.variables
    }

    pub fn var(&self, id: VarId) -> Option<&VarDef> {
        self.variables.get(id.0)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn num_binaries(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.kind == VarKind::Binary)
            .count()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// 各约束族的约束条数
    pub fn family_counts(&self) -> BTreeMap<ConstraintFamily, usize> {
        let mut counts = BTreeMap::new();
        for c in &self.constraints {
            *counts.entry(c.family).or_insert(0) += 1;
        }
        counts
    }

    pub fn constraints_of(&self, family: ConstraintFamily) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.evaluate(values)
    }

    /// 返回在给定取值下不满足的约束
    pub fn violated(&self, values: &[f64], tolerance: f64) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(values, tolerance))
            .collect()
    }

    /// 导出 CPLEX LP 格式文本（供外部求解器复核）
    pub fn to_lp(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\\ {}", self.name);
        out.push_str("Maximize\n obj: ");
        out.push_str(&self.fmt_lin(&self.objective));
        out.push('\n');

        out.push_str("Subject To\n");
        for c in &self.constraints {
            let _ = writeln!(
                out,
                " {}: {} {} {}",
                c.name,
                self.fmt_lin(&c.expr),
                c.sense.symbol(),
                fmt_num(c.rhs)
            );
        }

        let bounded: Vec<&VarDef> = self
            .variables
            .iter()
            .filter(|v| v.kind == VarKind::Continuous && (v.lower != 0.0 || v.upper.is_some()))
            .collect();
        if !bounded.is_empty() {
            out.push_str("Bounds\n");
            for v in bounded {
                match v.upper {
                    Some(u) => {
                        let _ = writeln!(out, " {} <= {} <= {}", fmt_num(v.lower), v.name, fmt_num(u));
                    }
                    None => {
                        let _ = writeln!(out, " {} >= {}", v.name, fmt_num(v.lower));
                    }
                }
            }
        }

        let binaries: Vec<&VarDef> = self
            .variables
            .iter()
            .filter(|v| v.kind == VarKind::Binary)
            .collect();
        if !binaries.is_empty() {
            out.push_str("Binary\n");
            for b in binaries {
                let _ = writeln!(out, " {}", b.name);
            }
        }
        out.push_str("End\n");
        out
    }

    fn fmt_lin(&self, e: &LinearExpr) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(e.len());
        for (v, c) in e.terms() {
            let name = self
                .variables
                .get(v.0)
                .map(|d| d.name.as_str())
                .unwrap_or("?");
            if (c - 1.0).abs() < COEF_EPSILON {
                parts.push(format!("+ {}", name));
            } else if (c + 1.0).abs() < COEF_EPSILON {
                parts.push(format!("- {}", name));
            } else if c < 0.0 {
                parts.push(format!("- {} {}", fmt_num(-c), name));
            } else {
                parts.push(format!("+ {} {}", fmt_num(c), name));
            }
        }
        if parts.is_empty() {
            parts.push("0".to_string());
        }
        parts.join(" ")
    }
}

fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{:.6}", v)
    }
}
