// ==========================================
// 农作物种植规划系统 - 求解器适配层
// ==========================================
// 职责: 将 MipModel 翻译为 good_lp 模型并调用纯 Rust 的 microlp 后端
// 红线: 在调用线程上单次阻塞求解，同一时刻只有一个求解；时限到达即返回（无用户取消）
// ==========================================

use crate::engine::model::linear::{LinearExpr, MipModel, Sense, VarKind};
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel, Variable, WithTimeLimit,
};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// 求解器错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("模型不可行")]
    Infeasible,

    #[error("模型无界")]
    Unbounded,

    #[error("求解超时（{limit_secs} 秒内无可行解）")]
    TimedOut { limit_secs: u64 },

    #[error("求解器内部错误: {0}")]
    Backend(String),
}

impl From<ResolutionError> for SolverError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::Infeasible => SolverError::Infeasible,
            ResolutionError::Unbounded => SolverError::Unbounded,
            other => SolverError::Backend(other.to_string()),
        }
    }
}

/// 求解结果
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// 按 VarId 下标排列的变量取值
    pub values: Vec<f64>,
    pub objective: f64,
    pub elapsed: Duration,
}

/// 求解器接口
pub trait MipSolver {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &MipModel, limit: Duration) -> Result<SolveOutcome, SolverError>;
}

// ==========================================
// MicroLpSolver
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MipSolver for MicroLpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    /// 在调用线程上阻塞求解，时限交给 microlp 自身的截止时间
    ///
    /// 返回时求解已结束，不存在后台残留的求解任务
    fn solve(&self, model: &MipModel, limit: Duration) -> Result<SolveOutcome, SolverError> {
        info!(
            solver = self.name(),
            model = model.name(),
            vars = model.num_vars(),
            binaries = model.num_binaries(),
            constraints = model.num_constraints(),
            limit_secs = limit.as_secs(),
            "开始求解"
        );
        solve_with_microlp(model, limit)
    }
}

/// 将后端错误归类；时限内没有可行解的中断记为超时
fn classify_resolution_error(err: ResolutionError, limit: Duration) -> SolverError {
    match err {
        ResolutionError::Other(msg) if msg.contains("Time limit") => {
            warn!(limit_secs = limit.as_secs(), "求解超时");
            SolverError::TimedOut {
                limit_secs: limit.as_secs(),
            }
        }
        other => SolverError::from(other),
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant());
    for (var, coef) in expr.terms() {
        out += handles[var.0] * coef;
    }
    out
}

fn solve_with_microlp(model: &MipModel, limit: Duration) -> Result<SolveOutcome, SolverError> {
    let started = Instant::now();

    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = model
        .variables()
        .iter()
        .map(|def| match def.kind {
            VarKind::Binary => vars.add(variable().binary()),
            VarKind::Continuous => {
                let mut v = variable().min(def.lower);
                if let Some(upper) = def.upper {
                    v = v.max(upper);
                }
                vars.add(v)
            }
        })
        .collect();

    let objective = to_expression(model.objective(), &handles);
    let mut problem = vars
        .maximise(objective)
        .using(good_lp::microlp)
        .with_time_limit(limit.as_secs_f64());

    for c in model.constraints() {
        let lhs = to_expression(&c.expr, &handles);
        let constraint = match c.sense {
            Sense::Le => constraint!(lhs <= c.rhs),
            Sense::Ge => constraint!(lhs >= c.rhs),
            Sense::Eq => constraint!(lhs == c.rhs),
        };
        problem.add_constraint(constraint);
    }

    let solution = problem
        .solve()
        .map_err(|e| classify_resolution_error(e, limit))?;
    if matches!(solution.status(), SolutionStatus::TimeLimit) {
        warn!(limit_secs = limit.as_secs(), "时限内未证明最优，采用当前最好可行解");
    }
    let values: Vec<f64> = handles.iter().map(|v| solution.value(*v)).collect();
    let objective = model.objective_value(&values);
    let elapsed = started.elapsed();

    debug!(
        objective,
        elapsed_ms = elapsed.as_millis() as u64,
        "microlp 求解完成"
    );

    Ok(SolveOutcome {
        values,
        objective,
        elapsed,
    })
}
