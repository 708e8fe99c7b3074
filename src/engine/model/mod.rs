// ==========================================
// 农作物种植规划系统 - 规划模型
// ==========================================
// linear: 模型表示与 LP 导出
// index: 决策变量稀疏索引
// constraints: 约束族生成（含 Big-M 辅助）
// builder: 单一路径的模型构建器
// ==========================================

pub mod builder;
pub mod constraints;
pub mod index;
pub mod linear;


pub use builder::{BuildMode, BuildStats, BuiltModel, ModelBuilder};
pub use index::{AreaCell, CellKey, VariableIndex};
pub use linear::{Constraint, ConstraintFamily, LinearExpr, MipModel, Sense, VarDef, VarId, VarKind};
