// ==========================================
// 农作物种植规划系统 - 领域层
// ==========================================

pub mod crop;
pub mod dataset;
pub mod horizon;
pub mod land;
pub mod plan;
pub mod statistics;
pub mod types;

pub use crop::{Crop, CropId};
pub use dataset::Dataset;
pub use horizon::PlanningHorizon;
pub use land::Parcel;
pub use plan::{PlanRow, PlantingDecision};
pub use statistics::{PlantingStatistic, PriorPlanting};
pub use types::{CropCategory, LandType, MarketGroup, PlanningVariant, Season};
