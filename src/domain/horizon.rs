// ==========================================
// 农作物种植规划系统 - 规划期
// ==========================================

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// 规划期（默认 2024–2030，基准年 2023）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningHorizon {
    pub reference_year: i32,
    pub first_year: i32,
    pub last_year: i32,
}

impl Default for PlanningHorizon {
    fn default() -> Self {
        Self {
            reference_year: 2023,
            first_year: 2024,
            last_year: 2030,
        }
    }
}

impl PlanningHorizon {
    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }

    pub fn len(&self) -> usize {
        (self.last_year - self.first_year + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 相对基准年的年数 n（2024 → 1）
    pub fn offset(&self, year: i32) -> i32 {
        year - self.reference_year
    }

    /// 按规划期偏移取年份窗口，如 window(1, 3) → 2024..=2026
    ///
    /// 超出规划期的部分被截掉
    pub fn window(&self, from_offset: i32, to_offset: i32) -> Vec<i32> {
        (from_offset..=to_offset)
            .map(|n| self.reference_year + n)
            .filter(|y| self.years().contains(y))
            .collect()
    }
}
