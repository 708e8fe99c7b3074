// ==========================================
// 农作物种植规划系统 - 决策变量索引
// ==========================================
// 职责: (地块, 年份, 季次, 作物) 复合键 → 面积变量 的稀疏表
//       以及按地块-年份-季次 / 地块-年份 / 作物-年份 / 年份 的二级索引
// 红线: 二级索引在变量全部创建后一次性建立，之后只读
// ==========================================

use crate::domain::crop::CropId;
use crate::domain::types::{CropCategory, Season};
use crate::engine::economics::UnitEconomics;
use crate::engine::model::linear::VarId;
use std::collections::{BTreeMap, HashMap};

/// 决策变量复合键（parcel 为数据集中的地块下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub parcel: usize,
    pub year: i32,
    pub season: Season,
    pub crop_id: CropId,
}

/// 一个面积决策变量及其经济参数
#[derive(Debug, Clone)]
pub struct AreaCell {
    pub key: CellKey,
    pub var: VarId,
    /// 目录中的方案下标
    pub option: usize,
    pub category: CropCategory,
    pub is_legume: bool,
    pub economics: UnitEconomics,
    /// 目标函数系数（元/亩）
    pub objective_coef: f64,
}

// ==========================================
// VariableIndex
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct VariableIndex {
    cells: Vec<AreaCell>,
    by_key: BTreeMap<CellKey, usize>,
    by_parcel_year_season: HashMap<(usize, i32, Season), Vec<usize>>,
    by_parcel_year: HashMap<(usize, i32), Vec<usize>>,
    by_crop_year: BTreeMap<(CropId, i32), Vec<usize>>,
    by_year: BTreeMap<i32, Vec<usize>>,
}

impl VariableIndex {
    /// 由全部面积变量一次性建立索引
    pub fn from_cells(cells: Vec<AreaCell>) -> Self {
        let mut index = Self {
            cells,
            ..Self::default()
        };

        for (pos, cell) in index.cells.iter().enumerate() {
            let k = cell.key;
            index.by_key.insert(k, pos);
            index
                .by_parcel_year_season
                .entry((k.parcel, k.year, k.season))
                .or_default()
                .push(pos);
            index
                .by_parcel_year
                .entry((k.parcel, k.year))
                .or_default()
                .push(pos);
            index
                .by_crop_year
                .entry((k.crop_id, k.year))
                .or_default()
                .push(pos);
            index.by_year.entry(k.year).or_default().push(pos);
        }

        index
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 全部面积变量（按复合键升序）
    pub fn cells(&self) -> impl Iterator<Item = &AreaCell> {
        self.by_key.values().map(move |&pos| &self.cells[pos])
    }

    pub fn get(&self, key: &CellKey) -> Option<&AreaCell> {
        self.by_key.get(key).map(|&pos| &self.cells[pos])
    }

    /// 按存储位置取变量（位置来自 `position`）
    pub fn cell_at(&self, pos: usize) -> Option<&AreaCell> {
        self.cells.get(pos)
    }

    /// 复合键对应的存储位置
    pub fn position(&self, key: &CellKey) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    pub fn for_parcel_year_season(
        &self,
        parcel: usize,
        year: i32,
        season: Season,
    ) -> impl Iterator<Item = &AreaCell> {
        self.lookup(self.by_parcel_year_season.get(&(parcel, year, season)))
    }

    pub fn for_parcel_year(&self, parcel: usize, year: i32) -> impl Iterator<Item = &AreaCell> {
        self.lookup(self.by_parcel_year.get(&(parcel, year)))
    }

    pub fn for_crop_year(&self, crop_id: CropId, year: i32) -> impl Iterator<Item = &AreaCell> {
        self.lookup(self.by_crop_year.get(&(crop_id, year)))
    }

    pub fn for_year(&self, year: i32) -> impl Iterator<Item = &AreaCell> {
        self.lookup(self.by_year.get(&year))
    }

    /// 出现过变量的 (作物, 年份) 组合，升序
    pub fn crop_years(&self) -> impl Iterator<Item = (CropId, i32)> + '_ {
        self.by_crop_year.keys().copied()
    }

    /// 某作物全部年份的变量
    pub fn for_crop(&self, crop_id: CropId) -> impl Iterator<Item = &AreaCell> {
        self.by_crop_year
            .range((crop_id, i32::MIN)..=(crop_id, i32::MAX))
            .flat_map(move |(_, list)| list.iter().map(move |&pos| &self.cells[pos]))
    }

    /// 同一 (地块, 季次, 作物) 下一年的变量
    pub fn next_year(&self, key: &CellKey) -> Option<&AreaCell> {
        self.get(&CellKey {
            year: key.year + 1,
            ..*key
        })
    }

    fn lookup<'a>(&'a self, list: Option<&'a Vec<usize>>) -> impl Iterator<Item = &'a AreaCell> + 'a {
        list.into_iter()
            .flatten()
            .map(move |&pos| &self.cells[pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::economics::YearMultipliers;

    fn create_test_cell(var: usize, parcel: usize, year: i32, season: Season, crop_id: CropId) -> AreaCell {
        AreaCell {
            key: CellKey {
                parcel,
                year,
                season,
                crop_id,
            },
            var: VarId(var),
            option: 0,
            category: CropCategory::Grain,
            is_legume: false,
            economics: UnitEconomics {
                yield_per_mu: 100.0,
                cost_per_mu: 10.0,
                price: 1.0,
                multipliers: YearMultipliers::IDENTITY,
            },
            objective_coef: 90.0,
        }
    }

    #[test]
    fn test_secondary_indexes() {
        let cells = vec![
            create_test_cell(0, 0, 2024, Season::Single, 6),
            create_test_cell(1, 0, 2025, Season::Single, 6),
            create_test_cell(2, 0, 2024, Season::Single, 7),
            create_test_cell(3, 1, 2024, Season::First, 21),
        ];
        let index = VariableIndex::from_cells(cells);

        assert_eq!(index.len(), 4);
        assert_eq!(index.for_parcel_year_season(0, 2024, Season::Single).count(), 2);
        assert_eq!(index.for_parcel_year(1, 2024).count(), 1);
        assert_eq!(index.for_crop_year(6, 2024).count(), 1);
        assert_eq!(index.for_crop(6).count(), 2);
        assert_eq!(index.for_year(2024).count(), 3);
        assert_eq!(index.for_parcel_year(5, 2024).count(), 0);

        let first = index.cells().next().unwrap();
        let next = index.next_year(&first.key).unwrap();
        assert_eq!(next.var, VarId(1));
        assert!(index.next_year(&next.key).is_none());
    }

    #[test]
    fn test_position_resolves_to_same_cell() {
        let cells = vec![
            create_test_cell(0, 0, 2025, Season::Single, 6),
            create_test_cell(1, 0, 2024, Season::Single, 6),
        ];
        let index = VariableIndex::from_cells(cells);

        for cell in index.cells() {
            let pos = index.position(&cell.key).unwrap();
            assert_eq!(index.cell_at(pos).unwrap().key, cell.key);
            assert_eq!(index.cell_at(pos).unwrap().var, cell.var);
        }
        // 存储顺序保持插入顺序，迭代顺序按复合键
        assert_eq!(index.cell_at(0).unwrap().key.year, 2025);
        assert_eq!(index.cells().next().unwrap().key.year, 2024);
        assert!(index.cell_at(2).is_none());
    }
}
