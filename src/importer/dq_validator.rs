// ==========================================
// 农作物种植规划系统 - 数据质量校验器
// ==========================================
// 职责: 主键唯一 / 数值范围 / 引用完整性 / 空表检查
// 红线: 校验只报告不修正；发现违规即终止，不进入建模
// ==========================================

use crate::domain::crop::{Crop, CropId};
use crate::domain::land::Parcel;
use crate::domain::statistics::{PlantingStatistic, PriorPlanting};
use crate::domain::types::{LandType, Season};
use crate::importer::error::{DataError, DataResult};
use std::collections::{BTreeMap, HashSet};

/// 数据质量摘要
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DqSummary {
    pub parcels: usize,
    pub crops: usize,
    pub statistics: usize,
    pub synthetic_statistics: usize,
    pub demand_entries: usize,
    pub prior_rows: usize,
}

pub struct DatasetValidator;

impl DatasetValidator {
    /// 校验五张表
    ///
    /// # 返回
    /// - Ok(DqSummary): 全部通过
    /// - Err: 第一个违规项（其余违规项已记 warn 日志）
    pub fn validate(
        &self,
        parcels: &[Parcel],
        crops: &[Crop],
        statistics: &[PlantingStatistic],
        demand: &BTreeMap<CropId, f64>,
        prior: &[PriorPlanting],
    ) -> DataResult<DqSummary> {
        if parcels.is_empty() {
            return Err(DataError::EmptyDataset("地块表无有效数据".to_string()));
        }
        if crops.is_empty() {
            return Err(DataError::EmptyDataset("作物表无有效数据".to_string()));
        }
        if statistics.is_empty() {
            return Err(DataError::EmptyDataset("种植统计表无有效数据".to_string()));
        }

        let mut violations = Vec::new();
        violations.extend(self.validate_parcels(parcels));
        violations.extend(self.validate_crops(crops));

        let crop_ids: HashSet<CropId> = crops.iter().map(|c| c.id).collect();
        let parcel_names: HashSet<&str> = parcels.iter().map(|p| p.name.as_str()).collect();
        violations.extend(self.validate_statistics(statistics, &crop_ids));
        violations.extend(self.validate_demand(demand, &crop_ids));
        violations.extend(self.validate_prior(prior, &crop_ids, &parcel_names));

        if violations.is_empty() {
            return Ok(DqSummary {
                parcels: parcels.len(),
                crops: crops.len(),
                statistics: statistics.len(),
                synthetic_statistics: statistics.iter().filter(|s| s.synthetic).count(),
                demand_entries: demand.len(),
                prior_rows: prior.len(),
            });
        }

        for v in &violations {
            tracing::warn!(violation = %v, "数据质量校验未通过");
        }
        let total = violations.len();
        let first = violations.remove(0);
        tracing::error!(violations = total, "数据集校验失败，终止导入");
        Err(first)
    }

    /// 地块: 名称唯一，面积为正
    fn validate_parcels(&self, parcels: &[Parcel]) -> Vec<DataError> {
        let mut violations = Vec::new();
        let mut seen = HashSet::new();
        for (idx, p) in parcels.iter().enumerate() {
            if !seen.insert(p.name.as_str()) {
                violations.push(DataError::DuplicateKey {
                    table: "parcels".to_string(),
                    key: p.name.clone(),
                });
            }
            if !(p.area > 0.0) {
                violations.push(DataError::ValueOutOfRange {
                    table: "parcels".to_string(),
                    row: idx + 1,
                    field: "area".to_string(),
                    value: p.area,
                });
            }
        }
        violations
    }

    /// 作物: 编号唯一
    fn validate_crops(&self, crops: &[Crop]) -> Vec<DataError> {
        let mut seen = HashSet::new();
        crops
            .iter()
            .filter(|c| !seen.insert(c.id))
            .map(|c| DataError::DuplicateKey {
                table: "crops".to_string(),
                key: c.id.to_string(),
            })
            .collect()
    }

    /// 统计: (地块类型, 季次, 作物) 唯一；数值非负；作物存在
    fn validate_statistics(
        &self,
        statistics: &[PlantingStatistic],
        crop_ids: &HashSet<CropId>,
    ) -> Vec<DataError> {
        let mut violations = Vec::new();
        let mut seen: HashSet<(LandType, Season, CropId)> = HashSet::new();

        for (idx, s) in statistics.iter().enumerate() {
            let row = idx + 1;
            if !crop_ids.contains(&s.crop_id) {
                violations.push(DataError::DanglingReference {
                    table: "statistics".to_string(),
                    row,
                    message: format!("作物编号 {} 不在作物表中", s.crop_id),
                });
            }
            if !seen.insert((s.land_type, s.season, s.crop_id)) {
                violations.push(DataError::DuplicateKey {
                    table: "statistics".to_string(),
                    key: format!("{}/{}/{}", s.land_type.title_cn(), s.season.title_cn(), s.crop_id),
                });
            }
            for (field, value) in [
                ("yield_per_mu", s.yield_per_mu),
                ("cost_per_mu", s.cost_per_mu),
                ("price", s.price_avg),
            ] {
                if value < 0.0 {
                    violations.push(DataError::ValueOutOfRange {
                        table: "statistics".to_string(),
                        row,
                        field: field.to_string(),
                        value,
                    });
                }
            }
        }
        violations
    }

    fn validate_demand(
        &self,
        demand: &BTreeMap<CropId, f64>,
        crop_ids: &HashSet<CropId>,
    ) -> Vec<DataError> {
        let mut violations = Vec::new();
        for (row, (crop_id, quantity)) in demand.iter().enumerate() {
            if !crop_ids.contains(crop_id) {
                violations.push(DataError::DanglingReference {
                    table: "demand".to_string(),
                    row: row + 1,
                    message: format!("作物编号 {} 不在作物表中", crop_id),
                });
            }
            if *quantity < 0.0 {
                violations.push(DataError::ValueOutOfRange {
                    table: "demand".to_string(),
                    row: row + 1,
                    field: "expected_sales".to_string(),
                    value: *quantity,
                });
            }
        }
        violations
    }

    fn validate_prior(
        &self,
        prior: &[PriorPlanting],
        crop_ids: &HashSet<CropId>,
        parcel_names: &HashSet<&str>,
    ) -> Vec<DataError> {
        let mut violations = Vec::new();
        for (idx, p) in prior.iter().enumerate() {
            let row = idx + 1;
            if !parcel_names.contains(p.parcel.as_str()) {
                violations.push(DataError::DanglingReference {
                    table: "prior_planting".to_string(),
                    row,
                    message: format!("地块 {} 不在地块表中", p.parcel),
                });
            }
            if !crop_ids.contains(&p.crop_id) {
                violations.push(DataError::DanglingReference {
                    table: "prior_planting".to_string(),
                    row,
                    message: format!("作物编号 {} 不在作物表中", p.crop_id),
                });
            }
            if p.area < 0.0 {
                violations.push(DataError::ValueOutOfRange {
                    table: "prior_planting".to_string(),
                    row,
                    field: "area".to_string(),
                    value: p.area,
                });
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::CropCategory;

    fn create_test_tables() -> (Vec<Parcel>, Vec<Crop>, Vec<PlantingStatistic>) {
        (
            vec![Parcel::new("A1", LandType::Plain, 80.0)],
            vec![Crop::new(6, "小麦", "粮食", CropCategory::Grain, false)],
            vec![PlantingStatistic::new(LandType::Plain, Season::Single, 6, 800.0, 450.0, 3.5)],
        )
    }

    #[test]
    fn test_validate_ok() {
        let (parcels, crops, stats) = create_test_tables();
        let demand = BTreeMap::from([(6, 1000.0)]);
        let summary = DatasetValidator
            .validate(&parcels, &crops, &stats, &demand, &[])
            .unwrap();
        assert_eq!(summary.parcels, 1);
        assert_eq!(summary.demand_entries, 1);
    }

    #[test]
    fn test_validate_duplicate_parcel_and_bad_area() {
        let (mut parcels, crops, stats) = create_test_tables();
        parcels.push(Parcel::new("A1", LandType::Plain, 10.0));
        let err = DatasetValidator
            .validate(&parcels, &crops, &stats, &BTreeMap::new(), &[])
            .unwrap_err();
        assert!(matches!(err, DataError::DuplicateKey { .. }));

        let (mut parcels, crops, stats) = create_test_tables();
        parcels[0].area = 0.0;
        let err = DatasetValidator
            .validate(&parcels, &crops, &stats, &BTreeMap::new(), &[])
            .unwrap_err();
        assert!(matches!(err, DataError::ValueOutOfRange { .. }));
    }

    #[test]
    fn test_validate_dangling_references() {
        let (parcels, crops, stats) = create_test_tables();
        let prior = vec![PriorPlanting {
            parcel: "B9".to_string(),
            crop_id: 6,
            season: Season::Single,
            area: 5.0,
        }];
        let err = DatasetValidator
            .validate(&parcels, &crops, &stats, &BTreeMap::new(), &prior)
            .unwrap_err();
        assert!(matches!(err, DataError::DanglingReference { .. }));
    }

    #[test]
    fn test_validate_empty_tables() {
        let (_, crops, stats) = create_test_tables();
        let err = DatasetValidator
            .validate(&[], &crops, &stats, &BTreeMap::new(), &[])
            .unwrap_err();
        assert!(matches!(err, DataError::EmptyDataset(_)));
    }
}
