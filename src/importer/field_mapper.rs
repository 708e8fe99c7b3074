// ==========================================
// 农作物种植规划系统 - 字段映射器实现
// ==========================================
// 职责: 源字段 → 标准字段映射 + 类型转换
// 红线: 作物分类在此处经 EligibilityCore::classify 派生一次
// ==========================================

use crate::domain::crop::{Crop, CropId};
use crate::domain::land::Parcel;
use crate::domain::statistics::{PlantingStatistic, PriorPlanting};
use crate::domain::types::{LandType, Season};
use crate::engine::eligibility_core::EligibilityCore;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{DataError, DataResult};
use crate::importer::file_parser::{RawRow, RawTable};
use std::collections::BTreeMap;

// ==========================================
// 列名别名表（中文列名优先，兼容英文列名）
// ==========================================
const PARCEL_NAME: &[&str] = &["地块名称", "name", "parcel"];
const LAND_TYPE: &[&str] = &["地块类型", "land_type"];
const PARCEL_AREA: &[&str] = &["地块面积/亩", "地块面积(亩)", "地块面积", "area"];

const CROP_ID: &[&str] = &["作物编号", "crop_id", "id"];
const CROP_NAME: &[&str] = &["作物名称", "name", "crop_name"];
const CROP_TYPE: &[&str] = &["作物类型", "type", "crop_type"];
const IS_LEGUME: &[&str] = &["是否豆类", "is_legume"];

const SEASON: &[&str] = &["种植季次", "season"];
const YIELD: &[&str] = &["亩产量/斤", "亩产量(斤)", "yield_per_mu"];
const COST: &[&str] = &["种植成本/(元/亩)", "种植成本(元/亩)", "cost_per_mu"];
const PRICE: &[&str] = &["销售单价/(元/斤)", "销售单价(元/斤)", "price"];

const DEMAND: &[&str] = &["预期销售量(斤)", "预期销售量/斤", "expected_sales", "demand"];

const PRIOR_PARCEL: &[&str] = &["种植地块", "parcel"];
const PRIOR_AREA: &[&str] = &["种植面积/亩", "种植面积(亩)", "area"];

pub struct FieldMapper {
    cleaner: DataCleaner,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapper {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    // ==========================================
    // 地块表
    // ==========================================

    /// 映射地块表；地块名称为空的行跳过
    pub fn map_parcels(&self, table: &RawTable) -> DataResult<Vec<Parcel>> {
        let name_col = resolve_column(table, "name", PARCEL_NAME)?;
        let type_col = resolve_column(table, "land_type", LAND_TYPE)?;
        let area_col = resolve_column(table, "area", PARCEL_AREA)?;

        let mut parcels = Vec::with_capacity(table.len());
        for row in &table.rows {
            let Some(name) = self.cleaner.normalize_null(row.get(name_col)) else {
                continue;
            };
            let land_type = self.parse_land_type(table, row, type_col)?;
            let area = self.required_number(table, row, area_col)?;
            parcels.push(Parcel::new(name, land_type, area));
        }
        Ok(parcels)
    }

    // ==========================================
    // 作物表
    // ==========================================

    /// 映射作物表
    ///
    /// # 规则
    /// - 作物编号为空的行跳过
    /// - 豆类标记: 有 "是否豆类" 列且非空时取该列，否则由类型标签识别
    pub fn map_crops(&self, table: &RawTable) -> DataResult<Vec<Crop>> {
        let id_col = resolve_column(table, "crop_id", CROP_ID)?;
        let name_col = resolve_column(table, "name", CROP_NAME)?;
        let type_col = resolve_column(table, "type", CROP_TYPE)?;
        let legume_col = optional_column(table, IS_LEGUME);

        let mut crops = Vec::with_capacity(table.len());
        for row in &table.rows {
            if self.cleaner.normalize_null(row.get(id_col)).is_none() {
                continue;
            }
            let id = self.required_id(table, row, id_col)?;
            let name = self.required_text(table, row, name_col)?;
            let type_label = self
                .cleaner
                .normalize_null(row.get(type_col))
                .unwrap_or_default();

            let legume_flag = match legume_col {
                Some(col) => match self.cleaner.normalize_null(row.get(col)) {
                    Some(raw) => Some(self.cleaner.parse_bool(&raw).ok_or_else(|| {
                        DataError::TypeConversion {
                            table: table.name.clone(),
                            row: row.row_number,
                            field: col.to_string(),
                            message: format!("无法识别的是否标记: {}", raw),
                        }
                    })?),
                    None => None,
                },
                None => None,
            };

            crops.push(EligibilityCore::classify(id, &name, &type_label, legume_flag));
        }
        Ok(crops)
    }

    // ==========================================
    // 种植统计表
    // ==========================================

    pub fn map_statistics(&self, table: &RawTable) -> DataResult<Vec<PlantingStatistic>> {
        let id_col = resolve_column(table, "crop_id", CROP_ID)?;
        let type_col = resolve_column(table, "land_type", LAND_TYPE)?;
        let season_col = resolve_column(table, "season", SEASON)?;
        let yield_col = resolve_column(table, "yield_per_mu", YIELD)?;
        let cost_col = resolve_column(table, "cost_per_mu", COST)?;
        let price_col = resolve_column(table, "price", PRICE)?;

        let mut stats = Vec::with_capacity(table.len());
        for row in &table.rows {
            if self.cleaner.normalize_null(row.get(id_col)).is_none() {
                continue;
            }
            let crop_id = self.required_id(table, row, id_col)?;
            let land_type = self.parse_land_type(table, row, type_col)?;
            let season = self.parse_season(table, row, season_col)?;
            let yield_per_mu = self.required_number(table, row, yield_col)?;
            let cost_per_mu = self.required_number(table, row, cost_col)?;

            let raw_price = self.required_text(table, row, price_col)?;
            let price_avg =
                self.cleaner
                    .parse_price(&raw_price)
                    .ok_or_else(|| DataError::TypeConversion {
                        table: table.name.clone(),
                        row: row.row_number,
                        field: price_col.to_string(),
                        message: format!("无法解析价格: {}", raw_price),
                    })?;

            stats.push(PlantingStatistic::new(
                land_type,
                season,
                crop_id,
                yield_per_mu,
                cost_per_mu,
                price_avg,
            ));
        }
        Ok(stats)
    }

    // ==========================================
    // 预期销售量表
    // ==========================================

    /// 映射预期销售量表；同一作物重复出现视为主键重复
    pub fn map_demand(&self, table: &RawTable) -> DataResult<BTreeMap<CropId, f64>> {
        let id_col = resolve_column(table, "crop_id", CROP_ID)?;
        let demand_col = resolve_column(table, "expected_sales", DEMAND)?;

        let mut demand = BTreeMap::new();
        for row in &table.rows {
            if self.cleaner.normalize_null(row.get(id_col)).is_none() {
                continue;
            }
            let crop_id = self.required_id(table, row, id_col)?;
            let quantity = self.required_number(table, row, demand_col)?;
            if demand.insert(crop_id, quantity).is_some() {
                return Err(DataError::DuplicateKey {
                    table: table.name.clone(),
                    key: crop_id.to_string(),
                });
            }
        }
        Ok(demand)
    }

    // ==========================================
    // 上一年种植表
    // ==========================================

    pub fn map_prior_planting(&self, table: &RawTable) -> DataResult<Vec<PriorPlanting>> {
        let parcel_col = resolve_column(table, "parcel", PRIOR_PARCEL)?;
        let id_col = resolve_column(table, "crop_id", CROP_ID)?;
        let season_col = resolve_column(table, "season", SEASON)?;
        let area_col = resolve_column(table, "area", PRIOR_AREA)?;

        let mut prior = Vec::with_capacity(table.len());
        for row in &table.rows {
            let Some(parcel) = self.cleaner.normalize_null(row.get(parcel_col)) else {
                continue;
            };
            prior.push(PriorPlanting {
                parcel,
                crop_id: self.required_id(table, row, id_col)?,
                season: self.parse_season(table, row, season_col)?,
                area: self.required_number(table, row, area_col)?,
            });
        }
        Ok(prior)
    }

    // ==========================================
    // 单元格解析
    // ==========================================

    fn required_text(&self, table: &RawTable, row: &RawRow, col: &str) -> DataResult<String> {
        self.cleaner
            .normalize_null(row.get(col))
            .ok_or_else(|| DataError::TypeConversion {
                table: table.name.clone(),
                row: row.row_number,
                field: col.to_string(),
                message: "必填字段为空".to_string(),
            })
    }

    fn required_number(&self, table: &RawTable, row: &RawRow, col: &str) -> DataResult<f64> {
        let raw = self.required_text(table, row, col)?;
        self.cleaner
            .parse_number(&raw)
            .ok_or_else(|| DataError::TypeConversion {
                table: table.name.clone(),
                row: row.row_number,
                field: col.to_string(),
                message: format!("无法解析为数值: {}", raw),
            })
    }

    fn required_id(&self, table: &RawTable, row: &RawRow, col: &str) -> DataResult<CropId> {
        let raw = self.required_text(table, row, col)?;
        self.cleaner
            .parse_id(&raw)
            .ok_or_else(|| DataError::TypeConversion {
                table: table.name.clone(),
                row: row.row_number,
                field: col.to_string(),
                message: format!("无法解析为作物编号: {}", raw),
            })
    }

    fn parse_land_type(&self, table: &RawTable, row: &RawRow, col: &str) -> DataResult<LandType> {
        let raw = self.required_text(table, row, col)?;
        raw.parse::<LandType>()
            .map_err(|message| DataError::UnknownValue {
                table: table.name.clone(),
                row: row.row_number,
                message,
            })
    }

    fn parse_season(&self, table: &RawTable, row: &RawRow, col: &str) -> DataResult<Season> {
        let raw = self.required_text(table, row, col)?;
        raw.parse::<Season>().map_err(|message| DataError::UnknownValue {
            table: table.name.clone(),
            row: row.row_number,
            message,
        })
    }
}

/// 在别名中查找表头；找不到即 MissingColumn
fn resolve_column<'a>(
    table: &RawTable,
    field: &str,
    aliases: &[&'a str],
) -> DataResult<&'a str> {
    optional_column(table, aliases).ok_or_else(|| DataError::MissingColumn {
        table: table.name.clone(),
        column: format!("{} ({})", field, aliases.join(" / ")),
    })
}

fn optional_column<'a>(table: &RawTable, aliases: &[&'a str]) -> Option<&'a str> {
    aliases.iter().copied().find(|alias| table.has_header(alias))
}
