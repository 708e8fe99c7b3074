// ==========================================
// CSV 测试数据 - 五张表写入临时目录
// ==========================================

use csv::Writer;
use std::error::Error;
use std::fs::File;
use std::path::Path;

pub const PARCELS_HEADER: &[&str] = &["地块名称", "地块类型", "地块面积/亩"];
pub const CROPS_HEADER: &[&str] = &["作物编号", "作物名称", "作物类型"];
pub const STATISTICS_HEADER: &[&str] = &[
    "序号",
    "作物编号",
    "作物名称",
    "地块类型",
    "种植季次",
    "亩产量/斤",
    "种植成本/(元/亩)",
    "销售单价/(元/斤)",
];
pub const DEMAND_HEADER: &[&str] = &["作物编号", "预期销售量(斤)"];
pub const PRIOR_HEADER: &[&str] = &["种植地块", "作物编号", "作物名称", "种植季次", "种植面积/亩"];

pub const PARCELS: &[&[&str]] = &[
    &["A1", "平旱地", "10"],
    &["B1", "梯田", "8"],
    &["D1", "水浇地", "5"],
    &["E1", "普通大棚 ", "0.6"],
    &["F1", "智慧大棚", "0.6"],
];

pub const CROPS: &[&[&str]] = &[
    &["1", "黄豆", "粮食（豆类）"],
    &["6", "小麦", "粮食"],
    &["7", "玉米", "粮食"],
    &["16", "水稻", "粮食"],
    &["17", "豇豆", "蔬菜（豆类）"],
    &["21", "番茄", "蔬菜"],
    &["35", "大白菜", "蔬菜"],
    &["38", "香菇", "食用菌"],
];

pub const STATISTICS: &[&[&str]] = &[
    &["1", "1", "黄豆", "平旱地", "单季", "400", "400", "2.50-4.00"],
    &["2", "6", "小麦", "平旱地", "单季", "800", "450", "3.50"],
    &["3", "7", "玉米", "平旱地", "单季", "1000", "500", "3.00"],
    &["4", "1", "黄豆", "梯田", "单季", "380", "400", "2.50-4.00"],
    &["5", "6", "小麦", "梯田", "单季", "760", "450", "3.50"],
    &["6", "7", "玉米", "梯田", "单季", "950", "500", "3.00"],
    &["7", "16", "水稻", "水浇地", "单季", "500", "680", "6.00-8.00"],
    &["8", "17", "豇豆", "水浇地", "第一季", "3000", "2000", "8.00"],
    &["9", "21", "番茄", "水浇地", "第一季", "3000", "2000", "6.00"],
    &["10", "35", "大白菜", "水浇地", "第二季", "5000", "2000", "2.50"],
    &["11", "17", "豇豆", "普通大棚", "第一季", "3600", "2400", "9.60"],
    &["12", "21", "番茄", "普通大棚 ", "第一季", "3600", "2400", "7.20"],
    &["13", "38", "香菇", "普通大棚", "第二季", "4000", "10000", "19.00"],
    &["14", "17", "豇豆", "智慧大棚", "第二季", "3600", "2400", "9.60"],
    &["15", "21", "番茄", "智慧大棚", "第二季", "3600", "2400", "7.20"],
];

pub const DEMAND: &[&[&str]] = &[
    &["1", "12000"],
    &["6", "20000"],
    &["7", "20000"],
    &["16", "5000"],
    &["17", "10000"],
    &["21", "10000"],
    &["35", "20000"],
    &["38", "3000"],
];

pub const PRIOR: &[&[&str]] = &[
    &["A1", "6", "小麦", "单季", "10"],
    &["B1", "1", "黄豆", "单季", "8"],
    &["D1", "16", "水稻", "单季", "5"],
    &["E1", "21", "番茄", "第一季", "0.6"],
    &["E1", "38", "香菇", "第二季", "0.6"],
];

pub fn write_table(path: &Path, header: &[&str], rows: &[&[&str]]) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    let mut wtr = Writer::from_writer(file);
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(*row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// 写出完整数据目录
///
/// # 参数
/// - with_demand: 是否写出 demand.csv（否则由上一年种植派生）
pub fn write_sample_dataset(dir: &Path, with_demand: bool) -> Result<(), Box<dyn Error>> {
    write_table(&dir.join("parcels.csv"), PARCELS_HEADER, PARCELS)?;
    write_table(&dir.join("crops.csv"), CROPS_HEADER, CROPS)?;
    write_table(&dir.join("statistics.csv"), STATISTICS_HEADER, STATISTICS)?;
    write_table(&dir.join("prior_planting.csv"), PRIOR_HEADER, PRIOR)?;
    if with_demand {
        write_table(&dir.join("demand.csv"), DEMAND_HEADER, DEMAND)?;
    }
    Ok(())
}
