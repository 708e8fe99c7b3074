// ==========================================
// 示例数据生成器
// ==========================================
// 用途: 生成一套完整的村庄数据集（五张 CSV 表）
// 输出: <目录>/parcels.csv, crops.csv, statistics.csv, demand.csv, prior_planting.csv
// 用法: generate_sample_data [输出目录]（默认 data/sample）
// ==========================================

use csv::Writer;
use std::error::Error;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const DEFAULT_OUT_DIR: &str = "data/sample";

// CSV 表头（中文列名）
const PARCELS_HEADER: &[&str] = &["地块名称", "地块类型", "地块面积/亩"];
const CROPS_HEADER: &[&str] = &["作物编号", "作物名称", "作物类型"];
const STATISTICS_HEADER: &[&str] = &[
    "序号",
    "作物编号",
    "作物名称",
    "地块类型",
    "种植季次",
    "亩产量/斤",
    "种植成本/(元/亩)",
    "销售单价/(元/斤)",
];
const DEMAND_HEADER: &[&str] = &["作物编号", "作物名称", "预期销售量(斤)"];
const PRIOR_HEADER: &[&str] = &["种植地块", "作物编号", "作物名称", "种植季次", "种植面积/亩"];

// (前缀, 地块类型, 各地块面积)
const PARCEL_GROUPS: &[(&str, &str, &[f64])] = &[
    ("A", "平旱地", &[80.0, 55.0, 35.0, 72.0, 68.0, 55.0]),
    (
        "B",
        "梯田",
        &[
            60.0, 46.0, 40.0, 28.0, 25.0, 86.0, 55.0, 44.0, 50.0, 25.0, 60.0, 45.0, 35.0, 20.0,
        ],
    ),
    ("C", "山坡地", &[15.0, 13.0, 15.0, 18.0, 27.0, 20.0]),
    ("D", "水浇地", &[15.0, 10.0, 14.0, 6.0, 10.0, 12.0, 22.0, 20.0]),
    ("E", "普通大棚", &[0.6; 16]),
    ("F", "智慧大棚", &[0.6; 4]),
];

#[derive(Clone, Copy)]
enum Kind {
    Grain,
    Rice,
    Vegetable,
    WinterVegetable,
    Mushroom,
}

// (编号, 名称, 类型标签, 种类)
const CROPS: &[(u32, &str, &str, Kind)] = &[
    (1, "黄豆", "粮食（豆类）", Kind::Grain),
    (2, "黑豆", "粮食（豆类）", Kind::Grain),
    (3, "红豆", "粮食（豆类）", Kind::Grain),
    (4, "绿豆", "粮食（豆类）", Kind::Grain),
    (5, "爬豆", "粮食（豆类）", Kind::Grain),
    (6, "小麦", "粮食", Kind::Grain),
    (7, "玉米", "粮食", Kind::Grain),
    (8, "谷子", "粮食", Kind::Grain),
    (9, "高粱", "粮食", Kind::Grain),
    (10, "黍子", "粮食", Kind::Grain),
    (11, "荞麦", "粮食", Kind::Grain),
    (12, "南瓜", "粮食", Kind::Grain),
    (13, "红薯", "粮食", Kind::Grain),
    (14, "莜麦", "粮食", Kind::Grain),
    (15, "大麦", "粮食", Kind::Grain),
    (16, "水稻", "粮食", Kind::Rice),
    (17, "豇豆", "蔬菜（豆类）", Kind::Vegetable),
    (18, "刀豆", "蔬菜（豆类）", Kind::Vegetable),
    (19, "芸豆", "蔬菜（豆类）", Kind::Vegetable),
    (20, "土豆", "蔬菜", Kind::Vegetable),
    (21, "西红柿", "蔬菜", Kind::Vegetable),
    (22, "茄子", "蔬菜", Kind::Vegetable),
    (23, "菠菜", "蔬菜", Kind::Vegetable),
    (24, "青椒", "蔬菜", Kind::Vegetable),
    (25, "菜花", "蔬菜", Kind::Vegetable),
    (26, "包菜", "蔬菜", Kind::Vegetable),
    (27, "油麦菜", "蔬菜", Kind::Vegetable),
    (28, "小青菜", "蔬菜", Kind::Vegetable),
    (29, "黄瓜", "蔬菜", Kind::Vegetable),
    (30, "生菜", "蔬菜", Kind::Vegetable),
    (31, "辣椒", "蔬菜", Kind::Vegetable),
    (32, "空心菜", "蔬菜", Kind::Vegetable),
    (33, "黄心菜", "蔬菜", Kind::Vegetable),
    (34, "芹菜", "蔬菜", Kind::Vegetable),
    (35, "大白菜", "蔬菜", Kind::WinterVegetable),
    (36, "白萝卜", "蔬菜", Kind::WinterVegetable),
    (37, "红萝卜", "蔬菜", Kind::WinterVegetable),
    (38, "榆黄菇", "食用菌", Kind::Mushroom),
    (39, "香菇", "食用菌", Kind::Mushroom),
    (40, "白灵菇", "食用菌", Kind::Mushroom),
    (41, "羊肚菌", "食用菌", Kind::Mushroom),
];

// 统计记录
struct StatRecord {
    crop_id: u32,
    crop_name: &'static str,
    land_type: &'static str,
    season: &'static str,
    yield_per_mu: f64,
    cost_per_mu: f64,
    price_low: f64,
    price_high: f64,
}

impl StatRecord {
    fn to_row(&self, seq: usize) -> Vec<String> {
        let price = if (self.price_high - self.price_low).abs() < 1e-9 {
            format!("{:.2}", self.price_low)
        } else {
            format!("{:.2}-{:.2}", self.price_low, self.price_high)
        };
        vec![
            seq.to_string(),
            self.crop_id.to_string(),
            self.crop_name.to_string(),
            self.land_type.to_string(),
            self.season.to_string(),
            format!("{:.0}", self.yield_per_mu),
            format!("{:.0}", self.cost_per_mu),
            price,
        ]
    }
}

// 按作物编号生成确定性的统计数据
fn generate_statistics() -> Vec<StatRecord> {
    let mut records = Vec::new();
    for &(id, name, _, kind) in CROPS {
        let k = f64::from(id % 7);
        let record = |land_type, season, yield_factor: f64, cost_factor: f64, base: (f64, f64, f64)| {
            let (yield_per_mu, cost_per_mu, price) = base;
            StatRecord {
                crop_id: id,
                crop_name: name,
                land_type,
                season,
                yield_per_mu: (yield_per_mu * yield_factor).round(),
                cost_per_mu: (cost_per_mu * cost_factor).round(),
                price_low: price,
                price_high: price + if id % 3 == 0 { 1.0 } else { 0.0 },
            }
        };

        match kind {
            Kind::Grain => {
                let base = (400.0 + 100.0 * k, 400.0 + 20.0 * k, 2.5 + 0.5 * k);
                records.push(record("平旱地", "单季", 1.0, 1.0, base));
                records.push(record("梯田", "单季", 0.95, 1.0, base));
                records.push(record("山坡地", "单季", 0.9, 1.0, base));
            }
            Kind::Rice => {
                records.push(record("水浇地", "单季", 1.0, 1.0, (500.0, 680.0, 6.0)));
            }
            Kind::Vegetable => {
                let base = (2400.0 + 300.0 * k, 1800.0 + 100.0 * k, 4.0 + 0.6 * k);
                records.push(record("水浇地", "第一季", 1.0, 1.0, base));
                records.push(record("普通大棚", "第一季", 1.2, 1.2, base));
                // 智慧大棚只给第二季，第一季由导入阶段沿用普通大棚数据
                records.push(record("智慧大棚", "第二季", 1.1, 1.1, base));
            }
            Kind::WinterVegetable => {
                let base = (4000.0 + 500.0 * k, 500.0 + 500.0 * k, 2.0 + 0.3 * k);
                records.push(record("水浇地", "第二季", 1.0, 1.0, base));
            }
            Kind::Mushroom => {
                let base = (600.0 + 800.0 * k, 10000.0, 20.0 + 15.0 * k);
                records.push(record("普通大棚", "第二季", 1.0, 1.0, base));
            }
        }
    }
    records
}

fn parcel_names() -> Vec<(String, &'static str, f64)> {
    PARCEL_GROUPS
        .iter()
        .flat_map(|&(prefix, land_type, areas)| {
            areas
                .iter()
                .enumerate()
                .map(move |(i, &area)| (format!("{}{}", prefix, i + 1), land_type, area))
        })
        .collect()
}

// 上一年种植：旱地轮换粮食（含豆类），水浇地种水稻，大棚两季
fn generate_prior() -> Vec<Vec<String>> {
    let crop_name = |id: u32| {
        CROPS
            .iter()
            .find(|c| c.0 == id)
            .map(|c| c.1)
            .unwrap_or_default()
    };
    let mut rows = Vec::new();
    for (i, (name, land_type, area)) in parcel_names().into_iter().enumerate() {
        let mut push = |id: u32, season: &str| {
            rows.push(vec![
                name.clone(),
                id.to_string(),
                crop_name(id).to_string(),
                season.to_string(),
                format!("{}", area),
            ]);
        };
        match land_type {
            "平旱地" | "梯田" | "山坡地" => push(1 + (i as u32 % 15), "单季"),
            "水浇地" => push(16, "单季"),
            "普通大棚" => {
                push(17 + (i as u32 % 18), "第一季");
                push(38 + (i as u32 % 4), "第二季");
            }
            _ => {
                push(17 + (i as u32 % 18), "第一季");
                push(17 + ((i as u32 + 5) % 18), "第二季");
            }
        }
    }
    rows
}

fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<usize, Box<dyn Error>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let file = File::create(path)?;
    let mut wtr = Writer::from_writer(file);
    wtr.write_record(header)?;
    let mut count = 0;
    for row in rows {
        wtr.write_record(&row)?;
        count += 1;
    }
    wtr.flush()?;
    Ok(count)
}

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUT_DIR.to_string())
        .into();
    fs::create_dir_all(&out_dir)?;
    println!("开始生成示例数据集: {}", out_dir.display());

    // 1. 地块
    let n = write_rows(
        &out_dir.join("parcels.csv"),
        PARCELS_HEADER,
        parcel_names()
            .into_iter()
            .map(|(name, land_type, area)| vec![name, land_type.to_string(), format!("{}", area)]),
    )?;
    println!("✓ 生成 parcels.csv ({}条)", n);

    // 2. 作物
    let n = write_rows(
        &out_dir.join("crops.csv"),
        CROPS_HEADER,
        CROPS
            .iter()
            .map(|&(id, name, label, _)| vec![id.to_string(), name.to_string(), label.to_string()]),
    )?;
    println!("✓ 生成 crops.csv ({}条)", n);

    // 3. 种植统计
    let stats = generate_statistics();
    let n = write_rows(
        &out_dir.join("statistics.csv"),
        STATISTICS_HEADER,
        stats.iter().enumerate().map(|(i, s)| s.to_row(i + 1)),
    )?;
    println!("✓ 生成 statistics.csv ({}条)", n);

    // 4. 预期销售量
    let n = write_rows(
        &out_dir.join("demand.csv"),
        DEMAND_HEADER,
        CROPS.iter().map(|&(id, name, _, kind)| {
            let quantity = match kind {
                Kind::Grain => 20000.0 + 5000.0 * f64::from(id % 5),
                Kind::Rice => 21000.0,
                Kind::Vegetable => 3000.0 + 1000.0 * f64::from(id % 4),
                Kind::WinterVegetable => 30000.0,
                Kind::Mushroom => 2000.0 + 1000.0 * f64::from(id % 3),
            };
            vec![id.to_string(), name.to_string(), format!("{:.0}", quantity)]
        }),
    )?;
    println!("✓ 生成 demand.csv ({}条)", n);

    // 5. 上一年种植
    let n = write_rows(&out_dir.join("prior_planting.csv"), PRIOR_HEADER, generate_prior())?;
    println!("✓ 生成 prior_planting.csv ({}条)", n);

    println!("✓ 示例数据集生成完成！");
    Ok(())
}
