// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use crop_rotation_planner::domain::{
    Crop, CropId, Dataset, LandType, Parcel, PlantingStatistic, PriorPlanting, Season,
};
use crop_rotation_planner::EligibilityCore;
use std::collections::BTreeMap;

// ==========================================
// Dataset 构建器
// ==========================================

#[derive(Default)]
pub struct DatasetBuilder {
    parcels: Vec<Parcel>,
    crops: Vec<Crop>,
    statistics: Vec<PlantingStatistic>,
    demand: BTreeMap<CropId, f64>,
    prior: Vec<PriorPlanting>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parcel(mut self, name: &str, land_type: LandType, area: f64) -> Self {
        self.parcels.push(Parcel::new(name, land_type, area));
        self
    }

    /// 作物分类走与导入相同的派生路径
    pub fn crop(mut self, id: CropId, name: &str, type_label: &str) -> Self {
        self.crops
            .push(EligibilityCore::classify(id, name, type_label, None));
        self
    }

    pub fn stat(
        mut self,
        land_type: LandType,
        season: Season,
        crop_id: CropId,
        yield_per_mu: f64,
        cost_per_mu: f64,
        price: f64,
    ) -> Self {
        self.statistics.push(PlantingStatistic::new(
            land_type,
            season,
            crop_id,
            yield_per_mu,
            cost_per_mu,
            price,
        ));
        self
    }

    pub fn demand(mut self, crop_id: CropId, quantity: f64) -> Self {
        self.demand.insert(crop_id, quantity);
        self
    }

    /// 为全部已登记作物设置同一预期销量
    pub fn demand_for_all(mut self, quantity: f64) -> Self {
        for crop in &self.crops {
            self.demand.insert(crop.id, quantity);
        }
        self
    }

    pub fn prior(mut self, parcel: &str, crop_id: CropId, season: Season, area: f64) -> Self {
        self.prior.push(PriorPlanting {
            parcel: parcel.to_string(),
            crop_id,
            season,
            area,
        });
        self
    }

    pub fn build(self) -> Dataset {
        Dataset::new(
            self.parcels,
            self.crops,
            self.statistics,
            self.demand,
            self.prior,
        )
    }
}

// ==========================================
// 预置数据集
// ==========================================

/// 单块 10 亩水浇地：一个水稻方案 vs 一组 蔬菜+冬季蔬菜 双季方案
///
/// - 水稻: 亩产 600, 成本 1000, 单价 3 → 亩利润 800
/// - 双季: 每季亩产 2000, 成本 1500, 单价 2 → 每季亩利润 2500
pub fn create_irrigated_choice_dataset(vegetable_pairs: usize) -> Dataset {
    let mut builder = DatasetBuilder::new()
        .parcel("D1", LandType::Irrigated, 10.0)
        .crop(16, "水稻", "粮食")
        .stat(LandType::Irrigated, Season::Single, 16, 600.0, 1000.0, 3.0);

    let first_season = [(21, "番茄"), (22, "茄子")];
    let second_season = [(35, "大白菜"), (36, "白萝卜")];
    for i in 0..vegetable_pairs.min(2) {
        let (veg_id, veg_name) = first_season[i];
        let (winter_id, winter_name) = second_season[i];
        builder = builder
            .crop(veg_id, veg_name, "蔬菜")
            .crop(winter_id, winter_name, "蔬菜")
            .stat(LandType::Irrigated, Season::First, veg_id, 2000.0, 1500.0, 2.0)
            .stat(LandType::Irrigated, Season::Second, winter_id, 2000.0, 1500.0, 2.0);
    }

    builder.demand_for_all(1.0e7).build()
}

/// 小型多地块数据集（旱地 / 水浇地 / 普通大棚 / 智慧大棚）
pub fn create_small_village_dataset() -> Dataset {
    DatasetBuilder::new()
        .parcel("A1", LandType::Plain, 10.0)
        .parcel("B1", LandType::Terrace, 8.0)
        .parcel("D1", LandType::Irrigated, 5.0)
        .parcel("E1", LandType::OrdinaryGreenhouse, 0.6)
        .parcel("F1", LandType::SmartGreenhouse, 0.6)
        .crop(1, "黄豆", "粮食（豆类）")
        .crop(6, "小麦", "粮食")
        .crop(7, "玉米", "粮食")
        .crop(8, "谷子", "粮食")
        .crop(16, "水稻", "粮食")
        .crop(17, "豇豆", "蔬菜（豆类）")
        .crop(21, "番茄", "蔬菜")
        .crop(22, "茄子", "蔬菜")
        .crop(35, "大白菜", "蔬菜")
        .crop(36, "白萝卜", "蔬菜")
        .crop(38, "香菇", "食用菌")
        .crop(39, "羊肚菌", "食用菌")
        .stat(LandType::Plain, Season::Single, 1, 400.0, 400.0, 3.25)
        .stat(LandType::Plain, Season::Single, 6, 800.0, 450.0, 3.5)
        .stat(LandType::Plain, Season::Single, 7, 1000.0, 500.0, 3.0)
        .stat(LandType::Plain, Season::Single, 8, 400.0, 360.0, 7.0)
        .stat(LandType::Terrace, Season::Single, 1, 380.0, 400.0, 3.25)
        .stat(LandType::Terrace, Season::Single, 6, 760.0, 450.0, 3.5)
        .stat(LandType::Terrace, Season::Single, 7, 950.0, 500.0, 3.0)
        .stat(LandType::Terrace, Season::Single, 8, 380.0, 360.0, 7.0)
        .stat(LandType::Irrigated, Season::Single, 16, 500.0, 680.0, 7.0)
        .stat(LandType::Irrigated, Season::First, 17, 3000.0, 2000.0, 8.0)
        .stat(LandType::Irrigated, Season::First, 21, 3000.0, 2000.0, 6.0)
        .stat(LandType::Irrigated, Season::First, 22, 3200.0, 2000.0, 5.5)
        .stat(LandType::Irrigated, Season::Second, 35, 5000.0, 2000.0, 2.5)
        .stat(LandType::Irrigated, Season::Second, 36, 4000.0, 500.0, 3.0)
        .stat(LandType::OrdinaryGreenhouse, Season::First, 17, 3600.0, 2400.0, 9.6)
        .stat(LandType::OrdinaryGreenhouse, Season::First, 21, 3600.0, 2400.0, 7.2)
        .stat(LandType::OrdinaryGreenhouse, Season::First, 22, 3800.0, 2400.0, 6.6)
        .stat(LandType::OrdinaryGreenhouse, Season::Second, 38, 4000.0, 10000.0, 19.0)
        .stat(LandType::OrdinaryGreenhouse, Season::Second, 39, 600.0, 10000.0, 100.0)
        .stat(LandType::SmartGreenhouse, Season::First, 21, 3600.0, 2400.0, 7.2)
        .stat(LandType::SmartGreenhouse, Season::First, 22, 3800.0, 2400.0, 6.6)
        .stat(LandType::SmartGreenhouse, Season::Second, 17, 3600.0, 2400.0, 9.6)
        .stat(LandType::SmartGreenhouse, Season::Second, 21, 3600.0, 2400.0, 7.2)
        .stat(LandType::SmartGreenhouse, Season::Second, 22, 3800.0, 2400.0, 6.6)
        .demand_for_all(20_000.0)
        .prior("A1", 6, Season::Single, 10.0)
        .prior("B1", 1, Season::Single, 8.0)
        .prior("D1", 16, Season::Single, 5.0)
        .prior("E1", 21, Season::First, 0.6)
        .prior("E1", 38, Season::Second, 0.6)
        .build()
}

/// 轮作选择充足的小型数据集：每类地块每个季次都有两种以上豆类或足够的替换作物
///
/// 容差连作规则下每个 (地块, 季次, 作物) 单元最多 0.1 亩且不能连续两年种植，
/// 需要豆类与非豆类在相邻年份之间交替，豆类占比区间与多样性下限才同时可满足
pub fn create_rotation_rich_dataset() -> Dataset {
    let mut builder = DatasetBuilder::new()
        .parcel("A1", LandType::Plain, 2.0)
        .parcel("D1", LandType::Irrigated, 1.0)
        .parcel("E1", LandType::OrdinaryGreenhouse, 0.6)
        .parcel("F1", LandType::SmartGreenhouse, 0.6)
        .crop(1, "黄豆", "粮食（豆类）")
        .crop(2, "黑豆", "粮食（豆类）")
        .crop(6, "小麦", "粮食")
        .crop(7, "玉米", "粮食")
        .crop(8, "谷子", "粮食")
        .crop(9, "高粱", "粮食")
        .crop(10, "黍子", "粮食")
        .crop(16, "水稻", "粮食")
        .crop(17, "豇豆", "蔬菜（豆类）")
        .crop(18, "刀豆", "蔬菜（豆类）")
        .crop(21, "番茄", "蔬菜")
        .crop(22, "茄子", "蔬菜")
        .crop(23, "青椒", "蔬菜")
        .crop(35, "大白菜", "蔬菜")
        .crop(36, "白萝卜", "蔬菜")
        .crop(37, "红萝卜", "蔬菜")
        .crop(38, "香菇", "食用菌")
        .crop(39, "羊肚菌", "食用菌")
        .crop(40, "白灵菇", "食用菌")
        .stat(LandType::Plain, Season::Single, 1, 400.0, 400.0, 3.25)
        .stat(LandType::Plain, Season::Single, 2, 500.0, 400.0, 7.5)
        .stat(LandType::Plain, Season::Single, 6, 800.0, 450.0, 3.5)
        .stat(LandType::Plain, Season::Single, 7, 1000.0, 500.0, 3.0)
        .stat(LandType::Plain, Season::Single, 8, 400.0, 360.0, 7.0)
        .stat(LandType::Plain, Season::Single, 9, 630.0, 400.0, 6.0)
        .stat(LandType::Plain, Season::Single, 10, 525.0, 360.0, 7.5)
        .stat(LandType::Irrigated, Season::Single, 16, 500.0, 680.0, 7.0)
        .stat(LandType::Irrigated, Season::Second, 35, 5000.0, 2000.0, 2.5)
        .stat(LandType::Irrigated, Season::Second, 36, 4000.0, 500.0, 3.0)
        .stat(LandType::Irrigated, Season::Second, 37, 3000.0, 500.0, 3.25)
        .stat(LandType::OrdinaryGreenhouse, Season::Second, 38, 4000.0, 10000.0, 19.0)
        .stat(LandType::OrdinaryGreenhouse, Season::Second, 39, 600.0, 10000.0, 100.0)
        .stat(LandType::OrdinaryGreenhouse, Season::Second, 40, 5000.0, 10000.0, 16.0);

    // 普通蔬菜（含两种豆类蔬菜）在水浇地第一季与两类大棚上都可种
    let vegetables = [
        (17, 3000.0, 8.0),
        (18, 2800.0, 7.5),
        (21, 3000.0, 6.0),
        (22, 3200.0, 5.5),
        (23, 2400.0, 6.5),
    ];
    for (crop_id, yield_per_mu, price) in vegetables {
        builder = builder
            .stat(LandType::Irrigated, Season::First, crop_id, yield_per_mu, 2000.0, price)
            .stat(
                LandType::OrdinaryGreenhouse,
                Season::First,
                crop_id,
                yield_per_mu * 1.2,
                2400.0,
                price * 1.2,
            );
        for season in [Season::First, Season::Second] {
            builder = builder.stat(
                LandType::SmartGreenhouse,
                season,
                crop_id,
                yield_per_mu * 1.2,
                2400.0,
                price * 1.2,
            );
        }
    }

    builder
        .demand_for_all(100_000.0)
        .prior("A1", 6, Season::Single, 2.0)
        .prior("D1", 16, Season::Single, 1.0)
        .prior("E1", 21, Season::First, 0.6)
        .prior("E1", 38, Season::Second, 0.6)
        .prior("F1", 22, Season::First, 0.6)
        .build()
}
