// ==========================================
// 农作物种植规划系统 - 领域类型定义
// ==========================================
// 职责: 地块类型 / 种植季次 / 作物分类 / 规划方案 四类固定词表
// 红线: 标签解析统一先做空白归一化，再比较
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 去除标签中的所有空白字符（原始数据存在 "普通大棚 " 之类的尾随空格）
pub fn normalize_label(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

// ==========================================
// 地块类型 (Land Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandType {
    Plain,              // 平旱地
    Terrace,            // 梯田
    Hillside,           // 山坡地
    Irrigated,          // 水浇地
    OrdinaryGreenhouse, // 普通大棚
    SmartGreenhouse,    // 智慧大棚
}

impl LandType {
    pub const ALL: [LandType; 6] = [
        LandType::Plain,
        LandType::Terrace,
        LandType::Hillside,
        LandType::Irrigated,
        LandType::OrdinaryGreenhouse,
        LandType::SmartGreenhouse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandType::Plain => "plain",
            LandType::Terrace => "terrace",
            LandType::Hillside => "hillside",
            LandType::Irrigated => "irrigated",
            LandType::OrdinaryGreenhouse => "ordinary_greenhouse",
            LandType::SmartGreenhouse => "smart_greenhouse",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            LandType::Plain => "平旱地",
            LandType::Terrace => "梯田",
            LandType::Hillside => "山坡地",
            LandType::Irrigated => "水浇地",
            LandType::OrdinaryGreenhouse => "普通大棚",
            LandType::SmartGreenhouse => "智慧大棚",
        }
    }

    /// 旱地三类（只能单季种粮）
    pub fn is_dry_land(&self) -> bool {
        matches!(self, LandType::Plain | LandType::Terrace | LandType::Hillside)
    }

    pub fn is_greenhouse(&self) -> bool {
        matches!(
            self,
            LandType::OrdinaryGreenhouse | LandType::SmartGreenhouse
        )
    }

    /// 是否存在第一季/第二季两季种植
    pub fn supports_double_season(&self) -> bool {
        matches!(self, LandType::Irrigated) || self.is_greenhouse()
    }
}

impl fmt::Display for LandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LandType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).to_lowercase().as_str() {
            "平旱地" | "plain" => Ok(LandType::Plain),
            "梯田" | "terrace" => Ok(LandType::Terrace),
            "山坡地" | "hillside" => Ok(LandType::Hillside),
            "水浇地" | "irrigated" => Ok(LandType::Irrigated),
            "普通大棚" | "ordinary_greenhouse" | "ordinary-greenhouse" => {
                Ok(LandType::OrdinaryGreenhouse)
            }
            "智慧大棚" | "smart_greenhouse" | "smart-greenhouse" => Ok(LandType::SmartGreenhouse),
            other => Err(format!("未知地块类型: {}", other)),
        }
    }
}

// ==========================================
// 种植季次 (Season)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Single, // 单季
    First,  // 第一季
    Second, // 第二季
}

impl Season {
    pub const ALL: [Season; 3] = [Season::Single, Season::First, Season::Second];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Single => "single",
            Season::First => "first",
            Season::Second => "second",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            Season::Single => "单季",
            Season::First => "第一季",
            Season::Second => "第二季",
        }
    }

    pub fn is_double(&self) -> bool {
        !matches!(self, Season::Single)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).to_lowercase().as_str() {
            "单季" | "single" => Ok(Season::Single),
            "第一季" | "first" => Ok(Season::First),
            "第二季" | "second" => Ok(Season::Second),
            other => Err(format!("未知种植季次: {}", other)),
        }
    }
}

// ==========================================
// 作物分类 (Crop Category)
// ==========================================
// 红线: 分类只在导入时派生一次，三种方案共用
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropCategory {
    Rice,            // 水稻
    Grain,           // 粮食（不含水稻）
    Vegetable,       // 普通蔬菜
    WinterVegetable, // 冬季蔬菜
    Mushroom,        // 食用菌
    Other,           // 其他
}

impl CropCategory {
    pub const ALL: [CropCategory; 6] = [
        CropCategory::Rice,
        CropCategory::Grain,
        CropCategory::Vegetable,
        CropCategory::WinterVegetable,
        CropCategory::Mushroom,
        CropCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropCategory::Rice => "rice",
            CropCategory::Grain => "grain",
            CropCategory::Vegetable => "vegetable",
            CropCategory::WinterVegetable => "winter_vegetable",
            CropCategory::Mushroom => "mushroom",
            CropCategory::Other => "other",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            CropCategory::Rice => "水稻",
            CropCategory::Grain => "粮食类",
            CropCategory::Vegetable => "普通蔬菜",
            CropCategory::WinterVegetable => "冬季蔬菜",
            CropCategory::Mushroom => "食用菌",
            CropCategory::Other => "其他",
        }
    }

    /// 粮食大类（含水稻），用于系数表与品类覆盖
    pub fn is_grain_family(&self) -> bool {
        matches!(self, CropCategory::Rice | CropCategory::Grain)
    }

    /// 蔬菜大类（含冬季蔬菜）
    pub fn is_vegetable_family(&self) -> bool {
        matches!(self, CropCategory::Vegetable | CropCategory::WinterVegetable)
    }

    /// 系数分组（弹性/规模经济/风险系数按大类取值）
    pub fn market_group(&self) -> MarketGroup {
        if self.is_grain_family() {
            MarketGroup::Grain
        } else if self.is_vegetable_family() {
            MarketGroup::Vegetable
        } else if matches!(self, CropCategory::Mushroom) {
            MarketGroup::Mushroom
        } else {
            MarketGroup::Other
        }
    }
}

impl fmt::Display for CropCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CropCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).to_lowercase().as_str() {
            "rice" | "水稻" => Ok(CropCategory::Rice),
            "grain" | "粮食类" | "粮食" => Ok(CropCategory::Grain),
            "vegetable" | "普通蔬菜" | "蔬菜" => Ok(CropCategory::Vegetable),
            "winter_vegetable" | "冬季蔬菜" => Ok(CropCategory::WinterVegetable),
            "mushroom" | "食用菌" => Ok(CropCategory::Mushroom),
            "other" | "其他" => Ok(CropCategory::Other),
            other => Err(format!("未知作物分类: {}", other)),
        }
    }
}

// ==========================================
// 市场大类 (Market Group)
// ==========================================
// 高级方案的弹性/规模/风险系数按此分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketGroup {
    Grain,
    Vegetable,
    Mushroom,
    Other,
}

impl MarketGroup {
    pub const ALL: [MarketGroup; 4] = [
        MarketGroup::Grain,
        MarketGroup::Vegetable,
        MarketGroup::Mushroom,
        MarketGroup::Other,
    ];

    pub fn title_cn(&self) -> &'static str {
        match self {
            MarketGroup::Grain => "粮食",
            MarketGroup::Vegetable => "蔬菜",
            MarketGroup::Mushroom => "食用菌",
            MarketGroup::Other => "其他",
        }
    }
}

// ==========================================
// 规划方案 (Planning Variant)
// ==========================================
// 调用时唯一的枚举参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningVariant {
    BaseScenarioOne, // 基础方案-情景一（超产滞销）
    BaseScenarioTwo, // 基础方案-情景二（超产五折）
    Strict,          // 严格方案（逐年漂移）
    Advanced,        // 高级方案（相关性/弹性/随机扰动）
}

impl PlanningVariant {
    pub const ALL: [PlanningVariant; 4] = [
        PlanningVariant::BaseScenarioOne,
        PlanningVariant::BaseScenarioTwo,
        PlanningVariant::Strict,
        PlanningVariant::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanningVariant::BaseScenarioOne => "base_1",
            PlanningVariant::BaseScenarioTwo => "base_2",
            PlanningVariant::Strict => "strict",
            PlanningVariant::Advanced => "advanced",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            PlanningVariant::BaseScenarioOne => "基础方案-超产滞销",
            PlanningVariant::BaseScenarioTwo => "基础方案-超产降价",
            PlanningVariant::Strict => "严格方案",
            PlanningVariant::Advanced => "高级相关性方案",
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(
            self,
            PlanningVariant::BaseScenarioOne | PlanningVariant::BaseScenarioTwo
        )
    }
}

impl Default for PlanningVariant {
    fn default() -> Self {
        PlanningVariant::BaseScenarioOne
    }
}

impl fmt::Display for PlanningVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanningVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base_1" | "base-1" | "base" | "1" | "scenario1" | "scenario_1" => {
                Ok(PlanningVariant::BaseScenarioOne)
            }
            "base_2" | "base-2" | "2" | "scenario2" | "scenario_2" => {
                Ok(PlanningVariant::BaseScenarioTwo)
            }
            "strict" => Ok(PlanningVariant::Strict),
            "advanced" | "correlated" => Ok(PlanningVariant::Advanced),
            other => Err(format!("未知规划方案: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_land_type_parse_with_trailing_space() {
        assert_eq!(
            "普通大棚 ".parse::<LandType>().unwrap(),
            LandType::OrdinaryGreenhouse
        );
        assert_eq!(" 水浇地".parse::<LandType>().unwrap(), LandType::Irrigated);
        assert_eq!(
            "smart_greenhouse".parse::<LandType>().unwrap(),
            LandType::SmartGreenhouse
        );
        assert!("沙地".parse::<LandType>().is_err());
    }

    #[test]
    fn test_season_parse() {
        assert_eq!("单季".parse::<Season>().unwrap(), Season::Single);
        assert_eq!("第二季 ".parse::<Season>().unwrap(), Season::Second);
        assert_eq!("First".parse::<Season>().unwrap(), Season::First);
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!(
            "1".parse::<PlanningVariant>().unwrap(),
            PlanningVariant::BaseScenarioOne
        );
        assert_eq!(
            "base-2".parse::<PlanningVariant>().unwrap(),
            PlanningVariant::BaseScenarioTwo
        );
        assert_eq!(
            "correlated".parse::<PlanningVariant>().unwrap(),
            PlanningVariant::Advanced
        );
        assert!("q4".parse::<PlanningVariant>().is_err());
    }

    #[test]
    fn test_market_group() {
        assert_eq!(CropCategory::Rice.market_group(), MarketGroup::Grain);
        assert_eq!(
            CropCategory::WinterVegetable.market_group(),
            MarketGroup::Vegetable
        );
        assert_eq!(CropCategory::Mushroom.market_group(), MarketGroup::Mushroom);
        assert_eq!(CropCategory::Other.market_group(), MarketGroup::Other);
    }
}
