// ==========================================
// 农作物种植规划系统 - Eligibility Core 纯函数库
// ==========================================
// 职责: (地块类型, 季次, 作物) 可种判定 + 作物分类
// 红线: 无状态、无副作用、无 I/O；三种方案只调用这一份实现
// ==========================================

use crate::domain::crop::Crop;
use crate::domain::types::{CropCategory, LandType, Season};

// 冬季蔬菜（只能种在水浇地第二季）
const WINTER_VEGETABLES: &[&str] = &[
    "大白菜",
    "白萝卜",
    "红萝卜",
    "chinese_cabbage",
    "white_radish",
    "red_radish",
];

// 食用菌（只能种在普通大棚第二季）
const MUSHROOMS: &[&str] = &["香菇", "羊肚菌", "白灵菇", "榆黄菇"];

const RICE_NAMES: &[&str] = &["水稻", "rice"];

// ==========================================
// EligibilityCore - 纯函数工具类
// ==========================================
pub struct EligibilityCore;

impl EligibilityCore {
    /// 判定 (地块类型, 季次, 作物分类) 是否可种
    ///
    /// # 规则
    /// - 平旱地/梯田/山坡地: 仅单季，仅粮食（不含水稻）
    /// - 水浇地: 单季 → 水稻；第一季 → 普通蔬菜；第二季 → 冬季蔬菜
    /// - 普通大棚: 第一季 → 普通蔬菜；第二季 → 食用菌
    /// - 智慧大棚: 第一季/第二季 → 普通蔬菜
    /// - 其余组合一律不可种
    ///
    /// # 返回
    /// 对全部组合都有定义（total）
    pub fn is_eligible(land_type: LandType, season: Season, category: CropCategory) -> bool {
        use CropCategory as C;
        use LandType as L;
        use Season as S;

        match (land_type, season) {
            (L::Plain | L::Terrace | L::Hillside, S::Single) => category == C::Grain,
            (L::Irrigated, S::Single) => category == C::Rice,
            (L::Irrigated, S::First) => category == C::Vegetable,
            (L::Irrigated, S::Second) => category == C::WinterVegetable,
            (L::OrdinaryGreenhouse, S::First) => category == C::Vegetable,
            (L::OrdinaryGreenhouse, S::Second) => category == C::Mushroom,
            (L::SmartGreenhouse, S::First | S::Second) => category == C::Vegetable,
            _ => false,
        }
    }

    /// 以作物实体判定
    pub fn is_crop_eligible(land_type: LandType, season: Season, crop: &Crop) -> bool {
        Self::is_eligible(land_type, season, crop.category)
    }

    /// 以原始标签判定（先做空白归一化）
    ///
    /// 无法识别的地块类型或季次返回 false
    pub fn is_eligible_label(land_label: &str, season_label: &str, category: CropCategory) -> bool {
        match (land_label.parse::<LandType>(), season_label.parse::<Season>()) {
            (Ok(land_type), Ok(season)) => Self::is_eligible(land_type, season, category),
            _ => false,
        }
    }

    /// 该地块类型存在的季次
    pub fn seasons_for(land_type: LandType) -> &'static [Season] {
        if land_type.supports_double_season() {
            if land_type == LandType::Irrigated {
                &[Season::Single, Season::First, Season::Second]
            } else {
                &[Season::First, Season::Second]
            }
        } else {
            &[Season::Single]
        }
    }

    /// 作物分类（按名称 + 类型标签，先匹配先得）
    ///
    /// # 规则
    /// 1. 名称为水稻 → rice
    /// 2. 类型含 "粮食" → grain
    /// 3. 名称属冬季蔬菜 → winter_vegetable
    /// 4. 名称属食用菌，或类型含 "食用菌" → mushroom
    /// 5. 类型含 "蔬菜" → vegetable
    /// 6. 其他 → other
    pub fn classify_crop(name: &str, type_label: &str) -> CropCategory {
        let name = crate::domain::types::normalize_label(name);
        let type_label = crate::domain::types::normalize_label(type_label).to_lowercase();

        if RICE_NAMES.iter().any(|n| name.eq_ignore_ascii_case(n)) {
            CropCategory::Rice
        } else if type_label.contains("粮食") || type_label.contains("grain") {
            CropCategory::Grain
        } else if WINTER_VEGETABLES.iter().any(|n| name.eq_ignore_ascii_case(n)) {
            CropCategory::WinterVegetable
        } else if MUSHROOMS.contains(&name.as_str())
            || type_label.contains("食用菌")
            || type_label.contains("mushroom")
        {
            CropCategory::Mushroom
        } else if type_label.contains("蔬菜") || type_label.contains("vegetable") {
            CropCategory::Vegetable
        } else {
            CropCategory::Other
        }
    }

    /// 由类型标签识别豆类
    pub fn detect_legume(type_label: &str) -> bool {
        let label = type_label.to_lowercase();
        label.contains("豆类") || label.contains("legume")
    }

    /// 构建作物实体（分类在此处派生，之后不再重算）
    pub fn classify(
        id: u32,
        name: &str,
        type_label: &str,
        legume_flag: Option<bool>,
    ) -> Crop {
        let category = Self::classify_crop(name, type_label);
        let is_legume = legume_flag.unwrap_or_else(|| Self::detect_legume(type_label));
        Crop::new(id, name.trim(), type_label.trim(), category, is_legume)
    }
}
