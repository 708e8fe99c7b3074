// ==========================================
// 农作物种植规划系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 数值与价格区间解析 / 布尔解析
// ==========================================

pub struct DataCleaner;

/// 视为空值的单元格文本（比较前已 TRIM 并转小写）
const NULL_TOKENS: &[&str] = &["", "nan", "null", "none", "n/a", "#n/a"];

/// 数值单元格中允许出现并剥离的单位
const UNIT_TOKENS: &[&str] = &["元/斤", "元/亩", "斤/亩", "元", "斤", "亩", "/", ","];

impl DataCleaner {
    pub fn clean_text(&self, value: &str) -> String {
        value.trim().to_string()
    }

    /// 空白 / NaN / NULL 等统一为 None
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if NULL_TOKENS.contains(&trimmed.to_lowercase().as_str()) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 解析数值（剥离单位与千分位）
    pub fn parse_number(&self, value: &str) -> Option<f64> {
        let stripped = self.strip_units(value);
        stripped.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// 解析销售单价
    ///
    /// # 规则
    /// - 单个数字 → 原值
    /// - "a-b" 区间 → (a + b) / 2
    pub fn parse_price(&self, value: &str) -> Option<f64> {
        let stripped = self.strip_units(value);
        let normalized = stripped.replace(['~', '～', '—', '－'], "-");

        match normalized.split_once('-') {
            Some((low, high)) if !low.is_empty() => {
                let low = low.trim().parse::<f64>().ok()?;
                let high = high.trim().parse::<f64>().ok()?;
                Some((low + high) / 2.0)
            }
            _ => normalized.parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// 解析是否标记（是/否、1/0、true/false、y/n）
    pub fn parse_bool(&self, value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "是" | "1" | "true" | "y" | "yes" => Some(true),
            "否" | "0" | "false" | "n" | "no" => Some(false),
            _ => None,
        }
    }

    /// 解析作物编号（容忍 "6.0" 这类浮点写法）
    pub fn parse_id(&self, value: &str) -> Option<u32> {
        let trimmed = value.trim();
        if let Ok(id) = trimmed.parse::<u32>() {
            return Some(id);
        }
        let as_float = trimmed.parse::<f64>().ok()?;
        if as_float >= 0.0 && as_float.fract() == 0.0 && as_float <= u32::MAX as f64 {
            Some(as_float as u32)
        } else {
            None
        }
    }

    fn strip_units(&self, value: &str) -> String {
        let mut s = value.trim().to_string();
        for token in UNIT_TOKENS {
            s = s.replace(token, "");
        }
        s.trim().to_string()
    }
}
