// ==========================================
// 农作物种植规划系统 - 运行配置管理
// ==========================================
// 职责: 运行配置加载、环境变量覆写、方案配置生成
// 查找顺序: 显式路径 → 用户配置目录 → 默认值
// ==========================================

use crate::config::scenario_profile::{
    ScenarioProfile, DEFAULT_FALLBACK_TIME_LIMIT_SECS, DEFAULT_TIME_LIMIT_SECS,
};
use crate::domain::types::PlanningVariant;
use crate::engine::error::{PlanningError, PlanningResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 配置键（环境变量名 / 用户配置目录）
pub mod config_keys {
    pub const APP_DIR: &str = "crop-rotation-planner";
    pub const CONFIG_FILE: &str = "config.json";

    pub const ENV_TIME_LIMIT_SECS: &str = "CROP_PLANNER_TIME_LIMIT_SECS";
    pub const ENV_FALLBACK_TIME_LIMIT_SECS: &str = "CROP_PLANNER_FALLBACK_TIME_LIMIT_SECS";
    pub const ENV_SEED: &str = "CROP_PLANNER_SEED";
}

/// 配置来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    UserConfigDir(PathBuf),
    Defaults,
}

// ==========================================
// RunConfig - 运行配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 数据目录（五张 CSV 表）
    pub data_dir: PathBuf,
    /// 输出目录
    pub out_dir: PathBuf,
    /// 依次运行的方案
    pub variants: Vec<PlanningVariant>,
    /// 随机种子（仅高级方案使用）
    pub seed: Option<u64>,
    pub time_limit_secs: u64,
    pub fallback_time_limit_secs: u64,
    /// 同时输出 model.lp
    pub export_lp: bool,
    /// JSON 格式日志
    pub json_logs: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            out_dir: PathBuf::from("output"),
            variants: PlanningVariant::ALL.to_vec(),
            seed: None,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            fallback_time_limit_secs: DEFAULT_FALLBACK_TIME_LIMIT_SECS,
            export_lp: false,
            json_logs: false,
        }
    }
}

impl RunConfig {
    /// 加载运行配置
    ///
    /// # 规则
    /// - 给定显式路径: 文件必须存在且可解析
    /// - 否则尝试 `<config_dir>/crop-rotation-planner/config.json`，不存在则用默认值
    /// - 最后应用环境变量覆写
    pub fn load(explicit: Option<&Path>) -> PlanningResult<(Self, ConfigSource)> {
        let (mut config, source) = match explicit {
            Some(path) => (Self::from_file(path)?, ConfigSource::Explicit(path.to_path_buf())),
            None => match Self::user_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    let config = Self::from_file(&path)?;
                    (config, ConfigSource::UserConfigDir(path))
                }
                None => (Self::default(), ConfigSource::Defaults),
            },
        };

        config.apply_env_overrides_from(|key| std::env::var(key).ok())?;
        tracing::debug!(source = ?source, "运行配置已加载");
        Ok((config, source))
    }

    /// 从 JSON 文件读取（缺失字段取默认值）
    pub fn from_file(path: &Path) -> PlanningResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            PlanningError::Config(format!("读取配置文件失败 {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            PlanningError::Config(format!("配置文件格式错误 {}: {}", path.display(), e))
        })
    }

    /// 用户配置目录下的配置文件路径
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(config_keys::APP_DIR).join(config_keys::CONFIG_FILE))
    }

    /// 应用环境变量覆写
    ///
    /// # 参数
    /// - lookup: 变量名 → 取值（测试时可注入）
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> PlanningResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(config_keys::ENV_TIME_LIMIT_SECS) {
            self.time_limit_secs = parse_env(config_keys::ENV_TIME_LIMIT_SECS, &v)?;
        }
        if let Some(v) = lookup(config_keys::ENV_FALLBACK_TIME_LIMIT_SECS) {
            self.fallback_time_limit_secs = parse_env(config_keys::ENV_FALLBACK_TIME_LIMIT_SECS, &v)?;
        }
        if let Some(v) = lookup(config_keys::ENV_SEED) {
            self.seed = Some(parse_env(config_keys::ENV_SEED, &v)?);
        }
        Ok(())
    }

    /// 按配置生成各方案的 ScenarioProfile
    pub fn profiles(&self) -> Vec<ScenarioProfile> {
        self.variants
            .iter()
            .map(|&variant| {
                ScenarioProfile::for_variant(variant, self.seed)
                    .with_time_limits(self.time_limit_secs, self.fallback_time_limit_secs)
            })
            .collect()
    }
}

fn parse_env(key: &str, value: &str) -> PlanningResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| PlanningError::Config(format!("环境变量 {}={} 无效: {}", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"variants": ["strict"], "seed": 7}"#).unwrap();

        let (config, source) = RunConfig::load(Some(&path)).unwrap();
        assert_eq!(source, ConfigSource::Explicit(path.clone()));
        assert_eq!(config.variants, vec![PlanningVariant::Strict]);
        assert_eq!(config.out_dir, PathBuf::from("output"));
        assert_eq!(config.fallback_time_limit_secs, DEFAULT_FALLBACK_TIME_LIMIT_SECS);
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempdir().unwrap();
        let err = RunConfig::load(Some(&dir.path().join("missing.json"))).unwrap_err();
        assert!(matches!(err, PlanningError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (config_keys::ENV_TIME_LIMIT_SECS, "30"),
            (config_keys::ENV_SEED, "99"),
        ]);
        let mut config = RunConfig::default();
        config
            .apply_env_overrides_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.time_limit_secs, 30);
        assert_eq!(config.fallback_time_limit_secs, DEFAULT_FALLBACK_TIME_LIMIT_SECS);
        assert_eq!(config.seed, Some(99));

        let bad = |k: &str| (k == config_keys::ENV_SEED).then(|| "abc".to_string());
        assert!(config.apply_env_overrides_from(bad).is_err());
    }

    #[test]
    fn test_profiles_carry_seed_and_limits() {
        let config = RunConfig {
            variants: vec![PlanningVariant::BaseScenarioOne, PlanningVariant::Advanced],
            seed: Some(42),
            time_limit_secs: 60,
            fallback_time_limit_secs: 20,
            ..RunConfig::default()
        };
        let profiles = config.profiles();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1].random_seed, Some(42));
        assert_eq!(profiles[0].time_limit_secs, 60);
        assert_eq!(profiles[0].fallback.time_limit_secs, 20);
    }
}
