// ==========================================
// 农作物种植规划系统 - 可行种植方案目录
// ==========================================
// 职责: 数据集 × 可种判定 → ViableOption 集合
// 红线: 目录中每一项都满足 is_eligible；构建后只读，跨方案共享
// ==========================================

use crate::domain::crop::CropId;
use crate::domain::dataset::Dataset;
use crate::domain::types::{LandType, Season};
use crate::engine::eligibility_core::EligibilityCore;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// 可行种植方案（地块类型, 季次, 作物）+ 基准年单位经济参数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViableOption {
    pub land_type: LandType,
    pub season: Season,
    pub crop_id: CropId,
    pub yield_per_mu: f64,
    pub cost_per_mu: f64,
    pub price_avg: f64,
    pub synthetic: bool,
}

impl ViableOption {
    pub fn unit_profit(&self) -> f64 {
        self.yield_per_mu * self.price_avg - self.cost_per_mu
    }
}

/// 被判定过滤掉的统计行
#[derive(Debug, Clone, Serialize)]
pub struct RejectedStatistic {
    pub land_type: LandType,
    pub season: Season,
    pub crop_id: CropId,
    pub reason: String,
}

/// 目录概况
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub total_options: usize,
    pub synthetic_options: usize,
    pub rejected_statistics: usize,
    /// 地块类型 → 可行方案数
    pub by_land_type: BTreeMap<LandType, usize>,
}

// ==========================================
// OptionCatalog
// ==========================================
#[derive(Debug, Clone)]
pub struct OptionCatalog {
    options: Vec<ViableOption>,
    by_land_type: BTreeMap<LandType, Vec<usize>>,
    rejected: Vec<RejectedStatistic>,
}

impl OptionCatalog {
    /// 由数据集构建目录
    ///
    /// # 规则
    /// - 每条统计行按 is_eligible 过滤
    /// - 作物不存在的统计行丢弃
    /// - 同一 (land_type, season, crop) 重复时保留第一条
    /// - 结果按 (land_type, season, crop_id) 排序，保证下游确定性
    pub fn build(dataset: &Dataset) -> Self {
        let mut options = Vec::new();
        let mut rejected = Vec::new();
        let mut seen = HashSet::new();

        for stat in dataset.statistics() {
            let crop = match dataset.crop(stat.crop_id) {
                Some(c) => c,
                None => {
                    rejected.push(RejectedStatistic {
                        land_type: stat.land_type,
                        season: stat.season,
                        crop_id: stat.crop_id,
                        reason: "作物不存在".to_string(),
                    });
                    continue;
                }
            };

            if !EligibilityCore::is_crop_eligible(stat.land_type, stat.season, crop) {
                debug!(
                    land_type = %stat.land_type,
                    season = %stat.season,
                    crop = %crop.name,
                    "统计行不满足种植规则，跳过"
                );
                rejected.push(RejectedStatistic {
                    land_type: stat.land_type,
                    season: stat.season,
                    crop_id: stat.crop_id,
                    reason: format!(
                        "{}{}不可种{}",
                        stat.land_type.title_cn(),
                        stat.season.title_cn(),
                        crop.category.title_cn()
                    ),
                });
                continue;
            }

            if !seen.insert((stat.land_type, stat.season, stat.crop_id)) {
                warn!(
                    land_type = %stat.land_type,
                    season = %stat.season,
                    crop_id = stat.crop_id,
                    "重复的种植统计，保留首条"
                );
                continue;
            }

            options.push(ViableOption {
                land_type: stat.land_type,
                season: stat.season,
                crop_id: stat.crop_id,
                yield_per_mu: stat.yield_per_mu,
                cost_per_mu: stat.cost_per_mu,
                price_avg: stat.price_avg,
                synthetic: stat.synthetic,
            });
        }

        options.sort_by_key(|o| (o.land_type, o.season, o.crop_id));

        let mut by_land_type: BTreeMap<LandType, Vec<usize>> = BTreeMap::new();
        for (idx, opt) in options.iter().enumerate() {
            by_land_type.entry(opt.land_type).or_default().push(idx);
        }

        info!(
            options = options.len(),
            rejected = rejected.len(),
            "可行种植方案目录构建完成"
        );

        Self {
            options,
            by_land_type,
            rejected,
        }
    }

    pub fn options(&self) -> &[ViableOption] {
        &self.options
    }

    pub fn option(&self, idx: usize) -> Option<&ViableOption> {
        self.options.get(idx)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// 某地块类型的全部可行方案（下标, 方案）
    pub fn options_for_land(
        &self,
        land_type: LandType,
    ) -> impl Iterator<Item = (usize, &ViableOption)> + '_ {
        self.by_land_type
            .get(&land_type)
            .into_iter()
            .flatten()
            .map(move |&idx| (idx, &self.options[idx]))
    }

    pub fn find(&self, land_type: LandType, season: Season, crop_id: CropId) -> Option<&ViableOption> {
        self.options_for_land(land_type)
            .map(|(_, o)| o)
            .find(|o| o.season == season && o.crop_id == crop_id)
    }

    /// 可交易：作物预期销量严格为正
    pub fn is_tradeable(option: &ViableOption, dataset: &Dataset) -> bool {
        dataset.demand(option.crop_id) > 0.0
    }

    pub fn tradeable<'a>(&'a self, dataset: &'a Dataset) -> impl Iterator<Item = &'a ViableOption> {
        self.options
            .iter()
            .filter(move |o| Self::is_tradeable(o, dataset))
    }

    pub fn rejected(&self) -> &[RejectedStatistic] {
        &self.rejected
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            total_options: self.options.len(),
            synthetic_options: self.options.iter().filter(|o| o.synthetic).count(),
            rejected_statistics: self.rejected.len(),
            by_land_type: self
                .by_land_type
                .iter()
                .map(|(k, v)| (*k, v.len()))
                .collect(),
        }
    }
}
