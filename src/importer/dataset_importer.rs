// ==========================================
// 农作物种植规划系统 - CSV 数据集导入器
// ==========================================
// 职责: 整合导入流程，从数据目录到只读 Dataset
// 流程: 解析 → 映射 → 补齐 → 派生 → 校验 → 构建
// ==========================================

use crate::domain::Dataset;
use crate::importer::dataset_importer_trait::{DatasetImporter, FileParser};
use crate::importer::derivation::DerivationService;
use crate::importer::dq_validator::{DatasetValidator, DqSummary};
use crate::importer::error::{DataError, DataResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{CsvParser, RawTable};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

// ===== 数据目录内的表文件名 =====
pub const PARCELS_FILE: &str = "parcels.csv";
pub const CROPS_FILE: &str = "crops.csv";
pub const STATISTICS_FILE: &str = "statistics.csv";
pub const DEMAND_FILE: &str = "demand.csv";
pub const PRIOR_PLANTING_FILE: &str = "prior_planting.csv";

// ==========================================
// CsvDatasetImporter
// ==========================================
pub struct CsvDatasetImporter {
    file_parser: Box<dyn FileParser>,
    field_mapper: FieldMapper,
    derivation_service: DerivationService,
    validator: DatasetValidator,
}

impl Default for CsvDatasetImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvDatasetImporter {
    pub fn new() -> Self {
        Self::with_parser(Box::new(CsvParser))
    }

    /// 使用自定义文件解析器
    pub fn with_parser(file_parser: Box<dyn FileParser>) -> Self {
        Self {
            file_parser,
            field_mapper: FieldMapper::new(),
            derivation_service: DerivationService,
            validator: DatasetValidator,
        }
    }

    fn read_required(&self, data_dir: &Path, table: &str, file: &str) -> DataResult<RawTable> {
        let path = data_dir.join(file);
        if !path.exists() {
            return Err(DataError::MissingTable(path.display().to_string()));
        }
        self.file_parser.parse_table(table, &path)
    }

    fn read_optional(&self, data_dir: &Path, table: &str, file: &str) -> DataResult<Option<RawTable>> {
        let path = data_dir.join(file);
        if !path.exists() {
            return Ok(None);
        }
        self.file_parser.parse_table(table, &path).map(Some)
    }

    /// 导入并返回数据质量摘要（供 CLI 展示）
    #[instrument(skip(self, data_dir), fields(data_dir = %data_dir.display()))]
    pub fn load_with_summary(&self, data_dir: &Path) -> DataResult<(Dataset, DqSummary)> {
        let start_time = Instant::now();

        if !data_dir.is_dir() {
            return Err(DataError::FileNotFound(data_dir.display().to_string()));
        }
        info!("开始导入数据集");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let parcels_raw = self.read_required(data_dir, "parcels", PARCELS_FILE)?;
        let crops_raw = self.read_required(data_dir, "crops", CROPS_FILE)?;
        let statistics_raw = self.read_required(data_dir, "statistics", STATISTICS_FILE)?;
        let prior_raw = self.read_required(data_dir, "prior_planting", PRIOR_PLANTING_FILE)?;
        let demand_raw = self.read_optional(data_dir, "demand", DEMAND_FILE)?;

        // === 步骤 2: 字段映射（作物分类在此派生） ===
        debug!("步骤 2: 字段映射");
        let parcels = self.field_mapper.map_parcels(&parcels_raw)?;
        let crops = self.field_mapper.map_crops(&crops_raw)?;
        let mut statistics = self.field_mapper.map_statistics(&statistics_raw)?;
        let prior = self.field_mapper.map_prior_planting(&prior_raw)?;

        // === 步骤 3: 智慧大棚第一季补齐 ===
        debug!("步骤 3: 智慧大棚第一季补齐");
        let supplemented = self
            .derivation_service
            .supplement_smart_greenhouse(&mut statistics, &crops);
        if supplemented > 0 {
            info!(rows = supplemented, "智慧大棚第一季沿用普通大棚统计");
        }

        // === 步骤 4: 预期销售量 ===
        debug!("步骤 4: 预期销售量");
        let demand = match demand_raw {
            Some(table) => self.field_mapper.map_demand(&table)?,
            None => {
                warn!(file = DEMAND_FILE, "未提供预期销售量表，按上一年种植派生");
                self.derivation_service
                    .derive_expected_demand(&prior, &parcels, &statistics)
            }
        };

        // === 步骤 5: 数据质量校验 ===
        debug!("步骤 5: 数据质量校验");
        let summary = self
            .validator
            .validate(&parcels, &crops, &statistics, &demand, &prior)?;

        let dataset = Dataset::new(parcels, crops, statistics, demand, prior);

        info!(
            parcels = summary.parcels,
            crops = summary.crops,
            statistics = summary.statistics,
            synthetic = summary.synthetic_statistics,
            demand_entries = summary.demand_entries,
            legume_history = dataset.legume_history().len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "数据集导入完成"
        );

        Ok((dataset, summary))
    }
}

impl DatasetImporter for CsvDatasetImporter {
    fn load(&self, data_dir: &Path) -> DataResult<Dataset> {
        self.load_with_summary(data_dir).map(|(dataset, _)| dataset)
    }
}
