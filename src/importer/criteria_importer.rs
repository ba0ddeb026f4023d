// ==========================================
// 课程评教系统 - 评教指标 CSV 导入
// ==========================================
// 表头: criterion_id,name,description,weight,max_score
// 流程: 解析 → 逐行校验 → 重复/权重校验 → 单事务替换指标库
// 红线: 任一校验失败则整体不写入；旧指标只停用不删除
// ==========================================

use crate::domain::criteria::EvaluationCriteria;
use crate::engine::scoring::ScoringEngine;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::CriteriaRepository;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// CSV 单行（列名即表头）
#[derive(Debug, Deserialize)]
struct CriteriaCsvRow {
    criterion_id: String,
    name: String,
    #[serde(default)]
    description: String,
    weight: f64,
    max_score: i32,
}

// ==========================================
// CriteriaCsvImporter - 指标导入器
// ==========================================
pub struct CriteriaCsvImporter {
    repo: Arc<CriteriaRepository>,
}

impl CriteriaCsvImporter {
    pub fn new(repo: Arc<CriteriaRepository>) -> Self {
        Self { repo }
    }

    /// 从 CSV 文件导入并替换指标库
    ///
    /// # 返回
    /// - Ok(usize): 导入后启用的指标数量
    #[instrument(skip_all)]
    pub fn import_from_path<P: AsRef<Path>>(&self, path: P) -> ImportResult<usize> {
        let path = path.as_ref();
        info!(path = %path.display(), "开始导入评教指标");
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => {}
            other => {
                return Err(ImportError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        }

        let criteria = Self::parse_reader(File::open(path)?)?;
        self.apply(&criteria)
    }

    /// 从任意输入源导入并替换指标库
    pub fn import_from_reader<R: Read>(&self, reader: R) -> ImportResult<usize> {
        let criteria = Self::parse_reader(reader)?;
        self.apply(&criteria)
    }

    fn apply(&self, criteria: &[EvaluationCriteria]) -> ImportResult<usize> {
        let count = self.repo.replace_catalog(criteria)?;
        info!(count, "评教指标已导入");
        Ok(count)
    }

    /// 解析并校验 CSV，不写库
    pub fn parse_reader<R: Read>(reader: R) -> ImportResult<Vec<EvaluationCriteria>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut criteria = Vec::new();
        for (idx, result) in reader.deserialize::<CriteriaCsvRow>().enumerate() {
            // 行号按文件计（表头为第 1 行）
            let row_no = idx + 2;
            let row = result?;
            criteria.push(Self::validate_row(row, row_no)?);
        }

        if criteria.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let duplicates = ScoringEngine::find_duplicate_ids(&criteria);
        if !duplicates.is_empty() {
            warn!(?duplicates, "指标ID重复");
            return Err(ImportError::DuplicateCriterion(duplicates));
        }

        ScoringEngine::validate_weights(&criteria).map_err(|_| ImportError::WeightSumMismatch {
            actual: criteria.iter().map(|c| c.weight).sum(),
        })?;

        Ok(criteria)
    }

    fn validate_row(row: CriteriaCsvRow, row_no: usize) -> ImportResult<EvaluationCriteria> {
        if row.criterion_id.is_empty() {
            return Err(ImportError::PrimaryKeyMissing(row_no));
        }
        if row.name.is_empty() {
            return Err(ImportError::EmptyField {
                row: row_no,
                field: "name".to_string(),
            });
        }
        if !row.weight.is_finite() || !(0.0..=100.0).contains(&row.weight) {
            return Err(ImportError::ValueRangeError {
                row: row_no,
                field: "weight".to_string(),
                value: row.weight,
                min: 0.0,
                max: 100.0,
            });
        }
        if row.max_score <= 0 {
            return Err(ImportError::ValueRangeError {
                row: row_no,
                field: "max_score".to_string(),
                value: f64::from(row.max_score),
                min: 1.0,
                max: f64::from(i32::MAX),
            });
        }

        Ok(EvaluationCriteria::new(
            row.criterion_id,
            row.name,
            row.description,
            row.weight,
            row.max_score,
        ))
    }
}
