// ==========================================
// 货运智能追踪系统 - 货运导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到货运列表
// 流程: 解析 → 标准化 → 分类过滤 → 编号
// 说明: 导入后不再有任何 I/O
// ==========================================

use crate::domain::{HeaderMode, Shipment};
use crate::importer::classifier::ShipmentClassifier;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::RowNormalizer;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{FieldMapper, FileParser};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, info, instrument};

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub header_mode: HeaderMode,
    /// 解析得到的非空行数
    pub total_rows: usize,
    /// 过滤丢弃的行数
    pub dropped_rows: usize,
    pub shipments: Vec<Shipment>,
}

impl ImportOutcome {
    /// 无可追踪记录（不视为错误，不触发补全与导出）
    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }
}

// ==========================================
// ShipmentImporter - 货运导入器
// ==========================================
pub struct ShipmentImporter {
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    classifier: ShipmentClassifier,
}

impl Default for ShipmentImporter {
    fn default() -> Self {
        Self::new(Box::new(UniversalFileParser), Box::new(RowNormalizer))
    }
}

impl ShipmentImporter {
    /// 创建新的 ShipmentImporter 实例
    ///
    /// # 参数
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段标准化器
    pub fn new(file_parser: Box<dyn FileParser>, field_mapper: Box<dyn FieldMapper>) -> Self {
        Self {
            file_parser,
            field_mapper,
            classifier: ShipmentClassifier,
        }
    }

    /// 从文件导入货运列表
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 表头模式、行数统计、货运列表
    /// - Err: 文件无法解析（导入失败，无部分结果）
    #[instrument(skip(self, file_path), fields(file_path = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportOutcome> {
        info!("开始导入货运数据");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let sheet = self
            .file_parser
            .parse_sheet(file_path.as_ref())
            .map_err(|e| {
                error!(error = %e, "文件解析失败");
                e
            })?;

        let total_rows = sheet.rows.len();
        info!(
            total_rows,
            header_mode = %sheet.header_mode,
            columns = sheet.headers.len(),
            "文件解析完成"
        );

        // === 步骤 2-3: 标准化 + 分类过滤 ===
        debug!("步骤 2: 标准化与分类");
        let (shipments, dropped_rows) = self
            .classifier
            .classify_rows(self.field_mapper.as_ref(), sheet.rows);

        info!(
            shipments = shipments.len(),
            dropped = dropped_rows,
            "货运分类完成"
        );

        Ok(ImportOutcome {
            header_mode: sheet.header_mode,
            total_rows,
            dropped_rows,
            shipments,
        })
    }
}
