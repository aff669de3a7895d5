// ==========================================
// 货运智能追踪系统 - 追踪 API
// ==========================================
// 职责: 串联 导入 → 补全 → 导出 全流程
// 约束: 无可追踪记录时不补全、不导出（返回 None）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::TrackerConfig;
use crate::domain::{HeaderMode, Shipment};
use crate::engine::{
    CancellationFlag, EnrichmentEngine, EnrichmentEventPublisher, EnrichmentReport,
    HttpTrackingClient, TrackingClient,
};
use crate::exporter::{reconcile, TableWriter, UniversalTableWriter};
use crate::importer::{ImportOutcome, ShipmentImporter};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// 导出结果
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// 一次完整追踪的结果
#[derive(Debug, Clone, Serialize)]
pub struct TrackRunResponse {
    pub header_mode: HeaderMode,
    pub total_rows: usize,
    pub dropped_rows: usize,
    pub report: EnrichmentReport,
    pub export: ExportSummary,
    pub shipments: Vec<Shipment>,
}

/// 追踪 API
pub struct TrackerApi {
    config: TrackerConfig,
    importer: ShipmentImporter,
    writer: Box<dyn TableWriter>,
}

impl TrackerApi {
    /// 按配置创建 API 实例
    pub fn new(config: TrackerConfig) -> Self {
        let writer = Box::new(UniversalTableWriter::new(config.export.sheet_name.clone()));
        Self {
            config,
            importer: ShipmentImporter::default(),
            writer,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// 导入文件（解析 → 标准化 → 分类）
    pub fn import(&self, input: &Path) -> ApiResult<ImportOutcome> {
        Ok(self.importer.import_file(input)?)
    }

    /// 按后端配置创建 HTTP 追踪客户端
    pub fn http_client(&self) -> ApiResult<HttpTrackingClient> {
        Ok(HttpTrackingClient::from_config(&self.config.backend)?)
    }

    /// 导出货运列表
    ///
    /// # 参数
    /// - shipments: 补全后的货运列表
    /// - output: 输出路径（缺省为配置中的默认文件名）
    ///
    /// # 返回
    /// - Ok(None): 列表为空，不导出
    /// - Ok(Some(ExportSummary)): 导出文件信息
    #[instrument(skip(self, shipments, output), fields(count = shipments.len()))]
    pub fn export(
        &self,
        shipments: &[Shipment],
        output: Option<&Path>,
    ) -> ApiResult<Option<ExportSummary>> {
        if shipments.is_empty() {
            info!("无可导出记录，跳过导出");
            return Ok(None);
        }

        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.config.export.default_file_name));
        if path.as_os_str().is_empty() {
            return Err(ApiError::InvalidInput("输出路径为空".to_string()));
        }

        let table = reconcile(shipments);
        self.writer.write_table(&table, &path)?;

        info!(path = %path.display(), rows = table.rows.len(), "导出完成");
        Ok(Some(ExportSummary {
            path,
            rows: table.rows.len(),
            columns: table.headers.len(),
        }))
    }

    /// 使用 HTTP 客户端执行完整追踪流程
    pub async fn track_file(
        &self,
        input: &Path,
        output: Option<&Path>,
        publisher: Arc<dyn EnrichmentEventPublisher>,
        cancel: &CancellationFlag,
    ) -> ApiResult<Option<TrackRunResponse>> {
        let client = self.http_client()?;
        self.track_file_with(client, input, output, publisher, cancel)
            .await
    }

    /// 使用给定追踪客户端执行完整追踪流程
    ///
    /// # 流程
    /// 1. 导入（失败即返回错误，无部分结果）
    /// 2. 无可追踪记录 → Ok(None)
    /// 3. 逐条补全（单条失败不中断；取消后保留已完成结果）
    /// 4. 合并导出
    #[instrument(skip(self, client, input, output, publisher, cancel), fields(input = %input.display()))]
    pub async fn track_file_with<C>(
        &self,
        client: C,
        input: &Path,
        output: Option<&Path>,
        publisher: Arc<dyn EnrichmentEventPublisher>,
        cancel: &CancellationFlag,
    ) -> ApiResult<Option<TrackRunResponse>>
    where
        C: TrackingClient,
    {
        let outcome = self.import(input)?;
        if outcome.is_empty() {
            info!(dropped = outcome.dropped_rows, "无可追踪记录");
            return Ok(None);
        }

        let ImportOutcome {
            header_mode,
            total_rows,
            dropped_rows,
            mut shipments,
        } = outcome;

        let engine = EnrichmentEngine::new(client).with_publisher(publisher);
        let report = engine.enrich(&mut shipments, cancel).await;

        let export = self
            .export(&shipments, output)?
            .ok_or_else(|| ApiError::InvalidInput("货运列表为空，无法导出".to_string()))?;

        Ok(Some(TrackRunResponse {
            header_mode,
            total_rows,
            dropped_rows,
            report,
            export,
            shipments,
        }))
    }
}
