// ==========================================
// 货运智能追踪系统 - 追踪补全引擎
// ==========================================
// 职责: 逐条调用远程追踪服务，原地更新货运实时字段
// 调度: 单消费者工作队列，严格按列表顺序，同一时刻至多一个请求在途
// 失败: 单条失败只标记该条（Error），不中断、不重试（重试由客户端配置决定）
// 取消: 每次出队前检查取消标志，并与在途请求竞争
// ==========================================

use crate::domain::Shipment;
use crate::engine::cancellation::CancellationFlag;
use crate::engine::events::{
    EnrichmentEvent, EnrichmentEventPublisher, EnrichmentEventType, ItemOutcome,
    NoOpEventPublisher, Progress,
};
use crate::engine::tracking_client::{TrackRequest, TrackingClient};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// EnrichmentReport - 补全批次报告
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentReport {
    pub run_id: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 因取消未完成的条数
    pub skipped: usize,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl EnrichmentReport {
    pub fn progress(&self) -> Progress {
        Progress::new(self.succeeded + self.failed, self.total)
    }
}

// ==========================================
// EnrichmentEngine - 补全引擎
// ==========================================
pub struct EnrichmentEngine<C>
where
    C: TrackingClient,
{
    client: C,
    publisher: Arc<dyn EnrichmentEventPublisher>,
}

impl<C> EnrichmentEngine<C>
where
    C: TrackingClient,
{
    /// 创建引擎（不发布事件）
    pub fn new(client: C) -> Self {
        Self {
            client,
            publisher: Arc::new(NoOpEventPublisher),
        }
    }

    /// 配置事件发布者
    pub fn with_publisher(mut self, publisher: Arc<dyn EnrichmentEventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn emit(&self, event: EnrichmentEvent) {
        if let Err(e) = self.publisher.publish(event) {
            warn!(error = %e, "补全事件发布失败");
        }
    }

    /// 执行一次补全批次
    ///
    /// # 流程（逐条）
    /// 1. loading = true，发布 ItemStarted
    /// 2. 调用追踪服务（无调用方超时；与取消信号竞争）
    /// 3. 成功 → 写入 live_eta / status / summary（缺失字段不变）
    /// 4. 失败 → status = "Error"，summary 为固定诊断文本
    /// 5. loading = false，进度前进，发布 ItemFinished
    ///
    /// # 返回
    /// - EnrichmentReport: 成功/失败/跳过计数与是否被取消
    #[instrument(skip_all, fields(run_id = tracing::field::Empty, total = shipments.len()))]
    pub async fn enrich(
        &self,
        shipments: &mut [Shipment],
        cancel: &CancellationFlag,
    ) -> EnrichmentReport {
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        let started_at = Utc::now();
        let total = shipments.len();
        let mut queue: VecDeque<usize> = (0..total).collect();
        let mut completed = 0;
        let mut succeeded = 0;
        let mut failed = 0;

        info!(total, "开始追踪补全");

        while !cancel.is_cancelled() {
            let Some(idx) = queue.pop_front() else {
                break;
            };
            let shipment = &mut shipments[idx];

            // === 步骤 1: 标记进行中 ===
            shipment.loading = true;
            self.emit(EnrichmentEvent::item_started(
                &run_id,
                shipment,
                Progress::new(completed, total),
            ));

            // === 步骤 2: 远程调用（唯一挂起点）===
            let request = TrackRequest::from(&*shipment);
            debug!(
                shipment_id = shipment.id,
                tracking_number = %request.tracking_number,
                shipment_type = %request.shipment_type,
                "发送追踪请求"
            );
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                res = self.client.track(&request) => Some(res),
            };

            // === 步骤 3-4: 写入结果 ===
            let (changed, outcome) = match result {
                None => {
                    shipment.loading = false;
                    info!(shipment_id = shipment.id, "在途请求被取消");
                    self.emit(EnrichmentEvent::item_finished(
                        &run_id,
                        shipment,
                        Vec::new(),
                        ItemOutcome::Cancelled,
                        Progress::new(completed, total),
                    ));
                    break;
                }
                Some(Ok(response)) => {
                    succeeded += 1;
                    (shipment.apply_update(&response.into()), ItemOutcome::Succeeded)
                }
                Some(Err(e)) => {
                    failed += 1;
                    warn!(
                        shipment_id = shipment.id,
                        tracking_number = %shipment.tracking_number,
                        error = %e,
                        "追踪补全失败"
                    );
                    (
                        shipment.mark_failed(),
                        ItemOutcome::Failed {
                            reason: e.to_string(),
                        },
                    )
                }
            };

            // === 步骤 5: 结束本条，进度前进 ===
            shipment.loading = false;
            completed += 1;
            let progress = Progress::new(completed, total);
            info!(
                shipment_id = shipment.id,
                progress = %format!("{:.0}%", progress.percent()),
                "追踪补全进度"
            );
            self.emit(EnrichmentEvent::item_finished(
                &run_id, shipment, changed, outcome, progress,
            ));
        }

        let cancelled = completed < total && cancel.is_cancelled();
        let progress = Progress::new(completed, total);
        if cancelled {
            warn!(completed, total, "追踪补全被取消");
            self.emit(EnrichmentEvent::run_level(
                &run_id,
                EnrichmentEventType::RunCancelled,
                progress,
            ));
        } else {
            info!(succeeded, failed, "追踪补全完成");
            self.emit(EnrichmentEvent::run_level(
                &run_id,
                EnrichmentEventType::RunFinished,
                progress,
            ));
        }

        EnrichmentReport {
            run_id,
            total,
            succeeded,
            failed,
            skipped: total - completed,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
