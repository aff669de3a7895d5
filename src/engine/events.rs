// ==========================================
// 货运智能追踪系统 - 补全事件发布
// ==========================================
// 职责: 定义补全进度事件与发布 trait（观察者端口）
// 说明: 引擎只发布事件，任何展示层独立订阅；不需要共享可变全局状态
// ==========================================

use crate::domain::{Shipment, ShipmentField};
use serde::{Deserialize, Serialize};
use std::error::Error;
use tokio::sync::mpsc;

// ==========================================
// 补全事件类型
// ==========================================

/// 补全事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrichmentEventType {
    /// 单条开始（loading = true）
    ItemStarted,
    /// 单条结束（loading = false，进度前进）
    ItemFinished,
    /// 批次被取消
    RunCancelled,
    /// 批次完成
    RunFinished,
}

impl EnrichmentEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            EnrichmentEventType::ItemStarted => "ItemStarted",
            EnrichmentEventType::ItemFinished => "ItemFinished",
            EnrichmentEventType::RunCancelled => "RunCancelled",
            EnrichmentEventType::RunFinished => "RunFinished",
        }
    }
}

/// 进度（已处理 / 总数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// [0, 1] 区间的进度值（总数为 0 时为 0）
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// 0–100 百分比
    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }
}

/// 单条补全结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemOutcome {
    Succeeded,
    Failed { reason: String },
    Cancelled,
}

/// 补全事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentEvent {
    /// 补全批次 ID
    pub run_id: String,
    pub event_type: EnrichmentEventType,
    /// 相关货运 ID（批次级事件为 None）
    pub shipment_id: Option<usize>,
    /// 本次变更的字段
    pub changed_fields: Vec<ShipmentField>,
    pub outcome: Option<ItemOutcome>,
    pub progress: Progress,
    /// 事件发生时的货运快照
    pub snapshot: Option<Shipment>,
}

impl EnrichmentEvent {
    /// 单条开始事件
    pub fn item_started(run_id: &str, shipment: &Shipment, progress: Progress) -> Self {
        Self {
            run_id: run_id.to_string(),
            event_type: EnrichmentEventType::ItemStarted,
            shipment_id: Some(shipment.id),
            changed_fields: vec![ShipmentField::Loading],
            outcome: None,
            progress,
            snapshot: Some(shipment.clone()),
        }
    }

    /// 单条结束事件
    pub fn item_finished(
        run_id: &str,
        shipment: &Shipment,
        mut changed_fields: Vec<ShipmentField>,
        outcome: ItemOutcome,
        progress: Progress,
    ) -> Self {
        changed_fields.insert(0, ShipmentField::Loading);
        Self {
            run_id: run_id.to_string(),
            event_type: EnrichmentEventType::ItemFinished,
            shipment_id: Some(shipment.id),
            changed_fields,
            outcome: Some(outcome),
            progress,
            snapshot: Some(shipment.clone()),
        }
    }

    /// 批次级事件（取消 / 完成）
    pub fn run_level(run_id: &str, event_type: EnrichmentEventType, progress: Progress) -> Self {
        Self {
            run_id: run_id.to_string(),
            event_type,
            shipment_id: None,
            changed_fields: Vec::new(),
            outcome: None,
            progress,
            snapshot: None,
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 补全事件发布者 Trait
///
/// 发布失败只记录日志，不影响补全流程
pub trait EnrichmentEventPublisher: Send + Sync {
    fn publish(&self, event: EnrichmentEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
///
/// 用于不需要事件订阅的场景（如单元测试、批处理）
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl EnrichmentEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: EnrichmentEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::trace!(
            "NoOpEventPublisher: 跳过事件发布 - run_id={}, event_type={}",
            event.run_id,
            event.event_type.as_str()
        );
        Ok(())
    }
}

/// 通道事件发布者
///
/// 将事件推送到 tokio 无界通道，供展示层异步消费
#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    sender: mpsc::UnboundedSender<EnrichmentEvent>,
}

impl ChannelEventPublisher {
    /// 创建发布者与接收端
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EnrichmentEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EnrichmentEventPublisher for ChannelEventPublisher {
    fn publish(&self, event: EnrichmentEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.sender
            .send(event)
            .map_err(|e| format!("事件接收端已关闭: run_id={}", e.0.run_id).into())
    }
}
