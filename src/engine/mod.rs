// ==========================================
// 货运智能追踪系统 - 引擎层
// ==========================================
// 职责: 追踪补全（远程调用、进度、取消、事件）
// 约束: 严格顺序，同一时刻至多一个请求在途
// ==========================================

pub mod cancellation;
pub mod enrichment;
pub mod error;
pub mod events;
pub mod tracking_client;

// 重导出核心引擎
pub use cancellation::CancellationFlag;
pub use enrichment::{EnrichmentEngine, EnrichmentReport};
pub use error::{EnrichmentError, EnrichmentResult};
pub use events::{
    ChannelEventPublisher, EnrichmentEvent, EnrichmentEventPublisher, EnrichmentEventType,
    ItemOutcome, NoOpEventPublisher, Progress,
};
pub use tracking_client::{HttpTrackingClient, TrackRequest, TrackResponse, TrackingClient};
