// ==========================================
// 货运智能追踪系统 - API 层
// ==========================================
// 职责: 对外业务接口（命令行等调用方使用）
// ==========================================

pub mod error;
pub mod tracker_api;

pub use error::{ApiError, ApiResult};
pub use tracker_api::{ExportSummary, TrackRunResponse, TrackerApi};
