// ==========================================
// 货运智能追踪系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含 I/O，不含引擎逻辑
// ==========================================

pub mod raw_row;
pub mod shipment;
pub mod types;

// 重导出核心类型
pub use raw_row::{CellValue, RawRow};
pub use shipment::{
    NormalizedFields, Shipment, ShipmentField, TrackingUpdate, ETA_NOT_AVAILABLE,
    FAILURE_STATUS, FAILURE_SUMMARY, UNKNOWN_CARRIER,
};
pub use types::{EtaAlignment, HeaderMode, ShipmentType, StatusTone};
