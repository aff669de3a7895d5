// ==========================================
// 货运智能追踪系统 - 货运实体
// ==========================================
// 职责: 标准化字段 / 货运记录 / 追踪结果更新
// 生命周期: 分类器创建一次 → 补全引擎独占修改 → 对账导出只读
// ==========================================

use crate::domain::raw_row::{CellValue, RawRow};
use crate::domain::types::{EtaAlignment, ShipmentType, StatusTone};
use serde::{Deserialize, Serialize};

/// 承运人缺失时的显示名
pub const UNKNOWN_CARRIER: &str = "Unknown";

/// 系统 ETA 缺失时的占位
pub const ETA_NOT_AVAILABLE: &str = "N/A";

/// 补全失败时写入的状态
pub const FAILURE_STATUS: &str = "Error";

/// 补全失败时写入的摘要
pub const FAILURE_SUMMARY: &str = "Failed to connect to backend";

// ==========================================
// NormalizedFields - 标准化字段
// ==========================================
// 由 RawRow 纯函数派生；未命中的列原样透传
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedFields {
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub system_eta: Option<String>,
    /// 未映射列（保持原列顺序）
    pub passthrough: Vec<(String, CellValue)>,
}

// ==========================================
// Shipment - 货运记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// 过滤后序号（0 起，连续无空洞）
    pub id: usize,
    pub tracking_number: String,
    /// 规范化承运人名称
    pub carrier: String,
    #[serde(rename = "type")]
    pub shipment_type: ShipmentType,
    pub system_eta: String,

    // ===== 补全字段（仅补全引擎写入）=====
    pub live_eta: Option<String>,
    pub status: Option<String>,
    pub summary: Option<String>,
    /// 追踪请求进行中（同一时刻至多一条为 true）
    pub loading: bool,

    /// 原始行，导出时原样回写
    pub raw: RawRow,
}

impl Shipment {
    /// 应用一次成功的追踪结果（缺失字段保持不变）
    pub fn apply_update(&mut self, update: &TrackingUpdate) -> Vec<ShipmentField> {
        let mut changed = Vec::new();
        if let Some(eta) = &update.live_eta {
            self.live_eta = Some(eta.clone());
            changed.push(ShipmentField::LiveEta);
        }
        if let Some(status) = &update.status {
            self.status = Some(status.clone());
            changed.push(ShipmentField::Status);
        }
        if let Some(summary) = &update.summary {
            self.summary = Some(summary.clone());
            changed.push(ShipmentField::Summary);
        }
        changed
    }

    /// 标记补全失败（固定状态与摘要）
    pub fn mark_failed(&mut self) -> Vec<ShipmentField> {
        self.status = Some(FAILURE_STATUS.to_string());
        self.summary = Some(FAILURE_SUMMARY.to_string());
        vec![ShipmentField::Status, ShipmentField::Summary]
    }

    /// 严格字符串比较；live_eta 缺失视为已变更
    pub fn eta_changed(&self) -> bool {
        self.live_eta.as_deref() != Some(self.system_eta.as_str())
    }

    pub fn status_tone(&self) -> StatusTone {
        StatusTone::from_status(self.status.as_deref())
    }

    pub fn eta_alignment(&self) -> EtaAlignment {
        EtaAlignment::compare(&self.system_eta, self.live_eta.as_deref())
    }
}

// ==========================================
// TrackingUpdate - 追踪结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub live_eta: Option<String>,
    pub status: Option<String>,
    pub summary: Option<String>,
}

// ==========================================
// ShipmentField - 可变字段标识（事件中上报）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentField {
    Loading,
    LiveEta,
    Status,
    Summary,
}
