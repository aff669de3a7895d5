// ==========================================
// 货运智能追踪系统 - 领域类型定义
// ==========================================
// 运输方式 / 表头模式 / 状态色调 / ETA 对齐
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 运输方式 (Shipment Type)
// ==========================================
// 序列化格式: 小写（与追踪服务请求体一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentType {
    Air, // 空运
    Sea, // 海运
}

impl ShipmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentType::Air => "air",
            ShipmentType::Sea => "sea",
        }
    }
}

impl fmt::Display for ShipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 表头模式 (Header Mode)
// ==========================================
// 每个文件只依据首行判定一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeaderMode {
    Headered,   // 首行为表头
    Headerless, // 无表头，使用固定 7 列
}

impl fmt::Display for HeaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderMode::Headered => write!(f, "HEADERED"),
            HeaderMode::Headerless => write!(f, "HEADERLESS"),
        }
    }
}

// ==========================================
// 状态色调 (Status Tone)
// ==========================================
// 仅用于终端汇总展示，不参与导出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusTone {
    Done,    // 已送达 / 已到港
    Moving,  // 运输中 / 已离港
    Problem, // 异常 / 扣留 / 错误
    Pending, // 尚未追踪
    Other,
}

impl StatusTone {
    /// 按关键字判定（先命中先得）
    pub fn from_status(status: Option<&str>) -> Self {
        let Some(status) = status else {
            return StatusTone::Pending;
        };
        let s = status.to_lowercase();
        if s.contains("delivered") || s.contains("arrived") {
            StatusTone::Done
        } else if s.contains("transit") || s.contains("departed") {
            StatusTone::Moving
        } else if s.contains("exception") || s.contains("error") || s.contains("hold") {
            StatusTone::Problem
        } else {
            StatusTone::Other
        }
    }
}

impl fmt::Display for StatusTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusTone::Done => write!(f, "DONE"),
            StatusTone::Moving => write!(f, "MOVING"),
            StatusTone::Problem => write!(f, "PROBLEM"),
            StatusTone::Pending => write!(f, "PENDING"),
            StatusTone::Other => write!(f, "OTHER"),
        }
    }
}

// ==========================================
// ETA 对齐 (ETA Alignment)
// ==========================================
// 宽松包含比较，仅用于展示；导出的 ETA CHANGED? 为严格字符串比较
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EtaAlignment {
    Unknown,
    Match,
    Mismatch,
}

impl EtaAlignment {
    pub fn compare(system_eta: &str, live_eta: Option<&str>) -> Self {
        match live_eta {
            None | Some("N/A") | Some("") => EtaAlignment::Unknown,
            Some(live) if system_eta.contains(live) || live.contains(system_eta) => {
                EtaAlignment::Match
            }
            Some(_) => EtaAlignment::Mismatch,
        }
    }
}

impl fmt::Display for EtaAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtaAlignment::Unknown => write!(f, "UNKNOWN"),
            EtaAlignment::Match => write!(f, "MATCH"),
            EtaAlignment::Mismatch => write!(f, "MISMATCH"),
        }
    }
}
