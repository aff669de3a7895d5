// ==========================================
// 货运智能追踪系统 - 货运分类器实现
// ==========================================
// 职责: 承运人规范化 / 运输方式判定 / 过滤与编号
// 规则: 有序匹配表，先命中先得（行为可审计、可复现）
// ==========================================

use crate::domain::{
    NormalizedFields, RawRow, Shipment, ShipmentType, ETA_NOT_AVAILABLE, UNKNOWN_CARRIER,
};
use crate::importer::importer_trait::{Classifier, FieldMapper};
use tracing::debug;

/// 承运人规范化表（子串 → 规范名）
///
/// 注意: "one" 会命中任何包含该子串的承运人名（如 "Jones Freight"），
/// 属已知的启发式误判，保持原样
pub const CARRIER_RULES: &[(&str, &str)] = &[
    ("hapag", "HAPAG-LLOYD"),
    ("cma", "CMA CGM"),
    ("one", "Ocean Network Express"),
    ("msc", "MSC"),
];

/// 追踪号哨兵值（视为缺失）
pub const TRACKING_SENTINELS: &[&str] = &["UNKNOWN"];

/// 空运判定: 首个连字符之后的字符数
const AIR_SUFFIX_LEN: usize = 8;

pub struct ShipmentClassifier;

impl Classifier for ShipmentClassifier {
    fn classify(&self, fields: NormalizedFields, raw: RawRow, ordinal: usize) -> Option<Shipment> {
        let tracking_number = fields.tracking_number.unwrap_or_default();
        if tracking_number.is_empty() || TRACKING_SENTINELS.contains(&tracking_number.as_str()) {
            debug!(ordinal, tracking_number = %tracking_number, "丢弃无追踪号记录");
            return None;
        }

        Some(Shipment {
            id: ordinal,
            carrier: canonical_carrier(fields.carrier.as_deref()),
            shipment_type: classify_mode(&tracking_number),
            system_eta: fields
                .system_eta
                .unwrap_or_else(|| ETA_NOT_AVAILABLE.to_string()),
            tracking_number,
            live_eta: None,
            status: None,
            summary: None,
            loading: false,
            raw,
        })
    }
}

impl ShipmentClassifier {
    /// 批量标准化 + 分类，编号在过滤之后分配（0 起，连续）
    ///
    /// # 返回
    /// - (货运列表, 丢弃行数)
    pub fn classify_rows<M: FieldMapper + ?Sized>(
        &self,
        mapper: &M,
        rows: Vec<RawRow>,
    ) -> (Vec<Shipment>, usize) {
        let mut shipments = Vec::with_capacity(rows.len());
        let mut dropped = 0;

        for raw in rows {
            let fields = mapper.normalize(&raw);
            match self.classify(fields, raw, shipments.len()) {
                Some(shipment) => shipments.push(shipment),
                None => dropped += 1,
            }
        }

        (shipments, dropped)
    }
}

/// 承运人规范化
///
/// # 规则
/// - 小写 + 去空白后按 CARRIER_RULES 子串匹配
/// - 未命中 → 原标签（去空白，保留大小写）；空 → "Unknown"
pub fn canonical_carrier(label: Option<&str>) -> String {
    let trimmed = label.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        return UNKNOWN_CARRIER.to_string();
    }

    let lower = trimmed.to_lowercase();
    CARRIER_RULES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// 运输方式判定
///
/// # 规则
/// - 含连字符，且首个连字符之后恰有 8 个字符 → 空运
/// - 否则 → 海运
pub fn classify_mode(tracking_number: &str) -> ShipmentType {
    match tracking_number.split_once('-') {
        Some((_, suffix)) if suffix.chars().count() == AIR_SUFFIX_LEN => ShipmentType::Air,
        _ => ShipmentType::Sea,
    }
}
