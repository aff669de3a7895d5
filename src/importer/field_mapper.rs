// ==========================================
// 货运智能追踪系统 - 字段标准化器实现
// ==========================================
// 职责: 任意列名 → 标准字段（追踪号 / 承运人 / 系统 ETA）
// 规则: 列名子串匹配（不区分大小写，去首尾空白），按固定顺序先命中先得
// 兜底: 列名未命中追踪号时按列位置推断
// ==========================================

use crate::domain::{CellValue, NormalizedFields, RawRow};
use crate::importer::importer_trait::FieldMapper;

/// 标准字段类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CanonicalField {
    TrackingNumber,
    Carrier,
    SystemEta,
}

/// 列名匹配表（顺序即优先级）
const FIELD_PATTERNS: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::TrackingNumber, &["container", "awb", "tracking"]),
    (CanonicalField::Carrier, &["carrier", "shipping line", "airline"]),
    (CanonicalField::SystemEta, &["eta", "arrival"]),
];

/// 位置兜底: 追踪号所在列
const FALLBACK_TRACKING_POSITION: usize = 0;
/// 位置兜底: 承运人所在列
const FALLBACK_CARRIER_POSITION: usize = 2;
/// 位置兜底: ETA 所在列
const FALLBACK_ETA_POSITION: usize = 4;
/// 位置兜底: 追踪号最短长度
///
/// 按 Unicode 字符（`chars().count()`）计数，而非 UTF-16 码元；
/// 两者仅在 BMP 以外的字符上不同，追踪号均为 ASCII
const FALLBACK_MIN_TRACKING_LEN: usize = 10;

pub struct RowNormalizer;

impl FieldMapper for RowNormalizer {
    fn normalize(&self, row: &RawRow) -> NormalizedFields {
        let mut fields = NormalizedFields::default();

        // === 第一轮: 列名匹配 ===
        for (key, value) in row.iter() {
            match Self::match_key(key) {
                Some(field) => {
                    // 命中列被消费；空值不覆盖已有值
                    if let Some(label) = value.to_label() {
                        *Self::slot(&mut fields, field) = Some(label);
                    }
                }
                None => fields.passthrough.push((key.to_string(), value.clone())),
            }
        }

        // === 第二轮: 位置兜底（仅当列名未得到追踪号）===
        if fields.tracking_number.is_none() {
            Self::apply_positional_fallback(row, &mut fields);
        }

        fields
    }
}

impl RowNormalizer {
    /// 列名 → 标准字段类别
    fn match_key(key: &str) -> Option<CanonicalField> {
        let lower = key.trim().to_lowercase();
        FIELD_PATTERNS
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
            .map(|(field, _)| *field)
    }

    fn slot(fields: &mut NormalizedFields, field: CanonicalField) -> &mut Option<String> {
        match field {
            CanonicalField::TrackingNumber => &mut fields.tracking_number,
            CanonicalField::Carrier => &mut fields.carrier,
            CanonicalField::SystemEta => &mut fields.system_eta,
        }
    }

    /// 按列位置推断（不覆盖列名已设置的字段）
    fn apply_positional_fallback(row: &RawRow, fields: &mut NormalizedFields) {
        let text_at = |pos: usize| row.value_at(pos).and_then(CellValue::as_text);

        if let Some(code) = text_at(FALLBACK_TRACKING_POSITION) {
            if code.chars().count() >= FALLBACK_MIN_TRACKING_LEN {
                fields.tracking_number = Some(code.to_string());
            }
        }
        if fields.carrier.is_none() {
            if let Some(carrier) = text_at(FALLBACK_CARRIER_POSITION) {
                fields.carrier = Some(carrier.to_string());
            }
        }
        if fields.system_eta.is_none() {
            if let Some(eta) = text_at(FALLBACK_ETA_POSITION) {
                fields.system_eta = Some(eta.to_string());
            }
        }
    }
}
