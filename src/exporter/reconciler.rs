// ==========================================
// 货运智能追踪系统 - 结果合并
// ==========================================
// 职责: 原始列 + 补全结果 → 输出表格
// 规则: 每行 = 原始行全部列（原样）+ 4 个计算列
// ==========================================

use crate::domain::{CellValue, Shipment};
use serde::Serialize;

pub const LIVE_STATUS_COLUMN: &str = "LIVE STATUS";
pub const LIVE_ETA_COLUMN: &str = "LIVE ETA";
pub const SMART_SUMMARY_COLUMN: &str = "SMART SUMMARY";
pub const ETA_CHANGED_COLUMN: &str = "ETA CHANGED?";

/// 计算列（按输出顺序）
pub const COMPUTED_COLUMNS: [&str; 4] = [
    LIVE_STATUS_COLUMN,
    LIVE_ETA_COLUMN,
    SMART_SUMMARY_COLUMN,
    ETA_CHANGED_COLUMN,
];

pub const ETA_CHANGED_YES: &str = "YES";
pub const ETA_CHANGED_NO: &str = "NO";

/// 输出表格
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ReconciledTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按列名取某行的单元格
    pub fn cell(&self, row: usize, header: &str) -> Option<&CellValue> {
        let col = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row)?.get(col)
    }
}

/// 合并货运列表为输出表格
///
/// # 规则
/// - 表头 = 所有原始列名（按首次出现顺序去重）+ 4 个计算列
/// - 与计算列同名的原始列被计算值覆盖
/// - 某行缺少的原始列输出为空
/// - ETA CHANGED? 为严格字符串比较（live_eta 缺失视为已变更）
pub fn reconcile(shipments: &[Shipment]) -> ReconciledTable {
    let mut raw_headers: Vec<&str> = Vec::new();
    for shipment in shipments {
        for key in shipment.raw.keys() {
            if !COMPUTED_COLUMNS.iter().any(|c| *c == key) && !raw_headers.contains(&key) {
                raw_headers.push(key);
            }
        }
    }

    let rows = shipments
        .iter()
        .map(|shipment| {
            let mut row: Vec<CellValue> = raw_headers
                .iter()
                .map(|key| shipment.raw.get(key).cloned().unwrap_or_default())
                .collect();
            row.extend(computed_cells(shipment));
            row
        })
        .collect();

    let mut headers: Vec<String> = raw_headers.iter().map(|h| h.to_string()).collect();
    headers.extend(COMPUTED_COLUMNS.iter().map(|h| h.to_string()));

    ReconciledTable { headers, rows }
}

fn computed_cells(shipment: &Shipment) -> [CellValue; 4] {
    let optional = |value: &Option<String>| value.as_deref().map(CellValue::text).unwrap_or_default();
    let changed = if shipment.eta_changed() {
        ETA_CHANGED_YES
    } else {
        ETA_CHANGED_NO
    };

    [
        optional(&shipment.status),
        optional(&shipment.live_eta),
        optional(&shipment.summary),
        CellValue::text(changed),
    ]
}
