// ==========================================
// 货运智能追踪系统 - 导出层
// ==========================================
// 职责: 合并原始列与补全结果，写出表格文件
// 输出: 原始列原样保留 + LIVE STATUS / LIVE ETA / SMART SUMMARY / ETA CHANGED?
// ==========================================

pub mod error;
pub mod reconciler;
pub mod writer;

pub use error::{ExportError, ExportResult};
pub use reconciler::{
    reconcile, ReconciledTable, COMPUTED_COLUMNS, ETA_CHANGED_COLUMN, ETA_CHANGED_NO,
    ETA_CHANGED_YES, LIVE_ETA_COLUMN, LIVE_STATUS_COLUMN, SMART_SUMMARY_COLUMN,
};
pub use writer::{CsvTableWriter, TableWriter, UniversalTableWriter, XlsxTableWriter};
