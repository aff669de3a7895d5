// ==========================================
// 货运智能追踪系统 - 表格写出
// ==========================================
// 支持格式: .xlsx（单工作表，表头加粗）/ .csv
// 说明: 数值单元格在 xlsx 中保持数值类型
// ==========================================

use crate::exporter::error::{ExportError, ExportResult};
use crate::exporter::reconciler::ReconciledTable;
use crate::config::tracker_config::DEFAULT_SHEET_NAME;
use crate::domain::CellValue;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Excel 单元格文本上限（字符数）
pub const XLSX_MAX_CELL_CHARS: usize = 32_767;

// ==========================================
// TableWriter Trait
// ==========================================
// 用途: 输出表格写出端口
// 实现者: XlsxTableWriter, CsvTableWriter, UniversalTableWriter
pub trait TableWriter: Send + Sync {
    /// 将表格写入文件（覆盖已有文件）
    fn write_table(&self, table: &ReconciledTable, path: &Path) -> ExportResult<()>;
}

// ==========================================
// XLSX 写出
// ==========================================
pub struct XlsxTableWriter {
    sheet_name: String,
}

impl Default for XlsxTableWriter {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME)
    }
}

impl XlsxTableWriter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    /// 写入单个单元格
    ///
    /// # 规则
    /// - 超过 Excel 上限的文本截断至 32,767 个字符，不使整个导出失败
    fn write_cell(
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        header: &str,
        cell: &CellValue,
    ) -> ExportResult<()> {
        match cell {
            CellValue::Text(s) => {
                worksheet.write_string(row, col, truncate_for_xlsx(s, row, header))?;
            }
            CellValue::Number(n) => {
                worksheet.write_number(row, col, *n)?;
            }
            CellValue::Empty => {}
        }
        Ok(())
    }
}

impl TableWriter for XlsxTableWriter {
    fn write_table(&self, table: &ReconciledTable, path: &Path) -> ExportResult<()> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.sheet_name.as_str())?;

        for (col, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, column_index(col)?, header.as_str(), &header_format)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_num = row_index(row_idx + 1)?;
            for (col, cell) in row.iter().enumerate() {
                let header = table.headers.get(col).map(String::as_str).unwrap_or("");
                Self::write_cell(worksheet, row_num, column_index(col)?, header, cell)?;
            }
        }

        worksheet.set_freeze_panes(1, 0)?;
        worksheet.autofit();

        workbook.save(path)?;
        Ok(())
    }
}

fn truncate_for_xlsx<'a>(text: &'a str, row: u32, header: &str) -> &'a str {
    match text.char_indices().nth(XLSX_MAX_CELL_CHARS) {
        Some((cut, _)) => {
            warn!(
                row,
                column = header,
                chars = text.chars().count(),
                "单元格文本超出 Excel 上限，已截断"
            );
            &text[..cut]
        }
        None => text,
    }
}

fn column_index(col: usize) -> ExportResult<u16> {
    u16::try_from(col).map_err(|_| ExportError::XlsxWriteError(format!("列数超出上限: {}", col)))
}

fn row_index(row: usize) -> ExportResult<u32> {
    u32::try_from(row).map_err(|_| ExportError::XlsxWriteError(format!("行数超出上限: {}", row)))
}

// ==========================================
// CSV 写出
// ==========================================
pub struct CsvTableWriter;

impl TableWriter for CsvTableWriter {
    fn write_table(&self, table: &ReconciledTable, path: &Path) -> ExportResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

// ==========================================
// 通用写出器（按扩展名分发）
// ==========================================
pub struct UniversalTableWriter {
    xlsx: XlsxTableWriter,
}

impl Default for UniversalTableWriter {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME)
    }
}

impl UniversalTableWriter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            xlsx: XlsxTableWriter::new(sheet_name),
        }
    }
}

impl TableWriter for UniversalTableWriter {
    #[instrument(skip(self, table), fields(rows = table.rows.len()))]
    fn write_table(&self, table: &ReconciledTable, path: &Path) -> ExportResult<()> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        debug!(extension = %extension, "写出表格");
        match extension.as_str() {
            "xlsx" => self.xlsx.write_table(table, path),
            "csv" => CsvTableWriter.write_table(table, path),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}
