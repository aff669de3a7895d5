// ==========================================
// 货运智能追踪系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析（仅第一个工作表）
// 支持: Excel (.xlsx/.xlsm/.xls/.ods) / CSV (.csv)
// 表头判定: 仅依据首行做一次二选一判定，不逐行重判
// ==========================================

use crate::domain::{CellValue, HeaderMode, RawRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, ExcelDateTime, Reader};
use chrono::Timelike;
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// 无表头文件使用的固定列名
pub const HEADERLESS_COLUMNS: [&str; 7] = [
    "Container",
    "Vessel",
    "Carrier",
    "ETD",
    "ETA",
    "Destination",
    "ATA",
];

/// 首格长度达到该值视为箱号/运单号而非表头
///
/// 与位置兜底一致，按 Unicode 字符计数而非 UTF-16 码元
const HEADERLESS_MIN_CODE_LEN: usize = 10;

/// 首行至少包含的单元格数
const HEADERLESS_MIN_CELLS: usize = 3;

/// 空列名 / 超出表头列的生成列名前缀
const GENERATED_COLUMN_PREFIX: &str = "__EMPTY";

// ==========================================
// ParsedSheet - 解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub header_mode: HeaderMode,
    /// 全部行共享的有序列名
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_sheet(&self, file_path: &Path) -> ImportResult<ParsedSheet> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = extension_of(path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let content = read_csv_text(path)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(content.as_str());

        // 表头由推断决定，这里不让 csv 读取表头
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(content.as_bytes());

        let mut grid = Vec::new();
        for result in reader.records() {
            let record = result?;
            // 单元格原样保留，仅全空白视为空
            let cells: Vec<CellValue> = record.iter().map(CellValue::text).collect();
            grid.push(cells);
        }

        Ok(build_sheet(grid))
    }
}

/// 读取 CSV 文本（UTF-8 失败时按 Windows-1252 解码，兼容 Excel 导出的文件）
fn read_csv_text(path: &Path) -> ImportResult<String> {
    let bytes = std::fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(path = %path.display(), "CSV 非 UTF-8 编码，按 Windows-1252 解码");
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_sheet(&self, file_path: &Path) -> ImportResult<ParsedSheet> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = extension_of(path);
        if !matches!(ext.as_str(), "xlsx" | "xlsm" | "xls" | "ods") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 打开工作簿（按扩展名自动选择读取器）
        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::NoWorksheet(path.display().to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        debug!(sheet = %sheet_name, rows = range.height(), cols = range.width(), "读取工作表");

        let grid = range
            .rows()
            .map(|row| row.iter().map(cell_from_excel).collect())
            .collect();

        Ok(build_sheet(grid))
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_sheet(&self, file_path: &Path) -> ImportResult<ParsedSheet> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_sheet(file_path),
            "xlsx" | "xlsm" | "xls" | "ods" => ExcelParser.parse_sheet(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// 单元格转换
// ==========================================
fn cell_from_excel(cell: &Data) -> CellValue {
    #[allow(unreachable_patterns)]
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
        Data::DateTime(dt) => excel_datetime_label(dt)
            .map(CellValue::Text)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        _ => CellValue::Empty,
    }
}

/// Excel 日期单元格 → "YYYY-MM-DD"（含时间时追加 "HH:MM:SS"）
///
/// 1900 / 1904 两种日期系统由 calamine 按工作簿设置换算
fn excel_datetime_label(dt: &ExcelDateTime) -> Option<String> {
    let datetime = dt.as_datetime()?;

    if datetime.time().num_seconds_from_midnight() == 0 {
        Some(datetime.format("%Y-%m-%d").to_string())
    } else {
        Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

// ==========================================
// 表头推断与行构建
// ==========================================

/// 行的有效宽度（截至最后一个非空单元格）
fn effective_width(cells: &[CellValue]) -> usize {
    cells
        .iter()
        .rposition(|c| !c.is_empty())
        .map(|idx| idx + 1)
        .unwrap_or(0)
}

/// 依据首行判定表头模式
///
/// # 规则
/// - 首行至少 3 个单元格，且首格为长度 ≥ 10 的文本 → 无表头
/// - 否则 → 首行即表头
pub fn infer_header_mode(first_row: &[CellValue]) -> HeaderMode {
    let looks_like_code = first_row
        .first()
        .and_then(CellValue::as_text)
        .map(|s| s.chars().count() >= HEADERLESS_MIN_CODE_LEN)
        .unwrap_or(false);

    if effective_width(first_row) >= HEADERLESS_MIN_CELLS && looks_like_code {
        HeaderMode::Headerless
    } else {
        HeaderMode::Headered
    }
}

/// 生成不重复的列名（重复追加 _1/_2…）
fn unique_label(base: &str, taken: &mut HashSet<String>) -> String {
    let base = if base.trim().is_empty() {
        GENERATED_COLUMN_PREFIX
    } else {
        base
    };
    let mut candidate = base.to_string();
    let mut n = 1;
    while taken.contains(&candidate) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// 由单元格网格构建 ParsedSheet
pub(crate) fn build_sheet(grid: Vec<Vec<CellValue>>) -> ParsedSheet {
    // 跳过完全空白的行
    let mut rows: Vec<Vec<CellValue>> = grid
        .into_iter()
        .filter(|cells| effective_width(cells) > 0)
        .collect();

    if rows.is_empty() {
        return ParsedSheet {
            header_mode: HeaderMode::Headered,
            headers: Vec::new(),
            rows: Vec::new(),
        };
    }

    let header_mode = infer_header_mode(&rows[0]);
    let mut taken = HashSet::new();
    let mut headers: Vec<String> = match header_mode {
        HeaderMode::Headerless => HEADERLESS_COLUMNS
            .iter()
            .map(|h| unique_label(h, &mut taken))
            .collect(),
        HeaderMode::Headered => {
            let header_row = rows.remove(0);
            let width = effective_width(&header_row);
            header_row
                .iter()
                .take(width)
                .map(|cell| unique_label(&cell.to_string(), &mut taken))
                .collect()
        }
    };

    // 超出表头的列补生成列名，保证所有行列集一致
    let width = rows.iter().map(|r| effective_width(r)).max().unwrap_or(0);
    while headers.len() < width {
        headers.push(unique_label(GENERATED_COLUMN_PREFIX, &mut taken));
    }

    let rows = rows
        .into_iter()
        .map(|cells| {
            let mut cells = cells.into_iter();
            headers
                .iter()
                .map(|h| (h.clone(), cells.next().unwrap_or_default()))
                .collect::<RawRow>()
        })
        .collect();

    ParsedSheet {
        header_mode,
        headers,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::ExcelDateTimeType;
    use rust_xlsxwriter::{ExcelDateTime as XlsxDateTime, Format, Workbook};
    use std::io::Write;
    use tempfile::Builder;

    fn temp_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_csv_parser_headered_file() {
        let temp_file = temp_csv(&[
            "Container,Carrier,ETA",
            "MSCU1234567,msc line,2024-03-01",
            "HLXU7654321,Hapag,2024-03-05",
        ]);

        let sheet = CsvParser.parse_sheet(temp_file.path()).unwrap();

        assert_eq!(sheet.header_mode, HeaderMode::Headered);
        assert_eq!(sheet.headers, vec!["Container", "Carrier", "ETA"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(
            sheet.rows[0].get("Container"),
            Some(&CellValue::text("MSCU1234567"))
        );
    }

    #[test]
    fn test_csv_parser_headerless_file() {
        let temp_file = temp_csv(&[
            "LONGCODE1234,VesselX,Carrier Co,2024-01-01,2024-01-05,Port,2024-01-04",
            "OTHERCODE999,VesselY,MSC,2024-01-02,2024-01-06,Port,",
        ]);

        let sheet = CsvParser.parse_sheet(temp_file.path()).unwrap();

        assert_eq!(sheet.header_mode, HeaderMode::Headerless);
        assert_eq!(sheet.headers, HEADERLESS_COLUMNS.to_vec());
        // 首行为数据行，不被当作表头消费
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].get("ETA"), Some(&CellValue::text("2024-01-05")));
        assert_eq!(sheet.rows[1].get("ATA"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_sheet(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let temp_file = temp_csv(&["Container,Carrier", "MSCU1234567,MSC", ",", "HLXU7654321,Hapag"]);

        let sheet = CsvParser.parse_sheet(temp_file.path()).unwrap();

        // 应跳过空行
        assert_eq!(sheet.rows.len(), 2);
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser.parse_sheet(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "txt"));
    }

    #[test]
    fn test_infer_header_mode_rules() {
        let code_row = vec![
            CellValue::text("MSCU1234567"),
            CellValue::text("V"),
            CellValue::text("MSC"),
        ];
        assert_eq!(infer_header_mode(&code_row), HeaderMode::Headerless);

        // 仅 2 个单元格
        assert_eq!(infer_header_mode(&code_row[..2]), HeaderMode::Headered);

        // 首格过短
        let short = vec![
            CellValue::text("Container"),
            CellValue::text("Vessel"),
            CellValue::text("Carrier"),
        ];
        assert_eq!(infer_header_mode(&short), HeaderMode::Headered);

        // 首格为数字
        let numeric = vec![
            CellValue::Number(12345678901.0),
            CellValue::text("a"),
            CellValue::text("b"),
        ];
        assert_eq!(infer_header_mode(&numeric), HeaderMode::Headered);
    }

    #[test]
    fn test_long_header_label_is_treated_as_headerless() {
        // 已知启发式误判：长表头名会被当作数据行
        let row = vec![
            CellValue::text("Container Number"),
            CellValue::text("Carrier"),
            CellValue::text("ETA"),
        ];
        assert_eq!(infer_header_mode(&row), HeaderMode::Headerless);
    }

    #[test]
    fn test_build_sheet_dedupes_and_generates_labels() {
        let grid = vec![
            vec![CellValue::text("ETA"), CellValue::Empty, CellValue::text("ETA")],
            vec![
                CellValue::text("a"),
                CellValue::text("b"),
                CellValue::text("c"),
                CellValue::text("d"),
            ],
            vec![CellValue::text("e")],
        ];

        let sheet = build_sheet(grid);

        assert_eq!(sheet.headers, vec!["ETA", "__EMPTY", "ETA_1", "__EMPTY_1"]);
        assert_eq!(sheet.rows[0].get("__EMPTY_1"), Some(&CellValue::text("d")));
        // 短行补空，列集一致
        assert_eq!(sheet.rows[1].len(), 4);
        assert_eq!(sheet.rows[1].get("ETA_1"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_build_sheet_empty_grid() {
        let sheet = build_sheet(vec![vec![CellValue::Empty]]);
        assert!(sheet.rows.is_empty());
        assert!(sheet.headers.is_empty());
    }

    #[test]
    fn test_excel_datetime_label_1900_system() {
        let date = ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(excel_datetime_label(&date).as_deref(), Some("2024-01-01"));

        let noon = ExcelDateTime::new(45292.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            excel_datetime_label(&noon).as_deref(),
            Some("2024-01-01 12:00:00")
        );
    }

    #[test]
    fn test_excel_datetime_label_1904_system() {
        // 1904 系统的同一日期序列号小 1462
        let date = ExcelDateTime::new(43830.0, ExcelDateTimeType::DateTime, true);
        assert_eq!(excel_datetime_label(&date).as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_excel_parser_reads_date_cells() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dates.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        worksheet.write_string(0, 0, "Container").unwrap();
        worksheet.write_string(0, 1, "ETA").unwrap();
        worksheet.write_string(1, 0, "MSCU1234567").unwrap();
        let eta = XlsxDateTime::from_ymd(2024, 3, 1).unwrap();
        worksheet
            .write_datetime_with_format(1, 1, &eta, &date_format)
            .unwrap();
        workbook.save(&path).unwrap();

        let sheet = ExcelParser.parse_sheet(&path).unwrap();

        assert_eq!(sheet.rows[0].get("ETA"), Some(&CellValue::text("2024-03-01")));
    }

    #[test]
    fn test_csv_parser_keeps_cells_verbatim() {
        let temp_file = temp_csv(&[
            "Container ,Remarks",
            "MSCU1234567,  keep  spaces ",
            "HLXU7654321,   ",
        ]);

        let sheet = CsvParser.parse_sheet(temp_file.path()).unwrap();

        assert_eq!(sheet.headers, vec!["Container ", "Remarks"]);
        assert_eq!(
            sheet.rows[0].get("Remarks"),
            Some(&CellValue::Text("  keep  spaces ".to_string()))
        );
        // 全空白单元格视为空
        assert_eq!(sheet.rows[1].get("Remarks"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_csv_parser_decodes_windows_1252() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        temp_file
            .write_all(b"Container,Destination\nMSCU1234567,S\xe3o Paulo\n")
            .unwrap();

        let sheet = CsvParser.parse_sheet(temp_file.path()).unwrap();

        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(
            sheet.rows[0].get("Destination"),
            Some(&CellValue::text("S\u{e3}o Paulo"))
        );
    }

    #[test]
    fn test_csv_parser_strips_bom_from_first_label() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        temp_file
            .write_all("\u{feff}Container,Carrier\nMSCU1234567,MSC\n".as_bytes())
            .unwrap();

        let sheet = CsvParser.parse_sheet(temp_file.path()).unwrap();

        assert_eq!(sheet.headers, vec!["Container", "Carrier"]);
    }
}
