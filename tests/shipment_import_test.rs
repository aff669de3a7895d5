// ==========================================
// ShipmentImporter 集成测试
// ==========================================
// 测试目标: 文件 → 表头推断 → 标准化 → 分类过滤 → 编号
// ==========================================


use cargo_tracker::domain::{CellValue, HeaderMode, ShipmentType};
use cargo_tracker::importer::{ImportError, ShipmentImporter};
use cargo_tracker::logging;
use tempfile::TempDir;
use test_helpers::{write_csv, write_xlsx, Cell};

#[test]
fn test_import_headered_csv() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "cargo.csv",
        &[
            &["Container", "Carrier", "ETA", "Destination"],
            &["MSCU1234567", "msc line", "2024-03-01", "Jebel Ali"],
            &["ABC-12345678", "Emirates Airline", "2024-03-05", "Dubai"],
        ],
    )
    .unwrap();

    let outcome = ShipmentImporter::default().import_file(&path).unwrap();

    assert_eq!(outcome.header_mode, HeaderMode::Headered);
    assert_eq!(outcome.total_rows, 2);
    assert_eq!(outcome.dropped_rows, 0);

    let first = &outcome.shipments[0];
    assert_eq!(first.id, 0);
    assert_eq!(first.tracking_number, "MSCU1234567");
    assert_eq!(first.carrier, "MSC");
    assert_eq!(first.shipment_type, ShipmentType::Sea);
    assert_eq!(first.system_eta, "2024-03-01");
    assert_eq!(first.raw.get("Destination"), Some(&CellValue::text("Jebel Ali")));

    let second = &outcome.shipments[1];
    assert_eq!(second.shipment_type, ShipmentType::Air);
    assert_eq!(second.carrier, "Emirates Airline");
}

#[test]
fn test_headerless_file_matches_headered_equivalent() {
    let dir = TempDir::new().unwrap();
    let data: &[&str] = &[
        "LONGCODE1234",
        "VesselX",
        "Carrier Co",
        "2024-01-01",
        "2024-01-05",
        "Port",
        "2024-01-04",
    ];
    let headerless = write_csv(&dir, "headerless.csv", &[data]).unwrap();
    let headered = write_csv(
        &dir,
        "headered.csv",
        &[
            &["Container", "Vessel", "Carrier", "ETD", "ETA", "Destination", "ATA"],
            data,
        ],
    )
    .unwrap();

    let importer = ShipmentImporter::default();
    let a = importer.import_file(&headerless).unwrap();
    let b = importer.import_file(&headered).unwrap();

    assert_eq!(a.header_mode, HeaderMode::Headerless);
    assert_eq!(b.header_mode, HeaderMode::Headered);
    assert_eq!(a.shipments, b.shipments);

    let shipment = &a.shipments[0];
    assert_eq!(shipment.tracking_number, "LONGCODE1234");
    assert_eq!(shipment.carrier, "Carrier Co");
    assert_eq!(shipment.system_eta, "2024-01-05");
    assert_eq!(shipment.raw.len(), 7);
}

#[test]
fn test_rows_without_tracking_number_dropped_and_ids_dense() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "cargo.csv",
        &[
            &["Container", "Carrier", "ETA"],
            &["", "MSC", "2024-01-01"],
            &["MSCU0000001", "MSC", "2024-01-02"],
            &["UNKNOWN", "MSC", "2024-01-03"],
            &["MSCU0000002", "", ""],
        ],
    )
    .unwrap();

    let outcome = ShipmentImporter::default().import_file(&path).unwrap();

    assert_eq!(outcome.dropped_rows, 2);
    let ids: Vec<usize> = outcome.shipments.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![0, 1]);

    let last = &outcome.shipments[1];
    assert_eq!(last.tracking_number, "MSCU0000002");
    assert_eq!(last.carrier, "Unknown");
    assert_eq!(last.system_eta, "N/A");
}

#[test]
fn test_positional_fallback_for_unlabelled_columns() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "cargo.csv",
        &[
            &["Ref", "Ship", "Line", "Departed", "Due"],
            &["HLCU99887766", "Ever Ace", "hapag lloyd", "2024-02-01", "2024-02-20"],
        ],
    )
    .unwrap();

    let outcome = ShipmentImporter::default().import_file(&path).unwrap();
    let shipment = &outcome.shipments[0];

    assert_eq!(shipment.tracking_number, "HLCU99887766");
    assert_eq!(shipment.carrier, "HAPAG-LLOYD");
    assert_eq!(shipment.system_eta, "2024-02-20");
}

#[test]
fn test_import_xlsx_with_numeric_cells() {
    let dir = TempDir::new().unwrap();
    let path = write_xlsx(
        &dir,
        "cargo.xlsx",
        &[
            vec![
                Cell::Text("AWB"),
                Cell::Text("Airline"),
                Cell::Text("Arrival"),
                Cell::Text("Pieces"),
            ],
            vec![
                Cell::Text("176-12345678"),
                Cell::Text("Emirates"),
                Cell::Text("12-Jan-2024"),
                Cell::Number(14.0),
            ],
            vec![Cell::Blank, Cell::Blank, Cell::Blank, Cell::Blank],
            vec![
                Cell::Text("ONEU1234567"),
                Cell::Text("ONE"),
                Cell::Blank,
                Cell::Number(2.5),
            ],
        ],
    )
    .unwrap();

    let outcome = ShipmentImporter::default().import_file(&path).unwrap();

    assert_eq!(outcome.total_rows, 2);
    assert_eq!(outcome.shipments.len(), 2);

    let air = &outcome.shipments[0];
    assert_eq!(air.shipment_type, ShipmentType::Air);
    assert_eq!(air.system_eta, "12-Jan-2024");
    assert_eq!(air.raw.get("Pieces"), Some(&CellValue::Number(14.0)));

    let sea = &outcome.shipments[1];
    assert_eq!(sea.carrier, "Ocean Network Express");
    assert_eq!(sea.system_eta, "N/A");
}

#[test]
fn test_import_errors() {
    let dir = TempDir::new().unwrap();
    let importer = ShipmentImporter::default();

    let missing = importer.import_file(dir.path().join("missing.csv"));
    assert!(matches!(missing, Err(ImportError::FileNotFound(_))));

    let txt = dir.path().join("cargo.txt");
    std::fs::write(&txt, "Container\nMSCU1234567\n").unwrap();
    assert!(matches!(
        importer.import_file(&txt),
        Err(ImportError::UnsupportedFormat(_))
    ));

    let corrupt = dir.path().join("cargo.xlsx");
    std::fs::write(&corrupt, b"not a zip archive").unwrap();
    assert!(importer.import_file(&corrupt).is_err());
}

#[test]
fn test_import_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.csv");
    std::fs::write(&path, "").unwrap();

    let outcome = ShipmentImporter::default().import_file(&path).unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.total_rows, 0);
}
