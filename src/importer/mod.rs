// ==========================================
// 货运智能追踪系统 - 导入层
// ==========================================
// 职责: 外部表格导入，生成货运列表
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod classifier;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod shipment_importer;

// 重导出核心类型
pub use classifier::{canonical_carrier, classify_mode, ShipmentClassifier};
pub use error::{ImportError, ImportResult};
pub use field_mapper::RowNormalizer;
pub use file_parser::{
    infer_header_mode, CsvParser, ExcelParser, ParsedSheet, UniversalFileParser,
    HEADERLESS_COLUMNS,
};
pub use shipment_importer::{ImportOutcome, ShipmentImporter};

// 重导出 Trait 接口
pub use importer_trait::{Classifier, FieldMapper, FileParser};
