// ==========================================
// 货运智能追踪系统 - 核心库
// ==========================================
// 流程: 表格读取 → 行标准化 → 货运分类 → 逐条追踪补全 → 合并导出
// 技术栈: calamine + reqwest + rust_xlsxwriter + tokio
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 表格读取、标准化、分类
pub mod importer;

// 引擎层 - 追踪补全
pub mod engine;

// 导出层 - 合并与写出
pub mod exporter;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CellValue, EtaAlignment, HeaderMode, NormalizedFields, RawRow, Shipment, ShipmentType,
    StatusTone,
};

// 导入
pub use importer::{ImportError, ImportOutcome, RowNormalizer, ShipmentClassifier, ShipmentImporter};

// 引擎
pub use engine::{
    CancellationFlag, EnrichmentEngine, EnrichmentReport, HttpTrackingClient, TrackingClient,
};

// 导出
pub use exporter::{reconcile, ExportError, ReconciledTable};

// 配置
pub use config::{ConfigManager, TrackerConfig};

// API
pub use api::{ApiError, TrackerApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "货运智能追踪系统";
