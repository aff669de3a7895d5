// ==========================================
// 货运智能追踪系统 - 配置层
// ==========================================
// 职责: 系统配置管理，支持多级覆写
// 存储: TOML 文件 + 环境变量 + 命令行参数
// ==========================================

pub mod config_manager;
pub mod error;
pub mod tracker_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, ConfigOverrides};
pub use error::{ConfigError, ConfigResult};
pub use tracker_config::{BackendConfig, ExportConfig, TrackerConfig};
