// ==========================================
// 货运智能追踪系统 - 配置项
// ==========================================
// 格式: TOML（所有字段可缺省，缺省取内置默认值）
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认追踪服务地址
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/track/single";
/// 默认重试间隔（毫秒）
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
/// 默认导出工作表名
pub const DEFAULT_SHEET_NAME: &str = "Updated Tracking";
/// 默认导出文件名
pub const DEFAULT_EXPORT_FILE_NAME: &str = "MP_Cargo_Updated.xlsx";

// ==========================================
// TrackerConfig - 顶层配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    pub backend: BackendConfig,
    pub export: ExportConfig,
}

/// 远程追踪服务配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub url: String,
    /// 单次请求超时（秒）；缺省不设超时
    pub request_timeout_secs: Option<u64>,
    /// 失败后重试次数；0 表示不重试
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: None,
            max_retries: 0,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

/// 导出配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub sheet_name: String,
    pub default_file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            default_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
        }
    }
}
