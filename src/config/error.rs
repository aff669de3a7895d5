// ==========================================
// 货运智能追踪系统 - 配置错误类型
// ==========================================

use std::path::PathBuf;
use thiserror::Error;

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    FileNotFound(PathBuf),

    #[error("配置文件读取失败: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误: {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("配置值无效: {key}={value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
