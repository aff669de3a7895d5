// ==========================================
// 货运智能追踪系统 - 配置管理器
// ==========================================
// 职责: 分层加载配置
// 顺序: 内置默认值 → 配置文件 → 环境变量 → 命令行参数（后者覆盖前者）
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::tracker_config::TrackerConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Excel 工作表名长度上限
const MAX_SHEET_NAME_LEN: usize = 31;

/// Excel 工作表名禁用字符
const SHEET_NAME_FORBIDDEN_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

// ==========================================
// ConfigOverrides - 命令行覆写项
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut TrackerConfig) {
        if let Some(url) = &self.backend_url {
            config.backend.url = url.clone();
        }
        if let Some(secs) = self.request_timeout_secs {
            config.backend.request_timeout_secs = Some(secs);
        }
        if let Some(retries) = self.max_retries {
            config.backend.max_retries = retries;
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    /// 显式指定的配置文件（--config）
    explicit_path: Option<PathBuf>,
    /// 用户配置目录下的默认配置文件
    default_path: Option<PathBuf>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            explicit_path: None,
            default_path: Self::default_config_path(),
        }
    }

    /// 指定配置文件路径（文件必须存在）
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// 替换默认配置文件路径（None 表示不查找）
    pub fn with_default_path(mut self, path: Option<PathBuf>) -> Self {
        self.default_path = path;
        self
    }

    /// 用户配置目录下的默认配置文件: <config_dir>/cargo-tracker/config.toml
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(config_keys::CONFIG_DIR_NAME)
                .join(config_keys::CONFIG_FILE_NAME)
        })
    }

    /// 从进程环境加载配置
    pub fn load(&self, overrides: &ConfigOverrides) -> ConfigResult<TrackerConfig> {
        self.load_with_env(overrides, |key| std::env::var(key).ok())
    }

    /// 使用给定的环境变量查询函数加载配置
    ///
    /// # 参数
    /// - overrides: 命令行覆写项（最高优先级）
    /// - env: 环境变量查询
    ///
    /// # 返回
    /// - 合并并校验后的配置
    pub fn load_with_env<F>(&self, overrides: &ConfigOverrides, env: F) -> ConfigResult<TrackerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.resolve_path(&env)? {
            Some(path) => Self::read_file(&path)?,
            None => {
                debug!("未找到配置文件，使用内置默认值");
                TrackerConfig::default()
            }
        };

        Self::apply_env(&mut config, &env)?;
        overrides.apply(&mut config);
        Self::validate(&config)?;

        debug!(
            backend_url = %config.backend.url,
            timeout_secs = ?config.backend.request_timeout_secs,
            max_retries = config.backend.max_retries,
            "配置加载完成"
        );
        Ok(config)
    }

    /// 读取并解析 TOML 配置文件
    pub fn read_file(path: &Path) -> ConfigResult<TrackerConfig> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "已加载配置文件");
        Ok(config)
    }

    fn resolve_path<F>(&self, env: &F) -> ConfigResult<Option<PathBuf>>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 显式指定或环境变量指定的文件必须存在
        let requested = self
            .explicit_path
            .clone()
            .or_else(|| env(config_keys::CONFIG_PATH).map(PathBuf::from));
        if let Some(path) = requested {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path));
            }
            return Ok(Some(path));
        }

        Ok(self.default_path.clone().filter(|path| path.is_file()))
    }

    fn apply_env<F>(config: &mut TrackerConfig, env: &F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env(config_keys::BACKEND_URL) {
            config.backend.url = url.trim().to_string();
        }
        if let Some(value) = env(config_keys::TIMEOUT_SECS) {
            config.backend.request_timeout_secs =
                Some(parse_number(config_keys::TIMEOUT_SECS, &value)?);
        }
        if let Some(value) = env(config_keys::MAX_RETRIES) {
            config.backend.max_retries = parse_number(config_keys::MAX_RETRIES, &value)?;
        }
        Ok(())
    }

    /// 校验合并后的配置
    ///
    /// # 规则
    /// - backend.url 必须是 http/https 地址
    /// - request_timeout_secs 若设置必须大于 0
    /// - export.sheet_name 非空且不超过 31 个字符，不含 `[]:*?/\`，首尾不为 `'`
    /// - export.default_file_name 非空
    pub fn validate(config: &TrackerConfig) -> ConfigResult<()> {
        let url = &config.backend.url;
        match reqwest::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(invalid("backend.url", url, format!("不支持的协议 {}", parsed.scheme())))
            }
            Err(e) => return Err(invalid("backend.url", url, e.to_string())),
        }

        if config.backend.request_timeout_secs == Some(0) {
            return Err(invalid("backend.request_timeout_secs", "0", "必须大于 0".to_string()));
        }

        let sheet = &config.export.sheet_name;
        if sheet.trim().is_empty() || sheet.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(invalid(
                "export.sheet_name",
                sheet,
                format!("长度必须在 1..={} 之间", MAX_SHEET_NAME_LEN),
            ));
        }
        if let Some(c) = sheet.chars().find(|c| SHEET_NAME_FORBIDDEN_CHARS.contains(c)) {
            return Err(invalid("export.sheet_name", sheet, format!("不能包含字符 '{}'", c)));
        }
        if sheet.starts_with('\'') || sheet.ends_with('\'') {
            return Err(invalid(
                "export.sheet_name",
                sheet,
                "首尾不能为单引号".to_string(),
            ));
        }

        if config.export.default_file_name.trim().is_empty() {
            return Err(invalid("export.default_file_name", "", "不能为空".to_string()));
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| invalid(key, value, e.to_string()))
}

fn invalid(key: &str, value: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 配置文件
    pub const CONFIG_PATH: &str = "CARGO_TRACKER_CONFIG";
    pub const CONFIG_DIR_NAME: &str = "cargo-tracker";
    pub const CONFIG_FILE_NAME: &str = "config.toml";

    // 追踪服务
    pub const BACKEND_URL: &str = "CARGO_TRACKER_BACKEND_URL";
    pub const TIMEOUT_SECS: &str = "CARGO_TRACKER_TIMEOUT_SECS";
    pub const MAX_RETRIES: &str = "CARGO_TRACKER_MAX_RETRIES";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn manager() -> ConfigManager {
        ConfigManager::new().with_default_path(None)
    }

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_defaults_without_file() {
        let config = manager()
            .load_with_env(&ConfigOverrides::default(), no_env)
            .unwrap();
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn test_layering_file_env_cli() {
        let file = config_file(
            r#"
            [backend]
            url = "http://tracker.internal/track/single"
            request_timeout_secs = 30
            max_retries = 1

            [export]
            sheet_name = "Live"
            "#,
        );
        let env: HashMap<&str, &str> = [(config_keys::MAX_RETRIES, "2")].into_iter().collect();
        let overrides = ConfigOverrides {
            request_timeout_secs: Some(5),
            ..Default::default()
        };

        let config = manager()
            .with_path(file.path())
            .load_with_env(&overrides, |k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        // 文件
        assert_eq!(config.backend.url, "http://tracker.internal/track/single");
        assert_eq!(config.export.sheet_name, "Live");
        // 环境变量覆盖文件
        assert_eq!(config.backend.max_retries, 2);
        // 命令行覆盖文件
        assert_eq!(config.backend.request_timeout_secs, Some(5));
    }

    #[test]
    fn test_config_path_from_env() {
        let file = config_file("[backend]\nmax_retries = 4\n");
        let path = file.path().to_string_lossy().to_string();

        let config = manager()
            .load_with_env(&ConfigOverrides::default(), |k| {
                (k == config_keys::CONFIG_PATH).then(|| path.clone())
            })
            .unwrap();
        assert_eq!(config.backend.max_retries, 4);
    }

    #[test]
    fn test_default_path_used_only_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.toml");

        let config = manager()
            .with_default_path(Some(missing.clone()))
            .load_with_env(&ConfigOverrides::default(), no_env)
            .unwrap();
        assert_eq!(config, TrackerConfig::default());

        std::fs::write(&missing, "[export]\ndefault_file_name = \"out.csv\"\n").unwrap();
        let config = manager()
            .with_default_path(Some(missing))
            .load_with_env(&ConfigOverrides::default(), no_env)
            .unwrap();
        assert_eq!(config.export.default_file_name, "out.csv");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = manager()
            .with_path("/nonexistent/cargo-tracker.toml")
            .load_with_env(&ConfigOverrides::default(), no_env);
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let file = config_file("[backend\nurl = ");
        let result = manager()
            .with_path(file.path())
            .load_with_env(&ConfigOverrides::default(), no_env);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_invalid_env_number() {
        let result = manager().load_with_env(&ConfigOverrides::default(), |k| {
            (k == config_keys::TIMEOUT_SECS).then(|| "soon".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == config_keys::TIMEOUT_SECS
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = TrackerConfig::default();
        config.backend.url = "ftp://example.com/track".to_string();
        assert!(ConfigManager::validate(&config).is_err());

        let mut config = TrackerConfig::default();
        config.backend.url = "not a url".to_string();
        assert!(ConfigManager::validate(&config).is_err());

        let mut config = TrackerConfig::default();
        config.backend.request_timeout_secs = Some(0);
        assert!(ConfigManager::validate(&config).is_err());

        let mut config = TrackerConfig::default();
        config.export.sheet_name = "x".repeat(32);
        assert!(ConfigManager::validate(&config).is_err());
    }

    #[test]
    fn test_validate_sheet_name_characters() {
        for name in ["Q1/Q2", "a[b]", "Live:ETA", "what?", "a*b", "back\\slash", "'quoted", "quoted'"] {
            let mut config = TrackerConfig::default();
            config.export.sheet_name = name.to_string();
            assert!(
                matches!(
                    ConfigManager::validate(&config),
                    Err(ConfigError::InvalidValue { ref key, .. }) if key == "export.sheet_name"
                ),
                "应拒绝工作表名 {}",
                name
            );
        }

        let mut config = TrackerConfig::default();
        config.export.sheet_name = "It's Live".to_string();
        assert!(ConfigManager::validate(&config).is_ok());
    }
}
