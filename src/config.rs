//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，环境变量 HOST / PORT 可覆盖监听地址

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 出站请求配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// 报价请求超时（毫秒）
    #[serde(default = "default_quote_timeout")]
    pub quote_timeout_ms: u64,
    /// 历史序列请求超时（毫秒）
    #[serde(default = "default_series_timeout")]
    pub series_timeout_ms: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// 数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,
    #[serde(default = "default_stooq_base_url")]
    pub stooq_base_url: String,
    /// Stooq 报价日期/时间所在时区（IANA 名称）
    #[serde(default = "default_tabular_timezone")]
    pub tabular_timezone: String,
}

/// 查询默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// 未指定 symbol 时使用的代码
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// 未指定 range 时使用的范围
    #[serde(default = "default_range")]
    pub range: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_quote_timeout() -> u64 { 7000 }
fn default_series_timeout() -> u64 { 8000 }
fn default_connect_timeout() -> u64 { 5 }
fn default_user_agent() -> String { "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string() }
fn default_yahoo_base_url() -> String { "https://query1.finance.yahoo.com".to_string() }
fn default_stooq_base_url() -> String { "https://stooq.com".to_string() }
fn default_tabular_timezone() -> String { "UTC".to_string() }
fn default_symbol() -> String { "MSTY".to_string() }
fn default_range() -> String { "30d".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            quote_timeout_ms: default_quote_timeout(),
            series_timeout_ms: default_series_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: default_yahoo_base_url(),
            stooq_base_url: default_stooq_base_url(),
            tabular_timezone: default_tabular_timezone(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            range: default_range(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// 配置来源
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(String),
    Default,
}

/// 加载结果，附带待输出的日志
///
/// 日志级别取自配置，加载时日志系统尚未初始化
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub source: ConfigSource,
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// 日志系统初始化后输出加载过程
    pub fn report(&self) {
        for warning in &self.warnings {
            log::warn!("{}", warning);
        }
        match &self.source {
            ConfigSource::File(path) => log::info!("从 {} 加载配置成功", path),
            ConfigSource::Default => log::info!("使用默认配置"),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值，最后应用环境变量
    pub fn load() -> LoadedConfig {
        let mut loaded = Self::load_file();
        if let Some(warning) = loaded.config.apply_env() {
            loaded.warnings.push(warning);
        }
        loaded
    }

    fn load_file() -> LoadedConfig {
        let config_paths = ["config.json", "config/config.json"];
        let mut warnings = Vec::new();

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        return LoadedConfig {
                            config,
                            source: ConfigSource::File(path.to_string()),
                            warnings,
                        };
                    }
                    Err(e) => warnings.push(format!("加载配置文件 {} 失败: {}", path, e)),
                }
            }
        }

        LoadedConfig {
            config: Self::default(),
            source: ConfigSource::Default,
            warnings,
        }
    }

    fn apply_env(&mut self) -> Option<String> {
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => return Some(format!("PORT 环境变量无效: {}", port)),
            }
        }
        None
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.fetch.quote_timeout_ms, 7000);
        assert_eq!(config.fetch.series_timeout_ms, 8000);
        assert_eq!(config.defaults.symbol, "MSTY");
        assert_eq!(config.defaults.range, "30d");
        assert_eq!(config.providers.tabular_timezone, "UTC");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_log_level_from_json() {
        let config: AppConfig = serde_json::from_str(r#"{ "log": { "level": "debug" } }"#).unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.server.port, 3000);

        let config: AppConfig = serde_json::from_str(r#"{ "log": {} }"#).unwrap();
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "server": { "port": 8081 },
            "fetch": { "quote_timeout_ms": 2500 },
            "providers": { "tabular_timezone": "Europe/Warsaw" }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.fetch.quote_timeout_ms, 2500);
        assert_eq!(config.fetch.series_timeout_ms, 8000);
        assert_eq!(config.providers.tabular_timezone, "Europe/Warsaw");
        assert_eq!(config.providers.stooq_base_url, "https://stooq.com");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let loaded = AppConfig::load_file();
        assert_eq!(loaded.source, ConfigSource::Default);
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.config.log.level, "info");
    }

    #[test]
    fn test_from_file_missing() {
        assert!(AppConfig::from_file("does/not/exist.json").is_err());
    }
}
