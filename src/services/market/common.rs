//! 公共常量和辅助函数

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::time::Duration;
use url::Url;

use super::error::FetchError;
use crate::config::AppConfig;
use crate::models::QueryKind;

// ==================== 数据源常量 ====================

/// Yahoo 数据源名称
pub const YAHOO: &str = "Yahoo";
/// Stooq 数据源名称
pub const STOOQ: &str = "Stooq";

/// Yahoo Finance API
pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
/// Stooq CSV 接口
pub const STOOQ_BASE_URL: &str = "https://stooq.com";

/// 报价请求默认超时
pub const QUOTE_TIMEOUT: Duration = Duration::from_millis(7000);
/// 历史序列请求默认超时
pub const SERIES_TIMEOUT: Duration = Duration::from_millis(8000);

/// 各数据源共享的请求参数
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub yahoo_base_url: String,
    pub stooq_base_url: String,
    /// Stooq 报价中日期/时间所在的时区
    pub tabular_timezone: Tz,
    pub quote_timeout: Duration,
    pub series_timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            yahoo_base_url: YAHOO_BASE_URL.to_string(),
            stooq_base_url: STOOQ_BASE_URL.to_string(),
            tabular_timezone: Tz::UTC,
            quote_timeout: QUOTE_TIMEOUT,
            series_timeout: SERIES_TIMEOUT,
        }
    }
}

impl ProviderSettings {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let tabular_timezone: Tz = config
            .providers
            .tabular_timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("无效的时区 {}: {}", config.providers.tabular_timezone, e))?;

        Ok(Self {
            yahoo_base_url: config.providers.yahoo_base_url.clone(),
            stooq_base_url: config.providers.stooq_base_url.clone(),
            tabular_timezone,
            quote_timeout: Duration::from_millis(config.fetch.quote_timeout_ms),
            series_timeout: Duration::from_millis(config.fetch.series_timeout_ms),
        })
    }

    pub fn timeout_for(&self, kind: QueryKind) -> Duration {
        match kind {
            QueryKind::Quote => self.quote_timeout,
            QueryKind::Series => self.series_timeout,
        }
    }
}

/// 拼接基础地址与路径
pub fn endpoint(base: &str, path: &str) -> Result<Url, FetchError> {
    Ok(Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))?)
}

/// 当前 Unix 时间（秒）
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// Unix 秒转为 UTC 日期字符串（YYYY-MM-DD）
pub fn date_label(ts: f64) -> Option<String> {
    if !ts.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp(ts.floor() as i64, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// JSON 值转为数字，数字字符串按严格格式解析
pub fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// 同 [`value_as_f64`]，但只接受有限值
pub fn finite_f64(value: &serde_json::Value) -> Option<f64> {
    value_as_f64(value).filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_date_label() {
        assert_eq!(date_label(1_704_153_600.0).as_deref(), Some("2024-01-02"));
        assert_eq!(date_label(1_704_239_999.0).as_deref(), Some("2024-01-02"));
        assert_eq!(date_label(f64::NAN), None);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let url = endpoint("http://127.0.0.1:9000/", "/q/l/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/q/l/");
        assert!(endpoint("not a url", "/x").is_err());
    }

    #[test]
    fn test_finite_f64() {
        assert_eq!(finite_f64(&json!(1.5)), Some(1.5));
        assert_eq!(finite_f64(&json!("2.25")), Some(2.25));
        assert_eq!(finite_f64(&json!(null)), None);
        assert_eq!(finite_f64(&json!("inf")), None);
        assert_eq!(finite_f64(&json!("12abc")), None);
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = AppConfig::default();
        config.fetch.quote_timeout_ms = 1500;
        config.providers.tabular_timezone = "Europe/Warsaw".to_string();
        let settings = ProviderSettings::from_config(&config).unwrap();
        assert_eq!(settings.quote_timeout, Duration::from_millis(1500));
        assert_eq!(settings.tabular_timezone, chrono_tz::Europe::Warsaw);

        config.providers.tabular_timezone = "Mars/Olympus".to_string();
        assert!(ProviderSettings::from_config(&config).is_err());
    }

    #[test]
    fn test_timeout_for_kind() {
        let settings = ProviderSettings::default();
        assert_eq!(settings.timeout_for(QueryKind::Quote), Duration::from_millis(7000));
        assert_eq!(settings.timeout_for(QueryKind::Series), Duration::from_millis(8000));
    }
}
