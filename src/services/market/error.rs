//! 行情获取错误类型
//!
//! `FetchError` 覆盖单个数据源一次尝试的所有失败原因，
//! `RetrievalError` 是回退链全部失败后唯一对外暴露的错误。

use std::time::Duration;
use thiserror::Error;

use crate::models::ProviderAttempt;

/// 单次数据源尝试的失败原因
///
/// 传输层错误来自 [`super::fetch`]，格式层错误来自各解析器。
/// 回退链对所有变体一视同仁：记录后切换到下一个数据源。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// 请求超时，在途请求已被取消
    #[error("timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// DNS、连接、TLS 等网络层错误
    #[error("network error: {0}")]
    NetworkError(String),

    /// 非 2xx 状态码
    #[error("HTTP {0}")]
    HttpError(u16),

    /// 声明为 JSON 的响应体无法解码
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// 无法构造请求地址
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("no result")]
    NoResult,

    #[error("bad price")]
    InvalidPrice,

    #[error("header not found")]
    HeaderNotFound,

    #[error("empty series")]
    EmptySeries,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_status() {
            if let Some(status) = e.status() {
                return FetchError::HttpError(status.as_u16());
            }
        }
        if e.is_decode() {
            return FetchError::InvalidBody(e.to_string());
        }
        FetchError::NetworkError(e.to_string())
    }
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::InvalidEndpoint(e.to_string())
    }
}

/// 回退链的最终失败
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    /// 所有数据源都失败，按尝试顺序携带每个数据源的错误
    #[error("All sources failed")]
    AllFailed { attempts: Vec<ProviderAttempt> },
}

impl RetrievalError {
    /// 诊断信息，每个数据源一条，格式为 "<数据源>: <错误>"
    pub fn details(&self) -> Vec<String> {
        match self {
            RetrievalError::AllFailed { attempts } => {
                attempts.iter().map(|a| a.to_string()).collect()
            }
        }
    }
}
