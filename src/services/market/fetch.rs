//! 带超时的单次请求
//!
//! 这是核心唯一的 I/O 边界：一次 GET，一个结果（响应体或失败）。
//! 本层不做重试，重试由回退链负责。

use async_trait::async_trait;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use url::Url;

use super::error::FetchError;
use crate::config::FetchConfig;

/// 调用方期望的响应体格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Text,
    Json,
}

/// 响应体
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    Json(serde_json::Value),
}

impl Body {
    pub fn into_text(self) -> Result<String, FetchError> {
        match self {
            Body::Text(text) => Ok(text),
            Body::Json(value) => Ok(value.to_string()),
        }
    }

    pub fn into_json(self) -> Result<serde_json::Value, FetchError> {
        match self {
            Body::Json(value) => Ok(value),
            Body::Text(text) => {
                serde_json::from_str(&text).map_err(|e| FetchError::InvalidBody(e.to_string()))
            }
        }
    }
}

/// 一次出站请求的描述
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: Url,
    pub expect: Expect,
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: Url, expect: Expect, timeout: Duration) -> Self {
        Self { url, expect, timeout }
    }
}

/// 出站请求抽象，便于在不访问网络的情况下测试回退链
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Body, FetchError>;
}

/// 在限定时间内完成 `fut`，否则返回 `Timeout`
///
/// 超时时 `fut` 随之被丢弃，其持有的连接一并关闭
pub async fn bounded<F, T>(limit: Duration, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(limit)),
    }
}

/// 基于 reqwest 的实现
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn execute(&self, request: &FetchRequest) -> Result<Body, FetchError> {
        log::debug!("请求 URL: {}", request.url);

        let response = self.client.get(request.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpError(status.as_u16()));
        }

        let text = response.text().await?;
        match request.expect {
            Expect::Text => Ok(Body::Text(text)),
            Expect::Json => serde_json::from_str(&text)
                .map(Body::Json)
                .map_err(|e| FetchError::InvalidBody(e.to_string())),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Body, FetchError> {
        bounded(request.timeout, self.execute(request)).await
    }
}
