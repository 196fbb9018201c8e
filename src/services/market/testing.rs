//! 测试用的脚本化 Fetcher
//!
//! 按请求地址返回预设响应，并记录每次请求，用于验证回退顺序和调用次数。

use async_trait::async_trait;
use std::sync::Mutex;
use url::Url;

use super::error::FetchError;
use super::fetch::{bounded, Body, FetchRequest, Fetcher};

/// 预设响应
pub enum Reply {
    Ok(Body),
    Fail(FetchError),
    /// 永不返回，只能被超时打断
    Hang,
}

impl Reply {
    pub fn text(text: &str) -> Self {
        Reply::Ok(Body::Text(text.to_string()))
    }

    pub fn json(value: serde_json::Value) -> Self {
        Reply::Ok(Body::Json(value))
    }
}

type Script = Box<dyn Fn(&Url) -> Reply + Send + Sync>;

pub struct ScriptedFetcher {
    script: Script,
    calls: Mutex<Vec<Url>>,
}

impl ScriptedFetcher {
    pub fn new(script: impl Fn(&Url) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Url> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, host: &str) -> usize {
        self.calls()
            .iter()
            .filter(|url| url.host_str() == Some(host))
            .count()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Body, FetchError> {
        self.calls.lock().unwrap().push(request.url.clone());
        let reply = (self.script)(&request.url);
        bounded(request.timeout, async move {
            match reply {
                Reply::Ok(body) => Ok(body),
                Reply::Fail(e) => Err(e),
                Reply::Hang => std::future::pending().await,
            }
        })
        .await
    }
}
