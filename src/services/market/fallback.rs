//! 多数据源回退链
//!
//! 按固定顺序逐个尝试数据源，第一个成功的结果即为最终结果，
//! 后续数据源不再请求；全部失败时返回按顺序排列的诊断信息。
//!
//! 状态流转:
//! `Pending -> TryingProvider(i) -> Succeeded | TryingProvider(i+1) | AllFailed`
//!
//! 状态机 [`Retrieval`] 本身不做 I/O，[`FallbackChain::run`] 负责驱动。

use super::common::ProviderSettings;
use super::error::{FetchError, RetrievalError};
use super::fetch::{Body, FetchRequest, Fetcher};
use crate::models::ProviderAttempt;

/// 数据源适配器：请求构造 + 响应解析
pub struct ProviderAdapter<Q, T> {
    pub name: &'static str,
    pub request: fn(&Q, &ProviderSettings) -> Result<FetchRequest, FetchError>,
    pub parse: fn(Body, &Q, &ProviderSettings) -> Result<T, FetchError>,
}

impl<Q, T> ProviderAdapter<Q, T> {
    /// 对该数据源发起一次完整尝试（请求 + 解析）
    pub async fn attempt(
        &self,
        fetcher: &dyn Fetcher,
        query: &Q,
        settings: &ProviderSettings,
    ) -> Result<T, FetchError> {
        let request = (self.request)(query, settings)?;
        let body = fetcher.fetch(&request).await?;
        (self.parse)(body, query, settings)
    }
}

/// 成功结果及命中的数据源
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieved<T> {
    pub value: T,
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalState<T> {
    Pending,
    TryingProvider(usize),
    Succeeded(Retrieved<T>),
    AllFailed,
}

/// 单次查询的回退状态机
#[derive(Debug)]
pub struct Retrieval<T> {
    provider_count: usize,
    attempts: Vec<ProviderAttempt>,
    state: RetrievalState<T>,
}

impl<T> Retrieval<T> {
    pub fn new(provider_count: usize) -> Self {
        Self {
            provider_count,
            attempts: Vec::new(),
            state: RetrievalState::Pending,
        }
    }

    pub fn state(&self) -> &RetrievalState<T> {
        &self.state
    }

    pub fn attempts(&self) -> &[ProviderAttempt] {
        &self.attempts
    }

    /// 下一个要尝试的数据源下标，到达终态后返回 None
    pub fn next_provider(&mut self) -> Option<usize> {
        match self.state {
            RetrievalState::Pending => {
                if self.provider_count == 0 {
                    self.state = RetrievalState::AllFailed;
                    return None;
                }
                self.state = RetrievalState::TryingProvider(0);
                Some(0)
            }
            RetrievalState::TryingProvider(index) => Some(index),
            RetrievalState::Succeeded(_) | RetrievalState::AllFailed => None,
        }
    }

    /// 记录当前数据源的尝试结果并推进状态
    pub fn record(&mut self, provider: &str, outcome: Result<T, FetchError>) {
        let RetrievalState::TryingProvider(index) = self.state else {
            return;
        };

        match outcome {
            Ok(value) => {
                self.attempts.clear();
                self.state = RetrievalState::Succeeded(Retrieved {
                    value,
                    provider: provider.to_string(),
                });
            }
            Err(e) => {
                self.attempts.push(ProviderAttempt {
                    provider: provider.to_string(),
                    message: e.to_string(),
                });
                self.state = if index + 1 < self.provider_count {
                    RetrievalState::TryingProvider(index + 1)
                } else {
                    RetrievalState::AllFailed
                };
            }
        }
    }

    pub fn finish(self) -> Result<Retrieved<T>, RetrievalError> {
        match self.state {
            RetrievalState::Succeeded(retrieved) => Ok(retrieved),
            _ => Err(RetrievalError::AllFailed {
                attempts: self.attempts,
            }),
        }
    }
}

/// 有序的数据源列表，顺序即优先级
pub struct FallbackChain<Q, T> {
    adapters: Vec<ProviderAdapter<Q, T>>,
}

impl<Q, T> FallbackChain<Q, T> {
    pub fn new(adapters: Vec<ProviderAdapter<Q, T>>) -> Self {
        Self { adapters }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name).collect()
    }

    /// 依次尝试各数据源，不并发
    pub async fn run(
        &self,
        fetcher: &dyn Fetcher,
        query: &Q,
        settings: &ProviderSettings,
    ) -> Result<Retrieved<T>, RetrievalError> {
        let mut retrieval = Retrieval::new(self.adapters.len());

        while let Some(index) = retrieval.next_provider() {
            let adapter = &self.adapters[index];
            let outcome = adapter.attempt(fetcher, query, settings).await;
            match &outcome {
                Ok(_) => log::info!("数据源 {} 获取成功", adapter.name),
                Err(e) => log::warn!("数据源 {} 获取失败: {}", adapter.name, e),
            }
            retrieval.record(adapter.name, outcome);
        }

        retrieval.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Quote, QuoteQuery};
    use crate::services::market::testing::{Reply, ScriptedFetcher};
    use crate::services::market::{quote_chain, STOOQ, YAHOO};
    use std::time::Duration;

    // ==================== 状态机 ====================

    #[test]
    fn test_first_success_wins() {
        let mut retrieval: Retrieval<u32> = Retrieval::new(3);
        assert_eq!(retrieval.state(), &RetrievalState::Pending);

        assert_eq!(retrieval.next_provider(), Some(0));
        retrieval.record("a", Ok(7));

        assert_eq!(retrieval.next_provider(), None);
        assert!(retrieval.attempts().is_empty());
        let retrieved = retrieval.finish().unwrap();
        assert_eq!(retrieved.value, 7);
        assert_eq!(retrieved.provider, "a");
    }

    #[test]
    fn test_failure_advances_to_next_provider() {
        let mut retrieval: Retrieval<u32> = Retrieval::new(3);
        assert_eq!(retrieval.next_provider(), Some(0));
        retrieval.record("a", Err(FetchError::Timeout(Duration::from_millis(5))));
        assert_eq!(retrieval.state(), &RetrievalState::TryingProvider(1));

        assert_eq!(retrieval.next_provider(), Some(1));
        retrieval.record("b", Err(FetchError::NoResult));
        assert_eq!(retrieval.next_provider(), Some(2));
        retrieval.record("c", Ok(1));

        assert_eq!(
            retrieval.state(),
            &RetrievalState::Succeeded(Retrieved {
                value: 1,
                provider: "c".to_string()
            })
        );
        assert!(retrieval.attempts().is_empty());
    }

    #[test]
    fn test_all_failed_keeps_attempt_order() {
        let mut retrieval: Retrieval<u32> = Retrieval::new(2);
        retrieval.next_provider();
        retrieval.record("a", Err(FetchError::HttpError(500)));
        retrieval.next_provider();
        retrieval.record("b", Err(FetchError::EmptySeries));

        assert_eq!(retrieval.state(), &RetrievalState::AllFailed);
        assert_eq!(retrieval.next_provider(), None);

        let err = retrieval.finish().unwrap_err();
        assert_eq!(err.details(), vec!["a: HTTP 500", "b: empty series"]);
    }

    #[test]
    fn test_no_providers_is_all_failed() {
        let mut retrieval: Retrieval<u32> = Retrieval::new(0);
        assert_eq!(retrieval.next_provider(), None);
        assert_eq!(retrieval.state(), &RetrievalState::AllFailed);
        assert!(retrieval.finish().unwrap_err().details().is_empty());
    }

    #[test]
    fn test_record_after_terminal_is_ignored() {
        let mut retrieval: Retrieval<u32> = Retrieval::new(1);
        retrieval.next_provider();
        retrieval.record("a", Ok(1));
        retrieval.record("b", Err(FetchError::NoResult));
        assert_eq!(retrieval.finish().unwrap().provider, "a");
    }

    // ==================== 回退链 ====================

    fn settings() -> ProviderSettings {
        ProviderSettings {
            yahoo_base_url: "http://yahoo.test".to_string(),
            stooq_base_url: "http://stooq.test".to_string(),
            quote_timeout: Duration::from_millis(100),
            ..ProviderSettings::default()
        }
    }

    fn query(symbol: &str) -> QuoteQuery {
        QuoteQuery {
            symbol: symbol.to_string(),
        }
    }

    const STOOQ_CSV: &str = "Symbol,Date,Time,Open,High,Low,Close,Volume\nAAA.US,2024-03-01,22:00:09,41,43,40,42.10,100\n";

    #[test]
    fn test_quote_chain_order() {
        assert_eq!(quote_chain().provider_names(), vec![YAHOO, STOOQ]);
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let fetcher = ScriptedFetcher::new(|url| match url.host_str() {
            Some("yahoo.test") => Reply::json(serde_json::json!({
                "quoteResponse": {"result": [{"regularMarketPrice": 10.0, "regularMarketTime": 1}]}
            })),
            _ => Reply::text(STOOQ_CSV),
        });

        let retrieved: Retrieved<Quote> = quote_chain()
            .run(&fetcher, &query("AAA"), &settings())
            .await
            .unwrap();

        assert_eq!(retrieved.provider, YAHOO);
        assert_eq!(retrieved.value.source, YAHOO);
        assert_eq!(fetcher.calls_to("yahoo.test"), 1);
        assert_eq!(fetcher.calls_to("stooq.test"), 0);
    }

    #[tokio::test]
    async fn test_secondary_used_after_primary_failure() {
        let fetcher = ScriptedFetcher::new(|url| match url.host_str() {
            Some("yahoo.test") => Reply::Fail(FetchError::HttpError(401)),
            _ => Reply::text(STOOQ_CSV),
        });

        let retrieved = quote_chain()
            .run(&fetcher, &query("AAA"), &settings())
            .await
            .unwrap();

        assert_eq!(retrieved.provider, STOOQ);
        assert_eq!(retrieved.value.price, 42.10);
        assert_eq!(fetcher.calls_to("yahoo.test"), 1);
        assert_eq!(fetcher.calls_to("stooq.test"), 1);
    }

    #[tokio::test]
    async fn test_every_provider_failing() {
        let fetcher = ScriptedFetcher::new(|url| match url.host_str() {
            Some("yahoo.test") => Reply::Hang,
            _ => Reply::text("<html>Service unavailable</html>"),
        });

        let err = quote_chain()
            .run(&fetcher, &query("AAA"), &settings())
            .await
            .unwrap_err();

        let details = err.details();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0], "Yahoo: timeout after 100ms");
        assert_eq!(details[1], "Stooq: header not found");
    }

    /// 每个数据源只请求一次，失败后不重试
    #[tokio::test]
    async fn test_no_retry_against_same_provider() {
        let fetcher = ScriptedFetcher::new(|_| Reply::Fail(FetchError::NetworkError("reset".into())));

        let _ = quote_chain().run(&fetcher, &query("AAA"), &settings()).await;

        assert_eq!(fetcher.calls_to("yahoo.test"), 1);
        assert_eq!(fetcher.calls_to("stooq.test"), 1);
        assert_eq!(fetcher.calls().len(), 2);
    }
}
