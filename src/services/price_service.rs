//! 行情数据服务
//!
//! 对外提供两个操作：实时报价和历史序列，内部通过回退链访问各数据源。
//! 服务本身不可变，可在并发请求间共享。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::{Quote, QuoteQuery, RangeToken, Series, SeriesQuery};
use crate::services::market::{
    quote_chain, series_chain, FallbackChain, Fetcher, HttpFetcher, ProviderSettings,
    RetrievalError,
};

pub struct PriceService {
    fetcher: Arc<dyn Fetcher>,
    settings: ProviderSettings,
    quote_chain: FallbackChain<QuoteQuery, Quote>,
    series_chain: FallbackChain<SeriesQuery, Series>,
}

impl PriceService {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: ProviderSettings) -> Self {
        Self {
            fetcher,
            settings,
            quote_chain: quote_chain(),
            series_chain: series_chain(),
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        let settings = ProviderSettings::from_config(config)?;
        Ok(Self::new(Arc::new(fetcher), settings))
    }

    /// 获取实时报价
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, RetrievalError> {
        let query = QuoteQuery {
            symbol: normalize_symbol(symbol),
        };
        log::info!("获取报价: {}", query.symbol);

        let retrieved = self
            .quote_chain
            .run(self.fetcher.as_ref(), &query, &self.settings)
            .await?;
        log::debug!("{} 报价来自 {}", query.symbol, retrieved.provider);
        Ok(retrieved.value)
    }

    /// 获取历史收盘价序列
    pub async fn get_series(&self, symbol: &str, range: RangeToken) -> Result<Series, RetrievalError> {
        let query = SeriesQuery {
            symbol: normalize_symbol(symbol),
            range,
        };
        log::info!("获取历史数据: {} ({})", query.symbol, query.range);

        let retrieved = self
            .series_chain
            .run(self.fetcher.as_ref(), &query, &self.settings)
            .await?;
        debug_assert!(!retrieved.value.is_empty());
        debug_assert_eq!(retrieved.value.labels.len(), retrieved.value.prices.len());
        log::debug!(
            "{} 历史数据来自 {}，共 {} 条",
            query.symbol,
            retrieved.provider,
            retrieved.value.len()
        );
        Ok(retrieved.value)
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
