//! 多数据源行情服务模块
//!
//! ## 数据来源
//! - Yahoo Finance：实时报价、历史K线（JSON）
//! - Stooq：实时报价、日线历史（CSV）
//!
//! ## 主要功能
//! - 带超时的单次请求
//! - 两种响应格式的解析与统一
//! - 按优先级顺序的数据源回退

mod common;
mod error;
mod fallback;
mod fetch;
mod number;
mod stooq;
mod yahoo;

#[cfg(test)]
pub mod testing;

pub use common::{ProviderSettings, STOOQ, YAHOO};
pub use error::{FetchError, RetrievalError};
pub use fallback::{FallbackChain, ProviderAdapter, Retrieval, RetrievalState, Retrieved};
pub use fetch::{bounded, Body, Expect, FetchRequest, Fetcher, HttpFetcher};
pub use number::{parse_number, parse_number_value};

use crate::models::{Quote, QuoteQuery, Series, SeriesQuery};

/// 报价回退链：Yahoo 优先，Stooq 兜底
pub fn quote_chain() -> FallbackChain<QuoteQuery, Quote> {
    FallbackChain::new(vec![
        ProviderAdapter {
            name: YAHOO,
            request: yahoo::quote_request,
            parse: yahoo::parse_quote_body,
        },
        ProviderAdapter {
            name: STOOQ,
            request: stooq::quote_request,
            parse: stooq::parse_quote_body,
        },
    ])
}

/// 历史序列回退链：Yahoo 优先，Stooq 兜底
pub fn series_chain() -> FallbackChain<SeriesQuery, Series> {
    FallbackChain::new(vec![
        ProviderAdapter {
            name: YAHOO,
            request: yahoo::chart_request,
            parse: yahoo::parse_chart_body,
        },
        ProviderAdapter {
            name: STOOQ,
            request: stooq::history_request,
            parse: stooq::parse_history_body,
        },
    ])
}
