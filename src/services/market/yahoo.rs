//! Yahoo Finance 接口实现
//!
//! 对接 v7 quote（实时报价）和 v8 chart（历史K线），均为嵌套 JSON。

use serde_json::Value;

use super::common::{
    date_label, endpoint, finite_f64, now_secs, value_as_f64, ProviderSettings, YAHOO,
};
use super::error::FetchError;
use super::fetch::{Body, Expect, FetchRequest};
use crate::models::{QueryKind, Quote, QuoteQuery, RangeToken, Series, SeriesQuery};

const PRICE_FIELDS: [&str; 3] = ["regularMarketPrice", "postMarketPrice", "preMarketPrice"];
const TIME_FIELDS: [&str; 3] = ["regularMarketTime", "postMarketTime", "preMarketTime"];

/// 范围映射表: 抽象范围 -> (Yahoo range, interval)
const CHART_RANGES: [(&str, (&str, &str)); 5] = [
    ("7d", ("7d", "1d")),
    ("30d", ("1mo", "1d")),
    ("90d", ("3mo", "1d")),
    ("180d", ("6mo", "1d")),
    ("1y", ("1y", "1d")),
];
const DEFAULT_CHART_RANGE: (&str, &str) = ("1mo", "1d");

/// 将抽象范围映射为 Yahoo 的 (range, interval)，未知范围使用 30 天映射
pub fn chart_range(range: &RangeToken) -> (&'static str, &'static str) {
    CHART_RANGES
        .iter()
        .find(|(token, _)| *token == range.as_str())
        .map(|(_, params)| *params)
        .unwrap_or(DEFAULT_CHART_RANGE)
}

/// 实时报价请求: /v7/finance/quote?symbols=<symbol>
pub fn quote_request(query: &QuoteQuery, settings: &ProviderSettings) -> Result<FetchRequest, FetchError> {
    let mut url = endpoint(&settings.yahoo_base_url, "/v7/finance/quote")?;
    url.query_pairs_mut().append_pair("symbols", &query.symbol);
    Ok(FetchRequest::new(url, Expect::Json, settings.timeout_for(QueryKind::Quote)))
}

/// 历史K线请求: /v8/finance/chart/<symbol>?range=..&interval=..
pub fn chart_request(query: &SeriesQuery, settings: &ProviderSettings) -> Result<FetchRequest, FetchError> {
    let (range, interval) = chart_range(&query.range);
    let mut url = endpoint(&settings.yahoo_base_url, "/v8/finance/chart")?;
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidEndpoint(settings.yahoo_base_url.clone()))?
        .push(&query.symbol);
    url.query_pairs_mut()
        .append_pair("range", range)
        .append_pair("interval", interval);
    Ok(FetchRequest::new(url, Expect::Json, settings.timeout_for(QueryKind::Series)))
}

pub fn parse_quote_body(body: Body, _query: &QuoteQuery, _settings: &ProviderSettings) -> Result<Quote, FetchError> {
    parse_quote(&body.into_json()?)
}

pub fn parse_chart_body(body: Body, _query: &SeriesQuery, _settings: &ProviderSettings) -> Result<Series, FetchError> {
    parse_chart(&body.into_json()?)
}

/// 取第一个存在且非 null 的字段
fn first_present<'a>(item: &'a Value, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .filter_map(|field| item.get(*field))
        .find(|v| !v.is_null())
}

/// 解析实时报价
///
/// 价格依次取盘中价、盘后价、盘前价；时间同理，都缺失时取当前时间
pub fn parse_quote(data: &Value) -> Result<Quote, FetchError> {
    let item = data
        .pointer("/quoteResponse/result/0")
        .filter(|v| v.is_object())
        .ok_or(FetchError::NoResult)?;

    let price = first_present(item, &PRICE_FIELDS)
        .and_then(value_as_f64)
        .filter(|p| p.is_finite())
        .ok_or(FetchError::InvalidPrice)?;

    let timestamp = first_present(item, &TIME_FIELDS)
        .and_then(finite_f64)
        .map(|t| t.floor() as i64)
        .unwrap_or_else(now_secs);

    Ok(Quote {
        price,
        timestamp,
        source: YAHOO.to_string(),
    })
}

/// 解析历史K线
///
/// 时间戳与收盘价按下标配对，任一缺失或非有限值的点直接跳过
pub fn parse_chart(data: &Value) -> Result<Series, FetchError> {
    let result = data
        .pointer("/chart/result/0")
        .filter(|v| v.is_object())
        .ok_or(FetchError::NoResult)?;

    let timestamps = result
        .get("timestamp")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let closes = result
        .pointer("/indicators/quote/0/close")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut labels = Vec::new();
    let mut prices = Vec::new();

    for (i, ts) in timestamps.iter().enumerate() {
        let (Some(ts), Some(close)) = (finite_f64(ts), closes.get(i).and_then(finite_f64)) else {
            continue;
        };
        if let Some(label) = date_label(ts) {
            labels.push(label);
            prices.push(close);
        }
    }

    if labels.is_empty() {
        return Err(FetchError::EmptySeries);
    }

    Ok(Series {
        labels,
        prices,
        source: YAHOO.to_string(),
    })
}
