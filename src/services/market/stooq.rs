//! Stooq CSV 接口实现
//!
//! 实时报价: https://stooq.com/q/l/?s=<symbol>.us&f=sd2t2ohlcv&h&e=csv
//! 日线历史: https://stooq.com/q/d/l/?s=<SYMBOL>.US&i=d&c=<days>

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;

use super::common::{endpoint, now_secs, ProviderSettings, STOOQ};
use super::error::FetchError;
use super::fetch::{Body, Expect, FetchRequest};
use crate::models::{QueryKind, Quote, QuoteQuery, Series, SeriesQuery};

lazy_static! {
    static ref QUOTE_HEADER: Regex = Regex::new(r"(?i)^symbol\s*,\s*date\s*,\s*time").unwrap();
    static ref HISTORY_HEADER: Regex =
        Regex::new(r"(?i)^date\s*,\s*open\s*,\s*high\s*,\s*low\s*,\s*close\s*,\s*volume").unwrap();
    static ref DATE_ROW: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}\s*,").unwrap();
    static ref NO_DATA: Regex = Regex::new(r"(?i)^N/?D$").unwrap();
}

/// 实时报价请求，代码转小写并加 .us 后缀
pub fn quote_request(query: &QuoteQuery, settings: &ProviderSettings) -> Result<FetchRequest, FetchError> {
    let mut url = endpoint(&settings.stooq_base_url, "/q/l/")?;
    url.query_pairs_mut()
        .append_pair("s", &format!("{}.us", query.symbol.to_lowercase()))
        .append_pair("f", "sd2t2ohlcv")
        .append_key_only("h")
        .append_pair("e", "csv");
    Ok(FetchRequest::new(url, Expect::Text, settings.timeout_for(QueryKind::Quote)))
}

/// 日线历史请求，范围换算为天数
pub fn history_request(query: &SeriesQuery, settings: &ProviderSettings) -> Result<FetchRequest, FetchError> {
    let mut url = endpoint(&settings.stooq_base_url, "/q/d/l/")?;
    url.query_pairs_mut()
        .append_pair("s", &format!("{}.US", query.symbol))
        .append_pair("i", "d")
        .append_pair("c", &query.range.day_count().to_string());
    Ok(FetchRequest::new(url, Expect::Text, settings.timeout_for(QueryKind::Series)))
}

pub fn parse_quote_body(body: Body, _query: &QuoteQuery, settings: &ProviderSettings) -> Result<Quote, FetchError> {
    parse_quote_csv(&body.into_text()?, settings.tabular_timezone)
}

pub fn parse_history_body(body: Body, _query: &SeriesQuery, _settings: &ProviderSettings) -> Result<Series, FetchError> {
    parse_history_csv(&body.into_text()?)
}

/// 去掉首尾空白和空行
fn lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

fn find_column(header: &[&str], matches: impl Fn(&str) -> bool) -> Option<usize> {
    header.iter().position(|h| matches(&h.trim().to_lowercase()))
}

fn cell<'a>(row: &[&'a str], idx: Option<usize>) -> &'a str {
    idx.and_then(|i| row.get(i)).map(|s| s.trim()).unwrap_or("")
}

/// 解析实时报价 CSV
///
/// 表头可能出现在任意一行（前面可能有提示信息），数据行紧随其后。
/// 收盘价为 N/D 时改用开盘价。
pub fn parse_quote_csv(text: &str, tz: Tz) -> Result<Quote, FetchError> {
    let lines = lines(text);
    let start = lines
        .iter()
        .position(|l| QUOTE_HEADER.is_match(l))
        .filter(|i| i + 1 < lines.len())
        .ok_or(FetchError::HeaderNotFound)?;

    let header: Vec<&str> = lines[start].split(',').collect();
    let row: Vec<&str> = lines[start + 1].split(',').collect();

    let idx_close = find_column(&header, |h| h.contains("close"));
    let idx_open = find_column(&header, |h| h.contains("open"));
    let idx_date = find_column(&header, |h| h == "date" || h.contains("d2"));
    let idx_time = find_column(&header, |h| h == "time" || h.contains("t2"));

    let mut price_str = cell(&row, idx_close);
    if NO_DATA.is_match(price_str) && idx_open.is_some() {
        price_str = cell(&row, idx_open);
    }

    let price = price_str
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or(FetchError::InvalidPrice)?;

    let day = cell(&row, idx_date);
    let time = cell(&row, idx_time);
    let timestamp = if day.is_empty() {
        now_secs()
    } else {
        match local_timestamp(day, time, tz) {
            Some(ts) => ts,
            None => {
                log::warn!("Stooq 日期无法解析: {} {}，使用当前时间", day, time);
                now_secs()
            }
        }
    };

    Ok(Quote {
        price,
        timestamp,
        source: STOOQ.to_string(),
    })
}

/// 按数据源时区把日期和时间组合为 Unix 秒
fn local_timestamp(day: &str, time: &str, tz: Tz) -> Option<i64> {
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%Y%m%d"))
        .ok()?;
    let time = if time.is_empty() {
        NaiveTime::MIN
    } else {
        NaiveTime::parse_from_str(time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
            .ok()?
    };
    tz.from_local_datetime(&NaiveDateTime::new(date, time))
        .earliest()
        .map(|dt| dt.timestamp())
}

/// 解析日线历史 CSV
///
/// 列顺序: date, open, high, low, close, volume。
/// 找不到表头时从第一行以日期开头的数据开始。
pub fn parse_history_csv(text: &str) -> Result<Series, FetchError> {
    let lines = lines(text);
    let start = match lines.iter().position(|l| HISTORY_HEADER.is_match(l)) {
        Some(i) => i + 1,
        None => lines
            .iter()
            .position(|l| DATE_ROW.is_match(l))
            .ok_or(FetchError::HeaderNotFound)?,
    };

    let mut labels = Vec::new();
    let mut prices = Vec::new();

    for line in &lines[start..] {
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 5 {
            continue;
        }
        let date = parts[0].trim();
        if date.is_empty() {
            continue;
        }
        if let Some(close) = parts[4].trim().parse::<f64>().ok().filter(|c| c.is_finite()) {
            labels.push(date.to_string());
            prices.push(close);
        }
    }

    if labels.is_empty() {
        return Err(FetchError::EmptySeries);
    }

    Ok(Series {
        labels,
        prices,
        source: STOOQ.to_string(),
    })
}
