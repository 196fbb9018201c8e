//! 行情数据模型
//!
//! 定义报价、历史序列及查询参数等数据结构

use serde::{Deserialize, Serialize};
use std::fmt;

/// 单个实时报价
///
/// 价格必须是有限值，缺失或非有限价格视为解析失败
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Quote {
    /// 最新价格
    pub price: f64,
    /// 报价时间（Unix 秒）
    #[serde(rename = "ts")]
    pub timestamp: i64,
    /// 数据来源
    pub source: String,
}

/// 历史收盘价序列
///
/// `labels` 与 `prices` 一一对应，且至少包含一个点
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Series {
    /// 日期标签（YYYY-MM-DD）
    pub labels: Vec<String>,
    /// 收盘价
    pub prices: Vec<f64>,
    /// 数据来源
    pub source: String,
}

impl Series {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// 抽象时间范围，如 "7d"、"30d"、"1y"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeToken(String);

impl RangeToken {
    pub const DEFAULT: &'static str = "30d";

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 换算为天数，供按天数取数的数据源使用
    ///
    /// 支持 d/w/m/y 后缀，无法识别时按 30 天处理。
    /// 单位会参与换算：`1y` 为 365 天，而不是只取数字部分的 1 天
    pub fn day_count(&self) -> u32 {
        let digits: String = self.0.chars().take_while(|c| c.is_ascii_digit()).collect();
        let n = match digits.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return 30,
        };
        let unit = &self.0[digits.len()..];
        match unit {
            "" | "d" => n,
            "w" => n.saturating_mul(7),
            "m" | "mo" => n.saturating_mul(30),
            "y" => n.saturating_mul(365),
            _ => 30,
        }
    }
}

impl Default for RangeToken {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 查询类别，决定默认超时
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Quote,
    Series,
}

/// 报价查询
#[derive(Debug, Clone)]
pub struct QuoteQuery {
    pub symbol: String,
}

/// 历史序列查询
#[derive(Debug, Clone)]
pub struct SeriesQuery {
    pub symbol: String,
    pub range: RangeToken,
}

/// 单个数据源的失败记录
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAttempt {
    pub provider: String,
    pub message: String,
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.message)
    }
}

/// 报价接口查询参数
#[derive(Debug, Deserialize)]
pub struct PriceParams {
    /// 证券代码
    pub symbol: Option<String>,
}

/// 历史接口查询参数
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// 证券代码
    pub symbol: Option<String>,
    /// 时间范围（7d, 30d, 90d, 180d, 1y）
    pub range: Option<String>,
}
