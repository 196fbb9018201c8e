//! 数字字符串清洗
//!
//! 将带有千分位、本地化小数点的字符串转换为 f64。
//! 这是一个启发式实现：无法获知真实的地区设置，只按逗号/句点的出现方式猜测。
//! 失败时返回 `f64::NAN`，调用方需自行检查。

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEADING_FLOAT: Regex =
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").unwrap();
}

/// 解析可能带有地区格式的数字字符串
///
/// - 同时有逗号和句点：逗号为千分位
/// - 只有一个逗号且其后不超过两位：逗号为小数点
/// - 其他只有逗号的情况：逗号全部为千分位
pub fn parse_number(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();

    let has_comma = cleaned.contains(',');
    let has_dot = cleaned.contains('.');

    let normalized = if has_comma && has_dot {
        cleaned.replace(',', "")
    } else if has_comma {
        let parts: Vec<&str> = cleaned.split(',').collect();
        if parts.len() == 2 && parts[1].chars().count() <= 2 {
            format!("{}.{}", parts[0], parts[1])
        } else {
            parts.concat()
        }
    } else {
        cleaned
    };

    parse_leading_float(&normalized)
}

/// 非字符串输入不做清洗，直接数值转换
pub fn parse_number_value(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::String(s) => parse_number(s),
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// 取最长的数字前缀解析，例如 "12.5abc" -> 12.5
fn parse_leading_float(s: &str) -> f64 {
    let Some(m) = LEADING_FLOAT.find(s) else {
        return f64::NAN;
    };
    let text = m.as_str();
    if let Some(sign) = text.strip_suffix("Infinity") {
        return if sign == "-" { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    text.parse::<f64>().unwrap_or(f64::NAN)
}
