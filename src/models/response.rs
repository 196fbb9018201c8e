//! 通用 API 响应模型
//!
//! 成功时直接返回报价/序列对象，全部数据源失败时返回错误结构

use serde::{Deserialize, Serialize};

/// 全部数据源失败时的响应体
///
/// - error: 概要错误信息
/// - details: 按尝试顺序排列的各数据源错误
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误信息
    pub error: String,
    /// 各数据源的失败原因
    pub details: Vec<String>,
}

impl ErrorResponse {
    pub const ALL_SOURCES_FAILED: &'static str = "All sources failed";

    /// 创建“全部数据源失败”响应
    pub fn all_failed(details: Vec<String>) -> Self {
        Self {
            error: Self::ALL_SOURCES_FAILED.to_string(),
            details,
        }
    }
}

/// 健康检查响应
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
