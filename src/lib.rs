//! 多数据源行情聚合
//!
//! 从多个上游数据源获取实时报价和历史收盘价，统一格式，
//! 单个数据源失败时按优先级顺序回退。
//! 数据来源：Yahoo Finance、Stooq

pub mod config;   // 配置加载
pub mod handlers; // HTTP 请求处理器
pub mod models;   // 数据模型定义
pub mod services; // 业务逻辑服务
