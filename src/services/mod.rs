//! 业务逻辑服务模块
//!
//! 封装数据获取和处理逻辑

pub mod market;         // 多数据源行情获取
pub mod price_service;  // 报价/历史序列服务

pub use price_service::PriceService;
