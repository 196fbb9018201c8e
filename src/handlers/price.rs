//! 行情接口处理器
//!
//! ## API 列表
//! - GET /api/price?symbol=MSTY - 获取实时报价
//! - GET /api/history?symbol=MSTY&range=30d - 获取历史收盘价
//!
//! 全部数据源失败时返回 502，响应体包含各数据源的错误信息

use actix_web::{http::Method, web, HttpResponse, Result};

use super::preflight;
use crate::config::DefaultsConfig;
use crate::models::{ErrorResponse, HistoryParams, PriceParams, RangeToken};
use crate::services::market::RetrievalError;
use crate::services::PriceService;

/// 取非空参数，否则使用默认值
fn param_or(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn all_failed(e: RetrievalError) -> HttpResponse {
    HttpResponse::BadGateway().json(ErrorResponse::all_failed(e.details()))
}

/// 获取实时报价
///
/// GET /api/price?symbol=MSTY
pub async fn get_price(
    service: web::Data<PriceService>,
    defaults: web::Data<DefaultsConfig>,
    query: web::Query<PriceParams>,
) -> Result<HttpResponse> {
    let symbol = param_or(&query.symbol, &defaults.symbol);

    match service.get_quote(&symbol).await {
        Ok(quote) => Ok(HttpResponse::Ok().json(quote)),
        Err(e) => {
            log::error!("{} 报价获取失败: {:?}", symbol, e.details());
            Ok(all_failed(e))
        }
    }
}

/// 获取历史收盘价序列
///
/// GET /api/history?symbol=MSTY&range=90d
///
/// # 参数
/// - range: 7d, 30d, 90d, 180d, 1y（其他值按 30 天处理）
pub async fn get_history(
    service: web::Data<PriceService>,
    defaults: web::Data<DefaultsConfig>,
    query: web::Query<HistoryParams>,
) -> Result<HttpResponse> {
    let symbol = param_or(&query.symbol, &defaults.symbol);
    let range = RangeToken::new(param_or(&query.range, &defaults.range));

    match service.get_series(&symbol, range).await {
        Ok(series) => Ok(HttpResponse::Ok().json(series)),
        Err(e) => {
            log::error!("{} 历史数据获取失败: {:?}", symbol, e.details());
            Ok(all_failed(e))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/price")
            .route(web::get().to(get_price))
            .route(web::method(Method::OPTIONS).to(preflight)),
    )
    .service(
        web::resource("/history")
            .route(web::get().to(get_history))
            .route(web::method(Method::OPTIONS).to(preflight)),
    );
}
