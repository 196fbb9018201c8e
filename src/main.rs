//! 行情聚合后端服务
//!
//! 提供实时报价和历史数据的 RESTful API 服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use price_relay_backend::config::AppConfig;
use price_relay_backend::handlers;
use price_relay_backend::services::PriceService;

/// 应用程序入口
///
/// 加载配置后启动 HTTP 服务器，默认监听 0.0.0.0:3000
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let loaded = AppConfig::load();

    // 初始化日志系统，RUST_LOG 未设置时使用配置中的级别
    env_logger::init_from_env(Env::default().default_filter_or(loaded.config.log.level.as_str()));
    loaded.report();

    let config = loaded.config;

    let service = PriceService::from_config(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let service = web::Data::new(service);
    let defaults = web::Data::new(config.defaults.clone());

    let bind_addr = config.bind_addr();
    log::info!("启动行情聚合服务: http://{}", bind_addr);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())            // 请求日志
            .wrap(handlers::default_headers())  // CORS / 禁止缓存
            .app_data(service.clone())
            .app_data(defaults.clone())
            .configure(handlers::config)        // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await
}
