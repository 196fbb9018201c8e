use actix_web::{http::Method, web, HttpResponse, Result};
use crate::models::HealthResponse;

pub async fn health_check() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse::ok()))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/health")
            .route(web::get().to(health_check))
            .route(web::method(Method::OPTIONS).to(super::preflight)),
    );
}
