pub mod price;
pub mod health;

use actix_web::{http::Method, middleware::DefaultHeaders, web, HttpRequest, HttpResponse};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(health::config)
            .configure(price::config)
            .default_service(web::to(api_fallback))
    );
}

/// 所有响应附带的公共响应头
pub fn default_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Cache-Control", "no-store"))
}

/// CORS 预检
pub async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// /api 下未注册的路径：OPTIONS 一律 204，其余 404
async fn api_fallback(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::NotFound().finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_options_on_any_api_path() {
        let app = test::init_service(App::new().wrap(default_headers()).configure(config)).await;

        for uri in ["/api/price", "/api/health", "/api/other", "/api/price/x"] {
            let req = test::TestRequest::default()
                .method(Method::OPTIONS)
                .uri(uri)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NO_CONTENT, "OPTIONS {}", uri);
            assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
        }
    }

    #[actix_web::test]
    async fn test_unknown_api_path_not_found() {
        let app = test::init_service(App::new().configure(config)).await;
        let req = test::TestRequest::get().uri("/api/other").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
