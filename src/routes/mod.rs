//! HTTP trigger surface.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::services::ServiceError;

pub mod admin;
pub mod cron;
pub mod main;

/// Raw `Authorization` header value, if present and readable.
pub fn authorization_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// JSON response for a failed service call.
pub fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().finish(),
        ServiceError::NotFound => HttpResponse::NotFound().finish(),
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            HttpResponse::BadRequest().json(json!({ "error": message }))
        }
        ServiceError::Conflict(message) => HttpResponse::Conflict().json(json!({ "error": message })),
        ServiceError::Internal => HttpResponse::InternalServerError().finish(),
    }
}

/// Registers every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(main::health)
        .service(cron::crawl_all)
        .service(cron::crawl_source)
        .service(cron::deliver_notifications)
        .service(cron::cleanup)
        .service(cron::backfill_categories)
        .service(admin::crawl_logs);
}
