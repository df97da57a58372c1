use actix_web::{HttpRequest, HttpResponse, Responder, get, web};

use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{authorization_header, error_response};
use crate::services::auth::authorize_bearer;
use crate::services::crawl_logs::{CrawlLogFilters, list_crawl_logs};

#[get("/admin/crawl-logs")]
pub async fn crawl_logs(
    req: HttpRequest,
    filters: web::Query<CrawlLogFilters>,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> impl Responder {
    if let Err(err) = authorize_bearer(authorization_header(&req), &config.admin_token) {
        return error_response(err);
    }

    match list_crawl_logs(&filters, repo.get_ref()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(err),
    }
}
