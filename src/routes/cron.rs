//! Shared-secret protected triggers, invoked by an external scheduler.

use std::time::Duration;

use actix_web::{HttpRequest, HttpResponse, Responder, post, web};
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::adapters::AdapterRegistry;
use crate::domain::types::JobSource;
use crate::mailer::{DigestRenderer, Mailer};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{authorization_header, error_response};
use crate::services::auth::authorize_bearer;
use crate::services::backfill::backfill_categories as backfill_categories_service;
use crate::services::delivery::{DeliverySettings, deliver_due_notifications};
use crate::services::ingestion::IngestionOptions;
use crate::services::pipeline::crawl_and_schedule;
use crate::services::retention::purge_expired;
use crate::services::scheduler::local_now;
use crate::services::{ServiceError, ServiceResult};

/// Held while a delivery run is in progress.
#[derive(Default)]
pub struct DeliveryLock(Mutex<()>);

fn authorize(req: &HttpRequest, config: &ServerConfig) -> ServiceResult<()> {
    authorize_bearer(authorization_header(req), &config.cron_secret)
}

#[post("/cron/crawl")]
pub async fn crawl_all(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    registry: web::Data<AdapterRegistry>,
    config: web::Data<ServerConfig>,
) -> impl Responder {
    if let Err(err) = authorize(&req, &config) {
        return error_response(err);
    }

    let options = IngestionOptions::scheduled(
        config.ingestion.recency_days,
        Duration::from_millis(config.ingestion.inter_source_delay_ms),
    );
    let now = local_now(config.timezone_offset_hours);
    match crawl_and_schedule(repo.get_ref(), registry.get_ref(), None, &options, now).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct ManualCrawlParams {
    actor: Option<String>,
}

#[post("/cron/crawl/{source}")]
pub async fn crawl_source(
    req: HttpRequest,
    source: web::Path<String>,
    params: web::Query<ManualCrawlParams>,
    repo: web::Data<DieselRepository>,
    registry: web::Data<AdapterRegistry>,
    config: web::Data<ServerConfig>,
) -> impl Responder {
    if let Err(err) = authorize(&req, &config) {
        return error_response(err);
    }

    let source = match JobSource::try_from(source.as_str()) {
        Ok(source) => source,
        Err(_) => return HttpResponse::NotFound().finish(),
    };
    let options =
        IngestionOptions::manual(params.into_inner().actor, config.ingestion.recency_days);
    let now = local_now(config.timezone_offset_hours);
    match crawl_and_schedule(repo.get_ref(), registry.get_ref(), Some(source), &options, now).await
    {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => error_response(err),
    }
}

#[post("/cron/notifications")]
pub async fn deliver_notifications(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    mailer: web::Data<dyn Mailer>,
    renderer: web::Data<DigestRenderer>,
    lock: web::Data<DeliveryLock>,
    config: web::Data<ServerConfig>,
) -> impl Responder {
    if let Err(err) = authorize(&req, &config) {
        return error_response(err);
    }

    let Ok(_guard) = lock.0.try_lock() else {
        return error_response(ServiceError::Conflict(
            "notification delivery already running".to_string(),
        ));
    };

    let settings = DeliverySettings::from(&config.delivery);
    match deliver_due_notifications(
        repo.get_ref(),
        mailer.get_ref(),
        renderer.get_ref(),
        &settings,
        Utc::now().naive_utc(),
    )
    .await
    {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => error_response(err),
    }
}

#[post("/cron/cleanup")]
pub async fn cleanup(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> impl Responder {
    if let Err(err) = authorize(&req, &config) {
        return error_response(err);
    }

    match purge_expired(repo.get_ref(), Utc::now().naive_utc(), config.retention_days) {
        Ok(counts) => HttpResponse::Ok().json(counts),
        Err(err) => error_response(err),
    }
}

#[post("/cron/backfill-categories")]
pub async fn backfill_categories(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> impl Responder {
    if let Err(err) = authorize(&req, &config) {
        return error_response(err);
    }

    match backfill_categories_service(repo.get_ref()) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => error_response(err),
    }
}
