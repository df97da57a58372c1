use std::sync::Arc;

use actix_web::{App, test, web};
use jobfeed::adapters::AdapterRegistry;
use jobfeed::mailer::{DigestRenderer, LogMailer, Mailer};
use jobfeed::models::config::{
    DeliveryConfig, IngestionConfig, MailConfig, MailTransport, ServerConfig,
};
use jobfeed::repository::DieselRepository;
use jobfeed::routes::configure;
use jobfeed::routes::cron::DeliveryLock;
use serde_json::Value;

mod common;

fn server_config() -> ServerConfig {
    ServerConfig {
        database_url: String::new(),
        address: "127.0.0.1".to_string(),
        port: 0,
        cron_secret: "cron-secret".to_string(),
        admin_token: "admin-token".to_string(),
        timezone_offset_hours: 0,
        site_url: "https://jobs.example.com".to_string(),
        retention_days: 90,
        ingestion: IngestionConfig::default(),
        delivery: DeliveryConfig::default(),
        mail: MailConfig {
            transport: MailTransport::Log,
            from: "Jobs <jobs@example.com>".to_string(),
            smtp_host: String::new(),
            smtp_user: String::new(),
            smtp_password: String::new(),
        },
    }
}

macro_rules! app {
    ($test_db:expr) => {{
        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);
        let mailer: web::Data<dyn Mailer> = web::Data::from(mailer);
        test::init_service(
            App::new()
                .app_data(web::Data::new(DieselRepository::new($test_db.pool())))
                .app_data(web::Data::new(AdapterRegistry::new(vec![])))
                .app_data(mailer)
                .app_data(web::Data::new(
                    DigestRenderer::new("https://jobs.example.com").unwrap(),
                ))
                .app_data(web::Data::new(DeliveryLock::default()))
                .app_data(web::Data::new(server_config()))
                .configure(configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn health_needs_no_credentials() {
    let test_db = common::TestDb::new();
    let app = app!(test_db);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn cron_triggers_reject_missing_or_wrong_secret() {
    let test_db = common::TestDb::new();
    let app = app!(test_db);

    for uri in [
        "/cron/crawl",
        "/cron/crawl/remotive",
        "/cron/notifications",
        "/cron/cleanup",
        "/cron/backfill-categories",
    ] {
        let req = test::TestRequest::post().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "{uri} without credentials");

        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header(("Authorization", "Bearer admin-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "{uri} with the admin token");
    }
}

#[actix_web::test]
async fn cleanup_returns_counts_per_table() {
    let test_db = common::TestDb::new();
    let app = app!(test_db);

    let req = test::TestRequest::post()
        .uri("/cron/cleanup")
        .insert_header(("Authorization", "Bearer cron-secret"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["jobs"], 0);
    assert_eq!(body["crawl_logs"], 0);
}

#[actix_web::test]
async fn manual_crawl_of_unregistered_source_is_not_found() {
    let test_db = common::TestDb::new();
    let app = app!(test_db);

    for uri in ["/cron/crawl/remotive", "/cron/crawl/monster"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header(("Authorization", "Bearer cron-secret"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404, "{uri}");
    }
}

#[actix_web::test]
async fn admin_crawl_logs_require_the_admin_token() {
    let test_db = common::TestDb::new();
    let app = app!(test_db);

    let req = test::TestRequest::get()
        .uri("/admin/crawl-logs")
        .insert_header(("Authorization", "Bearer cron-secret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/admin/crawl-logs?source=remotive&page=1")
        .insert_header(("Authorization", "Bearer admin-token"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["page"], 1);

    let req = test::TestRequest::get()
        .uri("/admin/crawl-logs?status=exploded")
        .insert_header(("Authorization", "Bearer admin-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn delivery_with_empty_queue_reports_nothing() {
    let test_db = common::TestDb::new();
    let app = app!(test_db);

    let req = test::TestRequest::post()
        .uri("/cron/notifications")
        .insert_header(("Authorization", "Bearer cron-secret"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["groups"], 0);
    assert_eq!(body["sent"], 0);
}
