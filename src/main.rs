use std::process::ExitCode;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::{Config, Environment, File};
use dotenvy::dotenv;
use jobfeed::adapters::AdapterRegistry;
use jobfeed::db::establish_connection_pool;
use jobfeed::mailer::{DigestRenderer, build_mailer};
use jobfeed::models::config::ServerConfig;
use jobfeed::repository::DieselRepository;
use jobfeed::routes::{configure, cron::DeliveryLock};

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    Config::builder()
        .add_source(File::with_name("config/default"))
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let server_config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            return ExitCode::FAILURE;
        }
    };

    let registry = match AdapterRegistry::with_default_sources(&server_config.ingestion) {
        Ok(registry) => registry,
        Err(e) => {
            log::error!("Failed to build source adapters: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mailer = match build_mailer(&server_config.mail) {
        Ok(mailer) => mailer,
        Err(e) => {
            log::error!("Failed to configure mail transport: {e}");
            return ExitCode::FAILURE;
        }
    };

    let renderer = match DigestRenderer::new(server_config.site_url.clone()) {
        Ok(renderer) => renderer,
        Err(e) => {
            log::error!("Failed to load digest template: {e}");
            return ExitCode::FAILURE;
        }
    };

    let repo = web::Data::new(DieselRepository::new(pool));
    let registry = web::Data::new(registry);
    let mailer: web::Data<dyn jobfeed::mailer::Mailer> = web::Data::from(mailer);
    let renderer = web::Data::new(renderer);
    let delivery_lock = web::Data::new(DeliveryLock::default());
    let bind = (server_config.address.clone(), server_config.port);
    let server_config = web::Data::new(server_config);

    log::info!("Starting job feed on {}:{}", bind.0, bind.1);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(repo.clone())
            .app_data(registry.clone())
            .app_data(mailer.clone())
            .app_data(renderer.clone())
            .app_data(delivery_lock.clone())
            .app_data(server_config.clone())
            .configure(configure)
    })
    .bind(bind);

    let server = match server {
        Ok(server) => server,
        Err(e) => {
            log::error!("Failed to bind server: {e}");
            return ExitCode::FAILURE;
        }
    };

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {e}");
            ExitCode::FAILURE
        }
    }
}
