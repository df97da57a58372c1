pub mod auth;
pub mod backfill;
pub mod crawl_logs;
pub mod delivery;
pub mod errors;
pub mod ingestion;
pub mod matcher;
pub mod pipeline;
pub mod retention;
pub mod scheduler;
pub mod subscriptions;

pub use errors::{ServiceError, ServiceResult};
