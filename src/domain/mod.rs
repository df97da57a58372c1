//! Domain entities shared by every stage of the pipeline.

pub mod crawl_log;
pub mod job;
pub mod notification;
pub mod subscription;
pub mod taxonomy;
pub mod types;
pub mod user;
