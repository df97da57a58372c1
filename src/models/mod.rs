//! Diesel row models and their conversions into domain entities.

pub mod config;
pub mod crawl_log;
pub mod job;
pub mod notification;
pub mod subscription;
pub mod taxonomy;
pub mod user;
