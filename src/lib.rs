//! Core library exports for the job feed pipeline.
//!
//! The `data` feature exposes the persistence layer (domain types, Diesel
//! models and repositories). The `server` feature adds source adapters, the
//! classifier, pipeline services, the mailer and the HTTP trigger routes.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod adapters;
#[cfg(feature = "server")]
pub mod classifier;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod mailer;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
