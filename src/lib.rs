//! Perpus Library Management System
//!
//! A Rust implementation of the Perpus library management server,
//! providing a REST JSON API for a book catalog, a user directory and
//! a borrow/return ledger with per-book stock tracking.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
