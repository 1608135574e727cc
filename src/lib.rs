//! Caresheet — persistence layer for a palliative-care clinical intake sheet.
//!
//! One intake bundles doctor demographics, patient demographics, a symptom
//! checklist and four free-text assessments. This crate owns the form state,
//! the per-table repositories, the aggregate save workflow and the read
//! paths; the hosted relational store behind [`db::TableStore`] is the
//! single source of truth — nothing is cached beyond a single operation.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the host process. Call once at startup.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
