//! Control-plane service library crate.
//!
//! # Purpose
//! Exposes the control-plane API surface, background reaper, configuration,
//! and storage implementations for use by the binary and tests.
//!
//! # Notes
//! Module boundaries mirror the HTTP API and the background tasks for clarity.
pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod model;
pub mod observability;
pub mod reaper;
pub mod store;
pub mod transport;
pub mod users;
