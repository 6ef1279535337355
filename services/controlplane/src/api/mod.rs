//! Control-plane HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules for stations, users, the dashboard overview,
//! and system endpoints, plus the shared error and payload types.
pub mod error;
pub mod openapi;
pub mod overview;
pub mod stations;
pub mod system;
pub mod types;
pub mod users;
