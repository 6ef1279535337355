//! Control-plane data model module.
//!
//! # Purpose
//! Re-exports the connection/producer/consumer/station records tracked by the
//! metadata store, plus poison-message and user records.
mod connection;
mod consumer;
mod poison;
mod producer;
mod station;
mod user;

pub use connection::Connection;
pub use consumer::Consumer;
pub use poison::PoisonMessageRecord;
pub use producer::Producer;
pub use station::Station;
pub use user::{User, UserType};
