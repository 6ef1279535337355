//! Broker transport seam.
//!
//! # Purpose
//! Abstracts the messaging fabric the control plane talks to: subject
//! publish/subscribe for liveness probing and stream provisioning for
//! stations. The in-process engine implements it directly; a networked broker
//! client would implement the same trait.
//!
//! # Notes
//! `stream_info` reports a missing stream through the distinguished
//! `StreamNotFound` variant. The station reconciler depends on that
//! distinction: not-found retires a station, any other error leaves it alone.
use async_trait::async_trait;
use bytes::Bytes;
use juno_engine::{Engine, EngineError};
use thiserror::Error;

pub use juno_engine::{StreamInfo, Subscription};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("stream not found: {0}")]
    StreamNotFound(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl TransportError {
    pub fn is_stream_not_found(&self) -> bool {
        matches!(self, TransportError::StreamNotFound(_))
    }
}

impl From<EngineError> for TransportError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::StreamNotFound { stream } => TransportError::StreamNotFound(stream),
            other => TransportError::Unexpected(anyhow::Error::new(other)),
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn publish(&self, subject: &str, payload: Bytes) -> TransportResult<()>;
    async fn publish_request(
        &self,
        subject: &str,
        reply: &str,
        payload: Bytes,
    ) -> TransportResult<()>;
    async fn subscribe(&self, subject: &str) -> TransportResult<Subscription>;
    async fn create_stream(&self, name: &str) -> TransportResult<()>;
    async fn delete_stream(&self, name: &str) -> TransportResult<()>;
    async fn stream_info(&self, name: &str) -> TransportResult<StreamInfo>;
}

#[async_trait]
impl Transport for Engine {
    async fn publish(&self, subject: &str, payload: Bytes) -> TransportResult<()> {
        Engine::publish(self, subject, payload).await;
        Ok(())
    }

    async fn publish_request(
        &self,
        subject: &str,
        reply: &str,
        payload: Bytes,
    ) -> TransportResult<()> {
        Engine::publish_request(self, subject, reply, payload).await;
        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> TransportResult<Subscription> {
        Ok(Engine::subscribe(self, subject).await)
    }

    async fn create_stream(&self, name: &str) -> TransportResult<()> {
        Engine::register_stream(self, name).await;
        Ok(())
    }

    async fn delete_stream(&self, name: &str) -> TransportResult<()> {
        Engine::remove_stream(self, name).await?;
        Ok(())
    }

    async fn stream_info(&self, name: &str) -> TransportResult<StreamInfo> {
        Ok(Engine::stream_info(self, name).await?)
    }
}
