use std::pin::Pin;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::manifest::Manifest;

/// Chunked body of one remote derivative.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// The seam between the engine and the Model Derivative service.
#[async_trait]
pub trait DerivativeSource: Send + Sync {
    /// Fetch the translation manifest for a model urn.
    async fn manifest(&self, urn: &str) -> Result<Manifest>;

    /// Open a byte stream for one derivative of the model identified by
    /// `urn`. Used both for final persistence and for ad-hoc sibling
    /// manifest fetches.
    async fn derivative_stream(&self, urn: &str, derivative_urn: &str) -> Result<ByteStream>;
}
