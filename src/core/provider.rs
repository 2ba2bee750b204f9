// src/core/provider.rs
//! Seam to the external reasoning provider

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Ordered, finite stream of text chunks from a streaming completion.
pub type TokenStream = BoxStream<'static, Result<String>>;

#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Single-shot completion: system instruction plus user text in, full answer out.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Streaming completion. Chunk boundaries are whatever the provider sends.
    async fn stream(&self, system: &str, user: &str) -> Result<TokenStream>;
}
