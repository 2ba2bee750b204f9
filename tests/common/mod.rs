#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use candidate_query::chat::{Narrator, PlanGenerator, QueryPipeline};
use candidate_query::core::{CandidateStore, ReasoningProvider, TokenStream};
use candidate_query::environment::StreamConfig;
use candidate_query::types::Candidate;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;

pub const US_CITIES: [&str; 10] = [
    "San Francisco, USA",
    "New York, USA",
    "Austin, USA",
    "Seattle, USA",
    "Boston, USA",
    "Los Angeles, USA",
    "Chicago, USA",
    "Denver, USA",
    "Atlanta, USA",
    "Portland, USA",
];

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/candidates.csv")
}

pub fn fixture_store() -> CandidateStore {
    CandidateStore::from_csv_path(&fixture_path()).unwrap()
}

pub fn ids(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.id.as_str()).collect()
}

pub fn stream_config() -> StreamConfig {
    StreamConfig {
        write_timeout_ms: 2_000,
        channel_capacity: 8,
    }
}

/// In-process provider answering from a script instead of the network.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    pub plan: Option<String>,
    pub chunks: Vec<Result<String, String>>,
    pub hang_planning: bool,
    /// Keep the narration stream open after the scripted chunks.
    pub hang_after_chunks: bool,
}

impl ScriptedProvider {
    pub fn answering(plan: &str, chunks: &[&str]) -> Self {
        Self {
            plan: Some(plan.to_string()),
            chunks: chunks.iter().map(|c| Ok(c.to_string())).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ReasoningProvider for ScriptedProvider {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        if self.hang_planning {
            futures::future::pending::<()>().await;
        }
        self.plan
            .clone()
            .ok_or_else(|| anyhow::anyhow!("provider unavailable"))
    }

    async fn stream(&self, _system: &str, _user: &str) -> Result<TokenStream> {
        let chunks: Vec<Result<String>> = self
            .chunks
            .iter()
            .cloned()
            .map(|chunk| chunk.map_err(|e| anyhow::anyhow!(e)))
            .collect();
        let chunks = futures::stream::iter(chunks);
        if self.hang_after_chunks {
            Ok(chunks.chain(futures::stream::pending()).boxed())
        } else {
            Ok(chunks.boxed())
        }
    }
}

pub fn pipeline_with(provider: ScriptedProvider) -> QueryPipeline {
    let provider: Arc<dyn ReasoningProvider> = Arc::new(provider);
    QueryPipeline::new(
        fixture_store(),
        PlanGenerator::new(provider.clone()),
        Narrator::new(provider),
    )
}
