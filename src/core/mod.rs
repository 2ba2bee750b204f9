// src/core/mod.rs
//! Candidate data, the filter and ranking engines, and the reasoning provider

pub mod candidate_store;
pub mod filter;
pub mod provider;
pub mod rank;
pub mod service_client;
pub mod stats;

pub use candidate_store::CandidateStore;
pub use provider::{ReasoningProvider, TokenStream};
pub use service_client::OpenAiClient;
