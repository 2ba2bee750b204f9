pub mod chat;
pub mod core;
pub mod environment;
pub mod types;
pub mod utils;
pub mod web;

pub use crate::chat::{QueryOutcome, QueryPipeline};
pub use crate::core::{CandidateStore, OpenAiClient, ReasoningProvider};
pub use crate::environment::EnvironmentConfig;
pub use crate::web::{build_rocket, start_web_server};
