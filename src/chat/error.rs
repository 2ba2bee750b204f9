// src/chat/error.rs
//! Failure taxonomy of a query

use std::time::Duration;
use thiserror::Error;

/// The planner answered, but not with a usable plan.
#[derive(Error, Debug)]
#[error("plan response is not valid JSON: {source}")]
pub struct PlanParseError {
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("planner request failed: {0:#}")]
    Provider(anyhow::Error),

    #[error("planner returned an empty response")]
    Empty,

    #[error(transparent)]
    Parse(#[from] PlanParseError),
}

/// Writing to the outbound event stream failed.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("event stream closed by the consumer")]
    Closed,

    #[error("event write timed out after {0:?}")]
    Timeout(Duration),

    #[error("event stream io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("event encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("planning failed: {0}")]
    Plan(#[from] PlanError),

    #[error("narration failed: {0:#}")]
    Narration(anyhow::Error),

    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("transport failed: {0}")]
    Transport(#[from] SinkError),

    #[error("consumer disconnected")]
    Disconnected,
}

impl PipelineError {
    /// True when the stream itself is gone, so no error event can be delivered.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Disconnected)
    }
}
