// src/chat/mod.rs
//! Query pipeline: planning, filtering, ranking and streamed narration

pub mod error;
pub mod narrator;
pub mod plan_generator;
pub mod protocol;
pub mod workflow;

pub use error::{PipelineError, PlanError, SinkError};
pub use narrator::Narrator;
pub use plan_generator::PlanGenerator;
pub use protocol::{event_channel, line_stream, ChannelSink, EventSink, Phase, PhaseEvent};
pub use workflow::{QueryOutcome, QueryPipeline};
