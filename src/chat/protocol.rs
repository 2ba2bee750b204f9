// src/chat/protocol.rs
//! Newline-delimited JSON phase events and the sinks that carry them
//!
//! Every event is one JSON object on its own line:
//! `{"phase":"act1","message":"...","data":{...}}`. `message` and `data`
//! are omitted when absent. Consumers read until end of stream; an `error`
//! event, when present, is always the last line.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::chat::error::SinkError;
use crate::environment::StreamConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Think,
    Act1,
    Act2,
    Speak,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEvent {
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl PhaseEvent {
    pub fn message(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn data<T: Serialize>(phase: Phase, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            phase,
            message: None,
            data: Some(serde_json::to_value(payload)?),
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::message(Phase::Error, message)
    }

    /// Serialize as one protocol line, trailing newline included.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim_end())
    }
}

/// Outbound event stream of one query.
///
/// `send` reports a dead or stalled transport instead of swallowing it;
/// `close` consumes the sink so a stream can only be closed once.
#[async_trait]
pub trait EventSink: Send {
    async fn send(&mut self, event: &PhaseEvent) -> Result<(), SinkError>;

    /// Resolves once the consumer has gone away.
    async fn closed(&self);

    async fn close(self)
    where
        Self: Sized;
}

/// Sink feeding a bounded channel that a response body drains.
pub struct ChannelSink {
    tx: mpsc::Sender<String>,
    write_timeout: Duration,
}

pub type EventReceiver = mpsc::Receiver<String>;

pub fn event_channel(config: &StreamConfig) -> (ChannelSink, EventReceiver) {
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    (
        ChannelSink {
            tx,
            write_timeout: config.write_timeout(),
        },
        rx,
    )
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn send(&mut self, event: &PhaseEvent) -> Result<(), SinkError> {
        let line = event.to_line()?;
        match tokio::time::timeout(self.write_timeout, self.tx.send(line)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(SinkError::Closed),
            Err(_) => Err(SinkError::Timeout(self.write_timeout)),
        }
    }

    async fn closed(&self) {
        self.tx.closed().await
    }

    async fn close(self) {
        debug!("Closing event stream");
        drop(self.tx);
    }
}

/// Protocol lines in production order, ending when the sink is closed.
pub fn line_stream(rx: EventReceiver) -> impl Stream<Item = String> + Send + 'static {
    futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|line| (line, rx)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    fn config(capacity: usize, timeout_ms: u64) -> StreamConfig {
        StreamConfig {
            write_timeout_ms: timeout_ms,
            channel_capacity: capacity,
        }
    }

    #[test]
    fn test_event_line_round_trip() {
        let events = vec![
            PhaseEvent::message(Phase::Think, "planning"),
            PhaseEvent::data(Phase::Act1, &json!({"count": 3, "filterPlan": {}})).unwrap(),
            PhaseEvent::data(Phase::Speak, &json!({"content": "line one\nline two"})).unwrap(),
            PhaseEvent::error("Sorry"),
        ];
        for event in events {
            let line = event.to_line().unwrap();
            assert!(line.ends_with('\n'));
            assert_eq!(line.matches('\n').count(), 1);
            assert_eq!(PhaseEvent::from_line(&line).unwrap(), event);
        }
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let line = PhaseEvent::message(Phase::Act2, "ranking").to_line().unwrap();
        assert_eq!(line, "{\"phase\":\"act2\",\"message\":\"ranking\"}\n");
    }

    #[tokio::test]
    async fn test_channel_sink_preserves_order_and_closes() {
        let (mut sink, rx) = event_channel(&config(4, 1000));
        sink.send(&PhaseEvent::message(Phase::Think, "a")).await.unwrap();
        sink.send(&PhaseEvent::message(Phase::Act1, "b")).await.unwrap();
        sink.close().await;

        let lines: Vec<String> = line_stream(rx).collect().await;
        let phases: Vec<Phase> = lines
            .iter()
            .map(|line| PhaseEvent::from_line(line).unwrap().phase)
            .collect();
        assert_eq!(phases, vec![Phase::Think, Phase::Act1]);
    }

    #[tokio::test]
    async fn test_send_to_dropped_consumer_fails() {
        let (mut sink, rx) = event_channel(&config(4, 1000));
        drop(rx);
        let err = sink
            .send(&PhaseEvent::message(Phase::Think, "a"))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Closed));
        sink.closed().await;
    }

    #[tokio::test]
    async fn test_stalled_consumer_times_out() {
        let (mut sink, _rx) = event_channel(&config(1, 20));
        sink.send(&PhaseEvent::message(Phase::Think, "a")).await.unwrap();
        let err = sink
            .send(&PhaseEvent::message(Phase::Think, "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Timeout(_)));
    }
}
