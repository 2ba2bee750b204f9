// src/web/handlers/chat_handlers.rs
use crate::chat::{event_channel, line_stream, QueryPipeline};
use crate::environment::StreamConfig;
use crate::web::handlers::{error_reply, ErrorReply};
use crate::web::types::ChatRequest;

use futures::Stream;
use rocket::http::Status;
use rocket::response::stream::TextStream;
use rocket::serde::json::Json;
use rocket::State;
use std::pin::Pin;
use tracing::{debug, info, warn};

pub type EventLines = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Starts the query on its own task and hands back the NDJSON event stream.
/// Dropping the response body closes the channel, which stops the query.
pub async fn chat_handler(
    request: Json<ChatRequest>,
    pipeline: &State<QueryPipeline>,
    stream_config: &State<StreamConfig>,
) -> Result<TextStream<EventLines>, ErrorReply> {
    let request = request.into_inner();

    let utterance = match request.latest_utterance() {
        Some(utterance) => utterance.to_string(),
        None => {
            warn!("Chat request without a usable last message");
            return Err(error_reply(
                Status::BadRequest,
                "The last message must have content",
                "EMPTY_MESSAGE",
                &[
                    "Send at least one message",
                    "Put the new question in the last message's content",
                ],
            ));
        }
    };

    info!("Chat request with {} turns", request.messages.len());

    let (sink, rx) = event_channel(stream_config.inner());
    let pipeline = pipeline.inner().clone();
    tokio::spawn(async move {
        let outcome = pipeline.run(&utterance, sink).await;
        debug!("Query task finished: {:?}", outcome);
    });

    let lines: EventLines = Box::pin(line_stream(rx));
    Ok(TextStream(lines))
}
