// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use crate::chat::QueryPipeline;
use crate::core::{CandidateStore, OpenAiClient};
use crate::environment::StreamConfig;
use crate::types::Candidate;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::response::stream::TextStream;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[post("/chat", data = "<request>")]
pub async fn chat(
    request: Json<ChatRequest>,
    pipeline: &State<QueryPipeline>,
    stream_config: &State<StreamConfig>,
) -> Result<TextStream<EventLines>, ErrorReply> {
    handlers::chat_handler(request, pipeline, stream_config).await
}

#[get("/candidates")]
pub async fn candidates(
    store: &State<CandidateStore>,
) -> Json<DataResponse<CandidateListData<Vec<Candidate>>>> {
    handlers::candidates_handler(store).await
}

#[post("/transcribe", data = "<upload>")]
pub async fn transcribe(
    upload: Form<TranscribeForm<'_>>,
    client: &State<Arc<OpenAiClient>>,
) -> Result<Json<TranscriptionData>, ErrorReply> {
    handlers::transcribe_handler(upload, client).await
}

#[get("/health")]
pub async fn health() -> Json<&'static str> {
    handlers::health_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Send {\"messages\": [{\"role\": \"user\", \"content\": \"...\"}]}".to_string(),
        ],
    ))
}

#[rocket::catch(404)]
pub fn not_found(request: &Request<'_>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("No route for {}", request.uri()),
        "NOT_FOUND".to_string(),
        vec!["Available endpoints: /api/chat, /api/candidates, /api/transcribe, /api/health".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body does not match the expected shape".to_string(),
        "UNPROCESSABLE".to_string(),
        vec!["Each message needs a string 'role' and 'content'".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Assemble the application without launching it.
pub fn build_rocket(
    pipeline: QueryPipeline,
    transcriber: Arc<OpenAiClient>,
    stream_config: StreamConfig,
) -> Rocket<Build> {
    let store = pipeline.store().clone();

    rocket::build()
        .attach(Cors)
        .manage(pipeline)
        .manage(store)
        .manage(transcriber)
        .manage(stream_config)
        .register(
            "/api",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![chat, candidates, transcribe, health, options],
        )
}

// Main server start function
pub async fn start_web_server(
    pipeline: QueryPipeline,
    transcriber: Arc<OpenAiClient>,
    stream_config: StreamConfig,
) -> Result<()> {
    info!(
        "Starting candidate query API server with {} candidates",
        pipeline.store().len()
    );

    if let Err(e) = build_rocket(pipeline, transcriber, stream_config)
        .launch()
        .await
    {
        error!("Server failed: {}", e);
        return Err(anyhow::anyhow!("Server failed: {}", e));
    }

    Ok(())
}
