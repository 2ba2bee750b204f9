mod common;

use candidate_query::build_rocket;
use candidate_query::chat::{Phase, PhaseEvent};
use candidate_query::core::OpenAiClient;
use candidate_query::environment::ProviderConfig;
use common::*;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use std::sync::Arc;

const PLAN: &str = r#"{"filter":{"include":{"title":["Frontend Engineer"],"location":["Seattle, USA"]}},"rank":{"primary":{"field":"years_experience","direction":"desc"}}}"#;

fn offline_client() -> Arc<OpenAiClient> {
    let config = ProviderConfig {
        base_url: "http://127.0.0.1:9/v1".to_string(),
        plan_model: "test".to_string(),
        narration_model: "test".to_string(),
        transcription_model: "whisper-1".to_string(),
        plan_temperature: 0.1,
        narration_temperature: 0.7,
        request_timeout_secs: 1,
    };
    Arc::new(OpenAiClient::new(config, "test-key".to_string()).unwrap())
}

async fn client(provider: ScriptedProvider) -> Client {
    let rocket = build_rocket(pipeline_with(provider), offline_client(), stream_config());
    Client::tracked(rocket).await.unwrap()
}

#[rocket::async_test]
async fn test_chat_streams_ndjson() {
    let client = client(ScriptedProvider::answering(PLAN, &["Found ", "Quinn."])).await;

    let response = client
        .post("/api/chat")
        .header(ContentType::JSON)
        .body(r#"{"messages":[{"role":"user","content":"frontend engineers in Seattle"}]}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert!(response.content_type().unwrap().is_plain());
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );

    let body = response.into_string().await.unwrap();
    let events: Vec<PhaseEvent> = body
        .lines()
        .map(|line| PhaseEvent::from_line(line).unwrap())
        .collect();

    assert_eq!(events.first().unwrap().phase, Phase::Think);
    assert_eq!(events.last().unwrap().phase, Phase::Speak);
    let act2 = events
        .iter()
        .find(|e| e.phase == Phase::Act2 && e.data.is_some())
        .unwrap();
    assert_eq!(act2.data.as_ref().unwrap()["rankedIds"][0], "6");
}

#[rocket::async_test]
async fn test_chat_without_content_is_rejected() {
    let client = client(ScriptedProvider::default()).await;

    for body in [
        r#"{"messages":[]}"#,
        r#"{"messages":[{"role":"user","content":"  "}]}"#,
    ] {
        let response = client
            .post("/api/chat")
            .header(ContentType::JSON)
            .body(body)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let error: serde_json::Value =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(error["success"], false);
        assert_eq!(error["error_code"], "EMPTY_MESSAGE");
    }
}

#[rocket::async_test]
async fn test_chat_provider_failure_is_an_error_event() {
    let client = client(ScriptedProvider::default()).await;

    let response = client
        .post("/api/chat")
        .header(ContentType::JSON)
        .body(r#"{"messages":[{"role":"user","content":"anyone?"}]}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let body = response.into_string().await.unwrap();
    let last = PhaseEvent::from_line(body.lines().last().unwrap()).unwrap();
    assert_eq!(last.phase, Phase::Error);
}

#[rocket::async_test]
async fn test_candidates_and_health() {
    let client = client(ScriptedProvider::default()).await;

    let response = client.get("/api/candidates").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let listing: serde_json::Value =
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
    assert_eq!(listing["type"], "data");
    assert_eq!(listing["data"]["count"], 26);
    assert_eq!(listing["data"]["candidates"][5]["full_name"], "Quinn Smith");

    let response = client.get("/api/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().await.unwrap(), "\"OK\"");
}

#[rocket::async_test]
async fn test_unknown_route_uses_catcher() {
    let client = client(ScriptedProvider::default()).await;

    let response = client.get("/api/nowhere").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let error: serde_json::Value =
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
    assert_eq!(error["error_code"], "NOT_FOUND");
}

#[rocket::async_test]
async fn test_options_preflight() {
    let client = client(ScriptedProvider::default()).await;
    let response = client.options("/api/chat").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}
