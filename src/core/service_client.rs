// src/core/service_client.rs
//! HTTP client for an OpenAI-compatible provider: chat completions (plain and
//! streamed) and audio transcription

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error, info, trace};

use crate::core::provider::{ReasoningProvider, TokenStream};
use crate::environment::ProviderConfig;

const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";
const TRANSCRIPTIONS_ENDPOINT: &str = "/audio/transcriptions";
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    config: ProviderConfig,
}

impl OpenAiClient {
    pub fn new(config: ProviderConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            config,
        })
    }

    /// Build a client with the API key taken from `OPENAI_API_KEY`
    pub fn from_env(config: ProviderConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY environment variable not set")?;
        Self::new(config, api_key)
    }

    fn chat_request<'a>(
        &'a self,
        model: &'a str,
        system: &'a str,
        user: &'a str,
        temperature: f32,
        stream: bool,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            stream,
        }
    }

    async fn post_chat(&self, request: &ChatCompletionRequest<'_>) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_ENDPOINT);
        debug!("Calling provider: {} (model {}, stream {})", url, request.model, request.stream);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .context("Failed to send request to provider")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Provider error {}: {}", status, error_text);
            anyhow::bail!("Provider returned error {}: {}", status, error_text);
        }

        Ok(response)
    }

    /// Transcribe an audio file with the configured transcription model
    pub async fn transcribe(&self, file_path: &Path, file_name: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, TRANSCRIPTIONS_ENDPOINT);

        let file_content = tokio::fs::read(file_path)
            .await
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let form = Form::new()
            .text("model", self.config.transcription_model.clone())
            .part(
                "file",
                Part::bytes(file_content)
                    .file_name(file_name.to_string())
                    .mime_str(audio_content_type(file_name))
                    .context("Failed to create multipart")?,
            );

        info!("Calling transcription service: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if status.is_success() {
            let transcription: TranscriptionResponse = response
                .json()
                .await
                .context("Failed to parse transcription response")?;
            Ok(transcription.text)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Transcription error response: {}", error_text);
            anyhow::bail!("Service returned error status {}: {}", status, error_text)
        }
    }
}

#[async_trait]
impl ReasoningProvider for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = self.chat_request(
            &self.config.plan_model,
            system,
            user,
            self.config.plan_temperature,
            false,
        );
        let response: ChatCompletionResponse = self
            .post_chat(&request)
            .await?
            .json()
            .await
            .context("Failed to parse provider response")?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .context("Provider returned no content")
    }

    async fn stream(&self, system: &str, user: &str) -> Result<TokenStream> {
        let request = self.chat_request(
            &self.config.narration_model,
            system,
            user,
            self.config.narration_temperature,
            true,
        );
        let response = self.post_chat(&request).await?;
        Ok(token_stream(response.bytes_stream()))
    }
}

struct StreamState<S> {
    body: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

/// Turn a server-sent-events body into a stream of content deltas.
fn token_stream<S, B>(body: S) -> TokenStream
where
    S: futures::Stream<Item = reqwest::Result<B>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = StreamState {
        body: Box::pin(body),
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(chunk) = state.pending.pop_front() {
                return Some((Ok(chunk), state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(bytes)) => {
                    for event in state.decoder.push(bytes.as_ref()) {
                        match event {
                            SseEvent::Data(payload) => match parse_delta(&payload) {
                                Ok(Some(content)) => state.pending.push_back(content),
                                Ok(None) => {}
                                Err(e) => {
                                    state.finished = true;
                                    return Some((Err(e), state));
                                }
                            },
                            SseEvent::Done => state.finished = true,
                        }
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(anyhow::Error::new(e).context("Provider stream failed")), state));
                }
                None => state.finished = true,
            }
        }
    })
    .boxed()
}

fn parse_delta(payload: &str) -> Result<Option<String>> {
    let chunk: ChatCompletionChunk = serde_json::from_str(payload)
        .with_context(|| format!("Failed to parse provider stream chunk: {}", payload))?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

#[derive(Debug, PartialEq)]
pub(crate) enum SseEvent {
    Data(String),
    Done,
}

/// Incremental `data:` line decoder; bytes may split lines anywhere.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();

            let Some(payload) = line.strip_prefix("data:") else {
                if !line.is_empty() {
                    trace!("Ignoring stream line: {}", line);
                }
                continue;
            };
            let payload = payload.trim();
            if payload == DONE_SENTINEL {
                events.push(SseEvent::Done);
            } else if !payload.is_empty() {
                events.push(SseEvent::Data(payload.to_string()));
            }
        }
        events
    }
}

fn audio_content_type(file_name: &str) -> &'static str {
    match crate::utils::get_file_extension(file_name).as_deref() {
        Some("mp3") | Some("mpeg") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        _ => "audio/webm",
    }
}
