// src/web/types.rs

use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::serde::{Deserialize, Serialize};

/// One turn of the conversation sent by the chat client
#[derive(Debug, Clone, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ChatTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
}

impl ChatRequest {
    /// The utterance to answer: the content of the last turn, if any.
    pub fn latest_utterance(&self) -> Option<&str> {
        self.messages
            .last()
            .and_then(|turn| turn.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
    }
}

#[derive(FromForm)]
pub struct TranscribeForm<'f> {
    pub audio: Option<TempFile<'f>>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TranscriptionData {
    pub text: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CandidateListData<T> {
    pub count: usize,
    pub candidates: T,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Error,
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}
