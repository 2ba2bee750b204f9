pub mod chat_handlers;
pub mod system_handlers;
pub mod transcribe_handlers;

pub use chat_handlers::*;
pub use system_handlers::*;
pub use transcribe_handlers::*;

use crate::web::types::StandardErrorResponse;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;

pub type ErrorReply = Custom<Json<StandardErrorResponse>>;

pub(crate) fn error_reply(status: Status, error: &str, error_code: &str, suggestions: &[&str]) -> ErrorReply {
    Custom(
        status,
        Json(StandardErrorResponse::new(
            error.to_string(),
            error_code.to_string(),
            suggestions.iter().map(|s| s.to_string()).collect(),
        )),
    )
}
