// src/web/handlers/system_handlers.rs
use crate::core::CandidateStore;
use crate::types::Candidate;
use crate::web::types::*;

use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

pub async fn candidates_handler(
    store: &State<CandidateStore>,
) -> Json<DataResponse<CandidateListData<Vec<Candidate>>>> {
    info!("Listing {} candidates", store.len());
    Json(DataResponse::success(
        format!("{} candidates loaded", store.len()),
        CandidateListData {
            count: store.len(),
            candidates: store.all().to_vec(),
        },
    ))
}

pub async fn health_handler() -> Json<&'static str> {
    info!("Health check");
    Json("OK")
}
