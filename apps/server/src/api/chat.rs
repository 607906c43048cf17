use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use marketmind_ai::{ChatSnapshot, SubmitOutcome};
use serde::{Deserialize, Serialize};

use crate::main_lib::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub outcome: SubmitOutcome,
    #[serde(flatten)]
    pub chat: ChatSnapshot,
}

async fn get_chat(State(state): State<Arc<AppState>>) -> Json<ChatSnapshot> {
    let selected = state.selected_instrument();
    Json(state.chat.snapshot(selected.as_ref()))
}

/// Send a message about the currently selected instrument.
///
/// Always answers 200: rejections and remote failures are part of the
/// outcome, not HTTP errors.
async fn submit_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitRequest>,
) -> Json<SubmitResponse> {
    let selected = state.selected_instrument();
    let outcome = state.chat.submit(&body.text, selected.as_ref()).await;
    tracing::debug!("Chat submit finished: {}", outcome_label(&outcome));

    let selected = state.selected_instrument();
    Json(SubmitResponse {
        outcome,
        chat: state.chat.snapshot(selected.as_ref()),
    })
}

fn outcome_label(outcome: &SubmitOutcome) -> &'static str {
    match outcome {
        SubmitOutcome::Rejected { .. } => "rejected",
        SubmitOutcome::Answered { .. } => "answered",
        SubmitOutcome::Failed { .. } => "failed",
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", get(get_chat).post(submit_message))
}
