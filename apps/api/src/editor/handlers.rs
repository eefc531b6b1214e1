//! Axum route handlers for the Editor API.
//!
//! The server keeps no editor state: the client sends the current state with
//! each action and gets the next one back.

use axum::Json;
use serde::{Deserialize, Serialize};

use super::{EditorAction, EditorState};
use crate::models::resume::ResumeDocument;

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    #[serde(default)]
    pub document: ResumeDocument,
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub state: EditorState,
    pub migrated: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub state: EditorState,
    pub action: EditorAction,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub state: EditorState,
}

/// POST /api/v1/editor/load
pub async fn handle_load(Json(request): Json<LoadRequest>) -> Json<LoadResponse> {
    let (state, report) = EditorState::load(request.document);
    Json(LoadResponse {
        state,
        migrated: report.migrated,
    })
}

/// POST /api/v1/editor/apply
pub async fn handle_apply(Json(request): Json<ApplyRequest>) -> Json<ApplyResponse> {
    let mut state = request.state;
    state.apply(request.action);
    Json(ApplyResponse { state })
}
