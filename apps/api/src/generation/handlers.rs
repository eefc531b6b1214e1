//! Axum route handlers for the Generation API. All routes here sit behind
//! `require_user`.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::editor::format::resume_text;
use crate::errors::AppError;
use crate::generation::prompts::{
    assist_prompt, cover_letter_prompt, details_prompt, summary_prompt, AssistAction,
};
use crate::models::resume::ResumeDocument;
use crate::models::user::User;
use crate::rich_text::{normalize, sanitize};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub skills: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailsRequest {
    pub role: String,
    pub company: String,
}

#[derive(Debug, Deserialize)]
pub struct AssistRequest {
    pub action: AssistAction,
    pub content: String,
    /// Required for `custom`.
    #[serde(default)]
    pub instruction: String,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub highlights: String,
    #[serde(default)]
    pub resume_text: String,
    /// Used to build the resume text when `resume_text` is blank.
    pub document: Option<ResumeDocument>,
    pub tone: Option<String>,
}

/// Plain prose for single-line targets.
#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub text: String,
}

/// Raw model output plus the value a rich field would store.
#[derive(Debug, Serialize)]
pub struct RichTextResponse {
    pub text: String,
    pub html: String,
}

impl RichTextResponse {
    fn from_generated(text: String) -> Self {
        let html = sanitize(&normalize(&text));
        Self { text, html }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/generate/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<TextResponse>, AppError> {
    let prompt = summary_prompt(&request.full_name, &request.title, &request.skills);
    let text = state.generator.generate(&prompt).await?;
    info!(uid = %user.uid, "Generated summary");
    Ok(Json(TextResponse { text }))
}

/// POST /api/v1/generate/details
///
/// Bullet points for one experience row.
pub async fn handle_details(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<DetailsRequest>,
) -> Result<Json<RichTextResponse>, AppError> {
    if request.role.trim().is_empty() {
        return Err(AppError::Validation("role cannot be empty".to_string()));
    }
    let prompt = details_prompt(&request.role, &request.company);
    let text = state.generator.generate(&prompt).await?;
    info!(uid = %user.uid, "Generated details");
    Ok(Json(RichTextResponse::from_generated(text)))
}

/// POST /api/v1/generate/assist
///
/// Rewrites existing content. Empty content is rejected before any call.
pub async fn handle_assist(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<AssistRequest>,
) -> Result<Json<RichTextResponse>, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter some text first".to_string(),
        ));
    }
    if request.action == AssistAction::Custom && request.instruction.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter a custom instruction".to_string(),
        ));
    }

    let prompt = assist_prompt(request.action, &request.content, request.instruction.trim());
    let text = state.generator.generate(&prompt).await?;
    info!(uid = %user.uid, action = ?request.action, "Assist completed");
    Ok(Json(RichTextResponse::from_generated(text)))
}

/// POST /api/v1/generate/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<TextResponse>, AppError> {
    if request.role.trim().is_empty() || request.company.trim().is_empty() {
        return Err(AppError::Validation(
            "role and company cannot be empty".to_string(),
        ));
    }
    let resume = match (&request.document, request.resume_text.trim()) {
        (Some(document), "") => resume_text(document),
        (_, text) => text.to_string(),
    };
    let prompt = cover_letter_prompt(
        &request.role,
        &request.company,
        &request.highlights,
        &resume,
        request.tone.as_deref(),
    );
    let text = state.generator.generate(&prompt).await?;
    info!(uid = %user.uid, "Generated cover letter");
    Ok(Json(TextResponse { text }))
}
