//! Axum route handlers for the Rich-text API. Stateless and public.

use axum::Json;
use serde::{Deserialize, Serialize};

use super::sanitizer::HtmlSanitizer;
use super::{
    classify, migrate_document, normalize, render_blocks, renderer, to_plain_text, Block,
    TextKind,
};
use crate::models::resume::ResumeDocument;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub kind: TextKind,
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct SanitizeRequest {
    pub html: String,
    #[serde(default)]
    pub keep_trailing_empty_item: bool,
}

#[derive(Debug, Serialize)]
pub struct SanitizeResponse {
    pub html: String,
    /// Text content of the sanitized HTML, for previews and prompts.
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub blocks: Vec<Block>,
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct MigrateRequest {
    pub document: ResumeDocument,
}

#[derive(Debug, Serialize)]
pub struct MigrateResponse {
    pub document: ResumeDocument,
    pub migrated: Vec<String>,
}

/// POST /api/v1/rich-text/normalize
pub async fn handle_normalize(Json(request): Json<TextRequest>) -> Json<NormalizeResponse> {
    Json(NormalizeResponse {
        kind: classify(&request.text),
        html: normalize(&request.text),
    })
}

/// POST /api/v1/rich-text/sanitize
pub async fn handle_sanitize(Json(request): Json<SanitizeRequest>) -> Json<SanitizeResponse> {
    let html = HtmlSanitizer::new()
        .keep_trailing_empty_item(request.keep_trailing_empty_item)
        .clean(&request.html);
    let text = to_plain_text(&html);
    Json(SanitizeResponse { html, text })
}

/// POST /api/v1/rich-text/render
///
/// Read-only view of legacy text; nothing is stored.
pub async fn handle_render(Json(request): Json<TextRequest>) -> Json<RenderResponse> {
    let blocks = render_blocks(&request.text);
    let html = renderer::to_html(&blocks);
    Json(RenderResponse { blocks, html })
}

/// POST /api/v1/documents/migrate
pub async fn handle_migrate(Json(request): Json<MigrateRequest>) -> Json<MigrateResponse> {
    let mut document = request.document;
    let report = migrate_document(&mut document);
    Json(MigrateResponse {
        document,
        migrated: report.migrated,
    })
}
