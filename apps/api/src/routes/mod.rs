pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::editor::handlers as editor;
use crate::generation::handlers as generation;
use crate::identity::handlers as auth;
use crate::identity::middleware::require_user;
use crate::rich_text::handlers as rich_text;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Bearer id token required
    let protected = Router::new()
        .route("/api/v1/generate/summary", post(generation::handle_summary))
        .route("/api/v1/generate/details", post(generation::handle_details))
        .route("/api/v1/generate/assist", post(generation::handle_assist))
        .route(
            "/api/v1/generate/cover-letter",
            post(generation::handle_cover_letter),
        )
        .route("/api/v1/auth/sign-out", post(auth::handle_sign_out))
        .route("/api/v1/auth/me", get(auth::handle_me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    Router::new()
        .route("/health", get(health::health_handler))
        // Rich-text API
        .route(
            "/api/v1/rich-text/normalize",
            post(rich_text::handle_normalize),
        )
        .route("/api/v1/rich-text/sanitize", post(rich_text::handle_sanitize))
        .route("/api/v1/rich-text/render", post(rich_text::handle_render))
        .route("/api/v1/documents/migrate", post(rich_text::handle_migrate))
        // Editor API
        .route("/api/v1/editor/load", post(editor::handle_load))
        .route("/api/v1/editor/apply", post(editor::handle_apply))
        // Auth API
        .route("/api/v1/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/v1/auth/sign-up", post(auth::handle_sign_up))
        .route("/api/v1/auth/federated", post(auth::handle_federated))
        .route("/api/v1/auth/state", get(auth::handle_auth_state))
        .merge(protected)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::identity::{IdentityError, IdentityProvider, Session};
    use crate::llm_client::{GenerateError, TextGenerator};
    use crate::models::user::User;

    const GOOD_TOKEN: &str = "good-token";

    struct StubGenerator {
        reply: Result<String, GenerateError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    struct StubIdentity;

    fn ada() -> User {
        User {
            uid: "u1".to_string(),
            email: Some("ada@example.com".to_string()),
            display_name: Some("Ada".to_string()),
            email_verified: true,
        }
    }

    #[async_trait]
    impl IdentityProvider for StubIdentity {
        async fn sign_in(&self, _email: &str, password: &str) -> Result<Session, IdentityError> {
            if password != "pw" {
                return Err(IdentityError::Rejected(
                    "INVALID_LOGIN_CREDENTIALS".to_string(),
                ));
            }
            Ok(Session {
                id_token: GOOD_TOKEN.to_string(),
                refresh_token: "refresh".to_string(),
                expires_in: 3600,
                user: ada(),
            })
        }

        async fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
            self.sign_in(email, password).await
        }

        async fn sign_out(&self, _id_token: &str) -> Result<(), IdentityError> {
            Ok(())
        }

        async fn current_user(&self, id_token: &str) -> Result<User, IdentityError> {
            if id_token == GOOD_TOKEN {
                Ok(ada())
            } else {
                Err(IdentityError::Rejected("INVALID_ID_TOKEN".to_string()))
            }
        }
    }

    fn app_with(reply: Result<String, GenerateError>) -> (Router, Arc<StubGenerator>) {
        let generator = Arc::new(StubGenerator {
            reply,
            calls: AtomicUsize::new(0),
        });
        let state = AppState {
            generator: generator.clone(),
            identity: Arc::new(StubIdentity),
            config: Config {
                gemini_api_key: None,
                firebase_api_key: None,
                port: 0,
                rust_log: "info".to_string(),
            },
        };
        (build_router(state), generator)
    }

    fn app() -> Router {
        app_with(Ok("generated".to_string())).0
    }

    fn request(method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(), request(Method::GET, "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "folio-api");
        assert_eq!(body["generation_configured"], false);
    }

    #[tokio::test]
    async fn test_sanitize_endpoint() {
        let (status, body) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/rich-text/sanitize",
                Some(json!({ "html": "<a href=\"javascript:alert(1)\">x</a><script>y</script>" })),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["html"], "<a>x</a>");
        assert_eq!(body["text"], "x");
    }

    #[tokio::test]
    async fn test_normalize_endpoint_reports_kind() {
        let (_, body) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/rich-text/normalize",
                Some(json!({ "text": "**hello** and *world*" })),
                None,
            ),
        )
        .await;
        assert_eq!(body["kind"], "legacy_marked");
        assert_eq!(
            body["html"],
            "<p><strong>hello</strong> and <em>world</em></p>"
        );
    }

    #[tokio::test]
    async fn test_render_endpoint() {
        let (_, body) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/rich-text/render",
                Some(json!({ "text": "- **a**" })),
                None,
            ),
        )
        .await;
        assert_eq!(body["blocks"][0]["type"], "list");
        assert_eq!(body["html"], "<ul><li><strong>a</strong></li></ul>");
    }

    #[tokio::test]
    async fn test_migrate_endpoint() {
        let (status, body) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/documents/migrate",
                Some(json!({ "document": { "achievements": "- Won **gold**" } })),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["migrated"], json!(["achievements"]));
        assert_eq!(
            body["document"]["achievements"],
            "<ul><li>Won <strong>gold</strong></li></ul>"
        );
    }

    #[tokio::test]
    async fn test_editor_load_then_apply() {
        let (_, loaded) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/editor/load",
                Some(json!({ "document": {} })),
                None,
            ),
        )
        .await;
        assert_eq!(loaded["state"]["tab"], "personal");

        let (status, applied) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/editor/apply",
                Some(json!({
                    "state": loaded["state"],
                    "action": { "type": "toggle_section", "section": "skills" }
                })),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(applied["state"]["layout"]["visible"]["skills"], false);
    }

    #[tokio::test]
    async fn test_generation_requires_token() {
        let (status, body) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/generate/summary",
                Some(json!({ "title": "Engineer" })),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (status, body) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/generate/summary",
                Some(json!({ "title": "Engineer" })),
                Some("expired"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "INVALID_ID_TOKEN");
    }

    #[tokio::test]
    async fn test_summary_generation() {
        let (status, body) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/generate/summary",
                Some(json!({ "full_name": "Ada", "title": "Engineer", "skills": "Rust" })),
                Some(GOOD_TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "generated");
    }

    #[tokio::test]
    async fn test_assist_rejects_empty_content_before_calling() {
        let (app, generator) = app_with(Ok("unused".to_string()));
        let (status, body) = send(
            app,
            request(
                Method::POST,
                "/api/v1/generate/assist",
                Some(json!({ "action": "shorten", "content": "   " })),
                Some(GOOD_TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please enter some text first");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_details_generation_returns_sanitized_html() {
        let (app, _) = app_with(Ok("- Cut costs by **30%**\n- Led <script>x</script>".to_string()));
        let (status, body) = send(
            app,
            request(
                Method::POST,
                "/api/v1/generate/details",
                Some(json!({ "role": "SRE", "company": "Acme" })),
                Some(GOOD_TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let html = body["html"].as_str().unwrap();
        assert!(!html.contains("<script"));
        assert!(body["text"].as_str().unwrap().starts_with("- Cut costs"));
    }

    #[tokio::test]
    async fn test_generation_failures_surface_message() {
        let (app, _) = app_with(Err(GenerateError::RequestFailed(
            "Resource has been exhausted".to_string(),
        )));
        let (status, body) = send(
            app,
            request(
                Method::POST,
                "/api/v1/generate/cover-letter",
                Some(json!({ "role": "SRE", "company": "Acme" })),
                Some(GOOD_TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["message"], "Resource has been exhausted");

        let (app, _) = app_with(Err(GenerateError::MissingConfiguration));
        let (status, body) = send(
            app,
            request(
                Method::POST,
                "/api/v1/generate/summary",
                Some(json!({})),
                Some(GOOD_TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_sign_in_flow() {
        let (status, body) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/auth/sign-in",
                Some(json!({ "email": "ada@example.com", "password": "nope" })),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "INVALID_LOGIN_CREDENTIALS");

        let (status, session) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/auth/sign-in",
                Some(json!({ "email": "ada@example.com", "password": "pw" })),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = session["id_token"].as_str().unwrap();

        let (status, me) = send(
            app(),
            request(Method::GET, "/api/v1/auth/me", None, Some(token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["uid"], "u1");

        let (status, _) = send(
            app(),
            request(Method::POST, "/api/v1/auth/sign-out", None, Some(token)),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_guard_attaches_user_for_valid_token() {
        let (status, me) = send(
            app(),
            request(Method::GET, "/api/v1/auth/me", None, Some(GOOD_TOKEN)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "ada@example.com");

        let (status, _) = send(
            app(),
            request(Method::GET, "/api/v1/auth/me", None, Some("  ")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_state_reports_route_access() {
        let (status, body) = send(
            app(),
            request(Method::GET, "/api/v1/auth/state", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["access"], "redirect_to_sign_in");
        assert_eq!(body["loading"], false);

        let (_, body) = send(
            app(),
            request(Method::GET, "/api/v1/auth/state", None, Some("expired")),
        )
        .await;
        assert_eq!(body["access"], "redirect_to_sign_in");

        let (_, body) = send(
            app(),
            request(Method::GET, "/api/v1/auth/state", None, Some(GOOD_TOKEN)),
        )
        .await;
        assert_eq!(body["access"], "allow");
        assert_eq!(body["user"]["uid"], "u1");
    }

    #[tokio::test]
    async fn test_sign_up_requires_credentials() {
        let (status, _) = send(
            app(),
            request(
                Method::POST,
                "/api/v1/auth/sign-up",
                Some(json!({ "email": "", "password": "" })),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_federated_sign_in_not_supported() {
        let (status, body) = send(
            app(),
            request(Method::POST, "/api/v1/auth/federated", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["error"]["code"], "NOT_IMPLEMENTED");
    }
}
