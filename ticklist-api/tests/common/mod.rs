/// Common test utilities for integration tests
///
/// Builds the real router over in-memory stores so the full HTTP stack -
/// auth layers, handlers, error mapping - runs in-process with no external
/// services.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use ticklist_api::app::{build_router, AppState};
use ticklist_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use ticklist_shared::models::NewTask;
use ticklist_shared::store::TaskStore;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context holding shared application state
pub struct TestContext {
    pub state: AppState,
}

/// A signed-in identity for request helpers
pub struct Session {
    pub id: Uuid,
    pub access: String,
    pub refresh: String,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://unused-in-tests".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
        },
    }
}

impl TestContext {
    /// Creates a context over fresh in-memory stores.
    pub fn new() -> Self {
        Self {
            state: AppState::in_memory(test_config()),
        }
    }

    /// Sends one request through the router and returns status + JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = build_router(self.state.clone())
            .oneshot(request)
            .await
            .expect("router should not fail");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        // Extractor rejections (e.g. bad enum values) come back as plain
        // text; surface those as a JSON string so callers can still assert
        // on the status.
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, json)
    }

    /// Registers a member and returns its session.
    pub async fn join_member(&self, email: &str, password: &str) -> Session {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/member/join",
                None,
                Some(serde_json::json!({ "email": email, "password_hash": password })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "join failed: {}", body);
        session_from(&body)
    }

    /// Mints an anonymous user session.
    pub async fn join_user(&self) -> Session {
        let (status, body) = self
            .request(Method::POST, "/auth/user/join", None, None)
            .await;

        assert_eq!(status, StatusCode::OK, "user join failed: {}", body);
        session_from(&body)
    }

    /// Inserts an anonymous task row directly, anchoring a user session's
    /// subject id so the token resolves as enrolled.
    pub async fn anchor_user_session(&self, session: &Session) {
        self.state
            .task_store
            .insert(NewTask {
                id: session.id,
                title: "session anchor".to_string(),
            })
            .await
            .expect("insert anchor task");
    }

    /// Creates a todo for a member session and returns its JSON.
    pub async fn create_todo(&self, session: &Session, title: &str) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/todos",
                Some(&session.access),
                Some(serde_json::json!({ "title": title })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "create todo failed: {}", body);
        body
    }
}

/// Parses the `{id, token: {access, refresh, ...}}` session shape.
pub fn session_from(body: &Value) -> Session {
    Session {
        id: body["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("session id"),
        access: body["token"]["access"]
            .as_str()
            .expect("access token")
            .to_string(),
        refresh: body["token"]["refresh"]
            .as_str()
            .expect("refresh token")
            .to_string(),
    }
}
