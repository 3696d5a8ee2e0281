/// Application state and router builder
///
/// The state is built once in `main` and cloned per request. Every
/// collaborator - stores, token codec, services - is injected here rather
/// than read from globals, so tests can assemble the exact same router over
/// in-memory stores.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use ticklist_shared::auth::resolver::{resolve_member, resolve_user};
use ticklist_shared::auth::{CredentialManager, SessionManager, TokenCodec};
use ticklist_shared::store::{
    InMemoryMemberStore, InMemoryTaskStore, InMemoryTodoStore, MemberStore, PgMemberStore,
    PgTaskStore, PgTodoStore, TaskStore, TodoStore,
};
use ticklist_shared::tasks::TaskService;
use ticklist_shared::todos::TodoService;

use crate::{config::Config, error::ApiError, routes};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; everything
/// inside is `Arc`-backed so clones are cheap.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Token codec over the configured signing secret
    pub codec: TokenCodec,

    /// Member account store
    pub members: Arc<dyn MemberStore>,

    /// Anonymous task store
    pub task_store: Arc<dyn TaskStore>,

    /// Member credential lifecycle
    pub credentials: CredentialManager,

    /// Anonymous session lifecycle
    pub sessions: SessionManager,

    /// Member todo service
    pub todos: TodoService,

    /// Anonymous task service
    pub tasks: TaskService,
}

impl AppState {
    /// Assembles state from a config and a set of stores.
    pub fn new(
        config: Config,
        members: Arc<dyn MemberStore>,
        todo_store: Arc<dyn TodoStore>,
        task_store: Arc<dyn TaskStore>,
    ) -> Self {
        let codec = TokenCodec::new(config.jwt.secret.clone());

        Self {
            credentials: CredentialManager::new(members.clone(), codec.clone()),
            sessions: SessionManager::new(task_store.clone(), codec.clone()),
            todos: TodoService::new(todo_store),
            tasks: TaskService::new(task_store.clone()),
            config: Arc::new(config),
            codec,
            members,
            task_store,
        }
    }

    /// Production state over a PostgreSQL pool.
    pub fn postgres(pool: PgPool, config: Config) -> Self {
        Self::new(
            config,
            Arc::new(PgMemberStore::new(pool.clone())),
            Arc::new(PgTodoStore::new(pool.clone())),
            Arc::new(PgTaskStore::new(pool)),
        )
    }

    /// State over in-memory stores; used by tests and local experiments.
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryMemberStore::new()),
            Arc::new(InMemoryTodoStore::new()),
            Arc::new(InMemoryTaskStore::new()),
        )
    }
}

/// Builds the complete Axum router.
///
/// # Routes
///
/// ```text
/// /
/// ├── /health                               # liveness (public)
/// ├── /auth/user/                           # anonymous session role
/// │   ├── POST /join                        # public
/// │   ├── POST /login                       # user token
/// │   └── POST /refresh                     # refresh token in header
/// ├── /auth/member/                         # member role
/// │   ├── POST /join /login /refresh        # public
/// │   ├── POST /password/reset/request      # public
/// │   ├── PUT  /password/reset/complete     # public
/// │   ├── PUT  /password/update             # member token
/// │   └── DELETE /                          # member token (decommission)
/// ├── /todos                                # member token
/// │   ├── POST /          GET|PUT|DELETE /:todo_id
/// │   ├── POST /search    DELETE /
/// └── /tasks                                # public, single implicit actor
///     ├── GET|POST /      PATCH|DELETE /:task_id
/// ```
pub fn build_router(state: AppState) -> Router {
    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Anonymous session endpoints; login needs a resolved user principal
    let user_login = Router::new()
        .route("/auth/user/login", post(routes::auth_user::login))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            user_auth_layer,
        ));
    let auth_user_routes = Router::new()
        .route("/auth/user/join", post(routes::auth_user::join))
        .route("/auth/user/refresh", post(routes::auth_user::refresh))
        .merge(user_login);

    // Member credential endpoints; password update and decommission require
    // a resolved member principal
    let member_private = Router::new()
        .route(
            "/auth/member/password/update",
            put(routes::auth_member::update_password),
        )
        .route("/auth/member", delete(routes::auth_member::decommission))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            member_auth_layer,
        ));
    let auth_member_routes = Router::new()
        .route("/auth/member/join", post(routes::auth_member::join))
        .route("/auth/member/login", post(routes::auth_member::login))
        .route("/auth/member/refresh", post(routes::auth_member::refresh))
        .route(
            "/auth/member/password/reset/request",
            post(routes::auth_member::request_password_reset),
        )
        .route(
            "/auth/member/password/reset/complete",
            put(routes::auth_member::complete_password_reset),
        )
        .merge(member_private);

    // Member-scoped todos (all require a member principal)
    let todo_routes = Router::new()
        .route(
            "/todos",
            post(routes::todos::create).delete(routes::todos::delete_all),
        )
        .route("/todos/search", post(routes::todos::search))
        .route(
            "/todos/:todo_id",
            get(routes::todos::get_by_id)
                .put(routes::todos::update)
                .delete(routes::todos::delete_by_id),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            member_auth_layer,
        ));

    // Anonymous tasks (public)
    let task_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list).post(routes::tasks::create),
        )
        .route(
            "/tasks/:task_id",
            patch(routes::tasks::update).delete(routes::tasks::delete_by_id),
        );

    let cors = if state
        .config
        .api
        .cors_origins
        .contains(&"*".to_string())
    {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .merge(auth_user_routes)
        .merge(auth_member_routes)
        .merge(todo_routes)
        .merge(task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Member authentication middleware layer.
///
/// Resolves the bearer token to a member principal and injects it into
/// request extensions for handlers to extract.
async fn member_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let principal =
        resolve_member(&state.codec, state.members.as_ref(), header.as_deref()).await?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// User authentication middleware layer for the anonymous session role.
async fn user_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let principal =
        resolve_user(&state.codec, state.task_store.as_ref(), header.as_deref()).await?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
