// app.rs - Router assembly and shared request state
use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state, map_response},
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::api::{PageParams, PageQuery};
use crate::config::{AppConfig, ConfigError, Environment};
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{
    json_error_body, jwt_auth_middleware, rate_limit_middleware, require_admin,
    validate_user_middleware, ClientRateLimiter,
};
use crate::services::{
    AuthService, CommentService, IssueService, LabelService, ProjectService, ServiceResult,
};

/// State shared by every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub limiter: Option<Arc<ClientRateLimiter>>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Result<Self, ConfigError> {
        let limiter = ClientRateLimiter::from_config(&config.api)?;
        Ok(Self {
            pool,
            config: Arc::new(config),
            limiter,
        })
    }

    pub fn page(&self, query: &PageQuery) -> PageParams {
        PageParams::from_config(query, &self.config.api)
    }

    pub fn auth_service(&self) -> ServiceResult<AuthService> {
        AuthService::new(self.pool.clone(), &self.config.security)
    }

    pub fn project_service(&self) -> ServiceResult<ProjectService> {
        ProjectService::new(self.pool.clone())
    }

    pub fn issue_service(&self) -> ServiceResult<IssueService> {
        IssueService::new(self.pool.clone())
    }

    pub fn label_service(&self) -> ServiceResult<LabelService> {
        LabelService::new(self.pool.clone())
    }

    pub fn comment_service(&self) -> ServiceResult<CommentService> {
        CommentService::new(self.pool.clone())
    }
}

pub fn app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    Router::new()
        .route("/", get(public::root))
        .nest("/api/v1", api_routes(&state))
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(map_response(json_error_body))
        .layer(cors_layer(&config))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-xss-protection"),
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes(state))
        .merge(protected_routes(state))
}

fn public_routes(state: &AppState) -> Router<AppState> {
    use public::{auth, health, labels};

    Router::new()
        .route("/health", get(health::health_get))
        .route("/ping", get(health::ping_get))
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/refresh", post(auth::refresh_post))
        // Label reads are public, writes are admin-only on the same paths
        .route(
            "/labels",
            get(labels::labels_list).merge(admin_only(state, post(elevated::labels::label_create))),
        )
        .route(
            "/labels/:label_id",
            get(labels::label_get).merge(admin_only(
                state,
                MethodRouter::new()
                    .put(elevated::labels::label_update)
                    .delete(elevated::labels::label_delete),
            )),
        )
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use protected::{auth, comments, issues, projects};

    Router::new()
        .route("/auth/logout", post(auth::logout_post))
        .route("/auth/me", get(auth::me_get))
        .route("/auth/password", put(auth::password_put))
        .route("/projects", get(projects::project_list).post(projects::project_create))
        .route(
            "/projects/:project_id",
            get(projects::project_get)
                .put(projects::project_update)
                .delete(projects::project_delete),
        )
        .route(
            "/projects/:project_id/members",
            get(projects::member_list).post(projects::member_add),
        )
        .route(
            "/projects/:project_id/members/:user_id",
            delete(projects::member_remove),
        )
        .route(
            "/projects/:project_id/issues",
            get(issues::issue_list).post(issues::issue_create),
        )
        .route(
            "/issues/:issue_id",
            get(issues::issue_get)
                .put(issues::issue_update)
                .delete(issues::issue_delete),
        )
        .route("/issues/:issue_id/assign", post(issues::assign_post))
        .route("/issues/:issue_id/assign/:user_id", delete(issues::assign_delete))
        .route("/issues/:issue_id/labels", post(issues::label_add))
        .route("/issues/:issue_id/labels/:label_id", delete(issues::label_remove))
        .route(
            "/issues/:issue_id/comments",
            get(comments::comment_list).post(comments::comment_create),
        )
        .route(
            "/comments/:comment_id",
            put(comments::comment_update).delete(comments::comment_delete),
        )
        // Layers run bottom-up: JWT decode, then user lookup
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

/// Wrap a method router with JWT auth, user validation and the admin check
fn admin_only(state: &AppState, method_router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    method_router
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        if config.environment == Environment::Production {
            tracing::warn!("CORS allows any origin in production");
        }
        return base.allow_origin(AllowOrigin::any());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}
