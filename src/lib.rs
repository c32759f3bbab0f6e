use axum::{
    Router,
    extract::{FromRef, OriginalUri, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod backend;
pub mod config;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod rental;
pub mod storage;

// Module for routing segregation (Public, Dashboard, Admin).
pub mod routes;
use auth::{MaybeIdentity, SessionCache};
use gate::GateOutcome;
use models::Role;
use routes::{admin, dashboard, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use backend::{BackendState, HttpBackendApi, MockBackendApi};
pub use config::AppConfig;
pub use provider::{HttpAuthProvider, MockAuthProvider, ProviderState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// This struct auto-generates the OpenAPI documentation (Swagger JSON) for the application.
/// It aggregates all API paths and data schemas that have been decorated with
/// the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    // List all public handler functions here for documentation generation.
    paths(
        handlers::sign_up, handlers::sign_in, handlers::password_reset, handlers::sign_out,
        handlers::list_courses, handlers::recent_courses, handlers::get_course,
        handlers::list_live_classes,
        handlers::list_mentors, handlers::get_me, handlers::my_courses,
        handlers::purchase_course, handlers::start_rental, handlers::purchase_status,
        handlers::book_live_class, handlers::my_bookings, handlers::kyc_status,
        handlers::submit_kyc, handlers::get_presigned_url, handlers::admin_stats,
        handlers::admin_users, handlers::admin_courses, handlers::admin_get_course,
        handlers::create_course, handlers::update_course, handlers::delete_course,
        handlers::publish_course, handlers::add_module, handlers::update_module,
        handlers::delete_module, handlers::add_content, handlers::update_content,
        handlers::delete_content, handlers::admin_live_classes, handlers::create_live_class,
        handlers::update_live_class, handlers::delete_live_class, handlers::pending_kyc,
        handlers::review_kyc
    ),
    // List all models (schemas) used in the request/response bodies.
    components(
        schemas(
            models::Role, models::Identity, models::CourseStatus, models::Content,
            models::CourseModule, models::Course, models::CreateCourseRequest,
            models::UpdateCourseRequest, models::CreateModuleRequest, models::UpdateModuleRequest,
            models::CreateContentRequest, models::UpdateContentRequest, models::PurchaseKind,
            models::PurchasePhase, models::PurchaseRequest, models::PurchaseStatus,
            models::PurchasedCourse, models::ClassPlatform, models::Mentor, models::LiveClass,
            models::LiveClassRequest, models::Booking, models::KycState, models::KycStatus,
            models::KycDocs, models::KycSubmission, models::KycRecord, models::KycReviewRequest,
            models::PlatformStats, models::PortalUser, models::SignUpRequest,
            models::SignInRequest, models::PasswordResetRequest, models::SessionTokens,
            models::PresignedUrlRequest, models::PresignedUrlResponse,
        )
    ),
    tags(
        (name = "edu-portal", description = "Online Education Portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**. This is the single, thread-safe, and immutable
/// container holding all essential application services and configuration.
/// The application state is shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Backend Layer: Abstracts the remote platform API holding all domain data.
    pub backend: BackendState,
    /// Provider Layer: Abstracts the external auth provider (sessions, credentials).
    pub provider: ProviderState,
    /// Storage Layer: Abstracts S3-compatible access and presigned URL generation.
    pub storage: StorageState,
    /// Session Layer: The process-wide token-to-identity cache.
    pub sessions: SessionCache,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow handlers to selectively pull components from the shared AppState.
// This is critical for dependency injection and adhering to the Clean Architecture boundaries.

impl FromRef<AppState> for BackendState {
    fn from_ref(app_state: &AppState) -> BackendState {
        app_state.backend.clone()
    }
}

impl FromRef<AppState> for ProviderState {
    fn from_ref(app_state: &AppState) -> ProviderState {
        app_state.provider.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for SessionCache {
    fn from_ref(app_state: &AppState) -> SessionCache {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// The roles each protected section admits. The gate receives these when the
/// section's middleware runs; public routes carry no gate at all. The empty
/// list is the gate's open allow-list: any authenticated role passes, which
/// is what the shared routes (sign-out, uploads) require — an admin must be
/// able to tear down their own session.
const DASHBOARD_ROLES: &[Role] = &[Role::Student, Role::Mentor];
const ADMIN_ROLES: &[Role] = &[Role::Admin];
const SHARED_ROLES: &[Role] = &[];

/// run_gate
///
/// The shared middleware body for both protected sections. It resolves the
/// (possibly absent) identity leniently, evaluates the pure gate function
/// against the original request path, and renders the outcome:
///
/// - `Allow` proceeds to the handler.
/// - Redirect outcomes become 303 responses to the section home or sign-in,
///   mirroring a client-side `router.replace`.
/// - `Deny` is a plain 403, never a redirect, so no loop is possible.
async fn run_gate(
    identity: MaybeIdentity,
    uri: OriginalUri,
    allowed_roles: &[Role],
    request: Request,
    next: Next,
) -> Response {
    let MaybeIdentity(identity) = identity;
    let role = identity.map(|i| i.role);
    let outcome = gate::evaluate(role, uri.path(), allowed_roles);

    match outcome {
        GateOutcome::Allow => next.run(request).await,
        GateOutcome::Deny => handlers::access_denied().await.into_response(),
        _ => {
            // redirect_target is Some for every non-Allow, non-Deny outcome.
            let target = outcome.redirect_target().unwrap_or(gate::SIGN_IN_PATH);
            Redirect::to(target).into_response()
        }
    }
}

/// dashboard_gate
///
/// Gate middleware for the dashboard section (Student and Mentor admitted;
/// Admin redirected to the admin home).
async fn dashboard_gate(
    identity: MaybeIdentity,
    uri: OriginalUri,
    request: Request,
    next: Next,
) -> Response {
    run_gate(identity, uri, DASHBOARD_ROLES, request, next).await
}

/// admin_gate
///
/// Gate middleware for the admin section (Admin only; Student and Mentor
/// redirected to the dashboard home).
async fn admin_gate(
    identity: MaybeIdentity,
    uri: OriginalUri,
    request: Request,
    next: Next,
) -> Response {
    run_gate(identity, uri, ADMIN_ROLES, request, next).await
}

/// shared_gate
///
/// Gate middleware for the routes every signed-in role may use (session
/// teardown, the upload pipeline). Runs with the open allow-list; the
/// handlers' `Identity` extractor still rejects anonymous callers.
async fn shared_gate(
    identity: MaybeIdentity,
    uri: OriginalUri,
    request: Request,
    next: Next,
) -> Response {
    run_gate(identity, uri, SHARED_ROLES, request, next).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and scoped middleware,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: No gate applied; the allow-list covers all of them.
        .merge(public::public_routes())
        // Dashboard Routes: Wrapped by the gate admitting Student and Mentor.
        // This implements the first layer of Defense-in-Depth for these routes.
        .merge(
            dashboard::dashboard_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), dashboard_gate)),
        )
        // Shared Routes: sign-out and uploads, open to every authenticated role.
        .merge(
            dashboard::shared_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), shared_gate)),
        )
        // Admin Routes: Nested under '/admin' and wrapped by the gate admitting
        // only Admin. Handlers repeat the role check as the second layer.
        .nest(
            "/admin",
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_gate)),
        )
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    // This section implements the Production Observability Stack.
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: Generates a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: Wraps the entire request/response lifecycle in a tracing span.
                // Uses the `trace_span_logger` to include the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: Ensures the generated x-request-id header is
                // returned to the client and injected into subsequent service calls.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (Applied last, allowing all traffic in/out after processing)
        .layer(cors)
}

/// trace_span_logger
///
/// Helper function used by `TraceLayer` to customize the tracing span creation.
/// It extracts the `x-request-id` header (if present) and includes it in the
/// structured logging metadata alongside the HTTP method and URI.
///
/// *Goal*: Ensure every log line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    // The structured log format used by the tracing macros.
    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
