use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in). These routes handle the browsable catalog plus
/// the auth gateway functions (registration, sign-in, password reset).
///
/// Security Mandate:
/// Catalog handlers in this module must withhold unpublished courses; the
/// published-only filter is enforced at the handler level, never left to the
/// client.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/sign-up
        // New account creation: provider account first, then the mirrored
        // backend profile carrying the chosen role.
        .route("/auth/sign-up", post(handlers::sign_up))
        // POST /auth/sign-in
        // Opens a provider session and resolves the backend profile. A session
        // without a profile is revoked on the spot.
        .route("/auth/sign-in", post(handlers::sign_in))
        // POST /auth/password-reset
        // Forwards the reset request to the provider. Responds 200 regardless
        // of account existence.
        .route("/auth/password-reset", post(handlers::password_reset))
        // GET /courses?limit=...
        // Lists the published catalog. DRAFT and ARCHIVED courses never appear here.
        .route("/courses", get(handlers::list_courses))
        // GET /courses/recent?limit=...
        // The newest published courses for the landing-page rail. The static
        // segment takes precedence over the {id} capture below.
        .route("/courses/recent", get(handlers::recent_courses))
        // GET /courses/{id}
        // Detailed view of a single published course, including its module/content tree.
        .route("/courses/{id}", get(handlers::get_course))
        // GET /live-classes
        // Upcoming live classes with remaining-seat counts.
        .route("/live-classes", get(handlers::list_live_classes))
        // GET /mentors
        // The instructor directory backing the live-class cards.
        .route("/mentors", get(handlers::list_mentors))
}
