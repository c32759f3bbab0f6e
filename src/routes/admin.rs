use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

/// Admin Router Module
///
/// Defines the routes exclusively accessible to users with the Admin role:
/// platform oversight, course authoring, live-class management, and the KYC
/// review queue.
///
/// Access Control:
/// This entire router is nested under '/admin' and wrapped (in
/// `create_router`) by the gate middleware admitting only Admin. Each handler
/// repeats the role check as the second layer of Defense-in-Depth, so no
/// routing mistake can expose a moderation function.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Core oversight metrics (users, courses, purchases, pending KYC).
        .route("/stats", get(handlers::admin_stats))
        // GET /admin/users
        // Full user listing with KYC standing.
        .route("/users", get(handlers::admin_users))
        // --- Course Authoring ---
        // GET/POST /admin/courses
        // Lists ALL courses including drafts, and authors new ones. New
        // courses start as DRAFT; publication is a separate explicit action.
        .route(
            "/courses",
            get(handlers::admin_courses).post(handlers::create_course),
        )
        // GET/PATCH/DELETE /admin/courses/{id}
        // Single-course editor surface, drafts included.
        .route(
            "/courses/{id}",
            get(handlers::admin_get_course)
                .patch(handlers::update_course)
                .delete(handlers::delete_course),
        )
        // POST /admin/courses/{id}/publish
        // Moves a course into the public catalog.
        .route("/courses/{id}/publish", post(handlers::publish_course))
        // --- Module & Content Tree ---
        .route("/courses/{id}/modules", post(handlers::add_module))
        .route(
            "/modules/{id}",
            patch(handlers::update_module).delete(handlers::delete_module),
        )
        .route("/modules/{id}/content", post(handlers::add_content))
        .route(
            "/content/{id}",
            patch(handlers::update_content).delete(handlers::delete_content),
        )
        // --- Live Classes ---
        // GET/POST /admin/live-classes
        // Every class past and future, plus scheduling of new ones.
        .route(
            "/live-classes",
            get(handlers::admin_live_classes).post(handlers::create_live_class),
        )
        // PUT/DELETE /admin/live-classes/{id}
        // Full replacement matching the authoring form, and cancellation.
        .route(
            "/live-classes/{id}",
            put(handlers::update_live_class).delete(handlers::delete_live_class),
        )
        // --- KYC Review ---
        // GET /admin/kyc/pending
        // The review queue of submitted-but-undecided KYC records.
        .route("/kyc/pending", get(handlers::pending_kyc))
        // POST /admin/kyc/{id}/review
        // Approves or rejects a submission; rejection feedback reaches the
        // user on their next status fetch.
        .route("/kyc/{id}/review", post(handlers::review_kyc))
}
