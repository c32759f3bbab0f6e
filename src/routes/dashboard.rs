use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Dashboard Router Module
///
/// Defines the routes for the signed-in user section: profile, purchased
/// courses, rentals, live-class bookings, and KYC.
///
/// Access Control Strategy:
/// The router is wrapped (in `create_router`) by the gate middleware admitting
/// Student and Mentor. Every handler additionally relies on the `Identity`
/// extractor, which guarantees a validated session whose backend profile
/// exists; a valid provider session with no profile is force-signed-out by
/// the extractor and never reaches a handler.
pub fn dashboard_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /dashboard/me
        // The authenticated user's profile as resolved by the identity layer.
        .route("/dashboard/me", get(handlers::get_me))
        // GET /dashboard/courses
        // Purchased and rented courses; active rentals carry a rendered countdown.
        .route("/dashboard/courses", get(handlers::my_courses))
        // GET /dashboard/bookings
        // The caller's live-class bookings.
        .route("/dashboard/bookings", get(handlers::my_bookings))
        // --- Purchases & Rentals ---
        // POST /courses/{id}/purchase
        // Buys (lifetime) or rents (deferred 48-hour window) a course.
        .route("/courses/{id}/purchase", post(handlers::purchase_course))
        // POST /courses/{id}/start-rental
        // Opens the 48-hour viewing window on a rented course. One-shot; a
        // second start is a 409.
        .route("/courses/{id}/start-rental", post(handlers::start_rental))
        // GET /courses/{id}/purchase-status
        // The caller's access picture for one course; 404 means never purchased.
        .route(
            "/courses/{id}/purchase-status",
            get(handlers::purchase_status),
        )
        // --- Live Classes ---
        // POST /live-classes/{id}/book
        // Reserves a seat. Capacity and the one-booking-per-user rule are
        // enforced behind this call and surface as 409.
        .route("/live-classes/{id}/book", post(handlers::book_live_class))
        // --- KYC ---
        // GET /kyc/status
        // The caller's KYC standing plus any reviewer feedback.
        .route("/kyc/status", get(handlers::kyc_status))
        // POST /kyc/submit
        // Submits identity documents (already uploaded via the presigned flow).
        .route("/kyc/submit", post(handlers::submit_kyc))
}

/// Shared Authenticated Routes
///
/// Endpoints every signed-in identity may use regardless of role, wrapped (in
/// `create_router`) by the gate with an open allow-list. Session teardown
/// must be reachable by admins too, and the upload pipeline serves both
/// mentor KYC documents and admin course media.
pub fn shared_routes() -> Router<AppState> {
    Router::new()
        // POST /auth/sign-out
        // Tears down the cached identity and revokes the provider session.
        .route("/auth/sign-out", post(handlers::sign_out))
        // POST /uploads/presigned
        // Initiates the secure upload pipeline. Generates a short-lived
        // (10-minute) presigned URL so the client uploads documents and media
        // directly to storage, bypassing the portal.
        .route("/uploads/presigned", post(handlers::get_presigned_url))
}
