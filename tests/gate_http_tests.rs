use edu_portal::{
    AppConfig, AppState, MockAuthProvider, MockBackendApi, MockStorageService, create_router,
    auth::SessionCache,
    backend::BackendState,
    models::{Course, PurchaseStatus, PurchasedCourse, Role, SessionTokens},
    provider::ProviderState,
    storage::StorageState,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    /// Handle onto the mock backend for seeding and failure injection.
    pub backend: MockBackendApi,
    /// Handle onto the mock provider for account seeding and revocation checks.
    pub provider: MockAuthProvider,
    pub sessions: SessionCache,
}

/// Spawns the full router on an ephemeral port with the in-memory mocks.
/// The config stays in Env::Local so the 'x-user-id' bypass is available for
/// role scenarios without minting tokens.
async fn spawn_app() -> TestApp {
    let config = AppConfig::default();
    let backend = MockBackendApi::new();
    let provider = MockAuthProvider::new(&config.jwt_secret);
    let sessions = SessionCache::new();

    let state = AppState {
        backend: Arc::new(backend.clone()) as BackendState,
        provider: Arc::new(provider.clone()) as ProviderState,
        storage: Arc::new(MockStorageService::new()) as StorageState,
        sessions: sessions.clone(),
        config,
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        backend,
        provider,
        sessions,
    }
}

/// Client that does NOT follow redirects, so the gate's 303s can be asserted.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn location(resp: &reqwest::Response) -> &str {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

// --- Anonymous Traffic ---

#[tokio::test]
async fn health_and_catalog_are_open_to_anonymous_clients() {
    let app = spawn_app().await;
    let client = client();

    let resp = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = client
        .get(format!("{}/courses", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn anonymous_dashboard_request_redirects_to_sign_in() {
    let app = spawn_app().await;
    let resp = client()
        .get(format!("{}/dashboard/me", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/auth");
}

#[tokio::test]
async fn anonymous_admin_request_redirects_to_sign_in() {
    let app = spawn_app().await;
    let resp = client()
        .get(format!("{}/admin/stats", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/auth");
}

// --- Cross-Section Redirects ---

#[tokio::test]
async fn admin_is_bounced_from_dashboard_to_admin_home() {
    let app = spawn_app().await;
    let admin = app
        .backend
        .seed_profile(Uuid::new_v4(), Role::Admin, "admin@portal.test")
        .await;

    let resp = client()
        .get(format!("{}/dashboard/courses", app.address))
        .header("x-user-id", admin.id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/admin");
}

#[tokio::test]
async fn student_is_bounced_from_admin_to_dashboard_home() {
    let app = spawn_app().await;
    let student = app
        .backend
        .seed_profile(Uuid::new_v4(), Role::Student, "student@portal.test")
        .await;

    let resp = client()
        .get(format!("{}/admin/stats", app.address))
        .header("x-user-id", student.id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn mentor_is_bounced_from_admin_to_dashboard_home() {
    let app = spawn_app().await;
    let mentor = app
        .backend
        .seed_profile(Uuid::new_v4(), Role::Mentor, "mentor@portal.test")
        .await;

    let resp = client()
        .get(format!("{}/admin/users", app.address))
        .header("x-user-id", mentor.id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/dashboard");
}

// --- Admitted Traffic ---

#[tokio::test]
async fn student_and_mentor_reach_the_dashboard() {
    let app = spawn_app().await;
    let client = client();

    for (role, email) in [
        (Role::Student, "s@portal.test"),
        (Role::Mentor, "m@portal.test"),
    ] {
        let identity = app.backend.seed_profile(Uuid::new_v4(), role, email).await;
        let resp = client
            .get(format!("{}/dashboard/me", app.address))
            .header("x-user-id", identity.id.to_string())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200, "role {role:?}");
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["email"], email);
    }
}

#[tokio::test]
async fn admin_reaches_the_admin_section() {
    let app = spawn_app().await;
    let admin = app
        .backend
        .seed_profile(Uuid::new_v4(), Role::Admin, "admin@portal.test")
        .await;

    let resp = client()
        .get(format!("{}/admin/stats", app.address))
        .header("x-user-id", admin.id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["totalUsers"], 1);
}

// --- Session Consistency ---

#[tokio::test]
async fn profile_fetch_failure_forces_a_full_sign_out() {
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();
    app.backend
        .seed_profile(user_id, Role::Student, "flaky@portal.test")
        .await;
    app.provider
        .seed_account("flaky@portal.test", "hunter2", user_id)
        .await;

    let client = client();

    // Sign in normally; this caches the identity.
    let resp = client
        .post(format!("{}/auth/sign-in", app.address))
        .json(&serde_json::json!({ "email": "flaky@portal.test", "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let tokens: SessionTokens = resp.json().await.unwrap();

    // Clear the cache and break the profile service: the next authenticated
    // request holds a valid provider session but cannot be resolved.
    app.sessions.clear().await;
    app.backend.set_fail_profiles(true);

    let resp = client
        .get(format!("{}/dashboard/me", app.address))
        .bearer_auth(&tokens.access_token)
        .send()
        .await
        .unwrap();

    // The gate sees no identity and routes the client to sign-in.
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/auth");

    // Both halves of the session are gone: nothing cached, token revoked at
    // the provider.
    assert!(app.sessions.is_empty().await);
    assert!(
        app.provider
            .revoked_tokens()
            .await
            .contains(&tokens.access_token)
    );
}

#[tokio::test]
async fn admin_can_sign_out_of_their_session() {
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();
    app.backend
        .seed_profile(user_id, Role::Admin, "boss@portal.test")
        .await;
    app.provider
        .seed_account("boss@portal.test", "hunter2", user_id)
        .await;

    let client = client();
    let resp = client
        .post(format!("{}/auth/sign-in", app.address))
        .json(&serde_json::json!({ "email": "boss@portal.test", "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let tokens: SessionTokens = resp.json().await.unwrap();

    // Sign-out is not a dashboard-roles route: an admin must be able to tear
    // down their own session rather than be denied by the gate.
    let resp = client
        .post(format!("{}/auth/sign-out", app.address))
        .bearer_auth(&tokens.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    assert!(app.sessions.is_empty().await);
    assert!(
        app.provider
            .revoked_tokens()
            .await
            .contains(&tokens.access_token)
    );
}

#[tokio::test]
async fn every_role_can_use_the_upload_pipeline() {
    let app = spawn_app().await;
    let client = client();

    for (role, email) in [
        (Role::Admin, "media@portal.test"),
        (Role::Mentor, "docs@portal.test"),
    ] {
        let identity = app.backend.seed_profile(Uuid::new_v4(), role, email).await;
        let resp = client
            .post(format!("{}/uploads/presigned", app.address))
            .header("x-user-id", identity.id.to_string())
            .json(&serde_json::json!({ "filename": "intro.mp4", "fileType": "video/mp4" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "role {role:?}");
    }
}

#[tokio::test]
async fn sign_in_with_valid_token_reaches_dashboard() {
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();
    app.backend
        .seed_profile(user_id, Role::Student, "jwt@portal.test")
        .await;
    app.provider
        .seed_account("jwt@portal.test", "hunter2", user_id)
        .await;

    let client = client();
    let resp = client
        .post(format!("{}/auth/sign-in", app.address))
        .json(&serde_json::json!({ "email": "jwt@portal.test", "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let tokens: SessionTokens = resp.json().await.unwrap();

    let resp = client
        .get(format!("{}/dashboard/me", app.address))
        .bearer_auth(&tokens.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn sign_in_without_backend_profile_is_rejected_and_revoked() {
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();
    // Provider account exists; backend profile deliberately not seeded.
    app.provider
        .seed_account("ghost@portal.test", "hunter2", user_id)
        .await;

    let resp = client()
        .post(format!("{}/auth/sign-in", app.address))
        .json(&serde_json::json!({ "email": "ghost@portal.test", "password": "hunter2" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    assert_eq!(app.provider.revoked_tokens().await.len(), 1);
}

// --- Catalog Visibility ---

#[tokio::test]
async fn drafts_are_invisible_in_the_public_catalog_until_published() {
    let app = spawn_app().await;
    let admin = app
        .backend
        .seed_profile(Uuid::new_v4(), Role::Admin, "author@portal.test")
        .await;
    let client = client();

    // Author a course; it starts as a draft.
    let resp = client
        .post(format!("{}/admin/courses", app.address))
        .header("x-user-id", admin.id.to_string())
        .json(&serde_json::json!({
            "title": "Rust Fundamentals",
            "description": "Ownership and borrowing",
            "level": "Beginner",
            "priceBuy": 99900
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let draft: Course = resp.json().await.unwrap();

    // The public catalog and detail page withhold it.
    let listed: Vec<Course> = client
        .get(format!("{}/courses", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());

    let resp = client
        .get(format!("{}/courses/{}", app.address, draft.id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Publish and re-check.
    let resp = client
        .post(format!("{}/admin/courses/{}/publish", app.address, draft.id))
        .header("x-user-id", admin.id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let listed: Vec<Course> = client
        .get(format!("{}/courses", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, draft.id);
}

#[tokio::test]
async fn recent_courses_rail_is_public_and_capped() {
    let app = spawn_app().await;
    for i in 0..3 {
        app.backend
            .seed_course(&format!("Course {i}"), None)
            .await;
    }

    let listed: Vec<Course> = client()
        .get(format!("{}/courses/recent?limit=2", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

// --- Purchase & Rental over HTTP ---

#[tokio::test]
async fn rental_purchase_flow_reports_status_and_countdown() {
    let app = spawn_app().await;
    let student = app
        .backend
        .seed_profile(Uuid::new_v4(), Role::Student, "renter@portal.test")
        .await;
    let course = app.backend.seed_course("Async Rust", Some(19900)).await;
    let client = client();
    let uid = student.id.to_string();

    // Never purchased: status is a 404.
    let resp = client
        .get(format!(
            "{}/courses/{}/purchase-status",
            app.address, course.id
        ))
        .header("x-user-id", &uid)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Rent the course.
    let resp = client
        .post(format!("{}/courses/{}/purchase", app.address, course.id))
        .header("x-user-id", &uid)
        .json(&serde_json::json!({ "type": "RENT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let status: PurchaseStatus = resp.json().await.unwrap();
    assert!(!status.can_access);

    // A second purchase of the same course conflicts.
    let resp = client
        .post(format!("{}/courses/{}/purchase", app.address, course.id))
        .header("x-user-id", &uid)
        .json(&serde_json::json!({ "type": "RENT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    // Start the viewing window.
    let resp = client
        .post(format!(
            "{}/courses/{}/start-rental",
            app.address, course.id
        ))
        .header("x-user-id", &uid)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let status: PurchaseStatus = resp.json().await.unwrap();
    assert!(status.can_access);
    assert!(status.rental_end.is_some());

    // The dashboard listing carries a live countdown for the rental.
    let mine: Vec<PurchasedCourse> = client
        .get(format!("{}/dashboard/courses", app.address))
        .header("x-user-id", &uid)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    let countdown = mine[0].countdown.as_deref().expect("rental countdown");
    assert!(countdown.ends_with('s'), "got {countdown}");

    // Starting twice conflicts.
    let resp = client
        .post(format!(
            "{}/courses/{}/start-rental",
            app.address, course.id
        ))
        .header("x-user-id", &uid)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}
