use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use edu_portal::{
    AppState, MockAuthProvider, MockBackendApi, MockStorageService,
    auth::{Claims, SessionCache},
    config::{AppConfig, Env},
    models::{Identity, Role},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn create_token(user_id: Uuid, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset).max(0) as usize,
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

struct TestContext {
    state: AppState,
    backend: MockBackendApi,
    provider: MockAuthProvider,
    sessions: SessionCache,
}

fn create_context(env: Env) -> TestContext {
    let mut config = AppConfig::default();
    config.env = env;
    config.jwt_secret = TEST_JWT_SECRET.to_string();

    let backend = MockBackendApi::new();
    let provider = MockAuthProvider::new(TEST_JWT_SECRET);
    let sessions = SessionCache::new();

    let state = AppState {
        backend: Arc::new(backend.clone()),
        provider: Arc::new(provider.clone()),
        storage: Arc::new(MockStorageService::new()),
        sessions: sessions.clone(),
        config,
    };
    TestContext {
        state,
        backend,
        provider,
        sessions,
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
}

// --- Tests ---

#[tokio::test]
async fn valid_jwt_resolves_the_backend_profile() {
    let ctx = create_context(Env::Production);
    ctx.backend
        .seed_profile(TEST_USER_ID, Role::Student, "test@example.com")
        .await;
    let token = create_token(TEST_USER_ID, 3600);

    let mut parts = get_request_parts(Method::GET, "/dashboard/me".parse().unwrap());
    with_bearer(&mut parts, &token);

    let identity = Identity::from_request_parts(&mut parts, &ctx.state).await;

    assert!(identity.is_ok());
    let identity = identity.unwrap();
    assert_eq!(identity.id, TEST_USER_ID);
    assert_eq!(identity.role, Role::Student);
    // Resolution populates the session cache for later requests.
    assert_eq!(ctx.sessions.len().await, 1);
}

#[tokio::test]
async fn missing_authorization_header_is_unauthorized() {
    let ctx = create_context(Env::Production);

    let mut parts = get_request_parts(Method::GET, "/dashboard/me".parse().unwrap());
    let identity = Identity::from_request_parts(&mut parts, &ctx.state).await;

    assert!(identity.is_err());
    assert_eq!(identity.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_jwt_is_rejected() {
    let ctx = create_context(Env::Production);
    ctx.backend
        .seed_profile(TEST_USER_ID, Role::Student, "test@example.com")
        .await;
    // Expired well past the default validation leeway.
    let token = create_token(TEST_USER_ID, -600);

    let mut parts = get_request_parts(Method::GET, "/dashboard/me".parse().unwrap());
    with_bearer(&mut parts, &token);

    let identity = Identity::from_request_parts(&mut parts, &ctx.state).await;

    assert!(identity.is_err());
    assert_eq!(identity.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cached_session_skips_the_profile_fetch() {
    let ctx = create_context(Env::Production);
    let token = create_token(TEST_USER_ID, 3600);

    // Cache an identity for the token, then break the profile service. A
    // cache hit must still resolve; the backend is never consulted.
    ctx.sessions
        .store(
            &token,
            Identity {
                id: TEST_USER_ID,
                role: Role::Mentor,
                email: "cached@example.com".to_string(),
                full_name: None,
                avatar_url: None,
            },
        )
        .await;
    ctx.backend.set_fail_profiles(true);

    let mut parts = get_request_parts(Method::GET, "/dashboard/me".parse().unwrap());
    with_bearer(&mut parts, &token);

    let identity = Identity::from_request_parts(&mut parts, &ctx.state).await;

    assert!(identity.is_ok());
    assert_eq!(identity.unwrap().role, Role::Mentor);
}

#[tokio::test]
async fn profile_failure_invalidates_cache_and_revokes_the_session() {
    let ctx = create_context(Env::Production);
    let token = create_token(TEST_USER_ID, 3600);
    ctx.backend.set_fail_profiles(true);

    let mut parts = get_request_parts(Method::GET, "/dashboard/me".parse().unwrap());
    with_bearer(&mut parts, &token);

    let identity = Identity::from_request_parts(&mut parts, &ctx.state).await;

    assert!(identity.is_err());
    assert_eq!(identity.unwrap_err(), StatusCode::UNAUTHORIZED);
    // The forced sign-out cleared the cache and told the provider.
    assert!(ctx.sessions.is_empty().await);
    assert_eq!(ctx.provider.revoked_tokens().await, vec![token]);
}

#[tokio::test]
async fn local_bypass_resolves_the_real_role() {
    let ctx = create_context(Env::Local);
    let user_id = Uuid::new_v4();
    ctx.backend
        .seed_profile(user_id, Role::Admin, "local@dev.com")
        .await;

    let mut parts = get_request_parts(Method::GET, "/admin/stats".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&user_id.to_string()).unwrap(),
    );

    let identity = Identity::from_request_parts(&mut parts, &ctx.state).await;

    assert!(identity.is_ok());
    let identity = identity.unwrap();
    assert_eq!(identity.id, user_id);
    assert_eq!(identity.role, Role::Admin);
}

#[tokio::test]
async fn local_bypass_is_disabled_in_production() {
    let ctx = create_context(Env::Production);
    let user_id = Uuid::new_v4();
    ctx.backend
        .seed_profile(user_id, Role::Admin, "local@dev.com")
        .await;

    let mut parts = get_request_parts(Method::GET, "/admin/stats".parse().unwrap());
    // Provide ONLY the local bypass header.
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&user_id.to_string()).unwrap(),
    );

    let identity = Identity::from_request_parts(&mut parts, &ctx.state).await;

    assert!(identity.is_err());
    assert_eq!(identity.unwrap_err(), StatusCode::UNAUTHORIZED);
}
