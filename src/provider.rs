use crate::models::SessionTokens;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// ProviderSession
///
/// The result of a successful provider sign-up/sign-in: the canonical auth
/// user id plus the session tokens the client will present on later requests.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub user_id: Uuid,
    pub tokens: SessionTokens,
}

/// AuthProvider Contract
///
/// Defines the abstract contract for all interactions with the external auth
/// provider (Supabase in production). This trait lets us swap the real HTTP
/// client for the in-memory Mock during testing without affecting the calling
/// handlers. Passwords pass through to the provider and are never persisted
/// or logged by this portal.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Creates a provider account and opens a session for it.
    async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderSession, String>;

    /// Opens a session for an existing account.
    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, String>;

    /// Asks the provider to email a password-reset link. Always succeeds from
    /// the caller's perspective unless the provider itself is unreachable.
    async fn request_password_reset(&self, email: &str) -> Result<(), String>;

    /// Revokes the provider session behind `access_token`. Also invoked by the
    /// identity layer when a valid session has no backend profile, so the user
    /// is never left half-authenticated.
    async fn sign_out(&self, access_token: &str) -> Result<(), String>;
}

/// ProviderState
///
/// The concrete type used to share the auth provider client across the application state.
pub type ProviderState = Arc<dyn AuthProvider>;

// --- The Real Implementation (Supabase GoTrue) ---

/// Minimal structs to deserialize provider auth responses, capturing only the
/// fields the portal needs.
#[derive(Deserialize)]
struct ProviderUserBody {
    id: Uuid,
}

#[derive(Deserialize)]
struct ProviderTokenBody {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: ProviderUserBody,
}

/// HttpAuthProvider
///
/// The concrete implementation against the provider's `/auth/v1` surface.
/// Every call carries the project's public (anon) API key.
#[derive(Clone)]
pub struct HttpAuthProvider {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl HttpAuthProvider {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    async fn session_from(resp: reqwest::Response) -> Result<ProviderSession, String> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("provider rejected request ({}): {}", status, body));
        }
        let body = resp
            .json::<ProviderTokenBody>()
            .await
            .map_err(|e| e.to_string())?;
        Ok(ProviderSession {
            user_id: body.user.id,
            tokens: SessionTokens {
                access_token: body.access_token,
                refresh_token: body.refresh_token,
                expires_in: body.expires_in,
            },
        })
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderSession, String> {
        let resp = self
            .client
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::session_from(resp).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, String> {
        let resp = self
            .client
            .post(format!(
                "{}/auth/v1/token?grant_type=password",
                self.base_url
            ))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::session_from(resp).await
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), String> {
        let resp = self
            .client
            .post(format!("{}/auth/v1/recover", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(format!("provider rejected reset ({})", resp.status()))
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), String> {
        let resp = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(format!("provider rejected sign-out ({})", resp.status()))
        }
    }
}

// --- The Mock Implementation (For Tests) ---

/// MockAuthProvider
///
/// In-memory provider used in tests. Accounts live in a map; sign-in mints a
/// real JWT with the configured secret so the full extractor path can be
/// exercised. Revoked tokens are recorded so tests can assert that the
/// forced-sign-out path actually cleared the provider session.
#[derive(Clone)]
pub struct MockAuthProvider {
    jwt_secret: String,
    accounts: Arc<RwLock<HashMap<String, (String, Uuid)>>>,
    revoked: Arc<RwLock<Vec<String>>>,
}

impl MockAuthProvider {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            accounts: Arc::new(RwLock::new(HashMap::new())),
            revoked: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn seed_account(&self, email: &str, password: &str, user_id: Uuid) {
        self.accounts
            .write()
            .await
            .insert(email.to_string(), (password.to_string(), user_id));
    }

    pub async fn revoked_tokens(&self) -> Vec<String> {
        self.revoked.read().await.clone()
    }

    fn mint(&self, user_id: Uuid) -> SessionTokens {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = crate::auth::Claims {
            sub: user_id,
            iat: now,
            exp: now + 3600,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .unwrap_or_default();
        SessionTokens {
            access_token: token,
            refresh_token: None,
            expires_in: Some(3600),
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderSession, String> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err("account already exists".to_string());
        }
        let user_id = Uuid::new_v4();
        accounts.insert(email.to_string(), (password.to_string(), user_id));
        Ok(ProviderSession {
            user_id,
            tokens: self.mint(user_id),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, String> {
        let accounts = self.accounts.read().await;
        match accounts.get(email) {
            Some((stored, user_id)) if stored == password => Ok(ProviderSession {
                user_id: *user_id,
                tokens: self.mint(*user_id),
            }),
            _ => Err("invalid credentials".to_string()),
        }
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), String> {
        // The real provider does not reveal account existence; neither do we.
        let _ = email;
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), String> {
        self.revoked.write().await.push(access_token.to_string());
        Ok(())
    }
}
