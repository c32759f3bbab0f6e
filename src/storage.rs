use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::sync::Arc;
use std::time::Duration;

// Presigned uploads expire quickly; the client is expected to start the
// upload immediately after requesting the URL.
const PRESIGN_TTL: Duration = Duration::from_secs(600);

/// StorageService
///
/// Contract for the object store holding user-submitted KYC documents and
/// course media. The portal never proxies file bytes: it hands the client a
/// constrained upload URL and records the resulting public URL in the KYC
/// submission or course content. Handlers depend on this trait so tests run
/// against `MockStorageService` instead of a live bucket.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Provisions the configured bucket on startup in `Env::Local` (MinIO
    /// starts empty). Production buckets are managed out-of-band, where this
    /// is a no-op.
    async fn ensure_bucket_exists(&self);

    /// Signs a one-off PUT URL for `key`. The signature binds the expiry and
    /// `content_type`, so the client can upload exactly one object of the
    /// declared MIME type and nothing else.
    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, String>;

    /// The stable, publicly readable URL of an object once uploaded. This is
    /// what KYC submissions and course content records reference.
    fn public_url(&self, key: &str) -> String;
}

/// S3StorageClient
///
/// AWS-SDK-backed implementation. The same client talks to the local MinIO
/// container and to the Supabase storage gateway in production; both speak
/// the S3 protocol but only with path-style addressing, hence
/// `force_path_style(true)`.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    endpoint: String,
    bucket_name: String,
}

impl S3StorageClient {
    /// Builds the client from the storage fields of `AppConfig`. Credentials
    /// are static: the portal holds one service key, users never get their
    /// own.
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            // Path-style addressing (endpoint/bucket/key): MinIO and the
            // Supabase gateway do not resolve virtual-hosted bucket names.
            .force_path_style(true)
            .build();

        let client = s3::Client::from_conf(config);

        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket_name: bucket.to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // CreateBucket on an existing bucket is a harmless error; ignore it.
        let _ = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await;
    }

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, String> {
        let signed = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            // Baked into the signature: an upload with a different
            // Content-Type header is rejected by the store itself.
            .content_type(content_type)
            .presigned(PresigningConfig::expires_in(PRESIGN_TTL).unwrap())
            .await
            .map_err(|e| e.to_string())?;

        Ok(signed.uri().to_string())
    }

    /// Path-style URL under the configured endpoint. The uploaded prefixes
    /// are publicly readable so these URLs can sit in KYC records and course
    /// content without further signing.
    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket_name, key)
    }
}

/// sanitize_key
///
/// Strips `.`, `..`, and empty segments from a user-influenced key so a
/// crafted filename cannot escape its upload prefix.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockStorageService
///
/// In-memory stand-in for tests. Returns deterministic local-style URLs so
/// upload-flow assertions do not need a running store; `should_fail` turns
/// every signing request into an error for failure-path tests.
#[derive(Clone)]
pub struct MockStorageService {
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for MockStorageService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        _content_type: &str,
    ) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Storage Error: Simulation requested".to_string());
        }

        Ok(format!(
            "http://localhost:9000/mock-bucket/{}?signature=fake",
            sanitize_key(key)
        ))
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://localhost:9000/mock-bucket/{}", sanitize_key(key))
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;
