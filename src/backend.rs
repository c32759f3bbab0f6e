use crate::models::{
    Booking, Content, Course, CourseModule, CourseStatus, CreateContentRequest,
    CreateCourseRequest, CreateModuleRequest, Identity, KycRecord, KycReviewRequest, KycState,
    KycStatus, KycSubmission, LiveClass, LiveClassRequest, Mentor, PlatformStats, PortalUser,
    PurchaseKind, PurchasePhase, PurchaseStatus, PurchasedCourse, Role, UpdateContentRequest,
    UpdateCourseRequest, UpdateModuleRequest,
};
use crate::rental;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// ApiError
///
/// The failure shapes a remote call can surface. The portal has no retry or
/// backoff policy: every variant is mapped to a status code at the call site
/// and rendered as plain text to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend reported 404 for the entity.
    NotFound,
    /// The backend rejected the request as a conflict (e.g., double booking).
    Conflict(String),
    /// The backend rejected the request as invalid (other 4xx).
    Rejected(String),
    /// The backend could not be reached or answered 5xx.
    Unavailable(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "not found"),
            ApiError::Conflict(msg) => write!(f, "conflict: {}", msg),
            ApiError::Rejected(msg) => write!(f, "rejected: {}", msg),
            ApiError::Unavailable(msg) => write!(f, "backend unavailable: {}", msg),
        }
    }
}

/// BackendApi Trait
///
/// Defines the abstract contract for every call the portal makes to the
/// remote backend API that owns the durable entities. This mirrors the
/// Repository Abstraction pattern: handlers interact with the data tier
/// through this trait without knowing whether it is the real HTTP client
/// (HttpBackendApi) or the in-memory Mock (MockBackendApi) used in tests.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn BackendApi>`) safely shareable across Axum's task boundaries.
#[async_trait]
pub trait BackendApi: Send + Sync {
    // --- Profiles ---
    // Resolves the backend profile for a provider auth user id. This is the
    // second half of identity resolution; a NotFound here while the provider
    // session is valid is the fatal half-authenticated state.
    async fn get_profile(&self, provider_user_id: Uuid) -> Result<Identity, ApiError>;
    // Creates the mirroring profile record after external sign-up success.
    async fn create_profile(&self, identity: Identity) -> Result<Identity, ApiError>;

    // --- Catalog ---
    async fn list_courses(
        &self,
        status: Option<CourseStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Course>, ApiError>;
    // Newest published courses, for the landing-page rail.
    async fn recent_courses(&self, limit: usize) -> Result<Vec<Course>, ApiError>;
    async fn get_course(&self, id: Uuid) -> Result<Course, ApiError>;

    // --- Course Authoring ---
    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course, ApiError>;
    async fn update_course(&self, id: Uuid, req: UpdateCourseRequest) -> Result<Course, ApiError>;
    async fn delete_course(&self, id: Uuid) -> Result<(), ApiError>;
    async fn publish_course(&self, id: Uuid) -> Result<Course, ApiError>;
    async fn add_module(
        &self,
        course_id: Uuid,
        req: CreateModuleRequest,
    ) -> Result<CourseModule, ApiError>;
    async fn update_module(
        &self,
        id: Uuid,
        req: UpdateModuleRequest,
    ) -> Result<CourseModule, ApiError>;
    async fn delete_module(&self, id: Uuid) -> Result<(), ApiError>;
    async fn add_content(
        &self,
        module_id: Uuid,
        req: CreateContentRequest,
    ) -> Result<Content, ApiError>;
    async fn update_content(
        &self,
        id: Uuid,
        req: UpdateContentRequest,
    ) -> Result<Content, ApiError>;
    async fn delete_content(&self, id: Uuid) -> Result<(), ApiError>;

    // --- Purchases & Rentals ---
    async fn purchase_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        kind: PurchaseKind,
    ) -> Result<PurchaseStatus, ApiError>;
    async fn start_rental(&self, user_id: Uuid, course_id: Uuid)
    -> Result<PurchaseStatus, ApiError>;
    // None when the user never purchased the course.
    async fn purchase_status(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<PurchaseStatus>, ApiError>;
    async fn my_purchases(&self, user_id: Uuid) -> Result<Vec<PurchasedCourse>, ApiError>;

    // --- Live Classes ---
    async fn list_live_classes(&self) -> Result<Vec<LiveClass>, ApiError>;
    async fn all_live_classes(&self) -> Result<Vec<LiveClass>, ApiError>;
    async fn create_live_class(&self, req: LiveClassRequest) -> Result<LiveClass, ApiError>;
    async fn update_live_class(
        &self,
        id: Uuid,
        req: LiveClassRequest,
    ) -> Result<LiveClass, ApiError>;
    async fn delete_live_class(&self, id: Uuid) -> Result<(), ApiError>;
    async fn book_live_class(&self, user_id: Uuid, class_id: Uuid) -> Result<Booking, ApiError>;
    async fn my_bookings(&self, user_id: Uuid) -> Result<Vec<Booking>, ApiError>;
    async fn list_mentors(&self) -> Result<Vec<Mentor>, ApiError>;

    // --- KYC ---
    async fn kyc_status(&self, user_id: Uuid) -> Result<KycStatus, ApiError>;
    async fn submit_kyc(&self, user_id: Uuid, sub: KycSubmission) -> Result<KycStatus, ApiError>;
    async fn pending_kyc(&self) -> Result<Vec<KycRecord>, ApiError>;
    async fn review_kyc(&self, id: Uuid, req: KycReviewRequest) -> Result<KycRecord, ApiError>;

    // --- Oversight ---
    async fn list_users(&self) -> Result<Vec<PortalUser>, ApiError>;
    async fn platform_stats(&self) -> Result<PlatformStats, ApiError>;
}

/// BackendState
///
/// The concrete type used to share the backend client across the application state.
pub type BackendState = Arc<dyn BackendApi>;

// --- HTTP Implementation ---

/// HttpBackendApi
///
/// The concrete implementation of `BackendApi` over the remote backend's HTTP
/// surface. The portal authenticates to the backend as a trusted service; all
/// user scoping travels as explicit path/query parameters.
#[derive(Clone)]
pub struct HttpBackendApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackendApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Maps the HTTP outcome onto ApiError and decodes the success body.
    async fn decode<T: DeserializeOwned>(
        resp: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, ApiError> {
        let resp = resp.map_err(|e| ApiError::Unavailable(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<T>()
                .await
                .map_err(|e| ApiError::Unavailable(e.to_string()));
        }
        let body = resp.text().await.unwrap_or_default();
        match status.as_u16() {
            404 => Err(ApiError::NotFound),
            409 => Err(ApiError::Conflict(body)),
            400..=499 => Err(ApiError::Rejected(body)),
            _ => Err(ApiError::Unavailable(format!("{}: {}", status, body))),
        }
    }

    // Success-with-no-body variant for DELETE endpoints.
    async fn expect_ok(resp: Result<reqwest::Response, reqwest::Error>) -> Result<(), ApiError> {
        let resp = resp.map_err(|e| ApiError::Unavailable(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        match status.as_u16() {
            404 => Err(ApiError::NotFound),
            409 => Err(ApiError::Conflict(body)),
            400..=499 => Err(ApiError::Rejected(body)),
            _ => Err(ApiError::Unavailable(format!("{}: {}", status, body))),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        Self::decode(self.client.get(self.url(path)).send().await).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        Self::decode(self.client.post(self.url(path)).json(body).send().await).await
    }

    async fn patch_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        Self::decode(self.client.patch(self.url(path)).json(body).send().await).await
    }

    async fn put_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        Self::decode(self.client.put(self.url(path)).json(body).send().await).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        Self::expect_ok(self.client.delete(self.url(path)).send().await).await
    }
}

#[async_trait]
impl BackendApi for HttpBackendApi {
    async fn get_profile(&self, provider_user_id: Uuid) -> Result<Identity, ApiError> {
        self.get_json(&format!("/api/users/supabase/{}", provider_user_id))
            .await
    }

    async fn create_profile(&self, identity: Identity) -> Result<Identity, ApiError> {
        self.post_json("/api/users", &identity).await
    }

    async fn list_courses(
        &self,
        status: Option<CourseStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Course>, ApiError> {
        let mut query = Vec::new();
        if let Some(s) = status {
            // CourseStatus serializes to its UPPERCASE wire name.
            query.push(format!(
                "status={}",
                serde_json::to_value(s)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default()
            ));
        }
        if let Some(l) = limit {
            query.push(format!("limit={}", l));
        }
        let path = if query.is_empty() {
            "/api/courses".to_string()
        } else {
            format!("/api/courses?{}", query.join("&"))
        };
        self.get_json(&path).await
    }

    async fn recent_courses(&self, limit: usize) -> Result<Vec<Course>, ApiError> {
        self.get_json(&format!("/api/courses/recent?limit={}", limit))
            .await
    }

    async fn get_course(&self, id: Uuid) -> Result<Course, ApiError> {
        self.get_json(&format!("/api/courses/{}", id)).await
    }

    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course, ApiError> {
        self.post_json("/api/courses", &req).await
    }

    async fn update_course(&self, id: Uuid, req: UpdateCourseRequest) -> Result<Course, ApiError> {
        self.patch_json(&format!("/api/courses/{}", id), &req).await
    }

    async fn delete_course(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/api/courses/{}", id)).await
    }

    async fn publish_course(&self, id: Uuid) -> Result<Course, ApiError> {
        self.post_json(&format!("/api/courses/{}/publish", id), &serde_json::json!({}))
            .await
    }

    async fn add_module(
        &self,
        course_id: Uuid,
        req: CreateModuleRequest,
    ) -> Result<CourseModule, ApiError> {
        self.post_json(&format!("/api/courses/{}/modules", course_id), &req)
            .await
    }

    async fn update_module(
        &self,
        id: Uuid,
        req: UpdateModuleRequest,
    ) -> Result<CourseModule, ApiError> {
        self.patch_json(&format!("/api/courses/modules/{}", id), &req)
            .await
    }

    async fn delete_module(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/api/courses/modules/{}", id)).await
    }

    async fn add_content(
        &self,
        module_id: Uuid,
        req: CreateContentRequest,
    ) -> Result<Content, ApiError> {
        self.post_json(&format!("/api/courses/modules/{}/content", module_id), &req)
            .await
    }

    async fn update_content(
        &self,
        id: Uuid,
        req: UpdateContentRequest,
    ) -> Result<Content, ApiError> {
        self.patch_json(&format!("/api/courses/content/{}", id), &req)
            .await
    }

    async fn delete_content(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/api/courses/content/{}", id)).await
    }

    async fn purchase_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        kind: PurchaseKind,
    ) -> Result<PurchaseStatus, ApiError> {
        self.post_json(
            &format!("/api/purchase/{}/purchase?user={}", course_id, user_id),
            &serde_json::json!({ "type": kind }),
        )
        .await
    }

    async fn start_rental(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<PurchaseStatus, ApiError> {
        self.post_json(
            &format!("/api/purchase/{}/start-rental?user={}", course_id, user_id),
            &serde_json::json!({}),
        )
        .await
    }

    async fn purchase_status(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<PurchaseStatus>, ApiError> {
        match self
            .get_json(&format!(
                "/api/purchase/{}/purchase-status?user={}",
                course_id, user_id
            ))
            .await
        {
            Ok(status) => Ok(Some(status)),
            // Never purchased: the portal renders the buy/rent sidebar.
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn my_purchases(&self, user_id: Uuid) -> Result<Vec<PurchasedCourse>, ApiError> {
        self.get_json(&format!("/api/purchase/mine?user={}", user_id))
            .await
    }

    async fn list_live_classes(&self) -> Result<Vec<LiveClass>, ApiError> {
        self.get_json("/api/live-classes").await
    }

    async fn all_live_classes(&self) -> Result<Vec<LiveClass>, ApiError> {
        self.get_json("/api/admin/live-classes").await
    }

    async fn create_live_class(&self, req: LiveClassRequest) -> Result<LiveClass, ApiError> {
        self.post_json("/api/admin/live-classes", &req).await
    }

    async fn update_live_class(
        &self,
        id: Uuid,
        req: LiveClassRequest,
    ) -> Result<LiveClass, ApiError> {
        self.put_json(&format!("/api/admin/live-classes/{}", id), &req)
            .await
    }

    async fn delete_live_class(&self, id: Uuid) -> Result<(), ApiError> {
        self.delete(&format!("/api/admin/live-classes/{}", id)).await
    }

    async fn book_live_class(&self, user_id: Uuid, class_id: Uuid) -> Result<Booking, ApiError> {
        self.post_json(
            &format!("/api/live-classes/{}/book?user={}", class_id, user_id),
            &serde_json::json!({}),
        )
        .await
    }

    async fn my_bookings(&self, user_id: Uuid) -> Result<Vec<Booking>, ApiError> {
        self.get_json(&format!("/api/live-classes/my/bookings?user={}", user_id))
            .await
    }

    async fn list_mentors(&self) -> Result<Vec<Mentor>, ApiError> {
        self.get_json("/api/mentors").await
    }

    async fn kyc_status(&self, user_id: Uuid) -> Result<KycStatus, ApiError> {
        self.get_json(&format!("/api/kyc/status?user={}", user_id))
            .await
    }

    async fn submit_kyc(&self, user_id: Uuid, sub: KycSubmission) -> Result<KycStatus, ApiError> {
        self.post_json(&format!("/api/kyc/submit?user={}", user_id), &sub)
            .await
    }

    async fn pending_kyc(&self) -> Result<Vec<KycRecord>, ApiError> {
        self.get_json("/api/admin/kyc/pending").await
    }

    async fn review_kyc(&self, id: Uuid, req: KycReviewRequest) -> Result<KycRecord, ApiError> {
        self.post_json(&format!("/api/admin/kyc/{}/review", id), &req)
            .await
    }

    async fn list_users(&self) -> Result<Vec<PortalUser>, ApiError> {
        self.get_json("/api/users").await
    }

    async fn platform_stats(&self) -> Result<PlatformStats, ApiError> {
        self.get_json("/api/admin/stats").await
    }
}

// --- Mock Implementation (For Tests) ---

#[derive(Debug, Clone)]
struct PurchaseRec {
    kind: PurchaseKind,
    purchased_at: chrono::DateTime<Utc>,
    rental_start: Option<chrono::DateTime<Utc>>,
    rental_end: Option<chrono::DateTime<Utc>>,
}

#[derive(Default)]
struct MockDb {
    profiles: HashMap<Uuid, Identity>,
    courses: HashMap<Uuid, Course>,
    purchases: HashMap<(Uuid, Uuid), PurchaseRec>,
    classes: HashMap<Uuid, LiveClass>,
    bookings: Vec<(Uuid, Booking)>,
    kyc: HashMap<Uuid, KycRecord>,
}

/// MockBackendApi
///
/// An in-memory implementation of `BackendApi` used exclusively for unit and
/// integration testing. It carries just enough behavior for realistic flows:
/// the rental state machine (30-day activation, 48-hour window), seat
/// accounting on bookings, and the KYC review lifecycle. `fail_profiles`
/// simulates a reachable provider with a missing backend profile, the
/// condition that must force a sign-out.
#[derive(Clone, Default)]
pub struct MockBackendApi {
    db: Arc<RwLock<MockDb>>,
    /// When true, every profile fetch fails as unavailable.
    pub fail_profiles: Arc<std::sync::atomic::AtomicBool>,
}

impl MockBackendApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_profiles(&self, fail: bool) {
        self.fail_profiles
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Seeds a backend profile, returning the seeded identity.
    pub async fn seed_profile(&self, id: Uuid, role: Role, email: &str) -> Identity {
        let identity = Identity {
            id,
            role,
            email: email.to_string(),
            full_name: None,
            avatar_url: None,
        };
        self.db
            .write()
            .await
            .profiles
            .insert(id, identity.clone());
        identity
    }

    /// Seeds a minimal published course and returns it.
    pub async fn seed_course(&self, title: &str, price_rent: Option<i64>) -> Course {
        let course = Course {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "seeded".to_string(),
            level: "Beginner".to_string(),
            status: CourseStatus::Published,
            price_buy: 99_900,
            price_rent,
            duration: Some(10),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            ..Course::default()
        };
        self.db
            .write()
            .await
            .courses
            .insert(course.id, course.clone());
        course
    }

    // Projects the stored purchase record into the wire status at `now`.
    fn project_status(rec: &PurchaseRec, now: chrono::DateTime<Utc>) -> PurchaseStatus {
        match rec.kind {
            PurchaseKind::Buy => PurchaseStatus {
                kind: PurchaseKind::Buy,
                status: PurchasePhase::Owned,
                rental_start: None,
                rental_end: None,
                can_access: true,
                expiry: None,
            },
            PurchaseKind::Rent => match (rec.rental_start, rec.rental_end) {
                (Some(start), Some(end)) => {
                    let active = now < end;
                    PurchaseStatus {
                        kind: PurchaseKind::Rent,
                        status: if active {
                            PurchasePhase::Active
                        } else {
                            PurchasePhase::Expired
                        },
                        rental_start: Some(start),
                        rental_end: Some(end),
                        can_access: active,
                        expiry: Some(end),
                    }
                }
                _ => {
                    let deadline = rec.purchased_at + rental::activation_deadline();
                    let lapsed = now >= deadline;
                    PurchaseStatus {
                        kind: PurchaseKind::Rent,
                        status: if lapsed {
                            PurchasePhase::Expired
                        } else {
                            PurchasePhase::NotStarted
                        },
                        rental_start: None,
                        rental_end: None,
                        can_access: false,
                        expiry: Some(deadline),
                    }
                }
            },
        }
    }
}

#[async_trait]
impl BackendApi for MockBackendApi {
    async fn get_profile(&self, provider_user_id: Uuid) -> Result<Identity, ApiError> {
        if self.fail_profiles.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(ApiError::Unavailable("profile service down".to_string()));
        }
        self.db
            .read()
            .await
            .profiles
            .get(&provider_user_id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_profile(&self, identity: Identity) -> Result<Identity, ApiError> {
        self.db
            .write()
            .await
            .profiles
            .insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn list_courses(
        &self,
        status: Option<CourseStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Course>, ApiError> {
        let db = self.db.read().await;
        let mut courses: Vec<Course> = db
            .courses
            .values()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(l) = limit {
            courses.truncate(l);
        }
        Ok(courses)
    }

    async fn recent_courses(&self, limit: usize) -> Result<Vec<Course>, ApiError> {
        // list_courses already orders newest-first.
        self.list_courses(Some(CourseStatus::Published), Some(limit))
            .await
    }

    async fn get_course(&self, id: Uuid) -> Result<Course, ApiError> {
        self.db
            .read()
            .await
            .courses
            .get(&id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course, ApiError> {
        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            title: req.title,
            description: req.description,
            level: req.level,
            status: CourseStatus::Draft,
            price_buy: req.price_buy,
            price_rent: req.price_rent,
            duration: req.duration,
            tags: req.tags,
            prerequisites: req.prerequisites,
            thumbnail: None,
            modules: vec![],
            created_at: now,
            updated_at: now,
        };
        self.db
            .write()
            .await
            .courses
            .insert(course.id, course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: Uuid, req: UpdateCourseRequest) -> Result<Course, ApiError> {
        let mut db = self.db.write().await;
        let course = db.courses.get_mut(&id).ok_or(ApiError::NotFound)?;
        if let Some(v) = req.title {
            course.title = v;
        }
        if let Some(v) = req.description {
            course.description = v;
        }
        if let Some(v) = req.level {
            course.level = v;
        }
        if let Some(v) = req.status {
            course.status = v;
        }
        if let Some(v) = req.price_buy {
            course.price_buy = v;
        }
        if let Some(v) = req.price_rent {
            course.price_rent = Some(v);
        }
        if let Some(v) = req.duration {
            course.duration = Some(v);
        }
        if let Some(v) = req.tags {
            course.tags = v;
        }
        if let Some(v) = req.prerequisites {
            course.prerequisites = v;
        }
        if let Some(v) = req.thumbnail {
            course.thumbnail = Some(v);
        }
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    async fn delete_course(&self, id: Uuid) -> Result<(), ApiError> {
        self.db
            .write()
            .await
            .courses
            .remove(&id)
            .map(|_| ())
            .ok_or(ApiError::NotFound)
    }

    async fn publish_course(&self, id: Uuid) -> Result<Course, ApiError> {
        let mut db = self.db.write().await;
        let course = db.courses.get_mut(&id).ok_or(ApiError::NotFound)?;
        course.status = CourseStatus::Published;
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    async fn add_module(
        &self,
        course_id: Uuid,
        req: CreateModuleRequest,
    ) -> Result<CourseModule, ApiError> {
        let mut db = self.db.write().await;
        let course = db.courses.get_mut(&course_id).ok_or(ApiError::NotFound)?;
        let module = CourseModule {
            id: Uuid::new_v4(),
            course_id,
            title: req.title,
            description: req.description,
            order: req.order,
            contents: vec![],
        };
        course.modules.push(module.clone());
        Ok(module)
    }

    async fn update_module(
        &self,
        id: Uuid,
        req: UpdateModuleRequest,
    ) -> Result<CourseModule, ApiError> {
        let mut db = self.db.write().await;
        for course in db.courses.values_mut() {
            if let Some(module) = course.modules.iter_mut().find(|m| m.id == id) {
                if let Some(v) = req.title {
                    module.title = v;
                }
                if let Some(v) = req.description {
                    module.description = v;
                }
                if let Some(v) = req.order {
                    module.order = v;
                }
                return Ok(module.clone());
            }
        }
        Err(ApiError::NotFound)
    }

    async fn delete_module(&self, id: Uuid) -> Result<(), ApiError> {
        let mut db = self.db.write().await;
        for course in db.courses.values_mut() {
            let before = course.modules.len();
            course.modules.retain(|m| m.id != id);
            if course.modules.len() != before {
                return Ok(());
            }
        }
        Err(ApiError::NotFound)
    }

    async fn add_content(
        &self,
        module_id: Uuid,
        req: CreateContentRequest,
    ) -> Result<Content, ApiError> {
        let mut db = self.db.write().await;
        for course in db.courses.values_mut() {
            if let Some(module) = course.modules.iter_mut().find(|m| m.id == module_id) {
                let content = Content {
                    id: Uuid::new_v4(),
                    title: req.title,
                    content_type: req.content_type,
                    url: req.url,
                    duration: req.duration,
                    order: req.order,
                };
                module.contents.push(content.clone());
                return Ok(content);
            }
        }
        Err(ApiError::NotFound)
    }

    async fn update_content(
        &self,
        id: Uuid,
        req: UpdateContentRequest,
    ) -> Result<Content, ApiError> {
        let mut db = self.db.write().await;
        for course in db.courses.values_mut() {
            for module in course.modules.iter_mut() {
                if let Some(content) = module.contents.iter_mut().find(|c| c.id == id) {
                    if let Some(v) = req.title {
                        content.title = v;
                    }
                    if let Some(v) = req.url {
                        content.url = Some(v);
                    }
                    if let Some(v) = req.duration {
                        content.duration = Some(v);
                    }
                    if let Some(v) = req.order {
                        content.order = v;
                    }
                    return Ok(content.clone());
                }
            }
        }
        Err(ApiError::NotFound)
    }

    async fn delete_content(&self, id: Uuid) -> Result<(), ApiError> {
        let mut db = self.db.write().await;
        for course in db.courses.values_mut() {
            for module in course.modules.iter_mut() {
                let before = module.contents.len();
                module.contents.retain(|c| c.id != id);
                if module.contents.len() != before {
                    return Ok(());
                }
            }
        }
        Err(ApiError::NotFound)
    }

    async fn purchase_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        kind: PurchaseKind,
    ) -> Result<PurchaseStatus, ApiError> {
        let mut db = self.db.write().await;
        if !db.courses.contains_key(&course_id) {
            return Err(ApiError::NotFound);
        }
        if db.purchases.contains_key(&(user_id, course_id)) {
            return Err(ApiError::Conflict("already purchased".to_string()));
        }
        let rec = PurchaseRec {
            kind,
            purchased_at: Utc::now(),
            rental_start: None,
            rental_end: None,
        };
        let status = Self::project_status(&rec, Utc::now());
        db.purchases.insert((user_id, course_id), rec);
        Ok(status)
    }

    async fn start_rental(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<PurchaseStatus, ApiError> {
        let mut db = self.db.write().await;
        let rec = db
            .purchases
            .get_mut(&(user_id, course_id))
            .ok_or(ApiError::NotFound)?;
        if rec.kind != PurchaseKind::Rent {
            return Err(ApiError::Rejected("not a rental".to_string()));
        }
        if rec.rental_start.is_some() {
            return Err(ApiError::Conflict("rental already started".to_string()));
        }
        let now = Utc::now();
        if now >= rec.purchased_at + rental::activation_deadline() {
            return Err(ApiError::Rejected("activation window lapsed".to_string()));
        }
        rec.rental_start = Some(now);
        rec.rental_end = Some(now + rental::viewing_window());
        Ok(Self::project_status(rec, now))
    }

    async fn purchase_status(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<PurchaseStatus>, ApiError> {
        Ok(self
            .db
            .read()
            .await
            .purchases
            .get(&(user_id, course_id))
            .map(|rec| Self::project_status(rec, Utc::now())))
    }

    async fn my_purchases(&self, user_id: Uuid) -> Result<Vec<PurchasedCourse>, ApiError> {
        let db = self.db.read().await;
        let now = Utc::now();
        Ok(db
            .purchases
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .filter_map(|((_, course_id), rec)| {
                db.courses.get(course_id).map(|course| PurchasedCourse {
                    course: course.clone(),
                    status: Self::project_status(rec, now),
                    countdown: None,
                })
            })
            .collect())
    }

    async fn list_live_classes(&self) -> Result<Vec<LiveClass>, ApiError> {
        let db = self.db.read().await;
        let now = Utc::now();
        let mut upcoming: Vec<LiveClass> = db
            .classes
            .values()
            .filter(|c| c.date_time > now)
            .cloned()
            .collect();
        upcoming.sort_by_key(|c| c.date_time);
        Ok(upcoming)
    }

    async fn all_live_classes(&self) -> Result<Vec<LiveClass>, ApiError> {
        Ok(self.db.read().await.classes.values().cloned().collect())
    }

    async fn create_live_class(&self, req: LiveClassRequest) -> Result<LiveClass, ApiError> {
        let class = LiveClass {
            id: Uuid::new_v4(),
            title: req.title,
            description: req.description,
            instructor_id: req.instructor_id,
            instructor: None,
            date_time: req.date_time,
            duration_minutes: req.duration_minutes,
            max_capacity: req.max_capacity,
            remaining_seats: req.max_capacity,
            price_standard: req.price_standard,
            price_early_bird: req.price_early_bird,
            early_bird_start: req.early_bird_start,
            early_bird_end: req.early_bird_end,
            bundle_eligible: req.bundle_eligible,
            bundle_offer_enabled: req.bundle_offer_enabled,
            platform: req.platform,
            zoom_link: req.zoom_link,
        };
        self.db
            .write()
            .await
            .classes
            .insert(class.id, class.clone());
        Ok(class)
    }

    async fn update_live_class(
        &self,
        id: Uuid,
        req: LiveClassRequest,
    ) -> Result<LiveClass, ApiError> {
        let mut db = self.db.write().await;
        let class = db.classes.get_mut(&id).ok_or(ApiError::NotFound)?;
        let booked = class.max_capacity - class.remaining_seats;
        class.title = req.title;
        class.description = req.description;
        class.instructor_id = req.instructor_id;
        class.date_time = req.date_time;
        class.duration_minutes = req.duration_minutes;
        class.max_capacity = req.max_capacity;
        class.remaining_seats = (req.max_capacity - booked).max(0);
        class.price_standard = req.price_standard;
        class.price_early_bird = req.price_early_bird;
        class.early_bird_start = req.early_bird_start;
        class.early_bird_end = req.early_bird_end;
        class.bundle_eligible = req.bundle_eligible;
        class.bundle_offer_enabled = req.bundle_offer_enabled;
        class.platform = req.platform;
        class.zoom_link = req.zoom_link;
        Ok(class.clone())
    }

    async fn delete_live_class(&self, id: Uuid) -> Result<(), ApiError> {
        self.db
            .write()
            .await
            .classes
            .remove(&id)
            .map(|_| ())
            .ok_or(ApiError::NotFound)
    }

    async fn book_live_class(&self, user_id: Uuid, class_id: Uuid) -> Result<Booking, ApiError> {
        let mut db = self.db.write().await;
        let already = db
            .bookings
            .iter()
            .any(|(uid, b)| *uid == user_id && b.live_class_id == class_id);
        if already {
            return Err(ApiError::Conflict("already booked".to_string()));
        }
        let class = db.classes.get_mut(&class_id).ok_or(ApiError::NotFound)?;
        if class.remaining_seats <= 0 {
            return Err(ApiError::Conflict("class is full".to_string()));
        }
        class.remaining_seats -= 1;
        let booking = Booking {
            id: Uuid::new_v4(),
            live_class_id: class_id,
            class_title: class.title.clone(),
            date_time: class.date_time,
            platform: class.platform,
            join_link: class.zoom_link.clone(),
        };
        db.bookings.push((user_id, booking.clone()));
        Ok(booking)
    }

    async fn my_bookings(&self, user_id: Uuid) -> Result<Vec<Booking>, ApiError> {
        Ok(self
            .db
            .read()
            .await
            .bookings
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, b)| b.clone())
            .collect())
    }

    async fn list_mentors(&self) -> Result<Vec<Mentor>, ApiError> {
        Ok(self
            .db
            .read()
            .await
            .profiles
            .values()
            .filter(|p| p.role == Role::Mentor)
            .map(|p| Mentor {
                id: p.id,
                full_name: p.full_name.clone().unwrap_or_else(|| p.email.clone()),
                avatar_url: p.avatar_url.clone(),
            })
            .collect())
    }

    async fn kyc_status(&self, user_id: Uuid) -> Result<KycStatus, ApiError> {
        // The latest submission is the user's standing; earlier rejected
        // records stay behind it for the audit trail.
        Ok(self
            .db
            .read()
            .await
            .kyc
            .values()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.submitted_at)
            .map(|r| KycStatus {
                status: r.status,
                feedback: r.feedback.clone(),
            })
            .unwrap_or_default())
    }

    async fn submit_kyc(&self, user_id: Uuid, sub: KycSubmission) -> Result<KycStatus, ApiError> {
        let mut db = self.db.write().await;
        let pending_exists = db
            .kyc
            .values()
            .any(|r| r.user_id == user_id && r.status == KycState::Pending);
        if pending_exists {
            return Err(ApiError::Conflict("submission already pending".to_string()));
        }
        let email = db
            .profiles
            .get(&user_id)
            .map(|p| p.email.clone())
            .unwrap_or_default();
        let record = KycRecord {
            id: Uuid::new_v4(),
            user_id,
            email,
            aadhar_number: sub.aadhar_number,
            pan_number: sub.pan_number,
            kyc_docs: sub.kyc_docs,
            status: KycState::Pending,
            feedback: None,
            submitted_at: Utc::now(),
        };
        db.kyc.insert(record.id, record);
        Ok(KycStatus {
            status: KycState::Pending,
            feedback: None,
        })
    }

    async fn pending_kyc(&self) -> Result<Vec<KycRecord>, ApiError> {
        Ok(self
            .db
            .read()
            .await
            .kyc
            .values()
            .filter(|r| r.status == KycState::Pending)
            .cloned()
            .collect())
    }

    async fn review_kyc(&self, id: Uuid, req: KycReviewRequest) -> Result<KycRecord, ApiError> {
        let mut db = self.db.write().await;
        let record = db.kyc.get_mut(&id).ok_or(ApiError::NotFound)?;
        record.status = if req.approve {
            KycState::Approved
        } else {
            KycState::Rejected
        };
        record.feedback = req.feedback;
        Ok(record.clone())
    }

    async fn list_users(&self) -> Result<Vec<PortalUser>, ApiError> {
        let db = self.db.read().await;
        Ok(db
            .profiles
            .values()
            .map(|p| {
                let kyc_status = db
                    .kyc
                    .values()
                    .find(|r| r.user_id == p.id)
                    .map(|r| r.status)
                    .unwrap_or_default();
                PortalUser {
                    id: p.id,
                    email: p.email.clone(),
                    role: p.role,
                    full_name: p.full_name.clone(),
                    kyc_status,
                }
            })
            .collect())
    }

    async fn platform_stats(&self) -> Result<PlatformStats, ApiError> {
        let db = self.db.read().await;
        Ok(PlatformStats {
            total_courses: db.courses.len() as i64,
            total_users: db.profiles.len() as i64,
            total_bookings: db.bookings.len() as i64,
            pending_kyc: db
                .kyc
                .values()
                .filter(|r| r.status == KycState::Pending)
                .count() as i64,
        })
    }
}
