use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Identity & Roles ---

/// Role
///
/// The closed set of roles known to the platform. Every access decision in the
/// portal is an exhaustive match on this enum; there is no string-typed role
/// anywhere past the deserialization boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default,
)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum Role {
    Admin,
    Mentor,
    #[default]
    Student,
}

/// Identity
///
/// The authenticated user's profile as known to this portal: the backend
/// profile record resolved after validating the provider session token.
/// Cached in the process-wide session cache for the lifetime of the session;
/// invalidated on sign-out or profile-fetch failure.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Identity {
    // Primary key, mirrors the provider's auth user id.
    pub id: Uuid,
    // The RBAC field, driving the Session/Role Gate.
    pub role: Role,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

// --- Courses ---

/// CourseStatus
///
/// Publication lifecycle of a course. Only `Published` courses are visible in
/// the public catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default,
)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// Content
///
/// A single content item (video, article, quiz) inside a course module.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Content {
    pub id: Uuid,
    pub title: String,
    /// Content kind as the backend reports it ("VIDEO", "ARTICLE", ...).
    /// 'type' is a reserved keyword in Rust, so we rename it for internal use.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Public URL of the stored media, when already uploaded.
    pub url: Option<String>,
    /// Duration in minutes, for video content.
    pub duration: Option<i32>,
    pub order: i32,
}

/// CourseModule
///
/// An ordered section of a course, holding ordered content items.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CourseModule {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub order: i32,
    #[serde(default)]
    pub contents: Vec<Content>,
}

/// Course
///
/// The catalog entity. Prices are integer minor units (paise); `price_rent`
/// is absent when the course is not rentable.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Free-form difficulty label ("Beginner", "Intermediate", "Advanced").
    pub level: String,
    pub status: CourseStatus,
    pub price_buy: i64,
    pub price_rent: Option<i64>,
    /// Advertised total duration in hours.
    pub duration: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub modules: Vec<CourseModule>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Course Authoring Payloads ---

/// CreateCourseRequest
///
/// Input payload for authoring a new course (POST /admin/courses). New courses
/// always start in `Draft` status; publication is a separate action.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub level: String,
    pub price_buy: i64,
    pub price_rent: Option<i64>,
    pub duration: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

/// UpdateCourseRequest
///
/// Partial update payload for modifying an existing course (PATCH /admin/courses/{id}).
///
/// *Optimization*: Uses `Option<T>` for all fields and `#[serde(skip_serializing_if = "Option::is_none")]`
/// to efficiently handle partial updates, ensuring only provided fields are included in the JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateCourseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_buy: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_rent: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// CreateModuleRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateModuleRequest {
    pub title: String,
    pub description: String,
    pub order: i32,
}

/// UpdateModuleRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateModuleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// CreateContentRequest
///
/// The media URL is provided here after the client completes the
/// direct-to-cloud upload via the presigned URL flow.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateContentRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub url: Option<String>,
    pub duration: Option<i32>,
    pub order: i32,
}

/// UpdateContentRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

// --- Purchases & Rentals ---

/// PurchaseKind
///
/// `Buy` grants lifetime access; `Rent` grants a time-boxed access window
/// tracked by the backend (48-hour viewing, started within 30 days).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default,
)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum PurchaseKind {
    #[default]
    Buy,
    Rent,
}

/// PurchasePhase
///
/// Where a purchase currently stands. `Owned` is terminal for buys;
/// rentals move `NotStarted` -> `Active` -> `Expired`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PurchasePhase {
    #[default]
    Owned,
    NotStarted,
    Active,
    Expired,
}

/// PurchaseRequest
///
/// Input payload for POST /courses/{id}/purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PurchaseRequest {
    #[serde(rename = "type")]
    pub kind: PurchaseKind,
}

/// PurchaseStatus
///
/// The access picture for one user and one course, as reported by the backend.
/// `expiry` is the instant the countdown renders against: the rental end when
/// active, or the activation deadline when the rental has not been started.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseStatus {
    #[serde(rename = "type")]
    pub kind: PurchaseKind,
    pub status: PurchasePhase,
    #[ts(type = "string | null")]
    pub rental_start: Option<DateTime<Utc>>,
    #[ts(type = "string | null")]
    pub rental_end: Option<DateTime<Utc>>,
    pub can_access: bool,
    #[ts(type = "string | null")]
    pub expiry: Option<DateTime<Utc>>,
}

/// PurchasedCourse
///
/// Dashboard listing entry: the course joined with the caller's purchase
/// status, annotated with a pre-rendered countdown string for rentals.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchasedCourse {
    pub course: Course,
    pub status: PurchaseStatus,
    /// "{h}h {m}m {s}s" until rental expiry, or "Expired". Absent for buys.
    pub countdown: Option<String>,
}

// --- Live Classes ---

/// ClassPlatform
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ClassPlatform {
    #[default]
    Zoom,
    GoogleMeet,
}

/// Mentor
///
/// The instructor summary shown on live class cards and in the authoring form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Mentor {
    pub id: Uuid,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

/// LiveClass
///
/// A scheduled instructor-led session with capacity and early-bird pricing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LiveClass {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub instructor_id: Uuid,
    pub instructor: Option<Mentor>,
    #[ts(type = "string")]
    pub date_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub max_capacity: i32,
    pub remaining_seats: i32,
    pub price_standard: i64,
    pub price_early_bird: i64,
    #[ts(type = "string")]
    pub early_bird_start: DateTime<Utc>,
    #[ts(type = "string")]
    pub early_bird_end: DateTime<Utc>,
    pub bundle_eligible: bool,
    pub bundle_offer_enabled: bool,
    pub platform: ClassPlatform,
    pub zoom_link: Option<String>,
}

/// LiveClassRequest
///
/// Shared payload for creating (POST) and replacing (PUT) a live class in the
/// admin authoring flow. The seat counter is derived, never submitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LiveClassRequest {
    pub title: String,
    pub description: String,
    pub instructor_id: Uuid,
    #[ts(type = "string")]
    pub date_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub max_capacity: i32,
    pub price_standard: i64,
    pub price_early_bird: i64,
    #[ts(type = "string")]
    pub early_bird_start: DateTime<Utc>,
    #[ts(type = "string")]
    pub early_bird_end: DateTime<Utc>,
    pub bundle_eligible: bool,
    pub bundle_offer_enabled: bool,
    pub platform: ClassPlatform,
    pub zoom_link: Option<String>,
}

/// Booking
///
/// A confirmed seat in a live class for the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Booking {
    pub id: Uuid,
    pub live_class_id: Uuid,
    pub class_title: String,
    #[ts(type = "string")]
    pub date_time: DateTime<Utc>,
    pub platform: ClassPlatform,
    pub join_link: Option<String>,
}

// --- KYC ---

/// KycState
///
/// Review lifecycle of a KYC submission. The backend reports these lowercase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum KycState {
    #[default]
    None,
    Pending,
    Approved,
    Rejected,
}

/// KycStatus
///
/// The caller's current KYC standing plus any reviewer feedback.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct KycStatus {
    pub status: KycState,
    pub feedback: Option<String>,
}

/// KycDocs
///
/// Public URLs of the uploaded identity documents. These keys are snake_case
/// on the wire (historical backend contract), unlike the rest of the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct KycDocs {
    pub aadhar_url: String,
    pub pan_url: Option<String>,
}

/// KycSubmission
///
/// Input payload for POST /kyc/submit. The documents must already be uploaded
/// to storage; only their public URLs travel here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct KycSubmission {
    pub aadhar_number: String,
    pub pan_number: Option<String>,
    pub kyc_docs: KycDocs,
}

/// KycRecord
///
/// A pending submission as seen by the admin review queue.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct KycRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub aadhar_number: String,
    pub pan_number: Option<String>,
    pub kyc_docs: KycDocs,
    pub status: KycState,
    /// Reviewer feedback from the verdict, relayed to the user on rejection.
    pub feedback: Option<String>,
    #[ts(type = "string")]
    pub submitted_at: DateTime<Utc>,
}

/// KycReviewRequest
///
/// Admin verdict on a submission. `feedback` is surfaced to the user verbatim
/// on rejection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct KycReviewRequest {
    pub approve: bool,
    pub feedback: Option<String>,
}

// --- Admin Oversight ---

/// PlatformStats
///
/// Output schema for the administrative statistics dashboard (GET /admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PlatformStats {
    pub total_courses: i64,
    pub total_users: i64,
    pub total_bookings: i64,
    /// Submissions awaiting review.
    pub pending_kyc: i64,
}

/// PortalUser
///
/// A user row in the admin user listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PortalUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub kyc_status: KycState,
}

// --- Auth Payloads ---

/// SignUpRequest
///
/// Note: The password is only passed through to the external auth provider and
/// never persisted or logged by this portal.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// SignInRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// PasswordResetRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// SessionTokens
///
/// The provider session handed back to the client after sign-in/sign-up.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

// --- Upload Pipeline ---

/// PresignedUrlRequest
///
/// Input payload for requesting a short-lived storage upload URL
/// (POST /uploads/presigned). The server uses these fields to set security
/// constraints on the generated URL.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "aadhar_front.pdf")]
    pub filename: String,
    /// The MIME type, used to constrain the upload to the allowed type (security).
    #[schema(example = "application/pdf")]
    pub file_type: String,
}

/// PresignedUrlResponse
///
/// Output schema containing the secure, temporary URL for client-to-cloud file
/// transfer, plus the public URL under which the object will be readable once
/// uploaded (used in KYC submissions and course content).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PresignedUrlResponse {
    /// The time-limited URL for the PUT request.
    pub upload_url: String,
    /// The object key where the file will be stored.
    pub resource_key: String,
    /// The stable public URL for referencing the object after upload.
    pub public_url: String,
}
