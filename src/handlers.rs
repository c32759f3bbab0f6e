use crate::{
    AppState,
    backend::ApiError,
    models::{
        Booking, Content, Course, CourseModule, CourseStatus, CreateContentRequest,
        CreateCourseRequest, CreateModuleRequest, Identity, KycRecord, KycReviewRequest,
        KycStatus, KycSubmission, LiveClass, LiveClassRequest, Mentor, PasswordResetRequest,
        PlatformStats, PortalUser, PresignedUrlRequest, PresignedUrlResponse, PurchaseKind,
        PurchaseRequest, PurchaseStatus, PurchasedCourse, Role, SessionTokens, SignInRequest,
        SignUpRequest, UpdateContentRequest, UpdateCourseRequest, UpdateModuleRequest,
    },
    rental,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

// Error posture: every failure is caught at the call site and rendered as a
// status code plus plain text. No retry, no recovery.
type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn render_error(e: ApiError) -> (StatusCode, String) {
    match e {
        ApiError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
        ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        ApiError::Rejected(msg) => (StatusCode::BAD_REQUEST, msg),
        ApiError::Unavailable(msg) => {
            tracing::error!("backend call failed: {}", msg);
            (StatusCode::BAD_GATEWAY, "backend unavailable".to_string())
        }
    }
}

fn require_admin(role: Role) -> Result<(), (StatusCode, String)> {
    match role {
        Role::Admin => Ok(()),
        Role::Mentor | Role::Student => {
            Err((StatusCode::FORBIDDEN, "admin only".to_string()))
        }
    }
}

// --- Filter Structs ---

/// CatalogFilter
///
/// Accepted query parameters for the public catalog listing (GET /courses).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CatalogFilter {
    /// Optional cap on the number of courses returned.
    pub limit: Option<usize>,
}

// --- Auth Gateway Handlers ---

/// sign_up
///
/// [Public Route] Creates a provider account, then mirrors the profile into
/// the backend so the two systems share a primary key.
///
/// *Consistency*: if the backend profile creation fails after the provider
/// account was opened, the fresh provider session is revoked immediately;
/// the client is never left signed in to the provider but unknown to the
/// platform.
#[utoipa::path(
    post,
    path = "/auth/sign-up",
    request_body = SignUpRequest,
    responses((status = 200, description = "Registered", body = SessionTokens))
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> ApiResult<SessionTokens> {
    // Step 1: Open the provider account/session.
    let session = state
        .provider
        .sign_up(&payload.email, &payload.password)
        .await
        .map_err(|e| {
            tracing::error!("provider sign-up failed: {}", e);
            (StatusCode::BAD_REQUEST, "sign-up rejected".to_string())
        })?;

    // Step 2: Mirror the profile into the backend under the provider's id.
    let identity = Identity {
        id: session.user_id,
        role: payload.role,
        email: payload.email,
        full_name: payload.full_name,
        avatar_url: None,
    };

    match state.backend.create_profile(identity.clone()).await {
        Ok(created) => {
            state
                .sessions
                .store(&session.tokens.access_token, created)
                .await;
            Ok(Json(session.tokens))
        }
        Err(e) => {
            tracing::error!("profile mirror failed after provider sign-up: {}", e);
            if let Err(e) = state.provider.sign_out(&session.tokens.access_token).await {
                tracing::error!("provider sign-out after mirror failure: {}", e);
            }
            Err(render_error(e))
        }
    }
}

/// sign_in
///
/// [Public Route] Opens a provider session and resolves the backend profile.
///
/// *Failure mode*: a valid provider session without a backend profile is
/// fatal-to-session: the provider session is revoked and the sign-in fails,
/// per the gate's consistency rule.
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionTokens),
        (status = 401, description = "Invalid credentials or missing profile")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> ApiResult<SessionTokens> {
    let session = state
        .provider
        .sign_in(&payload.email, &payload.password)
        .await
        .map_err(|_| (StatusCode::UNAUTHORIZED, "invalid credentials".to_string()))?;

    match state.backend.get_profile(session.user_id).await {
        Ok(identity) => {
            state
                .sessions
                .store(&session.tokens.access_token, identity)
                .await;
            Ok(Json(session.tokens))
        }
        Err(e) => {
            tracing::error!("profile fetch failed after sign-in: {}", e);
            if let Err(e) = state.provider.sign_out(&session.tokens.access_token).await {
                tracing::error!("provider sign-out after profile failure: {}", e);
            }
            Err((
                StatusCode::UNAUTHORIZED,
                "account has no platform profile".to_string(),
            ))
        }
    }
}

/// password_reset
///
/// [Public Route] Forwards a reset request to the provider. Responds 200
/// regardless of account existence to avoid enumeration.
#[utoipa::path(
    post,
    path = "/auth/password-reset",
    request_body = PasswordResetRequest,
    responses((status = 200, description = "Reset requested"))
)]
pub async fn password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .provider
        .request_password_reset(&payload.email)
        .await
        .map_err(|e| {
            tracing::error!("password reset failed: {}", e);
            (StatusCode::BAD_GATEWAY, "provider unavailable".to_string())
        })?;
    Ok(StatusCode::OK)
}

/// sign_out
///
/// [Shared Route] Tears down both halves of the session: the cached
/// identity in this process and the provider session itself. Open to every
/// authenticated role; admins sign out through here too.
#[utoipa::path(
    post,
    path = "/auth/sign-out",
    responses((status = 204, description = "Signed out"))
)]
pub async fn sign_out(
    _identity: Identity,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> StatusCode {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = token {
        state.sessions.invalidate(token).await;
        if let Err(e) = state.provider.sign_out(token).await {
            // The local session is already gone; the provider token will
            // still age out on its own expiry.
            tracing::error!("provider sign-out failed: {}", e);
        }
    }
    StatusCode::NO_CONTENT
}

// --- Catalog Handlers ---

/// list_courses
///
/// [Public Route] Lists the published catalog. The published-only filter is
/// applied **unconditionally** for this route; drafts are reachable only
/// through the admin section.
#[utoipa::path(
    get,
    path = "/courses",
    params(CatalogFilter),
    responses((status = 200, description = "Published courses", body = [Course]))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(filter): Query<CatalogFilter>,
) -> ApiResult<Vec<Course>> {
    let courses = state
        .backend
        .list_courses(Some(CourseStatus::Published), filter.limit)
        .await
        .map_err(render_error)?;
    Ok(Json(courses))
}

// How many courses the landing-page rail shows when no limit is given.
const RECENT_COURSES_DEFAULT: usize = 6;

/// recent_courses
///
/// [Public Route] The newest published courses, backing the landing-page
/// "latest courses" rail.
#[utoipa::path(
    get,
    path = "/courses/recent",
    params(CatalogFilter),
    responses((status = 200, description = "Newest published courses", body = [Course]))
)]
pub async fn recent_courses(
    State(state): State<AppState>,
    Query(filter): Query<CatalogFilter>,
) -> ApiResult<Vec<Course>> {
    let limit = filter.limit.unwrap_or(RECENT_COURSES_DEFAULT);
    let courses = state
        .backend
        .recent_courses(limit)
        .await
        .map_err(render_error)?;
    Ok(Json(courses))
}

/// get_course
///
/// [Public Route] Retrieves a single course with its module/content tree.
/// Unpublished courses are withheld from this route.
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses((status = 200, description = "Found", body = Course))
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Course> {
    let course = state.backend.get_course(id).await.map_err(render_error)?;
    if course.status != CourseStatus::Published {
        return Err((StatusCode::NOT_FOUND, "not found".to_string()));
    }
    Ok(Json(course))
}

/// list_live_classes
///
/// [Public Route] Upcoming live classes with remaining seats, for the
/// marketing/listing page.
#[utoipa::path(
    get,
    path = "/live-classes",
    responses((status = 200, description = "Upcoming classes", body = [LiveClass]))
)]
pub async fn list_live_classes(State(state): State<AppState>) -> ApiResult<Vec<LiveClass>> {
    Ok(Json(
        state.backend.list_live_classes().await.map_err(render_error)?,
    ))
}

/// list_mentors
///
/// [Public Route] Instructor directory, used by the live-class cards and the
/// admin authoring form.
#[utoipa::path(
    get,
    path = "/mentors",
    responses((status = 200, description = "Mentors", body = [Mentor]))
)]
pub async fn list_mentors(State(state): State<AppState>) -> ApiResult<Vec<Mentor>> {
    Ok(Json(
        state.backend.list_mentors().await.map_err(render_error)?,
    ))
}

// --- Dashboard Handlers ---

/// get_me
///
/// [Dashboard Route] The authenticated user's profile, exactly as the gate
/// resolved it.
#[utoipa::path(
    get,
    path = "/dashboard/me",
    responses((status = 200, description = "Profile", body = Identity))
)]
pub async fn get_me(identity: Identity) -> Json<Identity> {
    Json(identity)
}

/// my_courses
///
/// [Dashboard Route] The caller's purchased and rented courses. Rentals are
/// annotated with a rendered countdown against their expiry instant (the
/// rental end when active, the activation deadline otherwise).
#[utoipa::path(
    get,
    path = "/dashboard/courses",
    responses((status = 200, description = "My courses", body = [PurchasedCourse]))
)]
pub async fn my_courses(
    Identity { id, .. }: Identity,
    State(state): State<AppState>,
) -> ApiResult<Vec<PurchasedCourse>> {
    let now = Utc::now();
    let purchases = state
        .backend
        .my_purchases(id)
        .await
        .map_err(render_error)?
        .into_iter()
        .map(|mut entry| {
            if entry.status.kind == PurchaseKind::Rent {
                entry.countdown = rental::maybe_countdown(now, entry.status.expiry);
            }
            entry
        })
        .collect();
    Ok(Json(purchases))
}

/// purchase_course
///
/// [Dashboard Route] Buys or rents a course for the caller. `Buy` grants
/// lifetime access; `Rent` must be started within 30 days.
#[utoipa::path(
    post,
    path = "/courses/{id}/purchase",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Purchased", body = PurchaseStatus),
        (status = 409, description = "Already purchased")
    )
)]
pub async fn purchase_course(
    Identity { id: user_id, .. }: Identity,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<PurchaseRequest>,
) -> ApiResult<PurchaseStatus> {
    let status = state
        .backend
        .purchase_course(user_id, course_id, payload.kind)
        .await
        .map_err(render_error)?;
    Ok(Json(status))
}

/// start_rental
///
/// [Dashboard Route] Opens the 48-hour viewing window on a rented course.
#[utoipa::path(
    post,
    path = "/courses/{id}/start-rental",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Rental started", body = PurchaseStatus),
        (status = 409, description = "Already started")
    )
)]
pub async fn start_rental(
    Identity { id: user_id, .. }: Identity,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<PurchaseStatus> {
    let status = state
        .backend
        .start_rental(user_id, course_id)
        .await
        .map_err(render_error)?;
    Ok(Json(status))
}

/// purchase_status
///
/// [Dashboard Route] The caller's access picture for one course. 404 when the
/// course was never purchased, which the client renders as the buy/rent offer.
#[utoipa::path(
    get,
    path = "/courses/{id}/purchase-status",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Status", body = PurchaseStatus),
        (status = 404, description = "Never purchased")
    )
)]
pub async fn purchase_status(
    Identity { id: user_id, .. }: Identity,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<PurchaseStatus> {
    match state
        .backend
        .purchase_status(user_id, course_id)
        .await
        .map_err(render_error)?
    {
        Some(status) => Ok(Json(status)),
        None => Err((StatusCode::NOT_FOUND, "no purchase".to_string())),
    }
}

/// book_live_class
///
/// [Dashboard Route] Reserves a seat in a live class. Seat accounting and the
/// one-booking-per-user rule are enforced by the backend; a violation comes
/// back as 409.
#[utoipa::path(
    post,
    path = "/live-classes/{id}/book",
    params(("id" = Uuid, Path, description = "Live class ID")),
    responses(
        (status = 200, description = "Booked", body = Booking),
        (status = 409, description = "Full or already booked")
    )
)]
pub async fn book_live_class(
    Identity { id: user_id, .. }: Identity,
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> ApiResult<Booking> {
    let booking = state
        .backend
        .book_live_class(user_id, class_id)
        .await
        .map_err(render_error)?;
    Ok(Json(booking))
}

/// my_bookings
///
/// [Dashboard Route] The caller's live-class bookings.
#[utoipa::path(
    get,
    path = "/dashboard/bookings",
    responses((status = 200, description = "My bookings", body = [Booking]))
)]
pub async fn my_bookings(
    Identity { id, .. }: Identity,
    State(state): State<AppState>,
) -> ApiResult<Vec<Booking>> {
    Ok(Json(
        state.backend.my_bookings(id).await.map_err(render_error)?,
    ))
}

/// kyc_status
///
/// [Dashboard Route] The caller's KYC standing plus reviewer feedback.
#[utoipa::path(
    get,
    path = "/kyc/status",
    responses((status = 200, description = "KYC status", body = KycStatus))
)]
pub async fn kyc_status(
    Identity { id, .. }: Identity,
    State(state): State<AppState>,
) -> ApiResult<KycStatus> {
    Ok(Json(
        state.backend.kyc_status(id).await.map_err(render_error)?,
    ))
}

/// submit_kyc
///
/// [Dashboard Route] Submits identity documents for review. The documents
/// must already be uploaded via the presigned flow; only their public URLs
/// travel in the payload.
#[utoipa::path(
    post,
    path = "/kyc/submit",
    request_body = KycSubmission,
    responses(
        (status = 200, description = "Submitted", body = KycStatus),
        (status = 409, description = "Submission already pending")
    )
)]
pub async fn submit_kyc(
    Identity { id, .. }: Identity,
    State(state): State<AppState>,
    Json(payload): Json<KycSubmission>,
) -> ApiResult<KycStatus> {
    let status = state
        .backend
        .submit_kyc(id, payload)
        .await
        .map_err(render_error)?;
    Ok(Json(status))
}

/// get_presigned_url
///
/// [Shared Route] Generates a temporary, secure URL for direct
/// client-to-cloud upload of KYC documents and course media; used by mentors
/// (KYC) and admins (course video) alike.
///
/// *Security*: The URL is short-lived (10 minutes), constrained to the
/// specified `file_type`, and keyed by a fresh UUID, offloading heavy uploads
/// from the portal itself. The response also carries the public URL the
/// object will have once uploaded.
#[utoipa::path(
    post,
    path = "/uploads/presigned",
    request_body = PresignedUrlRequest,
    responses((status = 200, description = "URL", body = PresignedUrlResponse))
)]
pub async fn get_presigned_url(
    Identity { id: user_id, .. }: Identity,
    State(state): State<AppState>,
    Json(payload): Json<PresignedUrlRequest>,
) -> ApiResult<PresignedUrlResponse> {
    // Object keys are namespaced per user: 'uploads/{user}/{uuid}.{ext}'.
    let extension = std::path::Path::new(&payload.filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("bin");
    let object_key = format!("uploads/{}/{}.{}", user_id, Uuid::new_v4(), extension);

    match state
        .storage
        .get_presigned_upload_url(&object_key, &payload.file_type)
        .await
    {
        Ok(url) => {
            let public_url = state.storage.public_url(&object_key);
            Ok(Json(PresignedUrlResponse {
                upload_url: url,
                resource_key: object_key,
                public_url,
            }))
        }
        Err(e) => {
            tracing::error!("presigned url generation failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed".to_string()))
        }
    }
}

// --- Admin Handlers ---
//
// The admin router is already wrapped by the gate middleware; the explicit
// role check in each handler is the second layer of Defense-in-Depth.

/// admin_stats
///
/// [Admin Route] Core oversight metrics for the admin dashboard.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = PlatformStats))
)]
pub async fn admin_stats(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
) -> ApiResult<PlatformStats> {
    require_admin(role)?;
    Ok(Json(
        state.backend.platform_stats().await.map_err(render_error)?,
    ))
}

/// admin_users
///
/// [Admin Route] Full user listing with KYC standing.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses((status = 200, description = "Users", body = [PortalUser]))
)]
pub async fn admin_users(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
) -> ApiResult<Vec<PortalUser>> {
    require_admin(role)?;
    Ok(Json(
        state.backend.list_users().await.map_err(render_error)?,
    ))
}

/// admin_courses
///
/// [Admin Route] All courses regardless of publication status, for the
/// authoring table.
#[utoipa::path(
    get,
    path = "/admin/courses",
    responses((status = 200, description = "All courses", body = [Course]))
)]
pub async fn admin_courses(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
) -> ApiResult<Vec<Course>> {
    require_admin(role)?;
    Ok(Json(
        state
            .backend
            .list_courses(None, None)
            .await
            .map_err(render_error)?,
    ))
}

/// admin_get_course
///
/// [Admin Route] Single course for the editor, drafts included.
#[utoipa::path(
    get,
    path = "/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses((status = 200, description = "Found", body = Course))
)]
pub async fn admin_get_course(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Course> {
    require_admin(role)?;
    Ok(Json(state.backend.get_course(id).await.map_err(render_error)?))
}

/// create_course
///
/// [Admin Route] Authors a new course. New courses start as drafts;
/// publication is an explicit separate action.
#[utoipa::path(
    post,
    path = "/admin/courses",
    request_body = CreateCourseRequest,
    responses((status = 200, description = "Created", body = Course))
)]
pub async fn create_course(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Json(payload): Json<CreateCourseRequest>,
) -> ApiResult<Course> {
    require_admin(role)?;
    Ok(Json(
        state
            .backend
            .create_course(payload)
            .await
            .map_err(render_error)?,
    ))
}

/// update_course
///
/// [Admin Route] Partial update of course fields.
#[utoipa::path(
    patch,
    path = "/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses((status = 200, description = "Updated", body = Course))
)]
pub async fn update_course(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> ApiResult<Course> {
    require_admin(role)?;
    Ok(Json(
        state
            .backend
            .update_course(id, payload)
            .await
            .map_err(render_error)?,
    ))
}

/// delete_course
///
/// [Admin Route] Removes a course and its module tree.
#[utoipa::path(
    delete,
    path = "/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_course(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(role)?;
    state.backend.delete_course(id).await.map_err(render_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// publish_course
///
/// [Admin Route] Moves a course into the public catalog.
#[utoipa::path(
    post,
    path = "/admin/courses/{id}/publish",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses((status = 200, description = "Published", body = Course))
)]
pub async fn publish_course(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Course> {
    require_admin(role)?;
    Ok(Json(
        state.backend.publish_course(id).await.map_err(render_error)?,
    ))
}

/// add_module
#[utoipa::path(
    post,
    path = "/admin/courses/{id}/modules",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CreateModuleRequest,
    responses((status = 200, description = "Created", body = CourseModule))
)]
pub async fn add_module(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateModuleRequest>,
) -> ApiResult<CourseModule> {
    require_admin(role)?;
    Ok(Json(
        state
            .backend
            .add_module(course_id, payload)
            .await
            .map_err(render_error)?,
    ))
}

/// update_module
#[utoipa::path(
    patch,
    path = "/admin/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body = UpdateModuleRequest,
    responses((status = 200, description = "Updated", body = CourseModule))
)]
pub async fn update_module(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateModuleRequest>,
) -> ApiResult<CourseModule> {
    require_admin(role)?;
    Ok(Json(
        state
            .backend
            .update_module(id, payload)
            .await
            .map_err(render_error)?,
    ))
}

/// delete_module
#[utoipa::path(
    delete,
    path = "/admin/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_module(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(role)?;
    state.backend.delete_module(id).await.map_err(render_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// add_content
#[utoipa::path(
    post,
    path = "/admin/modules/{id}/content",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body = CreateContentRequest,
    responses((status = 200, description = "Created", body = Content))
)]
pub async fn add_content(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<CreateContentRequest>,
) -> ApiResult<Content> {
    require_admin(role)?;
    Ok(Json(
        state
            .backend
            .add_content(module_id, payload)
            .await
            .map_err(render_error)?,
    ))
}

/// update_content
#[utoipa::path(
    patch,
    path = "/admin/content/{id}",
    params(("id" = Uuid, Path, description = "Content ID")),
    request_body = UpdateContentRequest,
    responses((status = 200, description = "Updated", body = Content))
)]
pub async fn update_content(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContentRequest>,
) -> ApiResult<Content> {
    require_admin(role)?;
    Ok(Json(
        state
            .backend
            .update_content(id, payload)
            .await
            .map_err(render_error)?,
    ))
}

/// delete_content
#[utoipa::path(
    delete,
    path = "/admin/content/{id}",
    params(("id" = Uuid, Path, description = "Content ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_content(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(role)?;
    state.backend.delete_content(id).await.map_err(render_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// admin_live_classes
///
/// [Admin Route] Every live class, past and future, for the management table.
#[utoipa::path(
    get,
    path = "/admin/live-classes",
    responses((status = 200, description = "All classes", body = [LiveClass]))
)]
pub async fn admin_live_classes(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
) -> ApiResult<Vec<LiveClass>> {
    require_admin(role)?;
    Ok(Json(
        state.backend.all_live_classes().await.map_err(render_error)?,
    ))
}

/// create_live_class
#[utoipa::path(
    post,
    path = "/admin/live-classes",
    request_body = LiveClassRequest,
    responses((status = 200, description = "Created", body = LiveClass))
)]
pub async fn create_live_class(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Json(payload): Json<LiveClassRequest>,
) -> ApiResult<LiveClass> {
    require_admin(role)?;
    Ok(Json(
        state
            .backend
            .create_live_class(payload)
            .await
            .map_err(render_error)?,
    ))
}

/// update_live_class
///
/// [Admin Route] Full replacement, matching the authoring form's PUT.
#[utoipa::path(
    put,
    path = "/admin/live-classes/{id}",
    params(("id" = Uuid, Path, description = "Live class ID")),
    request_body = LiveClassRequest,
    responses((status = 200, description = "Updated", body = LiveClass))
)]
pub async fn update_live_class(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LiveClassRequest>,
) -> ApiResult<LiveClass> {
    require_admin(role)?;
    Ok(Json(
        state
            .backend
            .update_live_class(id, payload)
            .await
            .map_err(render_error)?,
    ))
}

/// delete_live_class
#[utoipa::path(
    delete,
    path = "/admin/live-classes/{id}",
    params(("id" = Uuid, Path, description = "Live class ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_live_class(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(role)?;
    state
        .backend
        .delete_live_class(id)
        .await
        .map_err(render_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// pending_kyc
///
/// [Admin Route] The KYC review queue.
#[utoipa::path(
    get,
    path = "/admin/kyc/pending",
    responses((status = 200, description = "Pending submissions", body = [KycRecord]))
)]
pub async fn pending_kyc(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
) -> ApiResult<Vec<KycRecord>> {
    require_admin(role)?;
    Ok(Json(
        state.backend.pending_kyc().await.map_err(render_error)?,
    ))
}

/// review_kyc
///
/// [Admin Route] Approves or rejects a submission; rejection feedback is
/// surfaced to the user on their next status fetch.
#[utoipa::path(
    post,
    path = "/admin/kyc/{id}/review",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = KycReviewRequest,
    responses((status = 200, description = "Reviewed", body = KycRecord))
)]
pub async fn review_kyc(
    Identity { role, .. }: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<KycReviewRequest>,
) -> ApiResult<KycRecord> {
    require_admin(role)?;
    Ok(Json(
        state
            .backend
            .review_kyc(id, payload)
            .await
            .map_err(render_error)?,
    ))
}

/// access_denied
///
/// The gate's Deny outcome: identity present, role not admitted by the
/// section. A plain response, never a redirect, so no loop is possible.
pub async fn access_denied() -> (StatusCode, &'static str) {
    (
        StatusCode::FORBIDDEN,
        "Access Denied: you don't have permission to access this page.",
    )
}
