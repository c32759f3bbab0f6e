/// Router Module Index
///
/// Organizes the portal's routing logic into the three gate-segregated
/// sections. Access control is applied explicitly at the module level (via
/// Axum layers running the route gate), preventing accidental exposure of
/// protected endpoints.
///
/// The three modules map directly to the gate's route classes.

/// Routes accessible to all users (anonymous, read-only), plus the auth
/// gateway. The gate classifies these paths as Public and never redirects
/// away from them.
pub mod public;

/// Routes in the user dashboard section. The gate admits Student and Mentor
/// here; a signed-in Admin is redirected to the admin section instead.
pub mod dashboard;

/// Routes restricted exclusively to users with the Admin role.
/// Implements mandatory authorization checks.
pub mod admin;
