use crate::models::Role;

/// Session/Role Gate
///
/// The single choke point deciding whether a request may reach a section of
/// the portal. It is a pure function over the resolved role (or its absence),
/// the requested path, and the roles the section admits; the navigation side
/// effect (issuing the redirect) lives in the router middleware, never here.

/// Fixed public allow-list. Anonymous requests to paths under these prefixes
/// pass the gate untouched; everything else redirects to sign-in.
pub const PUBLIC_PREFIXES: &[&str] = &[
    "/",
    "/courses",
    "/live-classes",
    "/mentors",
    "/contact",
    "/faq",
    "/auth",
    "/health",
];

/// Section home paths the gate redirects to.
pub const SIGN_IN_PATH: &str = "/auth";
pub const ADMIN_HOME: &str = "/admin";
pub const DASHBOARD_HOME: &str = "/dashboard";

/// RouteClass
///
/// Static classification of every navigable path. There is no dynamic policy
/// data: a path's class is a function of its prefix alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    AdminOnly,
    Dashboard,
}

/// GateOutcome
///
/// The gate's decision, with the two redirect targets kept distinct so the
/// middleware can build the Location header without re-deriving policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Request proceeds to the handler.
    Allow,
    /// No identity on a protected path: send to the sign-in route.
    RedirectSignIn,
    /// Admin identity on a dashboard path: send to the admin root.
    RedirectAdminHome,
    /// Non-admin identity on an admin path: send to the dashboard root.
    RedirectDashboardHome,
    /// Identity present but the role is not admitted by this section.
    /// Rendered as an access-denied response, never a redirect (no loops).
    Deny,
}

impl GateOutcome {
    /// The navigation target for redirect outcomes, if any.
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            GateOutcome::RedirectSignIn => Some(SIGN_IN_PATH),
            GateOutcome::RedirectAdminHome => Some(ADMIN_HOME),
            GateOutcome::RedirectDashboardHome => Some(DASHBOARD_HOME),
            GateOutcome::Allow | GateOutcome::Deny => None,
        }
    }
}

/// classify
///
/// Tags a path as admin-only, dashboard, or public. The admin/dashboard
/// prefixes take precedence over the allow-list so that, e.g., "/admin" is
/// never treated as public even though "/" is.
pub fn classify(path: &str) -> RouteClass {
    if has_prefix(path, ADMIN_HOME) {
        RouteClass::AdminOnly
    } else if has_prefix(path, DASHBOARD_HOME) {
        RouteClass::Dashboard
    } else {
        RouteClass::Public
    }
}

/// is_public
///
/// Membership in the fixed public allow-list. "/" only matches exactly;
/// other entries match themselves and any sub-path.
pub fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| {
        if *prefix == "/" {
            path == "/"
        } else {
            has_prefix(path, prefix)
        }
    })
}

// Prefix match on path-segment boundaries: "/courses" covers "/courses/42"
// but not "/coursesX".
fn has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// evaluate
///
/// The gate's decision function.
///
/// Contract (in decision order):
/// 1. No identity: allow public paths, otherwise redirect to sign-in.
/// 2. Admin on a dashboard-prefixed path: redirect to the admin root.
/// 3. Non-admin on an admin-prefixed path: redirect to the dashboard root.
/// 4. Role not in `allowed_roles` for this section: deny (no redirect loop).
/// 5. Otherwise: allow.
///
/// The admin/dashboard cross-redirects are deliberately unconditional, which
/// mirrors the current product behavior: mentors share the student dashboard.
pub fn evaluate(role: Option<Role>, path: &str, allowed_roles: &[Role]) -> GateOutcome {
    let Some(role) = role else {
        return if is_public(path) {
            GateOutcome::Allow
        } else {
            GateOutcome::RedirectSignIn
        };
    };

    let class = classify(path);
    match (role, class) {
        (Role::Admin, RouteClass::Dashboard) => GateOutcome::RedirectAdminHome,
        (Role::Mentor | Role::Student, RouteClass::AdminOnly) => {
            GateOutcome::RedirectDashboardHome
        }
        _ => {
            if allowed_roles.is_empty() || allowed_roles.contains(&role) {
                GateOutcome::Allow
            } else {
                GateOutcome::Deny
            }
        }
    }
}
