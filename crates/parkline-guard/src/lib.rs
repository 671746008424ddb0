//! Navigation guard for the Parkline client.
//!
//! Every route change passes through [`decide`] before it is committed.
//! The guard is a pure function of two inputs: the requested path and a
//! [`SessionView`] snapshot. It performs no I/O and holds no state, so
//! a decision is instant and always the same for the same inputs.
//!
//! # The route table
//!
//! Surfaces fall into four classes:
//!
//! - **Public** (`/`) — the landing page, open to everyone.
//! - **Guest-only** (`/login`, `/register`) — for signed-out users.
//!   A signed-in user landing here is bounced to their role's home.
//! - **User** (`/dashboard`, `/parking-lots`, ...) — requires a session
//!   with the user role.
//! - **Admin** (`/admin/...`) — requires a session with the admin role.
//!
//! Paths not in the table are allowed through untouched; rendering the
//! not-found surface is the caller's concern, not an access question.

use parkline_api::Role;
use parkline_session::SessionView;

// ---------------------------------------------------------------------------
// Well-known destinations
// ---------------------------------------------------------------------------

/// Where signed-out users are sent.
pub const LOGIN_PATH: &str = "/login";

/// Home surface for the user role.
pub const USER_HOME: &str = "/dashboard";

/// Home surface for the admin role.
pub const ADMIN_HOME: &str = "/admin/dashboard";

// ---------------------------------------------------------------------------
// Route table
// ---------------------------------------------------------------------------

/// Who may enter a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Anyone, signed in or not.
    Public,
    /// Signed-out users only.
    Guest,
    /// Signed-in users holding this exact role.
    Only(Role),
}

struct Route {
    path: &'static str,
    access: Access,
}

/// Every guarded surface. Paths are matched exactly.
const ROUTES: &[Route] = &[
    Route { path: "/", access: Access::Public },
    Route { path: "/login", access: Access::Guest },
    Route { path: "/register", access: Access::Guest },
    Route { path: "/dashboard", access: Access::Only(Role::User) },
    Route { path: "/parking-lots", access: Access::Only(Role::User) },
    Route { path: "/reservations", access: Access::Only(Role::User) },
    Route { path: "/profile", access: Access::Only(Role::User) },
    Route { path: "/admin/dashboard", access: Access::Only(Role::Admin) },
    Route { path: "/admin/lots", access: Access::Only(Role::Admin) },
    Route { path: "/admin/users", access: Access::Only(Role::Admin) },
    Route { path: "/admin/reservations", access: Access::Only(Role::Admin) },
];

fn find(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.path == path)
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// The guard's verdict on a requested navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Enter the requested path.
    Allow,
    /// Go somewhere else instead. The target is itself subject to the
    /// guard, so callers re-run [`decide`] until it allows.
    Redirect(&'static str),
}

/// The home surface for a role. Falls back to the user home when the
/// role is unknown, which only happens for views that are signed out.
pub fn role_home(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => ADMIN_HOME,
        Some(Role::User) | None => USER_HOME,
    }
}

/// Decides whether the session may enter `path`.
///
/// Rules, in order:
/// 1. Unknown and public paths are allowed.
/// 2. A protected route without a session redirects to the login
///    surface.
/// 3. A guest-only route with a session redirects to the role's home.
/// 4. A role mismatch redirects to the session's own home, never to an
///    error surface. A user typing an admin URL simply lands back on
///    their dashboard.
pub fn decide(path: &str, view: &SessionView) -> Decision {
    let Some(route) = find(path) else {
        return Decision::Allow;
    };

    let decision = match route.access {
        Access::Public => Decision::Allow,
        Access::Guest if view.authenticated => {
            Decision::Redirect(role_home(view.role))
        }
        Access::Only(_) if !view.authenticated => Decision::Redirect(LOGIN_PATH),
        Access::Only(required) if view.role != Some(required) => {
            Decision::Redirect(role_home(view.role))
        }
        _ => Decision::Allow,
    };

    if let Decision::Redirect(target) = decision {
        tracing::debug!(path, target, "navigation redirected");
    }

    decision
}

// =========================================================================
// Tests
// =========================================================================
