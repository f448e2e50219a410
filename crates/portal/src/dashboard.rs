//! Role-based dashboard routing.
//!
//! Dashboards render from the active admin in the session store. A visitor
//! without a session, or whose role has no dashboard, is sent to
//! [`LOGIN_PATH`]; an admin opening another role's dashboard is sent back to
//! their own.

use school_portal_core::{AdminRecord, Role, SchoolInfo};

use crate::session::SessionStore;
use crate::store::KeyValueStore;

/// Where visitors without an active session land.
pub const LOGIN_PATH: &str = Role::NO_DASHBOARD_PATH;

/// "Current user" context shown on every dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardContext {
    pub path: &'static str,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub school: Option<SchoolInfo>,
    pub profile_image: Option<String>,
}

impl DashboardContext {
    fn from_record(record: AdminRecord) -> Self {
        Self {
            path: record.role.dashboard_path(),
            display_name: record.display_name(),
            email: record.email,
            role: record.role,
            school: record.school,
            profile_image: record.profile_image,
        }
    }
}

/// Outcome of opening a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(DashboardContext),
    Redirect(&'static str),
}

/// Dashboard of the active admin, if any.
pub fn current_dashboard<S: KeyValueStore>(session: &SessionStore<S>) -> Option<DashboardContext> {
    session
        .get_current_admin_data()
        .map(DashboardContext::from_record)
}

/// Decide whether `path` renders for the active admin.
///
/// Unknown paths redirect like foreign dashboards.
pub fn open<S: KeyValueStore>(session: &SessionStore<S>, path: &str) -> Navigation {
    let Some(context) = current_dashboard(session) else {
        tracing::debug!(path, "No active session, redirecting to login");
        return Navigation::Redirect(LOGIN_PATH);
    };
    if !context.role.is_known() {
        tracing::debug!(path, role = %context.role, "Role has no dashboard");
        return Navigation::Redirect(LOGIN_PATH);
    }

    if context.path == path.trim_end_matches('/') {
        Navigation::Render(context)
    } else {
        tracing::debug!(path, role = %context.role, "Redirecting to own dashboard");
        Navigation::Redirect(context.path)
    }
}
