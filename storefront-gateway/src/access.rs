//! Admin access gate: decides whether an admin page may be served.
//!
//! The decision only looks at two facts: which kind of admin path was
//! requested and whether the session cookie is present. The cookie value is
//! never parsed or verified here; the backend checks the token on every API
//! call that needs it.
//!
//! ## Rules
//!
//! | path                          | no cookie            | cookie                   |
//! |-------------------------------|----------------------|--------------------------|
//! | outside the admin prefix      | allow                | allow                    |
//! | admin root                    | allow                | allow                    |
//! | login / signup                | allow                | redirect to dashboard    |
//! | any other admin path          | redirect to login    | allow                    |

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub admin_prefix: String,
    pub login_path: String,
    pub signup_path: String,
    pub dashboard_path: String,
    pub session_cookie: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            admin_prefix: String::from("/admin"),
            login_path: String::from("/admin/login"),
            signup_path: String::from("/admin/signup"),
            dashboard_path: String::from("/admin/dashboard"),
            session_cookie: String::from("token"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCategory {
    NotAdmin,
    AdminRoot,
    AuthPage,
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
}

impl GateConfig {
    pub fn classify(&self, path: &str) -> PathCategory {
        let path = normalize(path);
        let prefix = normalize(&self.admin_prefix);

        if path == prefix {
            return PathCategory::AdminRoot;
        }
        let under_prefix = path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'));
        if !under_prefix {
            return PathCategory::NotAdmin;
        }
        if path == normalize(&self.login_path) || path == normalize(&self.signup_path) {
            return PathCategory::AuthPage;
        }
        PathCategory::Protected
    }

    pub fn decide(&self, path: &str, has_session: bool) -> Decision {
        match (self.classify(path), has_session) {
            (PathCategory::NotAdmin | PathCategory::AdminRoot, _) => Decision::Allow,
            (PathCategory::AuthPage, true) => Decision::RedirectToDashboard,
            (PathCategory::AuthPage, false) => Decision::Allow,
            (PathCategory::Protected, false) => Decision::RedirectToLogin,
            (PathCategory::Protected, true) => Decision::Allow,
        }
    }
}

/// Drops a single trailing slash, keeping `/` intact.
fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}
