//! The navigation guard.
//!
//! `guard` is a pure, synchronous predicate over a resolved destination and
//! the current session. It never performs I/O, so it can run before every
//! transition commits.

use reqwest::Url;

use crate::auth::Session;

use super::routes::{Route, DEFAULT_AFTER_LOGIN, LOGIN_PATH};

/// Query parameter carrying the originally requested location
pub const RESUME_PARAM: &str = "redirect";

/// Origin used only to parse and build in-app locations
const APP_ORIGIN: &str = "http://app.invalid/";

/// A destination after route resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination<'a> {
    pub route: &'a Route,
    /// Requested location including query and fragment.
    pub full_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    RedirectTo { path: String, resume: String },
}

impl NavigationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, NavigationDecision::Allow)
    }

    /// In-app location to navigate to for a redirect, e.g.
    /// `/login?redirect=%2Fmoments`.
    pub fn location(&self) -> Option<String> {
        match self {
            NavigationDecision::Allow => None,
            NavigationDecision::RedirectTo { path, resume } => {
                Some(with_query_param(path, RESUME_PARAM, resume))
            }
        }
    }
}

pub fn guard(destination: &Destination<'_>, session: &Session) -> NavigationDecision {
    if destination.route.protected && !session.is_authenticated() {
        NavigationDecision::RedirectTo {
            path: LOGIN_PATH.to_string(),
            resume: destination.full_path.clone(),
        }
    } else {
        NavigationDecision::Allow
    }
}

fn with_query_param(path: &str, key: &str, value: &str) -> String {
    match Url::parse(APP_ORIGIN).and_then(|base| base.join(path)) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair(key, value);
            match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            }
        }
        Err(_) => path.to_string(),
    }
}

/// Where to continue after a successful login.
///
/// Reads the resume parameter from a location such as
/// `/login?redirect=%2Fmoments` (or a bare `?redirect=...` query). Only
/// in-app absolute paths are honoured; anything else, including a missing
/// parameter, falls back to the home view.
pub fn resume_target(location: &str) -> String {
    let requested = Url::parse(APP_ORIGIN)
        .and_then(|base| base.join(location))
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == RESUME_PARAM)
                .map(|(_, value)| value.into_owned())
        });

    match requested {
        Some(target) if is_in_app_path(&target) => target,
        _ => DEFAULT_AFTER_LOGIN.to_string(),
    }
}

fn is_in_app_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::routes::RouteTable;

    fn destination<'a>(table: &'a RouteTable, full_path: &str) -> Destination<'a> {
        Destination {
            route: table.find(full_path.split('?').next().unwrap()).unwrap(),
            full_path: full_path.to_string(),
        }
    }

    fn authenticated() -> Session {
        Session::hydrated(Some("tok".to_string()))
    }

    #[test]
    fn test_protected_route_redirects_when_logged_out() {
        let table = RouteTable::standard();
        let decision = guard(&destination(&table, "/moments"), &Session::default());

        assert_eq!(
            decision,
            NavigationDecision::RedirectTo {
                path: "/login".to_string(),
                resume: "/moments".to_string(),
            }
        );
        assert_eq!(decision.location().as_deref(), Some("/login?redirect=%2Fmoments"));
    }

    #[test]
    fn test_protected_route_allowed_when_logged_in() {
        let table = RouteTable::standard();
        let decision = guard(&destination(&table, "/moments"), &authenticated());

        assert_eq!(decision, NavigationDecision::Allow);
        assert_eq!(decision.location(), None);
    }

    #[test]
    fn test_open_route_always_allowed() {
        let table = RouteTable::standard();
        assert!(guard(&destination(&table, "/register"), &Session::default()).is_allowed());
        assert!(guard(&destination(&table, "/login"), &authenticated()).is_allowed());
    }

    #[test]
    fn test_resume_keeps_query() {
        let table = RouteTable::standard();
        let decision = guard(&destination(&table, "/couple?tab=invite&x=1"), &Session::default());
        let location = decision.location().unwrap();

        assert_eq!(location, "/login?redirect=%2Fcouple%3Ftab%3Dinvite%26x%3D1");
        assert_eq!(resume_target(&location), "/couple?tab=invite&x=1");
    }

    #[test]
    fn test_resume_target_defaults() {
        assert_eq!(resume_target("/login"), DEFAULT_AFTER_LOGIN);
        assert_eq!(resume_target("/login?other=1"), DEFAULT_AFTER_LOGIN);
        assert_eq!(resume_target("?redirect=%2Fmoments"), "/moments");
    }

    #[test]
    fn test_resume_target_rejects_external_locations() {
        assert_eq!(resume_target("/login?redirect=https%3A%2F%2Fevil.example"), DEFAULT_AFTER_LOGIN);
        assert_eq!(resume_target("/login?redirect=%2F%2Fevil.example"), DEFAULT_AFTER_LOGIN);
        assert_eq!(resume_target("/login?redirect=%2F%5Cevil.example"), DEFAULT_AFTER_LOGIN);
        assert_eq!(resume_target("/login?redirect=moments"), DEFAULT_AFTER_LOGIN);
    }
}
