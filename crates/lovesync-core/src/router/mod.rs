//! In-app routing: the static route table and the navigation guard.
//!
//! `Router::navigate` resolves a requested location (following redirects such
//! as `/` → `/login`) and runs the guard before anything is rendered. A
//! protected destination reached without a session yields a redirect to the
//! login view that carries the requested location in `?redirect=`.

pub mod guard;
pub mod routes;

use thiserror::Error;
use tracing::debug;

use crate::auth::Session;

pub use guard::{guard, resume_target, Destination, NavigationDecision, RESUME_PARAM};
pub use routes::{split_location, Redirect, Route, RouteTable, DEFAULT_AFTER_LOGIN, LOGIN_PATH};

/// Redirect chains longer than this are treated as a loop
const MAX_REDIRECTS: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("No route matches {0}")]
    NotFound(String),

    #[error("Redirect loop while resolving {0}")]
    RedirectLoop(String),
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// The resolved destination (after static redirects).
    pub route: Route,
    pub full_path: String,
    pub decision: NavigationDecision,
}

impl Navigation {
    /// The location the app ends up at: the destination when allowed, the
    /// login redirect otherwise.
    pub fn location(&self) -> String {
        self.decision
            .location()
            .unwrap_or_else(|| self.full_path.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Router {
    table: RouteTable,
}

impl Router {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolve a location to a destination, following static redirects.
    /// The query and fragment are carried across redirects.
    pub fn resolve(&self, location: &str) -> Result<Destination<'_>, RouteError> {
        let (mut path, suffix) = split_location(location);
        let mut hops = 0;

        while let Some(to) = self.table.redirect_for(path) {
            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(RouteError::RedirectLoop(location.to_string()));
            }
            debug!(from = path, to, "Following route redirect");
            path = to;
        }

        let route = self
            .table
            .find(path)
            .ok_or_else(|| RouteError::NotFound(location.to_string()))?;

        Ok(Destination {
            route,
            full_path: format!("{}{}", path, suffix),
        })
    }

    /// Resolve `location` and decide whether the transition may commit.
    pub fn navigate(&self, location: &str, session: &Session) -> Result<Navigation, RouteError> {
        let destination = self.resolve(location)?;
        let decision = guard(&destination, session);
        debug!(
            route = destination.route.name,
            allowed = decision.is_allowed(),
            "Navigation guarded"
        );

        Ok(Navigation {
            route: *destination.route,
            full_path: destination.full_path,
            decision,
        })
    }
}
