//! Static route configuration.

/// Path of the login view; unauthenticated users are sent here.
pub const LOGIN_PATH: &str = "/login";

/// Where to go after login when no valid resume target was carried along.
pub const DEFAULT_AFTER_LOGIN: &str = "/index";

/// A navigable destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub protected: bool,
}

impl Route {
    pub const fn open(path: &'static str, name: &'static str) -> Self {
        Self {
            path,
            name,
            protected: false,
        }
    }

    pub const fn protected(path: &'static str, name: &'static str) -> Self {
        Self {
            path,
            name,
            protected: true,
        }
    }
}

/// A path that unconditionally forwards to another path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    redirects: Vec<Redirect>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>, redirects: Vec<Redirect>) -> Self {
        Self { routes, redirects }
    }

    /// The application's routes.
    pub fn standard() -> Self {
        Self::new(
            vec![
                Route::open(LOGIN_PATH, "Login"),
                Route::open("/register", "Register"),
                Route::protected("/index", "Index"),
                Route::protected("/personal_center", "PersonalCenter"),
                Route::protected("/moments", "Moments"),
                Route::protected("/lovesync", "LoveSync"),
                Route::protected("/couple", "Couple"),
            ],
            vec![Redirect {
                from: "/",
                to: LOGIN_PATH,
            }],
        )
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn find(&self, path: &str) -> Option<&Route> {
        let path = normalize_path(path);
        self.routes.iter().find(|r| path_eq(r.path, path))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn redirect_for(&self, path: &str) -> Option<&'static str> {
        let path = normalize_path(path);
        self.redirects
            .iter()
            .find(|r| path_eq(r.from, path))
            .map(|r| r.to)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Split a location into its path and the `?query#fragment` suffix.
pub fn split_location(location: &str) -> (&str, &str) {
    match location.find(['?', '#']) {
        Some(idx) => location.split_at(idx),
        None => (location, ""),
    }
}

/// Drop one trailing slash, keeping the root as `/`.
fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

fn path_eq(route_path: &str, path: &str) -> bool {
    route_path.eq_ignore_ascii_case(path)
}
