//! Core library for the LoveSync couple app client.
//!
//! - `auth`: the session store, its pure transitions and token persistence
//! - `api`: REST client for login, registration and the current profile
//! - `router`: route table and the navigation guard
//! - `notify`: toast notifications
//! - `config`: on-disk configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod notify;
pub mod router;

pub use api::{ApiClient, ApiError};
pub use auth::{FetchFailurePolicy, Session, SessionStore, TokenStorage};
pub use config::Config;
pub use models::{Credentials, Registration, User};
pub use router::{NavigationDecision, Router};
