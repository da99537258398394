//! REST API client module for the LoveSync backend.
//!
//! This module provides the `ApiClient` used by the session store to log in,
//! register and fetch the current profile.
//!
//! The API uses JWT bearer token authentication obtained from the
//! `core/token/` endpoint. Failed responses surface as `ApiError`, which
//! carries the server's structured error body verbatim.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
