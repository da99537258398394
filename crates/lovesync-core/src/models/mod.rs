//! Data models exchanged with the LoveSync API.
//!
//! - `User`: the profile record returned by login and profile endpoints
//! - `Credentials`, `Registration`: request bodies for login and sign-up
//! - `LoginResponse`, `ProfileResponse`: success payloads

pub mod user;

pub use user::{Credentials, LoginResponse, ProfileResponse, Registration, User};
