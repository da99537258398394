//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `Session`: the in-memory session and its pure transitions
//! - `TokenStorage`: the persisted credential record (file, keychain, memory)
//! - `SessionStore`: owns a session, mirrors its token to storage and runs
//!   login / register / fetch-current-user against the API
//!
//! Only the raw token is persisted. The user record is re-fetched after a
//! restart.

pub mod session;
pub mod storage;
pub mod store;

pub use session::{Session, SessionEvent, StorageEffect};
pub use storage::{FileTokenStorage, KeyringTokenStorage, MemoryTokenStorage, TokenStorage, TOKEN_KEY};
pub use store::{FetchFailurePolicy, SessionStore};
