//! Durable storage for the credential token.
//!
//! Exactly one record is persisted: the raw token string under the fixed key
//! `token`. Absence of the record means there is no session.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use keyring::Entry;

/// Key the credential token is persisted under
pub const TOKEN_KEY: &str = "token";

/// Keychain service name
const SERVICE_NAME: &str = "lovesync";

pub trait TokenStorage: Send {
    /// Read the persisted token, `None` when no record exists.
    fn load(&self) -> Result<Option<String>>;

    fn store(&mut self, token: &str) -> Result<()>;

    /// Delete the record. Deleting a missing record succeeds.
    fn remove(&mut self) -> Result<()>;
}

/// Token kept in a plain file named `token` inside a directory.
pub struct FileTokenStorage {
    dir: PathBuf,
}

impl FileTokenStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_KEY)
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read token file")?;
        // Hand-edited files usually end in a newline
        let token = contents.trim_end();
        Ok(Some(token.to_string()).filter(|t| !t.is_empty()))
    }

    fn store(&mut self, token: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create token directory")?;
        write_private(&self.path(), token).context("Failed to write token file")
    }

    fn remove(&mut self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to delete token file")?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

/// Token kept in the OS keychain.
pub struct KeyringTokenStorage {
    service: String,
}

impl KeyringTokenStorage {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, TOKEN_KEY).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStorage for KeyringTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token).filter(|t| !t.is_empty())),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn store(&mut self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn remove(&mut self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// Token kept in process memory only; nothing survives a restart.
///
/// Clones share the same slot, so a caller can keep a handle to inspect what
/// a `SessionStore` has persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    /// Current contents of the slot.
    pub fn peek(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Token storage lock poisoned"))
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.lock()?.clone().filter(|t| !t.is_empty()))
    }

    fn store(&mut self, token: &str) -> Result<()> {
        *self.lock()? = Some(token.to_string());
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileTokenStorage::new(dir.path().join("nested"));

        assert_eq!(storage.load().unwrap(), None);

        storage.store("abc").unwrap();
        assert_eq!(storage.load().unwrap(), Some("abc".to_string()));
        assert_eq!(std::fs::read_to_string(storage.path()).unwrap(), "abc");

        storage.remove().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_remove_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileTokenStorage::new(dir.path());
        assert!(storage.remove().is_ok());
    }

    #[test]
    fn test_file_storage_empty_file_is_no_token() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(TOKEN_KEY), "").unwrap();
        let storage = FileTokenStorage::new(dir.path());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_file_storage_ignores_trailing_newline() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(TOKEN_KEY), "abc\n").unwrap();
        let storage = FileTokenStorage::new(dir.path());
        assert_eq!(storage.load().unwrap(), Some("abc".to_string()));

        std::fs::write(dir.path().join(TOKEN_KEY), "\r\n").unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let mut storage = FileTokenStorage::new(dir.path());
        storage.store("abc").unwrap();

        let mode = std::fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_storage_handles_share_slot() {
        let handle = MemoryTokenStorage::new();
        let mut storage = handle.clone();

        storage.store("abc").unwrap();
        assert_eq!(handle.peek(), Some("abc".to_string()));

        storage.remove().unwrap();
        assert_eq!(handle.peek(), None);
    }
}
