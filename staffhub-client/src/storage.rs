//! Durable storage for the bearer token.

use directories::BaseDirs;
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::debug;

use crate::error::StorageError;

/// Fixed key the token is stored under.
pub const TOKEN_KEY: &str = "auth_token";

/// A durable key-value slot holding at most one opaque token.
///
/// Absent means logged out.
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn store(&self, token: &str) -> Result<(), StorageError>;

    /// Delete the persisted token. Removing an absent token succeeds.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be modified.
    fn remove(&self) -> Result<(), StorageError>;
}

/// Token persisted as a single file, readable only by the owner on unix.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token at an explicit location.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the token under the platform configuration directory
    /// (`~/.config/staffhub/auth_token` on Linux).
    ///
    /// # Errors
    /// Returns [`StorageError::NoConfigDir`] when no home directory can be determined.
    pub fn in_config_dir() -> Result<Self, StorageError> {
        Self::default_path().map(Self::new)
    }

    /// Platform default token location.
    ///
    /// # Errors
    /// Returns [`StorageError::NoConfigDir`] when no home directory can be determined.
    pub fn default_path() -> Result<PathBuf, StorageError> {
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("staffhub").join(TOKEN_KEY))
            .ok_or(StorageError::NoConfigDir)
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        fs::write(&self.path, token.as_bytes()).map_err(|err| self.io_error(err))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|err| self.io_error(err))?;
        }
        debug!(path = %self.path.display(), "persisted session token");
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed session token");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

/// In-process token slot for embedding and tests.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    /// Current value, bypassing the trait.
    #[must_use]
    pub fn peek(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }
}

impl fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTokenStore")
            .field("has_token", &self.peek().is_some())
            .finish()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.peek())
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token.to_string());
        }
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join(TOKEN_KEY));

        assert_eq!(store.load().unwrap(), None);
        store.store("tok-123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-123"));

        store.store("tok-456").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-456"));

        store.remove().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.remove().unwrap();
    }

    #[test]
    fn file_store_treats_blank_file_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(TOKEN_KEY);
        fs::write(&path, "  \n").unwrap();
        assert_eq!(FileTokenStore::new(path).load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join(TOKEN_KEY));
        store.store("secret").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn default_path_ends_with_token_key() {
        if let Ok(path) = FileTokenStore::default_path() {
            assert!(path.ends_with(Path::new("staffhub").join(TOKEN_KEY)));
        }
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::with_token("seed");
        assert_eq!(store.load().unwrap().as_deref(), Some("seed"));
        store.remove().unwrap();
        assert_eq!(store.peek(), None);
        store.store("next").unwrap();
        assert_eq!(store.peek().as_deref(), Some("next"));
        assert!(!format!("{store:?}").contains("next"));
    }
}
