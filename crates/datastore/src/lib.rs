use domain::Credentials;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no credentials stored at {0}")]
    NotFound(String),

    #[error("failed to access {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed credentials in {location}: {source}")]
    Malformed {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Secret store abstraction for the OAuth token bundle.
///
/// Implementations decide where the bundle lives; callers only load it and,
/// when they choose to, write a refreshed bundle back.
pub trait CredentialStore: Send + Sync {
    /// Load the stored bundle
    fn load(&self) -> Result<Credentials, StoreError>;

    /// Replace the stored bundle
    fn save(&self, credentials: &Credentials) -> Result<(), StoreError>;

    /// Human-readable location, used in diagnostics
    fn location(&self) -> String;
}

/// Credentials kept in a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Credentials, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.location()));
            }
            Err(source) => {
                return Err(StoreError::Io {
                    location: self.location(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            location: self.location(),
            source,
        })
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(credentials).map_err(|source| {
            StoreError::Malformed {
                location: self.location(),
                source,
            }
        })?;

        // Write next to the target first so a crash never leaves a truncated bundle.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body)
            .and_then(|()| fs::rename(&staging, &self.path))
            .map_err(|source| StoreError::Io {
                location: self.location(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), "credentials written");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store, used when credentials come from somewhere other than a file
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    credentials: Arc<RwLock<Option<Credentials>>>,
}

impl InMemoryCredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Arc::new(RwLock::new(Some(credentials))),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Current contents, as last saved
    pub fn snapshot(&self) -> Option<Credentials> {
        self.credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Credentials, StoreError> {
        self.snapshot()
            .ok_or_else(|| StoreError::NotFound(self.location()))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        *self
            .credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credentials.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials {
            token: Some("ya29.sample".to_string()),
            refresh_token: Some("1//sample".to_string()),
            scopes: vec!["https://www.googleapis.com/auth/youtube.force-ssl".to_string()],
            ..Credentials::default()
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token.json"));
        assert!(matches!(store.load(), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn garbage_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "not json at all").unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Malformed { .. })));
    }

    #[test]
    fn file_store_saves_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token.json"));
        assert_eq!(store.path(), dir.path().join("token.json"));

        store.save(&sample()).unwrap();

        assert_eq!(store.load().unwrap(), sample());
        assert!(!dir.path().join("token.json.tmp").exists());
    }

    #[test]
    fn memory_store_round_trips() {
        let store = InMemoryCredentialStore::empty();
        assert!(matches!(store.load(), Err(StoreError::NotFound(_))));

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
        assert_eq!(store.snapshot(), Some(sample()));
    }
}
