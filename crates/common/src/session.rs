use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::api::v1::auth::User;

pub const SESSION_FILE_NAME: &str = "session.json";

/// The signed-in identity and the bearer token issued with it.
///
/// Both halves always travel together, so a user without a token (or the
/// reverse) cannot be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: User,
    pub token: String,
}

/// Read-only snapshot of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl From<Option<Credentials>> for Session {
    fn from(credentials: Option<Credentials>) -> Self {
        match credentials {
            Some(Credentials { user, token }) => Self {
                user: Some(user),
                token: Some(token),
            },
            None => Self::default(),
        }
    }
}

/// Process-wide holder of the current credentials.
///
/// Clones share the same underlying record. Writers only ever replace or clear
/// the whole record; readers never observe a half-updated session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Credentials>>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A store backed by a single session file.
    ///
    /// A missing or unreadable file yields an empty session.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let credentials = load_credentials(&path);
        Self {
            inner: Arc::new(RwLock::new(credentials)),
            path: Some(path),
        }
    }

    pub fn set_session(&self, user: User, token: impl Into<String>) {
        let credentials = Credentials {
            user,
            token: token.into(),
        };
        let mut guard = self.inner.write();
        self.persist(Some(&credentials));
        *guard = Some(credentials);
    }

    pub fn clear_session(&self) {
        let mut guard = self.inner.write();
        self.persist(None);
        *guard = None;
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().as_ref().map(|c| c.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.inner.read().as_ref().map(|c| c.user.clone())
    }

    pub fn session(&self) -> Session {
        self.inner.read().clone().into()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs with the write lock held, so the file always matches the last
    /// in-memory write. Blocking, but the file is a few hundred bytes.
    fn persist(&self, credentials: Option<&Credentials>) {
        let Some(path) = &self.path else {
            return;
        };

        let result = match credentials {
            Some(credentials) => serde_json::to_vec_pretty(credentials)
                .map_err(std::io::Error::from)
                .and_then(|json| write_private(path, &json)),
            None => match fs::remove_file(path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };

        if let Err(e) = result {
            tracing::warn!("failed to persist session to {}: {}", path.display(), e);
        }
    }
}

/// Write a file only the owner can read. The bearer token lives in it.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // `mode` only applies on create; tighten a file left by an older run
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents)
}

fn load_credentials(path: &Path) -> Option<Credentials> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("failed to read session file {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_slice(&raw) {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            tracing::warn!("ignoring corrupt session file {}: {}", path.display(), e);
            None
        }
    }
}
