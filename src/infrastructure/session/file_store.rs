//! Session store persisted as JSON so separate CLI runs share one login.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::models::Session;
use crate::domain::ports::SessionStore;

/// On-disk layout: the session plus the client's cookie jar, which holds the
/// HTTP-only refresh cookie.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(flatten)]
    session: Session,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cookies: Option<String>,
}

/// JSON file backed session store
///
/// The in-memory copy is authoritative; every write is mirrored to disk and
/// a failed write only produces a warning. The file holds credentials and is
/// written owner-only on unix.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    state: RwLock<SessionFile>,
}

impl FileSessionStore {
    /// Open the store at `path`, starting anonymous when the file is missing
    /// or unreadable.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring corrupt session file");
                SessionFile::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionFile::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read session file");
                SessionFile::default()
            }
        };
        debug!(
            path = %path.display(),
            authenticated = state.session.is_authenticated(),
            has_cookies = state.cookies.is_some(),
            "session store opened"
        );
        Self {
            path,
            state: RwLock::new(state),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, state: &SessionFile) {
        if let Err(e) = self.write_file(state).await {
            warn!(path = %self.path.display(), error = %e, "failed to persist session");
        }
    }

    async fn write_file(&self, state: &SessionFile) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, contents).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600); // rw-------
            tokio::fs::set_permissions(&self.path, perms).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn snapshot(&self) -> Session {
        self.state.read().await.session.clone()
    }

    async fn replace_token(&self, token: String) -> Session {
        let mut state = self.state.write().await;
        state.session = state.session.with_token(token);
        self.persist(&state).await;
        state.session.clone()
    }

    /// Also forgets the saved cookies; a cleared session cannot refresh.
    async fn clear(&self) -> Session {
        let mut state = self.state.write().await;
        state.session = state.session.cleared();
        state.cookies = None;
        self.persist(&state).await;
        state.session.clone()
    }

    async fn saved_cookies(&self) -> Option<String> {
        self.state.read().await.cookies.clone()
    }

    async fn save_cookies(&self, cookies: Option<String>) {
        let mut state = self.state.write().await;
        if state.cookies == cookies {
            return;
        }
        state.cookies = cookies;
        self.persist(&state).await;
    }
}
