use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::models::Session;
use crate::domain::ports::SessionStore;

/// Process-local session store
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: RwLock<Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that starts out logged in with `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            session: RwLock::new(Session::anonymous().with_token(token.into())),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    async fn replace_token(&self, token: String) -> Session {
        let mut session = self.session.write().await;
        *session = session.with_token(token);
        session.clone()
    }

    async fn clear(&self) -> Session {
        let mut session = self.session.write().await;
        *session = session.cleared();
        session.clone()
    }
}
