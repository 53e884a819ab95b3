//! Explicit session context shared by every collaborator that talks to the
//! service.
//!
//! A session created with remember-me is mirrored to `session.json` in the
//! data directory; otherwise it lives only in memory and ends with the
//! process.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::User;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    #[serde(default)]
    pub remember: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Cloneable handle to the one session of a running client.
#[derive(Clone, Debug, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
    store: Option<PathBuf>,
}

impl SessionHandle {
    /// In-memory only; nothing is written to disk even with remember-me.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Restores a remembered session from `path` if one exists.
    pub fn with_store(path: PathBuf) -> Self {
        let restored = read_session(&path).unwrap_or_default();
        if restored.is_authenticated() {
            tracing::info!(path = %path.display(), "restored remembered session");
        }
        Self {
            inner: Arc::new(RwLock::new(restored)),
            store: Some(path),
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.token.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_authenticated()
    }

    pub async fn begin(&self, token: String, user: User, remember: bool) -> Result<()> {
        let session = Session {
            token: Some(token),
            user: Some(user),
            remember,
        };
        *self.inner.write().await = session.clone();
        if remember {
            self.persist(&session)?;
        } else {
            self.remove_file();
        }
        Ok(())
    }

    /// Replaces the stored user, keeping the token.
    pub async fn set_user(&self, user: User) -> Result<()> {
        let session = {
            let mut guard = self.inner.write().await;
            guard.user = Some(user);
            guard.clone()
        };
        if session.remember {
            self.persist(&session)?;
        }
        Ok(())
    }

    /// Drops token and user from memory and disk.
    pub async fn clear(&self) {
        *self.inner.write().await = Session::default();
        self.remove_file();
    }

    fn persist(&self, session: &Session) -> Result<()> {
        let Some(path) = &self.store else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    fn remove_file(&self) {
        if let Some(path) = &self.store {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!(path = %path.display(), "failed to remove session file: {e}");
                }
            }
        }
    }
}

fn read_session(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PresenceStatus;

    fn user() -> User {
        User {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            avatar: String::new(),
            avatar_type: None,
            role: "Engineer".into(),
            status: PresenceStatus::Online,
            position: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_remembered_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let handle = SessionHandle::with_store(path.clone());
        handle.begin("tok".into(), user(), true).await.unwrap();
        assert!(path.exists());

        let restored = SessionHandle::with_store(path.clone());
        assert_eq!(restored.token().await.as_deref(), Some("tok"));
        assert_eq!(restored.user().await.map(|u| u.id), Some("u1".to_string()));

        restored.clear().await;
        assert!(!path.exists());
        assert!(!restored.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_unremembered_session_stays_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let handle = SessionHandle::with_store(path.clone());
        handle.begin("tok".into(), user(), false).await.unwrap();
        assert!(handle.is_authenticated().await);
        assert!(!path.exists());

        let mut renamed = user();
        renamed.name = "Ada L.".into();
        handle.set_user(renamed).await.unwrap();
        assert!(!path.exists());
        assert_eq!(handle.user().await.unwrap().name, "Ada L.");
    }
}
