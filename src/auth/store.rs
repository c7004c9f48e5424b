use std::path::PathBuf;

use crate::gateway::auth::AuthSession;

/// Persists the session token across process runs, in the data directory.
///
/// Loading tolerates a missing or corrupt file (treated as signed out);
/// clearing is idempotent. Failures here are logged, never fatal: the
/// session is a convenience cache, the gateway is the authority.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Option<AuthSession> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("could not read session file: {e}");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("session file is corrupt, ignoring it: {e}");
                None
            }
        }
    }

    pub fn save(&self, session: &AuthSession) {
        let json = match serde_json::to_string_pretty(session) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("could not serialize session: {e}");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("could not create data directory: {e}");
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::warn!("could not persist session: {e}");
        }
    }

    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("could not remove session file: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::auth::AuthUser;

    fn session() -> AuthSession {
        AuthSession {
            access_token: "tok".into(),
            refresh_token: Some("ref".into()),
            user: AuthUser {
                id: "u1".into(),
                email: Some("a@b.c".into()),
            },
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().join("session.json"));
        store.save(&session());
        let loaded = store.load().unwrap();
        assert_eq!(loaded.access_token, "tok");
        assert_eq!(loaded.user.id, "u1");
    }

    #[test]
    fn load_missing_file_is_signed_out() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().join("session.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn load_corrupt_file_is_signed_out() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = SessionStore::new(path);
        assert!(store.load().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().join("session.json"));
        store.save(&session());
        store.clear();
        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().join("nested/dir/session.json"));
        store.save(&session());
        assert!(store.load().is_some());
    }
}
