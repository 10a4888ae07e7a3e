//! Session manager: the single owner of authentication state.
//!
//! State lives in one persisted slot ([`SessionStore`]) holding token,
//! scheme, username and absolute expiry. Expiry is checked lazily on every
//! read; an expired session is cleared on the spot. Two [`Subject`]s
//! broadcast the authenticated flag and the current username.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tarefas_core::{Clock, Subject, Subscription};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ErrorContext};
use crate::transport::{ApiRequest, Transport};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub senha: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub scheme: String,
    pub username: String,
    /// Added to "now" as milliseconds.
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub scheme: String,
    pub username: String,
    pub expires_at_ms: i64,
}

impl Session {
    /// `"{scheme} {token}"`, or None when the server sent no scheme.
    pub fn authorization_header(&self) -> Option<String> {
        if self.scheme.is_empty() || self.token.is_empty() {
            return None;
        }
        Some(format!("{} {}", self.scheme, self.token))
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Persisted form: four independent entries, any of which may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_expires: Option<i64>,
}

impl StoredSession {
    /// Without a token (or expiry) nothing else counts.
    pub fn to_session(&self) -> Option<Session> {
        let token = self.auth_token.clone().filter(|t| !t.is_empty())?;
        let expires_at_ms = self.auth_expires?;
        Some(Session {
            token,
            scheme: self.auth_type.clone().unwrap_or_default(),
            username: self.auth_username.clone().unwrap_or_default(),
            expires_at_ms,
        })
    }
}

impl From<&Session> for StoredSession {
    fn from(s: &Session) -> Self {
        Self {
            auth_token: Some(s.token.clone()),
            auth_type: Some(s.scheme.clone()),
            auth_username: Some(s.username.clone()),
            auth_expires: Some(s.expires_at_ms),
        }
    }
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<StoredSession>;
    fn save(&self, session: &StoredSession) -> Result<()>;
    /// Remove every entry in one step.
    fn clear(&self) -> Result<()>;
}

/// JSON file store, e.g. `~/.tarefas/session.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<StoredSession> {
        let p = &self.path;
        if !p.exists() {
            return Ok(StoredSession::default());
        }
        let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        let p = &self.path;
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let s = serde_json::to_string_pretty(session)?;
        fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let p = &self.path;
        if p.exists() {
            fs::remove_file(p).with_context(|| format!("remove {}", p.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<StoredSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(session: StoredSession) -> Self {
        Self {
            slot: Mutex::new(session),
        }
    }

    fn slot(&self) -> MutexGuard<'_, StoredSession> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<StoredSession> {
        Ok(self.slot().clone())
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        *self.slot() = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot() = StoredSession::default();
        Ok(())
    }
}

pub struct SessionManager {
    store: Box<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    transport: Arc<dyn Transport>,
    login_url: String,
    // serializes check-then-clear sequences against the store
    write_lock: Mutex<()>,
    authenticated: Subject<bool>,
    username: Subject<Option<String>>,
}

impl SessionManager {
    /// `transport` is used for the login call only, which never carries an
    /// Authorization header.
    pub fn new(
        store: impl SessionStore + 'static,
        clock: Arc<dyn Clock>,
        transport: Arc<dyn Transport>,
        login_url: impl Into<String>,
    ) -> Self {
        let mgr = Self {
            store: Box::new(store),
            clock,
            transport,
            login_url: login_url.into(),
            write_lock: Mutex::new(()),
            authenticated: Subject::new(false),
            username: Subject::new(None),
        };
        if let Some(s) = mgr.current_session() {
            mgr.authenticated.next(true);
            mgr.username.next(Some(s.username));
        }
        mgr
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<Session, ApiError> {
        debug!(username = %credentials.username, url = %self.login_url, "login request");
        let req = ApiRequest::post(&self.login_url).json(credentials)?;
        let resp = self
            .transport
            .execute(req)
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        if !resp.is_success() {
            let err = ApiError::from_status(ErrorContext::Login, resp.status, &resp.body);
            warn!(status = %resp.status, error = %err, "login failed");
            return Err(err);
        }

        let body: LoginResponse = resp.json()?;
        let session = Session {
            token: body.token,
            scheme: body.scheme,
            username: body.username,
            expires_at_ms: self.clock.now_ms().saturating_add(body.expires_in),
        };

        {
            let _g = self.guard();
            self.store
                .save(&StoredSession::from(&session))
                .map_err(|e| ApiError::Storage(format!("{e:#}")))?;
        }

        info!(username = %session.username, expires_at_ms = session.expires_at_ms, "logged in");
        self.authenticated.next(true);
        self.username.next(Some(session.username.clone()));
        Ok(session)
    }

    /// Clears the persisted session and publishes the logged-out state.
    /// Safe to call repeatedly.
    pub fn logout(&self) {
        {
            let _g = self.guard();
            self.clear_store();
        }
        info!("logged out");
        self.publish_logged_out();
    }

    /// Logs out only if `token` is still the stored token. Returns whether
    /// this call performed the logout.
    pub fn invalidate(&self, token: &str) -> bool {
        let matched = {
            let _g = self.guard();
            let current = self.load_stored();
            let matched = current.auth_token.as_deref() == Some(token);
            if matched {
                self.clear_store();
            }
            matched
        };
        if matched {
            info!("session invalidated");
            self.publish_logged_out();
        }
        matched
    }

    /// The stored session if it has not expired. An expired one is cleared.
    pub fn current_session(&self) -> Option<Session> {
        let session = self.load_stored().to_session()?;
        if session.is_expired_at(self.clock.now_ms()) {
            debug!(expires_at_ms = session.expires_at_ms, "session expired");
            self.logout();
            return None;
        }
        Some(session)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    pub fn authorization_header_value(&self) -> Option<String> {
        self.current_session()?.authorization_header()
    }

    pub fn current_username(&self) -> Option<String> {
        self.current_session().map(|s| s.username)
    }

    pub fn subscribe_authenticated<F>(&self, f: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.authenticated.subscribe(f)
    }

    pub fn subscribe_username<F>(&self, f: F) -> Subscription
    where
        F: Fn(&Option<String>) + Send + Sync + 'static,
    {
        self.username.subscribe(f)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load_stored(&self) -> StoredSession {
        self.store.load().unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "could not read session; treating as logged out");
            StoredSession::default()
        })
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %format!("{e:#}"), "could not clear session");
        }
    }

    fn publish_logged_out(&self) {
        self.authenticated.next(false);
        self.username.next(None);
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("login_url", &self.login_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_session_without_token_is_absent() {
        let s = StoredSession {
            auth_token: None,
            auth_type: Some("Bearer".into()),
            auth_username: Some("alice".into()),
            auth_expires: Some(10),
        };
        assert_eq!(s.to_session(), None);
    }

    #[test]
    fn header_needs_scheme() {
        let mut s = Session {
            token: "abc".into(),
            scheme: "Bearer".into(),
            username: "alice".into(),
            expires_at_ms: 10,
        };
        assert_eq!(s.authorization_header().as_deref(), Some("Bearer abc"));
        s.scheme.clear();
        assert_eq!(s.authorization_header(), None);
        assert!(s.is_expired_at(10));
        assert!(!s.is_expired_at(9));
    }

    #[test]
    fn file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));
        assert_eq!(store.load().unwrap(), StoredSession::default());

        let stored = StoredSession {
            auth_token: Some("abc".into()),
            auth_type: Some("Bearer".into()),
            auth_username: Some("alice".into()),
            auth_expires: Some(1_700_000_000_000),
        };
        store.save(&stored).unwrap();
        assert_eq!(store.load().unwrap(), stored);

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"auth_expires\""));

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }
}
