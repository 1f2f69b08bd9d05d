//! Session persistence and the gate that owns session state.
//!
//! [`SessionStorage`] backends persist the session between runs:
//!
//! - [`FileSessionStorage`] writes a JSON file with owner-only permissions
//! - [`MemorySessionStorage`] keeps it in memory for tests
//!
//! [`SessionGate`] is the only writer. The API client reads the token and
//! reports 401s through [`SessionProvider`].

use std::cell::RefCell;

use thiserror::Error;

use crate::api::{AuthApi, SessionProvider};
use crate::domain::session::Session;
use crate::forms::login::{LoginForm, LoginPayload};
use crate::services::notifications::Notifier;
use crate::services::{ServiceError, ServiceResult};

mod file;
mod memory;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use file::FileSessionStorage;
pub use memory::MemorySessionStorage;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file io: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Durable home of the session. Token values must never be logged.
pub trait SessionStorage {
    fn load(&self) -> SessionResult<Option<Session>>;
    fn save(&self, session: &Session) -> SessionResult<()>;
    fn clear(&self) -> SessionResult<()>;
}

/// Which top-level view the shell should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Console,
}

pub struct SessionGate<S: SessionStorage> {
    storage: S,
    notifier: Notifier,
    current: RefCell<Option<Session>>,
}

impl<S: SessionStorage> SessionGate<S> {
    /// Reads the persisted session. An unreadable session is discarded and
    /// the user starts logged out.
    pub fn restore(storage: S, notifier: Notifier) -> Self {
        let current = match storage.load() {
            Ok(session) => session,
            Err(err) => {
                log::error!("Discarding unreadable session: {err}");
                if let Err(err) = storage.clear() {
                    log::error!("Failed to clear session storage: {err}");
                }
                None
            }
        };
        if let Some(session) = &current {
            log::info!("Restored session for user {}", session.user.id);
        }
        Self {
            storage,
            notifier,
            current: RefCell::new(current),
        }
    }

    /// Exchanges a phone number for a session and persists it.
    pub async fn login<A>(&self, api: &A, form: LoginForm) -> ServiceResult<Session>
    where
        A: AuthApi + ?Sized,
    {
        let payload = match LoginPayload::try_from(form) {
            Ok(payload) => payload,
            Err(err) => {
                self.notifier.error(err.user_message());
                return Err(err.into());
            }
        };

        let session = api.login(&payload).await.map_err(|err| {
            log::error!("Login failed: {err}");
            self.notifier.error(err.user_message("Login failed"));
            ServiceError::from(err)
        })?;

        self.storage.save(&session).map_err(|err| {
            log::error!("Failed to persist session: {err}");
            ServiceError::from(err)
        })?;
        log::info!("Logged in as user {}", session.user.id);
        self.notifier.success("Login successful");
        *self.current.borrow_mut() = Some(session.clone());
        Ok(session)
    }

    pub fn logout(&self) -> ServiceResult<()> {
        *self.current.borrow_mut() = None;
        self.storage.clear().map_err(|err| {
            log::error!("Failed to clear session storage: {err}");
            ServiceError::from(err)
        })?;
        log::info!("Logged out");
        Ok(())
    }

    pub fn route(&self) -> Route {
        if self.is_authenticated() {
            Route::Console
        } else {
            Route::Login
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }
}

impl<S: SessionStorage> SessionProvider for SessionGate<S> {
    fn token(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|s| s.token.clone())
    }

    fn on_unauthorized(&self) {
        let had_session = self.current.borrow_mut().take().is_some();
        if let Err(err) = self.storage.clear() {
            log::error!("Failed to clear session storage: {err}");
        }
        if had_session {
            self.notifier
                .warning("Your session has expired. Please log in again.");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use mockall::predicate::always;

    use super::mock::MockStorage;
    use super::*;
    use crate::api::memory::InMemoryBackend;
    use crate::domain::session::SessionUser;

    fn session() -> Session {
        Session {
            token: "t-1".into(),
            user: SessionUser {
                id: "admin-1".into(),
                phone: "9999999999".into(),
                profile: None,
            },
        }
    }

    #[test]
    fn restored_session_routes_to_console() {
        let mut storage = MockStorage::new();
        storage.expect_load().returning(|| Ok(Some(session())));

        let gate = SessionGate::restore(storage, Notifier::new());

        assert_eq!(gate.route(), Route::Console);
        assert_eq!(gate.token().as_deref(), Some("t-1"));
    }

    #[test]
    fn unreadable_session_is_cleared() {
        let mut storage = MockStorage::new();
        storage
            .expect_load()
            .returning(|| Err(SessionError::Io(io::Error::other("corrupt"))));
        storage.expect_clear().times(1).returning(|| Ok(()));

        let gate = SessionGate::restore(storage, Notifier::new());

        assert_eq!(gate.route(), Route::Login);
    }

    #[test]
    fn unauthorized_clears_session_and_storage() {
        let mut storage = MockStorage::new();
        storage.expect_load().returning(|| Ok(Some(session())));
        storage.expect_clear().times(1).returning(|| Ok(()));
        let notifier = Notifier::new();

        let gate = SessionGate::restore(storage, notifier.clone());
        gate.on_unauthorized();

        assert_eq!(gate.route(), Route::Login);
        assert_eq!(gate.token(), None);
        assert_eq!(notifier.len(), 1);
    }

    #[test]
    fn logout_clears_storage_once() {
        let mut storage = MockStorage::new();
        storage.expect_load().returning(|| Ok(Some(session())));
        storage.expect_clear().times(1).returning(|| Ok(()));

        let gate = SessionGate::restore(storage, Notifier::new());
        gate.logout().unwrap();

        assert_eq!(gate.route(), Route::Login);
        assert_eq!(gate.token(), None);
    }

    #[test]
    fn logged_out_session_stays_gone_after_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileSessionStorage::new(&path).save(&session()).unwrap();

        let gate = SessionGate::restore(FileSessionStorage::new(&path), Notifier::new());
        assert_eq!(gate.route(), Route::Console);
        gate.logout().unwrap();

        assert!(!path.exists());
        let reloaded = SessionGate::restore(FileSessionStorage::new(&path), Notifier::new());
        assert_eq!(reloaded.route(), Route::Login);
    }

    #[tokio::test]
    async fn login_persists_session() {
        let mut storage = MockStorage::new();
        storage.expect_load().returning(|| Ok(None));
        storage.expect_save().with(always()).times(1).returning(|_| Ok(()));
        let backend = InMemoryBackend::new();

        let gate = SessionGate::restore(storage, Notifier::new());
        let session = gate
            .login(
                &backend,
                LoginForm {
                    phone: "9999999999".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(session.user.phone, "9999999999");
        assert_eq!(gate.token(), Some(session.token));
        assert_eq!(gate.route(), Route::Console);
    }

    #[tokio::test]
    async fn invalid_phone_never_calls_backend() {
        let mut storage = MockStorage::new();
        storage.expect_load().returning(|| Ok(None));
        let backend = InMemoryBackend::new();
        let notifier = Notifier::new();

        let gate = SessionGate::restore(storage, notifier.clone());
        let err = gate
            .login(
                &backend,
                LoginForm {
                    phone: "99-99".into(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Form(_)));
        assert!(backend.calls().is_empty());
        assert_eq!(
            notifier.drain()[0].message,
            "Phone number must contain digits only"
        );
    }
}
