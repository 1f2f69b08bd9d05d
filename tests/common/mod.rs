//! Shared helpers for integration tests.

use std::rc::Rc;
use std::time::Duration;

use staymate_admin::api::SessionProvider;
use staymate_admin::api::http::HttpAdminApi;
use staymate_admin::domain::session::{Session, SessionUser};
use staymate_admin::services::notifications::Notifier;
use staymate_admin::session::{MemorySessionStorage, SessionGate};
use url::Url;

pub type Gate = SessionGate<MemorySessionStorage>;

pub fn session(token: &str) -> Session {
    Session {
        token: token.to_string(),
        user: SessionUser {
            id: "admin-1".into(),
            phone: "9999999999".into(),
            profile: None,
        },
    }
}

/// Gate with an optional stored session and the notifier it reports to.
pub fn gate(stored: Option<Session>) -> (Rc<Gate>, Notifier) {
    let storage = match stored {
        Some(session) => MemorySessionStorage::with_session(session),
        None => MemorySessionStorage::new(),
    };
    let notifier = Notifier::new();
    (Rc::new(SessionGate::restore(storage, notifier.clone())), notifier)
}

/// HTTP adapter pointed at a mock server and reading tokens from `gate`.
pub fn http_api(uri: &str, gate: &Rc<Gate>) -> HttpAdminApi {
    let provider: Rc<dyn SessionProvider> = gate.clone();
    HttpAdminApi::new(
        Url::parse(uri).expect("mock server uri"),
        Duration::from_secs(5),
        provider,
    )
    .expect("http client")
}
