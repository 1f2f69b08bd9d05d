use std::cell::RefCell;

use crate::domain::session::Session;
use crate::session::{SessionResult, SessionStorage};

/// Keeps the session for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    session: RefCell<Option<Session>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RefCell::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> SessionResult<Option<Session>> {
        Ok(self.session.borrow().clone())
    }

    fn save(&self, session: &Session) -> SessionResult<()> {
        *self.session.borrow_mut() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        self.session.borrow_mut().take();
        Ok(())
    }
}
