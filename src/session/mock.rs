//! Mock session storage for isolating the session gate in tests.

use mockall::mock;

use crate::domain::session::Session;
use crate::session::{SessionResult, SessionStorage};

mock! {
    pub Storage {}

    impl SessionStorage for Storage {
        fn load(&self) -> SessionResult<Option<Session>>;
        fn save(&self, session: &Session) -> SessionResult<()>;
        fn clear(&self) -> SessionResult<()>;
    }
}
