//! Transient user-visible messages raised by controllers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::api::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

/// Maps a level to the tag the toast component is styled with.
pub fn level_to_str(level: Level) -> &'static str {
    match level {
        Level::Error => "error",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info => "info",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Shared queue of pending notifications. Clones share the same queue.
#[derive(Clone, Debug, Default)]
pub struct Notifier {
    queue: Rc<RefCell<VecDeque<Notification>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: Level, message: impl Into<String>) {
        self.queue.borrow_mut().push_back(Notification {
            level,
            message: message.into(),
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(Level::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    /// Reports a failed backend call. 401s are skipped; the session gate
    /// already announced the expired session.
    pub fn api_error(&self, err: &ApiError, fallback: &str) {
        if matches!(err, ApiError::Unauthorized) {
            return;
        }
        self.error(err.user_message(fallback));
    }

    /// Removes and returns every pending notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_queue() {
        let notifier = Notifier::new();
        let handle = notifier.clone();

        handle.success("Location created successfully");
        notifier.error("Failed to fetch locations");

        let drained = notifier.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].level, Level::Success);
        assert!(handle.is_empty());
    }

    #[test]
    fn unauthorized_is_not_reported_twice() {
        let notifier = Notifier::new();
        notifier.api_error(&ApiError::Unauthorized, "Failed to fetch users");
        assert!(notifier.is_empty());

        notifier.api_error(&ApiError::NotFound, "Failed to fetch users");
        assert_eq!(notifier.drain()[0].message, "Failed to fetch users");
    }
}
