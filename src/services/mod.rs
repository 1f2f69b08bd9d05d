//! Controllers driving the console screens.
//!
//! [`list::ResourceListController`] and [`form::ModalFormController`] hold the
//! generic list and dialog lifecycles; the per-screen modules configure them
//! for one entity each.

use thiserror::Error;

use crate::api::ApiError;
use crate::forms::FormError;
use crate::session::SessionError;

pub mod dashboard;
pub mod form;
pub mod kyc;
pub mod list;
pub mod locations;
pub mod notifications;
pub mod questions;
pub mod users;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// Local validation failed; carries the user-facing message.
    #[error("{0}")]
    Form(String),

    /// Refused because a submission is already in flight.
    #[error("another operation is in progress")]
    Busy,

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    #[error(transparent)]
    Api(ApiError),

    #[error("type constraint: {0}")]
    TypeConstraint(String),

    #[error("session storage: {0}")]
    Storage(#[from] SessionError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<ApiError> for ServiceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => ServiceError::Unauthorized,
            ApiError::NotFound => ServiceError::NotFound,
            other => ServiceError::Api(other),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(ApiError::Unauthorized),
            ServiceError::Unauthorized
        ));
        assert!(matches!(
            ServiceError::from(ApiError::NotFound),
            ServiceError::NotFound
        ));
        assert!(matches!(
            ServiceError::from(ApiError::Transport("reset".into())),
            ServiceError::Api(ApiError::Transport(_))
        ));
    }
}
