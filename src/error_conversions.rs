//! Error conversion glue between the `data` layer and the client layers.
//!
//! The domain layer must not depend on API or service error types, so the
//! conversions live here behind the `client` feature.

use crate::api::ApiError;
use crate::domain::types::TypeConstraintError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

/// A backend value that breaks a domain constraint is a decoding failure.
impl From<TypeConstraintError> for ApiError {
    fn from(val: TypeConstraintError) -> Self {
        ApiError::Decode(val.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::LocationId;

    #[test]
    fn constraint_errors_convert() {
        let err = LocationId::new(" ").unwrap_err();

        assert!(matches!(ApiError::from(err), ApiError::Decode(_)));
        assert!(matches!(
            ServiceError::from(TypeConstraintError::EmptyString),
            ServiceError::TypeConstraint(message) if message == "value cannot be empty"
        ));
    }
}
