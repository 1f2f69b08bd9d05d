use serde::Serialize;

use crate::domain::types::{PhoneNumber, TypeConstraintError};
use crate::forms::FormError;

/// Phone-only login form.
#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub phone: String,
}

/// Body of the login request.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub phone_number: PhoneNumber,
}

impl TryFrom<LoginForm> for LoginPayload {
    type Error = FormError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        let phone_number = PhoneNumber::new(form.phone).map_err(|err| match err {
            TypeConstraintError::EmptyString => FormError::rule("Please enter a phone number"),
            _ => FormError::rule("Phone number must contain digits only"),
        })?;
        Ok(Self { phone_number })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_is_sent_as_raw_digits() {
        let payload = LoginPayload::try_from(LoginForm {
            phone: " 9999999999 ".into(),
        })
        .unwrap();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"phoneNumber": "9999999999"})
        );
    }

    #[test]
    fn non_digit_phone_is_rejected() {
        let err = LoginPayload::try_from(LoginForm {
            phone: "+91-99".into(),
        })
        .unwrap_err();

        assert_eq!(err.user_message(), "Phone number must contain digits only");
    }
}
