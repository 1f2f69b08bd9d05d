use std::borrow::Cow;

use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::domain::location::Location;
use crate::domain::types::{LOCATION_NAME_MAX, LOCATION_NAME_MIN, LocationName};
use crate::forms::FormError;

const FIELD_ORDER: &[&str] = &["name"];

fn validate_location_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("Please enter a location name")));
    }
    if !(LOCATION_NAME_MIN..=LOCATION_NAME_MAX).contains(&len) {
        return Err(ValidationError::new("length").with_message(Cow::Borrowed(
            "Location name must be between 2 and 100 characters",
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Validate)]
/// Create/edit dialog of a location.
pub struct LocationForm {
    #[validate(custom(function = "validate_location_name"))]
    pub name: String,
    pub is_active: bool,
}

impl Default for LocationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_active: true,
        }
    }
}

impl From<&Location> for LocationForm {
    fn from(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            is_active: location.is_active,
        }
    }
}

/// Single edit applied to an open location dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocationChange {
    Name(String),
    Active(bool),
}

impl LocationForm {
    pub fn apply(&mut self, change: LocationChange) {
        match change {
            LocationChange::Name(name) => self.name = name,
            LocationChange::Active(is_active) => self.is_active = is_active,
        }
    }
}

/// Body of the create and update location requests.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub name: LocationName,
    pub is_active: bool,
}

impl TryFrom<LocationForm> for LocationPayload {
    type Error = FormError;

    fn try_from(form: LocationForm) -> Result<Self, Self::Error> {
        form.validate()
            .map_err(|errors| FormError::from_validation(errors, FIELD_ORDER))?;

        Ok(Self {
            name: LocationName::new(form.name)?,
            is_active: form.is_active,
        })
    }
}

/// Partial update that flips only the active flag.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocationStatusPayload {
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str) -> LocationForm {
        LocationForm {
            name: name.to_string(),
            is_active: true,
        }
    }

    #[test]
    fn name_is_trimmed_before_length_check() {
        let err = LocationPayload::try_from(form("  G  ")).unwrap_err();
        assert_eq!(
            err.user_message(),
            "Location name must be between 2 and 100 characters"
        );

        let payload = LocationPayload::try_from(form("  Gurugram ")).unwrap();
        assert_eq!(payload.name.as_str(), "Gurugram");
    }

    #[test]
    fn blank_name_reports_required() {
        let err = LocationPayload::try_from(form("   ")).unwrap_err();
        assert_eq!(err.user_message(), "Please enter a location name");
    }

    #[test]
    fn payload_uses_wire_names() {
        let payload = LocationPayload::try_from(LocationForm {
            name: "Noida".into(),
            is_active: false,
        })
        .unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"name": "Noida", "isActive": false})
        );
    }
}
