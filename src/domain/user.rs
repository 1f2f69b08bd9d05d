use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::kyc::KycSubmission;
use crate::domain::types::{TypeConstraintError, UserId};

/// Moderation status of an account. Changed only by an explicit admin action.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Pending,
    Verified,
    Flagged,
}

impl UserStatus {
    pub const ALL: [UserStatus; 3] = [UserStatus::Pending, UserStatus::Verified, UserStatus::Flagged];

    pub const fn as_str(self) -> &'static str {
        match self {
            UserStatus::Pending => "PENDING",
            UserStatus::Verified => "VERIFIED",
            UserStatus::Flagged => "FLAGGED",
        }
    }
}

impl Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(UserStatus::Pending),
            "VERIFIED" => Ok(UserStatus::Verified),
            "FLAGGED" => Ok(UserStatus::Flagged),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown user status `{other}`"
            ))),
        }
    }
}

/// Subscription tier of an account.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PremiumStatus {
    Free,
    Premium,
}

impl PremiumStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            PremiumStatus::Free => "FREE",
            PremiumStatus::Premium => "PREMIUM",
        }
    }
}

impl FromStr for PremiumStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE" => Ok(PremiumStatus::Free),
            "PREMIUM" => Ok(PremiumStatus::Premium),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown premium status `{other}`"
            ))),
        }
    }
}

/// Account record as listed and inspected by staff.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    pub phone: String,
    pub status: UserStatus,
    #[serde(default)]
    pub premium_status: Option<PremiumStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub profile: Option<Profile>,
    /// The backend serialises this relation either as an object or as a
    /// one-element array.
    #[serde(default, deserialize_with = "zero_or_one")]
    pub kyc: Option<KycSubmission>,
}

/// Public profile attached to an account.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub budget_min: Option<f64>,
    #[serde(default)]
    pub budget_max: Option<f64>,
    #[serde(default)]
    pub move_in_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "location_names")]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub question_responses: Vec<QuestionResponse>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Photo {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
}

/// One answer of the profile questionnaire.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    #[serde(default)]
    pub question: Option<AnsweredQuestion>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub text_response: Option<String>,
    #[serde(default)]
    pub option_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AnsweredQuestion {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub options: Vec<AnsweredOption>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnsweredOption {
    pub id: String,
    pub text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn zero_or_one<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value = Option::<OneOrMany<T>>::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(OneOrMany::One(item)) => Some(item),
        Some(OneOrMany::Many(items)) => items.into_iter().next(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocationRef {
    Name(String),
    Named { name: String },
}

fn location_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Option::<Vec<LocationRef>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(refs
        .into_iter()
        .map(|r| match r {
            LocationRef::Name(name) | LocationRef::Named { name } => name,
        })
        .collect())
}
