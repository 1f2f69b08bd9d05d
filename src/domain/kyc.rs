use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{KycId, TypeConstraintError};

/// Review state of a KYC submission.
///
/// `Pending` is the only state with outgoing transitions; `Verified` and
/// `Rejected` are terminal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    Pending,
    Verified,
    Rejected,
}

impl KycStatus {
    pub const ALL: [KycStatus; 3] = [KycStatus::Pending, KycStatus::Verified, KycStatus::Rejected];

    pub const fn as_str(self) -> &'static str {
        match self {
            KycStatus::Pending => "PENDING",
            KycStatus::Verified => "VERIFIED",
            KycStatus::Rejected => "REJECTED",
        }
    }

    /// Whether staff may still approve or reject a submission in this state.
    pub const fn is_actionable(self) -> bool {
        matches!(self, KycStatus::Pending)
    }
}

impl Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KycStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(KycStatus::Pending),
            "VERIFIED" => Ok(KycStatus::Verified),
            "REJECTED" => Ok(KycStatus::Rejected),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown kyc status `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KycSubmission {
    pub id: KycId,
    #[serde(default)]
    pub user: Option<KycUser>,
    #[serde(default)]
    pub id_type: Option<String>,
    pub status: KycStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub id_front_url: Option<String>,
    #[serde(default)]
    pub id_back_url: Option<String>,
    #[serde(default)]
    pub police_verification_url: Option<String>,
    #[serde(default)]
    pub selfie_url: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Subset of the submitting account embedded in KYC listings.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct KycUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile: Option<KycUserProfile>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct KycUserProfile {
    #[serde(default)]
    pub name: Option<String>,
}

impl KycSubmission {
    /// Phone of the submitting account, if the listing embedded it.
    pub fn user_phone(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.phone.as_deref())
    }

    /// Profile name of the submitting account, if known.
    pub fn user_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.profile.as_ref())
            .and_then(|p| p.name.as_deref())
    }
}
