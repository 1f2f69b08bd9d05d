//! View models for the users table and the user detail view.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::user::{Profile, QuestionResponse, UserAccount};
use crate::dto::kyc::display_timestamp;
use crate::dto::tags::{self, Tag};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserRow {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub status: Tag,
    pub premium: Option<Tag>,
    pub kyc: Tag,
    pub joined: String,
}

impl From<&UserAccount> for UserRow {
    fn from(user: &UserAccount) -> Self {
        Self {
            id: user.id.to_string(),
            phone: user.phone.clone(),
            name: user
                .profile
                .as_ref()
                .and_then(|p| p.name.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            status: tags::user_status_tag(user.status),
            premium: tags::premium_tag(user.premium_status),
            kyc: tags::user_kyc_tag(user.kyc.as_ref()),
            joined: display_date(user.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Answer {
    pub label: String,
    pub value: String,
}

impl From<&QuestionResponse> for Answer {
    fn from(response: &QuestionResponse) -> Self {
        let label = response
            .question
            .as_ref()
            .and_then(|q| q.text.clone())
            .unwrap_or_else(|| "Question".to_string());

        let chosen_option = || {
            let option_id = response.option_id.as_deref()?;
            response
                .question
                .as_ref()?
                .options
                .iter()
                .find(|o| o.id == option_id)
                .map(|o| o.text.clone())
        };

        let value = non_blank(&response.response)
            .or_else(|| non_blank(&response.text_response))
            .or_else(chosen_option)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Self { label, value }
    }
}

/// Everything the user detail view renders.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserDetailView {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub status: Tag,
    pub premium: Option<Tag>,
    pub joined: String,
    pub last_seen: String,
    pub age: String,
    pub gender: String,
    pub occupation: String,
    pub budget: String,
    pub move_in: String,
    pub preferred_locations: Vec<String>,
    pub bio: Option<String>,
    pub photos: Vec<String>,
    pub answers: Vec<Answer>,
    pub kyc: Option<UserKycSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserKycSummary {
    pub status: Tag,
    pub id_type: String,
    pub submitted_at: String,
}

/// Shown in place of [`UserKycSummary`] when the user never submitted KYC.
pub const NO_KYC_MESSAGE: &str = "No KYC information found for this user";

impl From<&UserAccount> for UserDetailView {
    fn from(user: &UserAccount) -> Self {
        let empty = Profile::default();
        let profile = user.profile.as_ref().unwrap_or(&empty);

        Self {
            id: user.id.to_string(),
            phone: user.phone.clone(),
            name: or_na(profile.name.clone()),
            status: tags::user_status_tag(user.status),
            premium: tags::premium_tag(user.premium_status),
            joined: display_date(user.created_at),
            last_seen: display_timestamp(profile.last_seen, NOT_AVAILABLE),
            age: or_na(profile.age.map(|a| a.to_string())),
            gender: or_na(profile.gender.clone()),
            occupation: or_na(profile.occupation.clone()),
            budget: budget_range(profile.budget_min, profile.budget_max),
            move_in: profile
                .move_in_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "Flexible".to_string()),
            preferred_locations: profile.preferred_locations.clone(),
            bio: profile.bio.clone(),
            photos: profile.photos.iter().map(|p| p.url.clone()).collect(),
            answers: profile.question_responses.iter().map(Answer::from).collect(),
            kyc: user.kyc.as_ref().map(|kyc| UserKycSummary {
                status: tags::kyc_review_tag(kyc.status),
                id_type: or_na(kyc.id_type.as_ref().map(|t| t.to_uppercase())),
                submitted_at: display_timestamp(kyc.submitted_at, NOT_AVAILABLE),
            }),
        }
    }
}

fn or_na(value: Option<String>) -> String {
    non_blank(&value).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

fn display_date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn budget_range(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) if min > 0.0 && max > 0.0 => {
            format!("{} - {}", format_inr(min), format_inr(max))
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Rupee amount rounded to three significant digits with Indian digit
/// grouping, e.g. `₹1,50,000`.
pub fn format_inr(amount: f64) -> String {
    let rounded = round_significant(amount.abs(), 3) as u64;
    let digits = rounded.to_string();
    let sign = if amount < 0.0 && rounded > 0 { "-" } else { "" };

    if digits.len() <= 3 {
        return format!("{sign}₹{digits}");
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    groups.push(rest);
    groups.reverse();

    format!("{sign}₹{},{tail}", groups.join(","))
}

fn round_significant(value: f64, significant: i32) -> f64 {
    if value < 1.0 {
        return value.round();
    }
    let magnitude = value.log10().floor() as i32 + 1;
    if magnitude <= significant {
        return value.round();
    }
    let factor = 10f64.powi(magnitude - significant);
    (value / factor).round() * factor
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user(value: serde_json::Value) -> UserAccount {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn inr_uses_indian_grouping() {
        assert_eq!(format_inr(500.0), "₹500");
        assert_eq!(format_inr(15000.0), "₹15,000");
        assert_eq!(format_inr(150000.0), "₹1,50,000");
        assert_eq!(format_inr(12345678.0), "₹1,23,00,000");
    }

    #[test]
    fn row_falls_back_for_missing_profile_and_kyc() {
        let row = UserRow::from(&user(json!({
            "id": "u1", "phone": "9999999999", "status": "FLAGGED"
        })));

        assert_eq!(row.name, "N/A");
        assert_eq!(row.kyc.label, "No KYC");
        assert_eq!(row.status.label, "FLAGGED");
        assert!(row.premium.is_none());
    }

    #[test]
    fn detail_renders_profile_fallbacks() {
        let view = UserDetailView::from(&user(json!({
            "id": "u1",
            "phone": "9999999999",
            "status": "VERIFIED",
            "premiumStatus": "PREMIUM",
            "profile": {"name": "Asha", "budgetMin": 10000, "budgetMax": 25000},
            "kyc": [{"id": "k1", "status": "PENDING", "idType": "aadhaar"}]
        })));

        assert_eq!(view.budget, "₹10,000 - ₹25,000");
        assert_eq!(view.move_in, "Flexible");
        assert_eq!(view.age, "N/A");
        assert_eq!(view.premium.map(|t| t.label), Some("PREMIUM".to_string()));
        let kyc = view.kyc.unwrap();
        assert_eq!(kyc.id_type, "AADHAAR");
        assert_eq!(kyc.submitted_at, "N/A");
    }

    #[test]
    fn answers_prefer_response_then_text_then_option() {
        let profile: Profile = serde_json::from_value(json!({
            "questionResponses": [
                {"question": {"text": "Pets?"}, "response": "Yes", "textResponse": "ignored"},
                {"question": {"text": "About"}, "textResponse": "Quiet"},
                {"question": {"text": "Diet", "options": [{"id": "o1", "text": "Veg"}]}, "optionId": "o1"},
                {}
            ]
        }))
        .unwrap();

        let answers: Vec<Answer> = profile.question_responses.iter().map(Answer::from).collect();

        let values: Vec<&str> = answers.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(values, vec!["Yes", "Quiet", "Veg", "N/A"]);
        assert_eq!(answers[3].label, "Question");
    }
}
