//! View models for the KYC review queue and detail view.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::kyc::KycSubmission;
use crate::dto::tags::{self, Tag};

pub(crate) fn display_timestamp(value: Option<DateTime<Utc>>, fallback: &str) -> String {
    value
        .map(|d| d.format("%d/%m/%Y, %H:%M:%S").to_string())
        .unwrap_or_else(|| fallback.to_string())
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KycRow {
    pub id: String,
    pub phone: String,
    pub name: Option<String>,
    pub id_type: String,
    pub status: Tag,
    pub submitted_at: String,
    pub reviewed_at: String,
    /// Approve and reject buttons are shown only for pending items.
    pub actionable: bool,
}

impl From<&KycSubmission> for KycRow {
    fn from(kyc: &KycSubmission) -> Self {
        Self {
            id: kyc.id.to_string(),
            phone: kyc.user_phone().unwrap_or("N/A").to_string(),
            name: kyc.user_name().map(str::to_string),
            id_type: kyc
                .id_type
                .as_deref()
                .map(str::to_uppercase)
                .unwrap_or_else(|| "N/A".to_string()),
            status: tags::kyc_queue_tag(kyc.status),
            submitted_at: display_timestamp(kyc.submitted_at, "Not submitted"),
            reviewed_at: display_timestamp(kyc.reviewed_at, "Not reviewed"),
            actionable: kyc.status.is_actionable(),
        }
    }
}

/// One of the four document images of a submission.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DocumentSlot {
    pub label: &'static str,
    pub url: Option<String>,
}

impl DocumentSlot {
    pub const PLACEHOLDER: &'static str = "Not provided";

    pub fn display(&self) -> &str {
        self.url.as_deref().unwrap_or(Self::PLACEHOLDER)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KycDetailView {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub id_type: String,
    pub status: Tag,
    pub submitted_at: String,
    pub reviewed_at: String,
    pub reviewed_by: Option<String>,
    /// Always four entries, in display order.
    pub documents: Vec<DocumentSlot>,
    pub rejection_reason: Option<String>,
    pub actionable: bool,
}

impl From<&KycSubmission> for KycDetailView {
    fn from(kyc: &KycSubmission) -> Self {
        let slot = |label, url: &Option<String>| DocumentSlot {
            label,
            url: url.clone().filter(|u| !u.trim().is_empty()),
        };

        Self {
            id: kyc.id.to_string(),
            phone: kyc.user_phone().unwrap_or("N/A").to_string(),
            name: kyc.user_name().unwrap_or("N/A").to_string(),
            id_type: kyc
                .id_type
                .as_deref()
                .map(str::to_uppercase)
                .unwrap_or_else(|| "N/A".to_string()),
            status: tags::kyc_queue_tag(kyc.status),
            submitted_at: display_timestamp(kyc.submitted_at, "N/A"),
            reviewed_at: display_timestamp(kyc.reviewed_at, "N/A"),
            reviewed_by: kyc.reviewed_by.clone(),
            documents: vec![
                slot("ID Front", &kyc.id_front_url),
                slot("ID Back", &kyc.id_back_url),
                slot("Police Verification", &kyc.police_verification_url),
                slot("Selfie", &kyc.selfie_url),
            ],
            rejection_reason: kyc.rejection_reason.clone(),
            actionable: kyc.status.is_actionable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn detail_always_has_four_slots() {
        let kyc: KycSubmission = serde_json::from_value(json!({
            "id": "k1", "status": "REJECTED", "selfieUrl": "https://cdn/selfie.jpg",
            "idFrontUrl": "", "rejectionReason": "blurry"
        }))
        .unwrap();

        let view = KycDetailView::from(&kyc);

        let shown: Vec<&str> = view.documents.iter().map(DocumentSlot::display).collect();
        assert_eq!(
            shown,
            vec!["Not provided", "Not provided", "Not provided", "https://cdn/selfie.jpg"]
        );
        assert_eq!(view.documents[2].label, "Police Verification");
        assert!(!view.actionable);
        assert_eq!(view.rejection_reason.as_deref(), Some("blurry"));
    }

    #[test]
    fn row_marks_unreviewed_items() {
        let mut kyc: KycSubmission = serde_json::from_value(json!({
            "id": "k2", "status": "PENDING", "idType": "pan",
            "user": {"phone": "9000000000", "profile": {"name": "Ravi"}}
        }))
        .unwrap();
        kyc.submitted_at = Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap());

        let row = KycRow::from(&kyc);

        assert_eq!(row.id_type, "PAN");
        assert_eq!(row.phone, "9000000000");
        assert_eq!(row.name.as_deref(), Some("Ravi"));
        assert_eq!(row.submitted_at, "05/03/2024, 09:30:00");
        assert_eq!(row.reviewed_at, "Not reviewed");
        assert!(row.actionable);
    }
}
