//! Status tags shown in tables and detail views.

use serde::Serialize;

use crate::domain::kyc::{KycStatus, KycSubmission};
use crate::domain::question::QuestionType;
use crate::domain::user::{PremiumStatus, UserStatus};

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
    Default,
    Success,
    Warning,
    Error,
    Processing,
    Gold,
    Blue,
    Green,
    Orange,
    Purple,
    Cyan,
    Red,
}

impl TagColor {
    pub const fn as_str(self) -> &'static str {
        match self {
            TagColor::Default => "default",
            TagColor::Success => "success",
            TagColor::Warning => "warning",
            TagColor::Error => "error",
            TagColor::Processing => "processing",
            TagColor::Gold => "gold",
            TagColor::Blue => "blue",
            TagColor::Green => "green",
            TagColor::Orange => "orange",
            TagColor::Purple => "purple",
            TagColor::Cyan => "cyan",
            TagColor::Red => "red",
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Tag {
    pub label: String,
    pub color: TagColor,
}

impl Tag {
    pub fn new(label: impl Into<String>, color: TagColor) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

pub fn user_status_tag(status: UserStatus) -> Tag {
    let color = match status {
        UserStatus::Verified => TagColor::Success,
        UserStatus::Pending => TagColor::Warning,
        UserStatus::Flagged => TagColor::Error,
    };
    Tag::new(status.as_str(), color)
}

/// KYC status as shown in the review queue, where pending items are in
/// progress.
pub fn kyc_queue_tag(status: KycStatus) -> Tag {
    let color = match status {
        KycStatus::Verified => TagColor::Success,
        KycStatus::Pending => TagColor::Processing,
        KycStatus::Rejected => TagColor::Error,
    };
    Tag::new(status.as_str(), color)
}

/// KYC status as shown on a user's detail view.
pub fn kyc_review_tag(status: KycStatus) -> Tag {
    let color = match status {
        KycStatus::Verified => TagColor::Success,
        KycStatus::Pending => TagColor::Warning,
        KycStatus::Rejected => TagColor::Error,
    };
    Tag::new(status.as_str(), color)
}

/// KYC column of the users table.
pub fn user_kyc_tag(kyc: Option<&KycSubmission>) -> Tag {
    match kyc {
        Some(submission) => kyc_queue_tag(submission.status),
        None => Tag::new("No KYC", TagColor::Default),
    }
}

pub fn premium_tag(status: Option<PremiumStatus>) -> Option<Tag> {
    match status {
        Some(PremiumStatus::Premium) => Some(Tag::new("PREMIUM", TagColor::Gold)),
        _ => None,
    }
}

pub fn question_type_label(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::Radio => "Radio Buttons",
        QuestionType::MultiSelect => "Multi-Select",
        QuestionType::Text => "Text Input",
        QuestionType::Number => "Number Input",
        QuestionType::Date => "Date Picker",
    }
}

pub fn question_type_tag(question_type: QuestionType) -> Tag {
    let color = match question_type {
        QuestionType::Radio => TagColor::Blue,
        QuestionType::MultiSelect => TagColor::Green,
        QuestionType::Text => TagColor::Orange,
        QuestionType::Number => TagColor::Purple,
        QuestionType::Date => TagColor::Cyan,
    };
    Tag::new(question_type_label(question_type), color)
}

pub fn required_tag(required: bool) -> Tag {
    if required {
        Tag::new("Required", TagColor::Red)
    } else {
        Tag::new("Optional", TagColor::Default)
    }
}

pub fn weight_tag(weight: f64) -> Tag {
    let color = if weight > 1.0 {
        TagColor::Gold
    } else {
        TagColor::Default
    };
    Tag::new(weight.to_string(), color)
}

pub fn active_tag(is_active: bool) -> Tag {
    if is_active {
        Tag::new("Active", TagColor::Green)
    } else {
        Tag::new("Inactive", TagColor::Red)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_status_colors() {
        assert_eq!(user_status_tag(UserStatus::Verified).color, TagColor::Success);
        assert_eq!(user_status_tag(UserStatus::Pending).color, TagColor::Warning);
        assert_eq!(user_status_tag(UserStatus::Flagged).color, TagColor::Error);
    }

    #[test]
    fn pending_kyc_differs_between_queue_and_detail() {
        assert_eq!(kyc_queue_tag(KycStatus::Pending).color, TagColor::Processing);
        assert_eq!(kyc_review_tag(KycStatus::Pending).color, TagColor::Warning);
        assert_eq!(user_kyc_tag(None), Tag::new("No KYC", TagColor::Default));
    }

    #[test]
    fn question_type_labels() {
        let tag = question_type_tag(QuestionType::MultiSelect);
        assert_eq!(tag.label, "Multi-Select");
        assert_eq!(tag.color.as_str(), "green");
        assert_eq!(weight_tag(1.5).color, TagColor::Gold);
        assert_eq!(weight_tag(1.0).label, "1");
    }
}
