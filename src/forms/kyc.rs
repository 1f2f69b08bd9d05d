use serde::Serialize;

use crate::domain::types::RejectionReason;
use crate::forms::FormError;

/// Reject dialog of a KYC submission.
#[derive(Clone, Debug, Default)]
pub struct RejectKycForm {
    pub reason: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RejectKycPayload {
    pub rejection_reason: RejectionReason,
}

impl TryFrom<RejectKycForm> for RejectKycPayload {
    type Error = FormError;

    fn try_from(form: RejectKycForm) -> Result<Self, Self::Error> {
        let rejection_reason = RejectionReason::new(form.reason)
            .map_err(|_| FormError::rule("Please provide a rejection reason"))?;
        Ok(Self { rejection_reason })
    }
}
