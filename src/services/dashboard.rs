//! Dashboard counters.

use serde::Serialize;
use serde_json::Value;

use crate::api::{KycReader, UserReader};
use crate::services::notifications::Notifier;
use crate::services::{ServiceError, ServiceResult};

/// Backend statistics, passed through as returned.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub users: Value,
    pub kyc: Value,
}

/// Fetches user and KYC statistics concurrently. Either failure fails the
/// whole load.
pub async fn load_dashboard<A>(api: &A, notifier: &Notifier) -> ServiceResult<DashboardStats>
where
    A: UserReader + KycReader + ?Sized,
{
    let (users, kyc) = tokio::try_join!(api.user_stats(), api.kyc_stats()).map_err(|err| {
        log::error!("Failed to fetch dashboard stats: {err}");
        notifier.api_error(&err, "Failed to fetch statistics");
        ServiceError::from(err)
    })?;
    Ok(DashboardStats { users, kyc })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::ApiError;
    use crate::api::memory::InMemoryBackend;
    use crate::domain::kyc::KycSubmission;

    #[tokio::test]
    async fn both_stats_are_returned() {
        let backend = InMemoryBackend::new();
        let submission: KycSubmission =
            serde_json::from_value(json!({"id": "k1", "status": "PENDING"})).unwrap();
        backend.insert_kyc(submission);

        let stats = load_dashboard(&backend, &Notifier::new()).await.unwrap();

        assert_eq!(stats.users["total"], 0);
        assert_eq!(stats.kyc["pending"], 1);
        assert_eq!(backend.call_count("user_stats"), 1);
        assert_eq!(backend.call_count("kyc_stats"), 1);
    }

    #[tokio::test]
    async fn failure_is_reported_once() {
        let backend = InMemoryBackend::new();
        backend.fail_next(ApiError::Transport("timed out".into()));
        let notifier = Notifier::new();

        assert!(load_dashboard(&backend, &notifier).await.is_err());
        assert_eq!(notifier.drain().len(), 1);
    }
}
