//! Backend ports and their adapters.
//!
//! Each entity gets a reader/writer pair of traits. [`http::HttpAdminApi`]
//! implements them over REST; [`memory::InMemoryBackend`] implements them in
//! process for tests and demos.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::kyc::{KycStatus, KycSubmission};
use crate::domain::location::{Location, LocationUsage};
use crate::domain::question::Question;
use crate::domain::session::Session;
use crate::domain::types::{KycId, LocationId, QuestionId, UserId};
use crate::domain::user::{PremiumStatus, UserAccount, UserStatus};
use crate::forms::kyc::RejectKycPayload;
use crate::forms::location::{LocationPayload, LocationStatusPayload};
use crate::forms::login::LoginPayload;
use crate::forms::question::QuestionPayload;

pub mod errors;
pub mod http;
pub mod memory;
mod wire;

pub use errors::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

/// One page of a collection plus the backend's total count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize) -> Self {
        Self { items, total }
    }

    /// A complete collection, where the total is the item count.
    pub fn all(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    pub premium_status: Option<PremiumStatus>,
    pub pagination: Option<Pagination>,
}

impl UserListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = Some(search).filter(|s| !s.trim().is_empty());
        self
    }

    pub fn status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn premium_status(mut self, premium_status: PremiumStatus) -> Self {
        self.premium_status = Some(premium_status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KycListQuery {
    pub status: Option<KycStatus>,
    pub pagination: Option<Pagination>,
}

impl KycListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: KycStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Read side of the session: supplies the bearer token and receives the
/// unauthorized signal. Only the session gate writes session state.
pub trait SessionProvider {
    fn token(&self) -> Option<String>;
    fn on_unauthorized(&self);
}

#[async_trait(?Send)]
pub trait AuthApi {
    async fn login(&self, payload: &LoginPayload) -> ApiResult<Session>;
}

#[async_trait(?Send)]
pub trait UserReader {
    async fn list_users(&self, query: UserListQuery) -> ApiResult<Page<UserAccount>>;
    async fn get_user(&self, id: &UserId) -> ApiResult<UserAccount>;
    async fn user_stats(&self) -> ApiResult<Value>;
}

#[async_trait(?Send)]
pub trait UserWriter {
    async fn update_user_status(&self, id: &UserId, status: UserStatus) -> ApiResult<()>;
    async fn delete_user(&self, id: &UserId) -> ApiResult<()>;
}

#[async_trait(?Send)]
pub trait KycReader {
    async fn list_kyc(&self, query: KycListQuery) -> ApiResult<Page<KycSubmission>>;
    async fn get_kyc(&self, id: &KycId) -> ApiResult<KycSubmission>;
    async fn kyc_stats(&self) -> ApiResult<Value>;
}

#[async_trait(?Send)]
pub trait KycWriter {
    async fn approve_kyc(&self, id: &KycId) -> ApiResult<()>;
    async fn reject_kyc(&self, id: &KycId, payload: &RejectKycPayload) -> ApiResult<()>;
}

#[async_trait(?Send)]
pub trait QuestionReader {
    /// Full questionnaire, flattened with each question's category name.
    async fn list_questions(&self) -> ApiResult<Vec<Question>>;
}

#[async_trait(?Send)]
pub trait QuestionWriter {
    async fn create_question(&self, payload: &QuestionPayload) -> ApiResult<()>;
    async fn update_question(&self, id: &QuestionId, payload: &QuestionPayload) -> ApiResult<()>;
    async fn delete_question(&self, id: &QuestionId) -> ApiResult<()>;
}

#[async_trait(?Send)]
pub trait LocationReader {
    async fn list_locations(&self) -> ApiResult<Vec<Location>>;
    async fn get_location(&self, id: &LocationId) -> ApiResult<Location>;
    async fn location_usage(&self, id: &LocationId) -> ApiResult<LocationUsage>;
}

#[async_trait(?Send)]
pub trait LocationWriter {
    async fn create_location(&self, payload: &LocationPayload) -> ApiResult<()>;
    async fn update_location(&self, id: &LocationId, payload: &LocationPayload) -> ApiResult<()>;
    async fn set_location_active(
        &self,
        id: &LocationId,
        payload: LocationStatusPayload,
    ) -> ApiResult<()>;
    async fn delete_location(&self, id: &LocationId) -> ApiResult<()>;
}

/// Every port the console uses, for handles that serve all screens.
pub trait AdminApi:
    UserReader
    + UserWriter
    + KycReader
    + KycWriter
    + QuestionReader
    + QuestionWriter
    + LocationReader
    + LocationWriter
{
}

impl<T> AdminApi for T where
    T: UserReader
        + UserWriter
        + KycReader
        + KycWriter
        + QuestionReader
        + QuestionWriter
        + LocationReader
        + LocationWriter
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_dropped() {
        assert_eq!(UserListQuery::new().search("   ").search, None);
        assert_eq!(
            UserListQuery::new().search("99").paginate(2, 20),
            UserListQuery {
                search: Some("99".into()),
                pagination: Some(Pagination {
                    page: 2,
                    per_page: 20
                }),
                ..UserListQuery::default()
            }
        );
    }
}
