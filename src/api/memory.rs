//! In-process backend implementing every port.
//!
//! Behaves like the REST backend closely enough for screen-level tests and
//! demos, and records the name of every call it serves.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::api::{
    ApiError, ApiResult, AuthApi, KycListQuery, KycReader, KycWriter, LocationReader,
    LocationWriter, Page, Pagination, QuestionReader, QuestionWriter, UserListQuery, UserReader,
    UserWriter,
};
use crate::domain::kyc::{KycStatus, KycSubmission};
use crate::domain::location::{Location, LocationUsage};
use crate::domain::question::{Question, QuestionOption};
use crate::domain::session::{Session, SessionUser};
use crate::domain::types::{KycId, LocationId, QuestionId, UserId};
use crate::domain::user::{UserAccount, UserStatus};
use crate::forms::kyc::RejectKycPayload;
use crate::forms::location::{LocationPayload, LocationStatusPayload};
use crate::forms::login::LoginPayload;
use crate::forms::question::QuestionPayload;

#[derive(Default)]
struct State {
    users: Vec<UserAccount>,
    kyc: Vec<KycSubmission>,
    questions: Vec<Question>,
    locations: Vec<Location>,
    location_users: HashMap<LocationId, u64>,
}

#[derive(Default)]
pub struct InMemoryBackend {
    state: RefCell<State>,
    calls: RefCell<Vec<&'static str>>,
    failure: RefCell<Option<ApiError>>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn paginate<T: Clone>(items: Vec<T>, pagination: Option<Pagination>) -> Page<T> {
    let total = items.len();
    let items = match pagination {
        Some(Pagination { page, per_page }) => items
            .into_iter()
            .skip(page.saturating_sub(1) * per_page)
            .take(per_page)
            .collect(),
        None => items,
    };
    Page::new(items, total)
}

fn rejected(message: &str) -> ApiError {
    ApiError::Rejected {
        status: 400,
        message: Some(message.to_string()),
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserAccount) {
        self.state.borrow_mut().users.push(user);
    }

    pub fn insert_kyc(&self, submission: KycSubmission) {
        self.state.borrow_mut().kyc.push(submission);
    }

    pub fn insert_question(&self, question: Question) {
        self.state.borrow_mut().questions.push(question);
    }

    pub fn insert_location(&self, location: Location) {
        self.state.borrow_mut().locations.push(location);
    }

    /// Sets how many profiles reference the location.
    pub fn set_location_users(&self, id: &LocationId, count: u64) {
        self.state
            .borrow_mut()
            .location_users
            .insert(id.clone(), count);
    }

    /// Makes the next call fail with `error` instead of being served.
    pub fn fail_next(&self, error: ApiError) {
        *self.failure.borrow_mut() = Some(error);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == name).count()
    }

    pub fn users(&self) -> Vec<UserAccount> {
        self.state.borrow().users.clone()
    }

    pub fn kyc_submissions(&self) -> Vec<KycSubmission> {
        self.state.borrow().kyc.clone()
    }

    pub fn questions(&self) -> Vec<Question> {
        self.state.borrow().questions.clone()
    }

    pub fn locations(&self) -> Vec<Location> {
        self.state.borrow().locations.clone()
    }

    fn serve(&self, name: &'static str) -> ApiResult<()> {
        self.calls.borrow_mut().push(name);
        match self.failure.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn question_from_payload(id: QuestionId, payload: &QuestionPayload) -> Question {
    Question {
        id,
        text: payload.text.clone(),
        question_type: payload.question_type,
        category_name: payload.category_name.to_string(),
        order: payload.order,
        required: payload.required,
        weight: payload.weight.get(),
        placeholder: payload.placeholder.clone(),
        options: payload
            .options
            .iter()
            .map(|opt| QuestionOption {
                id: Some(new_id()),
                text: opt.text.clone(),
                value: opt.value.clone(),
            })
            .collect(),
    }
}

#[async_trait(?Send)]
impl AuthApi for InMemoryBackend {
    async fn login(&self, payload: &LoginPayload) -> ApiResult<Session> {
        self.serve("login")?;
        Ok(Session {
            token: format!("session-{}", new_id()),
            user: SessionUser {
                id: new_id(),
                phone: payload.phone_number.to_string(),
                profile: None,
            },
        })
    }
}

#[async_trait(?Send)]
impl UserReader for InMemoryBackend {
    async fn list_users(&self, query: UserListQuery) -> ApiResult<Page<UserAccount>> {
        self.serve("list_users")?;
        let needle = query.search.as_deref().map(str::to_lowercase);
        let users: Vec<UserAccount> = self
            .state
            .borrow()
            .users
            .iter()
            .filter(|u| query.status.is_none_or(|s| u.status == s))
            .filter(|u| {
                query
                    .premium_status
                    .is_none_or(|p| u.premium_status == Some(p))
            })
            .filter(|u| match &needle {
                Some(needle) => {
                    u.phone.contains(needle.as_str())
                        || u.profile
                            .as_ref()
                            .and_then(|p| p.name.as_deref())
                            .is_some_and(|n| n.to_lowercase().contains(needle.as_str()))
                }
                None => true,
            })
            .cloned()
            .collect();
        Ok(paginate(users, query.pagination))
    }

    async fn get_user(&self, id: &UserId) -> ApiResult<UserAccount> {
        self.serve("get_user")?;
        self.state
            .borrow()
            .users
            .iter()
            .find(|u| &u.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn user_stats(&self) -> ApiResult<Value> {
        self.serve("user_stats")?;
        let state = self.state.borrow();
        let count = |status| state.users.iter().filter(|u| u.status == status).count();
        Ok(json!({
            "total": state.users.len(),
            "pending": count(UserStatus::Pending),
            "verified": count(UserStatus::Verified),
            "flagged": count(UserStatus::Flagged),
        }))
    }
}

#[async_trait(?Send)]
impl UserWriter for InMemoryBackend {
    async fn update_user_status(&self, id: &UserId, status: UserStatus) -> ApiResult<()> {
        self.serve("update_user_status")?;
        let mut state = self.state.borrow_mut();
        let user = state
            .users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or(ApiError::NotFound)?;
        user.status = status;
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> ApiResult<()> {
        self.serve("delete_user")?;
        let mut state = self.state.borrow_mut();
        let before = state.users.len();
        state.users.retain(|u| &u.id != id);
        if state.users.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl KycReader for InMemoryBackend {
    async fn list_kyc(&self, query: KycListQuery) -> ApiResult<Page<KycSubmission>> {
        self.serve("list_kyc")?;
        let items: Vec<KycSubmission> = self
            .state
            .borrow()
            .kyc
            .iter()
            .filter(|k| query.status.is_none_or(|s| k.status == s))
            .cloned()
            .collect();
        Ok(paginate(items, query.pagination))
    }

    async fn get_kyc(&self, id: &KycId) -> ApiResult<KycSubmission> {
        self.serve("get_kyc")?;
        self.state
            .borrow()
            .kyc
            .iter()
            .find(|k| &k.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn kyc_stats(&self) -> ApiResult<Value> {
        self.serve("kyc_stats")?;
        let state = self.state.borrow();
        let count = |status| state.kyc.iter().filter(|k| k.status == status).count();
        Ok(json!({
            "total": state.kyc.len(),
            "pending": count(KycStatus::Pending),
            "verified": count(KycStatus::Verified),
            "rejected": count(KycStatus::Rejected),
        }))
    }
}

impl InMemoryBackend {
    fn review(
        &self,
        id: &KycId,
        status: KycStatus,
        reason: Option<String>,
    ) -> ApiResult<()> {
        let mut state = self.state.borrow_mut();
        let submission = state
            .kyc
            .iter_mut()
            .find(|k| &k.id == id)
            .ok_or(ApiError::NotFound)?;
        if submission.status != KycStatus::Pending {
            return Err(rejected("KYC submission has already been reviewed"));
        }
        submission.status = status;
        submission.reviewed_at = Some(Utc::now());
        submission.rejection_reason = reason;
        Ok(())
    }
}

#[async_trait(?Send)]
impl KycWriter for InMemoryBackend {
    async fn approve_kyc(&self, id: &KycId) -> ApiResult<()> {
        self.serve("approve_kyc")?;
        self.review(id, KycStatus::Verified, None)
    }

    async fn reject_kyc(&self, id: &KycId, payload: &RejectKycPayload) -> ApiResult<()> {
        self.serve("reject_kyc")?;
        self.review(
            id,
            KycStatus::Rejected,
            Some(payload.rejection_reason.to_string()),
        )
    }
}

#[async_trait(?Send)]
impl QuestionReader for InMemoryBackend {
    async fn list_questions(&self) -> ApiResult<Vec<Question>> {
        self.serve("list_questions")?;
        Ok(self.state.borrow().questions.clone())
    }
}

#[async_trait(?Send)]
impl QuestionWriter for InMemoryBackend {
    async fn create_question(&self, payload: &QuestionPayload) -> ApiResult<()> {
        self.serve("create_question")?;
        let id = QuestionId::new(new_id())?;
        self.state
            .borrow_mut()
            .questions
            .push(question_from_payload(id, payload));
        Ok(())
    }

    async fn update_question(&self, id: &QuestionId, payload: &QuestionPayload) -> ApiResult<()> {
        self.serve("update_question")?;
        let mut state = self.state.borrow_mut();
        let question = state
            .questions
            .iter_mut()
            .find(|q| &q.id == id)
            .ok_or(ApiError::NotFound)?;
        *question = question_from_payload(id.clone(), payload);
        Ok(())
    }

    async fn delete_question(&self, id: &QuestionId) -> ApiResult<()> {
        self.serve("delete_question")?;
        let mut state = self.state.borrow_mut();
        let before = state.questions.len();
        state.questions.retain(|q| &q.id != id);
        if state.questions.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl LocationReader for InMemoryBackend {
    async fn list_locations(&self) -> ApiResult<Vec<Location>> {
        self.serve("list_locations")?;
        Ok(self.state.borrow().locations.clone())
    }

    async fn get_location(&self, id: &LocationId) -> ApiResult<Location> {
        self.serve("get_location")?;
        self.state
            .borrow()
            .locations
            .iter()
            .find(|l| &l.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn location_usage(&self, id: &LocationId) -> ApiResult<LocationUsage> {
        self.serve("location_usage")?;
        let user_count = self
            .state
            .borrow()
            .location_users
            .get(id)
            .copied()
            .unwrap_or(0);
        Ok(LocationUsage {
            is_in_use: user_count > 0,
            user_count,
        })
    }
}

#[async_trait(?Send)]
impl LocationWriter for InMemoryBackend {
    async fn create_location(&self, payload: &LocationPayload) -> ApiResult<()> {
        self.serve("create_location")?;
        let mut state = self.state.borrow_mut();
        let name = payload.name.as_str();
        if state
            .locations
            .iter()
            .any(|l| l.name.eq_ignore_ascii_case(name))
        {
            return Err(rejected("Location already exists"));
        }
        let now = Utc::now();
        state.locations.push(Location {
            id: LocationId::new(new_id())?,
            name: name.to_string(),
            is_active: payload.is_active,
            created_at: Some(now),
            updated_at: Some(now),
        });
        Ok(())
    }

    async fn update_location(&self, id: &LocationId, payload: &LocationPayload) -> ApiResult<()> {
        self.serve("update_location")?;
        let mut state = self.state.borrow_mut();
        let location = state
            .locations
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or(ApiError::NotFound)?;
        location.name = payload.name.to_string();
        location.is_active = payload.is_active;
        location.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn set_location_active(
        &self,
        id: &LocationId,
        payload: LocationStatusPayload,
    ) -> ApiResult<()> {
        self.serve("set_location_active")?;
        let mut state = self.state.borrow_mut();
        let location = state
            .locations
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or(ApiError::NotFound)?;
        location.is_active = payload.is_active;
        location.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_location(&self, id: &LocationId) -> ApiResult<()> {
        self.serve("delete_location")?;
        let mut state = self.state.borrow_mut();
        let before = state.locations.len();
        state.locations.retain(|l| &l.id != id);
        if state.locations.len() == before {
            return Err(ApiError::NotFound);
        }
        state.location_users.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::LocationName;

    #[tokio::test]
    async fn duplicate_location_names_are_rejected() {
        let backend = InMemoryBackend::new();
        let payload = LocationPayload {
            name: LocationName::new("Gurugram").unwrap(),
            is_active: true,
        };

        backend.create_location(&payload).await.unwrap();
        let err = backend.create_location(&payload).await.unwrap_err();

        assert_eq!(err.user_message("Failed"), "Location already exists");
        assert_eq!(backend.locations().len(), 1);
        assert_eq!(backend.call_count("create_location"), 2);
    }

    #[tokio::test]
    async fn scripted_failure_applies_once() {
        let backend = InMemoryBackend::new();
        backend.fail_next(ApiError::Transport("offline".into()));

        assert!(backend.list_locations().await.is_err());
        assert!(backend.list_locations().await.is_ok());
    }

    #[test]
    fn paginate_slices_and_keeps_total() {
        let page = paginate(
            (1..=25).collect::<Vec<_>>(),
            Some(Pagination {
                page: 3,
                per_page: 10,
            }),
        );
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);
    }
}
