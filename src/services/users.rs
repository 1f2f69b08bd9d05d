//! Users screen: searchable, filterable table, detail view and moderation.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;

use crate::api::{ApiResult, Page, UserListQuery, UserReader, UserWriter};
use crate::domain::types::UserId;
use crate::domain::user::{PremiumStatus, UserAccount, UserStatus};
use crate::dto::users::{UserDetailView, UserRow};
use crate::services::list::{
    FetchOutcome, FilterField, FilterKind, FilterValue, ListConfig, ListMode, ListQuery,
    ListSource, ResourceListController,
};
use crate::services::notifications::Notifier;
use crate::services::{ServiceError, ServiceResult};

pub const STATUS_FILTER: &str = "status";
pub const PREMIUM_FILTER: &str = "premiumStatus";

pub static USERS: ListConfig = ListConfig {
    label: "users",
    mode: ListMode::ServerFiltered,
    default_page_size: 20,
    filters: &[
        FilterField {
            name: STATUS_FILTER,
            kind: FilterKind::Choice(&["PENDING", "VERIFIED", "FLAGGED"]),
        },
        FilterField {
            name: PREMIUM_FILTER,
            kind: FilterKind::Choice(&["FREE", "PREMIUM"]),
        },
    ],
};

pub struct UserSource<A: ?Sized> {
    api: Rc<A>,
}

impl<A: ?Sized> UserSource<A> {
    pub fn new(api: Rc<A>) -> Self {
        Self { api }
    }
}

/// Translates the generic list query into the users endpoint parameters.
pub fn user_list_query(query: &ListQuery) -> UserListQuery {
    let mut params = UserListQuery::new().paginate(query.page, query.page_size);
    if let Some(search) = &query.search_text {
        params = params.search(search.as_str());
    }
    if let Some(status) = query.text_filter(STATUS_FILTER).and_then(|s| s.parse().ok()) {
        params = params.status(status);
    }
    if let Some(premium) = query
        .text_filter(PREMIUM_FILTER)
        .and_then(|s| s.parse().ok())
    {
        params = params.premium_status(premium);
    }
    params
}

#[async_trait(?Send)]
impl<A: UserReader + ?Sized> ListSource for UserSource<A> {
    type Item = UserAccount;

    fn config(&self) -> &ListConfig {
        &USERS
    }

    async fn fetch(&self, query: &ListQuery) -> ApiResult<Page<UserAccount>> {
        self.api.list_users(user_list_query(query)).await
    }
}

pub struct UsersScreen<A: UserReader + ?Sized> {
    api: Rc<A>,
    list: ResourceListController<UserSource<A>>,
    detail: RefCell<Option<UserAccount>>,
}

impl<A> UsersScreen<A>
where
    A: UserReader + UserWriter + ?Sized,
{
    pub fn new(api: Rc<A>, notifier: Notifier) -> Self {
        Self::with_page_size(api, notifier, USERS.default_page_size)
    }

    pub fn with_page_size(api: Rc<A>, notifier: Notifier, page_size: usize) -> Self {
        let list = ResourceListController::with_page_size(
            UserSource::new(Rc::clone(&api)),
            notifier,
            page_size,
        );
        Self {
            api,
            list,
            detail: RefCell::new(None),
        }
    }

    pub fn list(&self) -> &ResourceListController<UserSource<A>> {
        &self.list
    }

    pub async fn load(&self) -> FetchOutcome {
        self.list.refresh().await
    }

    /// Searches by phone or name.
    pub async fn search(&self, text: &str) {
        self.list.set_search_text(text).await;
    }

    pub async fn filter_status(&self, status: Option<UserStatus>) -> ServiceResult<()> {
        let value = status.map(|s| FilterValue::Text(s.as_str().to_string()));
        self.list.set_filter(STATUS_FILTER, value).await
    }

    pub async fn filter_premium(&self, premium: Option<PremiumStatus>) -> ServiceResult<()> {
        let value = premium.map(|p| FilterValue::Text(p.as_str().to_string()));
        self.list.set_filter(PREMIUM_FILTER, value).await
    }

    pub async fn set_page(&self, page: usize, page_size: usize) {
        self.list.set_page(page, page_size).await;
    }

    pub fn rows(&self) -> Vec<UserRow> {
        self.list.items().iter().map(UserRow::from).collect()
    }

    /// Loads the full record of one user and keeps it as the open detail.
    pub async fn view_user(&self, id: &UserId) -> ServiceResult<UserDetailView> {
        let user = self.api.get_user(id).await.map_err(|err| {
            log::error!("Failed to fetch user {id}: {err}");
            self.list
                .notifier()
                .api_error(&err, "Could not fetch user details");
            ServiceError::from(err)
        })?;
        let view = UserDetailView::from(&user);
        *self.detail.borrow_mut() = Some(user);
        Ok(view)
    }

    pub fn detail(&self) -> Option<UserDetailView> {
        self.detail.borrow().as_ref().map(UserDetailView::from)
    }

    pub fn close_detail(&self) {
        self.detail.borrow_mut().take();
    }

    pub async fn update_status(&self, id: &UserId, status: UserStatus) -> ServiceResult<()> {
        self.list
            .mutate(
                "User status updated",
                "Failed to update user status",
                self.api.update_user_status(id, status),
            )
            .await?;
        self.forget_detail(id);
        Ok(())
    }

    pub async fn delete_user(&self, id: &UserId) -> ServiceResult<()> {
        self.list
            .mutate(
                "User deleted successfully",
                "Failed to delete user",
                self.api.delete_user(id),
            )
            .await?;
        self.forget_detail(id);
        Ok(())
    }

    /// Drops a cached detail that no longer matches the backend.
    fn forget_detail(&self, id: &UserId) {
        let mut detail = self.detail.borrow_mut();
        if detail.as_ref().is_some_and(|u| &u.id == id) {
            *detail = None;
        }
    }
}
