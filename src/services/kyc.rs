//! KYC review queue: filter, inspect, approve and reject submissions.
//!
//! Only PENDING submissions can be reviewed. A rejection needs a non-blank
//! reason, checked before anything is sent.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;

use crate::api::{ApiResult, KycListQuery, KycReader, KycWriter, Page};
use crate::domain::kyc::{KycStatus, KycSubmission};
use crate::domain::types::KycId;
use crate::dto::kyc::{KycDetailView, KycRow};
use crate::forms::kyc::{RejectKycForm, RejectKycPayload};
use crate::services::form::SubmitGuard;
use crate::services::list::{
    FetchOutcome, FilterField, FilterKind, FilterValue, ListConfig, ListMode, ListQuery,
    ListSource, ResourceListController,
};
use crate::services::notifications::Notifier;
use crate::services::{ServiceError, ServiceResult};

pub const STATUS_FILTER: &str = "status";

pub static KYC: ListConfig = ListConfig {
    label: "KYC submissions",
    mode: ListMode::ServerFiltered,
    default_page_size: 10,
    filters: &[FilterField {
        name: STATUS_FILTER,
        kind: FilterKind::Choice(&["PENDING", "VERIFIED", "REJECTED"]),
    }],
};

pub struct KycSource<A: ?Sized> {
    api: Rc<A>,
}

impl<A: ?Sized> KycSource<A> {
    pub fn new(api: Rc<A>) -> Self {
        Self { api }
    }
}

#[async_trait(?Send)]
impl<A: KycReader + ?Sized> ListSource for KycSource<A> {
    type Item = KycSubmission;

    fn config(&self) -> &ListConfig {
        &KYC
    }

    async fn fetch(&self, query: &ListQuery) -> ApiResult<Page<KycSubmission>> {
        let mut params = KycListQuery::new().paginate(query.page, query.page_size);
        if let Some(status) = query
            .text_filter(STATUS_FILTER)
            .and_then(|s| s.parse::<KycStatus>().ok())
        {
            params = params.status(status);
        }
        self.api.list_kyc(params).await
    }
}

/// Open reject dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectDialog {
    pub target: KycId,
    pub reason: String,
}

pub struct KycScreen<A: KycReader + ?Sized> {
    api: Rc<A>,
    list: ResourceListController<KycSource<A>>,
    detail: RefCell<Option<KycSubmission>>,
    reject_dialog: RefCell<Option<RejectDialog>>,
    reviewing: Cell<bool>,
}

impl<A> KycScreen<A>
where
    A: KycReader + KycWriter + ?Sized,
{
    pub fn new(api: Rc<A>, notifier: Notifier) -> Self {
        Self::with_page_size(api, notifier, KYC.default_page_size)
    }

    pub fn with_page_size(api: Rc<A>, notifier: Notifier, page_size: usize) -> Self {
        let list = ResourceListController::with_page_size(
            KycSource::new(Rc::clone(&api)),
            notifier,
            page_size,
        );
        Self {
            api,
            list,
            detail: RefCell::new(None),
            reject_dialog: RefCell::new(None),
            reviewing: Cell::new(false),
        }
    }

    pub fn list(&self) -> &ResourceListController<KycSource<A>> {
        &self.list
    }

    pub async fn load(&self) -> FetchOutcome {
        self.list.refresh().await
    }

    pub async fn filter_status(&self, status: Option<KycStatus>) -> ServiceResult<()> {
        let value = status.map(|s| FilterValue::Text(s.as_str().to_string()));
        self.list.set_filter(STATUS_FILTER, value).await
    }

    pub async fn set_page(&self, page: usize, page_size: usize) {
        self.list.set_page(page, page_size).await;
    }

    pub fn rows(&self) -> Vec<KycRow> {
        self.list.items().iter().map(KycRow::from).collect()
    }

    pub async fn view(&self, id: &KycId) -> ServiceResult<KycDetailView> {
        let submission = self.api.get_kyc(id).await.map_err(|err| {
            log::error!("Failed to fetch KYC submission {id}: {err}");
            self.list
                .notifier()
                .api_error(&err, "Failed to fetch KYC details");
            ServiceError::from(err)
        })?;
        let view = KycDetailView::from(&submission);
        *self.detail.borrow_mut() = Some(submission);
        Ok(view)
    }

    pub fn detail(&self) -> Option<KycDetailView> {
        self.detail.borrow().as_ref().map(KycDetailView::from)
    }

    pub fn close_detail(&self) {
        self.detail.borrow_mut().take();
    }

    pub async fn approve(&self, id: &KycId) -> ServiceResult<()> {
        self.ensure_reviewable(id)?;
        let _reviewing = SubmitGuard::new(&self.reviewing);
        self.list
            .mutate(
                "KYC approved successfully",
                "Failed to approve KYC",
                self.api.approve_kyc(id),
            )
            .await?;
        self.close_detail();
        Ok(())
    }

    /// Rejects with a trimmed reason. A blank reason is refused without a
    /// network call.
    pub async fn reject(&self, id: &KycId, reason: &str) -> ServiceResult<()> {
        let payload = match RejectKycPayload::try_from(RejectKycForm {
            reason: reason.to_string(),
        }) {
            Ok(payload) => payload,
            Err(err) => {
                let message = err.user_message();
                self.list.notifier().error(message.clone());
                return Err(ServiceError::Form(message));
            }
        };
        self.ensure_reviewable(id)?;
        let _reviewing = SubmitGuard::new(&self.reviewing);
        self.list
            .mutate(
                "KYC rejected successfully",
                "Failed to reject KYC",
                self.api.reject_kyc(id, &payload),
            )
            .await?;
        self.close_detail();
        Ok(())
    }

    pub fn open_reject(&self, id: &KycId) -> ServiceResult<()> {
        self.ensure_reviewable(id)?;
        *self.reject_dialog.borrow_mut() = Some(RejectDialog {
            target: id.clone(),
            reason: String::new(),
        });
        Ok(())
    }

    pub fn set_reject_reason(&self, reason: impl Into<String>) -> ServiceResult<()> {
        let mut dialog = self.reject_dialog.borrow_mut();
        let dialog = dialog.as_mut().ok_or_else(no_reject_dialog)?;
        dialog.reason = reason.into();
        Ok(())
    }

    /// Sends the open reject dialog; it closes only on success.
    pub async fn submit_reject(&self) -> ServiceResult<()> {
        let dialog = self
            .reject_dialog
            .borrow()
            .clone()
            .ok_or_else(no_reject_dialog)?;
        self.reject(&dialog.target, &dialog.reason).await?;
        self.reject_dialog.borrow_mut().take();
        Ok(())
    }

    /// Closes the reject dialog and discards the typed reason.
    pub fn cancel_reject(&self) -> ServiceResult<()> {
        if self.reviewing.get() {
            return Err(ServiceError::Busy);
        }
        self.reject_dialog.borrow_mut().take();
        Ok(())
    }

    pub fn reject_dialog(&self) -> Option<RejectDialog> {
        self.reject_dialog.borrow().clone()
    }

    pub fn is_reviewing(&self) -> bool {
        self.reviewing.get()
    }

    /// Refuses a second review while one is in flight, and a review of a
    /// submission known to be no longer pending.
    fn ensure_reviewable(&self, id: &KycId) -> ServiceResult<()> {
        if self.reviewing.get() {
            return Err(ServiceError::Busy);
        }
        match self.known_status(id) {
            Some(status) if !status.is_actionable() => Err(ServiceError::InvalidTransition(
                format!("KYC submission {id} is {status}"),
            )),
            _ => Ok(()),
        }
    }

    fn known_status(&self, id: &KycId) -> Option<KycStatus> {
        if let Some(detail) = self.detail.borrow().as_ref().filter(|k| &k.id == id) {
            return Some(detail.status);
        }
        self.list
            .items()
            .iter()
            .find(|k| &k.id == id)
            .map(|k| k.status)
    }
}

fn no_reject_dialog() -> ServiceError {
    ServiceError::InvalidTransition("no reject dialog is open".to_string())
}
