//! Locations screen.
//!
//! The whole collection is fetched once; search and pagination run over the
//! cached copy. Deleting a location still referenced by profiles needs an
//! explicit confirmation.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;

use crate::api::{ApiResult, LocationReader, LocationWriter, Page};
use crate::domain::location::Location;
use crate::domain::types::LocationId;
use crate::dto::locations::{DeleteConfirmation, LocationRow, LocationStats, search_summary};
use crate::forms::FormError;
use crate::forms::location::{LocationChange, LocationForm, LocationPayload, LocationStatusPayload};
use crate::services::form::{FormSpec, FormState, ModalFormController};
use crate::services::list::{
    FetchOutcome, ListConfig, ListMode, ListQuery, ListSource, ResourceListController,
};
use crate::services::notifications::Notifier;
use crate::services::{ServiceError, ServiceResult};

pub static LOCATIONS: ListConfig = ListConfig {
    label: "locations",
    mode: ListMode::ClientFiltered,
    default_page_size: 10,
    filters: &[],
};

pub struct LocationSource<A: ?Sized> {
    api: Rc<A>,
}

#[async_trait(?Send)]
impl<A: LocationReader + ?Sized> ListSource for LocationSource<A> {
    type Item = Location;

    fn config(&self) -> &ListConfig {
        &LOCATIONS
    }

    async fn fetch(&self, _query: &ListQuery) -> ApiResult<Page<Location>> {
        self.api.list_locations().await.map(Page::all)
    }

    fn matches(&self, item: &Location, query: &ListQuery) -> bool {
        query
            .search_text
            .as_deref()
            .is_none_or(|needle| item.name_matches(needle))
    }
}

pub struct LocationFormSpec<A: ?Sized> {
    api: Rc<A>,
}

#[async_trait(?Send)]
impl<A: LocationWriter + ?Sized> FormSpec for LocationFormSpec<A> {
    type Record = Location;
    type Id = LocationId;
    type Fields = LocationForm;
    type Change = LocationChange;
    type Payload = LocationPayload;

    const ENTITY: &'static str = "Location";

    fn id_of(record: &Location) -> LocationId {
        record.id.clone()
    }

    fn project(record: &Location) -> LocationForm {
        LocationForm::from(record)
    }

    fn apply(fields: &mut LocationForm, change: LocationChange) {
        fields.apply(change);
    }

    fn validate(fields: LocationForm) -> Result<LocationPayload, FormError> {
        LocationPayload::try_from(fields)
    }

    async fn create(&self, payload: &LocationPayload) -> ApiResult<()> {
        self.api.create_location(payload).await
    }

    async fn update(&self, id: &LocationId, payload: &LocationPayload) -> ApiResult<()> {
        self.api.update_location(id, payload).await
    }
}

/// Result of asking to delete a location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Profiles still reference the location; call
    /// [`LocationsScreen::confirm_delete`] or [`LocationsScreen::cancel_delete`].
    NeedsConfirmation(DeleteConfirmation),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingDelete {
    id: LocationId,
    confirmation: DeleteConfirmation,
}

pub struct LocationsScreen<A: LocationReader + LocationWriter + ?Sized> {
    api: Rc<A>,
    list: ResourceListController<LocationSource<A>>,
    form: ModalFormController<LocationFormSpec<A>>,
    pending_delete: RefCell<Option<PendingDelete>>,
}

impl<A> LocationsScreen<A>
where
    A: LocationReader + LocationWriter + ?Sized,
{
    pub fn new(api: Rc<A>, notifier: Notifier) -> Self {
        Self::with_page_size(api, notifier, LOCATIONS.default_page_size)
    }

    pub fn with_page_size(api: Rc<A>, notifier: Notifier, page_size: usize) -> Self {
        let list = ResourceListController::with_page_size(
            LocationSource {
                api: Rc::clone(&api),
            },
            notifier.clone(),
            page_size,
        );
        let form = ModalFormController::new(
            LocationFormSpec {
                api: Rc::clone(&api),
            },
            notifier,
        );
        Self {
            api,
            list,
            form,
            pending_delete: RefCell::new(None),
        }
    }

    pub fn list(&self) -> &ResourceListController<LocationSource<A>> {
        &self.list
    }

    pub async fn load(&self) -> FetchOutcome {
        self.list.refresh().await
    }

    /// Filters the cached collection by name; no request is made.
    pub async fn search(&self, text: &str) {
        self.list.set_search_text(text).await;
    }

    pub async fn set_page(&self, page: usize, page_size: usize) {
        self.list.set_page(page, page_size).await;
    }

    pub fn rows(&self) -> Vec<LocationRow> {
        self.list.items().iter().map(LocationRow::from).collect()
    }

    /// Counters over the whole collection, independent of the search.
    pub fn stats(&self) -> LocationStats {
        self.list
            .cached_items()
            .map(|all| LocationStats::from_locations(&all))
            .unwrap_or_default()
    }

    pub fn search_summary(&self) -> Option<String> {
        let query = self.list.query();
        let search = query.search_text.unwrap_or_default();
        search_summary(&search, self.list.total() as u64)
    }

    pub fn open_create(&self) -> ServiceResult<()> {
        self.form.open_create(None)
    }

    pub fn open_edit(&self, id: &LocationId) -> ServiceResult<()> {
        let location = self.find(id)?;
        self.form.open_edit(&location)
    }

    pub fn update_field(&self, change: LocationChange) -> ServiceResult<()> {
        self.form.update_field(change)
    }

    pub async fn submit(&self) -> ServiceResult<()> {
        self.form.submit(&self.list).await
    }

    pub fn close(&self) -> ServiceResult<()> {
        self.form.close()
    }

    pub fn dialog(&self) -> Option<FormState<LocationId, LocationForm>> {
        self.form.state()
    }

    /// Checks usage first. An unreferenced location is deleted right away;
    /// a referenced one waits for confirmation.
    pub async fn request_delete(&self, id: &LocationId) -> ServiceResult<DeleteOutcome> {
        let usage = self.api.location_usage(id).await.map_err(|err| {
            log::error!("Failed to check usage of location {id}: {err}");
            self.list
                .notifier()
                .api_error(&err, "Failed to delete location");
            ServiceError::from(err)
        })?;

        if usage.is_in_use {
            let confirmation = DeleteConfirmation::for_usage(usage.user_count);
            *self.pending_delete.borrow_mut() = Some(PendingDelete {
                id: id.clone(),
                confirmation: confirmation.clone(),
            });
            return Ok(DeleteOutcome::NeedsConfirmation(confirmation));
        }

        self.delete_now(id).await?;
        Ok(DeleteOutcome::Deleted)
    }

    pub fn pending_confirmation(&self) -> Option<DeleteConfirmation> {
        self.pending_delete
            .borrow()
            .as_ref()
            .map(|p| p.confirmation.clone())
    }

    pub async fn confirm_delete(&self) -> ServiceResult<()> {
        let pending = self.pending_delete.borrow_mut().take().ok_or_else(|| {
            ServiceError::InvalidTransition("no delete awaits confirmation".to_string())
        })?;
        self.delete_now(&pending.id).await
    }

    pub fn cancel_delete(&self) {
        self.pending_delete.borrow_mut().take();
    }

    pub async fn toggle_active(&self, id: &LocationId) -> ServiceResult<()> {
        let location = self.find(id)?;
        let is_active = !location.is_active;
        let success = if is_active {
            "Location activated successfully"
        } else {
            "Location deactivated successfully"
        };
        self.list
            .mutate(
                success,
                "Failed to update location",
                self.api
                    .set_location_active(id, LocationStatusPayload { is_active }),
            )
            .await
    }

    async fn delete_now(&self, id: &LocationId) -> ServiceResult<()> {
        self.list
            .mutate(
                "Location deleted successfully",
                "Failed to delete location",
                self.api.delete_location(id),
            )
            .await
    }

    fn find(&self, id: &LocationId) -> ServiceResult<Location> {
        self.list
            .cached_items()
            .unwrap_or_default()
            .into_iter()
            .find(|l| &l.id == id)
            .ok_or(ServiceError::NotFound)
    }
}
