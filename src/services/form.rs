//! Generic create/edit dialog lifecycle.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;

use async_trait::async_trait;

use crate::api::ApiResult;
use crate::forms::FormError;
use crate::services::list::{ListSource, ResourceListController};
use crate::services::notifications::Notifier;
use crate::services::{ServiceError, ServiceResult};

/// Entity-specific half of a dialog: field projection, validation and the
/// create/update calls.
#[async_trait(?Send)]
pub trait FormSpec {
    type Record;
    type Id: Clone + Debug + PartialEq;
    type Fields: Clone + Debug + PartialEq + Default;
    type Change;
    type Payload;

    /// Capitalised entity name used in notifications.
    const ENTITY: &'static str;

    fn id_of(record: &Self::Record) -> Self::Id;

    fn project(record: &Self::Record) -> Self::Fields;

    fn apply(fields: &mut Self::Fields, change: Self::Change);

    fn validate(fields: Self::Fields) -> Result<Self::Payload, FormError>;

    async fn create(&self, payload: &Self::Payload) -> ApiResult<()>;

    async fn update(&self, id: &Self::Id, payload: &Self::Payload) -> ApiResult<()>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormMode<Id> {
    Create,
    Edit(Id),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormState<Id, Fields> {
    pub mode: FormMode<Id>,
    pub fields: Fields,
    pub submitting: bool,
}

/// Holds a submitting flag set until dropped.
pub(crate) struct SubmitGuard<'a>(&'a Cell<bool>);

impl<'a> SubmitGuard<'a> {
    pub(crate) fn new(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct ModalFormController<F: FormSpec> {
    spec: F,
    notifier: Notifier,
    open: RefCell<Option<(FormMode<F::Id>, F::Fields)>>,
    submitting: Cell<bool>,
}

impl<F: FormSpec> ModalFormController<F> {
    pub fn new(spec: F, notifier: Notifier) -> Self {
        Self {
            spec,
            notifier,
            open: RefCell::new(None),
            submitting: Cell::new(false),
        }
    }

    pub fn spec(&self) -> &F {
        &self.spec
    }

    /// Opens an empty dialog, seeded with `defaults` when given.
    pub fn open_create(&self, defaults: Option<F::Fields>) -> ServiceResult<()> {
        self.ensure_idle()?;
        *self.open.borrow_mut() = Some((FormMode::Create, defaults.unwrap_or_default()));
        Ok(())
    }

    /// Opens a dialog pre-populated from `record`.
    pub fn open_edit(&self, record: &F::Record) -> ServiceResult<()> {
        self.ensure_idle()?;
        *self.open.borrow_mut() = Some((FormMode::Edit(F::id_of(record)), F::project(record)));
        Ok(())
    }

    pub fn update_field(&self, change: F::Change) -> ServiceResult<()> {
        self.ensure_idle()?;
        let mut open = self.open.borrow_mut();
        let (_, fields) = open.as_mut().ok_or_else(not_open)?;
        F::apply(fields, change);
        Ok(())
    }

    /// Validates and sends the dialog. On success the dialog closes and
    /// `list` is refreshed; on failure it stays open with its values.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Busy`] while a previous submit is in flight,
    /// [`ServiceError::Form`] when a local rule fails (nothing is sent), or
    /// the backend error.
    pub async fn submit<S: ListSource>(&self, list: &ResourceListController<S>) -> ServiceResult<()> {
        self.ensure_idle()?;
        let (mode, fields) = self.open.borrow().clone().ok_or_else(not_open)?;

        let payload = match F::validate(fields) {
            Ok(payload) => payload,
            Err(err) => {
                let message = err.user_message();
                self.notifier.error(message.clone());
                return Err(ServiceError::Form(message));
            }
        };

        let _submitting = SubmitGuard::new(&self.submitting);
        let entity = F::ENTITY;
        let failure = format!("Failed to save {}", entity.to_lowercase());

        match &mode {
            FormMode::Create => {
                list.mutate(
                    &format!("{entity} created successfully"),
                    &failure,
                    self.spec.create(&payload),
                )
                .await?
            }
            FormMode::Edit(id) => {
                list.mutate(
                    &format!("{entity} updated successfully"),
                    &failure,
                    self.spec.update(id, &payload),
                )
                .await?
            }
        }

        *self.open.borrow_mut() = None;
        Ok(())
    }

    /// Discards the dialog. Refused while submitting.
    pub fn close(&self) -> ServiceResult<()> {
        self.ensure_idle()?;
        *self.open.borrow_mut() = None;
        Ok(())
    }

    pub fn state(&self) -> Option<FormState<F::Id, F::Fields>> {
        self.open.borrow().as_ref().map(|(mode, fields)| FormState {
            mode: mode.clone(),
            fields: fields.clone(),
            submitting: self.submitting.get(),
        })
    }

    pub fn fields(&self) -> Option<F::Fields> {
        self.open.borrow().as_ref().map(|(_, fields)| fields.clone())
    }

    pub fn is_open(&self) -> bool {
        self.open.borrow().is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    fn ensure_idle(&self) -> ServiceResult<()> {
        if self.submitting.get() {
            Err(ServiceError::Busy)
        } else {
            Ok(())
        }
    }
}

fn not_open() -> ServiceError {
    ServiceError::InvalidTransition("no dialog is open".to_string())
}
