//! Questionnaire screen: category groups, the question dialog, delete and copy.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use async_trait::async_trait;

use crate::api::{ApiResult, Page, QuestionReader, QuestionWriter};
use crate::domain::question::Question;
use crate::domain::types::QuestionId;
use crate::dto::questions::{QuestionGroup, group_by_category};
use crate::forms::FormError;
use crate::forms::question::{QuestionChange, QuestionForm, QuestionPayload};
use crate::services::form::{FormSpec, FormState, ModalFormController};
use crate::services::list::{
    FetchOutcome, ListConfig, ListMode, ListQuery, ListSource, ResourceListController,
};
use crate::services::notifications::Notifier;
use crate::services::{ServiceError, ServiceResult};

pub static QUESTIONS: ListConfig = ListConfig {
    label: "questions",
    mode: ListMode::Unpaged,
    default_page_size: 100,
    filters: &[],
};

pub struct QuestionSource<A: ?Sized> {
    api: Rc<A>,
}

#[async_trait(?Send)]
impl<A: QuestionReader + ?Sized> ListSource for QuestionSource<A> {
    type Item = Question;

    fn config(&self) -> &ListConfig {
        &QUESTIONS
    }

    async fn fetch(&self, _query: &ListQuery) -> ApiResult<Page<Question>> {
        self.api.list_questions().await.map(Page::all)
    }
}

pub struct QuestionFormSpec<A: ?Sized> {
    api: Rc<A>,
}

#[async_trait(?Send)]
impl<A: QuestionWriter + ?Sized> FormSpec for QuestionFormSpec<A> {
    type Record = Question;
    type Id = QuestionId;
    type Fields = QuestionForm;
    type Change = QuestionChange;
    type Payload = QuestionPayload;

    const ENTITY: &'static str = "Question";

    fn id_of(record: &Question) -> QuestionId {
        record.id.clone()
    }

    fn project(record: &Question) -> QuestionForm {
        QuestionForm::from(record)
    }

    fn apply(fields: &mut QuestionForm, change: QuestionChange) {
        fields.apply(change);
    }

    fn validate(fields: QuestionForm) -> Result<QuestionPayload, FormError> {
        QuestionPayload::try_from(fields)
    }

    async fn create(&self, payload: &QuestionPayload) -> ApiResult<()> {
        self.api.create_question(payload).await
    }

    async fn update(&self, id: &QuestionId, payload: &QuestionPayload) -> ApiResult<()> {
        self.api.update_question(id, payload).await
    }
}

pub struct QuestionsScreen<A: QuestionReader + QuestionWriter + ?Sized> {
    api: Rc<A>,
    list: ResourceListController<QuestionSource<A>>,
    form: ModalFormController<QuestionFormSpec<A>>,
    expanded: RefCell<HashSet<String>>,
}

impl<A> QuestionsScreen<A>
where
    A: QuestionReader + QuestionWriter + ?Sized,
{
    pub fn new(api: Rc<A>, notifier: Notifier) -> Self {
        let list = ResourceListController::new(
            QuestionSource {
                api: Rc::clone(&api),
            },
            notifier.clone(),
        );
        let form = ModalFormController::new(
            QuestionFormSpec {
                api: Rc::clone(&api),
            },
            notifier,
        );
        Self {
            api,
            list,
            form,
            expanded: RefCell::new(HashSet::new()),
        }
    }

    pub fn list(&self) -> &ResourceListController<QuestionSource<A>> {
        &self.list
    }

    pub async fn load(&self) -> FetchOutcome {
        self.list.refresh().await
    }

    /// Category groups with their expand state. Groups start collapsed.
    pub fn groups(&self) -> Vec<QuestionGroup> {
        group_by_category(&self.list.items(), &self.expanded.borrow())
    }

    pub fn toggle_category(&self, category: &str) {
        let mut expanded = self.expanded.borrow_mut();
        if !expanded.remove(category) {
            expanded.insert(category.to_string());
        }
    }

    /// Opens an empty dialog, pre-filled with `category` when adding from a
    /// category group.
    pub fn open_create(&self, category: Option<&str>) -> ServiceResult<()> {
        let defaults = category.map(|name| QuestionForm {
            category_name: name.to_string(),
            ..QuestionForm::default()
        });
        self.form.open_create(defaults)
    }

    pub fn open_edit(&self, id: &QuestionId) -> ServiceResult<()> {
        let question = self.find(id)?;
        self.form.open_edit(&question)
    }

    pub fn update_field(&self, change: QuestionChange) -> ServiceResult<()> {
        self.form.update_field(change)
    }

    pub async fn submit(&self) -> ServiceResult<()> {
        self.form.submit(&self.list).await
    }

    pub fn close(&self) -> ServiceResult<()> {
        self.form.close()
    }

    pub fn dialog(&self) -> Option<FormState<QuestionId, QuestionForm>> {
        self.form.state()
    }

    pub async fn delete(&self, id: &QuestionId) -> ServiceResult<()> {
        self.list
            .mutate(
                "Question deleted successfully",
                "Failed to delete question",
                self.api.delete_question(id),
            )
            .await
    }

    /// Creates "<text> (Copy)" right after the original, in the same
    /// category and with the same options.
    pub async fn copy(&self, id: &QuestionId) -> ServiceResult<()> {
        let question = self.find(id)?;
        let payload = QuestionPayload::copy_of(&question).map_err(|err| {
            log::error!("Cannot copy question {id}: {err}");
            self.list.notifier().error("Failed to copy question");
            ServiceError::from(err)
        })?;
        self.list
            .mutate(
                "Question copied successfully",
                "Failed to copy question",
                self.api.create_question(&payload),
            )
            .await
    }

    fn find(&self, id: &QuestionId) -> ServiceResult<Question> {
        self.list
            .items()
            .into_iter()
            .find(|q| &q.id == id)
            .ok_or(ServiceError::NotFound)
    }
}
