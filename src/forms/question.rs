//! Create/edit dialog of a profile question, including its options editor.

use std::borrow::Cow;

use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::domain::question::{Question, QuestionType};
use crate::domain::types::{CategoryName, QuestionWeight};
use crate::forms::FormError;

pub const MAX_QUESTION_TEXT: usize = 500;

const FIELD_ORDER: &[&str] = &["text", "question_type", "category_name", "order", "weight"];

fn validate_question_text(text: &str) -> Result<(), ValidationError> {
    let len = text.trim().chars().count();
    if len == 0 {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("Please enter question text")));
    }
    if len > MAX_QUESTION_TEXT {
        return Err(ValidationError::new("length").with_message(Cow::Borrowed(
            "Question text cannot exceed 500 characters",
        )));
    }
    Ok(())
}

fn validate_category(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("Please enter a category name")));
    }
    Ok(())
}

/// One editable row of the options editor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionRow {
    pub text: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Validate)]
pub struct QuestionForm {
    #[validate(custom(function = "validate_question_text"))]
    pub text: String,
    #[validate(required(message = "Please select a question type"))]
    pub question_type: Option<QuestionType>,
    #[validate(custom(function = "validate_category"))]
    pub category_name: String,
    #[validate(range(min = 0, message = "Order cannot be negative"))]
    pub order: i32,
    pub required: bool,
    #[validate(range(min = 0.1, max = 5.0, message = "Weight must be between 0.1 and 5"))]
    pub weight: f64,
    pub placeholder: String,
    /// Never empty; the editor always shows at least one row.
    pub options: Vec<OptionRow>,
}

impl Default for QuestionForm {
    fn default() -> Self {
        Self {
            text: String::new(),
            question_type: None,
            category_name: String::new(),
            order: 0,
            required: false,
            weight: QuestionWeight::default().get(),
            placeholder: String::new(),
            options: vec![OptionRow::default()],
        }
    }
}

impl From<&Question> for QuestionForm {
    fn from(question: &Question) -> Self {
        let mut options: Vec<OptionRow> = question
            .options
            .iter()
            .map(|opt| OptionRow {
                text: opt.text.clone(),
                value: opt.value.clone(),
            })
            .collect();
        if options.is_empty() {
            options.push(OptionRow::default());
        }

        Self {
            text: question.text.clone(),
            question_type: Some(question.question_type),
            category_name: question.category_name.clone(),
            order: question.order,
            required: question.required,
            weight: question.weight,
            placeholder: question.placeholder.clone().unwrap_or_default(),
            options,
        }
    }
}

/// Single edit applied to an open question dialog.
#[derive(Clone, Debug, PartialEq)]
pub enum QuestionChange {
    Text(String),
    Type(QuestionType),
    Category(String),
    Order(i32),
    Required(bool),
    Weight(f64),
    Placeholder(String),
    AddOption,
    RemoveOption(usize),
    OptionText(usize, String),
    OptionValue(usize, String),
}

impl QuestionForm {
    /// Applies one change. Switching to a type without options resets the
    /// editor to a single empty row; removing the last row is a no-op.
    pub fn apply(&mut self, change: QuestionChange) {
        match change {
            QuestionChange::Text(text) => self.text = text,
            QuestionChange::Type(question_type) => {
                if !question_type.requires_options() {
                    self.options = vec![OptionRow::default()];
                }
                self.question_type = Some(question_type);
            }
            QuestionChange::Category(name) => self.category_name = name,
            QuestionChange::Order(order) => self.order = order,
            QuestionChange::Required(required) => self.required = required,
            QuestionChange::Weight(weight) => self.weight = weight,
            QuestionChange::Placeholder(placeholder) => self.placeholder = placeholder,
            QuestionChange::AddOption => self.options.push(OptionRow::default()),
            QuestionChange::RemoveOption(index) => {
                if self.options.len() > 1 && index < self.options.len() {
                    self.options.remove(index);
                }
            }
            QuestionChange::OptionText(index, text) => {
                if let Some(row) = self.options.get_mut(index) {
                    row.text = text;
                }
            }
            QuestionChange::OptionValue(index, value) => {
                if let Some(row) = self.options.get_mut(index) {
                    row.value = value;
                }
            }
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OptionPayload {
    pub text: String,
    pub value: String,
    /// Position in the editor; omitted when copying an existing question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

/// Body of the create and update question requests.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub category_name: CategoryName,
    pub order: i32,
    pub required: bool,
    pub weight: QuestionWeight,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub options: Vec<OptionPayload>,
}

impl TryFrom<QuestionForm> for QuestionPayload {
    type Error = FormError;

    fn try_from(form: QuestionForm) -> Result<Self, Self::Error> {
        form.validate()
            .map_err(|errors| FormError::from_validation(errors, FIELD_ORDER))?;

        let question_type = form
            .question_type
            .ok_or_else(|| FormError::rule("Please select a question type"))?;

        let options = if question_type.requires_options() {
            let complete = form
                .options
                .iter()
                .all(|row| !row.text.trim().is_empty() && !row.value.trim().is_empty());
            if form.options.is_empty() || !complete {
                return Err(FormError::rule(
                    "Please fill all option fields for this question type",
                ));
            }
            form.options
                .into_iter()
                .enumerate()
                .map(|(index, row)| OptionPayload {
                    text: row.text.trim().to_string(),
                    value: row.value.trim().to_string(),
                    order: Some(index),
                })
                .collect()
        } else {
            Vec::new()
        };

        let placeholder = Some(form.placeholder.trim().to_string()).filter(|p| !p.is_empty());

        Ok(Self {
            text: form.text.trim().to_string(),
            question_type,
            category_name: CategoryName::new(form.category_name)?,
            order: form.order,
            required: form.required,
            weight: QuestionWeight::new(form.weight)?,
            placeholder,
            options,
        })
    }
}

impl QuestionPayload {
    /// Duplicate of an existing question placed right after it.
    pub fn copy_of(question: &Question) -> Result<Self, FormError> {
        Ok(Self {
            text: format!("{} (Copy)", question.text),
            question_type: question.question_type,
            category_name: CategoryName::new(question.category_name.clone())?,
            order: question.order + 1,
            required: question.required,
            // Backend data may predate the weight bounds.
            weight: QuestionWeight::new(question.weight).unwrap_or_default(),
            placeholder: question.placeholder.clone(),
            options: question
                .options
                .iter()
                .map(|opt| OptionPayload {
                    text: opt.text.clone(),
                    value: opt.value.clone(),
                    order: None,
                })
                .collect(),
        })
    }
}
