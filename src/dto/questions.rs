//! Questionnaire table rows grouped by category.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::question::Question;
use crate::dto::tags::{self, Tag};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionRow {
    pub id: String,
    pub text: String,
    pub placeholder: Option<String>,
    pub question_type: Tag,
    pub required: Tag,
    pub weight: Tag,
    pub order: i32,
    /// `"{n} options"` for choice questions, `"-"` otherwise.
    pub options: String,
}

impl From<&Question> for QuestionRow {
    fn from(question: &Question) -> Self {
        let options = if question.question_type.requires_options() {
            format!("{} options", question.options.len())
        } else {
            "-".to_string()
        };
        Self {
            id: question.id.to_string(),
            text: question.text.clone(),
            placeholder: question
                .placeholder
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| format!("Placeholder: {p}")),
            question_type: tags::question_type_tag(question.question_type),
            required: tags::required_tag(question.required),
            weight: tags::weight_tag(question.weight),
            order: question.order,
            options,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionGroup {
    pub category: String,
    pub expanded: bool,
    pub questions: Vec<QuestionRow>,
}

/// Groups questions by category in first-seen order, each group sorted by
/// `order`. Sorting is stable so equal orders keep their backend order.
pub fn group_by_category(questions: &[Question], expanded: &HashSet<String>) -> Vec<QuestionGroup> {
    let mut groups: Vec<(String, Vec<&Question>)> = Vec::new();
    for question in questions {
        match groups.iter_mut().find(|(name, _)| *name == question.category_name) {
            Some((_, members)) => members.push(question),
            None => groups.push((question.category_name.clone(), vec![question])),
        }
    }

    groups
        .into_iter()
        .map(|(category, mut members)| {
            members.sort_by_key(|q| q.order);
            QuestionGroup {
                expanded: expanded.contains(&category),
                questions: members.into_iter().map(QuestionRow::from).collect(),
                category,
            }
        })
        .collect()
}
