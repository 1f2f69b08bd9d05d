use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::types::{QuestionId, TypeConstraintError};

/// Input widget a profile question is answered with.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Radio,
    MultiSelect,
    Text,
    Number,
    Date,
}

impl QuestionType {
    pub const ALL: [QuestionType; 5] = [
        QuestionType::Radio,
        QuestionType::MultiSelect,
        QuestionType::Text,
        QuestionType::Number,
        QuestionType::Date,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            QuestionType::Radio => "RADIO",
            QuestionType::MultiSelect => "MULTI_SELECT",
            QuestionType::Text => "TEXT",
            QuestionType::Number => "NUMBER",
            QuestionType::Date => "DATE",
        }
    }

    /// Choice questions carry a non-empty option list; all others carry none.
    pub const fn requires_options(self) -> bool {
        matches!(self, QuestionType::Radio | QuestionType::MultiSelect)
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown question type `{s}`")))
    }
}

/// One selectable choice of a RADIO or MULTI_SELECT question.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct QuestionOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display text shown to users.
    pub text: String,
    /// Value stored when the option is picked.
    pub value: String,
}

fn default_weight() -> f64 {
    1.0
}

/// Profile question with the category it is filed under.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

/// Category node of the questionnaire tree returned by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuestionCategory {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionCategory {
    /// Flattens the category tree, stamping each question with the name of
    /// the category it came from.
    pub fn flatten(categories: Vec<QuestionCategory>) -> Vec<Question> {
        categories
            .into_iter()
            .flat_map(|category| {
                let name = category.name;
                category.questions.into_iter().map(move |mut question| {
                    question.category_name = name.clone();
                    question
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flatten_assigns_category_names() {
        let categories: Vec<QuestionCategory> = serde_json::from_value(json!([
            {"name": "Lifestyle", "questions": [
                {"id": "q1", "text": "Smoke?", "type": "RADIO", "order": 1,
                 "options": [{"id": "o1", "text": "Yes", "value": "yes"}]}
            ]},
            {"name": "Habits", "questions": [
                {"id": "q2", "text": "Wake time", "type": "TEXT"}
            ]}
        ]))
        .unwrap();

        let questions = QuestionCategory::flatten(categories);

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].category_name, "Lifestyle");
        assert_eq!(questions[1].category_name, "Habits");
        assert_eq!(questions[1].weight, 1.0);
        assert!(questions[1].options.is_empty());
    }

    #[test]
    fn only_choice_types_require_options() {
        let choice: Vec<_> = QuestionType::ALL
            .into_iter()
            .filter(|t| t.requires_options())
            .collect();
        assert_eq!(choice, vec![QuestionType::Radio, QuestionType::MultiSelect]);
        assert_eq!("MULTI_SELECT".parse::<QuestionType>().unwrap(), QuestionType::MultiSelect);
    }
}
