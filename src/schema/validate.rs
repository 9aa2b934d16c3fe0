//! Structural validation of a parsed schema document.
//!
//! Validation never fails: every problem found is reported as a
//! [`ValidationError`] and the walk carries on with the next sibling. The same
//! walk builds the typed [`Schema`], which is only handed out when no error
//! was found.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::question::{Answer, Question, QuestionKind, Schema, Subject};

/// Where a question sits in the document, with its name once it is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPath {
    pub subject: String,
    pub theme: String,
    pub index: usize,
    pub name: Option<String>,
}

impl fmt::Display for QuestionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "question \"{}\" (position {})", name, self.index)?,
            None => write!(f, "question at position {}", self.index)?,
        }
        write!(
            f,
            " in theme \"{}\" of subject \"{}\"",
            self.theme, self.subject
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("root must be an object of subjects")]
    RootNotObject,

    #[error("subject \"{subject}\" must be an object of themes")]
    SubjectNotObject { subject: String },

    #[error("theme \"{theme}\" of subject \"{subject}\" must be an array of questions")]
    ThemeNotArray { subject: String, theme: String },

    #[error("{0} must be an object")]
    QuestionNotObject(QuestionPath),

    #[error("{0} must have a \"name\" property of type string")]
    MissingName(QuestionPath),

    #[error("{0} must have a \"type\" property of type string")]
    MissingType(QuestionPath),

    #[error("{question} has unknown type \"{kind}\"")]
    UnknownType { question: QuestionPath, kind: String },

    #[error("{0} must have an \"answers\" array")]
    MissingAnswers(QuestionPath),

    #[error("answer at position {answer} of {question} must be an object")]
    AnswerNotObject {
        question: QuestionPath,
        answer: usize,
    },

    #[error("answer at position {answer} of {question} must have a \"name\" property of type string")]
    AnswerMissingName {
        question: QuestionPath,
        answer: usize,
    },

    #[error("answer at position {answer} of {question} must have a \"correct\" property of type boolean")]
    AnswerMissingCorrect {
        question: QuestionPath,
        answer: usize,
    },

    #[error("{0} of type \"text\" must have a \"correctText\" property of type string")]
    MissingCorrectText(QuestionPath),
}

/// All structural errors of a document that could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("schema has {} structural error(s)", .0.len())]
pub struct SchemaErrors(pub Vec<ValidationError>);

impl SchemaErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }
}

/// Check `value` against the schema contract. An empty list means valid.
pub fn validate(value: &Value) -> Vec<ValidationError> {
    let mut decoder = Decoder::default();
    decoder.schema(value);
    decoder.errors
}

/// Decode `value` into a typed [`Schema`], or every error that prevents it.
pub fn parse_schema(value: &Value) -> Result<Schema, SchemaErrors> {
    let mut decoder = Decoder::default();
    let schema = decoder.schema(value);
    decoder.finish(schema)
}

/// Decode a bare array of questions headed for `theme` of `subject`.
///
/// Errors are reported against that destination, as they would be once the
/// questions were saved there.
pub fn parse_questions(
    subject: &str,
    theme: &str,
    value: &Value,
) -> Result<Vec<Question>, SchemaErrors> {
    let mut decoder = Decoder::default();
    let questions = decoder.theme(subject, theme, value);
    decoder.finish(questions)
}

#[derive(Default)]
struct Decoder {
    errors: Vec<ValidationError>,
}

impl Decoder {
    fn finish<T>(self, decoded: Option<T>) -> Result<T, SchemaErrors> {
        match decoded {
            Some(decoded) if self.errors.is_empty() => Ok(decoded),
            _ => Err(SchemaErrors(self.errors)),
        }
    }

    fn schema(&mut self, value: &Value) -> Option<Schema> {
        let Some(subjects) = value.as_object() else {
            self.errors.push(ValidationError::RootNotObject);
            return None;
        };

        let mut schema = Schema::new();
        let mut complete = true;
        for (subject, themes) in subjects {
            match self.subject(subject, themes) {
                Some(decoded) => {
                    schema.0.insert(subject.clone(), decoded);
                }
                None => complete = false,
            }
        }

        debug!(
            subjects = subjects.len(),
            errors = self.errors.len(),
            "validated schema"
        );
        complete.then_some(schema)
    }

    fn subject(&mut self, subject: &str, value: &Value) -> Option<Subject> {
        let Some(themes) = value.as_object() else {
            self.errors.push(ValidationError::SubjectNotObject {
                subject: subject.to_string(),
            });
            return None;
        };

        let mut decoded = Subject::new();
        let mut complete = true;
        for (theme, questions) in themes {
            match self.theme(subject, theme, questions) {
                Some(questions) => {
                    decoded.insert(theme.clone(), questions);
                }
                None => complete = false,
            }
        }
        complete.then_some(decoded)
    }

    fn theme(&mut self, subject: &str, theme: &str, value: &Value) -> Option<Vec<Question>> {
        let Some(items) = value.as_array() else {
            self.errors.push(ValidationError::ThemeNotArray {
                subject: subject.to_string(),
                theme: theme.to_string(),
            });
            return None;
        };

        let mut questions = Vec::with_capacity(items.len());
        let mut complete = true;
        for (index, item) in items.iter().enumerate() {
            let path = QuestionPath {
                subject: subject.to_string(),
                theme: theme.to_string(),
                index,
                name: None,
            };
            match self.question(path, item) {
                Some(question) => questions.push(question),
                None => complete = false,
            }
        }
        complete.then_some(questions)
    }

    fn question(&mut self, mut path: QuestionPath, value: &Value) -> Option<Question> {
        let Some(fields) = value.as_object() else {
            self.errors.push(ValidationError::QuestionNotObject(path));
            return None;
        };

        let name = fields.get("name").and_then(Value::as_str);
        match name {
            Some(name) => path.name = Some(name.to_string()),
            None => self
                .errors
                .push(ValidationError::MissingName(path.clone())),
        }

        // without a type the remaining checks have nothing to go on
        let Some(kind) = fields.get("type").and_then(Value::as_str) else {
            self.errors.push(ValidationError::MissingType(path));
            return None;
        };

        let (kind, known) = match kind {
            QuestionKind::CHOICE => (
                self.answers(&path, fields)
                    .map(|answers| QuestionKind::Choice { answers }),
                ["answers"],
            ),
            QuestionKind::MULTICHOICE => (
                self.answers(&path, fields)
                    .map(|answers| QuestionKind::MultiChoice { answers }),
                ["answers"],
            ),
            QuestionKind::TEXT => {
                let correct_text = fields.get("correctText").and_then(Value::as_str);
                if correct_text.is_none() {
                    self.errors
                        .push(ValidationError::MissingCorrectText(path.clone()));
                }
                (
                    correct_text.map(|text| QuestionKind::Text {
                        correct_text: text.to_string(),
                    }),
                    ["correctText"],
                )
            }
            other => {
                self.errors.push(ValidationError::UnknownType {
                    question: path,
                    kind: other.to_string(),
                });
                return None;
            }
        };

        Some(Question {
            name: name?.to_string(),
            kind: kind?,
            extra: extra_fields(fields, &["name", "type", known[0]]),
        })
    }

    fn answers(&mut self, path: &QuestionPath, fields: &Map<String, Value>) -> Option<Vec<Answer>> {
        let Some(items) = fields.get("answers").and_then(Value::as_array) else {
            self.errors
                .push(ValidationError::MissingAnswers(path.clone()));
            return None;
        };

        let mut answers = Vec::with_capacity(items.len());
        let mut complete = true;
        for (answer, item) in items.iter().enumerate() {
            let Some(answer_fields) = item.as_object() else {
                self.errors.push(ValidationError::AnswerNotObject {
                    question: path.clone(),
                    answer,
                });
                complete = false;
                continue;
            };

            let name = answer_fields.get("name").and_then(Value::as_str);
            if name.is_none() {
                self.errors.push(ValidationError::AnswerMissingName {
                    question: path.clone(),
                    answer,
                });
            }
            let correct = answer_fields.get("correct").and_then(Value::as_bool);
            if correct.is_none() {
                self.errors.push(ValidationError::AnswerMissingCorrect {
                    question: path.clone(),
                    answer,
                });
            }

            match (name, correct) {
                (Some(name), Some(correct)) => answers.push(Answer {
                    name: name.to_string(),
                    correct,
                    extra: extra_fields(answer_fields, &["name", "correct"]),
                }),
                _ => complete = false,
            }
        }
        complete.then_some(answers)
    }
}

fn extra_fields(fields: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(value: &Value) -> Vec<String> {
        validate(value).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_schema_is_valid() {
        assert!(validate(&json!({})).is_empty());
        assert_eq!(parse_schema(&json!({})).unwrap(), Schema::new());
    }

    #[test]
    fn test_root_must_be_object() {
        for root in [json!([]), json!(null), json!("schema"), json!(3)] {
            assert_eq!(validate(&root), vec![ValidationError::RootNotObject]);
        }
    }

    #[test]
    fn test_subject_not_object_does_not_stop_other_subjects() {
        let value = json!({
            "Math": [],
            "Physics": {"Waves": [{"name": "X", "type": "essay"}]},
        });
        assert_eq!(
            messages(&value),
            vec![
                "subject \"Math\" must be an object of themes".to_string(),
                "question \"X\" (position 0) in theme \"Waves\" of subject \"Physics\" has unknown type \"essay\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_theme_not_array() {
        let value = json!({"Math": {"Algebra": {"name": "x"}, "Geometry": []}});
        assert_eq!(
            validate(&value),
            vec![ValidationError::ThemeNotArray {
                subject: "Math".into(),
                theme: "Algebra".into(),
            }]
        );
    }

    #[test]
    fn test_question_not_object_skips_remaining_checks() {
        let value = json!({"Math": {"Algebra": ["2+2?", null]}});
        assert_eq!(
            messages(&value),
            vec![
                "question at position 0 in theme \"Algebra\" of subject \"Math\" must be an object",
                "question at position 1 in theme \"Algebra\" of subject \"Math\" must be an object",
            ]
        );
    }

    #[test]
    fn test_missing_type_aborts_question() {
        let value = json!({"Math": {"Algebra": [{"name": 7, "answers": 3}]}});
        let errors = validate(&value);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::MissingName(_)));
        assert!(matches!(errors[1], ValidationError::MissingType(_)));
    }

    #[test]
    fn test_non_string_type_is_missing_type() {
        let value = json!({"Math": {"Algebra": [{"name": "Q", "type": 1}]}});
        assert_eq!(
            messages(&value),
            vec!["question \"Q\" (position 0) in theme \"Algebra\" of subject \"Math\" must have a \"type\" property of type string"]
        );
    }

    #[test]
    fn test_choice_requires_answers_array() {
        let value = json!({"Math": {"Algebra": [
            {"name": "A", "type": "choice"},
            {"name": "B", "type": "multichoice", "answers": {}},
        ]}});
        let errors = validate(&value);
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, ValidationError::MissingAnswers(_))));
    }

    #[test]
    fn test_answer_checks_are_independent() {
        let value = json!({"Math": {"Algebra": [{
            "name": "Q",
            "type": "multichoice",
            "answers": [
                {"name": "ok", "correct": false},
                {},
                "not an object",
                {"name": "half", "correct": "yes"},
            ],
        }]}});
        assert_eq!(
            messages(&value),
            vec![
                "answer at position 1 of question \"Q\" (position 0) in theme \"Algebra\" of subject \"Math\" must have a \"name\" property of type string",
                "answer at position 1 of question \"Q\" (position 0) in theme \"Algebra\" of subject \"Math\" must have a \"correct\" property of type boolean",
                "answer at position 2 of question \"Q\" (position 0) in theme \"Algebra\" of subject \"Math\" must be an object",
                "answer at position 3 of question \"Q\" (position 0) in theme \"Algebra\" of subject \"Math\" must have a \"correct\" property of type boolean",
            ]
        );
    }

    #[test]
    fn test_text_without_name_or_correct_text_reports_both() {
        let value = json!({"Math": {"Algebra": [{"type": "text"}]}});
        assert_eq!(
            messages(&value),
            vec![
                "question at position 0 in theme \"Algebra\" of subject \"Math\" must have a \"name\" property of type string",
                "question at position 0 in theme \"Algebra\" of subject \"Math\" of type \"text\" must have a \"correctText\" property of type string",
            ]
        );
    }

    #[test]
    fn test_choice_does_not_require_exactly_one_correct() {
        let value = json!({"Math": {"Algebra": [{
            "name": "Q",
            "type": "choice",
            "answers": [{"name": "a", "correct": true}, {"name": "b", "correct": true}],
        }]}});
        assert!(validate(&value).is_empty());
    }

    #[test]
    fn test_parse_schema_builds_typed_questions() {
        let value = json!({"Math": {"Algebra": [
            {"name": "2+2?", "type": "choice", "answers": [
                {"name": "4", "correct": true, "hint": "even"},
            ]},
            {"name": "Say four", "type": "text", "correctText": "four", "answers": []},
        ]}});
        let schema = parse_schema(&value).unwrap();
        let algebra = &schema.subject("Math").unwrap()["Algebra"];

        assert_eq!(algebra[0].type_name(), "choice");
        assert_eq!(algebra[0].kind.answers()[0].extra["hint"], json!("even"));
        assert_eq!(
            algebra[1].kind,
            QuestionKind::Text {
                correct_text: "four".into()
            }
        );
        assert_eq!(algebra[1].extra["answers"], json!([]));
        assert_eq!(serde_json::to_value(&schema).unwrap(), value);
    }

    #[test]
    fn test_parse_schema_returns_all_errors() {
        let value = json!({"Math": {"Algebra": [{"type": "text"}], "Sets": 4}});
        let errors = parse_schema(&value).unwrap_err();
        assert_eq!(errors.errors().len(), 3);
        assert_eq!(errors.to_string(), "schema has 3 structural error(s)");
    }

    #[test]
    fn test_parse_questions_reports_destination() {
        let batch = json!([{"name": "Q", "type": "bool"}]);
        let errors = parse_questions("Math", "Logic", &batch).unwrap_err();
        assert_eq!(
            errors.errors()[0].to_string(),
            "question \"Q\" (position 0) in theme \"Logic\" of subject \"Math\" has unknown type \"bool\""
        );

        let ok = parse_questions("Math", "Logic", &json!([])).unwrap();
        assert!(ok.is_empty());
    }
}
