//! Merging several schema files into one.
//!
//! Inputs are folded in the order given. A question is kept only if no
//! question with the same [`normalize`]d text is already present in the
//! merged theme, so the earliest copy always wins.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    question::Schema,
    validate::{parse_schema, ValidationError},
};
use crate::text::normalize;

/// One schema document to merge, with the label it is reported under.
#[derive(Debug, Clone, Copy)]
pub struct MergeInput<'a> {
    pub label: &'a str,
    pub data: &'a Value,
}

impl<'a> MergeInput<'a> {
    pub fn new(label: &'a str, data: &'a Value) -> Self {
        Self { label, data }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// leave invalid inputs out instead of aborting the whole merge
    pub skip_invalid_files: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeCounts {
    pub added: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMergeStats {
    pub label: String,
    #[serde(flatten)]
    pub counts: MergeCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub total_added: usize,
    pub total_duplicates: usize,
    /// one entry per merged input, in input order
    pub per_file: Vec<FileMergeStats>,
    pub per_subject: IndexMap<String, MergeCounts>,
    /// labels of inputs left out because they failed validation
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged: Schema,
    pub stats: MergeStats,
}

/// An input that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInput {
    pub label: String,
    pub errors: Vec<ValidationError>,
}

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("{} input(s) failed validation: {}", .0.len(), labels(.0))]
    InvalidInputs(Vec<InvalidInput>),
}

fn labels(invalid: &[InvalidInput]) -> String {
    invalid
        .iter()
        .map(|input| input.label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Merge `inputs` in order.
///
/// Every input is validated first. Unless `options.skip_invalid_files` is set,
/// a single invalid input aborts the merge and every invalid input is returned
/// with its errors.
pub fn merge_schemas(
    inputs: &[MergeInput<'_>],
    options: MergeOptions,
) -> Result<MergeOutcome, MergeError> {
    let mut valid = Vec::with_capacity(inputs.len());
    let mut invalid = Vec::new();

    for input in inputs {
        match parse_schema(input.data) {
            Ok(schema) => valid.push((input.label, schema)),
            Err(errors) => invalid.push(InvalidInput {
                label: input.label.to_string(),
                errors: errors.0,
            }),
        }
    }

    if !invalid.is_empty() && !options.skip_invalid_files {
        warn!(invalid = invalid.len(), "merge aborted");
        return Err(MergeError::InvalidInputs(invalid));
    }

    let mut merger = Merger::default();
    merger.stats.skipped = invalid.into_iter().map(|input| input.label).collect();
    for label in &merger.stats.skipped {
        warn!(label = label.as_str(), "skipping invalid input");
    }

    for (label, schema) in valid {
        merger.fold(label, schema);
    }

    info!(
        added = merger.stats.total_added,
        duplicates = merger.stats.total_duplicates,
        "merge finished"
    );
    Ok(MergeOutcome {
        merged: merger.merged,
        stats: merger.stats,
    })
}

#[derive(Default)]
struct Merger {
    merged: Schema,
    stats: MergeStats,
    /// normalized texts already present, per (subject, theme)
    seen: HashMap<(String, String), HashSet<String>>,
}

impl Merger {
    fn fold(&mut self, label: &str, schema: Schema) {
        let mut file = MergeCounts::default();

        for (subject, themes) in schema.0 {
            let mut subject_counts = self
                .stats
                .per_subject
                .get(&subject)
                .copied()
                .unwrap_or_default();
            let merged_subject = self.merged.subject_entry(&subject);

            for (theme, questions) in themes {
                let seen = self
                    .seen
                    .entry((subject.clone(), theme.clone()))
                    .or_default();
                let merged_theme = merged_subject.entry(theme).or_default();

                for question in questions {
                    if seen.insert(normalize(&question.name)) {
                        merged_theme.push(question);
                        file.added += 1;
                        subject_counts.added += 1;
                    } else {
                        file.duplicates += 1;
                        subject_counts.duplicates += 1;
                    }
                }
            }

            self.stats.per_subject.insert(subject, subject_counts);
        }

        debug!(
            label,
            added = file.added,
            duplicates = file.duplicates,
            "merged input"
        );
        self.stats.total_added += file.added;
        self.stats.total_duplicates += file.duplicates;
        self.stats.per_file.push(FileMergeStats {
            label: label.to_string(),
            counts: file,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn choice(name: &str) -> Value {
        json!({"name": name, "type": "choice", "answers": [{"name": "4", "correct": true}]})
    }

    fn names(schema: &Schema) -> Vec<String> {
        schema.questions().map(|q| q.question.name.clone()).collect()
    }

    #[test]
    fn test_merge_keeps_first_copy() {
        let first = json!({"Math": {"Algebra": [choice("2+2?")]}});
        let second = json!({"Math": {"Algebra": [choice("¿2+2?"), choice("3+3")]}});

        let outcome = merge_schemas(
            &[MergeInput::new("a.json", &first), MergeInput::new("b.json", &second)],
            MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(names(&outcome.merged), vec!["2+2?", "3+3"]);
        assert_eq!(outcome.stats.total_added, 2);
        assert_eq!(outcome.stats.total_duplicates, 1);
        assert_eq!(
            outcome.stats.per_file,
            vec![
                FileMergeStats {
                    label: "a.json".into(),
                    counts: MergeCounts { added: 1, duplicates: 0 },
                },
                FileMergeStats {
                    label: "b.json".into(),
                    counts: MergeCounts { added: 1, duplicates: 1 },
                },
            ]
        );
        assert_eq!(
            outcome.stats.per_subject["Math"],
            MergeCounts { added: 2, duplicates: 1 }
        );
    }

    #[test]
    fn test_duplicates_within_one_file_are_dropped() {
        let only = json!({"Math": {"Algebra": [choice("x"), choice("X!")]}});
        let outcome =
            merge_schemas(&[MergeInput::new("only", &only)], MergeOptions::default()).unwrap();

        assert_eq!(names(&outcome.merged), vec!["x"]);
        assert_eq!(outcome.stats.total_duplicates, 1);
    }

    #[test]
    fn test_equal_text_in_other_theme_is_not_a_duplicate() {
        let first = json!({"Math": {"Algebra": [choice("x")]}});
        let second = json!({"Math": {"Review": [choice("x")]}, "Physics": {"Algebra": [choice("x")]}});
        let outcome = merge_schemas(
            &[MergeInput::new("1", &first), MergeInput::new("2", &second)],
            MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome.stats.total_added, 3);
        assert_eq!(outcome.stats.total_duplicates, 0);
        assert_eq!(
            outcome.merged.subject("Math").unwrap().keys().collect::<Vec<_>>(),
            vec!["Algebra", "Review"]
        );
    }

    #[test]
    fn test_invalid_input_aborts_by_default() {
        let good = json!({"Math": {"Algebra": [choice("x")]}});
        let bad = json!({"Math": {"Algebra": [{"name": "y", "type": "essay"}]}});
        let worse = json!([]);

        let err = merge_schemas(
            &[
                MergeInput::new("good", &good),
                MergeInput::new("bad", &bad),
                MergeInput::new("worse", &worse),
            ],
            MergeOptions::default(),
        )
        .unwrap_err();

        let MergeError::InvalidInputs(invalid) = &err;
        assert_eq!(invalid.len(), 2);
        assert_eq!(invalid[0].label, "bad");
        assert_eq!(invalid[1].errors, vec![ValidationError::RootNotObject]);
        assert_eq!(err.to_string(), "2 input(s) failed validation: bad, worse");
    }

    #[test]
    fn test_skip_invalid_files() {
        let good = json!({"Math": {"Algebra": [choice("x")]}});
        let bad = json!({"Math": 1});

        let outcome = merge_schemas(
            &[MergeInput::new("bad", &bad), MergeInput::new("good", &good)],
            MergeOptions {
                skip_invalid_files: true,
            },
        )
        .unwrap();

        assert_eq!(outcome.stats.skipped, vec!["bad".to_string()]);
        assert_eq!(outcome.stats.per_file.len(), 1);
        assert_eq!(names(&outcome.merged), vec!["x"]);
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let first = json!({"Math": {"Algebra": [choice("x")]}});
        let copy = first.clone();
        merge_schemas(
            &[MergeInput::new("1", &first), MergeInput::new("2", &first)],
            MergeOptions::default(),
        )
        .unwrap();
        assert_eq!(first, copy);
    }
}
