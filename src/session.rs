//! Collecting new questions and saving them into a theme.
//!
//! A [`Session`] is owned by whoever drives the import. It gathers batches of
//! questions (for example, several scraped exam pages), drops the ones it has
//! already gathered, and finally commits what is new into one theme of a
//! [`Schema`].

use std::{collections::HashSet, ops::AddAssign};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::schema::{Question, Schema};
use crate::text::{comparison_key, normalize};

/// How two question texts are decided to be the same question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchRule {
    /// [`normalize`]: escapes, case, accents, `¿?¡!` and spacing ignored
    #[default]
    Strict,
    /// [`comparison_key`]: only escapes and surrounding whitespace ignored
    Loose,
}

impl MatchRule {
    pub fn key(self, text: &str) -> String {
        match self {
            MatchRule::Strict => normalize(text),
            MatchRule::Loose => comparison_key(text),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("subject \"{0}\" does not exist in the schema")]
    UnknownSubject(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectOutcome {
    pub added: usize,
    pub duplicates: usize,
}

impl AddAssign for CollectOutcome {
    fn add_assign(&mut self, other: Self) {
        self.added += other.added;
        self.duplicates += other.duplicates;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    /// questions appended to the theme
    pub added: usize,
    /// questions left out because the theme already had them
    pub existing: usize,
    /// questions the session held when the commit started
    pub processed: usize,
}

#[derive(Debug, Default)]
pub struct Session {
    rule: MatchRule,
    questions: Vec<Question>,
    keys: HashSet<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(rule: MatchRule) -> Self {
        Self {
            rule,
            ..Self::default()
        }
    }

    pub fn rule(&self) -> MatchRule {
        self.rule
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Add a batch, skipping questions already held by the session.
    pub fn collect(&mut self, batch: impl IntoIterator<Item = Question>) -> CollectOutcome {
        let mut outcome = CollectOutcome::default();
        for question in batch {
            if self.keys.insert(self.rule.key(&question.name)) {
                self.questions.push(question);
                outcome.added += 1;
            } else {
                outcome.duplicates += 1;
            }
        }
        debug!(
            added = outcome.added,
            duplicates = outcome.duplicates,
            "collected batch"
        );
        outcome
    }

    /// Append the held questions that `theme` of `subject` does not have yet.
    ///
    /// The theme is created when missing; the subject must already exist.
    /// The session is emptied on success.
    pub fn commit(
        &mut self,
        schema: &mut Schema,
        subject: &str,
        theme: &str,
    ) -> Result<CommitOutcome, SessionError> {
        let themes = schema
            .subject_mut(subject)
            .ok_or_else(|| SessionError::UnknownSubject(subject.to_string()))?;
        let existing = themes.entry(theme.to_string()).or_default();

        let mut present: HashSet<String> = existing
            .iter()
            .map(|question| self.rule.key(&question.name))
            .collect();

        let mut outcome = CommitOutcome {
            processed: self.questions.len(),
            ..CommitOutcome::default()
        };
        for question in self.questions.drain(..) {
            if present.insert(self.rule.key(&question.name)) {
                existing.push(question);
                outcome.added += 1;
            } else {
                outcome.existing += 1;
            }
        }
        self.keys.clear();

        info!(
            subject,
            theme,
            added = outcome.added,
            existing = outcome.existing,
            "committed session"
        );
        Ok(outcome)
    }
}
