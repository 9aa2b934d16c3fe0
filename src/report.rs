//! Human and machine readable reports for the command-line tool.

use std::fmt::Write;

use serde::Serialize;
use thiserror::Error;

use crate::schema::{DuplicateGroup, MergeStats, SchemaStats, ValidationError};
use crate::session::{CollectOutcome, CommitOutcome};
use crate::text::decode_unicode;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const RULE: &str = "=====================================";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize report as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to serialize report as YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to format report: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Result of checking one schema document.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub source: String,
    pub errors: Vec<String>,
    /// only computed for structurally valid documents
    pub duplicates: Option<Vec<DuplicateGroup>>,
    pub statistics: Option<SchemaStats>,
}

impl CheckReport {
    pub fn invalid(source: &str, errors: &[ValidationError]) -> Self {
        Self {
            source: source.to_string(),
            errors: errors.iter().map(ToString::to_string).collect(),
            duplicates: None,
            statistics: None,
        }
    }

    pub fn valid(source: &str, duplicates: Vec<DuplicateGroup>, statistics: SchemaStats) -> Self {
        Self {
            source: source.to_string(),
            errors: Vec::new(),
            duplicates: Some(duplicates),
            statistics: Some(statistics),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeReport<'a> {
    pub output: &'a str,
    #[serde(flatten)]
    pub stats: &'a MergeStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddReport<'a> {
    pub subject: &'a str,
    pub theme: &'a str,
    pub collected: CollectOutcome,
    pub committed: CommitOutcome,
    pub output: &'a str,
}

fn serialize<T: Serialize>(report: &T, format: OutputFormat) -> Result<Option<String>, ReportError> {
    Ok(match format {
        OutputFormat::Text => None,
        OutputFormat::Json => Some(serde_json::to_string_pretty(report)? + "\n"),
        OutputFormat::Yaml => Some(serde_yaml_ng::to_string(report)?),
    })
}

pub fn render_check(report: &CheckReport, format: OutputFormat) -> Result<String, ReportError> {
    if let Some(serialized) = serialize(report, format)? {
        return Ok(serialized);
    }

    let mut out = String::new();
    writeln!(out, "Loaded {BOLD}{}{RESET}", report.source)?;
    writeln!(out, "{RULE}\n")?;

    if report.is_valid() {
        writeln!(out, "The schema structure is valid.")?;
    } else {
        writeln!(out, "{BOLD}The schema has errors:{RESET}")?;
        for error in &report.errors {
            writeln!(out, "  - {error}")?;
        }
    }

    if let Some(duplicates) = &report.duplicates {
        writeln!(out, "\n{RULE}\n")?;
        write_duplicates(&mut out, duplicates)?;
    }

    if let Some(statistics) = &report.statistics {
        writeln!(out, "\n{RULE}\n")?;
        write_statistics(&mut out, statistics)?;
    }

    Ok(out)
}

fn write_duplicates(out: &mut String, duplicates: &[DuplicateGroup]) -> std::fmt::Result {
    if duplicates.is_empty() {
        writeln!(out, "No duplicate questions found.")?;
        return Ok(());
    }

    writeln!(out, "{BOLD}Duplicate questions found:{RESET}\n")?;
    for (number, group) in duplicates.iter().enumerate() {
        writeln!(
            out,
            "{}. Question: \"{}\"",
            number + 1,
            decode_unicode(&group.sample_original_text)
        )?;
        writeln!(out, "   Found in:")?;
        for location in &group.locations {
            writeln!(
                out,
                "     - Subject: {} | Theme: {} | Position: {}",
                decode_unicode(&location.subject),
                decode_unicode(&location.theme),
                location.index + 1
            )?;
        }
        writeln!(out)?;
    }
    writeln!(out, "Total duplicated questions: {}", duplicates.len())
}

fn write_statistics(out: &mut String, stats: &SchemaStats) -> std::fmt::Result {
    writeln!(out, "{BOLD}Schema statistics:{RESET}")?;
    writeln!(out, "----------------------------")?;

    for (subject, subject_stats) in &stats.per_subject {
        let subject = decode_unicode(subject);
        writeln!(out, "\n{subject}:")?;
        for (theme, count) in &subject_stats.themes {
            writeln!(out, "   {}: {count} questions", decode_unicode(theme))?;
        }
        writeln!(
            out,
            "   Total in {subject}: {} questions",
            subject_stats.questions
        )?;
    }

    writeln!(out, "\n----------------------------")?;
    writeln!(out, "Total subjects: {}", stats.subjects)?;
    writeln!(out, "Total themes: {}", stats.themes)?;
    writeln!(out, "Total questions: {}", stats.questions)?;

    writeln!(out, "\nQuestions by type:")?;
    for (kind, count) in &stats.by_type {
        writeln!(out, "   - {kind}: {count} questions")?;
    }
    Ok(())
}

pub fn render_merge(report: &MergeReport<'_>, format: OutputFormat) -> Result<String, ReportError> {
    if let Some(serialized) = serialize(report, format)? {
        return Ok(serialized);
    }

    let stats = report.stats;
    let mut out = String::new();
    for label in &stats.skipped {
        writeln!(out, "skipped invalid input {BOLD}{label}{RESET}")?;
    }
    for file in &stats.per_file {
        writeln!(
            out,
            "{}: {} added, {} duplicates",
            file.label, file.counts.added, file.counts.duplicates
        )?;
    }
    writeln!(out, "---")?;
    for (subject, counts) in &stats.per_subject {
        writeln!(
            out,
            "{}: {} added, {} duplicates",
            decode_unicode(subject),
            counts.added,
            counts.duplicates
        )?;
    }
    writeln!(out, "---")?;
    writeln!(
        out,
        "merged {BOLD}{}{RESET} questions ({} duplicates discarded) into {BOLD}{}{RESET}",
        stats.total_added, stats.total_duplicates, report.output
    )?;
    Ok(out)
}

pub fn render_add(report: &AddReport<'_>, format: OutputFormat) -> Result<String, ReportError> {
    if let Some(serialized) = serialize(report, format)? {
        return Ok(serialized);
    }

    let mut out = String::new();
    if report.collected.duplicates > 0 {
        writeln!(
            out,
            "{} repeated questions in the input were ignored",
            report.collected.duplicates
        )?;
    }
    if report.committed.added == 0 {
        writeln!(
            out,
            "all questions already exist in {} / {}",
            decode_unicode(report.subject),
            decode_unicode(report.theme)
        )?;
    } else {
        writeln!(
            out,
            "added {BOLD}{}{RESET} new questions of {} processed to {} / {} in {BOLD}{}{RESET}",
            report.committed.added,
            report.committed.processed,
            decode_unicode(report.subject),
            decode_unicode(report.theme),
            report.output
        )?;
    }
    Ok(out)
}
