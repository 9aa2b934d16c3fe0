use clap::{Args, Parser, Subcommand};

use crate::report::OutputFormat;

pub const DEFAULT_SCHEMA: &str = "schema.json";

#[derive(Parser, Debug)]
#[command(name = "quiz-schema", version, about = "Validate, deduplicate and merge quiz schema files")]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,

    /// report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// more log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a schema, then list duplicate questions and statistics
    Check(CheckArgs),
    /// Merge several schemas, earliest copy of each question wins
    Merge(MergeArgs),
    /// Add question batches to one theme of a schema, skipping known questions
    Add(AddArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// schema file or http(s) URL
    #[arg(env = "QUIZ_SCHEMA", default_value = DEFAULT_SCHEMA)]
    pub schema: String,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// schemas to merge, in priority order
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// where to write the merged schema
    #[arg(short, long)]
    pub output: String,

    /// leave invalid inputs out instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// schema to extend
    #[arg(long, env = "QUIZ_SCHEMA", default_value = DEFAULT_SCHEMA)]
    pub schema: String,

    #[arg(long)]
    pub subject: String,

    #[arg(long)]
    pub theme: String,

    /// JSON files, each holding an array of questions
    #[arg(required = true)]
    pub questions: Vec<String>,

    /// compare only trimmed, decoded text instead of fully normalized text
    #[arg(long)]
    pub loose: bool,

    /// where to write the result, defaults to overwriting the schema
    #[arg(short, long)]
    pub output: Option<String>,
}

impl AddArgs {
    pub fn output_path(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.schema)
    }
}
