use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use quiz_schema::{
    config::{AddArgs, CheckArgs, Command, Config, MergeArgs},
    load::{load_json, save_schema},
    logging::init_tracing,
    report::{render_add, render_check, render_merge, AddReport, CheckReport, MergeReport, OutputFormat},
    schema::{
        find_duplicates, merge_schemas, parse_questions, parse_schema, schema_stats, MergeError,
        MergeInput, MergeOptions,
    },
    session::{CollectOutcome, MatchRule, Session},
};
use tracing::{error, info};

fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let config = Config::parse();
    init_tracing(config.verbose, config.log_json);

    match &config.command {
        Command::Check(args) => check(args, config.format),
        Command::Merge(args) => merge(args, config.format),
        Command::Add(args) => add(args, config.format),
    }
}

fn check(args: &CheckArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let value = load_json(&args.schema).context(format!("failed to load {}", args.schema))?;

    let report = match parse_schema(&value) {
        Ok(schema) => CheckReport::valid(&args.schema, find_duplicates(&schema), schema_stats(&schema)),
        Err(errors) => CheckReport::invalid(&args.schema, errors.errors()),
    };
    print!("{}", render_check(&report, format)?);

    Ok(if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn merge(args: &MergeArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let documents = args
        .inputs
        .iter()
        .map(|path| load_json(path).context(format!("failed to load {}", path)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let inputs: Vec<MergeInput> = args
        .inputs
        .iter()
        .zip(&documents)
        .map(|(label, data)| MergeInput::new(label, data))
        .collect();

    let options = MergeOptions {
        skip_invalid_files: args.skip_invalid,
    };
    let outcome = match merge_schemas(&inputs, options) {
        Ok(outcome) => outcome,
        Err(MergeError::InvalidInputs(invalid)) => {
            for input in &invalid {
                eprintln!("{} is not a valid schema:", input.label);
                for err in &input.errors {
                    eprintln!("  - {err}");
                }
            }
            error!(invalid = invalid.len(), "nothing was merged");
            return Ok(ExitCode::FAILURE);
        }
    };

    save_schema(&outcome.merged, &args.output)
        .context(format!("failed to write merged schema to {}", args.output))?;

    let report = MergeReport {
        output: &args.output,
        stats: &outcome.stats,
    };
    print!("{}", render_merge(&report, format)?);
    Ok(ExitCode::SUCCESS)
}

fn add(args: &AddArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let value = load_json(&args.schema).context(format!("failed to load {}", args.schema))?;
    let mut schema = match parse_schema(&value) {
        Ok(schema) => schema,
        Err(errors) => {
            print!("{}", render_check(&CheckReport::invalid(&args.schema, errors.errors()), format)?);
            return Ok(ExitCode::FAILURE);
        }
    };

    let rule = if args.loose {
        MatchRule::Loose
    } else {
        MatchRule::Strict
    };
    let mut session = Session::with_rule(rule);
    let mut collected = CollectOutcome::default();
    for path in &args.questions {
        let batch = load_json(path).context(format!("failed to load {}", path))?;
        let questions = match parse_questions(&args.subject, &args.theme, &batch) {
            Ok(questions) => questions,
            Err(errors) => {
                print!("{}", render_check(&CheckReport::invalid(path, errors.errors()), format)?);
                return Ok(ExitCode::FAILURE);
            }
        };
        let outcome = session.collect(questions);
        info!(path = path.as_str(), added = outcome.added, "read question batch");
        collected += outcome;
    }

    let committed = session
        .commit(&mut schema, &args.subject, &args.theme)
        .context("failed to add questions")?;

    let output = args.output_path();
    if committed.added > 0 {
        save_schema(&schema, output).context(format!("failed to write schema to {}", output))?;
    }

    let report = AddReport {
        subject: &args.subject,
        theme: &args.theme,
        collected,
        committed,
        output,
    };
    print!("{}", render_add(&report, format)?);
    Ok(ExitCode::SUCCESS)
}
