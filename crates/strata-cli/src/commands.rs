use std::process::ExitCode;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::Value as Json;
use strata_diff::ChangeSet;
use strata_merge::{Candidate, Conflict, MergeOptions, MergeOutcome, Merger};
use strata_store::InMemoryObjectStore;
use strata_value::Value;
use tracing::{debug, info};

use crate::cli::*;
use crate::config::CliConfig;
use crate::document;
use crate::output::Table;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = CliConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Merge(args) => cmd_merge(args, config.merge, cli.format),
        Command::Diff(args) => cmd_diff(args, cli.format),
        Command::Hash(args) => cmd_hash(args, cli.format),
    }
}

/// Merge options after command-line overrides.
fn merge_options(args: &MergeArgs, mut options: MergeOptions) -> MergeOptions {
    if let Some(strategy) = args.strategy {
        options.strategy = strategy;
    }
    if args.sequential {
        options.parallel_diffs = false;
        options.parallel_submerges = false;
    }
    options
}

struct MergeReport {
    outcome: MergeOutcome,
    document: Json,
}

fn run_merge(store: &InMemoryObjectStore, args: &MergeArgs, options: MergeOptions) -> anyhow::Result<MergeReport> {
    let base = document::load(store, &args.base)?;
    let ours = document::load(store, &args.ours)?;
    let theirs = document::load(store, &args.theirs)?;
    debug!(?options, chunks = store.len(), "documents loaded");

    let outcome = Merger::new(store, options)
        .merge_values(&base, &ours, &theirs)
        .context("merge failed")?;
    info!(
        conflicts = outcome.conflicts.len(),
        resolved = outcome.resolved.len(),
        "merge finished"
    );
    let document = document::to_json(store, &outcome.merged)?;
    Ok(MergeReport { outcome, document })
}

fn cmd_merge(args: MergeArgs, options: MergeOptions, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let store = InMemoryObjectStore::new();
    let options = merge_options(&args, options);
    let report = run_merge(&store, &args, options)?;
    let merged = serde_json::to_string_pretty(&report.document)?;

    let table = conflict_table(&report.outcome);
    let rendered = table.render(format);
    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{merged}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            if !table.is_empty() {
                print!("{rendered}");
            }
        }
        None => {
            // The document owns stdout, so the report goes to stderr.
            println!("{merged}");
            if !table.is_empty() {
                eprint!("{rendered}");
            }
        }
    }

    let outcome = &report.outcome;
    if format == OutputFormat::Text {
        if outcome.is_clean() {
            eprintln!(
                "{} Merged cleanly ({} auto-resolved)",
                "✓".green().bold(),
                outcome.resolved.len()
            );
        } else {
            eprintln!(
                "{} {} unresolved conflict(s)",
                "✗".red().bold(),
                outcome.conflicts.len()
            );
        }
    }
    Ok(if outcome.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn cell(value: &Option<Value>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn conflict_row(conflict: &Conflict, status: &str) -> Vec<String> {
    vec![
        conflict.path.to_string(),
        status.to_string(),
        cell(&conflict.base),
        cell(&conflict.ours),
        cell(&conflict.theirs),
    ]
}

fn conflict_table(outcome: &MergeOutcome) -> Table {
    let mut table = Table::new(["path", "status", "base", "ours", "theirs"]);
    for conflict in &outcome.conflicts {
        table.push(conflict_row(conflict, "conflict"));
    }
    for conflict in &outcome.resolved {
        table.push(conflict_row(conflict, "resolved"));
    }
    table
}

fn diff_documents(store: &InMemoryObjectStore, old: &Value, new: &Value) -> anyhow::Result<ChangeSet> {
    let (Some(old), Some(new)) = (Candidate::from_value(old), Candidate::from_value(new)) else {
        bail!("only objects and arrays can be diffed");
    };
    if !old.same_variant(&new) {
        bail!("cannot diff a {} against a {}", new.kind(), old.kind());
    }
    let changes = new.diff(store, &old)?;
    Ok(ChangeSet::collect(changes)?)
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let store = InMemoryObjectStore::new();
    let old = document::load(&store, &args.old)?;
    let new = document::load(&store, &args.new)?;
    let changes = diff_documents(&store, &old, &new)?;

    let mut table = Table::new(["key", "change", "old", "new"]);
    for change in &changes.changes {
        table.push(vec![
            change.key.to_string(),
            change.kind.to_string(),
            cell(&change.old_value),
            cell(&change.new_value),
        ]);
    }

    if format == OutputFormat::Text && changes.is_empty() {
        println!("No changes.");
        return Ok(ExitCode::SUCCESS);
    }
    print!("{}", table.render(format));
    if format == OutputFormat::Text {
        println!(
            "{} added, {} removed, {} modified",
            changes.additions().to_string().green(),
            changes.removals().to_string().red(),
            changes.modifications().to_string().yellow()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_hash(args: HashArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let store = InMemoryObjectStore::new();
    let value = document::load(&store, &args.file)?;
    let hash = value.hash();
    match format {
        OutputFormat::Text => println!("{}  {}", hash.to_hex().yellow(), args.file.display()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({"file": args.file.display().to_string(), "hash": hash.to_hex()})
        ),
        OutputFormat::Csv => println!("{},{}", hash.to_hex(), args.file.display()),
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use strata_merge::ConflictStrategy;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn args(dir: &Path, base: &str, ours: &str, theirs: &str) -> MergeArgs {
        MergeArgs {
            base: write(dir, "base.json", base),
            ours: write(dir, "ours.json", ours),
            theirs: write(dir, "theirs.json", theirs),
            strategy: None,
            output: None,
            sequential: false,
        }
    }

    #[test]
    fn clean_merge_combines_documents() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(
            dir.path(),
            r#"{"a": {"x": 1}}"#,
            r#"{"a": {"x": 1, "y": 2}}"#,
            r#"{"a": {"x": 1, "z": 3}}"#,
        );
        let store = InMemoryObjectStore::new();
        let report = run_merge(&store, &args, MergeOptions::default()).unwrap();
        assert!(report.outcome.is_clean());
        assert_eq!(
            report.document,
            serde_json::json!({"a": {"x": 1.0, "y": 2.0, "z": 3.0}})
        );
    }

    #[test]
    fn conflicts_are_tabulated() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), r#"{"a": 1}"#, r#"{"a": 2}"#, r#"{"a": 3}"#);
        let store = InMemoryObjectStore::new();
        let report = run_merge(&store, &args, MergeOptions::default()).unwrap();
        assert_eq!(report.document, serde_json::json!({"a": 1.0}));

        let table = conflict_table(&report.outcome);
        assert_eq!(table.rows, vec![vec![
            "[\"a\"]".to_string(),
            "conflict".to_string(),
            "1".to_string(),
            "2".to_string(),
            "3".to_string(),
        ]]);
    }

    #[test]
    fn command_line_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), "{}", "{}", "{}");
        args.strategy = Some(ConflictStrategy::Theirs);
        args.sequential = true;
        let options = merge_options(&args, MergeOptions::default());
        assert_eq!(options.strategy, ConflictStrategy::Theirs);
        assert!(!options.parallel_diffs);

        args.strategy = None;
        let config = MergeOptions::default().with_strategy(ConflictStrategy::Ours);
        assert_eq!(merge_options(&args, config).strategy, ConflictStrategy::Ours);
    }

    #[test]
    fn merge_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), r#"{"a": 1}"#, r#"{"a": 2}"#, r#"{"a": 1, "b": true}"#);
        let output = dir.path().join("merged.json");
        args.output = Some(output.clone());
        cmd_merge(args, MergeOptions::default(), OutputFormat::Json).unwrap();

        let written: Json = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"a": 2.0, "b": true}));
    }

    #[test]
    fn diff_lists_top_level_changes() {
        let store = InMemoryObjectStore::new();
        let old = document::from_json(&store, &serde_json::json!({"a": 1, "b": 2})).unwrap();
        let new = document::from_json(&store, &serde_json::json!({"b": 3, "c": 4})).unwrap();
        let changes = diff_documents(&store, &old, &new).unwrap();
        assert_eq!(changes.len(), 3);
        assert_eq!(changes.additions(), 1);
        assert_eq!(changes.removals(), 1);
        assert_eq!(changes.modifications(), 1);
    }

    #[test]
    fn diff_rejects_mismatched_documents() {
        let store = InMemoryObjectStore::new();
        let old = document::from_json(&store, &serde_json::json!({"a": 1})).unwrap();
        let new = document::from_json(&store, &serde_json::json!([1])).unwrap();
        assert!(diff_documents(&store, &old, &new).is_err());
        assert!(diff_documents(&store, &Value::from(1.0), &new).is_err());
    }
}
