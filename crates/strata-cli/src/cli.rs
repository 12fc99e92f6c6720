use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use strata_merge::ConflictStrategy;

#[derive(Parser)]
#[command(
    name = "strata",
    about = "Strata: three-way structural merge for JSON documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./strata.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Command {
    /// Three-way merge of two documents against their common ancestor
    Merge(MergeArgs),
    /// Show the top-level changes between two documents
    Diff(DiffArgs),
    /// Print the content hash of a document
    Hash(HashArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    pub base: PathBuf,
    pub ours: PathBuf,
    pub theirs: PathBuf,
    /// How to settle conflicting changes (report, ours, theirs)
    #[arg(long)]
    pub strategy: Option<ConflictStrategy>,
    /// Write the merged document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Run diffs and nested merges on the calling thread
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
}

#[derive(Args)]
pub struct HashArgs {
    pub file: PathBuf,
}
