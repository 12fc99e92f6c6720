use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do when both sides changed the same key incompatibly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    /// Keep the ancestor's value at the key and report the conflict.
    #[default]
    Report,
    /// Take our side's change and record the conflict as resolved.
    Ours,
    /// Take their side's change and record the conflict as resolved.
    Theirs,
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report => write!(f, "report"),
            Self::Ours => write!(f, "ours"),
            Self::Theirs => write!(f, "theirs"),
        }
    }
}

impl FromStr for ConflictStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "report" => Ok(Self::Report),
            "ours" => Ok(Self::Ours),
            "theirs" => Ok(Self::Theirs),
            other => Err(format!(
                "unknown conflict strategy '{other}' (expected report, ours or theirs)"
            )),
        }
    }
}

/// Configuration for a [`Merger`](crate::Merger).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// How hard conflicts are handled.
    pub strategy: ConflictStrategy,
    /// Produce the two diff streams on background threads.
    pub parallel_diffs: bool,
    /// Run independent nested merges at one level on separate threads.
    pub parallel_submerges: bool,
    /// How many changes a background diff may buffer ahead of the merge.
    pub diff_buffer: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            strategy: ConflictStrategy::Report,
            parallel_diffs: true,
            parallel_submerges: false,
            diff_buffer: 64,
        }
    }
}

impl MergeOptions {
    /// Everything on the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel_diffs: false,
            parallel_submerges: false,
            ..Default::default()
        }
    }

    pub fn with_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}
