pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod render;
pub mod rules;

pub use checker::{EvaluationSnapshot, FixOutcome, Linter};
pub use checker::summary::{summarize, Status, Summary};
pub use config::Config;
pub use rules::{Rule, RuleRegistry, RuleResult};

use serde::{Deserialize, Serialize};

/// A located problem reported by a rule.
///
/// `start` and `end` are byte offsets into the checked text and always fall
/// on char boundaries, so `&text[start..end]` is the offending slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRange {
    pub start: usize,
    pub end: usize,
    pub message: String,
}

impl ProblemRange {
    pub fn new(start: usize, end: usize, message: impl Into<String>) -> Self {
        Self {
            start,
            end,
            message: message.into(),
        }
    }
}

/// A disjoint highlight span produced by coalescing overlapping or touching
/// problem ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRange {
    pub start: usize,
    pub end: usize,
    pub message: String,
}

impl From<ProblemRange> for MergedRange {
    fn from(range: ProblemRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
            message: range.message,
        }
    }
}

impl From<&MergedRange> for ProblemRange {
    fn from(range: &MergedRange) -> Self {
        Self::new(range.start, range.end, range.message.clone())
    }
}
