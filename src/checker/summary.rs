use crate::checker::EvaluationSnapshot;
use crate::rules::{RuleRegistry, RuleResult};
use serde::Serialize;
use std::fmt;

/// Overall outcome of an evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Clean,
    /// Every reported problem can be fixed automatically.
    AutoFixable,
    /// No reported problem can be fixed automatically.
    ManualOnly,
    Mixed,
}

impl Status {
    pub fn headline(self) -> &'static str {
        match self {
            Status::Clean => "Идеально! Текст соответствует всем требованиям",
            Status::AutoFixable => "Найдены проблемы, которые можно исправить автоматически:",
            Status::ManualOnly => "Текст исправлен, но есть проблемы:",
            Status::Mixed => "Найдены проблемы:",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Clean => write!(f, "clean"),
            Status::AutoFixable => write!(f, "auto-fixable"),
            Status::ManualOnly => write!(f, "manual-only"),
            Status::Mixed => write!(f, "mixed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub status: Status,
    pub problems: Vec<String>,
    pub auto_fixable: usize,
    pub unfixable: usize,
}

/// Classify a snapshot against the registry that produced it.
///
/// Results for ids the registry does not know are ignored.
pub fn summarize(snapshot: &EvaluationSnapshot, registry: &RuleRegistry) -> Summary {
    let mut problems = Vec::new();
    let mut auto_fixable = 0;
    let mut unfixable = 0;

    for rule in registry.rules() {
        let Some(result) = snapshot.get(rule.id()) else {
            continue;
        };
        if !result.has_problem() {
            continue;
        }

        if rule.is_fixable() {
            auto_fixable += 1;
        } else {
            unfixable += 1;
        }

        let label = match result {
            RuleResult::Problem {
                message: Some(message),
                ..
            } => message.clone(),
            _ => rule.name().to_string(),
        };
        problems.push(label);
    }

    let status = if problems.is_empty() {
        Status::Clean
    } else if auto_fixable > 0 && unfixable == 0 {
        Status::AutoFixable
    } else if auto_fixable == 0 && unfixable > 0 {
        Status::ManualOnly
    } else {
        Status::Mixed
    };

    Summary {
        status,
        problems,
        auto_fixable,
        unfixable,
    }
}
