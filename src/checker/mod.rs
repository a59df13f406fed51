pub mod dictionary;
pub mod hunspell;
pub mod merge;
pub mod suggestions;
pub mod summary;
pub mod tokenizer;

use crate::rules::{Fix, RuleRegistry, RuleResult};
use crate::Config;
use dictionary::DictionaryHandle;
use indexmap::IndexMap;
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Per-rule results of one evaluation pass, in registration order.
///
/// A snapshot is produced whole by [`Linter::evaluate`] and never updated in
/// place; a new pass replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EvaluationSnapshot {
    results: IndexMap<String, RuleResult>,
}

impl EvaluationSnapshot {
    pub fn get(&self, rule_id: &str) -> Option<&RuleResult> {
        self.results.get(rule_id)
    }

    pub fn results(&self) -> impl Iterator<Item = (&str, &RuleResult)> {
        self.results.iter().map(|(id, result)| (id.as_str(), result))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_problems(&self) -> bool {
        self.results.values().any(RuleResult::has_problem)
    }
}

impl FromIterator<(String, RuleResult)> for EvaluationSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, RuleResult)>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

/// Fixed text together with the snapshot of re-checking it.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub text: String,
    pub snapshot: EvaluationSnapshot,
    pub changed: bool,
}

pub struct Linter {
    registry: RuleRegistry,
}

impl Linter {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    /// Linter with the built-in rules configured from `config`.
    pub fn from_config(config: &Config, dictionary: DictionaryHandle) -> anyhow::Result<Self> {
        Ok(Self::new(RuleRegistry::standard(config, dictionary)?))
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Run every rule against `text`.
    ///
    /// A rule that returns an error or panics is logged and recorded as the
    /// neutral result; the remaining rules still run.
    pub fn evaluate(&self, text: &str) -> EvaluationSnapshot {
        self.registry
            .rules()
            .iter()
            .map(|rule| {
                log::debug!("Running rule: {}", rule.id());
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.check(text)));

                let result = match outcome {
                    Ok(Ok(result)) => result,
                    Ok(Err(e)) => {
                        log::warn!("Rule '{}' failed: {:#}", rule.id(), e);
                        RuleResult::neutral()
                    }
                    Err(payload) => {
                        log::warn!(
                            "Rule '{}' panicked: {}",
                            rule.id(),
                            panic_message(payload.as_ref())
                        );
                        RuleResult::neutral()
                    }
                };

                log::debug!(
                    "Rule {} found problems: {}",
                    rule.id(),
                    result.has_problem()
                );
                (rule.id().to_string(), result)
            })
            .collect()
    }

    /// Compose the fixes of every fixable rule whose result in `snapshot` is
    /// a non-empty range list, in registration order.
    ///
    /// Each fix sees the output of the previous one. Flag-shaped results are
    /// never fixed automatically.
    pub fn apply_fixes(&self, text: &str, snapshot: &EvaluationSnapshot) -> String {
        let mut current = text.to_string();

        for rule in self.registry.rules() {
            let Some(fixer) = rule.fixer() else {
                continue;
            };
            if !snapshot
                .get(rule.id())
                .is_some_and(RuleResult::is_fix_candidate)
            {
                continue;
            }

            log::debug!("Applying fix: {}", rule.id());
            match panic::catch_unwind(AssertUnwindSafe(|| fixer.fix(&current))) {
                Ok(fixed) => current = fixed,
                Err(payload) => {
                    log::warn!(
                        "Fix '{}' panicked: {}",
                        rule.id(),
                        panic_message(payload.as_ref())
                    );
                }
            }
        }

        current
    }

    /// Evaluate, fix and evaluate the fixed text again.
    pub fn fix(&self, text: &str) -> FixOutcome {
        let before = self.evaluate(text);
        let fixed = self.apply_fixes(text, &before);
        let snapshot = self.evaluate(&fixed);

        FixOutcome {
            changed: fixed != text,
            text: fixed,
            snapshot,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::paragraphs::{LowercaseStart, MissingDot};
    use crate::rules::{Fix, Rule};
    use crate::ProblemRange;
    use anyhow::Result;

    struct Failing;

    impl Rule for Failing {
        fn id(&self) -> &str {
            "failing"
        }

        fn name(&self) -> &str {
            "Always fails"
        }

        fn check(&self, _text: &str) -> Result<RuleResult> {
            anyhow::bail!("broken rule")
        }
    }

    struct Panicking;

    impl Rule for Panicking {
        fn id(&self) -> &str {
            "panicking"
        }

        fn name(&self) -> &str {
            "Always panics"
        }

        fn check(&self, _text: &str) -> Result<RuleResult> {
            panic!("rule bug")
        }
    }

    /// Reports a flag and would append "!" if it were ever applied.
    struct FlagOnly;

    impl Rule for FlagOnly {
        fn id(&self) -> &str {
            "flagOnly"
        }

        fn name(&self) -> &str {
            "Flag only"
        }

        fn check(&self, _text: &str) -> Result<RuleResult> {
            Ok(RuleResult::Problem {
                problem: true,
                message: None,
            })
        }

        fn fixer(&self) -> Option<&dyn Fix> {
            Some(self)
        }
    }

    impl Fix for FlagOnly {
        fn fix(&self, text: &str) -> String {
            format!("{}!", text)
        }
    }

    fn linter(rules: Vec<Box<dyn Rule>>) -> Linter {
        let mut registry = RuleRegistry::new();
        for rule in rules {
            registry.register(rule).unwrap();
        }
        Linter::new(registry)
    }

    #[test]
    fn test_failing_rules_are_isolated() {
        let linter = linter(vec![
            Box::new(Failing),
            Box::new(MissingDot),
            Box::new(Panicking),
            Box::new(LowercaseStart),
        ]);
        let snapshot = linter.evaluate("привет");

        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot.get("failing"), Some(&RuleResult::neutral()));
        assert_eq!(snapshot.get("panicking"), Some(&RuleResult::neutral()));
        assert_eq!(
            snapshot.get("missingDot").unwrap().problem_ranges(),
            &[ProblemRange::new(
                10,
                12,
                "Абзац заканчивается буквой - добавьте пунктуацию или эмодзи"
            )]
        );
        assert!(snapshot.get("lowercaseStart").unwrap().has_problem());
    }

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let linter = linter(vec![Box::new(LowercaseStart), Box::new(MissingDot)]);
        let snapshot = linter.evaluate("x");
        let ids: Vec<_> = snapshot.results().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["lowercaseStart", "missingDot"]);
    }

    #[test]
    fn test_apply_fixes_chains_in_order() {
        let linter = linter(vec![Box::new(MissingDot), Box::new(LowercaseStart)]);
        let text = "привет\nмир";
        let snapshot = linter.evaluate(text);

        assert_eq!(linter.apply_fixes(text, &snapshot), "Привет.\nМир.");
    }

    #[test]
    fn test_apply_fixes_skips_clean_rules() {
        let linter = linter(vec![Box::new(MissingDot), Box::new(LowercaseStart)]);
        let snapshot = linter.evaluate("Привет");

        // Only missingDot reported, so only its fix runs.
        assert!(!snapshot.get("lowercaseStart").unwrap().has_problem());
        assert_eq!(linter.apply_fixes("Привет", &snapshot), "Привет.");
    }

    #[test]
    fn test_flag_results_are_never_fixed() {
        let linter = linter(vec![Box::new(FlagOnly)]);
        let snapshot = linter.evaluate("Текст");

        assert!(snapshot.has_problems());
        assert_eq!(linter.apply_fixes("Текст", &snapshot), "Текст");
    }

    #[test]
    fn test_fix_reevaluates() {
        let linter = linter(vec![Box::new(MissingDot), Box::new(LowercaseStart)]);
        let outcome = linter.fix("привет");

        assert!(outcome.changed);
        assert_eq!(outcome.text, "Привет.");
        assert!(!outcome.snapshot.has_problems());
    }

    #[test]
    fn test_fix_on_clean_text_is_unchanged() {
        let linter = linter(vec![Box::new(MissingDot)]);
        let outcome = linter.fix("Готово.");
        assert!(!outcome.changed);
        assert_eq!(outcome.text, "Готово.");
    }
}
