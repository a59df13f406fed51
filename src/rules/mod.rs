pub mod emoji;
pub mod paragraphs;
pub mod punctuation;
pub mod spelling;

use crate::checker::dictionary::DictionaryHandle;
use crate::{Config, ProblemRange};
use anyhow::Result;
use serde::Serialize;
use thiserror::Error;

/// A named check, evaluated against the whole text.
///
/// `check` must be deterministic and side-effect free.
pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn check(&self, text: &str) -> Result<RuleResult>;

    /// The rule's automatic fix, if it has one.
    fn fixer(&self) -> Option<&dyn Fix> {
        None
    }
}

impl<'a> dyn Rule + 'a {
    pub fn is_fixable(&self) -> bool {
        self.fixer().is_some()
    }
}

/// A plain text-to-text transform.
///
/// A fix never sees the offsets computed by `check`, because earlier fixes
/// in the chain may already have moved them.
pub trait Fix: Send + Sync {
    fn fix(&self, text: &str) -> String;
}

/// The three result shapes a rule can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RuleResult {
    /// Located problems, possibly none.
    Ranges { ranges: Vec<ProblemRange> },
    /// A bare "problem present" flag without location.
    Flag { problem: bool },
    /// A flag with an optional message of its own.
    Problem {
        problem: bool,
        message: Option<String>,
    },
}

impl RuleResult {
    pub fn ranges(ranges: Vec<ProblemRange>) -> Self {
        RuleResult::Ranges { ranges }
    }

    pub fn flag(problem: bool) -> Self {
        RuleResult::Flag { problem }
    }

    pub fn problem(message: impl Into<String>) -> Self {
        RuleResult::Problem {
            problem: true,
            message: Some(message.into()),
        }
    }

    pub fn no_problem() -> Self {
        RuleResult::Problem {
            problem: false,
            message: None,
        }
    }

    /// The result recorded for a rule that failed to run.
    pub fn neutral() -> Self {
        RuleResult::Ranges { ranges: Vec::new() }
    }

    pub fn has_problem(&self) -> bool {
        match self {
            RuleResult::Ranges { ranges } => !ranges.is_empty(),
            RuleResult::Flag { problem } => *problem,
            RuleResult::Problem { problem, .. } => *problem,
        }
    }

    /// Located problems; empty for flag-shaped results.
    pub fn problem_ranges(&self) -> &[ProblemRange] {
        match self {
            RuleResult::Ranges { ranges } => ranges,
            _ => &[],
        }
    }

    /// Only a populated range list is eligible for automatic fixing.
    pub fn is_fix_candidate(&self) -> bool {
        matches!(self, RuleResult::Ranges { ranges } if !ranges.is_empty())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("rule '{0}' is already registered")]
    DuplicateRule(String),
    #[error("unknown rule '{0}'")]
    UnknownRule(String),
}

/// Built-in rule ids in evaluation and fix order.
pub const BUILTIN_RULES: [&str; 10] = [
    paragraphs::MISSING_DOT,
    paragraphs::LOWERCASE_START,
    emoji::NO_EMOJI,
    emoji::EMOJI_RATIO,
    emoji::EMOJI_AT_START,
    emoji::EMOJI_SPACING,
    punctuation::PUNCTUATION_SPACING,
    spelling::SPELLING,
    punctuation::EXTRA_SPACES,
    punctuation::QUOTE_MARKS,
];

pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Build the built-in rule set, leaving out ids listed in
    /// `config.disabled_rules`.
    pub fn standard(config: &Config, dictionary: DictionaryHandle) -> Result<Self, RegistryError> {
        for id in &config.disabled_rules {
            if !BUILTIN_RULES.contains(&id.as_str()) {
                return Err(RegistryError::UnknownRule(id.clone()));
            }
        }

        let candidates: Vec<Box<dyn Rule>> = vec![
            Box::new(paragraphs::MissingDot),
            Box::new(paragraphs::LowercaseStart),
            Box::new(emoji::NoEmoji),
            Box::new(emoji::EmojiRatio::new(config.chars_per_emoji)),
            Box::new(emoji::EmojiAtStart),
            Box::new(emoji::EmojiSpacing),
            Box::new(punctuation::PunctuationSpacing),
            Box::new(spelling::Spelling::new(
                dictionary,
                config.spelling_word_limit,
                config.max_suggestions,
            )),
            Box::new(punctuation::ExtraSpaces),
            Box::new(punctuation::QuoteMarks),
        ];

        let mut registry = Self::new();
        for rule in candidates {
            if config.disabled_rules.iter().any(|id| id == rule.id()) {
                log::debug!("Rule {} disabled by configuration", rule.id());
                continue;
            }
            registry.register(rule)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), RegistryError> {
        if self.get(rule.id()).is_some() {
            return Err(RegistryError::DuplicateRule(rule.id().to_string()));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.rules.iter().find(|r| r.id() == id).map(|r| r.as_ref())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Rule for Named {
        fn id(&self) -> &str {
            self.0
        }

        fn name(&self) -> &str {
            self.0
        }

        fn check(&self, _text: &str) -> Result<RuleResult> {
            Ok(RuleResult::neutral())
        }
    }

    #[test]
    fn test_standard_registry_order() {
        let registry = RuleRegistry::standard(&Config::default(), DictionaryHandle::new()).unwrap();
        assert_eq!(registry.ids(), BUILTIN_RULES.to_vec());
    }

    #[test]
    fn test_disabled_rules_are_skipped() {
        let config = Config {
            disabled_rules: vec!["spelling".to_string(), "noEmoji".to_string()],
            ..Default::default()
        };
        let registry = RuleRegistry::standard(&config, DictionaryHandle::new()).unwrap();
        assert_eq!(registry.len(), 8);
        assert!(registry.get("spelling").is_none());
        assert!(registry.get("missingDot").is_some());
    }

    #[test]
    fn test_unknown_disabled_rule_is_rejected() {
        let config = Config {
            disabled_rules: vec!["noSuchRule".to_string()],
            ..Default::default()
        };
        let err = RuleRegistry::standard(&config, DictionaryHandle::new())
            .err()
            .unwrap();
        assert_eq!(err, RegistryError::UnknownRule("noSuchRule".to_string()));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(Named("a"))).unwrap();
        let err = registry.register(Box::new(Named("a"))).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateRule("a".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_fixability_follows_fixer() {
        let registry = RuleRegistry::standard(&Config::default(), DictionaryHandle::new()).unwrap();
        let fixable: Vec<_> = registry
            .rules()
            .iter()
            .filter(|r| r.is_fixable())
            .map(|r| r.id())
            .collect();

        assert_eq!(
            fixable,
            vec![
                "missingDot",
                "lowercaseStart",
                "emojiAtStart",
                "emojiSpacing",
                "punctuationSpacing",
                "extraSpaces",
                "quoteMarks",
            ]
        );
        assert!(!registry.get("spelling").unwrap().is_fixable());
        assert!(!(&Named("a") as &dyn Rule).is_fixable());
    }

    #[test]
    fn test_result_shapes() {
        assert!(!RuleResult::neutral().has_problem());
        assert!(RuleResult::flag(true).has_problem());
        assert!(!RuleResult::flag(true).is_fix_candidate());
        assert!(RuleResult::problem("x").has_problem());
        assert!(!RuleResult::no_problem().has_problem());

        let ranges = RuleResult::ranges(vec![ProblemRange::new(0, 1, "m")]);
        assert!(ranges.has_problem());
        assert!(ranges.is_fix_candidate());
        assert_eq!(ranges.problem_ranges().len(), 1);
    }

    #[test]
    fn test_fixes_clear_their_own_problems() {
        let registry = RuleRegistry::standard(&Config::default(), DictionaryHandle::new()).unwrap();
        let samples = [
            ("missingDot", "привет\n\nмир 42"),
            ("lowercaseStart", "привет\n— мир"),
            ("emojiAtStart", "👋🏽 Привет.\n\nМир."),
            ("emojiSpacing", "Привет😀мир"),
            ("punctuationSpacing", "Привет,мир.Пока!Да"),
            ("extraSpaces", "Привет  мир  ,  да  "),
            ("quoteMarks", "Он сказал \"привет\""),
        ];

        for (id, text) in samples {
            let rule = registry.get(id).unwrap();
            assert!(rule.check(text).unwrap().has_problem(), "{} sample is clean", id);

            let fixed = rule.fixer().unwrap().fix(text);
            let after = rule.check(&fixed).unwrap();
            assert!(!after.has_problem(), "{} left problems in {:?}", id, fixed);
        }
    }
}
