use crate::checker::dictionary::{DictionaryHandle, WordSource};
use crate::checker::suggestions;
use crate::checker::tokenizer::cyrillic_words;
use crate::rules::{Rule, RuleResult};
use crate::ProblemRange;
use anyhow::Result;

pub const SPELLING: &str = "spelling";

/// Dictionary lookup for the first `word_limit` Cyrillic words.
///
/// Reports nothing while the dictionary is still loading.
pub struct Spelling {
    dictionary: DictionaryHandle,
    word_limit: usize,
    max_suggestions: usize,
}

impl Spelling {
    pub fn new(dictionary: DictionaryHandle, word_limit: usize, max_suggestions: usize) -> Self {
        Self {
            dictionary,
            word_limit,
            max_suggestions,
        }
    }

    fn message(&self, word: &str) -> String {
        let suggestions = match self.dictionary.get() {
            Some(dictionary) => suggestions::generate(word, dictionary, self.max_suggestions),
            None => Vec::new(),
        };

        if suggestions.is_empty() {
            format!("Слово «{}» не найдено в словаре", word)
        } else {
            format!(
                "Слово «{}» не найдено в словаре, возможно: {}",
                word,
                suggestions.join(", ")
            )
        }
    }
}

impl Rule for Spelling {
    fn id(&self) -> &str {
        SPELLING
    }

    fn name(&self) -> &str {
        "Орфографические ошибки"
    }

    fn check(&self, text: &str) -> Result<RuleResult> {
        if !self.dictionary.is_ready() {
            log::debug!("Dictionary not loaded yet, skipping spelling check");
            return Ok(RuleResult::neutral());
        }

        let mut problems = Vec::new();
        for word in cyrillic_words(text).into_iter().take(self.word_limit) {
            if self.dictionary.is_known_word(word.text) == Some(false) {
                problems.push(ProblemRange::new(word.start, word.end, self.message(word.text)));
            }
        }

        Ok(RuleResult::ranges(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::Dictionary;

    fn handle(words: &[&str]) -> DictionaryHandle {
        DictionaryHandle::ready(Dictionary::from_words(words).unwrap())
    }

    #[test]
    fn test_not_ready_reports_nothing() {
        let rule = Spelling::new(DictionaryHandle::new(), 100, 3);
        assert_eq!(rule.check("Ошибкаа").unwrap(), RuleResult::neutral());
    }

    #[test]
    fn test_unknown_words_are_reported() {
        let rule = Spelling::new(handle(&["привет", "мир", "молоко"]), 100, 3);
        let text = "Привет, малоко и мир!";
        let result = rule.check(text).unwrap();
        let ranges = result.problem_ranges();

        // Single letters such as "и" are never checked.
        assert_eq!(ranges.len(), 1);
        assert_eq!(&text[ranges[0].start..ranges[0].end], "малоко");
        assert_eq!(
            ranges[0].message,
            "Слово «малоко» не найдено в словаре, возможно: молоко"
        );
    }

    #[test]
    fn test_word_limit() {
        let rule = Spelling::new(handle(&["да"]), 2, 3);
        let result = rule.check("да да нет нет").unwrap();
        assert!(result.problem_ranges().is_empty());

        let rule = Spelling::new(handle(&["да"]), 3, 3);
        assert_eq!(rule.check("да да нет нет").unwrap().problem_ranges().len(), 1);
    }
}
