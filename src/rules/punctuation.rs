use crate::checker::tokenizer::is_letter;
use crate::rules::{Fix, Rule, RuleResult};
use crate::ProblemRange;
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;

pub const PUNCTUATION_SPACING: &str = "punctuationSpacing";
pub const EXTRA_SPACES: &str = "extraSpaces";
pub const QUOTE_MARKS: &str = "quoteMarks";

lazy_static! {
    static ref BLANK_RUN: Regex = Regex::new(r"[ \t]+").unwrap();
}

const SENTENCE_END: [char; 4] = ['.', '!', '?', '…'];
const CLAUSE_MARKS: [char; 3] = [',', ';', ':'];

/// Punctuation marks glued to the following word, as `(offset, mark)`.
fn glued_marks(text: &str) -> Vec<(usize, char)> {
    let mut found = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let Some(&(_, next)) = chars.peek() else {
            break;
        };
        let glued = (CLAUSE_MARKS.contains(&c) && is_letter(next))
            || (SENTENCE_END.contains(&c) && is_letter(next) && next.is_uppercase());
        if glued {
            found.push((idx, c));
        }
    }

    found
}

/// A punctuation mark must be followed by a space before the next word.
pub struct PunctuationSpacing;

impl Rule for PunctuationSpacing {
    fn id(&self) -> &str {
        PUNCTUATION_SPACING
    }

    fn name(&self) -> &str {
        "Нет пробела после знаков препинания"
    }

    fn check(&self, text: &str) -> Result<RuleResult> {
        let problems = glued_marks(text)
            .into_iter()
            .map(|(idx, mark)| {
                ProblemRange::new(
                    idx,
                    idx + mark.len_utf8(),
                    "Добавьте пробел после знака препинания",
                )
            })
            .collect();

        Ok(RuleResult::ranges(problems))
    }

    fn fixer(&self) -> Option<&dyn Fix> {
        Some(self)
    }
}

impl Fix for PunctuationSpacing {
    fn fix(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (idx, mark) in glued_marks(text).into_iter().rev() {
            out.insert(idx + mark.len_utf8(), ' ');
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpaceIssue {
    Trailing,
    BeforePunctuation,
    Repeated,
}

impl SpaceIssue {
    fn message(self) -> &'static str {
        match self {
            SpaceIssue::Trailing => "Лишние пробелы в конце абзаца",
            SpaceIssue::BeforePunctuation => "Лишний пробел перед знаком препинания",
            SpaceIssue::Repeated => "Несколько пробелов подряд",
        }
    }

    fn replacement(self) -> &'static str {
        match self {
            SpaceIssue::Repeated => " ",
            _ => "",
        }
    }
}

/// Offending blank runs as `(start, end, issue)` in ascending order.
fn space_issues(text: &str) -> Vec<(usize, usize, SpaceIssue)> {
    BLANK_RUN
        .find_iter(text)
        .filter_map(|m| {
            // Indentation at the start of a paragraph is left alone.
            match text[..m.start()].chars().next_back() {
                None | Some('\n') => return None,
                _ => {}
            }

            let mut after = text[m.end()..].chars();
            let issue = match after.next() {
                None | Some('\n') | Some('\r') => SpaceIssue::Trailing,
                Some(c)
                    if (SENTENCE_END.contains(&c) || CLAUSE_MARKS.contains(&c))
                        && after.next().map_or(true, char::is_whitespace) =>
                {
                    SpaceIssue::BeforePunctuation
                }
                _ if m.as_str().chars().count() > 1 => SpaceIssue::Repeated,
                _ => return None,
            };

            Some((m.start(), m.end(), issue))
        })
        .collect()
}

/// Repeated spaces, spaces before punctuation and trailing spaces.
pub struct ExtraSpaces;

impl Rule for ExtraSpaces {
    fn id(&self) -> &str {
        EXTRA_SPACES
    }

    fn name(&self) -> &str {
        "Лишние пробелы"
    }

    fn check(&self, text: &str) -> Result<RuleResult> {
        let problems = space_issues(text)
            .into_iter()
            .map(|(start, end, issue)| ProblemRange::new(start, end, issue.message()))
            .collect();

        Ok(RuleResult::ranges(problems))
    }

    fn fixer(&self) -> Option<&dyn Fix> {
        Some(self)
    }
}

impl Fix for ExtraSpaces {
    fn fix(&self, text: &str) -> String {
        let mut out = text.to_string();
        // Back to front so earlier offsets stay valid.
        for (start, end, issue) in space_issues(text).into_iter().rev() {
            out.replace_range(start..end, issue.replacement());
        }
        out
    }
}

/// Straight double quotes should be typographic «ёлочки».
pub struct QuoteMarks;

impl QuoteMarks {
    fn opens(prev: Option<char>) -> bool {
        match prev {
            None => true,
            Some(c) => c.is_whitespace() || matches!(c, '(' | '[' | '{' | '«' | '—' | '-'),
        }
    }
}

impl Rule for QuoteMarks {
    fn id(&self) -> &str {
        QUOTE_MARKS
    }

    fn name(&self) -> &str {
        "Прямые кавычки вместо «ёлочек»"
    }

    fn check(&self, text: &str) -> Result<RuleResult> {
        let problems = text
            .match_indices('"')
            .map(|(idx, quote)| {
                ProblemRange::new(idx, idx + quote.len(), "Используйте кавычки «ёлочки»")
            })
            .collect();

        Ok(RuleResult::ranges(problems))
    }

    fn fixer(&self) -> Option<&dyn Fix> {
        Some(self)
    }
}

impl Fix for QuoteMarks {
    fn fix(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut prev = None;

        for c in text.chars() {
            if c == '"' {
                out.push(if Self::opens(prev) { '«' } else { '»' });
            } else {
                out.push(c);
            }
            prev = Some(c);
        }

        out
    }
}
