use crate::checker::tokenizer::{
    emoji_graphemes, is_emoji, is_letter, paragraphs, rewrite_paragraphs, Paragraph,
};
use crate::rules::{Fix, Rule, RuleResult};
use crate::ProblemRange;
use anyhow::Result;
use unicode_segmentation::UnicodeSegmentation;

pub const NO_EMOJI: &str = "noEmoji";
pub const EMOJI_RATIO: &str = "emojiRatio";
pub const EMOJI_AT_START: &str = "emojiAtStart";
pub const EMOJI_SPACING: &str = "emojiSpacing";

/// The text should contain at least one emoji.
pub struct NoEmoji;

impl Rule for NoEmoji {
    fn id(&self) -> &str {
        NO_EMOJI
    }

    fn name(&self) -> &str {
        "Отсутствуют смайлики"
    }

    fn check(&self, text: &str) -> Result<RuleResult> {
        Ok(RuleResult::flag(emoji_graphemes(text).is_empty()))
    }
}

/// At least one emoji per `chars_per_emoji` visible characters.
pub struct EmojiRatio {
    chars_per_emoji: usize,
}

impl EmojiRatio {
    pub fn new(chars_per_emoji: usize) -> Self {
        Self {
            chars_per_emoji: chars_per_emoji.max(1),
        }
    }
}

impl Rule for EmojiRatio {
    fn id(&self) -> &str {
        EMOJI_RATIO
    }

    fn name(&self) -> &str {
        "Мало смайликов в тексте"
    }

    fn check(&self, text: &str) -> Result<RuleResult> {
        let mut emojis = 0;
        let mut visible = 0;

        for grapheme in text.graphemes(true) {
            if is_emoji(grapheme) {
                emojis += 1;
            } else {
                visible += grapheme.chars().filter(|c| !c.is_whitespace()).count();
            }
        }

        let required = visible.div_ceil(self.chars_per_emoji);
        if emojis < required {
            return Ok(RuleResult::problem(format!(
                "Добавьте ещё {} смайликов (сейчас {}, нужно {})",
                required - emojis,
                emojis,
                required
            )));
        }

        Ok(RuleResult::no_problem())
    }
}

/// Leading emoji of a paragraph as `(offset within paragraph, cluster)`.
fn leading_emoji<'a>(paragraph: &Paragraph<'a>) -> Option<(usize, &'a str)> {
    let text = paragraph.text;
    let offset = text.len() - text.trim_start().len();
    let first = text[offset..].graphemes(true).next()?;
    is_emoji(first).then_some((offset, first))
}

/// Emoji-led paragraphs that are not part of a run of two or more
/// consecutive emoji-led paragraphs. A run is treated as a list.
fn isolated_leading_emoji<'a>(paras: &[Paragraph<'a>]) -> Vec<Option<(usize, &'a str)>> {
    let leading: Vec<_> = paras.iter().map(leading_emoji).collect();

    leading
        .iter()
        .enumerate()
        .map(|(i, lead)| {
            let prev_led = i > 0 && leading[i - 1].is_some();
            let next_led = leading.get(i + 1).is_some_and(Option::is_some);
            if prev_led || next_led {
                None
            } else {
                *lead
            }
        })
        .collect()
}

/// A paragraph should not open with an emoji unless it is a list item.
pub struct EmojiAtStart;

impl Rule for EmojiAtStart {
    fn id(&self) -> &str {
        EMOJI_AT_START
    }

    fn name(&self) -> &str {
        "Смайлики в начале абзаца"
    }

    fn check(&self, text: &str) -> Result<RuleResult> {
        let paras = paragraphs(text);
        let problems = paras
            .iter()
            .zip(isolated_leading_emoji(&paras))
            .filter_map(|(p, lead)| {
                let (offset, emoji) = lead?;
                let start = p.start + offset;
                Some(ProblemRange::new(
                    start,
                    start + emoji.len(),
                    "Уберите смайлик из начала абзаца",
                ))
            })
            .collect();

        Ok(RuleResult::ranges(problems))
    }

    fn fixer(&self) -> Option<&dyn Fix> {
        Some(self)
    }
}

impl Fix for EmojiAtStart {
    fn fix(&self, text: &str) -> String {
        let leads = isolated_leading_emoji(&paragraphs(text));
        rewrite_paragraphs(text, |i, paragraph| match leads.get(i) {
            Some(Some(_)) => strip_leading_emoji(paragraph).to_string(),
            _ => paragraph.to_string(),
        })
    }
}

/// `text` without leading whitespace and emoji clusters, trimmed.
fn strip_leading_emoji(text: &str) -> &str {
    let mut rest = text.trim_start();
    while let Some(first) = rest.graphemes(true).next() {
        if !is_emoji(first) {
            break;
        }
        rest = rest[first.len()..].trim_start();
    }
    rest.trim_end()
}

fn glued(c: Option<char>) -> bool {
    c.is_some_and(|c| is_letter(c) || c.is_ascii_digit())
}

/// Emoji must be separated from adjacent words by a space.
pub struct EmojiSpacing;

impl EmojiSpacing {
    fn neighbours(text: &str, start: usize, end: usize) -> (bool, bool) {
        (
            glued(text[..start].chars().next_back()),
            glued(text[end..].chars().next()),
        )
    }
}

impl Rule for EmojiSpacing {
    fn id(&self) -> &str {
        EMOJI_SPACING
    }

    fn name(&self) -> &str {
        "Смайлики без пробелов"
    }

    fn check(&self, text: &str) -> Result<RuleResult> {
        let problems = emoji_graphemes(text)
            .into_iter()
            .filter_map(|(start, emoji)| {
                let end = start + emoji.len();
                let message = match Self::neighbours(text, start, end) {
                    (true, true) => "Отделите смайлик пробелами с обеих сторон",
                    (true, false) => "Добавьте пробел перед смайликом",
                    (false, true) => "Добавьте пробел после смайлика",
                    (false, false) => return None,
                };
                Some(ProblemRange::new(start, end, message))
            })
            .collect();

        Ok(RuleResult::ranges(problems))
    }

    fn fixer(&self) -> Option<&dyn Fix> {
        Some(self)
    }
}

impl Fix for EmojiSpacing {
    fn fix(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 8);

        for (start, grapheme) in text.grapheme_indices(true) {
            if !is_emoji(grapheme) {
                out.push_str(grapheme);
                continue;
            }

            let (before, after) = Self::neighbours(text, start, start + grapheme.len());
            if before {
                out.push(' ');
            }
            out.push_str(grapheme);
            if after {
                out.push(' ');
            }
        }

        out
    }
}
