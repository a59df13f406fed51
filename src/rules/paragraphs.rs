use crate::checker::tokenizer::{is_letter, paragraphs, rewrite_paragraphs};
use crate::rules::{Fix, Rule, RuleResult};
use crate::ProblemRange;
use anyhow::Result;

pub const MISSING_DOT: &str = "missingDot";
pub const LOWERCASE_START: &str = "lowercaseStart";

fn ends_with_letter_or_digit(paragraph: &str) -> Option<char> {
    paragraph
        .chars()
        .next_back()
        .filter(|&c| is_letter(c) || c.is_ascii_digit())
}

/// A paragraph must end with punctuation or an emoji, not a letter or digit.
pub struct MissingDot;

impl Rule for MissingDot {
    fn id(&self) -> &str {
        MISSING_DOT
    }

    fn name(&self) -> &str {
        "Отсутствуют точки в конце абзацев"
    }

    fn check(&self, text: &str) -> Result<RuleResult> {
        let problems = paragraphs(text)
            .into_iter()
            .filter(|p| !p.is_blank())
            .filter_map(|p| {
                let last = ends_with_letter_or_digit(p.text)?;
                Some(ProblemRange::new(
                    p.end() - last.len_utf8(),
                    p.end(),
                    "Абзац заканчивается буквой - добавьте пунктуацию или эмодзи",
                ))
            })
            .collect();

        Ok(RuleResult::ranges(problems))
    }

    fn fixer(&self) -> Option<&dyn Fix> {
        Some(self)
    }
}

impl Fix for MissingDot {
    fn fix(&self, text: &str) -> String {
        rewrite_paragraphs(text, |_, paragraph| {
            if paragraph.trim().is_empty() || ends_with_letter_or_digit(paragraph).is_none() {
                paragraph.to_string()
            } else {
                format!("{}.", paragraph)
            }
        })
    }
}

/// The first letter of a paragraph must be uppercase.
pub struct LowercaseStart;

fn first_letter(paragraph: &str) -> Option<(usize, char)> {
    paragraph.char_indices().find(|&(_, c)| is_letter(c))
}

impl Rule for LowercaseStart {
    fn id(&self) -> &str {
        LOWERCASE_START
    }

    fn name(&self) -> &str {
        "Предложения начинаются с маленькой буквы"
    }

    fn check(&self, text: &str) -> Result<RuleResult> {
        let problems = paragraphs(text)
            .into_iter()
            .filter(|p| !p.is_blank())
            .filter_map(|p| {
                let (idx, letter) = first_letter(p.text)?;
                letter.is_lowercase().then(|| {
                    ProblemRange::new(
                        p.start + idx,
                        p.start + idx + letter.len_utf8(),
                        "Первая буква абзаца должна быть заглавной",
                    )
                })
            })
            .collect();

        Ok(RuleResult::ranges(problems))
    }

    fn fixer(&self) -> Option<&dyn Fix> {
        Some(self)
    }
}

impl Fix for LowercaseStart {
    fn fix(&self, text: &str) -> String {
        rewrite_paragraphs(text, |_, paragraph| match first_letter(paragraph) {
            Some((idx, letter)) if letter.is_lowercase() => {
                let rest = &paragraph[idx + letter.len_utf8()..];
                let upper: String = letter.to_uppercase().collect();
                format!("{}{}{}", &paragraph[..idx], upper, rest)
            }
            _ => paragraph.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(rule: &dyn Rule, text: &str) -> Vec<(usize, usize)> {
        rule.check(text)
            .unwrap()
            .problem_ranges()
            .iter()
            .map(|r| (r.start, r.end))
            .collect()
    }

    #[test]
    fn test_missing_dot_fix() {
        assert_eq!(MissingDot.fix("Привет"), "Привет.");
        assert!(ranges(&MissingDot, &MissingDot.fix("Привет")).is_empty());
    }

    #[test]
    fn test_missing_dot_ranges() {
        let text = "Привет\n\n   \nГотово!\nЕщё 42\nКонец 😀";
        let found = ranges(&MissingDot, text);

        assert_eq!(found.len(), 2);
        assert_eq!(&text[found[0].0..found[0].1], "т");
        assert_eq!(&text[found[1].0..found[1].1], "2");
    }

    #[test]
    fn test_missing_dot_keeps_blank_lines() {
        assert_eq!(MissingDot.fix("Один\n\nДва"), "Один.\n\nДва.");
    }

    #[test]
    fn test_crlf_paragraphs() {
        let text = "Привет\r\nмир\r\n";
        let found = ranges(&MissingDot, text);

        assert_eq!(found.len(), 2);
        assert_eq!(&text[found[0].0..found[0].1], "т");
        assert_eq!(&text[found[1].0..found[1].1], "р");
        assert_eq!(MissingDot.fix(text), "Привет.\r\nмир.\r\n");
        assert_eq!(LowercaseStart.fix(text), "Привет\r\nМир\r\n");
    }

    #[test]
    fn test_lowercase_start_fix() {
        assert_eq!(LowercaseStart.fix("привет"), "Привет");
        assert_eq!(LowercaseStart.fix("«ёлка» стоит"), "«Ёлка» стоит");
        assert_eq!(LowercaseStart.fix("😀 hello\n\nуже"), "😀 Hello\n\nУже");
    }

    #[test]
    fn test_lowercase_start_ranges() {
        let text = "Хорошо.\n— плохо.\n123 abc";
        let found = ranges(&LowercaseStart, text);

        assert_eq!(found.len(), 2);
        assert_eq!(&text[found[0].0..found[0].1], "п");
        assert_eq!(&text[found[1].0..found[1].1], "a");
        assert!(ranges(&LowercaseStart, &LowercaseStart.fix(text)).is_empty());
    }
}
