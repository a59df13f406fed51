// Segmentation helpers shared by the rules: paragraphs, emoji and words.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    // Pictographs, flags (regional indicator pairs) and keycaps.
    static ref EMOJI_START: Regex =
        Regex::new(r"^(?:\p{Extended_Pictographic}|[\x{1F1E6}-\x{1F1FF}]|[0-9#*]\x{FE0F}?\x{20E3})")
            .unwrap();
}

/// A `\n`-separated paragraph together with its byte offset in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paragraph<'a> {
    pub start: usize,
    pub text: &'a str,
}

impl Paragraph<'_> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split text on `\n`, keeping empty paragraphs so offsets stay exact.
///
/// A `\r` before the `\n` is not part of the paragraph text.
pub fn paragraphs(text: &str) -> Vec<Paragraph<'_>> {
    let mut result = Vec::new();
    let mut start = 0;

    for line in text.split('\n') {
        let body = line.strip_suffix('\r').unwrap_or(line);
        result.push(Paragraph { start, text: body });
        start += line.len() + 1;
    }

    result
}

/// Rebuild `text` with every paragraph replaced by `f(index, paragraph)`.
///
/// Indices match [`paragraphs`], and `\n` / `\r\n` line endings are kept.
pub fn rewrite_paragraphs<F>(text: &str, mut f: F) -> String
where
    F: FnMut(usize, &str) -> String,
{
    text.split('\n')
        .enumerate()
        .map(|(i, line)| match line.strip_suffix('\r') {
            Some(body) => format!("{}\r", f(i, body)),
            None => f(i, line),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn is_emoji(grapheme: &str) -> bool {
    EMOJI_START.is_match(grapheme)
}

/// Emoji grapheme clusters as `(byte_offset, cluster)`.
pub fn emoji_graphemes(text: &str) -> Vec<(usize, &str)> {
    text.grapheme_indices(true)
        .filter(|(_, g)| is_emoji(g))
        .collect()
}

/// Letters the rules treat as "a letter": ASCII Latin and Russian Cyrillic.
pub fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || is_cyrillic(ch)
}

pub fn is_cyrillic(ch: char) -> bool {
    matches!(ch, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

/// A word token with byte offsets into the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Cyrillic words, split on Unicode word boundaries.
///
/// Tokens containing anything other than Cyrillic letters (digits, Latin,
/// mixed scripts) are skipped, as are single letters.
pub fn cyrillic_words(text: &str) -> Vec<Word<'_>> {
    text.split_word_bound_indices()
        .filter(|(_, token)| token.chars().count() > 1 && token.chars().all(is_cyrillic))
        .map(|(start, token)| Word {
            text: token,
            start,
            end: start + token.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_offsets() {
        let text = "один\n\n  \nдва";
        let paras = paragraphs(text);

        assert_eq!(paras.len(), 4);
        assert_eq!(paras[0].start, 0);
        assert_eq!(paras[1].text, "");
        assert!(paras[2].is_blank());
        assert_eq!(&text[paras[3].start..paras[3].end()], "два");
    }

    #[test]
    fn test_crlf_paragraphs() {
        let text = "Один\r\n\r\nдва\r\n";
        let paras = paragraphs(text);

        assert_eq!(paras[0].text, "Один");
        assert!(paras[1].is_blank());
        assert_eq!(paras[2].text, "два");
        assert_eq!(&text[paras[2].start..paras[2].end()], "два");

        let upper = rewrite_paragraphs(text, |_, p| p.to_uppercase());
        assert_eq!(upper, "ОДИН\r\n\r\nДВА\r\n");
    }

    #[test]
    fn test_flags_and_keycaps_are_emoji() {
        assert!(is_emoji("🇷🇺"));
        assert!(is_emoji("1️⃣"));
        assert!(is_emoji("#\u{20E3}"));
        assert!(!is_emoji("1"));

        let found = emoji_graphemes("Привет 🇷🇺 и 1️⃣.");
        let clusters: Vec<_> = found.iter().map(|(_, g)| *g).collect();
        assert_eq!(clusters, vec!["🇷🇺", "1️⃣"]);
    }

    #[test]
    fn test_emoji_detection() {
        assert!(is_emoji("😀"));
        assert!(is_emoji("👍🏽"));
        assert!(!is_emoji("1"));
        assert!(!is_emoji("#"));
        assert!(!is_emoji("а"));

        let found = emoji_graphemes("а😀б👍🏽");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].1, "👍🏽");
    }

    #[test]
    fn test_cyrillic_words() {
        let text = "Привет, world! Как дела-то? я";
        let words: Vec<_> = cyrillic_words(text).into_iter().map(|w| w.text).collect();
        assert_eq!(words, vec!["Привет", "Как", "дела", "то"]);

        let first = &cyrillic_words(text)[0];
        assert_eq!(&text[first.start..first.end], "Привет");
    }
}
