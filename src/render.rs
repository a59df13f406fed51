use crate::checker::merge::descending;
use crate::MergedRange;

/// Presentation capability: render text with disjoint highlight spans.
///
/// `spans` carry byte offsets into the unescaped `text`.
pub trait Highlighter {
    fn render(&self, text: &str, spans: &[MergedRange]) -> String;
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap every span of `text` using `wrap`, with `plain` applied to the text
/// between spans.
///
/// Spans are processed from the highest start offset down, so each slice is
/// cut from the original text before anything to its left is touched and
/// the offsets of the remaining spans stay valid. Overlapping spans are a
/// caller bug; they are skipped.
pub fn splice_markers<P, W>(text: &str, spans: &[MergedRange], plain: P, wrap: W) -> String
where
    P: Fn(&str) -> String,
    W: Fn(&str, &MergedRange) -> String,
{
    let ordered = descending(spans.to_vec());

    let mut pieces = Vec::with_capacity(ordered.len() * 2 + 1);
    let mut tail = text.len();

    for span in &ordered {
        if span.end > tail
            || span.start >= span.end
            || !text.is_char_boundary(span.start)
            || !text.is_char_boundary(span.end)
        {
            log::warn!("Skipping invalid highlight span {}..{}", span.start, span.end);
            continue;
        }
        pieces.push(plain(&text[span.end..tail]));
        pieces.push(wrap(&text[span.start..span.end], span));
        tail = span.start;
    }
    pieces.push(plain(&text[..tail]));

    pieces.reverse();
    pieces.concat()
}

/// HTML fragment renderer using `<span class="highlight-error">`.
#[derive(Debug, Clone)]
pub struct HtmlHighlighter {
    pub class: String,
}

impl Default for HtmlHighlighter {
    fn default() -> Self {
        Self {
            class: "highlight-error".to_string(),
        }
    }
}

impl Highlighter for HtmlHighlighter {
    fn render(&self, text: &str, spans: &[MergedRange]) -> String {
        splice_markers(text, spans, escape_html, |slice, span| {
            format!(
                "<span class=\"{}\" title=\"{}\">{}</span>",
                escape_html(&self.class),
                escape_html(&span.message),
                escape_html(slice)
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, message: &str) -> MergedRange {
        MergedRange {
            start,
            end,
            message: message.to_string(),
        }
    }

    fn brackets(text: &str, spans: &[MergedRange]) -> String {
        splice_markers(text, spans, str::to_string, |slice, _| format!("[{}]", slice))
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_adjacent_spans_keep_offsets() {
        let spans = vec![span(0, 1, "a"), span(1, 2, "b")];
        assert_eq!(brackets("ab", &spans), "[a][b]");

        let html = HtmlHighlighter::default().render("ab", &spans);
        assert_eq!(
            html,
            "<span class=\"highlight-error\" title=\"a\">a</span>\
             <span class=\"highlight-error\" title=\"b\">b</span>"
        );
    }

    #[test]
    fn test_span_order_does_not_matter() {
        let text = "один два три";
        let spans = vec![span(0, 8, "x"), span(16, 22, "y")];
        let reversed: Vec<_> = spans.iter().rev().cloned().collect();

        assert_eq!(brackets(text, &spans), "[один] два [три]");
        assert_eq!(brackets(text, &reversed), brackets(text, &spans));
    }

    #[test]
    fn test_offsets_refer_to_unescaped_text() {
        let text = "a<b & c";
        let html = HtmlHighlighter::default().render(text, &[span(4, 5, "amp")]);
        assert_eq!(
            html,
            "a&lt;b <span class=\"highlight-error\" title=\"amp\">&amp;</span> c"
        );
    }

    #[test]
    fn test_no_spans_is_plain_escape() {
        assert_eq!(HtmlHighlighter::default().render("<x>", &[]), "&lt;x&gt;");
    }

    #[test]
    fn test_invalid_span_is_skipped() {
        let spans = vec![span(0, 3, "x"), span(2, 4, "overlap")];
        assert_eq!(brackets("abcd", &spans), "ab[cd]");
    }
}
