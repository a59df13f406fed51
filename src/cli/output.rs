use crate::checker::summary::{Status, Summary};
use crate::checker::EvaluationSnapshot;
use crate::render::{splice_markers, Highlighter, HtmlHighlighter};
use crate::rules::RuleRegistry;
use crate::MergedRange;
use colored::*;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

/// Everything printed for one checked input.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: String,
    pub text: String,
    pub snapshot: EvaluationSnapshot,
    pub summary: Summary,
    pub spans: Vec<MergedRange>,
    pub fixed: bool,
}

#[derive(Debug, Serialize)]
struct JsonSpan<'a> {
    line: usize,
    column: usize,
    start: usize,
    end: usize,
    text: &'a str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    status: Status,
    problems: &'a [String],
    auto_fixable: usize,
    unfixable: usize,
    fixed: bool,
    spans: Vec<JsonSpan<'a>>,
    results: &'a EvaluationSnapshot,
}

/// Terminal renderer: highlighted slices in red, or `[[...]]` without colour.
pub struct TerminalHighlighter {
    pub colored: bool,
}

impl Highlighter for TerminalHighlighter {
    fn render(&self, text: &str, spans: &[MergedRange]) -> String {
        splice_markers(text, spans, str::to_string, |slice, _| {
            if self.colored {
                slice.red().bold().underline().to_string()
            } else {
                format!("[[{}]]", slice)
            }
        })
    }
}

/// 1-based line and column (in chars) of a byte offset.
pub fn offset_to_line_col(input: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;

    for (i, ch) in input.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

pub fn render_report(report: &FileReport, colored_output: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text_report(report, colored_output),
        OutputFormat::Json => render_json_report(report),
        OutputFormat::Html => render_html_report(report),
    }
}

pub fn print_report(report: &FileReport, colored_output: bool, format: OutputFormat) {
    println!("{}", render_report(report, colored_output, format));
}

fn render_text_report(report: &FileReport, colored_output: bool) -> String {
    let mut out = Vec::new();
    let summary = &report.summary;

    if colored_output {
        out.push(format!("{}", report.source.bold().underline()));
    } else {
        out.push(report.source.clone());
    }

    let headline = summary.status.headline();
    out.push(if colored_output {
        match summary.status {
            Status::Clean => format!("{} {}", "✓".green().bold(), headline.green().bold()),
            Status::AutoFixable | Status::ManualOnly => headline.yellow().bold().to_string(),
            Status::Mixed => headline.red().bold().to_string(),
        }
    } else {
        headline.to_string()
    });

    for problem in &summary.problems {
        out.push(format!("  • {}", problem));
    }

    if !report.spans.is_empty() {
        out.push(String::new());
        for span in &report.spans {
            let (line, column) = offset_to_line_col(&report.text, span.start);
            let location = format!("{}:{}", line, column);
            if colored_output {
                out.push(format!("  {} {}", location.blue().bold(), span.message));
            } else {
                out.push(format!("  {} {}", location, span.message));
            }
        }

        out.push(String::new());
        let highlighter = TerminalHighlighter {
            colored: colored_output,
        };
        out.push(highlighter.render(&report.text, &report.spans));
    }

    out.join("\n")
}

fn render_json_report(report: &FileReport) -> String {
    let spans = report
        .spans
        .iter()
        .map(|span| {
            let (line, column) = offset_to_line_col(&report.text, span.start);
            JsonSpan {
                line,
                column,
                start: span.start,
                end: span.end,
                text: &report.text[span.start..span.end],
                message: &span.message,
            }
        })
        .collect();

    let output = JsonReport {
        file: &report.source,
        status: report.summary.status,
        problems: &report.summary.problems,
        auto_fixable: report.summary.auto_fixable,
        unfixable: report.summary.unfixable,
        fixed: report.fixed,
        spans,
        results: &report.snapshot,
    };

    serde_json::to_string_pretty(&output).unwrap_or_else(|e| {
        log::warn!("Failed to serialize report: {}", e);
        "{}".to_string()
    })
}

fn render_html_report(report: &FileReport) -> String {
    let body = HtmlHighlighter::default().render(&report.text, &report.spans);
    format!(
        "<div class=\"lint-report\" data-status=\"{}\">{}</div>",
        report.summary.status, body
    )
}

pub fn print_check_summary(files_with_problems: usize, files: usize, colored: bool) {
    println!();
    let file_word = |n: usize| if n == 1 { "file" } else { "files" };

    if files_with_problems == 0 {
        if colored {
            println!("{}", "✓ No problems found!".green().bold());
        } else {
            println!("✓ No problems found!");
        }
    } else if colored {
        println!(
            "{} problems found in {} of {} {}",
            "✗".red().bold(),
            files_with_problems.to_string().red().bold(),
            files,
            file_word(files)
        );
    } else {
        println!(
            "✗ problems found in {} of {} {}",
            files_with_problems,
            files,
            file_word(files)
        );
    }
}

pub fn print_fix_summary(files_fixed: usize, files: usize, colored: bool) {
    println!();
    if files_fixed == 0 {
        if colored {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
    } else {
        let file_word = if files == 1 { "file" } else { "files" };
        if colored {
            println!(
                "{} corrected {} of {} {}",
                "✓".green().bold(),
                files_fixed.to_string().green().bold(),
                files,
                file_word
            );
        } else {
            println!("✓ corrected {} of {} {}", files_fixed, files, file_word);
        }
    }
}

pub fn print_rules(registry: &RuleRegistry, colored: bool) {
    for rule in registry.rules() {
        let fix = if rule.is_fixable() { "fix" } else { "-" };
        if colored {
            println!("  {:<20} {:<4} {}", rule.id().cyan(), fix.dimmed(), rule.name());
        } else {
            println!("  {:<20} {:<4} {}", rule.id(), fix, rule.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::DictionaryHandle;
    use crate::checker::merge::highlight_spans;
    use crate::checker::summary::summarize;
    use crate::{Config, Linter};

    fn report(text: &str) -> FileReport {
        let linter = Linter::from_config(&Config::default(), DictionaryHandle::new()).unwrap();
        let snapshot = linter.evaluate(text);
        FileReport {
            source: "<stdin>".to_string(),
            text: text.to_string(),
            summary: summarize(&snapshot, linter.registry()),
            spans: highlight_spans(&snapshot),
            snapshot,
            fixed: false,
        }
    }

    #[test]
    fn test_offset_to_line_col() {
        let input = "строка\nвторая";
        assert_eq!(offset_to_line_col(input, 0), (1, 1));
        assert_eq!(offset_to_line_col(input, 13), (2, 1));
        assert_eq!(offset_to_line_col(input, 15), (2, 2));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("html".parse::<OutputFormat>(), Ok(OutputFormat::Html));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_plain_text_report() {
        let text = render_report(&report("привет"), false, OutputFormat::Text);
        assert!(text.contains("Найдены проблемы:"));
        assert!(text.contains("  • Отсутствуют точки в конце абзацев"));
        assert!(text.contains("[[п]]риве[[т]]"));
        assert!(text.contains("1:1 Первая буква абзаца должна быть заглавной"));
    }

    #[test]
    fn test_json_report() {
        let json = render_report(&report("привет"), false, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "mixed");
        assert_eq!(value["spans"][0]["text"], "п");
        assert_eq!(value["results"]["noEmoji"]["kind"], "flag");
        assert_eq!(value["results"]["noEmoji"]["problem"], true);
    }

    #[test]
    fn test_html_report_escapes() {
        let html = render_report(&report("<b>Ок 😀.</b>"), false, OutputFormat::Html);
        assert!(html.starts_with("<div class=\"lint-report\""));
        assert!(html.contains("&lt;/b&gt;"));
    }
}
