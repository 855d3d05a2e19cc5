//! Human-readable error reports with a quoted source line.

use minif_types::{MinifError, SourceFile};

/// Format `error` against the file it came from:
///
/// ```text
/// error[E200]: undeclared variable: y
///   --> demo.mf:3:10
///    |
///  3 |     list y
///    |          ^
///    = help: declare it first with `var y = ...`
/// ```
///
/// The source block is omitted when the span points outside the file.
pub fn render_diagnostic(file: &SourceFile, error: &MinifError) -> String {
    let span = error.span;
    let mut out = format!("error[{}]: {}\n", error.code, error.message);
    out.push_str(&format!(
        "  --> {}:{}:{}\n",
        file.name, span.start_line, span.start_col
    ));

    if let Some(text) = file.line(span.start_line) {
        let start = span.start_col.max(1) as usize;
        let width = if span.end_line == span.start_line && span.end_col >= span.start_col {
            (span.end_col - span.start_col + 1) as usize
        } else {
            1
        };
        let width = width.min(text.chars().count().saturating_sub(start - 1)).max(1);
        out.push_str("   |\n");
        out.push_str(&format!("{:>3} | {}\n", span.start_line, text));
        out.push_str(&format!(
            "   | {}{}\n",
            " ".repeat(start - 1),
            "^".repeat(width)
        ));
    }

    if let Some(help) = &error.suggestion {
        out.push_str(&format!("   = help: {help}\n"));
    }
    out
}
