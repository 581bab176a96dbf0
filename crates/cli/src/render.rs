//! Pretty diagnostic rendering using ariadne.
//!
//! Converts the toolchain's [`Diagnostic`] type into ariadne [`Report`]s for
//! coloured, source-annotated terminal output. Falls back to structured JSON
//! when the output is piped or when the user explicitly requests it.

use std::io::{self, IsTerminal};

use anyhow::Result;
use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use itemkey_diagnostics::{Diagnostic, Severity};
use serde::Serialize;

// ── Output format ───────────────────────────────────────────────────────

/// Output format for results and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Plain results, coloured source-annotated diagnostics (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or pick pretty for a TTY and JSON otherwise.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: &Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: &Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render one diagnostic to stderr.
///
/// With a span, the input is shown with the offending position underlined.
/// Without one, a single `error[ID]: message` line is printed.
pub(crate) fn render_pretty(source: &str, name: &str, diag: &Diagnostic) {
    let Some(span) = &diag.span else {
        let kind = match diag.severity {
            Severity::Error => "error",
            Severity::Info => "info",
            _ => "warning",
        };
        eprintln!("{kind}[{}]: {}", diag.id, diag.message);
        if let Some(note) = context_note(diag) {
            eprintln!("  = note: {note}");
        }
        if let Some(explanation) = diag.explain() {
            eprintln!("  = help: {explanation}");
        }
        return;
    };

    // Offsets are byte positions and must sit on character boundaries. A
    // zero-width span is widened over the next character so ariadne has
    // something to point at.
    let start = floor_char_boundary(source, span.start);
    let end = floor_char_boundary(source, span.end).max(start);
    let end = if end == start {
        source[end..].chars().next().map_or(end, |c| end + c.len_utf8())
    } else {
        end
    };

    let mut builder = Report::build(report_kind(&diag.severity), (name, start..end))
        .with_code(diag.id.as_ref())
        .with_message(&diag.message)
        .with_config(
            Config::default()
                .with_compact(false)
                .with_index_type(ariadne::IndexType::Byte),
        )
        .with_label(
            Label::new((name, start..end))
                .with_message(context_note(diag).unwrap_or_else(|| diag.message.clone()))
                .with_color(severity_color(&diag.severity)),
        );

    if let Some(explanation) = diag.explain() {
        builder = builder.with_help(explanation);
    }

    builder.finish().eprint((name, Source::from(source))).ok();
}

/// The largest character boundary of `source` at or below `index`.
fn floor_char_boundary(source: &str, index: usize) -> usize {
    let mut i = index.min(source.len());
    while !source.is_char_boundary(i) {
        i -= 1;
    }
    i
}

// ── JSON rendering ──────────────────────────────────────────────────────

/// Print `value` as pretty JSON to stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Unified entry point ─────────────────────────────────────────────────

/// Report a failed command in the given format.
///
/// - `Pretty` → coloured output to stderr.
/// - `Json`   → `{"success": false, "diagnostics": [...]}` to stdout.
pub(crate) fn render_failure(
    source: &str,
    name: &str,
    diag: &Diagnostic,
    format: Format,
) -> Result<()> {
    match format {
        Format::Pretty => {
            render_pretty(source, name, diag);
            Ok(())
        }
        Format::Json => print_json(&serde_json::json!({
            "success": false,
            "diagnostics": [diag],
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::floor_char_boundary;

    #[test]
    fn floor_char_boundary_steps_back_inside_a_character() {
        let s = "\"a\" ä";
        assert_eq!(floor_char_boundary(s, 4), 4);
        assert_eq!(floor_char_boundary(s, 5), 4);
        assert_eq!(floor_char_boundary(s, 6), 6);
        assert_eq!(floor_char_boundary(s, 99), 6);
    }
}
