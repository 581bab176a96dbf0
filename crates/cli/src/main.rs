mod render;
mod telemetry;

use std::borrow::Cow;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use itemkey_core::grammar::key::param_list;
use itemkey_core::{
    KeyType, ParamError, ParamType, RewriteToken, Rewriter, count, extract_owned, quote_param,
    remove, split, unquote_param,
};
use itemkey_diagnostics::{self as diag, Diagnostic, Span, codes};
use serde::Serialize;
use tracing::debug;

use crate::render::{Format, print_json, render_failure};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "itemkey",
    version,
    about = "Inspect and rewrite monitoring item keys, SNMP OIDs and their parameter lists"
)]
struct Cli {
    /// Output mode: "pretty" for plain results and coloured diagnostics,
    /// "json" for machine-readable JSON. Defaults to "pretty" when stdout is
    /// a TTY, "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Log filter directive, e.g. "debug" or "itemkey=trace".
    #[arg(
        long,
        global = true,
        env = "ITEMKEY_LOG",
        default_value = telemetry::DEFAULT_FILTER
    )]
    log: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    // ── Parameter lists ──────────────────────────────────────────────
    /// Count the top-level parameters of a list.
    Count {
        list: String,
        /// Treat the input as a whole key, `name[params]`.
        #[arg(long)]
        key: bool,
    },
    /// Print one decoded parameter (1-based index).
    Get {
        list: String,
        index: usize,
        /// Treat the input as a whole key, `name[params]`.
        #[arg(long)]
        key: bool,
    },
    /// Print every decoded parameter with its type.
    Split { list: String },
    /// Remove one parameter (1-based index) and print the remaining list.
    Remove { list: String, index: usize },

    // ── Keys ─────────────────────────────────────────────────────────
    /// Print every token the rewrite traversal reports for a key.
    Tokens {
        key: String,
        /// Treat the input as an SNMP OID instead of an item key.
        #[arg(long)]
        oid: bool,
    },
    /// Substitute `{$NAME}` user macros inside the parameters of a key.
    Expand {
        key: String,
        /// Treat the input as an SNMP OID instead of an item key.
        #[arg(long)]
        oid: bool,
        /// Macro value, as NAME=VALUE (the name without `{$` and `}`).
        #[arg(long = "macro", short = 'm', value_name = "NAME=VALUE", value_parser = parse_macro)]
        macros: Vec<(String, String)>,
    },

    // ── Reference ────────────────────────────────────────────────────
    /// Explain a diagnostic ID (e.g. IKP1001).
    Explain { id: String },
}

fn parse_macro(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name
        .strip_prefix("{$")
        .and_then(|n| n.strip_suffix('}'))
        .unwrap_or(name);
    if name.is_empty() {
        return Err("macro name is empty".to_string());
    }
    Ok((name.to_string(), value.to_string()))
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log)?;
    let format = Format::resolve_or_detect(cli.output.as_deref());
    debug!(?format, "starting");

    match cli.cmd {
        Cmd::Count { list, key } => cmd_count(&list, key, format)?,
        Cmd::Get { list, index, key } => cmd_get(&list, index, key, format)?,
        Cmd::Split { list } => cmd_split(&list, format)?,
        Cmd::Remove { list, index } => cmd_remove(&list, index, format)?,
        Cmd::Tokens { key, oid } => cmd_tokens(&key, key_type(oid), format)?,
        Cmd::Expand { key, oid, macros } => cmd_expand(&key, key_type(oid), &macros, format)?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_count(input: &str, key: bool, format: Format) -> Result<()> {
    let (list, offset) = resolve_list(input, key, format);
    let n = match count(list) {
        Ok(n) => n,
        Err(e) => fail(input, format, shifted(e.to_diagnostic(), offset)),
    };

    match format {
        Format::Json => print_json(&serde_json::json!({ "count": n }))?,
        Format::Pretty => println!("{n}"),
    }
    Ok(())
}

fn cmd_get(input: &str, index: usize, key: bool, format: Format) -> Result<()> {
    let (list, offset) = resolve_list(input, key, format);
    let param = match extract_owned(list, index) {
        Ok(p) => p,
        Err(e) => {
            // A malformed list reports every index as missing; point at the
            // syntax error instead when there is one.
            let diag = match (&e, count(list)) {
                (ParamError::Missing { .. }, Err(syntax)) => syntax.to_diagnostic(),
                _ => e.to_diagnostic(),
            };
            fail(input, format, shifted(diag, offset))
        }
    };

    match format {
        Format::Json => print_json(&serde_json::json!({
            "index": index,
            "value": param.value,
            "type": param.ty,
        }))?,
        Format::Pretty => println!("{}", param.value),
    }
    Ok(())
}

fn cmd_split(list: &str, format: Format) -> Result<()> {
    let params = match split(list) {
        Ok(p) => p,
        Err(e) => fail(list, format, e.to_diagnostic()),
    };

    match format {
        Format::Json => print_json(&params)?,
        Format::Pretty => {
            for (i, p) in params.iter().enumerate() {
                println!("{}\t{}\t{}", i + 1, type_name(p.ty), p.value);
            }
        }
    }
    Ok(())
}

fn cmd_remove(list: &str, index: usize, format: Format) -> Result<()> {
    let mut out = list.to_string();
    remove(&mut out, index);

    match format {
        Format::Json => print_json(&serde_json::json!({ "list": out }))?,
        Format::Pretty => println!("{out}"),
    }
    Ok(())
}

/// A reported token, detached from the buffer.
#[derive(Debug, Serialize)]
struct TokenRecord {
    text: String,
    level: usize,
    index: usize,
    quoted: bool,
    array: bool,
    offset: usize,
}

impl From<&RewriteToken<'_>> for TokenRecord {
    fn from(tok: &RewriteToken<'_>) -> Self {
        Self {
            text: tok.text.to_string(),
            level: tok.level,
            index: tok.index,
            quoted: tok.quoted,
            array: tok.array,
            offset: tok.offset,
        }
    }
}

fn cmd_tokens(key: &str, key_type: KeyType, format: Format) -> Result<()> {
    let mut buf = key.to_string();
    let mut tokens = Vec::new();
    let res = Rewriter::new(key_type).run(&mut buf, |tok| {
        tokens.push(TokenRecord::from(tok));
        None
    });
    if let Err(e) = res {
        fail(key, format, e.to_diagnostic());
    }

    match format {
        Format::Json => print_json(&tokens)?,
        Format::Pretty => {
            for t in &tokens {
                let kind = match (t.quoted, t.array) {
                    (_, true) => "array",
                    (true, _) => "quoted",
                    _ => "plain",
                };
                println!(
                    "{} {} {:>4} {:<6} {}",
                    t.level, t.index, t.offset, kind, t.text
                );
            }
        }
    }
    Ok(())
}

fn cmd_expand(
    key: &str,
    key_type: KeyType,
    macros: &[(String, String)],
    format: Format,
) -> Result<()> {
    let mut buf = key.to_string();
    let res = Rewriter::new(key_type).try_run(&mut buf, |tok| {
        if tok.level == 0 || tok.array {
            return Ok(None);
        }
        let Some(value) = substitute(tok, macros) else {
            return Ok(None);
        };
        debug!(index = tok.index, level = tok.level, %value, "expanded");
        // An empty replacement would leave the token as it was.
        let forced = tok.quoted || value.is_empty();
        quote_param(&value, forced)
            .map(|q| Some(q.into_owned()))
            .map_err(|e| e.to_string())
    });
    if let Err(e) = res {
        fail(key, format, e.to_diagnostic());
    }

    match format {
        Format::Json => print_json(&serde_json::json!({ "key": buf }))?,
        Format::Pretty => println!("{buf}"),
    }
    Ok(())
}

/// Decoded token text with every known macro replaced, or `None` when the
/// token mentions none of them.
fn substitute(tok: &RewriteToken<'_>, macros: &[(String, String)]) -> Option<String> {
    let text = if tok.quoted {
        unquote_param(tok.text)
    } else {
        Cow::Borrowed(tok.text)
    };
    let mut value = text.into_owned();
    let mut changed = false;
    for (name, replacement) in macros {
        let pattern = format!("{{${name}}}");
        if value.contains(&pattern) {
            value = value.replace(&pattern, replacement);
            changed = true;
        }
    }
    changed.then_some(value)
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(&serde_json::json!({
            "id": id,
            "explanation": diag::explain(id),
        }))?,
        Format::Pretty => {
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn key_type(oid: bool) -> KeyType {
    if oid { KeyType::Oid } else { KeyType::Item }
}

fn type_name(ty: ParamType) -> &'static str {
    match ty {
        ParamType::Undefined => "undefined",
        ParamType::String => "string",
        ParamType::Array => "array",
    }
}

/// The parameter list to query and its byte offset within `input`.
///
/// For a whole key this is the text between the first `[` and the last `]`;
/// a key without one fails the command.
fn resolve_list(input: &str, key: bool, format: Format) -> (&str, usize) {
    if !key {
        return (input, 0);
    }
    match (param_list(input), input.find('[')) {
        (Some(list), Some(open)) => (list, open + 1),
        _ => fail(
            input,
            format,
            Diagnostic::error(
                codes::NO_PARAMETER_LIST,
                "key has no parameter list",
                None,
            ),
        ),
    }
}

/// Move a diagnostic reported against a parameter list to its position in
/// the enclosing key.
fn shifted(mut diag: Diagnostic, by: usize) -> Diagnostic {
    diag.span = diag.span.map(|s| Span::new(s.start + by, s.end + by));
    diag
}

/// Report `diag` against `source` and exit with code 1.
fn fail(source: &str, format: Format, diag: Diagnostic) -> ! {
    if let Err(e) = render_failure(source, "input", &diag, format) {
        eprintln!("error: {e:#}");
    }
    process::exit(1);
}
