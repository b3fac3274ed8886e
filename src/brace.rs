//! Brace matching inside template strings.
//!
//! Matching is unit-aware rather than depth counting: a hole such as
//! `{Name}`, `{@t:HH:mm}` or `{#if x}` must close at the next `}`
//! with no other brace in between, otherwise the input is treated as
//! malformed and nothing matches. Escaped `{{` and `}}` never match.

use crate::call::{call_range_at, is_template_bearing_call};
use crate::config::Config;
use crate::document::{Position, Range, TextDocument, TextWindow};
use crate::literal::scan_all_string_literals;
use crate::template::blank_escaped_braces;

/// The two braces of one template unit, as one-character ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BracePair {
    pub open: Range,
    pub close: Range,
}

/// What a `{` opens, judged by the character after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Directive,
    BuiltIn,
    Variable,
    Property,
}

impl Unit {
    const fn after_open(next: Option<u8>) -> Self {
        match next {
            Some(b'#') => Self::Directive,
            Some(b'@') => Self::BuiltIn,
            Some(b'$') => Self::Variable,
            _ => Self::Property,
        }
    }
}

/// Find the brace matching the one at, or just before, `position`.
///
/// The cursor must sit on a `{` or `}` inside a string literal, or
/// immediately after a `}`. Multi-line verbatim and raw strings are
/// found by starting the scan at the enclosing call, searched for at
/// most `brace_lookback_lines` lines up.
#[tracing::instrument(
    level = "trace",
    skip_all,
    fields(line = position.line, character = position.character)
)]
pub fn find_brace_match<D: TextDocument + ?Sized>(
    doc: &D,
    position: Position,
    config: &Config,
) -> Option<BracePair> {
    if position.line >= doc.line_count() {
        return None;
    }
    let limits = &config.limits;
    let base = scan_base(doc, position.line, config);
    let last = position
        .line
        .saturating_add(limits.brace_lookahead_lines)
        .saturating_add(1)
        .min(doc.line_count());
    let window = TextWindow::new(doc, base, last);
    let cursor = window.offset_of(position)?;

    let literal = scan_all_string_literals(window.text())
        .into_iter()
        .find(|lit| lit.content_touches(cursor))?;
    let content = blank_escaped_braces(&literal.content);
    let content = content.as_bytes();

    let at = brace_at_cursor(content, cursor - literal.content_start)?;
    let (open, close) = if content[at] == b'{' {
        (at, match_forward(content, at, limits.brace_max_scan)?)
    } else {
        (match_backward(content, at, limits.brace_max_scan)?, at)
    };

    let to_range = |idx: usize| {
        let abs = literal.content_start + idx;
        window.range_of(abs, abs + 1)
    };
    let pair = BracePair {
        open: to_range(open),
        close: to_range(close),
    };
    tracing::debug!(?pair, "brace match");
    Some(pair)
}

/// First line to scan for string literals: the start of the call
/// enclosing `line`, or `line` itself when there is none.
fn scan_base<D: TextDocument + ?Sized>(doc: &D, line: usize, config: &Config) -> usize {
    let floor = line.saturating_sub(config.limits.brace_lookback_lines);

    let trigger = (floor..=line)
        .rev()
        .find(|&candidate| is_template_bearing_call(doc.line_at(candidate), &config.shapes));
    let Some(trigger) = trigger else {
        return line;
    };

    let call = call_range_at(doc, trigger, floor, &config.limits);
    if call.contains_line(line) {
        call.start_line
    } else {
        line
    }
}

fn brace_at_cursor(content: &[u8], offset: usize) -> Option<usize> {
    match content.get(offset) {
        Some(b'{' | b'}') => Some(offset),
        _ => offset
            .checked_sub(1)
            .filter(|&prev| content[prev] == b'}'),
    }
}

fn match_forward(content: &[u8], open: usize, max_scan: usize) -> Option<usize> {
    let unit = Unit::after_open(content.get(open + 1).copied());
    let limit = open.saturating_add(1).saturating_add(max_scan).min(content.len());
    let mut in_format = false;

    for (idx, &ch) in content.iter().enumerate().take(limit).skip(open + 1) {
        match ch {
            b'{' => {
                tracing::trace!(?unit, idx, "nested brace before close");
                return None;
            }
            b'}' => {
                tracing::trace!(?unit, in_format, "unit closed");
                return Some(idx);
            }
            b':' if unit == Unit::Property => in_format = true,
            _ => {}
        }
    }

    tracing::trace!(?unit, limit, "no close within scan limit");
    None
}

fn match_backward(content: &[u8], close: usize, max_scan: usize) -> Option<usize> {
    let lower = close.saturating_sub(max_scan);
    content[lower..close]
        .iter()
        .rposition(|&ch| ch == b'{' || ch == b'}')
        .map(|idx| lower + idx)
        .filter(|&idx| content[idx] == b'{')
}
