//! Template-bearing call detection.
//!
//! A line is a candidate when one of the configured [`CallShapes`]
//! matches it. The full call is then located by walking a few lines
//! up to the statement start and balancing parentheses forward,
//! ignoring anything inside string literals, character literals and
//! line comments. The line heuristic is best-effort: unusual call
//! shapes can be missed or over-matched.

use crate::config::{CallShapes, Config, Limits};
use crate::document::{Position, Range, TextDocument, TextWindow};
use crate::literal::{scan_all_string_literals, scan_string_literal};

/// Full source extent of one call. `end_char` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallRange {
    pub start_line: usize,
    pub start_char: usize,
    pub end_line: usize,
    pub end_char: usize,
}

impl CallRange {
    #[must_use]
    pub const fn range(&self) -> Range {
        Range::new(
            Position::new(self.start_line, self.start_char),
            Position::new(self.end_line, self.end_char),
        )
    }

    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    /// Number of lines covered.
    #[must_use]
    pub const fn line_span(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Whether `line` looks like it starts or continues a logging call.
#[must_use]
pub fn is_template_bearing_call(line: &str, shapes: &CallShapes) -> bool {
    shapes.matching(line).is_some()
}

/// Find every template-bearing call in `doc`.
///
/// Ranges come back in document order and never share a line: once a
/// call claims a line, later matches on it are skipped.
#[tracing::instrument(level = "trace", skip_all, fields(lines = doc.line_count()))]
pub fn find_call_ranges<D: TextDocument + ?Sized>(doc: &D, config: &Config) -> Vec<CallRange> {
    let mut ranges = Vec::new();
    let mut next_free = 0;

    for line in 0..doc.line_count() {
        if line < next_free || !is_template_bearing_call(doc.line_at(line), &config.shapes) {
            continue;
        }
        let range = call_range_at(doc, line, next_free, &config.limits);
        tracing::debug!(
            trigger = line,
            start = range.start_line,
            end = range.end_line,
            "call range"
        );
        next_free = range.end_line + 1;
        ranges.push(range);
    }

    ranges
}

/// Compute the call range around the call detected on `trigger`,
/// never reaching above `floor`.
pub(crate) fn call_range_at<D: TextDocument + ?Sized>(
    doc: &D,
    trigger: usize,
    floor: usize,
    limits: &Limits,
) -> CallRange {
    let start_line = find_call_start(doc, trigger, floor, limits.call_lookback_lines);
    let last = trigger.saturating_add(limits.call_max_lines).min(doc.line_count());
    let window = TextWindow::new(doc, start_line, last);
    let start_char = leading_whitespace(doc.line_at(start_line));

    let trigger_offset = window.line_start(trigger).unwrap_or(0);
    let end = balanced_end(window.text(), trigger_offset).unwrap_or_else(|| {
        tracing::trace!(trigger, last, "call not closed inside window");
        window.text().len()
    });
    let end = window.position_of(end);

    CallRange {
        start_line,
        start_char,
        end_line: end.line,
        end_char: end.character,
    }
}

fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn find_call_start<D: TextDocument + ?Sized>(
    doc: &D,
    trigger: usize,
    floor: usize,
    lookback: usize,
) -> usize {
    let lowest = trigger.saturating_sub(lookback).max(floor);
    let mut start = trigger;
    while start > lowest && !ends_statement(doc.line_at(start - 1)) {
        start -= 1;
    }
    start
}

/// Whether `line` closes a statement or block, judged by its last
/// significant character outside strings and comments. Blank and
/// comment-only lines count as boundaries too.
fn ends_statement(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return true;
    }

    let literals = scan_all_string_literals(line);
    let bytes = line.as_bytes();
    let mut last = None;
    let mut pos = 0;
    let mut next_literal = literals.iter().peekable();

    while pos < bytes.len() {
        if let Some(lit) = next_literal.next_if(|lit| lit.start == pos) {
            last = Some(b'"');
            pos = lit.end + 1;
            continue;
        }
        match bytes[pos] {
            b'/' if bytes.get(pos + 1) == Some(&b'/') => break,
            ch if !ch.is_ascii_whitespace() => last = Some(ch),
            _ => {}
        }
        pos += 1;
    }

    matches!(last, Some(b';' | b'{' | b'}'))
}

/// Offset just past the parenthesis that balances the call, plus a
/// trailing `;` when one follows. Only a closer at or after
/// `trigger_offset` can end the call.
fn balanced_end(text: &str, trigger_offset: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut open = 0usize;
    let mut close = 0usize;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'"' | b'@' | b'$' => {
                if let Some(lit) = scan_string_literal(text, pos) {
                    pos = lit.end + 1;
                    continue;
                }
            }
            b'\'' => {
                pos = skip_char_literal(bytes, pos);
                continue;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos = bytes[pos..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |nl| pos + nl);
                continue;
            }
            b'(' => open += 1,
            b')' => {
                close += 1;
                if pos >= trigger_offset && open > 0 && close >= open {
                    return Some(include_terminator(bytes, pos + 1));
                }
            }
            _ => {}
        }
        pos += 1;
    }

    None
}

fn include_terminator(bytes: &[u8], after: usize) -> usize {
    let next = bytes[after..]
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|skip| after + skip);
    match next {
        Some(semi) if bytes[semi] == b';' => semi + 1,
        _ => after,
    }
}

/// Skip a character literal such as `'('`, `'\''` or `'\u0028'`.
/// A lone `'` is stepped over.
fn skip_char_literal(bytes: &[u8], pos: usize) -> usize {
    const MAX_ESCAPE: usize = 10;

    if bytes.get(pos + 1) == Some(&b'\\') {
        let limit = (pos + 2 + MAX_ESCAPE).min(bytes.len());
        return bytes
            .get(pos + 3..limit)
            .and_then(|rest| rest.iter().position(|&b| b == b'\'' || b == b'\n'))
            .map(|idx| pos + 3 + idx)
            .filter(|&close| bytes[close] == b'\'')
            .map_or(pos + 1, |close| close + 1);
    }
    if bytes.get(pos + 1).is_some_and(|&b| b != b'\n') && bytes.get(pos + 2) == Some(&b'\'') {
        return pos + 3;
    }
    pos + 1
}
