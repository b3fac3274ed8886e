//! Message-template property parser.
//!
//! Extracts `{Name}`, `{@Name}`, `{$Name}`, `{0}` and their
//! `,alignment` / `:format` suffixes from the content of a template
//! string. Offsets are relative to the content passed in.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// How a property captures its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// `{Name}`
    Standard,
    /// `{@Name}`: capture object structure.
    Destructured,
    /// `{$Name}`: capture `ToString()` output.
    Stringified,
    /// `{0}`: positional argument.
    Positional,
}

/// One property occurrence in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateProperty {
    pub name: String,
    /// Offset of the opening `{`.
    pub start_index: usize,
    /// Offset one past the closing `}`.
    pub end_index: usize,
    pub kind: PropertyKind,
    pub alignment: Option<String>,
    pub format_specifier: Option<String>,
}

/// Role of a sub-span inside a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    OpenBrace,
    /// The `@` or `$` capture operator.
    Operator,
    Name,
    /// `,` plus the alignment number.
    Alignment,
    /// `:` plus the format text.
    Format,
    CloseBrace,
}

/// A content-relative sub-span of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub span: Range<usize>,
}

impl TemplateProperty {
    /// Split the property into its syntactic pieces, left to right.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(6);
        let mut pos = self.start_index;
        let mut push = |kind, len: usize, pos: &mut usize| {
            segments.push(Segment {
                kind,
                span: *pos..*pos + len,
            });
            *pos += len;
        };

        push(SegmentKind::OpenBrace, 1, &mut pos);
        if matches!(
            self.kind,
            PropertyKind::Destructured | PropertyKind::Stringified
        ) {
            push(SegmentKind::Operator, 1, &mut pos);
        }
        push(SegmentKind::Name, self.name.len(), &mut pos);
        if let Some(alignment) = &self.alignment {
            push(SegmentKind::Alignment, alignment.len() + 1, &mut pos);
        }
        if let Some(format) = &self.format_specifier {
            push(SegmentKind::Format, format.len() + 1, &mut pos);
        }
        // An empty `:` format leaves no segment of its own.
        let mut close = self.end_index - 1;
        push(SegmentKind::CloseBrace, 1, &mut close);
        segments
    }
}

static PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([@$#])?([A-Za-z_][A-Za-z0-9_]*|[0-9]+)(?:,([+-]?[0-9]+))?(?::([^}]*))?\}")
        .expect("property pattern is valid")
});

/// Names reserved for expression built-ins when written `{@name}`.
const BUILT_IN_NAMES: &[&str] = &["t", "l", "m", "mt", "x", "i", "p", "r", "tr", "sp"];

/// Parse the properties of a message template.
///
/// Escaped braces (`{{`, `}}`) never produce properties, and
/// expression-only constructs (`{#if}`, `{@t}`, `{$x}`) are skipped.
#[must_use]
pub fn parse_template(content: &str) -> Vec<TemplateProperty> {
    let blanked = blank_escaped_braces(content);
    let mut properties = Vec::new();

    for caps in PROPERTY.captures_iter(&blanked) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let name = name.as_str();
        let prefix = caps.get(1).map(|m| m.as_str());

        let kind = match prefix {
            Some("#") => continue,
            Some("@") if BUILT_IN_NAMES.contains(&name) => continue,
            Some("$") if name.len() == 1 => continue,
            Some("@") => PropertyKind::Destructured,
            Some("$") => PropertyKind::Stringified,
            _ if name.bytes().all(|b| b.is_ascii_digit()) => PropertyKind::Positional,
            _ => PropertyKind::Standard,
        };

        properties.push(TemplateProperty {
            name: name.to_string(),
            start_index: whole.start(),
            end_index: whole.end(),
            kind,
            alignment: caps.get(3).map(|m| m.as_str().to_string()),
            format_specifier: caps
                .get(4)
                .map(|m| m.as_str().to_string())
                .filter(|f| !f.is_empty()),
        });
    }

    properties
}

/// Replace every escaped `{{` and `}}` with spaces, keeping offsets.
///
/// A lone `{` opens a hole that runs to the first `}` and is copied
/// as is, so `{{{A}}}` reads as `{{`, `{A}`, `}}`. A `{` met inside
/// a hole ends it early and is scanned again.
pub(crate) fn blank_escaped_braces(content: &str) -> String {
    let bytes = content.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut pos = 0;

    while pos < bytes.len() {
        let ch = bytes[pos];
        if matches!(ch, b'{' | b'}') && bytes.get(pos + 1) == Some(&ch) {
            out.extend_from_slice(b"  ");
            pos += 2;
        } else if ch == b'{' {
            let hole_end = bytes[pos + 1..]
                .iter()
                .position(|&b| b == b'{' || b == b'}')
                .map_or(bytes.len(), |idx| {
                    let at = pos + 1 + idx;
                    if bytes[at] == b'}' { at + 1 } else { at }
                });
            out.extend_from_slice(&bytes[pos..hole_end]);
            pos = hole_end;
        } else {
            out.push(ch);
            pos += 1;
        }
    }

    // Only ASCII braces were replaced by ASCII spaces.
    String::from_utf8(out).unwrap_or_else(|_| content.to_string())
}
