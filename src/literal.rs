//! Host string-literal scanner.
//!
//! Recognizes the four C# literal shapes that can carry a logging
//! template and reports their exact byte boundaries. The returned
//! content is the literal's surface text: escapes are located so the
//! closer is found correctly, but never decoded.

use std::ops::Range;

/// Kinds of host string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    /// `"..."` with backslash escapes.
    Regular,
    /// `@"..."` where `""` is an embedded quote.
    Verbatim,
    /// `"""..."""` delimited by a run of three or more quotes.
    Raw,
    /// `$"..."` with `{...}` interpolation holes, or its verbatim
    /// form `$@"..."` / `@$"..."`.
    Interpolated,
}

/// A string literal located in a text buffer.
///
/// `start` is the offset of the first prefix or quote character and
/// `end` the offset of the last character of the closer, so both are
/// inclusive. Content runs from `content_start` up to, but excluding,
/// `content_end`. An unterminated literal ends at the last byte of
/// the scanned text (or before the newline that cut a single-line
/// literal short) and its content runs through `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    pub start: usize,
    pub end: usize,
    pub content_start: usize,
    pub content_end: usize,
    pub content: String,
    pub kind: StringKind,
    pub terminated: bool,
}

impl StringLiteral {
    /// Byte span of the whole literal, closer included.
    #[must_use]
    pub const fn span(&self) -> Range<usize> {
        self.start..self.end + 1
    }

    /// Byte span of the content.
    #[must_use]
    pub const fn content_span(&self) -> Range<usize> {
        self.content_start..self.content_end
    }

    /// Whether the absolute offset `offset` falls inside the content,
    /// counting the position right after the last content byte.
    #[must_use]
    pub const fn content_touches(&self, offset: usize) -> bool {
        self.content_start <= offset && offset <= self.content_end
    }
}

/// Minimum quote run that opens a raw literal.
const RAW_QUOTE_RUN: usize = 3;

/// Try to scan a string literal whose opener begins at `start`.
///
/// Returns `None` when `start` is not on `"`, `@"` or `$"`. Never
/// fails on unterminated input: the literal then extends to the end
/// of the text.
#[must_use]
pub fn scan_string_literal(text: &str, start: usize) -> Option<StringLiteral> {
    Scanner::new(text).scan(start)
}

/// Scan every string literal in `text`, left to right.
///
/// Literals never overlap and come back in increasing `start` order.
#[must_use]
pub fn scan_all_string_literals(text: &str) -> Vec<StringLiteral> {
    let scanner = Scanner::new(text);
    let mut literals = Vec::new();
    let mut pos = 0;

    while pos < scanner.input.len() {
        if matches!(scanner.input[pos], b'"' | b'@' | b'$') {
            if let Some(literal) = scanner.scan(pos) {
                pos = literal.end + 1;
                literals.push(literal);
                continue;
            }
        }
        pos += 1;
    }

    literals
}

struct Scanner<'a> {
    text: &'a str,
    input: &'a [u8],
}

impl<'a> Scanner<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            text,
            input: text.as_bytes(),
        }
    }

    fn at(&self, pos: usize) -> Option<u8> {
        self.input.get(pos).copied()
    }

    fn quote_run(&self, from: usize) -> usize {
        self.input
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|&&b| b == b'"').count())
    }

    fn scan(&self, start: usize) -> Option<StringLiteral> {
        match self.at(start)? {
            b'@' => match (self.at(start + 1)?, self.at(start + 2)) {
                (b'"', _) => Some(self.scan_verbatim(start)),
                (b'$', Some(b'"')) => Some(self.scan_verbatim_interpolated(start, start + 3)),
                _ => None,
            },
            b'$' => {
                let dollars = self.dollar_run(start);
                let quotes = start + dollars;
                match (self.at(quotes)?, self.at(quotes + 1)) {
                    (b'"', _) if self.quote_run(quotes) >= RAW_QUOTE_RUN => {
                        Some(self.scan_raw(start, quotes))
                    }
                    (b'"', _) if dollars == 1 => Some(self.scan_interpolated(start)),
                    (b'@', Some(b'"')) if dollars == 1 => {
                        Some(self.scan_verbatim_interpolated(start, start + 3))
                    }
                    _ => None,
                }
            }
            b'"' => {
                if self.quote_run(start) >= RAW_QUOTE_RUN {
                    Some(self.scan_raw(start, start))
                } else {
                    Some(self.scan_regular(start))
                }
            }
            _ => None,
        }
    }

    fn dollar_run(&self, from: usize) -> usize {
        self.input[from..].iter().take_while(|&&b| b == b'$').count()
    }

    fn finish(
        &self,
        kind: StringKind,
        start: usize,
        content_start: usize,
        content_end: usize,
        end: usize,
        terminated: bool,
    ) -> StringLiteral {
        let content_start = content_start.min(self.input.len());
        let content_end = content_end.clamp(content_start, self.input.len());
        StringLiteral {
            start,
            end,
            content_start,
            content_end,
            content: self.text[content_start..content_end].to_string(),
            kind,
            terminated,
        }
    }

    /// Unterminated literal running up to `stop` (exclusive).
    fn unterminated(
        &self,
        kind: StringKind,
        start: usize,
        content_start: usize,
        stop: usize,
    ) -> StringLiteral {
        let end = stop.saturating_sub(1).max(start);
        self.finish(kind, start, content_start, stop, end, false)
    }

    fn scan_regular(&self, start: usize) -> StringLiteral {
        let content_start = start + 1;
        let mut pos = content_start;

        while let Some(ch) = self.at(pos) {
            match ch {
                b'\\' if self.at(pos + 1) == Some(b'\n') => {
                    return self.unterminated(StringKind::Regular, start, content_start, pos + 1);
                }
                b'\\' => pos += 2,
                b'"' => {
                    return self.finish(StringKind::Regular, start, content_start, pos, pos, true);
                }
                b'\n' => {
                    return self.unterminated(StringKind::Regular, start, content_start, pos);
                }
                _ => pos += 1,
            }
        }

        self.unterminated(StringKind::Regular, start, content_start, self.input.len())
    }

    fn scan_verbatim(&self, start: usize) -> StringLiteral {
        let content_start = start + 2;
        let mut pos = content_start;

        while let Some(ch) = self.at(pos) {
            if ch == b'"' {
                if self.at(pos + 1) == Some(b'"') {
                    pos += 2;
                    continue;
                }
                return self.finish(StringKind::Verbatim, start, content_start, pos, pos, true);
            }
            pos += 1;
        }

        self.unterminated(StringKind::Verbatim, start, content_start, self.input.len())
    }

    /// `quotes` is the offset of the opening quote run, which follows
    /// a `$` prefix for interpolated raw literals.
    fn scan_raw(&self, start: usize, quotes: usize) -> StringLiteral {
        let delimiter = self.quote_run(quotes);
        let content_start = quotes + delimiter;
        let mut pos = content_start;

        while let Some(ch) = self.at(pos) {
            if ch != b'"' {
                pos += 1;
                continue;
            }
            let run_start = pos;
            let mut count = 0;
            while self.at(pos) == Some(b'"') {
                count += 1;
                if count >= delimiter {
                    return self.finish(StringKind::Raw, start, content_start, run_start, pos, true);
                }
                pos += 1;
            }
        }

        self.unterminated(StringKind::Raw, start, content_start, self.input.len())
    }

    fn scan_interpolated(&self, start: usize) -> StringLiteral {
        let content_start = start + 2;
        let mut pos = content_start;
        let mut depth = 0usize;

        while let Some(ch) = self.at(pos) {
            match ch {
                b'\\' if depth == 0 && self.at(pos + 1) == Some(b'\n') => {
                    return self.unterminated(
                        StringKind::Interpolated,
                        start,
                        content_start,
                        pos + 1,
                    );
                }
                b'\\' => pos += 2,
                b'{' if depth == 0 && self.at(pos + 1) == Some(b'{') => pos += 2,
                b'}' if depth == 0 && self.at(pos + 1) == Some(b'}') => pos += 2,
                b'{' => {
                    depth += 1;
                    pos += 1;
                }
                b'}' => {
                    depth = depth.saturating_sub(1);
                    pos += 1;
                }
                b'"' if depth == 0 => {
                    return self.finish(
                        StringKind::Interpolated,
                        start,
                        content_start,
                        pos,
                        pos,
                        true,
                    );
                }
                b'\n' if depth == 0 => {
                    return self.unterminated(StringKind::Interpolated, start, content_start, pos);
                }
                _ => pos += 1,
            }
        }

        self.unterminated(
            StringKind::Interpolated,
            start,
            content_start,
            self.input.len(),
        )
    }
    /// `$@"..."` or `@$"..."`: verbatim rules for quotes and newlines,
    /// with holes tracked so a quote inside `{...}` does not close it.
    fn scan_verbatim_interpolated(&self, start: usize, content_start: usize) -> StringLiteral {
        let mut pos = content_start;
        let mut depth = 0usize;

        while let Some(ch) = self.at(pos) {
            match ch {
                b'{' if depth == 0 && self.at(pos + 1) == Some(b'{') => pos += 2,
                b'}' if depth == 0 && self.at(pos + 1) == Some(b'}') => pos += 2,
                b'{' => {
                    depth += 1;
                    pos += 1;
                }
                b'}' => {
                    depth = depth.saturating_sub(1);
                    pos += 1;
                }
                b'"' if depth == 0 && self.at(pos + 1) == Some(b'"') => pos += 2,
                b'"' if depth == 0 => {
                    return self.finish(
                        StringKind::Interpolated,
                        start,
                        content_start,
                        pos,
                        pos,
                        true,
                    );
                }
                _ => pos += 1,
            }
        }

        self.unterminated(
            StringKind::Interpolated,
            start,
            content_start,
            self.input.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_string() {
        let text = r#"Log("User {Name}")"#;
        let lit = scan_string_literal(text, 4).expect("should scan");
        assert_eq!(lit.kind, StringKind::Regular);
        assert_eq!(lit.content, "User {Name}");
        assert_eq!((lit.start, lit.end), (4, 16));
        assert_eq!((lit.content_start, lit.content_end), (5, 16));
        assert!(lit.terminated);
    }

    #[test]
    fn regular_keeps_escapes() {
        let text = r#""a \"b\" c" tail"#;
        let lit = scan_string_literal(text, 0).expect("should scan");
        assert_eq!(lit.content, r#"a \"b\" c"#);
        assert_eq!(lit.end, 10);
    }

    #[test]
    fn verbatim_doubled_quote() {
        let text = r#"@"say ""hi"" now" x"#;
        let lit = scan_string_literal(text, 0).expect("should scan");
        assert_eq!(lit.kind, StringKind::Verbatim);
        assert_eq!(lit.content, r#"say ""hi"" now"#);
        assert_eq!(lit.end, 16);
    }

    #[test]
    fn raw_string_with_inner_quotes() {
        let text = r#""""a "" b""" rest"#;
        let lit = scan_string_literal(text, 0).expect("should scan");
        assert_eq!(lit.kind, StringKind::Raw);
        assert_eq!(lit.content, r#"a "" b"#);
        assert_eq!(lit.content_start, 3);
        assert_eq!(lit.end, 11);
    }

    #[test]
    fn raw_closer_stops_at_delimiter_length() {
        let text = r#""""x""""""#;
        let lit = scan_string_literal(text, 0).expect("should scan");
        assert_eq!(lit.content, "x");
        assert_eq!(lit.end, 6);
    }

    #[test]
    fn interpolated_hole_does_not_close() {
        let text = r#"$"a {b["k"]} {{c}}" d"#;
        let lit = scan_string_literal(text, 0).expect("should scan");
        assert_eq!(lit.kind, StringKind::Interpolated);
        assert_eq!(lit.content, r#"a {b["k"]} {{c}}"#);
    }

    #[test]
    fn not_an_opener() {
        assert!(scan_string_literal("abc", 0).is_none());
        assert!(scan_string_literal("@x", 0).is_none());
        assert!(scan_string_literal("$x", 0).is_none());
        assert!(scan_string_literal("\"", 5).is_none());
    }

    #[test]
    fn unterminated_runs_to_end() {
        let text = "\"abc";
        let lit = scan_string_literal(text, 0).expect("should scan");
        assert!(!lit.terminated);
        assert_eq!(lit.end, text.len() - 1);
        assert_eq!(lit.content, "abc");
    }

    #[test]
    fn lone_quote_at_end() {
        let lit = scan_string_literal("x \"", 2).expect("should scan");
        assert_eq!(lit.content, "");
        assert_eq!(lit.end, 2);
    }

    #[test]
    fn backslash_before_newline_ends_line() {
        let lit = scan_string_literal("\"C:\\\nnext(\"x\")", 0).expect("should scan");
        assert!(!lit.terminated);
        assert_eq!(lit.content, "C:\\");
        assert_eq!((lit.end, lit.content_end), (3, 4));

        let lit = scan_string_literal("$\"{a} \\\n\"", 0).expect("should scan");
        assert!(!lit.terminated);
        assert_eq!(lit.content_end, 7);
    }

    #[test]
    fn verbatim_interpolated_prefixes() {
        for text in ["@$\"a\n{b}\"\"c\" x", "$@\"a\n{b}\"\"c\" x"] {
            let lit = scan_string_literal(text, 0).expect("should scan");
            assert_eq!(lit.kind, StringKind::Interpolated, "{text}");
            assert_eq!(lit.content, "a\n{b}\"\"c", "{text}");
            assert_eq!(lit.end, 11, "{text}");
        }
    }

    #[test]
    fn find_all_skips_failed_openers() {
        let text = r#"x = $y + "a" + @"b" + @z"#;
        let all = scan_all_string_literals(text);
        let contents: Vec<_> = all.iter().map(|l| l.content.as_str()).collect();
        assert_eq!(contents, ["a", "b"]);
    }
}
