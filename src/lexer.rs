use crate::token::{Token, TokenKind};

/// Lexing context for a stretch of content.
///
/// In `Template` mode text is literal and only `{...}` holes and
/// bracketed containers are tokenized. In `Expression` mode every
/// operator, literal and name is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Template,
    Expression,
}

impl Mode {
    /// Pick the starting mode for `content`: template when a `{` opens
    /// a hole outside any quoted string, expression otherwise.
    ///
    /// A `'` only opens a string where an operand can start, so
    /// apostrophes in template text (`Can't`) are plain text.
    #[must_use]
    pub fn detect(content: &str) -> Self {
        let input = content.as_bytes();
        let mut pos = 0;
        while pos < input.len() {
            match input[pos] {
                b'\\' => pos += 2,
                b'{' if input.get(pos + 1).copied().is_some_and(opens_hole) => {
                    return Self::Template;
                }
                b'{' if input.get(pos + 1) == Some(&b'{') => pos += 2,
                b'\'' if opens_string(input, pos) => pos = skip_quoted(input, pos, input.len()),
                _ => pos += 1,
            }
        }
        Self::Expression
    }
}

/// Whether the byte after a `{` starts a hole.
const fn opens_hole(next: u8) -> bool {
    matches!(next, b'#' | b'@' | b'$') || is_ident_char(next)
}

/// Whether the `'` at `open` starts a closed string literal in operand
/// position: at the start, after an operator or opener, or after a
/// keyword such as `like`.
fn opens_string(input: &[u8], open: usize) -> bool {
    let before = input[..open].trim_ascii_end();
    let operand_position = match before.last() {
        None => true,
        Some(&ch) if is_ident_char(ch) => {
            let word_start = before
                .iter()
                .rposition(|&b| !is_ident_char(b))
                .map_or(0, |idx| idx + 1);
            let word = &before[word_start..];
            KEYWORDS
                .iter()
                .any(|keyword| keyword.as_bytes().eq_ignore_ascii_case(word))
        }
        Some(ch) => b"=!<>(,[+-*/%?:".contains(ch),
    };
    operand_position && closes_on_line(input, open)
}

/// Whether the quote at `open` is closed before the end of its line.
fn closes_on_line(input: &[u8], open: usize) -> bool {
    let quote = input[open];
    let mut pos = open + 1;
    while pos < input.len() {
        match input[pos] {
            b'\\' => pos += 2,
            b'\n' => return false,
            ch if ch == quote => return true,
            _ => pos += 1,
        }
    }
    false
}

const KEYWORDS: &[&str] = &[
    "and", "or", "not", "in", "like", "is", "null", "if", "then", "else",
];

/// Directives that never carry an expression when closed at once.
const BARE_DIRECTIVES: &[&str] = &["end", "else", "delimit"];

/// Tokenize expression-template content, choosing the starting mode
/// with [`Mode::detect`].
///
/// Never fails: unrecognized characters are skipped and unterminated
/// constructs run to the end of the input.
#[must_use]
pub fn tokenize(content: &str) -> Vec<Token> {
    tokenize_in(content, Mode::detect(content))
}

/// Tokenize `content` starting in `mode`.
#[must_use]
pub fn tokenize_in(content: &str, mode: Mode) -> Vec<Token> {
    let mut lexer = Lexer::new(content);
    match mode {
        Mode::Template => lexer.template(),
        Mode::Expression => lexer.expression(content.len()),
    }
    lexer.tokens
}

const fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

const fn is_ident_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

/// Offset just past the quoted string opening at `open`, or `limit`
/// when it is unterminated.
fn skip_quoted(input: &[u8], open: usize, limit: usize) -> usize {
    let quote = input[open];
    let mut pos = open + 1;
    while pos < limit {
        match input[pos] {
            b'\\' => pos += 2,
            ch if ch == quote => return pos + 1,
            _ => pos += 1,
        }
    }
    limit
}

struct Lexer<'a> {
    text: &'a str,
    input: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            text,
            input: text.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let value = self.text[start..end].to_string();
        self.tokens.push(Token::new(kind, value, start, end));
    }

    fn punct(&mut self, at: usize) {
        self.push(TokenKind::Punctuation, at, at + 1);
    }

    fn ident_end(&self, from: usize) -> usize {
        let mut end = from;
        while end < self.input.len() && is_ident_char(self.input[end]) {
            end += 1;
        }
        end
    }

    /// Whether a `(` follows `from` after spaces and tabs.
    fn followed_by_paren(&self, from: usize) -> bool {
        self.input
            .get(from..)
            .and_then(|rest| rest.iter().find(|&&b| b != b' ' && b != b'\t'))
            == Some(&b'(')
    }

    fn skip_blanks(&mut self, limit: usize) {
        while self.pos < limit && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Offset of the `}` closing the hole opened at `open`.
    fn matching_brace(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut pos = open;
        while pos < self.input.len() {
            match self.input[pos] {
                b'\\' => {
                    pos += 2;
                    continue;
                }
                b'\'' | b'"' => {
                    pos = skip_quoted(self.input, pos, self.input.len());
                    continue;
                }
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(pos);
                    }
                }
                _ => {}
            }
            pos += 1;
        }
        None
    }

    // -- Template mode --

    fn template(&mut self) {
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b'\\' => self.pos += 2,
                b'{' if self.peek_at(1) == Some(b'{') => self.pos += 2,
                b'}' if self.peek_at(1) == Some(b'}') => self.pos += 2,
                b'{' => self.hole(),
                b'[' => self.template_open_bracket(),
                b']' if self.follows_index() => {
                    self.punct(self.pos);
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn follows_index(&self) -> bool {
        self.pos
            .checked_sub(1)
            .is_some_and(|prev| is_ident_char(self.input[prev]) || self.input[prev] == b']')
    }

    fn template_open_bracket(&mut self) {
        if self.follows_index() {
            self.punct(self.pos);
            self.pos += 1;
        } else if self.peek_at(1) == Some(b'{') {
            self.pos += 1;
        } else {
            self.skip_literal_brackets();
        }
    }

    /// Skip bracketed literal text such as `[INF]`, stopping early at a
    /// hole so `[Level {@l}]` still has its hole tokenized.
    fn skip_literal_brackets(&mut self) {
        let mut depth = 0usize;
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b'\\' => {
                    self.pos += 2;
                    continue;
                }
                b'{' if self.peek_at(1) != Some(b'{') => return,
                b'{' => {
                    self.pos += 2;
                    continue;
                }
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Tokenize one `{...}` hole starting at the current `{`.
    fn hole(&mut self) {
        let open = self.pos;
        let close = self.matching_brace(open);
        let limit = close.unwrap_or(self.input.len());

        self.punct(open);
        self.pos = open + 1;

        match self.peek() {
            Some(b'#') => self.directive(limit),
            Some(b'@') => {
                self.built_in();
                self.hole_tail(limit);
            }
            Some(b'$') if self.peek_at(1).is_some_and(is_ident_start) => {
                self.variable();
                self.hole_tail(limit);
            }
            Some(ch) if is_ident_char(ch) => {
                let name_end = self.ident_end(self.pos);
                if self.followed_by_paren(name_end) {
                    // `{Func(...)}` is an expression in braces.
                    self.expression(limit);
                } else {
                    self.push(TokenKind::Identifier, self.pos, name_end);
                    self.pos = name_end;
                    self.hole_tail(limit);
                }
            }
            _ => self.expression(limit),
        }

        match close {
            Some(close) => {
                self.punct(close);
                self.pos = close + 1;
            }
            None => self.pos = self.input.len(),
        }
    }

    fn directive(&mut self, limit: usize) {
        let start = self.pos;
        let mut end = start + 1;
        while end < limit && self.input[end].is_ascii_alphabetic() {
            end += 1;
        }
        self.push(TokenKind::Directive, start, end);
        self.pos = end;

        let name = &self.text[start + 1..end];
        if BARE_DIRECTIVES.contains(&name) && self.pos == limit {
            return;
        }
        self.expression(limit);
    }

    /// Alignment, format or trailing expression after a hole's name.
    fn hole_tail(&mut self, limit: usize) {
        self.skip_blanks(limit);
        if self.pos < limit && self.input[self.pos] == b',' {
            self.punct(self.pos);
            self.pos += 1;
            self.skip_blanks(limit);
            let start = self.pos;
            if self.pos < limit && matches!(self.input[self.pos], b'-' | b'+') {
                self.pos += 1;
            }
            while self.pos < limit && self.input[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            if self.pos > start {
                self.push(TokenKind::NumberLiteral, start, self.pos);
            }
            self.skip_blanks(limit);
        }
        if self.pos < limit && self.input[self.pos] == b':' {
            self.punct(self.pos);
            if self.pos + 1 < limit {
                self.push(TokenKind::FormatSpecifier, self.pos + 1, limit);
            }
            self.pos = limit;
            return;
        }
        self.expression(limit);
    }

    // -- Expression mode --

    fn expression(&mut self, limit: usize) {
        while self.pos < limit {
            match self.input[self.pos] {
                b'\\' => self.pos += 2,
                quote @ (b'\'' | b'"') => self.string(limit, quote),
                b'0'..=b'9' => self.number(limit),
                ch if is_ident_start(ch) => self.word(limit),
                b'@' => self.built_in(),
                b'$' if self.peek_at(1).is_some_and(is_ident_start) => self.variable(),
                b'=' | b'!' | b'<' | b'>' | b'+' | b'-' | b'*' | b'/' | b'%' => {
                    self.operator(limit);
                }
                b'(' | b')' | b'[' | b']' | b'{' | b'}' | b',' | b'.' | b':' | b'?' => {
                    self.punct(self.pos);
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.max(limit);
    }

    fn string(&mut self, limit: usize, quote: u8) {
        let start = self.pos;
        let mut pos = start + 1;
        while pos < limit && self.input[pos] != quote {
            pos += if self.input[pos] == b'\\' { 2 } else { 1 };
        }
        let (value_end, end) = if pos < limit {
            (pos, pos + 1)
        } else {
            (limit, limit)
        };
        let value = self.text[start + 1..value_end].to_string();
        self.tokens
            .push(Token::new(TokenKind::StringLiteral, value, start, end));
        self.pos = end;
    }

    fn number(&mut self, limit: usize) {
        let start = self.pos;
        while self.pos < limit && matches!(self.input[self.pos], b'0'..=b'9' | b'.') {
            self.pos += 1;
        }
        self.push(TokenKind::NumberLiteral, start, self.pos);
    }

    fn word(&mut self, limit: usize) {
        let start = self.pos;
        let end = self.ident_end(start).min(limit);
        let word = &self.text[start..end];

        let kind = if KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word)) {
            TokenKind::LogicalOperator
        } else if self.followed_by_paren(end) {
            TokenKind::Function
        } else {
            TokenKind::Identifier
        };
        self.push(kind, start, end);
        self.pos = end;
    }

    /// `@` followed by lowercase letters.
    fn built_in(&mut self) {
        let start = self.pos;
        let mut end = start + 1;
        while end < self.input.len() && self.input[end].is_ascii_lowercase() {
            end += 1;
        }
        if end > start + 1 {
            self.push(TokenKind::BuiltInProperty, start, end);
        }
        self.pos = end;
    }

    /// `$` followed by an identifier.
    fn variable(&mut self) {
        let start = self.pos;
        let end = self.ident_end(start + 1);
        self.push(TokenKind::Identifier, start, end);
        self.pos = end;
    }

    fn operator(&mut self, limit: usize) {
        let start = self.pos;
        let pair = if start + 1 < limit {
            &self.input[start..start + 2]
        } else {
            &self.input[start..=start]
        };
        let len = match pair {
            b"==" | b"!=" | b"<=" | b">=" | b"<>" => 2,
            _ => 1,
        };
        let kind = match &self.input[start..start + len] {
            b"=" | b"==" | b"!=" | b"<" | b">" | b"<=" | b">=" | b"<>" => {
                TokenKind::ComparisonOperator
            }
            b"+" | b"-" | b"*" | b"/" | b"%" => TokenKind::ArithmeticOperator,
            _ => TokenKind::Unknown,
        };
        self.push(kind, start, start + len);
        self.pos = start + len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn detects_mode() {
        assert_eq!(Mode::detect("Level = 'Error'"), Mode::Expression);
        assert_eq!(Mode::detect("Contains(@m, '{')"), Mode::Expression);
        assert_eq!(Mode::detect("[{@l:u3}] {@m}"), Mode::Template);
        assert_eq!(Mode::detect("@m like '{x}'"), Mode::Expression);
        assert_eq!(Mode::detect("Can't connect {@m}"), Mode::Template);
        assert_eq!(Mode::detect("'unclosed {@m}"), Mode::Template);
        assert_eq!(Mode::detect("{{not a hole}}"), Mode::Expression);
    }

    #[test]
    fn comparison_with_string() {
        let tokens = tokenize("Level >= 'Warning'");
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::Identifier,
                TokenKind::ComparisonOperator,
                TokenKind::StringLiteral
            ]
        );
        assert_eq!(tokens[2].value, "Warning");
        assert_eq!((tokens[2].start, tokens[2].end), (9, 18));
    }

    #[test]
    fn directive_with_condition() {
        let tokens = tokenize("{#if Level = 'Error'}x{#end}");
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::Punctuation,
                TokenKind::Directive,
                TokenKind::Identifier,
                TokenKind::ComparisonOperator,
                TokenKind::StringLiteral,
                TokenKind::Punctuation,
                TokenKind::Punctuation,
                TokenKind::Directive,
                TokenKind::Punctuation,
            ]
        );
        assert_eq!(tokens[1].value, "#if");
        assert_eq!(tokens[7].value, "#end");
    }

    #[test]
    fn template_text_is_not_tokenized() {
        let tokens = tokenize_in("a = b {Name} c + d", Mode::Template);
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::Punctuation,
                TokenKind::Identifier,
                TokenKind::Punctuation
            ]
        );
    }

    #[test]
    fn call_in_braces_is_expression() {
        let tokens = tokenize("{Substring(@m, 0, 5)}");
        assert_eq!(tokens[1].kind, TokenKind::Function);
        assert_eq!(tokens[3].kind, TokenKind::BuiltInProperty);
        assert_eq!(tokens.last().map(|t| t.value.as_str()), Some("}"));
    }

    #[test]
    fn property_with_alignment_and_format() {
        let tokens = tokenize("{Elapsed,-8:0.00}");
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::Punctuation,
                TokenKind::Identifier,
                TokenKind::Punctuation,
                TokenKind::NumberLiteral,
                TokenKind::Punctuation,
                TokenKind::FormatSpecifier,
                TokenKind::Punctuation,
            ]
        );
        assert_eq!(tokens[3].value, "-8");
        assert_eq!(tokens[5].value, "0.00");
    }

    #[test]
    fn built_in_with_format() {
        let tokens = tokenize("[{@t:HH:mm:ss} {@l:u3}] {@m}");
        let built_ins: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::BuiltInProperty)
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(built_ins, ["@t", "@l", "@m"]);
        assert_eq!(tokens[3].value, "HH:mm:ss");
    }

    #[test]
    fn bracket_literal_is_skipped() {
        let tokens = tokenize("[INF] {Name}");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].value, "Name");
    }

    #[test]
    fn keywords_win_over_calls() {
        let tokens = tokenize("A and (B or not C)");
        assert_eq!(tokens[1].kind, TokenKind::LogicalOperator);
        assert_eq!(tokens[1].value, "and");
    }

    #[test]
    fn unterminated_hole_does_not_panic() {
        let tokens = tokenize("{#if Level = 'Err");
        assert_eq!(tokens[1].kind, TokenKind::Directive);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::StringLiteral));
    }
}
