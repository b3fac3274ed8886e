/// Token kinds produced by the expression lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Property or variable name, including `$`-prefixed names.
    Identifier,
    /// Quoted string (`'...'` or `"..."`); the value excludes quotes.
    StringLiteral,
    /// Digit run, possibly with `.`.
    NumberLiteral,
    /// `=`, `==`, `!=`, `<`, `>`, `<=`, `>=`, `<>`.
    ComparisonOperator,
    /// `and`, `or`, `not`, `in`, `like`, `is`, `null`, `if`, `then`, `else`.
    LogicalOperator,
    /// `+`, `-`, `*`, `/`, `%`.
    ArithmeticOperator,
    /// `#if`, `#each`, `#else`, `#end`, `#delimit`.
    Directive,
    /// `@t`, `@l`, `@m` and the other `@`-prefixed built-ins.
    BuiltInProperty,
    /// Identifier called with `(`.
    Function,
    /// Braces, brackets, parentheses, `,`, `.`, `:`, `?`.
    Punctuation,
    /// Format text after `:` in a hole.
    FormatSpecifier,
    /// Recognized but meaningless operator text such as a lone `!`.
    Unknown,
}

/// A single token with its kind, text, and content-relative offsets.
///
/// `start..end` is half-open and covers the token's surface text,
/// quotes included for strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, value: String, start: usize, end: usize) -> Self {
        Self {
            kind,
            value,
            start,
            end,
        }
    }
}
