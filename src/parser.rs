use std::fmt;

use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};

/// Highlight category of a classified region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Identifier,
    String,
    Number,
    Operator,
    Directive,
    BuiltIn,
    Function,
    Format,
    Brace,
    Punctuation,
    /// Message-template property name.
    Property,
    /// `@` or `$` capture operator on a message-template property.
    CaptureOperator,
    /// `,alignment` on a message-template property.
    Alignment,
}

impl Classification {
    /// Stable lowercase name, as consumed by renderers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::String => "string",
            Self::Number => "number",
            Self::Operator => "operator",
            Self::Directive => "directive",
            Self::BuiltIn => "builtin",
            Self::Function => "function",
            Self::Format => "format",
            Self::Brace => "brace",
            Self::Punctuation => "punctuation",
            Self::Property => "property",
            Self::CaptureOperator => "capture",
            Self::Alignment => "alignment",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified span, relative to the parsed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRegion {
    pub classification: Classification,
    pub start_index: usize,
    pub end_index: usize,
}

/// Tokenize an expression template and classify each token.
///
/// `Unknown` tokens are dropped; `{` and `}` classify as braces.
#[must_use]
pub fn parse_expression(content: &str) -> Vec<ClassifiedRegion> {
    classify(&tokenize(content))
}

/// Classify an existing token stream.
#[must_use]
pub fn classify(tokens: &[Token]) -> Vec<ClassifiedRegion> {
    tokens
        .iter()
        .filter_map(|token| {
            classification_of(token).map(|classification| ClassifiedRegion {
                classification,
                start_index: token.start,
                end_index: token.end,
            })
        })
        .collect()
}

fn classification_of(token: &Token) -> Option<Classification> {
    let classification = match token.kind {
        TokenKind::Identifier => Classification::Identifier,
        TokenKind::StringLiteral => Classification::String,
        TokenKind::NumberLiteral => Classification::Number,
        TokenKind::ComparisonOperator
        | TokenKind::LogicalOperator
        | TokenKind::ArithmeticOperator => Classification::Operator,
        TokenKind::Directive => Classification::Directive,
        TokenKind::BuiltInProperty => Classification::BuiltIn,
        TokenKind::Function => Classification::Function,
        TokenKind::FormatSpecifier => Classification::Format,
        TokenKind::Punctuation if matches!(token.value.as_str(), "{" | "}") => {
            Classification::Brace
        }
        TokenKind::Punctuation => Classification::Punctuation,
        TokenKind::Unknown => return None,
    };
    Some(classification)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(regions: &[ClassifiedRegion], classification: Classification) -> usize {
        regions
            .iter()
            .filter(|r| r.classification == classification)
            .count()
    }

    #[test]
    fn operator_and_string() {
        let regions = parse_expression("Level >= 'Warning'");
        assert_eq!(count(&regions, Classification::Operator), 1);
        assert_eq!(count(&regions, Classification::String), 1);
    }

    #[test]
    fn nested_functions() {
        let regions = parse_expression("Contains(Substring(Message, 0, 10), 'error')");
        assert_eq!(count(&regions, Classification::Function), 2);
    }

    #[test]
    fn braces_are_reclassified() {
        let regions = parse_expression("{@m}");
        let classes: Vec<_> = regions.iter().map(|r| r.classification).collect();
        assert_eq!(
            classes,
            [
                Classification::Brace,
                Classification::BuiltIn,
                Classification::Brace
            ]
        );
    }

    #[test]
    fn bang_alone_is_dropped() {
        let regions = parse_expression("!Flag");
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].classification, Classification::Identifier);
    }
}
