//! Tunable call-shape patterns and bounded-search limits.
//!
//! Every backward or forward walk over a document is capped by one of
//! the [`Limits`] so a pathological file cannot stall an editor.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Lines scanned upward from a detected call looking for its start.
pub const DEFAULT_CALL_LOOKBACK_LINES: usize = 5;
/// Lines a single call range may cover before it is cut off.
pub const DEFAULT_CALL_MAX_LINES: usize = 200;
/// Lines above the cursor searched for a multi-line string start.
pub const DEFAULT_BRACE_LOOKBACK_LINES: usize = 50;
/// Lines below the cursor searched for a multi-line string end.
pub const DEFAULT_BRACE_LOOKAHEAD_LINES: usize = 50;
/// Bytes scanned from a brace towards its partner.
pub const DEFAULT_BRACE_MAX_SCAN: usize = 1000;

/// Classifies a configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// A call-shape pattern failed to compile.
    InvalidPattern { pattern: String, message: String },
    /// A search limit was set to zero.
    ZeroLimit { name: &'static str },
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid call pattern '{pattern}': {message}")
            }
            Self::ZeroLimit { name } => {
                write!(f, "limit '{name}' must be at least 1")
            }
        }
    }
}

/// Error produced while building a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
}

/// Which grammar a call's template string uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateFlavor {
    /// Plain message template: `{Name}`, `{@Name}`, `{0}`.
    Message,
    /// Expression template or filter expression.
    Expression,
}

/// Bounded-search constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub call_lookback_lines: usize,
    pub call_max_lines: usize,
    pub brace_lookback_lines: usize,
    pub brace_lookahead_lines: usize,
    pub brace_max_scan: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            call_lookback_lines: DEFAULT_CALL_LOOKBACK_LINES,
            call_max_lines: DEFAULT_CALL_MAX_LINES,
            brace_lookback_lines: DEFAULT_BRACE_LOOKBACK_LINES,
            brace_lookahead_lines: DEFAULT_BRACE_LOOKAHEAD_LINES,
            brace_max_scan: DEFAULT_BRACE_MAX_SCAN,
        }
    }
}

impl Limits {
    /// Reject limits that would disable a search bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("call_lookback_lines", self.call_lookback_lines),
            ("call_max_lines", self.call_max_lines),
            ("brace_lookback_lines", self.brace_lookback_lines),
            ("brace_lookahead_lines", self.brace_lookahead_lines),
            ("brace_max_scan", self.brace_max_scan),
        ];
        match named.iter().find(|(_, value)| *value == 0) {
            Some(&(name, _)) => Err(ConfigError {
                kind: ConfigErrorKind::ZeroLimit { name },
            }),
            None => Ok(()),
        }
    }
}

/// A line pattern that marks a template-bearing call.
///
/// The template string is the first string literal that starts after
/// the pattern's match.
#[derive(Debug, Clone)]
pub struct CallShape {
    pub pattern: Regex,
    pub flavor: TemplateFlavor,
}

impl CallShape {
    /// Compile `pattern` into a call shape.
    pub fn new(pattern: &str, flavor: TemplateFlavor) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern).map_err(|e| ConfigError {
            kind: ConfigErrorKind::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            },
        })?;
        Ok(Self { pattern, flavor })
    }
}

/// Expression-bearing shapes come first so a line such as
/// `.Filter.ByExcluding("...")` is not claimed by the generic
/// continuation shape at the end.
const DEFAULT_SHAPES: &[(&str, TemplateFlavor)] = &[
    (r"\bnew\s+ExpressionTemplate\s*\(", TemplateFlavor::Expression),
    (
        r"\.(?:ByExcluding|ByIncludingOnly|When|Conditional)\s*\(",
        TemplateFlavor::Expression,
    ),
    (
        r"\.(?:Verbose|Debug|Information|Warning|Error|Fatal|Write)\s*(?:<[^>]*>)?\s*\(",
        TemplateFlavor::Message,
    ),
    (
        r"\bLog(?:Trace|Debug|Information|Warning|Error|Critical)?\s*(?:<[^>]*>)?\s*\(",
        TemplateFlavor::Message,
    ),
    (r"\bBeginScope\s*\(", TemplateFlavor::Message),
    (r"\boutputTemplate\s*:", TemplateFlavor::Message),
    (r"^\s*\.", TemplateFlavor::Message),
];

static DEFAULT_CALL_SHAPES: Lazy<Vec<CallShape>> = Lazy::new(|| {
    DEFAULT_SHAPES
        .iter()
        .filter_map(|(pattern, flavor)| CallShape::new(pattern, *flavor).ok())
        .collect()
});

/// Ordered set of call shapes; the first shape matching a line wins.
#[derive(Debug, Clone)]
pub struct CallShapes {
    shapes: Vec<CallShape>,
}

impl CallShapes {
    /// A set with no shapes; nothing is detected until patterns are added.
    #[must_use]
    pub const fn empty() -> Self {
        Self { shapes: Vec::new() }
    }

    /// Append a compiled pattern.
    pub fn with_pattern(
        mut self,
        pattern: &str,
        flavor: TemplateFlavor,
    ) -> Result<Self, ConfigError> {
        self.shapes.push(CallShape::new(pattern, flavor)?);
        Ok(self)
    }

    /// Insert a compiled pattern ahead of all others.
    pub fn with_priority_pattern(
        mut self,
        pattern: &str,
        flavor: TemplateFlavor,
    ) -> Result<Self, ConfigError> {
        self.shapes.insert(0, CallShape::new(pattern, flavor)?);
        Ok(self)
    }

    /// First shape matching `line`, with the byte offset where its
    /// match ends.
    #[must_use]
    pub fn matching(&self, line: &str) -> Option<(&CallShape, usize)> {
        self.shapes
            .iter()
            .find_map(|shape| shape.pattern.find(line).map(|m| (shape, m.end())))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}

impl Default for CallShapes {
    fn default() -> Self {
        Self {
            shapes: DEFAULT_CALL_SHAPES.clone(),
        }
    }
}

/// Complete configuration for the document-level operations.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub limits: Limits,
    pub shapes: CallShapes,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the search limits after validating them.
    pub fn limits(mut self, limits: Limits) -> Result<Self, ConfigError> {
        limits.validate()?;
        self.limits = limits;
        Ok(self)
    }

    /// Replace the call shapes.
    #[must_use]
    pub fn shapes(mut self, shapes: CallShapes) -> Self {
        self.shapes = shapes;
        self
    }
}
