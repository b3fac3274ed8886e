//! Structured-logging template scanner, parser, and brace matcher.
//!
//! Finds the message templates and expression templates that appear
//! inside C# string literals passed to logging calls, decomposes them
//! into classified spans, and matches their braces for editors.
//!
//! # Quick start
//!
//! ## Parse a message template
//!
//! ```
//! use logtemplate_rs::{PropertyKind, parse_template};
//!
//! let props = parse_template("User {Username} logged in from {@Client}");
//! assert_eq!(props.len(), 2);
//! assert_eq!(props[0].name, "Username");
//! assert_eq!((props[0].start_index, props[0].end_index), (5, 15));
//! assert_eq!(props[1].kind, PropertyKind::Destructured);
//! ```
//!
//! ## Classify an expression
//!
//! ```
//! use logtemplate_rs::{Classification, parse_expression};
//!
//! let regions = parse_expression("Level >= 'Warning'");
//! let classes: Vec<_> = regions.iter().map(|r| r.classification).collect();
//! assert_eq!(
//!     classes,
//!     [Classification::Identifier, Classification::Operator, Classification::String]
//! );
//! ```
//!
//! ## Highlight a document
//!
//! ```
//! use logtemplate_rs::{Config, Document, highlight_document};
//!
//! let doc = Document::new("log.Information(\n    \"Order {OrderId} shipped\",\n    id);\n");
//! let found = highlight_document(&doc, &Config::default());
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].content, "Order {OrderId} shipped");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod brace;
pub mod call;
pub mod config;
pub mod document;
pub mod highlight;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod template;
pub mod token;

use std::fs;
use std::path::Path;

pub use brace::{BracePair, find_brace_match};
pub use call::{CallRange, find_call_ranges, is_template_bearing_call};
pub use config::{
    CallShape, CallShapes, Config, ConfigError, ConfigErrorKind, Limits, TemplateFlavor,
};
pub use document::{Document, Position, Range, TextDocument, TextWindow};
pub use highlight::{HighlightRegion, TemplateString, highlight_document};
pub use lexer::{Mode, tokenize, tokenize_in};
pub use literal::{StringKind, StringLiteral, scan_all_string_literals, scan_string_literal};
pub use parser::{Classification, ClassifiedRegion, classify, parse_expression};
pub use template::{PropertyKind, Segment, SegmentKind, TemplateProperty, parse_template};
pub use token::{Token, TokenKind};

/// Unified error type for the fallible entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid configuration.
    #[error("{0}")]
    Config(#[from] ConfigError),
    /// A source file could not be read.
    #[error("{path}: {message}")]
    Read { path: String, message: String },
}

/// Read a source file into a [`Document`].
pub fn read_document(path: &Path) -> Result<Document, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(Document::new(&text))
}
