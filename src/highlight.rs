//! Document-level pipeline: locate calls, pick their template strings,
//! parse them with the grammar their call shape declares, and project
//! every classified span back to document coordinates.

use crate::call::find_call_ranges;
use crate::config::{Config, TemplateFlavor};
use crate::document::{Range, TextDocument, TextWindow};
use crate::literal::{StringKind, StringLiteral, scan_all_string_literals};
use crate::parser::{Classification, parse_expression};
use crate::template::{PropertyKind, SegmentKind, parse_template};

/// A classified span in document coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightRegion {
    pub classification: Classification,
    pub range: Range,
}

/// One template string found in a document, with its regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateString {
    pub flavor: TemplateFlavor,
    pub kind: StringKind,
    /// The whole literal, quotes and prefix included.
    pub range: Range,
    pub content: String,
    pub regions: Vec<HighlightRegion>,
}

/// Find and classify every template string in `doc`.
///
/// Interpolated literals are never templates: their holes belong to
/// the host language.
#[tracing::instrument(level = "debug", skip_all, fields(lines = doc.line_count()))]
pub fn highlight_document<D: TextDocument + ?Sized>(
    doc: &D,
    config: &Config,
) -> Vec<TemplateString> {
    let mut found = Vec::new();

    for call in find_call_ranges(doc, config) {
        let window = TextWindow::new(doc, call.start_line, call.end_line + 1);
        let literals = scan_all_string_literals(window.text());
        let mut claimed: Vec<usize> = Vec::new();

        for line in call.start_line..=call.end_line {
            let Some((shape, match_end)) = config.shapes.matching(doc.line_at(line)) else {
                continue;
            };
            let Some(line_start) = window.line_start(line) else {
                continue;
            };
            let anchor = line_start + match_end;
            if literals.iter().any(|lit| lit.start < anchor && anchor <= lit.end) {
                // The match sits inside another string's text.
                continue;
            }
            let Some(literal) = literals.iter().find(|lit| lit.start >= anchor) else {
                continue;
            };
            if literal.kind == StringKind::Interpolated || claimed.contains(&literal.start) {
                continue;
            }
            claimed.push(literal.start);
            found.push(template_string(&window, literal, shape.flavor));
        }
    }

    tracing::debug!(templates = found.len(), "highlighted");
    found
}

fn template_string(
    window: &TextWindow,
    literal: &StringLiteral,
    flavor: TemplateFlavor,
) -> TemplateString {
    let project = |classification: Classification, start: usize, end: usize| HighlightRegion {
        classification,
        range: window.range_of(literal.content_start + start, literal.content_start + end),
    };

    let regions = match flavor {
        TemplateFlavor::Message => parse_template(&literal.content)
            .into_iter()
            .flat_map(|property| {
                let name_class = if property.kind == PropertyKind::Positional {
                    Classification::Number
                } else {
                    Classification::Property
                };
                property
                    .segments()
                    .into_iter()
                    .map(move |segment| {
                        let classification = match segment.kind {
                            SegmentKind::OpenBrace | SegmentKind::CloseBrace => {
                                Classification::Brace
                            }
                            SegmentKind::Operator => Classification::CaptureOperator,
                            SegmentKind::Name => name_class,
                            SegmentKind::Alignment => Classification::Alignment,
                            SegmentKind::Format => Classification::Format,
                        };
                        (classification, segment.span)
                    })
            })
            .map(|(classification, span)| project(classification, span.start, span.end))
            .collect(),
        TemplateFlavor::Expression => parse_expression(&literal.content)
            .into_iter()
            .map(|region| project(region.classification, region.start_index, region.end_index))
            .collect(),
    };

    TemplateString {
        flavor,
        kind: literal.kind,
        range: window.range_of(literal.start, literal.end + 1),
        content: literal.content.clone(),
        regions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Position};

    #[test]
    fn message_template_regions() {
        let doc = Document::new("log.Information(\"Hi {@User}\", user);");
        let found = highlight_document(&doc, &Config::default());
        assert_eq!(found.len(), 1);
        let classes: Vec<_> = found[0].regions.iter().map(|r| r.classification).collect();
        assert_eq!(
            classes,
            [
                Classification::Brace,
                Classification::CaptureOperator,
                Classification::Property,
                Classification::Brace
            ]
        );
        assert_eq!(found[0].regions[2].range.start, Position::new(0, 22));
    }

    #[test]
    fn expression_template_flavor() {
        let doc = Document::new("var f = new ExpressionTemplate(\"{@l} {@m}\");");
        let found = highlight_document(&doc, &Config::default());
        assert_eq!(found[0].flavor, TemplateFlavor::Expression);
        assert!(
            found[0]
                .regions
                .iter()
                .any(|r| r.classification == Classification::BuiltIn)
        );
    }

    #[test]
    fn interpolated_strings_are_skipped() {
        let doc = Document::new("log.Information($\"Hi {user}\");");
        assert!(highlight_document(&doc, &Config::default()).is_empty());
    }
}
