#![allow(dead_code)]

use logtemplate_rs::{
    BracePair, Classification, ClassifiedRegion, Config, Document, Position, Range,
    find_brace_match,
};

pub fn doc(text: &str) -> Document {
    Document::new(text)
}

pub fn classes(regions: &[ClassifiedRegion]) -> Vec<Classification> {
    regions.iter().map(|r| r.classification).collect()
}

pub fn count(regions: &[ClassifiedRegion], classification: Classification) -> usize {
    regions
        .iter()
        .filter(|r| r.classification == classification)
        .count()
}

/// Text covered by each region of a given class, in order.
pub fn texts_of<'a>(
    content: &'a str,
    regions: &[ClassifiedRegion],
    classification: Classification,
) -> Vec<&'a str> {
    regions
        .iter()
        .filter(|r| r.classification == classification)
        .map(|r| &content[r.start_index..r.end_index])
        .collect()
}

/// One-character range at `line:character`.
pub fn char_at(line: usize, character: usize) -> Range {
    Range::new(
        Position::new(line, character),
        Position::new(line, character + 1),
    )
}

/// Match the brace at `line:character`, panicking with context when
/// none is found.
pub fn expect_match(text: &str, line: usize, character: usize) -> BracePair {
    let document = doc(text);
    find_brace_match(&document, Position::new(line, character), &Config::default())
        .unwrap_or_else(|| {
            panic!("no brace match at {line}:{character}\n--- text ---\n{text}")
        })
}
