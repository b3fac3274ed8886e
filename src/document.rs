//! Line-addressable text sources and coordinate types.
//!
//! The scanners work on flat byte offsets, while editors speak in
//! line/column positions. A [`TextWindow`] joins a bounded run of
//! document lines into one buffer and translates between the two.

/// Zero-based line and byte column inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Half-open span between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether `pos` lies inside the range (end exclusive).
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// Abstract source of lines, as exposed by an editor buffer.
pub trait TextDocument {
    /// Number of lines in the document.
    fn line_count(&self) -> usize;

    /// Text of line `line` without its terminator. Out-of-range
    /// lines read as empty.
    fn line_at(&self, line: usize) -> &str;
}

/// Owned document split into lines.
///
/// Both `\n` and `\r\n` terminate a line; the terminator is not
/// part of the line text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self { lines }
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl TextDocument for Document {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_at(&self, line: usize) -> &str {
        self.lines.get(line).map_or("", String::as_str)
    }
}

impl<T: AsRef<str>> TextDocument for [T] {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_at(&self, line: usize) -> &str {
        self.get(line).map_or("", AsRef::as_ref)
    }
}

impl<T: AsRef<str>> TextDocument for Vec<T> {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_at(&self, line: usize) -> &str {
        self.get(line).map_or("", AsRef::as_ref)
    }
}

/// A contiguous run of document lines joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWindow {
    text: String,
    first_line: usize,
    line_starts: Vec<usize>,
}

impl TextWindow {
    /// Join lines `first..last` (exclusive, clamped to the document).
    pub fn new<D: TextDocument + ?Sized>(doc: &D, first: usize, last: usize) -> Self {
        let last = last.min(doc.line_count());
        let first = first.min(last);
        let mut text = String::new();
        let mut line_starts = Vec::with_capacity(last - first);
        for line in first..last {
            if line > first {
                text.push('\n');
            }
            line_starts.push(text.len());
            text.push_str(doc.line_at(line));
        }
        Self {
            text,
            first_line: first,
            line_starts,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn first_line(&self) -> usize {
        self.first_line
    }

    /// Number of document lines covered.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// One past the last covered document line.
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.first_line + self.line_starts.len()
    }

    /// Byte offset in the window where document line `line` starts.
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(self.first_line)
            .and_then(|idx| self.line_starts.get(idx).copied())
    }

    /// Byte offset in the window where document line `line` ends.
    #[must_use]
    pub fn line_end(&self, line: usize) -> Option<usize> {
        let idx = line.checked_sub(self.first_line)?;
        if idx >= self.line_starts.len() {
            return None;
        }
        Some(
            self.line_starts
                .get(idx + 1)
                .map_or(self.text.len(), |next| next - 1),
        )
    }

    /// Window offset for a document position, if the position's line
    /// is covered. Columns past the end of the line clamp to it.
    #[must_use]
    pub fn offset_of(&self, pos: Position) -> Option<usize> {
        let start = self.line_start(pos.line)?;
        let end = self.line_end(pos.line)?;
        Some((start + pos.character).min(end))
    }

    /// Document position of a window offset.
    #[must_use]
    pub fn position_of(&self, offset: usize) -> Position {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let start = self.line_starts.get(idx).copied().unwrap_or(0);
        Position {
            line: self.first_line + idx,
            character: offset.saturating_sub(start),
        }
    }

    /// Document range of the window span `start..end`.
    #[must_use]
    pub fn range_of(&self, start: usize, end: usize) -> Range {
        Range::new(self.position_of(start), self.position_of(end))
    }
}
