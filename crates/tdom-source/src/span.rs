use serde::Serialize;

/// A contiguous byte range within a piece of text.
///
/// Offsets are relative to whatever text the producer scanned — the markup
/// scanner emits spans relative to a template body, the rule engine shifts
/// them to be relative to the enclosing string literal token, and the CLI
/// shifts them again to file offsets before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    start: u32,
    length: u32,
}

impl Span {
    #[must_use]
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    #[must_use]
    pub fn from_parts(start: usize, length: usize) -> Self {
        let start_u32 = u32::try_from(start).unwrap_or(u32::MAX);
        let length_u32 = u32::try_from(length).unwrap_or(u32::MAX.saturating_sub(start_u32));
        Span::new(start_u32, length_u32)
    }

    /// Construct a span from integer bounds expressed as byte offsets.
    #[must_use]
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self::from_parts(start, end.saturating_sub(start))
    }

    /// Shift the span right by `offset` bytes, preserving its length.
    #[must_use]
    pub fn shift(self, offset: u32) -> Self {
        Self::new(self.start.saturating_add(offset), self.length)
    }

    #[must_use]
    pub fn start(self) -> u32 {
        self.start
    }

    #[must_use]
    pub fn start_usize(self) -> usize {
        self.start as usize
    }

    #[must_use]
    pub fn end(self) -> u32 {
        self.start.saturating_add(self.length)
    }

    #[must_use]
    pub fn end_usize(self) -> usize {
        self.end() as usize
    }

    #[must_use]
    pub fn length(self) -> u32 {
        self.length
    }

    #[must_use]
    pub fn length_usize(self) -> usize {
        self.length as usize
    }

    #[must_use]
    pub fn contains(self, offset: u32) -> bool {
        offset >= self.start && offset < self.end()
    }

    /// Like [`Span::contains`], but also accepts the end position — useful
    /// for cursor checks where "just after the last char" still counts.
    #[must_use]
    pub fn contains_inclusive(self, offset: u32) -> bool {
        offset >= self.start && offset <= self.end()
    }

    #[must_use]
    pub fn as_tuple(self) -> (u32, u32) {
        (self.start, self.length)
    }
}
