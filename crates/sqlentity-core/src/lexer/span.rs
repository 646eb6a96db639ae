//! Byte ranges into the statement text.

use std::fmt;

/// A half-open byte range `start..end` into the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the smallest span covering both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns the text the span covers, if it lies within `input`.
    #[must_use]
    pub fn slice(self, input: &str) -> Option<&str> {
        input.get(self.start..self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_order_independent() {
        let table = Span::new(13, 20);
        let column = Span::new(22, 30);
        assert_eq!(table.merge(column), Span::new(13, 30));
        assert_eq!(column.merge(table), Span::new(13, 30));
    }

    #[test]
    fn test_slice_and_display() {
        let sql = "DROP TABLE Persons";
        assert_eq!(Span::new(11, 18).slice(sql), Some("Persons"));
        assert_eq!(Span::new(11, 40).slice(sql), None);
        assert_eq!(Span::new(5, 10).to_string(), "5..10");
    }
}
