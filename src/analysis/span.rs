//! Row/column positions and spans
//!
//! Positions are 1-based exactly as the analyzer emits them. Conversion to
//! editor offsets happens outside this crate.
//!
//! @module analysis/span

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A 1-based (row, column) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.col.cmp(&other.col))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

/// Range of source text between two positions, both ends inclusive for containment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Build a span from raw analyzer fields.
    ///
    /// A missing end defaults to the start, which yields an empty span.
    pub fn from_parts(row: u32, col: u32, end_row: Option<u32>, end_col: Option<u32>) -> Self {
        let start = Position::new(row, col);
        let end = match (end_row, end_col) {
            (Some(end_row), Some(end_col)) => Position::new(end_row, end_col),
            (Some(end_row), None) => Position::new(end_row, col),
            (None, Some(end_col)) => Position::new(row, end_col),
            (None, None) => start,
        };
        Self { start, end }
    }

    /// An empty span sitting at a single position (a bare cursor)
    #[inline]
    pub const fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Row the span starts on; spans are bucketed by this row.
    #[inline]
    pub const fn row(&self) -> u32 {
        self.start.row
    }

    /// True when `other` lies entirely within this span.
    ///
    /// Both ends are inclusive so a cursor sitting just past the last
    /// character of a symbol still counts as being on it. Adjacent spans
    /// that merely touch a boundary do not contain each other unless one
    /// of them is empty.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when `position` lies within this span, ends inclusive.
    pub fn contains_position(&self, position: Position) -> bool {
        self.contains(&Span::point(position))
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
