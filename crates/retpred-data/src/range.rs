//! Inclusive period ranges.
//!
//! Bounds follow label semantics on a sorted integer index: a bound does not
//! have to exist as a row, so `..=201214` selects every period through `201212`.

use crate::error::{DataError, Result};
use std::fmt;

/// Inclusive, optionally open-ended range of year-month periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodRange {
    start: Option<i64>,
    end: Option<i64>,
}

impl PeriodRange {
    /// Range covering every period.
    pub const fn all() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Range `[start:end]`, both inclusive.
    pub const fn between(start: i64, end: i64) -> Result<Self> {
        if start > end {
            return Err(DataError::InvalidDateRange { start, end });
        }
        Ok(Self {
            start: Some(start),
            end: Some(end),
        })
    }

    /// Range `[start:]`.
    pub const fn starting(start: i64) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Range `[:end]`.
    pub const fn ending(end: i64) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// Build a range from optional bounds.
    pub fn new(start: Option<i64>, end: Option<i64>) -> Result<Self> {
        match (start, end) {
            (Some(s), Some(e)) => Self::between(s, e),
            _ => Ok(Self { start, end }),
        }
    }

    /// Lower bound, if any.
    pub const fn start(&self) -> Option<i64> {
        self.start
    }

    /// Upper bound, if any.
    pub const fn end(&self) -> Option<i64> {
        self.end
    }

    /// Whether `period` falls inside the range.
    pub fn contains(&self, period: i64) -> bool {
        self.start.is_none_or(|s| period >= s) && self.end.is_none_or(|e| period <= e)
    }

    /// Intersection of two ranges.
    ///
    /// Narrowing `[a:]` by `[:b]` gives `[a:b]`; disjoint ranges are an error.
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        let start = match (self.start, other.start) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self::new(start, end)
    }
}

impl fmt::Display for PeriodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_bound = |b: Option<i64>| b.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "[{}:{}]", fmt_bound(self.start), fmt_bound(self.end))
    }
}
