//! Visible windows and value ranges.

use crate::axis::InvalidRangeError;

/// Numeric range with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Range {
    /// Create a new range, swapping bounds if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// Create a range from a start value and a length.
    pub fn from_start_length(start: f64, length: f64) -> Self {
        Self::new(start, start + length)
    }

    /// Span of the range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Check whether both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Check whether the range has positive span and finite bounds.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.span() > 0.0
    }

    /// Check whether a value lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Visible window on the time axis, in seconds relative to a reference epoch.
///
/// `start` may be negative when the host pans before the epoch. `length` is
/// always positive for ranges built through [`TimeRange::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeRange {
    start: f64,
    length: f64,
}

impl TimeRange {
    /// Create a visible window, rejecting non-positive or non-finite lengths.
    pub fn new(start: f64, length: f64) -> Result<Self, InvalidRangeError> {
        if !start.is_finite() || !length.is_finite() || length <= 0.0 {
            return Err(InvalidRangeError { length });
        }
        Ok(Self { start, length })
    }

    /// Window start in seconds.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Window length in seconds.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Window end in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.length
    }

    /// The window as an inclusive value range.
    pub fn as_range(&self) -> Range {
        Range::new(self.start, self.end())
    }
}

impl TryFrom<Range> for TimeRange {
    type Error = InvalidRangeError;

    fn try_from(range: Range) -> Result<Self, Self::Error> {
        Self::new(range.min, range.span())
    }
}

/// Visible data ranges on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    /// X axis range, in seconds relative to the reference epoch.
    pub x: Range,
    /// Y axis range.
    pub y: Range,
}

impl Viewport {
    /// Create a viewport from X and Y ranges.
    pub fn new(x: Range, y: Range) -> Self {
        Self { x, y }
    }

    /// Check whether both axes are valid.
    pub fn is_valid(&self) -> bool {
        self.x.is_valid() && self.y.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_range_rejects_empty_window() {
        assert!(TimeRange::new(0.0, 0.0).is_err());
        assert!(TimeRange::new(10.0, -1.0).is_err());
        assert!(TimeRange::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn time_range_allows_negative_start() {
        let range = TimeRange::new(-3600.0, 7200.0).unwrap();
        assert_eq!(range.end(), 3600.0);
        assert_eq!(range.as_range(), Range::new(-3600.0, 3600.0));
    }

    #[test]
    fn range_conversion_uses_span() {
        let range = TimeRange::try_from(Range::new(50.0, 10.0)).unwrap();
        assert_eq!(range.start(), 10.0);
        assert_eq!(range.length(), 40.0);
    }
}
