//! Session configuration.

use std::time::Duration;

use crate::axis::DAY;
use crate::highlight::DEFAULT_REVERT_DELAY;
use crate::view::Range;

/// Configuration for a [`TimePlot`](crate::plot::TimePlot) session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimePlotConfig {
    /// How far before activation the reference epoch is placed.
    pub reference_lookback: Duration,
    /// Initial visible X window, in seconds from the reference epoch.
    pub initial_x: Range,
    /// Initial (and fixed) Y range.
    pub initial_y: Range,
    /// Y values whose labels are suppressed.
    pub y_label_exclusion: Option<Range>,
    /// Minor ticks drawn between consecutive major X ticks.
    pub minor_ticks_per_interval: u32,
    /// Delay before a highlighted curve reverts.
    pub revert_delay: Duration,
    /// UTC offset, in seconds east, used to render tick labels.
    pub utc_offset_seconds: i32,
}

impl Default for TimePlotConfig {
    fn default() -> Self {
        Self {
            reference_lookback: Duration::from_secs((30.0 * DAY) as u64),
            initial_x: Range::new(0.0, 30.0 * DAY),
            initial_y: Range::new(-3.0, 11.0),
            y_label_exclusion: Some(Range::new(-11.0, -0.5)),
            minor_ticks_per_interval: 4,
            revert_delay: DEFAULT_REVERT_DELAY,
            utc_offset_seconds: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_thirty_days() {
        let config = TimePlotConfig::default();
        assert_eq!(config.reference_lookback, Duration::from_secs(30 * 86_400));
        assert_eq!(config.initial_x.span(), 30.0 * DAY);
        assert_eq!(config.initial_y.span(), 14.0);
    }
}
