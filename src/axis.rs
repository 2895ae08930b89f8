//! Time axis tick policy and label formatting.
//!
//! The tick policy maps the length of the visible window to a major tick
//! interval and a label format. Labels are rendered against a fixed
//! reference epoch; only the spacing and format react to zoom.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, TimeDelta, Utc};

use crate::view::{Range, TimeRange};

/// Seconds in one hour.
pub const HOUR: f64 = 60.0 * 60.0;
/// Seconds in one day.
pub const DAY: f64 = 24.0 * HOUR;

/// Buckets checked from the largest window down; the first strict match wins.
const TICK_BUCKETS: [(f64, f64, LabelFormat); 5] = [
    (12.0 * DAY, 4.0 * DAY, LabelFormat::Day),
    (5.0 * DAY, 2.0 * DAY, LabelFormat::Day),
    (2.0 * DAY, DAY, LabelFormat::Day),
    (20.0 * HOUR, 12.0 * HOUR, LabelFormat::DayHour),
    (8.0 * HOUR, 4.0 * HOUR, LabelFormat::DayHour),
];

const FALLBACK_TICK: (f64, LabelFormat) = (2.0 * HOUR, LabelFormat::DayHourMinute);

/// Error returned when a visible window has no positive length.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
#[error("visible range length must be positive and finite, got {length}")]
pub struct InvalidRangeError {
    /// Offending length in seconds.
    pub length: f64,
}

/// Granularity of tick label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LabelFormat {
    /// Date only, e.g. `Mar 05`.
    Day,
    /// Date and hour, e.g. `Mar 05\n1 PM`.
    DayHour,
    /// Date, hour and minute, e.g. `Mar 05\n1:30 PM`.
    DayHourMinute,
}

impl LabelFormat {
    /// strftime-style pattern used to render labels.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Day => "%b %d",
            Self::DayHour => "%b %d\n%-I %p",
            Self::DayHourMinute => "%b %d\n%-I:%M %p",
        }
    }
}

/// Major tick spacing and label format for a visible window.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSpec {
    /// Spacing between major ticks, in seconds.
    pub interval_seconds: f64,
    /// Label format bound to the ticks.
    pub label_format: LabelFormat,
}

impl TickSpec {
    /// Major tick offsets inside the range.
    ///
    /// Ticks are integer multiples of the interval, anchored at the
    /// reference epoch (offset zero).
    pub fn major_ticks(&self, range: TimeRange) -> impl Iterator<Item = f64> + use<> {
        let step = self.interval_seconds;
        let (first, last) = step_bounds(range, step).unwrap_or(EMPTY_STEPS);
        (first..=last)
            .map(move |k| k as f64 * step)
            .filter(move |tick| range.as_range().contains(*tick))
    }

    /// Minor tick offsets inside the range, `per_interval` between each
    /// pair of major ticks. Positions coinciding with major ticks are skipped.
    pub fn minor_ticks(
        &self,
        range: TimeRange,
        per_interval: u32,
    ) -> impl Iterator<Item = f64> + use<> {
        let divisions = i64::from(per_interval) + 1;
        let step = self.interval_seconds / divisions as f64;
        let (first, last) = if per_interval == 0 {
            EMPTY_STEPS
        } else {
            step_bounds(range, step).unwrap_or(EMPTY_STEPS)
        };
        (first..=last)
            .filter(move |k| k.rem_euclid(divisions) != 0)
            .map(move |k| k as f64 * step)
            .filter(move |tick| range.as_range().contains(*tick))
    }
}

/// Upper bound on ticks enumerated for one window.
pub const MAX_TICKS: i64 = 10_000;

const EMPTY_STEPS: (i64, i64) = (1, 0);

/// Inclusive multiplier bounds of `step` inside the range, or `None` when the
/// window lies beyond exact integer range or would need more than
/// [`MAX_TICKS`] steps.
fn step_bounds(range: TimeRange, step: f64) -> Option<(i64, i64)> {
    // 2^53: beyond this f64 no longer holds every integer
    const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;
    if !step.is_finite() || step <= 0.0 {
        return None;
    }
    let first = (range.start() / step).ceil();
    let last = (range.end() / step).floor();
    if !(first.abs() <= EXACT_LIMIT && last.abs() <= EXACT_LIMIT) {
        return None;
    }
    let (first, last) = (first as i64, last as i64);
    if last - first >= MAX_TICKS {
        tracing::debug!(
            target: "liveplot.axis",
            first,
            last,
            step,
            "tick enumeration skipped, window too wide for interval"
        );
        return None;
    }
    Some((first, last))
}

/// Compute the tick spacing and label format for a visible window length.
///
/// Boundary lengths fall into the next smaller bucket: exactly twelve days
/// yields a two-day interval.
pub fn compute_tick_spec(visible_length: f64) -> Result<TickSpec, InvalidRangeError> {
    if !visible_length.is_finite() || visible_length <= 0.0 {
        return Err(InvalidRangeError {
            length: visible_length,
        });
    }
    let (interval_seconds, label_format) = TICK_BUCKETS
        .iter()
        .find(|(threshold, _, _)| visible_length > *threshold)
        .map(|(_, interval, format)| (*interval, *format))
        .unwrap_or(FALLBACK_TICK);
    tracing::trace!(
        target: "liveplot.axis",
        visible_length,
        interval_seconds,
        ?label_format,
        "tick spec computed"
    );
    Ok(TickSpec {
        interval_seconds,
        label_format,
    })
}

/// Renders tick offsets as calendar text relative to a reference epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLabelFormatter {
    reference: DateTime<Utc>,
    offset: FixedOffset,
}

impl TimeLabelFormatter {
    /// Create a formatter rendering labels in UTC.
    pub fn new(reference: DateTime<Utc>) -> Self {
        Self {
            reference,
            offset: Utc.fix(),
        }
    }

    /// Render labels in the given fixed UTC offset.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Access the reference epoch.
    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    /// Absolute instant for an offset in seconds from the reference epoch.
    pub fn instant_at(&self, elapsed_seconds: f64) -> Option<DateTime<Utc>> {
        if !elapsed_seconds.is_finite() {
            return None;
        }
        let millis = (elapsed_seconds * 1000.0).round();
        if millis.abs() >= i64::MAX as f64 {
            return None;
        }
        let delta = TimeDelta::try_milliseconds(millis as i64)?;
        self.reference.checked_add_signed(delta)
    }

    /// Format an offset with the given label format.
    ///
    /// Offsets outside the representable calendar fall back to raw seconds.
    pub fn format(&self, elapsed_seconds: f64, format: LabelFormat) -> String {
        match self.instant_at(elapsed_seconds) {
            Some(instant) => instant
                .with_timezone(&self.offset)
                .format(format.pattern())
                .to_string(),
            None => format!("{elapsed_seconds:.0}"),
        }
    }
}

/// Formatter for axis tick labels.
#[derive(Clone, Default)]
pub enum AxisFormatter {
    /// Default numeric formatter.
    #[default]
    Default,
    /// Calendar formatter bound to a label format.
    Time(TimeLabelFormatter, LabelFormat),
    /// Custom formatter callback.
    Custom(Arc<dyn Fn(f64) -> String + Send + Sync>),
}

impl AxisFormatter {
    /// Format a value for display.
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Default => format!("{value:.6}"),
            Self::Time(formatter, format) => formatter.format(value, *format),
            Self::Custom(formatter) => formatter(value),
        }
    }
}

impl std::fmt::Debug for AxisFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "AxisFormatter::Default"),
            Self::Time(_, format) => write!(f, "AxisFormatter::Time({format:?})"),
            Self::Custom(_) => write!(f, "AxisFormatter::Custom(..)"),
        }
    }
}

/// Axis configuration.
#[derive(Debug, Clone, Default)]
pub struct AxisConfig {
    title: Option<String>,
    label_exclusion: Option<Range>,
    formatter: AxisFormatter,
}

impl AxisConfig {
    /// Create an axis with the default numeric formatter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the axis title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the axis formatter.
    pub fn with_formatter(mut self, formatter: AxisFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Replace the formatter in place.
    pub(crate) fn set_formatter(&mut self, formatter: AxisFormatter) {
        self.formatter = formatter;
    }

    /// Access the axis title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Access the formatter.
    pub fn formatter(&self) -> &AxisFormatter {
        &self.formatter
    }

    /// Range excluded from labeling, if any.
    pub fn label_exclusion(&self) -> Option<Range> {
        self.label_exclusion
    }

    /// Suppress labels for values inside the range.
    pub fn with_label_exclusion(mut self, range: Range) -> Self {
        self.label_exclusion = Some(range);
        self
    }

    /// Format a tick value, or `None` when it falls in the exclusion range.
    pub fn label(&self, value: f64) -> Option<String> {
        match self.label_exclusion {
            Some(excluded) if excluded.contains(value) => None,
            _ => Some(self.formatter.format(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn expected_tick(interval_seconds: f64, label_format: LabelFormat) -> TickSpec {
        TickSpec {
            interval_seconds,
            label_format,
        }
    }

    #[test]
    fn buckets_follow_visible_length() {
        let cases = [
            (30.0 * DAY, expected_tick(4.0 * DAY, LabelFormat::Day)),
            (7.0 * DAY, expected_tick(2.0 * DAY, LabelFormat::Day)),
            (3.0 * DAY, expected_tick(DAY, LabelFormat::Day)),
            (DAY, expected_tick(12.0 * HOUR, LabelFormat::DayHour)),
            (10.0 * HOUR, expected_tick(4.0 * HOUR, LabelFormat::DayHour)),
            (HOUR, expected_tick(2.0 * HOUR, LabelFormat::DayHourMinute)),
            (1.0, expected_tick(2.0 * HOUR, LabelFormat::DayHourMinute)),
        ];
        for (length, expected) in cases {
            assert_eq!(compute_tick_spec(length).unwrap(), expected, "{length}");
        }
    }

    #[test]
    fn boundaries_fall_to_smaller_bucket() {
        assert_eq!(
            compute_tick_spec(12.0 * DAY).unwrap(),
            expected_tick(2.0 * DAY, LabelFormat::Day)
        );
        assert_eq!(
            compute_tick_spec(5.0 * DAY).unwrap(),
            expected_tick(DAY, LabelFormat::Day)
        );
        assert_eq!(
            compute_tick_spec(2.0 * DAY).unwrap(),
            expected_tick(12.0 * HOUR, LabelFormat::DayHour)
        );
        assert_eq!(
            compute_tick_spec(20.0 * HOUR).unwrap(),
            expected_tick(4.0 * HOUR, LabelFormat::DayHour)
        );
        assert_eq!(
            compute_tick_spec(8.0 * HOUR).unwrap(),
            expected_tick(2.0 * HOUR, LabelFormat::DayHourMinute)
        );
    }

    #[test]
    fn non_positive_length_is_rejected() {
        assert_eq!(
            compute_tick_spec(0.0),
            Err(InvalidRangeError { length: 0.0 })
        );
        assert!(compute_tick_spec(-DAY).is_err());
        assert!(compute_tick_spec(f64::INFINITY).is_err());
    }

    #[test]
    fn major_ticks_are_multiples_of_interval() {
        let tick = expected_tick(DAY, LabelFormat::Day);
        let range = TimeRange::new(0.5 * DAY, 3.0 * DAY).unwrap();
        let ticks: Vec<f64> = tick.major_ticks(range).collect();
        assert_eq!(ticks, vec![DAY, 2.0 * DAY, 3.0 * DAY]);
    }

    #[test]
    fn major_ticks_cover_negative_offsets() {
        let tick = expected_tick(2.0 * HOUR, LabelFormat::DayHourMinute);
        let range = TimeRange::new(-4.0 * HOUR, 4.0 * HOUR).unwrap();
        let ticks: Vec<f64> = tick.major_ticks(range).collect();
        assert_eq!(ticks, vec![-4.0 * HOUR, -2.0 * HOUR, 0.0]);
    }

    #[test]
    fn far_away_window_yields_no_stray_ticks() {
        let tick = expected_tick(4.0 * DAY, LabelFormat::Day);
        let range = TimeRange::new(-1e300, 1.0).unwrap();
        assert!(tick.major_ticks(range).all(|t| range.as_range().contains(t)));
        assert_eq!(tick.major_ticks(range).count(), 0);
        assert_eq!(tick.minor_ticks(range, 4).count(), 0);
    }

    #[test]
    fn oversized_window_is_capped() {
        let tick = expected_tick(4.0 * DAY, LabelFormat::Day);
        let range = TimeRange::new(0.0, 1e18).unwrap();
        assert_eq!(tick.major_ticks(range).count(), 0);
        let wide = TimeRange::new(0.0, (MAX_TICKS - 1) as f64 * 4.0 * DAY).unwrap();
        assert_eq!(tick.major_ticks(wide).count(), MAX_TICKS as usize);
    }

    #[test]
    fn minor_ticks_skip_majors() {
        let tick = expected_tick(4.0 * HOUR, LabelFormat::DayHour);
        let range = TimeRange::new(0.0, 4.0 * HOUR).unwrap();
        let minors: Vec<f64> = tick.minor_ticks(range, 3).collect();
        assert_eq!(minors, vec![HOUR, 2.0 * HOUR, 3.0 * HOUR]);
        assert_eq!(tick.minor_ticks(range, 0).count(), 0);
    }

    #[test]
    fn labels_render_against_reference() {
        let reference = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let formatter = TimeLabelFormatter::new(reference);
        let elapsed = 4.0 * DAY + 13.5 * HOUR;
        assert_eq!(formatter.format(elapsed, LabelFormat::Day), "Mar 05");
        assert_eq!(formatter.format(elapsed, LabelFormat::DayHour), "Mar 05\n1 PM");
        assert_eq!(
            formatter.format(elapsed, LabelFormat::DayHourMinute),
            "Mar 05\n1:30 PM"
        );
    }

    #[test]
    fn labels_respect_offset() {
        let reference = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let formatter = TimeLabelFormatter::new(reference).with_offset(offset);
        assert_eq!(formatter.format(0.0, LabelFormat::DayHour), "Feb 29\n7 PM");
    }

    #[test]
    fn unrepresentable_offsets_fall_back_to_seconds() {
        let reference = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let formatter = TimeLabelFormatter::new(reference);
        assert_eq!(formatter.format(1e300, LabelFormat::Day), format!("{:.0}", 1e300));
    }

    #[test]
    fn axis_label_exclusion() {
        let axis = AxisConfig::new()
            .with_formatter(AxisFormatter::Custom(Arc::new(|v| format!("{v:.1}"))))
            .with_label_exclusion(Range::new(-11.0, -0.5));
        assert_eq!(axis.label(-3.0), None);
        assert_eq!(axis.label(2.0).as_deref(), Some("2.0"));
    }
}
