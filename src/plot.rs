//! Host-facing plot session.
//!
//! [`TimePlot`] owns the reference epoch, the visible window, the current
//! tick spec and the highlight controller. Hosts forward their pan/zoom and
//! tap events to it and apply the returned values to their own rendering
//! surface.

use chrono::{DateTime, FixedOffset, Offset, TimeDelta, Utc};

use crate::axis::{AxisConfig, AxisFormatter, TickSpec, TimeLabelFormatter, compute_tick_spec};
use crate::config::TimePlotConfig;
use crate::error::Result;
use crate::geom::Point;
use crate::highlight::{CurveHighlightController, CurveStates};
use crate::series::CurveName;
use crate::style::Theme;
use crate::timer::Scheduler;
use crate::view::{Range, TimeRange, Viewport};

/// Plot axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisId {
    /// Time axis.
    X,
    /// Value axis.
    Y,
}

/// Result of a tap on a curve's data point.
#[derive(Debug, Clone, PartialEq)]
pub struct TapResponse {
    /// Updated visual states for every curve.
    pub states: CurveStates,
    /// Tapped curve, used as annotation text.
    pub curve: CurveName,
    /// Data-space point the annotation is anchored to.
    pub anchor: Point,
}

/// Interactive time-series plot session.
pub struct TimePlot<S: Scheduler> {
    config: TimePlotConfig,
    labels: TimeLabelFormatter,
    viewport: Viewport,
    tick: TickSpec,
    x_axis: AxisConfig,
    y_axis: AxisConfig,
    highlight: CurveHighlightController<S>,
}

impl<S: Scheduler> TimePlot<S> {
    /// Create a session activated at the current time.
    pub fn new(config: TimePlotConfig, scheduler: S) -> Result<Self> {
        Self::with_theme(config, Theme::default(), scheduler)
    }

    /// Create a session with a custom theme, activated at the current time.
    pub fn with_theme(config: TimePlotConfig, theme: Theme, scheduler: S) -> Result<Self> {
        let highlight = CurveHighlightController::new(scheduler)
            .with_theme(theme)
            .with_revert_delay(config.revert_delay);
        Self::with_controller(config, highlight)
    }

    /// Create a session around an existing highlight controller.
    pub fn with_controller(
        config: TimePlotConfig,
        highlight: CurveHighlightController<S>,
    ) -> Result<Self> {
        let initial_x = TimeRange::try_from(config.initial_x)?;
        let tick = compute_tick_spec(initial_x.length())?;
        let labels = TimeLabelFormatter::new(Utc::now());
        let mut y_axis = AxisConfig::new().with_title("Value");
        if let Some(excluded) = config.y_label_exclusion {
            y_axis = y_axis.with_label_exclusion(excluded);
        }
        let mut plot = Self {
            viewport: Viewport::new(config.initial_x, config.initial_y),
            tick,
            labels,
            x_axis: AxisConfig::new().with_title("Time"),
            y_axis,
            highlight,
            config,
        };
        plot.activate(Utc::now());
        Ok(plot)
    }

    /// Start a new session at `now`.
    ///
    /// Places the reference epoch `reference_lookback` before `now` and
    /// restores the initial view. The epoch stays fixed until the next
    /// activation.
    pub fn activate(&mut self, now: DateTime<Utc>) {
        let reference = TimeDelta::from_std(self.config.reference_lookback)
            .ok()
            .and_then(|lookback| now.checked_sub_signed(lookback))
            .unwrap_or(now);
        let offset = FixedOffset::east_opt(self.config.utc_offset_seconds).unwrap_or(Utc.fix());
        self.labels = TimeLabelFormatter::new(reference).with_offset(offset);
        tracing::debug!(target: "liveplot.plot", %reference, "plot activated");
        self.reset_view();
    }

    /// Restore the initial viewport and its tick spec.
    pub fn reset_view(&mut self) -> TickSpec {
        self.viewport = Viewport::new(self.config.initial_x, self.config.initial_y);
        // initial_x was validated at construction
        let tick = compute_tick_spec(self.config.initial_x.span()).unwrap_or(self.tick);
        self.apply_tick(tick);
        tick
    }

    /// Handle a change of the visible time window.
    pub fn on_visible_range_changed(&mut self, range: TimeRange) -> Result<TickSpec> {
        let tick = compute_tick_spec(range.length())?;
        self.viewport.x = range.as_range();
        self.apply_tick(tick);
        tracing::debug!(
            target: "liveplot.plot",
            start = range.start(),
            length = range.length(),
            interval = tick.interval_seconds,
            "visible range changed"
        );
        Ok(tick)
    }

    /// Filter a proposed range change from the host's pan/zoom gesture.
    ///
    /// X proposals are accepted; Y proposals are refused and the current Y
    /// range is returned, keeping interaction on the time axis only.
    pub fn propose_range(&mut self, axis: AxisId, proposed: Range) -> Result<Range> {
        match axis {
            AxisId::X => {
                let range = TimeRange::try_from(proposed)?;
                self.on_visible_range_changed(range)?;
                Ok(self.viewport.x)
            }
            AxisId::Y => Ok(self.viewport.y),
        }
    }

    /// Handle a tap on a data point of `curve`.
    ///
    /// The annotation anchor is echoed back; positioning it on screen is the
    /// host's concern.
    pub fn on_curve_tapped(&self, curve: &str, point: Point) -> Result<TapResponse> {
        let states = self.highlight.select(curve)?;
        let curve = states
            .highlighted()
            .cloned()
            .unwrap_or_else(|| CurveName::new(curve));
        Ok(TapResponse {
            states,
            curve,
            anchor: point,
        })
    }

    /// Register a curve before its data is plotted. Returns its palette slot.
    pub fn register_curve(&self, name: impl Into<CurveName>) -> usize {
        self.highlight.register_curve(name)
    }

    fn apply_tick(&mut self, tick: TickSpec) {
        self.tick = tick;
        self.x_axis
            .set_formatter(AxisFormatter::Time(self.labels, tick.label_format));
    }

    fn visible_x(&self) -> Option<TimeRange> {
        TimeRange::try_from(self.viewport.x).ok()
    }

    /// Major tick offsets of the visible window.
    pub fn major_ticks(&self) -> Vec<f64> {
        self.visible_x()
            .map(|range| self.tick.major_ticks(range).collect())
            .unwrap_or_default()
    }

    /// Minor tick offsets of the visible window.
    pub fn minor_ticks(&self) -> Vec<f64> {
        self.visible_x()
            .map(|range| {
                self.tick
                    .minor_ticks(range, self.config.minor_ticks_per_interval)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Major ticks paired with their label text.
    pub fn tick_labels(&self) -> Vec<(f64, String)> {
        self.major_ticks()
            .into_iter()
            .filter_map(|tick| self.x_axis.label(tick).map(|label| (tick, label)))
            .collect()
    }

    /// Label for a Y value, or `None` when it is excluded.
    pub fn y_label(&self, value: f64) -> Option<String> {
        self.y_axis.label(value)
    }

    /// Seconds from the reference epoch to `instant`.
    pub fn to_seconds(&self, instant: DateTime<Utc>) -> f64 {
        let delta = instant.signed_duration_since(self.labels.reference());
        delta.num_milliseconds() as f64 / 1000.0
    }

    /// Access the reference epoch.
    pub fn reference_epoch(&self) -> DateTime<Utc> {
        self.labels.reference()
    }

    /// Access the current tick spec.
    pub fn tick_spec(&self) -> TickSpec {
        self.tick
    }

    /// Access the current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Access the X axis configuration.
    pub fn x_axis(&self) -> &AxisConfig {
        &self.x_axis
    }

    /// Access the Y axis configuration.
    pub fn y_axis(&self) -> &AxisConfig {
        &self.y_axis
    }

    /// Access the highlight controller.
    pub fn highlight(&self) -> &CurveHighlightController<S> {
        &self.highlight
    }

    /// Access the configuration.
    pub fn config(&self) -> &TimePlotConfig {
        &self.config
    }
}

impl<S: Scheduler + std::fmt::Debug> std::fmt::Debug for TimePlot<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimePlot")
            .field("reference", &self.labels.reference())
            .field("viewport", &self.viewport)
            .field("tick", &self.tick)
            .field("highlight", &self.highlight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;

    use super::*;
    use crate::axis::{DAY, HOUR, LabelFormat};
    use crate::error::Error;
    use crate::style::VisualState;
    use crate::timer::ManualScheduler;

    fn plot() -> TimePlot<ManualScheduler> {
        let mut plot = TimePlot::new(TimePlotConfig::default(), ManualScheduler::new()).unwrap();
        plot.activate(Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap());
        plot
    }

    #[test]
    fn activation_sets_reference_thirty_days_back() {
        let plot = plot();
        assert_eq!(
            plot.reference_epoch(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(
            plot.tick_spec(),
            TickSpec {
                interval_seconds: 4.0 * DAY,
                label_format: LabelFormat::Day,
            }
        );
    }

    #[test]
    fn zoom_updates_ticks_but_not_reference() {
        let mut plot = plot();
        let reference = plot.reference_epoch();
        let tick = plot
            .on_visible_range_changed(TimeRange::new(DAY, 10.0 * HOUR).unwrap())
            .unwrap();
        assert_eq!(tick.interval_seconds, 4.0 * HOUR);
        assert_eq!(tick.label_format, LabelFormat::DayHour);
        assert_eq!(plot.reference_epoch(), reference);
        assert_eq!(plot.major_ticks(), vec![DAY, DAY + 4.0 * HOUR, DAY + 8.0 * HOUR]);
    }

    #[test]
    fn labels_use_current_format() {
        let mut plot = plot();
        plot.on_visible_range_changed(TimeRange::new(0.0, 3.0 * DAY).unwrap())
            .unwrap();
        let labels = plot.tick_labels();
        assert_eq!(labels[0], (0.0, "Mar 01".to_owned()));
        plot.on_visible_range_changed(TimeRange::new(0.0, HOUR).unwrap())
            .unwrap();
        assert_eq!(plot.tick_labels()[0].1, "Mar 01\n12:00 PM");
    }

    #[test]
    fn y_proposals_are_refused() {
        let mut plot = plot();
        let kept = plot.propose_range(AxisId::Y, Range::new(0.0, 100.0)).unwrap();
        assert_eq!(kept, Range::new(-3.0, 11.0));
        let x = plot.propose_range(AxisId::X, Range::new(-DAY, DAY)).unwrap();
        assert_eq!(x, Range::new(-DAY, DAY));
        assert_eq!(plot.viewport().y, Range::new(-3.0, 11.0));
    }

    #[test]
    fn empty_x_proposal_is_rejected() {
        let mut plot = plot();
        let err = plot.propose_range(AxisId::X, Range::new(5.0, 5.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidRange(_)));
    }

    #[test]
    fn reset_view_restores_initial_window() {
        let mut plot = plot();
        plot.on_visible_range_changed(TimeRange::new(0.0, HOUR).unwrap())
            .unwrap();
        let tick = plot.reset_view();
        assert_eq!(tick.interval_seconds, 4.0 * DAY);
        assert_eq!(plot.viewport().x, Range::new(0.0, 30.0 * DAY));
    }

    #[test]
    fn tap_highlights_and_reverts() {
        let plot = plot();
        plot.register_curve("data1");
        plot.register_curve("data2");
        let response = plot
            .on_curve_tapped("data2", Point::new(25.0 * DAY, 7.0))
            .unwrap();
        assert_eq!(response.curve.as_str(), "data2");
        assert_eq!(response.anchor, Point::new(25.0 * DAY, 7.0));
        assert_eq!(response.states.get("data1"), Some(VisualState::Dimmed));
        plot.highlight().scheduler().advance(Duration::from_secs(2));
        assert!(plot.highlight().states().all_normal());
    }

    #[test]
    fn tap_on_unknown_curve_fails() {
        let plot = plot();
        plot.register_curve("data1");
        let err = plot.on_curve_tapped("data9", Point::new(0.0, 0.0)).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownCurve(crate::highlight::UnknownCurveError {
                name: "data9".to_owned()
            })
        );
    }

    #[test]
    fn seconds_are_relative_to_reference() {
        let plot = plot();
        let yesterday = Utc.with_ymd_and_hms(2024, 3, 30, 12, 0, 0).unwrap();
        assert_eq!(plot.to_seconds(yesterday), 29.0 * DAY);
    }

    #[test]
    fn y_labels_honor_exclusion() {
        let plot = plot();
        assert_eq!(plot.y_label(-2.0), None);
        assert!(plot.y_label(4.0).is_some());
    }
}
