//! liveplot_timeaxis holds the rendering-independent core of an interactive
//! time-series plot: an adaptive time-axis tick policy and tap-to-highlight
//! curve selection with a timed revert.
//!
//! Hosts own the drawing surface. They forward visible-range changes and
//! curve taps to a [`TimePlot`] and apply the returned [`TickSpec`] and
//! [`CurveStates`] to whatever they render.

#![forbid(unsafe_code)]

pub mod axis;
pub mod config;
pub mod error;
pub mod geom;
pub mod highlight;
pub mod plot;
pub mod render;
pub mod series;
pub mod style;
pub mod timer;
pub mod view;

pub use axis::{
    AxisConfig, AxisFormatter, DAY, HOUR, InvalidRangeError, LabelFormat, MAX_TICKS, TickSpec,
    TimeLabelFormatter, compute_tick_spec,
};
pub use config::TimePlotConfig;
pub use error::{Error, Result};
pub use geom::Point;
pub use highlight::{
    CurveHighlightController, CurveStates, DEFAULT_REVERT_DELAY, HighlightSession,
    RevertListener, UnknownCurveError,
};
pub use plot::{AxisId, TapResponse, TimePlot};
pub use render::{Color, LineStyle, MarkerShape, MarkerStyle};
pub use series::CurveName;
pub use style::{CurveStyle, Palette, Theme, VisualState};
pub use timer::{
    Action, ManualScheduler, ManualTimerHandle, Scheduler, ThreadScheduler, ThreadTimerHandle,
    TimerHandle,
};
pub use view::{Range, TimeRange, Viewport};
