//! Tap-to-highlight curve selection with timed revert.
//!
//! Selecting a curve highlights it and dims every other known curve. A revert
//! timer returns all curves to normal after a fixed delay. Only the latest
//! selection's timer is ever live: a new selection cancels the previous one,
//! and a generation counter discards any revert that lost a race with its
//! cancellation.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use crate::render::Color;
use crate::series::{CurveName, CurveRegistry};
use crate::style::{CurveStyle, Theme, VisualState};
use crate::timer::{Scheduler, TimerHandle};

/// Delay before a selection reverts to all-normal.
pub const DEFAULT_REVERT_DELAY: Duration = Duration::from_secs(2);

/// Error returned when an operation names a curve that was never registered.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("curve `{name}` is not registered")]
pub struct UnknownCurveError {
    /// Name that failed to resolve.
    pub name: String,
}

impl UnknownCurveError {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

/// The live selection, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSession {
    /// Selected curve.
    pub curve: CurveName,
    /// When the selection happened.
    pub started_at: Instant,
}

/// Snapshot of every known curve's visual state, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CurveStates {
    entries: Vec<(CurveName, VisualState)>,
}

impl CurveStates {
    /// State of a curve, if it is known.
    pub fn get(&self, name: &str) -> Option<VisualState> {
        self.entries
            .iter()
            .find(|(curve, _)| curve.as_str() == name)
            .map(|(_, state)| *state)
    }

    /// Iterate over curves and their states.
    pub fn iter(&self) -> impl Iterator<Item = (&CurveName, VisualState)> {
        self.entries.iter().map(|(curve, state)| (curve, *state))
    }

    /// Number of curves.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no curve is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The highlighted curve, if a selection is live.
    pub fn highlighted(&self) -> Option<&CurveName> {
        self.entries
            .iter()
            .find(|(_, state)| *state == VisualState::Highlighted)
            .map(|(curve, _)| curve)
    }

    /// True when every curve is in the normal state.
    pub fn all_normal(&self) -> bool {
        self.entries
            .iter()
            .all(|(_, state)| *state == VisualState::Normal)
    }
}

/// Callback invoked after a timed revert, with the all-normal states.
///
/// The listener runs while the controller's state lock is held, so no
/// selection can slip in between the revert and its notification. It must
/// not call back into the controller.
pub type RevertListener = Arc<dyn Fn(&CurveStates) + Send + Sync>;

struct HighlightState<H> {
    registry: CurveRegistry,
    states: Vec<VisualState>,
    session: Option<HighlightSession>,
    pending: Option<H>,
    generation: u64,
    restyled: Vec<bool>,
}

impl<H> HighlightState<H> {
    fn new() -> Self {
        Self {
            registry: CurveRegistry::new(),
            states: Vec::new(),
            session: None,
            pending: None,
            generation: 0,
            restyled: Vec::new(),
        }
    }

    fn snapshot(&self) -> CurveStates {
        debug_assert_eq!(self.registry.len(), self.states.len());
        CurveStates {
            entries: self
                .registry
                .names()
                .iter()
                .cloned()
                .zip(self.states.iter().copied())
                .collect(),
        }
    }

    fn revert(&mut self) {
        self.pending = None;
        if self.session.take().is_some() {
            self.restyled.fill(true);
        }
        self.states.fill(VisualState::Normal);
    }

    fn index_of(&self, name: &str) -> Result<usize, UnknownCurveError> {
        self.registry
            .index_of(name)
            .ok_or_else(|| UnknownCurveError::new(name))
    }
}

/// Tracks the highlighted curve and schedules the automatic revert.
///
/// The state map is guarded by a mutex shared with the revert action, so
/// selections and reverts never interleave.
pub struct CurveHighlightController<S: Scheduler> {
    scheduler: S,
    theme: Theme,
    revert_delay: Duration,
    listener: Option<RevertListener>,
    state: Arc<Mutex<HighlightState<S::Handle>>>,
}

impl<S: Scheduler> CurveHighlightController<S> {
    /// Create a controller with the default theme and a two-second revert.
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            theme: Theme::default(),
            revert_delay: DEFAULT_REVERT_DELAY,
            listener: None,
            state: Arc::new(Mutex::new(HighlightState::new())),
        }
    }

    /// Use a different theme (and palette).
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Use a different revert delay.
    pub fn with_revert_delay(mut self, delay: Duration) -> Self {
        self.revert_delay = delay;
        self
    }

    /// Notify `listener` whenever the revert timer fires.
    ///
    /// See [`RevertListener`]: the listener must not call back into the
    /// controller.
    pub fn with_revert_listener(
        mut self,
        listener: impl Fn(&CurveStates) + Send + Sync + 'static,
    ) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// Access the theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Access the revert delay.
    pub fn revert_delay(&self) -> Duration {
        self.revert_delay
    }

    /// Access the scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    fn lock(&self) -> MutexGuard<'_, HighlightState<S::Handle>> {
        self.state.lock().expect("highlight state lock")
    }

    /// Register a curve and return its palette slot.
    ///
    /// Registering a known curve is a no-op. A curve registered while a
    /// selection is live starts dimmed.
    pub fn register_curve(&self, name: impl Into<CurveName>) -> usize {
        let name = name.into();
        let mut state = self.lock();
        let (index, added) = state.registry.register(name);
        if added {
            let initial = if state.session.is_some() {
                VisualState::Dimmed
            } else {
                VisualState::Normal
            };
            state.states.push(initial);
            state.restyled.push(initial == VisualState::Dimmed);
            tracing::debug!(
                target: "liveplot.highlight",
                curve = %state.registry.names()[index],
                index,
                "curve registered"
            );
        }
        self.theme.palette.slot_for(index)
    }

    /// Highlight `name`, dim every other curve, and restart the revert timer.
    pub fn select(&self, name: &str) -> Result<CurveStates, UnknownCurveError> {
        let mut state = self.lock();
        let target = state.index_of(name).inspect_err(|_| {
            tracing::debug!(target: "liveplot.highlight", curve = name, "select on unknown curve");
        })?;
        if let Some(previous) = state.pending.take() {
            previous.cancel();
        }
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;
        for (index, visual) in state.states.iter_mut().enumerate() {
            *visual = if index == target {
                VisualState::Highlighted
            } else {
                VisualState::Dimmed
            };
        }
        let curve = state.registry.names()[target].clone();
        state.session = Some(HighlightSession {
            curve,
            started_at: Instant::now(),
        });
        for (index, restyled) in state.restyled.iter_mut().enumerate() {
            *restyled |= index != target;
        }

        let weak = Arc::downgrade(&self.state);
        let listener = self.listener.clone();
        let handle = self.scheduler.schedule(
            self.revert_delay,
            Box::new(move || revert_if_current(&weak, generation, listener.as_ref())),
        );
        state.pending = Some(handle);
        tracing::debug!(
            target: "liveplot.highlight",
            curve = name,
            generation,
            delay_ms = self.revert_delay.as_millis() as u64,
            "curve highlighted"
        );
        Ok(state.snapshot())
    }

    /// Cancel any pending revert and return every curve to normal now.
    pub fn reset(&self) -> CurveStates {
        let mut state = self.lock();
        if let Some(pending) = state.pending.take() {
            pending.cancel();
        }
        state.generation = state.generation.wrapping_add(1);
        state.revert();
        tracing::debug!(target: "liveplot.highlight", "highlight reset");
        state.snapshot()
    }

    /// Snapshot of all curve states.
    pub fn states(&self) -> CurveStates {
        self.lock().snapshot()
    }

    /// State of one curve.
    pub fn state_of(&self, name: &str) -> Result<VisualState, UnknownCurveError> {
        let state = self.lock();
        let index = state.index_of(name)?;
        Ok(state.states[index])
    }

    /// The live selection, if any.
    pub fn session(&self) -> Option<HighlightSession> {
        self.lock().session.clone()
    }

    /// True while a revert timer is scheduled.
    pub fn has_pending_revert(&self) -> bool {
        self.lock()
            .pending
            .as_ref()
            .is_some_and(|handle| handle.is_pending())
    }

    /// True when `name` was registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.lock().registry.index_of(name).is_some()
    }

    /// Registered curves in registration order.
    pub fn curves(&self) -> Vec<CurveName> {
        self.lock().registry.names().to_vec()
    }

    /// Palette slot assigned to `name`.
    pub fn palette_slot(&self, name: &str) -> Result<usize, UnknownCurveError> {
        let index = self.lock().index_of(name)?;
        Ok(self.theme.palette.slot_for(index))
    }

    /// Full-alpha color of `name`.
    pub fn color_for(&self, name: &str) -> Result<Color, UnknownCurveError> {
        Ok(self.theme.palette.color(self.palette_slot(name)?))
    }

    /// Reduced-alpha color of `name`.
    pub fn dim_color_for(&self, name: &str) -> Result<Color, UnknownCurveError> {
        Ok(self.theme.palette.dim_color(self.palette_slot(name)?))
    }

    /// Stroke and marker styling for `name` in its current state.
    pub fn style_for(&self, name: &str) -> Result<CurveStyle, UnknownCurveError> {
        let state = self.lock();
        let index = state.index_of(name)?;
        let slot = self.theme.palette.slot_for(index);
        Ok(self
            .theme
            .curve_style(slot, state.states[index], state.restyled[index]))
    }
}

impl<S: Scheduler> Drop for CurveHighlightController<S> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(pending) = state.pending.take() {
                pending.cancel();
            }
        }
    }
}

impl<S: Scheduler + std::fmt::Debug> std::fmt::Debug for CurveHighlightController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveHighlightController")
            .field("scheduler", &self.scheduler)
            .field("revert_delay", &self.revert_delay)
            .field("states", &self.states())
            .finish_non_exhaustive()
    }
}

fn revert_if_current<H>(
    state: &Weak<Mutex<HighlightState<H>>>,
    generation: u64,
    listener: Option<&RevertListener>,
) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let mut guard = state.lock().expect("highlight state lock");
    if guard.generation != generation {
        tracing::trace!(
            target: "liveplot.highlight",
            generation,
            current = guard.generation,
            "stale revert ignored"
        );
        return;
    }
    guard.revert();
    tracing::debug!(target: "liveplot.highlight", generation, "highlight reverted");
    if let Some(listener) = listener {
        // held across the call: a select waiting on the lock lands after this notice
        listener(&guard.snapshot());
    }
}
