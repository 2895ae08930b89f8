//! Curve palette and per-state styling.

use crate::render::{Color, LineStyle, MarkerShape, MarkerStyle};

/// Alpha applied to dimmed curves.
pub const DEFAULT_DIM_ALPHA: f32 = 0.3;

/// Fixed ordered list of curve colors, assigned round-robin.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    colors: Vec<Color>,
    dim_alpha: f32,
}

impl Palette {
    /// Create a palette. Returns `None` when `colors` is empty.
    pub fn new(colors: Vec<Color>) -> Option<Self> {
        if colors.is_empty() {
            return None;
        }
        Some(Self {
            colors,
            dim_alpha: DEFAULT_DIM_ALPHA,
        })
    }

    /// Set the alpha used for dimmed colors.
    pub fn with_dim_alpha(mut self, dim_alpha: f32) -> Self {
        self.dim_alpha = dim_alpha.clamp(0.0, 1.0);
        self
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; palettes have at least one slot.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Slot for the n-th registered curve.
    pub fn slot_for(&self, registration_index: usize) -> usize {
        registration_index % self.colors.len()
    }

    /// Full-alpha color at a slot, wrapping on overflow.
    pub fn color(&self, slot: usize) -> Color {
        self.colors[slot % self.colors.len()]
    }

    /// Reduced-alpha color at a slot, wrapping on overflow.
    pub fn dim_color(&self, slot: usize) -> Color {
        self.color(slot).with_alpha(self.dim_alpha)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![Color::CYAN, Color::MAGENTA, Color::MAGENTA],
            dim_alpha: DEFAULT_DIM_ALPHA,
        }
    }
}

/// Visual state of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VisualState {
    /// No selection is active.
    #[default]
    Normal,
    /// The selected curve.
    Highlighted,
    /// Any other curve while a selection is active.
    Dimmed,
}

/// Stroke and marker styling for one curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveStyle {
    /// Line stroke.
    pub line: LineStyle,
    /// Data point marker.
    pub marker: MarkerStyle,
}

/// Visual theme for plots.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Curve palette.
    pub palette: Palette,
    /// Stroke width of curves that have never been selected.
    pub line_width: f32,
    /// Stroke width once a selection has happened.
    pub selected_line_width: f32,
    /// Marker size of curves that have never been selected.
    pub marker_size: f32,
    /// Marker size once a selection has happened.
    pub selected_marker_size: f32,
}

impl Theme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Styling for a curve at `slot` in `state`.
    ///
    /// `restyled` is false until the curve is first dimmed or reverted.
    /// Such curves keep the wide stroke and diamond markers; a first
    /// highlight only shrinks the diamond. Once restyled, a curve draws
    /// thin lines with small circles whatever its state.
    pub fn curve_style(&self, slot: usize, state: VisualState, restyled: bool) -> CurveStyle {
        let color = match state {
            VisualState::Dimmed => self.palette.dim_color(slot),
            VisualState::Normal | VisualState::Highlighted => self.palette.color(slot),
        };
        let (width, size, shape) = match (state, restyled) {
            (VisualState::Dimmed, _) | (_, true) => (
                self.selected_line_width,
                self.selected_marker_size,
                MarkerShape::Circle,
            ),
            (VisualState::Normal, false) => {
                (self.line_width, self.marker_size, MarkerShape::Diamond)
            }
            (VisualState::Highlighted, false) => (
                self.line_width,
                self.selected_marker_size,
                MarkerShape::Diamond,
            ),
        };
        CurveStyle {
            line: LineStyle { color, width },
            marker: MarkerStyle { color, size, shape },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            line_width: 2.0,
            selected_line_width: 1.0,
            marker_size: 12.0,
            selected_marker_size: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_palette_is_rejected() {
        assert!(Palette::new(Vec::new()).is_none());
    }

    #[test]
    fn slots_wrap_around() {
        let palette = Palette::default();
        assert_eq!(palette.slot_for(3), 0);
        assert_eq!(palette.color(4), Color::MAGENTA);
        assert_eq!(palette.dim_color(0), Color::new(0.0, 1.0, 1.0, 0.3));
    }

    #[test]
    fn dimmed_style_uses_dim_color() {
        let theme = Theme::default();
        let style = theme.curve_style(0, VisualState::Dimmed, true);
        assert_eq!(style.line.color.a, DEFAULT_DIM_ALPHA);
        assert_eq!(style.line.width, 1.0);
        assert_eq!(style.marker.shape, MarkerShape::Circle);
    }

    #[test]
    fn untouched_curves_keep_initial_markers() {
        let theme = Theme::default();
        let style = theme.curve_style(1, VisualState::Normal, false);
        assert_eq!(style.marker.shape, MarkerShape::Diamond);
        assert_eq!(style.marker.size, 12.0);
        assert_eq!(style.line.color, Color::MAGENTA);
    }

    #[test]
    fn first_highlight_shrinks_the_diamond() {
        let theme = Theme::default();
        let style = theme.curve_style(0, VisualState::Highlighted, false);
        assert_eq!(style.marker.shape, MarkerShape::Diamond);
        assert_eq!(style.marker.size, 5.0);
        assert_eq!(style.line.width, 2.0);

        let later = theme.curve_style(0, VisualState::Highlighted, true);
        assert_eq!(later.marker.shape, MarkerShape::Circle);
        assert_eq!(later.line.width, 1.0);
        assert_eq!(later.line.color, Color::CYAN);
    }
}
