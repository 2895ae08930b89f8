//! Crate-level error type.

use crate::axis::InvalidRangeError;
use crate::highlight::UnknownCurveError;

/// Errors surfaced by [`TimePlot`](crate::plot::TimePlot) event handlers.
///
/// Both variants are caller contract violations rather than transient
/// failures; retrying the same call will fail the same way.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A visible window with zero, negative, or non-finite length.
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
    /// A curve name that was never registered.
    #[error(transparent)]
    UnknownCurve(#[from] UnknownCurveError),
}

/// Result alias for [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
