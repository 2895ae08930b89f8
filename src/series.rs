//! Curve identities and registration order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Unique name identifying a plotted curve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveName(Arc<str>);

impl CurveName {
    /// Create a curve name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Access the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurveName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CurveName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl AsRef<str> for CurveName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for CurveName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Ordered set of curve names.
///
/// A curve's index is its position in first-registration order and never
/// changes afterwards.
#[derive(Debug, Clone, Default)]
pub(crate) struct CurveRegistry {
    order: Vec<CurveName>,
    index: HashMap<CurveName, usize>,
}

impl CurveRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a curve. Returns its index and whether it was newly added.
    pub(crate) fn register(&mut self, name: CurveName) -> (usize, bool) {
        if let Some(&existing) = self.index.get(&name) {
            return (existing, false);
        }
        let index = self.order.len();
        self.order.push(name.clone());
        self.index.insert(name, index);
        (index, true)
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn names(&self) -> &[CurveName] {
        &self.order
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}
