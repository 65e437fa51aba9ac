//! Positional parameter storage for rendered queries.

use serde_json::Value;

/// Append-only list of bound parameter values.
///
/// Position `i` (1-based) corresponds to placeholder `$i` in the rendered
/// statement. The list is instance-scoped: distinct builds never share a
/// counter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    values: Vec<Value>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Add a value and return its 1-based placeholder index.
    pub fn push(&mut self, value: Value) -> usize {
        self.values.push(value);
        self.values.len()
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the bound values in placeholder order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the list, yielding the bound values in placeholder order.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
