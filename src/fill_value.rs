//! Virtual dataset fill values.

use serde::{Deserialize, Serialize};

/// The fill value of a virtual dataset.
///
/// Provides an element value for regions of the virtual dataset that are not backed by any source,
/// such as the gaps inserted between detector stripes or chips.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FillValue(f64);

impl FillValue {
    /// Create a new fill value.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Returns the fill value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }
}

impl Default for FillValue {
    fn default() -> Self {
        Self(-1.0)
    }
}

impl core::fmt::Display for FillValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<f64> for FillValue {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<f32> for FillValue {
    fn from(value: f32) -> Self {
        Self(f64::from(value))
    }
}

impl From<i32> for FillValue {
    fn from(value: i32) -> Self {
        Self(f64::from(value))
    }
}

impl From<u32> for FillValue {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_value() {
        assert_eq!(FillValue::default().value(), -1.0);
        assert_eq!(FillValue::from(0).value(), 0.0);
        assert_eq!(FillValue::from(2.5f32).to_string(), "2.5");
        assert_eq!(serde_json::to_string(&FillValue::new(-1.0)).unwrap(), "-1.0");
    }
}
