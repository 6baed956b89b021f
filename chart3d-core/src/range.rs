/// Closed numeric intervals and auto-range padding
use crate::error::{ChartError, Result};

/// A closed interval `[min, max]` with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    min: f64,
    max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ChartError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Fractional position of `value` within the range. Values outside the
    /// range map outside `[0, 1]`; a zero-length range yields NaN.
    pub fn percent(&self, value: f64) -> f64 {
        (value - self.min) / self.length()
    }

    /// Inverse of [`Range::percent`].
    pub fn value(&self, percent: f64) -> f64 {
        self.min + percent * self.length()
    }

    /// Returns a copy with both bounds pushed out by `amount`.
    pub fn widened(&self, amount: f64) -> Self {
        let amount = amount.abs();
        Self {
            min: self.min - amount,
            max: self.max + amount,
        }
    }

    /// Returns a copy widened to contain `value`.
    pub fn include(&self, value: f64) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }
}

impl Default for Range {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// Expands `raw` by a fraction of its length on each side.
///
/// With `sticky_zero`, a bound that started on one side of zero is clamped
/// to exactly zero when the margin would carry it across. This keeps a bar
/// baseline at zero instead of a sliver of negative space.
///
/// Fails with `InvalidRange` when the padded bounds overflow `f64`.
pub fn adjusted_data_range(
    raw: &Range,
    lower_margin: f64,
    upper_margin: f64,
    sticky_zero: bool,
) -> Result<Range> {
    let lm = raw.length() * lower_margin;
    let um = raw.length() * upper_margin;
    let mut lower = raw.min - lm;
    let mut upper = raw.max + um;
    if sticky_zero {
        if raw.min >= 0.0 && lower < 0.0 {
            lower = 0.0;
        }
        if raw.max <= 0.0 && upper > 0.0 {
            upper = 0.0;
        }
    }
    Range::new(lower, upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(Range::new(2.0, 1.0).is_err());
        assert!(Range::new(f64::NAN, 1.0).is_err());
        assert!(Range::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn test_percent_outside_range() {
        let range = Range::new(10.0, 20.0).unwrap();
        assert!((range.percent(15.0) - 0.5).abs() < 1e-12);
        assert!((range.percent(30.0) - 2.0).abs() < 1e-12);
        assert!((range.percent(0.0) + 1.0).abs() < 1e-12);
        assert!((range.value(0.25) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_include() {
        let range = Range::new(1.0, 2.0).unwrap().include(0.0);
        assert_eq!(range.min(), 0.0);
        assert_eq!(range.max(), 2.0);
    }

    #[test]
    fn test_sticky_zero_not_engaged_when_margin_stays_positive() {
        let raw = Range::new(2.0, 10.0).unwrap();
        let adjusted = adjusted_data_range(&raw, 0.1, 0.1, true).unwrap();
        assert!((adjusted.min() - 1.2).abs() < 1e-12);
        assert!((adjusted.max() - 10.8).abs() < 1e-12);
    }

    #[test]
    fn test_sticky_zero_clamps_lower_bound() {
        let raw = Range::new(0.5, 10.0).unwrap();
        let adjusted = adjusted_data_range(&raw, 0.1, 0.1, true).unwrap();
        assert_eq!(adjusted.min(), 0.0);
        assert!((adjusted.max() - 10.95).abs() < 1e-12);

        let loose = adjusted_data_range(&raw, 0.1, 0.1, false).unwrap();
        assert!((loose.min() + 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_sticky_zero_clamps_upper_bound() {
        let raw = Range::new(-10.0, -0.5).unwrap();
        let adjusted = adjusted_data_range(&raw, 0.1, 0.1, true).unwrap();
        assert_eq!(adjusted.max(), 0.0);
        assert!((adjusted.min() + 10.95).abs() < 1e-12);
    }

    #[test]
    fn test_adjust_does_not_mutate_input() {
        let raw = Range::new(0.0, 4.0).unwrap();
        let _ = adjusted_data_range(&raw, 0.5, 0.5, false);
        assert_eq!(raw, Range::new(0.0, 4.0).unwrap());
    }

    #[test]
    fn test_adjust_rejects_overflowing_bounds() {
        let raw = Range::new(-1e308, 1.5e308).unwrap();
        assert!(matches!(
            adjusted_data_range(&raw, 0.1, 0.1, false),
            Err(ChartError::InvalidRange { .. })
        ));
    }
}
