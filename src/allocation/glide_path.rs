//! Age-indexed allocation policy

use serde::{Deserialize, Serialize};

use super::buckets::AllocationSplit;
use crate::error::{ensure_finite, ConfigError};

/// Rule for splitting cash flow between equity and debt by age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlidePath {
    /// Configured equity fraction until `switch_age`, then zero.
    /// The equity bucket is liquidated into debt in the switch year.
    BinarySwitch {
        equity_fraction: f64,
        switch_age: u32,
    },
    /// Configured fraction until `start_age`, falling linearly to zero at `end_age`.
    ///
    /// Only new cash flow follows the glide. Equity already held is never
    /// moved, so it keeps compounding at the equity rate after `end_age`.
    LinearGlide {
        equity_fraction: f64,
        start_age: u32,
        end_age: u32,
    },
}

impl GlidePath {
    /// Equity fraction applied to flows at the given age
    pub fn equity_fraction(&self, age: u32) -> f64 {
        match *self {
            GlidePath::BinarySwitch { equity_fraction, switch_age } => {
                if age < switch_age {
                    equity_fraction
                } else {
                    0.0
                }
            }
            GlidePath::LinearGlide { equity_fraction, start_age, end_age } => {
                if age <= start_age {
                    equity_fraction
                } else if age >= end_age {
                    0.0
                } else {
                    let span = (end_age - start_age) as f64;
                    let remaining = (end_age - age) as f64;
                    equity_fraction * remaining / span
                }
            }
        }
    }

    pub fn split(&self, age: u32) -> AllocationSplit {
        AllocationSplit::from_equity(self.equity_fraction(age))
    }

    /// Whether the equity bucket is moved wholesale into debt at this age.
    ///
    /// Happens in the switch year, or in the first simulated year when the
    /// run already starts past the switch.
    pub fn liquidates_at(&self, age: u32, is_first_year: bool) -> bool {
        match *self {
            GlidePath::BinarySwitch { switch_age, .. } => {
                age == switch_age || (is_first_year && age > switch_age)
            }
            GlidePath::LinearGlide { .. } => false,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let fraction = match *self {
            GlidePath::BinarySwitch { equity_fraction, .. } => equity_fraction,
            GlidePath::LinearGlide { equity_fraction, start_age, end_age } => {
                if end_age <= start_age {
                    return Err(ConfigError::invalid(
                        "glide_path.end_age",
                        format!("must be after start_age ({}), got {}", start_age, end_age),
                    ));
                }
                equity_fraction
            }
        };

        ensure_finite("glide_path.equity_fraction", fraction)?;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ConfigError::invalid(
                "glide_path.equity_fraction",
                format!("must be within [0, 1] so the split sums to 1, got {}", fraction),
            ));
        }
        Ok(())
    }
}

impl Default for GlidePath {
    fn default() -> Self {
        GlidePath::BinarySwitch {
            equity_fraction: 0.6,
            switch_age: 55,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_switch_cliff() {
        let glide = GlidePath::BinarySwitch { equity_fraction: 0.7, switch_age: 50 };

        assert_eq!(glide.equity_fraction(30), 0.7);
        assert_eq!(glide.equity_fraction(49), 0.7);
        assert_eq!(glide.equity_fraction(50), 0.0);
        assert_eq!(glide.equity_fraction(65), 0.0);
    }

    #[test]
    fn test_binary_switch_liquidation() {
        let glide = GlidePath::BinarySwitch { equity_fraction: 0.7, switch_age: 50 };

        assert!(glide.liquidates_at(50, false));
        assert!(!glide.liquidates_at(51, false));
        assert!(glide.liquidates_at(52, true));
        assert!(!glide.liquidates_at(40, true));
    }

    #[test]
    fn test_linear_glide() {
        let glide = GlidePath::LinearGlide { equity_fraction: 0.8, start_age: 40, end_age: 60 };

        assert_eq!(glide.equity_fraction(35), 0.8);
        assert!((glide.equity_fraction(50) - 0.4).abs() < 1e-12);
        assert_eq!(glide.equity_fraction(60), 0.0);
        assert!(!glide.liquidates_at(60, false));
    }

    #[test]
    fn test_validation() {
        let bad_fraction = GlidePath::BinarySwitch { equity_fraction: 1.2, switch_age: 50 };
        let err = bad_fraction.validate().unwrap_err();
        assert_eq!(err.field(), Some("glide_path.equity_fraction"));

        let inverted = GlidePath::LinearGlide { equity_fraction: 0.5, start_age: 60, end_age: 40 };
        assert_eq!(inverted.validate().unwrap_err().field(), Some("glide_path.end_age"));

        assert!(GlidePath::default().validate().is_ok());
    }
}
