//! Error types for configuration and input loading

use thiserror::Error;

/// Errors raised before a simulation starts.
///
/// A run either fails here, before any period is simulated, or produces a
/// complete ledger. There is no partial-ledger error path.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field, if this is a validation failure
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidConfiguration { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Reject NaN and infinities
pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be a finite number, got {}", value)))
    }
}

/// Annual rates below -100% would drive balances negative
pub(crate) fn ensure_rate(field: &str, annual_rate: f64) -> Result<(), ConfigError> {
    ensure_finite(field, annual_rate)?;
    if annual_rate < -1.0 {
        return Err(ConfigError::invalid(
            field,
            format!("must not be below -100% per year, got {}", annual_rate),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_names_field() {
        let err = ConfigError::invalid("rates.equity", "must be finite");
        assert_eq!(err.field(), Some("rates.equity"));
        assert!(err.to_string().contains("rates.equity"));
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite("x", 1.0).is_ok());
        assert!(ensure_finite("x", f64::NAN).is_err());
        assert!(ensure_finite("x", f64::INFINITY).is_err());
    }

    #[test]
    fn test_ensure_rate_floor() {
        assert!(ensure_rate("r", -1.0).is_ok());
        assert!(ensure_rate("r", -1.01).is_err());
    }
}
