//! Error types for parameter validation.
//!
//! Every conversion parameter is checked before any geometry is touched;
//! these errors name the offending parameter so a caller can fix it.

use thiserror::Error;

/// Errors related to conversion parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {valid})")]
    OutOfRange {
        name: String,
        value: f64,
        valid: String,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

impl ParameterError {
    pub(crate) fn out_of_range(name: &str, value: f64, valid: &str) -> Self {
        Self::OutOfRange {
            name: name.to_string(),
            value,
            valid: valid.to_string(),
        }
    }

    /// Name of the parameter this error refers to.
    pub fn parameter(&self) -> &str {
        match self {
            Self::OutOfRange { name, .. } | Self::InvalidValue { name, .. } => name,
        }
    }
}

/// Result type alias for parameter validation.
pub type ParameterResult<T> = Result<T, ParameterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_display() {
        let err = ParameterError::out_of_range("span_mm", -5.0, "> 0");
        assert_eq!(
            err.to_string(),
            "Parameter 'span_mm' out of range: -5 (valid: > 0)"
        );
        assert_eq!(err.parameter(), "span_mm");

        let err = ParameterError::InvalidValue {
            name: "calibration_pen".to_string(),
            reason: "must be a slot between 1 and 4".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for 'calibration_pen': must be a slot between 1 and 4"
        );
    }
}
