use thiserror::Error;

use super::subscription::DateFormatError;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Format error: {message}")]
    Format { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

impl From<DateFormatError> for DomainError {
    fn from(err: DateFormatError) -> Self {
        Self::format(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Subscription '7' not found");
        assert_eq!(error.to_string(), "Not found: Subscription '7' not found");
    }

    #[test]
    fn test_format_error() {
        let error = DomainError::format("bad month");
        assert_eq!(error.to_string(), "Format error: bad month");
    }

    #[test]
    fn test_date_format_error_conversion() {
        let error: DomainError = DateFormatError::InvalidMonthFormat {
            input: "2024-01".to_string(),
        }
        .into();

        assert!(matches!(error, DomainError::Format { .. }));
        assert!(error.to_string().contains("2024-01"));
    }
}
