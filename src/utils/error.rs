use thiserror::Error;

#[derive(Error, Debug)]
pub enum RevenueError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown market pair: {market}")]
    MarketNotFound { market: String },

    #[error("Failed to persist revenue for market {market}: {message}")]
    PersistenceError { market: String, message: String },

    #[error("Revenue update for period {period} failed for {} market(s): {}", .failed.len(), .failed.join(", "))]
    PeriodUpdateFailed { period: u32, failed: Vec<String> },
}

/// 錯誤分類，供 CLI 決定輸出內容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Persistence,
    System,
}

/// 錯誤嚴重程度，對應 CLI 結束碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RevenueError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RevenueError::ConfigError { .. }
            | RevenueError::ConfigValidationError { .. }
            | RevenueError::MissingConfigError { .. }
            | RevenueError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            RevenueError::MarketNotFound { .. }
            | RevenueError::SerializationError(_)
            | RevenueError::TomlError(_) => ErrorCategory::Input,
            RevenueError::CsvError(_)
            | RevenueError::PersistenceError { .. }
            | RevenueError::PeriodUpdateFailed { .. } => ErrorCategory::Persistence,
            RevenueError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // A failed period keeps the previous records authoritative; the next run retries.
            ErrorCategory::Persistence => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RevenueError::ConfigError { .. }
            | RevenueError::ConfigValidationError { .. }
            | RevenueError::MissingConfigError { .. }
            | RevenueError::InvalidConfigValueError { .. } => {
                "Check the engine configuration file and command line overrides"
            }
            RevenueError::MarketNotFound { .. } => {
                "Make sure the scenario lists the market pair being updated"
            }
            RevenueError::SerializationError(_) => "Check the scenario file for malformed values",
            RevenueError::TomlError(_) => {
                "Check the scenario or configuration file for TOML syntax errors"
            }
            RevenueError::CsvError(_) => {
                "The revenue file may be corrupt; restore it or point output_path elsewhere"
            }
            RevenueError::PersistenceError { .. } | RevenueError::PeriodUpdateFailed { .. } => {
                "Re-run the period; records from the last successful run are still in place"
            }
            RevenueError::IoError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RevenueError::PeriodUpdateFailed { period, failed } => format!(
                "Revenue for period {} could not be saved for: {}",
                period,
                failed.join(", ")
            ),
            RevenueError::MarketNotFound { market } => {
                format!("Market pair {} is not part of the scenario", market)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RevenueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let err = RevenueError::PersistenceError {
            market: "NYC-LON".to_string(),
            message: "disk full".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Persistence);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = RevenueError::MissingConfigError {
            field: "input.scenario_path".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_toml_error_is_input_error() {
        let parse_error = toml::from_str::<toml::Table>("markets = [").unwrap_err();
        let err = RevenueError::from(parse_error);
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().starts_with("TOML parsing error"));
    }

    #[test]
    fn test_period_failure_message_lists_markets() {
        let err = RevenueError::PeriodUpdateFailed {
            period: 12,
            failed: vec!["NYC-LON".to_string(), "SFO-TYO".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Revenue update for period 12 failed for 2 market(s): NYC-LON, SFO-TYO"
        );
        assert!(err.user_friendly_message().contains("period 12"));
    }
}
