use crate::utils::error::{RevenueError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RevenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RevenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(RevenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RevenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN fails both comparisons, so check containment rather than exclusion
    if !(value >= min && value <= max) {
        return Err(RevenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 情境中的數值不可為 NaN 或無限大
pub fn validate_finite(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(RevenueError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("Value must be a finite number, got {}", value),
        });
    }
    Ok(())
}

/// 權重總和必須為 1
pub fn validate_weights_sum(field_name: &str, weights: &[f64]) -> Result<()> {
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > 1e-9 {
        return Err(RevenueError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("Weights must sum to 1, got {}", total),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output.path", "./output").is_ok());
        assert!(validate_path("output.path", "").is_err());
        assert!(validate_path("output.path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("engine.max_concurrent_markets", 4, 1).is_ok());
        assert!(validate_positive_number("engine.max_concurrent_markets", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("reputation.seat_comfort_weight", 0.9, 0.0, 1.0).is_ok());
        assert!(validate_range("reputation.seat_comfort_weight", 1.5, 0.0, 1.0).is_err());
        assert!(validate_range("reputation.seat_comfort_weight", f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("routes.fares.economy", 320.0).is_ok());
        assert!(validate_finite("routes.fares.economy", -1.0).is_ok());
        assert!(validate_finite("routes.fares.economy", f64::NAN).is_err());
        assert!(validate_finite("routes.fares.economy", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_weights_sum() {
        assert!(validate_weights_sum("reputation", &[0.1, 0.9]).is_ok());
        assert!(validate_weights_sum("reputation", &[0.5, 0.6]).is_err());
    }
}
