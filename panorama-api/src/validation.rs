//! Validation Traits
//!
//! Common validation patterns extracted from route handlers.

use crate::error::{ApiError, ApiResult};

/// Trait for validating non-empty strings.
pub trait ValidateNonEmpty {
    /// Validate that the value is non-empty.
    ///
    /// # Errors
    /// Returns `ApiError::missing_field` if the value is empty or
    /// whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Validate that a score sits inside the accepted range.
pub fn validate_score(score: i16) -> ApiResult<()> {
    const MIN: i16 = 1;
    const MAX: i16 = 10;
    if !(MIN..=MAX).contains(&score) {
        return Err(ApiError::invalid_range("score", MIN, MAX));
    }
    Ok(())
}

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Validate a registration password.
pub fn validate_password(password: &str) -> ApiResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation_failed(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
