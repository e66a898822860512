//! Rules for single-value lookup tables.

use validator::Validate;

use crate::error::CoreError;

/// Longest value a lookup row may hold.
pub const MAX_LOOKUP_VALUE_LEN: u64 = 255;

/// Column holding the display value of every lookup table.
pub const LOOKUP_VALUE_COLUMN: &str = "value";

#[derive(Debug, Validate)]
struct LookupValue {
    #[validate(length(min = 1, max = MAX_LOOKUP_VALUE_LEN))]
    value: String,
}

/// Trim a lookup value and check its length. Whitespace-only input is rejected.
pub fn normalize_lookup_value(raw: &str) -> Result<String, CoreError> {
    let candidate = LookupValue {
        value: raw.trim().to_string(),
    };
    candidate.validate().map_err(|_| {
        CoreError::Validation(format!(
            "value must be between 1 and {MAX_LOOKUP_VALUE_LEN} characters"
        ))
    })?;
    Ok(candidate.value)
}
