//! Numeric display formatting for resolved placeholder values.
//!
//! The rule is shared by every resolution path and is compared byte-for-byte
//! against previously published datasets:
//!
//! - non-finite values pass through (`NaN`, `inf`)
//! - values strictly inside `(-1, 1)` keep two decimal digits, truncated
//! - everything else is truncated toward zero to an integer

/// Format a number for display in a description.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    if -1.0 < value && value < 1.0 {
        return two_decimals(value);
    }

    format!("{}", value.trunc())
}

/// Truncate (not round) to two decimal digits.
///
/// The nudge keeps values such as `0.29` (stored as `0.28999…`) from losing a
/// hundredth.
fn two_decimals(value: f64) -> String {
    let hundredths = (value * 100.0 + value.signum() * 1e-9).trunc();
    format!("{:.2}", hundredths / 100.0)
}
