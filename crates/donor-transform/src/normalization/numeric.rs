//! Numeric coercion.

use donor_model::{any_to_f64, any_to_i64};
use polars::prelude::AnyValue;

/// Integer identifier; text like `"12"` or `"12.0"` is accepted.
pub fn coerce_i64(value: AnyValue<'_>) -> Option<i64> {
    any_to_i64(value)
}

/// Floating-point coordinate; non-finite values become `None`.
pub fn coerce_f64(value: AnyValue<'_>) -> Option<f64> {
    any_to_f64(value).filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_text_and_rejects_garbage() {
        assert_eq!(coerce_i64(AnyValue::String(" 42 ")), Some(42));
        assert_eq!(coerce_i64(AnyValue::String("4x")), None);
        assert_eq!(coerce_f64(AnyValue::String("-17.44")), Some(-17.44));
        assert_eq!(coerce_f64(AnyValue::Float64(f64::NAN)), None);
        assert_eq!(coerce_f64(AnyValue::Null), None);
    }
}
