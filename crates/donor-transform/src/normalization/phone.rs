//! Phone number normalization.
//!
//! The output is always digits-only text or the empty string, which makes
//! normalization idempotent.

/// Textual stand-ins for a missing value left behind by spreadsheet tools.
const PLACEHOLDERS: [&str; 7] = ["nan", "nat", "none", "null", "<na>", "na", "n/a"];

/// Separators tolerated inside a grouped phone number such as `+221 77-123`.
const SEPARATORS: [char; 5] = [' ', '-', '(', ')', '+'];

/// Normalize a raw phone value to digits, or `""` when it is missing or not
/// a number.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || PLACEHOLDERS
            .iter()
            .any(|placeholder| trimmed.eq_ignore_ascii_case(placeholder))
    {
        return String::new();
    }

    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return trimmed.to_string();
    }

    // Numbers that went through a float column: "771234567.0", "7.71234567e8".
    if let Ok(value) = trimmed.parse::<f64>() {
        return if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < 1e18 {
            format!("{}", value as u64)
        } else {
            String::new()
        };
    }

    let grouped = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || SEPARATORS.contains(&c));
    if grouped && trimmed.chars().any(|c| c.is_ascii_digit()) {
        return trimmed.chars().filter(char::is_ascii_digit).collect();
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_digits_including_leading_zero() {
        assert_eq!(normalize_phone("771234567"), "771234567");
        assert_eq!(normalize_phone(" 0612345678 "), "0612345678");
    }

    #[test]
    fn strips_float_artifacts() {
        assert_eq!(normalize_phone("771234567.0"), "771234567");
        assert_eq!(normalize_phone("7.71234567e8"), "771234567");
        assert_eq!(normalize_phone("771234567.5"), "");
    }

    #[test]
    fn strips_placeholders() {
        for placeholder in ["NaN", "nan", "<NA>", "null", "None", "N/A", ""] {
            assert_eq!(normalize_phone(placeholder), "", "{placeholder:?}");
        }
    }

    #[test]
    fn grouped_numbers_keep_their_digits() {
        assert_eq!(normalize_phone("+221 77 123 45 67"), "221771234567");
        assert_eq!(normalize_phone("(77) 123-45-67"), "771234567");
    }

    #[test]
    fn non_numeric_text_becomes_empty() {
        assert_eq!(normalize_phone("inconnu"), "");
        assert_eq!(normalize_phone("77 12x 45"), "");
        assert_eq!(normalize_phone("+-()"), "");
    }
}
