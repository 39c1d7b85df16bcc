//! Value-level normalization functions.

pub mod datetime;
pub mod numeric;
pub mod phone;

pub use datetime::parse_tolerant_date;
pub use numeric::{coerce_f64, coerce_i64};
pub use phone::normalize_phone;
