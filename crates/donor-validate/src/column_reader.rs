//! Column-wise reads used by the quality gate and the profiler.
//!
//! Unlike record rules, these helpers look at whole columns. A cell counts as
//! missing only when it is a real null; empty strings are values.
//!
//! # Example
//!
//! ```ignore
//! let reader = ColumnReader::new(&df);
//! let nulls = reader.count_nulls("groupe_sanguin");
//! let (count, samples) = reader.collect_matching("groupe_sanguin", |v| !is_canonical(v), 5);
//! ```

use std::collections::HashSet;

use donor_model::any_to_string;
use polars::prelude::{AnyValue, Column, DataFrame};

/// Read-only column access over a batch.
#[derive(Debug)]
pub struct ColumnReader<'a> {
    df: &'a DataFrame,
}

impl<'a> ColumnReader<'a> {
    #[inline]
    pub fn new(df: &'a DataFrame) -> Self {
        Self { df }
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.df.height()
    }

    #[inline]
    pub fn column(&self, name: &str) -> Option<&'a Column> {
        self.df.column(name).ok()
    }

    /// Number of null cells, or `None` when the column is absent.
    pub fn count_nulls(&self, name: &str) -> Option<usize> {
        self.column(name).map(Column::null_count)
    }

    /// Iterate over the non-null cells of a column as text, in row order.
    pub fn present_values(&self, name: &str) -> impl Iterator<Item = String> + 'a {
        let column = self.column(name);
        let height = self.height();
        (0..height).filter_map(move |idx| match column?.get(idx) {
            Ok(AnyValue::Null) | Err(_) => None,
            Ok(value) => Some(any_to_string(value)),
        })
    }

    /// Count non-null values matching `predicate` and keep up to `limit`
    /// distinct examples in first-seen order.
    ///
    /// Values are passed to the predicate untrimmed.
    pub fn collect_matching<F>(&self, name: &str, predicate: F, limit: usize) -> (usize, Vec<String>)
    where
        F: Fn(&str) -> bool,
    {
        let mut count = 0usize;
        let mut examples: Vec<String> = Vec::with_capacity(limit);
        for value in self.present_values(name) {
            if predicate(&value) {
                count += 1;
                if examples.len() < limit && !examples.contains(&value) {
                    examples.push(value);
                }
            }
        }
        (count, examples)
    }

    /// Number of non-null cells whose value already appeared earlier in the
    /// column.
    pub fn duplicate_count(&self, name: &str) -> usize {
        let mut seen = HashSet::new();
        self.present_values(name)
            .filter(|value| !seen.insert(value.clone()))
            .count()
    }
}
