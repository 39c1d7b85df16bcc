//! Library components of the donor pipeline CLI.

pub mod logging;
pub mod pipeline;
