//! Output formats for a finished `Summary`.
pub mod json;
pub mod report;
