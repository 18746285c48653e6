//! Rendered output: collected JSON reports and streaming JSON Lines.

pub mod json;
pub mod json_lines;
