//! Output formatting utilities for the lg CLI.
//!
//! This module provides functions for formatting data as tables or JSON:
//!
//! - [`records`] - Record pages, counts and neighbour ids
//! - [`helpers`] - Common formatting utilities (truncation, cells, footers)

pub mod helpers;
mod records;

pub use records::{
    format_count_json, format_nav_json, format_nav_table, format_records_json,
    format_records_table, PageInfo,
};
