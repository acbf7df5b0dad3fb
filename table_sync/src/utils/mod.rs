//! Utilities for TableSync
//!
//! This module provides utility functions used across the library.

pub mod naming;
pub mod logging;

// Re-export key utility functions
pub use naming::{column_name_for_member, composite_index_name, quote_literal};
