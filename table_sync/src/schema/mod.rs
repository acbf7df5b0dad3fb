//! Schema module for TableSync
//!
//! This module describes managed tables, probes the live schema and renders
//! the DDL that reconciles the two.

pub mod analyzer;
pub mod diff;
pub mod generator;
pub mod mapper;
pub mod types;
