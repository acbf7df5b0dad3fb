//! Models module for TableSync
//!
//! This module handles entity registration and discovery.

pub mod registry;

// Re-export key types
pub use registry::{load_descriptors, Entity, EntityRegistry};
