//! Editing session and command services.
//!
//! # Responsibility
//! - Own the open document and its lifecycle.
//! - Orchestrate tree operations into editing gestures.
//!
//! # See also
//! - `crate::tree` for the structural primitives.

pub mod document;
pub mod edit_service;
