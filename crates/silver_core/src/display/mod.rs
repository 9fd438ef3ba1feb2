//! Display-time text transforms for bullet content.
//!
//! # Responsibility
//! - Split plain bullet content into spans a rendering surface can style.
//!
//! # Invariants
//! - Transforms never modify stored content.
//! - Concatenating span texts reproduces the input exactly.

pub mod autolink;

pub use autolink::{autolink, Span};
