//! Node model for outline documents.
//!
//! # Responsibility
//! - Define the two node variants (`Root`, `Bullet`) stored in a tree arena.
//! - Provide ordered child-list primitives shared by both variants.
//!
//! # Invariants
//! - Child order is document order.
//! - Child-list primitives never touch the tree's identity index.
//!
//! # See also
//! - `crate::tree` for index-aware structural operations.

pub mod bullet;
pub mod node;

pub use bullet::{
    new_bullet_id, normalize_content, Bullet, BulletId, BulletValidationError, Meta,
    DEFAULT_BULLET_CONTENT, DEFAULT_BULLET_ID, DEFAULT_BULLET_TYPE,
};
pub use node::{Container, Node, NodeKey, RootNode};
