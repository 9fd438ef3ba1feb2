//! Core document model for the Silver outline editor.
//! This crate is the single source of truth for outline invariants.

pub mod codec;
pub mod display;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod tree;

pub use codec::{decode_lines, decode_reader, decode_str, encode, encode_to_string, CodecError};
pub use display::{autolink, Span};
pub use logging::{
    default_log_level, init_logging, logging_status, LogLevel, LoggingConfig, LoggingError,
};
pub use model::{Bullet, BulletId, BulletValidationError, Container, Meta, Node, NodeKey};
pub use service::document::{Cursor, Document, DocumentError, DocumentResult};
pub use service::edit_service::{DeleteMode, EditResult, EditService, EditServiceError, Reparented};
pub use store::{read_tree, write_tree, StoreError, SILVER_FILE_EXTENSION};
pub use tree::{BulletTree, PreOrderItem, TreeError, TreeResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
