//! File-backed persistence for outline documents.
//!
//! # Responsibility
//! - Stream `.silver` files line by line into the codec.
//! - Save documents without ever leaving a truncated file behind.
//!
//! # Invariants
//! - A failed load returns an error and no tree.
//! - A failed save leaves any previous file content untouched.
//!
//! # See also
//! - `crate::codec` for the line format.

mod file;

pub use file::{read_tree, write_tree, SILVER_FILE_EXTENSION};

use crate::codec::CodecError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Result type used by file store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from loading or saving document files.
#[derive(Debug)]
pub enum StoreError {
    /// Opening, reading, writing or renaming a file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// File content is not a valid document.
    Codec { path: PathBuf, source: CodecError },
}

impl StoreError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. } | Self::Codec { path, .. } => path,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "`{}`: {source}", path.display()),
            Self::Codec { path, source } => write!(f, "`{}`: {source}", path.display()),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Codec { source, .. } => Some(source),
        }
    }
}
