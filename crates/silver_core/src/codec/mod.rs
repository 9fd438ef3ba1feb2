//! Line-based document codec.
//!
//! # Responsibility
//! - Decode `level|id|type|meta-json|content` lines into a `BulletTree`.
//! - Encode a `BulletTree` back into the same line format.
//!
//! # Invariants
//! - Decoding is all-or-nothing: a failed decode never yields a tree.
//! - Encoding is total for any tree built through the public tree API.
//! - `decode(encode(tree))` reproduces ids, types, meta, content and nesting.
//!
//! # See also
//! - `crate::store` for file-backed load and save.

mod line;

pub use line::{
    decode_lines, decode_reader, decode_str, encode, encode_line, encode_to_string, write_to,
    Decoder, FIELD_COUNT,
};

use crate::tree::TreeError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors from decoding persisted documents.
///
/// Line-level variants carry the 1-based line number and the offending line.
#[derive(Debug)]
pub enum CodecError {
    /// Line has fewer than five `|`-separated fields.
    MalformedLine { line_number: usize, line: String },
    /// Level field is not a non-negative integer.
    InvalidLevel { line_number: usize, line: String },
    /// Meta field is non-empty but not a JSON object.
    MetaParseError {
        line_number: usize,
        line: String,
        source: serde_json::Error,
    },
    /// Line is well-formed but the tree rejects it (duplicate or invalid id).
    Tree {
        line_number: usize,
        line: String,
        source: TreeError,
    },
    /// Reading the next line failed.
    Io(std::io::Error),
}

impl CodecError {
    /// 1-based line number of the offending line, when known.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::MalformedLine { line_number, .. }
            | Self::InvalidLevel { line_number, .. }
            | Self::MetaParseError { line_number, .. }
            | Self::Tree { line_number, .. } => Some(*line_number),
            Self::Io(_) => None,
        }
    }
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedLine { line_number, line } => write!(
                f,
                "malformed line {line_number}: expected level|id|type|meta|content, got `{line}`"
            ),
            Self::InvalidLevel { line_number, line } => {
                write!(f, "invalid level in line {line_number}: `{line}`")
            }
            Self::MetaParseError {
                line_number,
                line,
                source,
            } => write!(
                f,
                "invalid meta JSON in line {line_number} ({source}): `{line}`"
            ),
            Self::Tree {
                line_number,
                line,
                source,
            } => write!(f, "rejected line {line_number} ({source}): `{line}`"),
            Self::Io(err) => write!(f, "failed to read document line: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MetaParseError { source, .. } => Some(source),
            Self::Tree { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            Self::MalformedLine { .. } | Self::InvalidLevel { .. } => None,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
