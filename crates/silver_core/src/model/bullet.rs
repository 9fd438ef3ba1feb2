//! Bullet domain model.
//!
//! # Responsibility
//! - Define the content-bearing outline node and its field rules.
//! - Generate fresh identifiers for interactively created bullets.
//!
//! # Invariants
//! - `id` is non-empty, stable, and never reused inside one tree.
//! - `id` and `kind` never contain the field separator `|` or line breaks.
//! - `content` never contains line breaks; it may contain `|`.

use super::node::{Container, NodeKey};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable bullet identifier as stored in the persisted format.
pub type BulletId = String;

/// Free-form bullet metadata, serialized as one JSON object.
pub type Meta = serde_json::Map<String, Value>;

/// Id of the single bullet that seeds a new or empty document.
pub const DEFAULT_BULLET_ID: &str = "hello-0";
/// Type tag used for bullets created by editing gestures.
pub const DEFAULT_BULLET_TYPE: &str = "text";
/// Content of the seed bullet of a new or empty document.
pub const DEFAULT_BULLET_CONTENT: &str = "Hello!";

const FIELD_SEPARATOR: char = '|';

/// Field-level validation failures for bullet identity and type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulletValidationError {
    /// Id is empty after trim.
    EmptyId,
    /// Id contains `|` or a line break.
    InvalidId(String),
    /// Type tag contains `|` or a line break.
    InvalidType(String),
}

impl Display for BulletValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "bullet id must not be empty"),
            Self::InvalidId(value) => {
                write!(f, "bullet id must not contain `|` or line breaks: `{value}`")
            }
            Self::InvalidType(value) => {
                write!(f, "bullet type must not contain `|` or line breaks: `{value}`")
            }
        }
    }
}

impl Error for BulletValidationError {}

/// Content-bearing outline node.
///
/// Bullets are only created by `BulletTree` insertion operations. The
/// `parent` handle is a non-owning back-reference that the tree rewrites on
/// every membership change.
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub(crate) id: BulletId,
    pub(crate) kind: String,
    pub(crate) meta: Meta,
    pub(crate) content: String,
    pub(crate) parent: NodeKey,
    pub(crate) children: Vec<NodeKey>,
}

impl Bullet {
    pub(crate) fn new(
        id: BulletId,
        kind: String,
        meta: Meta,
        content: &str,
        parent: NodeKey,
    ) -> Result<Self, BulletValidationError> {
        validate_id(&id)?;
        validate_kind(&kind)?;
        Ok(Self {
            id,
            kind,
            meta,
            content: normalize_content(content),
            parent,
            children: Vec::new(),
        })
    }

    /// Stable identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Opaque type tag, serialized as the `type` field.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Owning container: the root or another bullet.
    pub fn parent(&self) -> NodeKey {
        self.parent
    }

    /// Number of characters in `content`, the unit of cursor offsets.
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Splits `content` before the character at `offset`.
    ///
    /// Offsets past the end split after the last character.
    pub fn split_content_at(&self, offset: usize) -> (&str, &str) {
        let byte_offset = self
            .content
            .char_indices()
            .nth(offset)
            .map(|(index, _)| index)
            .unwrap_or(self.content.len());
        self.content.split_at(byte_offset)
    }
}

impl Container for Bullet {
    fn children(&self) -> &[NodeKey] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<NodeKey> {
        &mut self.children
    }
}

/// Generates a fresh time-ordered bullet id.
pub fn new_bullet_id() -> BulletId {
    Uuid::now_v7().to_string()
}

/// Replaces every line break (`\r\n`, `\n`, `\r`) with one space.
///
/// The persisted format stores one bullet per line, so content must stay on
/// a single line.
pub fn normalize_content(value: &str) -> String {
    if !value.contains(['\n', '\r']) {
        return value.to_string();
    }
    value.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn validate_id(id: &str) -> Result<(), BulletValidationError> {
    if id.trim().is_empty() {
        return Err(BulletValidationError::EmptyId);
    }
    if has_reserved_char(id) {
        return Err(BulletValidationError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn validate_kind(kind: &str) -> Result<(), BulletValidationError> {
    if has_reserved_char(kind) {
        return Err(BulletValidationError::InvalidType(kind.to_string()));
    }
    Ok(())
}

fn has_reserved_char(value: &str) -> bool {
    value.contains([FIELD_SEPARATOR, '\n', '\r'])
}
