//! Editing session over one outline document.
//!
//! # Responsibility
//! - Own the document tree and the editing focus for one session.
//! - Provide the document lifecycle: create, load-replacing, clear, save.
//!
//! # Invariants
//! - Loads are all-or-nothing: the current tree changes only after the whole
//!   input decoded successfully.
//! - Focus, when set, names a live bullet of the current tree.
//! - The session never tracks which file path is bound for save.

use crate::codec::{decode_reader, decode_str, encode_to_string, CodecError};
use crate::model::NodeKey;
use crate::service::edit_service::EditService;
use crate::store::{read_tree, write_tree, StoreError};
use crate::tree::BulletTree;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::BufRead;
use std::path::Path;

/// Result type used by document lifecycle operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors from document load and save.
#[derive(Debug)]
pub enum DocumentError {
    /// In-memory or streamed input is not a valid document.
    Codec(CodecError),
    /// File load or save failed.
    Store(StoreError),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codec(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<CodecError> for DocumentError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<StoreError> for DocumentError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Editing position: a bullet and a character offset into its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub node: NodeKey,
    pub offset: usize,
}

impl Cursor {
    /// Cursor before the first character of `node`.
    pub fn start(node: NodeKey) -> Self {
        Self { node, offset: 0 }
    }
}

/// One open outline document and its editing focus.
#[derive(Debug, Clone, Default)]
pub struct Document {
    tree: BulletTree,
    focus: Option<Cursor>,
}

impl Document {
    /// Creates a document without any bullet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a new document holding the seed bullet, focused.
    pub fn with_default_bullet() -> Self {
        let tree = BulletTree::with_default_bullet();
        let focus = tree.first().map(Cursor::start);
        Self { tree, focus }
    }

    pub fn tree(&self) -> &BulletTree {
        &self.tree
    }

    /// Direct structural access for callers that manage focus themselves.
    pub fn tree_mut(&mut self) -> &mut BulletTree {
        &mut self.tree
    }

    pub fn focus(&self) -> Option<Cursor> {
        self.focus
    }

    /// Moves focus; a cursor on a node that is not a live bullet clears it.
    pub fn set_focus(&mut self, focus: Option<Cursor>) {
        self.focus = focus.filter(|cursor| self.tree.get(cursor.node).is_some());
    }

    /// Editing-command facade over this document.
    pub fn edit(&mut self) -> EditService<'_> {
        EditService::new(self)
    }

    /// Discards every bullet and the focus.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.focus = None;
        info!("event=doc_clear module=document status=ok");
    }

    /// Replaces the document with a fresh one holding the seed bullet.
    pub fn new_document(&mut self) {
        self.replace(BulletTree::with_default_bullet());
    }

    /// Replaces the document with the decoded `text`.
    ///
    /// # Errors
    /// - `Codec` when any line is invalid; the current document is kept.
    pub fn load_text(&mut self, text: &str) -> DocumentResult<()> {
        let tree = decode_str(text)?;
        self.replace(tree);
        Ok(())
    }

    /// Replaces the document with lines streamed from `reader`.
    pub fn load_reader<R: BufRead>(&mut self, reader: R) -> DocumentResult<()> {
        let tree = decode_reader(reader)?;
        self.replace(tree);
        Ok(())
    }

    /// Replaces the document with the content of the file at `path`.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> DocumentResult<()> {
        let tree = read_tree(path)?;
        self.replace(tree);
        Ok(())
    }

    /// Encodes the document in the persisted line format.
    pub fn to_text(&self) -> String {
        encode_to_string(&self.tree)
    }

    /// Saves the document to `path` atomically.
    pub fn save_file(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        write_tree(path, &self.tree)?;
        Ok(())
    }

    fn replace(&mut self, tree: BulletTree) {
        self.tree.replace_with(tree);
        self.focus = self.tree.first().map(Cursor::start);
        info!(
            "event=doc_replace module=document status=ok bullets={}",
            self.tree.len()
        );
    }
}
