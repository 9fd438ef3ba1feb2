//! Interactive editing commands.
//!
//! # Responsibility
//! - Translate rendering-surface gestures into tree operations.
//! - Keep the editing focus in document order after every command.
//!
//! # Invariants
//! - Split keeps the text before the cursor in place and moves the rest into
//!   a new bullet: next sibling for leaves, first child otherwise.
//! - Deletion never drops descendants implicitly; `DeleteMode` decides.
//! - Boundary indent/outdent are no-ops reported as `None`.

use crate::model::{new_bullet_id, Container, Meta, NodeKey, DEFAULT_BULLET_TYPE};
use crate::service::document::{Cursor, Document};
use crate::tree::TreeError;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by editing commands.
pub type EditResult<T> = Result<T, EditServiceError>;

/// Errors from editing commands.
#[derive(Debug, Clone, PartialEq)]
pub enum EditServiceError {
    /// Target node is not a live bullet of the document.
    NodeNotFound(NodeKey),
    /// Tree-level failure.
    Tree(TreeError),
}

impl Display for EditServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(key) => write!(f, "bullet not found: {key}"),
            Self::Tree(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            Self::NodeNotFound(_) => None,
        }
    }
}

impl From<TreeError> for EditServiceError {
    fn from(value: TreeError) -> Self {
        match value {
            TreeError::UnknownReference(key) => Self::NodeNotFound(key),
            other => Self::Tree(other),
        }
    }
}

/// What happens to the children of a deleted bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Children take the deleted bullet's place, in order.
    #[default]
    Promote,
    /// The whole subtree is deleted.
    Subtree,
}

/// Structural move produced by indent or outdent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reparented {
    pub node: NodeKey,
    pub old_parent: NodeKey,
    pub new_parent: NodeKey,
    /// Smallest container holding both the old and the new position; the
    /// only fragment a rendering surface has to redraw.
    pub render_scope: NodeKey,
}

/// Editing-command facade over one document.
pub struct EditService<'doc> {
    document: &'doc mut Document,
}

impl<'doc> EditService<'doc> {
    pub fn new(document: &'doc mut Document) -> Self {
        Self { document }
    }

    /// Splits `node` at a character `offset` (the "enter" gesture).
    ///
    /// Text before the cursor stays in `node`; the rest moves into a new
    /// bullet that becomes the next sibling of a leaf, or the first child of
    /// a bullet that already has children. Offsets past the end create an
    /// empty bullet. Focus moves to the start of the new bullet.
    pub fn split_at_cursor(&mut self, node: NodeKey, offset: usize) -> EditResult<NodeKey> {
        let tree = self.document.tree_mut();
        let bullet = tree.bullet(node)?;
        let has_children = !bullet.children().is_empty();
        let parent = bullet.parent();
        let (head, tail) = bullet.split_content_at(offset);
        let (head, tail) = (head.to_string(), tail.to_string());

        let created = if has_children {
            tree.add_node_first(new_bullet_id(), DEFAULT_BULLET_TYPE, Meta::new(), &tail, node)?
        } else {
            tree.add_node_after(
                new_bullet_id(),
                DEFAULT_BULLET_TYPE,
                Meta::new(),
                &tail,
                parent,
                node,
            )?
        };
        tree.set_content(node, &head)?;

        debug!(
            "event=bullet_split module=edit status=ok placement={}",
            if has_children { "first_child" } else { "next_sibling" }
        );
        self.document.set_focus(Some(Cursor::start(created)));
        Ok(created)
    }

    /// Indents `node` under its preceding sibling.
    ///
    /// Returns `None` when `node` is the first among its siblings.
    pub fn indent(&mut self, node: NodeKey) -> EditResult<Option<Reparented>> {
        let tree = self.document.tree_mut();
        let old_parent = tree.parent(node)?;
        if !tree.indent_bullet(node)? {
            return Ok(None);
        }
        let new_parent = tree.parent(node)?;
        debug!("event=bullet_indent module=edit status=ok");
        Ok(Some(Reparented {
            node,
            old_parent,
            new_parent,
            render_scope: old_parent,
        }))
    }

    /// Outdents `node` to right after its parent.
    ///
    /// Returns `None` when `node` is already top-level.
    pub fn outdent(&mut self, node: NodeKey) -> EditResult<Option<Reparented>> {
        let tree = self.document.tree_mut();
        let old_parent = tree.parent(node)?;
        if !tree.unindent_bullet(node)? {
            return Ok(None);
        }
        let new_parent = tree.parent(node)?;
        debug!("event=bullet_outdent module=edit status=ok");
        Ok(Some(Reparented {
            node,
            old_parent,
            new_parent,
            render_scope: new_parent,
        }))
    }

    /// Deletes `node` and moves focus to its document-order successor.
    ///
    /// The successor is computed before removal. Without a successor, focus
    /// falls back to the end of the preceding bullet; an emptied document
    /// has no focus. Returns the newly focused bullet.
    pub fn delete(&mut self, node: NodeKey, mode: DeleteMode) -> EditResult<Option<NodeKey>> {
        let tree = self.document.tree_mut();
        let successor = match mode {
            DeleteMode::Promote => tree.next(node)?,
            DeleteMode::Subtree => tree.next_after_subtree(node)?,
        };
        let predecessor = tree.previous(node)?;

        let removed = match mode {
            DeleteMode::Promote => {
                tree.promote_children(node)?;
                tree.remove_node(node)?;
                1
            }
            DeleteMode::Subtree => tree.remove_subtree(node)?.len(),
        };
        debug!(
            "event=bullet_delete module=edit status=ok mode={:?} removed={}",
            mode, removed
        );

        let focus = match (successor, predecessor) {
            (Some(next), _) => Some(Cursor::start(next)),
            (None, Some(previous)) => Some(self.end_of(previous)?),
            (None, None) => None,
        };
        self.document.set_focus(focus);
        Ok(focus.map(|cursor| cursor.node))
    }

    /// Appends an empty top-level bullet at the end (the "+" gesture).
    pub fn append_bullet(&mut self) -> EditResult<NodeKey> {
        let tree = self.document.tree_mut();
        let root = tree.root();
        let created = tree.add_node(new_bullet_id(), DEFAULT_BULLET_TYPE, Meta::new(), "", root)?;
        self.document.set_focus(Some(Cursor::start(created)));
        Ok(created)
    }

    /// Commits edited text for `node`.
    pub fn update_content(&mut self, node: NodeKey, content: &str) -> EditResult<()> {
        self.document.tree_mut().set_content(node, content)?;
        Ok(())
    }

    /// Moves focus to the end of the bullet before `node`, if any.
    pub fn focus_previous(&mut self, node: NodeKey) -> EditResult<Option<NodeKey>> {
        let Some(previous) = self.document.tree().previous(node)? else {
            return Ok(None);
        };
        let cursor = self.end_of(previous)?;
        self.document.set_focus(Some(cursor));
        Ok(Some(previous))
    }

    /// Moves focus to the start of the bullet after `node`, if any.
    pub fn focus_next(&mut self, node: NodeKey) -> EditResult<Option<NodeKey>> {
        let Some(next) = self.document.tree().next(node)? else {
            return Ok(None);
        };
        self.document.set_focus(Some(Cursor::start(next)));
        Ok(Some(next))
    }

    fn end_of(&self, node: NodeKey) -> EditResult<Cursor> {
        let offset = self.document.tree().bullet(node)?.content_len();
        Ok(Cursor { node, offset })
    }
}
