//! Outline tree: node arena, identity index and structural operations.
//!
//! # Responsibility
//! - Own the root, every live bullet, and the id -> node index.
//! - Provide insertion, removal, indent/outdent and sibling queries.
//!
//! # Invariants
//! - A bullet is reachable from the root iff its id is in the index.
//! - Every bullet appears exactly once in its parent's child list.
//! - Indent/outdent only move a node to an existing sibling or grandparent,
//!   so no bullet can become its own ancestor.
//! - Boundary moves (indent first child, outdent top-level) are no-ops.

mod iter;
mod navigation;

pub use iter::{PreOrder, PreOrderItem};

use crate::model::{
    Bullet, BulletId, BulletValidationError, Container, Meta, Node, NodeKey, RootNode,
    DEFAULT_BULLET_CONTENT, DEFAULT_BULLET_ID, DEFAULT_BULLET_TYPE,
};
use generational_arena::Arena;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors from tree operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Insertion with an id that is already live in this tree.
    DuplicateId(BulletId),
    /// Handle does not name a live node of the expected variant.
    UnknownReference(NodeKey),
    /// Removal of a bullet that still owns children.
    HasChildren { id: BulletId, child_count: usize },
    /// Id or type tag is not representable in the persisted format.
    InvalidField(BulletValidationError),
    /// Internal consistency check failed.
    Inconsistent(String),
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate bullet id: {id}"),
            Self::UnknownReference(key) => write!(f, "unknown tree reference: {key}"),
            Self::HasChildren { id, child_count } => write!(
                f,
                "bullet {id} still has {child_count} children; promote or remove them first"
            ),
            Self::InvalidField(err) => write!(f, "{err}"),
            Self::Inconsistent(details) => write!(f, "inconsistent tree state: {details}"),
        }
    }
}

impl Error for TreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidField(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BulletValidationError> for TreeError {
    fn from(value: BulletValidationError) -> Self {
        Self::InvalidField(value)
    }
}

/// Where a new bullet lands among its parent's children.
#[derive(Debug, Clone, Copy)]
enum Placement {
    Last,
    First,
    After(NodeKey),
}

/// Outline document tree.
#[derive(Debug, Clone)]
pub struct BulletTree {
    arena: Arena<Node>,
    root: NodeKey,
    index: HashMap<BulletId, NodeKey>,
}

impl Default for BulletTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BulletTree {
    /// Creates an empty tree holding only the root.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = NodeKey(arena.insert(Node::Root(RootNode::default())));
        Self {
            arena,
            root,
            index: HashMap::new(),
        }
    }

    /// Creates a tree holding the single seed bullet of a new document.
    pub fn with_default_bullet() -> Self {
        let mut tree = Self::new();
        tree.insert_default_bullet().expect("fresh tree accepts the seed bullet");
        tree
    }

    /// Discards every bullet and the index in one step.
    ///
    /// Handles issued before the reset never resolve again.
    pub fn clear(&mut self) {
        let root = self.root;
        self.arena.retain(|index, _| index == root.0);
        if let Some(node) = self.arena.get_mut(root.0) {
            node.children_mut().clear();
        }
        self.index.clear();
    }

    /// Replaces every bullet with the bullets of `source`, keeping their
    /// order, nesting and fields.
    ///
    /// Bullets are re-homed into this tree's arena, so handles issued before
    /// the call never alias the new bullets.
    pub fn replace_with(&mut self, mut source: BulletTree) {
        self.clear();
        let order: Vec<NodeKey> = source.iter().map(|item| item.key).collect();
        let mut remap = HashMap::with_capacity(order.len() + 1);
        remap.insert(source.root, self.root);

        for old_key in order {
            let Some(Node::Bullet(mut bullet)) = source.arena.remove(old_key.0) else {
                continue;
            };
            // Pre-order guarantees the parent was re-homed first.
            let Some(parent) = remap.get(&bullet.parent).copied() else {
                continue;
            };
            bullet.parent = parent;
            bullet.children.clear();
            let id = bullet.id.clone();
            let key = NodeKey(self.arena.insert(Node::Bullet(bullet)));
            if let Some(container) = self.arena.get_mut(parent.0) {
                container.add_child(key);
            }
            self.index.insert(id, key);
            remap.insert(old_key, key);
        }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of live bullets.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.arena.contains(key.0)
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.arena.get(key.0)
    }

    /// Returns the bullet behind `key`, or `None` for the root or a stale key.
    pub fn get(&self, key: NodeKey) -> Option<&Bullet> {
        self.node(key).and_then(Node::as_bullet)
    }

    /// Resolves a bullet id through the identity index.
    pub fn lookup(&self, id: &str) -> Option<NodeKey> {
        self.index.get(id).copied()
    }

    /// Returns the bullet behind `key` or `UnknownReference`.
    pub fn bullet(&self, key: NodeKey) -> TreeResult<&Bullet> {
        self.get(key).ok_or(TreeError::UnknownReference(key))
    }

    /// Ordered children of the root or a bullet.
    pub fn children(&self, key: NodeKey) -> TreeResult<&[NodeKey]> {
        self.node(key)
            .map(Container::children)
            .ok_or(TreeError::UnknownReference(key))
    }

    /// First-level bullets in document order.
    pub fn top_level(&self) -> &[NodeKey] {
        self.children(self.root).unwrap_or(&[])
    }

    /// Owning container of a bullet; the root for top-level bullets.
    pub fn parent(&self, key: NodeKey) -> TreeResult<NodeKey> {
        Ok(self.bullet(key)?.parent)
    }

    /// Nesting level of a bullet; 0 for top-level bullets.
    pub fn depth(&self, key: NodeKey) -> TreeResult<usize> {
        let mut depth = 0;
        let mut cursor = self.bullet(key)?.parent;
        while let Some(bullet) = self.get(cursor) {
            depth += 1;
            cursor = bullet.parent;
        }
        Ok(depth)
    }

    /// Ids of the bullets from the top level down to `key`, inclusive.
    pub fn path(&self, key: NodeKey) -> TreeResult<Vec<BulletId>> {
        let mut path = Vec::new();
        let mut cursor = key;
        while let Some(bullet) = self.get(cursor) {
            path.push(bullet.id.clone());
            cursor = bullet.parent;
        }
        if path.is_empty() {
            return Err(TreeError::UnknownReference(key));
        }
        path.reverse();
        Ok(path)
    }

    /// Appends a new bullet as the last child of `parent`.
    ///
    /// # Errors
    /// - `DuplicateId` when `id` is already live.
    /// - `InvalidField` when `id` or `kind` cannot be persisted.
    /// - `UnknownReference` when `parent` is not live.
    pub fn add_node(
        &mut self,
        id: impl Into<BulletId>,
        kind: impl Into<String>,
        meta: Meta,
        content: &str,
        parent: NodeKey,
    ) -> TreeResult<NodeKey> {
        self.insert(id.into(), kind.into(), meta, content, parent, Placement::Last)
    }

    /// Inserts a new bullet as the first child of `parent`.
    pub fn add_node_first(
        &mut self,
        id: impl Into<BulletId>,
        kind: impl Into<String>,
        meta: Meta,
        content: &str,
        parent: NodeKey,
    ) -> TreeResult<NodeKey> {
        self.insert(id.into(), kind.into(), meta, content, parent, Placement::First)
    }

    /// Inserts a new bullet right after `reference` under `parent`.
    ///
    /// When `reference` is not a child of `parent` the bullet is appended.
    pub fn add_node_after(
        &mut self,
        id: impl Into<BulletId>,
        kind: impl Into<String>,
        meta: Meta,
        content: &str,
        parent: NodeKey,
        reference: NodeKey,
    ) -> TreeResult<NodeKey> {
        self.insert(
            id.into(),
            kind.into(),
            meta,
            content,
            parent,
            Placement::After(reference),
        )
    }

    fn insert(
        &mut self,
        id: BulletId,
        kind: String,
        meta: Meta,
        content: &str,
        parent: NodeKey,
        placement: Placement,
    ) -> TreeResult<NodeKey> {
        if !self.contains(parent) {
            return Err(TreeError::UnknownReference(parent));
        }
        if self.index.contains_key(&id) {
            return Err(TreeError::DuplicateId(id));
        }

        let bullet = Bullet::new(id, kind, meta, content, parent)?;
        let id = bullet.id.clone();
        let key = NodeKey(self.arena.insert(Node::Bullet(bullet)));
        let container = self.container_mut(parent)?;
        match placement {
            Placement::Last => container.add_child(key),
            Placement::First => container.add_child_first(key),
            Placement::After(reference) => container.add_child_after(key, reference),
        }
        self.index.insert(id, key);
        Ok(key)
    }

    /// Appends the seed bullet of a new document under the root.
    pub(crate) fn insert_default_bullet(&mut self) -> TreeResult<NodeKey> {
        let root = self.root;
        self.add_node(
            DEFAULT_BULLET_ID,
            DEFAULT_BULLET_TYPE,
            Meta::new(),
            DEFAULT_BULLET_CONTENT,
            root,
        )
    }

    /// Detaches a childless bullet from its parent and the index.
    ///
    /// Children are never promoted or dropped implicitly: call
    /// [`BulletTree::promote_children`] or [`BulletTree::remove_subtree`]
    /// first.
    ///
    /// # Errors
    /// - `UnknownReference` when `key` is not a live bullet.
    /// - `HasChildren` when the bullet still owns children.
    pub fn remove_node(&mut self, key: NodeKey) -> TreeResult<Bullet> {
        let bullet = self.bullet(key)?;
        if !bullet.children.is_empty() {
            return Err(TreeError::HasChildren {
                id: bullet.id.clone(),
                child_count: bullet.children.len(),
            });
        }
        let parent = bullet.parent;
        self.container_mut(parent)?.remove_child(key);
        self.detach_from_arena(key)
    }

    /// Moves every child of `key` into its parent, right after `key`.
    ///
    /// Returns the number of promoted children.
    pub fn promote_children(&mut self, key: NodeKey) -> TreeResult<usize> {
        let parent = self.bullet(key)?.parent;
        let (_, position) = self.siblings_of(key)?;
        let children = std::mem::take(&mut self.bullet_mut(key)?.children);

        let container = self.container_mut(parent)?;
        for (offset, child) in children.iter().enumerate() {
            container.add_child_at_position(*child, position + 1 + offset);
        }
        for child in &children {
            self.bullet_mut(*child)?.parent = parent;
        }
        Ok(children.len())
    }

    /// Removes `key` together with every descendant.
    ///
    /// Returns the removed bullets in document order.
    pub fn remove_subtree(&mut self, key: NodeKey) -> TreeResult<Vec<Bullet>> {
        let parent = self.bullet(key)?.parent;
        let mut doomed = vec![key];
        doomed.extend(self.descendants(key)?);

        self.container_mut(parent)?.remove_child(key);
        doomed
            .into_iter()
            .map(|doomed_key| self.detach_from_arena(doomed_key))
            .collect()
    }

    fn detach_from_arena(&mut self, key: NodeKey) -> TreeResult<Bullet> {
        self.bullet(key)?;
        match self.arena.remove(key.0) {
            Some(Node::Bullet(bullet)) => {
                self.index.remove(&bullet.id);
                Ok(bullet)
            }
            _ => Err(TreeError::Inconsistent(format!(
                "{key} vanished during removal"
            ))),
        }
    }

    /// Makes `key` the last child of its preceding sibling.
    ///
    /// Returns `false` (tree unchanged) when `key` is the first child.
    pub fn indent_bullet(&mut self, key: NodeKey) -> TreeResult<bool> {
        let Some(new_parent) = self.left_sibling(key)? else {
            return Ok(false);
        };
        let old_parent = self.bullet(key)?.parent;

        self.container_mut(old_parent)?.remove_child(key);
        self.container_mut(new_parent)?.add_child(key);
        self.bullet_mut(key)?.parent = new_parent;
        Ok(true)
    }

    /// Moves `key` out of its parent to right after that parent.
    ///
    /// Returns `false` (tree unchanged) when `key` is a top-level bullet.
    pub fn unindent_bullet(&mut self, key: NodeKey) -> TreeResult<bool> {
        let old_parent = self.bullet(key)?.parent;
        let Some(grandparent) = self.get(old_parent).map(|parent| parent.parent) else {
            return Ok(false);
        };

        self.container_mut(old_parent)?.remove_child(key);
        self.container_mut(grandparent)?.add_child_after(key, old_parent);
        self.bullet_mut(key)?.parent = grandparent;
        Ok(true)
    }

    /// Sibling right before `key`, if any.
    pub fn left_sibling(&self, key: NodeKey) -> TreeResult<Option<NodeKey>> {
        let (siblings, position) = self.siblings_of(key)?;
        Ok(position.checked_sub(1).map(|left| siblings[left]))
    }

    /// Sibling right after `key`, if any.
    pub fn right_sibling(&self, key: NodeKey) -> TreeResult<Option<NodeKey>> {
        let (siblings, position) = self.siblings_of(key)?;
        Ok(siblings.get(position + 1).copied())
    }

    /// Follows last children from `key` down to a leaf; `key` itself when it
    /// has no children.
    pub fn deepest_last_descendant(&self, key: NodeKey) -> TreeResult<NodeKey> {
        let mut cursor = key;
        let mut children = self.bullet(key)?.children();
        while let Some(last) = children.last() {
            cursor = *last;
            children = self.children(cursor)?;
        }
        Ok(cursor)
    }

    /// Replaces bullet content; line breaks become spaces.
    pub fn set_content(&mut self, key: NodeKey, content: &str) -> TreeResult<()> {
        self.bullet_mut(key)?.content = crate::model::normalize_content(content);
        Ok(())
    }

    /// Mutable access to bullet metadata.
    pub fn meta_mut(&mut self, key: NodeKey) -> TreeResult<&mut Meta> {
        Ok(&mut self.bullet_mut(key)?.meta)
    }

    /// Depth-first pre-order traversal of all bullets with their levels.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::new(self, self.root)
    }

    /// Every descendant of `key` in document order, excluding `key`.
    pub fn descendants(&self, key: NodeKey) -> TreeResult<Vec<NodeKey>> {
        if !self.contains(key) {
            return Err(TreeError::UnknownReference(key));
        }
        Ok(PreOrder::new(self, key).map(|item| item.key).collect())
    }

    /// Checks every structural invariant.
    ///
    /// # Errors
    /// - `Inconsistent` naming the first violated invariant.
    pub fn validate(&self) -> TreeResult<()> {
        let inconsistent = |details: String| Err(TreeError::Inconsistent(details));

        let mut reachable = HashSet::new();
        for item in self.iter() {
            if !reachable.insert(item.key) {
                return inconsistent(format!("{} reachable more than once", item.key));
            }
            match self.index.get(&item.bullet.id) {
                Some(indexed) if *indexed == item.key => {}
                _ => {
                    return inconsistent(format!(
                        "bullet {} missing from index or indexed elsewhere",
                        item.bullet.id
                    ))
                }
            }
            let Some(parent) = self.node(item.bullet.parent) else {
                return inconsistent(format!("bullet {} has a dangling parent", item.bullet.id));
            };
            let occurrences = parent
                .children()
                .iter()
                .filter(|child| **child == item.key)
                .count();
            if occurrences != 1 {
                return inconsistent(format!(
                    "bullet {} appears {occurrences} times in its parent's children",
                    item.bullet.id
                ));
            }
        }

        if reachable.len() != self.index.len() {
            return inconsistent(format!(
                "{} indexed bullets but {} reachable",
                self.index.len(),
                reachable.len()
            ));
        }
        // The root occupies one extra arena slot.
        if self.arena.len() != self.index.len() + 1 {
            return inconsistent(format!(
                "{} arena nodes for {} indexed bullets",
                self.arena.len(),
                self.index.len()
            ));
        }
        Ok(())
    }

    fn siblings_of(&self, key: NodeKey) -> TreeResult<(&[NodeKey], usize)> {
        let parent = self.bullet(key)?.parent;
        let siblings = self.children(parent)?;
        let position = siblings.iter().position(|child| *child == key).ok_or_else(|| {
            TreeError::Inconsistent(format!("{key} missing from its parent's children"))
        })?;
        Ok((siblings, position))
    }

    fn bullet_mut(&mut self, key: NodeKey) -> TreeResult<&mut Bullet> {
        self.arena
            .get_mut(key.0)
            .and_then(Node::as_bullet_mut)
            .ok_or(TreeError::UnknownReference(key))
    }

    fn container_mut(&mut self, key: NodeKey) -> TreeResult<&mut Node> {
        self.arena
            .get_mut(key.0)
            .ok_or(TreeError::UnknownReference(key))
    }
}

#[cfg(test)]
mod tests {
    use super::{BulletTree, TreeError};
    use crate::model::Meta;

    fn ids(tree: &BulletTree) -> Vec<(usize, String)> {
        tree.iter()
            .map(|item| (item.level, item.bullet.id().to_string()))
            .collect()
    }

    #[test]
    fn clear_resets_to_root_only() {
        let mut tree = BulletTree::with_default_bullet();
        let stale = tree.lookup("hello-0").unwrap();
        tree.clear();

        assert!(tree.is_empty());
        assert!(tree.get(stale).is_none());
        assert!(tree.top_level().is_empty());
        tree.validate().unwrap();
    }

    #[test]
    fn replace_with_rehomes_bullets_and_retires_old_handles() {
        let mut tree = BulletTree::with_default_bullet();
        let stale = tree.lookup("hello-0").unwrap();

        let mut source = BulletTree::new();
        let root = source.root();
        let a = source.add_node("a", "text", Meta::new(), "A", root).unwrap();
        source.add_node("b", "text", Meta::new(), "B", a).unwrap();
        source.add_node("c", "text", Meta::new(), "C", root).unwrap();

        tree.replace_with(source);

        assert!(tree.get(stale).is_none());
        assert_eq!(
            ids(&tree),
            vec![
                (0, "a".to_string()),
                (1, "b".to_string()),
                (0, "c".to_string())
            ]
        );
        tree.validate().unwrap();
    }

    #[test]
    fn remove_node_refuses_bullets_with_children() {
        let mut tree = BulletTree::new();
        let root = tree.root();
        let a = tree.add_node("a", "text", Meta::new(), "A", root).unwrap();
        tree.add_node("b", "text", Meta::new(), "B", a).unwrap();

        let err = tree.remove_node(a).unwrap_err();
        assert_eq!(
            err,
            TreeError::HasChildren {
                id: "a".to_string(),
                child_count: 1
            }
        );
        tree.validate().unwrap();
    }

    #[test]
    fn promote_children_keeps_order_in_place() {
        let mut tree = BulletTree::new();
        let root = tree.root();
        let a = tree.add_node("a", "text", Meta::new(), "", root).unwrap();
        tree.add_node("a1", "text", Meta::new(), "", a).unwrap();
        tree.add_node("a2", "text", Meta::new(), "", a).unwrap();
        tree.add_node("b", "text", Meta::new(), "", root).unwrap();

        assert_eq!(tree.promote_children(a).unwrap(), 2);
        tree.remove_node(a).unwrap();

        assert_eq!(
            ids(&tree),
            vec![
                (0, "a1".to_string()),
                (0, "a2".to_string()),
                (0, "b".to_string())
            ]
        );
        tree.validate().unwrap();
    }

    #[test]
    fn remove_root_is_unknown_reference() {
        let mut tree = BulletTree::with_default_bullet();
        let root = tree.root();
        assert_eq!(
            tree.remove_node(root).unwrap_err(),
            TreeError::UnknownReference(root)
        );
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn depth_and_path_follow_parent_chain() {
        let mut tree = BulletTree::new();
        let root = tree.root();
        let a = tree.add_node("a", "text", Meta::new(), "", root).unwrap();
        let b = tree.add_node("b", "text", Meta::new(), "", a).unwrap();
        let c = tree.add_node("c", "text", Meta::new(), "", b).unwrap();

        assert_eq!(tree.depth(a).unwrap(), 0);
        assert_eq!(tree.depth(c).unwrap(), 2);
        assert_eq!(tree.path(c).unwrap(), vec!["a", "b", "c"]);
        assert!(matches!(
            tree.depth(root),
            Err(TreeError::UnknownReference(key)) if key == root
        ));
    }
}
