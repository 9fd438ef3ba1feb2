//! Node variants and ordered child-list primitives.

use super::bullet::Bullet;
use generational_arena::Index;
use std::fmt::{Display, Formatter};

/// Stable handle of one node inside a `BulletTree` arena.
///
/// Handles survive re-parenting. A handle of a removed node never resolves
/// again, even if its arena slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(pub(crate) Index);

impl Display for NodeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "node#{slot}.{generation}")
    }
}

/// Ordered child-list capability shared by the root and bullets.
///
/// These are structural primitives only; the caller keeps the tree's identity
/// index and the children's parent handles in sync.
pub trait Container {
    fn children(&self) -> &[NodeKey];

    fn children_mut(&mut self) -> &mut Vec<NodeKey>;

    /// Appends `child` as the last child.
    fn add_child(&mut self, child: NodeKey) {
        self.children_mut().push(child);
    }

    /// Prepends `child` as the first child.
    fn add_child_first(&mut self, child: NodeKey) {
        self.children_mut().insert(0, child);
    }

    /// Inserts `child` at `position`.
    ///
    /// # Panics
    /// - When `position` is greater than the current child count.
    fn add_child_at_position(&mut self, child: NodeKey, position: usize) {
        let len = self.children().len();
        assert!(
            position <= len,
            "child position {position} out of range for {len} children"
        );
        self.children_mut().insert(position, child);
    }

    /// Inserts `child` right after `reference`, or appends when `reference`
    /// is not a child of this container.
    fn add_child_after(&mut self, child: NodeKey, reference: NodeKey) {
        match self.position_of(reference) {
            Some(position) => self.add_child_at_position(child, position + 1),
            None => self.add_child(child),
        }
    }

    fn position_of(&self, child: NodeKey) -> Option<usize> {
        self.children().iter().position(|key| *key == child)
    }

    /// Removes `child` and returns its former position.
    fn remove_child(&mut self, child: NodeKey) -> Option<usize> {
        let position = self.position_of(child)?;
        self.children_mut().remove(position);
        Some(position)
    }
}

/// Invisible per-document anchor owning all top-level bullets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootNode {
    children: Vec<NodeKey>,
}

impl Container for RootNode {
    fn children(&self) -> &[NodeKey] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<NodeKey> {
        &mut self.children
    }
}

/// One arena entry: either the root or a bullet.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Root(RootNode),
    Bullet(Bullet),
}

impl Node {
    pub fn as_bullet(&self) -> Option<&Bullet> {
        match self {
            Self::Bullet(bullet) => Some(bullet),
            Self::Root(_) => None,
        }
    }

    pub fn as_bullet_mut(&mut self) -> Option<&mut Bullet> {
        match self {
            Self::Bullet(bullet) => Some(bullet),
            Self::Root(_) => None,
        }
    }
}

impl Container for Node {
    fn children(&self) -> &[NodeKey] {
        match self {
            Self::Root(root) => root.children(),
            Self::Bullet(bullet) => bullet.children(),
        }
    }

    fn children_mut(&mut self) -> &mut Vec<NodeKey> {
        match self {
            Self::Root(root) => root.children_mut(),
            Self::Bullet(bullet) => bullet.children_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Container, NodeKey, RootNode};
    use generational_arena::Index;

    fn key(slot: usize) -> NodeKey {
        NodeKey(Index::from_raw_parts(slot, 0))
    }

    fn keys(root: &RootNode) -> Vec<usize> {
        root.children()
            .iter()
            .map(|key| key.0.into_raw_parts().0)
            .collect()
    }

    #[test]
    fn add_child_variants_keep_requested_order() {
        let mut root = RootNode::default();
        root.add_child(key(1));
        root.add_child(key(3));
        root.add_child_first(key(0));
        root.add_child_at_position(key(2), 2);
        root.add_child_after(key(4), key(3));
        assert_eq!(keys(&root), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn add_child_after_unknown_reference_appends() {
        let mut root = RootNode::default();
        root.add_child(key(1));
        root.add_child_after(key(2), key(9));
        assert_eq!(keys(&root), vec![1, 2]);
    }

    #[test]
    fn remove_child_reports_former_position() {
        let mut root = RootNode::default();
        root.add_child(key(1));
        root.add_child(key(2));
        assert_eq!(root.remove_child(key(2)), Some(1));
        assert_eq!(root.remove_child(key(2)), None);
        assert_eq!(keys(&root), vec![1]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn add_child_at_position_past_end_panics() {
        let mut root = RootNode::default();
        root.add_child_at_position(key(1), 1);
    }
}
