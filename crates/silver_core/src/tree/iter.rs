use super::BulletTree;
use crate::model::{Bullet, Container, NodeKey};

/// One visited bullet of a pre-order traversal.
#[derive(Debug, Clone, Copy)]
pub struct PreOrderItem<'a> {
    pub key: NodeKey,
    /// Depth relative to the traversal start; its children are level 0.
    pub level: usize,
    pub bullet: &'a Bullet,
}

/// Depth-first pre-order traversal below one node, excluding the node.
///
/// This is the document order shared by serialization and up/down
/// navigation.
pub struct PreOrder<'a> {
    tree: &'a BulletTree,
    stack: Vec<(NodeKey, usize)>,
}

impl<'a> PreOrder<'a> {
    pub(crate) fn new(tree: &'a BulletTree, start: NodeKey) -> Self {
        let stack = tree
            .node(start)
            .map(|node| node.children().iter().rev().map(|key| (*key, 0)).collect())
            .unwrap_or_default();
        Self { tree, stack }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = PreOrderItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((key, level)) = self.stack.pop() {
            let Some(bullet) = self.tree.get(key) else {
                continue;
            };
            // Reverse push keeps left-to-right order on pop.
            self.stack
                .extend(bullet.children().iter().rev().map(|child| (*child, level + 1)));
            return Some(PreOrderItem { key, level, bullet });
        }
        None
    }
}
