//! Document-order navigation between bullets.
//!
//! `previous` and `next` walk the same depth-first pre-order that the codec
//! serializes, so moving focus up/down visits bullets in file order.

use super::{BulletTree, TreeResult};
use crate::model::NodeKey;

impl BulletTree {
    /// Bullet right before `key` in document order.
    ///
    /// The deepest last descendant of the left sibling when one exists,
    /// otherwise the parent bullet, otherwise none.
    pub fn previous(&self, key: NodeKey) -> TreeResult<Option<NodeKey>> {
        if let Some(left) = self.left_sibling(key)? {
            return self.deepest_last_descendant(left).map(Some);
        }
        let parent = self.parent(key)?;
        Ok(self.get(parent).map(|_| parent))
    }

    /// Bullet right after `key` in document order.
    ///
    /// The first child when one exists, otherwise the nearest right sibling
    /// of `key` or of one of its ancestors.
    pub fn next(&self, key: NodeKey) -> TreeResult<Option<NodeKey>> {
        if let Some(first) = self.bullet(key)?.children.first() {
            return Ok(Some(*first));
        }
        self.next_after_subtree(key)
    }

    /// First bullet after the whole subtree of `key` in document order.
    pub fn next_after_subtree(&self, key: NodeKey) -> TreeResult<Option<NodeKey>> {
        let mut cursor = key;
        loop {
            if let Some(right) = self.right_sibling(cursor)? {
                return Ok(Some(right));
            }
            let parent = self.parent(cursor)?;
            if self.get(parent).is_none() {
                return Ok(None);
            }
            cursor = parent;
        }
    }

    /// First bullet of the document, if any.
    pub fn first(&self) -> Option<NodeKey> {
        self.top_level().first().copied()
    }

    /// Last bullet of the document in document order, if any.
    pub fn last(&self) -> Option<NodeKey> {
        let last_top = self.top_level().last().copied()?;
        self.deepest_last_descendant(last_top).ok()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Meta;
    use crate::tree::BulletTree;

    #[test]
    fn walking_next_visits_document_order() {
        let mut tree = BulletTree::new();
        let root = tree.root();
        let a = tree.add_node("a", "text", Meta::new(), "", root).unwrap();
        let a1 = tree.add_node("a1", "text", Meta::new(), "", a).unwrap();
        tree.add_node("a1x", "text", Meta::new(), "", a1).unwrap();
        tree.add_node("b", "text", Meta::new(), "", root).unwrap();

        let mut visited = Vec::new();
        let mut cursor = tree.first();
        while let Some(key) = cursor {
            visited.push(tree.bullet(key).unwrap().id().to_string());
            cursor = tree.next(key).unwrap();
        }
        assert_eq!(visited, vec!["a", "a1", "a1x", "b"]);
    }

    #[test]
    fn previous_of_first_bullet_is_none() {
        let tree = BulletTree::with_default_bullet();
        let first = tree.first().unwrap();
        assert_eq!(tree.previous(first).unwrap(), None);
        assert_eq!(tree.next(first).unwrap(), None);
    }

    #[test]
    fn previous_climbs_to_parent_for_first_child() {
        let mut tree = BulletTree::new();
        let root = tree.root();
        let a = tree.add_node("a", "text", Meta::new(), "", root).unwrap();
        let a1 = tree.add_node("a1", "text", Meta::new(), "", a).unwrap();
        let b = tree.add_node("b", "text", Meta::new(), "", root).unwrap();

        assert_eq!(tree.previous(a1).unwrap(), Some(a));
        assert_eq!(tree.previous(b).unwrap(), Some(a1));
        assert_eq!(tree.next_after_subtree(a).unwrap(), Some(b));
        assert_eq!(tree.last(), Some(b));
    }
}
