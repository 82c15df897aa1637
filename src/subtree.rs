//! Read-only views of a tree's subtrees.
//!
//! A [`Subtree`] is a node id paired with a shared borrow of its tree. It is
//! `Copy`, never frees anything, and every query on it stays within the
//! viewed subtree:
//!
//! ```text
//!           5
//!         ┌─┴─┐
//!       ┌─3─┐ 8        tree.subtree(3) ──► ┌─3─┐
//!       1   4                              1   4
//! ```

use std::fmt;

use crate::balance;
use crate::iter::{self, Cursor, Iter, Order, Snapshot};
use crate::node::{self, NodeId};
use crate::{Pair, Tree};

/// A borrowed view of the subtree rooted at one node.
///
/// Obtained from [`Tree::subtree`]. The tree cannot be mutated or dropped
/// while a view exists.
pub struct Subtree<'t, V> {
	tree: &'t Tree<V>,
	root: NodeId,
}

impl<V> Clone for Subtree<'_, V> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<V> Copy for Subtree<'_, V> {}

#[allow(clippy::len_without_is_empty)]
impl<'t, V> Subtree<'t, V> {
	pub(crate) fn new(tree: &'t Tree<V>, root: NodeId) -> Subtree<'t, V> {
		Subtree {
			tree,
			root,
		}
	}

	fn view(&self, id: Option<NodeId>) -> Option<Subtree<'t, V>> {
		id.map(|id| Subtree::new(self.tree, id))
	}

	/// Key of the subtree's root.
	pub fn key(&self) -> u64 {
		self.tree.nodes[self.root].key
	}

	/// Value of the subtree's root.
	pub fn value(&self) -> &'t V {
		let tree: &'t Tree<V> = self.tree;
		&tree.nodes[self.root].value
	}

	/// Number of nodes in the subtree, the root included. Never zero.
	pub fn len(&self) -> usize {
		node::count(&self.tree.nodes, Some(self.root))
	}

	/// Number of levels in the subtree. A leaf has height 1.
	pub fn height(&self) -> usize {
		node::level_height(&self.tree.nodes, Some(self.root))
	}

	/// Returns `true` if the root has no children.
	pub fn is_leaf(&self) -> bool {
		self.tree.nodes[self.root].is_leaf()
	}

	/// View of the left child's subtree.
	pub fn left(&self) -> Option<Subtree<'t, V>> {
		self.view(self.tree.nodes[self.root].left)
	}

	/// View of the right child's subtree.
	pub fn right(&self) -> Option<Subtree<'t, V>> {
		self.view(self.tree.nodes[self.root].right)
	}

	/// Searches only below (and including) this subtree's root.
	pub fn search(&self, key: u64) -> Option<&'t V> {
		let tree: &'t Tree<V> = self.tree;
		node::find(&tree.nodes, Some(self.root), key).map(|id| &tree.nodes[id].value)
	}

	pub fn contains_key(&self, key: u64) -> bool {
		node::find(&self.tree.nodes, Some(self.root), key).is_some()
	}

	/// Narrows the view to the subtree rooted at `key`.
	pub fn subtree(&self, key: u64) -> Option<Subtree<'t, V>> {
		self.view(node::find(&self.tree.nodes, Some(self.root), key))
	}

	pub fn cursor(&self, order: Order) -> Cursor<'t, V> {
		let tree: &'t Tree<V> = self.tree;
		Cursor::new(&tree.nodes, Some(self.root), order)
	}

	pub fn iter(&self, order: Order) -> Iter<'t, V> {
		let tree: &'t Tree<V> = self.tree;
		Iter::new(&tree.nodes, Some(self.root), order)
	}

	pub fn keys(&self, order: Order) -> Vec<u64> {
		iter::collect_exact(&self.tree.nodes, Some(self.root), order, self.len(), |node| node.key)
	}

	/// Returns `true` if the subtree satisfies the AVL property on its own.
	pub fn is_balanced(&self) -> bool {
		balance::is_avl(&self.tree.nodes, Some(self.root))
	}
}

impl<V: Clone> Subtree<'_, V> {
	fn pair_at(&self, id: NodeId) -> Pair<V> {
		let node = &self.tree.nodes[id];
		Pair::new(node.key, node.value.clone())
	}

	/// Copy of the root's key and value.
	pub fn pair(&self) -> Pair<V> {
		self.pair_at(self.root)
	}

	pub fn min(&self) -> Pair<V> {
		self.pair_at(node::leftmost(&self.tree.nodes, self.root))
	}

	pub fn max(&self) -> Pair<V> {
		self.pair_at(node::rightmost(&self.tree.nodes, self.root))
	}

	pub fn snapshot(&self, order: Order) -> Snapshot<V> {
		Snapshot::new(&self.tree.nodes, Some(self.root), order)
	}

	pub fn values(&self, order: Order) -> Vec<V> {
		iter::collect_exact(&self.tree.nodes, Some(self.root), order, self.len(), |node| {
			node.value.clone()
		})
	}

	pub fn items(&self, order: Order) -> Vec<Pair<V>> {
		iter::collect_exact(&self.tree.nodes, Some(self.root), order, self.len(), |node| {
			Pair::new(node.key, node.value.clone())
		})
	}
}

impl<V: fmt::Debug> fmt::Debug for Subtree<'_, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.iter(Order::InOrder)).finish()
	}
}
