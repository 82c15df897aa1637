//! # Oaktree: An Arena-Backed Binary Search Tree
//!
//! This crate provides an ordered key/value binary search tree with
//! **explicit AVL balancing** and **resumable traversal cursors**.
//!
//! ## Design Overview
//!
//! ### Key Concepts
//!
//! **Arena Storage**: Nodes live in a slab and link to each other through
//! stable indices. Child links own their subtree; the parent link is a plain
//! index with no ownership, so every node can reach its parent without
//! creating a reference cycle.
//!
//! **Ordering Convention**: A key strictly smaller than a visited node goes
//! left, anything else (including an equal key) goes right. Duplicates are
//! allowed and accumulate in right subtrees. In-order traversal always yields
//! keys in non-decreasing order.
//!
//! **Explicit Balancing**: `insert` and `remove` never restructure the tree.
//! Callers decide when to pay for rebalancing by calling [`Tree::balance`],
//! typically after a batch of changes. Balancing restores the AVL property
//! (subtree heights differ by at most one at every node) with rotations.
//!
//! **Cursors**: Every traversal order ([`Order`]) is available as a
//! step-by-step [`Cursor`], as a plain Rust iterator ([`Iter`]), or as an
//! owned, eagerly captured [`Snapshot`] that survives later mutation.
//!
//! ### Tree Structure
//!
//! ```text
//!            ┌────────────────────┐
//!            │ Tree               │
//!            │  root ─────────┐   │
//!            │  nodes: Arena  │   │
//!            └────────────────┼───┘
//!                             ▼
//!                        ┌─────────┐
//!                        │ key: 5  │ <- parent: None
//!                        └─┬─────┬─┘
//!                  left    │     │    right
//!                  ┌───────┘     └───────┐
//!                  ▼                     ▼
//!             ┌─────────┐           ┌─────────┐
//!             │ key: 3  │           │ key: 8  │ <- parent: #0 (non-owning)
//!             └─────────┘           └─────────┘
//! ```
//!
//! ## Basic Usage
//!
//! ```
//! use oaktree::{Order, Tree};
//!
//! let mut tree = Tree::new();
//!
//! // Insert key-value pairs
//! for key in 1..=7 {
//!     tree.insert(key, key * 100);
//! }
//!
//! // Sequential inserts build a chain
//! assert_eq!(tree.height(), 7);
//!
//! // Rebalance explicitly
//! tree.balance();
//! assert_eq!(tree.height(), 3);
//! assert!(tree.is_balanced());
//!
//! // Lookups
//! assert_eq!(tree.search(4), Some(&400));
//! assert_eq!(tree.min().map(|p| p.key), Some(1));
//!
//! // Traversals
//! assert_eq!(tree.keys(Order::BreadthFirst), vec![4, 2, 6, 1, 3, 5, 7]);
//!
//! // Removal
//! assert_eq!(tree.remove(4), Some(400));
//! assert_eq!(tree.len(), 6);
//! ```
//!
//! ## Thread Safety
//!
//! The tree is a plain single-threaded container. Every mutation takes
//! `&mut self` and every cursor borrows the tree, so the borrow checker
//! rules out mutation during traversal.

use std::fmt;

use tracing::{debug, trace};

pub mod balance;
pub mod error;
pub mod iter;
mod node;
mod subtree;
#[cfg(test)]
mod util;

pub use balance::Rotation;
pub use error::{Error, Result};
pub use iter::{Cursor, Iter, Order, Snapshot};
pub use subtree::Subtree;

use node::{Arena, Node, NodeId};

// ---------------------------------------------------------------------------
// Public Types
// ---------------------------------------------------------------------------

/// A key and a copy of its value.
///
/// Pairs returned by queries and cursors are detached from the tree: later
/// changes to the tree never affect a pair already handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pair<V> {
	pub key: u64,
	pub value: V,
}

impl<V> Pair<V> {
	pub fn new(key: u64, value: V) -> Pair<V> {
		Pair {
			key,
			value,
		}
	}
}

impl<V> From<Pair<V>> for (u64, V) {
	fn from(pair: Pair<V>) -> (u64, V) {
		(pair.key, pair.value)
	}
}

impl<V> From<(u64, V)> for Pair<V> {
	fn from((key, value): (u64, V)) -> Pair<V> {
		Pair::new(key, value)
	}
}

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

/// An ordered key/value binary search tree with explicit AVL balancing.
///
/// # Internal Structure
///
/// - `nodes`: the arena that owns every node. Its occupied-slot count is the
///   tree's node count.
/// - `root`: id of the root node, `None` for an empty tree.
///
/// Invariants (checked by `assert_invariants` in tests):
/// - every node reachable from `root` is occupied, and nothing else is
/// - each non-root node's `parent` is its structural parent; the root has none
/// - keys in a left subtree are `<=` the node's key, keys in a right subtree `>=`
#[derive(Clone)]
pub struct Tree<V> {
	nodes: Arena<V>,
	root: Option<NodeId>,
}

impl<V> Default for Tree<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V> Tree<V> {
	// -----------------------------------------------------------------------
	// Construction
	// -----------------------------------------------------------------------

	/// Creates a new, empty tree. Does not allocate.
	///
	/// # Example
	///
	/// ```
	/// use oaktree::Tree;
	///
	/// let tree: Tree<String> = Tree::new();
	/// assert!(tree.is_empty());
	/// assert_eq!(tree.height(), 0);
	/// ```
	pub const fn new() -> Self {
		Tree {
			nodes: Arena::new(),
			root: None,
		}
	}

	/// Creates an empty tree with room for `capacity` nodes before reallocating.
	pub fn with_capacity(capacity: usize) -> Self {
		Tree {
			nodes: Arena::with_capacity(capacity),
			root: None,
		}
	}

	// -----------------------------------------------------------------------
	// Tree Metadata
	// -----------------------------------------------------------------------

	/// Returns the number of nodes in the tree.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Returns `true` if the tree contains no nodes.
	pub fn is_empty(&self) -> bool {
		self.root.is_none()
	}

	/// Returns the number of levels in the tree.
	///
	/// An empty tree has height 0 and a single node has height 1. Computed
	/// with a level-order walk, so it costs O(n).
	///
	/// # Example
	///
	/// ```
	/// use oaktree::Tree;
	///
	/// let tree: Tree<()> = [(5, ()), (3, ()), (8, ()), (1, ())].into_iter().collect();
	/// assert_eq!(tree.height(), 3);
	/// ```
	pub fn height(&self) -> usize {
		node::level_height(&self.nodes, self.root)
	}

	// -----------------------------------------------------------------------
	// Public API: Read Operations
	// -----------------------------------------------------------------------

	/// Returns a reference to the value stored under `key`.
	///
	/// With duplicate keys, returns the one closest to the root.
	///
	/// # Example
	///
	/// ```
	/// use oaktree::Tree;
	///
	/// let mut tree = Tree::new();
	/// tree.insert(1, "one");
	///
	/// assert_eq!(tree.search(1), Some(&"one"));
	/// assert_eq!(tree.search(2), None);
	/// ```
	pub fn search(&self, key: u64) -> Option<&V> {
		node::find(&self.nodes, self.root, key).map(|id| &self.nodes[id].value)
	}

	/// Returns a mutable reference to the value stored under `key`.
	pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
		let id = node::find(&self.nodes, self.root, key)?;
		Some(&mut self.nodes[id].value)
	}

	/// Returns `true` if the tree contains `key`.
	pub fn contains_key(&self, key: u64) -> bool {
		node::find(&self.nodes, self.root, key).is_some()
	}

	/// Returns a read-only view of the subtree rooted at `key`.
	///
	/// The view borrows the tree; it cannot outlive it, mutate it, or free
	/// any of its nodes.
	///
	/// # Example
	///
	/// ```
	/// use oaktree::{Order, Tree};
	///
	/// let tree: Tree<()> = [5, 3, 8, 1, 4].into_iter().map(|k| (k, ())).collect();
	///
	/// let sub = tree.subtree(3).unwrap();
	/// assert_eq!(sub.keys(Order::InOrder), vec![1, 3, 4]);
	/// assert_eq!(sub.len(), 3);
	/// ```
	pub fn subtree(&self, key: u64) -> Option<Subtree<'_, V>> {
		node::find(&self.nodes, self.root, key).map(|id| Subtree::new(self, id))
	}

	// -----------------------------------------------------------------------
	// Public API: Write Operations
	// -----------------------------------------------------------------------

	/// Inserts a key-value pair as a new leaf.
	///
	/// Duplicate keys are not merged: each insert adds a node, and a key equal
	/// to a visited node descends to the right. The tree is not rebalanced.
	///
	/// # Example
	///
	/// ```
	/// use oaktree::{Order, Tree};
	///
	/// let mut tree = Tree::new();
	/// tree.insert(2, "first");
	/// tree.insert(2, "second");
	///
	/// assert_eq!(tree.len(), 2);
	/// assert_eq!(tree.values(Order::PreOrder), vec!["first", "second"]);
	/// ```
	pub fn insert(&mut self, key: u64, value: V) {
		let mut parent = None;
		let mut go_left = false;
		let mut cursor = self.root;

		while let Some(id) = cursor {
			let node = &self.nodes[id];
			parent = Some(id);
			go_left = node.key > key;
			cursor = if go_left {
				node.left
			} else {
				node.right
			};
		}

		// Allocate before linking so the existing structure is untouched if this fails
		let id = self.nodes.alloc(Node::leaf(key, value, parent));

		match parent {
			None => self.root = Some(id),
			Some(parent) if go_left => self.nodes[parent].left = Some(id),
			Some(parent) => self.nodes[parent].right = Some(id),
		}

		trace!(key, ?id, ?parent, "inserted");
	}

	/// Removes `key` from the tree, returning its value if it existed.
	///
	/// Removing a missing key does nothing.
	///
	/// # Algorithm
	///
	/// 1. Leaf: detach it from its parent
	/// 2. One child: splice the child into the node's position
	/// 3. Two children: unlink the in-order predecessor (the rightmost node of
	///    the left subtree, which has no right child) and move its key and
	///    value into the node being removed
	///
	/// # Example
	///
	/// ```
	/// use oaktree::Tree;
	///
	/// let mut tree = Tree::new();
	/// tree.insert(1, "one");
	///
	/// assert_eq!(tree.remove(1), Some("one"));
	/// assert_eq!(tree.remove(1), None); // Already removed
	/// ```
	pub fn remove(&mut self, key: u64) -> Option<V> {
		let id = node::find(&self.nodes, self.root, key)?;
		let node = &self.nodes[id];

		let value = match (node.left, node.right) {
			(Some(left), Some(_)) => {
				let predecessor = node::rightmost(&self.nodes, left);
				let Node {
					key: promoted_key,
					value: promoted_value,
					..
				} = self.unlink(predecessor);

				trace!(key, promoted = promoted_key, "removed node with two children");

				let target = &mut self.nodes[id];
				target.key = promoted_key;
				std::mem::replace(&mut target.value, promoted_value)
			}
			_ => self.unlink(id).value,
		};

		Some(value)
	}

	/// Removes every node. Values are dropped along with their nodes.
	pub fn clear(&mut self) {
		debug!(nodes = self.len(), "clearing tree");
		self.nodes.clear();
		self.root = None;
	}

	// -----------------------------------------------------------------------
	// Traversal
	// -----------------------------------------------------------------------

	/// Creates a cursor over the whole tree in the given order.
	pub fn cursor(&self, order: Order) -> Cursor<'_, V> {
		Cursor::new(&self.nodes, self.root, order)
	}

	/// Iterates over `(key, &value)` in the given order.
	///
	/// # Example
	///
	/// ```
	/// use oaktree::{Order, Tree};
	///
	/// let tree: Tree<i32> = [(2, 20), (1, 10), (3, 30)].into_iter().collect();
	///
	/// let post: Vec<(u64, i32)> = tree.iter(Order::PostOrder).map(|(k, v)| (k, *v)).collect();
	/// assert_eq!(post, vec![(1, 10), (3, 30), (2, 20)]);
	/// ```
	pub fn iter(&self, order: Order) -> Iter<'_, V> {
		Iter::new(&self.nodes, self.root, order)
	}

	/// Returns every key in the given order.
	pub fn keys(&self, order: Order) -> Vec<u64> {
		iter::collect_exact(&self.nodes, self.root, order, self.len(), |node| node.key)
	}

	// -----------------------------------------------------------------------
	// Internal Helpers
	// -----------------------------------------------------------------------

	/// Detaches a node with at most one child and returns it.
	///
	/// The child, if any, takes the node's place under its parent (or becomes
	/// the root).
	fn unlink(&mut self, id: NodeId) -> Node<V> {
		let node = &self.nodes[id];
		debug_assert!(
			node.left.is_none() || node.right.is_none(),
			"unlink called on node {:?} with two children",
			id
		);

		let key = node.key;
		let parent = node.parent;
		let child = node.left.or(node.right);

		if let Some(child) = child {
			self.nodes[child].parent = parent;
		}
		self.replace_child(parent, id, child);

		if child.is_some() {
			trace!(key, ?id, "removed node with one child");
		} else {
			trace!(key, ?id, "removed leaf");
		}

		self.nodes.release(id)
	}

	/// Points whichever link of `parent` referenced `old` at `new` instead.
	///
	/// A `None` parent means `old` was the root. Only the downward link is
	/// rewritten; the caller fixes `new`'s parent back-reference.
	pub(crate) fn replace_child(
		&mut self,
		parent: Option<NodeId>,
		old: NodeId,
		new: Option<NodeId>,
	) {
		match parent {
			None => self.root = new,
			Some(parent) => {
				let parent = &mut self.nodes[parent];
				if parent.left == Some(old) {
					parent.left = new;
				} else {
					debug_assert_eq!(parent.right, Some(old), "{:?} is not a child of its parent", old);
					parent.right = new;
				}
			}
		}
	}
}

impl<V: Clone> Tree<V> {
	fn pair(&self, id: NodeId) -> Pair<V> {
		let node = &self.nodes[id];
		Pair::new(node.key, node.value.clone())
	}

	/// Returns a copy of the value stored under `key`.
	pub fn get(&self, key: u64) -> Option<V> {
		self.search(key).cloned()
	}

	/// Returns the pair with the smallest key.
	///
	/// # Example
	///
	/// ```
	/// use oaktree::Tree;
	///
	/// let tree: Tree<&str> = [(3, "three"), (1, "one"), (2, "two")].into_iter().collect();
	///
	/// let first = tree.min().map(|p| (p.key, p.value));
	/// assert_eq!(first, Some((1, "one")));
	/// ```
	pub fn min(&self) -> Option<Pair<V>> {
		self.root.map(|root| self.pair(node::leftmost(&self.nodes, root)))
	}

	/// Returns the pair with the largest key.
	pub fn max(&self) -> Option<Pair<V>> {
		self.root.map(|root| self.pair(node::rightmost(&self.nodes, root)))
	}

	/// Returns the in-order predecessor of `key`.
	///
	/// `None` if `key` is missing or is the smallest key in the tree.
	///
	/// # Example
	///
	/// ```
	/// use oaktree::Tree;
	///
	/// let tree: Tree<()> = [5, 3, 8, 1, 4, 7, 9].into_iter().map(|k| (k, ())).collect();
	///
	/// assert_eq!(tree.predecessor(5).map(|p| p.key), Some(4)); // max of left subtree
	/// assert_eq!(tree.predecessor(7).map(|p| p.key), Some(5)); // nearest left ancestor
	/// assert_eq!(tree.predecessor(1), None);
	/// ```
	pub fn predecessor(&self, key: u64) -> Option<Pair<V>> {
		let id = node::find(&self.nodes, self.root, key)?;
		node::predecessor(&self.nodes, id).map(|id| self.pair(id))
	}

	/// Returns the structural parent of `key`.
	///
	/// `None` if `key` is missing or is the root.
	pub fn parent(&self, key: u64) -> Option<Pair<V>> {
		let id = node::find(&self.nodes, self.root, key)?;
		self.nodes[id].parent.map(|parent| self.pair(parent))
	}

	/// Creates a snapshot of the whole tree in the given order.
	pub fn snapshot(&self, order: Order) -> Snapshot<V> {
		Snapshot::new(&self.nodes, self.root, order)
	}

	/// Returns a copy of every value in the given order.
	pub fn values(&self, order: Order) -> Vec<V> {
		iter::collect_exact(&self.nodes, self.root, order, self.len(), |node| node.value.clone())
	}

	/// Returns a copy of every pair in the given order.
	pub fn items(&self, order: Order) -> Vec<Pair<V>> {
		iter::collect_exact(&self.nodes, self.root, order, self.len(), |node| {
			Pair::new(node.key, node.value.clone())
		})
	}
}

// ---------------------------------------------------------------------------
// Trait Implementations
// ---------------------------------------------------------------------------

impl<V: fmt::Debug> fmt::Debug for Tree<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.iter(Order::InOrder)).finish()
	}
}

impl<V> FromIterator<(u64, V)> for Tree<V> {
	fn from_iter<I: IntoIterator<Item = (u64, V)>>(iter: I) -> Self {
		let mut tree = Tree::new();
		tree.extend(iter);
		tree
	}
}

impl<V> Extend<(u64, V)> for Tree<V> {
	fn extend<I: IntoIterator<Item = (u64, V)>>(&mut self, iter: I) {
		for (key, value) in iter {
			self.insert(key, value);
		}
	}
}

impl<'t, V> IntoIterator for &'t Tree<V> {
	type Item = (u64, &'t V);
	type IntoIter = Iter<'t, V>;

	fn into_iter(self) -> Iter<'t, V> {
		self.iter(Order::InOrder)
	}
}

// ===========================================================================
// Test-Only Validation Module
// ===========================================================================

/// Invariant validation for testing.
#[cfg(any(test, feature = "test-utils"))]
impl<V> Tree<V> {
	/// Validates all tree invariants. Panics with diagnostic info if any invariant is violated.
	///
	/// # Invariants Checked
	///
	/// 1. Root has no parent
	/// 2. Parent consistency: every child's `parent` points back at the node
	/// 3. Key ordering: left subtree keys `<=` node key `<=` right subtree keys
	/// 4. Count consistency: reachable nodes equal `len()`
	/// 5. Arena consistency: occupied plus free slots account for every slot
	pub fn assert_invariants(&self) {
		let Some(root) = self.root else {
			assert_eq!(self.len(), 0, "Empty tree reports {} nodes", self.len());
			return;
		};

		// Invariant 1: Root has no parent
		assert_eq!(self.nodes[root].parent, None, "Root {:?} has a parent", root);

		// (node, lower bound, upper bound) inherited from ancestors
		let mut stack = vec![(root, None::<u64>, None::<u64>)];
		let mut reachable = 0;

		while let Some((id, lower, upper)) = stack.pop() {
			reachable += 1;
			let node = &self.nodes[id];

			// Invariant 3: Key ordering
			if let Some(lower) = lower {
				assert!(node.key >= lower, "Key {} below ancestor bound {}", node.key, lower);
			}
			if let Some(upper) = upper {
				assert!(node.key <= upper, "Key {} above ancestor bound {}", node.key, upper);
			}

			// Invariant 2: Parent consistency
			for child in [node.left, node.right].into_iter().flatten() {
				assert_eq!(
					self.nodes[child].parent,
					Some(id),
					"Node {:?} (key {}) does not point back at parent {:?} (key {})",
					child,
					self.nodes[child].key,
					id,
					node.key
				);
			}

			if let Some(left) = node.left {
				stack.push((left, lower, Some(node.key)));
			}
			if let Some(right) = node.right {
				stack.push((right, Some(node.key), upper));
			}
		}

		// Invariant 4: Count consistency
		assert_eq!(reachable, self.len(), "Reachable nodes {} != len() {}", reachable, self.len());

		// Invariant 5: Arena consistency
		assert_eq!(
			self.nodes.len() + self.nodes.free_len(),
			self.nodes.slot_count(),
			"Occupied {} + free {} != slots {}",
			self.nodes.len(),
			self.nodes.free_len(),
			self.nodes.slot_count()
		);
	}
}
