//! # Rotations and Explicit AVL Balancing
//!
//! The tree never restructures itself on insert or remove. This module holds
//! the two tools for reshaping it on demand:
//!
//! - [`Tree::rotate`] / [`Tree::rotate_at`]: apply one of the four classic
//!   rotations at the root or at a chosen node
//! - [`Tree::balance`]: rotate until every node satisfies the AVL property
//!
//! ## Single Rotations
//!
//! ```text
//!          x                         l
//!         / \     rotate right      / \
//!        l   c   ─────────────►    a   x
//!       / \                           / \
//!      a   b     ◄─────────────      b   c
//!                 rotate left
//! ```
//!
//! The promoted node takes the demoted node's place under its parent (or as
//! the root). Only the moved subtree `b` changes parent; `a` and `c` keep
//! theirs. In-order sequence is unchanged by any rotation.
//!
//! ## Balancing
//!
//! Nodes are settled bottom-up in post-order, so both children of a node are
//! already AVL subtrees when the node itself is examined. A node whose
//! balance factor (left height minus right height) exceeds one is fixed with
//! a right rotation, or a left-right rotation when its left child leans
//! right; the mirror cases use left and right-left rotations. A single
//! rotation can leave the demoted node unbalanced when the moved subtree is
//! much shorter than its new sibling, so the demoted node is settled again
//! before the promoted node's height is recomputed.

use std::cmp;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::iter::{Order, Walk};
use crate::node::{self, Arena, NodeId};
use crate::Tree;

/// One of the four rotations.
///
/// Named after the direction the pivot moves: a right rotation promotes the
/// left child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
	/// Promote the right child.
	Left,
	/// Promote the left child.
	Right,
	/// Rotate the left child left, then the node right.
	LeftRight,
	/// Rotate the right child right, then the node left.
	RightLeft,
}

impl<V> Tree<V> {
	// -----------------------------------------------------------------------
	// Public API: Rotations
	// -----------------------------------------------------------------------

	/// Applies `rotation` at the root.
	///
	/// # Errors
	///
	/// [`Error::RotationUnavailable`] if the tree is empty or the child the
	/// rotation promotes is missing. The tree is left unchanged.
	///
	/// # Example
	///
	/// ```
	/// use oaktree::{Error, Order, Rotation, Tree};
	///
	/// let mut tree: Tree<()> = [2, 1, 3].into_iter().map(|k| (k, ())).collect();
	///
	/// tree.rotate(Rotation::Right).unwrap();
	/// assert_eq!(tree.keys(Order::PreOrder), vec![1, 2, 3]);
	///
	/// // 1 has no left child any more
	/// assert_eq!(
	///     tree.rotate(Rotation::Right),
	///     Err(Error::RotationUnavailable { rotation: Rotation::Right })
	/// );
	/// ```
	pub fn rotate(&mut self, rotation: Rotation) -> Result<()> {
		let root = self.root.ok_or(Error::RotationUnavailable {
			rotation,
		})?;
		self.rotate_node(root, rotation).map(|_| ())
	}

	/// Applies `rotation` at the node holding `key`.
	///
	/// # Errors
	///
	/// [`Error::KeyNotFound`] if no node holds `key`, or
	/// [`Error::RotationUnavailable`] if the promoted child is missing.
	pub fn rotate_at(&mut self, key: u64, rotation: Rotation) -> Result<()> {
		let id = node::find(&self.nodes, self.root, key).ok_or(Error::KeyNotFound(key))?;
		self.rotate_node(id, rotation).map(|_| ())
	}

	/// Applies `rotation` at `id` and returns the node now in its position.
	fn rotate_node(&mut self, id: NodeId, rotation: Rotation) -> Result<NodeId> {
		let unavailable = Error::RotationUnavailable {
			rotation,
		};
		let top = match rotation {
			Rotation::Left => self.rotate_left_at(id).map_err(|_| unavailable)?,
			Rotation::Right => self.rotate_right_at(id).map_err(|_| unavailable)?,
			Rotation::LeftRight => {
				let left = self.nodes[id].left.ok_or(unavailable)?;
				self.rotate_left_at(left).map_err(|_| unavailable)?;
				self.rotate_right_at(id)?
			}
			Rotation::RightLeft => {
				let right = self.nodes[id].right.ok_or(unavailable)?;
				self.rotate_right_at(right).map_err(|_| unavailable)?;
				self.rotate_left_at(id)?
			}
		};
		trace!(key = self.nodes[top].key, ?rotation, "rotated");
		Ok(top)
	}

	/// Promotes the left child of `id`, returning it.
	pub(crate) fn rotate_right_at(&mut self, id: NodeId) -> Result<NodeId> {
		let pivot = self.nodes[id].left.ok_or(Error::RotationUnavailable {
			rotation: Rotation::Right,
		})?;
		let parent = self.nodes[id].parent;
		let moved = self.nodes[pivot].right;

		self.nodes[id].left = moved;
		if let Some(moved) = moved {
			self.nodes[moved].parent = Some(id);
		}

		self.nodes[pivot].right = Some(id);
		self.nodes[id].parent = Some(pivot);

		self.nodes[pivot].parent = parent;
		self.replace_child(parent, id, Some(pivot));

		Ok(pivot)
	}

	/// Promotes the right child of `id`, returning it.
	pub(crate) fn rotate_left_at(&mut self, id: NodeId) -> Result<NodeId> {
		let pivot = self.nodes[id].right.ok_or(Error::RotationUnavailable {
			rotation: Rotation::Left,
		})?;
		let parent = self.nodes[id].parent;
		let moved = self.nodes[pivot].left;

		self.nodes[id].right = moved;
		if let Some(moved) = moved {
			self.nodes[moved].parent = Some(id);
		}

		self.nodes[pivot].left = Some(id);
		self.nodes[id].parent = Some(pivot);

		self.nodes[pivot].parent = parent;
		self.replace_child(parent, id, Some(pivot));

		Ok(pivot)
	}

	// -----------------------------------------------------------------------
	// Public API: Balancing
	// -----------------------------------------------------------------------

	/// Rotates nodes until the whole tree satisfies the AVL property.
	///
	/// Keys, values, and node count are preserved, and so is the in-order
	/// sequence. Balancing an already balanced tree performs no rotations.
	///
	/// # Example
	///
	/// ```
	/// use oaktree::{Order, Tree};
	///
	/// let mut tree: Tree<()> = (1..=7).map(|k| (k, ())).collect();
	/// tree.balance();
	///
	/// assert_eq!(tree.keys(Order::PreOrder), vec![4, 2, 1, 3, 6, 5, 7]);
	/// assert!(tree.is_balanced());
	/// ```
	#[tracing::instrument(level = "debug", skip_all, fields(nodes = self.len()))]
	pub fn balance(&mut self) {
		let Some(root) = self.root else {
			return;
		};

		// Every descendant of a node precedes it
		let mut walk = Walk::new(&self.nodes, Some(root), Order::PostOrder);
		let mut order = Vec::with_capacity(self.len());
		while let Some(id) = walk.step(&self.nodes) {
			order.push(id);
		}

		let mut balancer = Balancer {
			heights: vec![0; self.nodes.slot_count()],
			tree: self,
			rotations: 0,
		};
		// Heights of the shape as found
		for &id in &order {
			balancer.refresh(id);
		}
		let before = balancer.heights[root.index()];

		let mut top = root;
		for id in order {
			top = balancer.settle(id);
		}

		debug!(
			rotations = balancer.rotations,
			height_before = before,
			height_after = balancer.heights[top.index()],
			"balanced"
		);
	}

	/// Returns `true` if every node's subtree heights differ by at most one.
	pub fn is_balanced(&self) -> bool {
		is_avl(&self.nodes, self.root)
	}
}

/// Checks the AVL property for the subtree under `root`.
pub(crate) fn is_avl<V>(nodes: &Arena<V>, root: Option<NodeId>) -> bool {
	let mut heights = vec![0u32; nodes.slot_count()];
	let height = |heights: &[u32], id: Option<NodeId>| id.map_or(0, |id| heights[id.index()]);

	let mut walk = Walk::new(nodes, root, Order::PostOrder);
	while let Some(id) = walk.step(nodes) {
		let node = &nodes[id];
		let (left, right) = (height(&heights, node.left), height(&heights, node.right));
		if left.abs_diff(right) > 1 {
			return false;
		}
		heights[id.index()] = 1 + cmp::max(left, right);
	}
	true
}

// ---------------------------------------------------------------------------
// Balancer
// ---------------------------------------------------------------------------

/// Height cache and rotation counter for one [`Tree::balance`] pass.
///
/// `heights` is indexed by node id. A node's entry is valid once the node has
/// been settled, and every rotation refreshes the two nodes it moves.
struct Balancer<'a, V> {
	tree: &'a mut Tree<V>,
	heights: Vec<u32>,
	rotations: usize,
}

impl<V> Balancer<'_, V> {
	#[inline]
	fn height(&self, id: Option<NodeId>) -> u32 {
		id.map_or(0, |id| self.heights[id.index()])
	}

	fn refresh(&mut self, id: NodeId) {
		let node = &self.tree.nodes[id];
		let height = 1 + cmp::max(self.height(node.left), self.height(node.right));
		self.heights[id.index()] = height;
	}

	fn factor(&self, id: NodeId) -> i64 {
		let node = &self.tree.nodes[id];
		i64::from(self.height(node.left)) - i64::from(self.height(node.right))
	}

	/// Balances the subtree at `id`, whose children must already be AVL.
	/// Returns the node now at the top of that subtree.
	fn settle(&mut self, mut id: NodeId) -> NodeId {
		self.refresh(id);
		loop {
			let factor = self.factor(id);
			id = if factor > 1 {
				let left = self.tree.nodes[id].left.expect("left-heavy node has a left child");
				if self.factor(left) >= 0 {
					self.rotate(id, Rotation::Right)
				} else {
					self.rotate(id, Rotation::LeftRight)
				}
			} else if factor < -1 {
				let right = self.tree.nodes[id].right.expect("right-heavy node has a right child");
				if self.factor(right) <= 0 {
					self.rotate(id, Rotation::Left)
				} else {
					self.rotate(id, Rotation::RightLeft)
				}
			} else {
				return id;
			};
		}
	}

	fn rotate(&mut self, id: NodeId, rotation: Rotation) -> NodeId {
		match rotation {
			Rotation::Right | Rotation::Left => {
				let top = if rotation == Rotation::Right {
					self.tree.rotate_right_at(id)
				} else {
					self.tree.rotate_left_at(id)
				}
				.expect("heavy side has a child to promote");
				self.rotations += 1;
				trace!(key = self.tree.nodes[top].key, ?rotation, "balance rotation");

				// The demoted node may still lean, so settle it before
				// recomputing the height of the new top.
				self.settle(id);
				self.refresh(top);
				top
			}
			Rotation::LeftRight => {
				let left = self.tree.nodes[id].left.expect("left-heavy node has a left child");
				self.rotate(left, Rotation::Left);
				self.rotate(id, Rotation::Right)
			}
			Rotation::RightLeft => {
				let right = self.tree.nodes[id].right.expect("right-heavy node has a right child");
				self.rotate(right, Rotation::Right);
				self.rotate(id, Rotation::Left)
			}
		}
	}
}
