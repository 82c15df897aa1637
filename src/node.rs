//! Node storage for the tree.
//!
//! Nodes live in a slab ([`Arena`]) and refer to each other through stable
//! [`NodeId`] indices. Child links are the owning edges of the tree; the
//! `parent` link is a plain back-reference and carries no ownership, so the
//! node graph is a tree even though every node can reach its parent.
//!
//! ```text
//!   slots: [ Occupied(5) | Vacant(→3) | Occupied(8) | Vacant(None) | Occupied(3) ]
//!                                ▲
//!   free ────────────────────────┘   (vacant slots form a singly linked free list)
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Stable index of a node inside an [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u32);

impl NodeId {
	#[inline]
	pub(crate) fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Debug for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A tree vertex.
#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
	pub(crate) key: u64,
	pub(crate) value: V,
	pub(crate) left: Option<NodeId>,
	pub(crate) right: Option<NodeId>,
	/// Non-owning back-reference; `None` only for the root.
	pub(crate) parent: Option<NodeId>,
}

impl<V> Node<V> {
	pub(crate) fn leaf(key: u64, value: V, parent: Option<NodeId>) -> Node<V> {
		Node {
			key,
			value,
			left: None,
			right: None,
			parent,
		}
	}

	#[inline]
	pub(crate) fn is_leaf(&self) -> bool {
		self.left.is_none() && self.right.is_none()
	}
}

#[derive(Debug, Clone)]
enum Slot<V> {
	Occupied(Node<V>),
	/// Link to the next vacant slot.
	Vacant(Option<NodeId>),
}

/// Slab of nodes with slot reuse.
#[derive(Clone)]
pub(crate) struct Arena<V> {
	slots: Vec<Slot<V>>,
	free: Option<NodeId>,
	len: usize,
}

impl<V> Arena<V> {
	pub(crate) const fn new() -> Arena<V> {
		Arena {
			slots: Vec::new(),
			free: None,
			len: 0,
		}
	}

	pub(crate) fn with_capacity(capacity: usize) -> Arena<V> {
		Arena {
			slots: Vec::with_capacity(capacity),
			free: None,
			len: 0,
		}
	}

	/// Number of occupied slots.
	#[inline]
	pub(crate) fn len(&self) -> usize {
		self.len
	}

	/// Number of slots ever handed out, occupied or not. Ids are always below this bound.
	#[inline]
	pub(crate) fn slot_count(&self) -> usize {
		self.slots.len()
	}

	/// Stores `node` and returns its id, reusing a vacant slot when one exists.
	pub(crate) fn alloc(&mut self, node: Node<V>) -> NodeId {
		self.len += 1;
		match self.free {
			Some(id) => {
				let slot = &mut self.slots[id.index()];
				match slot {
					Slot::Vacant(next) => self.free = *next,
					Slot::Occupied(_) => unreachable!("free list points at occupied slot {:?}", id),
				}
				*slot = Slot::Occupied(node);
				id
			}
			None => {
				let id = NodeId(
					u32::try_from(self.slots.len()).expect("arena exceeded u32::MAX nodes"),
				);
				self.slots.push(Slot::Occupied(node));
				id
			}
		}
	}

	/// Removes the node at `id`, returning it and putting the slot on the free list.
	pub(crate) fn release(&mut self, id: NodeId) -> Node<V> {
		let slot = std::mem::replace(&mut self.slots[id.index()], Slot::Vacant(self.free));
		match slot {
			Slot::Occupied(node) => {
				self.free = Some(id);
				self.len -= 1;
				node
			}
			Slot::Vacant(next) => {
				// Put the slot back the way it was before reporting.
				self.slots[id.index()] = Slot::Vacant(next);
				panic!("released vacant slot {:?}", id)
			}
		}
	}

	/// Drops every node and forgets all slots.
	pub(crate) fn clear(&mut self) {
		self.slots.clear();
		self.free = None;
		self.len = 0;
	}

	/// Length of the free list, for invariant checks.
	#[cfg(any(test, feature = "test-utils"))]
	pub(crate) fn free_len(&self) -> usize {
		let mut count = 0;
		let mut cursor = self.free;
		while let Some(id) = cursor {
			match &self.slots[id.index()] {
				Slot::Vacant(next) => cursor = *next,
				Slot::Occupied(_) => panic!("free list reaches occupied slot {:?}", id),
			}
			count += 1;
		}
		count
	}
}

impl<V> Index<NodeId> for Arena<V> {
	type Output = Node<V>;

	#[inline]
	fn index(&self, id: NodeId) -> &Node<V> {
		match &self.slots[id.index()] {
			Slot::Occupied(node) => node,
			Slot::Vacant(_) => unreachable!("dangling link to vacant slot {:?}", id),
		}
	}
}

impl<V> IndexMut<NodeId> for Arena<V> {
	#[inline]
	fn index_mut(&mut self, id: NodeId) -> &mut Node<V> {
		match &mut self.slots[id.index()] {
			Slot::Occupied(node) => node,
			Slot::Vacant(_) => unreachable!("dangling link to vacant slot {:?}", id),
		}
	}
}

impl<V: fmt::Debug> fmt::Debug for Arena<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Arena")
			.field("len", &self.len)
			.field("slots", &self.slots.len())
			.field("free", &self.free)
			.finish()
	}
}

// ---------------------------------------------------------------------------
// Subtree Helpers
// ---------------------------------------------------------------------------

/// Follows left links from `id` to the smallest key of its subtree.
pub(crate) fn leftmost<V>(nodes: &Arena<V>, mut id: NodeId) -> NodeId {
	while let Some(left) = nodes[id].left {
		id = left;
	}
	id
}

/// Follows right links from `id` to the largest key of its subtree.
pub(crate) fn rightmost<V>(nodes: &Arena<V>, mut id: NodeId) -> NodeId {
	while let Some(right) = nodes[id].right {
		id = right;
	}
	id
}

/// Descends from `root` and returns the first node whose key equals `key`.
///
/// Keys strictly smaller than the visited node go left, everything else goes
/// right, the same rule insertion uses.
pub(crate) fn find<V>(nodes: &Arena<V>, root: Option<NodeId>, key: u64) -> Option<NodeId> {
	let mut cursor = root;
	while let Some(id) = cursor {
		let node = &nodes[id];
		cursor = if node.key == key {
			return Some(id);
		} else if node.key > key {
			node.left
		} else {
			node.right
		};
	}
	None
}

/// In-order predecessor of `id` within the whole tree.
///
/// With a left child it is the rightmost node of the left subtree; otherwise
/// walk up until arriving at an ancestor from its right side.
pub(crate) fn predecessor<V>(nodes: &Arena<V>, id: NodeId) -> Option<NodeId> {
	if let Some(left) = nodes[id].left {
		return Some(rightmost(nodes, left));
	}
	let mut child = id;
	while let Some(parent) = nodes[child].parent {
		if nodes[parent].right == Some(child) {
			return Some(parent);
		}
		child = parent;
	}
	None
}

/// Number of levels below and including `root`, counted breadth first.
pub(crate) fn level_height<V>(nodes: &Arena<V>, root: Option<NodeId>) -> usize {
	let Some(root) = root else {
		return 0;
	};
	let mut queue = VecDeque::from([root]);
	// Last node of the level currently being dequeued
	let mut last = root;
	let mut levels = 0;

	while let Some(id) = queue.pop_front() {
		let node = &nodes[id];
		queue.extend(node.left);
		queue.extend(node.right);
		if id == last {
			levels += 1;
			if let Some(&tail) = queue.back() {
				last = tail;
			}
		}
	}
	levels
}

/// Counts nodes reachable from `root`.
pub(crate) fn count<V>(nodes: &Arena<V>, root: Option<NodeId>) -> usize {
	let mut stack: Vec<NodeId> = root.into_iter().collect();
	let mut total = 0;
	while let Some(id) = stack.pop() {
		total += 1;
		stack.extend(nodes[id].left);
		stack.extend(nodes[id].right);
	}
	total
}
