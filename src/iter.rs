//! Traversal cursors and iterators for the `Tree` data structure
use crate::error::{Error, Result};
use crate::node::{Arena, Node, NodeId};
use crate::Pair;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::iter::FusedIterator;

/// Inline capacity of traversal stacks before they spill to the heap.
///
/// A lazily walked preorder stack holds about one pending right child per
/// level, so balanced trees stay inline.
pub(crate) const STACK_INLINE: usize = 32;

/// Visiting order of a traversal.
#[derive(Debug, Default, PartialEq, Eq, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Order {
	/// Node, then left subtree, then right subtree.
	PreOrder,
	/// Left subtree, then node, then right subtree. Yields keys in ascending order.
	#[default]
	InOrder,
	/// Left subtree, then right subtree, then node.
	PostOrder,
	/// Level by level from the root, left to right within a level.
	BreadthFirst,
}

impl Order {
	/// All four orders, useful for exhaustive checks.
	pub const ALL: [Order; 4] = [Order::PreOrder, Order::InOrder, Order::PostOrder, Order::BreadthFirst];
}

// ---------------------------------------------------------------------------
// Walk: per-order state machine over node ids
// ---------------------------------------------------------------------------

/// Scratch state of a traversal.
///
/// Preorder and breadth-first walk lazily: the scratch holds the frontier and
/// each step expands one node. Inorder and postorder are linearised at
/// creation, so each step only pops.
#[derive(Debug, Clone)]
pub(crate) enum Walk {
	PreOrder(SmallVec<[NodeId; STACK_INLINE]>),
	InOrder(VecDeque<NodeId>),
	PostOrder(Vec<NodeId>),
	BreadthFirst(VecDeque<NodeId>),
}

impl Walk {
	pub(crate) fn new<V>(nodes: &Arena<V>, root: Option<NodeId>, order: Order) -> Walk {
		match order {
			Order::PreOrder => Walk::PreOrder(root.into_iter().collect()),
			Order::InOrder => Walk::InOrder(Self::inorder_queue(nodes, root)),
			Order::PostOrder => Walk::PostOrder(Self::postorder_stack(nodes, root)),
			Order::BreadthFirst => Walk::BreadthFirst(root.into_iter().collect()),
		}
	}

	/// Push-left, pop-emit, descend-right.
	fn inorder_queue<V>(nodes: &Arena<V>, root: Option<NodeId>) -> VecDeque<NodeId> {
		let mut queue = VecDeque::new();
		let mut support: SmallVec<[NodeId; STACK_INLINE]> = SmallVec::new();
		let mut cursor = root;

		while cursor.is_some() || !support.is_empty() {
			if let Some(id) = cursor {
				support.push(id);
				cursor = nodes[id].left;
			} else if let Some(id) = support.pop() {
				queue.push_back(id);
				cursor = nodes[id].right;
			}
		}

		queue
	}

	/// Lays nodes out as node, right, left (mirrored preorder), so popping
	/// from the top yields left, right, node.
	fn postorder_stack<V>(nodes: &Arena<V>, root: Option<NodeId>) -> Vec<NodeId> {
		let mut stack = Vec::new();
		let mut support: SmallVec<[NodeId; STACK_INLINE]> = root.into_iter().collect();

		while let Some(id) = support.pop() {
			stack.push(id);
			let node = &nodes[id];
			support.extend(node.left);
			support.extend(node.right);
		}

		stack
	}

	pub(crate) fn order(&self) -> Order {
		match self {
			Walk::PreOrder(_) => Order::PreOrder,
			Walk::InOrder(_) => Order::InOrder,
			Walk::PostOrder(_) => Order::PostOrder,
			Walk::BreadthFirst(_) => Order::BreadthFirst,
		}
	}

	/// Returns the next node id, or `None` once the scratch is drained.
	pub(crate) fn step<V>(&mut self, nodes: &Arena<V>) -> Option<NodeId> {
		match self {
			Walk::PreOrder(stack) => {
				let id = stack.pop()?;
				let node = &nodes[id];
				// Right goes in first so left is popped next
				stack.extend(node.right);
				stack.extend(node.left);
				Some(id)
			}
			Walk::BreadthFirst(queue) => {
				let id = queue.pop_front()?;
				let node = &nodes[id];
				queue.extend(node.left);
				queue.extend(node.right);
				Some(id)
			}
			Walk::InOrder(queue) => queue.pop_front(),
			Walk::PostOrder(stack) => stack.pop(),
		}
	}

	pub(crate) fn is_done(&self) -> bool {
		match self {
			Walk::PreOrder(stack) => stack.is_empty(),
			Walk::InOrder(queue) | Walk::BreadthFirst(queue) => queue.is_empty(),
			Walk::PostOrder(stack) => stack.is_empty(),
		}
	}
}

/// Drains a fresh walk into a vector of exactly `expected` elements.
///
/// Panics if the traversal disagrees with the recorded node count, rather
/// than handing back a truncated or overlong sequence.
pub(crate) fn collect_exact<V, T, F>(
	nodes: &Arena<V>,
	root: Option<NodeId>,
	order: Order,
	expected: usize,
	mut f: F,
) -> Vec<T>
where
	F: FnMut(&Node<V>) -> T,
{
	let mut out = Vec::with_capacity(expected);
	let mut walk = Walk::new(nodes, root, order);

	while let Some(id) = walk.step(nodes) {
		assert!(
			out.len() < expected,
			"{:?} traversal yielded more than the {} recorded nodes",
			order,
			expected
		);
		out.push(f(&nodes[id]));
	}

	assert_eq!(
		out.len(),
		expected,
		"{:?} traversal yielded {} of {} recorded nodes",
		order,
		out.len(),
		expected
	);
	out
}

// ---------------------------------------------------------------------------
// Cursor position
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum Position<T> {
	Unstarted,
	At(T),
	Exhausted,
}

impl<T> Position<T> {
	fn current(&self) -> Result<&T> {
		match self {
			Position::Unstarted => Err(Error::CursorUnstarted),
			Position::At(item) => Ok(item),
			Position::Exhausted => Err(Error::CursorExhausted),
		}
	}
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Resumable traversal producing one [`Pair`] per step.
///
/// A cursor starts positioned before its first element. The tree stays
/// borrowed for the cursor's whole life, so it cannot be mutated underneath.
///
/// ```
/// use oaktree::{Order, Tree};
///
/// let tree: Tree<&str> = [(2, "b"), (1, "a"), (3, "c")].into_iter().collect();
///
/// let mut cursor = tree.cursor(Order::PreOrder);
/// assert!(cursor.current().is_err());
/// assert_eq!(cursor.advance().map(|p| p.key), Some(2));
/// assert_eq!(cursor.current().unwrap().value, "b");
/// assert_eq!(cursor.advance().map(|p| p.key), Some(1));
/// assert_eq!(cursor.advance().map(|p| p.key), Some(3));
/// assert_eq!(cursor.advance(), None);
/// assert_eq!(cursor.advance(), None);
/// ```
pub struct Cursor<'t, V> {
	nodes: &'t Arena<V>,
	walk: Walk,
	position: Position<NodeId>,
}

impl<'t, V> Cursor<'t, V> {
	pub(crate) fn new(nodes: &'t Arena<V>, root: Option<NodeId>, order: Order) -> Cursor<'t, V> {
		Cursor {
			nodes,
			walk: Walk::new(nodes, root, order),
			position: Position::Unstarted,
		}
	}

	/// The order this cursor visits nodes in.
	pub fn order(&self) -> Order {
		self.walk.order()
	}

	/// Returns `true` once the cursor has moved past its last element.
	pub fn is_exhausted(&self) -> bool {
		matches!(self.position, Position::Exhausted)
	}

	/// Moves to the next node and returns its key and a reference to its value.
	pub fn advance_ref(&mut self) -> Option<(u64, &'t V)> {
		let nodes: &'t Arena<V> = self.nodes;
		match self.walk.step(nodes) {
			Some(id) => {
				self.position = Position::At(id);
				let node = &nodes[id];
				Some((node.key, &node.value))
			}
			None => {
				self.position = Position::Exhausted;
				None
			}
		}
	}

	/// Key and value reference of the current node.
	pub fn current_ref(&self) -> Result<(u64, &'t V)> {
		let nodes: &'t Arena<V> = self.nodes;
		let id = *self.position.current()?;
		let node = &nodes[id];
		Ok((node.key, &node.value))
	}
}

impl<V: Clone> Cursor<'_, V> {
	/// Moves to the next node and returns a copy of its pair.
	///
	/// Returns `None` at the end of the traversal, and keeps returning `None`
	/// on every later call.
	pub fn advance(&mut self) -> Option<Pair<V>> {
		self.advance_ref().map(|(key, value)| Pair::new(key, value.clone()))
	}

	/// Returns a copy of the current pair.
	///
	/// Fails before the first [`advance`](Self::advance) and after exhaustion.
	pub fn current(&self) -> Result<Pair<V>> {
		self.current_ref().map(|(key, value)| Pair::new(key, value.clone()))
	}
}

impl<V: Clone> Iterator for Cursor<'_, V> {
	type Item = Pair<V>;

	fn next(&mut self) -> Option<Pair<V>> {
		self.advance()
	}
}

impl<V: Clone> FusedIterator for Cursor<'_, V> {}

// ---------------------------------------------------------------------------
// Iter
// ---------------------------------------------------------------------------

/// Borrowing iterator over `(key, &value)` in a chosen [`Order`].
pub struct Iter<'t, V> {
	nodes: &'t Arena<V>,
	walk: Walk,
}

impl<'t, V> Iter<'t, V> {
	pub(crate) fn new(nodes: &'t Arena<V>, root: Option<NodeId>, order: Order) -> Iter<'t, V> {
		Iter {
			nodes,
			walk: Walk::new(nodes, root, order),
		}
	}
}

impl<'t, V> Iterator for Iter<'t, V> {
	type Item = (u64, &'t V);

	#[inline]
	fn next(&mut self) -> Option<(u64, &'t V)> {
		let nodes: &'t Arena<V> = self.nodes;
		let id = self.walk.step(nodes)?;
		let node = &nodes[id];
		Some((node.key, &node.value))
	}
}

impl<V> FusedIterator for Iter<'_, V> {}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A cursor over pairs copied out of the tree at creation time.
///
/// Unlike [`Cursor`], a snapshot does not borrow the tree, so the tree may be
/// changed freely while the snapshot is still being advanced. The snapshot
/// never observes those changes.
///
/// ```
/// use oaktree::{Order, Tree};
///
/// let mut tree: Tree<u32> = (1..=3).map(|k| (k, k as u32)).collect();
/// let mut snapshot = tree.snapshot(Order::InOrder);
///
/// tree.remove(2);
/// tree.insert(10, 10);
///
/// let keys: Vec<u64> = snapshot.by_ref().map(|p| p.key).collect();
/// assert_eq!(keys, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct Snapshot<V> {
	order: Order,
	pending: VecDeque<Pair<V>>,
	position: Position<Pair<V>>,
}

impl<V: Clone> Snapshot<V> {
	pub(crate) fn new(nodes: &Arena<V>, root: Option<NodeId>, order: Order) -> Snapshot<V> {
		let mut walk = Walk::new(nodes, root, order);
		let mut pending = VecDeque::new();
		while let Some(id) = walk.step(nodes) {
			let node = &nodes[id];
			pending.push_back(Pair::new(node.key, node.value.clone()));
		}
		debug_assert!(walk.is_done());

		Snapshot {
			order,
			pending,
			position: Position::Unstarted,
		}
	}

	/// The order the pairs were captured in.
	pub fn order(&self) -> Order {
		self.order
	}

	/// Number of pairs not yet advanced over.
	pub fn remaining(&self) -> usize {
		self.pending.len()
	}

	/// Moves to the next captured pair. Idempotently `None` once exhausted.
	pub fn advance(&mut self) -> Option<Pair<V>> {
		match self.pending.pop_front() {
			Some(pair) => {
				self.position = Position::At(pair.clone());
				Some(pair)
			}
			None => {
				self.position = Position::Exhausted;
				None
			}
		}
	}

	/// The pair most recently returned by [`advance`](Self::advance).
	pub fn current(&self) -> Result<&Pair<V>> {
		self.position.current()
	}
}

impl<V: Clone> Iterator for Snapshot<V> {
	type Item = Pair<V>;

	fn next(&mut self) -> Option<Pair<V>> {
		self.advance()
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.pending.len(), Some(self.pending.len()))
	}
}

impl<V: Clone> ExactSizeIterator for Snapshot<V> {}

impl<V: Clone> FusedIterator for Snapshot<V> {}
