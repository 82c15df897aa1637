//! # Error Types for the Tree
//!
//! Most lookups in this crate cannot fail: a missing key is reported through
//! `Option`, never through an error. The errors below cover the cases where
//! the caller asked for something the current tree state cannot provide.
//!
//! ## Error Flow
//!
//! ```text
//! cursor.current()
//!      │
//!      ├── before first advance() ──► Err(CursorUnstarted)
//!      ├── after exhaustion ────────► Err(CursorExhausted)
//!      ▼
//!   Ok(pair)
//!
//! tree.rotate_at(key, rotation)
//!      │
//!      ├── key missing ─────────────► Err(KeyNotFound)
//!      ├── promoted child missing ──► Err(RotationUnavailable)   (tree untouched)
//!      ▼
//!   Ok(())
//! ```

use thiserror::Error;

use crate::balance::Rotation;

/// Errors returned by cursor and rotation operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// `current()` was called on a cursor that has not been advanced yet.
	///
	/// Cursors start positioned before their first element. Call
	/// `advance()` once to move onto it.
	#[error("cursor has not been advanced yet")]
	CursorUnstarted,

	/// `current()` was called after the traversal ran out of elements.
	///
	/// `advance()` itself never fails at the end; it keeps returning `None`.
	#[error("cursor is exhausted")]
	CursorExhausted,

	/// The child that the rotation would promote does not exist.
	///
	/// A right rotation needs a left child, a left rotation needs a right
	/// child, and the double rotations additionally need the inner
	/// grandchild. The tree is left unchanged.
	#[error("cannot apply {rotation:?} rotation: required child is missing")]
	RotationUnavailable {
		/// The rotation that was requested.
		rotation: Rotation,
	},

	/// No node with the given key exists in the tree.
	#[error("key {0} not found")]
	KeyNotFound(u64),
}

/// A Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;
