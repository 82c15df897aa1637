//! Test utilities for building trees of an exact shape from JSON fixtures
//!
//! Insertion order alone cannot produce every shape (for example a tree that
//! violates ordering), so fixtures describe nodes and links directly:
//!
//! ```text
//! { "root": { "key": 10, "value": 100,
//!             "left":  { "key": 4, "value": 40 },
//!             "right": { "key": 12, "value": 120 } } }
//! ```
use crate::node::{Node, NodeId};
use crate::Tree;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct TreeNode {
	key: u64,
	value: u64,
	#[serde(default)]
	left: Option<Box<TreeNode>>,
	#[serde(default)]
	right: Option<Box<TreeNode>>,
}

#[derive(Deserialize, Debug)]
struct SampleTree {
	root: Option<TreeNode>,
}

fn translate_node(tree: &mut Tree<u64>, tree_node: TreeNode, parent: Option<NodeId>) -> NodeId {
	let id = tree.nodes.alloc(Node::leaf(tree_node.key, tree_node.value, parent));

	if let Some(left) = tree_node.left {
		let left = translate_node(tree, *left, Some(id));
		tree.nodes[id].left = Some(left);
	}
	if let Some(right) = tree_node.right {
		let right = translate_node(tree, *right, Some(id));
		tree.nodes[id].right = Some(right);
	}
	id
}

pub fn sample_tree(json: &str) -> Tree<u64> {
	let json_tree: SampleTree = serde_json::from_str(json).expect("malformed tree fixture");
	let mut tree = Tree::new();
	if let Some(root) = json_tree.root {
		tree.root = Some(translate_node(&mut tree, root, None));
	}
	tree
}

#[test]
fn empty_fixture() {
	let tree = sample_tree(r#"{ "root": null }"#);
	assert!(tree.is_empty());
	tree.assert_invariants();
}
