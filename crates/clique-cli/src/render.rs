//! Text rendering of a built tree for `clique inspect`.
//!
//! One line per node, children indented under their parent, left child first.
//! Each line shows the node's size and the first four bytes of its hash; leaf
//! lines also show the record as compact JSON.
//!
//! ```text
//! b [3, a65325a0]
//! ├─b [1, 5fe7f977] 1
//! └─b [2, 4f4cb06a]
//!   ├─b [1, f2ee15ea] 2
//!   └─b [1, 69c322e3] 3
//! ```

use clique_merkle::{MerkleNode, MerkleTree, Signature};
use serde_json::Value;

/// Render `tree`, or `()` for an empty tree.
pub fn render_tree(tree: &MerkleTree<Value>) -> String {
    let mut out = String::new();
    match tree.root() {
        None => out.push_str("()\n"),
        Some(root) => render_node(root, "", "", &mut out),
    }
    out
}

fn short(sig: &Signature) -> String {
    format!("[{}, {}]", sig.size, &sig.hash.to_hex()[..8])
}

fn render_node(node: &MerkleNode<Value>, lead: &str, child_pad: &str, out: &mut String) {
    match node {
        MerkleNode::Leaf { value, signature } => {
            out.push_str(&format!("{lead}b {} {value}\n", short(signature)));
        }
        MerkleNode::Branch {
            left,
            right,
            signature,
        } => {
            out.push_str(&format!("{lead}b {}\n", short(signature)));
            render_node(
                left,
                &format!("{child_pad}├─"),
                &format!("{child_pad}│ "),
                out,
            );
            render_node(
                right,
                &format!("{child_pad}└─"),
                &format!("{child_pad}  "),
                out,
            );
        }
    }
}
