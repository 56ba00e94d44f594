//! Tree display

use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::ReferralNode;

/// Node label: name, role and own volume.
pub fn node_label(node: &ReferralNode) -> String {
    format!(
        "{} ({}) · Vol: {}",
        node.name,
        node.role_label(),
        node.effective_volume()
    )
}

/// Convert a referral tree into a printable `termtree::Tree`, left leg first.
#[instrument(level = "trace", skip(node), fields(name = %node.name))]
pub fn render_tree(node: &ReferralNode) -> Tree<String> {
    let leaves: Vec<_> = node.children().map(render_tree).collect();
    Tree::new(node_label(node)).with_leaves(leaves)
}
