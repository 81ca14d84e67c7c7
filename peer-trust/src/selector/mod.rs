//! # Node Selector Module.
//!
//! Weighted random choice of peers from a trust vector.

/// Trust weighted selection
pub mod basic;
/// Selection guaranteeing connectivity to pre-trusted nodes
pub mod pre_trust;

pub use basic::BasicNodeSelector;
pub use pre_trust::PreTrustAwareNodeSelector;

use crate::node::Node;

/// Chooses peers to communicate with.
pub trait NodeSelector: Send {
	/// Selects a single node, `None` if no node qualifies.
	fn select_node(&mut self) -> Option<Node>;

	/// Selects several distinct nodes.
	fn select_nodes(&mut self) -> Vec<Node>;
}

impl<T: NodeSelector + ?Sized> NodeSelector for Box<T> {
	fn select_node(&mut self) -> Option<Node> {
		(**self).select_node()
	}

	fn select_nodes(&mut self) -> Vec<Node> {
		(**self).select_nodes()
	}
}
