//! Node selection that keeps the local node connected to pre-trusted nodes.

use super::NodeSelector;
use crate::{
	context::TrustContext,
	node::{Node, NodeCollection, NodeStatus},
	random::{random_index, RandomSource},
};
use std::sync::Arc;

/// Decorates a selector so that pre-trusted nodes are always reachable.
///
/// When no pre-trusted node is active, all of them are offered, so the local node keeps
/// trying its bootstrap peers. A pre-trusted local node talks to every active pre-trusted
/// node, any other node to a random one of them.
pub struct PreTrustAwareNodeSelector {
	inner: Box<dyn NodeSelector>,
	nodes: Arc<NodeCollection>,
	local_node: Node,
	pre_trusted_nodes: Vec<Node>,
	is_local_pre_trusted: bool,
	random: Box<dyn RandomSource>,
}

impl PreTrustAwareNodeSelector {
	/// Creates a selector decorating `inner`.
	pub fn new(
		inner: Box<dyn NodeSelector>, nodes: Arc<NodeCollection>, context: &TrustContext,
		random: Box<dyn RandomSource>,
	) -> Self {
		let local_node = context.local_node().clone();
		let pre_trusted = context.pre_trusted_nodes();
		let pre_trusted_nodes =
			pre_trusted.nodes().iter().filter(|node| **node != local_node).cloned().collect();

		Self {
			inner,
			nodes,
			is_local_pre_trusted: pre_trusted.is_pre_trusted(&local_node),
			local_node,
			pre_trusted_nodes,
			random,
		}
	}

	fn online_pre_trusted_nodes(&self) -> Vec<Node> {
		self.pre_trusted_nodes
			.iter()
			.filter(|node| self.nodes.status(node) == NodeStatus::Active)
			.cloned()
			.collect()
	}

	fn random_node(&mut self, nodes: &[Node]) -> Option<Node> {
		if nodes.is_empty() {
			return None;
		}

		Some(nodes[random_index(self.random.as_mut(), nodes.len())].clone())
	}
}

impl NodeSelector for PreTrustAwareNodeSelector {
	fn select_node(&mut self) -> Option<Node> {
		if let Some(node) = self.inner.select_node() {
			return Some(node);
		}

		let online = self.online_pre_trusted_nodes();
		if online.is_empty() {
			let offline = self.pre_trusted_nodes.clone();
			return self.random_node(&offline);
		}

		self.random_node(&online)
	}

	fn select_nodes(&mut self) -> Vec<Node> {
		let mut selected = self.inner.select_nodes();
		selected.retain(|node| *node != self.local_node);

		let online = self.online_pre_trusted_nodes();
		let additional = if online.is_empty() {
			self.pre_trusted_nodes.clone()
		} else if self.is_local_pre_trusted {
			online
		} else {
			self.random_node(&online).into_iter().collect()
		};

		for node in additional {
			if !selected.contains(&node) {
				selected.push(node);
			}
		}

		selected
	}
}
