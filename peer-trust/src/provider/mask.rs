//! Trust provider decorator restricting trust to admitted nodes.

use super::TrustProvider;
use crate::{
	context::{TrustContext, TrustResult},
	error::TrustError,
	math::ColumnVector,
	node::{Node, NodeCollection, NodeStatus},
};
use log::debug;
use std::sync::Arc;

/// What a [`NodePredicate`] gets to see about a node.
#[derive(Clone, Debug)]
pub struct PredicateContext {
	/// The node.
	pub node: Node,
	/// Its current status.
	pub status: NodeStatus,
	/// Whether it is the local node.
	pub is_local_node: bool,
}

/// Decides whether a node may keep its trust.
pub type NodePredicate = Box<dyn Fn(&PredicateContext) -> bool + Send + Sync>;

/// Zeroes the trust of the local node and of every node rejected by the predicate.
///
/// The remaining trust is re-normalized. When admitted nodes exist but none of them has
/// any trust, they share the trust equally. When no node is admitted, every entry is 0.
pub struct TrustProviderMaskDecorator {
	inner: Box<dyn TrustProvider>,
	nodes: Arc<NodeCollection>,
	predicate: NodePredicate,
}

impl TrustProviderMaskDecorator {
	/// Creates a decorator admitting active nodes only.
	pub fn new(inner: Box<dyn TrustProvider>, nodes: Arc<NodeCollection>) -> Self {
		Self::with_predicate(inner, nodes, Box::new(is_active))
	}

	/// Creates a decorator admitting nodes accepted by `predicate`.
	pub fn with_predicate(
		inner: Box<dyn TrustProvider>, nodes: Arc<NodeCollection>, predicate: NodePredicate,
	) -> Self {
		Self { inner, nodes, predicate }
	}
}

fn is_active(context: &PredicateContext) -> bool {
	context.status == NodeStatus::Active
}

impl TrustProvider for TrustProviderMaskDecorator {
	fn compute_trust(&self, context: &TrustContext) -> Result<TrustResult, TrustError> {
		let result = self.inner.compute_trust(context)?;
		let inner_context = result.context();
		let local = inner_context.local_node();
		let mut values = ColumnVector::new(inner_context.nodes().len());
		let mut admitted = Vec::new();
		for (i, node) in inner_context.nodes().iter().enumerate() {
			let predicate_context = PredicateContext {
				node: node.clone(),
				status: self.nodes.status(node),
				is_local_node: node == local,
			};
			if (self.predicate)(&predicate_context) && !predicate_context.is_local_node {
				admitted.push(i);
				values[i] = result.trust_values()[i];
			}
		}

		if admitted.is_empty() {
			debug!("No node passed the trust mask.");
		} else if values.abs_sum() == 0.0 {
			debug!("No admitted node has trust, trusting {} nodes equally.", admitted.len());
			let share = 1.0 / admitted.len() as f64;
			for i in admitted {
				values[i] = share;
			}
		} else {
			values.normalize();
		}

		TrustResult::new(Arc::clone(inner_context), values)
	}
}
