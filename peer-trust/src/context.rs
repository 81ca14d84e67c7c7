//! # Trust Context Module.
//!
//! Snapshots consumed by a single trust computation and the results produced from them.

use crate::{
	error::TrustError, experience::NodeExperiences, math::ColumnVector, node::Node,
	params::TrustParameters,
};
use std::{collections::HashSet, sync::Arc};

/// Bootstrap nodes that receive trust without having earned it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreTrustedNodes {
	nodes: Vec<Node>,
}

impl PreTrustedNodes {
	/// Creates the set, dropping duplicates while keeping the first occurrence.
	pub fn new(nodes: Vec<Node>) -> Self {
		let mut seen = HashSet::new();
		let nodes = nodes.into_iter().filter(|node| seen.insert(node.identity().to_string())).collect();
		Self { nodes }
	}

	/// The pre-trusted nodes.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Number of pre-trusted nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Returns true if there is no pre-trusted node.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Returns true if `node` is pre-trusted.
	pub fn is_pre_trusted(&self, node: &Node) -> bool {
		self.nodes.contains(node)
	}

	/// Builds the pre-trust distribution over `nodes`.
	///
	/// The distribution is uniform over the pre-trusted members of `nodes`, or uniform over
	/// all of `nodes` when none of them is pre-trusted.
	pub fn pre_trust_vector(&self, nodes: &[Node]) -> ColumnVector {
		let mut vector = ColumnVector::new(nodes.len());
		let present = nodes.iter().filter(|node| self.is_pre_trusted(node)).count();
		if present == 0 {
			if !nodes.is_empty() {
				vector.set_all(1.0 / nodes.len() as f64);
			}
			return vector;
		}

		for (i, node) in nodes.iter().enumerate() {
			if self.is_pre_trusted(node) {
				vector[i] = 1.0 / present as f64;
			}
		}

		vector
	}
}

/// Immutable input of one trust computation.
#[derive(Clone, Debug)]
pub struct TrustContext {
	nodes: Vec<Node>,
	local_node: Node,
	experiences: Arc<NodeExperiences>,
	pre_trusted_nodes: Arc<PreTrustedNodes>,
	params: Arc<TrustParameters>,
}

impl TrustContext {
	/// Creates a context. The nodes must be unique and contain the local node.
	pub fn new(
		nodes: Vec<Node>, local_node: Node, experiences: Arc<NodeExperiences>,
		pre_trusted_nodes: Arc<PreTrustedNodes>, params: Arc<TrustParameters>,
	) -> Result<Self, TrustError> {
		let mut seen = HashSet::new();
		if let Some(duplicate) = nodes.iter().find(|node| !seen.insert(node.identity())) {
			return Err(TrustError::invalid_argument(format!(
				"duplicate node in trust context: {}",
				duplicate.identity()
			)));
		}

		if !seen.contains(local_node.identity()) {
			return Err(TrustError::invalid_argument(format!(
				"local node {} is not part of the trust context",
				local_node.identity()
			)));
		}

		Ok(Self { nodes, local_node, experiences, pre_trusted_nodes, params })
	}

	/// Derives a context over other nodes, sharing everything else.
	pub fn with_nodes(&self, nodes: Vec<Node>) -> Result<Self, TrustError> {
		Self::new(
			nodes,
			self.local_node.clone(),
			Arc::clone(&self.experiences),
			Arc::clone(&self.pre_trusted_nodes),
			Arc::clone(&self.params),
		)
	}

	/// Participating nodes.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// The node computing trust.
	pub fn local_node(&self) -> &Node {
		&self.local_node
	}

	/// Position of the local node in [`TrustContext::nodes`].
	pub fn local_node_index(&self) -> usize {
		self.nodes.iter().position(|node| node == &self.local_node).unwrap_or(self.nodes.len())
	}

	/// Shared experience store.
	pub fn experiences(&self) -> &Arc<NodeExperiences> {
		&self.experiences
	}

	/// Pre-trusted nodes.
	pub fn pre_trusted_nodes(&self) -> &Arc<PreTrustedNodes> {
		&self.pre_trusted_nodes
	}

	/// Algorithm parameters.
	pub fn params(&self) -> &Arc<TrustParameters> {
		&self.params
	}
}

/// A trust vector paired with the context it was computed over.
#[derive(Clone, Debug)]
pub struct TrustResult {
	context: Arc<TrustContext>,
	trust_values: ColumnVector,
}

impl TrustResult {
	/// Creates a result. The vector must have one entry per context node.
	pub fn new(context: Arc<TrustContext>, trust_values: ColumnVector) -> Result<Self, TrustError> {
		if context.nodes().len() != trust_values.len() {
			return Err(TrustError::invalid_argument(format!(
				"trust vector has {} entries for {} nodes",
				trust_values.len(),
				context.nodes().len()
			)));
		}

		Ok(Self { context, trust_values })
	}

	/// The context the vector belongs to.
	pub fn context(&self) -> &Arc<TrustContext> {
		&self.context
	}

	/// The trust vector.
	pub fn trust_values(&self) -> &ColumnVector {
		&self.trust_values
	}

	/// Pairs every context node with its trust value.
	pub fn node_values(&self) -> impl Iterator<Item = (&Node, f64)> {
		self.context.nodes().iter().zip(self.trust_values.iter().copied())
	}
}
