//! # Trust Provider Module.
//!
//! The trust algorithms and the decorators post-processing their results.

/// Time-gated caching and truncation of large node sets
pub mod cached;
/// EigenTrust and EigenTrust++
pub mod eigentrust;
/// Boost for rarely contacted nodes
pub mod low_com;
/// Masking of inactive and local nodes
pub mod mask;

pub use cached::{CachedTrustProvider, MAX_MATRIX_SIZE};
pub use eigentrust::{EigenTrust, EigenTrustPlusPlus, SELF_TRUST_FLOOR};
pub use low_com::{LowComTrustProvider, MIN_COMMUNICATION};
pub use mask::{NodePredicate, PredicateContext, TrustProviderMaskDecorator};

use crate::{
	context::{TrustContext, TrustResult},
	error::TrustError,
};
use std::sync::Arc;

/// Computes a trust vector over the nodes of a context.
pub trait TrustProvider: Send + Sync {
	/// Computes trust for `context`.
	///
	/// Decorators return the context reported by their inner provider, which may differ
	/// from the one passed in.
	fn compute_trust(&self, context: &TrustContext) -> Result<TrustResult, TrustError>;
}

impl<T: TrustProvider + ?Sized> TrustProvider for Arc<T> {
	fn compute_trust(&self, context: &TrustContext) -> Result<TrustResult, TrustError> {
		(**self).compute_trust(context)
	}
}

impl<T: TrustProvider + ?Sized> TrustProvider for Box<T> {
	fn compute_trust(&self, context: &TrustContext) -> Result<TrustResult, TrustError> {
		(**self).compute_trust(context)
	}
}

#[cfg(test)]
pub(crate) mod mock {
	use super::*;
	use crate::{
		experience::NodeExperiences,
		math::ColumnVector,
		node::Node,
		context::PreTrustedNodes,
		params::TrustParameters,
	};
	use parking_lot::Mutex;

	type Compute = dyn Fn(&TrustContext, usize) -> Result<TrustResult, TrustError> + Send + Sync;

	/// Provider recording the contexts it sees and answering from a closure.
	pub struct MockTrustProvider {
		compute: Box<Compute>,
		contexts: Mutex<Vec<TrustContext>>,
	}

	impl MockTrustProvider {
		/// Answers call `n` (zero based) with `compute(context, n)`.
		pub fn new<F>(compute: F) -> Self
		where
			F: Fn(&TrustContext, usize) -> Result<TrustResult, TrustError> + Send + Sync + 'static,
		{
			Self { compute: Box::new(compute), contexts: Mutex::new(Vec::new()) }
		}

		/// Answers every call with `values` over the passed context.
		pub fn with_values(values: ColumnVector) -> Self {
			Self::new(move |context, _| {
				TrustResult::new(Arc::new(context.clone()), values.clone())
			})
		}

		/// Answers the calls in order with the given results, repeating the last one.
		pub fn with_results(results: Vec<TrustResult>) -> Self {
			Self::new(move |_, call| {
				let index = call.min(results.len().saturating_sub(1));
				results
					.get(index)
					.cloned()
					.ok_or_else(|| TrustError::invalid_argument("no mock result configured"))
			})
		}

		/// Number of calls.
		pub fn calls(&self) -> usize {
			self.contexts.lock().len()
		}

		/// Contexts passed to the provider, in call order.
		pub fn contexts(&self) -> Vec<TrustContext> {
			self.contexts.lock().clone()
		}
	}

	impl TrustProvider for MockTrustProvider {
		fn compute_trust(&self, context: &TrustContext) -> Result<TrustResult, TrustError> {
			let call = {
				let mut contexts = self.contexts.lock();
				contexts.push(context.clone());
				contexts.len() - 1
			};
			(self.compute)(context, call)
		}
	}

	/// Creates `names` nodes followed by the local node `l`.
	pub fn create_nodes(names: &[&str]) -> Vec<Node> {
		names.iter().map(|name| Node::new(*name)).chain(std::iter::once(Node::new("l"))).collect()
	}

	/// Creates a context over `nodes` whose last node is the local node.
	pub fn create_context(
		nodes: Vec<Node>, experiences: Arc<NodeExperiences>, pre_trusted: PreTrustedNodes,
	) -> TrustContext {
		let local = nodes.last().cloned().unwrap_or_else(|| Node::new("l"));
		TrustContext::new(
			nodes,
			local,
			experiences,
			Arc::new(pre_trusted),
			Arc::new(TrustParameters::with_defaults()),
		)
		.unwrap()
	}

	/// Creates a result over a fresh context with the given values.
	pub fn create_result(nodes: Vec<Node>, values: Vec<f64>) -> TrustResult {
		let context =
			create_context(nodes, Arc::new(NodeExperiences::new()), PreTrustedNodes::default());
		TrustResult::new(Arc::new(context), ColumnVector::from(values)).unwrap()
	}
}
