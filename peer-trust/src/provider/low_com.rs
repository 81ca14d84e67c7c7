//! Trust provider boosting nodes the local node rarely talked to.

use super::TrustProvider;
use crate::{
	context::{TrustContext, TrustResult},
	error::TrustError,
};
use log::debug;
use std::sync::Arc;

/// Successful calls below which a node receives a boost.
pub const MIN_COMMUNICATION: u64 = 10;

/// Adds trust to nodes with few successful calls from the local node.
///
/// A node with `c < min` successful calls gains `(weight / 100) * (min - c) / min` before
/// the vector is re-normalized. The weight is a percentage.
pub struct LowComTrustProvider {
	inner: Box<dyn TrustProvider>,
	weight: u32,
	min_communication: u64,
}

impl LowComTrustProvider {
	/// Creates a provider boosting with `weight` percent.
	pub fn new(inner: Box<dyn TrustProvider>, weight: u32) -> Self {
		Self { inner, weight, min_communication: MIN_COMMUNICATION }
	}

	/// Overrides the number of successful calls below which nodes are boosted.
	pub fn with_min_communication(mut self, min_communication: u64) -> Self {
		self.min_communication = min_communication;
		self
	}
}

impl TrustProvider for LowComTrustProvider {
	fn compute_trust(&self, context: &TrustContext) -> Result<TrustResult, TrustError> {
		let result = self.inner.compute_trust(context)?;
		if self.weight == 0 || self.min_communication == 0 {
			return Ok(result);
		}

		let inner_context = result.context();
		let local = inner_context.local_node();
		let experiences = inner_context.experiences();
		let min = self.min_communication as f64;
		let scale = f64::from(self.weight) / 100.0;
		let mut values = result.trust_values().clone();
		let mut boosted = 0usize;
		for (i, node) in inner_context.nodes().iter().enumerate() {
			if node == local {
				continue;
			}

			let calls = experiences.experience(local, node).successful_calls();
			if calls < self.min_communication {
				values[i] += scale * (min - calls as f64) / min;
				boosted += 1;
			}
		}

		values.normalize();
		debug!("Boosted {} rarely contacted nodes.", boosted);
		TrustResult::new(Arc::clone(inner_context), values)
	}
}
