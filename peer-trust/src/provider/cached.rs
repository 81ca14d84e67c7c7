//! Caching trust provider bounding the number of nodes passed to its inner provider.

use super::TrustProvider;
use crate::{
	context::{TrustContext, TrustResult},
	error::TrustError,
	node::Node,
	random::{random_index, RandomSource},
	time::{TimeInstant, TimeProvider},
};
use log::debug;
use parking_lot::Mutex;
use std::{cmp::Ordering, collections::HashSet, sync::Arc};

/// Maximum number of nodes passed to the inner provider.
pub const MAX_MATRIX_SIZE: usize = 101;

struct CacheState {
	result: Option<TrustResult>,
	cached_at: TimeInstant,
	random: Box<dyn RandomSource>,
}

/// Recomputes trust at most once per cache interval.
///
/// Contexts larger than the maximum matrix size are truncated before reaching the inner
/// provider. The whole check, compute and store sequence runs under one lock, so
/// concurrent callers never race on the cache.
pub struct CachedTrustProvider {
	inner: Box<dyn TrustProvider>,
	cache_interval: u64,
	max_matrix_size: usize,
	time_provider: Arc<dyn TimeProvider>,
	state: Mutex<CacheState>,
}

impl CachedTrustProvider {
	/// Creates a provider caching `inner` results for `cache_interval` seconds.
	pub fn new(
		inner: Box<dyn TrustProvider>, cache_interval: u64, time_provider: Arc<dyn TimeProvider>,
		random: Box<dyn RandomSource>,
	) -> Self {
		Self {
			inner,
			cache_interval,
			max_matrix_size: MAX_MATRIX_SIZE,
			time_provider,
			state: Mutex::new(CacheState { result: None, cached_at: TimeInstant::ZERO, random }),
		}
	}

	/// Overrides the maximum number of nodes passed to the inner provider.
	pub fn with_max_matrix_size(mut self, max_matrix_size: usize) -> Self {
		self.max_matrix_size = max_matrix_size.max(1);
		self
	}

	fn truncate(
		&self, context: &TrustContext, previous: Option<&TrustResult>, random: &mut dyn RandomSource,
	) -> Result<TrustContext, TrustError> {
		let local = context.local_node();
		let pre_trusted = context.pre_trusted_nodes();
		let capacity = self.max_matrix_size - 1;
		let mut candidates: Vec<&Node> = context.nodes().iter().filter(|node| *node != local).collect();
		let candidate_ids: HashSet<&str> = context.nodes().iter().map(|node| node.identity()).collect();

		let mut selected: Vec<Node> = Vec::with_capacity(self.max_matrix_size);
		let mut selected_ids: HashSet<String> = HashSet::new();
		let mut select = |node: &Node, selected: &mut Vec<Node>| {
			if selected.len() < capacity && selected_ids.insert(node.identity().to_string()) {
				selected.push(node.clone());
			}
		};

		for node in candidates.iter().filter(|node| pre_trusted.is_pre_trusted(node)) {
			select(*node, &mut selected);
		}

		if let Some(previous) = previous {
			for node in top_trusted_nodes(previous, self.max_matrix_size / 10) {
				if candidate_ids.contains(node.identity()) && node != local {
					select(node, &mut selected);
				}
			}
		}

		candidates.retain(|node| !selected.contains(*node));
		while selected.len() < capacity && !candidates.is_empty() {
			let index = random_index(random, candidates.len());
			let node = candidates.swap_remove(index);
			select(node, &mut selected);
		}

		selected.push(local.clone());
		debug!("Truncated trust context from {} to {} nodes.", context.nodes().len(), selected.len());
		context.with_nodes(selected)
	}
}

fn top_trusted_nodes(result: &TrustResult, count: usize) -> Vec<&Node> {
	let mut ranked: Vec<(&Node, f64)> = result.node_values().filter(|(_, value)| *value > 0.0).collect();
	ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
	ranked.into_iter().take(count).map(|(node, _)| node).collect()
}

impl TrustProvider for CachedTrustProvider {
	fn compute_trust(&self, context: &TrustContext) -> Result<TrustResult, TrustError> {
		let mut guard = self.state.lock();
		let state = &mut *guard;
		let now = self.time_provider.current_time();
		if let Some(cached) = &state.result {
			if now.seconds_since(state.cached_at) < self.cache_interval {
				debug!("Using cached trust values from {}.", state.cached_at);
				return Ok(cached.clone());
			}
		}

		let result = if context.nodes().len() > self.max_matrix_size {
			let truncated = self.truncate(context, state.result.as_ref(), state.random.as_mut())?;
			self.inner.compute_trust(&truncated)?
		} else {
			self.inner.compute_trust(context)?
		};

		debug!("Recomputed trust values at {}.", now);
		state.result = Some(result.clone());
		state.cached_at = now;
		Ok(result)
	}
}
