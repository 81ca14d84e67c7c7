//! Trust weighted node selection.

use super::NodeSelector;
use crate::{context::TrustResult, node::Node, random::RandomSource};

/// Selects nodes with a probability proportional to their trust.
///
/// Nodes without positive trust are never selected.
pub struct BasicNodeSelector {
	max_nodes: usize,
	nodes: Vec<Node>,
	trust_values: Vec<f64>,
	random: Box<dyn RandomSource>,
}

impl BasicNodeSelector {
	/// Creates a selector returning at most `max_nodes` nodes from `result`.
	pub fn new(max_nodes: usize, result: &TrustResult, random: Box<dyn RandomSource>) -> Self {
		Self {
			max_nodes,
			nodes: result.context().nodes().to_vec(),
			trust_values: result.trust_values().iter().copied().collect(),
			random,
		}
	}

	fn candidates(&self) -> Vec<usize> {
		(0..self.nodes.len()).filter(|i| self.trust_values[*i] > 0.0).collect()
	}

	/// Picks a position in `candidates` by walking the cumulative trust.
	fn pick(&mut self, candidates: &[usize]) -> Option<usize> {
		let total: f64 = candidates.iter().map(|i| self.trust_values[*i]).sum();
		if candidates.is_empty() || total <= 0.0 {
			return None;
		}

		let draw = self.random.next_double() * total;
		let mut cumulative = 0.0;
		for (position, i) in candidates.iter().enumerate() {
			cumulative += self.trust_values[*i];
			if cumulative > draw {
				return Some(position);
			}
		}

		// rounding can leave the draw just above the last bucket
		Some(candidates.len() - 1)
	}
}

impl NodeSelector for BasicNodeSelector {
	fn select_node(&mut self) -> Option<Node> {
		let candidates = self.candidates();
		self.pick(&candidates).map(|position| self.nodes[candidates[position]].clone())
	}

	fn select_nodes(&mut self) -> Vec<Node> {
		let mut candidates = self.candidates();
		if candidates.len() <= self.max_nodes {
			return candidates.into_iter().map(|i| self.nodes[i].clone()).collect();
		}

		let mut selected = Vec::with_capacity(self.max_nodes);
		while selected.len() < self.max_nodes {
			let Some(position) = self.pick(&candidates) else {
				break;
			};
			let index = candidates.remove(position);
			selected.push(self.nodes[index].clone());
		}

		selected
	}
}
