//! # Scores Module.
//!
//! Sparse pairwise scores with a per-observer weight sum, used both for local trust and
//! for EigenTrust++ credibility.

use crate::{
	error::TrustError,
	math::{ColumnVector, Matrix},
	node::Node,
};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct ScoreState {
	scores: HashMap<(String, String), f64>,
	weights: HashMap<String, f64>,
}

/// Thread-safe `(observer, partner) -> score` store.
#[derive(Debug, Default)]
pub struct Scores {
	initial_score: f64,
	state: RwLock<ScoreState>,
}

/// Local trust scores.
pub type TrustScores = Scores;

/// EigenTrust++ credibility scores.
pub type CredibilityScores = Scores;

impl Scores {
	/// Creates a store returning `initial_score` for pairs that were never set.
	pub fn new(initial_score: f64) -> Self {
		Self { initial_score, state: RwLock::new(ScoreState::default()) }
	}

	/// Returns the score `observer` assigns to `partner`.
	pub fn score(&self, observer: &Node, partner: &Node) -> f64 {
		self.state.read().scores.get(&key(observer, partner)).copied().unwrap_or(self.initial_score)
	}

	/// Sets the score `observer` assigns to `partner`.
	pub fn set_score(&self, observer: &Node, partner: &Node, score: f64) {
		self.state.write().scores.insert(key(observer, partner), score);
	}

	/// Returns the weight sum of `observer`, 0 if never set.
	pub fn score_weight(&self, observer: &Node) -> f64 {
		self.state.read().weights.get(observer.identity()).copied().unwrap_or(0.0)
	}

	/// Sets the weight sum of `observer`.
	pub fn set_score_weight(&self, observer: &Node, weight: f64) {
		self.state.write().weights.insert(observer.identity().to_string(), weight);
	}

	/// Returns the scores `observer` assigns to each of `nodes`.
	pub fn score_vector(&self, observer: &Node, nodes: &[Node]) -> ColumnVector {
		let state = self.state.read();
		let values = nodes
			.iter()
			.map(|partner| {
				state.scores.get(&key(observer, partner)).copied().unwrap_or(self.initial_score)
			})
			.collect::<Vec<f64>>();
		ColumnVector::from(values)
	}

	/// Sets the scores `observer` assigns to each of `nodes`.
	pub fn set_score_vector(
		&self, observer: &Node, nodes: &[Node], vector: &ColumnVector,
	) -> Result<(), TrustError> {
		if nodes.len() != vector.len() {
			return Err(TrustError::invalid_argument(format!(
				"score vector has {} entries for {} nodes",
				vector.len(),
				nodes.len()
			)));
		}

		let mut state = self.state.write();
		for (partner, score) in nodes.iter().zip(vector.iter()) {
			state.scores.insert(key(observer, partner), *score);
		}

		Ok(())
	}

	/// Builds the score matrix over `nodes`; row `i` holds the scores of `nodes[i]`.
	pub fn score_matrix(&self, nodes: &[Node]) -> Result<Matrix, TrustError> {
		let rows = nodes.iter().map(|observer| self.score_vector(observer, nodes)).collect();
		Matrix::from_rows(rows)
	}

	/// Scales the score vector of every observer in `nodes` to unit L1 norm.
	pub fn normalize(&self, nodes: &[Node]) -> Result<(), TrustError> {
		for observer in nodes {
			let mut vector = self.score_vector(observer, nodes);
			vector.normalize();
			self.set_score_vector(observer, nodes, &vector)?;
		}

		Ok(())
	}

	/// Drops every stored score and weight.
	pub fn clear(&self) {
		let mut state = self.state.write();
		state.scores.clear();
		state.weights.clear();
	}

	/// Number of stored `(observer, partner)` scores.
	pub fn len(&self) -> usize {
		self.state.read().scores.len()
	}

	/// Returns true if no score is stored.
	pub fn is_empty(&self) -> bool {
		self.state.read().scores.is_empty()
	}
}

fn key(observer: &Node, partner: &Node) -> (String, String) {
	(observer.identity().to_string(), partner.identity().to_string())
}
