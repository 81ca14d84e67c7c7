//! EigenTrust and EigenTrust++ trust providers.

use super::TrustProvider;
use crate::{
	context::{TrustContext, TrustResult},
	convergence::EigenTrustConvergencePolicy,
	error::TrustError,
	math::{ColumnVector, Matrix},
	node::Node,
	params::{ALPHA, DEFAULT_ALPHA, DEFAULT_EPSILON, DEFAULT_MAX_ITERATIONS, EPSILON, MAX_ITERATIONS},
	score_provider::{EigenTrustPlusPlusScoreProvider, EigenTrustScoreProvider, ScoreProvider},
	scores::{CredibilityScores, TrustScores},
};
use log::debug;
use std::sync::Arc;

/// Trust a node places in itself. Keeps every matrix row non-zero.
pub const SELF_TRUST_FLOOR: f64 = 1e-9;

/// The EigenTrust algorithm.
pub struct EigenTrust {
	score_provider: Box<dyn ScoreProvider>,
	trust_scores: TrustScores,
}

impl Default for EigenTrust {
	fn default() -> Self {
		Self::new()
	}
}

impl EigenTrust {
	/// Creates the provider with classic EigenTrust scoring.
	pub fn new() -> Self {
		Self::with_score_provider(Box::new(EigenTrustScoreProvider))
	}

	/// Creates the provider with custom scoring.
	pub fn with_score_provider(score_provider: Box<dyn ScoreProvider>) -> Self {
		Self { score_provider, trust_scores: TrustScores::new(0.0) }
	}

	/// The local trust scores computed so far.
	pub fn trust_scores(&self) -> &TrustScores {
		&self.trust_scores
	}

	/// Recomputes the local trust `node` has in every node of `context`.
	///
	/// An observer without any scored interaction falls back to the pre-trust vector.
	pub fn update_trust(&self, node: &Node, context: &TrustContext) -> Result<(), TrustError> {
		let nodes = context.nodes();
		let experiences = context.experiences();
		let mut vector = ColumnVector::new(nodes.len());
		let mut weight = 0.0;
		let mut self_index = None;
		for (j, partner) in nodes.iter().enumerate() {
			if partner == node {
				self_index = Some(j);
				continue;
			}

			let score = self.score_provider.trust_score(&experiences.experience(node, partner));
			vector[j] = score;
			weight += score;
		}

		self.trust_scores.set_score_weight(node, weight);
		if weight == 0.0 {
			vector = context.pre_trusted_nodes().pre_trust_vector(nodes);
		}

		if let Some(i) = self_index {
			vector[i] = vector[i].max(SELF_TRUST_FLOOR);
		}

		self.trust_scores.set_score_vector(node, nodes, &vector)
	}

	/// Builds the row-normalized local trust matrix over `nodes`.
	pub fn trust_matrix(&self, nodes: &[Node]) -> Result<Matrix, TrustError> {
		let mut matrix = self.trust_scores.score_matrix(nodes)?;
		matrix.normalize_rows();
		Ok(matrix)
	}

	fn update_all(&self, context: &TrustContext) -> Result<(), TrustError> {
		self.trust_scores.clear();
		for node in context.nodes() {
			self.update_trust(node, context)?;
		}

		Ok(())
	}
}

impl TrustProvider for EigenTrust {
	fn compute_trust(&self, context: &TrustContext) -> Result<TrustResult, TrustError> {
		self.update_all(context)?;
		let matrix = self.trust_matrix(context.nodes())?;
		converge(context, matrix)
	}
}

/// The EigenTrust++ algorithm: EigenTrust with local trust weighted by credibility.
pub struct EigenTrustPlusPlus {
	eigen_trust: EigenTrust,
	credibility_scores: CredibilityScores,
}

impl Default for EigenTrustPlusPlus {
	fn default() -> Self {
		Self::new()
	}
}

impl EigenTrustPlusPlus {
	/// Creates the provider.
	pub fn new() -> Self {
		Self {
			eigen_trust: EigenTrust::with_score_provider(Box::new(EigenTrustPlusPlusScoreProvider)),
			credibility_scores: CredibilityScores::new(0.0),
		}
	}

	/// The local trust scores computed so far.
	pub fn trust_scores(&self) -> &TrustScores {
		self.eigen_trust.trust_scores()
	}

	/// The credibility scores computed so far.
	pub fn credibility_scores(&self) -> &CredibilityScores {
		&self.credibility_scores
	}

	/// See [`EigenTrust::update_trust`].
	pub fn update_trust(&self, node: &Node, context: &TrustContext) -> Result<(), TrustError> {
		self.eigen_trust.update_trust(node, context)
	}

	/// Recomputes the credibility between every ordered pair of observers in `context`.
	///
	/// Credibility is the mean score contribution over the partners both observers
	/// interacted with, 0 without any shared partner and 1 for an observer and itself.
	pub fn update_feedback(&self, context: &TrustContext) -> Result<(), TrustError> {
		let nodes = context.nodes();
		let experiences = context.experiences().experience_snapshot(nodes);
		let score_provider = &self.eigen_trust.score_provider;
		self.credibility_scores.clear();
		for (i, node1) in nodes.iter().enumerate() {
			let mut vector = ColumnVector::new(nodes.len());
			for j in 0..nodes.len() {
				if i == j {
					vector[j] = 1.0;
					continue;
				}

				let mut sum = 0.0;
				let mut shared = 0usize;
				for k in 0..nodes.len() {
					if k == i || k == j {
						continue;
					}

					let (experience1, experience2) = (&experiences[i][k], &experiences[j][k]);
					if experience1.total_calls() > 0 && experience2.total_calls() > 0 {
						sum += score_provider.partner_credibility(experience1, experience2);
						shared += 1;
					}
				}

				vector[j] = if shared == 0 { 0.0 } else { sum / shared as f64 };
			}

			self.credibility_scores.set_score_vector(node1, nodes, &vector)?;
		}

		Ok(())
	}

	/// Builds the local trust matrix with every cell weighted by `1 - |credibility|`.
	///
	/// Rows left without any weight towards other nodes keep their unweighted values.
	pub fn trust_matrix(&self, nodes: &[Node]) -> Result<Matrix, TrustError> {
		let mut matrix = self.eigen_trust.trust_matrix(nodes)?;
		let credibility = self.credibility_scores.score_matrix(nodes)?;
		for i in 0..nodes.len() {
			let mut row = matrix.row(i);
			for j in 0..nodes.len() {
				let weight = if i == j { 1.0 } else { 1.0 - credibility.get(i, j).abs() };
				row[j] *= weight;
			}

			let off_diagonal = (0..nodes.len()).filter(|j| *j != i).map(|j| row[j]).sum::<f64>();
			if off_diagonal == 0.0 {
				continue;
			}

			row.normalize();
			for j in 0..nodes.len() {
				matrix.set(i, j, row[j]);
			}
		}

		Ok(matrix)
	}
}

impl TrustProvider for EigenTrustPlusPlus {
	fn compute_trust(&self, context: &TrustContext) -> Result<TrustResult, TrustError> {
		self.eigen_trust.update_all(context)?;
		self.update_feedback(context)?;
		let matrix = self.trust_matrix(context.nodes())?;
		converge(context, matrix)
	}
}

fn converge(context: &TrustContext, matrix: Matrix) -> Result<TrustResult, TrustError> {
	let params = context.params();
	let max_iterations =
		params.get_as_integer_or(MAX_ITERATIONS, DEFAULT_MAX_ITERATIONS).max(0) as usize;
	let alpha = params.get_as_double_or(ALPHA, DEFAULT_ALPHA);
	let epsilon = params.get_as_double_or(EPSILON, DEFAULT_EPSILON);

	let pre_trust = context.pre_trusted_nodes().pre_trust_vector(context.nodes());
	let mut policy = EigenTrustConvergencePolicy::new(pre_trust, matrix, max_iterations, epsilon, alpha)?;
	let trust_values = policy.converge()?;
	debug!(
		"Computed trust over {} nodes in {} iterations (converged: {}).",
		context.nodes().len(),
		policy.iterations(),
		policy.has_converged()
	);

	TrustResult::new(Arc::new(context.clone()), trust_values)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		context::PreTrustedNodes,
		experience::{NodeExperience, NodeExperiences},
		provider::mock::{create_context, create_nodes},
	};

	fn assert_normalized(result: &TrustResult) {
		assert!((result.trust_values().abs_sum() - 1.0).abs() < 1e-9);
		assert_eq!(result.trust_values().len(), result.context().nodes().len());
	}

	fn create_experiences(nodes: &[Node]) -> Arc<NodeExperiences> {
		let experiences = NodeExperiences::new();
		experiences.set_experience(&nodes[0], &nodes[1], NodeExperience::new(8, 2));
		experiences.set_experience(&nodes[0], &nodes[2], NodeExperience::new(3, 1));
		experiences.set_experience(&nodes[1], &nodes[0], NodeExperience::new(5, 0));
		experiences.set_experience(&nodes[1], &nodes[2], NodeExperience::new(1, 4));
		experiences.set_experience(&nodes[2], &nodes[0], NodeExperience::new(2, 2));
		experiences.set_experience(&nodes[3], &nodes[1], NodeExperience::new(6, 0));
		Arc::new(experiences)
	}

	#[test]
	fn test_update_trust_scores_partners() {
		let nodes = create_nodes(&["a", "b", "c"]);
		let context = create_context(nodes.clone(), create_experiences(&nodes), PreTrustedNodes::default());
		let eigen_trust = EigenTrust::new();

		eigen_trust.update_trust(&nodes[0], &context).unwrap();

		let vector = eigen_trust.trust_scores().score_vector(&nodes[0], &nodes);
		assert_eq!(vector.as_slice(), &[SELF_TRUST_FLOOR, 6.0, 2.0, 0.0]);
		assert_eq!(eigen_trust.trust_scores().score_weight(&nodes[0]), 8.0);
	}

	#[test]
	fn test_update_trust_falls_back_to_pre_trust() {
		let nodes = create_nodes(&["a", "b", "c"]);
		let pre_trusted = PreTrustedNodes::new(vec![nodes[1].clone(), nodes[2].clone()]);
		let context = create_context(nodes.clone(), create_experiences(&nodes), pre_trusted);
		let eigen_trust = EigenTrust::new();

		// c only has a balanced experience with a
		eigen_trust.update_trust(&nodes[2], &context).unwrap();

		let vector = eigen_trust.trust_scores().score_vector(&nodes[2], &nodes);
		assert_eq!(vector.as_slice(), &[0.0, 0.5, 0.5, 0.0]);
		assert_eq!(eigen_trust.trust_scores().score_weight(&nodes[2]), 0.0);
	}

	#[test]
	fn test_self_entry_is_never_zero() {
		let nodes = create_nodes(&["a", "b"]);
		let pre_trusted = PreTrustedNodes::new(vec![nodes[0].clone()]);
		let context = create_context(nodes.clone(), Arc::new(NodeExperiences::new()), pre_trusted);
		let eigen_trust = EigenTrust::new();

		eigen_trust.update_trust(&nodes[2], &context).unwrap();

		let vector = eigen_trust.trust_scores().score_vector(&nodes[2], &nodes);
		assert_eq!(vector[0], 1.0);
		assert_eq!(vector[1], 0.0);
		assert_eq!(vector[2], SELF_TRUST_FLOOR);
	}

	#[test]
	fn test_trust_matrix_rows_are_stochastic() {
		let nodes = create_nodes(&["a", "b", "c"]);
		let context = create_context(nodes.clone(), create_experiences(&nodes), PreTrustedNodes::default());
		let eigen_trust = EigenTrust::new();
		for node in &nodes {
			eigen_trust.update_trust(node, &context).unwrap();
		}

		let matrix = eigen_trust.trust_matrix(&nodes).unwrap();

		assert!((matrix.abs_sum() - nodes.len() as f64).abs() < 1e-9);
		for i in 0..nodes.len() {
			assert!((matrix.row(i).sum() - 1.0).abs() < 1e-9);
		}
	}

	#[test]
	fn test_eigentrust_result_is_normalized() {
		let nodes = create_nodes(&["a", "b", "c"]);
		let context = create_context(nodes.clone(), create_experiences(&nodes), PreTrustedNodes::default());

		let result = EigenTrust::new().compute_trust(&context).unwrap();

		assert_normalized(&result);
		assert_eq!(result.context().nodes(), context.nodes());
		// b is trusted by everyone who has a positive opinion
		let values = result.trust_values();
		assert!(values[1] > values[2]);
	}

	#[test]
	fn test_eigentrust_without_experiences_returns_pre_trust() {
		let nodes = create_nodes(&["a", "b", "c"]);
		let pre_trusted = PreTrustedNodes::new(vec![nodes[0].clone()]);
		let context = create_context(nodes, Arc::new(NodeExperiences::new()), pre_trusted);

		let result = EigenTrust::new().compute_trust(&context).unwrap();

		assert_normalized(&result);
		assert!(result.trust_values()[0] > 0.99);
	}

	#[test]
	fn test_update_feedback_computes_credibility() {
		let nodes = create_nodes(&["a", "b", "c"]);
		let experiences = NodeExperiences::new();
		experiences.set_experience(&nodes[0], &nodes[2], NodeExperience::new(3, 0));
		experiences.set_experience(&nodes[1], &nodes[2], NodeExperience::new(1, 0));
		let context = create_context(nodes.clone(), Arc::new(experiences), PreTrustedNodes::default());
		let eigen_trust = EigenTrustPlusPlus::new();

		eigen_trust.update_feedback(&context).unwrap();

		let credibility = eigen_trust.credibility_scores();
		assert_eq!(credibility.score(&nodes[0], &nodes[0]), 1.0);
		assert_eq!(credibility.score(&nodes[0], &nodes[1]), 0.5);
		assert_eq!(credibility.score(&nodes[1], &nodes[0]), -0.5);
		assert_eq!(credibility.score(&nodes[0], &nodes[3]), 0.0);
	}

	#[test]
	fn test_credibility_weights_trust_matrix() {
		let nodes = create_nodes(&["a", "b", "c"]);
		let experiences = NodeExperiences::new();
		experiences.set_experience(&nodes[0], &nodes[1], NodeExperience::new(1, 0));
		experiences.set_experience(&nodes[0], &nodes[2], NodeExperience::new(3, 0));
		experiences.set_experience(&nodes[1], &nodes[2], NodeExperience::new(1, 0));
		let context = create_context(nodes.clone(), Arc::new(experiences), PreTrustedNodes::default());
		let eigen_trust = EigenTrustPlusPlus::new();
		for node in &nodes {
			eigen_trust.update_trust(node, &context).unwrap();
		}
		eigen_trust.update_feedback(&context).unwrap();

		let matrix = eigen_trust.trust_matrix(&nodes).unwrap();

		// a rates b at half weight since they disagree on c
		let row = matrix.row(0);
		let total = SELF_TRUST_FLOOR + 0.5 + 3.0;
		assert!((row[1] - 0.5 / total).abs() < 1e-9);
		assert!((row[2] - 3.0 / total).abs() < 1e-9);
		for i in 0..nodes.len() {
			assert!((matrix.row(i).sum() - 1.0).abs() < 1e-9);
		}
	}

	#[test]
	fn test_eigentrust_plus_plus_result_is_normalized() {
		let nodes = create_nodes(&["a", "b", "c"]);
		let context = create_context(nodes.clone(), create_experiences(&nodes), PreTrustedNodes::default());

		let result = EigenTrustPlusPlus::new().compute_trust(&context).unwrap();

		assert_normalized(&result);
		assert_eq!(result.context().nodes(), context.nodes());
	}

	#[test]
	fn test_rows_without_credible_partners_keep_unweighted_trust() {
		let nodes = create_nodes(&["a", "b", "c"]);
		let experiences = NodeExperiences::new();
		experiences.set_experience(&nodes[0], &nodes[1], NodeExperience::new(1, 0));
		experiences.set_experience(&nodes[0], &nodes[2], NodeExperience::new(1, 0));
		experiences.set_experience(&nodes[1], &nodes[2], NodeExperience::new(0, 1));
		experiences.set_experience(&nodes[2], &nodes[1], NodeExperience::new(0, 1));
		let context = create_context(nodes.clone(), Arc::new(experiences), PreTrustedNodes::default());
		let eigen_trust = EigenTrustPlusPlus::new();
		for node in &nodes {
			eigen_trust.update_trust(node, &context).unwrap();
		}
		eigen_trust.update_feedback(&context).unwrap();

		// a disagrees completely with b and c about each other
		let credibility = eigen_trust.credibility_scores();
		assert_eq!(credibility.score(&nodes[0], &nodes[1]), 1.0);
		assert_eq!(credibility.score(&nodes[0], &nodes[2]), 1.0);

		let unweighted = eigen_trust.eigen_trust.trust_matrix(&nodes).unwrap();
		let weighted = eigen_trust.trust_matrix(&nodes).unwrap();
		assert_eq!(weighted.row(0), unweighted.row(0));
		assert!(weighted.row(0)[0] < 1e-6);

		let result = EigenTrustPlusPlus::new().compute_trust(&context).unwrap();
		let values = result.trust_values();
		assert_normalized(&result);
		assert!(values[0] < values[1]);
		assert!(values[0] < values[2]);
	}

	#[test]
	fn test_scores_only_cover_the_latest_context() {
		let experiences = Arc::new(NodeExperiences::new());
		let first = create_nodes(&["a", "b", "c"]);
		let second = create_nodes(&["d", "e", "f", "g"]);
		for nodes in [&first, &second] {
			experiences.set_experience(&nodes[0], &nodes[1], NodeExperience::new(2, 0));
			experiences.set_experience(&nodes[0], &nodes[2], NodeExperience::new(1, 0));
			experiences.set_experience(&nodes[1], &nodes[2], NodeExperience::new(1, 1));
		}
		let eigen_trust = EigenTrustPlusPlus::new();

		for nodes in [&first, &second] {
			let context =
				create_context(nodes.clone(), Arc::clone(&experiences), PreTrustedNodes::default());
			eigen_trust.compute_trust(&context).unwrap();
		}

		let size = second.len() * second.len();
		assert_eq!(eigen_trust.trust_scores().len(), size);
		assert_eq!(eigen_trust.credibility_scores().len(), size);
		assert_eq!(eigen_trust.trust_scores().score_weight(&first[0]), 0.0);
		assert_eq!(eigen_trust.credibility_scores().score(&first[0], &first[1]), 0.0);
	}

	#[test]
	fn test_eigentrust_scores_are_bounded_across_rounds() {
		let experiences = Arc::new(NodeExperiences::new());
		let eigen_trust = EigenTrust::new();

		for round in 0..5 {
			let (a, b) = (format!("a{}", round), format!("b{}", round));
			let nodes = create_nodes(&[a.as_str(), b.as_str()]);
			experiences.set_experience(&nodes[0], &nodes[1], NodeExperience::new(3, 0));
			let context = create_context(nodes, Arc::clone(&experiences), PreTrustedNodes::default());
			eigen_trust.compute_trust(&context).unwrap();
		}

		assert_eq!(eigen_trust.trust_scores().len(), 9);
	}
}
