//! # Score Provider Module.
//!
//! Strategies turning raw experience counters into local trust and credibility scores.

use crate::{
	experience::{NodeExperience, NodeExperiences},
	node::Node,
};

/// Converts experiences into scores.
pub trait ScoreProvider: Send + Sync {
	/// Local trust an observer derives from its experience with a partner.
	fn trust_score(&self, experience: &NodeExperience) -> f64;

	/// Contribution of a shared partner to the credibility between two observers, given
	/// the experience each observer has with that partner.
	///
	/// Returns 0 unless both observers have interacted with the partner.
	fn partner_credibility(&self, experience1: &NodeExperience, experience2: &NodeExperience) -> f64;

	/// Contribution of `node3` to the credibility of `node2` as seen by `node1`.
	fn credibility_score(
		&self, node1: &Node, node2: &Node, node3: &Node, experiences: &NodeExperiences,
	) -> f64 {
		self.partner_credibility(
			&experiences.peek_experience(node1, node3),
			&experiences.peek_experience(node2, node3),
		)
	}
}

/// Classic EigenTrust scoring: successes minus failures, no credibility.
#[derive(Clone, Copy, Debug, Default)]
pub struct EigenTrustScoreProvider;

impl ScoreProvider for EigenTrustScoreProvider {
	fn trust_score(&self, experience: &NodeExperience) -> f64 {
		experience.successful_calls().saturating_sub(experience.failed_calls()) as f64
	}

	fn partner_credibility(&self, _: &NodeExperience, _: &NodeExperience) -> f64 {
		0.0
	}
}

/// EigenTrust++ scoring: successes only, with credibility from shared partners.
#[derive(Clone, Copy, Debug, Default)]
pub struct EigenTrustPlusPlusScoreProvider;

impl ScoreProvider for EigenTrustPlusPlusScoreProvider {
	fn trust_score(&self, experience: &NodeExperience) -> f64 {
		experience.successful_calls() as f64
	}

	fn partner_credibility(&self, experience1: &NodeExperience, experience2: &NodeExperience) -> f64 {
		if experience1.total_calls() == 0 || experience2.total_calls() == 0 {
			return 0.0;
		}

		let a = self.trust_score(experience1);
		let b = self.trust_score(experience2);
		if a + b == 0.0 {
			return 0.0;
		}

		(a - b) / (a + b)
	}
}
