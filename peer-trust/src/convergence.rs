//! # Convergence Module.
//!
//! Power iteration blending a row-stochastic trust matrix with a pre-trust vector.

use crate::{
	error::TrustError,
	math::{ColumnVector, Matrix},
};
use log::{debug, warn};

/// Progress of a [`EigenTrustConvergencePolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvergenceState {
	/// `converge` has not been called.
	NotStarted,
	/// The loop is running.
	Iterating,
	/// The change between two iterations fell below epsilon.
	Converged,
	/// The iteration cap was hit first.
	Exhausted,
}

/// Computes `t = (1 - alpha) * Cᵗ t + alpha * p` until it settles.
#[derive(Debug)]
pub struct EigenTrustConvergencePolicy {
	pre_trust: ColumnVector,
	matrix: Matrix,
	max_iterations: usize,
	epsilon: f64,
	alpha: f64,
	state: ConvergenceState,
	iterations: usize,
	result: Option<ColumnVector>,
}

impl EigenTrustConvergencePolicy {
	/// Creates a policy. `matrix` must be square with one row per pre-trust entry.
	pub fn new(
		pre_trust: ColumnVector, matrix: Matrix, max_iterations: usize, epsilon: f64, alpha: f64,
	) -> Result<Self, TrustError> {
		if matrix.row_count() != matrix.column_count() {
			return Err(TrustError::invalid_argument(format!(
				"trust matrix must be square, got {}x{}",
				matrix.row_count(),
				matrix.column_count()
			)));
		}

		if matrix.row_count() != pre_trust.len() {
			return Err(TrustError::invalid_argument(format!(
				"trust matrix has {} rows but pre-trust vector has {} entries",
				matrix.row_count(),
				pre_trust.len()
			)));
		}

		Ok(Self {
			pre_trust,
			matrix,
			max_iterations,
			epsilon,
			alpha,
			state: ConvergenceState::NotStarted,
			iterations: 0,
			result: None,
		})
	}

	/// Runs the power iteration and returns the normalized trust vector.
	///
	/// Only the first call iterates; later calls return the stored result.
	pub fn converge(&mut self) -> Result<ColumnVector, TrustError> {
		if let Some(result) = &self.result {
			return Ok(result.clone());
		}

		self.state = ConvergenceState::Iterating;
		let weighted_pre_trust = self.pre_trust.scale(self.alpha);
		let mut current = self.pre_trust.clone();
		let mut converged = false;
		while self.iterations < self.max_iterations {
			let propagated = self.matrix.transpose_multiply(&current)?.scale(1.0 - self.alpha);
			let next = propagated.add(&weighted_pre_trust)?;
			let delta = next.l1_distance(&current)?;
			current = next;
			self.iterations += 1;

			if delta < self.epsilon {
				converged = true;
				break;
			}
		}

		current.normalize();
		if converged {
			self.state = ConvergenceState::Converged;
			debug!("Trust converged after {} iterations.", self.iterations);
		} else {
			self.state = ConvergenceState::Exhausted;
			warn!("Trust did not converge within {} iterations.", self.max_iterations);
		}

		self.result = Some(current.clone());
		Ok(current)
	}

	/// Returns true once the loop terminated by reaching epsilon.
	pub fn has_converged(&self) -> bool {
		self.state == ConvergenceState::Converged
	}

	/// Current state.
	pub fn state(&self) -> ConvergenceState {
		self.state
	}

	/// Number of iterations performed.
	pub fn iterations(&self) -> usize {
		self.iterations
	}

	/// The trust vector, available once the loop terminated.
	pub fn result(&self) -> Option<&ColumnVector> {
		self.result.as_ref()
	}
}
