//! # Trust Parameters Module.
//!
//! Named configuration values consumed by the trust algorithms.

use crate::error::TrustError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, str::FromStr};

/// Maximum number of power iterations.
pub const MAX_ITERATIONS: &str = "MAX_ITERATIONS";
/// Weight of the pre-trust vector in each iteration.
pub const ALPHA: &str = "ALPHA";
/// Convergence threshold on the L1 distance between iterations.
pub const EPSILON: &str = "EPSILON";

/// Default value of [`MAX_ITERATIONS`].
pub const DEFAULT_MAX_ITERATIONS: i64 = 20;
/// Default value of [`ALPHA`].
pub const DEFAULT_ALPHA: f64 = 0.1;
/// Default value of [`EPSILON`].
pub const DEFAULT_EPSILON: f64 = 0.01;

/// String keyed trust parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustParameters {
	values: BTreeMap<String, String>,
}

impl TrustParameters {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a parameter set holding the default algorithm parameters.
	pub fn with_defaults() -> Self {
		let mut params = Self::new();
		params.set(MAX_ITERATIONS, DEFAULT_MAX_ITERATIONS);
		params.set(ALPHA, DEFAULT_ALPHA);
		params.set(EPSILON, DEFAULT_EPSILON);
		params
	}

	/// Sets a parameter.
	pub fn set(&mut self, name: &str, value: impl ToString) {
		self.values.insert(name.to_string(), value.to_string());
	}

	/// Returns true if the parameter is present.
	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	/// Returns a required string parameter.
	pub fn get_as_string(&self, name: &str) -> Result<String, TrustError> {
		self.values
			.get(name)
			.cloned()
			.ok_or_else(|| TrustError::invalid_argument(format!("missing parameter: {}", name)))
	}

	/// Returns a string parameter or `default` if it is absent.
	pub fn get_as_string_or(&self, name: &str, default: &str) -> String {
		self.values.get(name).cloned().unwrap_or_else(|| default.to_string())
	}

	/// Returns a required integer parameter.
	pub fn get_as_integer(&self, name: &str) -> Result<i64, TrustError> {
		self.parse_required(name)
	}

	/// Returns an integer parameter or `default` if it is absent or malformed.
	pub fn get_as_integer_or(&self, name: &str, default: i64) -> i64 {
		self.parse_or(name, default)
	}

	/// Returns a required floating point parameter.
	pub fn get_as_double(&self, name: &str) -> Result<f64, TrustError> {
		self.parse_required(name)
	}

	/// Returns a floating point parameter or `default` if it is absent or malformed.
	pub fn get_as_double_or(&self, name: &str, default: f64) -> f64 {
		self.parse_or(name, default)
	}

	fn parse_required<T: FromStr>(&self, name: &str) -> Result<T, TrustError> {
		let value = self.get_as_string(name)?;
		value.trim().parse().map_err(|_| {
			TrustError::invalid_argument(format!("malformed parameter {}: {}", name, value))
		})
	}

	fn parse_or<T: FromStr>(&self, name: &str, default: T) -> T {
		match self.values.get(name) {
			None => default,
			Some(value) => value.trim().parse().unwrap_or_else(|_| {
				warn!("Malformed trust parameter {}={}, using default.", name, value);
				default
			}),
		}
	}
}
