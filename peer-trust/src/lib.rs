//! # Peer Trust
//!
//! A library for rating and selecting peers of a peer-to-peer blockchain network.
//!
//! ## Main characteristics:
//!
//! **Self-policing** - every node derives the reputation of its peers from the
//! outcome of its own interactions and those reported by the rest of the network.
//!
//! **Bootstrapped** - a set of pre-trusted nodes anchors the computation, so new
//! networks and new nodes start from a sane trust vector.
//!
//! **Sybil resistant** - reputation is obtained by consistent good behavior
//! through several interactions, and EigenTrust++ discounts feedback from nodes
//! whose reports disagree with the local node's own experience.
//!
//! ## Implementation
//!
//! Trust is computed according to the original [Eigen Trust paper](http://ilpubs.stanford.edu:8090/562/1/2002-56.pdf),
//! optionally weighted by feedback credibility as in EigenTrust++. The raw trust vector
//! is post-processed by a chain of [`provider::TrustProvider`] decorators and consumed
//! by [`selector::NodeSelector`]s choosing which peers to talk to.

// Rustc
#![warn(trivial_casts)]
#![deny(
	absolute_paths_not_starting_with_crate, deprecated, future_incompatible, missing_docs,
	nonstandard_style, unreachable_code, unreachable_patterns
)]
#![forbid(unsafe_code)]
// Clippy
#![allow(clippy::tabs_in_doc_comments, clippy::needless_range_loop, clippy::new_without_default)]
#![deny(
	// Complexity
 	clippy::unnecessary_cast,
	clippy::needless_question_mark,
	clippy::clone_on_copy,
	// Pedantic
 	clippy::cast_lossless,
 	clippy::cast_possible_wrap,
	// Perf
	clippy::redundant_clone,
	// Restriction
 	clippy::panic,
	// Style
 	clippy::let_and_return,
 	clippy::needless_borrow
)]

pub mod context;
pub mod convergence;
pub mod error;
pub mod experience;
pub mod math;
pub mod node;
pub mod params;
pub mod provider;
pub mod random;
pub mod score_provider;
pub mod scores;
pub mod selector;
pub mod storage;
pub mod time;

use context::{PreTrustedNodes, TrustContext, TrustResult};
use error::TrustError;
use experience::NodeExperiences;
use log::info;
use node::{Node, NodeCollection};
use params::{TrustParameters, ALPHA, EPSILON, MAX_ITERATIONS};
use provider::{
	CachedTrustProvider, EigenTrust, EigenTrustPlusPlus, LowComTrustProvider, TrustProvider,
	TrustProviderMaskDecorator, MAX_MATRIX_SIZE, MIN_COMMUNICATION,
};
use random::RandomSource;
use selector::{BasicNodeSelector, NodeSelector, PreTrustAwareNodeSelector};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr, sync::Arc};
use time::TimeProvider;

/// Default number of seconds a computed trust vector is reused.
pub const DEFAULT_CACHE_INTERVAL: u64 = 900;
/// Default low communication boost, in percent.
pub const DEFAULT_LOW_COM_WEIGHT: u32 = 30;
/// Default number of nodes returned by `select_nodes`.
pub const DEFAULT_MAX_SELECTED_NODES: usize = 10;

/// The trust algorithm at the bottom of the provider chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustAlgorithm {
	/// Plain EigenTrust.
	#[serde(rename = "eigentrust")]
	EigenTrust,
	/// EigenTrust weighted by feedback credibility.
	#[default]
	#[serde(rename = "eigentrust++")]
	EigenTrustPlusPlus,
}

impl TrustAlgorithm {
	/// Returns the configuration name of the algorithm.
	pub fn as_str(&self) -> &'static str {
		match self {
			TrustAlgorithm::EigenTrust => "eigentrust",
			TrustAlgorithm::EigenTrustPlusPlus => "eigentrust++",
		}
	}

	fn create(&self) -> Box<dyn TrustProvider> {
		match self {
			TrustAlgorithm::EigenTrust => Box::new(EigenTrust::new()),
			TrustAlgorithm::EigenTrustPlusPlus => Box::new(EigenTrustPlusPlus::new()),
		}
	}
}

impl FromStr for TrustAlgorithm {
	type Err = TrustError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"eigentrust" => Ok(TrustAlgorithm::EigenTrust),
			"eigentrust++" | "eigentrustplusplus" => Ok(TrustAlgorithm::EigenTrustPlusPlus),
			_ => Err(TrustError::ParsingError(format!("unknown trust algorithm: {}", s))),
		}
	}
}

impl fmt::Display for TrustAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Trust pipeline configuration settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrustConfig {
	/// Identity of the node computing trust.
	pub local_node: String,
	/// Identities of the pre-trusted nodes.
	pub pre_trusted_nodes: Vec<String>,
	/// Trust algorithm.
	pub algorithm: TrustAlgorithm,
	/// Seconds a computed trust vector is reused.
	pub cache_interval: u64,
	/// Low communication boost, in percent.
	pub low_com_weight: u32,
	/// Successful calls below which a node is boosted.
	pub min_communication: u64,
	/// Maximum number of nodes passed to the trust algorithm.
	pub max_matrix_size: usize,
	/// Maximum number of nodes returned by `select_nodes`.
	pub max_selected_nodes: usize,
	/// Algorithm parameters.
	pub params: TrustParameters,
}

impl Default for TrustConfig {
	fn default() -> Self {
		Self {
			local_node: String::new(),
			pre_trusted_nodes: Vec::new(),
			algorithm: TrustAlgorithm::default(),
			cache_interval: DEFAULT_CACHE_INTERVAL,
			low_com_weight: DEFAULT_LOW_COM_WEIGHT,
			min_communication: MIN_COMMUNICATION,
			max_matrix_size: MAX_MATRIX_SIZE,
			max_selected_nodes: DEFAULT_MAX_SELECTED_NODES,
			params: TrustParameters::with_defaults(),
		}
	}
}

impl TrustConfig {
	/// Creates a default configuration for `local_node`.
	pub fn new(local_node: impl Into<String>) -> Self {
		Self { local_node: local_node.into(), ..Self::default() }
	}

	/// Checks the configuration for values the pipeline cannot work with.
	pub fn validate(&self) -> Result<(), TrustError> {
		if self.local_node.trim().is_empty() {
			return Err(config_error("local node must not be empty"));
		}

		if self.max_matrix_size < 2 {
			return Err(config_error("max matrix size must be at least 2"));
		}

		if self.max_selected_nodes == 0 {
			return Err(config_error("max selected nodes must be positive"));
		}

		if self.params.contains(ALPHA) {
			let alpha = self.params.get_as_double(ALPHA).map_err(|e| config_error(e.to_string()))?;
			if !(0.0..=1.0).contains(&alpha) {
				return Err(config_error(format!("{} must be within [0, 1], got {}", ALPHA, alpha)));
			}
		}

		if self.params.contains(EPSILON) {
			let epsilon =
				self.params.get_as_double(EPSILON).map_err(|e| config_error(e.to_string()))?;
			if epsilon <= 0.0 {
				return Err(config_error(format!("{} must be positive, got {}", EPSILON, epsilon)));
			}
		}

		if self.params.contains(MAX_ITERATIONS) {
			self.params.get_as_integer(MAX_ITERATIONS).map_err(|e| config_error(e.to_string()))?;
		}

		Ok(())
	}

	/// The configured local node.
	pub fn local(&self) -> Node {
		Node::new(self.local_node.clone())
	}

	/// The configured pre-trusted nodes.
	pub fn pre_trusted(&self) -> PreTrustedNodes {
		PreTrustedNodes::new(self.pre_trusted_nodes.iter().map(|id| Node::new(id.clone())).collect())
	}

	/// Builds a trust context over `nodes` plus the local node.
	///
	/// Duplicates are dropped and the local node is placed last.
	pub fn trust_context(
		&self, nodes: impl IntoIterator<Item = Node>, experiences: Arc<NodeExperiences>,
	) -> Result<TrustContext, TrustError> {
		let local = self.local();
		let mut seen = HashSet::new();
		seen.insert(local.identity().to_string());
		let mut context_nodes: Vec<Node> =
			nodes.into_iter().filter(|node| seen.insert(node.identity().to_string())).collect();
		context_nodes.push(local.clone());

		TrustContext::new(
			context_nodes,
			local,
			experiences,
			Arc::new(self.pre_trusted()),
			Arc::new(self.params.clone()),
		)
	}

	/// Composes the provider chain: masking of low communication boosted, cached results of
	/// the configured algorithm.
	pub fn trust_provider(
		&self, nodes: Arc<NodeCollection>, time_provider: Arc<dyn TimeProvider>,
		random: Box<dyn RandomSource>,
	) -> Result<Box<dyn TrustProvider>, TrustError> {
		self.validate()?;

		let cached = CachedTrustProvider::new(self.algorithm.create(), self.cache_interval, time_provider, random)
			.with_max_matrix_size(self.max_matrix_size);
		let low_com = LowComTrustProvider::new(Box::new(cached), self.low_com_weight)
			.with_min_communication(self.min_communication);
		let mask = TrustProviderMaskDecorator::new(Box::new(low_com), nodes);

		info!(
			"Created {} trust provider for {} (cache interval {}s, max matrix size {}).",
			self.algorithm, self.local_node, self.cache_interval, self.max_matrix_size
		);

		Ok(Box::new(mask))
	}

	/// Composes a pre-trust aware selector on top of a trust weighted one.
	///
	/// `new_random` is called once per selector in the chain.
	pub fn node_selector(
		&self, result: &TrustResult, nodes: Arc<NodeCollection>,
		mut new_random: impl FnMut() -> Box<dyn RandomSource>,
	) -> Box<dyn NodeSelector> {
		let basic = BasicNodeSelector::new(self.max_selected_nodes, result, new_random());
		Box::new(PreTrustAwareNodeSelector::new(
			Box::new(basic),
			nodes,
			result.context(),
			new_random(),
		))
	}
}

fn config_error(message: impl Into<String>) -> TrustError {
	TrustError::ConfigurationError(message.into())
}
