//! # CLI Module.
//!
//! This module contains all CLI related data handling and conversions.

use crate::fs::{load_experiences, load_statuses, save_config, save_experiences, save_scores, save_statuses};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use peer_trust::{
	context::TrustResult,
	error::TrustError,
	experience::NodeInteractionResult,
	node::{Node, NodeStatus},
	params::{ALPHA, EPSILON, MAX_ITERATIONS},
	random::{RandomSource, RngSource},
	storage::ScoreRecord,
	time::{SystemTimeProvider, TimeProvider},
	TrustAlgorithm, TrustConfig,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub mode: Mode,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Mode {
	/// Record the outcome of an interaction. Requires 'RecordData'.
	Record(RecordData),
	/// Compute trust over all known nodes and save the scores.
	Scores,
	/// Compute trust and select the peers to talk to.
	Select,
	/// Display the current configuration.
	Show,
	/// Set the status of a node. Requires 'StatusData'.
	Status(StatusData),
	/// Update the configuration. Requires 'UpdateData'.
	Update(UpdateData),
}

/// Record subcommand input.
#[derive(Args, Debug)]
pub struct RecordData {
	/// Observing node, the local node if omitted.
	#[clap(long = "from")]
	from: Option<String>,
	/// Partner node.
	#[clap(long = "to")]
	to: Option<String>,
	/// Interaction result (success, failure, neutral).
	#[clap(long = "result")]
	result: Option<String>,
}

/// Status subcommand input.
#[derive(Args, Debug)]
pub struct StatusData {
	/// Node identity.
	#[clap(long = "node")]
	node: Option<String>,
	/// Node status (active, busy, inactive, failure, unknown).
	#[clap(long = "status")]
	status: Option<String>,
}

/// Configuration update subcommand input.
#[derive(Args, Debug, Default)]
pub struct UpdateData {
	/// Local node identity.
	#[clap(long = "local-node")]
	local_node: Option<String>,
	/// Comma separated pre-trusted node identities.
	#[clap(long = "pre-trusted")]
	pre_trusted: Option<String>,
	/// Trust algorithm (eigentrust, eigentrust++).
	#[clap(long = "algorithm")]
	algorithm: Option<String>,
	/// Pre-trust weight, within [0, 1].
	#[clap(long = "alpha")]
	alpha: Option<String>,
	/// Convergence threshold.
	#[clap(long = "epsilon")]
	epsilon: Option<String>,
	/// Maximum number of iterations.
	#[clap(long = "max-iterations")]
	max_iterations: Option<String>,
	/// Seconds a computed trust vector is reused.
	#[clap(long = "cache-interval")]
	cache_interval: Option<String>,
	/// Low communication boost, in percent.
	#[clap(long = "low-com-weight")]
	low_com_weight: Option<String>,
}

impl RecordData {
	/// Parses the input into observer, partner and result.
	pub fn to_interaction(
		&self, config: &TrustConfig,
	) -> Result<(Node, Node, NodeInteractionResult), TrustError> {
		let from = self.from.as_ref().map_or_else(|| config.local(), |id| Node::new(id.clone()));
		let to = self
			.to
			.as_ref()
			.map(|id| Node::new(id.clone()))
			.ok_or_else(|| TrustError::InvalidArgument("Missing partner node.".to_string()))?;
		let result = self
			.result
			.as_ref()
			.ok_or_else(|| TrustError::InvalidArgument("Missing result.".to_string()))?
			.parse()?;

		Ok((from, to, result))
	}
}

impl StatusData {
	/// Parses the input into a node and its status.
	pub fn to_status(&self) -> Result<(Node, NodeStatus), TrustError> {
		let node = self
			.node
			.as_ref()
			.map(|id| Node::new(id.clone()))
			.ok_or_else(|| TrustError::InvalidArgument("Missing node.".to_string()))?;
		let status = self
			.status
			.as_ref()
			.ok_or_else(|| TrustError::InvalidArgument("Missing status.".to_string()))?
			.parse()?;

		Ok((node, status))
	}
}

/// Handles the `record` command.
pub fn handle_record(config: &TrustConfig, data: RecordData) -> Result<(), TrustError> {
	let (from, to, result) = data.to_interaction(config)?;
	let experiences = load_experiences()?;

	experiences.record_interaction(&from, &to, result, SystemTimeProvider.current_time());
	let filepath = save_experiences(&experiences)?;

	info!(
		"Recorded {} of {} with {}, experiences saved at \"{}\".",
		result,
		from,
		to,
		filepath.display()
	);

	Ok(())
}

/// Handles the `status` command.
pub fn handle_status(data: StatusData) -> Result<(), TrustError> {
	let (node, status) = data.to_status()?;
	let nodes = load_statuses()?;

	nodes.update(node.clone(), status);
	let filepath = save_statuses(&nodes)?;

	info!("Node {} is {}, statuses saved at \"{}\".", node, status, filepath.display());

	Ok(())
}

fn new_random() -> Box<dyn RandomSource> {
	Box::new(RngSource::from_entropy())
}

/// Computes trust for the local node over every node known from the statuses and
/// experiences files.
fn compute_trust(config: &TrustConfig) -> Result<TrustResult, TrustError> {
	let experiences = Arc::new(load_experiences()?);
	let nodes = Arc::new(load_statuses()?);

	let mut known = nodes.all_nodes();
	for (observer, pair) in experiences.all_node_experiences() {
		known.push(observer);
		known.push(pair.node().clone());
	}
	known.extend(config.pre_trusted().nodes().iter().cloned());

	let context = config.trust_context(known, experiences)?;
	debug!("Computing trust over {} nodes.", context.nodes().len());

	let provider = config.trust_provider(nodes, Arc::new(SystemTimeProvider), new_random())?;
	provider.compute_trust(&context)
}

/// Handles the `scores` command.
pub fn handle_scores(config: &TrustConfig) -> Result<(), TrustError> {
	let result = compute_trust(config)?;

	for (node, score) in result.node_values() {
		info!("{}: {:.6}", node, score);
	}

	let filepath = save_scores(ScoreRecord::from_result(&result))?;
	info!("Scores saved at \"{}\".", filepath.display());

	Ok(())
}

/// Handles the `select` command.
pub fn handle_select(config: &TrustConfig) -> Result<(), TrustError> {
	let result = compute_trust(config)?;
	let nodes = Arc::new(load_statuses()?);

	let mut selector = config.node_selector(&result, nodes, new_random);
	let selected = selector.select_nodes();

	if selected.is_empty() {
		info!("No node selected.");
	}

	for node in selected {
		info!("Selected {}", node);
	}

	Ok(())
}

/// Applies an update to the configuration, validating the result.
pub fn apply_update(config: &mut TrustConfig, data: UpdateData) -> Result<(), TrustError> {
	if let Some(local_node) = data.local_node {
		config.local_node = local_node;
	}

	if let Some(pre_trusted) = data.pre_trusted {
		config.pre_trusted_nodes = pre_trusted
			.split(',')
			.map(str::trim)
			.filter(|id| !id.is_empty())
			.map(str::to_string)
			.collect();
	}

	if let Some(algorithm) = data.algorithm {
		config.algorithm = algorithm.parse::<TrustAlgorithm>()?;
	}

	if let Some(alpha) = data.alpha {
		alpha.parse::<f64>().map_err(|e| TrustError::ParsingError(e.to_string()))?;
		config.params.set(ALPHA, alpha);
	}

	if let Some(epsilon) = data.epsilon {
		epsilon.parse::<f64>().map_err(|e| TrustError::ParsingError(e.to_string()))?;
		config.params.set(EPSILON, epsilon);
	}

	if let Some(max_iterations) = data.max_iterations {
		max_iterations.parse::<u32>().map_err(|e| TrustError::ParsingError(e.to_string()))?;
		config.params.set(MAX_ITERATIONS, max_iterations);
	}

	if let Some(cache_interval) = data.cache_interval {
		config.cache_interval =
			cache_interval.parse().map_err(|e: std::num::ParseIntError| TrustError::ParsingError(e.to_string()))?;
	}

	if let Some(low_com_weight) = data.low_com_weight {
		config.low_com_weight =
			low_com_weight.parse().map_err(|e: std::num::ParseIntError| TrustError::ParsingError(e.to_string()))?;
	}

	config.validate()
}

/// Handles the CLI project configuration update.
pub fn handle_update(config: &mut TrustConfig, data: UpdateData) -> Result<(), TrustError> {
	apply_update(config, data)?;
	save_config(config)
}
