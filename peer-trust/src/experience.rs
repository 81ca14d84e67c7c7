//! # Experience Module.
//!
//! Counters of successful and failed interactions between pairs of nodes.
//!
//! The store is long-lived and shared between the network callbacks that record
//! interactions and the periodic trust refresh, so every access goes through a single
//! `parking_lot` mutex. Experiences are keyed by node identity, never by node instance.

use crate::{error::TrustError, math::Matrix, node::Node, time::TimeInstant};
use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

/// Default number of hours an experience is kept without being updated.
pub const DEFAULT_RETENTION_HOURS: u64 = 24;

/// Interaction counters of one observer with one partner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeExperience {
	successful_calls: u64,
	failed_calls: u64,
	last_update_time: TimeInstant,
}

impl NodeExperience {
	/// Creates an experience with the given counters.
	pub fn new(successful_calls: u64, failed_calls: u64) -> Self {
		Self { successful_calls, failed_calls, last_update_time: TimeInstant::ZERO }
	}

	/// Number of successful calls.
	pub fn successful_calls(&self) -> u64 {
		self.successful_calls
	}

	/// Number of failed calls.
	pub fn failed_calls(&self) -> u64 {
		self.failed_calls
	}

	/// Number of calls of any outcome.
	pub fn total_calls(&self) -> u64 {
		self.successful_calls + self.failed_calls
	}

	/// Time of the last update.
	pub fn last_update_time(&self) -> TimeInstant {
		self.last_update_time
	}

	/// Sets the number of successful calls.
	pub fn set_successful_calls(&mut self, calls: u64) {
		self.successful_calls = calls;
	}

	/// Sets the number of failed calls.
	pub fn set_failed_calls(&mut self, calls: u64) {
		self.failed_calls = calls;
	}

	/// Sets the time of the last update.
	pub fn set_last_update_time(&mut self, time: TimeInstant) {
		self.last_update_time = time;
	}
}

/// Outcome of a single interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeInteractionResult {
	/// The partner answered correctly.
	Success,
	/// The partner misbehaved or did not answer.
	Failure,
	/// The interaction says nothing about the partner.
	Neutral,
}

impl FromStr for NodeInteractionResult {
	type Err = TrustError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"success" => Ok(NodeInteractionResult::Success),
			"failure" => Ok(NodeInteractionResult::Failure),
			"neutral" => Ok(NodeInteractionResult::Neutral),
			_ => Err(TrustError::ParsingError(format!("Invalid interaction result: {}", s))),
		}
	}
}

impl fmt::Display for NodeInteractionResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			NodeInteractionResult::Success => "success",
			NodeInteractionResult::Failure => "failure",
			NodeInteractionResult::Neutral => "neutral",
		};
		f.write_str(name)
	}
}

/// A partner together with the experience an observer has with it.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeExperiencePair {
	node: Node,
	experience: NodeExperience,
}

impl NodeExperiencePair {
	/// Creates a new pair.
	pub fn new(node: Node, experience: NodeExperience) -> Self {
		Self { node, experience }
	}

	/// The partner node.
	pub fn node(&self) -> &Node {
		&self.node
	}

	/// The experience with the partner.
	pub fn experience(&self) -> &NodeExperience {
		&self.experience
	}
}

#[derive(Debug, Default)]
struct ExperienceState {
	experiences: HashMap<(String, String), NodeExperience>,
	nodes: HashMap<String, Node>,
}

impl ExperienceState {
	fn entry(&mut self, observer: &Node, partner: &Node) -> &mut NodeExperience {
		self.remember(observer);
		self.remember(partner);
		let key = (observer.identity().to_string(), partner.identity().to_string());
		self.experiences.entry(key).or_default()
	}

	fn remember(&mut self, node: &Node) {
		if !self.nodes.contains_key(node.identity()) {
			self.nodes.insert(node.identity().to_string(), node.clone());
		}
	}

	fn total_calls(&self, observer: &Node, partner: &Node) -> u64 {
		let key = (observer.identity().to_string(), partner.identity().to_string());
		self.experiences.get(&key).map_or(0, |e| e.total_calls())
	}
}

/// Thread-safe store of all known experiences.
#[derive(Debug)]
pub struct NodeExperiences {
	state: Mutex<ExperienceState>,
	retention_seconds: u64,
}

impl Default for NodeExperiences {
	fn default() -> Self {
		Self::with_retention_hours(DEFAULT_RETENTION_HOURS)
	}
}

impl NodeExperiences {
	/// Creates an empty store with the default retention time.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty store keeping experiences for `hours` after their last update.
	pub fn with_retention_hours(hours: u64) -> Self {
		Self { state: Mutex::new(ExperienceState::default()), retention_seconds: hours * 60 * 60 }
	}

	/// Returns the experience `observer` has with `partner`, creating it if necessary.
	pub fn experience(&self, observer: &Node, partner: &Node) -> NodeExperience {
		*self.state.lock().entry(observer, partner)
	}

	/// Returns the experience `observer` has with `partner` without storing a new one.
	pub fn peek_experience(&self, observer: &Node, partner: &Node) -> NodeExperience {
		let key = (observer.identity().to_string(), partner.identity().to_string());
		self.state.lock().experiences.get(&key).copied().unwrap_or_default()
	}

	/// Mutates the experience `observer` has with `partner` under the store lock.
	pub fn update_experience<F>(&self, observer: &Node, partner: &Node, update: F)
	where
		F: FnOnce(&mut NodeExperience),
	{
		update(self.state.lock().entry(observer, partner));
	}

	/// Replaces the experience `observer` has with `partner`.
	pub fn set_experience(&self, observer: &Node, partner: &Node, experience: NodeExperience) {
		*self.state.lock().entry(observer, partner) = experience;
	}

	/// Records the outcome of an interaction.
	///
	/// Neutral outcomes and interactions of a node with itself are ignored.
	pub fn record_interaction(
		&self, observer: &Node, partner: &Node, result: NodeInteractionResult, time: TimeInstant,
	) {
		if observer == partner || result == NodeInteractionResult::Neutral {
			return;
		}

		self.update_experience(observer, partner, |experience| {
			match result {
				NodeInteractionResult::Success => experience.successful_calls += 1,
				NodeInteractionResult::Failure => experience.failed_calls += 1,
				NodeInteractionResult::Neutral => {},
			}
			experience.last_update_time = time;
		});
	}

	/// Returns every experience of `observer`, ordered by partner.
	pub fn node_experiences(&self, observer: &Node) -> Vec<NodeExperiencePair> {
		let state = self.state.lock();
		let mut pairs: Vec<NodeExperiencePair> = state
			.experiences
			.iter()
			.filter(|((o, _), _)| o == observer.identity())
			.map(|((_, p), experience)| {
				let node = state.nodes.get(p).cloned().unwrap_or_else(|| Node::new(p.clone()));
				NodeExperiencePair::new(node, *experience)
			})
			.collect();
		pairs.sort_by(|a, b| a.node.cmp(&b.node));
		pairs
	}

	/// Returns every stored experience with at least one call as `(observer, pair)`,
	/// ordered by observer and partner.
	pub fn all_node_experiences(&self) -> Vec<(Node, NodeExperiencePair)> {
		let state = self.state.lock();
		let node = |id: &String| state.nodes.get(id).cloned().unwrap_or_else(|| Node::new(id.clone()));
		let mut all: Vec<(Node, NodeExperiencePair)> = state
			.experiences
			.iter()
			.filter(|(_, experience)| experience.total_calls() > 0)
			.map(|((o, p), experience)| (node(o), NodeExperiencePair::new(node(p), *experience)))
			.collect();
		all.sort_by(|a, b| (&a.0, &a.1.node).cmp(&(&b.0, &b.1.node)));
		all
	}

	/// Stores experiences reported for `observer`, stamped with `time`.
	///
	/// Nodes already known to the store keep their cached instance.
	pub fn set_node_experiences(&self, observer: &Node, pairs: &[NodeExperiencePair], time: TimeInstant) {
		let mut state = self.state.lock();
		for pair in pairs {
			let entry = state.entry(observer, &pair.node);
			*entry = pair.experience;
			entry.last_update_time = time;
		}
	}

	/// Builds the matrix of experiences shared with `local`.
	///
	/// Cell `(i, j)` is 1 when node `i` is not the local node, `i != j`, and both node `i` and
	/// the local node have interacted with node `j`.
	pub fn shared_experience_matrix(&self, local: &Node, nodes: &[Node]) -> Matrix {
		let state = self.state.lock();
		let mut matrix = Matrix::new(nodes.len(), nodes.len());
		for (i, node_i) in nodes.iter().enumerate() {
			if node_i == local {
				continue;
			}

			for (j, node_j) in nodes.iter().enumerate() {
				if i == j {
					continue;
				}

				if state.total_calls(local, node_j) > 0 && state.total_calls(node_i, node_j) > 0 {
					matrix.set(i, j, 1.0);
				}
			}
		}

		matrix
	}

	/// Copies the experiences between `nodes` under a single lock.
	///
	/// Cell `[i][j]` holds the experience `nodes[i]` has with `nodes[j]`. Missing pairs read
	/// as empty experiences and are not added to the store.
	pub fn experience_snapshot(&self, nodes: &[Node]) -> Vec<Vec<NodeExperience>> {
		let state = self.state.lock();
		nodes
			.iter()
			.map(|observer| {
				nodes
					.iter()
					.map(|partner| {
						let key = (observer.identity().to_string(), partner.identity().to_string());
						state.experiences.get(&key).copied().unwrap_or_default()
					})
					.collect()
			})
			.collect()
	}

	/// Drops every experience last updated before `current_time` minus the retention time.
	pub fn prune(&self, current_time: TimeInstant) {
		let mut state = self.state.lock();
		let before = state.experiences.len();
		let retention = self.retention_seconds;
		state
			.experiences
			.retain(|_, experience| current_time.seconds_since(experience.last_update_time) <= retention);

		debug!("Pruned {} node experiences.", before - state.experiences.len());
	}

	/// Number of stored experiences.
	pub fn len(&self) -> usize {
		self.state.lock().experiences.len()
	}

	/// Returns true if no experience is stored.
	pub fn is_empty(&self) -> bool {
		self.state.lock().experiences.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn create_nodes(count: usize) -> Vec<Node> {
		(0..count).map(|i| Node::new(format!("node{}", i))).collect()
	}

	fn set_successful(experiences: &NodeExperiences, observer: &Node, partner: &Node, calls: u64) {
		experiences.update_experience(observer, partner, |e| e.set_successful_calls(calls));
	}

	#[test]
	fn test_unknown_experience_is_created_empty() {
		let nodes = create_nodes(2);
		let experiences = NodeExperiences::new();

		let experience = experiences.experience(&nodes[0], &nodes[1]);

		assert_eq!(experience, NodeExperience::default());
		assert_eq!(experiences.len(), 1);
	}

	#[test]
	fn test_experience_is_directional() {
		let nodes = create_nodes(2);
		let experiences = NodeExperiences::new();

		set_successful(&experiences, &nodes[0], &nodes[1], 3);

		assert_eq!(experiences.experience(&nodes[0], &nodes[1]).successful_calls(), 3);
		assert_eq!(experiences.experience(&nodes[1], &nodes[0]).successful_calls(), 0);
	}

	#[test]
	fn test_experience_is_keyed_by_identity() {
		let experiences = NodeExperiences::new();
		let alice = Node::with_endpoint("alice", "http://10.0.0.1");
		let bob = Node::with_endpoint("bob", "http://10.0.0.2");

		set_successful(&experiences, &alice, &bob, 5);

		let result = experiences.experience(&Node::new("alice"), &Node::new("bob"));
		assert_eq!(result.successful_calls(), 5);
	}

	#[test]
	fn test_experience_snapshot_does_not_create_entries() {
		let nodes = create_nodes(3);
		let experiences = NodeExperiences::new();
		set_successful(&experiences, &nodes[0], &nodes[2], 4);
		set_successful(&experiences, &nodes[2], &nodes[1], 1);

		let snapshot = experiences.experience_snapshot(&nodes);

		assert_eq!(snapshot.len(), 3);
		assert!(snapshot.iter().all(|row| row.len() == 3));
		assert_eq!(snapshot[0][2].successful_calls(), 4);
		assert_eq!(snapshot[2][1].successful_calls(), 1);
		assert_eq!(snapshot[1][0], NodeExperience::default());
		assert_eq!(experiences.len(), 2);
		assert_eq!(experiences.peek_experience(&nodes[0], &nodes[2]).successful_calls(), 4);
		assert_eq!(experiences.peek_experience(&nodes[1], &nodes[2]), NodeExperience::default());
		assert_eq!(experiences.len(), 2);
	}

	#[test]
	fn test_record_interaction() {
		let nodes = create_nodes(2);
		let experiences = NodeExperiences::new();
		let time = TimeInstant::new(77);

		experiences.record_interaction(&nodes[0], &nodes[1], NodeInteractionResult::Success, time);
		experiences.record_interaction(&nodes[0], &nodes[1], NodeInteractionResult::Success, time);
		experiences.record_interaction(&nodes[0], &nodes[1], NodeInteractionResult::Failure, time);
		experiences.record_interaction(&nodes[0], &nodes[1], NodeInteractionResult::Neutral, time);
		experiences.record_interaction(&nodes[0], &nodes[0], NodeInteractionResult::Success, time);

		let experience = experiences.experience(&nodes[0], &nodes[1]);
		assert_eq!(experience.successful_calls(), 2);
		assert_eq!(experience.failed_calls(), 1);
		assert_eq!(experience.total_calls(), 3);
		assert_eq!(experience.last_update_time(), time);
		assert_eq!(experiences.len(), 1);
	}

	#[test]
	fn test_interaction_result_parsing() {
		assert_eq!("Success".parse::<NodeInteractionResult>().unwrap(), NodeInteractionResult::Success);
		assert_eq!("neutral".parse::<NodeInteractionResult>().unwrap(), NodeInteractionResult::Neutral);
		assert!("maybe".parse::<NodeInteractionResult>().is_err());
	}

	fn create_total_shared_experience_matrix() -> Matrix {
		let nodes = create_nodes(3);
		let experiences = NodeExperiences::new();
		for observer in &nodes {
			for partner in &nodes {
				set_successful(&experiences, observer, partner, 1);
			}
		}

		experiences.shared_experience_matrix(&nodes[1], &nodes)
	}

	#[test]
	fn test_shared_experience_matrix_with_all_interactions() {
		let matrix = create_total_shared_experience_matrix();

		assert_eq!(matrix.row_count(), 3);
		assert_eq!(matrix.column_count(), 3);
		assert_eq!(matrix.abs_sum(), 4.0);
		assert_eq!(matrix.get(0, 1), 1.0);
		assert_eq!(matrix.get(0, 2), 1.0);
		assert_eq!(matrix.get(2, 0), 1.0);
		assert_eq!(matrix.get(2, 1), 1.0);
		for i in 0..3 {
			assert_eq!(matrix.get(i, i), 0.0);
			assert_eq!(matrix.get(1, i), 0.0);
		}
	}

	#[test]
	fn test_shared_experience_matrix_ignores_one_sided_interactions() {
		let nodes = create_nodes(3);

		let local_only = NodeExperiences::new();
		for partner in &nodes {
			set_successful(&local_only, &nodes[1], partner, 1);
		}
		assert_eq!(local_only.shared_experience_matrix(&nodes[1], &nodes).abs_sum(), 0.0);

		let external_only = NodeExperiences::new();
		set_successful(&external_only, &nodes[0], &nodes[2], 7);
		external_only.update_experience(&nodes[2], &nodes[0], |e| e.set_failed_calls(7));
		assert_eq!(external_only.shared_experience_matrix(&nodes[1], &nodes).abs_sum(), 0.0);
	}

	#[test]
	fn test_shared_experience_matrix_counts_failed_calls() {
		let nodes = create_nodes(3);
		let experiences = NodeExperiences::new();
		set_successful(&experiences, &nodes[0], &nodes[2], 2);
		experiences.update_experience(&nodes[1], &nodes[2], |e| e.set_failed_calls(8));

		let matrix = experiences.shared_experience_matrix(&nodes[1], &nodes);

		assert_eq!(matrix.abs_sum(), 1.0);
		assert_eq!(matrix.get(0, 2), 1.0);
	}

	#[test]
	fn test_node_experiences_returns_observer_experiences() {
		let nodes = create_nodes(4);
		let experiences = NodeExperiences::new();
		set_successful(&experiences, &nodes[0], &nodes[3], 2);
		set_successful(&experiences, &nodes[1], &nodes[2], 6);
		set_successful(&experiences, &nodes[0], &nodes[1], 7);

		let pairs = experiences.node_experiences(&nodes[0]);

		assert_eq!(pairs.len(), 2);
		assert_eq!(pairs[0].node(), &nodes[1]);
		assert_eq!(pairs[0].experience().successful_calls(), 7);
		assert_eq!(pairs[1].node(), &nodes[3]);
		assert_eq!(pairs[1].experience().successful_calls(), 2);
	}

	#[test]
	fn test_set_node_experiences_overwrites_and_stamps() {
		let nodes = create_nodes(4);
		let experiences = NodeExperiences::new();
		set_successful(&experiences, &nodes[0], &nodes[3], 6);

		let pairs = vec![
			NodeExperiencePair::new(nodes[3].clone(), NodeExperience::new(2, 0)),
			NodeExperiencePair::new(nodes[1].clone(), NodeExperience::new(11, 0)),
		];
		experiences.set_node_experiences(&nodes[0], &pairs, TimeInstant::new(123));

		let experience01 = experiences.experience(&nodes[0], &nodes[1]);
		let experience03 = experiences.experience(&nodes[0], &nodes[3]);
		assert_eq!(experience01.successful_calls(), 11);
		assert_eq!(experience03.successful_calls(), 2);
		assert_eq!(experience01.last_update_time(), TimeInstant::new(123));
		assert_eq!(experience03.last_update_time(), TimeInstant::new(123));
	}

	#[test]
	fn test_set_node_experiences_reuses_cached_nodes() {
		let experiences = NodeExperiences::new();
		let alice = Node::with_endpoint("alice", "http://10.0.0.1");
		let bob = Node::with_endpoint("bob", "http://10.0.0.2");
		let pairs = vec![NodeExperiencePair::new(bob.clone(), NodeExperience::new(11, 0))];
		experiences.set_node_experiences(&alice, &pairs, TimeInstant::new(123));

		let pairs = vec![NodeExperiencePair::new(Node::new("bob"), NodeExperience::new(22, 0))];
		experiences.set_node_experiences(&Node::new("alice"), &pairs, TimeInstant::new(123));

		let result = experiences.node_experiences(&alice);
		assert_eq!(result.len(), 1);
		assert_eq!(result[0].node().endpoint(), Some("http://10.0.0.2"));
		assert_eq!(result[0].experience().successful_calls(), 22);
	}

	#[test]
	fn test_prune_respects_retention_time() {
		let offset: i64 = 1234;
		let experiences = NodeExperiences::new();
		for delta in -5..=5_i64 {
			let pair = NodeExperiencePair::new(
				Node::new(format!("bob{}", delta)),
				NodeExperience::new((10 + delta) as u64, 0),
			);
			let time = TimeInstant::new((offset + delta) as u64);
			experiences.set_node_experiences(&Node::new(format!("alice{}", delta)), &[pair], time);
		}

		let current_time = TimeInstant::ZERO.add_hours(DEFAULT_RETENTION_HOURS).add_seconds(offset as u64);
		experiences.prune(current_time);

		for delta in 0..=5_i64 {
			let pairs = experiences.node_experiences(&Node::new(format!("alice{}", delta)));
			assert_eq!(pairs.len(), 1);
			assert_eq!(pairs[0].node(), &Node::new(format!("bob{}", delta)));
			assert_eq!(pairs[0].experience().successful_calls(), (10 + delta) as u64);
			assert_eq!(pairs[0].experience().last_update_time(), TimeInstant::new((offset + delta) as u64));
		}
		for delta in -5..0_i64 {
			assert!(experiences.node_experiences(&Node::new(format!("alice{}", delta))).is_empty());
		}
	}
}
