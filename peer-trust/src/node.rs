//! # Node Module.
//!
//! Peer identities, their connection status and the shared collection tracking them.

use crate::error::TrustError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
	cmp::Ordering,
	collections::HashMap,
	fmt,
	hash::{Hash, Hasher},
	str::FromStr,
};

/// A network peer.
///
/// Nodes are identified by their identity string only: two nodes with the same identity
/// but different endpoints are the same peer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
	identity: String,
	endpoint: Option<String>,
}

impl Node {
	/// Creates a node with the given identity.
	pub fn new(identity: impl Into<String>) -> Self {
		Self { identity: identity.into(), endpoint: None }
	}

	/// Creates a node with an identity and an endpoint.
	pub fn with_endpoint(identity: impl Into<String>, endpoint: impl Into<String>) -> Self {
		Self { identity: identity.into(), endpoint: Some(endpoint.into()) }
	}

	/// The stable identity of the node.
	pub fn identity(&self) -> &str {
		&self.identity
	}

	/// The endpoint of the node, if known.
	pub fn endpoint(&self) -> Option<&str> {
		self.endpoint.as_deref()
	}
}

impl PartialEq for Node {
	fn eq(&self, other: &Self) -> bool {
		self.identity == other.identity
	}
}

impl Eq for Node {}

impl Hash for Node {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.identity.hash(state);
	}
}

impl PartialOrd for Node {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Node {
	fn cmp(&self, other: &Self) -> Ordering {
		self.identity.cmp(&other.identity)
	}
}

impl fmt::Display for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.endpoint {
			Some(endpoint) => write!(f, "{} <{}>", self.identity, endpoint),
			None => write!(f, "{}", self.identity),
		}
	}
}

/// Connection status of a node as seen by the local node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
	/// The node is reachable and responding.
	Active,
	/// The node is reachable but refused work.
	Busy,
	/// The node is not reachable.
	Inactive,
	/// The last interaction with the node failed.
	Failure,
	/// The node has never been seen.
	Unknown,
}

impl NodeStatus {
	/// Converts the status into its string representation.
	pub fn as_str(&self) -> &'static str {
		match self {
			NodeStatus::Active => "active",
			NodeStatus::Busy => "busy",
			NodeStatus::Inactive => "inactive",
			NodeStatus::Failure => "failure",
			NodeStatus::Unknown => "unknown",
		}
	}
}

impl FromStr for NodeStatus {
	type Err = TrustError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"active" => Ok(NodeStatus::Active),
			"busy" => Ok(NodeStatus::Busy),
			"inactive" => Ok(NodeStatus::Inactive),
			"failure" => Ok(NodeStatus::Failure),
			"unknown" => Ok(NodeStatus::Unknown),
			_ => Err(TrustError::ParsingError(format!("Invalid node status: {}", s))),
		}
	}
}

impl fmt::Display for NodeStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Thread-safe collection of known nodes and their statuses.
#[derive(Debug, Default)]
pub struct NodeCollection {
	nodes: RwLock<HashMap<String, (Node, NodeStatus)>>,
}

impl NodeCollection {
	/// Creates an empty collection.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the status of a node, adding it if it is not yet known.
	pub fn update(&self, node: Node, status: NodeStatus) {
		self.nodes.write().insert(node.identity().to_string(), (node, status));
	}

	/// Returns the status of a node, `Unknown` if it has never been seen.
	pub fn status(&self, node: &Node) -> NodeStatus {
		self.nodes.read().get(node.identity()).map_or(NodeStatus::Unknown, |(_, status)| *status)
	}

	/// Returns all nodes with the given status, ordered by identity.
	pub fn nodes_with_status(&self, status: NodeStatus) -> Vec<Node> {
		let mut nodes: Vec<Node> = self
			.nodes
			.read()
			.values()
			.filter(|(_, s)| *s == status)
			.map(|(node, _)| node.clone())
			.collect();
		nodes.sort();
		nodes
	}

	/// Returns all active nodes, ordered by identity.
	pub fn active_nodes(&self) -> Vec<Node> {
		self.nodes_with_status(NodeStatus::Active)
	}

	/// Returns every known node, ordered by identity.
	pub fn all_nodes(&self) -> Vec<Node> {
		let mut nodes: Vec<Node> = self.nodes.read().values().map(|(node, _)| node.clone()).collect();
		nodes.sort();
		nodes
	}

	/// Number of known nodes.
	pub fn len(&self) -> usize {
		self.nodes.read().len()
	}

	/// Returns true if no node is known.
	pub fn is_empty(&self) -> bool {
		self.nodes.read().is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_node_identity_defines_equality() {
		let a = Node::with_endpoint("alice", "http://10.0.0.1:7890");
		let b = Node::with_endpoint("alice", "http://10.0.0.2:7890");
		let c = Node::new("bob");

		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_eq!(a.endpoint(), Some("http://10.0.0.1:7890"));
		assert_eq!(c.endpoint(), None);
	}

	#[test]
	fn test_status_parsing() {
		assert_eq!("active".parse::<NodeStatus>().unwrap(), NodeStatus::Active);
		assert_eq!("FAILURE".parse::<NodeStatus>().unwrap(), NodeStatus::Failure);
		assert!("sleeping".parse::<NodeStatus>().is_err());
		assert_eq!(NodeStatus::Busy.to_string(), "busy");
	}

	#[test]
	fn test_unknown_node_has_unknown_status() {
		let nodes = NodeCollection::new();
		assert_eq!(nodes.status(&Node::new("a")), NodeStatus::Unknown);
		assert!(nodes.is_empty());
	}

	#[test]
	fn test_update_replaces_status() {
		let nodes = NodeCollection::new();
		nodes.update(Node::new("a"), NodeStatus::Active);
		nodes.update(Node::new("b"), NodeStatus::Inactive);
		nodes.update(Node::new("a"), NodeStatus::Busy);

		assert_eq!(nodes.len(), 2);
		assert_eq!(nodes.status(&Node::new("a")), NodeStatus::Busy);
		assert_eq!(nodes.nodes_with_status(NodeStatus::Inactive), vec![Node::new("b")]);
		assert!(nodes.active_nodes().is_empty());
		assert_eq!(nodes.all_nodes(), vec![Node::new("a"), Node::new("b")]);
	}
}
