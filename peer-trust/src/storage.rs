//! # Storage Module.
//!
//! This module contains generic storage traits and implementations, plus the records
//! used to persist experiences, node statuses and trust scores.

use crate::{
	context::TrustResult,
	error::TrustError,
	experience::{NodeExperience, NodeExperiencePair, NodeExperiences},
	node::{Node, NodeCollection, NodeStatus},
	time::TimeInstant,
};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{from_reader, to_string_pretty};
use std::{
	fs::File,
	io::{BufReader, Write},
	marker::PhantomData,
	path::PathBuf,
};

/// The main trait to be implemented by different storage types.
pub trait Storage<T> {
	/// The error type.
	type Err;

	/// Loads data from storage.
	fn load(&self) -> Result<T, Self::Err>;
	/// Saves data to storage.
	fn save(&mut self, data: T) -> Result<(), Self::Err>;
}

/// The `CSVFileStorage` struct provides a mechanism for persisting
/// and retrieving structured data to and from CSV files.
///
/// # Examples
///
/// ```no_run
/// use peer_trust::storage::{CSVFileStorage, StatusRecord, Storage};
/// use peer_trust::node::NodeStatus;
/// use std::path::PathBuf;
///
/// let filepath = PathBuf::from("/path/to/your/statuses.csv");
/// let mut storage = CSVFileStorage::<StatusRecord>::new(filepath);
///
/// let data = vec![StatusRecord::new("alice".to_string(), NodeStatus::Active)];
///
/// // Save the data to the CSV file.
/// storage.save(data.clone()).unwrap();
///
/// // Load the data from the CSV file.
/// let loaded_data = storage.load().unwrap();
/// assert_eq!(data, loaded_data);
/// ```
pub struct CSVFileStorage<T> {
	filepath: PathBuf,
	phantom: PhantomData<T>,
}

impl<T> CSVFileStorage<T> {
	/// Creates a new CSVFileStorage.
	pub fn new(filepath: PathBuf) -> Self {
		Self { filepath, phantom: PhantomData }
	}

	/// Returns the path to the file.
	pub fn filepath(&self) -> &PathBuf {
		&self.filepath
	}
}

impl<T: Serialize + DeserializeOwned + Clone> Storage<Vec<T>> for CSVFileStorage<T> {
	type Err = TrustError;

	fn load(&self) -> Result<Vec<T>, TrustError> {
		let file = File::open(&self.filepath).map_err(TrustError::IOError)?;
		let mut reader = ReaderBuilder::new().from_reader(BufReader::new(file));

		reader
			.deserialize()
			.map(|result| result.map_err(|e| TrustError::FileIOError(e.to_string())))
			.collect()
	}

	fn save(&mut self, data: Vec<T>) -> Result<(), TrustError> {
		let mut writer = WriterBuilder::new()
			.from_path(&self.filepath)
			.map_err(|e| TrustError::FileIOError(e.to_string()))?;

		for record in &data {
			writer.serialize(record).map_err(|e| TrustError::FileIOError(e.to_string()))?;
		}

		writer.flush().map_err(|e| TrustError::FileIOError(e.to_string()))?;

		Ok(())
	}
}

/// The `JSONFileStorage` struct provides a mechanism for persisting
/// and retrieving structured data to and from JSON files.
pub struct JSONFileStorage<T> {
	filepath: PathBuf,
	phantom: PhantomData<T>,
}

impl<T> JSONFileStorage<T> {
	/// Creates a new JSONFileStorage.
	pub fn new(filepath: PathBuf) -> Self {
		Self { filepath, phantom: PhantomData }
	}

	/// Returns the path to the file.
	pub fn filepath(&self) -> &PathBuf {
		&self.filepath
	}
}

impl<T: Serialize + DeserializeOwned + Clone> Storage<T> for JSONFileStorage<T> {
	type Err = TrustError;

	fn load(&self) -> Result<T, Self::Err> {
		let file = File::open(&self.filepath).map_err(TrustError::IOError)?;
		let reader = BufReader::new(file);
		from_reader(reader).map_err(|e| TrustError::ParsingError(e.to_string()))
	}

	fn save(&mut self, data: T) -> Result<(), Self::Err> {
		let json_str = to_string_pretty(&data).map_err(|e| TrustError::ParsingError(e.to_string()))?;

		let mut file = File::create(&self.filepath).map_err(TrustError::IOError)?;
		file.write_all(json_str.as_bytes()).map_err(TrustError::IOError)
	}
}

/// Experience record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
	/// Identity of the observing node.
	observer: String,
	/// Identity of the partner node.
	partner: String,
	/// Successful calls.
	successful_calls: u64,
	/// Failed calls.
	failed_calls: u64,
	/// Last update, in seconds.
	last_update: u64,
}

impl ExperienceRecord {
	/// Creates a new experience record.
	pub fn new(observer: &Node, pair: &NodeExperiencePair) -> Self {
		let experience = pair.experience();
		Self {
			observer: observer.identity().to_string(),
			partner: pair.node().identity().to_string(),
			successful_calls: experience.successful_calls(),
			failed_calls: experience.failed_calls(),
			last_update: experience.last_update_time().seconds(),
		}
	}

	/// Returns the observer identity.
	pub fn observer(&self) -> &String {
		&self.observer
	}

	/// Returns the partner identity.
	pub fn partner(&self) -> &String {
		&self.partner
	}

	/// Converts the record into the experience it describes.
	pub fn experience(&self) -> NodeExperience {
		let mut experience = NodeExperience::new(self.successful_calls, self.failed_calls);
		experience.set_last_update_time(TimeInstant::new(self.last_update));
		experience
	}

	/// Snapshots every experience of `experiences` into records.
	pub fn from_experiences(experiences: &NodeExperiences) -> Vec<Self> {
		experiences
			.all_node_experiences()
			.iter()
			.map(|(observer, pair)| Self::new(observer, pair))
			.collect()
	}

	/// Loads `records` into a new experience store.
	pub fn into_experiences(records: &[Self]) -> NodeExperiences {
		let experiences = NodeExperiences::new();
		for record in records {
			let observer = Node::new(record.observer.clone());
			let partner = Node::new(record.partner.clone());
			experiences.set_experience(&observer, &partner, record.experience());
		}
		experiences
	}
}

/// Node status record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
	/// Identity of the node.
	node: String,
	/// Its status.
	status: NodeStatus,
}

impl StatusRecord {
	/// Creates a new status record.
	pub fn new(node: String, status: NodeStatus) -> Self {
		Self { node, status }
	}

	/// Returns the node identity.
	pub fn node(&self) -> &String {
		&self.node
	}

	/// Returns the status.
	pub fn status(&self) -> NodeStatus {
		self.status
	}

	/// Snapshots every node of `nodes` into records.
	pub fn from_collection(nodes: &NodeCollection) -> Vec<Self> {
		nodes
			.all_nodes()
			.into_iter()
			.map(|node| {
				let status = nodes.status(&node);
				Self::new(node.identity().to_string(), status)
			})
			.collect()
	}

	/// Loads `records` into a new node collection.
	pub fn into_collection(records: &[Self]) -> NodeCollection {
		let nodes = NodeCollection::new();
		for record in records {
			nodes.update(Node::new(record.node.clone()), record.status);
		}
		nodes
	}
}

/// Score record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
	/// Identity of the node.
	node: String,
	/// The node's trust.
	score: f64,
}

impl ScoreRecord {
	/// Creates a new score record.
	pub fn new(node: String, score: f64) -> Self {
		Self { node, score }
	}

	/// Creates one record per node of a trust result.
	pub fn from_result(result: &TrustResult) -> Vec<Self> {
		result.node_values().map(|(node, score)| Self::new(node.identity().to_string(), score)).collect()
	}

	/// Returns the node identity.
	pub fn node(&self) -> &String {
		&self.node
	}

	/// Returns the score.
	pub fn score(&self) -> f64 {
		self.score
	}
}
