//! # Filesystem Actions Module.
//!
//! This module provides functionalities for filesystem actions.

use dotenv::var;
use log::warn;
use peer_trust::{
	error::TrustError,
	experience::NodeExperiences,
	node::NodeCollection,
	storage::{CSVFileStorage, ExperienceRecord, JSONFileStorage, ScoreRecord, StatusRecord, Storage},
	TrustConfig,
};
use std::{env::current_dir, path::PathBuf};

/// Library configuration file name.
pub const CONFIG_FILENAME: &str = "config";
/// Recorded experiences file name.
pub const EXPERIENCES_FILENAME: &str = "experiences";
/// Node statuses file name.
pub const STATUSES_FILENAME: &str = "statuses";
/// Computed scores file name.
pub const SCORES_FILENAME: &str = "scores";

/// Enum representing the possible file extensions.
pub enum FileType {
	/// CSV file.
	Csv,
	/// JSON file.
	Json,
}

impl FileType {
	/// Converts the enum variant into its corresponding file extension.
	fn as_str(&self) -> &'static str {
		match self {
			FileType::Csv => "csv",
			FileType::Json => "json",
		}
	}
}

/// Retrieves the path to the `assets` directory.
///
/// The `ASSETS_PATH` environment variable takes precedence.
pub fn get_assets_path() -> Result<PathBuf, TrustError> {
	if let Ok(path) = var("ASSETS_PATH") {
		return Ok(PathBuf::from(path));
	}

	current_dir().map_err(TrustError::IOError).map(|current_dir| {
		// Workaround for the tests running in the `peer-trust-cli` directory.
		#[cfg(test)]
		{
			current_dir.join("assets")
		}

		#[cfg(not(test))]
		{
			current_dir.join("peer-trust-cli/assets")
		}
	})
}

/// Helper function to get the path of a file in the `assets` directory.
pub fn get_file_path(file_name: &str, file_type: FileType) -> Result<PathBuf, TrustError> {
	let assets_path = get_assets_path()?;
	Ok(assets_path.join(format!("{}.{}", file_name, file_type.as_str())))
}

/// Loads the configuration file.
pub fn load_config() -> Result<TrustConfig, TrustError> {
	let filepath = get_file_path(CONFIG_FILENAME, FileType::Json)?;
	JSONFileStorage::<TrustConfig>::new(filepath).load()
}

/// Saves the configuration file.
pub fn save_config(config: &TrustConfig) -> Result<(), TrustError> {
	let filepath = get_file_path(CONFIG_FILENAME, FileType::Json)?;
	JSONFileStorage::<TrustConfig>::new(filepath).save(config.clone())
}

/// Loads the records of a CSV file, none if the file does not exist yet.
fn load_records<T>(file_name: &str) -> Result<Vec<T>, TrustError>
where
	T: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
	let filepath = get_file_path(file_name, FileType::Csv)?;
	if !filepath.exists() {
		warn!("\"{}\" not found, starting empty.", filepath.display());
		return Ok(Vec::new());
	}

	CSVFileStorage::<T>::new(filepath).load()
}

/// Loads the recorded experiences.
pub fn load_experiences() -> Result<NodeExperiences, TrustError> {
	let records: Vec<ExperienceRecord> = load_records(EXPERIENCES_FILENAME)?;
	Ok(ExperienceRecord::into_experiences(&records))
}

/// Saves the recorded experiences, returning the file path.
pub fn save_experiences(experiences: &NodeExperiences) -> Result<PathBuf, TrustError> {
	let filepath = get_file_path(EXPERIENCES_FILENAME, FileType::Csv)?;
	let mut storage = CSVFileStorage::<ExperienceRecord>::new(filepath.clone());
	storage.save(ExperienceRecord::from_experiences(experiences))?;
	Ok(filepath)
}

/// Loads the node statuses.
pub fn load_statuses() -> Result<NodeCollection, TrustError> {
	let records: Vec<StatusRecord> = load_records(STATUSES_FILENAME)?;
	Ok(StatusRecord::into_collection(&records))
}

/// Saves the node statuses, returning the file path.
pub fn save_statuses(nodes: &NodeCollection) -> Result<PathBuf, TrustError> {
	let filepath = get_file_path(STATUSES_FILENAME, FileType::Csv)?;
	let mut storage = CSVFileStorage::<StatusRecord>::new(filepath.clone());
	storage.save(StatusRecord::from_collection(nodes))?;
	Ok(filepath)
}

/// Saves computed scores, returning the file path.
pub fn save_scores(scores: Vec<ScoreRecord>) -> Result<PathBuf, TrustError> {
	let filepath = get_file_path(SCORES_FILENAME, FileType::Csv)?;
	let mut storage = CSVFileStorage::<ScoreRecord>::new(filepath.clone());
	storage.save(scores)?;
	Ok(filepath)
}
