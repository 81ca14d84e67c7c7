//! # Error Module.
//!
//! This module features the `TrustError` enum for error handling throughout the project.

use thiserror::Error;

/// The crate-wide error variants.
#[derive(Debug, Error)]
pub enum TrustError {
	/// Configuration error
	#[error("ConfigurationError: {0}")]
	ConfigurationError(String),

	/// File read/write error
	#[error("FileIOError: {0}")]
	FileIOError(String),

	/// Invalid argument passed by a caller
	#[error("InvalidArgument: {0}")]
	InvalidArgument(String),

	/// Input/output error
	#[error("IOError: {0}")]
	IOError(std::io::Error),

	/// Parsing error
	#[error("ParsingError: {0}")]
	ParsingError(String),
}

impl TrustError {
	/// Shorthand for building a [`TrustError::InvalidArgument`].
	pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
		TrustError::InvalidArgument(message.into())
	}
}
