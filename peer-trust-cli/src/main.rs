//! # Peer Trust CLI
//!
//! This crate provides a CLI interface to use the `peer-trust` library.

#![warn(trivial_casts)]
#![deny(
	absolute_paths_not_starting_with_crate, deprecated, future_incompatible, missing_docs,
	nonstandard_style, unreachable_code, unreachable_patterns
)]
#![forbid(unsafe_code)]
#![deny(
	// Complexity
 	clippy::unnecessary_cast,
	clippy::needless_question_mark,
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

mod cli;
mod fs;

use clap::Parser;
use cli::*;
use dotenv::dotenv;
use env_logger::{init_from_env, Env};
use fs::load_config;
use log::info;
use peer_trust::{error::TrustError, TrustConfig};

fn main() -> Result<(), TrustError> {
	dotenv().ok();
	init_from_env(Env::default().filter_or("LOG_LEVEL", "info"));
	let mut config: TrustConfig = load_config()?;

	match Cli::parse().mode {
		Mode::Record(record_data) => handle_record(&config, record_data)?,
		Mode::Scores => handle_scores(&config)?,
		Mode::Select => handle_select(&config)?,
		Mode::Show => info!("Trust config:\n{:#?}", config),
		Mode::Status(status_data) => handle_status(status_data)?,
		Mode::Update(update_data) => handle_update(&mut config, update_data)?,
	};

	Ok(())
}
