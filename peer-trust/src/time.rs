//! # Time Module.
//!
//! Network time seam used by the cached trust provider and experience pruning.

use serde::{Deserialize, Serialize};
use std::{
	fmt,
	time::{SystemTime, UNIX_EPOCH},
};

/// A point in time with second precision.
#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeInstant(u64);

impl TimeInstant {
	/// The zero instant.
	pub const ZERO: TimeInstant = TimeInstant(0);

	/// Creates an instant from raw seconds.
	pub fn new(seconds: u64) -> Self {
		Self(seconds)
	}

	/// Raw seconds.
	pub fn seconds(&self) -> u64 {
		self.0
	}

	/// Returns a later instant.
	pub fn add_seconds(&self, seconds: u64) -> Self {
		Self(self.0.saturating_add(seconds))
	}

	/// Returns a later instant.
	pub fn add_hours(&self, hours: u64) -> Self {
		self.add_seconds(hours.saturating_mul(60 * 60))
	}

	/// Seconds elapsed since `earlier`, zero if `earlier` is in the future.
	pub fn seconds_since(&self, earlier: TimeInstant) -> u64 {
		self.0.saturating_sub(earlier.0)
	}
}

impl fmt::Display for TimeInstant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}s", self.0)
	}
}

/// Source of the current network time.
pub trait TimeProvider: Send + Sync {
	/// Returns the current time.
	fn current_time(&self) -> TimeInstant;
}

/// Time provider backed by the system clock (seconds since the unix epoch).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
	fn current_time(&self) -> TimeInstant {
		let seconds = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs());
		TimeInstant(seconds)
	}
}

/// Time provider returning a scripted sequence of instants.
///
/// The last instant is repeated once the sequence is exhausted.
#[derive(Debug)]
pub struct MockTimeProvider {
	times: parking_lot::Mutex<(Vec<TimeInstant>, usize)>,
}

impl MockTimeProvider {
	/// Creates a provider returning `times` in order.
	pub fn new(times: &[u64]) -> Self {
		let times = times.iter().map(|&t| TimeInstant(t)).collect();
		Self { times: parking_lot::Mutex::new((times, 0)) }
	}

	/// Replaces the remaining sequence with a single fixed instant.
	pub fn set_current_time(&self, time: u64) {
		*self.times.lock() = (vec![TimeInstant(time)], 0);
	}
}

impl TimeProvider for MockTimeProvider {
	fn current_time(&self) -> TimeInstant {
		let mut guard = self.times.lock();
		let (times, next) = &mut *guard;
		let Some(last) = times.len().checked_sub(1) else {
			return TimeInstant::ZERO;
		};

		let time = times[(*next).min(last)];
		*next += 1;
		time
	}
}
