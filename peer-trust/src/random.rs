//! # Random Module.
//!
//! Injectable randomness for truncation sampling and node selection.

use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use std::sync::Arc;

/// A source of uniformly distributed doubles.
pub trait RandomSource: Send {
	/// Returns a value in `[0, 1)`.
	fn next_double(&mut self) -> f64;
}

/// Draws an index in `0..len` from `random`. `len` must be non-zero.
pub(crate) fn random_index(random: &mut dyn RandomSource, len: usize) -> usize {
	let index = (random.next_double() * len as f64).floor() as usize;
	index.min(len.saturating_sub(1))
}

/// Adapter turning any `rand` generator into a [`RandomSource`].
#[derive(Debug)]
pub struct RngSource<R: RngCore + Send> {
	rng: R,
}

impl<R: RngCore + Send> RngSource<R> {
	/// Wraps a generator.
	pub fn new(rng: R) -> Self {
		Self { rng }
	}
}

impl RngSource<StdRng> {
	/// Generator seeded from the operating system.
	pub fn from_entropy() -> Self {
		Self::new(StdRng::from_entropy())
	}

	/// Deterministic generator.
	pub fn seeded(seed: u64) -> Self {
		Self::new(StdRng::seed_from_u64(seed))
	}
}

impl<R: RngCore + Send> RandomSource for RngSource<R> {
	fn next_double(&mut self) -> f64 {
		self.rng.gen::<f64>()
	}
}

/// Random source replaying a fixed list of values.
///
/// The last value is repeated once the list is exhausted. Clones share the same
/// position and draw counter.
#[derive(Clone, Debug)]
pub struct ScriptedRandom {
	state: Arc<Mutex<ScriptState>>,
}

#[derive(Debug)]
struct ScriptState {
	values: Vec<f64>,
	draws: usize,
}

impl ScriptedRandom {
	/// Creates a source returning `values` in order.
	pub fn new(values: &[f64]) -> Self {
		Self { state: Arc::new(Mutex::new(ScriptState { values: values.to_vec(), draws: 0 })) }
	}

	/// Number of values drawn so far.
	pub fn draws(&self) -> usize {
		self.state.lock().draws
	}
}

impl RandomSource for ScriptedRandom {
	fn next_double(&mut self) -> f64 {
		let mut state = self.state.lock();
		let value = match state.values.len() {
			0 => 0.0,
			len => state.values[state.draws.min(len - 1)],
		};
		state.draws += 1;
		value
	}
}
