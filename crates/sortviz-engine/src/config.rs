//! Run configuration and its persistence.

use serde::{Deserialize, Serialize};

use crate::algorithms::Algorithm;
use crate::error::Result;
use crate::pacing::Timing;
use crate::store::ConfigStore;

/// Smallest supported sequence.
pub const MIN_SIZE: usize = 5;
/// Largest supported sequence.
pub const MAX_SIZE: usize = 150;
pub const DEFAULT_SIZE: usize = 50;

pub const MIN_SPEED: u32 = 1;
pub const MAX_SPEED: u32 = 50;
pub const DEFAULT_SPEED: u32 = 10;

/// Store key for the sequence size.
pub const KEY_SIZE: &str = "array_size";
/// Store key for the algorithm name.
pub const KEY_ALGORITHM: &str = "algorithm";
/// Store key for the speed setting.
pub const KEY_SPEED: &str = "speed";

/// What to sort and how fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of bars (5..=150)
    pub size: usize,
    pub algorithm: Algorithm,
    /// Speed multiplier (1..=50)
    pub speed: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            algorithm: Algorithm::default(),
            speed: DEFAULT_SPEED,
        }
    }
}

impl Config {
    /// Pull size and speed into their supported ranges.
    pub fn clamped(self) -> Self {
        Self {
            size: clamp_size(self.size),
            algorithm: self.algorithm,
            speed: clamp_speed(self.speed),
        }
    }

    pub fn with_size(self, size: usize) -> Self {
        Self { size: clamp_size(size), ..self }
    }

    pub fn with_speed(self, speed: u32) -> Self {
        Self { speed: clamp_speed(speed), ..self }
    }

    pub fn with_algorithm(self, algorithm: Algorithm) -> Self {
        Self { algorithm, ..self }
    }

    /// Delays for this speed.
    pub fn timing(&self) -> Timing {
        Timing::from_speed(self.speed)
    }

    /// Read from `store`. Missing or unparseable values fall back to defaults.
    pub fn load(store: &dyn ConfigStore) -> Self {
        let defaults = Self::default();
        Self {
            size: read(store, KEY_SIZE).unwrap_or(defaults.size),
            algorithm: read(store, KEY_ALGORITHM).unwrap_or(defaults.algorithm),
            speed: read(store, KEY_SPEED).unwrap_or(defaults.speed),
        }
        .clamped()
    }

    /// Write every field to `store`.
    pub fn save(&self, store: &mut dyn ConfigStore) -> Result<()> {
        store.set(KEY_SIZE, &self.size.to_string())?;
        store.set(KEY_ALGORITHM, self.algorithm.name())?;
        store.set(KEY_SPEED, &self.speed.to_string())?;
        Ok(())
    }
}

pub fn clamp_size(size: usize) -> usize {
    size.clamp(MIN_SIZE, MAX_SIZE)
}

pub fn clamp_speed(speed: u32) -> u32 {
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

fn read<T: std::str::FromStr>(store: &dyn ConfigStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}
