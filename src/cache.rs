//! Memoization of simulation results keyed on a config fingerprint
//!
//! Callers that re-run on every input edit keep one cache and ask it for
//! results. An unchanged config returns the stored result; any change is a
//! full, independent recomputation.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::scenario::{simulate, SimulationOutput};

/// Stored run: the config is kept so a fingerprint collision is a miss
#[derive(Debug, Clone)]
struct CacheEntry {
    config: SimulationConfig,
    output: Arc<SimulationOutput>,
}

/// Cache of simulation outputs
#[derive(Debug)]
pub struct SimulationCache {
    entries: HashMap<u64, CacheEntry>,

    /// Maximum stored entries; the cache is cleared when exceeded
    capacity: usize,

    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl Default for SimulationCache {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl SimulationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    /// Stored result for `config`, running the simulation on a miss.
    /// Invalid configs are never cached.
    pub fn get_or_run(
        &mut self,
        config: &SimulationConfig,
    ) -> Result<Arc<SimulationOutput>, ConfigError> {
        let key = config.fingerprint();

        if let Some(entry) = self.entries.get(&key) {
            if &entry.config == config {
                self.cache_hits += 1;
                return Ok(Arc::clone(&entry.output));
            }
        }

        self.cache_misses += 1;
        let output = Arc::new(simulate(config)?);

        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            log::debug!("cache: capacity {} reached, clearing", self.capacity);
            self.entries.clear();
        }
        self.entries.insert(
            key,
            CacheEntry {
                config: config.clone(),
                output: Arc::clone(&output),
            },
        );

        Ok(output)
    }

    pub fn get(&self, config: &SimulationConfig) -> Option<Arc<SimulationOutput>> {
        self.entries
            .get(&config.fingerprint())
            .filter(|entry| &entry.config == config)
            .map(|entry| Arc::clone(&entry.output))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cache_hits = 0;
        self.cache_misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DecumulationConfig, Termination, DEFAULT_SAFETY_CAP};

    fn config(withdrawal: f64) -> SimulationConfig {
        SimulationConfig::Decumulation(DecumulationConfig {
            starting_balance: 2_000_000.0,
            monthly_withdrawal: withdrawal,
            annual_rate: 0.08,
            termination: Termination::FixedDuration { years: 20 },
            inflation_rate: Some(0.05),
            safety_cap: DEFAULT_SAFETY_CAP,
            start_age: 60,
        })
    }

    #[test]
    fn test_identical_config_hits() {
        let mut cache = SimulationCache::new();

        let first = cache.get_or_run(&config(15_000.0)).unwrap();
        let second = cache.get_or_run(&config(15_000.0)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.cache_hits, 1);
        assert_eq!(cache.cache_misses, 1);
        assert!((cache.hit_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_changed_config_recomputes() {
        let mut cache = SimulationCache::new();

        let low = cache.get_or_run(&config(10_000.0)).unwrap();
        let high = cache.get_or_run(&config(20_000.0)).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(high.final_balance() < low.final_balance());
        assert!(cache.get(&config(10_000.0)).is_some());
        assert!(cache.get(&config(12_345.0)).is_none());
    }

    #[test]
    fn test_invalid_config_not_cached() {
        let mut cache = SimulationCache::new();
        assert!(cache.get_or_run(&config(f64::NAN)).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_bound() {
        let mut cache = SimulationCache::with_capacity(2);
        for withdrawal in [1_000.0, 2_000.0, 3_000.0] {
            cache.get_or_run(&config(withdrawal)).unwrap();
        }
        assert!(cache.len() <= 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.hit_rate(), 0.0);
    }
}
