//! Search configuration for the route planner.

/// Configuration parameters for route search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Cost in transfer units of boarding a different line than the one
    /// the traveller arrived on. Only used by the changes criterion.
    pub transfer_penalty: u32,

    /// Number of reference times whose offset index is kept cached.
    pub offset_cache_capacity: u64,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(transfer_penalty: u32, offset_cache_capacity: u64) -> Self {
        Self {
            transfer_penalty,
            offset_cache_capacity,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            transfer_penalty: 10,
            offset_cache_capacity: 64,
        }
    }
}

/// Configuration for the tabu search behind tour planning.
///
/// A zero in any field means "derive from the number of stops to visit".
#[derive(Debug, Clone, Default)]
pub struct TourConfig {
    /// Upper bound on tabu iterations.
    pub max_iterations: usize,

    /// Iterations without a new best tour before giving up.
    pub no_improvement_limit: usize,

    /// How many recent swaps stay forbidden.
    pub tabu_tenure: usize,
}

impl TourConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(max_iterations: usize, no_improvement_limit: usize, tabu_tenure: usize) -> Self {
        Self {
            max_iterations,
            no_improvement_limit,
            tabu_tenure,
        }
    }

    /// Iteration cap for `n` stops: `ceil(1.1 * n^2)` unless set.
    pub fn iterations_for(&self, n: usize) -> usize {
        if self.max_iterations > 0 {
            return self.max_iterations;
        }
        // Integer form of ceil(1.1 * n^2)
        (11 * n * n).div_ceil(10)
    }

    /// Stall cap for `n` stops: `2 * floor(sqrt(iterations))` unless set.
    pub fn no_improvement_for(&self, n: usize) -> usize {
        if self.no_improvement_limit > 0 {
            return self.no_improvement_limit;
        }
        2 * self.iterations_for(n).isqrt()
    }

    /// Tabu tenure for `n` stops: `n` unless set.
    pub fn tenure_for(&self, n: usize) -> usize {
        if self.tabu_tenure > 0 {
            return self.tabu_tenure;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.transfer_penalty, 10);
        assert_eq!(config.offset_cache_capacity, 64);
    }

    #[test]
    fn custom_config() {
        let config = SearchConfig::new(3, 8);

        assert_eq!(config.transfer_penalty, 3);
        assert_eq!(config.offset_cache_capacity, 8);
    }

    #[test]
    fn tour_defaults_derive_from_size() {
        let config = TourConfig::default();

        assert_eq!(config.iterations_for(5), 28); // ceil(27.5)
        assert_eq!(config.no_improvement_for(5), 10); // 2 * floor(sqrt(28))
        assert_eq!(config.tenure_for(5), 5);

        assert_eq!(config.iterations_for(10), 110);
        assert_eq!(config.no_improvement_for(10), 20);
    }

    #[test]
    fn tour_explicit_values_win() {
        let config = TourConfig::new(7, 3, 2);

        assert_eq!(config.iterations_for(100), 7);
        assert_eq!(config.no_improvement_for(100), 3);
        assert_eq!(config.tenure_for(100), 2);
    }
}
