//! Parallel processing configuration and management
//!
//! This module provides abstractions for configuring Rayon's global thread pool
//! used by the spatial reduction step.

use crate::errors::{GridAggError, Result};
use rayon::ThreadPoolBuilder;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    #[must_use]
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Create a configuration that uses the default thread pool
    #[must_use]
    pub fn new_default() -> Self {
        Self { num_threads: None }
    }

    /// Create a configuration that uses all available CPU cores
    #[must_use]
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    /// Create a configuration that uses a specific number of threads
    #[must_use]
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    /// Set up the global Rayon thread pool with the specified configuration
    ///
    /// # Errors
    ///
    /// Returns `ThreadPoolError` if the global pool was already initialized
    /// with a different configuration.
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    GridAggError::ThreadPoolError(format!(
                        "Failed to initialize thread pool with {} threads: {}",
                        num_threads, e
                    ))
                })?;

            println!("✅ Configured parallel processing with {} threads", num_threads);
        } else {
            println!("✅ Using default thread pool configuration");
        }

        Ok(())
    }

    /// Get the current number of threads being used
    #[must_use]
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}
