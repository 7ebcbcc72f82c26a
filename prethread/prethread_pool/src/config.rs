//! Construction parameters for a pool.

use serde::{Deserialize, Serialize};

/// Configuration for a pre-threaded pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of threads; must be at least one
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Number of mutexes in the mutex bank
    #[serde(default)]
    pub mutexes: usize,

    /// Number of condition variables in the condition variable bank
    #[serde(default)]
    pub conds: usize,

    /// Name prefix for pooled threads
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,

    /// Stack size for pooled threads, in bytes
    #[serde(default)]
    pub stack_size: Option<usize>,
}

fn default_threads() -> usize {
    num_cpus::get()
}

fn default_thread_name_prefix() -> String {
    "prethread-worker".to_string()
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            mutexes: 0,
            conds: 0,
            thread_name_prefix: default_thread_name_prefix(),
            stack_size: None,
        }
    }
}

impl PoolConfig {
    /// Create a configuration with explicit bank sizes and default thread settings
    pub fn new(threads: usize, mutexes: usize, conds: usize) -> Self {
        Self {
            threads,
            mutexes,
            conds,
            ..Default::default()
        }
    }

    /// Set the name prefix for pooled threads
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the stack size for pooled threads
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }
}
