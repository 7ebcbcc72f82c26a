//! Pool configuration loading
//!
//! The configuration comes from an optional TOML file; anything the file
//! leaves out takes its default.

use anyhow::{Context, Result};
use log::debug;
use prethread_pool::PoolConfig;
use std::fs;
use std::path::Path;

/// Load the pool configuration from `path`, or the defaults when no file is given
pub fn load(path: Option<&Path>) -> Result<PoolConfig> {
    let Some(path) = path else {
        return Ok(PoolConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: PoolConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;

    debug!("Loaded pool configuration from {}", path.display());
    Ok(config)
}

/// Implementation of the config command
pub fn execute(config: &PoolConfig) -> Result<()> {
    let text = toml::to_string_pretty(config).context("failed to render configuration")?;
    print!("{}", text);
    Ok(())
}
