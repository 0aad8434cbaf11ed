//! Startup configuration
//!
//! The listen address comes from the first command-line argument, then the
//! `GROUP_RELAY_ADDR` environment variable. Channel capacities can be tuned
//! through the environment as well.

use std::env;

use crate::error::AppError;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Default channel buffer size for server commands
pub const DEFAULT_COMMAND_BUFFER: usize = 256;

/// Default per-connection outbound queue size
pub const DEFAULT_OUTBOUND_BUFFER: usize = 32;

const ADDR_VAR: &str = "GROUP_RELAY_ADDR";
const COMMAND_BUFFER_VAR: &str = "GROUP_RELAY_COMMAND_BUFFER";
const OUTBOUND_BUFFER_VAR: &str = "GROUP_RELAY_OUTBOUND_BUFFER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address to bind the TCP listener to
    pub addr: String,
    /// Capacity of the handler → server command channel
    pub command_buffer: usize,
    /// Capacity of each connection's outbound queue
    pub outbound_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            command_buffer: DEFAULT_COMMAND_BUFFER,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
        }
    }
}

impl Config {
    /// Load from process arguments and environment
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_sources(env::args().nth(1), |key| env::var(key).ok())
    }

    /// Build from an optional address argument and a variable lookup
    pub fn from_sources<F>(addr_arg: Option<String>, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = addr_arg
            .or_else(|| lookup(ADDR_VAR))
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let command_buffer = parse_capacity(COMMAND_BUFFER_VAR, lookup(COMMAND_BUFFER_VAR))?
            .unwrap_or(DEFAULT_COMMAND_BUFFER);
        let outbound_buffer = parse_capacity(OUTBOUND_BUFFER_VAR, lookup(OUTBOUND_BUFFER_VAR))?
            .unwrap_or(DEFAULT_OUTBOUND_BUFFER);

        Ok(Self {
            addr,
            command_buffer,
            outbound_buffer,
        })
    }
}

/// mpsc channels panic on zero capacity, so zero is rejected here
fn parse_capacity(key: &str, value: Option<String>) -> Result<Option<usize>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().parse::<usize>() {
        Ok(0) => Err(AppError::Config(format!("{} must be greater than zero", key))),
        Ok(n) => Ok(Some(n)),
        Err(e) => Err(AppError::Config(format!("{} '{}': {}", key, value, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(None, lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_argument_wins_over_env() {
        let lookup = lookup_from(&[(ADDR_VAR, "0.0.0.0:9000")]);
        let config = Config::from_sources(Some("127.0.0.1:3000".to_string()), lookup).unwrap();
        assert_eq!(config.addr, "127.0.0.1:3000");

        let lookup = lookup_from(&[(ADDR_VAR, "0.0.0.0:9000")]);
        let config = Config::from_sources(None, lookup).unwrap();
        assert_eq!(config.addr, "0.0.0.0:9000");
    }

    #[test]
    fn test_buffer_overrides() {
        let lookup = lookup_from(&[(COMMAND_BUFFER_VAR, "1024"), (OUTBOUND_BUFFER_VAR, " 8 ")]);
        let config = Config::from_sources(None, lookup).unwrap();
        assert_eq!(config.command_buffer, 1024);
        assert_eq!(config.outbound_buffer, 8);
    }

    #[test]
    fn test_invalid_buffers_rejected() {
        let lookup = lookup_from(&[(COMMAND_BUFFER_VAR, "lots")]);
        assert!(matches!(
            Config::from_sources(None, lookup),
            Err(AppError::Config(_))
        ));

        let lookup = lookup_from(&[(OUTBOUND_BUFFER_VAR, "0")]);
        assert!(matches!(
            Config::from_sources(None, lookup),
            Err(AppError::Config(_))
        ));
    }
}
