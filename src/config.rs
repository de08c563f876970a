//! Runtime configuration (`spec.md` §6.5).
//!
//! Plain `serde`-deserializable structs with documented defaults, in the style of
//! BRRTRouter's `generator::dependencies_config::DependenciesConfig` (itself loaded
//! with `toml::from_str`). The library never reads the process environment itself;
//! an embedder wires a `ReactorConfig`/`ServerConfig` together however it likes,
//! including from a TOML file alongside its OpenAPI document.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_worker_count() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

const fn default_backlog() -> u32 {
    1024
}

const fn default_read_idle_secs() -> u64 {
    30
}

const fn default_write_idle_secs() -> u64 {
    30
}

const fn default_max_lifetime_secs() -> u64 {
    60
}

const fn default_shutdown_deadline_secs() -> u64 {
    10
}

const fn default_max_requests_per_connection() -> u64 {
    1000
}

const fn default_read_buffer_size() -> usize {
    8 * 1024
}

/// Reactor-pool configuration: worker count, connection-assignment policy, and the
/// per-connection timers described in `spec.md` §5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactorConfig {
    pub worker_count: usize,
    pub selection_policy: SelectionPolicy,
    pub backlog: u32,
    pub reuse_port: bool,
    pub read_idle_secs: u64,
    pub write_idle_secs: u64,
    pub max_lifetime_secs: u64,
    pub shutdown_deadline_secs: u64,
    /// Per-connection request cap (`spec.md` §4.6 rule 4); a connection is closed
    /// instead of kept alive once it is reached, regardless of `Connection` headers.
    pub max_requests_per_connection: u64,
    pub read_buffer_size: usize,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        ReactorConfig {
            worker_count: default_worker_count(),
            selection_policy: SelectionPolicy::RoundRobin,
            backlog: default_backlog(),
            reuse_port: false,
            read_idle_secs: default_read_idle_secs(),
            write_idle_secs: default_write_idle_secs(),
            max_lifetime_secs: default_max_lifetime_secs(),
            shutdown_deadline_secs: default_shutdown_deadline_secs(),
            max_requests_per_connection: default_max_requests_per_connection(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl ReactorConfig {
    pub fn read_idle(&self) -> Duration {
        Duration::from_secs(self.read_idle_secs)
    }

    pub fn write_idle(&self) -> Duration {
        Duration::from_secs(self.write_idle_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn shutdown_deadline(&self) -> Duration {
        Duration::from_secs(self.shutdown_deadline_secs)
    }
}

/// How a new connection is assigned to a reactor worker (`spec.md` §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    RoundRobin,
    LeastLoaded,
}

/// Listener-level configuration: bind address and the reactor pool it feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub reactor: ReactorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: "0.0.0.0:8080".to_string(),
            reactor: ReactorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ReactorConfig::default();
        assert_eq!(config.read_idle_secs, 30);
        assert_eq!(config.write_idle_secs, 30);
        assert_eq!(config.max_lifetime_secs, 60);
        assert!(config.worker_count >= 1);
    }

    #[test]
    fn deserializes_partial_toml_with_remaining_defaults() {
        let toml_src = r#"
            bind_address = "127.0.0.1:9000"

            [reactor]
            worker_count = 4
        "#;
        let config: ServerConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.reactor.worker_count, 4);
        assert_eq!(config.reactor.read_idle_secs, 30);
    }
}
