//! Configuration schema definitions.
//!
//! `ListenConfig` and `ServeOptions` drive the listener; `AppConfig` is the
//! file format used by the demo binary. All types derive Serde traits for
//! deserialization from TOML.

use std::fmt;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::lifecycle::Signal;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default hostname (all IPv4 interfaces).
pub const DEFAULT_HOSTNAME: &str = "0.0.0.0";

/// Callback invoked once with the bound address.
pub type OnListen = Box<dyn FnOnce(SocketAddr) + Send + 'static>;

/// Canonical listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Port to bind; `0` picks an ephemeral port.
    pub port: u16,

    /// Hostname or IP address to bind.
    pub hostname: String,

    /// Stops the listener when fired.
    #[serde(skip)]
    pub signal: Option<Signal>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            hostname: DEFAULT_HOSTNAME.to_string(),
            signal: None,
        }
    }
}

impl ListenConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// Every accepted way of configuring [`serve`](crate::serve).
#[derive(Default)]
pub enum ServeOptions {
    /// Defaults, no callback.
    #[default]
    Default,
    OnListen(OnListen),
    Port(u16),
    PortWithCallback(u16, OnListen),
    Config(ListenConfig),
    ConfigWithCallback(ListenConfig, OnListen),
}

impl ServeOptions {
    pub fn on_listen<F>(callback: F) -> Self
    where
        F: FnOnce(SocketAddr) + Send + 'static,
    {
        ServeOptions::OnListen(Box::new(callback))
    }

    pub fn port_with_callback<F>(port: u16, callback: F) -> Self
    where
        F: FnOnce(SocketAddr) + Send + 'static,
    {
        ServeOptions::PortWithCallback(port, Box::new(callback))
    }

    pub fn config_with_callback<F>(config: ListenConfig, callback: F) -> Self
    where
        F: FnOnce(SocketAddr) + Send + 'static,
    {
        ServeOptions::ConfigWithCallback(config, Box::new(callback))
    }

    /// Collapse into the canonical configuration plus optional callback.
    pub fn resolve(self) -> (ListenConfig, Option<OnListen>) {
        match self {
            ServeOptions::Default => (ListenConfig::default(), None),
            ServeOptions::OnListen(cb) => (ListenConfig::default(), Some(cb)),
            ServeOptions::Port(port) => (ListenConfig::default().with_port(port), None),
            ServeOptions::PortWithCallback(port, cb) => {
                (ListenConfig::default().with_port(port), Some(cb))
            }
            ServeOptions::Config(config) => (config, None),
            ServeOptions::ConfigWithCallback(config, cb) => (config, Some(cb)),
        }
    }
}

impl From<u16> for ServeOptions {
    fn from(port: u16) -> Self {
        ServeOptions::Port(port)
    }
}

impl From<ListenConfig> for ServeOptions {
    fn from(config: ListenConfig) -> Self {
        ServeOptions::Config(config)
    }
}

impl fmt::Debug for ServeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServeOptions::Default => f.write_str("Default"),
            ServeOptions::OnListen(_) => f.write_str("OnListen(..)"),
            ServeOptions::Port(port) => f.debug_tuple("Port").field(port).finish(),
            ServeOptions::PortWithCallback(port, _) => {
                f.debug_tuple("PortWithCallback").field(port).finish_non_exhaustive()
            }
            ServeOptions::Config(config) => f.debug_tuple("Config").field(config).finish(),
            ServeOptions::ConfigWithCallback(config, _) => f
                .debug_tuple("ConfigWithCallback")
                .field(config)
                .finish_non_exhaustive(),
        }
    }
}

/// Root configuration for the demo binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub listen: ListenConfig,
    pub logging: LoggingConfig,
    pub upstream: UpstreamConfig,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,

    /// Filter used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "edge_adapter=info,edge_demo=info,tower_http=info".to_string(),
        }
    }
}

/// Upstream relaying for the demo handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Whole-request timeout for upstream calls.
    pub timeout_secs: u64,

    /// Paths relayed to a fixed upstream URL.
    pub routes: Vec<UpstreamRoute>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            routes: Vec::new(),
        }
    }
}

/// Exact-path relay rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpstreamRoute {
    /// Request path to match exactly (e.g. `/a.json`).
    pub path: String,

    /// Absolute upstream URL.
    pub url: String,
}
