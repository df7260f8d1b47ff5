//! Server configuration loaded from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lotka_core::{IntegratorSettings, Method, SimulationLimits};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("invalid {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Bounds applied to every simulation request.
    pub limits: SimulationLimits,
    /// Integrator used for every simulation request.
    pub settings: IntegratorSettings,
    /// Wall-clock budget for a single simulation.
    pub timeout: Duration,
    /// Directory served under `/static`, if any.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8000,
            limits: SimulationLimits::default(),
            settings: IntegratorSettings::default(),
            timeout: Duration::from_millis(5000),
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `LOTKA_HOST` -- bind address (default `0.0.0.0`)
    /// - `LOTKA_PORT` -- TCP port (default 8000)
    /// - `LOTKA_MAX_DURATION` -- largest accepted `T` (default 1000)
    /// - `LOTKA_SAMPLES` -- samples per trajectory (default 500)
    /// - `LOTKA_TIMEOUT_MS` -- per-simulation budget in milliseconds (default 5000)
    /// - `LOTKA_METHOD` -- `rk4` or `dopri5` (default `rk4`)
    /// - `LOTKA_STATIC_DIR` -- directory to serve under `/static`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("LOTKA_HOST").unwrap_or(defaults.host);
        let port = parse_or(&lookup, "LOTKA_PORT", defaults.port)?;
        let max_duration = parse_or(&lookup, "LOTKA_MAX_DURATION", defaults.limits.max_duration)?;
        let samples = parse_or(&lookup, "LOTKA_SAMPLES", defaults.limits.samples)?;
        let timeout_ms: u64 = parse_or(&lookup, "LOTKA_TIMEOUT_MS", 5000)?;
        let method: Method = parse_or(&lookup, "LOTKA_METHOD", defaults.settings.method)?;
        let static_dir = lookup("LOTKA_STATIC_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        if max_duration == 0 {
            return Err(ConfigError::Invalid {
                name: "LOTKA_MAX_DURATION",
                message: String::from("must be at least 1"),
            });
        }
        if samples < lotka_core::validation::MIN_SAMPLES {
            return Err(ConfigError::Invalid {
                name: "LOTKA_SAMPLES",
                message: format!("must be at least {}", lotka_core::validation::MIN_SAMPLES),
            });
        }
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "LOTKA_TIMEOUT_MS",
                message: String::from("must be at least 1"),
            });
        }

        Ok(Self {
            host,
            port,
            limits: SimulationLimits {
                max_duration,
                samples,
            },
            settings: IntegratorSettings::with_method(method),
            timeout: Duration::from_millis(timeout_ms),
            static_dir,
        })
    }

    /// Parsed socket address for the listener.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: "LOTKA_HOST",
                message: format!("{e}"),
            })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
