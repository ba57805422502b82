use std::time::Duration;

use rand::Rng;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub reason: String,
}

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// SQLite connection URL.
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight executions (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Seconds between WebSocket pings (default: `30`).
    pub heartbeat_interval_secs: u64,
    pub log_format: LogFormat,
    /// Deployment label reported by `/system/info` (default: `development`).
    pub environment: String,
    /// Pacing of simulated execution steps.
    pub simulation: SimulationConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                                       |
    /// |---------------------------|-----------------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                                     |
    /// | `PORT`                    | `8000`                                        |
    /// | `DATABASE_URL`            | `sqlite://crewboard.db?mode=rwc`              |
    /// | `CORS_ORIGINS`            | `http://localhost:3000,http://localhost:3001` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                                          |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                                          |
    /// | `HEARTBEAT_INTERVAL_SECS` | `30`                                          |
    /// | `LOG_FORMAT`              | `pretty` (`json` for JSON lines)              |
    /// | `APP_ENV`                 | `development`                                 |
    ///
    /// plus the `SIM_*` variables read by [`SimulationConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0");
        let port: u16 = parse_env("PORT", 8000)?;
        let database_url = env_or("DATABASE_URL", "sqlite://crewboard.db?mode=rwc");

        let cors_origins: Vec<String> = env_or(
            "CORS_ORIGINS",
            "http://localhost:3000,http://localhost:3001",
        )
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
        for origin in &cors_origins {
            if origin.parse::<axum::http::HeaderValue>().is_err() {
                return Err(ConfigError {
                    var: "CORS_ORIGINS",
                    reason: format!("'{origin}' is not a valid header value"),
                });
            }
        }

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", 30)?;
        let shutdown_timeout_secs: u64 = parse_env("SHUTDOWN_TIMEOUT_SECS", 30)?;
        let heartbeat_interval_secs: u64 = parse_env("HEARTBEAT_INTERVAL_SECS", 30)?;
        if heartbeat_interval_secs == 0 {
            return Err(ConfigError {
                var: "HEARTBEAT_INTERVAL_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let log_format = match env_or("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
            "pretty" | "text" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError {
                    var: "LOG_FORMAT",
                    reason: format!("expected 'pretty' or 'json', got '{other}'"),
                })
            }
        };

        let environment = env_or("APP_ENV", "development");

        Ok(Self {
            host,
            port,
            database_url,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            heartbeat_interval_secs,
            log_format,
            environment,
            simulation: SimulationConfig::from_env()?,
        })
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

/// Simulated processing latency of each execution step, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub agent_step_ms: u64,
    pub task_step_ms: u64,
    pub report_step_ms: u64,
    /// Upper bound of the random extra pause added to every step.
    pub jitter_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agent_step_ms: 2000,
            task_step_ms: 3000,
            report_step_ms: 2000,
            jitter_ms: 500,
        }
    }
}

impl SimulationConfig {
    /// | Env Var              | Default |
    /// |----------------------|---------|
    /// | `SIM_AGENT_STEP_MS`  | `2000`  |
    /// | `SIM_TASK_STEP_MS`   | `3000`  |
    /// | `SIM_REPORT_STEP_MS` | `2000`  |
    /// | `SIM_JITTER_MS`      | `500`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            agent_step_ms: parse_env("SIM_AGENT_STEP_MS", defaults.agent_step_ms)?,
            task_step_ms: parse_env("SIM_TASK_STEP_MS", defaults.task_step_ms)?,
            report_step_ms: parse_env("SIM_REPORT_STEP_MS", defaults.report_step_ms)?,
            jitter_ms: parse_env("SIM_JITTER_MS", defaults.jitter_ms)?,
        })
    }

    /// Fixed pacing with no jitter, for tests.
    pub fn fixed(step_ms: u64) -> Self {
        Self {
            agent_step_ms: step_ms,
            task_step_ms: step_ms,
            report_step_ms: step_ms,
            jitter_ms: 0,
        }
    }

    pub fn agent_step(&self) -> Duration {
        self.jittered(self.agent_step_ms)
    }

    pub fn task_step(&self) -> Duration {
        self.jittered(self.task_step_ms)
    }

    pub fn report_step(&self) -> Duration {
        self.jittered(self.report_step_ms)
    }

    fn jittered(&self, base_ms: u64) -> Duration {
        let extra = if self.jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.jitter_ms)
        };
        Duration::from_millis(base_ms + extra)
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
