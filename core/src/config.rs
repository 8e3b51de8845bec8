// orchis/src/config.rs

//! Process-wide configuration defaults.
//!
//! Orchestrator options left unset fall back to these values. They are read
//! once, from the environment (a `.env` file is honored if present), and
//! cached for the lifetime of the process.

use once_cell::sync::Lazy;
use std::time::Duration;

static GLOBAL: Lazy<Config> = Lazy::new(Config::from_env);

/// Defaults applied when an `Orchestrator` is constructed without explicit
/// options.
#[derive(Debug, Clone)]
pub struct Config {
  /// Whether interfaces built for a selection should keep log files.
  pub logging: bool,
  /// Worker thread count handed to the interface collaborator.
  pub n_threads: usize,
  /// Emit selection and package summaries as INFO events.
  pub verbose: bool,
  /// Polling interval of the progress tracker.
  pub progress_interval: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      logging: true,
      n_threads: 4,
      verbose: true,
      progress_interval: Duration::from_millis(200),
    }
  }
}

impl Config {
  /// Reads configuration from `ORCHIS_*` environment variables, falling back
  /// to the built-in defaults for anything unset or unparseable.
  pub fn from_env() -> Self {
    // Best-effort: a missing .env file is not an error.
    let _ = dotenvy::dotenv();

    let defaults = Config::default();
    Self {
      logging: env_bool("ORCHIS_LOGGING", defaults.logging),
      n_threads: env_usize("ORCHIS_N_THREADS", defaults.n_threads),
      verbose: env_bool("ORCHIS_VERBOSE", defaults.verbose),
      progress_interval: Duration::from_millis(env_u64(
        "ORCHIS_PROGRESS_INTERVAL_MS",
        defaults.progress_interval.as_millis() as u64,
      )),
    }
  }

  /// The process-wide configuration, loaded on first access.
  pub fn global() -> &'static Config {
    &GLOBAL
  }
}

fn env_bool(key: &str, default: bool) -> bool {
  match std::env::var(key) {
    Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
    Err(_) => default,
  }
}

fn env_usize(key: &str, default: usize) -> usize {
  std::env::var(key)
    .ok()
    .and_then(|v| v.trim().parse().ok())
    .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
  std::env::var(key)
    .ok()
    .and_then(|v| v.trim().parse().ok())
    .unwrap_or(default)
}
