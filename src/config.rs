//! Runner configuration.
//!
//! A [`Config`] decides which hooks [`Echo::with_config`](crate::Echo::with_config)
//! installs. It can be built in code or read from the process environment.

use std::env as stdenv;

/// Environment variable that turns on command echoing.
pub const VERBOSE_VAR: &str = "ECHO_VERBOSE";
/// Environment variable that makes a failed `run` exit the process.
pub const FAIL_FAST_VAR: &str = "ECHO_FAIL_FAST";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// Print each normalized command (and failures) to stderr before running it.
    pub verbose: bool,
    /// Exit the process with status 1 when `run` fails.
    pub fail_fast: bool,
}

impl Config {
    /// Reads [`VERBOSE_VAR`] and [`FAIL_FAST_VAR`] from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| stdenv::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).is_some_and(|v| is_truthy(&v));
        Self {
            verbose: flag(VERBOSE_VAR),
            fail_fast: flag(FAIL_FAST_VAR),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
