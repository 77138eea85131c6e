use crate::command::VarResolver;
use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Variable table and working directory used by the runner.
///
/// The environment contains:
/// - `vars`: variables used for substitution and passed to every child process.
/// - `current_dir`: the working directory for command execution.
///
/// Note: fields are public so callers can prepare the table directly.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// This copies variables from `std::env::vars()` and initializes `current_dir`
    /// from `std::env::current_dir()`.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { vars, current_dir }
    }

    /// An environment with no variables, rooted at `current_dir`.
    ///
    /// Lookups still fall back to the process environment.
    pub fn empty(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: current_dir.into(),
        }
    }

    /// Get the value of a variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override a variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Remove a variable from `self.vars`, returning its previous value.
    pub fn unset_var(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl VarResolver for Environment {
    fn resolve(&self, name: &str) -> String {
        self.get_var(name).unwrap_or_default()
    }
}
