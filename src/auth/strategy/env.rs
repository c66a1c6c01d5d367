//! Environment access for strategies that read ambient values.

use std::collections::HashMap;
use std::fmt::Debug;

/// Source of environment values, read at call time.
pub trait EnvSource: Send + Sync + Debug {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed map of values, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Get a non-empty value.
pub fn env_opt(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.var(key).filter(|v| !v.trim().is_empty())
}

/// Get the first non-empty value among `keys`.
pub fn env_with_fallbacks(env: &dyn EnvSource, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| env_opt(env, key))
}
