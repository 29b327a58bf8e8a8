//! Key/value environment stores

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Read-only view of a key/value environment.
///
/// Everything in wfcmd that needs an environment variable goes through this
/// trait, so tests can use [`MapEnv`] instead of mutating the process
/// environment.
pub trait EnvStore {
    /// Look up a variable. Unset and non-UTF-8 values are both `None`.
    fn get(&self, name: &str) -> Option<String>;

    /// Look up a variable that must be present.
    fn require(&self, name: &str) -> Result<String> {
        self.get(name)
            .ok_or_else(|| Error::MissingVariable(name.to_string()))
    }

    /// Saved state for a post step, exposed by the orchestrator as `STATE_{name}`.
    fn state(&self, name: &str) -> Option<String> {
        self.get(&format!("STATE_{}", name))
    }

    /// Action input, exposed by the orchestrator as `INPUT_{NAME}`.
    fn input(&self, name: &str) -> Option<String> {
        self.get(&format!("INPUT_{}", name.to_uppercase()))
    }
}

impl<E: EnvStore + ?Sized> EnvStore for &E {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory environment, used in tests and when embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.remove(name)
    }
}

impl EnvStore for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_missing() {
        let env = MapEnv::new();
        assert_eq!(
            env.require("GITHUB_OUTPUT"),
            Err(Error::MissingVariable("GITHUB_OUTPUT".into()))
        );
    }

    #[test]
    fn test_state_and_input_prefixes() {
        let env = MapEnv::new()
            .with("STATE_pid", "1234")
            .with("INPUT_TOKEN", "secret");

        assert_eq!(env.state("pid"), Some("1234".to_string()));
        assert_eq!(env.input("token"), Some("secret".to_string()));
        assert_eq!(env.input("missing"), None);
    }

    #[test]
    fn test_reference_is_store() {
        fn lookup(env: impl EnvStore) -> Option<String> {
            env.get("A")
        }

        let env: MapEnv = [("A", "1")].into_iter().collect();
        assert_eq!(lookup(&env), Some("1".to_string()));
    }
}
