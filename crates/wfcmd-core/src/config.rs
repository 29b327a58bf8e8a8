//! Process-wide command configuration

use tracing::warn;

use crate::env::EnvStore;

/// Variable that switches line output to a child `echo` process.
pub const USE_SUBPROCESS_VAR: &str = "COMMANDS_USE_SUBPROCESS";

/// Settings shared by every command emitted from this process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandsConfig {
    /// Route command lines through a child `echo` instead of writing to stdout.
    pub use_subprocess: bool,
}

impl CommandsConfig {
    pub fn new(use_subprocess: bool) -> Self {
        Self { use_subprocess }
    }

    /// Read the configuration from an environment snapshot.
    pub fn from_env(env: &impl EnvStore) -> Self {
        let use_subprocess = env
            .get(USE_SUBPROCESS_VAR)
            .map(|raw| parse_flag(USE_SUBPROCESS_VAR, &raw))
            .unwrap_or(false);

        Self { use_subprocess }
    }

    /// Resolve a call-local override against the process-wide toggle.
    pub fn resolve_subprocess(&self, call_local: Option<bool>) -> bool {
        call_local.unwrap_or(self.use_subprocess)
    }
}

/// Any non-empty value is set, except the usual spellings of "off".
fn parse_flag(name: &str, raw: &str) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => false,
        "1" | "true" | "yes" | "on" => true,
        other => {
            warn!(variable = name, value = other, "Unrecognised flag value, treating as enabled");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;

    #[test]
    fn test_default_is_direct_output() {
        let config = CommandsConfig::from_env(&MapEnv::new());
        assert!(!config.use_subprocess);
    }

    #[test]
    fn test_flag_values() {
        for (raw, expected) in [
            ("1", true),
            ("true", true),
            ("TRUE", true),
            ("anything", true),
            ("", false),
            ("0", false),
            ("false", false),
            ("off", false),
        ] {
            let env = MapEnv::new().with(USE_SUBPROCESS_VAR, raw);
            assert_eq!(CommandsConfig::from_env(&env).use_subprocess, expected, "{raw:?}");
        }
    }

    #[test]
    fn test_call_local_takes_precedence() {
        let config = CommandsConfig::new(true);
        assert!(!config.resolve_subprocess(Some(false)));
        assert!(config.resolve_subprocess(None));

        let config = CommandsConfig::new(false);
        assert!(config.resolve_subprocess(Some(true)));
        assert!(!config.resolve_subprocess(None));
    }
}
