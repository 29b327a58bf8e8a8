//! Triggering event payload

use std::fs;
use std::path::PathBuf;

use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::debug;
use wfcmd_core::{EnvStore, ProcessEnv};

use crate::error::{ChannelError, ChannelResult};
use crate::files::Channel;

static PROCESS_EVENT: EventPayload = EventPayload::new();

/// Event payload of the current process, parsed on first use.
///
/// Later environment changes are not observed; the payload is read at most
/// once per process.
pub fn event_payload() -> ChannelResult<&'static Value> {
    PROCESS_EVENT.get_or_load(&ProcessEnv)
}

/// Read and decode the event payload file named by `GITHUB_EVENT_PATH`.
pub fn load_event_payload(env: &impl EnvStore) -> ChannelResult<Value> {
    let path = PathBuf::from(env.require(Channel::EventPayload.variable())?);
    let data = fs::read(&path).map_err(|e| ChannelError::io(&path, e))?;
    let payload = serde_json::from_slice(&data).map_err(|source| ChannelError::Json {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path.display(), bytes = data.len(), "Loaded event payload");
    Ok(payload)
}

/// Lazily loaded event payload
///
/// A failed load is not cached; the next call tries again.
#[derive(Debug, Default)]
pub struct EventPayload {
    cell: OnceCell<Value>,
}

impl EventPayload {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get_or_load(&self, env: &impl EnvStore) -> ChannelResult<&Value> {
        self.cell.get_or_try_init(|| load_event_payload(env))
    }

    /// The payload, if it has been loaded already.
    pub fn get(&self) -> Option<&Value> {
        self.cell.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfcmd_core::MapEnv;

    #[test]
    fn test_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        fs::write(&path, r#"{"action": "opened", "number": 7}"#).unwrap();
        let env = MapEnv::new().with("GITHUB_EVENT_PATH", path.to_string_lossy());

        let cache = EventPayload::new();
        assert!(cache.get().is_none());
        assert_eq!(cache.get_or_load(&env).unwrap()["number"], 7);

        // The file is not read again
        fs::write(&path, r#"{"action": "closed"}"#).unwrap();
        assert_eq!(cache.get_or_load(&env).unwrap()["action"], "opened");
        assert!(cache.get().is_some());
    }

    #[test]
    fn test_missing_variable() {
        let cache = EventPayload::new();
        let err = cache.get_or_load(&MapEnv::new()).unwrap_err();
        assert!(err.is_configuration());
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        fs::write(&path, "not json").unwrap();
        let env = MapEnv::new().with("GITHUB_EVENT_PATH", path.to_string_lossy());

        let err = load_event_payload(&env).unwrap_err();
        assert!(matches!(err, ChannelError::Json { .. }));
    }
}
