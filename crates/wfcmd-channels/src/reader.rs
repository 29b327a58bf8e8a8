//! Reading key/value blocks back out of channel files

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;
use wfcmd_core::EnvStore;
use wfcmd_protocol::BlockParser;

use crate::error::{ChannelError, ChannelResult};
use crate::files::Channel;

const READ_CHUNK: usize = 8 * 1024;

/// Read every block in `path` into an ordered mapping.
///
/// Repeated keys keep their first position and their last value. A trailing
/// header with no value is dropped without error.
pub fn read_blocks(path: &Path) -> ChannelResult<IndexMap<String, String>> {
    let mut file = File::open(path).map_err(|e| ChannelError::io(path, e))?;
    let mut parser = BlockParser::new();
    let mut map = IndexMap::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let n = match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ChannelError::io(path, e)),
        };
        parser.feed(&chunk[..n]);
        while let Some(block) = parser.parse() {
            map.insert(block.key, block.value);
        }
    }

    if let Some(block) = parser.finish() {
        map.insert(block.key, block.value);
    }

    debug!(path = %path.display(), entries = map.len(), "Read channel file");
    Ok(map)
}

/// Variables exported through the env file.
///
/// Best effort: an unset `GITHUB_ENV` or a file that does not exist yet both
/// read as empty.
pub fn workflow_environment(env: &impl EnvStore) -> ChannelResult<IndexMap<String, String>> {
    let Some(path) = env.get(Channel::Env.variable()) else {
        return Ok(IndexMap::new());
    };

    match read_blocks(Path::new(&path)) {
        Err(ChannelError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path, "Env file does not exist yet");
            Ok(IndexMap::new())
        }
        other => other,
    }
}

/// An environment store that falls back to the env file.
///
/// Non-empty values in the base store win over values exported by earlier
/// steps.
#[derive(Debug, Clone)]
pub struct WorkflowEnv<E> {
    base: E,
    exported: IndexMap<String, String>,
}

impl<E: EnvStore> WorkflowEnv<E> {
    pub fn new(base: E, exported: IndexMap<String, String>) -> Self {
        Self { base, exported }
    }

    /// Layer the env file named by `base` over it.
    pub fn load(base: E) -> ChannelResult<Self> {
        let exported = workflow_environment(&base)?;
        Ok(Self::new(base, exported))
    }

    pub fn exported(&self) -> &IndexMap<String, String> {
        &self.exported
    }
}

impl<E: EnvStore> EnvStore for WorkflowEnv<E> {
    fn get(&self, name: &str) -> Option<String> {
        self.base
            .get(name)
            .filter(|v| !v.is_empty())
            .or_else(|| self.exported.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wfcmd_core::{MapEnv, Variables};
    use wfcmd_protocol::build_file_block;

    fn write_file(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(data).unwrap();
        path
    }

    #[test]
    fn test_read_blocks_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = Vec::new();
        let writes = [("A", "1"), ("B", "2"), ("A", "3"), ("A", "4"), ("C", "")];
        for (k, v) in writes {
            data.extend_from_slice(&build_file_block(k, v).unwrap());
        }
        let path = write_file(&dir, "env", &data);

        let map = read_blocks(&path).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["A"], "4");
        assert_eq!(map["B"], "2");
        assert_eq!(map["C"], "");
    }

    #[test]
    fn test_read_blocks_larger_than_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let big = "x".repeat(READ_CHUNK * 2 + 17);
        let mut data = build_file_block("BIG", &big).unwrap().to_vec();
        data.extend_from_slice(&build_file_block("SMALL", "s").unwrap());
        let path = write_file(&dir, "env", &data);

        let map = read_blocks(&path).unwrap();
        assert_eq!(map["BIG"], big);
        assert_eq!(map["SMALL"], "s");
    }

    #[test]
    fn test_read_blocks_dangling_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "env",
            b"A<<__ENV_DELIMITER__\n1\n__ENV_DELIMITER__\nB<<__ENV_DELIMITER__\n",
        );

        let map = read_blocks(&path).unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.get("B").is_none());
    }

    #[test]
    fn test_read_blocks_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_blocks(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ChannelError::Io { .. }));
    }

    #[test]
    fn test_workflow_environment_without_variable() {
        let map = workflow_environment(&MapEnv::new()).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_workflow_environment_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let env = MapEnv::new().with("GITHUB_ENV", dir.path().join("absent").to_string_lossy());
        assert!(workflow_environment(&env).unwrap().is_empty());
    }

    #[test]
    fn test_variables_from_workflow_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "env",
            &build_file_block("GITHUB_RUN_ID", "77").unwrap(),
        );
        let base = MapEnv::new()
            .with("GITHUB_ENV", path.to_string_lossy())
            .with("GITHUB_JOB", "");

        let env = WorkflowEnv::load(base).unwrap();
        let vars = Variables::from_env(&env);

        assert_eq!(vars.github.run_id, Some(77));
        assert_eq!(vars.github.job, None);
        assert_eq!(env.exported().len(), 1);
    }
}
