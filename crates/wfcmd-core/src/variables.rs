//! Well-known CI variables
//!
//! A snapshot of the default variables the orchestrator sets for every step.
//! The snapshot is taken once at construction; build a new one to observe
//! later changes to the environment.

use std::path::PathBuf;

use serde::Serialize;

use crate::env::EnvStore;

/// All default variables, grouped by namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variables {
    /// Always `true` on a runner.
    pub ci: bool,
    pub github: GithubVariables,
    pub runner: RunnerVariables,
}

impl Variables {
    pub fn from_env(env: &impl EnvStore) -> Self {
        Self {
            ci: true,
            github: GithubVariables::from_env(env),
            runner: RunnerVariables::from_env(env),
        }
    }
}

/// Type of the ref that triggered the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Branch,
    Tag,
}

/// `GITHUB_*` variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GithubVariables {
    /// Name of the running action, or the `id` of a step.
    pub action: Option<String>,
    /// Location of the action (composite actions only).
    pub action_path: Option<PathBuf>,
    pub action_repository: Option<String>,
    /// `true` whenever the orchestrator runs the workflow.
    pub actions: bool,
    pub actor: Option<String>,
    pub actor_id: Option<String>,
    pub api_url: Option<String>,
    /// Target branch of a pull request.
    pub base_ref: Option<String>,
    /// Append file for workflow environment variables.
    pub env: Option<PathBuf>,
    pub event_name: Option<String>,
    /// JSON file holding the triggering webhook payload.
    pub event_path: Option<PathBuf>,
    pub graphql_url: Option<String>,
    /// Source branch of a pull request.
    pub head_ref: Option<String>,
    pub job: Option<String>,
    /// Append file for search path entries.
    pub path: Option<PathBuf>,
    /// Fully-formed ref, e.g. `refs/heads/main`.
    pub git_ref: Option<String>,
    pub ref_name: Option<String>,
    pub ref_protected: bool,
    pub ref_type: Option<RefType>,
    /// `owner/name`
    pub repository: Option<String>,
    pub repository_id: Option<String>,
    pub repository_owner: Option<String>,
    pub repository_owner_id: Option<String>,
    pub retention_days: Option<i64>,
    pub run_attempt: Option<i64>,
    pub run_id: Option<i64>,
    pub run_number: Option<i64>,
    pub server_url: Option<String>,
    pub sha: Option<String>,
    /// Markdown file rendered on the job summary page.
    pub step_summary: Option<PathBuf>,
    pub workflow: Option<String>,
    pub workflow_ref: Option<String>,
    pub workflow_sha: Option<String>,
    /// Default working directory of steps.
    pub workspace: Option<PathBuf>,
}

impl GithubVariables {
    pub fn from_env(env: &impl EnvStore) -> Self {
        Self {
            action: text(env, "GITHUB_ACTION"),
            action_path: path(env, "GITHUB_ACTION_PATH"),
            action_repository: text(env, "GITHUB_ACTION_REPOSITORY"),
            actions: flag(env, "GITHUB_ACTIONS"),
            actor: text(env, "GITHUB_ACTOR"),
            actor_id: text(env, "GITHUB_ACTOR_ID"),
            api_url: text(env, "GITHUB_API_URL"),
            base_ref: text(env, "GITHUB_BASE_REF"),
            env: path(env, "GITHUB_ENV"),
            event_name: text(env, "GITHUB_EVENT_NAME"),
            event_path: path(env, "GITHUB_EVENT_PATH"),
            graphql_url: text(env, "GITHUB_GRAPHQL_URL"),
            head_ref: text(env, "GITHUB_HEAD_REF"),
            job: text(env, "GITHUB_JOB"),
            path: path(env, "GITHUB_PATH"),
            git_ref: text(env, "GITHUB_REF"),
            ref_name: text(env, "GITHUB_REF_NAME"),
            ref_protected: flag(env, "GITHUB_REF_PROTECTED"),
            ref_type: text(env, "GITHUB_REF_TYPE").and_then(|t| match t.as_str() {
                "branch" => Some(RefType::Branch),
                "tag" => Some(RefType::Tag),
                _ => None,
            }),
            repository: text(env, "GITHUB_REPOSITORY"),
            repository_id: text(env, "GITHUB_REPOSITORY_ID"),
            repository_owner: text(env, "GITHUB_REPOSITORY_OWNER"),
            repository_owner_id: text(env, "GITHUB_REPOSITORY_OWNER_ID"),
            retention_days: number(env, "GITHUB_RETENTION_DAYS"),
            run_attempt: number(env, "GITHUB_RUN_ATTEMPT"),
            run_id: number(env, "GITHUB_RUN_ID"),
            run_number: number(env, "GITHUB_RUN_NUMBER"),
            server_url: text(env, "GITHUB_SERVER_URL"),
            sha: text(env, "GITHUB_SHA"),
            step_summary: path(env, "GITHUB_STEP_SUMMARY"),
            workflow: text(env, "GITHUB_WORKFLOW"),
            workflow_ref: text(env, "GITHUB_WORKFLOW_REF"),
            workflow_sha: text(env, "GITHUB_WORKFLOW_SHA"),
            workspace: path(env, "GITHUB_WORKSPACE"),
        }
    }
}

/// `RUNNER_*` variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunnerVariables {
    /// `X86`, `X64`, `ARM` or `ARM64`
    pub arch: Option<String>,
    /// Set only when debug logging is enabled.
    pub debug: bool,
    pub name: Option<String>,
    /// `Linux`, `Windows` or `macOS`
    pub os: Option<String>,
    /// Scratch directory emptied at the start and end of each job.
    pub temp: Option<PathBuf>,
    pub tool_cache: Option<PathBuf>,
}

impl RunnerVariables {
    pub fn from_env(env: &impl EnvStore) -> Self {
        Self {
            arch: text(env, "RUNNER_ARCH"),
            debug: env.get("RUNNER_DEBUG").as_deref() == Some("1"),
            name: text(env, "RUNNER_NAME"),
            os: text(env, "RUNNER_OS"),
            temp: path(env, "RUNNER_TEMP"),
            tool_cache: path(env, "RUNNER_TOOL_CACHE"),
        }
    }
}

fn text(env: &impl EnvStore, name: &str) -> Option<String> {
    env.get(name).filter(|v| !v.is_empty())
}

fn path(env: &impl EnvStore, name: &str) -> Option<PathBuf> {
    text(env, name).map(PathBuf::from)
}

fn flag(env: &impl EnvStore, name: &str) -> bool {
    env.get(name).as_deref() == Some("true")
}

fn number(env: &impl EnvStore, name: &str) -> Option<i64> {
    text(env, name).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;

    #[test]
    fn test_empty_environment() {
        let vars = Variables::from_env(&MapEnv::new());

        assert!(vars.ci);
        assert!(!vars.github.actions);
        assert_eq!(vars.github.run_id, None);
        assert_eq!(vars.github.env, None);
        assert!(!vars.runner.debug);
    }

    #[test]
    fn test_populated_environment() {
        let env = MapEnv::new()
            .with("GITHUB_ACTIONS", "true")
            .with("GITHUB_REF", "refs/heads/main")
            .with("GITHUB_REF_TYPE", "branch")
            .with("GITHUB_RUN_ID", "42")
            .with("GITHUB_RUN_ATTEMPT", "not-a-number")
            .with("GITHUB_OUTPUT", "/tmp/out")
            .with("GITHUB_ENV", "/tmp/env")
            .with("RUNNER_DEBUG", "1")
            .with("RUNNER_OS", "Linux");

        let vars = Variables::from_env(&env);

        assert!(vars.github.actions);
        assert_eq!(vars.github.git_ref.as_deref(), Some("refs/heads/main"));
        assert_eq!(vars.github.ref_type, Some(RefType::Branch));
        assert_eq!(vars.github.run_id, Some(42));
        assert_eq!(vars.github.run_attempt, None);
        assert_eq!(vars.github.env, Some(PathBuf::from("/tmp/env")));
        assert!(vars.runner.debug);
        assert_eq!(vars.runner.os.as_deref(), Some("Linux"));
    }

    #[test]
    fn test_serializes_to_json() {
        let env = MapEnv::new().with("GITHUB_REF_TYPE", "tag");
        let json = serde_json::to_value(Variables::from_env(&env)).unwrap();

        assert_eq!(json["ci"], serde_json::Value::Bool(true));
        assert_eq!(json["github"]["ref_type"], "tag");
    }
}
