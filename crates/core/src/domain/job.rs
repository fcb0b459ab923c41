use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    #[default]
    TestOnly,
    TestAndDeploy,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TestOnly => "test_only",
            Self::TestAndDeploy => "test_and_deploy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "test_only" => Some(Self::TestOnly),
            "test_and_deploy" => Some(Self::TestAndDeploy),
            _ => None,
        }
    }

    /// Whether jobs of this type run the deploy phase at all.
    pub fn deploys(&self) -> bool {
        matches!(self, Self::TestAndDeploy)
    }
}

/// Descriptor for the repository a job builds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSpec {
    pub name: String,
    pub url: Option<String>,
}

impl RepoSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Filesystem-safe directory name derived from the repo name.
    ///
    /// Anything outside `[A-Za-z0-9._-]` collapses to `-`, so `owner/repo`
    /// becomes `owner-repo`.
    pub fn dir_name(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    }
}

/// A single build task handed to the engine.
///
/// Immutable for the engine's purposes; phase and cancellation state are
/// tracked by the runner, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub repo: RepoSpec,
    pub job_type: JobType,
    /// Configured plugin names, in execution order.
    pub plugins: Vec<String>,
    /// Provider name used to acquire source during `prepare`.
    pub provider: String,
    /// Job-specific environment, merged over the runner's base environment.
    pub env: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(repo: RepoSpec, job_type: JobType, provider: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            repo,
            job_type,
            plugins: Vec::new(),
            provider: provider.into(),
            env: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_plugins<I, S>(mut self, plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugins = plugins.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The job's exclusive working directory under the runner's data root.
    ///
    /// Falls back to the job id when the repo name yields nothing usable.
    pub fn workdir(&self, data_root: &Path) -> PathBuf {
        let dir = self.repo.dir_name();
        if dir.is_empty() || dir.chars().all(|c| c == '-') {
            data_root.join(self.id.to_string())
        } else {
            data_root.join(dir)
        }
    }
}
