//! Source provider capability interface and registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kiln_core::Job;

use crate::context::ExecutionContext;
use crate::error::{ConfigError, TaskResult};

/// The capability that acquires source content during the prepare phase.
///
/// Implementations populate the job's working directory; clone strategy,
/// authentication and caching are entirely theirs.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn clone_source(&self, ctx: &ExecutionContext) -> TaskResult<()>;
}

/// Name → provider capability, validated at configuration time.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn SourceProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn SourceProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn SourceProvider>, ConfigError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownProvider(name.to_string()))
    }

    /// Resolve the provider a job is configured with.
    pub fn resolve(&self, job: &Job) -> Result<Arc<dyn SourceProvider>, ConfigError> {
        self.get(&job.provider)
    }
}
