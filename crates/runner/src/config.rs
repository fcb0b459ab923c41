//! Runner configuration and the shared collaborator bundle.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use events::EventBus;

use crate::cancel::CancellationRegistry;
use crate::messages::Messages;
use crate::plugin::{JobPlugin, PluginRegistry};
use crate::provider::{ProviderRegistry, SourceProvider};

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Root under which every job gets its exclusive working directory.
    pub data_root: PathBuf,
    /// Environment applied to every command, beneath job- and
    /// command-level entries.
    pub base_env: HashMap<String, String>,
    /// Bounded wait per command; `None` waits indefinitely.
    pub command_timeout: Option<Duration>,
}

impl RunnerConfig {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            base_env: HashMap::new(),
            command_timeout: None,
        }
    }

    pub fn with_base_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_env.insert(key.into(), value.into());
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }
}

/// Shared collaborators handed to every job runner: the event bus, the
/// capability registries, cancellation, and the message catalog.
pub struct RunnerContext {
    pub config: RunnerConfig,
    pub bus: EventBus,
    pub plugins: PluginRegistry,
    pub providers: ProviderRegistry,
    pub cancellations: Arc<CancellationRegistry>,
    pub messages: Arc<Messages>,
}

impl RunnerContext {
    pub fn new(config: RunnerConfig) -> Self {
        let bus = EventBus::new();
        let cancellations = Arc::new(CancellationRegistry::new(bus.clone()));
        Self {
            config,
            bus,
            plugins: PluginRegistry::new(),
            providers: ProviderRegistry::new(),
            cancellations,
            messages: Arc::new(Messages::default()),
        }
    }

    pub fn with_plugin(mut self, plugin: Arc<dyn JobPlugin>) -> Self {
        self.plugins.register(plugin);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn SourceProvider>) -> Self {
        self.providers.register(provider);
        self
    }

    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = Arc::new(messages);
        self
    }
}
