//! User-facing message catalog.
//!
//! The engine consumes this when publishing sanitized error text to the
//! status stream; callers override entries to localize or rephrase. Raw
//! error detail never passes through here, it stays in the diagnostic sink.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Messages {
    entries: HashMap<String, String>,
}

impl Default for Messages {
    fn default() -> Self {
        let mut entries = HashMap::new();
        for (key, text) in [
            ("job.fatal", "an internal error stopped this job"),
            ("command.failed", "command failed"),
            ("provider.failed", "fetching source failed"),
            ("plugin.failed", "a build step failed"),
        ] {
            entries.insert(key.to_string(), text.to_string());
        }
        Self { entries }
    }
}

impl Messages {
    /// Look up a message; unknown keys fall back to the key itself.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn set(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }
}
