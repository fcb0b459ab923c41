use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Descriptor for one external command.
///
/// Either a raw shell line (no `args`, tokenized with shell-quoting rules) or
/// a structured executable-plus-args pair. `screen` replaces the logged
/// command line so callers can run commands carrying secrets without
/// revealing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    pub command: String,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub screen: Option<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// A raw shell line, tokenized at execution time.
    pub fn shell(line: impl Into<String>) -> Self {
        Self {
            command: line.into(),
            args: None,
            screen: None,
            env: HashMap::new(),
            cwd: None,
        }
    }

    /// An explicit executable and argument list; no tokenization happens.
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: Some(args.into_iter().map(Into::into).collect()),
            screen: None,
            env: HashMap::new(),
            cwd: None,
        }
    }

    pub fn with_screen(mut self, screen: impl Into<String>) -> Self {
        self.screen = Some(screen.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Normalize to `(executable, args)`.
    ///
    /// With explicit `args` the command string is the executable as-is.
    /// Otherwise the command line is split with shell-quoting rules and the
    /// first token becomes the executable.
    pub fn resolve(&self) -> Result<(String, Vec<String>), CoreError> {
        if let Some(args) = &self.args {
            if self.command.is_empty() {
                return Err(CoreError::EmptyCommand);
            }
            return Ok((self.command.clone(), args.clone()));
        }

        let mut tokens = shell_words::split(&self.command)?;
        if tokens.is_empty() {
            return Err(CoreError::EmptyCommand);
        }
        let program = tokens.remove(0);
        Ok((program, tokens))
    }

    /// Human-readable command line for logging.
    ///
    /// `screen` wins when set; otherwise the shell-quoted reconstruction of
    /// the resolved tokens, falling back to the raw string when the line
    /// doesn't tokenize.
    pub fn display_line(&self) -> String {
        if let Some(screen) = &self.screen {
            return screen.clone();
        }
        match self.resolve() {
            Ok((program, args)) => {
                shell_words::join(std::iter::once(&program).chain(args.iter()))
            }
            Err(_) => self.command.clone(),
        }
    }
}

impl From<&str> for CommandSpec {
    fn from(line: &str) -> Self {
        Self::shell(line)
    }
}

impl From<String> for CommandSpec {
    fn from(line: String) -> Self {
        Self::shell(line)
    }
}

/// Outcome of one executed command. Not persisted; it only feeds the status
/// stream and the caller's control flow.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: i32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// `Err(exit_code)` on non-zero exit, for routing into the runner's
    /// exit-code error taxonomy.
    pub fn check(&self) -> Result<(), i32> {
        if self.success() {
            Ok(())
        } else {
            Err(self.exit_code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_line_tokenization() {
        let spec = CommandSpec::shell("npm run test -- --ci");
        let (program, args) = spec.resolve().unwrap();

        assert_eq!(program, "npm");
        assert_eq!(args, vec!["run", "test", "--", "--ci"]);
    }

    #[test]
    fn test_quoted_tokens() {
        let spec = CommandSpec::shell(r#"git commit -m "fix: a b" --author='K N'"#);
        let (program, args) = spec.resolve().unwrap();

        assert_eq!(program, "git");
        assert_eq!(args, vec!["commit", "-m", "fix: a b", "--author=K N"]);
    }

    #[test]
    fn test_explicit_args_skip_tokenization() {
        let spec = CommandSpec::new("sh", ["-c", "echo a b"]);
        let (program, args) = spec.resolve().unwrap();

        assert_eq!(program, "sh");
        assert_eq!(args, vec!["-c", "echo a b"]);
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(matches!(
            CommandSpec::shell("   ").resolve(),
            Err(CoreError::EmptyCommand)
        ));
        assert!(matches!(
            CommandSpec::shell("").resolve(),
            Err(CoreError::EmptyCommand)
        ));
    }

    #[test]
    fn test_unclosed_quote_rejected() {
        assert!(matches!(
            CommandSpec::shell("echo 'oops").resolve(),
            Err(CoreError::CommandParse(_))
        ));
    }

    #[test]
    fn test_display_line_prefers_screen() {
        let spec =
            CommandSpec::shell("curl -H 'Authorization: Bearer s3cret' https://api.example.com")
                .with_screen("curl -H [redacted] https://api.example.com");

        assert_eq!(
            spec.display_line(),
            "curl -H [redacted] https://api.example.com"
        );
    }

    #[test]
    fn test_tokenize_requote_round_trip() {
        // Re-quoting the tokens and re-tokenizing yields the same sequence.
        for line in [
            "echo hello world",
            r#"sh -c "echo 'a b' c""#,
            r"printf %s\n one\ two",
        ] {
            let first = shell_words::split(line).unwrap();
            let requoted = shell_words::join(first.iter());
            let second = shell_words::split(&requoted).unwrap();
            assert_eq!(first, second, "round trip failed for {line:?}");
        }
    }

    #[test]
    fn test_command_result_check() {
        let ok = CommandResult {
            exit_code: 0,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            elapsed: Duration::from_millis(10),
        };
        assert!(ok.success());
        assert_eq!(ok.check(), Ok(()));

        let failed = CommandResult { exit_code: 2, ..ok.clone() };
        assert!(!failed.success());
        assert_eq!(failed.check(), Err(2));
    }
}
