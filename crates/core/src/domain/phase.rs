use serde::{Deserialize, Serialize};

/// One stage of a job's lifecycle.
///
/// `Deploy` only runs for deploy-type jobs; `Cleanup` is reached either after
/// the nominal order finishes or directly after a phase fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Env,
    Prepare,
    Test,
    Deploy,
    Cleanup,
}

impl Phase {
    /// All phases in lifecycle order.
    pub const ALL: [Phase; 5] = [
        Phase::Env,
        Phase::Prepare,
        Phase::Test,
        Phase::Deploy,
        Phase::Cleanup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Prepare => "prepare",
            Self::Test => "test",
            Self::Deploy => "deploy",
            Self::Cleanup => "cleanup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "env" => Some(Self::Env),
            "prepare" => Some(Self::Prepare),
            "test" => Some(Self::Test),
            "deploy" => Some(Self::Deploy),
            "cleanup" => Some(Self::Cleanup),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
