//! Engine configuration.
//!
//! Read from the environment:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `VOX_LOG` | tracing filter directives, e.g. `vox_hrg=debug` |
//! | `VOX_LOG_TREE` | `1`/`true`/`yes` for indented span-tree output |
//! | `VOX_FATAL` | `abort` or `propagate` |

use vox_object::{FatalPolicy, VoxError, VoxResult};

pub const LOG_VAR: &str = "VOX_LOG";
pub const LOG_TREE_VAR: &str = "VOX_LOG_TREE";
pub const FATAL_VAR: &str = "VOX_FATAL";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Filter directives. `None` falls back to `RUST_LOG`; with neither set
    /// no subscriber is installed.
    pub log_filter: Option<String>,
    /// Hierarchical output instead of one line per event.
    pub log_tree: bool,
    pub fatal_policy: FatalPolicy,
}

impl EngineConfig {
    /// Configuration from the process environment.
    pub fn from_env() -> VoxResult<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Configuration from `(name, value)` pairs. Unrelated names are
    /// ignored; unset variables keep their defaults.
    pub fn from_vars<I, K, V>(vars: I) -> VoxResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = EngineConfig::default();
        for (key, value) in vars {
            let value = value.as_ref().trim();
            match key.as_ref() {
                LOG_VAR => {
                    config.log_filter = (!value.is_empty()).then(|| value.to_owned());
                }
                LOG_TREE_VAR => config.log_tree = parse_flag(LOG_TREE_VAR, value)?,
                FATAL_VAR => config.fatal_policy = parse_policy(value)?,
                _ => {}
            }
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_log_filter(mut self, directives: impl Into<String>) -> Self {
        self.log_filter = Some(directives.into());
        self
    }

    #[must_use]
    pub fn with_log_tree(mut self, enabled: bool) -> Self {
        self.log_tree = enabled;
        self
    }

    #[must_use]
    pub fn with_fatal_policy(mut self, policy: FatalPolicy) -> Self {
        self.fatal_policy = policy;
        self
    }
}

fn parse_flag(var: &str, value: &str) -> VoxResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        other => Err(VoxError::argument(format!(
            "{var}: expected 1/true/yes or 0/false/no, got '{other}'"
        ))),
    }
}

fn parse_policy(value: &str) -> VoxResult<FatalPolicy> {
    match value.to_ascii_lowercase().as_str() {
        "abort" => Ok(FatalPolicy::Abort),
        "propagate" => Ok(FatalPolicy::Propagate),
        other => Err(VoxError::argument(format!(
            "{FATAL_VAR}: expected 'abort' or 'propagate', got '{other}'"
        ))),
    }
}
