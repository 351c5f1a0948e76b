//! Vox engine bootstrap.
//!
//! Brings the object system and the relation graph up in a fixed order:
//! `base` classes, then `containers`, then `hrg`, then any plugin modules
//! the host appends. Shutdown runs the same list backwards.
//!
//! ```text
//! let engine = Engine::init(EngineConfig::from_env()?)?;
//! let mut utt = engine.new_utterance();
//! utt.new_relation("Word")?;
//! engine.shutdown()?;
//! ```

mod config;
mod engine;
mod module;
mod tracing_setup;

pub use config::{EngineConfig, FATAL_VAR, LOG_TREE_VAR, LOG_VAR};
pub use engine::{Engine, EngineBuilder};
pub use module::{builtin_modules, Module, ModuleList};
pub use tracing_setup::init_tracing;
