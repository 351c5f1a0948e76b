//! The running engine.
//!
//! [`EngineBuilder`] collects configuration and plugin modules, installs
//! tracing and initialises the builtin modules followed by the plugins.
//! [`Engine`] owns the resulting class registry and hands out utterances and
//! objects built against it.

use std::sync::Arc;

use vox_hrg::{HrgClasses, Utterance, Voice};
use vox_object::{ClassRegistry, ObjectRef, VoxResult};

use crate::config::EngineConfig;
use crate::module::{builtin_modules, Module, ModuleList};
use crate::tracing_setup::init_tracing;

/// Builder for [`Engine`]. Plugin modules initialise after the builtins.
#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    plugins: Vec<Module>,
}

impl EngineBuilder {
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_module(mut self, module: Module) -> Self {
        self.plugins.push(module);
        self
    }

    /// Install tracing, then initialise every module in order.
    ///
    /// If any module fails, all modules are quit in reverse order and the
    /// first init error is returned after the fatal policy has seen it.
    pub fn build(self) -> VoxResult<Engine> {
        let EngineBuilder { config, plugins } = self;
        let policy = config.fatal_policy;
        init_tracing(&config)?;

        let mut registry = ClassRegistry::new();
        let mut modules = ModuleList::new();
        for module in builtin_modules().into_iter().chain(plugins) {
            modules.push(module);
        }

        let _span = tracing::debug_span!("engine_init", modules = modules.len()).entered();
        let started = modules
            .init_all(&mut registry)
            .and_then(|()| HrgClasses::resolve(&registry));
        let classes = match started {
            Ok(classes) => classes,
            Err(err) => {
                if let Err(quit) = modules.quit_all(&mut registry) {
                    tracing::warn!(error = %quit, "cleanup after failed init also failed");
                }
                return Err(err
                    .with_context("Engine::init", "engine bootstrap failed")
                    .escalate(policy));
            }
        };

        tracing::debug!(classes = registry.len(), "engine initialised");
        Ok(Engine {
            config,
            registry,
            modules,
            classes,
            running: true,
        })
    }
}

/// A running engine: the class registry plus the modules that populated it.
///
/// Dropping a running engine quits its modules; [`Engine::shutdown`] does
/// the same but reports the outcome.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    registry: ClassRegistry,
    modules: ModuleList,
    classes: HrgClasses,
    running: bool,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// An engine with only the builtin modules.
    pub fn init(config: EngineConfig) -> VoxResult<Self> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ClassRegistry {
        &mut self.registry
    }

    pub fn classes(&self) -> &HrgClasses {
        &self.classes
    }

    pub fn new_utterance(&self) -> Utterance {
        Utterance::new(&self.classes)
    }

    pub fn new_utterance_with_voice(&self, voice: Arc<dyn Voice>) -> Utterance {
        Utterance::with_voice(&self.classes, voice)
    }

    pub fn new_object(&self, class: &str) -> VoxResult<ObjectRef> {
        self.guard(self.registry.new_object(class))
    }

    /// Pass `result` through the configured fatal policy.
    pub fn guard<T>(&self, result: VoxResult<T>) -> VoxResult<T> {
        result.map_err(|err| err.escalate(self.config.fatal_policy))
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.names().collect()
    }

    /// Quit every module in reverse init order. The first error wins.
    pub fn shutdown(mut self) -> VoxResult<()> {
        self.running = false;
        let result = self.modules.quit_all(&mut self.registry);
        tracing::debug!(ok = result.is_ok(), "engine shut down");
        self.guard(result)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Err(err) = self.modules.quit_all(&mut self.registry) {
            tracing::warn!(error = %err, "engine dropped with failing module quit");
        }
    }
}
