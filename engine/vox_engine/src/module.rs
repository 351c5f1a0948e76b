//! Engine modules.
//!
//! A module is a named pair of closures: `init` runs at engine start, `quit`
//! at shutdown. Modules live in one ordered list; quit order is always the
//! reverse of init order, so a module can rely on everything initialised
//! before it still being there when it quits.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use vox_hrg::HrgClasses;
use vox_object::{
    base_classes, container_classes, ClassDescriptor, ClassInfo, ClassRegistry, ResultExt,
    VoxResult,
};

type Hook = Box<dyn FnMut(&mut ClassRegistry) -> VoxResult<()> + Send>;

pub struct Module {
    name: String,
    init: Hook,
    quit: Hook,
}

impl Module {
    pub fn new<I, Q>(name: impl Into<String>, init: I, quit: Q) -> Self
    where
        I: FnMut(&mut ClassRegistry) -> VoxResult<()> + Send + 'static,
        Q: FnMut(&mut ClassRegistry) -> VoxResult<()> + Send + 'static,
    {
        Module {
            name: name.into(),
            init: Box::new(init),
            quit: Box::new(quit),
        }
    }

    /// A module that registers `descriptors` in order and unregisters them
    /// in reverse. Quit only touches classes this module registered itself.
    pub fn classes(name: impl Into<String>, descriptors: Vec<ClassDescriptor>) -> Self {
        let registered: Arc<Mutex<Vec<Arc<ClassInfo>>>> = Arc::default();
        let owned = Arc::clone(&registered);
        Module::new(
            name,
            move |registry: &mut ClassRegistry| {
                for descriptor in &descriptors {
                    let info = registry.register(descriptor.clone())?;
                    owned.lock().push(info);
                }
                Ok(())
            },
            move |registry: &mut ClassRegistry| {
                let mut classes = registered.lock();
                while let Some(info) = classes.last() {
                    registry.unregister(info.name())?;
                    classes.pop();
                }
                Ok(())
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module").field("name", &self.name).finish_non_exhaustive()
    }
}

/// The builtin modules in init order: `base`, `containers`, `hrg`.
pub fn builtin_modules() -> Vec<Module> {
    vec![
        Module::classes("base", base_classes()),
        Module::classes("containers", container_classes()),
        Module::classes("hrg", HrgClasses::descriptors()),
    ]
}

/// Ordered modules.
#[derive(Debug, Default)]
pub struct ModuleList {
    modules: Vec<Module>,
}

impl ModuleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, module: Module) {
        self.modules.push(module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(Module::name)
    }

    /// Initialise every module in order.
    ///
    /// A failing module does not stop the ones after it. The first error is
    /// returned once all modules have run.
    pub fn init_all(&mut self, registry: &mut ClassRegistry) -> VoxResult<()> {
        let mut first_error = None;
        for module in &mut self.modules {
            match (module.init)(registry) {
                Ok(()) => tracing::debug!(module = %module.name, "module initialised"),
                Err(err) => {
                    tracing::warn!(module = %module.name, error = %err, "module init failed");
                    if first_error.is_none() {
                        first_error = Some(err.with_context(
                            "ModuleList::init_all",
                            format!("initialising module '{}'", module.name),
                        ));
                    }
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Quit every module in reverse order. The first error wins.
    pub fn quit_all(&mut self, registry: &mut ClassRegistry) -> VoxResult<()> {
        let mut first_error = None;
        for module in self.modules.iter_mut().rev() {
            let result = (module.quit)(registry).with_context("ModuleList::quit_all", || {
                format!("quitting module '{}'", module.name)
            });
            match result {
                Ok(()) => tracing::debug!(module = %module.name, "module quit"),
                Err(err) => {
                    tracing::warn!(module = %module.name, error = %err, "module quit failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
