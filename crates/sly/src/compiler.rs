//! The compiler service: frontend → optimizer → backend.
//!
//! `SlyCompiler` owns the fixed optimizer and the extension
//! registries, and wires one pipeline per `compile` call. The whole
//! pipeline runs synchronously on the calling thread: the frontend
//! pushes raw commands, each pass rewrites them on the way through,
//! and the backend receives the optimized sequence before `compile`
//! returns.
//!
//! Compilers are freely shared across threads. Per-compile state is
//! local to the call; the only shared mutable state is the registries
//! and the published frontend, and registry mutations rebuild the
//! frontend so later compiles pick up the new extension set.

use std::sync::{Arc, RwLock};

use crate::error::CompilerError;
use crate::optimizer::{Optimizer, StreamPass, StructureCheck};
use crate::registry::{Filter, FilterRegistry, Plugin, PluginRegistry};
use crate::stream::{PushStream, StreamHandler, StreamWarning};

/// Producer side of the pipeline: parses markup and drives the raw
/// command stream. Implementations write zero or more commands in
/// program order, then terminate the stream exactly once; parse
/// errors become stream errors.
pub trait Frontend: Send + Sync {
    fn drive(&self, source: &str, stream: &mut PushStream<'_>);
}

/// Builds a frontend from the current extension snapshots. Supplied
/// by the host; called once at construction and again after every
/// registry mutation.
pub trait FrontendFactory: Send + Sync {
    fn build(
        &self,
        plugins: &[Arc<dyn Plugin>],
        filters: &[Arc<dyn Filter>],
    ) -> Arc<dyn Frontend>;
}

/// Outcome of a successful pipeline run. A populated report does not
/// imply the template compiled cleanly: per-template faults are
/// delivered to the backend's `on_error`, not through this type.
#[derive(Debug, Default)]
pub struct CompileReport {
    pub warnings: Vec<StreamWarning>,
}

/// Tunables for the compiler service.
#[derive(Clone, Copy, Debug)]
pub struct CompilerOptions {
    /// Validate bracket well-formedness of the raw stream before the
    /// optimizer sees it.
    pub validate_structure: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            validate_structure: true,
        }
    }
}

/// The compiler service.
pub struct SlyCompiler {
    optimizer: Optimizer,
    options: CompilerOptions,
    factory: Box<dyn FrontendFactory>,
    plugins: PluginRegistry,
    filters: FilterRegistry,
    frontend: RwLock<Arc<dyn Frontend>>,
}

impl SlyCompiler {
    pub fn new(factory: impl FrontendFactory + 'static) -> Self {
        Self::with_options(factory, CompilerOptions::default())
    }

    pub fn with_options(factory: impl FrontendFactory + 'static, options: CompilerOptions) -> Self {
        let factory = Box::new(factory);
        let frontend = factory.build(&[], &[]);
        Self {
            optimizer: Optimizer::new(),
            options,
            factory,
            plugins: PluginRegistry::new(),
            filters: FilterRegistry::new(),
            frontend: RwLock::new(frontend),
        }
    }

    /// Compile one template, delivering the optimized command stream
    /// to `backend`.
    ///
    /// Synchronous and single-pass: the call returns once the frontend
    /// has finished driving the pipeline. Errors raised anywhere along
    /// the pipeline arrive at the backend's `on_error` exactly once;
    /// the `Err` variant here is reserved for misuse of the entry
    /// point itself.
    pub fn compile(
        &self,
        source: &str,
        backend: &mut dyn StreamHandler,
    ) -> Result<CompileReport, CompilerError> {
        if source.is_empty() {
            return Err(CompilerError::EmptySource);
        }

        let frontend = self
            .frontend
            .read()
            .expect("frontend publication poisoned")
            .clone();

        let mut chain = self.optimizer.chain(backend);
        if self.options.validate_structure {
            let mut optimized = PushStream::new();
            optimized.attach_boxed(chain);
            chain = StructureCheck.handler(optimized);
        }

        let mut stream = PushStream::new();
        stream.attach_boxed(chain);
        frontend.drive(source, &mut stream);
        // The frontend contract is exactly one termination signal;
        // close is idempotent, so completing on its behalf is safe.
        stream.close();

        Ok(CompileReport {
            warnings: stream.take_warnings(),
        })
    }

    /// Register a plugin and rebuild the frontend.
    pub fn register_plugin(&self, plugin: Arc<dyn Plugin>) {
        self.plugins.register(plugin);
        self.rebuild_frontend();
    }

    /// Unregister a plugin by name, rebuilding the frontend if the
    /// set changed.
    pub fn unregister_plugin(&self, name: &str) -> bool {
        let removed = self.plugins.unregister(name);
        if removed {
            self.rebuild_frontend();
        }
        removed
    }

    /// Register a filter and rebuild the frontend.
    pub fn register_filter(&self, filter: Arc<dyn Filter>) {
        self.filters.register(filter);
        self.rebuild_frontend();
    }

    /// Unregister a filter by name, rebuilding the frontend if the
    /// set changed.
    pub fn unregister_filter(&self, name: &str) -> bool {
        let removed = self.filters.unregister(name);
        if removed {
            self.rebuild_frontend();
        }
        removed
    }

    fn rebuild_frontend(&self) {
        let plugins = self.plugins.snapshot();
        let filters = self.filters.snapshot();
        let fresh = self.factory.build(&plugins, &filters);
        *self
            .frontend
            .write()
            .expect("frontend publication poisoned") = fresh;
    }
}
