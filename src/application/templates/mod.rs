//! Template module cache
//!
//! `TemplateModules` turns template files into memoized `RenderAdapter`s:
//! load through the module loader, classify the export once, keep the
//! adapter until the file is invalidated. `compile` hands out a
//! `CompiledTemplate` that carries page identity and helpers into each
//! render call.
//!
//! Resolution is `&self` and safe to share across threads. Each path has
//! its own slot; concurrent resolves of the same uncached path wait on the
//! slot, so a module is loaded at most once per slot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::entities::{
    json_kind, HelperRegistry, ModuleValue, RenderAdapter, Rendered, SharedAdapter,
};
use crate::domain::ports::ModuleLoader;
use crate::domain::services::classify;
use crate::domain::value_objects::ProjectPaths;
use crate::error::{KilnError, KilnResult};

type Slot = Arc<Mutex<Option<SharedAdapter>>>;

/// Memoized template adapters keyed by target path
pub struct TemplateModules {
    loader: Arc<dyn ModuleLoader>,
    paths: ProjectPaths,
    helpers: HelperRegistry,
    slots: Mutex<HashMap<String, Slot>>,
}

impl TemplateModules {
    pub fn new(paths: ProjectPaths, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            paths,
            helpers: HelperRegistry::new(),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Helpers injected into every compiled template.
    pub fn with_helpers(mut self, helpers: HelperRegistry) -> Self {
        self.helpers = helpers;
        self
    }

    pub fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    fn key(&self, input_path: &str) -> String {
        self.paths.to_target(&self.paths.absolute(input_path))
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.entry(key.to_string()).or_default())
    }

    /// The adapter for `input_path`, loading and classifying on first use.
    pub fn resolve(&self, input_path: &str) -> KilnResult<SharedAdapter> {
        let key = self.key(input_path);
        let slot = self.slot(&key);
        let mut cached = slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(adapter) = cached.as_ref() {
            return Ok(Arc::clone(adapter));
        }

        let absolute = self.paths.absolute(input_path);
        let value = self.loader.load(&absolute)?;
        let kind = value.kind_name();
        let adapter = match self.adapt(input_path, value) {
            Ok(adapter) => adapter,
            Err(err) => {
                // a rejected module must be re-evaluated once the file is fixed
                self.loader.forget(&absolute);
                return Err(err);
            }
        };

        debug!(path = %key, export = kind, "template module resolved");
        *cached = Some(Arc::clone(&adapter));
        Ok(adapter)
    }

    fn adapt(&self, input_path: &str, value: ModuleValue) -> KilnResult<SharedAdapter> {
        let shape = classify(value).ok_or_else(|| KilnError::TemplateNotDefined {
            path: input_path.to_string(),
        })?;
        let adapter = shape.into_adapter().map_err(|source| KilnError::Render {
            path: input_path.to_string(),
            source,
        })?;
        Ok(adapter.into_shared())
    }

    /// Drop the memoized adapter and make the loader forget the module.
    pub fn invalidate(&self, input_path: &str) {
        let key = self.key(input_path);
        let removed = self
            .slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&key)
            .is_some();
        self.loader.forget(&self.paths.absolute(input_path));
        if removed {
            debug!(path = %key, "template module invalidated");
        }
    }

    /// Whether an adapter for `input_path` is currently memoized.
    pub fn is_cached(&self, input_path: &str) -> bool {
        let key = self.key(input_path);
        let slot = match self
            .slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            Some(slot) => Arc::clone(slot),
            None => return false,
        };
        let cached = slot.lock().unwrap_or_else(|e| e.into_inner());
        cached.is_some()
    }

    /// Declared data of the template at `input_path`.
    ///
    /// Computed data is evaluated with the adapter as receiver. Anything
    /// but a key/value object is rejected.
    pub fn extract_data(&self, input_path: &str) -> KilnResult<Option<Map<String, Value>>> {
        let adapter = self.resolve(input_path)?;
        let adapter = adapter.lock().unwrap_or_else(|e| e.into_inner());
        let data = adapter
            .declared_data()
            .map_err(|source| KilnError::Render {
                path: input_path.to_string(),
                source,
            })?;

        match data {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(KilnError::InvalidDataFormat {
                path: input_path.to_string(),
                found: json_kind(&other),
            }),
        }
    }

    /// Prepare a render function.
    ///
    /// Non-empty inline `source` (e.g. a permalink expression) renders as a
    /// literal and never touches the cache. Otherwise the memoized adapter
    /// for `input_path` is used. `None` when there is nothing to render.
    pub fn compile(
        &self,
        source: Option<&str>,
        input_path: &str,
    ) -> KilnResult<Option<CompiledTemplate>> {
        let adapter = match source.filter(|s| !s.is_empty()) {
            Some(inline) => RenderAdapter::literal(Rendered::Text(inline.to_string())).into_shared(),
            None => self.resolve(input_path)?,
        };

        let renderable = adapter
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .has_render();
        if !renderable {
            return Ok(None);
        }

        Ok(Some(CompiledTemplate {
            path: input_path.to_string(),
            adapter,
            helpers: self.helpers.clone(),
        }))
    }
}

impl std::fmt::Debug for TemplateModules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("TemplateModules")
            .field("root", &self.paths.root())
            .field("helpers", &self.helpers)
            .field("slots", &slots.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A render function bound to one template adapter
#[derive(Clone)]
pub struct CompiledTemplate {
    path: String,
    adapter: SharedAdapter,
    helpers: HelperRegistry,
}

impl CompiledTemplate {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn adapter(&self) -> &SharedAdapter {
        &self.adapter
    }

    /// Render with `data`.
    ///
    /// The adapter's `page` is replaced by `data.page` unless it already
    /// carries a URL. Helpers are bound before the call and byte output is
    /// decoded to text.
    pub fn render(&self, data: &Value) -> KilnResult<Rendered> {
        let mut adapter = self.adapter.lock().unwrap_or_else(|e| e.into_inner());

        if !adapter.page_has_url() {
            adapter.set_page(data.get("page").cloned());
        }
        adapter.inject_helpers(&self.helpers);

        adapter
            .render(data)
            .map(Rendered::normalize)
            .map_err(|source| KilnError::Render {
                path: self.path.clone(),
                source,
            })
    }
}

impl std::fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("path", &self.path)
            .field("helpers", &self.helpers)
            .finish()
    }
}
