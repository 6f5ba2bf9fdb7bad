//! Render adapter - the uniform template capability
//!
//! Every recognized module shape is normalized into a `RenderAdapter`.
//! The adapter carries the render operation, optional declared data, the
//! mutable `page` identity injected at render time, and helper functions
//! bound to it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use super::module_value::{render_fn, DataSource, HelperFn, RenderFn, Rendered, TemplateObject};

/// A memoized adapter shared between the cache and compiled render functions.
pub type SharedAdapter = Arc<Mutex<RenderAdapter>>;

/// Which export shape an adapter was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Literal,
    Callable,
    ClassLike,
    DataObject,
}

/// Registry of helper functions made available to every template.
#[derive(Clone, Default)]
pub struct HelperRegistry {
    helpers: BTreeMap<String, HelperFn>,
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&RenderAdapter, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.helpers.insert(name.into(), Arc::new(f));
        self
    }

    pub fn with(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&RenderAdapter, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.register(name, f);
        self
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HelperFn)> {
        self.helpers.iter()
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.helpers.keys()).finish()
    }
}

/// Normalized, render-capable template instance.
pub struct RenderAdapter {
    kind: ShapeKind,
    render: Option<RenderFn>,
    data: Option<DataSource>,
    page: Option<Value>,
    fields: Map<String, Value>,
    helpers: BTreeMap<String, HelperFn>,
}

impl RenderAdapter {
    /// Adapter whose render ignores its input and always yields `value`.
    pub fn literal(value: Rendered) -> Self {
        Self {
            kind: ShapeKind::Literal,
            render: Some(render_fn(move |_, _| Ok(value.clone()))),
            data: None,
            page: None,
            fields: Map::new(),
            helpers: BTreeMap::new(),
        }
    }

    pub fn callable(render: RenderFn) -> Self {
        Self {
            kind: ShapeKind::Callable,
            render: Some(render),
            data: None,
            page: None,
            fields: Map::new(),
            helpers: BTreeMap::new(),
        }
    }

    /// Adapter over an object-like export, exactly as exported.
    pub fn from_object(kind: ShapeKind, object: TemplateObject) -> Self {
        Self {
            kind,
            render: object.render,
            data: object.data,
            page: object.page,
            fields: object.fields,
            helpers: BTreeMap::new(),
        }
    }

    /// Give data-only shapes a render that produces an empty string.
    pub fn ensure_render(mut self) -> Self {
        if self.render.is_none() {
            self.render = Some(render_fn(|_, _| Ok(Rendered::Text(String::new()))));
        }
        self
    }

    pub fn into_shared(self) -> SharedAdapter {
        Arc::new(Mutex::new(self))
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn has_render(&self) -> bool {
        self.render.is_some()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn page(&self) -> Option<&Value> {
        self.page.as_ref()
    }

    pub fn set_page(&mut self, page: Option<Value>) {
        self.page = page;
    }

    /// Whether the current page identity has a URL assigned.
    pub fn page_has_url(&self) -> bool {
        match self.page.as_ref().and_then(|page| page.get("url")) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(url)) => !url.is_empty(),
            Some(_) => true,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn has_helper(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    /// Bind every registered helper to this adapter, except one named `page`.
    pub fn inject_helpers(&mut self, registry: &HelperRegistry) {
        for (name, helper) in registry.iter() {
            if name == "page" {
                continue;
            }
            self.helpers.insert(name.clone(), Arc::clone(helper));
        }
    }

    /// Call a bound helper with this adapter as receiver.
    pub fn call_helper(&self, name: &str, args: &[Value]) -> anyhow::Result<Value> {
        match self.helpers.get(name) {
            Some(helper) => helper(self, args),
            None => anyhow::bail!("no helper named `{name}`"),
        }
    }

    /// Invoke the render operation with this adapter as receiver.
    pub fn render(&self, data: &Value) -> anyhow::Result<Rendered> {
        match &self.render {
            Some(render) => render(self, data),
            None => anyhow::bail!("template has no render operation"),
        }
    }

    /// Evaluate declared data, if any.
    pub fn declared_data(&self) -> anyhow::Result<Option<Value>> {
        match &self.data {
            None => Ok(None),
            Some(DataSource::Static(value)) => Ok(Some(value.clone())),
            Some(DataSource::Computed(f)) => f(self).map(Some),
        }
    }
}

impl fmt::Debug for RenderAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderAdapter")
            .field("kind", &self.kind)
            .field("render", &self.render.is_some())
            .field("data", &self.data)
            .field("page", &self.page)
            .field("helpers", &self.helpers.keys().collect::<Vec<_>>())
            .finish()
    }
}
