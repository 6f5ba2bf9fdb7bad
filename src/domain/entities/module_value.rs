//! Loaded module values
//!
//! A `ModuleValue` is whatever a module loader hands back for a template
//! file. Template modules come in several export shapes; the shape
//! classifier decides which of them can be rendered.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::render_adapter::RenderAdapter;

/// Render operation. Receives the adapter as receiver plus the data context.
pub type RenderFn = Arc<dyn Fn(&RenderAdapter, &Value) -> anyhow::Result<Rendered> + Send + Sync>;

/// Named helper function, bound to the adapter it was injected into.
pub type HelperFn = Arc<dyn Fn(&RenderAdapter, &[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// Computed `data` declaration.
pub type DataFn = Arc<dyn Fn(&RenderAdapter) -> anyhow::Result<Value> + Send + Sync>;

/// Builds the own fields of a class-like template instance.
pub type Constructor = Arc<dyn Fn() -> anyhow::Result<TemplateObject> + Send + Sync>;

/// Box a closure as a `RenderFn`.
pub fn render_fn(
    f: impl Fn(&RenderAdapter, &Value) -> anyhow::Result<Rendered> + Send + Sync + 'static,
) -> RenderFn {
    Arc::new(f)
}

/// A value that is produced later, when the caller resolves it.
#[derive(Clone)]
pub struct Deferred(Arc<dyn Fn() -> anyhow::Result<String> + Send + Sync>);

impl Deferred {
    pub fn new(f: impl Fn() -> anyhow::Result<String> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A deferred value that is already known.
    pub fn ready(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move || Ok(text.clone()))
    }

    pub fn resolve(&self) -> anyhow::Result<String> {
        (self.0)()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

/// Output of a render call.
#[derive(Debug, Clone)]
pub enum Rendered {
    Text(String),
    Bytes(Vec<u8>),
    Deferred(Deferred),
}

impl Rendered {
    /// Decode byte output to text; text and deferred values pass through.
    pub fn normalize(self) -> Self {
        match self {
            Rendered::Bytes(bytes) => Rendered::Text(String::from_utf8_lossy(&bytes).into_owned()),
            other => other,
        }
    }

    /// The text, if this output is already available as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Rendered::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Resolve into final text, waiting on deferred output.
    pub fn into_text(self) -> anyhow::Result<String> {
        match self {
            Rendered::Text(text) => Ok(text),
            Rendered::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Rendered::Deferred(deferred) => deferred.resolve(),
        }
    }
}

impl From<&str> for Rendered {
    fn from(text: &str) -> Self {
        Rendered::Text(text.to_string())
    }
}

impl From<String> for Rendered {
    fn from(text: String) -> Self {
        Rendered::Text(text)
    }
}

impl From<Vec<u8>> for Rendered {
    fn from(bytes: Vec<u8>) -> Self {
        Rendered::Bytes(bytes)
    }
}

/// Declared template data: a static payload or a function producing one.
#[derive(Clone)]
pub enum DataSource {
    Static(Value),
    Computed(DataFn),
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Static(value) => f.debug_tuple("Static").field(value).finish(),
            DataSource::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A plain object export, or the instance produced by a class export.
#[derive(Clone, Default)]
pub struct TemplateObject {
    pub render: Option<RenderFn>,
    pub data: Option<DataSource>,
    pub page: Option<Value>,
    pub fields: Map<String, Value>,
}

impl TemplateObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_render(
        mut self,
        f: impl Fn(&RenderAdapter, &Value) -> anyhow::Result<Rendered> + Send + Sync + 'static,
    ) -> Self {
        self.render = Some(render_fn(f));
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(DataSource::Static(data));
        self
    }

    pub fn with_computed_data(
        mut self,
        f: impl Fn(&RenderAdapter) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.data = Some(DataSource::Computed(Arc::new(f)));
        self
    }

    pub fn with_page(mut self, page: Value) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Whether the object exposes either part of the template capability.
    pub fn is_template_like(&self) -> bool {
        self.render.is_some() || self.data.is_some()
    }
}

impl fmt::Debug for TemplateObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateObject")
            .field("render", &self.render.is_some())
            .field("data", &self.data)
            .field("page", &self.page)
            .field("fields", &self.fields)
            .finish()
    }
}

/// A constructable export: a prototype plus a constructor for own fields.
#[derive(Clone)]
pub struct ClassDef {
    name: String,
    prototype: TemplateObject,
    constructor: Constructor,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, prototype: TemplateObject) -> Self {
        Self {
            name: name.into(),
            prototype,
            constructor: Arc::new(|| anyhow::Ok(TemplateObject::default())),
        }
    }

    pub fn with_constructor(
        mut self,
        f: impl Fn() -> anyhow::Result<TemplateObject> + Send + Sync + 'static,
    ) -> Self {
        self.constructor = Arc::new(f);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declares_data(&self) -> bool {
        self.prototype.data.is_some()
    }

    pub fn declares_render(&self) -> bool {
        self.prototype.render.is_some()
    }

    /// Run the constructor; own members shadow prototype members.
    pub fn construct(&self) -> anyhow::Result<TemplateObject> {
        let own = (self.constructor)()?;
        let mut fields = self.prototype.fields.clone();
        fields.extend(own.fields);
        Ok(TemplateObject {
            render: own.render.or_else(|| self.prototype.render.clone()),
            data: own.data.or_else(|| self.prototype.data.clone()),
            page: own.page.or_else(|| self.prototype.page.clone()),
            fields,
        })
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("prototype", &self.prototype)
            .finish()
    }
}

/// The default export of a loaded template module.
#[derive(Clone)]
pub enum ModuleValue {
    Text(String),
    Bytes(Vec<u8>),
    Deferred(Deferred),
    Function(RenderFn),
    Class(ClassDef),
    Object(TemplateObject),
    /// Any other export (numbers, arrays, null, ...)
    Value(Value),
}

impl ModuleValue {
    pub fn function(
        f: impl Fn(&RenderAdapter, &Value) -> anyhow::Result<Rendered> + Send + Sync + 'static,
    ) -> Self {
        ModuleValue::Function(render_fn(f))
    }

    /// Human-readable name of the export kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ModuleValue::Text(_) => "string",
            ModuleValue::Bytes(_) => "buffer",
            ModuleValue::Deferred(_) => "deferred",
            ModuleValue::Function(_) => "function",
            ModuleValue::Class(_) => "class",
            ModuleValue::Object(_) => "object",
            ModuleValue::Value(value) => json_kind(value),
        }
    }
}

impl fmt::Debug for ModuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ModuleValue::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            ModuleValue::Deferred(deferred) => fmt::Debug::fmt(deferred, f),
            ModuleValue::Function(_) => f.write_str("Function(..)"),
            ModuleValue::Class(class) => fmt::Debug::fmt(class, f),
            ModuleValue::Object(object) => fmt::Debug::fmt(object, f),
            ModuleValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl From<&str> for ModuleValue {
    fn from(text: &str) -> Self {
        ModuleValue::Text(text.to_string())
    }
}

impl From<String> for ModuleValue {
    fn from(text: String) -> Self {
        ModuleValue::Text(text)
    }
}

impl From<Vec<u8>> for ModuleValue {
    fn from(bytes: Vec<u8>) -> Self {
        ModuleValue::Bytes(bytes)
    }
}

impl From<TemplateObject> for ModuleValue {
    fn from(object: TemplateObject) -> Self {
        ModuleValue::Object(object)
    }
}

impl From<ClassDef> for ModuleValue {
    fn from(class: ClassDef) -> Self {
        ModuleValue::Class(class)
    }
}

/// JSON type name (`null`, `boolean`, `number`, `string`, `array`, `object`).
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
