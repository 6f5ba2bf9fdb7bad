//! Shape Classifier Domain Service
//!
//! Template modules export one of several shapes. `classify` inspects a
//! loaded `ModuleValue` once and tags it; `ModuleShape::into_adapter`
//! maps each tag to the uniform `RenderAdapter`.

use crate::domain::entities::{
    ClassDef, ModuleValue, RenderAdapter, RenderFn, Rendered, ShapeKind, TemplateObject,
};

/// A recognized template export shape
#[derive(Clone)]
pub enum ModuleShape {
    /// Text, bytes or a deferred value, rendered verbatim
    Literal(Rendered),
    /// A function used directly as the render operation
    Callable(RenderFn),
    /// A class whose prototype declares `data` or `render`
    ClassLike(ClassDef),
    /// An object exposing `data` or `render`
    DataObject(TemplateObject),
}

impl ModuleShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ModuleShape::Literal(_) => ShapeKind::Literal,
            ModuleShape::Callable(_) => ShapeKind::Callable,
            ModuleShape::ClassLike(_) => ShapeKind::ClassLike,
            ModuleShape::DataObject(_) => ShapeKind::DataObject,
        }
    }

    /// Build the render adapter. Class-like shapes are constructed here,
    /// exactly once per call.
    pub fn into_adapter(self) -> anyhow::Result<RenderAdapter> {
        let adapter = match self {
            ModuleShape::Literal(value) => RenderAdapter::literal(value),
            ModuleShape::Callable(render) => RenderAdapter::callable(render),
            ModuleShape::ClassLike(class) => {
                RenderAdapter::from_object(ShapeKind::ClassLike, class.construct()?).ensure_render()
            }
            ModuleShape::DataObject(object) => {
                RenderAdapter::from_object(ShapeKind::DataObject, object).ensure_render()
            }
        };
        Ok(adapter)
    }
}

impl std::fmt::Debug for ModuleShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleShape::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            ModuleShape::Callable(_) => f.write_str("Callable(..)"),
            ModuleShape::ClassLike(class) => f.debug_tuple("ClassLike").field(class).finish(),
            ModuleShape::DataObject(object) => f.debug_tuple("DataObject").field(object).finish(),
        }
    }
}

/// Classify a module export. `None` means it is not a template.
pub fn classify(value: ModuleValue) -> Option<ModuleShape> {
    match value {
        ModuleValue::Text(text) => Some(ModuleShape::Literal(Rendered::Text(text))),
        ModuleValue::Bytes(bytes) => Some(ModuleShape::Literal(Rendered::Bytes(bytes))),
        ModuleValue::Deferred(deferred) => Some(ModuleShape::Literal(Rendered::Deferred(deferred))),
        ModuleValue::Function(render) => Some(ModuleShape::Callable(render)),
        ModuleValue::Class(class) if class.declares_data() || class.declares_render() => {
            Some(ModuleShape::ClassLike(class))
        }
        ModuleValue::Object(object) if object.is_template_like() => {
            Some(ModuleShape::DataObject(object))
        }
        ModuleValue::Class(_) | ModuleValue::Object(_) | ModuleValue::Value(_) => None,
    }
}
