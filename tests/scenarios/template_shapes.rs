//! Every supported module export renders through the same interface.

use kiln::{ClassDef, Deferred, KilnError, ModuleValue, Rendered, TemplateObject};
use serde_json::{json, Value};

use crate::common::*;

fn render(site: &Site, relative: &str, data: Value) -> String {
    site.templates()
        .compile(None, &format!("./{relative}"))
        .unwrap()
        .expect("template renders")
        .render(&data)
        .unwrap()
        .into_text()
        .unwrap()
}

#[test]
fn registered_shapes_render() {
    let site = Site::new();
    site.register("string.11ty.js", || Ok(ModuleValue::from("<p>string</p>")));
    site.register("buffer.11ty.js", || Ok(ModuleValue::from(b"<p>buffer</p>".to_vec())));
    site.register("deferred.11ty.js", || {
        Ok(ModuleValue::Deferred(Deferred::new(|| Ok("<p>deferred</p>".to_string()))))
    });
    site.register("function.11ty.js", || {
        Ok(ModuleValue::function(|_, data| {
            Ok(Rendered::Text(format!("<p>{}</p>", data["name"].as_str().unwrap_or(""))))
        }))
    });
    site.register("class.11ty.js", || {
        Ok(ModuleValue::from(ClassDef::new(
            "Page",
            TemplateObject::new()
                .with_data(json!({"layout": "base.njk"}))
                .with_render(|this, _| {
                    Ok(Rendered::Text(format!(
                        "<p>{}</p>",
                        this.page().map(|p| p["url"].to_string()).unwrap_or_default()
                    )))
                }),
        )))
    });
    site.register("object.11ty.js", || {
        Ok(ModuleValue::from(
            TemplateObject::new().with_data(json!({"title": "data only"})),
        ))
    });

    let data = json!({"name": "kiln", "page": {"url": "/p/"}});
    assert_eq!(render(&site, "string.11ty.js", data.clone()), "<p>string</p>");
    assert_eq!(render(&site, "buffer.11ty.js", data.clone()), "<p>buffer</p>");
    assert_eq!(render(&site, "deferred.11ty.js", data.clone()), "<p>deferred</p>");
    assert_eq!(render(&site, "function.11ty.js", data.clone()), "<p>kiln</p>");
    assert_eq!(render(&site, "class.11ty.js", data.clone()), "<p>\"/p/\"</p>");
    assert_eq!(render(&site, "object.11ty.js", data), "");
}

#[test]
fn unregistered_file_renders_its_contents() {
    let site = Site::new();
    site.write("legacy.11ty.js", "<p>raw</p>");

    assert_eq!(render(&site, "legacy.11ty.js", json!({})), "<p>raw</p>");
}

#[test]
fn declared_data_is_extracted() {
    let site = Site::new();
    site.register("page.11ty.js", || {
        Ok(ModuleValue::from(ClassDef::new(
            "Page",
            TemplateObject::new().with_computed_data(|_| Ok(json!({"tags": ["post"]}))),
        )))
    });
    let templates = site.templates();

    let data = templates.extract_data("./page.11ty.js").unwrap().unwrap();
    assert_eq!(data.get("tags"), Some(&json!(["post"])));
}

#[test]
fn non_template_export_is_rejected() {
    let site = Site::new();
    site.register("config.js", || Ok(ModuleValue::Value(json!({"not": "a template"}))));

    let err = site.templates().resolve("./config.js").unwrap_err();
    assert!(matches!(err, KilnError::TemplateNotDefined { ref path } if path == "./config.js"));
    assert!(err.to_string().contains("does the module export a template?"));
}
