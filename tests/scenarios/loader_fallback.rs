//! Module loading falls back to raw file contents according to config.

use kiln::{Config, FallbackPolicy, KilnError, ModuleLoadError, StrategyError};
use serde_json::json;

use crate::common::*;

fn site_with_broken_module(config: Config) -> Site {
    let site = Site::with_config(config);
    site.write("broken.11ty.js", "<p>raw fallback</p>");
    site.register("broken.11ty.js", || {
        anyhow::bail!("ReferenceError: window is not defined")
    });
    site
}

#[test]
fn evaluation_failure_falls_back_by_default() {
    let site = site_with_broken_module(Config::default());

    let out = site
        .templates()
        .compile(None, "./broken.11ty.js")
        .unwrap()
        .unwrap()
        .render(&json!({}))
        .unwrap();
    assert_eq!(out.as_text(), Some("<p>raw fallback</p>"));
}

#[test]
fn project_config_can_surface_evaluation_errors() {
    let scratch = Site::new();
    scratch.write("kiln.toml", "[modules]\nfallback = \"unsupported-only\"\n");
    let config = Config::load(&scratch.path("kiln.toml")).unwrap();
    assert_eq!(config.modules.fallback, FallbackPolicy::UnsupportedOnly);

    let site = site_with_broken_module(config);
    let err = site.templates().resolve("./broken.11ty.js").unwrap_err();

    match err {
        KilnError::ModuleLoad(ModuleLoadError::Primary(StrategyError::Evaluation {
            source, ..
        })) => assert!(source.to_string().contains("ReferenceError")),
        other => panic!("expected evaluation error, got {other:?}"),
    }
}

#[test]
fn missing_module_exhausts_both_tiers() {
    let site = Site::new();

    let err = site.templates().resolve("./nowhere.11ty.js").unwrap_err();
    assert!(matches!(
        err,
        KilnError::ModuleLoad(ModuleLoadError::Exhausted { .. })
    ));
    assert!(err.to_string().contains("legacy loader also failed"));
}
