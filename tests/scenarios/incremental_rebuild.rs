//! Editing a shared script rebuilds exactly the templates that import it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kiln::{DependencyResolver, ModuleValue, Rendered, ResolveError, ResolveOptions, WatchSet};
use serde_json::json;

use crate::common::*;

fn versioned_page(site: &Site, relative: &str, label: &'static str) -> Arc<AtomicUsize> {
    let evaluations = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&evaluations);
    site.register(relative, move || {
        let version = seen.fetch_add(1, Ordering::SeqCst);
        Ok(ModuleValue::function(move |_, _| {
            Ok(Rendered::Text(format!("{label} v{version}")))
        }))
    });
    evaluations
}

fn render(templates: &kiln::TemplateModules, path: &str) -> String {
    templates
        .compile(None, path)
        .unwrap()
        .unwrap()
        .render(&json!({}))
        .unwrap()
        .into_text()
        .unwrap()
}

#[test]
fn shared_dependency_change_rebuilds_dependents() {
    let site = Site::new();
    site.write("page.11ty.js", PAGE_IMPORTING_HELPER);
    site.write("about.11ty.js", STANDALONE_PAGE);
    site.write("_includes/helper.js", HELPER_IMPORTING_FMT);
    site.write("_includes/fmt.js", FMT_LEAF);
    site.imports("page.11ty.js", &["_includes/helper.js"]);
    site.imports("_includes/helper.js", &["_includes/fmt.js"]);
    let page_evaluations = versioned_page(&site, "page.11ty.js", "page");
    let about_evaluations = versioned_page(&site, "about.11ty.js", "about");

    let mut cycle = site.rebuild_cycle();
    let entries = vec!["./page.11ty.js", "./about.11ty.js"];
    cycle.watch_set_mut().add(entries.clone());
    cycle.watch_set_mut().add_and_make_glob("_includes");
    cycle.watch_set_mut().add_dependencies(entries, None).unwrap();

    assert_eq!(
        cycle.watch_set().targets(),
        vec![
            "./page.11ty.js",
            "./about.11ty.js",
            "./_includes/**",
            "./_includes/helper.js",
            "./_includes/fmt.js",
        ]
    );
    assert_eq!(
        cycle.watch_set().dependencies(),
        vec!["./_includes/helper.js", "./_includes/fmt.js"]
    );

    let templates = Arc::clone(cycle.templates());
    assert_eq!(render(&templates, "./page.11ty.js"), "page v0");
    assert_eq!(render(&templates, "./about.11ty.js"), "about v0");

    site.write("_includes/fmt.js", "export const upper = (s) => s;\n");
    let report = cycle.apply(&["./_includes/fmt.js"]).unwrap();

    assert_eq!(report.dependency_changes, vec!["./_includes/fmt.js"]);
    assert_eq!(report.invalidated, vec!["./page.11ty.js"]);
    assert!(report.new_targets.is_empty());

    assert_eq!(render(&templates, "./page.11ty.js"), "page v1");
    assert_eq!(render(&templates, "./about.11ty.js"), "about v0");
    assert_eq!(page_evaluations.load(Ordering::SeqCst), 2);
    assert_eq!(about_evaluations.load(Ordering::SeqCst), 1);
}

#[test]
fn new_import_joins_the_watch_set() {
    let site = Site::new();
    site.write("page.11ty.js", PAGE_IMPORTING_HELPER);
    site.write("_includes/helper.js", HELPER_IMPORTING_FMT);
    site.write("_includes/fmt.js", FMT_LEAF);
    site.imports("page.11ty.js", &["_includes/helper.js"]);
    site.imports("_includes/helper.js", &["_includes/fmt.js"]);
    versioned_page(&site, "page.11ty.js", "page");

    let mut cycle = site.rebuild_cycle();
    cycle.watch_set_mut().add("./page.11ty.js");
    cycle
        .watch_set_mut()
        .add_dependencies("./page.11ty.js", None)
        .unwrap();

    site.write("_includes/extra.js", FMT_LEAF);
    site.write(
        "_includes/helper.js",
        &format!("{HELPER_IMPORTING_FMT}import \"./extra.js\";\n"),
    );
    site.imports("_includes/helper.js", &["_includes/extra.js"]);
    let report = cycle.apply(&["./_includes/helper.js"]).unwrap();

    assert_eq!(report.new_targets, vec!["./_includes/extra.js"]);
    assert!(cycle
        .watch_set()
        .is_javascript_dependency("./_includes/extra.js"));
    assert_eq!(
        cycle.watch_set().dependents_of("./_includes/extra.js"),
        vec!["./page.11ty.js", "./_includes/helper.js"]
    );
}

#[test]
fn disabled_dependency_watching_only_watches_entries() {
    let mut config = kiln::Config::default();
    config.watch.javascript_dependencies = false;
    let site = Site::with_config(config);
    site.write("page.11ty.js", PAGE_IMPORTING_HELPER);
    site.write("_includes/helper.js", HELPER_IMPORTING_FMT);
    site.imports("page.11ty.js", &["_includes/helper.js"]);

    let mut watch_set = site.watch_set();
    watch_set.add("./page.11ty.js");
    watch_set.add_dependencies("./page.11ty.js", None).unwrap();

    assert_eq!(watch_set.targets(), vec!["./page.11ty.js"]);
    assert!(watch_set.dependencies().is_empty());
}

/// Analyzer that cannot parse one particular file.
struct RejectsBroken(Arc<kiln::ManifestResolver>);

impl DependencyResolver for RejectsBroken {
    fn resolve(&self, entry: &Path, options: &ResolveOptions) -> Result<Vec<PathBuf>, ResolveError> {
        if entry.ends_with("broken.js") {
            return Err(ResolveError::Parse {
                path: entry.to_path_buf(),
                message: "Unexpected token (3:14)".to_string(),
            });
        }
        self.0.resolve(entry, options)
    }
}

#[test]
fn broken_entry_fails_analysis_without_partial_targets() {
    let site = Site::new();
    site.write("page.11ty.js", PAGE_IMPORTING_HELPER);
    site.write("_includes/helper.js", FMT_LEAF);
    site.write("broken.js", "module.exports = {");
    site.imports("page.11ty.js", &["_includes/helper.js"]);

    let mut watch_set = WatchSet::new(
        site.paths(),
        Arc::new(RejectsBroken(Arc::clone(&site.manifest))),
        site.module_loader(),
    );
    let err = watch_set
        .add_dependencies(vec!["./page.11ty.js", "./broken.js"], None)
        .unwrap_err();

    assert!(matches!(err, kiln::KilnError::DependencyResolution { .. }));
    assert!(err.to_string().contains("Unexpected token"));
    assert!(watch_set.targets().is_empty());
}

fn page_reading_its_source(site: &Site, relative: &str) {
    let file = site.path(relative);
    site.register(relative, move || {
        let source = std::fs::read_to_string(&file)?;
        if source.trim() == "bad" {
            return Ok(ModuleValue::Value(json!(42)));
        }
        Ok(ModuleValue::Text(source))
    });
}

#[test]
fn fixed_export_recovers_on_next_cycle() {
    let site = Site::new();
    site.write("page.11ty.js", "bad");
    page_reading_its_source(&site, "page.11ty.js");
    let mut cycle = site.rebuild_cycle();
    cycle.watch_set_mut().add("./page.11ty.js");

    assert!(matches!(
        cycle.templates().resolve("./page.11ty.js").unwrap_err(),
        kiln::KilnError::TemplateNotDefined { .. }
    ));

    site.write("page.11ty.js", "good");
    let report = cycle.apply(&["./page.11ty.js"]).unwrap();

    assert!(report.invalidated.is_empty());
    assert_eq!(render(cycle.templates(), "./page.11ty.js"), "good");
}

#[test]
fn invalidate_during_load_yields_fresh_module() {
    let site = Site::new();
    site.write("slow.11ty.js", "v1");
    let file = site.path("slow.11ty.js");
    site.register("slow.11ty.js", move || {
        let source = std::fs::read_to_string(&file)?;
        std::thread::sleep(std::time::Duration::from_millis(300));
        Ok(ModuleValue::Text(source))
    });
    let templates = site.templates();

    let in_flight = {
        let templates = Arc::clone(&templates);
        std::thread::spawn(move || templates.resolve("./slow.11ty.js").map(|_| ()))
    };
    std::thread::sleep(std::time::Duration::from_millis(100));
    site.write("slow.11ty.js", "v2");
    templates.invalidate("./slow.11ty.js");
    in_flight.join().unwrap().unwrap();

    assert_eq!(render(&templates, "./slow.11ty.js"), "v2");
}
