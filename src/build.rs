//! Site building orchestration.
//!
//! Runs one independent pipeline per blueprint and writes its page and
//! assets. Component caching and asset deduplication never cross pages.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     └── for each blueprint (sorted) ──► build_blueprint()
//!             │
//!             ├── blueprint::parse()       → BlueprintNode tree
//!             ├── Registry::load()         → every component, fail fast
//!             ├── template::assemble()     → html + css/js files
//!             └── Store::write_output()    → <page>.html, css/, js/, assets/
//! ```
//!
//! The first failing blueprint aborts the whole build.

use crate::{
    blueprint::{self, BlueprintNode},
    component::Registry,
    config::SiteConfig,
    log,
    logger::ProgressBar,
    storage::{FsStore, Store},
    template::{self, ProcessResult, Processor},
    utils::{minify::minify_html, slug::asset_prefix},
};
use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Build every blueprint under the configured source directory.
///
/// Returns the number of pages written.
/// If `config.build.clean` is true, removes the output directory first.
pub fn build_site(config: &SiteConfig) -> Result<usize> {
    let output = &config.build.output;

    if config.build.clean && output.exists() {
        fs::remove_dir_all(output).with_context(|| {
            format!("Failed to clear output directory: {}", output.display())
        })?;
    }

    let store = FsStore::new(&config.build.source, output);
    let blueprints = store.list_blueprints().context("finding blueprints")?;

    if blueprints.is_empty() {
        log!("warn"; "no blueprints found in {}", config.build.source.join("blueprints").display());
        return Ok(0);
    }

    log!("build"; "assembling {} pages...", blueprints.len());
    let progress = ProgressBar::new("pages", blueprints.len());

    let mut components = 0;
    for (path, page) in &blueprints {
        let result = build_blueprint(&store, path, page, config)
            .with_context(|| format!("processing blueprint {}", path.display()))?;
        components += result.components.len();
        progress.inc();
    }

    progress.finish();
    log!(
        "build";
        "{} pages, {} components, output in {}",
        blueprints.len(),
        components,
        store.target().display()
    );

    Ok(blueprints.len())
}

/// Parse, load, render and write a single blueprint.
pub fn build_blueprint<S: Store + ?Sized>(
    store: &S,
    path: &Path,
    page: &Path,
    config: &SiteConfig,
) -> Result<ProcessResult> {
    let source = store.read_blueprint(path).context("reading blueprint")?;
    let tree = blueprint::parse(&String::from_utf8_lossy(&source)).context("parsing blueprint")?;

    let mut registry = Registry::new(store);
    load_components(&mut registry, &tree).context("loading components")?;

    let prefix = asset_prefix(page, &config.build.path_prefix);
    let result = match template::assemble(Processor::new(&registry), &tree, &prefix) {
        Ok(result) => result,
        Err(err) => {
            log!(
                "warn";
                "{}: {} errors, partial page of {} bytes discarded",
                path.display(),
                err.errors.len(),
                err.partial.html.len()
            );
            return Err(err).context("processing template");
        }
    };

    let files = output_files(page, &result, config.build.minify);
    store.write_output(&files).context("writing output")?;

    log!(
        "blueprint";
        "{} -> {} [{}]",
        path.display(),
        page_file(page).display(),
        result.components.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    );

    Ok(result)
}

/// Load every component the tree references before rendering starts.
fn load_components<S: Store + ?Sized>(
    registry: &mut Registry<'_, S>,
    tree: &BlueprintNode,
) -> Result<()> {
    tree.walk(&mut |node| {
        if !node.is_root() {
            registry
                .load(&node.path)
                .with_context(|| format!("loading component {}", node.path))?;
        }
        Ok(())
    })
}

/// `docs/intro` → `docs/intro.html`
fn page_file(page: &Path) -> PathBuf {
    let mut name = page.as_os_str().to_owned();
    name.push(".html");
    PathBuf::from(name)
}

/// Directory an asset file is written to, by extension.
fn asset_dir(name: &str) -> &'static str {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some("css") => "css",
        Some("js") => "js",
        _ => "assets",
    }
}

/// Map a rendered page to output-relative file paths.
fn output_files(page: &Path, result: &ProcessResult, minify: bool) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files: BTreeMap<PathBuf, Vec<u8>> = result
        .files
        .iter()
        .map(|(name, content)| (Path::new(asset_dir(name)).join(name), content.clone()))
        .collect();

    files.insert(page_file(page), minify_html(&result.html, minify).into_owned());
    files
}

// ============================================================================
// Tests
// ============================================================================
