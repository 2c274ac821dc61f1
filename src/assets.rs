//! Page asset collection.
//!
//! Every component visited while rendering a page contributes its stylesheet
//! and scripts here. Content is identified by its blake3 hash:
//!
//! - CSS from all components is merged into a single `styles.css`, each
//!   distinct stylesheet once, in first-seen order.
//! - JS files stay separate. Identical content is stored once but keeps
//!   every name it was contributed under, so each name still gets a file
//!   and a `<script>` tag.

use crate::component::Component;
use crate::utils::slug::sanitize_file_name;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Merged stylesheet file name
pub const STYLESHEET: &str = "styles.css";

/// Hex-encoded blake3 hash of `content`.
pub fn content_hash(content: &[u8]) -> String {
    hex::encode(blake3::hash(content).as_bytes())
}

/// One distinct script body and the names it is linked under.
#[derive(Debug)]
struct Script {
    content: Vec<u8>,
    names: Vec<String>,
}

/// Asset pool for a single page.
#[derive(Debug, Default)]
pub struct AssetManager {
    css: FxHashMap<String, Vec<u8>>,
    css_order: Vec<String>,
    js: FxHashMap<String, Script>,
    js_order: Vec<String>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component's stylesheet and scripts to the pool.
    pub fn ingest(&mut self, component: &Component) {
        if !component.styles.is_empty() {
            let hash = content_hash(&component.styles);
            if !self.css.contains_key(&hash) {
                self.css.insert(hash.clone(), component.styles.clone());
                self.css_order.push(hash);
            }
        }

        let prefix = sanitize_file_name(&component.path);
        for (file, content) in &component.scripts {
            let base = file.strip_suffix(".js").unwrap_or(file);
            let name = sanitize_file_name(&format!("{prefix}-{base}"));
            let hash = content_hash(content);

            match self.js.get_mut(&hash) {
                Some(script) => {
                    if !script.names.contains(&name) {
                        script.names.push(name);
                    }
                }
                None => {
                    self.js.insert(
                        hash.clone(),
                        Script {
                            content: content.clone(),
                            names: vec![name],
                        },
                    );
                    self.js_order.push(hash);
                }
            }
        }
    }

    /// Script output names in first-contribution order.
    fn script_names(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.js_order
            .iter()
            .filter_map(|hash| self.js.get(hash))
            .flat_map(|script| {
                script
                    .names
                    .iter()
                    .map(|name| (name.as_str(), script.content.as_slice()))
            })
    }

    /// Stylesheet link and script tags, hrefs relative to `prefix`.
    ///
    /// Either string is empty when the page has no such assets.
    pub fn tags(&self, prefix: &str) -> (String, String) {
        let styles = if self.css.is_empty() {
            String::new()
        } else {
            format!(r#"<link rel="stylesheet" href="{prefix}css/{STYLESHEET}">"#)
        };

        let scripts = self
            .script_names()
            .map(|(name, _)| format!(r#"<script src="{prefix}js/{name}.js"></script>"#))
            .collect::<Vec<_>>()
            .join("\n");

        (styles, scripts)
    }

    /// Output files: the merged stylesheet plus one file per script name.
    pub fn files(&self) -> BTreeMap<String, Vec<u8>> {
        let mut files = BTreeMap::new();

        if !self.css.is_empty() {
            let mut merged = Vec::new();
            for content in self.css_order.iter().filter_map(|hash| self.css.get(hash)) {
                merged.extend_from_slice(content);
                merged.push(b'\n');
            }
            if merged.last() == Some(&b'\n') {
                merged.pop();
            }
            files.insert(STYLESHEET.to_owned(), merged);
        }

        for (name, content) in self.script_names() {
            files.insert(format!("{name}.js"), content.to_vec());
        }

        files
    }
}

// ============================================================================
// Tests
// ============================================================================
