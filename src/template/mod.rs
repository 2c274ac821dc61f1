//! Template rendering and page assembly.
//!
//! # Pipeline
//!
//! ```text
//! BlueprintNode tree
//!     │
//!     ├── Processor::process()  ──► page body + first marker offsets
//!     │       │
//!     │       └── AssetManager::ingest() per visited component
//!     │
//!     └── assemble()            ──► link/script tags placed, ProcessResult
//! ```

pub mod processor;
pub mod tokenizer;

pub use processor::Processor;

use crate::blueprint::BlueprintNode;
use crate::storage::Store;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// A recoverable problem found while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessError {
    /// Template line, `0` when unknown
    pub line: usize,
    /// Directive or component path the error belongs to
    pub directive: String,
    pub message: String,
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} [{}]: {}", self.line, self.directive, self.message)
    }
}

/// Everything produced for one blueprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    pub html: Vec<u8>,
    /// Merged stylesheet and script files keyed by file name
    pub files: BTreeMap<String, Vec<u8>>,
    /// Component paths rendered into the page
    pub components: BTreeSet<String>,
}

/// Rendering finished with errors; the partial page is kept.
#[derive(Debug, Error)]
#[error("template processing errors: {}", join_errors(.errors))]
pub struct ProcessErrors {
    pub errors: Vec<ProcessError>,
    pub partial: ProcessResult,
}

fn join_errors(errors: &[ProcessError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render the tree under `root` and place the page's asset tags.
///
/// Tags go where the first `{{styles}}` / `{{script}}` marker was rendered,
/// so a page never links its assets twice. Without a marker the stylesheet
/// link is prepended and the scripts appended. `prefix` is prepended to
/// every asset href.
pub fn assemble<S: Store + ?Sized>(
    mut processor: Processor<'_, '_, S>,
    root: &BlueprintNode,
    prefix: &str,
) -> Result<ProcessResult, ProcessErrors> {
    let body = processor.process(root);
    let (styles, scripts) = processor.assets.tags(prefix);

    let styles_at = processor.styles_at.unwrap_or(0);
    let script_at = processor.script_at.unwrap_or(body.len());

    // Insert at the later offset first; on a tie the stylesheet goes first
    let mut html = body;
    if script_at >= styles_at {
        html.insert_str(script_at, &scripts);
        html.insert_str(styles_at, &styles);
    } else {
        html.insert_str(styles_at, &styles);
        html.insert_str(script_at, &scripts);
    }

    let result = ProcessResult {
        html: html.into_bytes(),
        files: processor.assets.files(),
        components: processor.used,
    };

    if processor.errors.is_empty() {
        Ok(result)
    } else {
        Err(ProcessErrors {
            errors: processor.errors,
            partial: result,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
