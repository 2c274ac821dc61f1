//! Blueprint parsing.
//!
//! A blueprint is a line-oriented page layout: block lines place a component
//! at a dotted hierarchical index, variable lines bind values to the most
//! recent block.
//!
//! ```text
//! # page layout
//! 1 layout.page
//! .title=Home
//! 1.1 composite.card
//! .header=Welcome
//! .items=first
//! .items=second
//! ```
//!
//! Parsing is best-effort: blank, comment and malformed lines are skipped.
//! The only hard failure is two blocks sharing the same index.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

/// Hierarchical position of a block, e.g. `[1, 2]` for `1.2`.
pub type Index = SmallVec<[u32; 4]>;

/// Blueprint parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlueprintError {
    #[error("duplicate block index `{0}`")]
    DuplicateIndex(String),

    #[error("blueprint contains no component blocks")]
    Empty,
}

// ============================================================================
// Types
// ============================================================================

/// Variable bindings of one block.
///
/// Every name maps to an ordered sequence of values: substitution reads the
/// first value, loops iterate the whole sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars(FxHashMap<String, Vec<String>>);

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to `name`'s sequence.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// First value bound to `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// All values bound to `name`, empty if unbound.
    pub fn values(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One component placement in the page tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintNode {
    /// Dotted component path, empty for the synthetic root.
    pub path: String,
    /// Hierarchical index, empty for the synthetic root.
    pub index: Index,
    pub vars: Vars,
    /// Children in rendering order.
    pub children: Vec<BlueprintNode>,
}

impl BlueprintNode {
    fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.index.is_empty()
    }

    /// Visit this node and all descendants in pre-order.
    pub fn walk<'a, E>(
        &'a self,
        f: &mut impl FnMut(&'a BlueprintNode) -> Result<(), E>,
    ) -> Result<(), E> {
        f(self)?;
        for child in &self.children {
            child.walk(&mut *f)?;
        }
        Ok(())
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// A block line with the variables bound to it.
#[derive(Debug)]
struct Block {
    path: String,
    index: Index,
    vars: Vars,
}

/// Parse blueprint source text into a tree rooted at a synthetic root node.
pub fn parse(source: &str) -> Result<BlueprintNode, BlueprintError> {
    let mut blocks: Vec<Block> = Vec::new();

    for line in source.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('.') {
            // Variables before the first block have nowhere to go
            if let Some(block) = blocks.last_mut()
                && let Some((name, value)) = parse_var(line)
            {
                block.vars.push(name, value);
            }
            continue;
        }

        if let Some(block) = parse_block(line) {
            blocks.push(block);
        }
    }

    build_tree(blocks)
}

/// Parse `.name=value`. Only leading whitespace of the value is trimmed.
fn parse_var(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once('=')?;
    let name = name.trim().strip_prefix('.')?;
    Some((name, value.trim_start()))
}

/// Parse `<index> <component.path>`, `None` for malformed lines.
fn parse_block(line: &str) -> Option<Block> {
    let mut fields = line.split_whitespace();
    let (Some(index), Some(path), None) = (fields.next(), fields.next(), fields.next()) else {
        return None;
    };

    Some(Block {
        path: path.to_owned(),
        index: parse_index(index)?,
        vars: Vars::new(),
    })
}

/// Parse `1.2.3` (a trailing dot is tolerated) into positive integers.
fn parse_index(text: &str) -> Option<Index> {
    text.trim_end_matches('.')
        .split('.')
        .map(|seg| seg.parse::<u32>().ok().filter(|&n| n > 0))
        .collect()
}

fn index_key(index: &[u32]) -> String {
    index
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

// ============================================================================
// Tree Construction
// ============================================================================

/// Attach blocks under their parents and sort siblings by index.
///
/// Nodes live in an arena while parent links are resolved through the
/// index-key map; the owned tree is assembled afterwards.
fn build_tree(blocks: Vec<Block>) -> Result<BlueprintNode, BlueprintError> {
    if blocks.is_empty() {
        return Err(BlueprintError::Empty);
    }

    const ROOT: usize = 0;
    let mut slots: FxHashMap<String, usize> = FxHashMap::default();
    slots.insert(String::new(), ROOT);

    let mut nodes = vec![BlueprintNode::root()];
    let mut child_ids: Vec<Vec<usize>> = vec![Vec::new()];

    for block in blocks {
        let key = index_key(&block.index);
        if slots.contains_key(&key) {
            return Err(BlueprintError::DuplicateIndex(key));
        }

        let id = nodes.len();
        let parent_key = index_key(&block.index[..block.index.len() - 1]);
        // Unknown parents fall back to the root
        let parent = slots.get(&parent_key).copied().unwrap_or(ROOT);

        slots.insert(key, id);
        child_ids[parent].push(id);
        child_ids.push(Vec::new());
        nodes.push(BlueprintNode {
            path: block.path,
            index: block.index,
            vars: block.vars,
            children: Vec::new(),
        });
    }

    let mut nodes: Vec<Option<BlueprintNode>> = nodes.into_iter().map(Some).collect();
    Ok(assemble(ROOT, &mut nodes, &child_ids))
}

/// Move node `id` and its subtree out of the arena, sorting children.
///
/// Blocks always attach to an earlier node, so the arena forms a tree and
/// every slot is taken exactly once.
fn assemble(
    id: usize,
    nodes: &mut [Option<BlueprintNode>],
    child_ids: &[Vec<usize>],
) -> BlueprintNode {
    let mut node = nodes[id].take().unwrap_or_default();
    node.children = child_ids[id]
        .iter()
        .map(|&child| assemble(child, nodes, child_ids))
        .collect();

    if node.is_root() {
        node.children.sort_by_key(|c| c.index[0]);
    } else {
        node.children.sort_by_key(|c| c.index[c.index.len() - 1]);
    }
    node
}

// ============================================================================
// Tests
// ============================================================================
