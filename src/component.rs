//! Component loading and caching.
//!
//! A component is a directory under `components/` holding exactly one HTML
//! template plus any number of stylesheets and scripts. The dotted component
//! path `composite.card` resolves to `components/composite/card/`.

use crate::storage::{StorageError, Store};
use rustc_hash::FxHashMap;
use std::{path::PathBuf, rc::Rc};
use thiserror::Error;

/// Component resolution errors.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("cannot resolve component `{path}`")]
    Resolve {
        path: String,
        #[source]
        source: StorageError,
    },
}

/// A loaded component. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Component {
    /// Dotted path, e.g. `composite.card`
    pub path: String,
    /// Raw template text
    pub template: Vec<u8>,
    /// All stylesheets concatenated, each followed by a newline
    pub styles: Vec<u8>,
    /// Scripts as `(file name, content)` in file-name order
    pub scripts: Vec<(String, Vec<u8>)>,
}

/// Directory of a component relative to the components root.
pub fn component_dir(path: &str) -> PathBuf {
    path.split('.').collect()
}

/// Per-build component cache over a [`Store`].
///
/// Each distinct path is read from storage at most once.
pub struct Registry<'s, S: Store + ?Sized> {
    store: &'s S,
    loaded: FxHashMap<String, Rc<Component>>,
}

impl<'s, S: Store + ?Sized> Registry<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            loaded: FxHashMap::default(),
        }
    }

    /// Load a component, returning the cached instance on repeat calls.
    pub fn load(&mut self, path: &str) -> Result<Rc<Component>, ComponentError> {
        if let Some(component) = self.loaded.get(path) {
            return Ok(Rc::clone(component));
        }

        let component = Rc::new(self.read(path).map_err(|source| ComponentError::Resolve {
            path: path.to_owned(),
            source,
        })?);
        self.loaded.insert(path.to_owned(), Rc::clone(&component));
        Ok(component)
    }

    /// Cached component, never touches storage.
    pub fn get(&self, path: &str) -> Option<Rc<Component>> {
        self.loaded.get(path).cloned()
    }

    fn read(&self, path: &str) -> Result<Component, StorageError> {
        let dir = component_dir(path);

        let template_file = self.store.find_template_file(&dir)?;
        let template = self.store.read_component(&dir, &template_file)?;

        let mut styles = Vec::new();
        for file in self.store.list_component_files(&dir, "css")? {
            styles.extend(self.store.read_component(&dir, &file)?);
            styles.push(b'\n');
        }

        let scripts: Vec<(String, Vec<u8>)> = self
            .store
            .list_component_files(&dir, "js")?
            .into_iter()
            .map(|file| {
                let content = self.store.read_component(&dir, &file)?;
                Ok((file, content))
            })
            .collect::<Result<_, StorageError>>()?;

        Ok(Component {
            path: path.to_owned(),
            template,
            styles,
            scripts,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{
        cell::Cell,
        collections::BTreeMap,
        path::Path,
    };

    /// In-memory store keyed by `dir/file`, counting component reads.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub files: BTreeMap<PathBuf, Vec<u8>>,
        pub reads: Cell<usize>,
    }

    impl MemoryStore {
        pub fn with(mut self, path: &str, content: &str) -> Self {
            self.files.insert(PathBuf::from(path), content.as_bytes().to_vec());
            self
        }
    }

    impl Store for MemoryStore {
        fn list_blueprints(&self) -> crate::storage::Result<BTreeMap<PathBuf, PathBuf>> {
            Ok(BTreeMap::new())
        }

        fn read_blueprint(&self, path: &Path) -> crate::storage::Result<Vec<u8>> {
            Err(StorageError::TemplateNotFound(path.to_path_buf()))
        }

        fn list_component_files(
            &self,
            dir: &Path,
            ext: &str,
        ) -> crate::storage::Result<Vec<String>> {
            Ok(self
                .files
                .keys()
                .filter(|p| p.parent() == Some(dir))
                .filter(|p| p.extension().is_some_and(|e| e == ext))
                .filter_map(|p| p.file_name()?.to_str().map(str::to_owned))
                .collect())
        }

        fn read_component(&self, dir: &Path, file: &str) -> crate::storage::Result<Vec<u8>> {
            self.reads.set(self.reads.get() + 1);
            let path = dir.join(file);
            self.files
                .get(&path)
                .cloned()
                .ok_or(StorageError::TemplateNotFound(path))
        }

        fn write_output(&self, _files: &BTreeMap<PathBuf, Vec<u8>>) -> crate::storage::Result<()> {
            Ok(())
        }
    }

    fn card_store() -> MemoryStore {
        MemoryStore::default()
            .with("composite/card/card.html", "<div>{{component}}</div>")
            .with("composite/card/b.css", ".b{}")
            .with("composite/card/a.css", ".a{}")
            .with("composite/card/toggle.js", "toggle()")
    }

    #[test]
    fn test_component_dir_from_dotted_path() {
        assert_eq!(component_dir("composite.card"), PathBuf::from("composite/card"));
        assert_eq!(component_dir("simple"), PathBuf::from("simple"));
    }

    #[test]
    fn test_load_reads_template_styles_and_scripts() {
        let store = card_store();
        let mut registry = Registry::new(&store);

        let card = registry.load("composite.card").unwrap();

        assert_eq!(card.path, "composite.card");
        assert_eq!(card.template, b"<div>{{component}}</div>");
        assert_eq!(card.styles, b".a{}\n.b{}\n");
        assert_eq!(card.scripts, vec![("toggle.js".to_owned(), b"toggle()".to_vec())]);
    }

    #[test]
    fn test_load_is_cached() {
        let store = card_store();
        let mut registry = Registry::new(&store);

        let first = registry.load("composite.card").unwrap();
        let reads = store.reads.get();
        let second = registry.load("composite.card").unwrap();

        assert_eq!(store.reads.get(), reads);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_get_only_reads_cache() {
        let store = card_store();
        let mut registry = Registry::new(&store);

        assert!(registry.get("composite.card").is_none());
        registry.load("composite.card").unwrap();
        assert!(registry.get("composite.card").is_some());
    }

    #[test]
    fn test_missing_template_is_error() {
        let store = MemoryStore::default().with("bare/style.css", "x");
        let mut registry = Registry::new(&store);

        let err = registry.load("bare").unwrap_err();
        assert!(err.to_string().contains("`bare`"));
        assert!(registry.get("bare").is_none());
    }

    #[test]
    fn test_ambiguous_template_is_error() {
        let store = MemoryStore::default()
            .with("dup/a.html", "a")
            .with("dup/b.html", "b");
        let mut registry = Registry::new(&store);

        let ComponentError::Resolve { source, .. } = registry.load("dup").unwrap_err();
        assert!(matches!(source, StorageError::AmbiguousTemplate(_)));
    }
}
