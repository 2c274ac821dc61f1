//! Template interpretation over a blueprint tree.
//!
//! Each node's component template is tokenized and rendered against the
//! node's variables and children. Children are rendered recursively at the
//! `{{component}}` marker. Missing components do not stop rendering: they
//! leave a `{{path}}` placeholder and record an error.
//!
//! Styles and script markers render nothing. The processor remembers the
//! output offset of the first of each so the assembler can insert the
//! page's tags there once every component has contributed its assets.

use super::tokenizer::{Token, tokenize};
use super::ProcessError;
use crate::assets::AssetManager;
use crate::blueprint::{BlueprintNode, Vars};
use crate::component::Registry;
use crate::storage::Store;
use std::collections::BTreeSet;

/// Renders one page. Create a fresh processor per blueprint.
pub struct Processor<'r, 's, S: Store + ?Sized> {
    registry: &'r Registry<'s, S>,
    pub(super) assets: AssetManager,
    pub(super) errors: Vec<ProcessError>,
    pub(super) used: BTreeSet<String>,
    /// Output offset of the first `{{styles}}` marker
    pub(super) styles_at: Option<usize>,
    /// Output offset of the first `{{script}}` marker
    pub(super) script_at: Option<usize>,
}

impl<'r, 's, S: Store + ?Sized> Processor<'r, 's, S> {
    pub fn new(registry: &'r Registry<'s, S>) -> Self {
        Self {
            registry,
            assets: AssetManager::new(),
            errors: Vec::new(),
            used: BTreeSet::new(),
            styles_at: None,
            script_at: None,
        }
    }

    /// Render a node and its subtree.
    ///
    /// Everything renders into one buffer, so recorded marker offsets stay
    /// valid in the returned text.
    pub fn process(&mut self, node: &BlueprintNode) -> String {
        let mut out = String::new();
        self.render_node(node, &mut out);
        out
    }

    fn render_node(&mut self, node: &BlueprintNode, out: &mut String) {
        if node.is_root() {
            self.render_children(&node.children, out);
            return;
        }

        let Some(component) = self.registry.get(&node.path) else {
            self.add_error(0, &node.path, format!("component not found: {}", node.path));
            out.push_str("{{");
            out.push_str(&node.path);
            out.push_str("}}");
            return;
        };

        self.assets.ingest(&component);
        self.used.insert(node.path.clone());

        let template = String::from_utf8_lossy(&component.template);
        self.render_template(&template, &node.vars, &node.children, out);
    }

    fn render_children(&mut self, children: &[BlueprintNode], out: &mut String) {
        for child in children {
            self.render_node(child, out);
        }
    }

    fn render_template(
        &mut self,
        template: &str,
        vars: &Vars,
        children: &[BlueprintNode],
        out: &mut String,
    ) {
        let tokens = tokenize(template);
        // Start position and variable of the open range; only one level
        let mut range: Option<(usize, &str)> = None;

        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::RangeStart(name) => {
                    if range.is_none() {
                        range = Some((i, name.as_str()));
                    }
                }
                Token::RangeEnd => {
                    if let Some((start, name)) = range.take() {
                        render_range(&tokens[start + 1..i], name, vars, out);
                    }
                }
                // Everything else inside an open range is rendered at its end
                _ if range.is_some() => {}
                Token::Text(text) => out.push_str(text),
                Token::Var(name) => out.push_str(vars.first(name).unwrap_or_default()),
                Token::Component => self.render_children(children, out),
                Token::Styles => {
                    self.styles_at.get_or_insert(out.len());
                }
                Token::Script => {
                    self.script_at.get_or_insert(out.len());
                }
            }
        }
    }

    /// Record an error unless one exists for the same line and directive.
    fn add_error(&mut self, line: usize, directive: &str, message: String) {
        if self
            .errors
            .iter()
            .any(|e| e.line == line && e.directive == directive)
        {
            return;
        }
        self.errors.push(ProcessError {
            line,
            directive: directive.to_owned(),
            message,
        });
    }
}

/// Render a range body once per value of `name`.
///
/// Only text and variables are rendered inside a body. The loop variable
/// reads the current value, other variables their first value.
fn render_range(body: &[Token], name: &str, vars: &Vars, out: &mut String) {
    for value in vars.values(name) {
        for token in body {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Var(var) if var == name => out.push_str(value),
                Token::Var(var) => out.push_str(vars.first(var).unwrap_or_default()),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::parse;
    use crate::component::tests::MemoryStore;

    fn render(store: &MemoryStore, blueprint: &str) -> (String, Vec<ProcessError>) {
        let tree = parse(blueprint).unwrap();
        let mut registry = Registry::new(store);
        tree.walk(&mut |node| {
            if !node.is_root() {
                // Missing components stay unloaded
                let _ = registry.load(&node.path);
            }
            Ok::<_, ()>(())
        })
        .unwrap();

        let mut processor = Processor::new(&registry);
        let html = processor.process(&tree);
        (html, processor.errors)
    }

    #[test]
    fn test_variable_substitution() {
        let store = MemoryStore::default()
            .with("sample/card/card.html", "<h3>{{.header}}</h3><p>{{.content}}</p>{{component}}");
        let (html, errors) = render(&store, "1 sample.card\n.header=Title\n.content=Body\n");

        assert_eq!(html, "<h3>Title</h3><p>Body</p>");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_variable_renders_nothing() {
        let store = MemoryStore::default().with("a/a.html", "[{{.nope}}]");
        let (html, _) = render(&store, "1 a\n");
        assert_eq!(html, "[]");
    }

    #[test]
    fn test_children_inserted_in_index_order() {
        let store = MemoryStore::default()
            .with("layout/layout.html", "<main>{{component}}</main>")
            .with("item/item.html", "<i>{{.n}}</i>");
        let (html, _) = render(&store, "1 layout\n1.2 item\n.n=2\n1.1 item\n.n=1\n");

        assert_eq!(html, "<main><i>1</i><i>2</i></main>");
    }

    #[test]
    fn test_top_level_nodes_concatenated() {
        let store = MemoryStore::default().with("p/p.html", "<p>{{.t}}</p>");
        let (html, _) = render(&store, "2 p\n.t=b\n1 p\n.t=a\n");
        assert_eq!(html, "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_range_expands_per_value() {
        let store = MemoryStore::default().with(
            "list/list.html",
            "<ul>{{range .items}}<li>{{.items}}:{{.title}}</li>{{range end}}</ul>",
        );
        let (html, _) = render(&store, "1 list\n.title=T\n.items=a\n.items=b\n.items=c\n");

        assert_eq!(html, "<ul><li>a:T</li><li>b:T</li><li>c:T</li></ul>");
    }

    #[test]
    fn test_range_over_unbound_variable_is_empty() {
        let store = MemoryStore::default().with("l/l.html", "x{{range .none}}y{{range end}}z");
        let (html, _) = render(&store, "1 l\n");
        assert_eq!(html, "xz");
    }

    #[test]
    fn test_nested_range_ignored() {
        let store = MemoryStore::default().with(
            "l/l.html",
            "{{range .a}}[{{range .b}}{{.a}}{{.b}}{{range end}}]{{range end}}",
        );
        let (html, _) = render(&store, "1 l\n.a=1\n.a=2\n.b=x\n.b=y\n");

        // The inner `range .b` is ignored and its `range end` closes the outer
        // loop; the trailing `]` and `range end` are rendered normally
        assert_eq!(html, "[1x[2x]");
    }

    #[test]
    fn test_range_ignores_markers_in_body() {
        let store = MemoryStore::default()
            .with("l/l.html", "{{range .a}}{{component}}{{styles}}{{.a}}{{range end}}")
            .with("c/c.html", "child");
        let tree = "1 l\n.a=1\n.a=2\n1.1 c\n";
        let (html, _) = render(&store, tree);
        assert_eq!(html, "12");
    }

    #[test]
    fn test_unterminated_range_drops_body() {
        let store = MemoryStore::default().with("l/l.html", "a{{range .x}}b{{.x}}");
        let (html, _) = render(&store, "1 l\n.x=1\n");
        assert_eq!(html, "a");
    }

    #[test]
    fn test_missing_component_placeholder() {
        let store = MemoryStore::default().with("ok/ok.html", "<ok/>");
        let (html, errors) = render(&store, "1 ok\n2 gone.away\n3 ok\n");

        assert_eq!(html, "<ok/>{{gone.away}}<ok/>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].directive, "gone.away");
        assert_eq!(errors[0].message, "component not found: gone.away");
    }

    #[test]
    fn test_duplicate_errors_collapsed() {
        let store = MemoryStore::default();
        let (html, errors) = render(&store, "1 gone\n2 gone\n");

        assert_eq!(html, "{{gone}}{{gone}}");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_markers_record_offsets() {
        let store = MemoryStore::default()
            .with("page/page.html", "<head>{{styles}}</head><body>{{component}}{{script}}</body>");
        let tree = parse("1 page\n").unwrap();
        let mut registry = Registry::new(&store);
        registry.load("page").unwrap();

        let mut processor = Processor::new(&registry);
        let html = processor.process(&tree);

        assert_eq!(html, "<head></head><body></body>");
        assert_eq!(processor.styles_at, Some("<head>".len()));
        assert_eq!(processor.script_at, Some("<head></head><body>".len()));
    }

    #[test]
    fn test_only_first_marker_is_recorded() {
        let store = MemoryStore::default().with("card/card.html", "<div>{{styles}}{{script}}</div>");
        let tree = parse("1 card\n2 card\n").unwrap();
        let mut registry = Registry::new(&store);
        registry.load("card").unwrap();

        let mut processor = Processor::new(&registry);
        let html = processor.process(&tree);

        assert_eq!(html, "<div></div><div></div>");
        assert_eq!(processor.styles_at, Some(5));
        assert_eq!(processor.script_at, Some(5));
    }

    #[test]
    fn test_used_components_and_assets_recorded() {
        let store = MemoryStore::default()
            .with("a/a.html", "{{component}}")
            .with("a/a.css", ".a{}")
            .with("b/b.html", "b")
            .with("b/b.js", "b()");
        let tree = parse("1 a\n1.1 b\n").unwrap();
        let mut registry = Registry::new(&store);
        registry.load("a").unwrap();
        registry.load("b").unwrap();

        let mut processor = Processor::new(&registry);
        processor.process(&tree);

        assert_eq!(processor.used.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        let files = processor.assets.files();
        assert!(files.contains_key("styles.css"));
        assert!(files.contains_key("b-b.js"));
    }
}
