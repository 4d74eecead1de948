use std::collections::HashMap;

use tracing::warn;
use tree_sitter::Node;

use crate::extract::Options;
use crate::loader::SourceFile;
use crate::model::Position;
use crate::parser::{is_identifier_leaf, single_line};
use crate::resolver::{
    scope, FileScope, ObjKind, Object, PackageScope, Resolver, SelectorBase, TypeRef,
};

/// Whether traversal continues after a visited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Abandon the rest of the current file.
    StopFile,
}

/// One resolved symbol occurrence.
///
/// `expr` is the rendered expression text: the identifier itself, the bare
/// member name for a package-qualified selector, or `Type.Member` for a
/// selector with a typed base.
#[derive(Debug, Clone)]
pub struct Occurrence {
    /// Position of the occurrence's own token, never the declaration's.
    pub pos: Position,
    pub expr: String,
    pub object: Object,
    pub universe: bool,
}

/// Walk one file depth-first in source order, reporting every resolved
/// identifier and selector occurrence to `visit`. Unresolved expressions
/// are dropped; a dot import warns and abandons the rest of the file.
pub fn walk_file(
    file: &SourceFile,
    scope: &PackageScope,
    resolver: &Resolver,
    opts: &Options,
    visit: &mut dyn FnMut(&Occurrence) -> Flow,
) -> Flow {
    let mut walker = Walker {
        file,
        scope,
        resolver,
        verbose: opts.verbose,
        synthetic: HashMap::new(),
    };
    walker.walk(file.root(), visit)
}

struct Walker<'a> {
    file: &'a SourceFile,
    scope: &'a PackageScope,
    resolver: &'a Resolver,
    verbose: bool,
    /// Per-file bindings for `init` functions, which declare no package
    /// scope name.
    synthetic: HashMap<String, Object>,
}

impl<'a> Walker<'a> {
    fn walk(&mut self, node: Node, visit: &mut dyn FnMut(&Occurrence) -> Flow) -> Flow {
        match node.kind() {
            // The package clause declares no referable symbol.
            "package_clause" => Flow::Continue,
            "import_declaration" => self.check_imports(node),
            "function_declaration" => {
                self.maybe_synthesize_init(node);
                self.walk_children(node, visit)
            }
            // Keys may be map keys rather than references; only the value
            // side is resolvable.
            "keyed_element" => match node.child_by_field_name("value") {
                Some(value) => self.walk(value, visit),
                None => Flow::Continue,
            },
            "selector_expression" => self.walk_selector(node, "operand", "field", visit),
            "qualified_type" => self.walk_selector(node, "package", "name", visit),
            kind if is_identifier_leaf(kind) => self.walk_ident(node, visit),
            _ => self.walk_children(node, visit),
        }
    }

    fn walk_children(&mut self, node: Node, visit: &mut dyn FnMut(&Occurrence) -> Flow) -> Flow {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if self.walk(child, visit) == Flow::StopFile {
                return Flow::StopFile;
            }
        }
        Flow::Continue
    }

    fn check_imports(&self, decl: Node) -> Flow {
        let mut flow = Flow::Continue;
        scope::each_import_spec(decl, &mut |spec| {
            if let Some(name) = spec.child_by_field_name("name") {
                if name.kind() == "dot" {
                    warn!("{}: import to . not supported", self.file.path.display());
                    flow = Flow::StopFile;
                }
            }
        });
        flow
    }

    /// A parameterless `init` function declares no package-scope name;
    /// bind one so the name token, and any later reference, resolves.
    /// Later `init` declarations in the same file rebind it.
    fn maybe_synthesize_init(&mut self, decl: Node) {
        let Some(name_node) = decl.child_by_field_name("name") else {
            return;
        };
        if self.file.text(name_node) != "init" {
            return;
        }
        if let Some(params) = decl.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            if params.named_children(&mut cursor).count() > 0 {
                return;
            }
        }
        if decl.child_by_field_name("result").is_some() {
            return;
        }
        self.synthetic.insert(
            "init".to_string(),
            Object {
                name: "init".to_string(),
                kind: ObjKind::Func,
                pkg: Some(self.scope.import_path.clone()),
                decl_pos: Some(self.file.position(name_node)),
                ty: Some(TypeRef {
                    text: "func()".to_string(),
                    named: None,
                    pointer: 0,
                }),
                result: None,
            },
        );
    }

    fn walk_ident(&mut self, node: Node, visit: &mut dyn FnMut(&Occurrence) -> Flow) -> Flow {
        let name = self.file.text(node).to_string();
        if name == "_" {
            return Flow::Continue;
        }
        let fs = self.file_scope();
        let Some(hit) = self.resolver.resolve_ident(&fs, node, &name) else {
            if self.verbose {
                warn!("{}: no object for {}", self.file.position(node), name);
            }
            return Flow::Continue;
        };
        let occurrence = Occurrence {
            pos: self.file.position(node),
            expr: name,
            object: hit.object,
            universe: hit.universe,
        };
        visit(&occurrence)
    }

    /// Walk the base expression first, then resolve the member as one
    /// occurrence of its own. The member token is not revisited as an
    /// identifier leaf.
    fn walk_selector(
        &mut self,
        node: Node,
        base_field: &str,
        member_field: &str,
        visit: &mut dyn FnMut(&Occurrence) -> Flow,
    ) -> Flow {
        let (Some(base), Some(member)) = (
            node.child_by_field_name(base_field),
            node.child_by_field_name(member_field),
        ) else {
            return self.walk_children(node, visit);
        };
        if self.walk(base, visit) == Flow::StopFile {
            return Flow::StopFile;
        }
        let member_text = self.file.text(member).to_string();
        let fs = self.file_scope();
        let Some((hit, selector_base)) = self.resolver.resolve_selector(&fs, base, &member_text)
        else {
            if self.verbose {
                warn!(
                    "{}: no object for {}",
                    self.file.position(member),
                    single_line(self.file.text(node)),
                );
            }
            return Flow::Continue;
        };
        let expr = match &selector_base {
            // A package qualifier is not part of the symbol's name.
            SelectorBase::Package => member_text,
            // One pointer level is stripped from the base type.
            SelectorBase::Type(ty) => format!("{}.{}", ty.base_text(), member_text),
        };
        let occurrence = Occurrence {
            pos: self.file.position(member),
            expr,
            object: hit.object,
            universe: hit.universe,
        };
        visit(&occurrence)
    }

    fn file_scope(&self) -> FileScope<'_> {
        FileScope {
            file: self.file,
            scope: self.scope,
            synthetic: &self.synthetic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SearchPaths;
    use tempfile::TempDir;

    fn write_gopath(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (rel, source) in files {
            let path = dir.path().join("src").join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, source).unwrap();
        }
        dir
    }

    fn collect(dir: &TempDir, import_path: &str) -> (Vec<Occurrence>, Flow) {
        let resolver = Resolver::new(SearchPaths::new(vec![dir.path().join("src")]));
        let pkg = resolver.import(import_path).unwrap();
        let scope = resolver.scope(import_path).unwrap();
        let opts = Options::default();
        let mut occurrences = Vec::new();
        let mut flow = Flow::Continue;
        for file in &pkg.files {
            flow = walk_file(file, &scope, &resolver, &opts, &mut |occ| {
                occurrences.push(occ.clone());
                Flow::Continue
            });
        }
        (occurrences, flow)
    }

    #[test]
    fn test_occurrences_in_source_order() {
        let dir = write_gopath(&[(
            "example/foo/foo.go",
            "package foo\n\nvar A = 1\n\nfunc Run() {\n\tA = 2\n}\n",
        )]);
        let (occurrences, flow) = collect(&dir, "example/foo");
        assert_eq!(flow, Flow::Continue);

        let exprs: Vec<&str> = occurrences.iter().map(|o| o.expr.as_str()).collect();
        assert_eq!(exprs, ["A", "Run", "A"]);
        let lines: Vec<usize> = occurrences.iter().map(|o| o.pos.line).collect();
        assert_eq!(lines, [3, 5, 6]);

        // The first two are their own declarations, the last is a use.
        assert_eq!(occurrences[0].object.decl_pos, Some(occurrences[0].pos.clone()));
        assert_eq!(occurrences[1].object.decl_pos, Some(occurrences[1].pos.clone()));
        assert_ne!(occurrences[2].object.decl_pos, Some(occurrences[2].pos.clone()));
    }

    #[test]
    fn test_dot_import_aborts_file() {
        let dir = write_gopath(&[(
            "example/foo/foo.go",
            "package foo\n\nimport \"strings\"\nimport . \"fmt\"\n\nvar A = strings.Repeat\n",
        )]);
        let (occurrences, flow) = collect(&dir, "example/foo");
        assert_eq!(flow, Flow::StopFile);
        assert!(occurrences.is_empty());
    }

    #[test]
    fn test_keyed_element_skips_keys() {
        let dir = write_gopath(&[(
            "example/foo/foo.go",
            "package foo\n\ntype T struct {\n\tN int\n}\n\nvar V = T{N: 1}\n",
        )]);
        let (occurrences, _) = collect(&dir, "example/foo");
        // `N` appears once as its field declaration; the literal key is
        // skipped.
        let n_count = occurrences.iter().filter(|o| o.expr == "N").count();
        assert_eq!(n_count, 1);
        assert_eq!(
            occurrences.iter().find(|o| o.expr == "N").unwrap().pos.line,
            4
        );
    }

    #[test]
    fn test_init_synthesis_definition() {
        let dir = write_gopath(&[(
            "example/foo/foo.go",
            "package foo\n\nfunc init() {\n}\n",
        )]);
        let (occurrences, _) = collect(&dir, "example/foo");
        assert_eq!(occurrences.len(), 1);
        let init = &occurrences[0];
        assert_eq!(init.expr, "init");
        assert_eq!(init.object.kind, ObjKind::Func);
        assert_eq!(init.object.decl_pos, Some(init.pos.clone()));
    }

    #[test]
    fn test_blank_identifier_is_ignored() {
        let dir = write_gopath(&[(
            "example/foo/foo.go",
            "package foo\n\nfunc Run() {\n\t_ = 1\n}\n",
        )]);
        let (occurrences, _) = collect(&dir, "example/foo");
        let exprs: Vec<&str> = occurrences.iter().map(|o| o.expr.as_str()).collect();
        assert_eq!(exprs, ["Run"]);
    }

    #[test]
    fn test_selector_package_base_renders_bare_member() {
        let dir = write_gopath(&[
            (
                "example/foo/foo.go",
                "package foo\n\nimport \"some/bar\"\n\nfunc Run() {\n\tbar.Baz()\n}\n",
            ),
            ("some/bar/bar.go", "package bar\n\nfunc Baz() {}\n"),
        ]);
        let (occurrences, _) = collect(&dir, "example/foo");
        let baz = occurrences.iter().find(|o| o.expr == "Baz").unwrap();
        assert_eq!(baz.object.pkg.as_deref(), Some("some/bar"));
        assert_ne!(baz.object.decl_pos, Some(baz.pos.clone()));
        // The package qualifier ident resolves to a package object, which
        // carries no symbol kind.
        let bar = occurrences.iter().find(|o| o.expr == "bar").unwrap();
        assert!(bar.object.kind.symbol_kind().is_none());
    }

    #[test]
    fn test_selector_typed_base_renders_type_qualified() {
        let dir = write_gopath(&[
            (
                "example/foo/foo.go",
                "package foo\n\nimport \"some/bar\"\n\nfunc Run(b *bar.Buf) {\n\tb.Flush()\n}\n",
            ),
            (
                "some/bar/bar.go",
                "package bar\n\ntype Buf struct{}\n\nfunc (b *Buf) Flush() error { return nil }\n",
            ),
        ]);
        let (occurrences, _) = collect(&dir, "example/foo");
        let flush = occurrences
            .iter()
            .find(|o| o.expr.ends_with(".Flush"))
            .unwrap();
        assert_eq!(flush.expr, "bar.Buf.Flush");
        assert_eq!(flush.object.pkg.as_deref(), Some("some/bar"));
    }

    #[test]
    fn test_callback_can_abort() {
        let dir = write_gopath(&[(
            "example/foo/foo.go",
            "package foo\n\nvar A = 1\nvar B = 2\n",
        )]);
        let resolver = Resolver::new(SearchPaths::new(vec![dir.path().join("src")]));
        let pkg = resolver.import("example/foo").unwrap();
        let scope = resolver.scope("example/foo").unwrap();
        let opts = Options::default();
        let mut seen = 0;
        let flow = walk_file(&pkg.files[0], &scope, &resolver, &opts, &mut |_| {
            seen += 1;
            Flow::StopFile
        });
        assert_eq!(flow, Flow::StopFile);
        assert_eq!(seen, 1);
    }
}
