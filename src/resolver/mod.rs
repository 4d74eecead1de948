use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tree_sitter::Node;

use crate::loader::{Package, PackageCache, SearchPaths, SourceFile};
use crate::model::{Position, SymbolKind};

pub mod scope;

pub use scope::{universe_lookup, PackageScope, TypeMembers};

/// What a name denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjKind {
    /// An imported package name.
    Package { import_path: String },
    Const,
    Type,
    Var,
    Func,
}

impl ObjKind {
    /// The kind token used on output lines. Package names have none and
    /// never reach the output.
    pub fn symbol_kind(&self) -> Option<SymbolKind> {
        match self {
            ObjKind::Package { .. } => None,
            ObjKind::Const => Some(SymbolKind::Const),
            ObjKind::Type => Some(SymbolKind::Type),
            ObjKind::Var => Some(SymbolKind::Var),
            ObjKind::Func => Some(SymbolKind::Func),
        }
    }
}

/// A declared name and what is known about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: String,
    pub kind: ObjKind,
    /// Import path of the declaring package, `None` for universe names.
    pub pkg: Option<String>,
    /// Position of the declaring identifier, `None` for universe names.
    pub decl_pos: Option<Position>,
    /// Declared or inferred type.
    pub ty: Option<TypeRef>,
    /// Single declared result type, for functions that have exactly one.
    pub result: Option<TypeRef>,
}

/// A type expression as the engine tracks it: the one-line source text
/// plus the named type it denotes once pointers are stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub text: String,
    pub named: Option<NamedType>,
    /// Pointer indirections stripped to reach `named`.
    pub pointer: u8,
}

impl TypeRef {
    /// Type text without a leading pointer marker, used when rendering
    /// selector expressions.
    pub fn base_text(&self) -> &str {
        self.text.strip_prefix('*').unwrap_or(&self.text).trim_start()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub pkg: String,
    pub name: String,
}

/// A successful resolution: the object plus whether it came from the
/// universe scope rather than any package.
#[derive(Debug, Clone)]
pub struct Hit {
    pub object: Object,
    pub universe: bool,
}

/// What the base of a selector expression turned out to be.
#[derive(Debug, Clone)]
pub enum SelectorBase {
    /// The base names an imported package.
    Package,
    /// The base is a value of this type.
    Type(TypeRef),
}

/// Resolution context for one file: its package scope plus the per-file
/// table of synthesized `init` bindings.
pub struct FileScope<'a> {
    pub file: &'a SourceFile,
    pub scope: &'a PackageScope,
    pub synthetic: &'a HashMap<String, Object>,
}

/// Loads packages on demand and memoizes one scope per package.
pub struct Resolver {
    cache: PackageCache,
    scopes: Mutex<HashMap<String, Arc<PackageScope>>>,
}

impl Resolver {
    pub fn new(paths: SearchPaths) -> Resolver {
        Resolver {
            cache: PackageCache::new(paths),
            scopes: Mutex::new(HashMap::new()),
        }
    }

    pub fn search_paths(&self) -> &SearchPaths {
        self.cache.search_paths()
    }

    pub fn import(&self, import_path: &str) -> Result<Arc<Package>> {
        self.cache.import(import_path)
    }

    /// The memoized scope for a package, loading and building it first
    /// when needed.
    pub fn scope(&self, import_path: &str) -> Result<Arc<PackageScope>> {
        let mut scopes = match self.scopes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(scope) = scopes.get(import_path) {
            return Ok(scope.clone());
        }
        let pkg = self.cache.import(import_path)?;
        let scope = Arc::new(PackageScope::build(&pkg));
        scopes.insert(import_path.to_string(), scope.clone());
        Ok(scope)
    }

    /// Resolve an identifier occurrence. Declaration names inside type
    /// bodies resolve to their member objects; everything else walks
    /// local scopes, then synthesized bindings, then file imports, then
    /// package scope, then the universe.
    pub fn resolve_ident(&self, fs: &FileScope, node: Node, name: &str) -> Option<Hit> {
        if let Some(hit) = declared_member_hit(fs, node, name) {
            return Some(hit);
        }
        if let Some(object) = fs.scope.lookup_local(fs.file, node, name) {
            return Some(Hit {
                object,
                universe: false,
            });
        }
        if let Some(object) = fs.synthetic.get(name) {
            return Some(Hit {
                object: object.clone(),
                universe: false,
            });
        }
        if let Some(imports) = fs.scope.file_imports(&fs.file.path) {
            if let Some(import_path) = imports.get(name) {
                return Some(Hit {
                    object: Object {
                        name: name.to_string(),
                        kind: ObjKind::Package {
                            import_path: import_path.clone(),
                        },
                        pkg: None,
                        decl_pos: None,
                        ty: None,
                        result: None,
                    },
                    universe: false,
                });
            }
        }
        if let Some(object) = fs.scope.lookup(name) {
            return Some(Hit {
                object: object.clone(),
                universe: false,
            });
        }
        universe_lookup(name).map(|object| Hit {
            object,
            universe: true,
        })
    }

    /// Resolve the member of a selector expression given its base
    /// operand. A base naming an imported package looks the member up in
    /// that package's scope; any other base is typed first and the member
    /// looked up in the member tables of its named type.
    pub fn resolve_selector(
        &self,
        fs: &FileScope,
        operand: Node,
        member: &str,
    ) -> Option<(Hit, SelectorBase)> {
        if matches!(operand.kind(), "identifier" | "package_identifier") {
            let base = self.resolve_ident(fs, operand, fs.file.text(operand))?;
            if let ObjKind::Package { import_path } = &base.object.kind {
                let scope = self.scope(import_path).ok()?;
                let object = scope.lookup(member)?.clone();
                return Some((
                    Hit {
                        object,
                        universe: false,
                    },
                    SelectorBase::Package,
                ));
            }
        }
        let ty = self.type_of_expr(fs, operand)?;
        let hit = self.member_of(&ty, member)?;
        Some((hit, SelectorBase::Type(ty)))
    }

    fn member_of(&self, ty: &TypeRef, member: &str) -> Option<Hit> {
        let named = ty.named.as_ref()?;
        let scope = self.scope(&named.pkg).ok()?;
        let members = scope.members(&named.name)?;
        let object = members
            .fields
            .get(member)
            .or_else(|| members.methods.get(member))?
            .clone();
        Some(Hit {
            object,
            universe: false,
        })
    }

    /// Best-effort type of a value expression, used for selector bases.
    pub fn type_of_expr(&self, fs: &FileScope, node: Node) -> Option<TypeRef> {
        match node.kind() {
            "identifier" => {
                let hit = self.resolve_ident(fs, node, fs.file.text(node))?;
                hit.object.ty
            }
            "selector_expression" => {
                let operand = node.child_by_field_name("operand")?;
                let field = node.child_by_field_name("field")?;
                let (hit, _) = self.resolve_selector(fs, operand, fs.file.text(field))?;
                hit.object.ty
            }
            "call_expression" => {
                let func = node.child_by_field_name("function")?;
                let hit = match func.kind() {
                    "identifier" => self.resolve_ident(fs, func, fs.file.text(func))?,
                    "selector_expression" => {
                        let operand = func.child_by_field_name("operand")?;
                        let field = func.child_by_field_name("field")?;
                        self.resolve_selector(fs, operand, fs.file.text(field))?.0
                    }
                    _ => return None,
                };
                match &hit.object.kind {
                    ObjKind::Func => hit.object.result,
                    // A call whose callee is a type is a conversion.
                    ObjKind::Type => hit.object.pkg.as_ref().map(|pkg| TypeRef {
                        text: hit.object.name.clone(),
                        named: Some(NamedType {
                            pkg: pkg.clone(),
                            name: hit.object.name.clone(),
                        }),
                        pointer: 0,
                    }),
                    _ => None,
                }
            }
            "composite_literal" => node
                .child_by_field_name("type")
                .map(|t| fs.scope.type_ref_in(fs.file, t)),
            "unary_expression" => {
                let op = node.child_by_field_name("operator")?;
                let operand = node.child_by_field_name("operand")?;
                let inner = self.type_of_expr(fs, operand)?;
                match fs.file.text(op) {
                    "&" => Some(TypeRef {
                        text: format!("*{}", inner.text),
                        named: inner.named.clone(),
                        pointer: inner.pointer.saturating_add(1),
                    }),
                    "*" if inner.pointer > 0 => Some(TypeRef {
                        text: inner
                            .text
                            .strip_prefix('*')
                            .unwrap_or(&inner.text)
                            .trim_start()
                            .to_string(),
                        named: inner.named.clone(),
                        pointer: inner.pointer - 1,
                    }),
                    _ => None,
                }
            }
            "parenthesized_expression" => self.type_of_expr(fs, node.named_child(0)?),
            _ => None,
        }
    }
}

/// Declaration names inside type bodies resolve to the member objects
/// they declare rather than through the lexical chain: method names,
/// struct field names, and interface method names.
fn declared_member_hit(fs: &FileScope, node: Node, name: &str) -> Option<Hit> {
    let parent = node.parent()?;
    let object = match parent.kind() {
        "method_declaration" if is_field_child(parent, "name", node) => {
            let type_name = scope::receiver_type_name(parent, fs.file)?;
            fs.scope.members(&type_name)?.methods.get(name)?.clone()
        }
        "field_declaration" if is_field_child(parent, "name", node) => {
            let type_name = enclosing_type_name(fs, parent)?;
            fs.scope.members(&type_name)?.fields.get(name)?.clone()
        }
        "method_elem" if is_field_child(parent, "name", node) => {
            let type_name = enclosing_type_name(fs, parent)?;
            fs.scope.members(&type_name)?.methods.get(name)?.clone()
        }
        _ => return None,
    };
    Some(Hit {
        object,
        universe: false,
    })
}

fn is_field_child(parent: Node, field: &str, node: Node) -> bool {
    let mut cursor = parent.walk();
    for child in parent.children_by_field_name(field, &mut cursor) {
        if child == node {
            return true;
        }
    }
    false
}

fn enclosing_type_name(fs: &FileScope, node: Node) -> Option<String> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if parent.kind() == "type_spec" {
            let name = parent.child_by_field_name("name")?;
            return Some(fs.file.text(name).to_string());
        }
        current = parent;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn resolver_for(dir: &TempDir) -> Resolver {
        Resolver::new(SearchPaths::new(vec![dir.path().join("src")]))
    }

    fn find_ident<'a>(
        file: &SourceFile,
        node: Node<'a>,
        text: &str,
        skip: usize,
    ) -> Option<Node<'a>> {
        fn walk<'a>(
            file: &SourceFile,
            node: Node<'a>,
            text: &str,
            seen: &mut usize,
            skip: usize,
        ) -> Option<Node<'a>> {
            if crate::parser::is_identifier_leaf(node.kind()) && file.text(node) == text {
                if *seen == skip {
                    return Some(node);
                }
                *seen += 1;
            }
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if let Some(found) = walk(file, child, text, seen, skip) {
                    return Some(found);
                }
            }
            None
        }
        let mut seen = 0;
        walk(file, node, text, &mut seen, skip)
    }

    #[test]
    fn test_scope_is_memoized() {
        let dir = write_gopath(&[("example/foo/foo.go", "package foo\n\nfunc Run() {}\n")]);
        let resolver = resolver_for(&dir);
        let first = resolver.scope("example/foo").unwrap();
        let second = resolver.scope("example/foo").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_resolve_ident_prefers_local_over_package() {
        let dir = write_gopath(&[(
            "example/foo/foo.go",
            "package foo\n\nvar n = 1\n\nfunc Run() {\n\tn := 2\n\t_ = n\n}\n",
        )]);
        let resolver = resolver_for(&dir);
        let pkg = resolver.import("example/foo").unwrap();
        let scope = resolver.scope("example/foo").unwrap();
        let file = &pkg.files[0];
        let synthetic = HashMap::new();
        let fs = FileScope {
            file,
            scope: &scope,
            synthetic: &synthetic,
        };

        // Occurrence 2 of `n` is the use after the local declaration.
        let use_site = find_ident(file, file.root(), "n", 2).unwrap();
        let hit = resolver.resolve_ident(&fs, use_site, "n").unwrap();
        assert_eq!(hit.object.decl_pos.as_ref().unwrap().line, 6);
        assert!(!hit.universe);
    }

    #[test]
    fn test_resolve_ident_imports_and_universe() {
        let dir = write_gopath(&[
            (
                "example/foo/foo.go",
                "package foo\n\nimport \"some/bar\"\n\nvar V = bar.Baz\nvar W int\n",
            ),
            ("some/bar/bar.go", "package bar\n\nvar Baz = 2\n"),
        ]);
        let resolver = resolver_for(&dir);
        let pkg = resolver.import("example/foo").unwrap();
        let scope = resolver.scope("example/foo").unwrap();
        let file = &pkg.files[0];
        let synthetic = HashMap::new();
        let fs = FileScope {
            file,
            scope: &scope,
            synthetic: &synthetic,
        };

        let bar = find_ident(file, file.root(), "bar", 0).unwrap();
        let hit = resolver.resolve_ident(&fs, bar, "bar").unwrap();
        assert_eq!(
            hit.object.kind,
            ObjKind::Package {
                import_path: "some/bar".to_string()
            }
        );
        assert!(hit.object.kind.symbol_kind().is_none());

        let int = find_ident(file, file.root(), "int", 0).unwrap();
        let hit = resolver.resolve_ident(&fs, int, "int").unwrap();
        assert!(hit.universe);
        assert_eq!(hit.object.kind, ObjKind::Type);
    }

    #[test]
    fn test_resolve_selector_package_member() {
        let dir = write_gopath(&[
            (
                "example/foo/foo.go",
                "package foo\n\nimport \"some/bar\"\n\nfunc Run() {\n\tbar.Baz()\n}\n",
            ),
            ("some/bar/bar.go", "package bar\n\nfunc Baz() {}\n"),
        ]);
        let resolver = resolver_for(&dir);
        let pkg = resolver.import("example/foo").unwrap();
        let scope = resolver.scope("example/foo").unwrap();
        let file = &pkg.files[0];
        let synthetic = HashMap::new();
        let fs = FileScope {
            file,
            scope: &scope,
            synthetic: &synthetic,
        };

        let operand = find_ident(file, file.root(), "bar", 0).unwrap();
        let (hit, base) = resolver.resolve_selector(&fs, operand, "Baz").unwrap();
        assert_eq!(hit.object.kind, ObjKind::Func);
        assert_eq!(hit.object.pkg.as_deref(), Some("some/bar"));
        assert!(matches!(base, SelectorBase::Package));
    }

    #[test]
    fn test_resolve_selector_typed_base() {
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
        let resolver = resolver_for(&dir);
        let pkg = resolver.import("example/foo").unwrap();
        let scope = resolver.scope("example/foo").unwrap();
        let file = &pkg.files[0];
        let synthetic = HashMap::new();
        let fs = FileScope {
            file,
            scope: &scope,
            synthetic: &synthetic,
        };

        // The `b` in the call body, not the parameter.
        let operand = find_ident(file, file.root(), "b", 1).unwrap();
        let (hit, base) = resolver.resolve_selector(&fs, operand, "Flush").unwrap();
        assert_eq!(hit.object.name, "Flush");
        assert_eq!(hit.object.pkg.as_deref(), Some("some/bar"));
        match base {
            SelectorBase::Type(ty) => {
                assert_eq!(ty.text, "*bar.Buf");
                assert_eq!(ty.base_text(), "bar.Buf");
            }
            SelectorBase::Package => panic!("expected a typed base"),
        }
    }

    #[test]
    fn test_type_of_chained_selector() {
        let dir = write_gopath(&[(
            "example/foo/foo.go",
            "package foo\n\ntype Inner struct{}\n\nfunc (i Inner) Get() int { return 0 }\n\ntype Outer struct {\n\tIn Inner\n}\n\nfunc Run(o Outer) {\n\to.In.Get()\n}\n",
        )]);
        let resolver = resolver_for(&dir);
        let pkg = resolver.import("example/foo").unwrap();
        let scope = resolver.scope("example/foo").unwrap();
        let file = &pkg.files[0];
        let synthetic = HashMap::new();
        let fs = FileScope {
            file,
            scope: &scope,
            synthetic: &synthetic,
        };

        // Operand of `.Get` is the selector `o.In`.
        let o = find_ident(file, file.root(), "o", 1).unwrap();
        let inner_selector = o.parent().unwrap();
        assert_eq!(inner_selector.kind(), "selector_expression");
        let (hit, base) = resolver
            .resolve_selector(&fs, inner_selector, "Get")
            .unwrap();
        assert_eq!(hit.object.name, "Get");
        match base {
            SelectorBase::Type(ty) => assert_eq!(ty.base_text(), "Inner"),
            SelectorBase::Package => panic!("expected a typed base"),
        }
    }

    #[test]
    fn test_type_of_address_of_literal() {
        let dir = write_gopath(&[(
            "example/foo/foo.go",
            "package foo\n\ntype Thing struct{}\n\nfunc Run() {\n\t_ = &Thing{}\n}\n",
        )]);
        let resolver = resolver_for(&dir);
        let pkg = resolver.import("example/foo").unwrap();
        let scope = resolver.scope("example/foo").unwrap();
        let file = &pkg.files[0];
        let synthetic = HashMap::new();
        let fs = FileScope {
            file,
            scope: &scope,
            synthetic: &synthetic,
        };

        let thing = find_ident(file, file.root(), "Thing", 1).unwrap();
        let literal = thing.parent().unwrap();
        assert_eq!(literal.kind(), "composite_literal");
        let unary = literal.parent().unwrap();
        let ty = resolver.type_of_expr(&fs, unary).unwrap();
        assert_eq!(ty.pointer, 1);
        assert_eq!(ty.named.as_ref().unwrap().name, "Thing");
    }

    #[test]
    fn test_synthetic_bindings_resolve() {
        let dir = write_gopath(&[("example/foo/foo.go", "package foo\n\nfunc Run() {}\n")]);
        let resolver = resolver_for(&dir);
        let pkg = resolver.import("example/foo").unwrap();
        let scope = resolver.scope("example/foo").unwrap();
        let file = &pkg.files[0];

        let mut synthetic = HashMap::new();
        synthetic.insert(
            "init".to_string(),
            Object {
                name: "init".to_string(),
                kind: ObjKind::Func,
                pkg: Some("example/foo".to_string()),
                decl_pos: Some(Position::new("foo.go", 9, 6)),
                ty: None,
                result: None,
            },
        );
        let fs = FileScope {
            file,
            scope: &scope,
            synthetic: &synthetic,
        };
        let run = find_ident(file, file.root(), "Run", 0).unwrap();
        let hit = resolver.resolve_ident(&fs, run, "init").unwrap();
        assert_eq!(hit.object.decl_pos.as_ref().unwrap().line, 9);
    }
}
