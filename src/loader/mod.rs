use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Tree};

use crate::model::Position;
use crate::parser;

pub mod cache;

pub use cache::PackageCache;

/// Ordered list of directories that package import paths resolve under.
#[derive(Debug, Clone)]
pub struct SearchPaths {
    roots: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new(roots: Vec<PathBuf>) -> SearchPaths {
        SearchPaths { roots }
    }

    /// Build the search roots from the environment: every `GOPATH` entry
    /// contributes `<entry>/src`, and `GOROOT` (when set) contributes
    /// `<GOROOT>/src/pkg`. The environment configures discovery only; no
    /// other part of the engine reads it.
    pub fn from_env() -> SearchPaths {
        let mut roots = Vec::new();
        if let Ok(gopath) = env::var("GOPATH") {
            for entry in env::split_paths(&gopath) {
                if !entry.as_os_str().is_empty() {
                    roots.push(entry.join("src"));
                }
            }
        }
        if let Ok(goroot) = env::var("GOROOT") {
            if !goroot.is_empty() {
                roots.push(PathBuf::from(goroot).join("src").join("pkg"));
            }
        }
        SearchPaths::new(roots)
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Load the package at `import_path` from the first root that has it.
    pub fn load_package(&self, import_path: &str) -> Result<Package> {
        for root in &self.roots {
            let dir = root.join(import_path);
            if !dir.is_dir() {
                continue;
            }
            let sources = go_sources_in(&dir)
                .with_context(|| format!("failed to list package directory {}", dir.display()))?;
            if sources.is_empty() {
                continue;
            }
            let mut files = Vec::with_capacity(sources.len());
            for path in sources {
                let source = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let file = SourceFile::parse(&path, source)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                files.push(file);
            }
            return Ok(Package {
                import_path: import_path.to_string(),
                dir,
                files,
            });
        }
        bail!("package {:?} not found under any search root", import_path)
    }

    /// Map a position back to the import path that owns its file.
    ///
    /// Every position handed here was produced from a loaded package, so
    /// both failure modes are violated invariants and abort: a position
    /// with no file name, and a file that no search root contains.
    pub fn owner_of(&self, pos: &Position) -> String {
        if pos.file.as_os_str().is_empty() {
            panic!("empty file name in position {}:{}", pos.line, pos.column);
        }
        let dir = pos.file.parent().unwrap_or_else(|| Path::new(""));
        for root in &self.roots {
            if let Ok(rel) = dir.strip_prefix(root) {
                if rel.as_os_str().is_empty() {
                    continue;
                }
                let segments: Vec<_> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect();
                return segments.join("/");
            }
        }
        panic!("cannot determine import path for {}", pos);
    }
}

/// Buildable Go sources in one directory, sorted for deterministic
/// traversal order. Test files and `.`/`_` prefixed files are skipped, as
/// the Go build rules do.
fn go_sources_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(".go")
            || name.ends_with("_test.go")
            || name.starts_with('_')
            || name.starts_with('.')
        {
            continue;
        }
        sources.push(entry.path());
    }
    sources.sort();
    Ok(sources)
}

/// One parsed Go source file.
pub struct SourceFile {
    pub path: PathBuf,
    pub source: String,
    pub tree: Tree,
}

impl SourceFile {
    pub fn parse(path: impl Into<PathBuf>, source: String) -> Result<SourceFile> {
        let tree = parser::parse_tree(&source)?;
        Ok(SourceFile {
            path: path.into(),
            source,
            tree,
        })
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn text(&self, node: Node) -> &str {
        parser::node_text(node, &self.source)
    }

    pub fn position(&self, node: Node) -> Position {
        parser::node_position(node, &self.path)
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile").field("path", &self.path).finish()
    }
}

/// One loaded package: its import path, directory, and parsed files.
#[derive(Debug)]
pub struct Package {
    pub import_path: String,
    pub dir: PathBuf,
    pub files: Vec<SourceFile>,
}
