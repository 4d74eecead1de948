use anyhow::Result;

use crate::loader::SearchPaths;
use crate::model::line::{SymbolLine, UNIVERSE};
use crate::model::KindMask;
use crate::resolver::Resolver;
use crate::visit::{self, Flow, Occurrence};

/// Per-run configuration, fixed at startup and threaded through every
/// call that needs it.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Report expressions that fail to resolve.
    pub verbose: bool,
    /// Append resolved type text to each line.
    pub print_type: bool,
    /// Include predeclared (universe) symbols.
    pub include_all: bool,
    pub kinds: KindMask,
}

/// Build the output line for one occurrence, or drop it: package names
/// carry no symbol kind, masked-out kinds are filtered, and universe
/// symbols only pass when include-all is set.
///
/// Panics if a non-universe object has no declaration position; every
/// occurrence reaching this point was resolved inside a loaded package.
pub fn line_for(occ: &Occurrence, paths: &SearchPaths, opts: &Options) -> Option<SymbolLine> {
    let kind = occ.object.kind.symbol_kind()?;
    if !opts.kinds.contains(kind) {
        return None;
    }
    if occ.universe && !opts.include_all {
        return None;
    }
    let owner_pkg = paths.owner_of(&occ.pos);
    let (refer_pkg, definition) = if occ.universe {
        (UNIVERSE.to_string(), false)
    } else {
        let Some(decl_pos) = &occ.object.decl_pos else {
            panic!("object {:?} has no declaration position", occ.object.name);
        };
        (paths.owner_of(decl_pos), *decl_pos == occ.pos)
    };
    let type_text = if opts.print_type {
        occ.object.ty.as_ref().map(|ty| ty.text.clone())
    } else {
        None
    };
    Some(SymbolLine {
        pos: occ.pos.clone(),
        owner_pkg,
        refer_pkg,
        local: false,
        expr: occ.expr.clone(),
        kind,
        definition,
        type_text,
    })
}

/// Extract every reportable symbol line from one package, in file order
/// then source order within each file.
pub fn package_lines(
    resolver: &Resolver,
    import_path: &str,
    opts: &Options,
) -> Result<Vec<SymbolLine>> {
    let pkg = resolver.import(import_path)?;
    let scope = resolver.scope(import_path)?;
    let mut lines = Vec::new();
    for file in &pkg.files {
        visit::walk_file(file, &scope, resolver, opts, &mut |occ| {
            if let Some(line) = line_for(occ, resolver.search_paths(), opts) {
                lines.push(line);
            }
            Flow::Continue
        });
    }
    Ok(lines)
}
