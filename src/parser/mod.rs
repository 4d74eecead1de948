use anyhow::{Context, Result};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

use crate::model::Position;

/// Create a tree-sitter parser configured for Go.
pub fn create_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .context("failed to set Go parser language")?;
    Ok(parser)
}

/// Parse Go source into a syntax tree.
pub fn parse_tree(source: &str) -> Result<Tree> {
    let mut parser = create_parser()?;
    parser.parse(source, None).context("failed to parse Go source")
}

/// The source text covered by a node.
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// The 1-based position of a node's first character.
pub fn node_position(node: Node, file: &Path) -> Position {
    let start = node.start_position();
    Position::new(file, start.row + 1, start.column + 1)
}

/// Node kinds that act as identifier leaves during traversal.
///
/// Go's predeclared `true`/`false`/`nil`/`iota` parse as dedicated leaf
/// kinds but resolve through the universe scope like any other identifier.
pub fn is_identifier_leaf(kind: &str) -> bool {
    matches!(
        kind,
        "identifier"
            | "type_identifier"
            | "field_identifier"
            | "package_identifier"
            | "true"
            | "false"
            | "nil"
            | "iota"
    )
}

/// Unquote an import path literal.
///
/// Import paths are string literals by grammar; any other node kind here
/// means the tree under inspection was not produced by the Go grammar.
pub fn string_literal_value(node: Node, source: &str) -> String {
    let quote = match node.kind() {
        "interpreted_string_literal" => '"',
        "raw_string_literal" => '`',
        other => panic!("expected string literal, found {} node", other),
    };
    let text = node_text(node, source);
    text.strip_prefix(quote)
        .and_then(|t| t.strip_suffix(quote))
        .unwrap_or(text)
        .to_string()
}

/// Collapse a possibly multi-line rendering to a single line so it can sit
/// at the tail of a serialized symbol line.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
