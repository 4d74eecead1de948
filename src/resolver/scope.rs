use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tree_sitter::Node;

use crate::loader::{Package, SourceFile};
use crate::parser::{single_line, string_literal_value};

use super::{NamedType, ObjKind, Object, TypeRef};

/// Member tables for one named type.
#[derive(Debug, Default)]
pub struct TypeMembers {
    pub fields: HashMap<String, Object>,
    pub methods: HashMap<String, Object>,
}

/// Symbol tables for one loaded package, built once per package.
///
/// Construction runs in two passes: the first collects declared type names
/// and per-file import tables, the second builds objects and member tables
/// with those names available for classifying type expressions.
#[derive(Debug)]
pub struct PackageScope {
    pub import_path: String,
    /// Top-level declarations by name. `init` functions are absent; they
    /// are not referable package-scope names in Go.
    objects: HashMap<String, Object>,
    /// Member tables by declared type name.
    types: HashMap<String, TypeMembers>,
    /// Per-file import tables: binding name -> import path.
    imports: HashMap<PathBuf, HashMap<String, String>>,
    type_names: HashSet<String>,
}

/// File-level context for classifying type expressions.
pub(crate) struct TypeCtx<'a> {
    pub file: &'a SourceFile,
    pub import_path: &'a str,
    pub imports: &'a HashMap<String, String>,
    pub type_names: &'a HashSet<String>,
}

impl PackageScope {
    pub fn build(pkg: &Package) -> PackageScope {
        let mut type_names = HashSet::new();
        let mut imports = HashMap::new();
        for file in &pkg.files {
            imports.insert(file.path.clone(), import_table(file));
            let root = file.root();
            let mut cursor = root.walk();
            for decl in root.named_children(&mut cursor) {
                if decl.kind() != "type_declaration" {
                    continue;
                }
                let mut specs = decl.walk();
                for spec in decl.named_children(&mut specs) {
                    if matches!(spec.kind(), "type_spec" | "type_alias") {
                        if let Some(name) = spec.child_by_field_name("name") {
                            type_names.insert(file.text(name).to_string());
                        }
                    }
                }
            }
        }

        let mut objects = HashMap::new();
        let mut types = HashMap::new();
        for file in &pkg.files {
            let ctx = TypeCtx {
                file,
                import_path: &pkg.import_path,
                imports: &imports[&file.path],
                type_names: &type_names,
            };
            collect_file(&ctx, &mut objects, &mut types);
        }

        PackageScope {
            import_path: pkg.import_path.clone(),
            objects,
            types,
            imports,
            type_names,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Object> {
        self.objects.get(name)
    }

    pub fn members(&self, type_name: &str) -> Option<&TypeMembers> {
        self.types.get(type_name)
    }

    pub fn file_imports(&self, path: &Path) -> Option<&HashMap<String, String>> {
        self.imports.get(path)
    }

    /// Classify a type expression appearing in `file`.
    pub fn type_ref_in(&self, file: &SourceFile, node: Node) -> TypeRef {
        let empty = HashMap::new();
        let ctx = TypeCtx {
            file,
            import_path: &self.import_path,
            imports: self.imports.get(&file.path).unwrap_or(&empty),
            type_names: &self.type_names,
        };
        type_ref(&ctx, node)
    }

    /// Find the nearest function-local binding for `name` visible at `at`:
    /// receivers, parameters, named results, and var/const/type/short-var
    /// declarations lexically before the use site, innermost scope first.
    pub fn lookup_local(&self, file: &SourceFile, at: Node, name: &str) -> Option<Object> {
        if name == "_" {
            return None;
        }
        let empty = HashMap::new();
        let ctx = TypeCtx {
            file,
            import_path: &self.import_path,
            imports: self.imports.get(&file.path).unwrap_or(&empty),
            type_names: &self.type_names,
        };
        let at_start = at.start_byte();
        let mut node = at;
        while let Some(parent) = node.parent() {
            let found = match parent.kind() {
                "function_declaration" | "method_declaration" | "func_literal" => {
                    self.func_binding(&ctx, parent, name)
                }
                "block" | "expression_case" | "default_case" | "type_case"
                | "communication_case" => {
                    let mut stmts = parent.walk();
                    let mut found = None;
                    for stmt in parent.named_children(&mut stmts) {
                        if stmt.start_byte() > at_start {
                            break;
                        }
                        if let Some(obj) = self.stmt_binding(&ctx, stmt, at, name) {
                            found = Some(obj);
                            break;
                        }
                    }
                    found
                }
                "if_statement" | "expression_switch_statement" | "type_switch_statement" => parent
                    .child_by_field_name("initializer")
                    .and_then(|init| self.stmt_binding(&ctx, init, at, name)),
                "for_statement" => {
                    let mut clauses = parent.walk();
                    let mut found = None;
                    for clause in parent.named_children(&mut clauses) {
                        found = match clause.kind() {
                            "for_clause" => clause
                                .child_by_field_name("initializer")
                                .and_then(|init| self.stmt_binding(&ctx, init, at, name)),
                            "range_clause" => range_binding(&ctx, clause, at, name),
                            _ => None,
                        };
                        if found.is_some() {
                            break;
                        }
                    }
                    found
                }
                _ => None,
            };
            if found.is_some() {
                return found;
            }
            node = parent;
        }
        None
    }

    fn func_binding(&self, ctx: &TypeCtx, func: Node, name: &str) -> Option<Object> {
        for field in ["receiver", "parameters", "result"] {
            if let Some(list) = func.child_by_field_name(field) {
                if list.kind() != "parameter_list" {
                    continue;
                }
                if let Some(obj) = params_binding(ctx, list, name) {
                    return Some(obj);
                }
            }
        }
        None
    }

    fn stmt_binding(&self, ctx: &TypeCtx, stmt: Node, at: Node, name: &str) -> Option<Object> {
        let inside = at.start_byte() >= stmt.start_byte() && at.start_byte() < stmt.end_byte();
        match stmt.kind() {
            "short_var_declaration" => {
                let left = stmt.child_by_field_name("left")?;
                let mut cursor = left.walk();
                let names: Vec<Node> = left.named_children(&mut cursor).collect();
                let index = names
                    .iter()
                    .position(|n| n.kind() == "identifier" && ctx.file.text(*n) == name)?;
                // Inside the declaring statement only the bound name itself
                // resolves here; a same-named identifier on the right-hand
                // side refers to an outer binding.
                if inside && names[index] != at {
                    return None;
                }
                let ty = stmt
                    .child_by_field_name("right")
                    .and_then(|right| right.named_child(index))
                    .and_then(|value| self.value_type_ref(ctx, value));
                Some(local_object(ctx, ObjKind::Var, names[index], ty))
            }
            "var_declaration" | "const_declaration" => {
                let kind = if stmt.kind() == "var_declaration" {
                    ObjKind::Var
                } else {
                    ObjKind::Const
                };
                for spec in value_specs(stmt) {
                    let mut cursor = spec.walk();
                    let names: Vec<Node> = spec.children_by_field_name("name", &mut cursor).collect();
                    let Some(index) = names.iter().position(|n| ctx.file.text(*n) == name) else {
                        continue;
                    };
                    // Each name is in scope from the end of its own spec, so
                    // a later spec in the same group sees it while its own
                    // initializer still refers to the outer binding.
                    if inside && names[index] != at && at.start_byte() < spec.end_byte() {
                        return None;
                    }
                    let ty = match spec.child_by_field_name("type") {
                        Some(t) => Some(type_ref(ctx, t)),
                        None => spec
                            .child_by_field_name("value")
                            .and_then(|values| values.named_child(index))
                            .and_then(|value| self.value_type_ref(ctx, value)),
                    };
                    return Some(local_object(ctx, kind, names[index], ty));
                }
                None
            }
            "type_declaration" => {
                let mut specs = stmt.walk();
                for spec in stmt.named_children(&mut specs) {
                    if !matches!(spec.kind(), "type_spec" | "type_alias") {
                        continue;
                    }
                    let name_node = spec.child_by_field_name("name")?;
                    if ctx.file.text(name_node) != name {
                        continue;
                    }
                    // A type name is in scope from its identifier on, so the
                    // spec's own body and later specs in the group see it.
                    if inside && at.start_byte() < name_node.start_byte() {
                        return None;
                    }
                    return Some(local_object(ctx, ObjKind::Type, name_node, None));
                }
                None
            }
            _ => None,
        }
    }

    /// Infer the type of a right-hand-side expression: composite literals,
    /// `&T{...}`, conversions to package types, and calls to package
    /// functions with a declared single result.
    fn value_type_ref(&self, ctx: &TypeCtx, value: Node) -> Option<TypeRef> {
        if let Some(tr) = literal_type_ref(ctx, value) {
            return Some(tr);
        }
        if value.kind() == "call_expression" {
            let func = value.child_by_field_name("function")?;
            if func.kind() == "identifier" {
                let obj = self.objects.get(ctx.file.text(func))?;
                if obj.kind == ObjKind::Func {
                    return obj.result.clone();
                }
            }
        }
        None
    }
}

fn local_object(ctx: &TypeCtx, kind: ObjKind, name_node: Node, ty: Option<TypeRef>) -> Object {
    Object {
        name: ctx.file.text(name_node).to_string(),
        kind,
        pkg: Some(ctx.import_path.to_string()),
        decl_pos: Some(ctx.file.position(name_node)),
        ty,
        result: None,
    }
}

fn params_binding(ctx: &TypeCtx, list: Node, name: &str) -> Option<Object> {
    let mut cursor = list.walk();
    for param in list.named_children(&mut cursor) {
        if !matches!(
            param.kind(),
            "parameter_declaration" | "variadic_parameter_declaration"
        ) {
            continue;
        }
        let mut names = param.walk();
        for name_node in param.children_by_field_name("name", &mut names) {
            if ctx.file.text(name_node) == name {
                let ty = param.child_by_field_name("type").map(|t| type_ref(ctx, t));
                return Some(local_object(ctx, ObjKind::Var, name_node, ty));
            }
        }
    }
    None
}

fn range_binding(ctx: &TypeCtx, clause: Node, at: Node, name: &str) -> Option<Object> {
    // `range` binds its left-hand names only in the `:=` form.
    let mut declares = false;
    for i in 0..clause.child_count() {
        if let Some(child) = clause.child(i) {
            if child.kind() == ":=" {
                declares = true;
                break;
            }
        }
    }
    if !declares {
        return None;
    }
    let left = clause.child_by_field_name("left")?;
    let mut cursor = left.walk();
    let names: Vec<Node> = left.named_children(&mut cursor).collect();
    let found = names
        .iter()
        .find(|n| n.kind() == "identifier" && ctx.file.text(**n) == name)?;
    let inside = at.start_byte() >= clause.start_byte() && at.start_byte() < clause.end_byte();
    if inside && *found != at {
        return None;
    }
    Some(local_object(ctx, ObjKind::Var, *found, None))
}

// --- Declaration collection ---

fn collect_file(
    ctx: &TypeCtx,
    objects: &mut HashMap<String, Object>,
    types: &mut HashMap<String, TypeMembers>,
) {
    let root = ctx.file.root();
    let mut cursor = root.walk();
    for decl in root.named_children(&mut cursor) {
        match decl.kind() {
            "function_declaration" => collect_function(ctx, decl, objects),
            "method_declaration" => collect_method(ctx, decl, types),
            "type_declaration" => collect_type_specs(ctx, decl, objects, types),
            "const_declaration" => collect_value_specs(ctx, decl, ObjKind::Const, objects),
            "var_declaration" => collect_value_specs(ctx, decl, ObjKind::Var, objects),
            _ => {}
        }
    }
}

fn collect_function(ctx: &TypeCtx, decl: Node, objects: &mut HashMap<String, Object>) {
    let Some(name_node) = decl.child_by_field_name("name") else {
        return;
    };
    let name = ctx.file.text(name_node);
    if name == "init" {
        return;
    }
    let (sig, result) = signature(ctx, decl);
    objects.insert(
        name.to_string(),
        Object {
            name: name.to_string(),
            kind: ObjKind::Func,
            pkg: Some(ctx.import_path.to_string()),
            decl_pos: Some(ctx.file.position(name_node)),
            ty: Some(sig),
            result,
        },
    );
}

fn collect_method(ctx: &TypeCtx, decl: Node, types: &mut HashMap<String, TypeMembers>) {
    let Some(recv_name) = receiver_type_name(decl, ctx.file) else {
        return;
    };
    let Some(name_node) = decl.child_by_field_name("name") else {
        return;
    };
    let name = ctx.file.text(name_node);
    let (sig, result) = signature(ctx, decl);
    types.entry(recv_name).or_default().methods.insert(
        name.to_string(),
        Object {
            name: name.to_string(),
            kind: ObjKind::Func,
            pkg: Some(ctx.import_path.to_string()),
            decl_pos: Some(ctx.file.position(name_node)),
            ty: Some(sig),
            result,
        },
    );
}

fn collect_type_specs(
    ctx: &TypeCtx,
    decl: Node,
    objects: &mut HashMap<String, Object>,
    types: &mut HashMap<String, TypeMembers>,
) {
    let mut specs = decl.walk();
    for spec in decl.named_children(&mut specs) {
        if !matches!(spec.kind(), "type_spec" | "type_alias") {
            continue;
        }
        let Some(name_node) = spec.child_by_field_name("name") else {
            continue;
        };
        let name = ctx.file.text(name_node).to_string();
        objects.insert(
            name.clone(),
            Object {
                name: name.clone(),
                kind: ObjKind::Type,
                pkg: Some(ctx.import_path.to_string()),
                decl_pos: Some(ctx.file.position(name_node)),
                ty: None,
                result: None,
            },
        );
        if spec.kind() != "type_spec" {
            continue;
        }
        let Some(underlying) = spec.child_by_field_name("type") else {
            continue;
        };
        match underlying.kind() {
            "struct_type" => {
                let members = types.entry(name).or_default();
                collect_struct_fields(ctx, underlying, members);
            }
            "interface_type" => {
                let members = types.entry(name).or_default();
                collect_interface_methods(ctx, underlying, members);
            }
            _ => {}
        }
    }
}

fn collect_struct_fields(ctx: &TypeCtx, struct_type: Node, members: &mut TypeMembers) {
    let Some(list) = struct_type
        .named_children(&mut struct_type.walk())
        .find(|n| n.kind() == "field_declaration_list")
    else {
        return;
    };
    let mut cursor = list.walk();
    for field in list.named_children(&mut cursor) {
        if field.kind() != "field_declaration" {
            continue;
        }
        let ty_node = field.child_by_field_name("type");
        let mut names = field.walk();
        let name_nodes: Vec<Node> = field.children_by_field_name("name", &mut names).collect();
        if name_nodes.is_empty() {
            // Embedded field: named after the base type, members not
            // promoted.
            let Some(ty_node) = ty_node else { continue };
            let Some(base) = base_type_name_node(ty_node) else {
                continue;
            };
            let mut ty = type_ref(ctx, ty_node);
            // The star of an embedded `*T` sits outside the type field, as
            // an anonymous child of the field declaration.
            if matches!(field.child(0), Some(star) if star.kind() == "*") {
                ty.pointer = ty.pointer.saturating_add(1);
                ty.text.insert(0, '*');
            }
            let name = ctx.file.text(base).to_string();
            members.fields.insert(
                name.clone(),
                Object {
                    name,
                    kind: ObjKind::Var,
                    pkg: Some(ctx.import_path.to_string()),
                    decl_pos: Some(ctx.file.position(base)),
                    ty: Some(ty),
                    result: None,
                },
            );
            continue;
        }
        let ty = ty_node.map(|t| type_ref(ctx, t));
        for name_node in name_nodes {
            let name = ctx.file.text(name_node);
            if name == "_" {
                continue;
            }
            members.fields.insert(
                name.to_string(),
                Object {
                    name: name.to_string(),
                    kind: ObjKind::Var,
                    pkg: Some(ctx.import_path.to_string()),
                    decl_pos: Some(ctx.file.position(name_node)),
                    ty: ty.clone(),
                    result: None,
                },
            );
        }
    }
}

fn collect_interface_methods(ctx: &TypeCtx, interface_type: Node, members: &mut TypeMembers) {
    let mut cursor = interface_type.walk();
    for elem in interface_type.named_children(&mut cursor) {
        if elem.kind() != "method_elem" {
            continue;
        }
        let Some(name_node) = elem.child_by_field_name("name") else {
            continue;
        };
        let name = ctx.file.text(name_node);
        let (sig, result) = signature(ctx, elem);
        members.methods.insert(
            name.to_string(),
            Object {
                name: name.to_string(),
                kind: ObjKind::Func,
                pkg: Some(ctx.import_path.to_string()),
                decl_pos: Some(ctx.file.position(name_node)),
                ty: Some(sig),
                result,
            },
        );
    }
}

fn collect_value_specs(
    ctx: &TypeCtx,
    decl: Node,
    kind: ObjKind,
    objects: &mut HashMap<String, Object>,
) {
    for spec in value_specs(decl) {
        let annotation = spec.child_by_field_name("type").map(|t| type_ref(ctx, t));
        let mut values_cursor = spec.walk();
        let values: Vec<Node> = spec
            .child_by_field_name("value")
            .map(|list| list.named_children(&mut values_cursor).collect())
            .unwrap_or_default();
        let mut names = spec.walk();
        for (index, name_node) in spec.children_by_field_name("name", &mut names).enumerate() {
            let name = ctx.file.text(name_node);
            if name == "_" {
                continue;
            }
            let ty = annotation.clone().or_else(|| {
                values
                    .get(index)
                    .and_then(|value| literal_type_ref(ctx, *value))
            });
            objects.insert(
                name.to_string(),
                Object {
                    name: name.to_string(),
                    kind: kind.clone(),
                    pkg: Some(ctx.import_path.to_string()),
                    decl_pos: Some(ctx.file.position(name_node)),
                    ty,
                    result: None,
                },
            );
        }
    }
}

/// The `const_spec`/`var_spec` children of a declaration. A parenthesized
/// `var` group nests its specs under a `var_spec_list`; `const` groups
/// attach them directly.
fn value_specs(decl: Node) -> Vec<Node> {
    let mut specs = Vec::new();
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        match child.kind() {
            "const_spec" | "var_spec" => specs.push(child),
            "var_spec_list" => {
                let mut inner = child.walk();
                for spec in child.named_children(&mut inner) {
                    if spec.kind() == "var_spec" {
                        specs.push(spec);
                    }
                }
            }
            _ => {}
        }
    }
    specs
}

/// The `func(params) result` rendering of a declaration with `parameters`
/// and `result` fields, plus the single result type when there is one.
fn signature(ctx: &TypeCtx, decl: Node) -> (TypeRef, Option<TypeRef>) {
    let mut text = String::from("func");
    match decl.child_by_field_name("parameters") {
        Some(params) => text.push_str(&single_line(ctx.file.text(params))),
        None => text.push_str("()"),
    }
    let mut result_ref = None;
    if let Some(result) = decl.child_by_field_name("result") {
        text.push(' ');
        text.push_str(&single_line(ctx.file.text(result)));
        result_ref = single_result(ctx, result);
    }
    (
        TypeRef {
            text,
            named: None,
            pointer: 0,
        },
        result_ref,
    )
}

fn single_result(ctx: &TypeCtx, result: Node) -> Option<TypeRef> {
    if result.kind() != "parameter_list" {
        return Some(type_ref(ctx, result));
    }
    let mut cursor = result.walk();
    let decls: Vec<Node> = result
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "parameter_declaration")
        .collect();
    if decls.len() != 1 {
        return None;
    }
    let decl = decls[0];
    let mut names = decl.walk();
    if decl.children_by_field_name("name", &mut names).count() > 1 {
        return None;
    }
    decl.child_by_field_name("type").map(|t| type_ref(ctx, t))
}

// --- Type expressions ---

/// Classify a type expression: rendered text, pointer depth, and the named
/// type it denotes once pointers are stripped.
pub(crate) fn type_ref(ctx: &TypeCtx, node: Node) -> TypeRef {
    let text = single_line(ctx.file.text(node));
    let mut pointer: u8 = 0;
    let mut core = node;
    loop {
        core = match core.kind() {
            "pointer_type" => {
                pointer = pointer.saturating_add(1);
                match core.named_child(0) {
                    Some(inner) => inner,
                    None => break,
                }
            }
            "parenthesized_type" => match core.named_child(0) {
                Some(inner) => inner,
                None => break,
            },
            "generic_type" => match core.child_by_field_name("type") {
                Some(inner) => inner,
                None => break,
            },
            _ => break,
        };
    }
    let named = match core.kind() {
        "type_identifier" => {
            let name = ctx.file.text(core);
            // A predeclared type name denotes the universe type unless the
            // package shadows it.
            if is_universe_type(name) && !ctx.type_names.contains(name) {
                None
            } else {
                Some(NamedType {
                    pkg: ctx.import_path.to_string(),
                    name: name.to_string(),
                })
            }
        }
        "qualified_type" => qualified_named(ctx, core),
        _ => None,
    };
    TypeRef {
        text,
        named,
        pointer,
    }
}

fn qualified_named(ctx: &TypeCtx, node: Node) -> Option<NamedType> {
    let pkg_node = node.child_by_field_name("package")?;
    let name_node = node.child_by_field_name("name")?;
    let import_path = ctx.imports.get(ctx.file.text(pkg_node))?;
    Some(NamedType {
        pkg: import_path.clone(),
        name: ctx.file.text(name_node).to_string(),
    })
}

/// Infer a type from a literal-shaped value expression: `T{...}`,
/// `&T{...}`, or a conversion to a declared package type.
pub(crate) fn literal_type_ref(ctx: &TypeCtx, value: Node) -> Option<TypeRef> {
    match value.kind() {
        "composite_literal" => value
            .child_by_field_name("type")
            .map(|t| type_ref(ctx, t)),
        "unary_expression" => {
            let op = value.child_by_field_name("operator")?;
            let operand = value.child_by_field_name("operand")?;
            if ctx.file.text(op) != "&" || operand.kind() != "composite_literal" {
                return None;
            }
            let base = literal_type_ref(ctx, operand)?;
            Some(TypeRef {
                text: format!("*{}", base.text),
                named: base.named,
                pointer: base.pointer.saturating_add(1),
            })
        }
        "call_expression" => {
            let func = value.child_by_field_name("function")?;
            if func.kind() != "identifier" {
                return None;
            }
            let name = ctx.file.text(func);
            if !ctx.type_names.contains(name) {
                return None;
            }
            Some(TypeRef {
                text: name.to_string(),
                named: Some(NamedType {
                    pkg: ctx.import_path.to_string(),
                    name: name.to_string(),
                }),
                pointer: 0,
            })
        }
        _ => None,
    }
}

/// The base type-name node under pointers, parentheses, generic
/// instantiations, and package qualification.
pub(crate) fn base_type_name_node(node: Node) -> Option<Node> {
    let mut core = node;
    loop {
        core = match core.kind() {
            "type_identifier" => return Some(core),
            "qualified_type" => return core.child_by_field_name("name"),
            "pointer_type" | "parenthesized_type" => core.named_child(0)?,
            "generic_type" => core.child_by_field_name("type")?,
            _ => return None,
        };
    }
}

/// The declared name of a method's receiver type.
pub(crate) fn receiver_type_name(decl: Node, file: &SourceFile) -> Option<String> {
    let recv = decl.child_by_field_name("receiver")?;
    let mut cursor = recv.walk();
    let param = recv.named_children(&mut cursor).find(|n| {
        matches!(
            n.kind(),
            "parameter_declaration" | "variadic_parameter_declaration"
        )
    })?;
    let ty = param.child_by_field_name("type")?;
    let base = base_type_name_node(ty)?;
    Some(file.text(base).to_string())
}

// --- Imports ---

fn import_table(file: &SourceFile) -> HashMap<String, String> {
    let mut table = HashMap::new();
    let root = file.root();
    let mut cursor = root.walk();
    for decl in root.named_children(&mut cursor) {
        if decl.kind() != "import_declaration" {
            continue;
        }
        each_import_spec(decl, &mut |spec| {
            let Some(path_node) = spec.child_by_field_name("path") else {
                return;
            };
            let path = string_literal_value(path_node, &file.source);
            match spec.child_by_field_name("name") {
                Some(name) if name.kind() == "package_identifier" => {
                    table.insert(file.text(name).to_string(), path);
                }
                // Dot and blank imports bind no package name.
                Some(_) => {}
                None => {
                    let binding = path.rsplit('/').next().unwrap_or(&path).to_string();
                    table.insert(binding, path);
                }
            }
        });
    }
    table
}

pub(crate) fn each_import_spec(decl: Node, f: &mut dyn FnMut(Node)) {
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => f(child),
            "import_spec_list" => {
                let mut specs = child.walk();
                for spec in child.named_children(&mut specs) {
                    if spec.kind() == "import_spec" {
                        f(spec);
                    }
                }
            }
            _ => {}
        }
    }
}

// --- Universe ---

/// Look up one of Go's predeclared identifiers.
pub fn universe_lookup(name: &str) -> Option<Object> {
    let kind = match name {
        "any" | "bool" | "byte" | "comparable" | "complex64" | "complex128" | "error"
        | "float32" | "float64" | "int" | "int8" | "int16" | "int32" | "int64" | "rune"
        | "string" | "uint" | "uint8" | "uint16" | "uint32" | "uint64" | "uintptr" => ObjKind::Type,
        "true" | "false" | "iota" | "nil" => ObjKind::Const,
        "append" | "cap" | "clear" | "close" | "complex" | "copy" | "delete" | "imag" | "len"
        | "make" | "max" | "min" | "new" | "panic" | "print" | "println" | "real" | "recover" => {
            ObjKind::Func
        }
        _ => return None,
    };
    Some(Object {
        name: name.to_string(),
        kind,
        pkg: None,
        decl_pos: None,
        ty: None,
        result: None,
    })
}

fn is_universe_type(name: &str) -> bool {
    matches!(universe_lookup(name), Some(obj) if obj.kind == ObjKind::Type)
}
