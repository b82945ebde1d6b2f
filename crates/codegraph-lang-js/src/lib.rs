//! Per-language analyzer for JavaScript/TypeScript: drives
//! `tree-sitter-javascript`/`tree-sitter-typescript` plus the visitor
//! framework's `Collector` to produce one module's `ASTCollections`.
//!
//! A single pass walks the tree once and emits info records rather than
//! building graph nodes and edges directly, keeping this crate free of any
//! dependency on node/edge construction.

use codegraph_core::{CodeGraphError, Location, Result};
use codegraph_records::{ComplexExprKind, LiteralKind, PromiseResolutionKind, RhsExpr, ScopeKind};
use codegraph_util::location_from_positions;
use codegraph_visitor::{ASTCollections, Collector};
use tree_sitter::{Node, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsDialect {
    JavaScript,
    TypeScript,
}

pub struct JsAnalyzer;

impl JsAnalyzer {
    pub fn analyze(file: &str, source: &str, dialect: JsDialect) -> Result<ASTCollections> {
        let mut parser = Parser::new();
        let language = match dialect {
            JsDialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            JsDialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        };
        parser
            .set_language(&language)
            .map_err(|e| CodeGraphError::Parse(e.to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| CodeGraphError::Parse("tree-sitter produced no tree".to_string()))?;

        let mut walker = Walker {
            source,
            collector: Collector::new(file),
            function_names: Vec::new(),
        };
        walker.walk(tree.root_node());
        Ok(walker.collector.into_collections())
    }
}

struct Walker<'a> {
    source: &'a str,
    collector: Collector,
    function_names: Vec<String>,
}

impl<'a> Walker<'a> {
    fn text(&self, node: &Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn location(&self, node: &Node) -> Location {
        let start = node.start_position();
        let end = node.end_position();
        location_from_positions(start.row, start.column, end.row, end.column)
    }

    fn current_function(&self) -> Option<String> {
        self.function_names.last().cloned()
    }

    /// Recurses into every child of `node` without any scope bookkeeping —
    /// the default fallthrough for node kinds with no special handling.
    fn recurse_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                self.walk(cursor.node());
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
    }

    fn walk(&mut self, node: Node) {
        match node.kind() {
            "function_declaration" | "function_expression" | "function" | "arrow_function"
            | "generator_function_declaration" | "generator_function" | "method_definition" => {
                self.visit_function(node);
                return;
            }
            "class_declaration" | "class" => {
                self.visit_class(node, node.kind() == "class");
                return;
            }
            "lexical_declaration" | "variable_declaration" => self.visit_variable_declaration(node),
            "assignment_expression" => self.visit_assignment_expression(node),
            "call_expression" => self.visit_call_expression(node),
            "return_statement" => self.visit_return(node),
            "yield_expression" => self.visit_yield(node),
            "import_statement" => self.visit_import(node),
            "export_statement" => self.visit_export(node),
            "for_statement" | "for_in_statement" | "while_statement" | "do_statement" => {
                self.visit_loop(node)
            }
            "if_statement" => self.visit_branch(node),
            "try_statement" => self.visit_try(node),
            "string" | "template_string" | "number" | "true" | "false" | "null" | "regex" => {
                self.visit_literal(node)
            }
            "object" => self.visit_object_literal(node),
            "array" => self.visit_array_literal(node),
            "update_expression" => self.visit_update_expression(node),
            "identifier" if self.text(&node) == "undefined" => self.visit_literal(node),
            "await_expression" => {
                if self.function_names.is_empty() {
                    self.collector.mark_top_level_await();
                }
            }
            "member_expression" => {
                if self.is_import_meta(&node) {
                    self.collector.mark_import_meta();
                }
            }
            _ => {}
        }
        self.recurse_children(node);
    }

    fn is_import_meta(&self, node: &Node) -> bool {
        let object = node.child_by_field_name("object").map(|n| self.text(&n));
        let property = node.child_by_field_name("property").map(|n| self.text(&n));
        matches!((object, property), (Some("import"), Some("meta")))
    }

    // -- functions ---------------------------------------------------------

    fn visit_function(&mut self, node: Node) {
        let name = self
            .child_text_by_field_or_kind(&node, "name", &["identifier", "property_identifier"])
            .unwrap_or_else(|| "<anonymous>".to_string());
        let is_generator = self.has_child_of_kind(&node, "*")
            || self.text(&node).trim_start().starts_with("function*");
        let is_async = self.node_has_leading_keyword(&node, "async");
        let location = self.location(&node);

        let mut params = Vec::new();
        if let Some(params_node) = node.child_by_field_name("parameters") {
            let mut cursor = params_node.walk();
            for child in params_node.children(&mut cursor) {
                match child.kind() {
                    "identifier" => {
                        params.push((self.text(&child).to_string(), self.location(&child)));
                    }
                    "required_parameter" | "optional_parameter" => {
                        if let Some(pat) = child.child_by_field_name("pattern") {
                            for n in codegraph_util::extract_pattern_names(self.text(&pat)) {
                                params.push((n, self.location(&pat)));
                            }
                        }
                    }
                    "object_pattern" | "array_pattern" => {
                        for n in codegraph_util::extract_pattern_names(self.text(&child)) {
                            params.push((n, self.location(&child)));
                        }
                    }
                    "assignment_pattern" => {
                        if let Some(left) = child.child_by_field_name("left") {
                            params.push((self.text(&left).to_string(), self.location(&left)));
                        }
                    }
                    "rest_pattern" => {
                        if let Some(id) = child.named_child(0) {
                            params.push((self.text(&id).to_string(), self.location(&id)));
                        }
                    }
                    _ => {}
                }
            }
        }

        self.collector
            .emit_function(name.clone(), location, is_generator, is_async, params);
        self.collector
            .enter_scope(name.clone(), ScopeKind::Function, location);
        self.function_names.push(name);
        self.recurse_children(node);
        self.function_names.pop();
        self.collector.exit_scope();
    }

    fn has_child_of_kind(&self, node: &Node, kind: &str) -> bool {
        let mut cursor = node.walk();
        node.children(&mut cursor).any(|c| c.kind() == kind)
    }

    fn node_has_leading_keyword(&self, node: &Node, keyword: &str) -> bool {
        if let Some(prev) = node.prev_sibling() {
            if prev.kind() == keyword {
                return true;
            }
        }
        self.text(node).trim_start().starts_with(keyword)
    }

    fn child_text_by_field_or_kind(
        &self,
        node: &Node,
        field: &str,
        kinds: &[&str],
    ) -> Option<String> {
        if let Some(n) = node.child_by_field_name(field) {
            return Some(self.text(&n).to_string());
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if kinds.contains(&child.kind()) {
                return Some(self.text(&child).to_string());
            }
        }
        None
    }

    // -- classes -------------------------------------------------------------

    fn visit_class(&mut self, node: Node, is_expression: bool) {
        let name = self
            .child_text_by_field_or_kind(&node, "name", &["type_identifier", "identifier"])
            .unwrap_or_else(|| "<anonymous>".to_string());
        let superclass = node
            .child_by_field_name("heritage")
            .map(|h| self.text(&h).to_string())
            .or_else(|| {
                self.child_text_by_field_or_kind(&node, "superclass", &["identifier"])
            });
        let location = self.location(&node);

        self.collector.emit_class_declaration(
            name.clone(),
            location,
            superclass,
            Vec::new(),
            is_expression,
        );
        self.collector
            .enter_scope(name, ScopeKind::Class, location);

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.children(&mut cursor) {
                if member.kind() == "field_definition" || member.kind() == "public_field_definition"
                {
                    self.visit_class_field(member);
                } else {
                    self.walk(member);
                }
            }
        }
        self.collector.exit_scope();
    }

    fn visit_class_field(&mut self, node: Node) {
        let name_node = node
            .child_by_field_name("property")
            .or_else(|| node.child_by_field_name("name"));
        let Some(name_node) = name_node else {
            tracing::debug!("class field with no resolvable name, skipping");
            return;
        };
        let name = self.text(&name_node).to_string();
        let location = self.location(&node);
        let value = node.child_by_field_name("value");

        self.collector
            .emit_variable_declaration(name.clone(), location, false, value.is_none());

        if let Some(value_node) = value {
            if let Some(rhs) = self.classify_rhs(value_node) {
                self.collector.emit_variable_assignment(name, rhs, location);
            }
            self.walk(value_node);
        }
    }

    // -- variable declarations / assignments ---------------------------------

    fn visit_variable_declaration(&mut self, node: Node) {
        let is_const = node
            .child(0)
            .map(|k| k.kind() == "const")
            .unwrap_or(false);

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = child.child_by_field_name("name") else {
                continue;
            };
            let location = self.location(&child);
            let value = child.child_by_field_name("value");

            match name_node.kind() {
                "identifier" => {
                    let name = self.text(&name_node).to_string();
                    self.collector
                        .emit_variable_declaration(name.clone(), location, is_const, false);
                    if let Some(value_node) = value {
                        if let Some(class_name) = self.as_new_expression_class(value_node) {
                            self.collector.emit_class_instantiation(
                                name.clone(),
                                class_name,
                                location,
                            );
                        }
                        if let Some(rhs) = self.classify_rhs(value_node) {
                            self.collector.emit_variable_assignment(name, rhs, location);
                        }
                        self.walk(value_node);
                    }
                }
                "object_pattern" | "array_pattern" => {
                    for n in codegraph_util::extract_pattern_names(self.text(&name_node)) {
                        self.collector
                            .emit_variable_declaration(n, location, is_const, false);
                    }
                    if let Some(value_node) = value {
                        self.walk(value_node);
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_assignment_expression(&mut self, node: Node) {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            self.recurse_children(node);
            return;
        };
        if left.kind() == "identifier" {
            let name = self.text(&left).to_string();
            let location = self.location(&node);
            if let Some(class_name) = self.as_new_expression_class(right) {
                self.collector
                    .emit_class_instantiation(name.clone(), class_name, location);
            }
            if let Some(rhs) = self.classify_rhs(right) {
                self.collector.emit_variable_assignment(name, rhs, location);
            }
        }
        self.walk(right);
    }

    fn as_new_expression_class(&self, node: Node) -> Option<String> {
        if node.kind() != "new_expression" {
            return None;
        }
        node.child_by_field_name("constructor")
            .map(|c| self.text(&c).to_string())
    }

    // -- calls ---------------------------------------------------------------

    fn visit_call_expression(&mut self, node: Node) {
        let Some(function_node) = node.child_by_field_name("function") else {
            self.recurse_children(node);
            return;
        };
        let location = self.location(&node);
        let args = node
            .child_by_field_name("arguments")
            .map(|a| self.collect_arg_names(a))
            .unwrap_or_default();

        match function_node.kind() {
            "member_expression" => {
                let object = function_node
                    .child_by_field_name("object")
                    .map(|n| self.text(&n).to_string())
                    .unwrap_or_default();
                let property = function_node
                    .child_by_field_name("property")
                    .map(|n| self.text(&n).to_string())
                    .unwrap_or_default();
                self.collector
                    .emit_method_call(object.clone(), property.clone(), location, args.clone());
                self.maybe_emit_promise_resolution(&object, &property, location);
                self.maybe_emit_http_request(&object, &property, location);
                self.maybe_emit_stdio_usage(&object, location);
                self.maybe_emit_event_listener(&property, &args, location);
                self.maybe_emit_fs_operation(&object, &property, location);
                self.maybe_emit_db_query(&object, &property, location);
            }
            _ => {
                let callee = self.text(&function_node).to_string();
                if callee == "fetch" {
                    self.collector.emit_http_request(location);
                }
                self.collector.emit_call_site(callee, location, args);
            }
        }
        self.recurse_children(node);
    }

    fn maybe_emit_promise_resolution(&mut self, object: &str, method: &str, location: Location) {
        let kind = match method {
            "then" => Some(PromiseResolutionKind::Then),
            "catch" => Some(PromiseResolutionKind::Catch),
            "finally" => Some(PromiseResolutionKind::Finally),
            _ => None,
        };
        if let Some(kind) = kind {
            self.collector
                .emit_promise_resolution(object.to_string(), kind, location);
        }
    }

    /// `http.request(...)`/`http.get(...)`/`https.request(...)`: the "http
    /// module, request-shaped method" pattern `fetch()` also produces.
    fn maybe_emit_http_request(&mut self, object: &str, method: &str, location: Location) {
        let is_http_module = matches!(object, "http" | "https");
        let is_request_call = matches!(method, "request" | "get");
        if is_http_module && is_request_call {
            self.collector.emit_http_request(location);
        }
    }

    /// `process.stdin`/`process.stdout`/`process.stderr` accessed as the
    /// object of a method call (`process.stdout.write(...)`).
    fn maybe_emit_stdio_usage(&mut self, object: &str, location: Location) {
        if matches!(object, "process.stdin" | "process.stdout" | "process.stderr") {
            self.collector.emit_stdio_usage(location);
        }
    }

    fn maybe_emit_event_listener(&mut self, method: &str, args: &[String], location: Location) {
        if method != "addEventListener" {
            return;
        }
        let event_name = args
            .first()
            .map(|s| s.trim_matches(['"', '\'']).to_string())
            .unwrap_or_else(|| "event".to_string());
        self.collector.emit_event_listener(event_name, location);
    }

    /// `fs.readFile*`/`fs.writeFile*`/`fsPromises.*`: any call on the
    /// conventional Node `fs` module binding.
    fn maybe_emit_fs_operation(&mut self, object: &str, method: &str, location: Location) {
        if matches!(object, "fs" | "fsPromises" | "fs/promises") {
            self.collector.emit_fs_operation(method.to_string(), location);
        }
    }

    /// `<client>.query(...)`/`<client>.execute(...)`: a driver-agnostic
    /// heuristic, since the database client's own type is never known to a
    /// syntax-only analyzer.
    fn maybe_emit_db_query(&mut self, _object: &str, method: &str, location: Location) {
        if matches!(method, "query" | "execute") {
            self.collector.emit_db_query(location);
        }
    }

    fn collect_arg_names(&self, args_node: Node) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = args_node.walk();
        for child in args_node.named_children(&mut cursor) {
            names.push(self.text(&child).to_string());
        }
        names
    }

    // -- return / yield --------------------------------------------------------

    fn visit_return(&mut self, node: Node) {
        let Some(function_name) = self.current_function() else {
            tracing::debug!("return statement outside of any tracked function, skipping");
            self.recurse_children(node);
            return;
        };
        let location = self.location(&node);
        let argument = node.named_child(0);
        let rhs = argument.and_then(|a| self.classify_rhs(a));
        self.collector.emit_return(function_name, rhs, location);
        self.recurse_children(node);
    }

    fn visit_yield(&mut self, node: Node) {
        let Some(function_name) = self.current_function() else {
            tracing::debug!("yield expression outside of any tracked function, skipping");
            self.recurse_children(node);
            return;
        };
        let is_delegate = self.node_has_leading_keyword(&node, "yield*")
            || self.text(&node).trim_start().starts_with("yield*");
        let location = self.location(&node);
        let argument = node.named_child(0);
        let rhs = argument.and_then(|a| self.classify_rhs(a));
        self.collector
            .emit_yield(function_name, rhs, is_delegate, location);
        self.recurse_children(node);
    }

    // -- imports / exports -----------------------------------------------------

    fn visit_import(&mut self, node: Node) {
        let Some(source_node) = node.child_by_field_name("source") else {
            self.recurse_children(node);
            return;
        };
        let source = self
            .text(&source_node)
            .trim_matches(['"', '\''])
            .to_string();
        let is_external = !(source.starts_with('.') || source.starts_with('/'));
        let location = self.location(&node);

        let mut specifiers = Vec::new();
        if let Some(clause) = node.child_by_field_name("clause").or_else(|| {
            node.named_children(&mut node.walk())
                .find(|c| c.kind() == "import_clause")
        }) {
            self.collect_import_specifiers(clause, &mut specifiers);
        }

        self.collector
            .emit_import(source, specifiers, location, is_external);
    }

    fn collect_import_specifiers(
        &self,
        clause: Node,
        out: &mut Vec<codegraph_records::ImportSpecifierInfo>,
    ) {
        let mut cursor = clause.walk();
        for child in clause.children(&mut cursor) {
            match child.kind() {
                "identifier" => {
                    let name = self.text(&child).to_string();
                    out.push(self.specifier(&name, &name, &child));
                }
                "namespace_import" => {
                    if let Some(id) = child.named_child(0) {
                        let name = self.text(&id).to_string();
                        out.push(self.specifier(&format!("* as {name}"), &name, &child));
                    }
                }
                "named_imports" => {
                    let mut ic = child.walk();
                    for spec in child.children(&mut ic) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let imported = spec
                            .child_by_field_name("name")
                            .map(|n| self.text(&n).to_string())
                            .unwrap_or_default();
                        let local = spec
                            .child_by_field_name("alias")
                            .map(|n| self.text(&n).to_string())
                            .unwrap_or_else(|| imported.clone());
                        out.push(self.specifier(&imported, &local, &spec));
                    }
                }
                _ => {}
            }
        }
    }

    fn specifier(
        &self,
        imported_name: &str,
        local_name: &str,
        node: &Node,
    ) -> codegraph_records::ImportSpecifierInfo {
        let start = node.start_position();
        let end = node.end_position();
        let (column, end_column) = if start.row == end.row {
            (start.column as u32, end.column as u32)
        } else {
            (0, 0)
        };
        codegraph_records::ImportSpecifierInfo {
            imported_name: imported_name.to_string(),
            local_name: local_name.to_string(),
            column,
            end_column,
        }
    }

    fn visit_export(&mut self, node: Node) {
        let location = self.location(&node);
        let is_re_export = node.child_by_field_name("source").is_some();
        let re_export_source = node
            .child_by_field_name("source")
            .map(|n| self.text(&n).trim_matches(['"', '\'']).to_string());

        if let Some(decl) = node.child_by_field_name("declaration") {
            let name = self
                .child_text_by_field_or_kind(&decl, "name", &["identifier", "type_identifier"])
                .unwrap_or_else(|| "<default>".to_string());
            self.collector
                .emit_export(name, location, is_re_export, re_export_source.clone());
            self.walk(decl);
            return;
        }

        let mut cursor = node.walk();
        let mut found_any = false;
        for child in node.children(&mut cursor) {
            if child.kind() == "export_clause" {
                let mut ic = child.walk();
                for spec in child.children(&mut ic) {
                    if spec.kind() == "export_specifier" {
                        found_any = true;
                        let name = spec
                            .child_by_field_name("name")
                            .map(|n| self.text(&n).to_string())
                            .unwrap_or_default();
                        self.collector.emit_export(
                            name,
                            location,
                            is_re_export,
                            re_export_source.clone(),
                        );
                    }
                }
            }
        }
        if !found_any && re_export_source.is_some() {
            self.collector
                .emit_export("*".to_string(), location, true, re_export_source);
        }
    }

    // -- control flow -----------------------------------------------------------

    fn visit_loop(&mut self, node: Node) {
        let location = self.location(&node);
        let iterable_name = node
            .child_by_field_name("right")
            .map(|n| self.text(&n).to_string());
        self.collector.emit_loop(location, iterable_name);
        self.recurse_children(node);
    }

    fn visit_branch(&mut self, node: Node) {
        let location = self.location(&node);
        let condition_text = node
            .child_by_field_name("condition")
            .map(|n| self.text(&n).to_string())
            .unwrap_or_default();
        self.collector.emit_branch(location, condition_text);
        self.recurse_children(node);
    }

    fn visit_try(&mut self, node: Node) {
        let location = self.location(&node);
        let handler = node.child_by_field_name("handler");
        let finalizer = node.child_by_field_name("finalizer");
        let catch_param = handler.and_then(|h| {
            h.child_by_field_name("parameter")
                .map(|p| self.text(&p).to_string())
        });
        self.collector.emit_try_block(
            location,
            handler.is_some(),
            finalizer.is_some(),
            catch_param,
        );
        self.recurse_children(node);
    }

    // -- literals ----------------------------------------------------------------

    fn visit_literal(&mut self, node: Node) {
        let kind = match node.kind() {
            "string" => LiteralKind::String,
            "number" => LiteralKind::Number,
            "true" | "false" => LiteralKind::Boolean,
            "null" => LiteralKind::Null,
            "regex" => LiteralKind::Regex,
            "identifier" => LiteralKind::Undefined,
            "template_string" => {
                if self.template_has_substitution(&node) {
                    let location = self.location(&node);
                    let operands = self.extract_identifier_operands(node);
                    self.collector.emit_variable_assignment(
                        "<template>",
                        RhsExpr::Complex {
                            kind: ComplexExprKind::Template,
                            operand_names: operands,
                        },
                        location,
                    );
                    return;
                }
                LiteralKind::Template
            }
            _ => return,
        };
        let location = self.location(&node);
        self.collector.emit_literal(kind, self.text(&node), location);
    }

    fn template_has_substitution(&self, node: &Node) -> bool {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .any(|c| c.kind() == "template_substitution")
    }

    fn extract_identifier_operands(&self, node: Node) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_identifiers(node, &mut names);
        names.sort();
        names.dedup();
        names
    }

    fn collect_identifiers(&self, node: Node, out: &mut Vec<String>) {
        if node.kind() == "identifier" {
            out.push(self.text(&node).to_string());
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_identifiers(child, out);
        }
    }

    fn visit_object_literal(&mut self, node: Node) {
        let location = self.location(&node);
        let mut property_names = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "pair" {
                if let Some(key) = child.child_by_field_name("key") {
                    property_names.push(self.text(&key).to_string());
                }
            } else if child.kind() == "shorthand_property_identifier" {
                property_names.push(self.text(&child).to_string());
            }
        }
        self.collector.emit_object_literal(location, property_names);
        self.recurse_children(node);
    }

    fn visit_array_literal(&mut self, node: Node) {
        let location = self.location(&node);
        let count = node.named_child_count();
        self.collector.emit_array_literal(location, count);
        self.recurse_children(node);
    }

    fn visit_update_expression(&mut self, node: Node) {
        let location = self.location(&node);
        let argument = node.child_by_field_name("argument");
        let target_name = argument
            .map(|a| self.text(&a).to_string())
            .unwrap_or_default();
        let is_prefix = node
            .child(0)
            .map(|c| matches!(c.kind(), "++" | "--"))
            .unwrap_or(false);
        let operator = if self.text(&node).contains("--") {
            "--"
        } else {
            "++"
        }
        .to_string();
        self.collector
            .emit_update_expression(target_name, operator, is_prefix, location);
        self.recurse_children(node);
    }

    // -- RHS classification -------------------------------------------------------

    /// Classifies the RHS of an assignment/return/yield without re-traversing
    /// later.
    fn classify_rhs(&self, node: Node) -> Option<RhsExpr> {
        match node.kind() {
            "string" => Some(RhsExpr::Literal {
                kind: LiteralKind::String,
                text: self.text(&node).to_string(),
            }),
            "number" => Some(RhsExpr::Literal {
                kind: LiteralKind::Number,
                text: self.text(&node).to_string(),
            }),
            "true" | "false" => Some(RhsExpr::Literal {
                kind: LiteralKind::Boolean,
                text: self.text(&node).to_string(),
            }),
            "null" => Some(RhsExpr::Literal {
                kind: LiteralKind::Null,
                text: self.text(&node).to_string(),
            }),
            "regex" => Some(RhsExpr::Literal {
                kind: LiteralKind::Regex,
                text: self.text(&node).to_string(),
            }),
            "identifier" if self.text(&node) == "undefined" => Some(RhsExpr::Literal {
                kind: LiteralKind::Undefined,
                text: "undefined".to_string(),
            }),
            "identifier" => Some(RhsExpr::VariableRef(self.text(&node).to_string())),
            "object" => Some(RhsExpr::Literal {
                kind: LiteralKind::Object,
                text: self.text(&node).to_string(),
            }),
            "array" => Some(RhsExpr::Literal {
                kind: LiteralKind::Array,
                text: self.text(&node).to_string(),
            }),
            "new_expression" => node
                .child_by_field_name("constructor")
                .map(|c| RhsExpr::New {
                    class_name: self.text(&c).to_string(),
                }),
            "member_expression" => {
                let object = node.child_by_field_name("object")?;
                let property = node.child_by_field_name("property")?;
                Some(RhsExpr::Member {
                    object: self.text(&object).to_string(),
                    property: self.text(&property).to_string(),
                })
            }
            "call_expression" => {
                let function_node = node.child_by_field_name("function")?;
                match function_node.kind() {
                    "member_expression" => {
                        let object = function_node.child_by_field_name("object")?;
                        let property = function_node.child_by_field_name("property")?;
                        Some(RhsExpr::MethodCall {
                            object: self.text(&object).to_string(),
                            method: self.text(&property).to_string(),
                        })
                    }
                    _ => Some(RhsExpr::Call {
                        callee: self.text(&function_node).to_string(),
                    }),
                }
            }
            "binary_expression" => Some(RhsExpr::Complex {
                kind: ComplexExprKind::Binary,
                operand_names: self.extract_identifier_operands(node),
            }),
            "unary_expression" => Some(RhsExpr::Complex {
                kind: ComplexExprKind::Unary,
                operand_names: self.extract_identifier_operands(node),
            }),
            "ternary_expression" => Some(RhsExpr::Complex {
                kind: ComplexExprKind::Conditional,
                operand_names: self.extract_identifier_operands(node),
            }),
            "template_string" if self.template_has_substitution(&node) => Some(RhsExpr::Complex {
                kind: ComplexExprKind::Template,
                operand_names: self.extract_identifier_operands(node),
            }),
            "template_string" => Some(RhsExpr::Literal {
                kind: LiteralKind::Template,
                text: self.text(&node).to_string(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_and_instantiation_emit_expected_records() {
        let source = "class SocketService {}\nconst s = new SocketService();\n";
        let collections = JsAnalyzer::analyze("demo.js", source, JsDialect::JavaScript).unwrap();
        assert_eq!(collections.class_declarations.len(), 1);
        assert_eq!(collections.class_declarations[0].name, "SocketService");
        assert_eq!(collections.class_instantiations.len(), 1);
        assert_eq!(collections.class_instantiations[0].class_name, "SocketService");
        assert_eq!(collections.class_instantiations[0].variable_name, "s");
    }

    #[test]
    fn multi_specifier_import_captures_distinct_columns() {
        let source = "import { join, resolve, basename } from 'path';\n";
        let collections = JsAnalyzer::analyze("index.ts", source, JsDialect::TypeScript).unwrap();
        assert_eq!(collections.imports.len(), 1);
        let import = &collections.imports[0];
        assert!(import.is_external_package);
        assert_eq!(import.specifiers.len(), 3);
        let names: Vec<_> = import
            .specifiers
            .iter()
            .map(|s| s.imported_name.as_str())
            .collect();
        assert_eq!(names, vec!["join", "resolve", "basename"]);
        let cols: Vec<_> = import.specifiers.iter().map(|s| s.column).collect();
        assert!(cols.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn class_field_with_initializer_wires_assignment() {
        let source = "class C { x = 42; }\n";
        let collections = JsAnalyzer::analyze("c.js", source, JsDialect::JavaScript).unwrap();
        assert_eq!(collections.variable_declarations.len(), 1);
        assert!(!collections.variable_declarations[0].is_class_property);
        assert_eq!(collections.variable_assignments.len(), 1);
    }

    #[test]
    fn class_field_without_initializer_is_marked_class_property() {
        let source = "class C { #count; }\n";
        let collections = JsAnalyzer::analyze("c.js", source, JsDialect::JavaScript).unwrap();
        assert_eq!(collections.variable_declarations.len(), 1);
        assert!(collections.variable_declarations[0].is_class_property);
        assert_eq!(collections.variable_assignments.len(), 0);
    }

    #[test]
    fn generator_yields_cover_literal_variable_delegate_and_complex() {
        let source = "function* g(){ yield 1; const r = 5; yield r; yield* h(); yield r+1; }\n";
        let collections = JsAnalyzer::analyze("g.js", source, JsDialect::JavaScript).unwrap();
        assert_eq!(collections.yield_expressions.len(), 4);
        assert!(collections.yield_expressions[0]
            .rhs
            .as_ref()
            .map(|r| matches!(r, RhsExpr::Literal { .. }))
            .unwrap_or(false));
        assert!(collections.yield_expressions[2].is_delegate);
    }

    #[test]
    fn bare_yield_produces_no_rhs() {
        let source = "function* g(){ yield; }\n";
        let collections = JsAnalyzer::analyze("g.js", source, JsDialect::JavaScript).unwrap();
        assert_eq!(collections.yield_expressions.len(), 1);
        assert!(collections.yield_expressions[0].rhs.is_none());
    }
}
