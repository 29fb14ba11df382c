//! C# parser using tree-sitter.

use std::path::Path;
use tree_sitter::{Node, Parser};

use crate::diagnostic::{GeneratorError, Span};
use super::ast::*;

/// C# parser.
pub struct CSharpParser {
    parser: Parser,
}

impl CSharpParser {
    /// Creates a new C# parser.
    pub fn new() -> Result<Self, GeneratorError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|_| GeneratorError::ParserInitFailed)?;
        Ok(Self { parser })
    }

    /// Parses a C# source file.
    pub fn parse(&mut self, source: &str, path: &Path) -> Result<ParsedFile, GeneratorError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| GeneratorError::ParseFailed { path: path.to_path_buf() })?;

        let root = tree.root_node();
        let mut visitor = Visitor::new(source, path);
        let types = visitor.visit_members(root, None, &[]);
        let syntax_error = if root.has_error() {
            first_error(root).map(|node| visitor.span(node))
        } else {
            None
        };

        Ok(ParsedFile {
            path: path.to_path_buf(),
            usings: visitor.usings,
            types,
            syntax_error,
        })
    }
}

/// The first ERROR or MISSING node in document order.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Maps a declaration node kind to the kind of type it declares.
fn type_decl_kind(node: Node) -> Option<TypeDeclKind> {
    let kind = match node.kind() {
        "class_declaration" => TypeDeclKind::Class,
        "struct_declaration" => TypeDeclKind::Struct,
        "interface_declaration" => TypeDeclKind::Interface,
        "enum_declaration" => TypeDeclKind::Enum,
        "record_struct_declaration" => TypeDeclKind::RecordStruct,
        "delegate_declaration" => TypeDeclKind::Delegate,
        "record_declaration" => {
            let mut cursor = node.walk();
            let is_struct = node.children(&mut cursor).any(|c| c.kind() == "struct");
            if is_struct {
                TypeDeclKind::RecordStruct
            } else {
                TypeDeclKind::Record
            }
        }
        _ => return None,
    };
    Some(kind)
}

/// Preprocessor blocks whose children are visited as if they were inline.
fn is_transparent(kind: &str) -> bool {
    matches!(kind, "preproc_if" | "preproc_elif" | "preproc_else" | "preproc_region")
}

fn join_namespace(outer: Option<&str>, inner: &str) -> String {
    match outer {
        Some(outer) => format!("{}.{}", outer, inner),
        None => inner.to_string(),
    }
}

/// Splits `Name = expr` / `name: expr` into the argument name and expression.
fn split_named_argument(text: &str) -> (Option<String>, String) {
    let trimmed = text.trim();
    let ident_len = trimmed
        .char_indices()
        .take_while(|(i, c)| c.is_alphanumeric() || *c == '_' || (*i == 0 && *c == '@'))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);

    if ident_len > 0 {
        let rest = trimmed[ident_len..].trim_start();
        let name = trimmed[..ident_len].trim_start_matches('@').to_string();
        if let Some(value) = rest.strip_prefix('=') {
            if !value.starts_with('=') {
                return (Some(name), value.trim().to_string());
            }
        }
        if let Some(value) = rest.strip_prefix(':') {
            if !value.starts_with(':') {
                return (Some(name), value.trim().to_string());
            }
        }
    }

    (None, trimmed.to_string())
}

/// Parses the text of a `using` directive.
fn parse_using(text: &str) -> Option<UsingDirective> {
    let body = text.trim().trim_end_matches(';').trim();
    let mut global = false;
    let mut is_static = false;
    let mut rest = body;

    loop {
        let (word, tail) = match rest.split_once(char::is_whitespace) {
            Some((word, tail)) => (word, tail.trim_start()),
            None => break,
        };
        match word {
            "global" => global = true,
            "using" | "unsafe" => {}
            "static" => is_static = true,
            _ => break,
        }
        rest = tail;
    }

    if rest.is_empty() {
        return None;
    }

    let (kind, target) = match rest.split_once('=') {
        Some((alias, target)) => (
            UsingKind::Alias(alias.trim().to_string()),
            target.split_whitespace().collect::<String>(),
        ),
        None if is_static => (UsingKind::Static, rest.split_whitespace().collect()),
        None => (UsingKind::Namespace, rest.split_whitespace().collect()),
    };

    Some(UsingDirective { kind, target, global })
}

/// AST visitor that extracts declarations from tree-sitter nodes.
struct Visitor<'a> {
    source: &'a str,
    path: &'a Path,
    usings: Vec<UsingDirective>,
}

impl<'a> Visitor<'a> {
    fn new(source: &'a str, path: &'a Path) -> Self {
        Self {
            source,
            path,
            usings: Vec::new(),
        }
    }

    fn span(&self, node: Node) -> Span {
        Span::new(
            self.path.to_path_buf(),
            node.start_position().row,
            node.start_position().column,
            node.end_position().row,
            node.end_position().column,
        )
    }

    fn node_text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|child| self.node_text(child).trim().to_string())
    }

    /// Visits namespace-level members: the compilation unit, namespace bodies and preprocessor blocks.
    fn visit_members(&mut self, node: Node, namespace: Option<&str>, containing: &[String]) -> Vec<TypeDecl> {
        let mut types = Vec::new();
        let mut current_namespace = namespace.map(str::to_string);

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "using_directive" => {
                    if let Some(using) = parse_using(self.node_text(child)) {
                        self.usings.push(using);
                    }
                }
                "namespace_declaration" => {
                    let Some(name) = self.namespace_name(child) else { continue };
                    let full = join_namespace(current_namespace.as_deref(), &name);
                    if let Some(body) = child
                        .child_by_field_name("body")
                        .or_else(|| self.child_of_kind(child, "declaration_list"))
                    {
                        types.extend(self.visit_members(body, Some(&full), containing));
                    }
                }
                "file_scoped_namespace_declaration" => {
                    let Some(name) = self.namespace_name(child) else { continue };
                    let full = join_namespace(current_namespace.as_deref(), &name);
                    // Older grammars nest the members; newer ones make them siblings.
                    types.extend(self.visit_members(child, Some(&full), containing));
                    current_namespace = Some(full);
                }
                kind if is_transparent(kind) => {
                    types.extend(self.visit_members(child, current_namespace.as_deref(), containing));
                }
                _ => {
                    if let Some(kind) = type_decl_kind(child) {
                        types.extend(self.visit_type(child, kind, current_namespace.as_deref(), containing));
                    }
                }
            }
        }

        types
    }

    fn namespace_name(&self, node: Node) -> Option<String> {
        let name = self
            .field_text(node, "name")
            .map(|n| n.split_whitespace().collect::<String>())?;
        (!name.is_empty()).then_some(name)
    }

    fn child_of_kind<'t>(&self, node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).find(|c| c.kind() == kind);
        found
    }

    fn modifiers(&self, node: Node) -> Vec<String> {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|c| c.kind() == "modifier" || c.kind() == "parameter_modifier")
            .map(|c| self.node_text(c).trim().to_string())
            .collect()
    }

    fn attributes(&self, node: Node) -> Vec<AttributeDecl> {
        let mut attributes = Vec::new();
        let mut cursor = node.walk();
        for list in node.children(&mut cursor).filter(|c| c.kind() == "attribute_list") {
            let mut list_cursor = list.walk();
            for attribute in list.children(&mut list_cursor).filter(|c| c.kind() == "attribute") {
                if let Some(decl) = self.visit_attribute(attribute) {
                    attributes.push(decl);
                }
            }
        }
        attributes
    }

    fn visit_attribute(&self, node: Node) -> Option<AttributeDecl> {
        let name = self.field_text(node, "name").or_else(|| {
            node.named_child(0)
                .filter(|c| c.kind() != "attribute_argument_list")
                .map(|c| self.node_text(c).trim().to_string())
        })?;

        let mut arguments = Vec::new();
        if let Some(list) = self.child_of_kind(node, "attribute_argument_list") {
            let mut cursor = list.walk();
            for argument in list.children(&mut cursor).filter(|c| c.kind() == "attribute_argument") {
                let (name, expression) = split_named_argument(self.node_text(argument));
                arguments.push(AttributeArgument { name, expression });
            }
        }

        Some(AttributeDecl {
            name: name.split_whitespace().collect(),
            arguments,
            span: self.span(node),
        })
    }

    /// Source text between the end of the last attribute list or modifier and `name_node`.
    fn text_before_name(&self, node: Node, name_node: Node) -> String {
        let mut start = node.start_byte();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.start_byte() >= name_node.start_byte() {
                break;
            }
            if matches!(child.kind(), "attribute_list" | "modifier" | "parameter_modifier") {
                start = child.end_byte();
            }
        }
        self.source
            .get(start..name_node.start_byte())
            .unwrap_or("")
            .trim()
            .to_string()
    }

    fn visit_type(
        &mut self,
        node: Node,
        kind: TypeDeclKind,
        namespace: Option<&str>,
        containing: &[String],
    ) -> Vec<TypeDecl> {
        let name = self.field_text(node, "name").or_else(|| {
            self.child_of_kind(node, "identifier")
                .map(|c| self.node_text(c).to_string())
        });
        let Some(name) = name else { return Vec::new() };

        let arity = self
            .child_of_kind(node, "type_parameter_list")
            .map(|list| {
                let mut cursor = list.walk();
                let count = list
                    .children(&mut cursor)
                    .filter(|c| c.kind() == "type_parameter")
                    .count();
                count
            })
            .unwrap_or(0);

        let base_types = self
            .child_of_kind(node, "base_list")
            .map(|list| self.visit_base_list(list))
            .unwrap_or_default();

        let mut decl = TypeDecl {
            name: name.clone(),
            kind,
            namespace: namespace.map(str::to_string),
            containing_types: containing.to_vec(),
            arity,
            modifiers: self.modifiers(node),
            attributes: self.attributes(node),
            base_types,
            methods: Vec::new(),
            constants: Vec::new(),
            span: self.span(node),
        };

        let mut nested = Vec::new();
        if let Some(body) = self.child_of_kind(node, "declaration_list") {
            let mut inner_containing = containing.to_vec();
            inner_containing.push(name);
            self.visit_type_body(body, &mut decl, namespace, &inner_containing, &mut nested);
        }

        let mut types = vec![decl];
        types.extend(nested);
        types
    }

    fn visit_base_list(&self, node: Node) -> Vec<String> {
        let mut base_types = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "argument_list" {
                continue;
            }
            let text = self.node_text(child);
            // Primary constructor bases (`Base(x)`) keep only the type.
            let text = text.split('(').next().unwrap_or("").trim();
            if !text.is_empty() {
                base_types.push(text.to_string());
            }
        }
        base_types
    }

    fn visit_type_body(
        &mut self,
        node: Node,
        decl: &mut TypeDecl,
        namespace: Option<&str>,
        containing: &[String],
        nested: &mut Vec<TypeDecl>,
    ) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "method_declaration" => {
                    if let Some(method) = self.visit_method(child) {
                        decl.methods.push(method);
                    }
                }
                "field_declaration" => {
                    decl.constants.extend(self.visit_constants(child));
                }
                kind if is_transparent(kind) => {
                    self.visit_type_body(child, decl, namespace, containing, nested);
                }
                _ => {
                    if let Some(kind) = type_decl_kind(child) {
                        nested.extend(self.visit_type(child, kind, namespace, containing));
                    }
                }
            }
        }
    }

    fn visit_method(&self, node: Node) -> Option<MethodDecl> {
        let name_node = node.child_by_field_name("name")?;
        let name = self.node_text(name_node).trim().to_string();

        let return_type = self
            .field_text(node, "returns")
            .or_else(|| self.field_text(node, "type"))
            .unwrap_or_else(|| self.text_before_name(node, name_node));

        let parameters = node
            .child_by_field_name("parameters")
            .or_else(|| self.child_of_kind(node, "parameter_list"))
            .map(|list| self.visit_parameters(list))
            .unwrap_or_default();

        Some(MethodDecl {
            name,
            return_type,
            parameters,
            attributes: self.attributes(node),
            modifiers: self.modifiers(node),
            span: self.span(node),
        })
    }

    fn visit_parameters(&self, node: Node) -> Vec<ParameterDecl> {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|c| c.kind() == "parameter")
            .filter_map(|c| self.visit_parameter(c))
            .collect()
    }

    fn visit_parameter(&self, node: Node) -> Option<ParameterDecl> {
        let name_node = node.child_by_field_name("name").or_else(|| {
            let mut cursor = node.walk();
            let last = node
                .named_children(&mut cursor)
                .filter(|c| c.kind() == "identifier")
                .last();
            last
        })?;

        let type_text = self
            .field_text(node, "type")
            .unwrap_or_else(|| self.text_before_name(node, name_node));

        Some(ParameterDecl {
            name: self.node_text(name_node).trim().to_string(),
            type_text,
            attributes: self.attributes(node),
            modifiers: self.modifiers(node),
        })
    }

    fn visit_constants(&self, node: Node) -> Vec<ConstantDecl> {
        if !self.modifiers(node).iter().any(|m| m == "const") {
            return Vec::new();
        }
        let Some(declaration) = self.child_of_kind(node, "variable_declaration") else {
            return Vec::new();
        };

        let type_text = self
            .field_text(declaration, "type")
            .or_else(|| declaration.named_child(0).map(|c| self.node_text(c).trim().to_string()))
            .unwrap_or_default();

        let mut constants = Vec::new();
        let mut cursor = declaration.walk();
        for declarator in declaration
            .children(&mut cursor)
            .filter(|c| c.kind() == "variable_declarator")
        {
            let text = self.node_text(declarator);
            if let Some((name, value)) = text.split_once('=') {
                constants.push(ConstantDecl {
                    name: name.trim().to_string(),
                    type_text: type_text.clone(),
                    value: value.trim().to_string(),
                });
            }
        }
        constants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedFile {
        let mut parser = CSharpParser::new().unwrap();
        parser.parse(source, Path::new("Test.cs")).unwrap()
    }

    #[test]
    fn test_grammar_loads_into_runtime() {
        // Fails with ParserInitFailed when the grammar's ABI is newer than the runtime's.
        let mut parser = match CSharpParser::new() {
            Ok(parser) => parser,
            Err(e) => panic!("C# grammar did not load: {:?}", e),
        };
        let file = parser.parse("class Ok { }", Path::new("Ok.cs")).unwrap();
        assert_eq!(file.types.len(), 1);
        assert!(!file.has_errors());
    }

    #[test]
    fn test_parse_using_variants() {
        assert_eq!(
            parse_using("using System.Text;"),
            Some(UsingDirective {
                kind: UsingKind::Namespace,
                target: "System.Text".to_string(),
                global: false,
            })
        );
        assert_eq!(
            parse_using("global using static System.Math;"),
            Some(UsingDirective {
                kind: UsingKind::Static,
                target: "System.Math".to_string(),
                global: true,
            })
        );
        assert_eq!(
            parse_using("using Json = System.Text.Json.JsonElement;"),
            Some(UsingDirective {
                kind: UsingKind::Alias("Json".to_string()),
                target: "System.Text.Json.JsonElement".to_string(),
                global: false,
            })
        );
    }

    #[test]
    fn test_split_named_argument() {
        assert_eq!(split_named_argument("\"Greet\""), (None, "\"Greet\"".to_string()));
        assert_eq!(
            split_named_argument("Name = \"Greet\""),
            (Some("Name".to_string()), "\"Greet\"".to_string())
        );
        assert_eq!(
            split_named_argument("name: nameof(Greet)"),
            (Some("name".to_string()), "nameof(Greet)".to_string())
        );
        assert_eq!(split_named_argument("A == B"), (None, "A == B".to_string()));
        assert_eq!(split_named_argument("global::X.Y"), (None, "global::X.Y".to_string()));
    }

    #[test]
    fn test_parse_class_with_generic_base() {
        let file = parse(
            r#"
using Microsoft.DurableTask;

namespace MyApp.Tasks
{
    [DurableTask("Greet")]
    public sealed class SayHello : TaskActivity<string, string>
    {
        public override Task<string> RunAsync(TaskActivityContext context, string name)
        {
            return Task.FromResult($"Hello, {name}!");
        }
    }
}
"#,
        );

        assert_eq!(file.usings.len(), 1);
        assert_eq!(file.types.len(), 1);
        let class = &file.types[0];
        assert_eq!(class.name, "SayHello");
        assert_eq!(class.kind, TypeDeclKind::Class);
        assert_eq!(class.full_name(), "MyApp.Tasks.SayHello");
        assert_eq!(class.base_types, vec!["TaskActivity<string, string>".to_string()]);
        assert!(class.has_modifier("sealed"));
        assert_eq!(class.attributes.len(), 1);
        assert_eq!(class.attributes[0].name, "DurableTask");
        assert_eq!(class.attributes[0].arguments[0].expression, "\"Greet\"");
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].name, "RunAsync");
        assert_eq!(class.methods[0].return_type, "Task<string>");
        assert_eq!(class.methods[0].parameters.len(), 2);
        assert_eq!(class.methods[0].parameters[1].type_text, "string");
        assert!(!file.has_errors());
    }

    #[test]
    fn test_syntax_error_is_located() {
        let file = parse("namespace App\n{\n    public class Broken : TaskActivity<int, int>\n    {\n        public void Run( {\n    }\n}\n");
        let span = file.syntax_error.expect("error recovered");
        assert!(span.to_string().starts_with("Test.cs:"));
    }

    #[test]
    fn test_file_scoped_namespace_and_nested_types() {
        let file = parse(
            r#"
namespace MyApp.Workflows;

public static class Outer
{
    public const string Prefix = "Orders";

    public class Inner : TaskOrchestrator<Order, bool>
    {
    }
}

public record Order(string Id);
public struct Point { }
"#,
        );

        let names: Vec<String> = file.types.iter().map(|t| t.full_name()).collect();
        assert_eq!(
            names,
            vec![
                "MyApp.Workflows.Outer".to_string(),
                "MyApp.Workflows.Outer.Inner".to_string(),
                "MyApp.Workflows.Order".to_string(),
                "MyApp.Workflows.Point".to_string(),
            ]
        );
        assert_eq!(file.types[0].constants.len(), 1);
        assert_eq!(file.types[0].constants[0].name, "Prefix");
        assert_eq!(file.types[0].constants[0].value, "\"Orders\"");
        assert_eq!(file.types[1].containing_types, vec!["Outer".to_string()]);
        assert_eq!(file.types[2].kind, TypeDeclKind::Record);
        assert_eq!(file.types[3].kind, TypeDeclKind::Struct);
    }

    #[test]
    fn test_function_method_with_trigger_parameter() {
        let file = parse(
            r#"
namespace MyApp
{
    public static class Functions
    {
        [Function(nameof(SayHello))]
        public static string SayHello([ActivityTrigger] string name, FunctionContext context)
        {
            return name;
        }
    }
}
"#,
        );

        let method = &file.types[0].methods[0];
        assert_eq!(method.name, "SayHello");
        assert_eq!(method.return_type, "string");
        assert_eq!(method.attributes[0].name, "Function");
        assert_eq!(method.attributes[0].arguments[0].expression, "nameof(SayHello)");
        assert_eq!(method.parameters[0].name, "name");
        assert_eq!(method.parameters[0].type_text, "string");
        assert_eq!(method.parameters[0].attributes[0].name, "ActivityTrigger");
        assert_eq!(method.parameters[1].type_text, "FunctionContext");
    }
}
