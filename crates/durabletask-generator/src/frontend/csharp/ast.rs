//! C#-specific AST types.
//!
//! Only the declaration surface the generator needs is kept: usings, type
//! declarations with their base lists and attributes, methods with their
//! parameters, and `const` fields. Nested types are flattened into the file's
//! type list and remember their enclosing types.

use std::path::PathBuf;
use crate::diagnostic::Span;

/// A parsed C# file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub usings: Vec<UsingDirective>,
    pub types: Vec<TypeDecl>,
    /// First place tree-sitter had to recover from a syntax error.
    pub syntax_error: Option<Span>,
}

impl ParsedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            usings: Vec::new(),
            types: Vec::new(),
            syntax_error: None,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.syntax_error.is_some()
    }
}

/// A `using` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct UsingDirective {
    pub kind: UsingKind,
    /// Namespace or type named by the directive, as written.
    pub target: String,
    /// `global using` applies to every file of the compilation.
    pub global: bool,
}

/// The flavour of a `using` directive.
#[derive(Debug, Clone, PartialEq)]
pub enum UsingKind {
    /// `using System.Text;`
    Namespace,
    /// `using static System.Math;`
    Static,
    /// `using Json = System.Text.Json;`
    Alias(String),
}

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclKind {
    Class,
    Struct,
    Interface,
    Enum,
    Record,
    RecordStruct,
    Delegate,
}

impl TypeDeclKind {
    /// Whether values of this kind are reference types.
    pub fn is_reference_type(self) -> bool {
        !matches!(self, TypeDeclKind::Struct | TypeDeclKind::Enum | TypeDeclKind::RecordStruct)
    }

    /// Whether this kind can derive from a base class.
    pub fn can_inherit_class(self) -> bool {
        matches!(self, TypeDeclKind::Class | TypeDeclKind::Record)
    }
}

/// A type declaration (class, struct, record, ...).
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeDeclKind,
    /// Enclosing namespace, `None` for the global namespace.
    pub namespace: Option<String>,
    /// Enclosing types, outermost first.
    pub containing_types: Vec<String>,
    /// Number of generic type parameters.
    pub arity: usize,
    pub modifiers: Vec<String>,
    pub attributes: Vec<AttributeDecl>,
    /// Base list entries as written, without primary-constructor arguments.
    pub base_types: Vec<String>,
    pub methods: Vec<MethodDecl>,
    pub constants: Vec<ConstantDecl>,
    pub span: Span,
}

impl TypeDecl {
    /// The fully qualified name, e.g. `MyApp.Tasks.Outer.SayHello`.
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(ns) = &self.namespace {
            parts.push(ns);
        }
        parts.extend(self.containing_types.iter().map(String::as_str));
        parts.push(&self.name);
        parts.join(".")
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

/// An attribute application, e.g. `[DurableTask("Greet")]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl {
    /// Attribute name as written (`DurableTask`, `Microsoft.DurableTask.DurableTaskAttribute`).
    pub name: String,
    pub arguments: Vec<AttributeArgument>,
    pub span: Span,
}

impl AttributeDecl {
    /// The first positional (constructor) argument.
    pub fn first_positional(&self) -> Option<&AttributeArgument> {
        self.arguments.iter().find(|a| a.name.is_none())
    }
}

/// One attribute argument. Named arguments (`Name = x`, `name: x`) carry their name.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeArgument {
    pub name: Option<String>,
    /// Raw expression text.
    pub expression: String,
}

/// A method declaration.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    /// Return type as written.
    pub return_type: String,
    pub parameters: Vec<ParameterDecl>,
    pub attributes: Vec<AttributeDecl>,
    pub modifiers: Vec<String>,
    pub span: Span,
}

/// A method parameter.
#[derive(Debug, Clone)]
pub struct ParameterDecl {
    pub name: String,
    /// Parameter type as written. Empty for implicitly typed lambda-style parameters.
    pub type_text: String,
    pub attributes: Vec<AttributeDecl>,
    pub modifiers: Vec<String>,
}

/// A `const` field.
#[derive(Debug, Clone)]
pub struct ConstantDecl {
    pub name: String,
    pub type_text: String,
    /// Initializer expression text.
    pub value: String,
}
