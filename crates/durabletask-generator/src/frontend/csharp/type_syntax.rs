//! Parser for C# type expressions.
//!
//! Type references are taken from tree-sitter nodes as text and parsed here,
//! so the rest of the generator works on a small closed syntax tree instead of
//! grammar-specific node kinds.

use std::fmt;
use thiserror::Error;

/// Keywords that name predefined types.
pub const PREDEFINED_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "nint",
    "nuint", "long", "ulong", "short", "ushort", "object", "string", "void", "dynamic",
];

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSyntax {
    /// `int`, `string`, `object`, ...
    Predefined(String),
    /// `List<int>`, `System.Guid`, `global::MyApp.Order`
    Named(QualifiedName),
    /// `T?`
    Nullable(Box<TypeSyntax>),
    /// `T[]`, `T[,]`
    Array { element: Box<TypeSyntax>, rank: usize },
    /// `(int, string Name)`
    Tuple(Vec<TupleElement>),
}

/// A possibly qualified, possibly generic name.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    /// `global` or a using alias written before `::`.
    pub qualifier: Option<String>,
    pub segments: Vec<NameSegment>,
}

/// One dotted segment of a name.
#[derive(Debug, Clone, PartialEq)]
pub struct NameSegment {
    pub name: String,
    /// `None` for a plain identifier, `Some` when written with angle brackets.
    pub type_args: Option<Vec<TypeArg>>,
}

/// A generic type argument. `Foo<>` has one omitted argument.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeArg {
    Type(TypeSyntax),
    Omitted,
}

/// A tuple element with its optional name.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    pub ty: TypeSyntax,
    pub name: Option<String>,
}

/// Error produced for text that is not a type expression.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid type expression '{text}': {message}")]
pub struct TypeSyntaxError {
    pub text: String,
    pub message: String,
}

impl NameSegment {
    pub fn is_generic(&self) -> bool {
        self.type_args.is_some()
    }

    pub fn arity(&self) -> usize {
        self.type_args.as_ref().map_or(0, Vec::len)
    }
}

impl QualifiedName {
    /// The rightmost segment.
    pub fn last(&self) -> &NameSegment {
        // parse_named never builds an empty segment list
        &self.segments[self.segments.len() - 1]
    }

    /// Whether the name is written with `global::`.
    pub fn is_global(&self) -> bool {
        self.qualifier.as_deref() == Some("global")
    }
}

impl TypeSyntax {
    /// Parses a type expression such as `Dictionary<string, List<int>>?`.
    pub fn parse(text: &str) -> Result<TypeSyntax, TypeSyntaxError> {
        let tokens = tokenize(text).map_err(|message| TypeSyntaxError {
            text: text.to_string(),
            message,
        })?;
        let mut parser = Parser { tokens, pos: 0 };
        let ty = parser.parse_type().map_err(|message| TypeSyntaxError {
            text: text.to_string(),
            message,
        })?;
        if parser.pos != parser.tokens.len() {
            return Err(TypeSyntaxError {
                text: text.to_string(),
                message: format!("unexpected trailing input at token {}", parser.pos),
            });
        }
        Ok(ty)
    }

    /// Returns the named form, if this is a plain (non-nullable, non-array) name.
    pub fn as_named(&self) -> Option<&QualifiedName> {
        match self {
            TypeSyntax::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSyntax::Predefined(keyword) => f.write_str(keyword),
            TypeSyntax::Named(name) => write!(f, "{}", name),
            TypeSyntax::Nullable(inner) => write!(f, "{}?", inner),
            TypeSyntax::Array { element, rank } => {
                write!(f, "{}[{}]", element, ",".repeat(rank.saturating_sub(1)))
            }
            TypeSyntax::Tuple(elements) => {
                f.write_str("(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element.ty)?;
                    if let Some(name) = &element.name {
                        write!(f, " {}", name)?;
                    }
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(qualifier) = &self.qualifier {
            write!(f, "{}::", qualifier)?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.name)?;
            if let Some(args) = &segment.type_args {
                f.write_str("<")?;
                let omitted = args.iter().all(|a| matches!(a, TypeArg::Omitted));
                let separator = if omitted { "," } else { ", " };
                for (j, arg) in args.iter().enumerate() {
                    if j > 0 {
                        f.write_str(separator)?;
                    }
                    if let TypeArg::Type(ty) = arg {
                        write!(f, "{}", ty)?;
                    }
                }
                f.write_str(">")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Lt,
    Gt,
    Comma,
    Dot,
    ColonColon,
    Question,
    LBracket,
    RBracket,
    LParen,
    RParen,
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '<' => { chars.next(); tokens.push(Token::Lt); }
            '>' => { chars.next(); tokens.push(Token::Gt); }
            ',' => { chars.next(); tokens.push(Token::Comma); }
            '.' => { chars.next(); tokens.push(Token::Dot); }
            '?' => { chars.next(); tokens.push(Token::Question); }
            '[' => { chars.next(); tokens.push(Token::LBracket); }
            ']' => { chars.next(); tokens.push(Token::RBracket); }
            '(' => { chars.next(); tokens.push(Token::LParen); }
            ')' => { chars.next(); tokens.push(Token::RParen); }
            ':' => {
                chars.next();
                if chars.next() != Some(':') {
                    return Err("expected '::'".to_string());
                }
                tokens.push(Token::ColonColon);
            }
            c if c == '@' || c == '_' || c.is_alphabetic() => {
                let mut ident = String::new();
                if c == '@' {
                    // verbatim identifier: the '@' is not part of the name
                    chars.next();
                }
                while let Some(&c) = chars.peek() {
                    if c == '_' || c.is_alphanumeric() {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if ident.is_empty() {
                    return Err("expected identifier after '@'".to_string());
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), String> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(format!("expected {:?}, found {:?}", token, self.peek()))
        }
    }

    fn parse_type(&mut self) -> Result<TypeSyntax, String> {
        let mut ty = match self.peek() {
            Some(Token::LParen) => self.parse_tuple()?,
            Some(Token::Ident(name)) if PREDEFINED_TYPES.contains(&name.as_str()) => {
                let keyword = name.clone();
                self.pos += 1;
                TypeSyntax::Predefined(keyword)
            }
            Some(Token::Ident(_)) => TypeSyntax::Named(self.parse_named()?),
            other => return Err(format!("expected a type, found {:?}", other)),
        };

        // Postfix `?` and `[]` in source order: `int?[]` is an array of nullable ints.
        loop {
            if self.eat(&Token::Question) {
                ty = TypeSyntax::Nullable(Box::new(ty));
            } else if self.eat(&Token::LBracket) {
                let mut rank = 1;
                while self.eat(&Token::Comma) {
                    rank += 1;
                }
                self.expect(Token::RBracket)?;
                ty = TypeSyntax::Array { element: Box::new(ty), rank };
            } else {
                break;
            }
        }

        Ok(ty)
    }

    fn parse_named(&mut self) -> Result<QualifiedName, String> {
        let mut qualifier = None;
        if let (Some(Token::Ident(name)), Some(Token::ColonColon)) = (self.peek(), self.peek_at(1)) {
            qualifier = Some(name.clone());
            self.pos += 2;
        }

        let mut segments = vec![self.parse_segment()?];
        while self.eat(&Token::Dot) {
            segments.push(self.parse_segment()?);
        }

        Ok(QualifiedName { qualifier, segments })
    }

    fn parse_segment(&mut self) -> Result<NameSegment, String> {
        let name = match self.peek() {
            Some(Token::Ident(name)) => name.clone(),
            other => return Err(format!("expected identifier, found {:?}", other)),
        };
        self.pos += 1;

        if !self.eat(&Token::Lt) {
            return Ok(NameSegment { name, type_args: None });
        }

        let mut args = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Comma) | Some(Token::Gt) => args.push(TypeArg::Omitted),
                _ => args.push(TypeArg::Type(self.parse_type()?)),
            }
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(Token::Gt)?;
            break;
        }

        Ok(NameSegment { name, type_args: Some(args) })
    }

    fn parse_tuple(&mut self) -> Result<TypeSyntax, String> {
        self.expect(Token::LParen)?;
        let mut elements = Vec::new();
        loop {
            let ty = self.parse_type()?;
            let name = match self.peek() {
                Some(Token::Ident(name)) => {
                    let name = name.clone();
                    self.pos += 1;
                    Some(name)
                }
                _ => None,
            };
            elements.push(TupleElement { ty, name });
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(Token::RParen)?;
            break;
        }
        if elements.len() < 2 {
            return Err("tuple types need at least two elements".to_string());
        }
        Ok(TypeSyntax::Tuple(elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(text: &str) -> QualifiedName {
        match TypeSyntax::parse(text).unwrap() {
            TypeSyntax::Named(name) => name,
            other => panic!("expected named type, got {:?}", other),
        }
    }

    #[test]
    fn test_predefined() {
        assert_eq!(TypeSyntax::parse("int").unwrap(), TypeSyntax::Predefined("int".to_string()));
        assert_eq!(TypeSyntax::parse(" string ").unwrap(), TypeSyntax::Predefined("string".to_string()));
    }

    #[test]
    fn test_generic_with_nested_arguments() {
        let name = named("Dictionary<string, List<int>>");
        assert_eq!(name.segments.len(), 1);
        assert_eq!(name.last().name, "Dictionary");
        assert_eq!(name.last().arity(), 2);
        assert_eq!(name.to_string(), "Dictionary<string, List<int>>");
    }

    #[test]
    fn test_qualified_generic_base() {
        let name = named("Microsoft.DurableTask.TaskActivity<int, string>");
        assert_eq!(name.segments.len(), 3);
        assert_eq!(name.last().name, "TaskActivity");
        assert!(name.last().is_generic());
    }

    #[test]
    fn test_empty_generic_argument_list() {
        let name = named("TaskOrchestrator<>");
        assert!(name.last().is_generic());
        assert_eq!(name.last().type_args, Some(vec![TypeArg::Omitted]));

        let name = named("Dictionary<,>");
        assert_eq!(name.last().arity(), 2);
        assert_eq!(name.to_string(), "Dictionary<,>");
    }

    #[test]
    fn test_global_qualifier_and_verbatim_identifier() {
        let name = named("global::MyApp.@class");
        assert!(name.is_global());
        assert_eq!(name.last().name, "class");
    }

    #[test]
    fn test_postfix_order() {
        let ty = TypeSyntax::parse("int?[]").unwrap();
        assert!(matches!(ty, TypeSyntax::Array { ref element, rank: 1 } if matches!(**element, TypeSyntax::Nullable(_))));

        let ty = TypeSyntax::parse("string[,]?").unwrap();
        assert!(matches!(ty, TypeSyntax::Nullable(ref inner) if matches!(**inner, TypeSyntax::Array { rank: 2, .. })));
        assert_eq!(ty.to_string(), "string[,]?");
    }

    #[test]
    fn test_tuple() {
        let ty = TypeSyntax::parse("(int Id, string)").unwrap();
        assert_eq!(ty.to_string(), "(int Id, string)");
    }

    #[test]
    fn test_invalid_input() {
        assert!(TypeSyntax::parse("").is_err());
        assert!(TypeSyntax::parse("List<int").is_err());
        assert!(TypeSyntax::parse("int*").is_err());
        assert!(TypeSyntax::parse("Foo Bar").is_err());
        assert!(TypeSyntax::parse("(int)").is_err());
    }
}
