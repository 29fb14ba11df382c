//! Name resolution over the declarations of one generation pass.

use std::collections::HashMap;

use crate::frontend::csharp::ast::{ParsedFile, TypeDecl, UsingDirective, UsingKind};
use crate::frontend::csharp::type_syntax::{QualifiedName, TypeArg, TypeSyntax};
use super::catalog;
use super::constant;

/// Namespace of the predefined types and `ValueTuple<...>`.
const SYSTEM_NAMESPACE: &str = "System";

/// The resolved meaning of a type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbol {
    /// Canonical display string, fully qualified (`System.Collections.Generic.List<int>`).
    pub display: String,
    /// Namespace that directly contains the type. `None` for arrays, `dynamic` and the global namespace.
    pub containing_namespace: Option<String>,
    pub is_reference_type: bool,
    /// Already `T?` (nullable value type or annotated reference type).
    pub is_nullable: bool,
}

impl TypeSymbol {
    /// The `T?` form of this type. The containing namespace stays that of `T`,
    /// since `T` is what the display string names.
    pub fn into_nullable(self) -> TypeSymbol {
        if self.is_nullable {
            return self;
        }
        TypeSymbol {
            display: format!("{}?", self.display),
            containing_namespace: self.containing_namespace,
            is_reference_type: self.is_reference_type,
            is_nullable: true,
        }
    }
}

/// The lexical context of a reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionScope {
    pub namespace: Option<String>,
    /// Enclosing types, outermost first, ending with the declaring type.
    pub type_chain: Vec<String>,
    /// `using` directives of the file.
    pub usings: Vec<UsingDirective>,
}

impl ResolutionScope {
    /// The scope inside `decl`'s body (and base list).
    pub fn for_type(file: &ParsedFile, decl: &TypeDecl) -> Self {
        let mut type_chain = decl.containing_types.clone();
        type_chain.push(decl.name.clone());
        Self {
            namespace: decl.namespace.clone(),
            type_chain,
            usings: file.usings.clone(),
        }
    }

    /// The global namespace with no usings: only fully qualified names resolve.
    pub fn global() -> Self {
        Self::default()
    }

    fn alias(&self, alias: &str) -> Option<&str> {
        self.usings.iter().find_map(|u| match &u.kind {
            UsingKind::Alias(name) if name == alias => Some(u.target.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
struct NamedType {
    full_name: String,
    namespace: Option<String>,
    is_reference_type: bool,
}

#[derive(Debug, Clone)]
struct ConstantEntry {
    value: String,
    scope: ResolutionScope,
}

/// Type and constant oracle built from every file of a pass.
#[derive(Debug, Clone, Default)]
pub struct SemanticModel {
    types: HashMap<(String, usize), NamedType>,
    constants: HashMap<String, ConstantEntry>,
    global_usings: Vec<UsingDirective>,
    implicit_usings: Vec<String>,
}

impl SemanticModel {
    /// Builds the model from the parsed files of a pass.
    ///
    /// `implicit_usings` are namespaces imported into every file (SDK implicit usings).
    pub fn build(files: &[ParsedFile], implicit_usings: &[String]) -> Self {
        let mut model = Self {
            implicit_usings: implicit_usings.to_vec(),
            ..Self::default()
        };

        for known in catalog::WELL_KNOWN {
            let full_name = format!("{}.{}", known.namespace, known.name);
            model.types.insert(
                (full_name.clone(), known.arity),
                NamedType {
                    full_name,
                    namespace: Some(known.namespace.to_string()),
                    is_reference_type: known.is_reference_type,
                },
            );
        }

        for file in files {
            model
                .global_usings
                .extend(file.usings.iter().filter(|u| u.global).cloned());

            for decl in &file.types {
                let full_name = decl.full_name();
                model.types.insert(
                    (full_name.clone(), decl.arity),
                    NamedType {
                        full_name: full_name.clone(),
                        namespace: decl.namespace.clone(),
                        is_reference_type: decl.kind.is_reference_type(),
                    },
                );

                if decl.constants.is_empty() {
                    continue;
                }
                let scope = ResolutionScope::for_type(file, decl);
                for constant in &decl.constants {
                    model.constants.insert(
                        format!("{}.{}", full_name, constant.name),
                        ConstantEntry {
                            value: constant.value.clone(),
                            scope: scope.clone(),
                        },
                    );
                }
            }
        }

        tracing::debug!(
            types = model.types.len(),
            constants = model.constants.len(),
            global_usings = model.global_usings.len(),
            "built semantic model"
        );
        model
    }

    /// Resolves a type reference. `None` when any part of it is unknown.
    pub fn resolve_type(&self, ty: &TypeSyntax, scope: &ResolutionScope) -> Option<TypeSymbol> {
        match ty {
            TypeSyntax::Predefined(keyword) => resolve_keyword(keyword),
            TypeSyntax::Named(name) => self.resolve_named(name, scope),
            TypeSyntax::Nullable(inner) => self.resolve_type(inner, scope).map(TypeSymbol::into_nullable),
            TypeSyntax::Array { element, rank } => {
                let element = self.resolve_type(element, scope)?;
                Some(TypeSymbol {
                    display: format!("{}[{}]", element.display, ",".repeat(rank.saturating_sub(1))),
                    containing_namespace: None,
                    is_reference_type: true,
                    is_nullable: false,
                })
            }
            TypeSyntax::Tuple(elements) => {
                let mut parts = Vec::with_capacity(elements.len());
                for element in elements {
                    let symbol = self.resolve_type(&element.ty, scope)?;
                    parts.push(match &element.name {
                        Some(name) => format!("{} {}", symbol.display, name),
                        None => symbol.display,
                    });
                }
                Some(TypeSymbol {
                    display: format!("({})", parts.join(", ")),
                    containing_namespace: Some(SYSTEM_NAMESPACE.to_string()),
                    is_reference_type: false,
                    is_nullable: false,
                })
            }
        }
    }

    /// Parses and resolves type text as written in source.
    pub fn resolve_type_text(&self, text: &str, scope: &ResolutionScope) -> Option<TypeSymbol> {
        let ty = TypeSyntax::parse(text).ok()?;
        self.resolve_type(&ty, scope)
    }

    /// Evaluates a compile-time constant string expression.
    pub fn evaluate_constant(&self, expression: &str, scope: &ResolutionScope) -> Option<String> {
        constant::evaluate(expression, scope, self)
    }

    /// Looks up a `const` field by (possibly qualified) name and evaluates its initializer.
    pub(crate) fn resolve_constant(&self, path: &str, scope: &ResolutionScope, depth: usize) -> Option<String> {
        self.candidates(path, scope)
            .into_iter()
            .find_map(|candidate| self.constants.get(&candidate))
            .and_then(|entry| constant::evaluate_at_depth(&entry.value, &entry.scope, self, depth + 1))
    }

    fn resolve_named(&self, name: &QualifiedName, scope: &ResolutionScope) -> Option<TypeSymbol> {
        let (last, qualifiers) = name.segments.split_last()?;
        // Type arguments on containing types are not tracked.
        if qualifiers.iter().any(|s| s.is_generic()) {
            return None;
        }

        let mut args = Vec::new();
        for arg in last.type_args.iter().flatten() {
            match arg {
                TypeArg::Type(ty) => args.push(self.resolve_type(ty, scope)?),
                TypeArg::Omitted => return None,
            }
        }

        let dotted = name
            .segments
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(".");
        let arity = args.len();

        let named = match name.qualifier.as_deref() {
            Some("global") => self.types.get(&(dotted, arity)),
            Some(alias) => {
                let target = scope.alias(alias)?;
                self.types.get(&(format!("{}.{}", target, dotted), arity))
            }
            None => {
                let found = self
                    .candidates(&dotted, scope)
                    .into_iter()
                    .find_map(|candidate| self.types.get(&(candidate, arity)));
                if found.is_none() && qualifiers.is_empty() && !last.is_generic() {
                    return self.resolve_alias(&last.name, scope);
                }
                found
            }
        };

        named.map(|named| named_symbol(named, args))
    }

    /// `using Alias = Some.Type<Arg>;` referenced as `Alias`.
    fn resolve_alias(&self, alias: &str, scope: &ResolutionScope) -> Option<TypeSymbol> {
        let target = scope
            .alias(alias)
            .or_else(|| self.global_alias(alias))?;
        let ty = TypeSyntax::parse(target).ok()?;
        self.resolve_type(&ty, &ResolutionScope::global())
    }

    fn global_alias(&self, alias: &str) -> Option<&str> {
        self.global_usings.iter().find_map(|u| match &u.kind {
            UsingKind::Alias(name) if name == alias => Some(u.target.as_str()),
            _ => None,
        })
    }

    /// Fully qualified names `dotted` may refer to from `scope`, in lookup order.
    fn candidates(&self, dotted: &str, scope: &ResolutionScope) -> Vec<String> {
        let mut out = Vec::new();

        for depth in (1..=scope.type_chain.len()).rev() {
            let mut parts: Vec<&str> = Vec::new();
            if let Some(ns) = &scope.namespace {
                parts.push(ns);
            }
            parts.extend(scope.type_chain[..depth].iter().map(String::as_str));
            out.push(format!("{}.{}", parts.join("."), dotted));
        }

        if let Some(ns) = &scope.namespace {
            let mut current = ns.as_str();
            loop {
                out.push(format!("{}.{}", current, dotted));
                match current.rsplit_once('.') {
                    Some((outer, _)) => current = outer,
                    None => break,
                }
            }
        }

        out.push(dotted.to_string());

        let (first, rest) = match dotted.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (dotted, None),
        };
        let usings: Vec<&UsingDirective> = scope.usings.iter().chain(&self.global_usings).collect();

        for using in &usings {
            match using.kind {
                UsingKind::Namespace if rest.is_none() => out.push(format!("{}.{}", using.target, dotted)),
                UsingKind::Static => out.push(format!("{}.{}", using.target, dotted)),
                _ => {}
            }
        }
        if rest.is_none() {
            for ns in &self.implicit_usings {
                out.push(format!("{}.{}", ns, dotted));
            }
        }

        if let Some(rest) = rest {
            for using in &usings {
                if let UsingKind::Alias(alias) = &using.kind {
                    if alias == first {
                        out.push(format!("{}.{}", using.target, rest));
                    }
                }
            }
        }

        out
    }
}

fn resolve_keyword(keyword: &str) -> Option<TypeSymbol> {
    if keyword == "dynamic" {
        return Some(TypeSymbol {
            display: "dynamic".to_string(),
            containing_namespace: None,
            is_reference_type: true,
            is_nullable: false,
        });
    }
    let predefined = catalog::predefined_by_keyword(keyword)?;
    Some(keyword_symbol(predefined))
}

fn keyword_symbol(predefined: &catalog::PredefinedType) -> TypeSymbol {
    TypeSymbol {
        display: predefined.keyword.to_string(),
        containing_namespace: Some(SYSTEM_NAMESPACE.to_string()),
        is_reference_type: predefined.is_reference_type,
        is_nullable: false,
    }
}

fn named_symbol(named: &NamedType, mut args: Vec<TypeSymbol>) -> TypeSymbol {
    if args.is_empty() {
        if let Some(predefined) = catalog::predefined_by_full_name(&named.full_name) {
            return keyword_symbol(predefined);
        }
    }

    if named.full_name == "System.Nullable" && args.len() == 1 && !args[0].is_reference_type {
        return args.remove(0).into_nullable();
    }

    let display = if args.is_empty() {
        named.full_name.clone()
    } else {
        let rendered: Vec<&str> = args.iter().map(|a| a.display.as_str()).collect();
        format!("{}<{}>", named.full_name, rendered.join(", "))
    };

    TypeSymbol {
        display,
        containing_namespace: named.namespace.clone(),
        is_reference_type: named.is_reference_type,
        is_nullable: false,
    }
}
