//! Compile-time evaluation of string constant expressions.
//!
//! Covers what an attribute argument naming a task can legally be: string
//! literals in all their forms, `nameof`, references to `const string`
//! fields, `+` and parentheses. Anything else is "not a constant".

use super::model::{ResolutionScope, SemanticModel};

/// Constant fields referring to each other are followed at most this deep.
const MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str(String),
    Ident(String),
    Plus,
    LParen,
    RParen,
    Dot,
    ColonColon,
    Other(char),
}

/// Evaluates `expression` to a string, or `None` when it is not a constant.
pub fn evaluate(expression: &str, scope: &ResolutionScope, model: &SemanticModel) -> Option<String> {
    evaluate_at_depth(expression, scope, model, 0)
}

pub(crate) fn evaluate_at_depth(
    expression: &str,
    scope: &ResolutionScope,
    model: &SemanticModel,
    depth: usize,
) -> Option<String> {
    if depth > MAX_DEPTH {
        tracing::debug!(expression, "constant evaluation too deep; treating as non-constant");
        return None;
    }
    let tokens = lex(expression)?;
    let mut evaluator = Evaluator {
        tokens,
        pos: 0,
        scope,
        model,
        depth,
    };
    let value = evaluator.expr()?;
    (evaluator.pos == evaluator.tokens.len()).then_some(value)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn lex(text: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '"' => {
                let (value, end) = lex_string(&chars, i, false)?;
                tokens.push(Token::Str(value));
                i = end;
            }
            '@' if next == Some('"') => {
                let (value, end) = lex_verbatim(&chars, i + 1, false)?;
                tokens.push(Token::Str(value));
                i = end;
            }
            '@' if next == Some('$') && chars.get(i + 2) == Some(&'"') => {
                let (value, end) = lex_verbatim(&chars, i + 2, true)?;
                tokens.push(Token::Str(value));
                i = end;
            }
            '$' if next == Some('@') && chars.get(i + 2) == Some(&'"') => {
                let (value, end) = lex_verbatim(&chars, i + 2, true)?;
                tokens.push(Token::Str(value));
                i = end;
            }
            '$' if next == Some('"') => {
                let (value, end) = lex_string(&chars, i + 1, true)?;
                tokens.push(Token::Str(value));
                i = end;
            }
            '@' if next.is_some_and(is_ident_start) => {
                let (ident, end) = lex_ident(&chars, i + 1);
                tokens.push(Token::Ident(ident));
                i = end;
            }
            c if is_ident_start(c) => {
                let (ident, end) = lex_ident(&chars, i);
                tokens.push(Token::Ident(ident));
                i = end;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            ':' if next == Some(':') => {
                tokens.push(Token::ColonColon);
                i += 2;
            }
            other => {
                tokens.push(Token::Other(other));
                i += 1;
            }
        }
    }

    Some(tokens)
}

fn lex_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && is_ident_part(chars[end]) {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}

fn quote_run(chars: &[char], start: usize) -> usize {
    chars[start..].iter().take_while(|c| **c == '"').count()
}

/// Regular or raw string starting at the opening quote.
fn lex_string(chars: &[char], start: usize, interpolated: bool) -> Option<(String, usize)> {
    let quotes = quote_run(chars, start);
    if quotes >= 3 {
        return lex_raw(chars, start, quotes, interpolated);
    }
    if quotes == 2 {
        return Some((String::new(), start + 2));
    }

    let mut value = String::new();
    let mut i = start + 1;
    loop {
        let c = *chars.get(i)?;
        match c {
            '"' => return Some((value, i + 1)),
            '\n' => return None,
            '\\' => {
                let (unescaped, next) = unescape(chars, i)?;
                value.push(unescaped);
                i = next;
            }
            '{' | '}' if interpolated => {
                // A single brace opens or closes a hole.
                if chars.get(i + 1) != Some(&c) {
                    return None;
                }
                value.push(c);
                i += 2;
            }
            _ => {
                value.push(c);
                i += 1;
            }
        }
    }
}

/// Verbatim string; `start` is the opening quote.
fn lex_verbatim(chars: &[char], start: usize, interpolated: bool) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut i = start + 1;
    loop {
        let c = *chars.get(i)?;
        match c {
            '"' if chars.get(i + 1) == Some(&'"') => {
                value.push('"');
                i += 2;
            }
            '"' => return Some((value, i + 1)),
            '{' | '}' if interpolated => {
                if chars.get(i + 1) != Some(&c) {
                    return None;
                }
                value.push(c);
                i += 2;
            }
            _ => {
                value.push(c);
                i += 1;
            }
        }
    }
}

/// Raw string literal delimited by `quotes` quote characters.
fn lex_raw(chars: &[char], start: usize, quotes: usize, interpolated: bool) -> Option<(String, usize)> {
    let content_start = start + quotes;
    let mut i = content_start;
    while i < chars.len() {
        if chars[i] == '"' && quote_run(chars, i) >= quotes {
            let content: String = chars[content_start..i].iter().collect();
            if interpolated && content.contains(['{', '}']) {
                return None;
            }
            return Some((raw_content(&content)?, i + quotes));
        }
        i += 1;
    }
    None
}

/// Applies multi-line raw string rules: drop the delimiter lines and the closing line's indentation.
fn raw_content(content: &str) -> Option<String> {
    if !content.contains('\n') {
        return Some(content.to_string());
    }
    let lines: Vec<&str> = content.split('\n').collect();
    let (first, rest) = lines.split_first()?;
    let (last, body) = rest.split_last()?;
    if !first.trim().is_empty() || !last.trim().is_empty() {
        return None;
    }
    let indent = last.trim_end_matches('\r');
    let mut out = Vec::with_capacity(body.len());
    for line in body {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            out.push("");
        } else {
            out.push(line.strip_prefix(indent)?);
        }
    }
    Some(out.join("\n"))
}

fn hex_value(chars: &[char], start: usize, min: usize, max: usize) -> Option<(char, usize)> {
    let digits: String = chars[start..]
        .iter()
        .take(max)
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    if digits.len() < min {
        return None;
    }
    let code = u32::from_str_radix(&digits, 16).ok()?;
    Some((char::from_u32(code)?, start + digits.len()))
}

/// Unescapes the sequence starting at the backslash at `i`.
fn unescape(chars: &[char], i: usize) -> Option<(char, usize)> {
    let simple = match *chars.get(i + 1)? {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        'a' => '\u{07}',
        'b' => '\u{08}',
        'f' => '\u{0C}',
        'v' => '\u{0B}',
        'e' => '\u{1B}',
        '\\' => '\\',
        '"' => '"',
        '\'' => '\'',
        'u' => return hex_value(chars, i + 2, 4, 4),
        'U' => return hex_value(chars, i + 2, 8, 8),
        'x' => return hex_value(chars, i + 2, 1, 4),
        _ => return None,
    };
    Some((simple, i + 2))
}

struct Evaluator<'a> {
    tokens: Vec<Token>,
    pos: usize,
    scope: &'a ResolutionScope,
    model: &'a SemanticModel,
    depth: usize,
}

impl Evaluator<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Option<String> {
        let mut value = self.term()?;
        while self.peek() == Some(&Token::Plus) {
            self.pos += 1;
            value.push_str(&self.term()?);
        }
        Some(value)
    }

    fn term(&mut self) -> Option<String> {
        match self.next()? {
            Token::Str(value) => Some(value),
            Token::LParen => {
                let value = self.expr()?;
                (self.next()? == Token::RParen).then_some(value)
            }
            Token::Ident(name) if name == "nameof" && self.peek() == Some(&Token::LParen) => self.name_of(),
            Token::Ident(name) => {
                let path = self.path(name)?;
                self.model.resolve_constant(&path, self.scope, self.depth)
            }
            _ => None,
        }
    }

    /// `nameof(...)`: the last identifier outside any type argument list.
    fn name_of(&mut self) -> Option<String> {
        self.pos += 1;
        let mut parens = 1usize;
        let mut angles = 0usize;
        let mut last = None;
        loop {
            match self.next()? {
                Token::LParen => parens += 1,
                Token::RParen => {
                    parens -= 1;
                    if parens == 0 {
                        break;
                    }
                }
                Token::Other('<') => angles += 1,
                Token::Other('>') => angles = angles.saturating_sub(1),
                Token::Ident(name) if parens == 1 && angles == 0 => last = Some(name),
                _ => {}
            }
        }
        last
    }

    /// A dotted member access path, e.g. `TaskNames.Greet`.
    fn path(&mut self, first: String) -> Option<String> {
        let mut path = first;
        if path == "global" && self.peek() == Some(&Token::ColonColon) {
            self.pos += 1;
            match self.next()? {
                Token::Ident(name) => path = name,
                _ => return None,
            }
        }
        while self.peek() == Some(&Token::Dot) {
            self.pos += 1;
            match self.next()? {
                Token::Ident(name) => {
                    path.push('.');
                    path.push_str(&name);
                }
                _ => return None,
            }
        }
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::csharp::parser::CSharpParser;
    use std::path::Path;

    fn eval(expression: &str) -> Option<String> {
        let model = SemanticModel::build(&[], &[]);
        evaluate(expression, &ResolutionScope::global(), &model)
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(eval(r#""Greet""#).as_deref(), Some("Greet"));
        assert_eq!(eval(r#""a\tb\u0041""#).as_deref(), Some("a\tbA"));
        assert_eq!(eval(r#"@"C:\tasks""quoted""""#).as_deref(), Some(r#"C:\tasks"quoted""#));
        assert_eq!(eval(r#""""raw "text""""#).as_deref(), Some(r#"raw "text"#));
        assert_eq!(eval(r#""""#).as_deref(), Some(""));
    }

    #[test]
    fn test_interpolated_strings() {
        assert_eq!(eval(r#"$"Plain""#).as_deref(), Some("Plain"));
        assert_eq!(eval(r#"$"{{braces}}""#).as_deref(), Some("{braces}"));
        assert_eq!(eval(r#"$"Hello {name}""#), None);
    }

    #[test]
    fn test_nameof_and_concatenation() {
        assert_eq!(eval("nameof(SayHello)").as_deref(), Some("SayHello"));
        assert_eq!(eval("nameof(Tasks.SayHello)").as_deref(), Some("SayHello"));
        assert_eq!(eval("nameof(List<int>)").as_deref(), Some("List"));
        assert_eq!(eval(r#""Order" + ("_" + nameof(Ship))"#).as_deref(), Some("Order_Ship"));
    }

    #[test]
    fn test_non_constants() {
        assert_eq!(eval("null"), None);
        assert_eq!(eval("GetName()"), None);
        assert_eq!(eval("42"), None);
        assert_eq!(eval(r#""a" +"#), None);
        assert_eq!(eval(r#""unterminated"#), None);
    }

    #[test]
    fn test_const_field_references() {
        let mut parser = CSharpParser::new().unwrap();
        let file = parser
            .parse(
                r#"
namespace App
{
    public static class Names
    {
        public const string Prefix = "Orders.";
        public const string Ship = Prefix + "Ship";
        public const string Loop = Loop + "x";
    }

    public class Job { }
}
"#,
                Path::new("Names.cs"),
            )
            .unwrap();
        let model = SemanticModel::build(std::slice::from_ref(&file), &[]);
        let job = file.types.iter().find(|t| t.name == "Job").unwrap();
        let scope = ResolutionScope::for_type(&file, job);

        assert_eq!(evaluate("Names.Ship", &scope, &model).as_deref(), Some("Orders.Ship"));
        assert_eq!(evaluate("App.Names.Prefix", &scope, &model).as_deref(), Some("Orders."));
        assert_eq!(evaluate("global::App.Names.Prefix", &scope, &model).as_deref(), Some("Orders."));
        assert_eq!(evaluate("Names.Loop", &scope, &model), None);
        assert_eq!(evaluate("Names.Missing", &scope, &model), None);
    }
}
