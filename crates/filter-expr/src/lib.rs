//! Expression tree and parser for assign filters.
//!
//! Supports:
//! - Strings: `"web1"`, `"with \"escapes\""`
//! - Numbers: `42`, `-3.5`
//! - Literals: `true`, `false`, `null`
//! - Arrays: `["a", "b"]`
//! - Member access: `host.name`, `host["name"]`
//! - Equality: `==`, `!=`
//! - Relations: `<`, `<=`, `>`, `>=`, `in`, `!in`
//! - Arithmetic: `+`, `-`, `*`, `/`, `%`
//! - Logical: `&&`, `||`, `!`
//! - Function calls: `match("web*", host.name)`
//!
//! Identifiers that are not literals become [`Expr::Variable`]; they are
//! either object references such as `host` or named constants looked up in a
//! [`ConstantTable`].
//!
//! # Example
//!
//! ```
//! use filter_expr::{parse, Expr};
//!
//! let filter = parse(r#"host.name == "web1""#).unwrap();
//! assert_eq!(
//!     filter,
//!     Expr::equal(Expr::member(Expr::variable("host"), "name"), Expr::literal("web1"))
//! );
//! ```

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, delimited, opt, preceded, repeat, separated, terminated};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, none_of, one_of, take_while};

/// Deepest bracket nesting [`parse`] accepts.
pub const MAX_NESTING: usize = 128;

/// Deepest tree [`parse`] returns, counting every operator and accessor.
pub const MAX_DEPTH: usize = 1024;

// ============ Value Types ============

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

// ============ AST Types ============

/// A node of a compiled filter.
///
/// `==`, `&&` and `||` get variants of their own because by-name target
/// extraction looks for exactly those; every other operator is a
/// [`Expr::Binary`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Variable(String),
    /// `base.key` or `base[key]`
    Indexer {
        base: Box<Expr>,
        key: Box<Expr>,
    },
    Equal(Box<Expr>, Box<Expr>),
    LogicalAnd(Box<Expr>, Box<Expr>),
    LogicalOr(Box<Expr>, Box<Expr>),
    LogicalNot(Box<Expr>),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Array(Vec<Expr>),
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    In,
    NotIn,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "!in",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    /// `base.field`, the same tree the parser builds for member access.
    pub fn member(base: Expr, field: &str) -> Self {
        Expr::Indexer {
            base: Box::new(base),
            key: Box::new(Expr::literal(field)),
        }
    }

    pub fn index(base: Expr, key: Expr) -> Self {
        Expr::Indexer {
            base: Box::new(base),
            key: Box::new(key),
        }
    }

    pub fn equal(left: Expr, right: Expr) -> Self {
        Expr::Equal(Box::new(left), Box::new(right))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::LogicalAnd(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::LogicalOr(Box::new(left), Box::new(right))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut pending = vec![(self, 1)];

        while let Some((node, depth)) = pending.pop() {
            max = max.max(depth);
            let depth = depth + 1;
            match node {
                Expr::Literal(_) | Expr::Variable(_) => {}
                Expr::Indexer { base: left, key: right }
                | Expr::Equal(left, right)
                | Expr::LogicalAnd(left, right)
                | Expr::LogicalOr(left, right)
                | Expr::Binary { left, right, .. } => {
                    pending.push((left.as_ref(), depth));
                    pending.push((right.as_ref(), depth));
                }
                Expr::LogicalNot(e) | Expr::Negate(e) => pending.push((e.as_ref(), depth)),
                Expr::Array(items) | Expr::Call { args: items, .. } => {
                    pending.extend(items.iter().map(|item| (item, depth)));
                }
            }
        }

        max
    }

    fn is_compound(&self) -> bool {
        matches!(
            self,
            Expr::Equal(..)
                | Expr::LogicalAnd(..)
                | Expr::LogicalOr(..)
                | Expr::LogicalNot(_)
                | Expr::Negate(_)
                | Expr::Binary { .. }
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty filter")]
    Empty,
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unexpected trailing input: {0:?}")]
    Trailing(String),
    #[error("filter nests deeper than {max} levels")]
    TooDeep { max: usize },
}

// ============ Constants ============

/// Named constants a filter may reference instead of literals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantTable {
    entries: HashMap<String, Value>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ConstantTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============ Parser ============

fn ws<'a, P, O>(p: P) -> impl Parser<&'a str, O, ContextError>
where
    P: Parser<&'a str, O, ContextError>,
{
    delimited(multispace0, p, multispace0)
}

fn number(input: &mut &str) -> ModalResult<Expr> {
    let int_part: &str = digit1.parse_next(input)?;
    let frac_part: Option<&str> = opt(preceded('.', digit1)).parse_next(input)?;

    let mut s = String::from(int_part);
    if let Some(frac) = frac_part {
        s.push('.');
        s.push_str(frac);
    }

    let n: f64 = s
        .parse()
        .map_err(|_| ErrMode::Cut(ContextError::new()))?;
    Ok(Expr::Literal(Value::Number(n)))
}

fn string_char(input: &mut &str) -> ModalResult<char> {
    let c: char = none_of('"').parse_next(input)?;
    if c == '\\' {
        let escaped: char = any.parse_next(input)?;
        Ok(match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '"' => '"',
            '\\' => '\\',
            c => c,
        })
    } else {
        Ok(c)
    }
}

fn string_literal(input: &mut &str) -> ModalResult<Expr> {
    let chars: String = delimited(
        '"',
        repeat(0.., string_char).fold(String::new, |mut s, c| {
            s.push(c);
            s
        }),
        '"',
    )
    .parse_next(input)?;
    Ok(Expr::Literal(Value::String(chars)))
}

fn ident(input: &mut &str) -> ModalResult<String> {
    let first: char = one_of(|c: char| c.is_ascii_alphabetic() || c == '_').parse_next(input)?;
    let rest: &str =
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;
    Ok(format!("{}{}", first, rest))
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn var_or_literal_or_call(input: &mut &str) -> ModalResult<Expr> {
    let name = ident.parse_next(input)?;

    let _ = multispace0.parse_next(input)?;
    if input.starts_with('(') {
        '('.parse_next(input)?;
        let _ = multispace0.parse_next(input)?;
        let args: Vec<Expr> = separated(0.., ws(expr), ws(',')).parse_next(input)?;
        let _ = multispace0.parse_next(input)?;
        ')'.parse_next(input)?;
        return Ok(Expr::Call { name, args });
    }

    match name.as_str() {
        "true" => Ok(Expr::Literal(Value::Bool(true))),
        "false" => Ok(Expr::Literal(Value::Bool(false))),
        "null" => Ok(Expr::Literal(Value::Null)),
        _ => Ok(Expr::Variable(name)),
    }
}

fn array(input: &mut &str) -> ModalResult<Expr> {
    let elements: Vec<Expr> = delimited(
        ('[', multispace0),
        separated(0.., ws(expr), ws(',')),
        (multispace0, ']'),
    )
    .parse_next(input)?;
    Ok(Expr::Array(elements))
}

fn atom(input: &mut &str) -> ModalResult<Expr> {
    let _ = multispace0.parse_next(input)?;
    alt((
        delimited(('(', multispace0), expr, (multispace0, ')')),
        array,
        string_literal,
        number,
        var_or_literal_or_call,
    ))
    .parse_next(input)
}

fn postfix(input: &mut &str) -> ModalResult<Expr> {
    let mut base = atom.parse_next(input)?;
    loop {
        let _ = multispace0.parse_next(input)?;
        if input.starts_with('[') {
            '['.parse_next(input)?;
            let _ = multispace0.parse_next(input)?;
            let key = expr.parse_next(input)?;
            let _ = multispace0.parse_next(input)?;
            ']'.parse_next(input)?;
            base = Expr::index(base, key);
        } else if input.starts_with('.') {
            '.'.parse_next(input)?;
            let name = ident.parse_next(input)?;
            base = Expr::member(base, &name);
        } else {
            break;
        }
    }
    Ok(base)
}

fn unary(input: &mut &str) -> ModalResult<Expr> {
    let mut prefixes = Vec::new();
    loop {
        let _ = multispace0.parse_next(input)?;
        match opt(one_of(['!', '-'])).parse_next(input)? {
            Some(op) => prefixes.push(op),
            None => break,
        }
    }

    let mut e = postfix.parse_next(input)?;
    for op in prefixes.into_iter().rev() {
        e = match (op, e) {
            ('-', Expr::Literal(Value::Number(n))) => Expr::Literal(Value::Number(-n)),
            ('-', e) => Expr::Negate(Box::new(e)),
            (_, e) => Expr::LogicalNot(Box::new(e)),
        };
    }
    Ok(e)
}

fn term(input: &mut &str) -> ModalResult<Expr> {
    let init = unary.parse_next(input)?;

    repeat(0.., (ws(one_of(['*', '/', '%'])), unary))
        .fold(
            move || init.clone(),
            |acc, (op_char, val): (char, Expr)| {
                let op = match op_char {
                    '*' => BinaryOp::Mul,
                    '/' => BinaryOp::Div,
                    _ => BinaryOp::Mod,
                };
                Expr::binary(op, acc, val)
            },
        )
        .parse_next(input)
}

fn arith(input: &mut &str) -> ModalResult<Expr> {
    let init = term.parse_next(input)?;

    repeat(0.., (ws(one_of(['+', '-'])), term))
        .fold(
            move || init.clone(),
            |acc, (op_char, val): (char, Expr)| {
                let op = if op_char == '+' {
                    BinaryOp::Add
                } else {
                    BinaryOp::Sub
                };
                Expr::binary(op, acc, val)
            },
        )
        .parse_next(input)
}

fn peek_non_ident(input: &mut &str) -> ModalResult<()> {
    let next = input.chars().next();
    if next
        .map(|c| c.is_ascii_alphanumeric() || c == '_')
        .unwrap_or(false)
    {
        Err(ErrMode::Backtrack(ContextError::new()))
    } else {
        Ok(())
    }
}

fn rel_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((
        "<=".value(BinaryOp::LessEqual),
        ">=".value(BinaryOp::GreaterEqual),
        "<".value(BinaryOp::Less),
        ">".value(BinaryOp::Greater),
        terminated("in", peek_non_ident).value(BinaryOp::In),
        terminated("!in", peek_non_ident).value(BinaryOp::NotIn),
    ))
    .parse_next(input)
}

fn relation(input: &mut &str) -> ModalResult<Expr> {
    let left = arith.parse_next(input)?;
    let _ = multispace0.parse_next(input)?;

    match opt(rel_op).parse_next(input)? {
        Some(op) => {
            let _ = multispace0.parse_next(input)?;
            let right = arith.parse_next(input)?;
            Ok(Expr::binary(op, left, right))
        }
        None => Ok(left),
    }
}

/// `true` for `==`, `false` for `!=`.
fn eq_op(input: &mut &str) -> ModalResult<bool> {
    alt(("==".value(true), "!=".value(false))).parse_next(input)
}

fn equality(input: &mut &str) -> ModalResult<Expr> {
    let init = relation.parse_next(input)?;

    repeat(0.., (ws(eq_op), relation))
        .fold(
            move || init.clone(),
            |acc, (is_equal, val): (bool, Expr)| {
                if is_equal {
                    Expr::equal(acc, val)
                } else {
                    Expr::binary(BinaryOp::NotEqual, acc, val)
                }
            },
        )
        .parse_next(input)
}

fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let init = equality.parse_next(input)?;

    repeat(0.., preceded((multispace0, "&&", multispace0), equality))
        .fold(move || init.clone(), Expr::and)
        .parse_next(input)
}

fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let init = and_expr.parse_next(input)?;

    repeat(0.., preceded((multispace0, "||", multispace0), and_expr))
        .fold(move || init.clone(), Expr::or)
        .parse_next(input)
}

fn expr(input: &mut &str) -> ModalResult<Expr> {
    or_expr(input)
}

/// Deepest `(`/`[` nesting outside string literals.
fn nesting_depth(input: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for c in input.chars() {
        if in_string {
            match (escaped, c) {
                (true, _) => escaped = false,
                (false, '\\') => escaped = true,
                (false, '"') => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' => {
                depth += 1;
                max = max.max(depth);
            }
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Longest run of prefix operators and accessors (`!`, `-`, `.`, `[`) not
/// broken up by a binary operator, outside string literals.
fn longest_chain(input: &str) -> usize {
    let mut run = 0usize;
    let mut max = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for c in input.chars() {
        if in_string {
            match (escaped, c) {
                (true, _) => escaped = false,
                (false, '\\') => escaped = true,
                (false, '"') => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '!' | '-' | '.' | '[' => {
                run += 1;
                max = max.max(run);
            }
            '=' | '<' | '>' | '&' | '|' | '+' | '*' | '/' | '%' | ',' | '(' => run = 0,
            _ => {}
        }
    }
    max
}

/// Tears a tree down without recursing, for trees too deep to drop normally.
fn dismantle(expr: Expr) {
    let mut pending = vec![expr];
    while let Some(node) = pending.pop() {
        match node {
            Expr::Literal(_) | Expr::Variable(_) => {}
            Expr::Indexer { base: left, key: right }
            | Expr::Equal(left, right)
            | Expr::LogicalAnd(left, right)
            | Expr::LogicalOr(left, right)
            | Expr::Binary { left, right, .. } => {
                pending.push(*left);
                pending.push(*right);
            }
            Expr::LogicalNot(e) | Expr::Negate(e) => pending.push(*e),
            Expr::Array(items) | Expr::Call { args: items, .. } => pending.extend(items),
        }
    }
}

fn starts_with_operator(s: &str) -> bool {
    s.starts_with(|c: char| "=!<>&|+-*/%.".contains(c))
}

pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }
    if nesting_depth(input) > MAX_NESTING {
        return Err(ParseError::TooDeep { max: MAX_NESTING });
    }
    if longest_chain(input) > MAX_DEPTH {
        return Err(ParseError::TooDeep { max: MAX_DEPTH });
    }
    match expr.parse_next(&mut input) {
        Ok(e) => {
            let remaining = input.trim();
            if starts_with_operator(remaining) {
                dismantle(e);
                Err(ParseError::Syntax(format!(
                    "incomplete expression or unknown operator at {:?}",
                    remaining
                )))
            } else if !remaining.is_empty() {
                dismantle(e);
                Err(ParseError::Trailing(remaining.to_string()))
            } else if e.depth() > MAX_DEPTH {
                dismantle(e);
                Err(ParseError::TooDeep { max: MAX_DEPTH })
            } else {
                Ok(e)
            }
        }
        Err(e) => Err(ParseError::Syntax(format!("{:?}", e))),
    }
}

// ============ Display ============

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, e: &Expr) -> fmt::Result {
    if e.is_compound() {
        write!(f, "({})", e)
    } else {
        write!(f, "{}", e)
    }
}

fn write_binary(f: &mut fmt::Formatter<'_>, left: &Expr, op: &str, right: &Expr) -> fmt::Result {
    write_operand(f, left)?;
    write!(f, " {} ", op)?;
    write_operand(f, right)
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Prints the filter back in source syntax, parenthesizing nested operators.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Indexer { base, key } => {
                write_operand(f, base)?;
                match key.as_ref() {
                    Expr::Literal(Value::String(field)) if is_ident(field) => {
                        write!(f, ".{}", field)
                    }
                    key => write!(f, "[{}]", key),
                }
            }
            Expr::Equal(left, right) => write_binary(f, left, "==", right),
            Expr::LogicalAnd(left, right) => write_binary(f, left, "&&", right),
            Expr::LogicalOr(left, right) => write_binary(f, left, "||", right),
            Expr::LogicalNot(e) => {
                write!(f, "!")?;
                write_operand(f, e)
            }
            Expr::Negate(e) => {
                write!(f, "-")?;
                write_operand(f, e)
            }
            Expr::Binary { op, left, right } => write_binary(f, left, op.symbol(), right),
            Expr::Array(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                write_list(f, args)?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_field(field: &str) -> Expr {
        Expr::member(Expr::variable("host"), field)
    }

    fn host_name() -> Expr {
        host_field("name")
    }

    #[test]
    fn test_member_access() {
        assert_eq!(parse("host.name").unwrap(), host_name());
    }

    #[test]
    fn test_bracket_access_builds_same_tree() {
        assert_eq!(parse(r#"host["name"]"#).unwrap(), host_name());
        assert_eq!(
            parse("host[field]").unwrap(),
            Expr::index(Expr::variable("host"), Expr::variable("field"))
        );
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            parse(r#"host.name == "web1""#).unwrap(),
            Expr::equal(host_name(), Expr::literal("web1"))
        );
        assert_eq!(
            parse(r#""web1"==host.name"#).unwrap(),
            Expr::equal(Expr::literal("web1"), host_name())
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let parsed = parse(r#"a == "1" && b == "2" || c == "3""#).unwrap();
        let expected = Expr::or(
            Expr::and(
                Expr::equal(Expr::variable("a"), Expr::literal("1")),
                Expr::equal(Expr::variable("b"), Expr::literal("2")),
            ),
            Expr::equal(Expr::variable("c"), Expr::literal("3")),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_or_is_left_associative() {
        let parsed = parse("a || b || c").unwrap();
        let expected = Expr::or(
            Expr::or(Expr::variable("a"), Expr::variable("b")),
            Expr::variable("c"),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parentheses_override_associativity() {
        let parsed = parse("a || (b || c)").unwrap();
        let expected = Expr::or(
            Expr::variable("a"),
            Expr::or(Expr::variable("b"), Expr::variable("c")),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_equality_chain() {
        let parsed = parse("a == b == c").unwrap();
        let expected = Expr::equal(
            Expr::equal(Expr::variable("a"), Expr::variable("b")),
            Expr::variable("c"),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_other_operators() {
        assert_eq!(
            parse(r#"host.name != "web1""#).unwrap(),
            Expr::binary(BinaryOp::NotEqual, host_name(), Expr::literal("web1"))
        );
        assert_eq!(
            parse("host.vars.load < 5").unwrap(),
            Expr::binary(
                BinaryOp::Less,
                Expr::member(host_field("vars"), "load"),
                Expr::literal(5.0)
            )
        );
        assert_eq!(
            parse(r#""linux" in host.groups"#).unwrap(),
            Expr::binary(
                BinaryOp::In,
                Expr::literal("linux"),
                host_field("groups")
            )
        );
        assert_eq!(
            parse(r#""linux" !in host.groups"#).unwrap(),
            Expr::binary(
                BinaryOp::NotIn,
                Expr::literal("linux"),
                host_field("groups")
            )
        );
    }

    #[test]
    fn test_identifier_starting_with_in() {
        assert_eq!(
            parse("index < 2").unwrap(),
            Expr::binary(BinaryOp::Less, Expr::variable("index"), Expr::literal(2.0))
        );
    }

    #[test]
    fn test_arithmetic_precedence() {
        let parsed = parse("1 + 2 * 3").unwrap();
        let expected = Expr::binary(
            BinaryOp::Add,
            Expr::literal(1.0),
            Expr::binary(BinaryOp::Mul, Expr::literal(2.0), Expr::literal(3.0)),
        );
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_negative_number_folds_into_literal() {
        assert_eq!(parse("-3.5").unwrap(), Expr::literal(-3.5));
        assert_eq!(
            parse("-x").unwrap(),
            Expr::Negate(Box::new(Expr::variable("x")))
        );
    }

    #[test]
    fn test_not() {
        assert_eq!(
            parse("!host.vars.disabled").unwrap(),
            Expr::LogicalNot(Box::new(Expr::member(host_field("vars"), "disabled")))
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("true").unwrap(), Expr::literal(true));
        assert_eq!(parse("null").unwrap(), Expr::Literal(Value::Null));
        assert_eq!(
            parse(r#"["a", 1]"#).unwrap(),
            Expr::Array(vec![Expr::literal("a"), Expr::literal(1.0)])
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            parse(r#""say \"hi\"\n""#).unwrap(),
            Expr::literal("say \"hi\"\n")
        );
    }

    #[test]
    fn test_call() {
        assert_eq!(
            parse(r#"match("web*", host.name)"#).unwrap(),
            Expr::Call {
                name: "match".to_string(),
                args: vec![Expr::literal("web*"), host_name()],
            }
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert!(matches!(parse("&& host.name"), Err(ParseError::Syntax(_))));
        assert_eq!(
            parse(r#"host.name "x""#),
            Err(ParseError::Trailing(r#""x""#.to_string()))
        );
    }

    #[test]
    fn test_cut_off_filter_is_syntax_error() {
        assert!(matches!(parse("host.name =="), Err(ParseError::Syntax(_))));
        assert!(matches!(
            parse(r#"host.name == "a" ||"#),
            Err(ParseError::Syntax(_))
        ));
        assert!(matches!(
            parse(r#"host.name = "x""#),
            Err(ParseError::Syntax(_))
        ));
    }

    #[test]
    fn test_long_prefix_chain_is_too_deep() {
        let filter = format!("{}x", "!".repeat(100_000));
        assert_eq!(parse(&filter), Err(ParseError::TooDeep { max: MAX_DEPTH }));

        let filter = format!("{}x", "-".repeat(100_000));
        assert_eq!(parse(&filter), Err(ParseError::TooDeep { max: MAX_DEPTH }));
    }

    #[test]
    fn test_long_accessor_chain_is_too_deep() {
        let filter = format!("x{}", ".a".repeat(60_000));
        assert_eq!(parse(&filter), Err(ParseError::TooDeep { max: MAX_DEPTH }));
    }

    #[test]
    fn test_deep_operator_chain_is_too_deep() {
        let filter = format!("x{}", " + x".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&filter), Err(ParseError::TooDeep { max: MAX_DEPTH }));
    }

    #[test]
    fn test_long_host_list_parses() {
        let filter = (0..500)
            .map(|i| format!(r#"host.name == "web{}""#, i))
            .collect::<Vec<_>>()
            .join(" || ");
        assert!(parse(&filter).is_ok());
    }

    #[test]
    fn test_short_chains_parse() {
        let parsed = parse("!!x").unwrap();
        assert_eq!(
            parsed,
            Expr::LogicalNot(Box::new(Expr::LogicalNot(Box::new(Expr::variable("x")))))
        );
        assert_eq!(parsed.depth(), 3);
        assert_eq!(parse("--2").unwrap(), Expr::literal(2.0));
        assert_eq!(parse("x.a.b").unwrap().depth(), 3);
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}x{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        assert_eq!(parse(&deep), Err(ParseError::TooDeep { max: MAX_NESTING }));

        let ok = format!("{}x{}", "(".repeat(8), ")".repeat(8));
        assert_eq!(parse(&ok).unwrap(), Expr::variable("x"));
    }

    #[test]
    fn test_brackets_inside_strings_do_not_count() {
        let filter = format!(r#"host.name == "{}""#, "(".repeat(MAX_NESTING + 1));
        assert!(parse(&filter).is_ok());
    }

    #[test]
    fn test_display() {
        let filter = parse(r#"host.name == "a" && service.name == X || host["the name"] == "b""#)
            .unwrap();
        assert_eq!(
            filter.to_string(),
            r#"((host.name == "a") && (service.name == X)) || (host["the name"] == "b")"#
        );
        assert_eq!(parse(&filter.to_string()).unwrap(), filter);
    }

    #[test]
    fn test_constant_table() {
        let mut constants: ConstantTable = [("X", "web1")].into_iter().collect();
        assert_eq!(constants.lookup("X"), Some(&Value::from("web1")));
        assert!(constants.lookup("Y").is_none());

        assert_eq!(constants.insert("X", 3.0), Some(Value::from("web1")));
        assert_eq!(constants.lookup("X").and_then(Value::as_str), None);
        assert!(constants.contains("X"));
        assert_eq!(constants.len(), 1);
    }
}
