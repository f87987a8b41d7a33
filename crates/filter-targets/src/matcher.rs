//! By-name shape recognition over filter trees.
//!
//! Every function here borrows both the filter and the constant table for the
//! same lifetime `'a`, and every name it hands back is a `&'a str` pointing
//! into one of them. Nothing is copied.

use filter_expr::{ConstantTable, Expr, Value};

/// Resolves `expr` to a constant: a literal in the tree, or a variable bound
/// in `constants`.
pub fn resolve<'a>(expr: &'a Expr, constants: Option<&'a ConstantTable>) -> Option<&'a Value> {
    match expr {
        Expr::Literal(value) => Some(value),
        Expr::Variable(name) => constants?.lookup(name),
        _ => None,
    }
}

/// Like [`resolve`], but only string constants.
pub fn resolve_str<'a>(expr: &'a Expr, constants: Option<&'a ConstantTable>) -> Option<&'a str> {
    resolve(expr, constants).and_then(Value::as_str)
}

/// Whether `expr` is `<type_keyword>.name` (or `<type_keyword>["name"]`).
pub fn is_name_indexer(expr: &Expr, type_keyword: &str, constants: Option<&ConstantTable>) -> bool {
    let Expr::Indexer { base, key } = expr else {
        return false;
    };

    match base.as_ref() {
        Expr::Variable(name) if name == type_keyword => {
            resolve_str(key, constants) == Some("name")
        }
        _ => false,
    }
}

/// Matches `<type_keyword>.name == N` in either operand order and returns N.
pub fn compared_name<'a>(
    expr: &'a Expr,
    type_keyword: &str,
    constants: Option<&'a ConstantTable>,
) -> Option<&'a str> {
    let Expr::Equal(op1, op2) = expr else {
        return None;
    };

    if is_name_indexer(op1, type_keyword, constants) {
        return resolve_str(op2, constants);
    }

    if is_name_indexer(op2, type_keyword, constants) {
        return resolve_str(op1, constants);
    }

    None
}

/// Matches `host.name == H && service.name == S` in any operand order and
/// returns `(H, S)`.
pub fn target_service<'a>(
    expr: &'a Expr,
    constants: Option<&'a ConstantTable>,
) -> Option<(&'a str, &'a str)> {
    let Expr::LogicalAnd(op1, op2) = expr else {
        return None;
    };

    let (host, other) = match compared_name(op1, "host", constants) {
        Some(host) => (host, op2),
        None => (compared_name(op2, "host", constants)?, op1),
    };

    let service = compared_name(other, "service", constants)?;
    Some((host, service))
}

/// Matches `host.name == H` and returns H.
pub fn target_host<'a>(expr: &'a Expr, constants: Option<&'a ConstantTable>) -> Option<&'a str> {
    compared_name(expr, "host", constants)
}

/// Applies `leaf` to every leaf of the `||` tree rooted at `expr`, left to
/// right. Fails as soon as one leaf does; nothing collected so far escapes.
fn walk_disjunction<'a, T>(
    expr: &'a Expr,
    mut leaf: impl FnMut(&'a Expr) -> Option<T>,
) -> Option<Vec<T>> {
    let mut out = Vec::new();
    let mut pending = vec![expr];

    while let Some(node) = pending.pop() {
        match node {
            Expr::LogicalOr(left, right) => {
                pending.push(right.as_ref());
                pending.push(left.as_ref());
            }
            _ => out.push(leaf(node)?),
        }
    }

    Some(out)
}

/// Extracts every `(host, service)` pair from
/// `host.name == H && service.name == S [|| ...]`.
///
/// All or nothing: a single leaf of the `||` chain that is not such a pair
/// makes the whole filter unusable.
pub fn target_services<'a>(
    expr: &'a Expr,
    constants: Option<&'a ConstantTable>,
) -> Option<Vec<(&'a str, &'a str)>> {
    walk_disjunction(expr, |leaf| target_service(leaf, constants))
}

/// Extracts every host name from `host.name == H [|| ...]`.
pub fn target_hosts<'a>(
    expr: &'a Expr,
    constants: Option<&'a ConstantTable>,
) -> Option<Vec<&'a str>> {
    walk_disjunction(expr, |leaf| target_host(leaf, constants))
}
