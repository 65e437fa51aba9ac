//! Directive interpreter: raw query objects to typed directive nodes.
//!
//! [`interpret`] walks an arbitrarily nested query object and classifies every
//! key into a [`DirectiveNode`], preserving logical grouping. Keys are visited
//! in insertion order (`serde_json` is built with `preserve_order`), which
//! fixes the order in which parameter placeholders are later assigned.

use serde_json::{Map, Value};

use crate::directive::{Comparator, DirectiveNode, LogicalOp, ShapeKind};
use crate::error::{QueryError, QueryResult};

/// Interpret a raw query object into an ordered directive sequence.
///
/// - `$select` / `$limit` / `$skip` / `$sort` become shaping nodes.
/// - `$and` / `$or` take an array and become a logical group node.
/// - A plain field with an object value is expanded key by key, threading the
///   field name through dotted composition (`sub` + `one` => `sub.one`).
/// - A plain field with a literal value becomes an implicit equality.
/// - A bare comparison key (`$lt` with no enclosing field) fails with
///   [`QueryError::DirectivePlacement`]; any other unrecognized `$` key fails
///   with [`QueryError::UnknownDirective`].
pub fn interpret(query: &Value) -> QueryResult<Vec<DirectiveNode>> {
    let map = as_object(query)?;
    let mut nodes = Vec::with_capacity(map.len());
    for (key, value) in map {
        nodes.extend(interpret_key(key, value)?);
    }
    Ok(nodes)
}

fn as_object(query: &Value) -> QueryResult<&Map<String, Value>> {
    query
        .as_object()
        .ok_or_else(|| QueryError::invalid_argument("query must be an object"))
}

fn interpret_key(key: &str, value: &Value) -> QueryResult<Vec<DirectiveNode>> {
    if let Some(name) = key.strip_prefix('$') {
        if let Some(kind) = ShapeKind::parse(name) {
            return Ok(vec![DirectiveNode::Shape {
                kind,
                value: value.clone(),
            }]);
        }
        if let Some(op) = LogicalOp::parse(name) {
            return Ok(vec![interpret_group(op, value)?]);
        }
        if Comparator::parse(name).is_some() {
            // A comparison with no field to attach to.
            return Err(QueryError::DirectivePlacement(name.to_string()));
        }
        return Err(QueryError::unknown_directive(key));
    }

    match value {
        Value::Object(entries) => interpret_field(key, entries),
        literal => Ok(vec![DirectiveNode::Comparison {
            field: key.to_string(),
            op: Comparator::Eq,
            value: literal.clone(),
        }]),
    }
}

/// Expand a nested field object.
///
/// Each sub-key is either a comparison operator on `field`, a further-nested
/// field (dotted composition, recursive), or a literal (implicit equality on
/// the dotted field). A field object mixing a literal sub-key with a directive
/// sub-key emits both conditions independently; the enclosing group joins
/// them. That compound can be nonsensical and is carried over as-is from the
/// reference behavior.
fn interpret_field(field: &str, entries: &Map<String, Value>) -> QueryResult<Vec<DirectiveNode>> {
    let mut nodes = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        if let Some(name) = key.strip_prefix('$') {
            let Some(op) = Comparator::parse(name) else {
                return Err(QueryError::unknown_directive(key.clone()));
            };
            nodes.push(DirectiveNode::Comparison {
                field: field.to_string(),
                op,
                value: value.clone(),
            });
            continue;
        }

        let dotted = format!("{field}.{key}");
        match value {
            Value::Object(nested) => nodes.extend(interpret_field(&dotted, nested)?),
            literal => nodes.push(DirectiveNode::Comparison {
                field: dotted,
                op: Comparator::Eq,
                value: literal.clone(),
            }),
        }
    }
    Ok(nodes)
}

/// Interpret an `$and`/`$or` group.
///
/// Each array element is interpreted recursively; a bare nested array denotes
/// a sub-group without an explicit operator and is treated as an implicit AND
/// bundle of its members.
fn interpret_group(op: LogicalOp, value: &Value) -> QueryResult<DirectiveNode> {
    let Some(elements) = value.as_array() else {
        return Err(QueryError::invalid_argument(format!(
            "${} expects an array",
            op.as_str()
        )));
    };

    let mut children = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Value::Object(_) => children.extend(interpret(element)?),
            Value::Array(_) => children.push(interpret_group(LogicalOp::And, element)?),
            _ => {
                return Err(QueryError::invalid_argument(format!(
                    "${} elements must be objects or arrays",
                    op.as_str()
                )));
            }
        }
    }
    Ok(DirectiveNode::Logical { op, children })
}
