//! Query builder: clause accumulation and N1QL rendering.
//!
//! [`QueryBuilder`] records every primitive operation (`select`, `from`,
//! `limit`, `skip`, `sort`, comparisons, `raw_where`) as one entry in an
//! ordered clause log. [`QueryBuilder::build`] is a pure fold over that log:
//! it re-groups entries by clause type, assigns `$n` placeholders in first-use
//! order, and renders the final statement. Building twice on an unchanged
//! builder returns identical results.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::directive::{Comparator, DirectiveNode, LogicalOp, ShapeKind, SortOrder};
use crate::error::{QueryError, QueryResult};
use crate::interpret::interpret;
use crate::params::ParamList;

/// A rendered statement and its bound parameter values.
///
/// `values[i - 1]` is the value for placeholder `$i`; the statement contains
/// exactly one placeholder per value, in ascending first-use order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuiltQuery {
    pub query: String,
    pub values: Vec<Value>,
}

/// Condition tree rendered inside a WHERE section.
#[derive(Clone, Debug, PartialEq)]
enum Cond {
    Compare {
        field: String,
        op: Comparator,
        value: Value,
    },
    Group {
        op: LogicalOp,
        children: Vec<Cond>,
    },
}

impl Cond {
    fn from_node(node: DirectiveNode) -> QueryResult<Self> {
        match node {
            DirectiveNode::Comparison { field, op, value } => {
                Ok(Cond::Compare { field, op, value })
            }
            DirectiveNode::Logical { op, children } => Cond::from_group(op, children),
            DirectiveNode::Shape { kind, .. } => {
                Err(QueryError::DirectivePlacement(kind.as_str().to_string()))
            }
        }
    }

    fn from_group(op: LogicalOp, children: Vec<DirectiveNode>) -> QueryResult<Self> {
        let children = children
            .into_iter()
            .map(Cond::from_node)
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(Cond::Group { op, children })
    }

    fn is_empty(&self) -> bool {
        match self {
            Cond::Compare { .. } => false,
            Cond::Group { children, .. } => children.iter().all(Cond::is_empty),
        }
    }

    /// Render this condition, pushing bound values onto `params`.
    ///
    /// Groups render as parenthesized sub-expressions joined by their
    /// operator's word; `null` comparison values render the literal `NULL`
    /// and consume no parameter slot.
    fn render(&self, params: &mut ParamList) -> String {
        match self {
            Cond::Compare { field, op, value } => {
                if value.is_null() {
                    format!("{field} {} NULL", op.as_sql())
                } else {
                    let idx = params.push(value.clone());
                    format!("{field} {} ${idx}", op.as_sql())
                }
            }
            Cond::Group { op, children } => {
                let parts: Vec<String> = children
                    .iter()
                    .filter(|child| !child.is_empty())
                    .map(|child| child.render(params))
                    .collect();
                format!("({})", parts.join(&format!(" {} ", op.join_word())))
            }
        }
    }
}

/// One primitive operation recorded on the builder.
#[derive(Clone, Debug)]
enum Clause {
    Select(Vec<String>),
    From(String),
    Where(Cond),
    RawWhere(String),
    Sort {
        fields: Vec<String>,
        order: SortOrder,
    },
    Limit(Value),
    Skip(Value),
}

/// Directive-driven N1QL query builder.
///
/// # Example
/// ```ignore
/// use n1ql_builder::QueryBuilder;
/// use serde_json::json;
///
/// let built = QueryBuilder::new("travel")
///     .interpret(&json!({ "country": { "$in": ["FR", "DE"] }, "$limit": 20 }))?;
/// assert_eq!(built.query, "SELECT * FROM `travel` WHERE country IN $1 LIMIT 20");
/// # Ok::<(), n1ql_builder::QueryError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct QueryBuilder {
    bucket: Option<String>,
    clauses: Vec<Clause>,
}

impl QueryBuilder {
    /// Create a builder bound to a bucket. `from()` can override the binding.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            clauses: Vec::new(),
        }
    }

    /// Create a builder with no bucket bound; no FROM section is emitted.
    pub fn unbound() -> Self {
        Self::default()
    }

    // ==================== Primitive operations ====================

    /// Record a projection clause. An empty field list renders as `*`.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clauses
            .push(Clause::Select(fields.into_iter().map(Into::into).collect()));
        self
    }

    /// Override the bucket bound at construction.
    pub fn from(mut self, bucket: impl Into<String>) -> Self {
        self.clauses.push(Clause::From(bucket.into()));
        self
    }

    /// Record a LIMIT clause. Numeric validation happens at `build()`.
    pub fn limit(mut self, n: impl Into<Value>) -> QueryResult<Self> {
        let n = n.into();
        if n.is_null() {
            return Err(QueryError::invalid_argument("limit requires a value"));
        }
        self.clauses.push(Clause::Limit(n));
        Ok(self)
    }

    /// Record an OFFSET clause. Numeric validation happens at `build()`.
    pub fn skip(mut self, n: impl Into<Value>) -> QueryResult<Self> {
        let n = n.into();
        if n.is_null() {
            return Err(QueryError::invalid_argument("skip requires a value"));
        }
        self.clauses.push(Clause::Skip(n));
        Ok(self)
    }

    /// Record a sort group. `order` defaults to ascending; the token is
    /// parsed case-insensitively.
    ///
    /// Sort fields are bound as parameter values at render time, unlike
    /// SELECT and WHERE field names, which are interpolated directly.
    pub fn sort<I, S>(mut self, fields: I, order: Option<&str>) -> QueryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(QueryError::invalid_argument(
                "sort requires at least one field",
            ));
        }
        let order = match order {
            Some(token) => SortOrder::parse(token)?,
            None => SortOrder::Asc,
        };
        self.clauses.push(Clause::Sort { fields, order });
        Ok(self)
    }

    /// Record a comparison clause with a named operator.
    ///
    /// The operator may carry a `$` prefix (`"$lt"` and `"lt"` are
    /// equivalent); names outside the comparison set fail with
    /// [`QueryError::UnsupportedOperator`].
    pub fn where_op(
        self,
        field: impl Into<String>,
        op: &str,
        value: impl Into<Value>,
    ) -> QueryResult<Self> {
        let name = op.strip_prefix('$').unwrap_or(op);
        let Some(op) = Comparator::parse(name) else {
            return Err(QueryError::UnsupportedOperator(name.to_string()));
        };
        Ok(self.compare(field, op, value))
    }

    /// Record a pre-rendered boolean expression verbatim.
    ///
    /// The text is not parameterized internally; any placeholders it carries
    /// must already reference the shared parameter list.
    pub fn raw_where(mut self, expr: impl Into<String>) -> Self {
        self.clauses.push(Clause::RawWhere(expr.into()));
        self
    }

    // ==================== Comparison sugar ====================

    /// Add WHERE: field = value
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(field, Comparator::Eq, value)
    }

    /// Add WHERE: field != value
    pub fn ne(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(field, Comparator::Ne, value)
    }

    /// Add WHERE: field < value
    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(field, Comparator::Lt, value)
    }

    /// Add WHERE: field <= value
    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(field, Comparator::Lte, value)
    }

    /// Add WHERE: field > value
    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(field, Comparator::Gt, value)
    }

    /// Add WHERE: field >= value
    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(field, Comparator::Gte, value)
    }

    /// Add WHERE: field IN value. The whole list binds as one parameter.
    pub fn in_list(self, field: impl Into<String>, values: impl Into<Value>) -> Self {
        self.compare(field, Comparator::In, values)
    }

    /// Add WHERE: field NOT IN value. The whole list binds as one parameter.
    pub fn not_in(self, field: impl Into<String>, values: impl Into<Value>) -> Self {
        self.compare(field, Comparator::Nin, values)
    }

    fn compare(mut self, field: impl Into<String>, op: Comparator, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause::Where(Cond::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }));
        self
    }

    fn push_cond(mut self, cond: Cond) -> Self {
        self.clauses.push(Clause::Where(cond));
        self
    }

    // ==================== Directive replay ====================

    /// Interpret a raw query object, replay every directive onto the
    /// primitive operations, and render the result.
    pub fn interpret(mut self, query: &Value) -> QueryResult<BuiltQuery> {
        for node in interpret(query)? {
            self = self.apply(node)?;
        }
        self.build()
    }

    fn apply(self, node: DirectiveNode) -> QueryResult<Self> {
        match node {
            DirectiveNode::Comparison { field, op, value } => Ok(self.compare(field, op, value)),
            DirectiveNode::Logical { op, children } => {
                let cond = Cond::from_group(op, children)?;
                if cond.is_empty() {
                    return Ok(self);
                }
                Ok(self.push_cond(cond))
            }
            DirectiveNode::Shape { kind, value } => self.apply_shape(kind, value),
        }
    }

    fn apply_shape(self, kind: ShapeKind, value: Value) -> QueryResult<Self> {
        match kind {
            ShapeKind::Select => {
                let fields = string_list(&value, "$select")?;
                Ok(self.select(fields))
            }
            ShapeKind::Limit => self.limit(value),
            ShapeKind::Skip => self.skip(value),
            ShapeKind::Sort => self.apply_sort(value),
        }
    }

    /// `$sort` accepts a field name, an array of field names (ascending), or
    /// an object mapping each field to a direction token, one sort group per
    /// entry in insertion order.
    fn apply_sort(mut self, value: Value) -> QueryResult<Self> {
        match value {
            Value::String(field) => self.sort([field], None),
            Value::Array(_) => {
                let fields = string_list(&value, "$sort")?;
                self.sort(fields, None)
            }
            Value::Object(entries) => {
                for (field, direction) in entries {
                    let Some(token) = direction.as_str() else {
                        return Err(QueryError::invalid_argument(
                            "$sort directions must be strings",
                        ));
                    };
                    self = self.sort([field], Some(token))?;
                }
                Ok(self)
            }
            _ => Err(QueryError::invalid_argument(
                "$sort expects a string, array, or object",
            )),
        }
    }

    // ==================== Rendering ====================

    /// Render the accumulated clause log into a statement and its values.
    ///
    /// Sections are emitted in fixed order: SELECT, FROM, structured WHERE,
    /// raw WHERE, ORDER BY, LIMIT, OFFSET. The raw WHERE is a second,
    /// independent segment, not merged into the structured one; that matches
    /// the reference behavior and is documented rather than corrected.
    pub fn build(&self) -> QueryResult<BuiltQuery> {
        let mut params = ParamList::new();

        let mut columns: Vec<&str> = Vec::new();
        let mut bucket = self.bucket.as_deref();
        let mut conds: Vec<&Cond> = Vec::new();
        let mut raws: Vec<&str> = Vec::new();
        let mut sorts: Vec<(&[String], SortOrder)> = Vec::new();
        let mut limit: Option<&Value> = None;
        let mut skip: Option<&Value> = None;

        for clause in &self.clauses {
            match clause {
                Clause::Select(fields) => columns.extend(fields.iter().map(String::as_str)),
                Clause::From(name) => bucket = Some(name),
                Clause::Where(cond) => conds.push(cond),
                Clause::RawWhere(expr) => raws.push(expr),
                Clause::Sort { fields, order } => sorts.push((fields.as_slice(), *order)),
                Clause::Limit(n) => limit = Some(n),
                Clause::Skip(n) => skip = Some(n),
            }
        }

        let mut query = String::from("SELECT ");
        if columns.is_empty() {
            query.push('*');
        } else {
            let rendered: Vec<String> = columns
                .iter()
                .map(|col| render_column(col, bucket))
                .collect();
            query.push_str(&rendered.join(", "));
        }

        if let Some(bucket) = bucket {
            query.push_str(&format!(" FROM `{bucket}`"));
        }

        let rendered: Vec<String> = conds
            .iter()
            .filter(|cond| !cond.is_empty())
            .map(|cond| cond.render(&mut params))
            .collect();
        if !rendered.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&rendered.join(" AND "));
        }

        if !raws.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&raws.join(" AND "));
        }

        if !sorts.is_empty() {
            let mut groups = Vec::new();
            for (fields, order) in &sorts {
                for field in *fields {
                    let idx = params.push(Value::String(field.clone()));
                    groups.push(format!("${idx} {}", order.as_sql()));
                }
            }
            query.push_str(" ORDER BY ");
            query.push_str(&groups.join(", "));
        }

        if let Some(n) = limit {
            query.push_str(&format!(" LIMIT {}", int_arg(n, "limit")?));
        }
        if let Some(n) = skip {
            query.push_str(&format!(" OFFSET {}", int_arg(n, "skip")?));
        }

        debug!(statement = %query, params = params.len(), "built query");

        Ok(BuiltQuery {
            query,
            values: params.into_values(),
        })
    }
}

fn render_column(col: &str, bucket: Option<&str>) -> String {
    if col == "*" {
        return col.to_string();
    }
    match bucket {
        Some(bucket) => format!("`{bucket}`.`{col}`"),
        None => format!("`{col}`"),
    }
}

/// Coerce a limit/skip argument to an integer, truncating fractions.
fn int_arg(value: &Value, what: &str) -> QueryResult<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n.trunc() as i64),
        _ => Err(QueryError::invalid_argument(format!(
            "{what} must be numeric, got {value}"
        ))),
    }
}

fn string_list(value: &Value, what: &str) -> QueryResult<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    QueryError::invalid_argument(format!("{what} entries must be strings"))
                })
            })
            .collect(),
        _ => Err(QueryError::invalid_argument(format!(
            "{what} expects a string or array of strings"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_projection_is_star() {
        let built = QueryBuilder::new("b").build().unwrap();
        assert_eq!(built.query, "SELECT * FROM `b`");
        assert!(built.values.is_empty());
    }

    #[test]
    fn unbound_builder_omits_from() {
        let built = QueryBuilder::unbound().eq("a", 1).build().unwrap();
        assert_eq!(built.query, "SELECT * WHERE a = $1");
    }

    #[test]
    fn explicit_columns_are_bucket_qualified() {
        let built = QueryBuilder::new("b").select(["name", "age"]).build().unwrap();
        assert_eq!(built.query, "SELECT `b`.`name`, `b`.`age` FROM `b`");

        let built = QueryBuilder::unbound().select(["name"]).build().unwrap();
        assert_eq!(built.query, "SELECT `name`");
    }

    #[test]
    fn empty_select_renders_star() {
        let built = QueryBuilder::new("b").select(Vec::<String>::new()).build().unwrap();
        assert_eq!(built.query, "SELECT * FROM `b`");
    }

    #[test]
    fn from_overrides_bound_bucket() {
        let built = QueryBuilder::new("b").from("other").build().unwrap();
        assert_eq!(built.query, "SELECT * FROM `other`");
    }

    #[test]
    fn comparisons_join_with_and() {
        let built = QueryBuilder::new("b")
            .eq("status", "active")
            .gt("age", 18)
            .build()
            .unwrap();
        assert_eq!(
            built.query,
            "SELECT * FROM `b` WHERE status = $1 AND age > $2"
        );
        assert_eq!(built.values, vec![json!("active"), json!(18)]);
    }

    #[test]
    fn null_value_renders_literal_null() {
        let built = QueryBuilder::new("b").eq("gone", Value::Null).build().unwrap();
        assert_eq!(built.query, "SELECT * FROM `b` WHERE gone = NULL");
        assert!(built.values.is_empty());
    }

    #[test]
    fn in_list_binds_one_parameter() {
        let built = QueryBuilder::new("b")
            .in_list("id", vec![1, 2, 3])
            .not_in("tag", vec!["x"])
            .build()
            .unwrap();
        assert_eq!(
            built.query,
            "SELECT * FROM `b` WHERE id IN $1 AND tag NOT IN $2"
        );
        assert_eq!(built.values, vec![json!([1, 2, 3]), json!(["x"])]);
    }

    #[test]
    fn where_op_accepts_prefixed_names() {
        let built = QueryBuilder::new("b")
            .where_op("a", "$lte", 5)
            .unwrap()
            .where_op("b", "ne", 6)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(built.query, "SELECT * FROM `b` WHERE a <= $1 AND b != $2");
    }

    #[test]
    fn where_op_rejects_unknown_operators() {
        let err = QueryBuilder::new("b").where_op("a", "like", "%x%").unwrap_err();
        match err {
            QueryError::UnsupportedOperator(op) => assert_eq!(op, "like"),
            other => panic!("expected unsupported operator, got {other:?}"),
        }
    }

    #[test]
    fn raw_where_is_a_second_segment() {
        let built = QueryBuilder::new("b")
            .eq("a", 1)
            .raw_where("meta().id LIKE 'user::%'")
            .build()
            .unwrap();
        assert_eq!(
            built.query,
            "SELECT * FROM `b` WHERE a = $1 WHERE meta().id LIKE 'user::%'"
        );
    }

    #[test]
    fn sort_fields_are_bound_as_values() {
        let built = QueryBuilder::new("b").sort(["name"], None).unwrap().build().unwrap();
        assert_eq!(built.query, "SELECT * FROM `b` ORDER BY $1 ASC");
        assert_eq!(built.values, vec![json!("name")]);
    }

    #[test]
    fn sort_order_token_is_case_insensitive() {
        let built = QueryBuilder::new("b")
            .sort(["a", "c"], Some("desc"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(built.query, "SELECT * FROM `b` ORDER BY $1 DESC, $2 DESC");

        let err = QueryBuilder::new("b").sort(["a"], Some("sideways")).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn sort_requires_fields() {
        let err = QueryBuilder::new("b").sort(Vec::<String>::new(), None).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn limit_and_skip_reject_null() {
        assert!(QueryBuilder::new("b").limit(Value::Null).unwrap_err().is_invalid_argument());
        assert!(QueryBuilder::new("b").skip(Value::Null).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn non_numeric_limit_fails_at_build() {
        let qb = QueryBuilder::new("b").limit("abc").unwrap();
        assert!(qb.build().unwrap_err().is_invalid_argument());

        let qb = QueryBuilder::new("b").skip(json!(true)).unwrap();
        assert!(qb.build().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn numeric_strings_and_fractions_truncate() {
        let built = QueryBuilder::new("b")
            .limit("10")
            .unwrap()
            .skip(2.9)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(built.query, "SELECT * FROM `b` LIMIT 10 OFFSET 2");
    }

    #[test]
    fn last_limit_and_skip_win() {
        let built = QueryBuilder::new("b")
            .limit(5)
            .unwrap()
            .limit(7)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(built.query, "SELECT * FROM `b` LIMIT 7");
    }

    #[test]
    fn build_is_idempotent() {
        let qb = QueryBuilder::new("b")
            .eq("a", 1)
            .sort(["name"], None)
            .unwrap();
        let first = qb.build().unwrap();
        let second = qb.build().unwrap();
        assert_eq!(first, second);
    }
}
