//! Typed directive nodes for dynamic queries.
//!
//! This module provides the closed enumerations the interpreter classifies
//! query keys into ([`Comparator`], [`LogicalOp`], [`ShapeKind`]) and the
//! [`DirectiveNode`] tree built from a raw query object. Keys are decided
//! once at parse time; unknown keys surface as an explicit error instead of
//! falling through at render time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QueryError, QueryResult};

/// Comparison operator for a single condition.
///
/// # Example
/// ```ignore
/// use n1ql_builder::Comparator;
///
/// assert_eq!(Comparator::parse("lt"), Some(Comparator::Lt));
/// assert_eq!(Comparator::Lt.as_sql(), "<");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    /// Equal: field = value
    Eq,
    /// Not equal: field != value
    Ne,
    /// Less than: field < value
    Lt,
    /// Less than or equal: field <= value
    Lte,
    /// Greater than: field > value
    Gt,
    /// Greater than or equal: field >= value
    Gte,
    /// Membership: field IN value
    In,
    /// Negated membership: field NOT IN value
    Nin,
}

impl Comparator {
    /// Parse an operator name (without its `$` prefix).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "in" => Some(Self::In),
            "nin" => Some(Self::Nin),
            _ => None,
        }
    }

    /// The operator name as it appears in directive keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::In => "in",
            Self::Nin => "nin",
        }
    }

    /// The N1QL symbol for this operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::In => "IN",
            Self::Nin => "NOT IN",
        }
    }
}

/// Join operator for a logical group of conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    /// All child conditions must hold.
    And,
    /// At least one child condition must hold.
    Or,
}

impl LogicalOp {
    /// Parse a group name (without its `$` prefix).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }

    /// The group name as it appears in directive keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    /// The N1QL join word for this group.
    pub fn join_word(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Root-level result-shaping directive kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Projection: which columns to return.
    Select,
    /// Row count cap.
    Limit,
    /// Row offset.
    Skip,
    /// Sort group.
    Sort,
}

impl ShapeKind {
    /// Parse a shaping key (without its `$` prefix).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "select" => Some(Self::Select),
            "limit" => Some(Self::Limit),
            "skip" => Some(Self::Skip),
            "sort" => Some(Self::Sort),
            _ => None,
        }
    }

    /// The shaping key as it appears in directive keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Limit => "limit",
            Self::Skip => "skip",
            Self::Sort => "sort",
        }
    }
}

/// Sort direction for an ORDER BY group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a direction token, case-insensitively.
    pub fn parse(token: &str) -> QueryResult<Self> {
        match token.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(QueryError::invalid_argument(format!(
                "invalid sort order: {other}"
            ))),
        }
    }

    /// The rendered direction keyword.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One piece of query intent produced by the interpreter.
///
/// Built once from the raw query object and walked once by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DirectiveNode {
    /// A single comparison on a (possibly dotted) field.
    Comparison {
        field: String,
        op: Comparator,
        value: Value,
    },

    /// An AND/OR group of further directives.
    Logical {
        op: LogicalOp,
        children: Vec<DirectiveNode>,
    },

    /// A root-level shaping directive; carries no field.
    Shape { kind: ShapeKind, value: Value },
}
