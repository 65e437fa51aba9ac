//! # n1ql-builder
//!
//! A directive-driven N1QL query builder for Rust.
//!
//! Translates a generic, nested "directive" query object (a MongoDB-style
//! filter/shape description using keys such as `$lt`, `$in`, `$and`, `$sort`,
//! `$limit`) into a parameterized N1QL statement plus an ordered list of bound
//! values, ready to hand to a database client.
//!
//! ## Features
//!
//! - **Typed directives**: every query key is classified once at parse time
//!   into an explicit [`DirectiveNode`] tree; unknown keys fail loudly
//! - **No string replacement**: `$n` placeholder indices are computed during
//!   the build fold, never patched into the string afterwards
//! - **Pure build**: `build()` folds an append-only clause log, so it can be
//!   called repeatedly and always renders the same statement
//! - **Values only**: only values are parameterized; field and bucket names
//!   are interpolated directly and must be sanitized by the caller
//!
//! ## Usage
//!
//! ```ignore
//! use n1ql_builder::QueryBuilder;
//! use serde_json::json;
//!
//! let built = QueryBuilder::new("travel").interpret(&json!({
//!     "type": "airline",
//!     "country": { "$in": ["FR", "DE"] },
//!     "$sort": { "name": "ASC" },
//!     "$limit": 20,
//! }))?;
//!
//! // built.query:
//! //   SELECT * FROM `travel` WHERE type = $1 AND country IN $2
//! //   ORDER BY $3 ASC LIMIT 20
//! // built.values: ["airline", ["FR", "DE"], "name"]
//! # Ok::<(), n1ql_builder::QueryError>(())
//! ```
//!
//! The primitive operations are also available directly:
//!
//! ```ignore
//! let built = QueryBuilder::new("travel")
//!     .select(["name", "country"])
//!     .gte("stops", 1)
//!     .sort(["name"], Some("DESC"))?
//!     .limit(10)?
//!     .build()?;
//! ```

pub mod builder;
pub mod directive;
pub mod error;
pub mod interpret;
pub mod params;

pub use builder::{BuiltQuery, QueryBuilder};
pub use directive::{Comparator, DirectiveNode, LogicalOp, ShapeKind, SortOrder};
pub use error::{QueryError, QueryResult};
pub use interpret::interpret;
pub use params::ParamList;
