//! # pgcompose
//!
//! Composable SQL fragments for Postgres.
//!
//! ## Features
//!
//! - **Fragments compose**: every piece renders to SQL text with generic `?`
//!   marks plus an ordered argument list, and any fragment can be spliced
//!   into another
//! - **Predicates from maps**: `Predicate::eq` turns column/value pairs into
//!   `=`, `IS NULL` or `IN (...)` depending on the value
//! - **Literal encoding**: Postgres array literals (`{1,2}`, `{"a","b"}`) and
//!   JSON / JSONB parameters
//! - **Placeholder formats**: `?`, `$n`, `:n`, `@pn`, applied once to the final
//!   statement
//! - **Driver-ready args**: `Value` implements `tokio_postgres` `ToSql`
//!
//! ## Statement builders
//!
//! ```ignore
//! use pgcompose::{args, Predicate, PlaceholderFormat, StatementBuilder};
//!
//! let psql = StatementBuilder::new().placeholder_format(PlaceholderFormat::DOLLAR);
//!
//! // SELECT
//! let q = psql
//!     .select(["id", "name"])
//!     .from(["users"])
//!     .filter(Predicate::eq([("status", "active")]))
//!     .order_by(["created_at DESC"])
//!     .limit(10)
//!     .to_sql()?;
//!
//! // INSERT
//! let q = psql
//!     .insert("users")
//!     .columns(["username", "email"])
//!     .values(args!["alice", "alice@example.com"])
//!     .to_sql()?;
//!
//! // UPDATE
//! let q = psql.update("users").set("status", "inactive").eq("id", 7i64).to_sql()?;
//!
//! // DELETE
//! let q = psql.delete(["users"]).eq("id", 7i64).to_sql()?;
//!
//! let rows = client.query(&q.sql, &q.params_ref()).await?;
//! ```
//!
//! ## Fragments
//!
//! ```ignore
//! use pgcompose::{args, And, Any, Expr, Operand, Predicate};
//!
//! let cond = And::new([
//!     Predicate::eq([("id", Operand::from(vec![1, 2, 3]))]),
//!     Predicate::eq([("active", true)]),
//! ]);
//! let sql = Expr::new("SELECT * FROM t WHERE ?", args![cond]);
//! // SELECT * FROM t WHERE (id IN (?,?,?) AND active = ?)
//! ```

pub mod error;
pub mod expr;
pub mod fragment;
pub mod literal;
pub mod logic;
pub mod placeholder;
pub mod predicate;
pub mod stmt;
pub mod value;

pub use error::{SqlError, SqlResult};
pub use expr::{Alias, Between, Expr, Lateral};
pub use fragment::{Arg, Fragment, FragmentRef, Rendered};
pub use literal::{Any, Array, ArrayElement, Json, JsonType, Leaf, Shape};
pub use logic::{And, Concat, Func, Or, Segment};
pub use placeholder::{PlaceholderFormat, count_placeholders, placeholders};
pub use predicate::{Comparison, ListElement, Operand, Predicate};
pub use stmt::{Delete, Insert, Select, StatementBuilder, Update};
pub use value::{ToValue, Value};

/// Start a SELECT with `?` placeholders.
pub fn select<I, S>(columns: I) -> Select
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    StatementBuilder::default().select(columns)
}

/// Start an INSERT with `?` placeholders.
pub fn insert(table: impl Into<String>) -> Insert {
    StatementBuilder::default().insert(table)
}

/// Start an UPDATE with `?` placeholders.
pub fn update(table: impl Into<String>) -> Update {
    StatementBuilder::default().update(table)
}

/// Start a DELETE with `?` placeholders.
pub fn delete<I, S>(what: I) -> Delete
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    StatementBuilder::default().delete(what)
}
