//! Server side expressions used in DEFAULT, ALIAS and MATERIALIZED clauses.

use crate::value::Value;

/**
An opaque server side expression.

The field layer does not understand expressions; it only embeds their SQL
text into the DDL it renders. Building expressions is the query layer's job.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr(String);

impl Expr {
    /// Wraps an already rendered SQL snippet, e.g. `now()`.
    pub fn raw(sql: impl Into<String>) -> Self {
        Expr(sql.into())
    }

    /// References a column by name.
    pub fn column(name: impl Into<String>) -> Self {
        Expr(name.into())
    }

    /// The SQL text of this expression.
    pub fn to_sql(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/**
A column default: either a literal rendered through the field's wire encoding
or a server computed expression rendered via its own SQL text.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefaultValue {
    /// A literal, encoded by the owning field when the DDL is rendered
    Literal(Value),
    /// A server side expression, embedded verbatim
    Expr(Expr),
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Literal(value)
    }
}

impl From<Expr> for DefaultValue {
    fn from(expr: Expr) -> Self {
        DefaultValue::Expr(expr)
    }
}
