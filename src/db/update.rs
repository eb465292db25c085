//! Parameterized statement construction for record writes.
//!
//! DESIGN
//! ======
//! Every record kind describes itself once as a [`Table`]: table name, key
//! column, and an ordered list of [`Field`]s (wire name, column, SQL type).
//! Request bodies arrive as loose JSON maps; [`coerce`] turns each present
//! value into a typed [`SqlValue`] so nothing untyped reaches a parameter.
//!
//! [`PartialUpdate`] collects only the fields that carry a value and renders
//! `UPDATE <table> SET a = $1, b = $2 WHERE <key> = $3` with a
//! `QueryBuilder`. Column names come from the static table description;
//! every value, including the key, is pushed as a bind.

use serde_json::{Map, Value};
use sqlx::postgres::{PgArguments, PgPool};
use sqlx::query::Query;
use sqlx::{Postgres, QueryBuilder};
use time::Date;
use time::macros::format_description;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Int,
    Text,
    Date,
}

impl SqlType {
    fn expected(self) -> &'static str {
        match self {
            Self::Int => "an integer",
            Self::Text => "a string",
            Self::Date => "a date (YYYY-MM-DD)",
        }
    }
}

/// A coerced, bind-ready value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i32),
    Text(String),
    Date(Date),
}

/// One writable column of a record kind.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// JSON name on the wire.
    pub name: &'static str,
    /// Other accepted JSON spellings.
    pub aliases: &'static [&'static str],
    pub column: &'static str,
    pub ty: SqlType,
}

impl Field {
    /// Look the field up in a request body under its name or any alias.
    #[must_use]
    pub fn lookup<'a>(&self, body: &'a Map<String, Value>) -> Option<&'a Value> {
        std::iter::once(self.name)
            .chain(self.aliases.iter().copied())
            .find_map(|key| body.get(key))
    }
}

/// Static description of a record kind.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub key_column: &'static str,
    pub fields: &'static [Field],
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("No fields to update")]
    NoFieldsToUpdate,
    #[error("Missing required fields")]
    MissingRequiredFields,
    #[error("invalid value for {field}: expected {expected}")]
    InvalidValue { field: &'static str, expected: &'static str },
}

// =============================================================================
// COERCION
// =============================================================================

/// Coerce a JSON value to the field's SQL type. `null` means "not supplied".
///
/// # Errors
///
/// Returns [`BuildError::InvalidValue`] when the value cannot represent the
/// field's type (e.g. non-numeric text for an integer column).
pub fn coerce(field: &Field, value: &Value) -> Result<Option<SqlValue>, BuildError> {
    let invalid = || BuildError::InvalidValue { field: field.name, expected: field.ty.expected() };
    let coerced = match (field.ty, value) {
        (_, Value::Null) => return Ok(None),
        (SqlType::Int, Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(SqlValue::Int)
            .ok_or_else(invalid)?,
        (SqlType::Int, Value::String(s)) => s.trim().parse::<i32>().map(SqlValue::Int).map_err(|_| invalid())?,
        (SqlType::Text, Value::String(s)) => SqlValue::Text(s.clone()),
        (SqlType::Text, Value::Number(n)) => SqlValue::Text(n.to_string()),
        (SqlType::Date, Value::String(s)) => parse_date(s).map(SqlValue::Date).ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };
    Ok(Some(coerced))
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part (`T...`).
pub(crate) fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    let day = match raw.char_indices().nth(10) {
        Some((idx, 'T' | ' ')) => &raw[..idx],
        Some(_) => return None,
        None => raw,
    };
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

/// Coerce a mandatory field. Absent, `null`, and blank strings all count as
/// missing.
///
/// # Errors
///
/// [`BuildError::MissingRequiredFields`] or [`BuildError::InvalidValue`].
pub fn required(field: &Field, body: &Map<String, Value>) -> Result<SqlValue, BuildError> {
    let value = field.lookup(body).ok_or(BuildError::MissingRequiredFields)?;
    if value.as_str().is_some_and(|s| s.trim().is_empty()) {
        return Err(BuildError::MissingRequiredFields);
    }
    coerce(field, value)?.ok_or(BuildError::MissingRequiredFields)
}

/// Coerce an optional field. Absent and `null` yield `None`.
///
/// # Errors
///
/// [`BuildError::InvalidValue`] for a present value of the wrong type.
pub fn optional(field: &Field, body: &Map<String, Value>) -> Result<Option<SqlValue>, BuildError> {
    match field.lookup(body) {
        Some(value) => coerce(field, value),
        None => Ok(None),
    }
}

// =============================================================================
// PARTIAL UPDATE
// =============================================================================

/// A rendered statement plus its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
}

/// Builder for `UPDATE ... SET <supplied fields> WHERE <key> = $n`.
#[derive(Debug)]
pub struct PartialUpdate {
    table: &'static str,
    key_column: &'static str,
    sets: Vec<(&'static str, SqlValue)>,
}

impl PartialUpdate {
    #[must_use]
    pub fn new(table: &'static str, key_column: &'static str) -> Self {
        Self { table, key_column, sets: Vec::new() }
    }

    /// Include `column` only when a value was supplied.
    pub fn set(&mut self, column: &'static str, value: Option<SqlValue>) -> &mut Self {
        if let Some(value) = value {
            self.sets.push((column, value));
        }
        self
    }

    /// Render the statement for row `id`.
    ///
    /// # Errors
    ///
    /// [`BuildError::NoFieldsToUpdate`] if no field carried a value.
    pub fn build(self, id: i32) -> Result<Statement, BuildError> {
        if self.sets.is_empty() {
            return Err(BuildError::NoFieldsToUpdate);
        }

        let mut builder = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", self.table));
        {
            let mut assignments = builder.separated(", ");
            for (column, value) in &self.sets {
                assignments.push(column);
                assignments.push_unseparated(" = ");
                match value {
                    SqlValue::Int(v) => assignments.push_bind_unseparated(*v),
                    SqlValue::Text(v) => assignments.push_bind_unseparated(v.clone()),
                    SqlValue::Date(v) => assignments.push_bind_unseparated(*v),
                };
            }
        }
        builder.push(format!(" WHERE {} = ", self.key_column));
        builder.push_bind(id);

        let sql = builder.sql().to_owned();
        let mut params: Vec<SqlValue> = self.sets.into_iter().map(|(_, value)| value).collect();
        params.push(SqlValue::Int(id));
        Ok(Statement { sql, params })
    }
}

/// Build a partial update for `table` from a JSON request body. Fields are
/// taken in table order; unknown keys are ignored.
///
/// # Errors
///
/// Any coercion error, or [`BuildError::NoFieldsToUpdate`].
pub fn build_update(table: &Table, id: i32, body: &Map<String, Value>) -> Result<Statement, BuildError> {
    let mut update = PartialUpdate::new(table.name, table.key_column);
    for field in table.fields {
        update.set(field.column, optional(field, body)?);
    }
    update.build(id)
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Bind parameters in placeholder order.
pub fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
            SqlValue::Date(v) => query.bind(*v),
        };
    }
    query
}

impl Statement {
    /// `DELETE FROM <table> WHERE <key> = $1`.
    #[must_use]
    pub fn delete(table: &Table, id: i32) -> Self {
        Self {
            sql: format!("DELETE FROM {} WHERE {} = $1", table.name, table.key_column),
            params: vec![SqlValue::Int(id)],
        }
    }

    /// Run the statement as a single autonomous write.
    ///
    /// # Errors
    ///
    /// Returns the database error if execution fails.
    pub async fn execute(&self, pool: &PgPool) -> Result<UpdateOutcome, sqlx::Error> {
        let result = bind_params(sqlx::query(&self.sql), &self.params)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 { Ok(UpdateOutcome::NotFound) } else { Ok(UpdateOutcome::Updated) }
    }
}

#[cfg(test)]
#[path = "update_test.rs"]
mod tests;
