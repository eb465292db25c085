//! Placement records.
//!
//! `Role` is optional on create and stored as an empty string when absent.
//! On update an absent `Role` is simply left out, like any other field.

use serde::Serialize;
use serde_json::{Map, Value};

use super::records::{self, RecordError};
use crate::db::update::{optional, required};
use crate::db::{BuildError, DbPool, Field, SqlType, SqlValue, Statement, Table};

pub const KIND: &str = "Placement";

pub const STUDENT_ID: Field =
    Field { name: "StudentID", aliases: &["studentId", "StudentId"], column: "student_id", ty: SqlType::Int };
pub const COMPANY: Field = Field { name: "Company", aliases: &["company"], column: "company", ty: SqlType::Text };
pub const ROLE: Field = Field { name: "Role", aliases: &["role"], column: "role", ty: SqlType::Text };
pub const PACKAGE: Field = Field { name: "Package", aliases: &["package"], column: "package", ty: SqlType::Text };
pub const PLACEMENT_DATE: Field = Field {
    name: "PlacementDate",
    aliases: &["placementDate", "offerDate"],
    column: "placement_date",
    ty: SqlType::Date,
};

pub const PLACEMENTS: Table = Table {
    name: "placements",
    key_column: "placement_id",
    fields: &[STUDENT_ID, COMPANY, ROLE, PACKAGE, PLACEMENT_DATE],
};

const JOINED_SELECT: &str = "SELECT p.placement_id, p.student_id, s.first_name, s.last_name, \
     p.company, p.role, p.package, p.placement_date::text AS placement_date";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Placement {
    #[serde(rename = "PlacementID")]
    pub placement_id: i32,
    #[serde(rename = "StudentID")]
    pub student_id: Option<i32>,
    #[serde(rename = "FirstName")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Package")]
    pub package: String,
    #[serde(rename = "PlacementDate")]
    pub placement_date: String,
}

/// Render the insert for a create request.
///
/// # Errors
///
/// [`BuildError::MissingRequiredFields`] unless student, company, package
/// and placement date are present; or an invalid value.
pub fn insert_statement(body: &Map<String, Value>) -> Result<Statement, BuildError> {
    let role = optional(&ROLE, body)?.unwrap_or_else(|| SqlValue::Text(String::new()));
    let params = vec![
        required(&STUDENT_ID, body)?,
        required(&COMPANY, body)?,
        role,
        required(&PACKAGE, body)?,
        required(&PLACEMENT_DATE, body)?,
    ];
    let sql = format!(
        "WITH p AS (\
             INSERT INTO placements (student_id, company, role, package, placement_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *\
         ) {JOINED_SELECT} FROM p LEFT JOIN students s ON p.student_id = s.student_id"
    );
    Ok(Statement { sql, params })
}

/// # Errors
///
/// Pool or query failure.
pub async fn list(db: &DbPool) -> Result<Vec<Placement>, RecordError> {
    records::fetch_all(
        db,
        &format!(
            "{JOINED_SELECT} FROM placements p LEFT JOIN students s ON p.student_id = s.student_id \
             ORDER BY p.placement_id"
        ),
    )
    .await
}

/// # Errors
///
/// [`RecordError::NotFound`] if no placement has `id`.
pub async fn get(db: &DbPool, id: i32) -> Result<Placement, RecordError> {
    records::fetch_by_id(
        db,
        &format!(
            "{JOINED_SELECT} FROM placements p LEFT JOIN students s ON p.student_id = s.student_id \
             WHERE p.placement_id = $1"
        ),
        id,
        KIND,
    )
    .await
}

/// # Errors
///
/// Validation failure before any write, or pool/query failure.
pub async fn create(db: &DbPool, body: &Map<String, Value>) -> Result<Placement, RecordError> {
    let stmt = insert_statement(body)?;
    records::insert_returning(db, stmt).await
}

/// # Errors
///
/// `NoFieldsToUpdate`, an invalid value, `NotFound`, or pool/query failure.
pub async fn update(db: &DbPool, id: i32, body: &Map<String, Value>) -> Result<(), RecordError> {
    records::update(db, &PLACEMENTS, id, body, KIND).await
}

/// # Errors
///
/// `NotFound`, or pool/query failure.
pub async fn delete(db: &DbPool, id: i32) -> Result<(), RecordError> {
    records::delete(db, &PLACEMENTS, id, KIND).await
}

#[cfg(test)]
#[path = "placement_test.rs"]
mod tests;
