//! Internship records, listed with the owning student's name.

use serde::Serialize;
use serde_json::{Map, Value};

use super::records::{self, RecordError};
use crate::db::update::required;
use crate::db::{BuildError, DbPool, Field, SqlType, Statement, Table};

pub const KIND: &str = "Internship";

pub const STUDENT_ID: Field =
    Field { name: "StudentID", aliases: &["studentId", "StudentId"], column: "student_id", ty: SqlType::Int };
pub const COMPANY: Field = Field { name: "Company", aliases: &["company"], column: "company", ty: SqlType::Text };
pub const ROLE: Field = Field { name: "Role", aliases: &["role"], column: "role", ty: SqlType::Text };
pub const START_DATE: Field =
    Field { name: "StartDate", aliases: &["startDate"], column: "start_date", ty: SqlType::Date };
pub const END_DATE: Field = Field { name: "EndDate", aliases: &["endDate"], column: "end_date", ty: SqlType::Date };

pub const INTERNSHIPS: Table = Table {
    name: "internships",
    key_column: "internship_id",
    fields: &[STUDENT_ID, COMPANY, ROLE, START_DATE, END_DATE],
};

const JOINED_SELECT: &str = "SELECT i.internship_id, i.student_id, s.first_name, s.last_name, \
     i.company, i.role, i.start_date::text AS start_date, i.end_date::text AS end_date";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Internship {
    #[serde(rename = "InternshipID")]
    pub internship_id: i32,
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
    #[serde(rename = "StartDate")]
    pub start_date: String,
    #[serde(rename = "EndDate")]
    pub end_date: String,
}

/// Render the insert for a create request. Every field is mandatory.
///
/// # Errors
///
/// [`BuildError::MissingRequiredFields`] or an invalid value.
pub fn insert_statement(body: &Map<String, Value>) -> Result<Statement, BuildError> {
    let params = INTERNSHIPS
        .fields
        .iter()
        .map(|field| required(field, body))
        .collect::<Result<Vec<_>, _>>()?;
    let sql = format!(
        "WITH i AS (\
             INSERT INTO internships (student_id, company, role, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *\
         ) {JOINED_SELECT} FROM i LEFT JOIN students s ON i.student_id = s.student_id"
    );
    Ok(Statement { sql, params })
}

/// # Errors
///
/// Pool or query failure.
pub async fn list(db: &DbPool) -> Result<Vec<Internship>, RecordError> {
    records::fetch_all(
        db,
        &format!(
            "{JOINED_SELECT} FROM internships i LEFT JOIN students s ON i.student_id = s.student_id \
             ORDER BY i.internship_id"
        ),
    )
    .await
}

/// # Errors
///
/// [`RecordError::NotFound`] if no internship has `id`.
pub async fn get(db: &DbPool, id: i32) -> Result<Internship, RecordError> {
    records::fetch_by_id(
        db,
        &format!(
            "{JOINED_SELECT} FROM internships i LEFT JOIN students s ON i.student_id = s.student_id \
             WHERE i.internship_id = $1"
        ),
        id,
        KIND,
    )
    .await
}

/// # Errors
///
/// Validation failure before any write, or pool/query failure.
pub async fn create(db: &DbPool, body: &Map<String, Value>) -> Result<Internship, RecordError> {
    let stmt = insert_statement(body)?;
    records::insert_returning(db, stmt).await
}

/// # Errors
///
/// `NoFieldsToUpdate`, an invalid value, `NotFound`, or pool/query failure.
pub async fn update(db: &DbPool, id: i32, body: &Map<String, Value>) -> Result<(), RecordError> {
    records::update(db, &INTERNSHIPS, id, body, KIND).await
}

/// # Errors
///
/// `NotFound`, or pool/query failure.
pub async fn delete(db: &DbPool, id: i32) -> Result<(), RecordError> {
    records::delete(db, &INTERNSHIPS, id, KIND).await
}

#[cfg(test)]
#[path = "internship_test.rs"]
mod tests;
