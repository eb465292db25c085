//! Student records.
//!
//! Creation has two fixed statement shapes: with and without `resume_url`.
//! The resume URL is usually filled in later through a partial update once
//! an upload has produced a signed link.

use serde::Serialize;
use serde_json::{Map, Value};

use super::records::{self, RecordError};
use crate::db::update::{optional, required};
use crate::db::{BuildError, DbPool, Field, SqlType, SqlValue, Statement, Table};

pub const KIND: &str = "Student";

pub const ROLL_NUMBER: Field =
    Field { name: "RollNumber", aliases: &["rollNumber"], column: "roll_number", ty: SqlType::Text };
pub const FIRST_NAME: Field =
    Field { name: "FirstName", aliases: &["firstName"], column: "first_name", ty: SqlType::Text };
pub const LAST_NAME: Field = Field { name: "LastName", aliases: &["lastName"], column: "last_name", ty: SqlType::Text };
pub const EMAIL: Field = Field { name: "Email", aliases: &["email"], column: "email", ty: SqlType::Text };
pub const RESUME_URL: Field =
    Field { name: "ResumeUrl", aliases: &["resumeUrl"], column: "resume_url", ty: SqlType::Text };

pub const STUDENTS: Table = Table {
    name: "students",
    key_column: "student_id",
    fields: &[ROLL_NUMBER, FIRST_NAME, LAST_NAME, EMAIL, RESUME_URL],
};

const COLUMNS: &str = "student_id, roll_number, first_name, last_name, email, resume_url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Student {
    #[serde(rename = "StudentID")]
    pub student_id: i32,
    #[serde(rename = "RollNumber")]
    pub roll_number: String,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "ResumeUrl")]
    pub resume_url: Option<String>,
}

/// Render the insert for a create request.
///
/// # Errors
///
/// [`BuildError::MissingRequiredFields`] unless roll number, first name,
/// last name and email are all present and non-blank.
pub fn insert_statement(body: &Map<String, Value>) -> Result<Statement, BuildError> {
    let mut params = vec![
        required(&ROLL_NUMBER, body)?,
        required(&FIRST_NAME, body)?,
        required(&LAST_NAME, body)?,
        required(&EMAIL, body)?,
    ];
    let resume_url = optional(&RESUME_URL, body)?.filter(|v| !matches!(v, SqlValue::Text(s) if s.is_empty()));

    let sql = match resume_url {
        Some(url) => {
            params.push(url);
            format!(
                "INSERT INTO students (roll_number, first_name, last_name, email, resume_url) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
            )
        }
        None => format!(
            "INSERT INTO students (roll_number, first_name, last_name, email) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        ),
    };
    Ok(Statement { sql, params })
}

/// # Errors
///
/// Pool or query failure.
pub async fn list(db: &DbPool) -> Result<Vec<Student>, RecordError> {
    records::fetch_all(db, &format!("SELECT {COLUMNS} FROM students ORDER BY student_id")).await
}

/// # Errors
///
/// [`RecordError::NotFound`] if no student has `id`.
pub async fn get(db: &DbPool, id: i32) -> Result<Student, RecordError> {
    records::fetch_by_id(db, &format!("SELECT {COLUMNS} FROM students WHERE student_id = $1"), id, KIND).await
}

/// # Errors
///
/// Validation failure before any write, or pool/query failure.
pub async fn create(db: &DbPool, body: &Map<String, Value>) -> Result<Student, RecordError> {
    let stmt = insert_statement(body)?;
    records::insert_returning(db, stmt).await
}

/// # Errors
///
/// `NoFieldsToUpdate`, an invalid value, `NotFound`, or pool/query failure.
pub async fn update(db: &DbPool, id: i32, body: &Map<String, Value>) -> Result<(), RecordError> {
    records::update(db, &STUDENTS, id, body, KIND).await
}

/// # Errors
///
/// `NotFound`, or pool/query failure.
pub async fn delete(db: &DbPool, id: i32) -> Result<(), RecordError> {
    records::delete(db, &STUDENTS, id, KIND).await
}

#[cfg(test)]
#[path = "student_test.rs"]
mod tests;
