//! Assignment creation and listing.

use jiff::{civil::Date, Timestamp};
use rusqlite::{params, types::Type, OptionalExtension, Row};

use crate::{
    error::{DatabaseResultExt, Result},
    models::{Assignment, AssignmentEntry, AssignmentKind, AssignmentStatus},
};

const INSERT_ASSIGNMENT_SQL: &str = "INSERT INTO assignments (id, title, kind, content_id, due_date, assigned_by, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const ASSIGNMENT_COLUMNS: &str =
    "a.id, a.title, a.kind, a.content_id, a.due_date, a.assigned_by, a.created_at";

/// Fields of a new assignment.
pub struct NewAssignment<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub kind: AssignmentKind,
    pub content_id: &'a str,
    pub due_date: Option<Date>,
    pub assigned_by: &'a str,
}

impl super::Database {
    /// Stores a new assignment.
    pub fn create_assignment(&mut self, new: &NewAssignment<'_>) -> Result<Assignment> {
        let now = Timestamp::now();
        let due_date = new.due_date.map(|date| date.to_string());

        self.connection
            .execute(
                INSERT_ASSIGNMENT_SQL,
                params![
                    new.id,
                    new.title,
                    new.kind.as_str(),
                    new.content_id,
                    due_date,
                    new.assigned_by,
                    now.to_string()
                ],
            )
            .db_context("Failed to insert assignment")?;

        Ok(Assignment {
            id: new.id.to_string(),
            title: new.title.to_string(),
            kind: new.kind,
            content_id: new.content_id.to_string(),
            due_date: new.due_date,
            assigned_by: new.assigned_by.to_string(),
            created_at: now,
        })
    }

    /// Retrieves an assignment by its ID.
    pub fn get_assignment(&self, id: &str) -> Result<Option<Assignment>> {
        let query = format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments a WHERE a.id = ?1");
        self.connection
            .query_row(&query, params![id], assignment_from_row)
            .optional()
            .db_context("Failed to query assignment")
    }

    /// Lists assignments, oldest first, with completion counts.
    ///
    /// When `user_id` is given, each entry also carries that learner's
    /// status and completion time.
    pub fn list_assignments(&self, user_id: Option<&str>) -> Result<Vec<AssignmentEntry>> {
        let query = format!(
            "SELECT {ASSIGNMENT_COLUMNS}, \
             (SELECT COUNT(*) FROM assignment_completions c WHERE c.assignment_id = a.id), \
             (SELECT c.completed_at FROM assignment_completions c WHERE c.assignment_id = a.id AND c.user_id = ?1) \
             FROM assignments a ORDER BY a.rowid"
        );

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;

        let entries = stmt
            .query_map(params![user_id], |row| {
                let assignment = assignment_from_row(row)?;
                let completions: i64 = row.get(7)?;
                let completed_at = row
                    .get::<_, Option<String>>(8)?
                    .map(|s| parse_timestamp(8, &s))
                    .transpose()?;

                let status = user_id.map(|_| {
                    if completed_at.is_some() {
                        AssignmentStatus::Completed
                    } else {
                        AssignmentStatus::Pending
                    }
                });

                Ok(AssignmentEntry {
                    assignment,
                    status,
                    completed_at,
                    completions: completions.max(0) as u32,
                })
            })
            .db_context("Failed to query assignments")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to read assignment row")?;

        Ok(entries)
    }
}

fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<Assignment> {
    let kind_str: String = row.get(2)?;
    let kind = kind_str.parse::<AssignmentKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })?;

    let due_date = row
        .get::<_, Option<String>>(4)?
        .map(|s| {
            s.parse::<Date>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))
        })
        .transpose()?;

    Ok(Assignment {
        id: row.get(0)?,
        title: row.get(1)?,
        kind,
        content_id: row.get(3)?,
        due_date,
        assigned_by: row.get(5)?,
        created_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
    })
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<Timestamp> {
    value
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}
