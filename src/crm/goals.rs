//! Relationship goals.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::types::{Goal, GoalStatus, NewGoal};
use super::{format_timestamp, json_list, CrmError, Result};

const GOAL_COLUMNS: &str =
    "id, title, description, target_contact_ids, progress, status, target_date, created_at";

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<Goal> {
    let status_str: String = row.get(5)?;
    let status = status_str.parse::<GoalStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })?;

    Ok(Goal {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        target_contact_ids: json_list(row.get(3)?),
        progress: row.get(4)?,
        status,
        target_date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn create_goal(conn: &Connection, new: &NewGoal, now: DateTime<Utc>) -> Result<Goal> {
    if new.title.trim().is_empty() {
        return Err(CrmError::Invalid("title must not be empty".into()));
    }
    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO goals (id, title, description, target_contact_ids, progress, status, \
         target_date, created_at) VALUES (?1, ?2, ?3, ?4, 0.0, 'active', ?5, ?6)",
        params![
            id,
            new.title.trim(),
            new.description,
            serde_json::to_string(&new.target_contact_ids)?,
            new.target_date,
            format_timestamp(now),
        ],
    )?;
    tracing::info!(goal_id = %id, "goal created");
    get_goal(conn, &id)
}

pub fn get_goal(conn: &Connection, id: &str) -> Result<Goal> {
    let sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_goal)
        .optional()?
        .ok_or_else(|| CrmError::not_found("Goal", id))
}

/// Goals, newest first, optionally filtered by status.
pub fn list_goals(conn: &Connection, status: Option<GoalStatus>) -> Result<Vec<Goal>> {
    let sql = format!(
        "SELECT {GOAL_COLUMNS} FROM goals WHERE (?1 IS NULL OR status = ?1) \
         ORDER BY created_at DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let goals = stmt
        .query_map(params![status.map(|s| s.as_str())], row_to_goal)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(goals)
}

/// Update progress and/or status. Progress is clamped to `[0, 100]`; reaching
/// 100 marks the goal completed unless a status is given explicitly.
pub fn update_goal(
    conn: &Connection,
    id: &str,
    progress: Option<f64>,
    status: Option<GoalStatus>,
) -> Result<Goal> {
    let mut goal = get_goal(conn, id)?;

    if let Some(p) = progress {
        if !p.is_finite() {
            return Err(CrmError::Invalid("progress must be a number".into()));
        }
        goal.progress = p.clamp(0.0, 100.0);
        if goal.progress >= 100.0 && status.is_none() {
            goal.status = GoalStatus::Completed;
        }
    }
    if let Some(s) = status {
        goal.status = s;
    }

    conn.execute(
        "UPDATE goals SET progress = ?1, status = ?2 WHERE id = ?3",
        params![goal.progress, goal.status.as_str(), id],
    )?;
    Ok(goal)
}

pub fn delete_goal(conn: &Connection, id: &str) -> Result<()> {
    let rows = conn.execute("DELETE FROM goals WHERE id = ?1", params![id])?;
    if rows == 0 {
        return Err(CrmError::not_found("Goal", id));
    }
    Ok(())
}
