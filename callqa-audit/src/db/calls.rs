//! Call record database operations
//!
//! Plain row mapping and queries; state-machine enforcement lives in
//! [`crate::db::store`].

use callqa_common::types::CallStatus;
use callqa_common::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{CallFilter, CallRecord, CallScores, NormalizedAnalysis};

/// Insert a freshly created record
pub async fn insert_call(pool: &SqlitePool, record: &CallRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO calls (
            id, created_at, filename, agent_id, audio_path, status,
            transcript, analysis, scores, failure_reason, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(record.created_at.to_rfc3339())
    .bind(&record.filename)
    .bind(&record.agent_id)
    .bind(&record.audio_path)
    .bind(record.status.as_str())
    .bind(&record.transcript)
    .bind(to_json(&record.analysis)?)
    .bind(to_json(&record.scores)?)
    .bind(&record.failure_reason)
    .bind(record.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist record state after a transition
///
/// Fails with `NotFound` when the row no longer exists, so a transition
/// racing a delete cannot report success against nothing.
pub async fn update_call(pool: &SqlitePool, record: &CallRecord) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE calls
        SET status = ?, transcript = ?, analysis = ?, scores = ?,
            failure_reason = ?, audio_path = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(record.status.as_str())
    .bind(&record.transcript)
    .bind(to_json(&record.analysis)?)
    .bind(to_json(&record.scores)?)
    .bind(&record.failure_reason)
    .bind(&record.audio_path)
    .bind(record.updated_at.to_rfc3339())
    .bind(record.id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("call record: {}", record.id)));
    }

    Ok(())
}

/// Load one record by id
pub async fn load_call(pool: &SqlitePool, id: Uuid) -> Result<Option<CallRecord>> {
    let row = sqlx::query("SELECT * FROM calls WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|row| record_from_row(&row)).transpose()
}

/// Load records matching the filter, in creation order
pub async fn list_calls(pool: &SqlitePool, filter: &CallFilter) -> Result<Vec<CallRecord>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM calls WHERE 1=1");

    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(agent_id) = &filter.agent_id {
        query.push(" AND agent_id = ").push_bind(agent_id.clone());
    }
    if let Some(from) = filter.from {
        query.push(" AND date(created_at) >= ").push_bind(from.to_string());
    }
    if let Some(to) = filter.to {
        query.push(" AND date(created_at) <= ").push_bind(to.to_string());
    }
    query.push(" ORDER BY created_at ASC");

    let rows = query.build().fetch_all(pool).await?;
    rows.iter().map(record_from_row).collect()
}

/// Delete one record; returns whether a row was removed
pub async fn delete_call(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM calls WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load non-terminal records whose last transition is at or before the
/// cutoff (datetime() compares at whole-second precision)
pub async fn load_stale(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<Vec<CallRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM calls
        WHERE status IN ('Uploaded', 'Transcribing', 'Analyzing')
          AND datetime(updated_at) <= datetime(?)
        ORDER BY created_at ASC
        "#,
    )
    .bind(cutoff.to_rfc3339())
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

fn record_from_row(row: &SqliteRow) -> Result<CallRecord> {
    let id_str: String = row.get("id");
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| Error::Internal(format!("bad record id {id_str:?}: {e}")))?;

    let status_str: String = row.get("status");
    let status: CallStatus = status_str
        .parse()
        .map_err(|e: String| Error::Internal(e))?;

    let analysis: Option<NormalizedAnalysis> = from_json(row.get("analysis"))?;
    let scores: Option<CallScores> = from_json(row.get("scores"))?;

    Ok(CallRecord {
        id,
        created_at: parse_timestamp(row.get("created_at"))?,
        filename: row.get("filename"),
        agent_id: row.get("agent_id"),
        audio_path: row.get("audio_path"),
        status,
        transcript: row.get("transcript"),
        analysis,
        scores,
        failure_reason: row.get("failure_reason"),
        updated_at: parse_timestamp(row.get("updated_at"))?,
    })
}

fn parse_timestamp(value: String) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("bad timestamp {value:?}: {e}")))
}

fn to_json<T: serde::Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value
        .as_ref()
        .map(|v| serde_json::to_string(v).map_err(|e| Error::Internal(e.to_string())))
        .transpose()
}

fn from_json<T: serde::de::DeserializeOwned>(value: Option<String>) -> Result<Option<T>> {
    value
        .map(|v| serde_json::from_str(&v).map_err(|e| Error::Internal(e.to_string())))
        .transpose()
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    // Single connection: every handle must see the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    crate::db::init_tables(&pool).await.expect("Failed to init tables");
    pool
}
