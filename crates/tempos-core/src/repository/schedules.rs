use crate::error::CoreError;
use crate::models::{format_utc, join_tags, NewSchedule, QueryRow, Schedule, ScheduleRow};
use crate::query::ORDER_CLAUSE;
use crate::repository::rows::row_to_map;
use crate::repository::SqliteRepository;
use async_trait::async_trait;

#[async_trait]
impl super::ScheduleRepository for SqliteRepository {
    async fn add_schedule(&self, data: NewSchedule) -> Result<Schedule, CoreError> {
        let title = data.title.trim();
        if title.is_empty() {
            return Err(CoreError::InvalidInput("Schedule title cannot be empty".to_string()));
        }
        if let (Some(start), Some(end)) = (data.start, data.end) {
            if end < start {
                return Err(CoreError::InvalidInput(
                    "Schedule end cannot precede its start".to_string(),
                ));
            }
        }

        let row: ScheduleRow = sqlx::query_as(
            r#"INSERT INTO schedules (title, details, start_ts, end_ts, location, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, details, start_ts, end_ts, location, tags, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(data.details.trim())
        .bind(data.start.map(format_utc))
        .bind(data.end.map(format_utc))
        .bind(data.location.trim())
        .bind(join_tags(&data.tags))
        .bind(format_utc(data.created_at))
        .bind(format_utc(data.updated_at))
        .fetch_one(self.pool())
        .await?;

        tracing::info!(id = row.id, title = %row.title, "schedule saved");
        Ok(row.into())
    }

    async fn find_schedule_by_id(&self, id: i64) -> Result<Option<Schedule>, CoreError> {
        let row: Option<ScheduleRow> = sqlx::query_as("SELECT * FROM schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(Schedule::from))
    }

    async fn list_schedules(&self, limit: u32) -> Result<Vec<Schedule>, CoreError> {
        let sql = format!("SELECT * FROM schedules {} LIMIT $1", ORDER_CLAUSE);
        let rows: Vec<ScheduleRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(Schedule::from).collect())
    }

    async fn count_schedules(&self) -> Result<i64, CoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schedules")
            .fetch_one(self.pool())
            .await?;
        Ok(count.0)
    }

    async fn purge_schedules(&self) -> Result<u64, CoreError> {
        let result = sqlx::query("DELETE FROM schedules")
            .execute(self.pool())
            .await?;
        tracing::warn!(deleted = result.rows_affected(), "all schedules purged");
        Ok(result.rows_affected())
    }

    async fn run_read_only(&self, sql: &str) -> Result<Vec<QueryRow>, CoreError> {
        let execution_failure = |source: sqlx::Error| CoreError::QueryExecutionFailure {
            sql: sql.to_string(),
            source,
        };

        // The connection goes back to the pool when it drops, on every path.
        let mut conn = self
            .read_pool()
            .acquire()
            .await
            .map_err(execution_failure)?;
        let rows = sqlx::query(sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(execution_failure)?;

        let rows = rows
            .iter()
            .map(row_to_map)
            .collect::<Result<Vec<_>, _>>()
            .map_err(execution_failure)?;
        tracing::info!(rows = rows.len(), "read-only query executed");
        Ok(rows)
    }
}
