use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{NewSchedule, QueryRow, Schedule};
use async_trait::async_trait;

pub mod rows;
pub mod schedules;

/// Data access for the `schedules` table.
///
/// Writes go through the read-write pool; free-form statements are only ever
/// executed on the read-only pool.
#[async_trait]
pub trait ScheduleRepository {
    async fn add_schedule(&self, data: NewSchedule) -> Result<Schedule, CoreError>;
    async fn find_schedule_by_id(&self, id: i64) -> Result<Option<Schedule>, CoreError>;
    async fn list_schedules(&self, limit: u32) -> Result<Vec<Schedule>, CoreError>;
    async fn count_schedules(&self) -> Result<i64, CoreError>;
    /// Deletes every row; returns how many were removed.
    async fn purge_schedules(&self) -> Result<u64, CoreError>;
    /// Runs an already gated statement on a read-only handle.
    async fn run_read_only(&self, sql: &str) -> Result<Vec<QueryRow>, CoreError>;
}

/// SQLite implementation of the repository pattern
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: DbPool,
    read_pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, read_pool: DbPool) -> Self {
        Self { pool, read_pool }
    }

    /// Opens both pools for the database at `db_path`, running migrations first.
    pub async fn open(db_path: &str) -> Result<Self, CoreError> {
        let pool = crate::db::establish_connection(db_path).await?;
        let read_pool = crate::db::establish_read_only_connection(db_path).await?;
        Ok(Self::new(pool, read_pool))
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub(crate) fn read_pool(&self) -> &DbPool {
        &self.read_pool
    }
}
