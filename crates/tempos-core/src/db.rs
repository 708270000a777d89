use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use crate::error::CoreError;

// Re-export the pool for use in other parts of the core crate
pub use sqlx::SqlitePool as DbPool;

/// Establishes a read-write connection pool to the SQLite database and runs migrations.
///
/// # Arguments
///
/// * `db_path` - The path to the SQLite database file.
///
/// # Returns
///
/// A `Result` containing the `SqlitePool` or a `CoreError` if the connection fails
/// or migrations cannot be run.
pub async fn establish_connection(db_path: &str) -> Result<SqlitePool, CoreError> {
    // Create the database file and directory if they don't exist
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    if !Path::new(db_path).exists() {
        tokio::fs::File::create(db_path).await?;
    }

    let options = SqliteConnectOptions::new().filename(db_path);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::debug!(db_path, "database ready");
    Ok(pool)
}

/// Opens a pool whose connections cannot write.
///
/// The file is opened with `SQLITE_OPEN_READONLY` and every connection also
/// runs with `PRAGMA query_only = ON`. The database must already exist, so
/// call [`establish_connection`] first.
pub async fn establish_read_only_connection(db_path: &str) -> Result<SqlitePool, CoreError> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .pragma("query_only", "ON");

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_only_pool_rejects_writes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("ro.db");
        let db_path = db_path.to_string_lossy();

        let _rw = establish_connection(&db_path).await.unwrap();
        let ro = establish_read_only_connection(&db_path).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schedules")
            .fetch_one(&ro)
            .await
            .unwrap();
        assert_eq!(count.0, 0);

        let result = sqlx::query("DELETE FROM schedules").execute(&ro).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_creates_missing_parent_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("dir").join("schedules.db");

        establish_connection(&db_path.to_string_lossy()).await.unwrap();
        assert!(db_path.exists());
    }
}
