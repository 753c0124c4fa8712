//! Notification channel repository.

use std::sync::Arc;

use async_trait::async_trait;
use harvester_core::ports::ChannelStore;
use harvester_domain::{NotificationChannel, Result};
use rusqlite::params;
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};

/// SQLite-backed implementation of [`ChannelStore`].
pub struct SqliteChannelRepository {
    db: Arc<DbManager>,
}

impl SqliteChannelRepository {
    /// Create a new repository instance.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChannelStore for SqliteChannelRepository {
    async fn all(&self) -> Result<Vec<NotificationChannel>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<NotificationChannel>> {
            let conn = db.get_connection()?;
            let mut statement = conn
                .prepare("SELECT name, key, enabled FROM notification_channels ORDER BY name")
                .map_err(map_sql_error)?;

            let channels = statement
                .query_map(params![], |row| {
                    Ok(NotificationChannel {
                        name: row.get(0)?,
                        key: row.get(1)?,
                        enabled: row.get::<_, i64>(2)? != 0,
                    })
                })
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            Ok(channels)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn replace(&self, channels: Vec<NotificationChannel>) -> Result<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db.get_connection()?;

            // No partial updates: delete + insert commit together or not at all.
            let tx = conn.transaction().map_err(map_sql_error)?;
            tx.execute("DELETE FROM notification_channels", params![])
                .map_err(map_sql_error)?;
            for channel in &channels {
                tx.execute(
                    "INSERT INTO notification_channels (name, key, enabled) VALUES (?1, ?2, ?3)",
                    params![channel.name, channel.key, i64::from(channel.enabled)],
                )
                .map_err(map_sql_error)?;
            }
            tx.commit().map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}
