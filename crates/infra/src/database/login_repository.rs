//! Login session repository.
//!
//! Single-record store. `put` replaces the whole row in one statement, so a
//! concurrent reader sees either the old or the new session, never a mix.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use harvester_core::ports::LoginStore;
use harvester_domain::{HarvesterError, LoginSession, Result};
use rusqlite::{params, Row};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};

/// SQLite-backed implementation of [`LoginStore`].
pub struct SqliteLoginRepository {
    db: Arc<DbManager>,
}

impl SqliteLoginRepository {
    /// Create a new repository instance.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LoginStore for SqliteLoginRepository {
    async fn get(&self) -> Result<Option<LoginSession>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Option<LoginSession>> {
            let conn = db.get_connection()?;

            let result = conn.query_row(
                "SELECT phone_number, access_token, obtained_at FROM login_session WHERE id = 1",
                params![],
                map_login_session_row,
            );

            match result {
                Ok(session) => Ok(Some(session?)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(map_sql_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn put(&self, session: LoginSession) -> Result<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT OR REPLACE INTO login_session (id, phone_number, access_token, obtained_at)
                 VALUES (1, ?1, ?2, ?3)",
                params![
                    session.phone_number,
                    session.access_token,
                    session.obtained_at.timestamp()
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn clear(&self) -> Result<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute("DELETE FROM login_session", params![]).map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_login_session_row(row: &Row<'_>) -> rusqlite::Result<Result<LoginSession>> {
    let phone_number: String = row.get(0)?;
    let access_token: String = row.get(1)?;
    let obtained_epoch: i64 = row.get(2)?;

    Ok(DateTime::from_timestamp(obtained_epoch, 0)
        .map(|obtained_at| LoginSession { phone_number, access_token, obtained_at })
        .ok_or_else(|| {
            HarvesterError::Database(format!("invalid obtained_at epoch: {obtained_epoch}"))
        }))
}
