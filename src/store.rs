//! SQLite persistence for per-user settings and session tokens.
//!
//! `Store` only remembers where the database lives. Each operation opens its
//! own connection on the blocking pool and closes it before returning.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::Result;
use crate::types::UserSettings;

const DB_SCHEMA_VERSION: i64 = 2;

#[derive(Clone, Debug)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Create the database file and bring its schema up to date.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };
        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        store.with_connection(|conn| Ok(initialize_schema(conn)?)).await?;
        debug!(path = %store.path.display(), "Settings store ready");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            f(&conn)
        })
        .await?
    }

    pub async fn load_settings(&self, user_id: &str) -> Result<Option<UserSettings>> {
        let user_id = user_id.to_string();
        self.with_connection(move |conn| Ok(load_settings(conn, &user_id)?))
            .await
    }

    /// Insert or replace the caller's settings; the last write wins.
    pub async fn save_settings(&self, user_id: &str, settings: UserSettings) -> Result<UserSettings> {
        let user_id = user_id.to_string();
        let settings = settings.normalized();
        self.with_connection(move |conn| {
            upsert_settings(conn, &user_id, &settings)?;
            Ok(load_settings(conn, &user_id)?.unwrap_or(settings))
        })
        .await
    }

    /// Issue a new session token for `user_id`.
    pub async fn create_session(&self, user_id: &str) -> Result<String> {
        let user_id = user_id.to_string();
        let token = uuid::Uuid::new_v4().simple().to_string();
        let stored = token.clone();
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
                params![stored, user_id, now_secs()],
            )?;
            Ok(())
        })
        .await?;
        Ok(token)
    }

    pub async fn revoke_session(&self, token: &str) -> Result<bool> {
        let token = token.to_string();
        self.with_connection(move |conn| {
            let removed = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
            Ok(removed > 0)
        })
        .await
    }

    pub async fn user_for_token(&self, token: &str) -> Result<Option<String>> {
        let token = token.to_string();
        self.with_connection(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT user_id FROM sessions WHERE token = ?1",
                    params![token],
                    |row| row.get(0),
                )
                .optional()?)
        })
        .await
    }
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS user_settings (
                user_id TEXT PRIMARY KEY,
                openrouter_api_key TEXT,
                default_model TEXT NOT NULL,
                azure_devops_org TEXT,
                azure_devops_project TEXT,
                azure_devops_pat TEXT,
                updated_at INTEGER NOT NULL DEFAULT 0
            );
            ",
        )?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 2 {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
            ",
        )?;
        version = DB_SCHEMA_VERSION;
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}

fn load_settings(conn: &Connection, user_id: &str) -> rusqlite::Result<Option<UserSettings>> {
    conn.query_row(
        "SELECT openrouter_api_key, default_model, azure_devops_org, azure_devops_project, azure_devops_pat
         FROM user_settings WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(UserSettings {
                openrouter_api_key: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                default_model: row.get(1)?,
                azure_devops_org: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                azure_devops_project: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                azure_devops_pat: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            })
        },
    )
    .optional()
}

fn upsert_settings(conn: &Connection, user_id: &str, settings: &UserSettings) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO user_settings (
            user_id, openrouter_api_key, default_model, azure_devops_org,
            azure_devops_project, azure_devops_pat, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(user_id) DO UPDATE SET
            openrouter_api_key = excluded.openrouter_api_key,
            default_model = excluded.default_model,
            azure_devops_org = excluded.azure_devops_org,
            azure_devops_project = excluded.azure_devops_project,
            azure_devops_pat = excluded.azure_devops_pat,
            updated_at = excluded.updated_at",
        params![
            user_id,
            settings.openrouter_api_key(),
            settings.default_model,
            settings.azure_devops_org(),
            settings.azure_devops_project(),
            settings.azure_devops_pat(),
            now_secs(),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MODEL;

    async fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("nested").join("pusher.db"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn unknown_user_has_no_settings() {
        let (_dir, store) = temp_store().await;
        assert!(store.load_settings("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_inserts_then_updates() {
        let (_dir, store) = temp_store().await;

        let first = UserSettings {
            openrouter_api_key: "sk-or-1".into(),
            azure_devops_org: "contoso".into(),
            ..Default::default()
        };
        store.save_settings("u1", first).await.unwrap();

        let second = UserSettings {
            azure_devops_org: "fabrikam".into(),
            default_model: String::new(),
            ..Default::default()
        };
        let saved = store.save_settings("u1", second).await.unwrap();

        assert_eq!(saved.azure_devops_org, "fabrikam");
        assert_eq!(saved.openrouter_api_key, "");
        assert_eq!(saved.default_model, DEFAULT_MODEL);
        assert_eq!(store.load_settings("u1").await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn settings_are_scoped_per_user() {
        let (_dir, store) = temp_store().await;
        let settings = UserSettings {
            azure_devops_pat: "pat-a".into(),
            ..Default::default()
        };
        store.save_settings("a", settings).await.unwrap();

        assert!(store.load_settings("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_resolve_until_revoked() {
        let (_dir, store) = temp_store().await;

        let token = store.create_session("u1").await.unwrap();
        assert_eq!(store.user_for_token(&token).await.unwrap().as_deref(), Some("u1"));

        assert!(store.revoke_session(&token).await.unwrap());
        assert!(!store.revoke_session(&token).await.unwrap());
        assert!(store.user_for_token(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reopening_keeps_data() {
        let (dir, store) = temp_store().await;
        let token = store.create_session("u1").await.unwrap();

        let reopened = Store::open(store.path().to_path_buf()).await.unwrap();
        assert_eq!(reopened.user_for_token(&token).await.unwrap().as_deref(), Some("u1"));
        drop(dir);
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("pusher.db");

        let store = Store::open(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }
}
