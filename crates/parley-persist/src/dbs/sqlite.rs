use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

use crate::error::{PersistError, Result};
use crate::models::{
    AccessTier, ConversationTurn, HistoryStats, ModelProfile, TurnRole, UserModelSelection,
};
use crate::trait_client::{CatalogAdmin, CatalogStore, HistoryStore};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS conversation_history (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        user_id TEXT NOT NULL,
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        model_name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_user_created
        ON conversation_history (user_id, created_at)",
    "CREATE TABLE IF NOT EXISTS ai_models (
        name TEXT PRIMARY KEY,
        provider_id TEXT NOT NULL,
        api_key TEXT NOT NULL,
        is_enabled INTEGER NOT NULL DEFAULT 1,
        access_tier TEXT NOT NULL DEFAULT 'public',
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS user_preferences (
        user_id TEXT PRIMARY KEY,
        model_name TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS team_members (
        identity TEXT PRIMARY KEY
    )",
];

#[derive(Debug, FromRow)]
struct TurnRow {
    id: String,
    user_id: String,
    role: String,
    content: String,
    model_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TurnRow> for ConversationTurn {
    type Error = PersistError;

    fn try_from(row: TurnRow) -> Result<Self> {
        Ok(ConversationTurn {
            id: row.id,
            user_id: row.user_id,
            role: TurnRole::from_str(&row.role)?,
            content: row.content,
            model_name: row.model_name,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ModelRow {
    name: String,
    provider_id: String,
    api_key: String,
    is_enabled: bool,
    access_tier: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ModelRow> for ModelProfile {
    type Error = PersistError;

    fn try_from(row: ModelRow) -> Result<Self> {
        Ok(ModelProfile {
            name: row.name,
            provider_id: row.provider_id,
            api_key: row.api_key,
            is_enabled: row.is_enabled,
            access_tier: AccessTier::from_str(&row.access_tier)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SelectionRow {
    user_id: String,
    model_name: String,
    updated_at: DateTime<Utc>,
}

impl From<SelectionRow> for UserModelSelection {
    fn from(row: SelectionRow) -> Self {
        UserModelSelection {
            user_id: row.user_id,
            model_name: row.model_name,
            updated_at: row.updated_at,
        }
    }
}

/// SQLite-backed store implementing every persistence trait
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and apply the schema.
    ///
    /// `sqlite::memory:` databases live per connection, so keep
    /// `max_connections` at 1 for them.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| PersistError::Connection(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::info!(url = %url, "SQLite store ready");
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteStore {
    async fn insert_turn(&self, turn: ConversationTurn) -> Result<()> {
        sqlx::query(
            "INSERT INTO conversation_history (id, user_id, role, content, model_name, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&turn.id)
        .bind(&turn.user_id)
        .bind(turn.role.as_str())
        .bind(&turn.content)
        .bind(&turn.model_name)
        .bind(turn.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_turns(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        let rows: Vec<TurnRow> = sqlx::query_as(
            "SELECT id, user_id, role, content, model_name, created_at
             FROM conversation_history
             WHERE user_id = ?
             ORDER BY seq DESC
             LIMIT ?",
        )
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ConversationTurn::try_from).collect()
    }

    async fn delete_turns(&self, user_id: &str) -> Result<usize> {
        let result = sqlx::query("DELETE FROM conversation_history WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as usize)
    }

    async fn turn_counts(&self, user_id: &str) -> Result<HistoryStats> {
        let (total, user_count, assistant_count): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN role = 'user' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN role = 'assistant' THEN 1 ELSE 0 END), 0)
             FROM conversation_history
             WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(HistoryStats {
            total: total as usize,
            user_count: user_count as usize,
            assistant_count: assistant_count as usize,
        })
    }
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn model_by_name(&self, name: &str) -> Result<Option<ModelProfile>> {
        let row: Option<ModelRow> = sqlx::query_as(
            "SELECT name, provider_id, api_key, is_enabled, access_tier, created_at
             FROM ai_models WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ModelProfile::try_from).transpose()
    }

    async fn enabled_models(&self) -> Result<Vec<ModelProfile>> {
        let rows: Vec<ModelRow> = sqlx::query_as(
            "SELECT name, provider_id, api_key, is_enabled, access_tier, created_at
             FROM ai_models WHERE is_enabled = 1
             ORDER BY created_at, rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ModelProfile::try_from).collect()
    }

    async fn is_allowlisted(&self, identity: &str) -> Result<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM team_members WHERE identity = ?")
                .bind(identity.to_lowercase())
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn selection(&self, user_id: &str) -> Result<Option<UserModelSelection>> {
        let row: Option<SelectionRow> = sqlx::query_as(
            "SELECT user_id, model_name, updated_at FROM user_preferences WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserModelSelection::from))
    }

    async fn save_selection(&self, user_id: &str, model_name: &str) -> Result<UserModelSelection> {
        let updated_at = Utc::now();
        sqlx::query(
            "INSERT INTO user_preferences (user_id, model_name, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                model_name = excluded.model_name,
                updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(model_name)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(UserModelSelection {
            user_id: user_id.to_string(),
            model_name: model_name.to_string(),
            updated_at,
        })
    }
}

#[async_trait]
impl CatalogAdmin for SqliteStore {
    async fn upsert_model(&self, profile: ModelProfile) -> Result<()> {
        sqlx::query(
            "INSERT INTO ai_models (name, provider_id, api_key, is_enabled, access_tier, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET
                provider_id = excluded.provider_id,
                api_key = excluded.api_key,
                is_enabled = excluded.is_enabled,
                access_tier = excluded.access_tier",
        )
        .bind(&profile.name)
        .bind(&profile.provider_id)
        .bind(&profile.api_key)
        .bind(profile.is_enabled)
        .bind(profile.access_tier.as_str())
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_model(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ai_models WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn allow(&self, identity: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO team_members (identity) VALUES (?)")
            .bind(identity.to_lowercase())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
