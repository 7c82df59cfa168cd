//! A `person` table whose last name, birth date, and profile are encrypted.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use encrypted_column::{EncryptedColumnValue, EncryptedType, EncryptionContext, UnderlyingType, Value};
use sqlx::{Row, SqlitePool};
use tracing::info;

/// A decrypted `person` row.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    /// Row id.
    pub id: i64,
    /// Stored in clear.
    pub first_name: String,
    /// Encrypted text.
    pub last_name: Option<String>,
    /// Encrypted timestamp.
    pub born: Option<DateTime<FixedOffset>>,
    /// Encrypted JSON document.
    pub profile: Option<serde_json::Value>,
}

/// Data for a row to be inserted.
#[derive(Debug, Clone, Default)]
pub struct NewPerson {
    /// Written in clear.
    pub first_name: String,
    /// Encrypted as text, or NULL.
    pub last_name: Option<String>,
    /// Encrypted as an RFC 3339 timestamp, or NULL.
    pub born: Option<DateTime<FixedOffset>>,
    /// Encrypted as compact JSON, or NULL.
    pub profile: Option<serde_json::Value>,
}

/// Reads and writes `person` rows, encrypting the sensitive columns.
pub struct PersonStore {
    pool: SqlitePool,
    last_name: EncryptedType,
    born: EncryptedType,
    profile: EncryptedType,
}

impl PersonStore {
    /// Define the encrypted columns from `ctx`.
    pub fn new(pool: SqlitePool, ctx: &EncryptionContext) -> Self {
        Self {
            pool,
            last_name: ctx.encrypted_type(UnderlyingType::Text),
            born: ctx.encrypted_type(UnderlyingType::DateTime),
            profile: ctx.encrypted_type(UnderlyingType::Json),
        }
    }

    /// Create the `person` table.
    pub async fn create_table(&self) -> Result<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS person (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                {},
                {},
                {}
            )",
            self.last_name.column_definition("last_name"),
            self.born.column_definition("born"),
            self.profile.column_definition("profile"),
        );
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .context("failed to create person table")?;
        Ok(())
    }

    /// Drop the `person` table.
    pub async fn drop_table(&self) -> Result<()> {
        sqlx::query("DROP TABLE IF EXISTS person")
            .execute(&self.pool)
            .await
            .context("failed to drop person table")?;
        Ok(())
    }

    /// Encrypt and insert a row, returning its id.
    pub async fn insert(&self, person: &NewPerson) -> Result<i64> {
        let last_name = self
            .last_name
            .process_bind_param(person.last_name.clone().map(Value::Text).as_ref())
            .await?;
        let born = self
            .born
            .process_bind_param(person.born.map(Value::DateTime).as_ref())
            .await?;
        let profile = self
            .profile
            .process_bind_param(person.profile.clone().map(Value::Json).as_ref())
            .await?;

        let id: i64 = sqlx::query(
            "INSERT INTO person (first_name, last_name, born, profile) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&person.first_name)
        .bind(last_name)
        .bind(born)
        .bind(profile)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert person")?
        .try_get(0)?;

        info!(id, "person inserted");
        Ok(id)
    }

    /// Fetch and decrypt a row by id.
    pub async fn get(&self, id: i64) -> Result<Option<Person>> {
        let row = sqlx::query("SELECT id, first_name, last_name, born, profile FROM person WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch person")?;
        let Some(row) = row else {
            return Ok(None);
        };

        let last_name: Option<EncryptedColumnValue> = row.try_get("last_name")?;
        let born: Option<EncryptedColumnValue> = row.try_get("born")?;
        let profile: Option<EncryptedColumnValue> = row.try_get("profile")?;

        let last_name = match self.last_name.process_result_column(last_name.as_ref()).await? {
            Some(Value::Text(s)) => Some(s),
            Some(other) => anyhow::bail!("last_name decrypted to {}", other.kind()),
            None => None,
        };
        let born = match self.born.process_result_column(born.as_ref()).await? {
            Some(Value::DateTime(dt)) => Some(dt),
            Some(other) => anyhow::bail!("born decrypted to {}", other.kind()),
            None => None,
        };
        let profile = match self.profile.process_result_column(profile.as_ref()).await? {
            Some(Value::Json(doc)) => Some(doc),
            Some(other) => anyhow::bail!("profile decrypted to {}", other.kind()),
            None => None,
        };

        Ok(Some(Person {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name,
            born,
            profile,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encrypted_column::LocalClient;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;

    async fn store() -> PersonStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let ctx = EncryptionContext::new(Arc::new(LocalClient::random()));
        let store = PersonStore::new(pool, &ctx);
        store.create_table().await.unwrap();
        store
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = store().await;
        let born = DateTime::parse_from_rfc3339("1958-08-29T00:00:00-05:00").unwrap();
        let id = store
            .insert(&NewPerson {
                first_name: "Michael".into(),
                last_name: Some("Jackson".into()),
                born: Some(born),
                profile: Some(json!({"instrument": "voice"})),
            })
            .await
            .unwrap();

        let person = store.get(id).await.unwrap().unwrap();
        assert_eq!(person.first_name, "Michael");
        assert_eq!(person.last_name.as_deref(), Some("Jackson"));
        assert_eq!(person.born, Some(born));
        assert_eq!(person.profile, Some(json!({"instrument": "voice"})));
    }

    #[tokio::test]
    async fn nulls_survive() {
        let store = store().await;
        let id = store
            .insert(&NewPerson {
                first_name: "Prince".into(),
                ..NewPerson::default()
            })
            .await
            .unwrap();
        let person = store.get(id).await.unwrap().unwrap();
        assert!(person.last_name.is_none());
        assert!(person.born.is_none());
        assert!(person.profile.is_none());
    }

    #[tokio::test]
    async fn missing_row_is_none() {
        let store = store().await;
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn drop_table_removes_rows() {
        let store = store().await;
        store.drop_table().await.unwrap();
        assert!(store.get(1).await.is_err());
    }
}
