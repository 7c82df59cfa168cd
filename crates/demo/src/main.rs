//! `encrypted-column-demo` — stores a person with an encrypted last name.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`](config::Config) from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Build the local encryption client and the [`EncryptionContext`].
//! 4. Open the SQLite pool and create the `person` table.
//! 5. Insert one person, read it back decrypted, and tear the table down.

mod config;
mod person;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use encrypted_column::{EncryptionContext, LocalClient};
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use person::{NewPerson, PersonStore};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), "encrypted-column demo starting");

    // -----------------------------------------------------------------------
    // 3. Encryption client
    // -----------------------------------------------------------------------
    let mut client = LocalClient::new(cfg.master_key()?);
    if let Some(token) = &cfg.access_token {
        client = client.require_credential(token.as_str());
    }
    let mut ctx = EncryptionContext::new(Arc::new(client));
    if let Some(token) = &cfg.access_token {
        ctx = ctx.with_credential(token.as_str());
    }

    // -----------------------------------------------------------------------
    // 4. Database
    // -----------------------------------------------------------------------
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&cfg.database_url)
        .await
        .context("failed to open database")?;
    let store = PersonStore::new(pool.clone(), &ctx);
    store.create_table().await?;

    // -----------------------------------------------------------------------
    // 5. Round trip
    // -----------------------------------------------------------------------
    let id = store
        .insert(&NewPerson {
            first_name: "Michael".into(),
            last_name: Some("Jackson".into()),
            born: chrono::DateTime::parse_from_rfc3339("1958-08-29T00:00:00-05:00").ok(),
            profile: Some(json!({"instrument": "voice", "albums": 10})),
        })
        .await?;

    let person = store
        .get(id)
        .await?
        .context("inserted person not found")?;

    println!("id: {}", person.id);
    println!("first name: {}", person.first_name);
    println!("last name: {}", person.last_name.as_deref().unwrap_or("<null>"));
    if let Some(born) = person.born {
        println!("born: {}", born.to_rfc3339());
    }
    if let Some(profile) = &person.profile {
        println!("profile: {profile}");
    }

    store.drop_table().await?;
    pool.close().await;
    Ok(())
}
