//! Postgres test support, gated on `DUNGI_TEST_DSN`.
//!
//! Tests call `TestDb::new()` and skip when the variable is unset, so the
//! suite stays green on machines without a database. The schema is applied
//! idempotently under an advisory lock before the pool is handed out.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, PgPool};
use ulid::Ulid;

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const SCHEMA_LOCK_KEY: i64 = 0x64756e_6769;

pub(crate) struct TestDb {
    pub(crate) pool: PgPool,
}

impl TestDb {
    /// Connect to the database named by `DUNGI_TEST_DSN`, applying the schema
    /// first. Errors when the variable is unset so callers can skip.
    pub(crate) async fn new() -> Result<Self> {
        let dsn = std::env::var("DUNGI_TEST_DSN")
            .context("DUNGI_TEST_DSN not set, skipping database test")?;

        apply_schema(&dsn).await?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&dsn)
            .await
            .context("failed to connect test pool")?;

        Ok(Self { pool })
    }
}

/// Unique lowercase suffix for test fixtures sharing one database.
pub(crate) fn unique(label: &str) -> String {
    format!("{label} {}", Ulid::new().to_string().to_lowercase())
}

async fn apply_schema(dsn: &str) -> Result<()> {
    let mut connection = PgConnection::connect(dsn)
        .await
        .context("failed to connect for schema setup")?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut connection)
        .await
        .context("failed to take schema lock")?;

    let mut result = Ok(());
    for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
        if let Err(err) = sqlx::query(statement).execute(&mut connection).await {
            result = Err(err).with_context(|| format!("schema statement {} failed", index + 1));
            break;
        }
    }

    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut connection)
        .await
        .context("failed to release schema lock")?;

    result
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');
        if trimmed.ends_with(';') {
            let statement = current.trim().trim_end_matches(';').trim().to_string();
            if !statement.is_empty() {
                statements.push(statement);
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        statements.push(rest.to_string());
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sql_statements() {
        let sql = "-- leading comment\nCREATE TABLE a (\n  id INT\n);\n\nCREATE INDEX b ON a (id);\n";
        let statements = split_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE a"));
        assert!(statements[1].starts_with("CREATE INDEX b"));
    }

    #[test]
    fn test_schema_parses_into_statements() {
        let statements = split_sql_statements(SCHEMA_SQL);
        assert!(statements.len() >= 4);
        for statement in &statements {
            assert!(!statement.contains("--"));
        }
    }

    #[test]
    fn test_unique_suffixes_differ() {
        assert_ne!(unique("acme"), unique("acme"));
    }
}
