use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::domain::{BatchQuery, EmailEntry, EmailUpdate};

// SQLite primary result code returned for "table ... already exists".
const TABLE_ALREADY_EXISTS_CODE: &str = "1";
// SQLite extended result code for a UNIQUE constraint failure.
const UNIQUE_CONSTRAINT_CODE: &str = "2067";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("{0} is already subscribed")]
    DuplicateEmail(String),
    #[error("failed to execute query")]
    Query(#[from] sqlx::Error),
}

/// Durable table of subscriber records, keyed by a store-assigned identifier
/// with uniqueness on the email address. Holds the single process-wide pool;
/// concurrent request handlers share it by cloning, and conflicting writes
/// are serialized by SQLite's statement-level atomicity.
#[derive(Clone)]
pub struct EmailStore {
    db_pool: SqlitePool,
}

impl EmailStore {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    /// Creates the emails table. A "table already exists" failure is a
    /// tolerated outcome so the call stays idempotent across restarts; any
    /// other failure propagates and the process must not proceed without a
    /// table.
    #[tracing::instrument(name = "Create the emails table", skip(self))]
    pub async fn try_create(&self) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            CREATE TABLE emails (
                id INTEGER PRIMARY KEY,
                email TEXT UNIQUE,
                confirmed_at INTEGER,
                opt_out INTEGER
            )
            "#,
        )
        .execute(&self.db_pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if has_error_code(&err, TABLE_ALREADY_EXISTS_CODE) => {
                tracing::info!("Emails table already exists");
                Ok(())
            }
            Err(err) => {
                tracing::error!("Failed to create the emails table: {:?}", err);
                Err(err.into())
            }
        }
    }

    /// Inserts a fresh record: not confirmed, not opted out. Does not read
    /// the created row back.
    #[tracing::instrument(name = "Insert a new email into the database", skip(self))]
    pub async fn insert(&self, email: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO emails (email, confirmed_at, opt_out)
            VALUES ($1, 0, 0)
            "#,
        )
        .bind(email)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            if has_error_code(&err, UNIQUE_CONSTRAINT_CODE) {
                StoreError::DuplicateEmail(email.to_string())
            } else {
                tracing::error!("Failed to execute query: {:?}", err);
                err.into()
            }
        })?;

        Ok(())
    }

    /// Absence is a valid result, never an error.
    #[tracing::instrument(name = "Find an email in the database", skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<EmailEntry>, StoreError> {
        let entry = sqlx::query(
            r#"
            SELECT id, email, confirmed_at, opt_out
            FROM emails
            WHERE email = $1
            "#,
        )
        .bind(email)
        .map(email_entry_from_row)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        Ok(entry)
    }

    /// Returns up to `count` records starting at offset `(page - 1) * count`,
    /// ordered by identifier ascending. An offset past the end of the table
    /// yields an empty page.
    #[tracing::instrument(name = "List a page of emails from the database", skip(self))]
    pub async fn list_page(&self, query: BatchQuery) -> Result<Vec<EmailEntry>, StoreError> {
        let entries = sqlx::query(
            r#"
            SELECT id, email, confirmed_at, opt_out
            FROM emails
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(query.count)
        .bind(query.offset())
        .map(email_entry_from_row)
        .fetch_all(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        Ok(entries)
    }

    /// Updates the mutable fields of the row matching the update's email.
    /// Matching zero rows is still a success; callers learn the outcome from
    /// the follow-up read.
    #[tracing::instrument(name = "Update an email in the database", skip(self, update), fields(email = %update.email))]
    pub async fn replace(&self, update: &EmailUpdate) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE emails
            SET confirmed_at = $1, opt_out = $2
            WHERE email = $3
            "#,
        )
        .bind(update.confirmed_at.timestamp())
        .bind(update.opt_out)
        .bind(&update.email)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        Ok(())
    }

    /// Physical deletion. Removing an absent email is a success.
    #[tracing::instrument(name = "Delete an email from the database", skip(self))]
    pub async fn remove(&self, email: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            DELETE FROM emails
            WHERE email = $1
            "#,
        )
        .bind(email)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        Ok(())
    }
}

fn email_entry_from_row(row: SqliteRow) -> EmailEntry {
    EmailEntry {
        id: row.get("id"),
        email: row.get("email"),
        confirmed_at: EmailEntry::confirmed_at_from_seconds(row.get("confirmed_at")),
        opt_out: row.get("opt_out"),
    }
}

fn has_error_code(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}
