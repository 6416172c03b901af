// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite client wrapper with typed operations.
//!
//! Provides high-level operations for contacts: insert, lookup by id,
//! paginated listing, update, delete, and the `email1` existence check used
//! by validation. The UNIQUE constraint on `email1` is the authority on
//! duplicates; a constraint violation is reported as the same validation
//! error the pre-check would have produced.

use crate::db::tables;
use crate::error::AppError;
use crate::middleware::find_contact::UNKNOWN_CONTACT;
use crate::models::{Contact, ContactSummary};
use crate::validation::contact::email_taken;
use crate::validation::UniqueLookup;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use std::str::FromStr;

const MAX_CONNECTIONS: u32 = 5;

const CONTACT_COLUMNS: &str = "id, first_name, surname, company, job_title, email1, email2, \
     phone_number1, phone_number2, country, street_address_line1, street_address_line2, city, \
     post_code, state, birthday, website, notes, profile_picture, created_at, updated_at";

const SUMMARY_COLUMNS: &str =
    "id, first_name, surname, email1, phone_number1, company, job_title, profile_picture";

const EMAIL_NOCASE_INDEX: &str = "contacts_email1_nocase_unique";

/// Columns that may be checked for uniqueness.
const UNIQUE_COLUMNS: &[&str] = &["email1"];

/// SQLite database client.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database at `url` and run pending migrations.
    ///
    /// `sqlite::memory:` gives a private in-memory database.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        if url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to {}: {}", url, e)))?;

        tracing::info!(url = url, "Connected to SQLite");

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Create a migrated in-memory database.
    ///
    /// Each in-memory connection is its own database, so the pool is pinned
    /// to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        tracing::debug!("Using in-memory SQLite database");

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Match the storage guard on `email1` to the configured comparison.
    ///
    /// The table's UNIQUE constraint is case-sensitive; case-insensitive mode
    /// adds a NOCASE unique index next to it, and case-sensitive mode drops
    /// that index again. Fails if existing rows already differ only by case.
    pub async fn set_email_case_insensitive(
        &self,
        case_insensitive: bool,
    ) -> Result<(), AppError> {
        let sql = if case_insensitive {
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} (email1 COLLATE NOCASE)",
                EMAIL_NOCASE_INDEX,
                tables::CONTACTS
            )
        } else {
            format!("DROP INDEX IF EXISTS {}", EMAIL_NOCASE_INDEX)
        };
        sqlx::query(&sql).execute(&self.pool).await?;

        tracing::debug!(case_insensitive, "Applied email1 uniqueness rule");
        Ok(())
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ─── Contact Operations ──────────────────────────────────────

    /// Get a contact by id.
    pub async fn find_contact(&self, id: &str) -> Result<Option<Contact>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            CONTACT_COLUMNS,
            tables::CONTACTS
        );
        Ok(sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Insert a new contact.
    pub async fn insert_contact(&self, contact: &Contact) -> Result<(), AppError> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            tables::CONTACTS,
            CONTACT_COLUMNS
        );

        sqlx::query(&sql)
            .bind(&contact.id)
            .bind(&contact.first_name)
            .bind(&contact.surname)
            .bind(&contact.company)
            .bind(&contact.job_title)
            .bind(&contact.email1)
            .bind(&contact.email2)
            .bind(&contact.phone_number1)
            .bind(&contact.phone_number2)
            .bind(&contact.country)
            .bind(&contact.street_address_line1)
            .bind(&contact.street_address_line2)
            .bind(&contact.city)
            .bind(&contact.post_code)
            .bind(&contact.state)
            .bind(contact.birthday)
            .bind(&contact.website)
            .bind(&contact.notes)
            .bind(stored_picture(contact))
            .bind(contact.created_at)
            .bind(contact.updated_at)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(())
    }

    /// Overwrite every mutable column of an existing contact.
    pub async fn update_contact(&self, contact: &Contact) -> Result<(), AppError> {
        let sql = format!(
            "UPDATE {} SET first_name = ?, surname = ?, company = ?, job_title = ?, \
             email1 = ?, email2 = ?, phone_number1 = ?, phone_number2 = ?, country = ?, \
             street_address_line1 = ?, street_address_line2 = ?, city = ?, post_code = ?, \
             state = ?, birthday = ?, website = ?, notes = ?, profile_picture = ?, \
             updated_at = ? WHERE id = ?",
            tables::CONTACTS
        );

        let result = sqlx::query(&sql)
            .bind(&contact.first_name)
            .bind(&contact.surname)
            .bind(&contact.company)
            .bind(&contact.job_title)
            .bind(&contact.email1)
            .bind(&contact.email2)
            .bind(&contact.phone_number1)
            .bind(&contact.phone_number2)
            .bind(&contact.country)
            .bind(&contact.street_address_line1)
            .bind(&contact.street_address_line2)
            .bind(&contact.city)
            .bind(&contact.post_code)
            .bind(&contact.state)
            .bind(contact.birthday)
            .bind(&contact.website)
            .bind(&contact.notes)
            .bind(stored_picture(contact))
            .bind(contact.updated_at)
            .bind(&contact.id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(UNKNOWN_CONTACT.to_string()));
        }
        Ok(())
    }

    /// Hard-delete a contact. Returns whether a row was removed.
    pub async fn delete_contact(&self, id: &str) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", tables::CONTACTS);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total number of contacts.
    pub async fn count_contacts(&self) -> Result<u64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM {}", tables::CONTACTS);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    /// One page of contact summaries ordered by first name (id breaks ties),
    /// plus the total row count.
    ///
    /// `page` is 1-indexed.
    pub async fn list_contacts(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<ContactSummary>, u64), AppError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);
        let sql = format!(
            "SELECT {} FROM {} ORDER BY first_name ASC, id ASC LIMIT ? OFFSET ?",
            SUMMARY_COLUMNS,
            tables::CONTACTS
        );

        let rows = sqlx::query_as::<_, ContactSummary>(&sql)
            .bind(i64::from(per_page))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let total = self.count_contacts().await?;

        Ok((rows, total))
    }

    /// Whether `value` exists in `column` on a record other than `exclude_id`.
    pub async fn value_taken(
        &self,
        column: &str,
        value: &str,
        case_insensitive: bool,
        exclude_id: Option<&str>,
    ) -> Result<bool, AppError> {
        if !UNIQUE_COLUMNS.contains(&column) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Uniqueness check on unsupported column {}",
                column
            )));
        }

        let collate = if case_insensitive { " COLLATE NOCASE" } else { "" };
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?{} AND (? IS NULL OR id <> ?)",
            tables::CONTACTS,
            column,
            collate
        );

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(value)
            .bind(exclude_id)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl UniqueLookup for Database {
    async fn value_exists(
        &self,
        column: &str,
        value: &str,
        case_insensitive: bool,
        exclude_id: Option<&str>,
    ) -> Result<bool, AppError> {
        self.value_taken(column, value, case_insensitive, exclude_id)
            .await
    }
}

/// Attachment metadata as persisted: never includes the computed URL.
fn stored_picture(contact: &Contact) -> Option<Json<crate::models::Attachment>> {
    contact.profile_picture().map(|p| Json(p.without_url()))
}

fn map_write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.message().contains("email1") {
            return AppError::Validation(email_taken());
        }
    }
    AppError::from(err)
}
