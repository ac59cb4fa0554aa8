//! User repository for database operations.
//!
//! Queries are built at runtime with `sqlx::query_as` and mapped through an
//! internal row type, so the crate builds without a live database.

use sqlx::{SqliteConnection, SqlitePool};

use user_directory_core::{Email, UserId, Username};

use super::RepositoryError;
use crate::models::user::{NewUser, User, UserChanges};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `users` queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            email,
        })
    }
}

/// Transactions that read before writing take the write lock up front. A
/// deferred transaction fails with `SQLITE_BUSY` instead of waiting when
/// another writer commits between its read and its first write.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

/// Map a unique-constraint violation to `Conflict`, naming the column when
/// `SQLite` reports it.
fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let message = db_err.message();
        let conflict = if message.contains("users.username") {
            "username already taken"
        } else if message.contains("users.email") {
            "email already taken"
        } else {
            "username or email already taken"
        };
        return RepositoryError::Conflict(conflict.to_owned());
    }
    RepositoryError::Database(e)
}

async fn fetch_by_id(
    conn: &mut SqliteConnection,
    id: UserId,
) -> Result<Option<User>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>("SELECT id, username, email FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    row.map(User::try_from).transpose()
}

async fn insert(conn: &mut SqliteConnection, user: &NewUser) -> Result<User, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(
        r"
        INSERT INTO users (username, email)
        VALUES (?, ?)
        RETURNING id, username, email
        ",
    )
    .bind(&user.username)
    .bind(&user.email)
    .fetch_one(conn)
    .await
    .map_err(map_unique_violation)?;

    User::try_from(row)
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List every user in the store's native order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT id, username, email FROM users ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id(&mut conn, id).await
    }

    /// Get a user by their username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row =
            sqlx::query_as::<_, UserRow>("SELECT id, username, email FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a single user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, user).await
    }

    /// Create many users in one transaction.
    ///
    /// Entries whose username or email collides with an existing user, or
    /// with an entry inserted earlier in the same batch, are skipped. The
    /// returned users keep the input order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails; nothing
    /// is persisted in that case.
    pub async fn create_many(&self, users: &[NewUser]) -> Result<Vec<User>, RepositoryError> {
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;
        let mut created = Vec::with_capacity(users.len());

        for user in users {
            let taken = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM users WHERE username = ? OR email = ?",
            )
            .bind(&user.username)
            .bind(&user.email)
            .fetch_one(&mut *tx)
            .await?;

            if taken > 0 {
                tracing::debug!(username = %user.username, "Skipping duplicate bulk entry");
                continue;
            }

            match insert(&mut tx, user).await {
                Ok(inserted) => created.push(inserted),
                Err(RepositoryError::Conflict(reason)) => {
                    tracing::debug!(
                        username = %user.username,
                        %reason,
                        "Skipping duplicate bulk entry"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        tx.commit().await?;

        Ok(created)
    }

    /// Apply a partial update inside a transaction.
    ///
    /// Uniqueness is left to the table constraints; any failure after the
    /// user was found rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new username or email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin_with(BEGIN_WRITE).await?;

        let Some(current) = fetch_by_id(&mut tx, id).await? else {
            return Err(RepositoryError::NotFound);
        };

        if changes.is_empty() {
            tx.commit().await?;
            return Ok(current);
        }

        let updated = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET username = COALESCE(?, username),
                email = COALESCE(?, email)
            WHERE id = ?
            RETURNING id, username, email
            ",
        )
        .bind(changes.username.as_ref())
        .bind(changes.email.as_ref())
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation);

        let row = match updated {
            Ok(row) => row,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "Failed to roll back user update");
                }
                return Err(e);
            }
        };

        tx.commit().await.map_err(map_unique_violation)?;

        User::try_from(row)
    }

    /// Delete a user and return the removed record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: UserId) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "DELETE FROM users WHERE id = ? RETURNING id, username, email",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }
}
