//! User repository for database operations.
//!
//! Provides account rows plus the password hash lookups the account
//! service needs for login. Registration inserts the user and provisions
//! their cart in one transaction.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::prelude::FromRow;

use shoplane_core::{Email, Phone, UserId};

use super::RepositoryError;
use crate::models::User;

/// Fields required to insert a new user.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a Email,
    pub phone: &'a Phone,
    pub password_hash: &'a str,
}

/// Profile fields applied by a profile update.
#[derive(Debug)]
pub struct ProfileUpdate<'a> {
    pub name: &'a str,
    pub email: &'a Email,
    pub phone: &'a Phone,
    pub address: Option<&'a str>,
    pub profile_picture: Option<&'a str>,
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    address: Option<String>,
    profile_picture: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = Phone::parse(&self.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            name: self.name,
            email,
            phone,
            address: self.address,
            profile_picture: self.profile_picture,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, name, email, phone, address, profile_picture, created_at, updated_at";

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

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored contact data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored contact data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
                .bind(email)
                .fetch_optional(self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their phone number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored contact data is invalid.
    pub async fn get_by_phone(&self, phone: &Phone) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE phone = ?"))
                .bind(phone)
                .fetch_optional(self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user and provision their empty cart in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or phone already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewUser<'_>) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (name, email, phone, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new.name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.password_hash)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        let user_id = UserId::new(result.last_insert_rowid());

        // Every account owns exactly one cart from the moment it exists.
        sqlx::query("INSERT INTO carts (user_id) VALUES (?)")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(User {
            id: user_id,
            name: new.name.to_owned(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            address: None,
            profile_picture: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user together with their password hash, by email.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<(UserRow, String)> = sqlx::query_as::<_, UserRowWithPassword>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?
        .map(UserRowWithPassword::split);

        match row {
            Some((r, hash)) => Ok(Some((r.into_user()?, hash))),
            None => Ok(None),
        }
    }

    /// Get a user together with their password hash, by phone.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_by_phone(
        &self,
        phone: &Phone,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<(UserRow, String)> = sqlx::query_as::<_, UserRowWithPassword>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE phone = ?"
        ))
        .bind(phone)
        .fetch_optional(self.pool)
        .await?
        .map(UserRowWithPassword::split);

        match row {
            Some((r, hash)) => Ok(Some((r.into_user()?, hash))),
            None => Ok(None),
        }
    }

    /// Apply a profile update to an existing user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email or phone collides.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate<'_>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users \
             SET name = ?, email = ?, phone = ?, address = ?, profile_picture = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(update.name)
        .bind(update.email)
        .bind(update.phone)
        .bind(update.address)
        .bind(update.profile_picture)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[derive(FromRow)]
struct UserRowWithPassword {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl UserRowWithPassword {
    fn split(self) -> (UserRow, String) {
        (self.user, self.password_hash)
    }
}

/// Translate sqlite unique violations on users into `Conflict` errors.
fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let message = if db_err.message().contains("users.phone") {
            "Phone number already exists"
        } else {
            "Email already exists"
        };
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
