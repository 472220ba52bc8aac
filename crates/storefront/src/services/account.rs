//! Account service.
//!
//! Registration, login, and profile updates. Passwords are stored only as
//! salted Argon2id hashes and verified against the hash; login never says
//! which of identifier or password was wrong.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use shoplane_core::{Email, Phone, UserId};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, ProfileUpdate, UserRepository};
use crate::models::User;

use super::StoreError;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Allowed display name length, after trimming.
const NAME_LENGTH: std::ops::RangeInclusive<usize> = 2..=60;

/// Account service.
///
/// Handles user registration, login, lookup, and profile updates.
pub struct AccountService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user. Their empty cart is provisioned in the same
    /// unit of work.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` if any field fails validation.
    /// Returns `StoreError::Duplicate` if the email or phone is taken.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        password: &str,
    ) -> Result<User, StoreError> {
        let name = normalize_name(name)?;
        let email = parse_email(email)?;
        let phone = parse_phone(phone)?;
        validate_password(password)?;

        // Pre-checks give precise messages; the unique constraints remain
        // the backstop for races.
        if self.users.get_by_email(&email).await?.is_some() {
            return Err(StoreError::Duplicate("Email already exists".to_owned()));
        }
        if self.users.get_by_phone(&phone).await?.is_some() {
            return Err(StoreError::Duplicate(
                "Phone number already exists".to_owned(),
            ));
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&NewUser {
                name: &name,
                email: &email,
                phone: &phone,
                password_hash: &password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => StoreError::Duplicate(msg),
                other => StoreError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Login with an email-or-phone identifier and a password.
    ///
    /// Returns `Ok(None)` on any mismatch - unknown identifier, malformed
    /// identifier, or wrong password - without distinguishing them.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the store fails.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Ok(None);
        }

        let found = if identifier.contains('@') {
            match Email::parse(identifier) {
                Ok(email) => self.users.get_with_password_by_email(&email).await?,
                Err(_) => None,
            }
        } else {
            match Phone::parse(identifier) {
                Ok(phone) => self.users.get_with_password_by_phone(&phone).await?,
                Err(_) => None,
            }
        };

        let Some((user, password_hash)) = found else {
            return Ok(None);
        };

        if verify_password(password, &password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    pub async fn find_by_id(&self, id: UserId) -> Result<User, StoreError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("User not found".to_owned()))
    }

    /// Update a user's profile.
    ///
    /// Email and phone uniqueness is re-checked only when the value actually
    /// changed, and the user's own row never counts as a collision.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` if any field fails validation.
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    /// Returns `StoreError::Duplicate` if the new email or phone is taken.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: &str,
        email: &str,
        phone: &str,
        address: Option<&str>,
        profile_picture: Option<&str>,
    ) -> Result<User, StoreError> {
        let current = self.find_by_id(id).await?;

        let name = normalize_name(name)?;
        let email = parse_email(email)?;
        let phone = parse_phone(phone)?;

        if email != current.email
            && let Some(existing) = self.users.get_by_email(&email).await?
            && existing.id != id
        {
            return Err(StoreError::Duplicate("Email already exists".to_owned()));
        }

        if phone != current.phone
            && let Some(existing) = self.users.get_by_phone(&phone).await?
            && existing.id != id
        {
            return Err(StoreError::Duplicate(
                "Phone number already exists".to_owned(),
            ));
        }

        let address = address.map(str::trim).filter(|a| !a.is_empty());
        let profile_picture = profile_picture.map(str::trim).filter(|p| !p.is_empty());

        self.users
            .update_profile(
                id,
                &ProfileUpdate {
                    name: &name,
                    email: &email,
                    phone: &phone,
                    address,
                    profile_picture,
                },
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => StoreError::NotFound("User not found".to_owned()),
                RepositoryError::Conflict(msg) => StoreError::Duplicate(msg),
                other => StoreError::Repository(other),
            })?;

        self.find_by_id(id).await
    }
}

/// Validate and trim a display name.
fn normalize_name(name: &str) -> Result<String, StoreError> {
    let trimmed = name.trim();
    if !NAME_LENGTH.contains(&trimmed.chars().count()) {
        return Err(StoreError::Validation(
            "Name must be between 2 and 60 characters".to_owned(),
        ));
    }
    Ok(trimmed.to_owned())
}

fn parse_email(email: &str) -> Result<Email, StoreError> {
    Email::parse(email).map_err(|e| StoreError::Validation(e.to_string()))
}

fn parse_phone(phone: &str) -> Result<Phone, StoreError> {
    Phone::parse(phone).map_err(|e| StoreError::Validation(e.to_string()))
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), StoreError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(StoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| StoreError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
