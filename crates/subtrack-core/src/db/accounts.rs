//! Account operations

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rusqlite::{params, ErrorCode, OptionalExtension, Row};
use tracing::{debug, info};

use super::{conversion_error, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Account;

fn row_to_account(row: &Row) -> rusqlite::Result<Account> {
    let created_at_str: String = row.get(2)?;
    let created_at = parse_datetime(&created_at_str)
        .map_err(|e| conversion_error(2, rusqlite::types::Type::Text, e))?;

    Ok(Account {
        id: row.get(0)?,
        email: row.get(1)?,
        created_at,
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

impl Database {
    /// Create an account, returning its ID
    ///
    /// Emails are compared case-insensitively; a second account with the
    /// same email fails with `Error::AlreadyExists`.
    pub fn create_account(&self, email: &str, password: &str) -> Result<i64> {
        let email = normalize_email(email);
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(Error::InvalidData(format!("Invalid email: {}", email))),
        }
        if password.is_empty() {
            return Err(Error::InvalidData("Password is required".to_string()));
        }

        let password_hash = hash_password(password)?;

        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO accounts (email, password_hash) VALUES (?, ?)",
            params![email, password_hash],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(Error::AlreadyExists(format!("Account {}", email)));
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        info!(id, email = %email, "Created account");
        Ok(id)
    }

    /// Get an account by ID
    pub fn get_account(&self, id: i64) -> Result<Option<Account>> {
        let conn = self.conn()?;
        let account = conn
            .query_row(
                "SELECT id, email, created_at FROM accounts WHERE id = ?",
                params![id],
                row_to_account,
            )
            .optional()?;
        Ok(account)
    }

    /// Get an account by email (case-insensitive)
    pub fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let conn = self.conn()?;
        let account = conn
            .query_row(
                "SELECT id, email, created_at FROM accounts WHERE email = ?",
                params![normalize_email(email)],
                row_to_account,
            )
            .optional()?;
        Ok(account)
    }

    /// Check a login, returning the account when the password matches
    ///
    /// An unknown email and a wrong password both give `Ok(None)`.
    pub fn verify_login(&self, email: &str, password: &str) -> Result<Option<Account>> {
        let email = normalize_email(email);
        let conn = self.conn()?;
        let stored: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, password_hash FROM accounts WHERE email = ?",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((id, password_hash)) = stored else {
            debug!(email = %email, "Login for unknown email");
            return Ok(None);
        };

        let parsed =
            PasswordHash::new(&password_hash).map_err(|e| Error::PasswordHash(e.to_string()))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            debug!(id, "Login rejected");
            return Ok(None);
        }

        self.get_account(id)
    }
}
