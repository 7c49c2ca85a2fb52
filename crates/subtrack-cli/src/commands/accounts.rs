//! Account command implementations

use std::io::{self, Write};

use anyhow::{Context, Result};
use subtrack_core::db::Database;
use subtrack_core::{Account, Error};

/// Environment variable holding the account password
pub const PASSWORD_ENV: &str = "SUBTRACK_PASSWORD";

/// Password from `SUBTRACK_PASSWORD`, else a line read from stdin
pub fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }

    print!("Password: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read password")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Load the account behind `--user`
pub fn require_account(db: &Database, user_id: i64) -> Result<Account> {
    db.get_account(user_id)?.with_context(|| {
        format!(
            "No account with ID {}. Create one with: subtrack register -e <email>",
            user_id
        )
    })
}

pub fn cmd_register(db: &Database, email: &str, password: &str) -> Result<i64> {
    let id = match db.create_account(email, password) {
        Ok(id) => id,
        Err(Error::AlreadyExists(_)) => {
            anyhow::bail!("An account for {} already exists", email.trim())
        }
        Err(e) => return Err(e.into()),
    };

    println!("✅ Created account {} (ID: {})", email.trim().to_lowercase(), id);
    println!("   Use --user {} with other commands", id);
    Ok(id)
}

pub fn cmd_login(db: &Database, email: &str, password: &str) -> Result<i64> {
    let account = db
        .verify_login(email, password)?
        .context("Invalid email or password")?;

    println!("✅ Logged in as {} (ID: {})", account.email, account.id);
    println!("   Use --user {} with other commands", account.id);
    Ok(account.id)
}
