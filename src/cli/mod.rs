//! CLI surface for credstore
//!
//! Exposes the repository operations as subcommands over the configured
//! database file. Intended for bootstrap and operational use; a transport
//! layer in front of the repository would call the same operations.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::user::AccessToken;
use crate::infrastructure::auth::{Argon2Hasher, JwtTokenGenerator, TokenConfig};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::user::{open_database, UserRepository};

/// credstore - durable credential and session storage
#[derive(Parser)]
#[command(name = "credstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register the initial user (fails once any user exists)
    Register { username: String, password: String },

    /// Log in and print a new access token
    Login { username: String, password: String },

    /// Validate an access token and print the username it belongs to
    Check { token: String },

    /// Close the session behind an access token
    Logout { token: String },

    /// Print the number of registered users
    Count,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let db = Arc::new(open_database(&config.database.path)?);
    let repository = UserRepository::new(
        db,
        Arc::new(Argon2Hasher::new()),
        Arc::new(JwtTokenGenerator::new(TokenConfig::new(
            &config.token.secret,
            config.token.expiration_hours,
        ))),
    )?;

    match cli.command {
        Command::Register { username, password } => {
            repository.register_initial(&username, &password)?;
            println!("registered {}", username);
        }
        Command::Login { username, password } => {
            let token = repository.login(&username, &password)?;
            println!("{}", token);
        }
        Command::Check { token } => {
            let view = repository.check_access_token(&AccessToken::new(token))?;
            println!("{}", view.username());
        }
        Command::Logout { token } => {
            repository.logout(&AccessToken::new(token))?;
            println!("logged out");
        }
        Command::Count => {
            println!("{}", repository.count()?);
        }
    }

    Ok(())
}
