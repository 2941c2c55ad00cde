//! Operator tool for hashing passwords and minting or inspecting tokens.
//!
//! Settings come from `AUTH_*` environment variables; the signing key is
//! loaded exactly as a service would load it. Passwords are read from stdin
//! so they never appear in shell history or process listings.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]
#![expect(clippy::print_stdout, reason = "stdout is the command's output channel")]

use std::ffi::OsString;
use std::io::{self, Read};
use std::sync::Arc;

use auth_core::config::{AuthSettings, BuildMode, signing_key_from_env};
use auth_core::domain::{Email, Token, TokenService};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

/// `authctl` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "authctl",
    about = "Hash passwords and issue or verify bearer tokens",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read a password from stdin and print its PHC hash.
    HashPassword,
    /// Read a password from stdin and report policy violations.
    CheckPassword,
    /// Issue a token for an account email.
    IssueToken {
        /// Account email used as the token subject.
        #[arg(long, value_name = "email")]
        subject: String,
    },
    /// Validate a token and print its subject and expiry.
    VerifyToken {
        /// Token in compact form.
        token: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = AuthSettings::load_from_iter([OsString::from("authctl")])
        .map_err(|err| eyre!("failed to load AUTH_* settings: {err}"))?;

    match args.command {
        Command::HashPassword => hash_password(&settings),
        Command::CheckPassword => check_password(&settings),
        Command::IssueToken { subject } => issue_token(&settings, &subject),
        Command::VerifyToken { token } => verify_token(&settings, token),
    }
}

fn hash_password(settings: &AuthSettings) -> Result<()> {
    let password = read_password()?;
    let hasher = settings
        .hasher()
        .wrap_err("invalid password hashing parameters")?;
    let hash = hasher.hash(&password).wrap_err("hashing failed")?;
    println!("{}", hash.as_phc_str());
    Ok(())
}

fn check_password(settings: &AuthSettings) -> Result<()> {
    let password = read_password()?;
    match settings.policy().check(&password) {
        Ok(()) => {
            println!("ok");
            Ok(())
        }
        Err(violations) => {
            for rule in violations.rules() {
                println!("{rule}");
            }
            Err(eyre!("password does not satisfy the policy"))
        }
    }
}

fn issue_token(settings: &AuthSettings, subject: &str) -> Result<()> {
    let email = Email::parse(subject).wrap_err("invalid subject email")?;
    let token = token_service(settings)?
        .issue(&email)
        .wrap_err("failed to issue token")?;
    println!("{token}");
    Ok(())
}

fn verify_token(settings: &AuthSettings, token: String) -> Result<()> {
    let subject = token_service(settings)?
        .validate(&Token::from_wire(token))
        .wrap_err("token rejected")?;
    println!("subject={}", subject.email());
    println!("issued_at={}", subject.issued_at().to_rfc3339());
    println!("expires_at={}", subject.expires_at().to_rfc3339());
    Ok(())
}

fn token_service(settings: &AuthSettings) -> Result<TokenService> {
    let key = signing_key_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("failed to load signing key")?;
    Ok(TokenService::new(
        key,
        settings.token_ttl(),
        Arc::new(DefaultClock),
    ))
}

fn read_password() -> Result<Zeroizing<String>> {
    let mut input = Zeroizing::new(String::new());
    io::stdin()
        .read_to_string(&mut input)
        .wrap_err("failed to read password from stdin")?;
    let trimmed = input.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        return Err(eyre!("no password supplied on stdin"));
    }
    Ok(Zeroizing::new(trimmed.to_owned()))
}
