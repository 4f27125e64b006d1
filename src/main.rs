//! `signet` - inspect and mint signed session cookies.
//!
//! Copyright (C) 2026 Maverick
//! SPDX-License-Identifier: AGPL-3.0-only
//!
//! Loads configuration, sets up logging, and encodes or decodes a single
//! cookie token with the configured secret.

use clap::{Parser, Subcommand};
use serde_json::Value;
use signet::{Config, SecureCookieCodec};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "signet", version, about = "Signed session cookie tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign a JSON value and print the cookie token.
    Encode {
        /// Cookie name the token is bound to. Defaults to the configured name.
        #[arg(long)]
        name: Option<String>,
        /// JSON value to sign.
        value: String,
    },
    /// Validate a cookie token and print its JSON value.
    Decode {
        #[arg(long)]
        name: Option<String>,
        /// Reject tokens older than this many seconds. Defaults to the
        /// configured session max age.
        #[arg(long)]
        max_age: Option<u64>,
        token: String,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(non_blocking);

    if log_format.eq_ignore_ascii_case("pretty") {
        subscriber.init();
    } else {
        subscriber.json().init();
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(
        cookie_name = %config.cookie_name,
        default_backend = %config.default_backend,
        session_max_age = ?config.session_max_age,
        log_format = %config.log_format,
        "Configuration loaded"
    );

    let codec = SecureCookieCodec::new(&config.secret_key);

    match cli.command {
        Command::Encode { name, value } => {
            let name = name.unwrap_or_else(|| config.cookie_name.clone());
            let value: Value = match serde_json::from_str(&value) {
                Ok(value) => value,
                Err(e) => {
                    error!(error = %e, "Value is not valid JSON");
                    return ExitCode::FAILURE;
                }
            };
            match codec.encode(&name, &value) {
                Ok(token) => {
                    println!("{token}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(error = %e, "Failed to encode value");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Decode {
            name,
            max_age,
            token,
        } => {
            let name = name.unwrap_or_else(|| config.cookie_name.clone());
            let max_age = max_age.or(config.session_max_age);
            if let Some(value) = codec.decode(&name, &token, max_age) {
                println!("{value}");
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
