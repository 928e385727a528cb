mod api;
mod auth_provider;
mod config;
mod errors;
mod session;
mod views;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::auth_provider::AuthProvider;
use crate::config::CliConfig;
use crate::errors::ClientError;
use crate::session::{SessionContext, SessionFile};

/// Exit code for failures worth retrying shortly (sysexits EX_TEMPFAIL).
const EXIT_TEMPFAIL: u8 = 75;

#[derive(Parser)]
#[command(name = "skillsync", version, about = "Map your coursework onto a career path")]
struct Cli {
    /// Session file location (defaults to the user config directory)
    #[arg(long, env = "SKILLSYNC_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with Google through the auth provider
    SignIn {
        /// Callback URL from the browser; prompted for when omitted
        #[arg(long)]
        callback: Option<String>,
    },
    /// Sign out and forget the stored session
    SignOut,
    /// Show the signed-in user
    Whoami,
    /// List the career paths coursework can be mapped to
    Careers,
    /// Analyze coursework and store the result as your profile
    Analyze {
        /// Target career path, e.g. "Data Analyst"
        #[arg(long)]
        career: Option<String>,
        /// Coursework text
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Plain-text (.txt) file with coursework
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show your latest profile, or a shared one by id
    Profile {
        #[arg(long)]
        id: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            let retryable = e
                .downcast_ref::<ClientError>()
                .is_some_and(ClientError::is_rate_limited);
            if retryable {
                ExitCode::from(EXIT_TEMPFAIL)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    if let Command::Careers = cli.command {
        return Ok(views::dashboard::careers());
    }

    let config = CliConfig::from_env()?;
    let session_file = match cli.session_file {
        Some(path) => SessionFile::new(path),
        None => SessionFile::default_location()
            .context("Cannot determine a config directory for the session file")?,
    };

    let ctx = SessionContext::new(session_file.load()?);
    let mut changes = ctx.subscribe();

    let provider = AuthProvider::new(config.auth_url.clone(), config.anon_key.clone());
    let api = ApiClient::new(config.api_url.clone());

    let result = match cli.command {
        Command::SignIn { callback } => {
            views::auth::sign_in(&ctx, &provider, &config.redirect_url, callback).await
        }
        Command::SignOut => Ok(views::auth::sign_out(&ctx, &provider).await),
        Command::Whoami => views::auth::whoami(&ctx),
        Command::Careers => Ok(views::dashboard::careers()),
        Command::Analyze { career, text, file } => {
            async {
                let coursework = views::dashboard::read_coursework(text, file.as_deref())?;
                views::dashboard::analyze(&ctx, &provider, &api, coursework, career.as_deref())
                    .await
            }
            .await
        }
        Command::Profile { id } => views::profile::show(&ctx, &provider, &api, id).await,
    };

    // Persist sign-in, refresh and sign-out even when the command itself failed.
    session_file
        .persist_pending(&mut changes)
        .with_context(|| format!("Failed to update {}", session_file.path().display()))?;

    Ok(result?)
}
