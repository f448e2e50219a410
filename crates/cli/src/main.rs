//! School Portal CLI - account creation and local session management.
//!
//! # Usage
//!
//! ```bash
//! # Check the backend
//! sp-cli health
//!
//! # Create a super admin and make it the active session
//! sp-cli create-super --first-name Grace --last-name Hopper \
//!     --email grace@navy.mil --password cobol-1959
//!
//! # Create a school admin with a profile picture
//! sp-cli create-admin --first-name Ada --last-name Lovelace \
//!     --email ada@school.org --password engine-1843 \
//!     --school-name "Northwind High" --profile-image ada.png
//!
//! # Inspect and switch cached accounts
//! sp-cli whoami
//! sp-cli accounts
//! sp-cli switch ada@school.org
//! ```
//!
//! # Environment Variables
//!
//! - `SCHOOL_PORTAL_API_URL` - Backend origin (default: `http://localhost:5000`)
//! - `SCHOOL_PORTAL_STORE` - Session storage file (default: `.school-portal/storage.json`)
//! - `SCHOOL_PORTAL_TIMEOUT_SECS` - HTTP request timeout (default: 30)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "sp-cli")]
#[command(author, version, about = "School Portal CLI")]
struct Cli {
    /// Backend origin (overrides `SCHOOL_PORTAL_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session storage file (overrides `SCHOOL_PORTAL_STORE`)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend answers
    Health,
    /// Create a super admin and make it the active session
    CreateSuper {
        #[command(flatten)]
        account: commands::account::AccountArgs,
    },
    /// Create a school admin and make it the active session
    CreateAdmin {
        #[command(flatten)]
        account: commands::account::AccountArgs,

        /// School name
        #[arg(long)]
        school_name: String,

        /// School enrolment code (generated by the backend when omitted)
        #[arg(long)]
        school_code: Option<String>,

        /// Account role (`admin`, `teacher`, `student`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Profile picture to upload with the account
        #[arg(long)]
        profile_image: Option<PathBuf>,
    },
    /// Show the active account
    Whoami,
    /// List every cached account
    Accounts,
    /// Make a cached account the active one
    Switch {
        /// Account email
        email: String,
    },
    /// Open a dashboard route as the active account
    Open {
        /// Route path, e.g. `/admin/dashboard`
        path: String,
    },
    /// Update fields of the active account
    Update {
        #[command(flatten)]
        patch: commands::session::UpdateArgs,
    },
    /// End the session of an account (default: the active one), keeping its profile
    Logout {
        /// Account email
        email: Option<String>,
    },
    /// Remove every cached key of an account (default: the active one)
    Forget {
        /// Account email
        email: Option<String>,
    },
    /// Store a bearer token for an account
    Token {
        /// Account email
        email: String,
        /// Bearer token
        token: String,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sp_cli=info,school_portal_portal=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::load(cli.api_url.as_deref(), cli.store)?;

    match cli.command {
        Commands::Health => commands::account::health(&ctx).await?,
        Commands::CreateSuper { account } => {
            commands::account::create_super(&ctx, account).await?;
        }
        Commands::CreateAdmin {
            account,
            school_name,
            school_code,
            role,
            profile_image,
        } => {
            let school = commands::account::SchoolArgs {
                name: school_name,
                code: school_code,
                role,
                profile_image,
            };
            commands::account::create_admin(&ctx, account, school).await?;
        }
        Commands::Whoami => commands::session::whoami(&ctx),
        Commands::Accounts => commands::session::accounts(&ctx),
        Commands::Switch { email } => commands::session::switch(&ctx, &email)?,
        Commands::Open { path } => commands::session::open(&ctx, &path),
        Commands::Update { patch } => commands::session::update(&ctx, patch)?,
        Commands::Logout { email } => commands::session::logout(&ctx, email.as_deref())?,
        Commands::Forget { email } => commands::session::forget(&ctx, email.as_deref())?,
        Commands::Token { email, token } => commands::session::token(&ctx, &email, token)?,
    }
    Ok(())
}
