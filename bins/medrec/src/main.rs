//! medrec - command-line client for medical records
//!
//! Manages patient accounts, medical records and prescriptions against a
//! medrec backend.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod context;
mod output;

use commands::{auth, prescriptions, records};
use output::{OutputFormat, Status};

/// Medical records, prescriptions and patient accounts
#[derive(Parser)]
#[command(name = "medrec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Path to a configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true, env = "MEDREC_API_URL")]
    api_url: Option<String>,

    /// Local storage file holding the session
    #[arg(long, global = true, env = "MEDREC_STORAGE")]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Signup {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "MEDREC_PASSWORD", hide_env_values = true)]
        password: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        organization: Option<String>,

        /// Initial clinical record as JSON, or @path to a JSON file
        #[arg(long)]
        record: Option<String>,
    },

    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "MEDREC_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session
    Whoami,

    /// Manage medical records
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },

    /// Manage prescriptions (medication requests)
    Prescriptions {
        #[command(subcommand)]
        action: PrescriptionsAction,
    },
}

#[derive(Subcommand)]
enum RecordsAction {
    /// List all records
    List,

    /// Show one record
    Get { id: String },

    /// Create a record from JSON (or @path)
    Create { json: String },

    /// Update fields of a record from JSON (or @path)
    Update { id: String, json: String },

    /// Delete a record
    Delete { id: String },
}

#[derive(Subcommand)]
enum PrescriptionsAction {
    /// Search prescriptions; without a filter every prescription matches
    Search { filter: Option<String> },

    /// Show one prescription
    Get { id: String },

    /// Create a prescription from JSON (or @path)
    Create { json: String },

    /// Update fields of a prescription from JSON (or @path)
    Update { id: String, json: String },

    /// Delete a prescription
    Delete { id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = match context::AppContext::load(
        cli.config.as_deref(),
        cli.api_url.as_deref(),
        cli.storage.as_deref(),
        cli.verbose,
    ) {
        Ok(ctx) => ctx,
        Err(e) => {
            Status::error(&format!("{e:#}"));
            return ExitCode::from(context::exit_code_for(&e));
        }
    };

    let format = cli.format;
    let result = match cli.command {
        Commands::Signup {
            username,
            password,
            name,
            email,
            role,
            organization,
            record,
        } => {
            let form = auth::SignupForm {
                username,
                password,
                name,
                email,
                role,
                organization,
                record,
            };
            auth::signup(&ctx, form, format).await
        }
        Commands::Login { username, password } => {
            auth::login(&ctx, &username, &password, format).await
        }
        Commands::Logout => auth::logout(&ctx, format),
        Commands::Whoami => auth::whoami(&ctx, format),

        Commands::Records { action } => match action {
            RecordsAction::List => records::list(&ctx, format).await,
            RecordsAction::Get { id } => records::get(&ctx, &id, format).await,
            RecordsAction::Create { json } => records::create(&ctx, &json, format).await,
            RecordsAction::Update { id, json } => {
                records::update(&ctx, &id, &json, format).await
            }
            RecordsAction::Delete { id } => records::delete(&ctx, &id, format).await,
        },

        Commands::Prescriptions { action } => match action {
            PrescriptionsAction::Search { filter } => {
                prescriptions::search(&ctx, filter.as_deref(), format).await
            }
            PrescriptionsAction::Get { id } => prescriptions::get(&ctx, &id, format).await,
            PrescriptionsAction::Create { json } => {
                prescriptions::create(&ctx, &json, format).await
            }
            PrescriptionsAction::Update { id, json } => {
                prescriptions::update(&ctx, &id, &json, format).await
            }
            PrescriptionsAction::Delete { id } => {
                prescriptions::delete(&ctx, &id, format).await
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Status::error(&context::user_message(&e));
            if format == OutputFormat::Json {
                if let Some(report) = context::error_report(&e) {
                    eprintln!("{report}");
                }
            }
            if cli.verbose {
                eprintln!("{e:?}");
            }
            ExitCode::from(context::exit_code_for(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_records_update() {
        let cli = Cli::try_parse_from([
            "medrec",
            "--format",
            "json",
            "records",
            "update",
            "r1",
            r#"{"Name":"x"}"#,
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Records {
                action: RecordsAction::Update { id, json },
            } => {
                assert_eq!(id, "r1");
                assert!(json.contains("Name"));
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
