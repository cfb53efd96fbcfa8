pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "leadgate",
    about = "Leadgate operator CLI",
    long_about = "Classify lead files, route role-bound queries, and inspect the audit trail.",
    after_help = "Examples:\n  leadgate classify\n  leadgate ask --role BUYER \"tell me about the emi options\"\n  leadgate lookup 9999999999\n  leadgate doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Classify every lead in the configured input file and write the enriched output"
    )]
    Classify {
        #[arg(long, help = "Input CSV path (overrides config)")]
        input: Option<PathBuf>,
        #[arg(long, help = "Output CSV path (overrides config)")]
        output: Option<PathBuf>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Route a query to the knowledge agent for a role or a known phone number")]
    Ask {
        #[arg(long, help = "Role tag to route to, e.g. BUYER")]
        role: Option<String>,
        #[arg(long, help = "Resolve the role from a previously classified phone number")]
        phone: Option<String>,
        #[arg(help = "Query text")]
        query: String,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print the role recorded for a phone number")]
    Lookup {
        #[arg(help = "Phone number to look up")]
        phone: String,
    },
    #[command(about = "Record a reported role mismatch for a phone number")]
    ReportMismatch {
        #[arg(help = "Phone number the mismatch was reported for")]
        phone: String,
    },
    #[command(about = "Inspect effective configuration values with secret redaction")]
    Config,
    #[command(about = "Validate config, rule and profile tables, and the audit store")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Classify { input, output, json } => commands::classify::run(input, output, json),
        Command::Ask { role, phone, query, json } => {
            commands::ask::run(role.as_deref(), phone.as_deref(), &query, json)
        }
        Command::Lookup { phone } => commands::lookup::run(&phone),
        Command::ReportMismatch { phone } => commands::report_mismatch::run(&phone),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
