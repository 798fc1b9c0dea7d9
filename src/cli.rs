use clap::{Parser, Subcommand};

/// Beleza Dojo — admin dashboard for QR access control and member retention
#[derive(Parser)]
#[command(name = "dojo-admin", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard server
    Serve {
        /// Port to bind
        #[arg(short, long, env = "DOJO_PORT", default_value = "8080")]
        port: u16,
    },

    /// Manage the rotating access token
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Record access log entries
    Access {
        #[command(subcommand)]
        command: AccessCommands,
    },

    /// Run retention reports
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Mint and persist a fresh access token, printing its access URL
    Rotate,
}

#[derive(Subcommand)]
pub enum AccessCommands {
    /// Record a pre-authorized manual guest entry
    Guest,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// List active members absent for over a week
    Absences {
        /// Filter by name or email
        #[arg(long, default_value = "")]
        search: String,
    },
}
