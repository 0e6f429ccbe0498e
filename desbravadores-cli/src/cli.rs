use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// desbravadores - troop agenda, achievements and roll call from the terminal
#[derive(Parser, Debug)]
#[command(name = "desbravadores")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "DESBRAVADORES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign in and persist the session token
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "DESBRAVADORES_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the persisted session
    Logout,

    /// Show the current session role
    Whoami,

    /// Month calendar with the activities of one day
    Agenda {
        #[arg(long)]
        year: Option<i32>,

        /// 1-12
        #[arg(long)]
        month: Option<u32>,

        /// Day whose activities are listed
        #[arg(long)]
        day: Option<u32>,
    },

    /// This month's tasks in date order
    Reminders,

    /// Achievement catalog with unlocked badges marked
    Achievements,

    /// Group roster (MONITOR, DIRETOR)
    Members,

    /// Submit a roll call (MONITOR)
    Chamada {
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Ids of members present, comma separated
        #[arg(long, value_delimiter = ',')]
        present: Vec<i64>,
    },
}
