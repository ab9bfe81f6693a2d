//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// settings - read and write typed settings stores
#[derive(Parser, Debug)]
#[command(name = "settings")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Store location (default: <config dir>/typed-settings)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Storage layout
    #[arg(long, value_enum, default_value_t = BackendChoice::Files, global = true)]
    pub backend: BackendChoice,

    /// Log store activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendChoice {
    /// One file per key
    Files,
    /// A single settings.json document
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value stored at KEY
    Get {
        key: String,

        #[arg(long = "type", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,

        /// Printed when KEY is absent or unreadable as the type
        #[arg(long)]
        default: Option<String>,
    },

    /// Store VALUE at KEY
    Set {
        key: String,

        value: String,

        #[arg(long = "type", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,
    },

    /// Delete KEY
    Remove { key: String },

    /// List stored keys with their stored form
    List,
}

/// The value types the command line can read and write.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValueType {
    String,
    Bool,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    Float,
    Double,
    Decimal,
    Guid,
    Uri,
    /// UTC date-time (RFC 3339 or the stored tagged form)
    Datetime,
    /// Any JSON document
    Json,
}
