use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "recdiff",
    about = "Field-level change descriptions between two versions of a record",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two JSON records of the same type
    Compare(CompareArgs),
    /// List the comparable fields of a type
    Fields(FieldsArgs),
    /// Check that every type a schema references is declared
    Check(CheckArgs),
}

#[derive(Args)]
pub struct CompareArgs {
    /// TOML schema file
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Type of the compared records
    #[arg(short = 't', long = "type")]
    pub type_name: String,
    /// TOML diff configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Old version (JSON; `null` for an absent record)
    pub old: PathBuf,
    /// New version (JSON; `null` for an absent record)
    pub new: PathBuf,
}

#[derive(Args)]
pub struct FieldsArgs {
    #[arg(short, long)]
    pub schema: PathBuf,
    #[arg(short = 't', long = "type")]
    pub type_name: String,
}

#[derive(Args)]
pub struct CheckArgs {
    #[arg(short, long)]
    pub schema: PathBuf,
}
