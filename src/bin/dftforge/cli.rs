use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dftforge",
    about = "Assemble machine-learning training examples from DFT outputs",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build one training example and write it as JSON
    #[command(visible_alias = "a")]
    Assemble(AssembleArgs),

    /// Build one example and dump predictions and density as cube files
    #[command(visible_alias = "c")]
    Cube(CubeArgs),
}

/// Configuration and file options shared by all commands.
#[derive(Args)]
pub struct InputOptions {
    /// Functional parameters (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// File map (TOML table of role = path, including `code`)
    #[arg(short, long, value_name = "FILE")]
    pub files: Option<PathBuf>,

    /// Register a file role, repeatable; overrides the file map
    #[arg(
        long = "file",
        value_name = "ROLE=PATH",
        value_parser = parse_role,
        action = clap::ArgAction::Append
    )]
    pub roles: Vec<(String, String)>,

    /// DFT code of the inputs (vasp, qe, fhiaims, prophet)
    #[arg(long, value_name = "CODE")]
    pub code: Option<String>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct AssembleArgs {
    #[command(flatten)]
    pub input: InputOptions,

    /// Output JSON file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CubeArgs {
    #[command(flatten)]
    pub input: InputOptions,

    /// Model predictions, whitespace-separated real numbers
    #[arg(short, long, value_name = "FILE")]
    pub predictions: PathBuf,

    /// Output base path; writes BASE.out.cube and BASE.in.cube
    #[arg(short, long, value_name = "BASE")]
    pub base: PathBuf,
}

fn parse_role(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((role, path)) if !role.is_empty() && !path.is_empty() => {
            Ok((role.to_string(), path.to_string()))
        }
        _ => Err(format!("expected ROLE=PATH, got '{s}'")),
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
