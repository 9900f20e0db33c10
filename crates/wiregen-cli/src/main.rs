//! wiregen CLI - Schema compiler
//!
//! Commands:
//! - `wiregen generate` - Render target-language sources from schema files
//! - `wiregen check` - Resolve schema files and report what they define
//! - `wiregen describe` - Print the planned decisions for a schema as JSON

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wiregen_core::LogLevel;

mod check;
mod describe;
mod generate;
mod load;
mod logging;

#[derive(Parser)]
#[command(name = "wiregen")]
#[command(author, version, about = "Schema compiler for self-describing wire messages", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error, off); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate sources for one or more schema files
    Generate {
        /// Schema document (.toml or .json); repeat for several
        #[arg(short, long = "schema", required = true)]
        schemas: Vec<PathBuf>,

        /// Compiler configuration (default: ./wiregen.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Backend to run (java, json-schema); repeat for several
        #[arg(short, long = "lang")]
        langs: Vec<String>,

        /// Output root for generated files
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve schema files and report definition counts
    Check {
        /// Schema document (.toml or .json); repeat for several
        #[arg(short, long = "schema", required = true)]
        schemas: Vec<PathBuf>,
    },

    /// Print plan decisions as JSON
    Describe {
        /// Schema document (.toml or .json)
        #[arg(short, long)]
        schema: PathBuf,

        /// Only describe this message (simple or qualified name)
        #[arg(short, long)]
        message: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            schemas,
            config,
            langs,
            output,
        } => {
            let config = load::config(config.as_deref())?;
            logging::init(cli.log_level.unwrap_or(config.log_level));
            generate::run(&schemas, &config, &langs, output)?;
        }
        Commands::Check { schemas } => {
            logging::init(cli.log_level.unwrap_or(LogLevel::Info));
            check::run(&schemas)?;
        }
        Commands::Describe { schema, message } => {
            logging::init(cli.log_level.unwrap_or(LogLevel::Warn));
            describe::run(&schema, message.as_deref())?;
        }
    }

    Ok(())
}
