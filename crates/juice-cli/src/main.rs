// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Juice CLI - lex, parse and check Juice source files.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use juice_parser::ParseOptions;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "juice")]
#[command(version)]
#[command(about = "Front end for the Juice language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize a file and print its tokens
    Lex {
        /// Path to the source file
        file: PathBuf,
    },

    /// Parse a file and print its syntax tree
    Parse {
        /// Path to the source file
        file: PathBuf,

        #[command(flatten)]
        options: ParseArgs,
    },

    /// Parse a file and report diagnostics only
    Check {
        /// Path to the source file
        file: PathBuf,

        #[command(flatten)]
        options: ParseArgs,
    },

    /// Explain an error code, or list all codes
    Explain {
        /// Error code such as E0101
        code: Option<String>,
    },
}

#[derive(Args, Clone, Debug)]
struct ParseArgs {
    /// Stop at the first error
    #[arg(long)]
    strict: bool,

    /// Maximum nesting depth before parsing stops
    #[arg(long, default_value_t = ParseOptions::default().max_depth)]
    max_depth: usize,

    /// Maximum number of errors to report
    #[arg(long, default_value_t = ParseOptions::default().max_errors)]
    max_errors: usize,

    /// Diagnostic output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

impl ParseArgs {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions::default()
            .with_strict(self.strict)
            .with_max_depth(self.max_depth)
            .with_max_errors(self.max_errors)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    Text,
    Json,
}

/// Only install a subscriber if RUST_LOG is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> Result<ExitCode> {
    init_tracing();
    output::init();

    let cli = Cli::parse();
    let ok = match cli.command {
        Commands::Lex { file } => commands::cmd_lex(&file)?,
        Commands::Parse { file, options } => {
            commands::cmd_parse(&file, &options.parse_options(), options.format, true)?
        }
        Commands::Check { file, options } => {
            commands::cmd_parse(&file, &options.parse_options(), options.format, false)?
        }
        Commands::Explain { code } => commands::cmd_explain(code.as_deref()),
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_flags_build_options() {
        let cli = Cli::try_parse_from([
            "juice", "check", "main.juice", "--strict", "--max-depth", "64", "--format", "json",
        ])
        .unwrap();
        let Commands::Check { file, options } = cli.command else { panic!("expected check") };
        assert_eq!(file, PathBuf::from("main.juice"));
        assert_eq!(options.format, Format::Json);
        let parse_options = options.parse_options();
        assert!(parse_options.strict);
        assert_eq!(parse_options.max_depth, 64);
        assert_eq!(parse_options.max_errors, ParseOptions::default().max_errors);
    }

    #[test]
    fn explain_code_is_optional() {
        let cli = Cli::try_parse_from(["juice", "explain"]).unwrap();
        assert!(matches!(cli.command, Commands::Explain { code: None }));
        assert!(Cli::try_parse_from(["juice", "parse"]).is_err());
    }
}
