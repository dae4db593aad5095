//! Rowcast CLI - typed ingestion for tabular data.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Schema {
            file,
            probe,
            max_values,
            no_header,
            date_format,
            json,
        } => commands::schema::run(
            file,
            probe,
            max_values,
            no_header,
            date_format,
            json,
            cli.verbose,
        ),

        Commands::Translate {
            file,
            strict,
            max_rows,
            no_header,
            date_format,
            config,
            save_config,
        } => commands::translate::run(
            file,
            strict,
            max_rows,
            no_header,
            date_format,
            config,
            save_config,
            cli.verbose,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
