//! Translate command - materialize a file into a typed table.

use std::path::PathBuf;

use colored::Colorize;
use rowcast::{IngestConfig, Ingester, TranslationConfig};

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: PathBuf,
    strict: bool,
    max_rows: Option<usize>,
    no_header: bool,
    date_format: Option<String>,
    config: Option<PathBuf>,
    save_config: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    println!(
        "{} {}",
        "Translating".cyan().bold(),
        file.display().to_string().white()
    );

    let mut cursor = super::open_cursor(&file, no_header)?;

    let ingester = Ingester::with_config(IngestConfig {
        fault_tolerant: !strict,
        date_format,
        max_rows,
        ..IngestConfig::default()
    });

    let result = match config {
        Some(path) => {
            let loaded = TranslationConfig::load(&path)?;
            ingester.ingest_with(&mut cursor, &loaded)?
        }
        None => ingester.ingest(&mut cursor)?,
    };

    if verbose {
        println!();
        println!("{}", "Attributes:".yellow().bold());
        for attr in result.table.attributes() {
            let dictionary = attr
                .dictionary()
                .map(|d| format!(" ({} values)", d.len()))
                .unwrap_or_default();
            println!(
                "  {:24} {:12}{}",
                attr.name,
                format!("{:?}", attr.value_type).to_lowercase(),
                dictionary
            );
        }
        println!();
    }

    println!(
        "Materialized {} rows x {} attributes",
        result.table.row_count().to_string().white().bold(),
        result.table.attribute_count().to_string().white().bold()
    );

    if !result.table.is_complete() {
        println!("{}", "Run was stopped early; table is partial.".yellow());
    }
    if result.skipped_rows > 0 {
        println!(
            "{} {} malformed rows skipped",
            "!".yellow().bold(),
            result.skipped_rows
        );
    }

    let warning_total = result.warnings.len() + result.suppressed_warnings;
    if warning_total > 0 {
        println!(
            "{} {} cells could not be converted and were recorded as missing",
            "!".yellow().bold(),
            warning_total.to_string().yellow()
        );
        let shown = if verbose { result.warnings.len() } else { 5 };
        for warning in result.warnings.iter().take(shown) {
            println!(
                "    row {} col {}: {} ({:?})",
                warning.row, warning.column, warning.value, warning.code
            );
        }
        if warning_total > shown {
            println!("    ... and {} more", warning_total - shown);
        }
    } else {
        println!("{}", "All cells converted cleanly.".green());
    }

    if let Some(path) = save_config {
        result.config.save(&path)?;
        println!(
            "{} {}",
            "Saved configuration to".green().bold(),
            path.display().to_string().white()
        );
    }

    Ok(())
}
