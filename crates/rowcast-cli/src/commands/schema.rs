//! Schema command - probe a file and print its synthesized schema.

use std::path::PathBuf;

use colored::Colorize;
use rowcast::{IngestConfig, Ingester, SetRelation, ValueDomain};

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: PathBuf,
    probe: usize,
    max_values: usize,
    no_header: bool,
    date_format: Option<String>,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut cursor = super::open_cursor(&file, no_header)?;
    let metadata = cursor.metadata().clone();

    let ingester = Ingester::with_config(IngestConfig {
        probe_rows: probe,
        max_nominal_values: max_values,
        date_format,
        ..IngestConfig::default()
    });
    let summary = ingester.preview(&mut cursor)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Schema of".cyan().bold(),
        file.display().to_string().white()
    );
    if verbose {
        println!("  Format: {}", metadata.format);
        println!("  Size: {} bytes", metadata.size_bytes);
        println!("  SHA-256: {}", metadata.hash);
    }
    println!("  Rows scanned: {}", summary.example_count);
    if summary.skipped_rows > 0 {
        println!(
            "  {} {} malformed rows skipped",
            "!".yellow().bold(),
            summary.skipped_rows
        );
    }
    println!();

    for attr in &summary.attributes {
        let role = attr
            .role
            .as_deref()
            .map(|r| format!(" [{r}]"))
            .unwrap_or_default();
        println!(
            "  {:24} {:12} missing={:<8} {}",
            attr.name.white().bold(),
            format!("{:?}", attr.value_type).to_lowercase(),
            attr.missing,
            format_domain(attr.relation, &attr.domain),
        );
    }

    if !summary.example_count.exact {
        println!();
        println!(
            "{}",
            format!(
                "Preview bounded to {probe} rows; value sets and counts are lower bounds."
            )
            .yellow()
        );
    }

    Ok(())
}

fn format_domain(relation: SetRelation, domain: &ValueDomain) -> String {
    let marker = match relation {
        SetRelation::Equal => "=",
        SetRelation::Superset => "⊇",
        SetRelation::Subset => "⊆",
        SetRelation::Unknown => "?",
    };
    match domain {
        ValueDomain::Empty => "(no values)".to_string(),
        ValueDomain::Range { min, max } => format!("{marker} [{min} .. {max}]"),
        ValueDomain::Values { values } => {
            let mut shown: Vec<&str> = values.iter().take(5).map(String::as_str).collect();
            let more = values.len().saturating_sub(shown.len());
            if more > 0 {
                shown.push("...");
            }
            format!("{marker} {{{}}} ({} values)", shown.join(", "), values.len())
        }
    }
}
