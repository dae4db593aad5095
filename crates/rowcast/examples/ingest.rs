//! Example: Ingest a tabular data file into a typed table.
//!
//! Usage:
//!   cargo run --example ingest -- <file_path>

use std::env;
use std::path::Path;

use rowcast::{CsvCursor, Ingester, ValueDomain};

fn main() -> rowcast::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example ingest -- <file_path>");
        std::process::exit(1);
    }

    let file_path = &args[1];
    let path = Path::new(file_path);

    if !path.exists() {
        eprintln!("Error: File not found: {}", file_path);
        std::process::exit(1);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Rowcast Ingestion: {}", file_path);
    println!("{}", separator);
    println!();

    let mut cursor = CsvCursor::open(path)?;
    let metadata = cursor.metadata().clone();
    let ingester = Ingester::new();

    // Bounded preview before committing to a full pass.
    let summary = ingester.preview(&mut cursor)?;

    println!("## Source");
    println!("  File: {}", metadata.file);
    println!("  Format: {}", metadata.format);
    println!("  Size: {} bytes", metadata.size_bytes);
    println!();

    println!("## Preview ({} rows scanned)", summary.example_count);
    for attr in &summary.attributes {
        let domain = match &attr.domain {
            ValueDomain::Empty => "no values".to_string(),
            ValueDomain::Range { min, max } => format!("[{min} .. {max}]"),
            ValueDomain::Values { values } => format!("{} distinct values", values.len()),
        };
        println!(
            "  {:24} {:12} missing={:<8} {}",
            attr.name,
            format!("{:?}", attr.value_type).to_lowercase(),
            attr.missing,
            domain
        );
    }
    println!();

    // Full materialization.
    let result = ingester.ingest(&mut cursor)?;

    println!("## Table");
    println!("  Rows: {}", result.table.row_count());
    println!("  Attributes: {}", result.table.attribute_count());
    println!("  Complete: {}", result.table.is_complete());
    if !result.warnings.is_empty() {
        println!(
            "  Warnings: {} (first at row {}, column {})",
            result.warnings.len() + result.suppressed_warnings,
            result.warnings[0].row,
            result.warnings[0].column
        );
    }

    Ok(())
}
