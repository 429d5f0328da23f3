//! CLI tool for clicktable - renders a table and config to an HTML page
//!
//! Usage:
//!   clicktable_cli <table.json|table.csv> <config.json>              # HTML to stdout
//!   clicktable_cli <table.json|table.csv> <config.json> -o out.html  # HTML to file
//!
//! Set `RUST_LOG=clicktable=debug` to see cells that couldn't be charted.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use clicktable::csv::{parse_delimited, Delimiter};
use clicktable::{config, render_table, ClickTableError, TableSnapshot, Theme};
use tracing_subscriber::EnvFilter;

fn load_table(path: &str, data: &[u8]) -> Result<TableSnapshot, ClickTableError> {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".csv") || lower.ends_with(".tsv") {
        return parse_delimited(data, Delimiter::from_path(path));
    }
    let table: TableSnapshot = serde_json::from_slice(data)?;
    table.validate()?;
    Ok(table)
}

fn run(table_path: &str, config_path: &str, output_path: Option<&str>) -> Result<(), ClickTableError> {
    let table = load_table(table_path, &fs::read(table_path)?)?;
    let config = config::parse_json(&fs::read_to_string(config_path)?, table.column_count())?;

    let rendered = render_table(&table, &config);
    let html = rendered.to_document(&Theme::default().css_variables(&config.max_height));

    match output_path {
        Some(path) => {
            fs::write(path, &html)?;
            eprintln!("Written: {path}");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let args: Vec<String> = env::args().collect();
    let (Some(table_path), Some(config_path)) = (args.get(1), args.get(2)) else {
        eprintln!("Usage: clicktable_cli <table.json|table.csv> <config.json> [-o output.html]");
        return ExitCode::FAILURE;
    };
    let output_path = match (args.get(3).map(String::as_str), args.get(4)) {
        (Some("-o"), Some(path)) => Some(path.as_str()),
        _ => None,
    };

    match run(table_path, config_path, output_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
