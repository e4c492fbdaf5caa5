//! Common utilities for output formatters

use log::error;
use serde::Serialize;

/// Escape a value for CSV output (RFC 4180)
pub fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Join fields into one escaped CSV line
pub fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_csv(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize JSON output: {}", e),
    }
}

pub fn print_yaml<T: Serialize + ?Sized>(value: &T) {
    match serde_yml::to_string(value) {
        Ok(yaml) => print!("{}", yaml),
        Err(e) => error!("Failed to serialize YAML output: {}", e),
    }
}

/// Show only the last four characters of a secret
pub fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        Some(s) if s.is_empty() => "<not set>".to_string(),
        Some(s) if s.chars().count() > 4 => {
            let tail: String = s.chars().skip(s.chars().count() - 4).collect();
            format!("****{}", tail)
        }
        Some(_) => "****".to_string(),
        None => "<not set>".to_string(),
    }
}

/// Rows that can be written as CSV (stdout or report file)
pub trait CsvRecord {
    fn csv_header() -> &'static [&'static str];
    fn csv_fields(&self) -> Vec<String>;
}

/// Print records as CSV to stdout
pub fn print_csv<R: CsvRecord>(records: &[R], no_header: bool) {
    if !no_header {
        println!("{}", R::csv_header().join(","));
    }
    for record in records {
        println!("{}", csv_line(&record.csv_fields()));
    }
}
