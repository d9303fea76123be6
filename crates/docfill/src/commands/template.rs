//! Template command - catalog management

use super::load_metadata;
use crate::cli::TemplateCommands;
use crate::context::Context;
use crate::output::{self, print_json, print_text};
use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use colored::Colorize;
use docfill_core::catalog::{NewTemplate, TemplateFilter, TemplateRecord, Uploader};
use docfill_core::{OutputFormat, substitute};
use std::path::Path;

pub fn run(ctx: &Context, command: TemplateCommands) -> Result<()> {
    match command {
        TemplateCommands::Add {
            file,
            name,
            kind,
            court,
            description,
            uploaded_by_id,
            uploaded_by_name,
            json,
        } => {
            let bytes =
                std::fs::read(&file).with_context(|| format!("failed to read {}", file.display()))?;
            let new = NewTemplate {
                name,
                file_name: file_name(&file)?,
                description,
                kind,
                court,
            };
            let uploader = Uploader {
                id: uploaded_by_id,
                name: uploaded_by_name,
            };

            let record = ctx.catalog().add(new, &uploader, &bytes)?;
            if json {
                print_json(&serde_json::to_string_pretty(&record)?)?;
            } else {
                println!("{} {}", "Added".green().bold(), record.id);
                print_record(&record);
            }
            Ok(())
        }
        TemplateCommands::List {
            court,
            kind,
            text,
            from,
            to,
            json,
        } => {
            let filter = TemplateFilter {
                court,
                kind,
                text,
                uploaded_from: from.as_deref().map(|s| parse_bound(s, false)).transpose()?,
                uploaded_to: to.as_deref().map(|s| parse_bound(s, true)).transpose()?,
            };

            let records = ctx.catalog().filter(&filter)?;
            if json {
                print_json(&serde_json::to_string_pretty(&records)?)?;
            } else {
                print_table(&records)?;
            }
            Ok(())
        }
        TemplateCommands::Show { id, json } => {
            let record = ctx.catalog().get(&id)?;
            if json {
                print_json(&serde_json::to_string_pretty(&record)?)?;
            } else {
                print_record(&record);
            }
            Ok(())
        }
        TemplateCommands::Remove { id } => {
            let record = ctx.catalog().remove(&id)?;
            print_text(&format!("Removed template {} ({})", record.id, record.name))?;
            Ok(())
        }
        TemplateCommands::Fill {
            id,
            metadata,
            format,
            output,
        } => {
            let output_format: OutputFormat = format.parse()?;
            if output_format == OutputFormat::Bytes && output.is_none() {
                bail!("--output is required for bytes output");
            }

            let metadata = load_metadata(&metadata)?;
            let store = ctx.catalog();
            let record = store.get(&id)?;
            let document = store.load_bytes(&record)?;

            let filled = substitute(&document, &metadata, &format)?;
            output::emit(&filled, output.as_deref())
        }
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}

/// Accept RFC 3339 timestamps or plain dates; a plain date covers the whole
/// day, so `end` picks its last instant
fn parse_bound(value: &str, end: bool) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}': expected YYYY-MM-DD or RFC 3339", value))?;
    let time = if end {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    };
    let time = time.context("invalid time of day")?;
    Ok(date.and_time(time).and_utc())
}

fn print_record(record: &TemplateRecord) {
    println!("  {}: {}", "ID".bold(), record.id);
    println!("  {}: {}", "Name".bold(), record.name);
    println!("  {}: {}", "File".bold(), record.file_name);
    if let Some(description) = &record.description {
        println!("  {}: {}", "Description".bold(), description);
    }
    println!("  {}: {}", "Kind".bold(), record.kind);
    println!("  {}: {}", "Court".bold(), record.court);
    println!("  {}: {}", "Stored at".bold(), record.storage_path);
    println!("  {}: {} bytes", "Size".bold(), record.size_bytes);
    println!("  {}: {}", "SHA-256".bold(), record.sha256);
    println!(
        "  {}: {} ({})",
        "Uploaded by".bold(),
        record.uploaded_by_name,
        record.uploaded_by_id
    );
    println!("  {}: {}", "Uploaded at".bold(), record.uploaded_at.to_rfc3339());
}

fn print_table(records: &[TemplateRecord]) -> Result<()> {
    if records.is_empty() {
        print_text("No templates found")?;
        return Ok(());
    }

    println!(
        "{:<36}  {:<30}  {:<14}  {:<20}  {}",
        "ID".bold(),
        "NAME".bold(),
        "KIND".bold(),
        "COURT".bold(),
        "UPLOADED".bold()
    );
    for record in records {
        println!(
            "{:<36}  {:<30}  {:<14}  {:<20}  {}",
            record.id,
            record.name,
            record.kind,
            record.court,
            record.uploaded_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date_bounds() {
        let start = parse_bound("2024-03-05", false).unwrap();
        let end = parse_bound("2024-03-05", true).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-05T00:00:00+00:00");
        assert_eq!(end.format("%H:%M:%S%.3f").to_string(), "23:59:59.999");
    }

    #[test]
    fn test_parse_rfc3339_bound() {
        let bound = parse_bound("2024-03-05T10:00:00-03:00", false).unwrap();
        assert_eq!(bound.to_rfc3339(), "2024-03-05T13:00:00+00:00");
    }

    #[test]
    fn test_parse_invalid_bound() {
        assert!(parse_bound("05/03/2024", false).is_err());
    }
}
