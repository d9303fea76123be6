//! Doctor command - environment health check

use crate::context::Context;
use crate::output::print_json;
use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use docfill_convert::resolve_soffice;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Doctor command JSON output schema
#[derive(Debug, Serialize, Deserialize)]
struct DoctorOutput {
    schema_version: String,
    config_path: Option<String>,
    timestamp: String,
    checks: Vec<Check>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Check {
    id: String,
    name: String,
    status: CheckStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl Check {
    fn new(id: &str, name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status,
            message: message.into(),
            details: None,
        }
    }

    fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.into());
        self
    }
}

/// Run environment health check
///
/// Catalog and converter are only checked when the configuration loaded.
///
/// # Returns
///
/// Always returns Ok(()) - doctor command always exits 0
pub fn run(ctx: Result<&Context, String>, json: bool) -> Result<()> {
    let mut checks = Vec::new();

    let config_path = match &ctx {
        Ok(ctx) => {
            let path = ctx.config_path.as_ref().map(|p| p.display().to_string());
            let message = match &path {
                Some(path) => format!("{} is valid", path),
                None => "no docfill.toml found, using defaults".to_string(),
            };
            checks.push(Check::new(
                "config_valid",
                "Configuration file",
                CheckStatus::Ok,
                message,
            ));
            path
        }
        Err(e) => {
            checks.push(Check::new(
                "config_valid",
                "Configuration file",
                CheckStatus::Error,
                format!("Failed to load config: {}", e),
            ));
            None
        }
    };

    if let Ok(ctx) = &ctx {
        checks.push(check_catalog(ctx));
        checks.push(check_converter(ctx));
    }

    let output = DoctorOutput {
        schema_version: "1.0".to_string(),
        config_path,
        timestamp: Utc::now().to_rfc3339(),
        checks,
    };

    if json {
        print_json(&serde_json::to_string_pretty(&output)?)?;
    } else {
        print_human_readable(&output);
    }

    Ok(())
}

fn check_catalog(ctx: &Context) -> Check {
    let store = ctx.catalog();
    let root = store.root().display().to_string();

    if !store.index_path().exists() {
        return Check::new(
            "catalog_readable",
            "Template catalog",
            CheckStatus::Warning,
            "catalog is empty (no catalog.json yet)",
        )
        .detail("root", root);
    }

    match store.check() {
        Ok(count) => Check::new(
            "catalog_readable",
            "Template catalog",
            CheckStatus::Ok,
            format!("{} template(s) indexed", count),
        )
        .detail("root", root)
        .detail("templates", count),
        Err(e) => Check::new(
            "catalog_readable",
            "Template catalog",
            CheckStatus::Error,
            e.to_string(),
        )
        .detail("root", root),
    }
}

fn check_converter(ctx: &Context) -> Check {
    match resolve_soffice(ctx.config.converter.soffice.as_deref()) {
        Ok(info) => {
            let version = info.version();
            let message = match &version {
                Some(version) => format!("{} available", version),
                None => "soffice found, but did not report a version".to_string(),
            };
            let status = if version.is_some() {
                CheckStatus::Ok
            } else {
                CheckStatus::Warning
            };
            Check::new("converter_available", "PDF converter", status, message)
                .detail("path", info.path.display().to_string())
                .detail("source", info.source.to_string())
                .detail("timeout_secs", ctx.config.converter.timeout_secs)
                .detail("max_concurrency", ctx.config.converter.max_concurrency)
        }
        Err(e) => Check::new(
            "converter_available",
            "PDF converter",
            CheckStatus::Error,
            e.to_string(),
        ),
    }
}

/// Print human-readable output
fn print_human_readable(output: &DoctorOutput) {
    println!("{}", "Environment Health Check".bold());
    println!();

    if let Some(path) = &output.config_path {
        println!("{} {}", "Config:".bold(), path);
        println!();
    }

    println!("{}", "Checks:".bold());
    for check in &output.checks {
        let status_str = match check.status {
            CheckStatus::Ok => "✓".green(),
            CheckStatus::Warning => "⚠".yellow(),
            CheckStatus::Error => "✗".red(),
        };

        println!("  {} {}: {}", status_str, check.name.bold(), check.message);

        if let Some(details) = &check.details {
            for (key, value) in details {
                println!("      {}: {}", key, value);
            }
        }
    }

    println!();
    println!("Timestamp: {}", output.timestamp);
}
