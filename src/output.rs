use colored::Colorize;
use serde::Serialize;

use crate::analysis::{Entity, Finding, Level, NamespaceDefinition, Occurrences, SnapshotStats, Thingy};
use crate::session::Location;

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Format output as JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

pub fn format_findings(filename: &str, findings: &[Finding], format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return format_json(findings);
    }
    if findings.is_empty() {
        return format!("{}: no findings", filename);
    }

    let mut output = String::new();
    for finding in findings {
        let level = match finding.level {
            Level::Error => finding.level.to_string().red().bold(),
            Level::Warning => finding.level.to_string().yellow(),
            Level::Info => finding.level.to_string().normal(),
        };
        let file = finding.extent.filename.as_deref().unwrap_or(filename);
        output.push_str(&format!(
            "{}:{}: {}: {} {}\n",
            file,
            finding.span().start,
            level,
            finding.message,
            format!("[{}]", finding.kind).dimmed()
        ));
    }

    let errors = findings.iter().filter(|f| f.level == Level::Error).count();
    let warnings = findings.iter().filter(|f| f.level == Level::Warning).count();
    output.push_str(&format!("errors: {}, warnings: {}", errors, warnings));
    output
}

pub fn format_thingy(thingy: Option<&Thingy>, format: OutputFormat) -> String {
    match (thingy, format) {
        (_, OutputFormat::Json) => format_json(&thingy),
        (None, OutputFormat::Human) => "Nothing here".to_string(),
        (Some(thingy), OutputFormat::Human) => format!(
            "{} {} at {}",
            thingy.kind(),
            thingy.label().bold(),
            thingy.span()
        ),
    }
}

pub fn format_occurrences(occurrences: Option<&Occurrences>, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return format_json(&occurrences);
    }
    let Some(occurrences) = occurrences else {
        return "Nothing here".to_string();
    };

    let mut output = format!(
        "{} ({} occurrences)\n",
        occurrences.id.to_string().bold(),
        occurrences.items.len()
    );
    for item in &occurrences.items {
        let marker = if item.is_definition() { "*" } else { " " };
        output.push_str(&format!("  {} {:<10} {}\n", marker, item.span().start.to_string(), item.kind()));
    }
    output
}

pub fn format_location(location: Option<&Location>, format: OutputFormat) -> String {
    match (location, format) {
        (_, OutputFormat::Json) => format_json(&location),
        (None, OutputFormat::Human) => "No definition found".to_string(),
        (Some(location), OutputFormat::Human) => match &location.filename {
            Some(file) => format!("{}:{}", file, location.span.start),
            None => location.span.start.to_string(),
        },
    }
}

pub fn format_namespaces(namespaces: &[NamespaceDefinition], format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return format_json(namespaces);
    }
    if namespaces.is_empty() {
        return "No namespaces found".to_string();
    }

    let mut output = format!("Namespaces ({}):\n", namespaces.len());
    for ns in namespaces {
        output.push_str(&format!(
            "  {}\n    {}\n",
            ns.name.bold(),
            ns.extent.filename.as_deref().unwrap_or("-")
        ));
    }
    output
}

pub fn format_stats(stats: &SnapshotStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(stats),
        OutputFormat::Human => stats.to_string(),
    }
}
