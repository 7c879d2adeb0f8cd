//! Output formatting for the CLI.

use crate::error::Result;
use crate::settings::OutputFormat;
use colored::*;
use logrotor_domain::ScriptKind;
use logrotor_engine::{EntryPolicy, RotationMetrics};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format resolved entries.
    pub fn format_entries(&self, policies: &[EntryPolicy]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_entries_json(policies),
            OutputFormat::Table => Ok(self.format_entries_table(policies)),
        }
    }

    /// Format run metrics.
    pub fn format_metrics(&self, metrics: &RotationMetrics) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let scripts: serde_json::Map<String, serde_json::Value> = ScriptKind::ALL
                    .iter()
                    .filter_map(|kind| {
                        metrics
                            .scripts
                            .get(kind)
                            .map(|count| (kind.to_string(), serde_json::json!(count)))
                    })
                    .collect();

                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "runs": metrics.run_count,
                    "runtime_ms": metrics.total_runtime_ms,
                    "rotated": metrics.rotated,
                    "deleted": metrics.deleted,
                    "created": metrics.created,
                    "compressed": metrics.compressed,
                    "skipped": metrics.skipped,
                    "artifacts_ignored": metrics.artifacts_ignored,
                    "missing": metrics.missing,
                    "directories_skipped": metrics.directories_skipped,
                    "scripts": scripts,
                }))?)
            }
            OutputFormat::Table => Ok(metrics.summary()),
        }
    }

    fn format_entries_json(&self, policies: &[EntryPolicy]) -> Result<String> {
        let json: Vec<serde_json::Value> = policies
            .iter()
            .map(|p| {
                let scripts: serde_json::Map<String, serde_json::Value> = ScriptKind::ALL
                    .iter()
                    .filter(|kind| !p.script(**kind).is_empty())
                    .map(|kind| (kind.to_string(), serde_json::json!(p.script(*kind))))
                    .collect();

                serde_json::json!({
                    "paths": p.paths.iter().map(|path| path.display().to_string()).collect::<Vec<_>>(),
                    "rotate": p.rotate,
                    "start": p.start,
                    "compress": p.compression.as_ref().map(|c| c.extension()),
                    "scratchdir": p.scratchdir.as_ref().map(|d| d.display().to_string()),
                    "maxsize": p.maxsize.as_ref().map(|q| q.total()),
                    "maxage_seconds": p.maxage.as_ref().map(|q| q.total()),
                    "frequencies": p.frequencies.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
                    "recursive": p.recursive,
                    "create": p.create,
                    "missingok": p.missing_ok,
                    "sharedscripts": p.shared_scripts,
                    "scripts": scripts,
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json)?)
    }

    fn format_entries_table(&self, policies: &[EntryPolicy]) -> String {
        if policies.is_empty() {
            return self.colorize("No entries found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Paths", "Retention", "Compress", "Criteria", "Scripts", "Options"]);

        for p in policies {
            let paths = p
                .paths
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join("\n");

            let retention = match p.rotate {
                Some(rotate) => format!("{} from .{:0width$}", rotate, p.start, width = p.naming.width()),
                None => "delete".to_string(),
            };

            let compress = p
                .compression
                .as_ref()
                .map(|c| c.extension().to_string())
                .unwrap_or_else(|| "-".to_string());

            let mut criteria = Vec::new();
            if let Some(q) = &p.maxsize {
                criteria.push(format!("size > {}", q));
            }
            if let Some(q) = &p.maxage {
                criteria.push(format!("age > {}", q));
            }
            criteria.extend(p.frequencies.iter().map(|f| f.as_str().to_string()));

            let scripts: Vec<String> = ScriptKind::ALL
                .iter()
                .filter(|kind| !p.script(**kind).is_empty())
                .map(|kind| format!("{} ({})", kind, p.script(*kind).len()))
                .collect();

            let mut options = Vec::new();
            if p.recursive {
                options.push("recursive");
            }
            if p.create {
                options.push("create");
            }
            if !p.missing_ok {
                options.push("nomissingok");
            }
            if p.shared_scripts {
                options.push("sharedscripts");
            }

            builder.push_record([
                paths,
                retention,
                compress,
                or_dash(criteria.join("\n")),
                or_dash(scripts.join("\n")),
                or_dash(options.join(" ")),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn or_dash(text: String) -> String {
    if text.is_empty() {
        "-".to_string()
    } else {
        text
    }
}
