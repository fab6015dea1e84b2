//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use sysmod_domain::{ModelContext, ModelObject, ObjectKind, TypeRef};
use sysmod_session::Report;
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

    /// Format the result of running a command block.
    pub fn format_report(&self, report: &Report) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "flag": report.flag,
                    "messages": report.messages,
                    "warnings": report.warnings,
                    "errors": report.errors,
                    "question": report.question,
                    "diagrams": report.diagrams,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                let mut lines: Vec<String> = Vec::new();
                lines.extend(report.messages.iter().map(|m| self.success(m)));
                lines.extend(report.warnings.iter().map(|w| self.warning(w)));
                lines.extend(report.errors.iter().map(|e| self.error(e)));
                lines.extend(report.diagrams.iter().cloned());
                if lines.is_empty() && report.question.is_none() {
                    lines.push(self.info("No change"));
                }
                Ok(lines.join("\n"))
            }
            OutputFormat::Quiet => {
                let mut lines = vec![report.flag.to_string()];
                lines.extend(report.errors.iter().cloned());
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format the objects of the model, optionally only those of one kind.
    pub fn format_objects(&self, ctx: &ModelContext, kind: Option<ObjectKind>) -> Result<String> {
        let mut objects: Vec<&ModelObject> = match kind {
            Some(kind) => ctx.objects_of(kind).collect(),
            None => ctx.objects().collect(),
        };
        objects.sort_by(|a, b| (a.kind(), a.name()).cmp(&(b.kind(), b.name())));

        match self.format {
            OutputFormat::Json => self.format_objects_json(ctx, &objects),
            OutputFormat::Table => self.format_objects_table(ctx, &objects),
            OutputFormat::Quiet => Ok(objects
                .iter()
                .map(|o| o.name().to_string())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_objects_json(&self, ctx: &ModelContext, objects: &[&ModelObject]) -> Result<String> {
        let json_objects: Vec<serde_json::Value> = objects
            .iter()
            .map(|o| {
                let header = o.header();
                serde_json::json!({
                    "id": header.id.to_string(),
                    "kind": o.kind().as_str(),
                    "name": header.name,
                    "alias": header.alias,
                    "type": type_name(ctx, header.type_ref),
                    "parent": ctx.parent(header.id).map(|p| ctx.name_of(p)),
                    "description": o.description(),
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json_objects)?)
    }

    fn format_objects_table(&self, ctx: &ModelContext, objects: &[&ModelObject]) -> Result<String> {
        if objects.is_empty() {
            return Ok(self.colorize("No objects found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Kind", "Name", "Alias", "Type", "Parent"]);

        for object in objects {
            let header = object.header();
            let parent = ctx
                .parent(header.id)
                .map(|p| ctx.name_of(p))
                .unwrap_or_default();
            builder.push_record([
                header.id.short(),
                object.kind().to_string(),
                header.name.clone(),
                header.alias.clone().unwrap_or_default(),
                type_name(ctx, header.type_ref),
                parent,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        Ok(table.to_string())
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Format a confirmation question.
    pub fn question(&self, question: &str) -> String {
        self.colorize(&format!("? {} [y/N]", question), "cyan")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Declared type as shown to the user: the base kind or the Type's name.
fn type_name(ctx: &ModelContext, type_ref: TypeRef) -> String {
    match type_ref {
        TypeRef::Base(kind) => kind.to_string(),
        TypeRef::Custom(id) => ctx.name_of(id),
    }
}
