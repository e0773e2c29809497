use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use recdiff_engine::{ChangeRecord, ChangeSet, DiffConfig, Differ};
use recdiff_schema::{SchemaRegistry, TypeSchema};
use serde_json::Value;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Compare(args) => cmd_compare(args, &cli.format),
        Command::Fields(args) => cmd_fields(args, &cli.format),
        Command::Check(args) => cmd_check(args),
    }
}

fn cmd_compare(args: CompareArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let changes = compare_files(&args)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&changes)?),
        OutputFormat::Text if changes.is_empty() => println!("No changes."),
        OutputFormat::Text => {
            for record in &changes {
                let marker = match record {
                    ChangeRecord::Modified { .. } => "~".yellow(),
                    ChangeRecord::Added { .. } => "+".green(),
                    ChangeRecord::Removed { .. } => "-".red(),
                };
                println!("{} {}", marker, record.render(changes.locale));
            }
            println!(
                "\n{} modified, {} added, {} removed",
                changes.modifications().to_string().bold(),
                changes.additions().to_string().bold(),
                changes.removals().to_string().bold()
            );
        }
    }
    Ok(())
}

fn cmd_fields(args: FieldsArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let registry = load_registry(&args.schema)?;
    let Some(schema) = registry.get(&args.type_name) else {
        bail!("type {} is not declared in {}", args.type_name, args.schema.display());
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(schema.fields())?),
        OutputFormat::Text => {
            println!("{} ({} fields)", schema.name.bold(), schema.fields().len());
            for row in field_rows(schema) {
                println!("  {row}");
            }
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let registry = load_registry(&args.schema)?;
    let problems = registry.unresolved_references();
    if problems.is_empty() {
        println!(
            "{} {} types, all references resolved",
            "✓".green().bold(),
            registry.len()
        );
        return Ok(());
    }
    for problem in &problems {
        println!("  {} {}", "✗".red(), problem);
    }
    bail!("{} unresolved type references", problems.len())
}

/// Load both records and compare them.
pub(crate) fn compare_files(args: &CompareArgs) -> anyhow::Result<ChangeSet> {
    let registry = load_registry(&args.schema)?;
    if !registry.contains(&args.type_name) {
        bail!("type {} is not declared in {}", args.type_name, args.schema.display());
    }
    let config = load_config(args.config.as_deref())?;
    let old = read_json(&args.old)?;
    let new = read_json(&args.new)?;

    tracing::debug!(type_name = %args.type_name, "comparing files");
    Differ::new(registry)
        .with_config(config)
        .compare(&args.type_name, &old, &new)
        .with_context(|| {
            format!(
                "comparing {} with {}",
                args.old.display(),
                args.new.display()
            )
        })
}

fn load_registry(path: &Path) -> anyhow::Result<SchemaRegistry> {
    SchemaRegistry::from_toml_file(path)
        .with_context(|| format!("loading schema {}", path.display()))
}

pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<DiffConfig> {
    let Some(path) = path else {
        return Ok(DiffConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn field_rows(schema: &TypeSchema) -> Vec<String> {
    schema
        .fields()
        .iter()
        .map(|f| {
            let mut row = format!("{:<16} {:<20} {}", f.name, f.label, f.ty);
            if let Some(pattern) = &f.format {
                row.push_str(&format!("  format={pattern}"));
            }
            if f.identity {
                row.push_str("  [identity]");
            }
            row
        })
        .collect()
}
