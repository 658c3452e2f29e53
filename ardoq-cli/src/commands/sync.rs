//! `ardoq sync`: apply a manifest to its workspace.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use ardoq_core::Entity;
use ardoq_sync::{pipeline, Counts, PipelineResult, Report, UpsertAction};

/// Arguments for `ardoq sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Manifest describing the desired components and references.
    pub manifest: PathBuf,

    /// Report what would change without creating, updating or deleting anything.
    #[arg(long)]
    pub simulate: bool,

    /// Emit the change report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let manifest = super::load_manifest(&self.manifest)?;
        let mut orchestrator = super::connect(self.simulate)?;

        let result = pipeline::run(&mut orchestrator, &manifest)
            .with_context(|| format!("sync failed for workspace '{}'", manifest.workspace))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&result.report)
                    .context("failed to serialize report JSON")?
            );
            return Ok(());
        }

        print_entities(&result);
        print_report(&result.report);
        Ok(())
    }
}

#[derive(Tabled)]
struct CountsRow {
    #[tabled(rename = "kind")]
    kind: &'static str,
    #[tabled(rename = "new")]
    new: u64,
    #[tabled(rename = "updated")]
    updated: u64,
    #[tabled(rename = "deleted")]
    deleted: u64,
    #[tabled(rename = "cache hit")]
    cache_hit: u64,
}

impl CountsRow {
    fn new(kind: &'static str, counts: &Counts) -> Self {
        Self {
            kind,
            new: counts.new,
            updated: counts.updated,
            deleted: counts.deleted,
            cache_hit: counts.cache_hit,
        }
    }
}

fn print_entities(result: &PipelineResult) {
    for c in &result.components {
        println!("  {} component '{}'", marker(&c.action), c.entity.name);
    }
    for r in &result.references {
        println!("  {} reference {}", marker(&r.action), r.entity.label());
    }
}

fn print_report(report: &Report) {
    let prefix = if report.simulate { "[simulate] " } else { "" };
    if report.has_changes() {
        println!("{prefix}{}", "✓ sync complete".green().bold());
    } else {
        println!("{prefix}{}", "✓ nothing to do".green());
    }

    let rows = vec![
        CountsRow::new("components", &report.components),
        CountsRow::new("references", &report.references),
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for summary in &report.new_components {
        println!(
            "  {} {} ({}) {}",
            "+".green(),
            summary.name,
            summary.type_id,
            summary.id.to_string().bright_black()
        );
    }
}

fn marker(action: &UpsertAction) -> String {
    match action {
        UpsertAction::Created => "+".green().bold().to_string(),
        UpsertAction::WouldCreate => "+".green().to_string(),
        UpsertAction::Updated { .. } => "✎".yellow().bold().to_string(),
        UpsertAction::WouldUpdate { .. } => "~".yellow().to_string(),
        UpsertAction::Unchanged => "·".bright_black().to_string(),
    }
}
