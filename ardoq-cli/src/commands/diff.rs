//! `ardoq diff <manifest>`: show which attributes a sync would change.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use ardoq_core::Entity;
use ardoq_sync::{pipeline, UpsertAction};

/// Arguments for `ardoq diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Manifest to compare against the remote workspace.
    pub manifest: PathBuf,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let manifest = super::load_manifest(&self.manifest)?;
        let mut orchestrator = super::connect(true)?;

        let result = pipeline::run(&mut orchestrator, &manifest)
            .with_context(|| format!("diff failed for workspace '{}'", manifest.workspace))?;

        if !result.has_changes() {
            println!("No differences for workspace '{}'.", manifest.workspace);
            return Ok(());
        }

        for c in &result.components {
            print_line("component", &c.entity.name, &c.action);
        }
        for r in &result.references {
            print_line("reference", &r.entity.label(), &r.action);
        }
        Ok(())
    }
}

fn print_line(kind: &str, label: &str, action: &UpsertAction) {
    match action {
        UpsertAction::WouldCreate | UpsertAction::Created => {
            println!("{} {kind} {label}", "+".green().bold());
        }
        UpsertAction::WouldUpdate { changed } | UpsertAction::Updated { changed } => {
            println!(
                "{} {kind} {label}: {}",
                "~".yellow().bold(),
                changed.join(", ")
            );
        }
        UpsertAction::Unchanged => {}
    }
}
