//! `ardoq delete component|reference <id>`.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;

use ardoq_core::{EntityId, EntityKind};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum KindArg {
    Component,
    Reference,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Component => EntityKind::Component,
            KindArg::Reference => EntityKind::Reference,
        }
    }
}

/// Arguments for `ardoq delete`.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Kind of entity to delete.
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Identifier of the entity.
    pub id: String,

    /// Report the delete without sending it.
    #[arg(long)]
    pub simulate: bool,
}

impl DeleteArgs {
    pub fn run(self) -> Result<()> {
        let mut orchestrator = super::connect(self.simulate)?;
        let kind = EntityKind::from(self.kind);
        let id = EntityId::from(self.id);

        let deleted = match kind {
            EntityKind::Component => orchestrator.delete_component(&id),
            EntityKind::Reference => orchestrator.delete_reference(&id),
        }
        .with_context(|| format!("failed to delete {kind} '{id}'"))?;

        if self.simulate {
            println!("[simulate] would delete {kind} {}", deleted.to_string().bold());
        } else {
            println!("{} deleted {kind} {}", "✓".green(), deleted.to_string().bold());
        }
        Ok(())
    }
}
