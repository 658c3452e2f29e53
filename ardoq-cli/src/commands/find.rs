//! `ardoq find <workspace>`: search components by name or field value.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use tabled::{settings::Style, Table, Tabled};

use ardoq_core::{Component, ComponentQuery, WorkspaceId};

/// Arguments for `ardoq find`.
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Workspace to search.
    pub workspace: String,

    /// Component name (substring unless `--exact`).
    #[arg(long, conflicts_with = "field")]
    pub name: Option<String>,

    /// Require the whole name to match.
    #[arg(long, requires = "name")]
    pub exact: bool,

    /// Field to match on; pair with `--value`.
    #[arg(long, requires = "value")]
    pub field: Option<String>,

    /// Value the field must equal. Parsed as JSON when possible.
    #[arg(long, requires = "field")]
    pub value: Option<String>,

    /// Emit matches as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "type")]
    type_id: String,
}

impl FindArgs {
    pub fn run(self) -> Result<()> {
        let query = self.query()?;
        let mut orchestrator = super::connect(false)?;
        let workspace = WorkspaceId::from(self.workspace.as_str());

        let hits = orchestrator
            .find_components(&workspace, &query)
            .with_context(|| format!("search failed in workspace '{workspace}'"))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&hits).context("failed to serialize components")?
            );
            return Ok(());
        }

        if hits.is_empty() {
            println!("No components found in workspace '{workspace}'.");
            return Ok(());
        }
        let mut table = Table::new(hits.iter().map(row));
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }

    fn query(&self) -> Result<ComponentQuery> {
        match (&self.name, &self.field, &self.value) {
            (Some(name), _, _) => Ok(ComponentQuery::by_name(name.as_str(), self.exact)),
            (None, Some(field), Some(raw)) => {
                Ok(ComponentQuery::by_field(field.as_str(), parse_value(raw)))
            }
            _ => bail!("provide --name or --field with --value"),
        }
    }
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn row(component: &Component) -> ComponentRow {
    ComponentRow {
        id: component.id.as_ref().map(ToString::to_string).unwrap_or_default(),
        name: component.name.clone(),
        type_id: component.type_id.to_string(),
    }
}
