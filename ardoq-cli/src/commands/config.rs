//! `ardoq config`: inspect the resolved client configuration.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use ardoq_core::config::{self, Config};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration with the token masked.
    Show,
    /// Print the config file path.
    Path,
}

pub fn run(command: ConfigCommand) -> Result<()> {
    let path = config::config_path()?;
    match command {
        ConfigCommand::Show => {
            let effective = config::load()
                .with_context(|| format!("failed to load {}", path.display()))?
                .with_env_overrides(|key| std::env::var(key).ok());
            print_config(&effective);
            if let Err(e) = effective.validate(&path) {
                println!("{} {e}", "!".yellow().bold());
            }
        }
        ConfigCommand::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn print_config(config: &Config) {
    println!("host:    {}", config.host);
    println!("org:     {}", config.org.as_deref().unwrap_or("<not set>"));
    println!("token:   {}", config.masked_token());
    println!("timeout: {}s", config.timeout_secs);
}
