//! Command trait and context for dispatching commands

use std::path::Path;
use std::time::Instant;

use wmdr_core::config::EngineConfig;
use wmdr_core::error::Result;
use wmdr_core::resources::Resources;

use crate::cli::{Cli, Commands};
use crate::commands::{evaluate, metrics, rules};

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub root: &'a Path,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, root: &'a Path, start: Instant) -> Self {
        Self { cli, root, start }
    }

    /// `--config`, else `wmdr.toml` in the working directory, else defaults
    pub fn config(&self) -> Result<EngineConfig> {
        EngineConfig::discover(self.cli.config.as_deref(), self.root)
    }

    /// Load code lists and boundaries from `--resources` or the configured directory
    pub fn resources(&self, config: &EngineConfig) -> Result<Resources> {
        let dir = match &self.cli.resources {
            Some(dir) => dir.clone(),
            None => config.resources_dir()?,
        };
        Resources::load(&dir)
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Commands::Evaluate(args) => evaluate::execute(ctx, args),
            Commands::Metrics(args) => metrics::execute(ctx, args),
            Commands::Rules => rules::execute(ctx),
        }
    }
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("wmdr {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Key performance indicator evaluation for WIGOS metadata records.");
        println!();
        println!("Run `wmdr --help` for usage information.");
        Ok(())
    }
}
