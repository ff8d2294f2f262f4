mod check;

use anyhow::Result;
use clap::Subcommand;

use crate::args::Args;
use crate::exit::Exit;

pub trait Command {
    fn execute(&self, args: &Args) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum TdomCommand {
    /// Check Python files for template diagnostics
    Check(self::check::Check),
}

impl Command for TdomCommand {
    fn execute(&self, args: &Args) -> Result<Exit> {
        match self {
            TdomCommand::Check(cmd) => cmd.execute(args),
        }
    }
}
