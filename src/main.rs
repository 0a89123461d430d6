//! Skillet - skill manager for coding agents
//!
//! Installs skill bundles from GitHub releases, monorepo subdirectories,
//! zip archives, and the skill catalog; keeps them updated; and scans
//! their content for risky patterns.

mod catalog;
mod cli;
mod commands;
mod error;
mod fileset;
mod fsys;
mod github;
mod installer;
mod locate;
mod manifest;
mod progress;
mod scanner;
mod source;
mod store;
mod version;

use clap::Parser;

use cli::{Cli, Commands};
use commands::context::CommandContext;

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Completions need no state and must work before any config exists.
        Commands::Completions(args) => commands::completions::run(args)?,
        command => {
            let mut ctx = CommandContext::load(cli.skills_dir, cli.token)?;
            if cli.verbose {
                eprintln!("store: {}", ctx.store_path.display());
                eprintln!("skills dir: {}", ctx.skills_dir.display());
            }
            run_command(&mut ctx, command)?;
        }
    }
    Ok(())
}

fn run_command(ctx: &mut CommandContext, command: Commands) -> error::Result<()> {
    match command {
        Commands::Install(args) => commands::install::run(ctx, args),
        Commands::Update(args) => commands::update::run(ctx, args),
        Commands::Uninstall(args) => commands::uninstall::run(ctx, args),
        Commands::List(args) => commands::list::run(ctx, args),
        Commands::Check(args) => commands::check::run(ctx, args),
        Commands::Scan(args) => commands::scan::run(ctx, args),
        Commands::Freeze(args) => commands::freeze::run(ctx, args, true),
        Commands::Unfreeze(args) => commands::freeze::run(ctx, args, false),
        Commands::Search(args) => commands::search::run(ctx, args),
        Commands::Config(args) => commands::config::run(ctx, args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
