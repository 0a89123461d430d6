//! Uninstall command implementation
//!
//! Confirms before removing unless `--yes` is given. Removing a local
//! registration only forgets the entry; the directory is left alone.

use console::Style;
use inquire::Confirm;

use crate::cli::UninstallArgs;
use crate::commands::context::CommandContext;
use crate::error::{Result, SkilletError};
use crate::github::GitHubClient;
use crate::installer::Installer;
use crate::store::SourceKind;

pub fn run(ctx: &mut CommandContext, args: UninstallArgs) -> Result<()> {
    let state = ctx
        .store
        .get(&args.id)
        .ok_or_else(|| SkilletError::SkillNotFound {
            id: args.id.clone(),
        })?;
    let local = state.source == SourceKind::Local;

    if !args.yes {
        let confirmed = Confirm::new(&format!("Uninstall '{}'?", args.id))
            .with_default(true)
            .with_help_message("Press Enter to confirm, or 'n' to cancel")
            .prompt()?;
        if !confirmed {
            println!("Uninstall cancelled. No changes were made.");
            return Ok(());
        }
    }

    let github = GitHubClient::new(&ctx.http, ctx.token.clone());
    let mut installer = Installer::new(&ctx.fs, &github, &mut ctx.store, ctx.skills_dir.clone());
    installer.remove(&args.id)?;
    ctx.save_store()?;

    println!(
        "Uninstalled {}",
        Style::new().bold().yellow().apply_to(&args.id)
    );
    if local {
        println!("The registered directory was left in place.");
    }
    Ok(())
}
