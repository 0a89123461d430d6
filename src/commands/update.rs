//! Update command implementation
//!
//! Re-installs skills from their recorded sources. A single update fails
//! loudly; `--all` keeps going and reports failures at the end.

use console::Style;

use crate::cli::UpdateArgs;
use crate::commands::context::CommandContext;
use crate::error::{Result, SkilletError};
use crate::github::GitHubClient;
use crate::installer::Installer;
use crate::progress::{BatchProgress, Spinner};
use crate::store::SourceKind;

pub fn run(ctx: &mut CommandContext, args: UpdateArgs) -> Result<()> {
    if args.all {
        return update_all(ctx);
    }
    let Some(id) = args.id else {
        // clap guarantees an id when --all is absent.
        return Ok(());
    };

    let before = ctx.store.get(&id).and_then(|state| state.version.clone());

    let spinner = Spinner::new(format!("Updating {id}..."));
    let github = GitHubClient::new(&ctx.http, ctx.token.clone());
    let mut installer = Installer::new(&ctx.fs, &github, &mut ctx.store, ctx.skills_dir.clone());
    let result = installer.update(&id, args.tag.as_deref());
    spinner.clear();
    let updated = result?;

    ctx.save_store()?;

    let name = Style::new().bold().yellow().apply_to(&updated.id);
    match (&before, &updated.version) {
        (Some(old), Some(new)) if old == new => {
            println!(
                "{name} is already at {}",
                Style::new().green().apply_to(new)
            );
        }
        (Some(old), Some(new)) => {
            println!(
                "Updated {name} {} -> {}",
                Style::new().dim().apply_to(old),
                Style::new().green().apply_to(new)
            );
        }
        (None, Some(new)) => {
            println!("Updated {name} to {}", Style::new().green().apply_to(new));
        }
        _ => println!("Updated {name}"),
    }
    Ok(())
}

fn update_all(ctx: &mut CommandContext) -> Result<()> {
    let mut candidates = Vec::new();
    for (id, state) in &ctx.store.skills {
        if state.source != SourceKind::Github {
            continue;
        }
        if state.frozen {
            println!(
                "Skipping {} (frozen)",
                Style::new().bold().yellow().apply_to(id)
            );
            continue;
        }
        candidates.push(id.clone());
    }
    if candidates.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }

    let progress = BatchProgress::new(candidates.len() as u64);
    let mut updated = 0usize;
    let mut failures: Vec<(String, SkilletError)> = Vec::new();
    for id in &candidates {
        progress.start(id);
        let github = GitHubClient::new(&ctx.http, ctx.token.clone());
        let mut installer =
            Installer::new(&ctx.fs, &github, &mut ctx.store, ctx.skills_dir.clone());
        match installer.update(id, None) {
            Ok(_) => updated += 1,
            Err(err) => failures.push((id.clone(), err)),
        }
        progress.inc();
    }
    progress.finish();
    ctx.save_store()?;

    println!("Updated {updated} of {} skill(s)", candidates.len());
    for (id, err) in &failures {
        eprintln!("{} {id}: {err}", Style::new().red().apply_to("Failed:"));
    }
    Ok(())
}
