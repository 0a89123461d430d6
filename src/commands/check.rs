//! Check command implementation
//!
//! Read-only update report: lists which installed skills have a newer
//! release without touching the store or the filesystem.

use console::Style;

use crate::cli::CheckArgs;
use crate::commands::context::CommandContext;
use crate::error::{Result, SkilletError};
use crate::installer::split_repo_field;
use crate::source::RepoId;
use crate::store::{SkillState, SourceKind};
use crate::version::{UpdateCheck, check_for_update};

pub fn run(ctx: &CommandContext, args: CheckArgs) -> Result<()> {
    let github = ctx.github();

    if let Some(id) = &args.id {
        let state = ctx
            .store
            .get(id)
            .ok_or_else(|| SkilletError::SkillNotFound { id: id.clone() })?;
        let Some((repo, installed)) = checkable(state) else {
            let name = Style::new().bold().yellow().apply_to(id);
            if state.source == SourceKind::Github {
                println!("{name} tracks a branch; run 'skillet update {id}' to refresh it.");
            } else {
                println!("{name} has no update source.");
            }
            return Ok(());
        };
        report(id, &check_for_update(&github, &repo, &installed), &installed);
        return Ok(());
    }

    let targets: Vec<(String, RepoId, String)> = ctx
        .store
        .skills
        .iter()
        .filter_map(|(id, state)| {
            checkable(state).map(|(repo, installed)| (id.clone(), repo, installed))
        })
        .collect();
    if targets.is_empty() {
        println!("No skills with an update source.");
        return Ok(());
    }

    println!("Checking {} skill(s) for updates...", targets.len());
    let mut available = 0usize;
    for (id, repo, installed) in &targets {
        let check = check_for_update(&github, repo, installed);
        if check.has_update() {
            available += 1;
        }
        report(id, &check, installed);
    }
    println!();
    if available == 0 {
        println!("Everything is up to date.");
    } else {
        println!("{available} update(s) available. Run 'skillet update --all' to apply.");
    }
    Ok(())
}

/// A skill is checkable when it came from GitHub with a release version.
/// Monorepo installs carry no version and are reported as unavailable.
fn checkable(state: &SkillState) -> Option<(RepoId, String)> {
    if state.source != SourceKind::Github {
        return None;
    }
    let (repo, _) = split_repo_field(state.repo.as_deref()?)?;
    let installed = state.version.clone()?;
    Some((repo, installed))
}

fn report(id: &str, check: &UpdateCheck, installed: &str) {
    let name = Style::new().bold().yellow().apply_to(id);
    match check {
        UpdateCheck::Available { latest } => println!(
            "  {name} {} -> {}",
            Style::new().dim().apply_to(installed),
            Style::new().green().apply_to(latest)
        ),
        UpdateCheck::UpToDate { .. } => println!(
            "  {name} {} (up to date)",
            Style::new().dim().apply_to(installed)
        ),
        UpdateCheck::Unavailable => println!("  {name} (no comparable release)"),
    }
}
