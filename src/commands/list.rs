//! List command implementation
//!
//! Lists installed skills with their versions, sources, and freeze state.
//! When the auto-update setting is on, each GitHub-sourced skill is also
//! checked for a newer release; check failures degrade to no marker.

use console::Style;

use crate::cli::ListArgs;
use crate::commands::context::CommandContext;
use crate::error::Result;
use crate::installer::split_repo_field;
use crate::store::{SkillState, SourceKind};
use crate::version::{UpdateCheck, check_for_update};

pub fn run(ctx: &CommandContext, args: ListArgs) -> Result<()> {
    if ctx.store.skills.is_empty() {
        println!("No skills installed.");
        return Ok(());
    }

    println!("Installed skills ({}):", ctx.store.skills.len());
    println!();

    for (id, state) in &ctx.store.skills {
        display_skill(ctx, id, state, args.detailed);
        println!();
    }
    Ok(())
}

fn display_skill(ctx: &CommandContext, id: &str, state: &SkillState, detailed: bool) {
    let mut name_line = format!("  {}", Style::new().bold().yellow().apply_to(id));
    if let Some(version) = &state.version {
        name_line.push_str(&format!(" {}", Style::new().dim().apply_to(version)));
    }
    if state.frozen {
        name_line.push_str(&format!(" {}", Style::new().yellow().apply_to("[frozen]")));
    }
    println!("{name_line}");

    println!(
        "    {} {}",
        Style::new().bold().apply_to("Source:"),
        describe_source(state)
    );

    if ctx.store.settings.auto_update {
        if let Some(marker) = update_marker(ctx, state) {
            println!("    {} {}", Style::new().bold().apply_to("Update:"), marker);
        }
    }

    if detailed {
        let path = match &state.path {
            Some(path) => path.clone(),
            None => ctx.skills_dir.join(id),
        };
        println!(
            "    {} {}",
            Style::new().bold().apply_to("Path:"),
            path.display()
        );
        println!(
            "    {} {}",
            Style::new().bold().apply_to("Installed:"),
            state.installed_at.format("%Y-%m-%d %H:%M UTC")
        );
        if let Some(updated) = &state.last_updated_at {
            println!(
                "    {} {}",
                Style::new().bold().apply_to("Updated:"),
                updated.format("%Y-%m-%d %H:%M UTC")
            );
        }
    }
}

fn describe_source(state: &SkillState) -> String {
    match state.source {
        SourceKind::Github => match &state.repo {
            Some(repo) => format!("github ({repo})"),
            None => "github".to_string(),
        },
        SourceKind::Archive => "archive".to_string(),
        SourceKind::Local => match &state.path {
            Some(path) => format!("local ({})", path.display()),
            None => "local".to_string(),
        },
    }
}

fn update_marker(ctx: &CommandContext, state: &SkillState) -> Option<String> {
    if state.source != SourceKind::Github {
        return None;
    }
    let (repo, _) = split_repo_field(state.repo.as_deref()?)?;
    let installed = state.version.as_deref()?;
    match check_for_update(&ctx.github(), &repo, installed) {
        UpdateCheck::Available { latest } => Some(
            Style::new()
                .green()
                .apply_to(format!("{latest} available"))
                .to_string(),
        ),
        UpdateCheck::UpToDate { .. } => Some("up to date".to_string()),
        UpdateCheck::Unavailable => None,
    }
}
