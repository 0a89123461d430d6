//! Install command implementation
//!
//! Dispatches on what the source argument denotes:
//! - an existing `.zip` file installs every bundle inside the archive
//! - an existing directory is registered in place, without copying
//! - anything else is parsed as a repository or catalog reference

use std::path::Path;

use console::Style;
use inquire::Confirm;

use crate::catalog::CatalogClient;
use crate::cli::InstallArgs;
use crate::commands::context::CommandContext;
use crate::error::{Result, SkilletError};
use crate::github::GitHubClient;
use crate::installer::{InstalledSkill, Installer};
use crate::progress::Spinner;
use crate::source::{RepoId, SkillSource};

pub fn run(ctx: &mut CommandContext, args: InstallArgs) -> Result<()> {
    let path = Path::new(&args.source);
    if path.is_file() {
        return install_archive(ctx, path);
    }
    if path.is_dir() {
        return register_local(ctx, path);
    }

    let (repo, subpath) = resolve_source(ctx, &args.source)?;
    let display = match &subpath {
        Some(subpath) => format!("{repo}/{subpath}"),
        None => repo.to_string(),
    };
    println!("Installing from: {}", Style::new().cyan().apply_to(&display));

    // The local id is known before fetching, so reinstalls can be confirmed
    // up front.
    let id = match &subpath {
        Some(subpath) => subpath
            .trim_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(subpath)
            .to_string(),
        None => repo.name.clone(),
    };
    if ctx.store.contains(&id) && !args.yes && !confirm_reinstall(&id)? {
        println!("Install cancelled. No changes were made.");
        return Ok(());
    }

    let spinner = Spinner::new("Fetching skill files...");
    let github = GitHubClient::new(&ctx.http, ctx.token.clone());
    let mut installer = Installer::new(&ctx.fs, &github, &mut ctx.store, ctx.skills_dir.clone());
    let result = installer.install(&repo, subpath.as_deref(), args.tag.as_deref());
    spinner.clear();
    let installed = result?;

    ctx.save_store()?;
    print_installed(&installed);
    Ok(())
}

/// Parses the source, resolving catalog references to the repository their
/// entry points at.
fn resolve_source(ctx: &CommandContext, input: &str) -> Result<(RepoId, Option<String>)> {
    let source = match SkillSource::parse(input)? {
        SkillSource::Catalog { id } => {
            let spinner = Spinner::new(format!("Resolving catalog entry '{id}'..."));
            let resolved = CatalogClient::new(&ctx.http).resolve_entry(&id);
            spinner.clear();
            resolved?
        }
        source => source,
    };
    match source {
        SkillSource::Standalone { repo } => Ok((repo, None)),
        SkillSource::Monorepo { repo, subpath } => Ok((repo, Some(subpath))),
        SkillSource::Catalog { id } => Err(SkilletError::CatalogBadResponse {
            reason: format!("entry '{id}' resolved to another catalog entry"),
        }),
    }
}

fn confirm_reinstall(id: &str) -> Result<bool> {
    let confirmed = Confirm::new(&format!("'{id}' is already installed. Reinstall?"))
        .with_default(true)
        .with_help_message("Press Enter to reinstall, or 'n' to cancel")
        .prompt()?;
    Ok(confirmed)
}

fn install_archive(ctx: &mut CommandContext, path: &Path) -> Result<()> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("zip") {
        return Err(SkilletError::SourceNotRecognized {
            input: path.display().to_string(),
        });
    }
    println!(
        "Installing from archive: {}",
        Style::new().cyan().apply_to(path.display())
    );
    let bytes = std::fs::read(path).map_err(|err| SkilletError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;

    let github = GitHubClient::new(&ctx.http, ctx.token.clone());
    let mut installer = Installer::new(&ctx.fs, &github, &mut ctx.store, ctx.skills_dir.clone());
    let report = installer.install_archive(&bytes)?;

    for error in &report.errors {
        eprintln!("{} {}", Style::new().red().apply_to("Skipped:"), error);
    }
    if report.installed.is_empty() {
        return Err(SkilletError::ArchiveError {
            reason: "no skill could be installed from the archive".to_string(),
        });
    }
    ctx.save_store()?;

    println!("Installed {} skill(s)", report.installed.len());
    for skill in &report.installed {
        println!("  - {}", Style::new().bold().yellow().apply_to(&skill.id));
    }
    Ok(())
}

fn register_local(ctx: &mut CommandContext, path: &Path) -> Result<()> {
    let dir = std::fs::canonicalize(path).map_err(|err| SkilletError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;

    let github = GitHubClient::new(&ctx.http, ctx.token.clone());
    let mut installer = Installer::new(&ctx.fs, &github, &mut ctx.store, ctx.skills_dir.clone());
    let installed = installer.register_local(&dir)?;
    ctx.save_store()?;

    println!(
        "Registered {} from {}",
        Style::new().bold().yellow().apply_to(&installed.id),
        Style::new().cyan().apply_to(dir.display())
    );
    println!("The directory stays in place; skillet tracks it without copying.");
    Ok(())
}

fn print_installed(skill: &InstalledSkill) {
    match &skill.version {
        Some(version) => println!(
            "Installed {} {}",
            Style::new().bold().yellow().apply_to(&skill.id),
            Style::new().dim().apply_to(version)
        ),
        None => println!(
            "Installed {}",
            Style::new().bold().yellow().apply_to(&skill.id)
        ),
    }
    println!(
        "    {} {}",
        Style::new().bold().apply_to("Path:"),
        skill.path.display()
    );
}
