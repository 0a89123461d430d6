//! Scan command implementation
//!
//! Runs the threat scanner over one skill or every installed skill,
//! through the content-hash cache so unchanged bundles are not re-read.

use std::path::PathBuf;

use console::Style;

use crate::cli::ScanArgs;
use crate::commands::context::CommandContext;
use crate::error::{Result, SkilletError};
use crate::scanner::{RiskLevel, ScanCache, ScanReport, Severity};

pub fn run(ctx: &CommandContext, args: ScanArgs) -> Result<()> {
    let cache_path = ctx.scan_cache_path();
    let mut cache = ScanCache::load(&cache_path);
    cache.retain(|id| ctx.store.contains(id));

    let targets: Vec<String> = match &args.id {
        Some(id) => {
            if !ctx.store.contains(id) {
                return Err(SkilletError::SkillNotFound { id: id.clone() });
            }
            vec![id.clone()]
        }
        None => ctx.store.skills.keys().cloned().collect(),
    };
    if targets.is_empty() {
        println!("No skills installed.");
        return Ok(());
    }

    println!("Scanning {} skill(s)...", targets.len());
    println!();

    let mut worst = RiskLevel::Clean;
    let mut failures: Vec<(String, SkilletError)> = Vec::new();
    for id in &targets {
        let path = skill_path(ctx, id);
        match cache.get_or_scan(id, &path) {
            Ok(report) => {
                display_report(id, &report);
                worst = worst.max(report.risk_level);
            }
            Err(err) => failures.push((id.clone(), err)),
        }
    }
    cache.save(&cache_path)?;

    if targets.len() == 1 {
        if let Some((_, err)) = failures.into_iter().next() {
            return Err(err);
        }
    } else {
        for (id, err) in &failures {
            eprintln!("{} {id}: {err}", Style::new().red().apply_to("Scan failed:"));
        }
    }

    println!();
    match worst {
        RiskLevel::Clean => println!(
            "{}",
            Style::new().green().apply_to("No risky content found.")
        ),
        RiskLevel::Warning => println!(
            "{}",
            Style::new()
                .yellow()
                .apply_to("Warnings found. Review the findings above.")
        ),
        RiskLevel::Danger => println!(
            "{}",
            Style::new()
                .red()
                .bold()
                .apply_to("Dangerous content found. Review before using these skills.")
        ),
    }
    Ok(())
}

fn skill_path(ctx: &CommandContext, id: &str) -> PathBuf {
    match ctx.store.get(id).and_then(|state| state.path.clone()) {
        Some(path) => path,
        None => ctx.skills_dir.join(id),
    }
}

fn display_report(id: &str, report: &ScanReport) {
    println!(
        "  {} {}",
        Style::new().bold().yellow().apply_to(id),
        risk_badge(report.risk_level)
    );
    for finding in &report.findings {
        let severity = match finding.severity {
            Severity::Warning => Style::new().yellow().apply_to("warning"),
            Severity::Danger => Style::new().red().apply_to("danger"),
        };
        println!(
            "    [{severity}] {} in {}: {}",
            finding.pattern_id, finding.file, finding.description
        );
    }
}

fn risk_badge(risk: RiskLevel) -> String {
    match risk {
        RiskLevel::Clean => Style::new().green().apply_to("clean").to_string(),
        RiskLevel::Warning => Style::new().yellow().apply_to("warning").to_string(),
        RiskLevel::Danger => Style::new().red().bold().apply_to("danger").to_string(),
    }
}
