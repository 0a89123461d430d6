//! Config command implementation
//!
//! Git-config style: no arguments shows everything, a key shows one value,
//! key plus value sets it. The token is never echoed back.

use std::path::PathBuf;

use console::Style;

use crate::cli::ConfigArgs;
use crate::commands::context::CommandContext;
use crate::error::{Result, SkilletError};

pub fn run(ctx: &mut CommandContext, args: ConfigArgs) -> Result<()> {
    let Some(key) = args.key else {
        return show_all(ctx);
    };
    match args.value {
        None => show_one(ctx, &key),
        Some(value) => set(ctx, &key, &value),
    }
}

fn show_all(ctx: &CommandContext) -> Result<()> {
    print_setting("token", &token_display(ctx));
    print_setting("skills-dir", &skills_dir_display(ctx));
    print_setting("auto-update", &ctx.store.settings.auto_update.to_string());
    Ok(())
}

fn show_one(ctx: &CommandContext, key: &str) -> Result<()> {
    let value = match key {
        "token" => token_display(ctx),
        "skills-dir" => skills_dir_display(ctx),
        "auto-update" => ctx.store.settings.auto_update.to_string(),
        _ => {
            return Err(SkilletError::UnknownSetting {
                key: key.to_string(),
            });
        }
    };
    println!("{value}");
    Ok(())
}

fn set(ctx: &mut CommandContext, key: &str, value: &str) -> Result<()> {
    match key {
        "token" => {
            // An empty value clears the stored token.
            ctx.store.settings.github_token = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        "skills-dir" => {
            ctx.store.settings.skills_dir = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        "auto-update" => {
            let flag = value
                .parse::<bool>()
                .map_err(|_| SkilletError::InvalidSettingValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            ctx.store.settings.auto_update = flag;
        }
        _ => {
            return Err(SkilletError::UnknownSetting {
                key: key.to_string(),
            });
        }
    }
    ctx.save_store()?;
    println!("Set {}", Style::new().bold().apply_to(key));
    Ok(())
}

fn print_setting(key: &str, value: &str) {
    println!("  {} {value}", Style::new().bold().apply_to(format!("{key}:")));
}

fn token_display(ctx: &CommandContext) -> String {
    if ctx.store.settings.github_token.is_some() {
        "(set)".to_string()
    } else {
        "(not set)".to_string()
    }
}

fn skills_dir_display(ctx: &CommandContext) -> String {
    match &ctx.store.settings.skills_dir {
        Some(dir) => dir.display().to_string(),
        None => "(default: ~/.claude/skills)".to_string(),
    }
}
