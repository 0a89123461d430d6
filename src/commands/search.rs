//! Search command implementation
//!
//! One paginated catalog query. Each hit prints its id (which `install`
//! accepts as a catalog reference), name, and description.

use console::Style;

use crate::catalog::CatalogClient;
use crate::cli::SearchArgs;
use crate::commands::context::CommandContext;
use crate::error::Result;
use crate::progress::Spinner;

pub fn run(ctx: &CommandContext, args: SearchArgs) -> Result<()> {
    let spinner = Spinner::new(format!("Searching for '{}'...", args.query));
    let results = CatalogClient::new(&ctx.http).search(&args.query, args.page);
    spinner.clear();
    let results = results?;

    if results.skills.is_empty() {
        println!("No results for '{}'.", args.query);
        return Ok(());
    }

    match results.total {
        Some(total) => println!(
            "Results for '{}' (page {}, {total} total):",
            args.query,
            results.page.unwrap_or(args.page)
        ),
        None => println!("Results for '{}':", args.query),
    }
    println!();

    for entry in &results.skills {
        let id = entry.id.as_deref().unwrap_or("?");
        let mut line = format!("  {}", Style::new().bold().yellow().apply_to(id));
        if let Some(name) = &entry.name {
            line.push_str(&format!(" {}", Style::new().dim().apply_to(name)));
        }
        println!("{line}");
        if let Some(description) = &entry.description {
            println!("    {description}");
        }
    }
    println!();
    println!("Install one with: skillet install https://skillsmp.com/skills/<id>");
    Ok(())
}
