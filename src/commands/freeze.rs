//! Freeze and unfreeze command implementations
//!
//! Pure store toggles. A frozen skill is skipped by `update --all` and
//! rejects a direct update; nothing is fetched here.

use console::Style;

use crate::cli::FreezeArgs;
use crate::commands::context::CommandContext;
use crate::error::Result;

pub fn run(ctx: &mut CommandContext, args: FreezeArgs, frozen: bool) -> Result<()> {
    ctx.store.set_frozen(&args.id, frozen)?;
    ctx.save_store()?;

    let name = Style::new().bold().yellow().apply_to(&args.id);
    if frozen {
        println!("Froze {name}. Updates will skip it until you unfreeze.");
    } else {
        println!("Unfroze {name}. Updates apply again.");
    }
    Ok(())
}
