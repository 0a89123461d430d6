//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Skillet - agent skill manager
///
/// Install, update, and audit agent skills from GitHub repositories,
/// zip archives, and the skill catalog.
#[derive(Parser, Debug)]
#[command(
    name = "skillet",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Skill manager for coding agents",
    long_about = "Skillet installs agent skills from GitHub releases, monorepo \
                  subdirectories, zip archives, and the skill catalog, keeps them \
                  up to date, and scans them for risky content before you run them.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  skillet install owner/repo\n    \
                  skillet install owner/repo/skills/pdf\n    \
                  skillet install ./skills.zip\n    \
                  skillet update --all\n    \
                  skillet scan --all\n    \
                  skillet search \"pdf tools\"\n\n\
                  \x1b[1m\x1b[32mFiles:\x1b[0m\n    \
                  Skills install into ~/.claude/skills by default.\n    \
                  State lives in the skillet.json config file."
)]
pub struct Cli {
    /// Directory skills are installed into (defaults to ~/.claude/skills)
    #[arg(long, global = true, env = "SKILLET_SKILLS_DIR")]
    pub skills_dir: Option<PathBuf>,

    /// GitHub token for API requests
    #[arg(long, global = true, env = "SKILLET_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a skill from GitHub, an archive, or the catalog
    Install(InstallArgs),

    /// Re-install skills from their recorded sources
    Update(UpdateArgs),

    /// Remove an installed skill
    Uninstall(UninstallArgs),

    /// List installed skills
    List(ListArgs),

    /// Check installed skills for available updates
    Check(CheckArgs),

    /// Scan installed skills for risky content
    Scan(ScanArgs),

    /// Pin a skill so updates skip it
    Freeze(FreezeArgs),

    /// Unpin a frozen skill
    Unfreeze(FreezeArgs),

    /// Search the skill catalog
    Search(SearchArgs),

    /// Show or change stored settings
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Install the latest release of a standalone skill:\n    skillet install owner/repo\n\n\
                  Install a specific release:\n    skillet install owner/repo --tag v1.2.0\n\n\
                  Install from a monorepo subdirectory:\n    skillet install owner/repo/skills/pdf\n\n\
                  Install from a GitHub URL:\n    skillet install https://github.com/owner/repo\n\n\
                  Install every skill in a zip archive:\n    skillet install ./skills.zip\n\n\
                  Register a local directory without copying it:\n    skillet install ./my-skill\n\n\
                  Install a catalog entry:\n    skillet install https://skillsmp.com/skills/abc123")]
pub struct InstallArgs {
    /// Skill source: owner/repo, a GitHub or catalog URL, a zip archive, or a local directory
    pub source: String,

    /// Release tag to install instead of the latest
    #[arg(long)]
    pub tag: Option<String>,

    /// Reinstall over an existing skill without asking
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for the update command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Update one skill:\n    skillet update my-skill\n\n\
                  Update to a specific release:\n    skillet update my-skill --tag v2.0.0\n\n\
                  Update everything that has a source:\n    skillet update --all")]
pub struct UpdateArgs {
    /// Skill to update
    #[arg(required_unless_present = "all")]
    pub id: Option<String>,

    /// Update every non-frozen skill with a recorded source
    #[arg(long, conflicts_with = "id")]
    pub all: bool,

    /// Release tag to install instead of the latest
    #[arg(long, conflicts_with = "all")]
    pub tag: Option<String>,
}

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Uninstall a skill:\n    skillet uninstall my-skill\n\n\
                  Uninstall without confirmation:\n    skillet uninstall my-skill -y")]
pub struct UninstallArgs {
    /// Skill to remove
    pub id: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List installed skills:\n    skillet list\n\n\
                  Show sources and timestamps:\n    skillet list --detailed")]
pub struct ListArgs {
    /// Show detailed output
    #[arg(long)]
    pub detailed: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Skill to check; checks every updatable skill when omitted
    pub id: Option<String>,
}

/// Arguments for the scan command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Scan one skill:\n    skillet scan my-skill\n\n\
                  Scan everything installed:\n    skillet scan --all")]
pub struct ScanArgs {
    /// Skill to scan; scans everything installed when omitted
    pub id: Option<String>,

    /// Scan every installed skill
    #[arg(long, conflicts_with = "id")]
    pub all: bool,
}

/// Arguments for the freeze and unfreeze commands
#[derive(Parser, Debug)]
pub struct FreezeArgs {
    /// Skill to pin or unpin
    pub id: String,
}

/// Arguments for the search command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Search the catalog:\n    skillet search \"pdf tools\"\n\n\
                  Fetch the next page:\n    skillet search \"pdf tools\" --page 2")]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Result page to fetch
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show all settings:\n    skillet config\n\n\
                  Store a GitHub token:\n    skillet config token ghp_xxxx\n\n\
                  Change the install directory:\n    skillet config skills-dir ~/skills\n\n\
                  Enable update checks on list:\n    skillet config auto-update true")]
pub struct ConfigArgs {
    /// Setting to read or change: token, skills-dir, or auto-update
    pub key: Option<String>,

    /// New value; omit to print the current one
    pub value: Option<String>,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    skillet completions --shell bash > ~/.bash_completion.d/skillet\n\n\
                  Generate zsh completions:\n    skillet completions --shell zsh > ~/.zfunc/_skillet\n\n\
                  Generate fish completions:\n    skillet completions --shell fish > ~/.config/fish/completions/skillet.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
