//! Error types and handling for Skillet
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Skillet operations
#[derive(Error, Diagnostic, Debug)]
pub enum SkilletError {
    // Source reference errors
    #[error("Source not recognized: {input}")]
    #[diagnostic(
        code(skillet::source::not_recognized),
        help(
            "Valid formats: owner/repo, owner/repo/path/to/skill, https://github.com/owner/repo, or a catalog skill URL"
        )
    )]
    SourceNotRecognized { input: String },

    // Remote fetch errors
    #[error("GitHub API rate limit exhausted")]
    #[diagnostic(
        code(skillet::remote::rate_limited),
        help(
            "Wait for the quota to reset, or set a token with 'skillet config token <value>' or $GITHUB_TOKEN"
        )
    )]
    RateLimited,

    #[error("Not found on remote: {what}")]
    #[diagnostic(
        code(skillet::remote::not_found),
        help("Check that the repository exists and is accessible with your token")
    )]
    RemoteNotFound { what: String },

    #[error("Remote request failed with status {status}: {url}")]
    #[diagnostic(code(skillet::remote::error))]
    RemoteError { status: u16, url: String },

    #[error("Network request failed: {reason}")]
    #[diagnostic(
        code(skillet::remote::transport),
        help("Check your network connection and try again")
    )]
    TransportFailed { reason: String },

    #[error("Unexpected response from {url}: {reason}")]
    #[diagnostic(code(skillet::remote::bad_payload))]
    RemoteBadPayload { url: String, reason: String },

    #[error("Release '{tag}' not found for {repo}")]
    #[diagnostic(
        code(skillet::remote::release_not_found),
        help("List available releases on the repository's releases page")
    )]
    ReleaseNotFound { repo: String, tag: String },

    // Install errors
    #[error("No SKILL.md manifest found in {origin}")]
    #[diagnostic(
        code(skillet::install::no_manifest),
        help("A skill bundle must contain a SKILL.md file at its root")
    )]
    NoManifest { origin: String },

    #[error("Skill validation failed: {}", errors.join("; "))]
    #[diagnostic(code(skillet::install::validation_failed))]
    ValidationFailed { errors: Vec<String> },

    #[error("Failed to promote staged skill '{id}': {reason}")]
    #[diagnostic(
        code(skillet::install::promotion_failed),
        help("The previous install was restored where possible; re-run the install")
    )]
    PromotionFailed {
        id: String,
        reason: String,
        rollback: Option<String>,
    },

    #[error("Failed to read archive: {reason}")]
    #[diagnostic(
        code(skillet::install::archive_error),
        help("The file must be a valid zip archive containing at least one SKILL.md")
    )]
    ArchiveError { reason: String },

    #[error("Release tag '{tag}' does not apply to {what}")]
    #[diagnostic(
        code(skillet::install::tag_not_applicable),
        help("Skills nested in a monorepo track the repository's default branch; omit --tag")
    )]
    TagNotApplicable { what: String, tag: String },

    // Update errors
    #[error("Skill '{id}' is frozen")]
    #[diagnostic(
        code(skillet::update::frozen),
        help("Run 'skillet unfreeze <id>' first if you want to update it")
    )]
    Frozen { id: String },

    #[error("Skill '{id}' is not installed")]
    #[diagnostic(
        code(skillet::skill::not_found),
        help("Run 'skillet list' to see installed skills")
    )]
    SkillNotFound { id: String },

    #[error("Skill '{id}' has no remote source to update from")]
    #[diagnostic(
        code(skillet::update::no_source),
        help("Only skills installed from GitHub can be updated")
    )]
    NoUpdateSource { id: String },

    // Catalog errors
    #[error("Catalog entry '{id}' not found")]
    #[diagnostic(code(skillet::catalog::entry_not_found))]
    CatalogEntryNotFound { id: String },

    #[error("Unexpected catalog response: {reason}")]
    #[diagnostic(code(skillet::catalog::bad_response))]
    CatalogBadResponse { reason: String },

    // Store errors
    #[error("Failed to parse store file: {path}")]
    #[diagnostic(
        code(skillet::store::parse_failed),
        help("The store file is corrupt; fix or remove it and re-register your skills")
    )]
    StoreParseFailed { path: String, reason: String },

    #[error("Could not determine a config directory")]
    #[diagnostic(
        code(skillet::store::no_config_dir),
        help("Set SKILLET_CONFIG_DIR to a writable directory")
    )]
    NoConfigDir,

    // Settings errors
    #[error("Unknown setting '{key}'")]
    #[diagnostic(
        code(skillet::config::unknown_setting),
        help("Valid settings: token, skills-dir, auto-update")
    )]
    UnknownSetting { key: String },

    #[error("Invalid value '{value}' for setting '{key}'")]
    #[diagnostic(code(skillet::config::invalid_value))]
    InvalidSettingValue { key: String, value: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(skillet::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}")]
    #[diagnostic(code(skillet::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(skillet::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(skillet::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for SkilletError {
    fn from(err: std::io::Error) -> Self {
        SkilletError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SkilletError {
    fn from(err: serde_json::Error) -> Self {
        SkilletError::StoreParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for SkilletError {
    fn from(err: inquire::InquireError) -> Self {
        SkilletError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SkilletError>;
