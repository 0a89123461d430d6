//! Skill source resolution
//!
//! Parses a user-supplied reference string into a structured source: a
//! standalone repository, a subpath inside a monorepo, or an indirect catalog
//! entry. Resolution is pure string work; no network or filesystem access.

use std::fmt;

use crate::error::{Result, SkilletError};
use crate::manifest::MANIFEST_FILE;

/// Host whose skill URLs resolve to catalog entries.
pub const CATALOG_HOST: &str = "skillsmp.com";

/// GitHub repository coordinates.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse an `owner/name` pair. Extra segments are rejected.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split('/');
        let owner = parts.next()?;
        let name = parts.next()?;
        if parts.next().is_some() || !valid_segment(owner) || !valid_segment(name) {
            return None;
        }
        Some(Self::new(owner, name))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A resolved skill source. Created per request and consumed by one install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillSource {
    /// A repository whose root is the skill bundle.
    Standalone { repo: RepoId },
    /// A skill bundle nested under `subpath` inside a larger repository.
    Monorepo { repo: RepoId, subpath: String },
    /// An entry on the skill catalog, resolved to a repository later.
    Catalog { id: String },
}

impl SkillSource {
    /// Parse a reference string. Rules are tried in order, first match wins:
    /// catalog URL, GitHub URL with nested path, plain GitHub URL,
    /// `owner/repo` shorthand, shorthand with extra subpath segments.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_end_matches('/');

        if let Some(id) = parse_catalog_url(trimmed) {
            return Ok(SkillSource::Catalog { id });
        }
        if let Some(source) = parse_github_url(trimmed) {
            return Ok(source);
        }
        if let Some(source) = parse_shorthand(trimmed) {
            return Ok(source);
        }

        Err(SkilletError::SourceNotRecognized {
            input: input.to_string(),
        })
    }
}

/// Catalog skill URL: `https://skillsmp.com/skills/{id}`.
fn parse_catalog_url(input: &str) -> Option<String> {
    let rest = strip_scheme(input)?;
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let rest = rest.strip_prefix(CATALOG_HOST)?;
    let id = rest.strip_prefix("/skills/")?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some(id.to_string())
}

/// GitHub URL, plain or with a nested path. Web UI URLs embed
/// `/tree/{ref}/` or `/blob/{ref}/` before the path; the ref segment is
/// skipped since fetching resolves its own reference.
fn parse_github_url(input: &str) -> Option<SkillSource> {
    let rest = strip_scheme(input)?;
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let rest = rest.strip_prefix("github.com/")?;

    let parts: Vec<&str> = rest.split('/').collect();
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    let name = parts[1].trim_end_matches(".git");
    if !valid_segment(parts[0]) || !valid_segment(name) {
        return None;
    }
    let repo = RepoId::new(parts[0], name);

    let extra: &[&str] = match parts.get(2) {
        Some(&"tree" | &"blob") if parts.len() > 4 => &parts[4..],
        Some(&"tree" | &"blob") => &[],
        Some(_) => &parts[2..],
        None => &[],
    };
    Some(source_with_subpath(repo, extra))
}

/// Shorthand `owner/repo` with optional extra subpath segments.
fn parse_shorthand(input: &str) -> Option<SkillSource> {
    if input.contains("://") || input.starts_with('/') || input.starts_with("git@") {
        return None;
    }
    let parts: Vec<&str> = input.split('/').collect();
    if parts.len() < 2 || !parts.iter().all(|p| valid_segment(p)) {
        return None;
    }
    let repo = RepoId::new(parts[0], parts[1].trim_end_matches(".git"));
    Some(source_with_subpath(repo, &parts[2..]))
}

fn source_with_subpath(repo: RepoId, segments: &[&str]) -> SkillSource {
    // A pasted link to the manifest itself points at its directory.
    let segments = match segments.last() {
        Some(&last) if last == MANIFEST_FILE => &segments[..segments.len() - 1],
        _ => segments,
    };
    if segments.is_empty() {
        SkillSource::Standalone { repo }
    } else {
        SkillSource::Monorepo {
            repo,
            subpath: segments.join("/"),
        }
    }
}

fn strip_scheme(input: &str) -> Option<&str> {
    input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
}

/// A single plain name segment: no separators, no relative-directory names.
pub(crate) fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
