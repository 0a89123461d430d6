//! Version coercion and update checks
//!
//! Release tags in the wild range from `v1.2.3` over `1.2` to `latest`.
//! Comparison coerces tags into semantic versions where possible and treats
//! everything else as incomparable rather than failing the whole operation.

use semver::Version;

use crate::github::GitHubClient;
use crate::source::RepoId;

/// Coerce a tag into a semantic version. Strips one leading `v`/`V` and pads
/// partial numeric versions (`1`, `1.2`) with zeros. Returns `None` for
/// anything that still does not parse.
pub fn coerce_version(tag: &str) -> Option<Version> {
    let trimmed = tag.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let segments: Vec<&str> = trimmed.split('.').collect();
    if segments.len() > 2 {
        return None;
    }
    let all_numeric = segments
        .iter()
        .all(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()));
    if !all_numeric {
        return None;
    }
    let padded = match segments.as_slice() {
        [major] => format!("{major}.0.0"),
        [major, minor] => format!("{major}.{minor}.0"),
        _ => return None,
    };
    Version::parse(&padded).ok()
}

/// Outcome of comparing an installed version against the newest release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    /// The newest release is strictly newer than the installed version.
    Available { latest: String },
    UpToDate { latest: String },
    /// No releases, a fetch failure, or a version that does not coerce.
    Unavailable,
}

impl UpdateCheck {
    pub fn has_update(&self) -> bool {
        matches!(self, UpdateCheck::Available { .. })
    }
}

/// Compare the installed version against the newest release of `repo`.
/// Never errors: fetch failures and incomparable versions all collapse into
/// [`UpdateCheck::Unavailable`].
pub fn check_for_update(github: &GitHubClient, repo: &RepoId, installed: &str) -> UpdateCheck {
    let Some(local) = coerce_version(installed) else {
        return UpdateCheck::Unavailable;
    };
    let Ok(releases) = github.fetch_releases(repo) else {
        return UpdateCheck::Unavailable;
    };
    let Some(latest) = releases.first() else {
        return UpdateCheck::Unavailable;
    };
    let Some(remote) = coerce_version(&latest.tag) else {
        return UpdateCheck::Unavailable;
    };
    if remote > local {
        UpdateCheck::Available {
            latest: latest.tag.clone(),
        }
    } else {
        UpdateCheck::UpToDate {
            latest: latest.tag.clone(),
        }
    }
}
