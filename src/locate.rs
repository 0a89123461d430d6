//! Subpath locator for monorepos
//!
//! When a repository hosts many skills, the requested one has to be found
//! among every directory that carries a manifest. Matching runs in passes of
//! decreasing strictness and the first hit wins; exhausting all passes means
//! the hint matched nothing.

use crate::error::Result;
use crate::github::GitHubClient;
use crate::manifest::{MANIFEST_FILE, get_str, parse_frontmatter_and_body};
use crate::source::RepoId;

/// Locate the directory of the skill named by `hint` inside a repository
/// tree. Returns `None` when no manifest directory matches. A manifest at
/// the repository root is not a subpath and is never a candidate.
pub fn find_subpath(
    github: &GitHubClient,
    repo: &RepoId,
    hint: &str,
    git_ref: &str,
) -> Result<Option<String>> {
    let suffix = format!("/{MANIFEST_FILE}");
    let entries = github.fetch_tree(repo, git_ref)?;
    let candidates: Vec<String> = entries
        .iter()
        .filter_map(|entry| entry.path.strip_suffix(&suffix))
        .map(str::to_string)
        .collect();

    match candidates.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(only.clone())),
        _ => Ok(disambiguate(github, repo, git_ref, hint, &candidates)),
    }
}

fn disambiguate(
    github: &GitHubClient,
    repo: &RepoId,
    git_ref: &str,
    hint: &str,
    candidates: &[String],
) -> Option<String> {
    // Pass 1: exact path or folder name.
    if let Some(dir) = candidates
        .iter()
        .find(|dir| *dir == hint || folder_name(dir) == hint)
    {
        return Some(dir.clone());
    }

    // Pass 2: containment either direction.
    if let Some(dir) = candidates.iter().find(|dir| {
        let name = folder_name(dir);
        name.contains(hint) || hint.contains(name)
    }) {
        return Some(dir.clone());
    }

    // Pass 3: declared manifest names, exact then substring. Candidates
    // whose manifest cannot be fetched or parsed are skipped.
    let declared: Vec<(&String, String)> = candidates
        .iter()
        .filter_map(|dir| declared_name(github, repo, git_ref, dir).map(|name| (dir, name)))
        .collect();
    if let Some((dir, _)) = declared.iter().find(|(_, name)| name == hint) {
        return Some((*dir).clone());
    }
    declared
        .iter()
        .find(|(_, name)| name.contains(hint) || hint.contains(name.as_str()))
        .map(|(dir, _)| (*dir).clone())
}

fn folder_name(dir: &str) -> &str {
    dir.rsplit('/').next().unwrap_or(dir)
}

fn declared_name(
    github: &GitHubClient,
    repo: &RepoId,
    git_ref: &str,
    dir: &str,
) -> Option<String> {
    let path = format!("{dir}/{MANIFEST_FILE}");
    let bytes = github.fetch_raw(repo, git_ref, &path).ok()?;
    let content = String::from_utf8(bytes).ok()?;
    let (metadata, _) = parse_frontmatter_and_body(&content)?;
    get_str(&metadata, "name")
}
