//! GitHub remote fetcher
//!
//! Retrieves releases, repository trees, and raw file content over the
//! GitHub REST and raw-content endpoints, assembling bundle [`FileSet`]s.
//! Release lookup prefers a published `SKILL.md` asset; the repository tree
//! at the resolved reference is always merged in afterwards so secondary
//! resources (scripts, references) are captured even with partial releases.

pub mod http;

use std::cmp::Ordering;

use serde::Deserialize;

use crate::error::{Result, SkilletError};
use crate::fileset::FileSet;
use crate::manifest::MANIFEST_FILE;
use crate::source::RepoId;
use crate::version::coerce_version;

use http::{HttpFetch, HttpResponse};

pub const API_BASE: &str = "https://api.github.com";
pub const RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Used when the default branch cannot be determined.
pub const FALLBACK_BRANCH: &str = "main";

/// A published release, as returned by the releases API.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// One blob entry of a repository tree.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: String,
}

/// GitHub API client. All requests go through the injected transport.
pub struct GitHubClient<'a> {
    http: &'a dyn HttpFetch,
    token: Option<String>,
}

impl<'a> GitHubClient<'a> {
    pub fn new(http: &'a dyn HttpFetch, token: Option<String>) -> Self {
        Self { http, token }
    }

    /// Fetch all releases for a repository. Prereleases are excluded unless
    /// the repository has nothing else; the result is sorted by coerced
    /// semantic version, descending, with non-semver tags last.
    pub fn fetch_releases(&self, repo: &RepoId) -> Result<Vec<Release>> {
        let url = format!("{API_BASE}/repos/{repo}/releases?per_page=100");
        let response = self.get_checked(&url)?;
        let releases: Vec<Release> = parse_payload(&url, &response)?;

        let stable: Vec<Release> = releases
            .iter()
            .filter(|release| !release.prerelease)
            .cloned()
            .collect();
        let mut chosen = if stable.is_empty() { releases } else { stable };
        chosen.sort_by(|a, b| compare_tags_desc(&a.tag, &b.tag));
        Ok(chosen)
    }

    /// Fetch the full file set of a standalone bundle. The manifest comes
    /// from a release asset named `SKILL.md` when one is published, else from
    /// raw content at the resolved reference. Per-file failures while merging
    /// the tree are swallowed; the returned set may lack a manifest, which
    /// the caller must reject.
    pub fn fetch_bundle_files(&self, repo: &RepoId, release: Option<&Release>) -> Result<FileSet> {
        let git_ref = match release {
            Some(release) => release.tag.clone(),
            None => self.fetch_default_branch(repo),
        };

        let mut files = FileSet::new();
        let manifest_asset = release
            .and_then(|release| release.assets.iter().find(|asset| asset.name == MANIFEST_FILE));
        let manifest = match manifest_asset {
            Some(asset) => self
                .download_asset(asset)
                .ok()
                .or_else(|| self.fetch_raw(repo, &git_ref, MANIFEST_FILE).ok()),
            None => self.fetch_raw(repo, &git_ref, MANIFEST_FILE).ok(),
        };
        if let Some(contents) = manifest {
            files.insert(MANIFEST_FILE, contents);
        }

        match self.fetch_tree(repo, &git_ref) {
            Ok(entries) => {
                for entry in entries {
                    if files.contains(&entry.path) {
                        continue;
                    }
                    if let Ok(contents) = self.fetch_raw(repo, &git_ref, &entry.path) {
                        files.insert_if_absent(&entry.path, contents);
                    }
                }
            }
            // With a manifest in hand a partial set is still installable.
            Err(err) if files.is_empty() => return Err(err),
            Err(_) => {}
        }

        Ok(files)
    }

    /// Fetch the files under one subdirectory of a repository, keyed relative
    /// to the subpath. Per-file failures are swallowed.
    pub fn fetch_subdir_files(
        &self,
        repo: &RepoId,
        subpath: &str,
        git_ref: &str,
    ) -> Result<FileSet> {
        let prefix = format!("{}/", subpath.trim_end_matches('/'));
        let mut files = FileSet::new();
        for entry in self.fetch_tree(repo, git_ref)? {
            let Some(relative) = entry.path.strip_prefix(&prefix) else {
                continue;
            };
            if let Ok(contents) = self.fetch_raw(repo, git_ref, &entry.path) {
                files.insert(relative, contents);
            }
        }
        Ok(files)
    }

    /// Best-effort default branch lookup; falls back to `main`, never errors.
    pub fn fetch_default_branch(&self, repo: &RepoId) -> String {
        let url = format!("{API_BASE}/repos/{repo}");
        let Ok(response) = self.http.get(&url, self.token.as_deref()) else {
            return FALLBACK_BRANCH.to_string();
        };
        if !response.is_success() {
            return FALLBACK_BRANCH.to_string();
        }
        serde_json::from_slice::<RepoInfo>(&response.body)
            .map(|info| info.default_branch)
            .unwrap_or_else(|_| FALLBACK_BRANCH.to_string())
    }

    /// List every blob in the repository tree at a reference.
    pub fn fetch_tree(&self, repo: &RepoId, git_ref: &str) -> Result<Vec<TreeEntry>> {
        let url = format!("{API_BASE}/repos/{repo}/git/trees/{git_ref}?recursive=1");
        let response = self.get_checked(&url)?;
        let tree: TreeResponse = parse_payload(&url, &response)?;
        Ok(tree
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .collect())
    }

    /// Fetch one file's raw content at a reference.
    pub fn fetch_raw(&self, repo: &RepoId, git_ref: &str, path: &str) -> Result<Vec<u8>> {
        let url = format!("{RAW_BASE}/{repo}/{git_ref}/{path}");
        Ok(self.get_checked(&url)?.body)
    }

    fn download_asset(&self, asset: &ReleaseAsset) -> Result<Vec<u8>> {
        Ok(self.get_checked(&asset.download_url)?.body)
    }

    pub(crate) fn get_checked(&self, url: &str) -> Result<HttpResponse> {
        let response = self.http.get(url, self.token.as_deref())?;
        if response.is_success() {
            return Ok(response);
        }
        Err(classify_failure(url, &response))
    }
}

/// Map a non-2xx response to the error taxonomy. Quota exhaustion is
/// distinguished from a generic 403 via the rate-limit header or body text.
fn classify_failure(url: &str, response: &HttpResponse) -> SkilletError {
    if response.status == 404 {
        return SkilletError::RemoteNotFound {
            what: url.to_string(),
        };
    }
    if response.status == 403 || response.status == 429 {
        let remaining_zero = response.header("x-ratelimit-remaining") == Some("0");
        let body_mentions = response.body_text().to_lowercase().contains("rate limit");
        if remaining_zero || body_mentions {
            return SkilletError::RateLimited;
        }
    }
    SkilletError::RemoteError {
        status: response.status,
        url: url.to_string(),
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(url: &str, response: &HttpResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|err| SkilletError::RemoteBadPayload {
        url: url.to_string(),
        reason: err.to_string(),
    })
}

/// Descending by coerced version; tags that do not coerce keep their
/// relative order after every coercible tag.
fn compare_tags_desc(a: &str, b: &str) -> Ordering {
    match (coerce_version(a), coerce_version(b)) {
        (Some(va), Some(vb)) => vb.cmp(&va),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
