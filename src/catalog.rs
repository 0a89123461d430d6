//! Skill catalog client
//!
//! Resolves indirect catalog references to the repository that actually
//! hosts the skill, and performs the one paginated search call the CLI
//! exposes. Everything else about the catalog (browsing, rating, publishing)
//! is out of scope.

use serde::Deserialize;

use crate::error::{Result, SkilletError};
use crate::github::http::HttpFetch;
use crate::source::{CATALOG_HOST, SkillSource};

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
}

/// One page of catalog search results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub skills: Vec<CatalogEntry>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
}

pub struct CatalogClient<'a> {
    http: &'a dyn HttpFetch,
}

impl<'a> CatalogClient<'a> {
    pub fn new(http: &'a dyn HttpFetch) -> Self {
        Self { http }
    }

    /// Resolves a catalog id to the concrete source its entry points at.
    pub fn resolve_entry(&self, id: &str) -> Result<SkillSource> {
        let url = format!("{}/{id}", api_base());
        let response = self.http.get(&url, None)?;
        if response.status == 404 {
            return Err(SkilletError::CatalogEntryNotFound { id: id.to_string() });
        }
        if !response.is_success() {
            return Err(SkilletError::RemoteError {
                status: response.status,
                url,
            });
        }
        let entry: CatalogEntry =
            serde_json::from_slice(&response.body).map_err(|err| {
                SkilletError::CatalogBadResponse {
                    reason: err.to_string(),
                }
            })?;
        let Some(github_url) = entry.github_url else {
            return Err(SkilletError::CatalogBadResponse {
                reason: format!("entry '{id}' does not name a source repository"),
            });
        };
        match SkillSource::parse(&github_url) {
            Ok(SkillSource::Catalog { .. }) => Err(SkilletError::CatalogBadResponse {
                reason: format!("entry '{id}' points at another catalog entry"),
            }),
            Ok(source) => Ok(source),
            Err(_) => Err(SkilletError::CatalogBadResponse {
                reason: format!("entry '{id}' has an unusable source URL: {github_url}"),
            }),
        }
    }

    /// Fetches one page of search results.
    pub fn search(&self, query: &str, page: u32) -> Result<SearchResults> {
        let url = format!(
            "{}?q={}&page={page}",
            api_base(),
            urlencoding::encode(query)
        );
        let response = self.http.get(&url, None)?;
        if !response.is_success() {
            return Err(SkilletError::RemoteError {
                status: response.status,
                url,
            });
        }
        serde_json::from_slice(&response.body).map_err(|err| SkilletError::CatalogBadResponse {
            reason: err.to_string(),
        })
    }
}

fn api_base() -> String {
    format!("https://{CATALOG_HOST}/api/skills")
}
