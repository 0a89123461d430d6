//! Shared command state
//!
//! Everything a command needs for one invocation: the loaded store, the
//! resolved skills directory, filesystem and HTTP handles, and the GitHub
//! token. Built once in `main` and threaded through the command functions.

use std::path::PathBuf;

use crate::error::Result;
use crate::fsys::OsFileSystem;
use crate::github::GitHubClient;
use crate::github::http::UreqFetcher;
use crate::store::{self, Store};

pub struct CommandContext {
    pub fs: OsFileSystem,
    pub http: UreqFetcher,
    pub store: Store,
    pub store_path: PathBuf,
    pub skills_dir: PathBuf,
    pub token: Option<String>,
}

impl CommandContext {
    /// Loads the store and resolves the skills directory and token.
    ///
    /// The skills directory comes from the CLI flag, then the stored
    /// setting, then the default. The token comes from the CLI flag or
    /// `SKILLET_TOKEN`, then `GITHUB_TOKEN`, then the stored setting.
    pub fn load(skills_dir: Option<PathBuf>, token: Option<String>) -> Result<Self> {
        let fs = OsFileSystem;
        let store_path = store::store_path()?;
        let store = Store::load(&fs, &store_path)?;

        let skills_dir = match skills_dir {
            Some(dir) => dir,
            None => match &store.settings.skills_dir {
                Some(dir) => dir.clone(),
                None => store::default_skills_dir()?,
            },
        };
        let token = token
            .or_else(|| std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()))
            .or_else(|| store.settings.github_token.clone());

        Ok(Self {
            fs,
            http: UreqFetcher,
            store,
            store_path,
            skills_dir,
            token,
        })
    }

    /// GitHub client borrowing this context's transport and token.
    pub fn github(&self) -> GitHubClient<'_> {
        GitHubClient::new(&self.http, self.token.clone())
    }

    /// Path of the scan result cache, next to the store file.
    pub fn scan_cache_path(&self) -> PathBuf {
        self.store_path
            .with_file_name(crate::scanner::SCAN_CACHE_FILE)
    }

    pub fn save_store(&self) -> Result<()> {
        self.store.save(&self.fs, &self.store_path)
    }
}
