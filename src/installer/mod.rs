//! Staged skill installation
//!
//! This module handles:
//! - Resolving a release and fetching the bundle file set
//! - Writing the set to a hidden staging directory and validating it there
//! - Promoting staging to the final path with backup and rollback
//! - Normalizing manifest metadata and persisting install state
//!
//! Every directory operation goes through the [`FileSystem`] capability so
//! the whole protocol is testable against an in-memory fake.

pub mod archive;
pub mod staging;

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{Result, SkilletError};
use crate::fileset::FileSet;
use crate::fsys::FileSystem;
use crate::github::GitHubClient;
use crate::locate::find_subpath;
use crate::manifest::{self, MANIFEST_FILE, Origin};
use crate::source::RepoId;
use crate::store::{SkillState, SourceKind, Store};

/// Outcome of one successful install.
#[derive(Debug, Clone)]
pub struct InstalledSkill {
    pub id: String,
    pub path: PathBuf,
    pub version: Option<String>,
    pub source: SourceKind,
}

/// Outcome of an archive install: bundles succeed and fail independently.
#[derive(Debug, Default)]
pub struct ArchiveReport {
    pub installed: Vec<InstalledSkill>,
    pub errors: Vec<String>,
}

pub struct Installer<'a> {
    fs: &'a dyn FileSystem,
    github: &'a GitHubClient<'a>,
    store: &'a mut Store,
    skills_dir: PathBuf,
}

impl<'a> Installer<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        github: &'a GitHubClient<'a>,
        store: &'a mut Store,
        skills_dir: PathBuf,
    ) -> Self {
        Self {
            fs,
            github,
            store,
            skills_dir,
        }
    }

    /// Installs a skill from GitHub, standalone or from a monorepo subpath.
    /// Release tags only make sense for standalone installs; a subpath
    /// combined with an explicit tag is rejected up front.
    pub fn install(
        &mut self,
        repo: &RepoId,
        subpath: Option<&str>,
        tag: Option<&str>,
    ) -> Result<InstalledSkill> {
        match subpath {
            None => self.install_standalone(repo, tag),
            Some(subpath) => {
                if let Some(tag) = tag {
                    return Err(SkilletError::TagNotApplicable {
                        what: format!("{repo}/{subpath}"),
                        tag: tag.to_string(),
                    });
                }
                self.install_monorepo(repo, subpath)
            }
        }
    }

    fn install_standalone(&mut self, repo: &RepoId, tag: Option<&str>) -> Result<InstalledSkill> {
        let releases = self.github.fetch_releases(repo)?;
        let release = match tag {
            Some(tag) => Some(releases.iter().find(|release| release.tag == tag).ok_or_else(
                || SkilletError::ReleaseNotFound {
                    repo: repo.to_string(),
                    tag: tag.to_string(),
                },
            )?),
            None => releases.first(),
        };

        let files = self.github.fetch_bundle_files(repo, release)?;
        if !files.has_manifest() {
            return Err(SkilletError::NoManifest {
                origin: repo.to_string(),
            });
        }

        let version = release.map(|release| release.tag.clone());
        let origin = Origin::Github {
            repo: repo.to_string(),
            version: version.clone(),
        };
        let id = repo.name.clone();
        let path = self.install_file_set(&id, &files, &origin)?;

        let mut state = SkillState::new(SourceKind::Github);
        state.repo = Some(repo.to_string());
        state.version = version.clone();
        self.store.insert(&id, state);

        Ok(InstalledSkill {
            id,
            path,
            version,
            source: SourceKind::Github,
        })
    }

    fn install_monorepo(&mut self, repo: &RepoId, subpath: &str) -> Result<InstalledSkill> {
        let git_ref = self.github.fetch_default_branch(repo);
        let mut resolved = subpath.trim_matches('/').to_string();
        let mut files = self.github.fetch_subdir_files(repo, &resolved, &git_ref)?;

        // The given subpath may be a hint rather than an exact directory.
        if !files.has_manifest() {
            let hint = leaf(&resolved).to_string();
            if let Some(found) = find_subpath(self.github, repo, &hint, &git_ref)? {
                if found != resolved {
                    files = self.github.fetch_subdir_files(repo, &found, &git_ref)?;
                    resolved = found;
                }
            }
        }
        if !files.has_manifest() {
            return Err(SkilletError::NoManifest {
                origin: format!("{repo}/{subpath}"),
            });
        }

        let id = leaf(&resolved).to_string();
        let origin_repo = format!("{repo}/{resolved}");
        let origin = Origin::Github {
            repo: origin_repo.clone(),
            version: None,
        };
        let path = self.install_file_set(&id, &files, &origin)?;

        let mut state = SkillState::new(SourceKind::Github);
        state.repo = Some(origin_repo);
        self.store.insert(&id, state);

        Ok(InstalledSkill {
            id,
            path,
            version: None,
            source: SourceKind::Github,
        })
    }

    /// Installs every bundle found in a zip archive. Bundles succeed and
    /// fail independently; an archive with no manifest at all is an error.
    pub fn install_archive(&mut self, bytes: &[u8]) -> Result<ArchiveReport> {
        let files = archive::read_archive(bytes)?;
        let bundles = archive::split_bundles(&files);
        if bundles.is_empty() {
            return Err(SkilletError::NoManifest {
                origin: "archive".to_string(),
            });
        }

        let mut report = ArchiveReport::default();
        for bundle in bundles {
            let Some(id) = bundle.id else {
                let at = if bundle.root.is_empty() {
                    "the archive root".to_string()
                } else {
                    format!("'{}'", bundle.root)
                };
                report
                    .errors
                    .push(format!("bundle at {at} has no usable name"));
                continue;
            };
            match self.install_file_set(&id, &bundle.files, &Origin::Archive) {
                Ok(path) => {
                    self.store.insert(&id, SkillState::new(SourceKind::Archive));
                    report.installed.push(InstalledSkill {
                        id,
                        path,
                        version: None,
                        source: SourceKind::Archive,
                    });
                }
                Err(err) => report.errors.push(format!("{id}: {err}")),
            }
        }
        Ok(report)
    }

    /// Registers an existing directory as a skill without copying files.
    pub fn register_local(&mut self, dir: &Path) -> Result<InstalledSkill> {
        let validation = manifest::validate_dir(self.fs, dir);
        if !validation.valid {
            return Err(SkilletError::ValidationFailed {
                errors: validation.errors,
            });
        }

        let id = self
            .declared_name(dir)
            .or_else(|| {
                dir.file_name()
                    .map(|name| name.to_string_lossy().to_string())
            })
            .ok_or_else(|| SkilletError::ValidationFailed {
                errors: vec!["cannot derive a name for the directory".to_string()],
            })?;

        let mut state = SkillState::new(SourceKind::Local);
        state.path = Some(dir.to_path_buf());
        self.store.insert(&id, state);

        Ok(InstalledSkill {
            id,
            path: dir.to_path_buf(),
            version: None,
            source: SourceKind::Local,
        })
    }

    /// Re-installs a skill from its recorded source. Frozen skills fail
    /// before any network traffic.
    pub fn update(&mut self, id: &str, tag: Option<&str>) -> Result<InstalledSkill> {
        let state = self
            .store
            .get(id)
            .ok_or_else(|| SkilletError::SkillNotFound { id: id.to_string() })?;
        if state.frozen {
            return Err(SkilletError::Frozen { id: id.to_string() });
        }
        if state.source != SourceKind::Github {
            return Err(SkilletError::NoUpdateSource { id: id.to_string() });
        }
        let repo_field = state
            .repo
            .clone()
            .ok_or_else(|| SkilletError::NoUpdateSource { id: id.to_string() })?;
        let (repo, subpath) = split_repo_field(&repo_field)
            .ok_or_else(|| SkilletError::NoUpdateSource { id: id.to_string() })?;

        let installed = self.install(&repo, subpath.as_deref(), tag)?;

        // Stamp the freshly persisted record, not the pre-update copy.
        if let Some(fresh) = self.store.get_mut(&installed.id) {
            fresh.last_updated_at = Some(Utc::now());
        }
        Ok(installed)
    }

    /// Removes the installed directory and the state entry. Directory
    /// removal is best effort and never blocks deregistration. Local
    /// registrations keep their directory.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(state) = self.store.get(id) else {
            return Ok(false);
        };
        if state.source != SourceKind::Local {
            let dir = self.skills_dir.join(id);
            if self.fs.exists(&dir) {
                staging::cleanup(self.fs, &dir, "skill");
            }
        }
        self.store.remove(id);
        Ok(true)
    }

    /// The path a skill lives at: its recorded directory for local
    /// registrations, the skills directory entry otherwise.
    pub fn skill_path(&self, id: &str) -> Option<PathBuf> {
        let state = self.store.get(id)?;
        match &state.path {
            Some(path) => Some(path.clone()),
            None => Some(self.skills_dir.join(id)),
        }
    }

    /// Steps shared by every install flavor: stage, validate, promote,
    /// normalize.
    fn install_file_set(&self, id: &str, files: &FileSet, origin: &Origin) -> Result<PathBuf> {
        let final_path = self.skills_dir.join(id);
        let staging_dir = staging::staging_path(&final_path, id);

        if let Err(err) = staging::write_file_set(self.fs, &staging_dir, files) {
            staging::cleanup(self.fs, &staging_dir, "staging");
            return Err(err);
        }

        let validation = manifest::validate_dir(self.fs, &staging_dir);
        if !validation.valid {
            staging::cleanup(self.fs, &staging_dir, "staging");
            return Err(SkilletError::ValidationFailed {
                errors: validation.errors,
            });
        }

        if let Err(err) = staging::promote(self.fs, &staging_dir, &final_path, id) {
            staging::cleanup(self.fs, &staging_dir, "staging");
            return Err(err);
        }

        self.normalize_manifest(&final_path, origin)?;
        Ok(final_path)
    }

    fn normalize_manifest(&self, bundle_dir: &Path, origin: &Origin) -> Result<()> {
        let manifest_path = bundle_dir.join(MANIFEST_FILE);
        let bytes = self
            .fs
            .read(&manifest_path)
            .map_err(|err| SkilletError::FileReadFailed {
                path: manifest_path.display().to_string(),
                reason: err.to_string(),
            })?;
        let Ok(content) = String::from_utf8(bytes) else {
            return Ok(());
        };
        let normalized = manifest::normalize(&content, origin);
        if normalized != content {
            self.fs
                .write(&manifest_path, normalized.as_bytes())
                .map_err(|err| SkilletError::FileWriteFailed {
                    path: manifest_path.display().to_string(),
                    reason: err.to_string(),
                })?;
        }
        Ok(())
    }

    fn declared_name(&self, dir: &Path) -> Option<String> {
        let bytes = self.fs.read(&dir.join(MANIFEST_FILE)).ok()?;
        let content = String::from_utf8(bytes).ok()?;
        let (metadata, _) = manifest::parse_frontmatter_and_body(&content)?;
        manifest::get_str(&metadata, "name").filter(|name| !name.is_empty())
    }
}

fn leaf(subpath: &str) -> &str {
    subpath
        .trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(subpath)
}

/// Splits a stored `owner/repo` or `owner/repo/subpath` reference.
pub fn split_repo_field(field: &str) -> Option<(RepoId, Option<String>)> {
    let parts: Vec<&str> = field.split('/').filter(|part| !part.is_empty()).collect();
    if parts.len() < 2 {
        return None;
    }
    let repo = RepoId::new(parts[0], parts[1]);
    let subpath = if parts.len() > 2 {
        Some(parts[2..].join("/"))
    } else {
        None
    };
    Some((repo, subpath))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsys::MemoryFileSystem;
    use crate::github::http::FakeHttp;
    use crate::github::{API_BASE, RAW_BASE};
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const SKILLS: &str = "/skills";

    fn repo() -> RepoId {
        RepoId::new("owner", "repo")
    }

    fn manifest_with(name: &str) -> String {
        format!("---\nname: {name}\ndescription: does things\n---\nInstructions.\n")
    }

    fn register_releases(http: &FakeHttp, tags: &[&str]) {
        let entries: Vec<serde_json::Value> = tags
            .iter()
            .map(|tag| serde_json::json!({ "tag_name": tag, "prerelease": false }))
            .collect();
        http.on(
            &format!("{API_BASE}/repos/owner/repo/releases?per_page=100"),
            200,
            serde_json::json!(entries).to_string(),
        );
    }

    fn register_tree(http: &FakeHttp, git_ref: &str, paths: &[&str]) {
        let entries: Vec<serde_json::Value> = paths
            .iter()
            .map(|path| serde_json::json!({ "path": path, "type": "blob" }))
            .collect();
        http.on(
            &format!("{API_BASE}/repos/owner/repo/git/trees/{git_ref}?recursive=1"),
            200,
            serde_json::json!({ "tree": entries }).to_string(),
        );
    }

    fn register_raw(http: &FakeHttp, git_ref: &str, path: &str, content: &str) {
        http.on(
            &format!("{RAW_BASE}/owner/repo/{git_ref}/{path}"),
            200,
            content,
        );
    }

    fn register_default_branch(http: &FakeHttp, branch: &str) {
        http.on(
            &format!("{API_BASE}/repos/owner/repo"),
            200,
            serde_json::json!({ "default_branch": branch }).to_string(),
        );
    }

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut cursor);
        for (name, contents) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_install_standalone_release() {
        let http = FakeHttp::new();
        register_releases(&http, &["v1.2.0", "v1.0.0"]);
        register_tree(&http, "v1.2.0", &["SKILL.md", "scripts/run.sh"]);
        register_raw(&http, "v1.2.0", "SKILL.md", &manifest_with("repo"));
        register_raw(&http, "v1.2.0", "scripts/run.sh", "echo run");

        let fs = MemoryFileSystem::new();
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        let installed = installer.install(&repo(), None, None).unwrap();
        assert_eq!(installed.id, "repo");
        assert_eq!(installed.version.as_deref(), Some("v1.2.0"));

        let manifest = fs.read_string(Path::new("/skills/repo/SKILL.md")).unwrap();
        assert!(manifest.contains("source: github"));
        assert!(manifest.contains("repo: owner/repo"));
        assert!(manifest.contains("version: v1.2.0"));
        assert!(fs.exists(Path::new("/skills/repo/scripts/run.sh")));

        let state = store.get("repo").unwrap();
        assert_eq!(state.version.as_deref(), Some("v1.2.0"));
        assert_eq!(state.source, SourceKind::Github);
    }

    #[test]
    fn test_install_without_release_has_no_version() {
        let http = FakeHttp::new();
        register_releases(&http, &[]);
        register_default_branch(&http, "main");
        register_tree(&http, "main", &["SKILL.md"]);
        register_raw(&http, "main", "SKILL.md", &manifest_with("repo"));

        let fs = MemoryFileSystem::new();
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        let installed = installer.install(&repo(), None, None).unwrap();
        assert_eq!(installed.version, None);
        assert!(store.get("repo").unwrap().version.is_none());

        // The manifest still gets the template's baseline version.
        let manifest = fs.read_string(Path::new("/skills/repo/SKILL.md")).unwrap();
        assert!(manifest.contains("version: 1.0.0"));
    }

    #[test]
    fn test_explicit_missing_tag_fails_fast() {
        let http = FakeHttp::new();
        register_releases(&http, &["v1.0.0"]);

        let fs = MemoryFileSystem::new();
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        let err = installer.install(&repo(), None, Some("v9.9.9")).unwrap_err();
        assert!(matches!(err, SkilletError::ReleaseNotFound { .. }));
        // Only the release listing was fetched.
        assert_eq!(http.call_count(), 1);
    }

    #[test]
    fn test_missing_manifest_never_touches_final_path() {
        let http = FakeHttp::new();
        register_releases(&http, &[]);
        register_default_branch(&http, "main");
        register_tree(&http, "main", &["README.md"]);
        register_raw(&http, "main", "README.md", "not a skill");

        let fs = MemoryFileSystem::new();
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        let err = installer.install(&repo(), None, None).unwrap_err();
        assert!(matches!(err, SkilletError::NoManifest { .. }));
        assert!(!fs.exists(Path::new("/skills/repo")));
        assert!(fs.file_paths().is_empty());
        assert!(store.get("repo").is_none());
    }

    #[test]
    fn test_validation_failure_cleans_staging_and_keeps_prior() {
        let http = FakeHttp::new();
        register_releases(&http, &[]);
        register_default_branch(&http, "main");
        register_tree(&http, "main", &["SKILL.md"]);
        // Manifest exists but has no metadata block.
        register_raw(&http, "main", "SKILL.md", "just prose, no frontmatter");

        let fs = MemoryFileSystem::new();
        fs.add_file(Path::new("/skills/repo/SKILL.md"), b"prior install");
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        let err = installer.install(&repo(), None, None).unwrap_err();
        assert!(matches!(err, SkilletError::ValidationFailed { .. }));
        assert_eq!(
            fs.read_string(Path::new("/skills/repo/SKILL.md")),
            Some("prior install".to_string())
        );
        // No staging directory lingers.
        let entries = fs.list(Path::new(SKILLS)).unwrap();
        assert_eq!(entries.dirs, vec!["repo"]);
    }

    #[test]
    fn test_failed_promotion_restores_prior_version() {
        let http = FakeHttp::new();
        register_releases(&http, &["v2.0.0"]);
        register_tree(&http, "v2.0.0", &["SKILL.md"]);
        register_raw(&http, "v2.0.0", "SKILL.md", &manifest_with("repo"));

        let fs = MemoryFileSystem::new();
        fs.add_file(Path::new("/skills/repo/SKILL.md"), b"prior install");
        fs.fail_next_rename_to(Path::new("/skills/repo"));

        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        let err = installer.install(&repo(), None, None).unwrap_err();
        assert!(matches!(err, SkilletError::PromotionFailed { .. }));
        assert_eq!(
            fs.read_string(Path::new("/skills/repo/SKILL.md")),
            Some("prior install".to_string())
        );
        let entries = fs.list(Path::new(SKILLS)).unwrap();
        assert_eq!(entries.dirs, vec!["repo"]);
    }

    #[test]
    fn test_monorepo_install_retries_through_locator() {
        let http = FakeHttp::new();
        register_default_branch(&http, "main");
        register_tree(
            &http,
            "main",
            &["README.md", "skills/pdf/SKILL.md", "skills/pdf/refs/a.md"],
        );
        register_raw(&http, "main", "skills/pdf/SKILL.md", &manifest_with("pdf"));
        register_raw(&http, "main", "skills/pdf/refs/a.md", "reference");

        let fs = MemoryFileSystem::new();
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        // "pdf" is a hint, the real directory is skills/pdf.
        let installed = installer.install(&repo(), Some("pdf"), None).unwrap();
        assert_eq!(installed.id, "pdf");
        assert!(fs.exists(Path::new("/skills/pdf/refs/a.md")));

        let state = store.get("pdf").unwrap();
        assert_eq!(state.repo.as_deref(), Some("owner/repo/skills/pdf"));
        assert!(state.version.is_none());
    }

    #[test]
    fn test_monorepo_without_manifest_anywhere() {
        let http = FakeHttp::new();
        register_default_branch(&http, "main");
        register_tree(&http, "main", &["README.md", "src/lib.rs"]);

        let fs = MemoryFileSystem::new();
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        let err = installer.install(&repo(), Some("pdf"), None).unwrap_err();
        assert!(matches!(err, SkilletError::NoManifest { .. }));
    }

    #[test]
    fn test_monorepo_install_rejects_explicit_tag() {
        let http = FakeHttp::new();
        let fs = MemoryFileSystem::new();
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        let err = installer
            .install(&repo(), Some("skills/pdf"), Some("v1.0.0"))
            .unwrap_err();
        assert!(matches!(err, SkilletError::TagNotApplicable { .. }));
        // Rejected before any fetch.
        assert_eq!(http.call_count(), 0);
    }

    #[test]
    fn test_archive_installs_bundles_independently() {
        let bytes = build_zip(&[
            ("pack/skill-a/SKILL.md", &manifest_with("skill-a")),
            ("pack/skill-a/scripts/go.sh", "echo a"),
            ("pack/skill-b/SKILL.md", "broken, no frontmatter"),
        ]);

        let http = FakeHttp::new();
        let fs = MemoryFileSystem::new();
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        let report = installer.install_archive(&bytes).unwrap();
        assert_eq!(report.installed.len(), 1);
        assert_eq!(report.installed[0].id, "skill-a");
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("skill-b:"));

        // Wrapper stripped, files in place, archive origin stamped.
        let manifest = fs
            .read_string(Path::new("/skills/skill-a/SKILL.md"))
            .unwrap();
        assert!(manifest.contains("source: archive"));
        assert!(fs.exists(Path::new("/skills/skill-a/scripts/go.sh")));
        assert!(!fs.exists(Path::new("/skills/skill-b")));

        assert_eq!(store.get("skill-a").unwrap().source, SourceKind::Archive);
        assert!(store.get("skill-b").is_none());
    }

    #[test]
    fn test_archive_without_manifest_is_an_error() {
        let bytes = build_zip(&[("README.md", "nothing")]);

        let http = FakeHttp::new();
        let fs = MemoryFileSystem::new();
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        assert!(matches!(
            installer.install_archive(&bytes),
            Err(SkilletError::NoManifest { .. })
        ));
    }

    #[test]
    fn test_register_local_records_without_copying() {
        let http = FakeHttp::new();
        let fs = MemoryFileSystem::new();
        fs.add_file(
            Path::new("/elsewhere/my-skill/SKILL.md"),
            manifest_with("my-skill").as_bytes(),
        );
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        let installed = installer
            .register_local(Path::new("/elsewhere/my-skill"))
            .unwrap();
        assert_eq!(installed.id, "my-skill");
        assert_eq!(installed.path, PathBuf::from("/elsewhere/my-skill"));

        // Nothing copied into the skills directory.
        assert!(!fs.exists(Path::new("/skills/my-skill")));
        let state = store.get("my-skill").unwrap();
        assert_eq!(state.source, SourceKind::Local);
        assert_eq!(state.path, Some(PathBuf::from("/elsewhere/my-skill")));
    }

    #[test]
    fn test_register_local_rejects_invalid_directory() {
        let http = FakeHttp::new();
        let fs = MemoryFileSystem::new();
        fs.add_dir(Path::new("/elsewhere/empty"));
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));

        assert!(matches!(
            installer.register_local(Path::new("/elsewhere/empty")),
            Err(SkilletError::ValidationFailed { .. })
        ));
        assert!(store.skills.is_empty());
    }

    #[test]
    fn test_update_frozen_skill_makes_no_request() {
        let http = FakeHttp::new();
        let fs = MemoryFileSystem::new();
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut state = SkillState::new(SourceKind::Github);
        state.repo = Some("owner/repo".to_string());
        state.version = Some("v1.0.0".to_string());
        state.frozen = true;
        store.insert("repo", state);

        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));
        let err = installer.update("repo", None).unwrap_err();
        assert!(matches!(err, SkilletError::Frozen { .. }));
        assert_eq!(http.call_count(), 0);
        assert_eq!(store.get("repo").unwrap().version.as_deref(), Some("v1.0.0"));
    }

    #[test]
    fn test_update_reinstalls_and_restamps() {
        let http = FakeHttp::new();
        register_releases(&http, &["v2.0.0"]);
        register_tree(&http, "v2.0.0", &["SKILL.md"]);
        register_raw(&http, "v2.0.0", "SKILL.md", &manifest_with("repo"));

        let fs = MemoryFileSystem::new();
        fs.add_file(Path::new("/skills/repo/SKILL.md"), b"old");
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut state = SkillState::new(SourceKind::Github);
        state.repo = Some("owner/repo".to_string());
        state.version = Some("v1.0.0".to_string());
        store.insert("repo", state);

        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));
        let installed = installer.update("repo", None).unwrap();
        assert_eq!(installed.version.as_deref(), Some("v2.0.0"));

        let fresh = store.get("repo").unwrap();
        assert_eq!(fresh.version.as_deref(), Some("v2.0.0"));
        assert!(fresh.last_updated_at.is_some());
    }

    #[test]
    fn test_update_archive_skill_has_no_source() {
        let http = FakeHttp::new();
        let fs = MemoryFileSystem::new();
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        store.insert("pack", SkillState::new(SourceKind::Archive));

        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));
        assert!(matches!(
            installer.update("pack", None),
            Err(SkilletError::NoUpdateSource { .. })
        ));
    }

    #[test]
    fn test_remove_deletes_directory_and_entry() {
        let http = FakeHttp::new();
        let fs = MemoryFileSystem::new();
        fs.add_file(Path::new("/skills/pack/SKILL.md"), b"content");
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        store.insert("pack", SkillState::new(SourceKind::Archive));

        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));
        assert!(installer.remove("pack").unwrap());
        assert!(!fs.exists(Path::new("/skills/pack")));
        assert!(store.get("pack").is_none());

        // A second removal reports nothing to do.
        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));
        assert!(!installer.remove("pack").unwrap());
    }

    #[test]
    fn test_remove_local_registration_keeps_directory() {
        let http = FakeHttp::new();
        let fs = MemoryFileSystem::new();
        fs.add_file(Path::new("/elsewhere/mine/SKILL.md"), b"content");
        let github = GitHubClient::new(&http, None);
        let mut store = Store::default();
        let mut state = SkillState::new(SourceKind::Local);
        state.path = Some(PathBuf::from("/elsewhere/mine"));
        store.insert("mine", state);

        let mut installer = Installer::new(&fs, &github, &mut store, PathBuf::from(SKILLS));
        assert!(installer.remove("mine").unwrap());
        assert!(fs.exists(Path::new("/elsewhere/mine/SKILL.md")));
        assert!(store.get("mine").is_none());
    }

    #[test]
    fn test_split_repo_field_shapes() {
        let (repo, subpath) = split_repo_field("owner/repo").unwrap();
        assert_eq!(repo.to_string(), "owner/repo");
        assert_eq!(subpath, None);

        let (repo, subpath) = split_repo_field("owner/repo/skills/pdf").unwrap();
        assert_eq!(repo.to_string(), "owner/repo");
        assert_eq!(subpath.as_deref(), Some("skills/pdf"));

        assert!(split_repo_field("just-one").is_none());
    }
}
