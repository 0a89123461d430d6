//! Installed-skill store
//!
//! One JSON document holding user settings plus a record per installed
//! skill. The document lives in the config directory (`SKILLET_CONFIG_DIR`
//! overrides the platform default) and is rewritten whole on every change.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkilletError};
use crate::fsys::{FileSystem, ensure_dir_all};

pub const STORE_FILE: &str = "skillet.json";
pub const CONFIG_DIR_ENV: &str = "SKILLET_CONFIG_DIR";

/// How a skill got onto disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Github,
    Archive,
    Local,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceKind::Github => "github",
            SourceKind::Archive => "archive",
            SourceKind::Local => "local",
        };
        write!(f, "{label}")
    }
}

/// Persistent record of one installed skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillState {
    pub source: SourceKind,
    /// `owner/repo` or `owner/repo/subpath` for GitHub installs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Installed release tag; absent when no release was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Registered directory for local skills; managed skills live under the
    /// skills directory and carry no path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub frozen: bool,
    pub installed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl SkillState {
    pub fn new(source: SourceKind) -> Self {
        Self {
            source,
            repo: None,
            version: None,
            path: None,
            frozen: false,
            installed_at: Utc::now(),
            last_updated_at: None,
        }
    }
}

/// User settings kept alongside the skill records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_dir: Option<PathBuf>,
    #[serde(default)]
    pub auto_update: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub skills: BTreeMap<String, SkillState>,
}

impl Store {
    /// Loads the store, returning an empty one when the file does not exist.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Store> {
        if !fs.exists(path) {
            return Ok(Store::default());
        }
        let bytes = fs.read(path).map_err(|err| SkilletError::FileReadFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|err| SkilletError::StoreParseFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }

    /// Rewrites the whole store document, creating the config directory
    /// when missing.
    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            ensure_dir_all(fs, parent).map_err(|err| SkilletError::FileWriteFailed {
                path: parent.display().to_string(),
                reason: err.to_string(),
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(SkilletError::from)?;
        fs.write(path, json.as_bytes())
            .map_err(|err| SkilletError::FileWriteFailed {
                path: path.display().to_string(),
                reason: err.to_string(),
            })
    }

    pub fn get(&self, id: &str) -> Option<&SkillState> {
        self.skills.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SkillState> {
        self.skills.get_mut(id)
    }

    pub fn insert(&mut self, id: &str, state: SkillState) {
        self.skills.insert(id.to_string(), state);
    }

    pub fn remove(&mut self, id: &str) -> Option<SkillState> {
        self.skills.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.skills.contains_key(id)
    }

    /// Flips the frozen flag of an installed skill.
    pub fn set_frozen(&mut self, id: &str, frozen: bool) -> Result<()> {
        let state = self
            .skills
            .get_mut(id)
            .ok_or_else(|| SkilletError::SkillNotFound { id: id.to_string() })?;
        state.frozen = frozen;
        Ok(())
    }
}

/// Resolves the config directory. `SKILLET_CONFIG_DIR` wins when set and
/// non-empty, then the platform config directory.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::config_dir()
        .map(|base| base.join("skillet"))
        .ok_or(SkilletError::NoConfigDir)
}

pub fn store_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(STORE_FILE))
}

/// The default install target when neither the CLI flag nor the stored
/// setting names one.
pub fn default_skills_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".claude").join("skills"))
        .ok_or(SkilletError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsys::MemoryFileSystem;
    use serial_test::serial;

    #[test]
    fn test_missing_store_loads_empty() {
        let fs = MemoryFileSystem::new();
        let store = Store::load(&fs, Path::new("/config/skillet.json")).unwrap();
        assert!(store.skills.is_empty());
        assert!(store.settings.github_token.is_none());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let fs = MemoryFileSystem::new();
        let path = Path::new("/config/skillet.json");

        let mut store = Store::default();
        store.settings.github_token = Some("ghp_secret".to_string());
        let mut state = SkillState::new(SourceKind::Github);
        state.repo = Some("owner/repo".to_string());
        state.version = Some("v1.2.0".to_string());
        store.insert("my-skill", state);
        store.save(&fs, path).unwrap();

        let loaded = Store::load(&fs, path).unwrap();
        assert_eq!(loaded.settings.github_token.as_deref(), Some("ghp_secret"));
        let skill = loaded.get("my-skill").unwrap();
        assert_eq!(skill.source, SourceKind::Github);
        assert_eq!(skill.repo.as_deref(), Some("owner/repo"));
        assert_eq!(skill.version.as_deref(), Some("v1.2.0"));
        assert!(!skill.frozen);
    }

    #[test]
    fn test_corrupt_store_is_a_parse_error() {
        let fs = MemoryFileSystem::new();
        let path = Path::new("/config/skillet.json");
        fs.add_file(path, b"{ not json");
        assert!(matches!(
            Store::load(&fs, path),
            Err(SkilletError::StoreParseFailed { .. })
        ));
    }

    #[test]
    fn test_set_frozen_requires_installed_skill() {
        let mut store = Store::default();
        assert!(matches!(
            store.set_frozen("ghost", true),
            Err(SkilletError::SkillNotFound { .. })
        ));

        store.insert("real", SkillState::new(SourceKind::Local));
        store.set_frozen("real", true).unwrap();
        assert!(store.get("real").unwrap().frozen);
        store.set_frozen("real", false).unwrap();
        assert!(!store.get("real").unwrap().frozen);
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let fs = MemoryFileSystem::new();
        let path = Path::new("/config/skillet.json");
        fs.add_file(
            path,
            br#"{
                "settings": { "auto_update": true, "future_knob": 1 },
                "skills": {
                    "pdf": {
                        "source": "archive",
                        "frozen": true,
                        "installed_at": "2025-06-01T12:00:00Z"
                    }
                }
            }"#,
        );
        let store = Store::load(&fs, path).unwrap();
        assert!(store.settings.auto_update);
        let skill = store.get("pdf").unwrap();
        assert_eq!(skill.source, SourceKind::Archive);
        assert!(skill.frozen);
        assert!(skill.version.is_none());
    }

    #[test]
    #[serial]
    fn test_config_dir_env_override() {
        let original = std::env::var(CONFIG_DIR_ENV).ok();
        unsafe {
            std::env::set_var(CONFIG_DIR_ENV, "/tmp/skillet-test-config");
        }

        assert_eq!(
            config_dir().unwrap(),
            PathBuf::from("/tmp/skillet-test-config")
        );
        assert_eq!(
            store_path().unwrap(),
            PathBuf::from("/tmp/skillet-test-config/skillet.json")
        );

        unsafe {
            if let Some(o) = original {
                std::env::set_var(CONFIG_DIR_ENV, o);
            } else {
                std::env::remove_var(CONFIG_DIR_ENV);
            }
        }
    }

    #[test]
    #[serial]
    fn test_empty_env_override_is_ignored() {
        let original = std::env::var(CONFIG_DIR_ENV).ok();
        unsafe {
            std::env::set_var(CONFIG_DIR_ENV, "");
        }

        let resolved = config_dir().unwrap();
        assert!(resolved.ends_with("skillet"));

        unsafe {
            if let Some(o) = original {
                std::env::set_var(CONFIG_DIR_ENV, o);
            } else {
                std::env::remove_var(CONFIG_DIR_ENV);
            }
        }
    }
}
