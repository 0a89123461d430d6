//! Common test utilities for Skillet integration tests

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// An isolated home for one test: a private config directory and skills
/// directory wired into every spawned `skillet` process via environment
/// variables, so tests never touch the real user state.
pub struct TestHome {
    /// Keeps the temporary directory alive for the duration of the test.
    #[allow(dead_code)]
    temp: TempDir,
    pub config_dir: PathBuf,
    pub skills_dir: PathBuf,
}

impl TestHome {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let config_dir = temp.path().join("config");
        let skills_dir = temp.path().join("skills");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");
        std::fs::create_dir_all(&skills_dir).expect("Failed to create skills dir");
        Self {
            temp,
            config_dir,
            skills_dir,
        }
    }

    /// A `skillet` command wired to this home. Tokens are stripped from the
    /// environment so tests never reach GitHub with ambient credentials.
    #[allow(deprecated)]
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("skillet").expect("Failed to find binary");
        cmd.env("SKILLET_CONFIG_DIR", &self.config_dir)
            .env("SKILLET_SKILLS_DIR", &self.skills_dir)
            .env_remove("SKILLET_TOKEN")
            .env_remove("GITHUB_TOKEN");
        cmd
    }

    pub fn store_path(&self) -> PathBuf {
        self.config_dir.join("skillet.json")
    }

    /// Parses the store document, failing the test when it is missing or
    /// malformed.
    #[allow(dead_code)]
    pub fn read_store(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.store_path()).expect("Failed to read store file");
        serde_json::from_str(&raw).expect("Store file is not valid JSON")
    }

    /// Writes a hand-built store document, as if a previous run had saved it.
    #[allow(dead_code)]
    pub fn write_store(&self, store: &serde_json::Value) {
        let json = serde_json::to_string_pretty(store).expect("Failed to serialize store");
        std::fs::write(self.store_path(), json).expect("Failed to write store file");
    }

    /// Creates an unmanaged skill directory outside the skills dir, ready to
    /// register with `skillet install <dir>`.
    #[allow(dead_code)]
    pub fn create_local_skill(&self, name: &str) -> PathBuf {
        let dir = self.temp.path().join("sources").join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create skill dir");
        std::fs::write(dir.join("SKILL.md"), manifest(name)).expect("Failed to write manifest");
        dir
    }

    /// Builds a zip archive under the temp dir from (path, contents) pairs.
    #[allow(dead_code)]
    pub fn zip_fixture(&self, file_name: &str, entries: &[(&str, &str)]) -> PathBuf {
        let path = self.temp.path().join(file_name);
        build_zip(&path, entries);
        path
    }
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

/// A minimal valid SKILL.md for the given skill name.
pub fn manifest(name: &str) -> String {
    format!(
        "---\nname: {name}\ndescription: A test skill named {name}.\n---\n\n# {name}\n\nInstructions go here.\n"
    )
}

/// Writes a zip archive with the given (path, contents) entries.
#[allow(dead_code)]
pub fn build_zip(path: &Path, entries: &[(&str, &str)]) {
    use std::io::Write as _;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    let file = File::create(path).expect("Failed to create zip file");
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (entry_path, contents) in entries {
        writer
            .start_file(*entry_path, options)
            .expect("Failed to start zip entry");
        writer
            .write_all(contents.as_bytes())
            .expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish zip");
}

/// A store document holding a single hand-written skill record.
#[allow(dead_code)]
pub fn store_json(id: &str, state: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "settings": {},
        "skills": { id: state }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_creates_dirs() {
        let home = TestHome::new();
        assert!(home.config_dir.exists());
        assert!(home.skills_dir.exists());
    }

    #[test]
    fn test_manifest_has_frontmatter() {
        let text = manifest("demo");
        assert!(text.starts_with("---\n"));
        assert!(text.contains("name: demo"));
    }

    #[test]
    fn test_zip_fixture_written_to_disk() {
        let home = TestHome::new();
        let path = home.zip_fixture("bundle.zip", &[("skill/SKILL.md", "contents")]);
        assert!(path.exists());
    }
}
