//! SKILL.md manifest parsing, validation, and metadata stamping.
//!
//! A skill manifest is a markdown file with a YAML frontmatter block between
//! `---` delimiters. The frontmatter parser lives here and nowhere else;
//! everything that needs manifest metadata goes through this module.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::fsys::FileSystem;

/// The manifest file name at a skill bundle's root.
pub const MANIFEST_FILE: &str = "SKILL.md";

/// Fields required to be present and non-empty for a bundle to validate.
pub const REQUIRED_FIELDS: &[&str] = &["name", "description"];

/// Fields backfilled into manifest frontmatter when missing on install.
pub const MANIFEST_TEMPLATE: &[(&str, &str)] = &[
    ("name", ""),
    ("description", ""),
    ("version", "1.0.0"),
];

/// Stamped into a skill's manifest when no release tag is known.
pub const BASELINE_VERSION: &str = "1.0.0";

/// Parse content into optional YAML frontmatter (between first `---` and
/// second `---`) and body. Returns `None` if no valid frontmatter (missing
/// delimiters or not a mapping).
pub fn parse_frontmatter_and_body(content: &str) -> Option<(Value, String)> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 3 || lines[0].trim() != "---" {
        return None;
    }
    let end_idx = lines[1..].iter().position(|l| l.trim() == "---")?;
    let end_idx = end_idx + 1;
    let frontmatter_str = lines[1..end_idx].join("\n");
    let body = lines[end_idx + 1..].join("\n");
    let value: Value = serde_yaml::from_str(&frontmatter_str).ok()?;
    if value.as_mapping().is_none() && !value.is_null() {
        return None;
    }
    Some((value, body))
}

/// Get a string value from a frontmatter Value by key (top-level).
pub fn get_str(value: &Value, key: &str) -> Option<String> {
    let mapping = value.as_mapping()?;
    let v = mapping.get(Value::String(key.to_string()))?;
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Serialize frontmatter and body back into manifest text.
pub fn render(frontmatter: &Mapping, body: &str) -> String {
    let yaml = serde_yaml::to_string(&Value::Mapping(frontmatter.clone()))
        .unwrap_or_else(|_| String::new());
    format!("---\n{yaml}---\n{body}")
}

/// Provenance stamped into an installed manifest's frontmatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Installed from GitHub; `repo` includes the subpath for monorepos.
    Github {
        repo: String,
        version: Option<String>,
    },
    /// Installed from an uploaded archive; no version provenance.
    Archive,
}

/// Normalize manifest text after promotion: backfill template fields that are
/// missing, then stamp the install origin and resolved version.
pub fn normalize(content: &str, origin: &Origin) -> String {
    let (frontmatter, body) = match parse_frontmatter_and_body(content) {
        Some((value, body)) => (value, body),
        None => (Value::Null, content.to_string()),
    };
    let mut mapping = frontmatter.as_mapping().cloned().unwrap_or_default();

    for (field, default) in MANIFEST_TEMPLATE {
        let key = Value::String((*field).to_string());
        let missing = match mapping.get(&key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty() && *field == "version",
            Some(_) => false,
        };
        if missing {
            let default = if *field == "version" {
                BASELINE_VERSION
            } else {
                default
            };
            mapping.insert(key, Value::String((*default).to_string()));
        }
    }

    match origin {
        Origin::Github { repo, version } => {
            set_str(&mut mapping, "source", "github");
            set_str(&mut mapping, "repo", repo);
            if let Some(tag) = version {
                set_str(&mut mapping, "version", tag);
            }
        }
        Origin::Archive => {
            set_str(&mut mapping, "source", "archive");
        }
    }

    render(&mapping, &body)
}

fn set_str(mapping: &mut Mapping, key: &str, value: &str) {
    mapping.insert(
        Value::String(key.to_string()),
        Value::String(value.to_string()),
    );
}

/// Outcome of validating a staged (or in-place) bundle directory.
#[derive(Debug, Clone)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Validate a bundle directory: the manifest must exist, carry a
/// delimiter-bounded metadata block, and declare the required fields.
pub fn validate_dir(fs: &dyn FileSystem, dir: &Path) -> Validation {
    let mut errors = Vec::new();
    let manifest_path = dir.join(MANIFEST_FILE);

    if !fs.exists(&manifest_path) {
        errors.push(format!("missing {MANIFEST_FILE} manifest"));
        return Validation {
            valid: false,
            errors,
        };
    }

    let content = match fs.read(&manifest_path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(err) => {
            errors.push(format!("unreadable {MANIFEST_FILE}: {err}"));
            return Validation {
                valid: false,
                errors,
            };
        }
    };

    match parse_frontmatter_and_body(&content) {
        None => {
            errors.push(format!(
                "{MANIFEST_FILE} has no '---' delimited metadata block"
            ));
        }
        Some((frontmatter, _)) => {
            for field in REQUIRED_FIELDS {
                match get_str(&frontmatter, field) {
                    Some(value) if !value.trim().is_empty() => {}
                    _ => errors.push(format!("missing required field '{field}'")),
                }
            }
        }
    }

    Validation {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsys::MemoryFileSystem;

    #[test]
    fn parse_no_frontmatter() {
        let content = "just body\nno delimiters";
        assert!(parse_frontmatter_and_body(content).is_none());
    }

    #[test]
    fn test_parse_frontmatter_and_body() {
        let content = "---\nname: pdf-tools\ndescription: hello\n---\n\nbody here";
        let (fm, body) =
            parse_frontmatter_and_body(content).expect("Should parse frontmatter and body");
        assert_eq!(get_str(&fm, "name").as_deref(), Some("pdf-tools"));
        assert_eq!(get_str(&fm, "description").as_deref(), Some("hello"));
        assert_eq!(body.trim(), "body here");
    }

    #[test]
    fn render_roundtrips_fields() {
        let content = "---\nname: pdf-tools\ndescription: hello\n---\nbody";
        let (fm, body) = parse_frontmatter_and_body(content).expect("Should parse");
        let rendered = render(fm.as_mapping().expect("mapping"), &body);
        let (fm2, body2) = parse_frontmatter_and_body(&rendered).expect("Should reparse");
        assert_eq!(get_str(&fm2, "name").as_deref(), Some("pdf-tools"));
        assert_eq!(body2, body);
    }

    #[test]
    fn normalize_stamps_github_origin() {
        let content = "---\nname: pdf-tools\ndescription: d\n---\nbody";
        let out = normalize(
            content,
            &Origin::Github {
                repo: "owner/repo".to_string(),
                version: Some("v2.1.0".to_string()),
            },
        );
        let (fm, _) = parse_frontmatter_and_body(&out).expect("Should parse");
        assert_eq!(get_str(&fm, "source").as_deref(), Some("github"));
        assert_eq!(get_str(&fm, "repo").as_deref(), Some("owner/repo"));
        assert_eq!(get_str(&fm, "version").as_deref(), Some("v2.1.0"));
        // Existing fields survive.
        assert_eq!(get_str(&fm, "name").as_deref(), Some("pdf-tools"));
    }

    #[test]
    fn normalize_backfills_baseline_version() {
        let content = "---\nname: n\ndescription: d\n---\nbody";
        let out = normalize(
            content,
            &Origin::Github {
                repo: "owner/repo".to_string(),
                version: None,
            },
        );
        let (fm, _) = parse_frontmatter_and_body(&out).expect("Should parse");
        assert_eq!(get_str(&fm, "version").as_deref(), Some(BASELINE_VERSION));
    }

    #[test]
    fn normalize_archive_has_no_repo() {
        let content = "---\nname: n\ndescription: d\nversion: 3.2.1\n---\nbody";
        let out = normalize(content, &Origin::Archive);
        let (fm, _) = parse_frontmatter_and_body(&out).expect("Should parse");
        assert_eq!(get_str(&fm, "source").as_deref(), Some("archive"));
        assert_eq!(get_str(&fm, "repo"), None);
        // An explicit version is not overwritten.
        assert_eq!(get_str(&fm, "version").as_deref(), Some("3.2.1"));
    }

    #[test]
    fn validate_missing_manifest() {
        let fs = MemoryFileSystem::new();
        fs.add_dir(Path::new("/skills/x"));
        let validation = validate_dir(&fs, Path::new("/skills/x"));
        assert!(!validation.valid);
        assert!(validation.errors[0].contains("missing SKILL.md"));
    }

    #[test]
    fn validate_missing_metadata_block() {
        let fs = MemoryFileSystem::new();
        fs.add_file(Path::new("/skills/x/SKILL.md"), b"no frontmatter here");
        let validation = validate_dir(&fs, Path::new("/skills/x"));
        assert!(!validation.valid);
        assert!(validation.errors[0].contains("metadata block"));
    }

    #[test]
    fn validate_missing_required_fields() {
        let fs = MemoryFileSystem::new();
        fs.add_file(
            Path::new("/skills/x/SKILL.md"),
            b"---\nname: only-name\n---\nbody",
        );
        let validation = validate_dir(&fs, Path::new("/skills/x"));
        assert!(!validation.valid);
        assert_eq!(validation.errors.len(), 1);
        assert!(validation.errors[0].contains("description"));
    }

    #[test]
    fn validate_accepts_complete_manifest() {
        let fs = MemoryFileSystem::new();
        fs.add_file(
            Path::new("/skills/x/SKILL.md"),
            b"---\nname: x\ndescription: a skill\n---\nInstructions.",
        );
        let validation = validate_dir(&fs, Path::new("/skills/x"));
        assert!(validation.valid, "errors: {:?}", validation.errors);
        assert!(validation.errors.is_empty());
    }
}
