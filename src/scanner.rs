//! Threat scanner
//!
//! Static pattern scan over a bundle's manifest body and its `scripts/`
//! files. Two fixed pattern families: operational risks (network access,
//! destructive commands, remote code execution, credential paths) checked
//! everywhere, and prompt-injection phrasing checked in the manifest body
//! only. Each matching pattern contributes one finding per file; the
//! aggregate risk level is the worst severity seen.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use blake3::Hasher;
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{Result, SkilletError};
use crate::manifest::{MANIFEST_FILE, parse_frontmatter_and_body};

/// Bundle subdirectory whose files are scanned for operational risks.
pub const SCRIPTS_DIR: &str = "scripts";

/// Cached scan results live next to the state store.
pub const SCAN_CACHE_FILE: &str = "scan-cache.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Danger,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Danger => write!(f, "danger"),
        }
    }
}

/// Aggregate classification of a whole bundle. Ordering matters: later
/// variants dominate earlier ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Clean,
    Warning,
    Danger,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Clean => write!(f, "clean"),
            RiskLevel::Warning => write!(f, "warning"),
            RiskLevel::Danger => write!(f, "danger"),
        }
    }
}

/// One matched pattern in one scanned file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub pattern_id: String,
    pub severity: Severity,
    /// Path relative to the bundle root.
    pub file: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    pub risk_level: RiskLevel,
}

impl ScanReport {
    fn from_findings(findings: Vec<Finding>) -> Self {
        let risk_level = findings
            .iter()
            .map(|finding| match finding.severity {
                Severity::Warning => RiskLevel::Warning,
                Severity::Danger => RiskLevel::Danger,
            })
            .max()
            .unwrap_or(RiskLevel::Clean);
        Self {
            findings,
            risk_level,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.risk_level == RiskLevel::Clean
    }
}

struct ThreatPattern {
    id: &'static str,
    severity: Severity,
    regex: Regex,
    description: &'static str,
}

fn compile(table: &[(&'static str, Severity, &'static str, &'static str)]) -> Vec<ThreatPattern> {
    table
        .iter()
        .map(|(id, severity, pattern, description)| ThreatPattern {
            id,
            severity: *severity,
            regex: Regex::new(pattern).unwrap(),
            description,
        })
        .collect()
}

/// Checked against the manifest body and every scripts/ file.
static OPERATIONAL_PATTERNS: LazyLock<Vec<ThreatPattern>> = LazyLock::new(|| {
    compile(&[
        (
            "network-curl",
            Severity::Warning,
            r"(?i)\bcurl\s+",
            "Transfers data over the network with curl",
        ),
        (
            "network-wget",
            Severity::Warning,
            r"(?i)\bwget\s+",
            "Downloads files with wget",
        ),
        (
            "network-request",
            Severity::Warning,
            r"(?i)\b(?:fetch|requests\.(?:get|post)|urllib\.request|httpx)\s*[.(]",
            "Makes HTTP requests from script code",
        ),
        (
            "destructive-rm",
            Severity::Danger,
            r"(?i)\brm\s+-[a-z]*[rf]",
            "Recursive or forced file deletion",
        ),
        (
            "destructive-dd",
            Severity::Danger,
            r"(?i)\bdd\s+if=",
            "Raw device or file overwrite with dd",
        ),
        (
            "destructive-mkfs",
            Severity::Danger,
            r"(?i)\bmkfs\b",
            "Filesystem formatting command",
        ),
        (
            "exec-eval",
            Severity::Danger,
            r"(?i)\beval\s*[\s(]",
            "Evaluates dynamically constructed code",
        ),
        (
            "exec-call",
            Severity::Danger,
            r"(?i)\bexec\s*\(",
            "Executes dynamically constructed code",
        ),
        (
            "exec-pipe-shell",
            Severity::Danger,
            r"(?i)(?:curl|wget)[^|\n]*\|\s*(?:ba|z)?sh\b",
            "Pipes a download straight into a shell",
        ),
        (
            "creds-ssh",
            Severity::Danger,
            r"(?:~|\$HOME|/home/[A-Za-z0-9_-]+|/root)/\.ssh\b",
            "Touches the SSH key directory",
        ),
        (
            "creds-cloud",
            Severity::Danger,
            r"\.aws/credentials|\.config/gcloud",
            "Touches cloud provider credentials",
        ),
        (
            "creds-private-key",
            Severity::Danger,
            r"\bid_rsa\b|BEGIN (?:RSA|OPENSSH|EC) PRIVATE KEY",
            "References a private key",
        ),
        (
            "creds-env-file",
            Severity::Danger,
            r"(?i)\bcat\s+[^\s|;]*\.env\b|\bsource\s+[^\s|;]*\.env\b",
            "Reads environment secret files",
        ),
    ])
});

/// Checked against the manifest body only. Everything here is a danger.
static INJECTION_PATTERNS: LazyLock<Vec<ThreatPattern>> = LazyLock::new(|| {
    compile(&[
        (
            "inject-override",
            Severity::Danger,
            r"(?i)\b(?:ignore|disregard|forget)\s+(?:all\s+|any\s+)?(?:previous|prior|above|earlier)\s+(?:instructions?|prompts?|rules?|context)",
            "Tries to override earlier instructions",
        ),
        (
            "inject-role",
            Severity::Danger,
            r"(?i)\byou\s+are\s+now\b|\bact\s+as\s+(?:a\s+|the\s+)?(?:system|admin|root)\b|\bnew\s+system\s+prompt\b",
            "Tries to replace the assistant's role",
        ),
        (
            "inject-hidden",
            Severity::Danger,
            r"(?is)<!--.{0,400}?(?:instruction|ignore|system|prompt|secret).{0,400}?-->",
            "Hidden directive inside a markup comment",
        ),
    ])
});

/// Scans one bundle directory. Unreadable or non-UTF-8 files are skipped.
pub fn scan(bundle_path: &Path) -> Result<ScanReport> {
    if !bundle_path.is_dir() {
        return Err(SkilletError::FileNotFound {
            path: bundle_path.display().to_string(),
        });
    }

    let mut findings = Vec::new();

    let manifest_path = bundle_path.join(MANIFEST_FILE);
    if let Some(content) = read_text(&manifest_path) {
        // Only the instruction body is scanned; when the metadata block does
        // not parse the whole file is.
        let body = match parse_frontmatter_and_body(&content) {
            Some((_, body)) => body,
            None => content,
        };
        apply(&OPERATIONAL_PATTERNS, &body, MANIFEST_FILE, &mut findings);
        apply(&INJECTION_PATTERNS, &body, MANIFEST_FILE, &mut findings);
    }

    let scripts_dir = bundle_path.join(SCRIPTS_DIR);
    if scripts_dir.is_dir() {
        let mut entries: Vec<_> = WalkDir::new(&scripts_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .collect();
        entries.sort_by_key(|entry| entry.path().to_path_buf());
        for entry in entries {
            let Some(content) = read_text(entry.path()) else {
                continue;
            };
            let relative = entry
                .path()
                .strip_prefix(bundle_path)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            apply(&OPERATIONAL_PATTERNS, &content, &relative, &mut findings);
        }
    }

    Ok(ScanReport::from_findings(findings))
}

fn apply(patterns: &[ThreatPattern], content: &str, file: &str, findings: &mut Vec<Finding>) {
    for pattern in patterns {
        if pattern.regex.is_match(content) {
            findings.push(Finding {
                pattern_id: pattern.id.to_string(),
                severity: pattern.severity,
                file: file.to_string(),
                description: pattern.description.to_string(),
            });
        }
    }
}

fn read_text(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    String::from_utf8(bytes).ok()
}

/// Content hash of a bundle directory, for cache invalidation. Files are
/// hashed in sorted order with their relative paths mixed in.
pub fn hash_directory(path: &Path) -> Result<String> {
    if !path.is_dir() {
        return Err(SkilletError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut hasher = Hasher::new();
    let mut entries: Vec<_> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .collect();
    entries.sort_by_key(|entry| entry.path().to_path_buf());

    for entry in entries {
        let file_path = entry.path();
        let relative = file_path
            .strip_prefix(path)
            .unwrap_or(file_path)
            .to_string_lossy();
        hasher.update(relative.as_bytes());
        hasher.update(b"\0");
        let contents = std::fs::read(file_path).map_err(|err| SkilletError::FileReadFailed {
            path: file_path.display().to_string(),
            reason: err.to_string(),
        })?;
        hasher.update(&contents);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[derive(Serialize, Deserialize)]
struct CachedScan {
    content_hash: String,
    report: ScanReport,
}

/// Keeps scan results per bundle id and rescans only when the directory
/// content hash changes. Persisted as JSON between runs; a missing or
/// corrupt cache file starts empty.
#[derive(Default, Serialize, Deserialize)]
pub struct ScanCache {
    entries: HashMap<String, CachedScan>,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> ScanCache {
        let Ok(bytes) = std::fs::read(path) else {
            return ScanCache::default();
        };
        serde_json::from_slice(&bytes).unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| SkilletError::FileWriteFailed {
                path: parent.display().to_string(),
                reason: err.to_string(),
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|err| SkilletError::FileWriteFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }

    pub fn get_or_scan(&mut self, id: &str, bundle_path: &Path) -> Result<ScanReport> {
        let content_hash = hash_directory(bundle_path)?;
        if let Some(cached) = self.entries.get(id) {
            if cached.content_hash == content_hash {
                return Ok(cached.report.clone());
            }
        }
        let report = scan(bundle_path)?;
        self.entries.insert(
            id.to_string(),
            CachedScan {
                content_hash,
                report: report.clone(),
            },
        );
        Ok(report)
    }

    /// Drop cache entries for skills that no longer exist.
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        self.entries.retain(|id, _| keep(id));
    }
}
