//! Archive ingestion
//!
//! Reads a zip into a [`FileSet`], discovers every bundle root (a manifest's
//! parent directory), strips a single shared wrapping directory when one
//! exists, and splits the files into per-bundle sets by longest-prefix match
//! against the roots.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::{Result, SkilletError};
use crate::fileset::FileSet;
use crate::manifest::{MANIFEST_FILE, get_str, parse_frontmatter_and_body};
use crate::source::valid_segment;

/// One installable bundle carved out of an archive. `id` is `None` when no
/// usable name could be derived.
#[derive(Debug)]
pub struct ArchiveBundle {
    pub id: Option<String>,
    pub root: String,
    pub files: FileSet,
}

/// Reads a zip archive into a flat file set. Directory entries and names
/// escaping the archive root are ignored.
pub fn read_archive(bytes: &[u8]) -> Result<FileSet> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|err| SkilletError::ArchiveError {
            reason: err.to_string(),
        })?;

    let mut files = FileSet::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| SkilletError::ArchiveError {
                reason: err.to_string(),
            })?;
        if entry.is_dir() {
            continue;
        }
        let Some(path) = entry.enclosed_name() else {
            continue;
        };
        let name = path.to_string_lossy().replace('\\', "/");
        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|err| SkilletError::ArchiveError {
                reason: format!("{name}: {err}"),
            })?;
        files.insert(&name, contents);
    }
    Ok(files)
}

/// Splits an archive file set into bundles, one per discovered manifest.
/// Returns an empty vec when the archive holds no manifest at all.
pub fn split_bundles(files: &FileSet) -> Vec<ArchiveBundle> {
    let (files, roots) = strip_wrapper(files);
    let mut bundles = Vec::new();

    for root in &roots {
        let prefix = if root.is_empty() {
            String::new()
        } else {
            format!("{root}/")
        };
        let mut bundle_files = FileSet::new();
        for (path, contents) in files.iter() {
            if owning_root(&roots, path).is_some_and(|owner| owner == root) {
                let relative = &path[prefix.len()..];
                bundle_files.insert(relative, contents.to_vec());
            }
        }
        bundles.push(ArchiveBundle {
            id: bundle_id(root, &bundle_files),
            root: root.clone(),
            files: bundle_files,
        });
    }
    bundles
}

/// Bundle roots are the parent directories of every manifest, the archive
/// root included.
fn bundle_roots(files: &FileSet) -> Vec<String> {
    let suffix = format!("/{MANIFEST_FILE}");
    let mut roots = Vec::new();
    for path in files.paths() {
        if path == MANIFEST_FILE {
            roots.push(String::new());
        } else if let Some(root) = path.strip_suffix(&suffix) {
            roots.push(root.to_string());
        }
    }
    roots.sort();
    roots.dedup();
    roots
}

/// Detects one shared top-level wrapping directory across all bundle roots
/// and strips it from every path. Stripping only happens when each root
/// keeps at least one segment afterwards; deeper shared nesting is left
/// alone.
fn strip_wrapper(files: &FileSet) -> (FileSet, Vec<String>) {
    let roots = bundle_roots(files);
    let wrapper = shared_wrapper(&roots);

    let Some(wrapper) = wrapper else {
        return (files.clone(), roots);
    };

    let prefix = format!("{wrapper}/");
    let mut stripped = FileSet::new();
    for (path, contents) in files.iter() {
        match path.strip_prefix(&prefix) {
            Some(rest) => stripped.insert(rest, contents.to_vec()),
            // Stray files outside the wrapper keep their place.
            None => stripped.insert(path, contents.to_vec()),
        }
    }
    let roots = bundle_roots(&stripped);
    (stripped, roots)
}

fn shared_wrapper(roots: &[String]) -> Option<String> {
    let mut segments = roots.first()?.split('/');
    let wrapper = segments.next()?;
    if wrapper.is_empty() || segments.next().is_none() {
        return None;
    }
    // Every root must sit under the wrapper with at least one segment left.
    let prefix = format!("{wrapper}/");
    let all_covered = roots
        .iter()
        .all(|root| root.strip_prefix(&prefix).is_some_and(|rest| !rest.is_empty()));
    all_covered.then(|| wrapper.to_string())
}

/// A file belongs to the root with the longest matching prefix; files under
/// no root belong to no bundle.
fn owning_root<'a>(roots: &'a [String], path: &str) -> Option<&'a String> {
    roots
        .iter()
        .filter(|root| root.is_empty() || path.starts_with(&format!("{root}/")))
        .max_by_key(|root| root.len())
}

/// Identifier for a bundle: the root's last segment, or the declared
/// manifest name when the manifest sits at the archive root. A declared
/// name only counts as usable when it is a single plain path component;
/// separators and relative-directory names never reach the install path.
fn bundle_id(root: &str, files: &FileSet) -> Option<String> {
    if let Some(leaf) = root.rsplit('/').next().filter(|leaf| !leaf.is_empty()) {
        return Some(leaf.to_string());
    }
    let manifest = files.get(MANIFEST_FILE)?;
    let content = String::from_utf8(manifest.to_vec()).ok()?;
    let (metadata, _) = parse_frontmatter_and_body(&content)?;
    get_str(&metadata, "name").filter(|name| valid_segment(name))
}
