//! Staging paths and the promotion swap
//!
//! Staged content is written to a hidden, time-suffixed sibling of the final
//! path and swapped in by rename. When a previous install exists it is moved
//! aside first and restored if the swap fails, so the final path never ends
//! up missing or half-written.

use std::path::{Path, PathBuf};

use chrono::Utc;
use console::Style;

use crate::error::{Result, SkilletError};
use crate::fileset::FileSet;
use crate::fsys::{FileSystem, ensure_dir_all};

/// Hidden staging sibling of the final path: `.staging-<id>-<millis>`.
pub fn staging_path(final_path: &Path, id: &str) -> PathBuf {
    sibling(
        final_path,
        &format!(".staging-{id}-{}", Utc::now().timestamp_millis()),
    )
}

fn backup_path(final_path: &Path, id: &str) -> PathBuf {
    sibling(
        final_path,
        &format!(".backup-{id}-{}", Utc::now().timestamp_millis()),
    )
}

fn sibling(final_path: &Path, name: &str) -> PathBuf {
    match final_path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Writes every file of a set under `root`, creating directories as needed.
pub fn write_file_set(fs: &dyn FileSystem, root: &Path, files: &FileSet) -> Result<()> {
    ensure_dir_all(fs, root).map_err(|err| SkilletError::FileWriteFailed {
        path: root.display().to_string(),
        reason: err.to_string(),
    })?;
    for (path, contents) in files.iter() {
        let target = root.join(path);
        if let Some(parent) = target.parent() {
            ensure_dir_all(fs, parent).map_err(|err| SkilletError::FileWriteFailed {
                path: parent.display().to_string(),
                reason: err.to_string(),
            })?;
        }
        fs.write(&target, contents)
            .map_err(|err| SkilletError::FileWriteFailed {
                path: target.display().to_string(),
                reason: err.to_string(),
            })?;
    }
    Ok(())
}

/// Swaps staging into place. An existing final directory is moved to a
/// backup first; if the swap fails, one restore attempt is made before the
/// error propagates, and a restore failure is reported alongside it.
pub fn promote(fs: &dyn FileSystem, staging: &Path, final_path: &Path, id: &str) -> Result<()> {
    let mut backup = None;
    if fs.exists(final_path) {
        let aside = backup_path(final_path, id);
        fs.rename(final_path, &aside)
            .map_err(|err| SkilletError::PromotionFailed {
                id: id.to_string(),
                reason: format!("could not move the previous install aside: {err}"),
                rollback: None,
            })?;
        backup = Some(aside);
    }

    if let Err(err) = fs.rename(staging, final_path) {
        let rollback = backup.as_ref().map(|aside| match fs.rename(aside, final_path) {
            Ok(()) => "previous version restored".to_string(),
            Err(restore_err) => format!("restoring the previous version failed: {restore_err}"),
        });
        return Err(SkilletError::PromotionFailed {
            id: id.to_string(),
            reason: err.to_string(),
            rollback,
        });
    }

    if let Some(aside) = backup {
        cleanup(fs, &aside, "backup");
    }
    Ok(())
}

/// Best-effort removal of a leftover directory. Failures are reported but
/// never change the operation's outcome.
pub fn cleanup(fs: &dyn FileSystem, path: &Path, what: &str) {
    if !fs.exists(path) {
        return;
    }
    if let Err(err) = fs.remove_dir_all(path) {
        eprintln!(
            "{} could not remove {what} directory {}: {err}",
            Style::new().bold().yellow().apply_to("warning:"),
            path.display()
        );
    }
}
