//! File system capability interface
//!
//! The staged installer performs all directory I/O through the [`FileSystem`]
//! trait so tests can run against an in-memory fake. The trait surface is
//! deliberately primitive: single-level mkdir, plain rename, no recursive
//! creation. Recursive directory creation and the promote/rollback rename
//! sequence are installer logic built on top of these primitives.

use std::io;
use std::path::Path;
#[cfg(test)]
use std::path::PathBuf;

/// Names of the direct children of a directory.
#[derive(Debug, Default, Clone)]
pub struct DirEntries {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
}

/// Primitive directory I/O operations.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Writes a file, replacing any existing content. The parent directory
    /// must already exist.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Lists the direct children of a directory.
    fn list(&self, path: &Path) -> io::Result<DirEntries>;

    /// Creates a single directory level. Fails if the parent is missing or
    /// the directory already exists.
    fn mkdir(&self, path: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Creates a directory and every missing ancestor, one level at a time.
/// Already-existing directories are fine.
pub fn ensure_dir_all(fs: &dyn FileSystem, path: &Path) -> io::Result<()> {
    if fs.exists(path) {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_all(fs, parent)?;
        }
    }
    fs.mkdir(path)
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn list(&self, path: &Path) -> io::Result<DirEntries> {
        let mut entries = DirEntries::default();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.file_type()?.is_dir() {
                entries.dirs.push(name);
            } else {
                entries.files.push(name);
            }
        }
        entries.files.sort();
        entries.dirs.sort();
        Ok(entries)
    }

    fn mkdir(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }
}

/// In-memory [`FileSystem`] fake for unit tests.
///
/// Models the same constraints as the OS implementation: writes require an
/// existing parent directory, `mkdir` is single-level, renames move whole
/// subtrees. Rename failures can be injected per target path to exercise the
/// promotion rollback paths.
#[cfg(test)]
pub struct MemoryFileSystem {
    state: std::cell::RefCell<MemoryState>,
}

#[cfg(test)]
#[derive(Default)]
struct MemoryState {
    files: std::collections::BTreeMap<PathBuf, Vec<u8>>,
    dirs: std::collections::BTreeSet<PathBuf>,
    fail_rename_to: Vec<PathBuf>,
}

#[cfg(test)]
impl MemoryFileSystem {
    pub fn new() -> Self {
        let fs = Self {
            state: std::cell::RefCell::new(MemoryState::default()),
        };
        fs.state.borrow_mut().dirs.insert(PathBuf::from("/"));
        fs
    }

    /// Registers one rename failure for the given destination path. Each
    /// registration fails exactly one rename.
    pub fn fail_next_rename_to(&self, to: &Path) {
        self.state
            .borrow_mut()
            .fail_rename_to
            .push(to.to_path_buf());
    }

    /// Creates a directory and all missing parents. Test setup only.
    pub fn add_dir(&self, path: &Path) {
        let mut state = self.state.borrow_mut();
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            state.dirs.insert(current.clone());
        }
    }

    /// Creates a file, adding missing parent directories. Test setup only.
    pub fn add_file(&self, path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.state
            .borrow_mut()
            .files
            .insert(path.to_path_buf(), contents.to_vec());
    }

    pub fn read_string(&self, path: &Path) -> Option<String> {
        self.state
            .borrow()
            .files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).to_string())
    }

    /// All file paths currently present, sorted.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.state.borrow().files.keys().cloned().collect()
    }

    fn parent_exists(state: &MemoryState, path: &Path) -> bool {
        match path.parent() {
            None => true,
            Some(parent) if parent.as_os_str().is_empty() => true,
            Some(parent) => state.dirs.contains(parent),
        }
    }
}

#[cfg(test)]
impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state.borrow();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.state
            .borrow()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display())))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if !Self::parent_exists(&state, path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent missing for {}", path.display()),
            ));
        }
        state.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn list(&self, path: &Path) -> io::Result<DirEntries> {
        let state = self.state.borrow();
        if !state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}", path.display()),
            ));
        }
        let mut entries = DirEntries::default();
        for file in state.files.keys() {
            if file.parent() == Some(path) {
                if let Some(name) = file.file_name() {
                    entries.files.push(name.to_string_lossy().to_string());
                }
            }
        }
        for dir in &state.dirs {
            if dir.parent() == Some(path) {
                if let Some(name) = dir.file_name() {
                    entries.dirs.push(name.to_string_lossy().to_string());
                }
            }
        }
        Ok(entries)
    }

    fn mkdir(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.dirs.contains(path) || state.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{}", path.display()),
            ));
        }
        if !Self::parent_exists(&state, path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent missing for {}", path.display()),
            ));
        }
        state.dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.fail_rename_to.iter().position(|p| p == to) {
            state.fail_rename_to.remove(pos);
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected rename failure: {}", to.display()),
            ));
        }
        if !state.files.contains_key(from) && !state.dirs.contains(from) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}", from.display()),
            ));
        }
        if state.files.contains_key(to) || state.dirs.contains(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{}", to.display()),
            ));
        }
        if !Self::parent_exists(&state, to) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent missing for {}", to.display()),
            ));
        }
        if let Some(contents) = state.files.remove(from) {
            state.files.insert(to.to_path_buf(), contents);
            return Ok(());
        }
        // Directory: move the whole subtree.
        let moved_dirs: Vec<PathBuf> = state
            .dirs
            .iter()
            .filter(|d| d.starts_with(from))
            .cloned()
            .collect();
        for dir in moved_dirs {
            state.dirs.remove(&dir);
            let relocated = rebase(&dir, from, to);
            state.dirs.insert(relocated);
        }
        let moved_files: Vec<PathBuf> = state
            .files
            .keys()
            .filter(|f| f.starts_with(from))
            .cloned()
            .collect();
        for file in moved_files {
            if let Some(contents) = state.files.remove(&file) {
                let relocated = rebase(&file, from, to);
                state.files.insert(relocated, contents);
            }
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.state.borrow_mut().files.remove(path).map(|_| ()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display()))
        })
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}", path.display()),
            ));
        }
        state.dirs.retain(|d| !d.starts_with(path));
        state.files.retain(|f, _| !f.starts_with(path));
        Ok(())
    }
}

#[cfg(test)]
fn rebase(path: &Path, from: &Path, to: &Path) -> PathBuf {
    match path.strip_prefix(from) {
        Ok(rest) if rest.as_os_str().is_empty() => to.to_path_buf(),
        Ok(rest) => to.join(rest),
        Err(_) => path.to_path_buf(),
    }
}
