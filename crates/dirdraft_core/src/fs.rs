//! Filesystem abstraction.
//!
//! Everything that touches disk goes through the [`FileSystem`] trait, so the
//! executor, scanner, and template store can run against the real filesystem
//! or an in-memory one in tests.

use std::io::{Error, ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

/// Abstraction over the filesystem operations dirdraft needs.
pub trait FileSystem {
    /// Checks if a path exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    /// Checks if a path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Creates a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Creates a file ONLY if it doesn't exist.
    /// Should return an error if the file exists.
    fn create_new(&self, path: &Path, content: &str) -> Result<()>;

    /// Reads the file content.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Overwrites a file, creating it (and missing parents) if needed.
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;

    /// Deletes a file.
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Deletes a directory and everything under it.
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// Move/rename a file or directory from `from` to `to`.
    ///
    /// Implementations should error if the source does not exist or if the
    /// destination already exists, and should create missing parents of `to`.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Lists the direct children of a directory (files and directories).
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>>;
}

// Blanket implementation for references to FileSystem
impl<T: FileSystem> FileSystem for &T {
    fn exists(&self, path: &Path) -> bool {
        (*self).exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (*self).is_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        (*self).create_dir_all(path)
    }

    fn create_new(&self, path: &Path, content: &str) -> Result<()> {
        (*self).create_new(path, content)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        (*self).read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        (*self).write_file(path, content)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        (*self).remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        (*self).remove_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        (*self).rename(from, to)
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        (*self).list_dir(dir)
    }
}

// ============================================================================
// RealFileSystem
// ============================================================================

use std::fs::{self, OpenOptions};
use std::io::Write;

/// This is a simple filesystem implementation that simply maps to std::fs methods
#[derive(Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
    }

    fn create_new(&self, path: &Path, content: &str) -> Result<()> {
        // This atomic check prevents race conditions
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(content.as_bytes())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if !from.exists() {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("Source not found: {:?}", from),
            ));
        }
        if to.exists() {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("Destination already exists: {:?}", to),
            ));
        }

        if let Some(parent) = to.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::rename(from, to)
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }
}

// ============================================================================
// InMemoryFileSystem
// ============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// An in-memory filesystem implementation, used pervasively in tests.
#[derive(Clone, Default)]
pub struct InMemoryFileSystem {
    /// Files stored as path -> content
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
    /// Directories that exist (implicitly created when files are added)
    directories: Arc<RwLock<HashSet<PathBuf>>>,
}

/// Normalize a path: strip `.` components and resolve `..` lexically.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

impl InMemoryFileSystem {
    /// Create a new empty in-memory filesystem
    pub fn new() -> Self {
        Self::default()
    }

    fn add_parents(dirs: &mut HashSet<PathBuf>, path: &Path) {
        let mut current = path;
        while let Some(parent) = current.parent() {
            if !parent.as_os_str().is_empty() {
                dirs.insert(parent.to_path_buf());
            }
            current = parent;
        }
    }
}

impl FileSystem for InMemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.files.read().unwrap().contains_key(&path)
            || self.directories.read().unwrap().contains(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.directories.read().unwrap().contains(&normalize(path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = normalize(path);
        let mut dirs = self.directories.write().unwrap();
        Self::add_parents(&mut dirs, &path);
        dirs.insert(path);
        Ok(())
    }

    fn create_new(&self, path: &Path, content: &str) -> Result<()> {
        let path = normalize(path);
        let mut files = self.files.write().unwrap();
        if files.contains_key(&path) {
            return Err(Error::new(ErrorKind::AlreadyExists, "File exists"));
        }
        let mut dirs = self.directories.write().unwrap();
        Self::add_parents(&mut dirs, &path);
        files.insert(path, content.to_string());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .read()
            .unwrap()
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::NotFound, "File not found"))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        let path = normalize(path);
        let mut dirs = self.directories.write().unwrap();
        Self::add_parents(&mut dirs, &path);
        self.files
            .write()
            .unwrap()
            .insert(path, content.to_string());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match self.files.write().unwrap().remove(&normalize(path)) {
            Some(_) => Ok(()),
            None => Err(Error::new(ErrorKind::NotFound, "File not found")),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let path = normalize(path);
        let mut dirs = self.directories.write().unwrap();
        if !dirs.contains(&path) {
            return Err(Error::new(ErrorKind::NotFound, "Directory not found"));
        }
        dirs.retain(|d| !d.starts_with(&path));
        self.files.write().unwrap().retain(|f, _| !f.starts_with(&path));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from = normalize(from);
        let to = normalize(to);
        if !self.exists(&from) {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("Source not found: {:?}", from),
            ));
        }
        if self.exists(&to) {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("Destination already exists: {:?}", to),
            ));
        }

        if self.is_dir(&from) {
            // Rewrite the directory itself and every entry beneath it.
            let remap = |p: &PathBuf| -> PathBuf {
                let tail = p.strip_prefix(&from).expect("prefix checked");
                to.join(tail)
            };
            let mut dirs = self.directories.write().unwrap();
            let moved_dirs: Vec<PathBuf> =
                dirs.iter().filter(|d| d.starts_with(&from)).cloned().collect();
            for d in moved_dirs {
                dirs.remove(&d);
                dirs.insert(remap(&d));
            }
            Self::add_parents(&mut dirs, &to);
            drop(dirs);

            let mut files = self.files.write().unwrap();
            let moved_files: Vec<PathBuf> = files
                .keys()
                .filter(|f| f.starts_with(&from))
                .cloned()
                .collect();
            for f in moved_files {
                let content = files.remove(&f).expect("key just collected");
                files.insert(remap(&f), content);
            }
        } else {
            let content = self
                .files
                .write()
                .unwrap()
                .remove(&from)
                .expect("existence checked");
            let mut dirs = self.directories.write().unwrap();
            Self::add_parents(&mut dirs, &to);
            drop(dirs);
            self.files.write().unwrap().insert(to, content);
        }
        Ok(())
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let dir = normalize(dir);
        if !self.directories.read().unwrap().contains(&dir) {
            return Err(Error::new(ErrorKind::NotFound, "Directory not found"));
        }
        let mut entries: Vec<PathBuf> = Vec::new();
        for file in self.files.read().unwrap().keys() {
            if file.parent() == Some(dir.as_path()) {
                entries.push(file.clone());
            }
        }
        for sub in self.directories.read().unwrap().iter() {
            if sub.parent() == Some(dir.as_path()) {
                entries.push(sub.clone());
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_fs_basic_operations() {
        let fs = InMemoryFileSystem::new();

        fs.write_file(Path::new("test.txt"), "Hello, World!").unwrap();
        assert_eq!(
            fs.read_to_string(Path::new("test.txt")).unwrap(),
            "Hello, World!"
        );

        assert!(fs.exists(Path::new("test.txt")));
        assert!(!fs.exists(Path::new("nonexistent.txt")));

        fs.remove_file(Path::new("test.txt")).unwrap();
        assert!(!fs.exists(Path::new("test.txt")));
    }

    #[test]
    fn test_in_memory_fs_create_new() {
        let fs = InMemoryFileSystem::new();

        fs.create_new(Path::new("new.txt"), "").unwrap();
        assert!(fs.exists(Path::new("new.txt")));

        // Creating the same file again must fail
        assert!(fs.create_new(Path::new("new.txt"), "").is_err());
    }

    #[test]
    fn test_in_memory_fs_implicit_directories() {
        let fs = InMemoryFileSystem::new();

        fs.write_file(Path::new("a/b/c/file.txt"), "content").unwrap();

        assert!(fs.is_dir(Path::new("a")));
        assert!(fs.is_dir(Path::new("a/b")));
        assert!(fs.is_dir(Path::new("a/b/c")));
        assert!(fs.exists(Path::new("a/b/c/file.txt")));
    }

    #[test]
    fn test_in_memory_fs_remove_dir_all() {
        let fs = InMemoryFileSystem::new();

        fs.write_file(Path::new("dir/sub/file.txt"), "x").unwrap();
        fs.write_file(Path::new("dir/other.txt"), "y").unwrap();
        fs.write_file(Path::new("keep.txt"), "z").unwrap();

        fs.remove_dir_all(Path::new("dir")).unwrap();

        assert!(!fs.exists(Path::new("dir")));
        assert!(!fs.exists(Path::new("dir/sub/file.txt")));
        assert!(!fs.exists(Path::new("dir/other.txt")));
        assert!(fs.exists(Path::new("keep.txt")));

        // Removing again reports NotFound, matching std::fs
        assert!(fs.remove_dir_all(Path::new("dir")).is_err());
    }

    #[test]
    fn test_in_memory_fs_rename_file() {
        let fs = InMemoryFileSystem::new();

        fs.write_file(Path::new("old.txt"), "content").unwrap();
        fs.rename(Path::new("old.txt"), Path::new("sub/new.txt")).unwrap();

        assert!(!fs.exists(Path::new("old.txt")));
        assert_eq!(
            fs.read_to_string(Path::new("sub/new.txt")).unwrap(),
            "content"
        );
    }

    #[test]
    fn test_in_memory_fs_rename_directory_moves_children() {
        let fs = InMemoryFileSystem::new();

        fs.write_file(Path::new("src/deep/main.py"), "code").unwrap();
        fs.rename(Path::new("src"), Path::new("lib")).unwrap();

        assert!(!fs.exists(Path::new("src")));
        assert!(fs.is_dir(Path::new("lib/deep")));
        assert_eq!(
            fs.read_to_string(Path::new("lib/deep/main.py")).unwrap(),
            "code"
        );
    }

    #[test]
    fn test_in_memory_fs_list_dir() {
        let fs = InMemoryFileSystem::new();

        fs.write_file(Path::new("dir/file1.txt"), "1").unwrap();
        fs.write_file(Path::new("dir/file2.txt"), "2").unwrap();
        fs.create_dir_all(Path::new("dir/sub")).unwrap();
        fs.write_file(Path::new("dir/sub/nested.txt"), "3").unwrap();

        let mut entries = fs.list_dir(Path::new("dir")).unwrap();
        entries.sort();

        assert_eq!(
            entries,
            vec![
                PathBuf::from("dir/file1.txt"),
                PathBuf::from("dir/file2.txt"),
                PathBuf::from("dir/sub"),
            ]
        );
    }

    #[test]
    fn test_in_memory_fs_path_normalization() {
        let fs = InMemoryFileSystem::new();

        fs.write_file(Path::new("dir/file.txt"), "content").unwrap();

        assert!(fs.exists(Path::new("dir/./file.txt")));
        assert!(fs.exists(Path::new("dir/sub/../file.txt")));
    }
}
