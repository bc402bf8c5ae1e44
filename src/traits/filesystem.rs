use anyhow::{Context, Result};
#[cfg(test)]
use std::collections::HashMap;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{Arc, RwLock};

/// Trait for filesystem operations to enable testing with mocks
pub trait FileSystem: Send + Sync {
    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write string contents to file
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Check if path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Walk directory recursively, returning every entry up to `max_depth`
    fn walk_dir(&self, path: &Path, max_depth: usize) -> Result<Vec<PathBuf>>;
}

/// Real filesystem implementation using std::fs
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create parent directory: {:?}", parent))?;
            }
        }

        std::fs::write(path, contents).with_context(|| format!("Failed to write file: {:?}", path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn walk_dir(&self, path: &Path, max_depth: usize) -> Result<Vec<PathBuf>> {
        use walkdir::WalkDir;

        let mut paths = Vec::new();
        for entry in WalkDir::new(path).max_depth(max_depth).sort_by_file_name() {
            let entry = entry.context("Failed to walk directory")?;
            paths.push(entry.path().to_path_buf());
        }

        Ok(paths)
    }
}

/// Mock filesystem implementation for testing (in-memory)
#[cfg(test)]
pub struct MockFileSystem {
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
    directories: Arc<RwLock<HashMap<PathBuf, ()>>>,
}

#[cfg(test)]
impl MockFileSystem {
    /// Create new empty mock filesystem
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            directories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get captured file contents for testing assertions
    pub fn get_file_contents(&self, path: &Path) -> Option<String> {
        self.files.read().unwrap().get(path).cloned()
    }

    fn add_parents(&self, path: &Path) {
        let mut directories = self.directories.write().unwrap();
        let mut current = path;
        while let Some(parent) = current.parent() {
            directories.insert(parent.to_path_buf(), ());
            current = parent;
        }
    }
}

#[cfg(test)]
impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .with_context(|| format!("File not found in mock filesystem: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        self.add_parents(path);
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
            || self.directories.read().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.directories.read().unwrap().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }

    fn walk_dir(&self, path: &Path, max_depth: usize) -> Result<Vec<PathBuf>> {
        let files = self.files.read().unwrap();
        let directories = self.directories.read().unwrap();

        let mut entries = Vec::new();

        if directories.contains_key(path) {
            entries.push(path.to_path_buf());
        }

        let within_depth = |candidate: &Path| match candidate.strip_prefix(path) {
            Ok(relative) => {
                let depth = relative.components().count();
                depth > 0 && depth <= max_depth
            }
            Err(_) => false,
        };

        entries.extend(directories.keys().filter(|d| within_depth(d.as_path())).cloned());
        entries.extend(files.keys().filter(|f| within_depth(f.as_path())).cloned());
        entries.sort();

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_write_then_read() {
        let fs = MockFileSystem::new();
        fs.write(Path::new("/a/b/state.json"), "{}").unwrap();

        assert_eq!(fs.read_to_string(Path::new("/a/b/state.json")).unwrap(), "{}");
        assert!(fs.is_dir(Path::new("/a/b")));
        assert!(fs.is_file(Path::new("/a/b/state.json")));
    }

    #[test]
    fn test_mock_walk_dir_respects_depth() {
        let fs = MockFileSystem::new();
        fs.write(Path::new("/t/ec2.tf.hbs"), "x").unwrap();
        fs.write(Path::new("/t/nested/deep.tf.hbs"), "y").unwrap();

        let shallow = fs.walk_dir(Path::new("/t"), 1).unwrap();
        assert!(shallow.contains(&PathBuf::from("/t/ec2.tf.hbs")));
        assert!(!shallow.contains(&PathBuf::from("/t/nested/deep.tf.hbs")));

        let deep = fs.walk_dir(Path::new("/t"), 2).unwrap();
        assert!(deep.contains(&PathBuf::from("/t/nested/deep.tf.hbs")));
    }

    #[test]
    fn test_real_filesystem_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");

        RealFileSystem.write(&path, "content").unwrap();

        assert!(RealFileSystem.is_file(&path));
        assert_eq!(RealFileSystem.read_to_string(&path).unwrap(), "content");
    }
}
