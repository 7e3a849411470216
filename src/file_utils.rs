use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extension of source and translated documents
pub const MARKDOWN_EXTENSION: &str = "md";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Sibling output path `<stem>.<lang>.md` for a source document
    pub fn generate_output_path<P: AsRef<Path>>(source: P, target_language: &str) -> PathBuf {
        let source = source.as_ref();
        let stem = source.file_stem().unwrap_or_default().to_string_lossy();
        let file_name = format!("{}.{}.{}", stem, target_language, MARKDOWN_EXTENSION);
        match source.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Source documents `<dir>/<name>.md` present in `dir`, in `names` order
    pub fn find_source_documents<P: AsRef<Path>>(dir: P, names: &[String]) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut present = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.with_context(|| format!("Failed to read directory entry in {:?}", dir))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == MARKDOWN_EXTENSION) {
                present.push(path.to_path_buf());
            }
        }

        Ok(names
            .iter()
            .filter_map(|name| {
                present
                    .iter()
                    .find(|path| path.file_stem().is_some_and(|stem| stem.to_string_lossy() == name.as_str()))
                    .cloned()
            })
            .collect())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
