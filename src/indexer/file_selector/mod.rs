//! Lazy repository walk yielding candidate source files

use super::candidate::CandidateFile;
use super::language::{ExtensionDetector, LanguageDetector};
use crate::error::SelectionError;
use crate::resolve::{FsSymlinkResolver, SymlinkResolver};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

/// How many leading bytes the language detector gets to look at
const DETECTION_HEAD_LEN: u64 = 8 * 1024;

type EntryFilter = fn(&DirEntry) -> bool;

/// Counters collected while a selection runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStats {
    /// Non-directory entries inspected
    pub seen: usize,
    pub selected: usize,
    pub oversize: usize,
    pub unrecognized: usize,
}

#[derive(Clone)]
pub struct FileSelector {
    pub(crate) root: PathBuf,
    pub(crate) max_file_size: u64,
    resolver: Arc<dyn SymlinkResolver>,
    detector: Arc<dyn LanguageDetector>,
}

impl FileSelector {
    pub fn new(root: impl AsRef<Path>, max_file_size: u64) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_file_size,
            resolver: Arc::new(FsSymlinkResolver),
            detector: Arc::new(ExtensionDetector::new()),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn SymlinkResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Start a single pass over the repository.
    ///
    /// The returned iterator is lazy and fused: after it yields an error (for example
    /// a dangling symlink) it yields nothing more.
    pub fn select(self) -> Result<Selection, SelectionError> {
        if !self.root.exists() {
            return Err(SelectionError::RootNotFound(
                self.root.display().to_string(),
            ));
        }
        if !self.root.is_dir() {
            return Err(SelectionError::NotADirectory(
                self.root.display().to_string(),
            ));
        }

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(is_not_git_dir as EntryFilter);

        Ok(Selection {
            selector: self,
            walker,
            stats: SelectionStats::default(),
            finished: false,
        })
    }

    /// Inspect one walk entry. `Ok(None)` means the entry was filtered out.
    fn inspect(
        &self,
        entry: &DirEntry,
        stats: &mut SelectionStats,
    ) -> Result<Option<CandidateFile>, SelectionError> {
        if entry.file_type().is_dir() {
            return Ok(None);
        }
        stats.seen += 1;

        let path = entry.path();
        let absolute_path = self.resolver.resolve(path)?;

        let metadata = fs::metadata(&absolute_path).map_err(|e| SelectionError::FileReadFailed {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if metadata.is_dir() {
            tracing::debug!("Not following directory symlink: {:?}", path);
            return Ok(None);
        }
        if !metadata.is_file() {
            return Ok(None);
        }

        let size = metadata.len();
        if size > self.max_file_size {
            tracing::debug!(
                "Skipping large file: {:?} ({} > {} bytes)",
                path,
                size,
                self.max_file_size
            );
            stats.oversize += 1;
            return Ok(None);
        }

        let relative_path = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let head = read_head(&absolute_path).map_err(|e| SelectionError::FileReadFailed {
            file: relative_path.clone(),
            reason: e.to_string(),
        })?;

        let Some(language) = self.detector.detect(&relative_path, &head) else {
            tracing::debug!("Skipping non-source file: {}", relative_path);
            stats.unrecognized += 1;
            return Ok(None);
        };

        stats.selected += 1;
        Ok(Some(CandidateFile {
            relative_path,
            absolute_path,
            size,
            language,
        }))
    }
}

/// One in-progress pass over a repository
pub struct Selection {
    selector: FileSelector,
    walker: walkdir::FilterEntry<walkdir::IntoIter, EntryFilter>,
    stats: SelectionStats,
    finished: bool,
}

impl Selection {
    pub fn stats(&self) -> SelectionStats {
        self.stats
    }
}

impl Iterator for Selection {
    type Item = Result<CandidateFile, SelectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let entry = match self.walker.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(SelectionError::WalkFailed(e.to_string())));
                }
                None => {
                    self.finished = true;
                    return None;
                }
            };

            match self.selector.inspect(&entry, &mut self.stats) {
                Ok(Some(candidate)) => return Some(Ok(candidate)),
                Ok(None) => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl std::iter::FusedIterator for Selection {}

fn is_not_git_dir(entry: &DirEntry) -> bool {
    !(entry.file_type().is_dir() && entry.file_name() == ".git")
}

fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::new();
    File::open(path)?
        .take(DETECTION_HEAD_LEN)
        .read_to_end(&mut head)?;
    Ok(head)
}

#[cfg(test)]
mod tests;
