use std::{
    collections::HashMap,
    io,
    path::{Component, Path, PathBuf},
    rc::Rc,
};

use crate::common::source::Source;

pub const ENTRY_POINT: &str = "main";
pub const EXTENSION: &str = "ae";

/// Resolves the path named by a `use` form against the directory of the
/// file that contains it, never against the working directory.
pub fn resolve(including: &Source, relative: &str) -> PathBuf {
    normalize(&including.dir().join(relative))
}

/// Drops `.` components and folds `dir/..` pairs, so the same file is
/// always named the same way when checking for inclusion cycles.
pub fn normalize(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir
                if matches!(
                    resolved.components().next_back(),
                    Some(Component::Normal(_))
                ) =>
            {
                resolved.pop();
            },
            other => resolved.push(other.as_os_str()),
        }
    }

    resolved
}

/// The file-read primitive used when resolving `use` forms.
/// A missing file is reported with `io::ErrorKind::NotFound`.
pub trait Loader {
    fn load(&self, path: &Path) -> io::Result<Rc<Source>>;
}

/// Reads included files straight from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl Loader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<Rc<Source>> { Source::path(path) }
}

/// Serves included files from memory, keyed by resolved path.
/// Handy for hosts that keep sources somewhere other than a disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> MemoryLoader { MemoryLoader::default() }

    pub fn with(mut self, path: impl Into<PathBuf>, contents: &str) -> MemoryLoader {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: &str) {
        self.files.insert(path.into(), contents.to_string());
    }
}

impl Loader for MemoryLoader {
    fn load(&self, path: &Path) -> io::Result<Rc<Source>> {
        self.files
            .get(path)
            .map(|contents| Source::new(contents, path))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}
