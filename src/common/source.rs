use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

/// `Source` represents some literal source code.
/// Whether a file on disk or a snippet handed over by a host,
/// it's essentially a string with a path, the path serving as the
/// source's name in diagnostics and as the anchor for relative
/// `use` paths. Source files without a path point to `./source`.
#[derive(Debug, PartialEq, Eq)]
pub struct Source {
    pub contents: String,
    pub path:     PathBuf,
}

impl Source {
    /// Creates a new `Source` given both an `&str` and a `Path`.
    /// Note that this function does not check that the contents of the
    /// file match the source.
    pub fn new(source: &str, path: &Path) -> Rc<Source> {
        Rc::new(Source {
            contents: source.to_string(),
            path:     path.to_owned(),
        })
    }

    /// Build a `Source` from a path.
    /// This will read a file to create a new source.
    pub fn path(path: &Path) -> std::io::Result<Rc<Source>> {
        let contents = fs::read_to_string(path)?;
        Ok(Source::new(&contents, path))
    }

    /// Build a `Source` containing just a string.
    /// Note that this source will point towards `./source`,
    /// so relative `use` paths resolve against the working directory.
    pub fn source(source: &str) -> Rc<Source> {
        Source::new(source, &PathBuf::from("./source"))
    }

    /// The directory sibling `use` paths are resolved against.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}
