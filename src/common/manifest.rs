use std::{
    fs,
    path::{Path, PathBuf},
};

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::common::module::{ENTRY_POINT, EXTENSION};

pub const MANIFEST: &str = "aether.toml";
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 64;
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

/// Options that shape a single compile session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// How many `use` forms may be nested inside one another
    /// before the compile is aborted.
    pub max_include_depth: usize,
    /// How deeply expressions may nest, counted across included files,
    /// before the compile is aborted.
    pub max_nesting_depth: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    // required keys
    pub name:    String,
    pub version: String, // using semver

    // optional keys
    #[serde(default = "default_entry")]
    pub entry: PathBuf, // relative to the manifest
}

fn default_entry() -> PathBuf {
    PathBuf::from("src").join(format!("{}.{}", ENTRY_POINT, EXTENSION))
}

/// The contents of an `aether.toml` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub package:  Package,
    #[serde(default)]
    pub compiler: Config,
}

impl Manifest {
    /// Searches `path` and its ancestors for a manifest.
    /// Returns the manifest along with the directory it was found in.
    pub fn package(mut path: &Path) -> Result<(Manifest, &Path), String> {
        let source = loop {
            match fs::read_to_string(path.join(MANIFEST)) {
                Ok(source) => break source,
                Err(_) => {
                    path = path.parent().ok_or_else(|| {
                        format!("The manifest file `{}` could not be found", MANIFEST)
                    })?;
                },
            }
        };

        Ok((Manifest::parse(&source)?, path))
    }

    pub fn parse(source: &str) -> Result<Manifest, String> {
        let manifest: Manifest = toml::from_str(source)
            .map_err(|e| format!("Could not parse the manifest file: {}", e))?;

        Version::parse(&manifest.package.version).map_err(|e| {
            format!(
                "The package version `{}` is not valid semver: {}",
                manifest.package.version, e
            )
        })?;

        Ok(manifest)
    }

    /// The entry point of the package rooted at `dir`.
    pub fn entry(&self, dir: &Path) -> PathBuf { dir.join(&self.package.entry) }
}
