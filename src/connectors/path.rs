//! Container path handling shared by the connectors

use std::fmt;

use super::error::{ConnectorError, Result};

/// Split a container string on `/` or `\`, dropping empty and `.` segments
pub fn segments(container: &str) -> Vec<&str> {
    container
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// File names are a single segment: no separators, not `.` or `..`
pub fn validate_name(name: &str) -> Result<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ConnectorError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// `"library[/folder[/folder...]]"` after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPath {
    pub library: String,
    pub folders: Vec<String>,
}

impl LibraryPath {
    /// Parse and normalize a library container
    ///
    /// Backslashes count as separators; redundant slashes, `.` segments and
    /// surrounding whitespace are dropped. `..` and empty paths are rejected.
    pub fn parse(container: &str) -> Result<Self> {
        let parts = segments(container);
        if parts.iter().any(|s| *s == "..") {
            return Err(ConnectorError::InvalidContainer(container.to_string()));
        }

        let mut parts = parts.into_iter().map(str::to_string);
        let library = parts
            .next()
            .ok_or_else(|| ConnectorError::InvalidContainer(container.to_string()))?;

        Ok(Self {
            library,
            folders: parts.collect(),
        })
    }
}

impl fmt::Display for LibraryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.library)?;
        for folder in &self.folders {
            write!(f, "/{folder}")?;
        }
        Ok(())
    }
}
