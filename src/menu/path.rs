//! Menu paths such as `/stocks/dd/`

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Slash-delimited position of a menu in the tree.
///
/// Always starts and ends with `/` and contains only lowercase ASCII
/// letters between the slashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuPath(String);

impl MenuPath {
    /// The root menu `/`
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let invalid = |reason: &str| Error::InvalidMenuPath {
            path: path.clone(),
            reason: reason.to_string(),
        };

        if !path.starts_with('/') || !path.ends_with('/') {
            return Err(invalid("must start and end with '/'"));
        }
        if path.contains("//") {
            return Err(invalid("contains an empty segment"));
        }
        if !path.chars().all(|c| c == '/' || c.is_ascii_lowercase()) {
            return Err(invalid("only lowercase ASCII letters are allowed"));
        }

        Ok(Self(path))
    }

    /// Path of the child menu `name`
    pub fn child(&self, name: &str) -> Result<Self> {
        Self::new(format!("{}{}/", self.0, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of `/` characters; the root has depth 1
    pub fn depth(&self) -> usize {
        self.0.matches('/').count()
    }

    /// Named segments from the root down
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }

    /// Last segment, empty for the root
    pub fn name(&self) -> &str {
        self.segments().last().unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Absolute command line that navigates here from anywhere, e.g. `/stocks/dd`
    pub fn to_command(&self) -> String {
        self.0.trim_end_matches('/').to_string()
    }
}

impl fmt::Display for MenuPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MenuPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for MenuPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
