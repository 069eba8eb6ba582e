use std::fmt;

/// Where an entry's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Remote,
    Local,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Remote => write!(f, "remote"),
            Origin::Local => write!(f, "local"),
        }
    }
}

/// One (name, locator) pair scheduled for extraction.
///
/// Entries are never deduplicated; two identical rows produce two independent
/// units of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub content_name: String,
    /// A URL for remote entries, a filesystem path for local ones.
    pub locator: String,
    pub origin: Origin,
}

impl ContentEntry {
    pub fn remote(content_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content_name: content_name.into(),
            locator: url.into(),
            origin: Origin::Remote,
        }
    }

    pub fn local(content_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            content_name: content_name.into(),
            locator: path.into(),
            origin: Origin::Local,
        }
    }
}
