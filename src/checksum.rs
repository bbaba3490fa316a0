//! Checksum listing (`sha256sums`) parsing

use std::collections::HashMap;

/// Filename to hex digest table parsed from a checksum listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumListing {
    entries: HashMap<String, String>,
}

impl ChecksumListing {
    /// Parses `<hash> <filename>` lines.
    ///
    /// Surrounding whitespace and lines without both fields are ignored. A
    /// leading `*` (binary mode marker of `sha256sum -b`) is dropped from the
    /// filename.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let hash = fields.next()?;
                let filename = fields.next()?;
                let filename = filename.strip_prefix('*').unwrap_or(filename);
                Some((filename.to_string(), hash.to_string()))
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, filename: &str) -> Option<&str> {
        self.entries.get(filename).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
