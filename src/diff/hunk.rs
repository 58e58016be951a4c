use crate::error::DiffError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@")
        .expect("HUNK_HEADER_RE regex should compile")
});

/// Parsed `@@ -old_start,old_len +new_start,new_len @@` header.
///
/// An omitted length means one line, as in `diff -u` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HunkHeader {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
}

impl HunkHeader {
    /// Parse a header line, rejecting anything that does not match the
    /// unified format
    pub fn parse(line: &str) -> Result<Self, DiffError> {
        Self::try_parse(line).ok_or_else(|| DiffError::InvalidHunkHeader(line.to_string()))
    }

    /// Lenient variant used by the line map builder
    pub fn try_parse(line: &str) -> Option<Self> {
        let caps = HUNK_HEADER_RE.captures(line)?;
        let number = |idx: usize, default: usize| -> Option<usize> {
            match caps.get(idx) {
                Some(m) => m.as_str().parse().ok(),
                None => Some(default),
            }
        };

        Some(Self {
            old_start: number(1, 0)?,
            old_len: number(2, 1)?,
            new_start: number(3, 0)?,
            new_len: number(4, 1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_header() {
        let header = HunkHeader::parse("@@ -10,3 +10,5 @@ fn main() {").unwrap();
        assert_eq!(
            header,
            HunkHeader {
                old_start: 10,
                old_len: 3,
                new_start: 10,
                new_len: 5,
            }
        );
    }

    #[test]
    fn test_parse_omitted_lengths() {
        let header = HunkHeader::parse("@@ -1 +1 @@").unwrap();
        assert_eq!(header.old_len, 1);
        assert_eq!(header.new_len, 1);
    }

    #[test]
    fn test_parse_new_file_header() {
        let header = HunkHeader::parse("@@ -0,0 +1,12 @@").unwrap();
        assert_eq!(header.old_start, 0);
        assert_eq!(header.old_len, 0);
        assert_eq!(header.new_start, 1);
        assert_eq!(header.new_len, 12);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(HunkHeader::parse("@@ -10,3 @@").is_err());
        assert!(HunkHeader::parse("@@ garbage @@").is_err());
        assert!(HunkHeader::try_parse("not a header").is_none());
        assert_eq!(
            HunkHeader::parse("@@ -x +y @@").unwrap_err(),
            DiffError::InvalidHunkHeader("@@ -x +y @@".to_string())
        );
    }
}
