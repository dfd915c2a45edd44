//! Ordered list of gallery versions tracked by the mirror

use semver::Version;
use tracing::warn;

/// Parse a version tag into a semver::Version, normalizing partial versions.
///
/// Handles partial tags like "1" or "1.21" by padding with zeros.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.21" -> Version(1, 21, 0)
/// - "1.21.10" -> Version(1, 21, 10)
pub fn parse_version(version: &str) -> Option<Version> {
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Gallery version tags, kept newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedVersions {
    tags: Vec<String>,
}

impl TrackedVersions {
    /// Build the list from arbitrary tags.
    ///
    /// Tags are sorted newest first; duplicates collapse and tags that are not
    /// version numbers are dropped.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed: Vec<(String, Version)> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            match parse_version(&tag) {
                Some(version) => {
                    if !parsed.iter().any(|(_, v)| *v == version) {
                        parsed.push((tag, version));
                    }
                }
                None => warn!("Ignoring tracked version with invalid tag: {}", tag),
            }
        }

        parsed.sort_by(|(_, a), (_, b)| b.cmp(a));

        Self {
            tags: parsed.into_iter().map(|(tag, _)| tag).collect(),
        }
    }

    /// The most recent tracked version, used for items with no change record
    pub fn newest(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    /// Tags ordered newest first
    pub fn newest_first(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Tags ordered oldest first
    pub fn oldest_first(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().rev().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for TrackedVersions {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TRACKED_VERSIONS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(Version::new(1, 0, 0)))]
    #[case("1.21", Some(Version::new(1, 21, 0)))]
    #[case("1.21.10", Some(Version::new(1, 21, 10)))]
    #[case("snapshot", None)]
    #[case("", None)]
    fn parse_version_pads_partial_tags(#[case] input: &str, #[case] expected: Option<Version>) {
        assert_eq!(parse_version(input), expected);
    }

    #[test]
    fn new_sorts_tags_newest_first() {
        let versions = TrackedVersions::new(["1.16.5", "1.21.10", "1.21.4", "1.21.6"]);

        assert_eq!(
            versions.newest_first().collect::<Vec<_>>(),
            vec!["1.21.10", "1.21.6", "1.21.4", "1.16.5"]
        );
        assert_eq!(versions.newest(), Some("1.21.10"));
    }

    #[test]
    fn new_drops_invalid_and_duplicate_tags() {
        let versions = TrackedVersions::new(["1.20", "latest", "1.20.0", "1.19.4"]);

        assert_eq!(versions.as_slice(), &["1.20".to_string(), "1.19.4".to_string()]);
    }

    #[test]
    fn oldest_first_reverses_order() {
        let versions = TrackedVersions::new(["1.13.2", "1.14.4", "1.15.2"]);

        assert_eq!(
            versions.oldest_first().collect::<Vec<_>>(),
            vec!["1.13.2", "1.14.4", "1.15.2"]
        );
    }

    #[test]
    fn default_matches_known_gallery_versions() {
        let versions = TrackedVersions::default();

        assert_eq!(versions.len(), 12);
        assert_eq!(versions.newest(), Some("1.21.10"));
        assert_eq!(versions.oldest_first().next(), Some("1.13.2"));
    }
}
