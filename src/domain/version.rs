use crate::error::Result;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// Release version, rendered as a `vMAJOR.MINOR.PATCH` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^v(\d+)\.(\d+)\.(\d+)").expect("valid tag regex"))
}

impl Version {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version from the start of a tag (e.g., "v1.2.3" or "v1.2.3-rc1" -> 1.2.3)
    ///
    /// Returns `None` when the tag does not start with `v<digits>.<digits>.<digits>`
    /// or a component does not fit in a `u32`.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        let captures = tag_pattern().captures(tag.trim())?;
        let component = |i: usize| captures.get(i)?.as_str().parse::<u32>().ok();

        Some(Version::new(component(1)?, component(2)?, component(3)?))
    }

    /// Starting point for sequencing: the latest tag, or `v0.0.0` when there is
    /// none or it does not parse
    pub fn from_latest_tag(tag: Option<&str>) -> Self {
        tag.and_then(Version::parse_tag).unwrap_or_default()
    }

    /// The same version with the patch component incremented
    pub fn next_patch(&self) -> Self {
        Version {
            patch: self.patch.saturating_add(1),
            ..*self
        }
    }

    /// Find the lowest unused patch release strictly greater than `self`
    ///
    /// `exists` is asked about each candidate tag name in turn, so tags created
    /// out-of-band between releases are skipped rather than collided with.
    pub fn next_free<F>(&self, mut exists: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<bool>,
    {
        let mut candidate = self.next_patch();
        while exists(&candidate.to_string())? {
            candidate = candidate.next_patch();
        }
        Ok(candidate)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Next free version given the latest tag and the full set of existing tags
pub fn next_version(latest: Option<&str>, existing: &HashSet<String>) -> Version {
    let start = Version::from_latest_tag(latest);
    let mut candidate = start.next_patch();
    while existing.contains(&candidate.to_string()) {
        candidate = candidate.next_patch();
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_version_parse() {
        let v = Version::parse_tag("v1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
    }

    #[test]
    fn test_version_parse_with_suffix() {
        assert_eq!(Version::parse_tag("v1.2.3-rc1"), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert_eq!(Version::parse_tag("1.2.3"), None);
        assert_eq!(Version::parse_tag("V1.2.3"), None);
        assert_eq!(Version::parse_tag("v1.2"), None);
        assert_eq!(Version::parse_tag("release-1"), None);
        assert_eq!(Version::parse_tag(""), None);
    }

    #[test]
    fn test_version_parse_overflow() {
        assert_eq!(Version::parse_tag("v99999999999.0.0"), None);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "v1.2.3");
    }

    #[test]
    fn test_missing_or_garbage_tag_starts_at_zero() {
        assert_eq!(Version::from_latest_tag(None), Version::new(0, 0, 0));
        assert_eq!(Version::from_latest_tag(Some("nightly")), Version::new(0, 0, 0));
    }

    #[test]
    fn test_next_version_simple() {
        assert_eq!(next_version(Some("v1.2.3"), &tags(&["v1.2.3"])), Version::new(1, 2, 4));
    }

    #[test]
    fn test_next_version_skips_existing() {
        let existing = tags(&["v1.2.3", "v1.2.4", "v1.2.5"]);
        assert_eq!(next_version(Some("v1.2.3"), &existing), Version::new(1, 2, 6));
    }

    #[test]
    fn test_next_version_bootstrap() {
        assert_eq!(next_version(None, &HashSet::new()), Version::new(0, 0, 1));
    }

    #[test]
    fn test_next_version_garbage_behaves_like_zero() {
        let existing = tags(&["v0.0.1"]);
        assert_eq!(
            next_version(Some("latest"), &existing),
            next_version(Some("v0.0.0"), &existing)
        );
        assert_eq!(next_version(Some("latest"), &existing), Version::new(0, 0, 2));
    }

    #[test]
    fn test_next_version_never_returns_existing_tag() {
        let existing = tags(&["v2.0.1", "v2.0.2", "v2.0.4"]);
        for latest in ["v2.0.0", "v2.0.1", "v2.0.2", "v2.0.3"] {
            let next = next_version(Some(latest), &existing);
            assert!(!existing.contains(&next.to_string()), "{} -> {}", latest, next);
            assert!(next > Version::parse_tag(latest).unwrap());
        }
        assert_eq!(next_version(Some("v2.0.0"), &existing), Version::new(2, 0, 3));
    }

    #[test]
    fn test_next_free_asks_until_unused() {
        let existing = tags(&["v1.0.1", "v1.0.2"]);
        let mut asked = Vec::new();
        let next = Version::new(1, 0, 0)
            .next_free(|tag| {
                asked.push(tag.to_string());
                Ok(existing.contains(tag))
            })
            .unwrap();

        assert_eq!(next, Version::new(1, 0, 3));
        assert_eq!(asked, vec!["v1.0.1", "v1.0.2", "v1.0.3"]);
    }

    #[test]
    fn test_next_free_propagates_errors() {
        let result = Version::new(1, 0, 0)
            .next_free(|_| Err(crate::error::GupError::tag("lookup failed")));
        assert!(result.is_err());
    }
}
