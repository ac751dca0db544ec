//! Version types and the pre-release aware comparator.
//!
//! A [`Version`] is a numeric `major.minor.patch` triple with an optional
//! pre-release tag. Ordering is not intrinsic to the type: it is established by
//! a [`VersionComparator`] built from an explicit [`PrereleaseRanking`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{SprigError, SprigResult};

/// Concrete published version (major.minor.patch-prerelease)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<Prerelease>,
}

/// Pre-release tag, e.g. `alpha.3174632` or `rc.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prerelease {
    /// Leading alphabetic identifier (`alpha`, `beta`, `rc`, ...)
    pub identifier: String,
    /// Trailing sequence after the identifier
    pub sequence: Option<Sequence>,
    /// Tag text as published, the last tie-break between equal-ranked tags
    pub raw: String,
}

/// Trailing part of a pre-release tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sequence {
    /// All-digit sequence, compared numerically
    Numeric(u64),
    /// Anything else, compared lexically
    Text(String),
}

/// Ordered pre-release identifiers, lowest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrereleaseRanking {
    order: Vec<String>,
}

/// Total order over versions under a given pre-release ranking
#[derive(Debug, Clone, Default)]
pub struct VersionComparator {
    ranking: PrereleaseRanking,
}

impl Version {
    /// Create a release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Parse a version string, failing with `MalformedVersion`
    pub fn parse(input: &str) -> SprigResult<Self> {
        input.parse()
    }

    /// Check if this is a pre-release version
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// The numeric triple
    pub fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = SprigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| SprigError::MalformedVersion {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let input = s.trim();
        let input = input
            .strip_prefix('v')
            .or_else(|| input.strip_prefix('='))
            .unwrap_or(input);

        // Build metadata carries no precedence
        let version_part = match input.split_once('+') {
            Some((v, _)) => v,
            None => input,
        };

        let (core_part, prerelease) = match version_part.split_once('-') {
            Some((c, p)) => {
                let pre = Prerelease::parse(p).ok_or_else(|| malformed("empty pre-release tag"))?;
                (c, Some(pre))
            },
            None => (version_part, None),
        };

        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() != 3 {
            return Err(malformed("expected major.minor.patch"));
        }

        let component = |part: &str| {
            part.parse::<u64>()
                .map_err(|_| malformed(format!("'{}' is not a number", part).as_str()))
        };

        Ok(Version {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
            prerelease,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }

        Ok(())
    }
}

impl Prerelease {
    /// Split pre-release text into identifier and sequence.
    ///
    /// Returns `None` for empty text.
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }

        let split = text
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(text.len());
        let (identifier, rest) = text.split_at(split);
        let rest = rest
            .strip_prefix('.')
            .or_else(|| rest.strip_prefix('-'))
            .unwrap_or(rest);

        Some(Self {
            identifier: identifier.to_string(),
            sequence: Sequence::parse(rest),
            raw: text.to_string(),
        })
    }
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Sequence {
    fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        if text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = text.parse() {
                return Some(Sequence::Numeric(n));
            }
        }
        Some(Sequence::Text(text.to_string()))
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sequence::Numeric(n) => write!(f, "{}", n),
            Sequence::Text(s) => write!(f, "{}", s),
        }
    }
}

impl PrereleaseRanking {
    /// Build a ranking from identifiers listed lowest first.
    ///
    /// Repeated identifiers keep their first position.
    pub fn new<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order: Vec<String> = Vec::new();
        for id in identifiers {
            let id = id.into();
            if !order.contains(&id) {
                order.push(id);
            }
        }
        Self { order }
    }

    /// Position of an identifier, `None` when unranked
    pub fn rank(&self, identifier: &str) -> Option<usize> {
        self.order.iter().position(|id| id == identifier)
    }

    /// Identifiers lowest first
    pub fn identifiers(&self) -> &[String] {
        &self.order
    }
}

impl Default for PrereleaseRanking {
    fn default() -> Self {
        Self::new(["alpha", "beta", "rc"])
    }
}

impl VersionComparator {
    /// Create a comparator over the given ranking
    pub fn new(ranking: PrereleaseRanking) -> Self {
        Self { ranking }
    }

    /// Compare two versions; the numeric triple dominates the pre-release tag
    pub fn compare(&self, a: &Version, b: &Version) -> Ordering {
        a.triple()
            .cmp(&b.triple())
            .then_with(|| match (&a.prerelease, &b.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(pa), Some(pb)) => self.compare_prerelease(pa, pb),
            })
    }

    /// Parse both strings and compare them
    pub fn compare_str(&self, a: &str, b: &str) -> SprigResult<Ordering> {
        Ok(self.compare(&Version::parse(a)?, &Version::parse(b)?))
    }

    /// Fold versions to the highest one
    pub fn max_of<'a, I>(&self, versions: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        versions.into_iter().fold(None, |best, candidate| match best {
            Some(current) if self.compare(candidate, current) != Ordering::Greater => Some(current),
            _ => Some(candidate),
        })
    }

    fn compare_prerelease(&self, a: &Prerelease, b: &Prerelease) -> Ordering {
        let ranks = (self.ranking.rank(&a.identifier), self.ranking.rank(&b.identifier));
        let by_identifier = match ranks {
            (Some(ra), Some(rb)) => ra.cmp(&rb),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => a.identifier.cmp(&b.identifier),
        };

        // Option orders None first and Sequence orders Numeric before Text.
        // `alpha1`, `alpha.1` and `alpha.01` share a sequence but are distinct
        // published versions, so the tag text settles them.
        by_identifier
            .then_with(|| a.sequence.cmp(&b.sequence))
            .then_with(|| a.raw.cmp(&b.raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn cmp(a: &str, b: &str) -> Ordering {
        VersionComparator::default().compare(&v(a), &v(b))
    }

    #[test]
    fn test_version_parsing() {
        let version = v("1.2.3");
        assert_eq!(version.triple(), (1, 2, 3));
        assert_eq!(version.prerelease, None);
    }

    #[test]
    fn test_version_with_prerelease() {
        let version = v("16.4.0-alpha.3174632");
        assert_eq!(version.triple(), (16, 4, 0));
        let pre = version.prerelease.unwrap();
        assert_eq!(pre.identifier, "alpha");
        assert_eq!(pre.sequence, Some(Sequence::Numeric(3174632)));

        let pre = v("16.4.0-alpha.0911da3").prerelease.unwrap();
        assert_eq!(pre.sequence, Some(Sequence::Text("0911da3".to_string())));

        let pre = v("1.0.0-beta1").prerelease.unwrap();
        assert_eq!(pre.identifier, "beta");
        assert_eq!(pre.sequence, Some(Sequence::Numeric(1)));

        let pre = v("1.0.0-rc").prerelease.unwrap();
        assert_eq!(pre.identifier, "rc");
        assert_eq!(pre.sequence, None);
    }

    #[test]
    fn test_version_build_metadata_ignored() {
        assert_eq!(v("1.2.3+build.7"), Version::new(1, 2, 3));
        assert_eq!(v("v1.2.3"), Version::new(1, 2, 3));
    }

    #[test]
    fn test_malformed_versions() {
        for input in ["", "1.2", "1.2.3.4", "1.x.3", "a.b.c", "1.2.3-", "-1.2.3"] {
            match Version::parse(input) {
                Err(SprigError::MalformedVersion { input: reported, .. }) => {
                    assert_eq!(reported, input);
                },
                other => panic!("expected MalformedVersion for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_version_display() {
        assert_eq!(v("1.2.3").to_string(), "1.2.3");
        assert_eq!(v("16.4.0-alpha.3174632").to_string(), "16.4.0-alpha.3174632");
        assert_eq!(v("1.0.0-rc").to_string(), "1.0.0-rc");
        assert_eq!(v("1.0.0-0").to_string(), "1.0.0-0");
    }

    #[test]
    fn test_release_beats_prerelease() {
        assert_eq!(cmp("16.4.0", "16.4.0-alpha.1"), Ordering::Greater);
        assert_eq!(cmp("16.4.1", "16.4.1-alpha"), Ordering::Greater);
        assert_eq!(cmp("16.4.0-alpha", "16.4.1"), Ordering::Less);
    }

    #[test]
    fn test_prerelease_rank() {
        assert_eq!(cmp("16.4.0-rc.0", "16.4.0-alpha.3174632"), Ordering::Greater);
        assert_eq!(cmp("16.4.0-beta.9", "16.4.0-rc.0"), Ordering::Less);
        assert_eq!(cmp("1.0.0-canary.5", "1.0.0-alpha.0"), Ordering::Less);
    }

    #[test]
    fn test_triple_dominates_prerelease() {
        assert_eq!(cmp("16.5.0-alpha.0", "16.4.0-alpha.3174632"), Ordering::Greater);
        assert_eq!(cmp("16.4.1-alpha.0", "16.4.0-alpha.3174632"), Ordering::Greater);
        assert_eq!(cmp("17.4.0-alpha.0", "16.4.0-alpha.3174632"), Ordering::Greater);
        assert_eq!(cmp("15.5.0", "16.4.1"), Ordering::Less);
        assert_eq!(cmp("16.3.2", "16.4.1"), Ordering::Less);
    }

    #[test]
    fn test_sequence_tie_break() {
        assert_eq!(cmp("1.0.0-alpha.10", "1.0.0-alpha.9"), Ordering::Greater);
        assert_eq!(cmp("1.0.0-alpha.abc", "1.0.0-alpha.abd"), Ordering::Less);
        assert_eq!(cmp("1.0.0-alpha.99", "1.0.0-alpha.0911da3"), Ordering::Less);
        assert_eq!(cmp("1.0.0-alpha", "1.0.0-alpha.0"), Ordering::Less);
        assert_eq!(cmp("1.0.0-alpha.1", "1.0.0-alpha.1"), Ordering::Equal);
    }

    #[test]
    fn test_spelling_variants_are_ordered() {
        let comparator = VersionComparator::default();
        let variants = ["1.0.0-alpha1", "1.0.0-alpha.1", "1.0.0-alpha-1", "1.0.0-alpha.01", "1.0.0-alpha.001"];

        for a in variants {
            for b in variants {
                let ordering = comparator.compare_str(a, b).unwrap();
                assert_eq!(ordering == Ordering::Equal, a == b, "{} vs {}", a, b);
                assert_eq!(ordering, comparator.compare_str(b, a).unwrap().reverse());
            }
        }

        // Still below the next sequence and the release
        assert_eq!(cmp("1.0.0-alpha1", "1.0.0-alpha.2"), Ordering::Less);
        assert_eq!(cmp("1.0.0-alpha.01", "1.0.0"), Ordering::Less);
    }

    #[test]
    fn test_prerelease_keeps_published_text() {
        assert_eq!(v("1.0.0-alpha-1").to_string(), "1.0.0-alpha-1");
        assert_eq!(v("1.0.0-beta01").to_string(), "1.0.0-beta01");
        assert_ne!(v("1.0.0-alpha1"), v("1.0.0-alpha.1"));
    }

    #[test]
    fn test_custom_ranking() {
        let comparator = VersionComparator::new(PrereleaseRanking::new(["canary", "next"]));
        let canary = v("2.0.0-canary.4");
        let next = v("2.0.0-next.1");
        assert_eq!(comparator.compare(&next, &canary), Ordering::Greater);
    }

    #[test]
    fn test_max_of() {
        let comparator = VersionComparator::default();
        let versions = vec![
            v("16.4.0-alpha.3174632"),
            v("16.4.0"),
            v("16.4.0-rc.0"),
            v("16.3.9"),
        ];
        assert_eq!(comparator.max_of(&versions), Some(&v("16.4.0")));
        assert_eq!(comparator.max_of(&Vec::new()), None);
    }

    #[test]
    fn test_compare_str() {
        let comparator = VersionComparator::default();
        assert_eq!(comparator.compare_str("1.0.0", "0.9.9").unwrap(), Ordering::Greater);
        assert!(comparator.compare_str("1.0", "0.9.9").is_err());
    }
}
