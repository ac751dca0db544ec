//! Range expressions and version matching.
//!
//! A range is one or more `||`-separated clauses. Each clause is an exact
//! pattern (`1.2.3`), a caret (`^1.2.3`), a tilde (`~1.2.3`), a wildcard
//! pattern (`1.x`, `1.2.*`) or the any-range (`""`, `*`, `x`).

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::version::{Prerelease, Version};
use crate::error::{SprigError, SprigResult};

const OR_MARKER: &str = "||";

/// Parsed range expression; a version satisfies it if any clause matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeExpression {
    raw: String,
    clauses: Vec<Clause>,
}

/// One operator plus partial version pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub op: Op,
    pub pattern: PartialVersion,
}

/// Clause operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Any,       // *, x, ""
    Exact,     // 1.2.3
    Caret,     // ^1.2.3
    Tilde,     // ~1.2.3
    Wildcard(Component), // 1.x, 1.2.*
}

/// Version component position, used by wildcard clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Component {
    Major,
    Minor,
    Patch,
}

/// Partial version for clauses (missing or wildcarded components are `None`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialVersion {
    pub major: Option<u64>,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub prerelease: Option<Prerelease>,
}

impl RangeExpression {
    /// Parse a range expression, failing with `MalformedRange`
    pub fn parse(input: &str) -> SprigResult<Self> {
        let clauses = input
            .split(OR_MARKER)
            .map(|clause| Clause::parse(clause.trim(), input))
            .collect::<SprigResult<Vec<_>>>()?;

        Ok(Self {
            raw: input.to_string(),
            clauses,
        })
    }

    /// Check whether `version` satisfies at least one clause
    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        self.clauses.iter().any(|clause| clause.matches(version))
    }

    /// True when some clause accepts every release
    pub fn is_any(&self) -> bool {
        self.clauses.iter().any(|clause| clause.op == Op::Any)
    }

    /// The clauses in declaration order
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// The range as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for RangeExpression {
    type Err = SprigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RangeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for RangeExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl Clause {
    /// Parse a single trimmed clause; `range` is the full expression for errors
    fn parse(clause: &str, range: &str) -> SprigResult<Self> {
        let malformed = |reason: String| SprigError::MalformedRange {
            range: range.to_string(),
            reason,
        };

        if is_wildcard(clause) {
            return Ok(Self::any());
        }

        if clause.chars().any(char::is_whitespace) {
            return Err(malformed(format!(
                "'{}' combines comparators, which is not supported",
                clause
            )));
        }

        if clause.starts_with('>') || clause.starts_with('<') {
            return Err(malformed(format!("operator in '{}' is not supported", clause)));
        }

        let (op, pattern_str) = if let Some(stripped) = clause.strip_prefix('^') {
            (Some(Op::Caret), stripped)
        } else if let Some(stripped) = clause.strip_prefix('~') {
            (Some(Op::Tilde), stripped)
        } else if let Some(stripped) = clause.strip_prefix('=') {
            (None, stripped)
        } else {
            (None, clause)
        };
        let pattern_str = pattern_str.strip_prefix('v').unwrap_or(pattern_str);

        let pattern = PartialVersion::parse(pattern_str).map_err(malformed)?;

        let op = match (op, pattern.first_wildcard()) {
            (_, Some(Component::Major)) => Op::Any,
            (Some(op), _) => op,
            (None, Some(position)) => Op::Wildcard(position),
            (None, None) => Op::Exact,
        };

        Ok(Self { op, pattern })
    }

    fn any() -> Self {
        Self {
            op: Op::Any,
            pattern: PartialVersion::default(),
        }
    }

    /// Check whether `version` satisfies this clause
    pub fn matches(&self, version: &Version) -> bool {
        // Only an exact clause naming a pre-release can select one
        if version.is_prerelease() && !(self.op == Op::Exact && self.pattern.prerelease.is_some()) {
            return false;
        }

        let pattern = &self.pattern;
        match self.op {
            Op::Any => true,
            Op::Exact => {
                pattern.major == Some(version.major)
                    && pattern.minor == Some(version.minor)
                    && pattern.patch == Some(version.patch)
                    && pattern.prerelease == version.prerelease
            },
            Op::Wildcard(position) => {
                let fixed = [
                    (Component::Major, pattern.major, version.major),
                    (Component::Minor, pattern.minor, version.minor),
                    (Component::Patch, pattern.patch, version.patch),
                ];
                fixed
                    .iter()
                    .take_while(|(component, _, _)| *component < position)
                    .all(|(_, expected, actual)| *expected == Some(*actual))
            },
            Op::Caret => {
                let floor = match pattern.minor {
                    Some(minor) => (minor, pattern.patch.unwrap_or(0)),
                    None => (0, 0),
                };
                pattern.major == Some(version.major) && (version.minor, version.patch) >= floor
            },
            Op::Tilde => {
                if pattern.major != Some(version.major) {
                    return false;
                }

                match pattern.minor {
                    Some(minor) => version.minor == minor && version.patch >= pattern.patch.unwrap_or(0),
                    None => true,
                }
            },
        }
    }
}

impl PartialVersion {
    /// Parse `major[.minor[.patch]][-prerelease]`; wildcards become `None`
    fn parse(input: &str) -> Result<Self, String> {
        let (core_part, prerelease) = match input.split_once('-') {
            Some((core, pre)) => {
                let pre = Prerelease::parse(pre)
                    .ok_or_else(|| format!("empty pre-release tag in '{}'", input))?;
                (core, Some(pre))
            },
            None => (input, None),
        };

        let parts: Vec<&str> = core_part.split('.').collect();
        if parts.len() > 3 {
            return Err(format!("'{}' has more than three components", input));
        }

        let mut components = [None; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            // An empty text is "any" only as a whole clause
            if part.is_empty() {
                return Err(format!("empty component in '{}'", input));
            }
            if is_wildcard(part) {
                continue;
            }
            let value = part
                .parse::<u64>()
                .map_err(|_| format!("'{}' is not a number in '{}'", part, input))?;
            *slot = Some(value);
        }

        Ok(Self {
            major: components[0],
            minor: components[1],
            patch: components[2],
            prerelease,
        })
    }

    /// First component that is missing or wildcarded
    fn first_wildcard(&self) -> Option<Component> {
        if self.major.is_none() {
            Some(Component::Major)
        } else if self.minor.is_none() {
            Some(Component::Minor)
        } else if self.patch.is_none() {
            Some(Component::Patch)
        } else {
            None
        }
    }
}

fn is_wildcard(s: &str) -> bool {
    matches!(s, "" | "*" | "x" | "X")
}
