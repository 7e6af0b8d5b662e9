//! Version ordering for Maven artifacts and Java releases

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

const RANK_ALPHA: u8 = 0;
const RANK_BETA: u8 = 1;
const RANK_MILESTONE: u8 = 2;
const RANK_RC: u8 = 3;
const RANK_SNAPSHOT: u8 = 4;
const RANK_RELEASE: u8 = 5;
const RANK_SP: u8 = 6;
const RANK_UNKNOWN: u8 = 7;

/// One qualifier component such as `rc2` or `jre`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Qualifier {
    rank: u8,
    /// Only populated for unknown qualifiers, which order lexically
    label: String,
    number: u64,
}

impl Qualifier {
    fn release() -> Self {
        Self {
            rank: RANK_RELEASE,
            label: String::new(),
            number: 0,
        }
    }

    fn from_label(label: &str) -> Self {
        let lower = label.to_ascii_lowercase();
        let rank = match lower.as_str() {
            "alpha" | "a" => RANK_ALPHA,
            "beta" | "b" => RANK_BETA,
            "milestone" | "m" => RANK_MILESTONE,
            "rc" | "cr" | "preview" => RANK_RC,
            "snapshot" => RANK_SNAPSHOT,
            "" | "ga" | "final" | "release" => RANK_RELEASE,
            "sp" => RANK_SP,
            _ => RANK_UNKNOWN,
        };
        Self {
            rank,
            label: if rank == RANK_UNKNOWN { lower } else { String::new() },
            number: 0,
        }
    }
}

/// A Maven artifact version with Maven-style ordering.
///
/// Numeric segments compare numerically with missing segments treated as zero,
/// so `1.0 == 1.0.0`. Qualifiers order
/// `alpha < beta < milestone < rc < snapshot < release < sp`; unknown
/// qualifiers sort after release, lexically among themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct ArtifactVersion {
    raw: String,
    #[serde(skip)]
    numeric: Vec<u64>,
    #[serde(skip)]
    qualifiers: Vec<Qualifier>,
}

impl ArtifactVersion {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let mut numeric = Vec::new();
        let mut qualifiers: Vec<Qualifier> = Vec::new();
        let mut in_qualifiers = false;
        let mut pending_number = false;

        for token in tokenize(raw) {
            let is_digits = token.bytes().all(|b| b.is_ascii_digit());
            if is_digits && !in_qualifiers {
                numeric.push(token.parse::<u64>().unwrap_or(u64::MAX));
                continue;
            }

            in_qualifiers = true;
            if is_digits {
                let n = token.parse::<u64>().unwrap_or(u64::MAX);
                match qualifiers.last_mut() {
                    Some(q) if pending_number => {
                        q.number = n;
                        pending_number = false;
                    }
                    _ => qualifiers.push(Qualifier {
                        number: n,
                        ..Qualifier::release()
                    }),
                }
            } else {
                qualifiers.push(Qualifier::from_label(token));
                pending_number = true;
            }
        }

        // Trailing zeros and release qualifiers do not affect ordering
        while numeric.len() > 1 && numeric.last() == Some(&0) {
            numeric.pop();
        }
        while qualifiers.last() == Some(&Qualifier::release()) {
            qualifiers.pop();
        }

        Self {
            raw: raw.to_string(),
            numeric,
            qualifiers,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this is an alpha, beta, milestone, release candidate or snapshot
    pub fn is_prerelease(&self) -> bool {
        self.qualifiers.iter().any(|q| q.rank < RANK_RELEASE)
    }

    pub fn is_snapshot(&self) -> bool {
        self.qualifiers.iter().any(|q| q.rank == RANK_SNAPSHOT)
    }

    /// Leading numeric segment, 0 when absent
    pub fn major(&self) -> u64 {
        self.numeric.first().copied().unwrap_or(0)
    }

    /// Second numeric segment, 0 when absent
    pub fn minor(&self) -> u64 {
        self.numeric.get(1).copied().unwrap_or(0)
    }
}

/// Split on separators and on digit/letter transitions
fn tokenize(raw: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let bytes = raw.as_bytes();
    let mut start = 0;

    for i in 0..bytes.len() {
        let c = bytes[i];
        if matches!(c, b'.' | b'-' | b'_' | b'+') {
            if start < i {
                tokens.push(&raw[start..i]);
            }
            start = i + 1;
        } else if i > start && bytes[i - 1].is_ascii_digit() != c.is_ascii_digit() {
            tokens.push(&raw[start..i]);
            start = i;
        }
    }
    if start < bytes.len() {
        tokens.push(&raw[start..]);
    }
    tokens
}

impl Ord for ArtifactVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.numeric.len().max(other.numeric.len());
        for i in 0..len {
            let a = self.numeric.get(i).copied().unwrap_or(0);
            let b = other.numeric.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }

        let len = self.qualifiers.len().max(other.qualifiers.len());
        for i in 0..len {
            let a = self.qualifiers.get(i).cloned().unwrap_or_else(Qualifier::release);
            let b = other
                .qualifiers
                .get(i)
                .cloned()
                .unwrap_or_else(Qualifier::release);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }

        Ordering::Equal
    }
}

impl PartialOrd for ArtifactVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ArtifactVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ArtifactVersion {}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for ArtifactVersion {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ArtifactVersion> for String {
    fn from(value: ArtifactVersion) -> Self {
        value.raw
    }
}

impl std::str::FromStr for ArtifactVersion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Normalize a declared Java version to its feature release number.
///
/// Accepts `1.8`, `8`, `11.0.2`, `VERSION_1_8`, `JavaVersion.VERSION_17`,
/// `JvmTarget.JVM_21` and quoted forms. Returns `None` when no number is found.
pub fn normalize_java_version(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    let digits_start = trimmed.find(|c: char| c.is_ascii_digit())?;
    let tail = &trimmed[digits_start..];
    let end = tail
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '_'))
        .unwrap_or(tail.len());

    let numeric: Vec<&str> = tail[..end]
        .split(['.', '_'])
        .take_while(|part| !part.is_empty())
        .collect();

    let major = match numeric.as_slice() {
        ["1", minor, ..] => *minor,
        [major, ..] => *major,
        [] => return None,
    };

    major.parse::<u32>().ok().map(|m| m.to_string())
}

/// Java feature release as a number; unparseable input counts as 0
pub fn java_major(version: &str) -> u32 {
    normalize_java_version(version)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
