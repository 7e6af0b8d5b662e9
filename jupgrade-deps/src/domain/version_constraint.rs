//! Maven version ranges
//!
//! A declared version such as `[1.0,2.0)`, `(,2.0]`, `[1.5]` or `[1.0,)`
//! bounds the versions the resolver may pick. Plain versions are soft
//! requirements in Maven and are not parsed as constraints.

use jupgrade_core::domain::version::ArtifactVersion;
use serde::Serialize;

/// Version constraint for dependency resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VersionConstraint {
    /// Hard pin, `[1.5]`
    Exact(ArtifactVersion),
    GreaterOrEqual(ArtifactVersion),
    LessOrEqual(ArtifactVersion),
    GreaterThan(ArtifactVersion),
    LessThan(ArtifactVersion),
    /// Bounded on both sides
    Range {
        min: ArtifactVersion,
        max: ArtifactVersion,
        min_inclusive: bool,
        max_inclusive: bool,
    },
    /// Any version
    Any,
}

fn version(raw: &str, what: &str) -> Result<ArtifactVersion, String> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(format!("Invalid {} version: '{}'", what, raw));
    }
    Ok(ArtifactVersion::parse(raw))
}

impl VersionConstraint {
    /// Whether a declared version uses range syntax
    pub fn is_range(declared: &str) -> bool {
        let declared = declared.trim();
        declared.starts_with('[') || declared.starts_with('(')
    }

    /// Parse a Maven range: `[a,b]`, `[a,b)`, `(a,b]`, `(,b]`, `[a,)`, `[a]`
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if !Self::is_range(s) {
            return Err(format!("Not a version range: {}", s));
        }

        let min_inclusive = s.starts_with('[');
        let max_inclusive = match s.chars().last() {
            Some(']') if s.len() > 1 => true,
            Some(')') if s.len() > 1 => false,
            _ => return Err(format!("Unterminated Maven range: {}", s)),
        };
        let inner = &s[1..s.len() - 1];

        let Some((low, high)) = inner.split_once(',') else {
            if min_inclusive && max_inclusive {
                return Ok(VersionConstraint::Exact(version(inner, "exact")?));
            }
            return Err(format!("Single-version Maven range must use brackets: {}", s));
        };
        if high.contains(',') {
            return Err(format!("Multiple Maven ranges are not supported: {}", s));
        }

        let (low, high) = (low.trim(), high.trim());
        match (low.is_empty(), high.is_empty()) {
            (true, true) => Ok(VersionConstraint::Any),
            (true, false) => {
                let max = version(high, "max")?;
                Ok(if max_inclusive {
                    VersionConstraint::LessOrEqual(max)
                } else {
                    VersionConstraint::LessThan(max)
                })
            }
            (false, true) => {
                let min = version(low, "min")?;
                Ok(if min_inclusive {
                    VersionConstraint::GreaterOrEqual(min)
                } else {
                    VersionConstraint::GreaterThan(min)
                })
            }
            (false, false) => {
                let min = version(low, "min")?;
                let max = version(high, "max")?;
                if min > max {
                    return Err(format!("Empty Maven range: {}", s));
                }
                Ok(VersionConstraint::Range {
                    min,
                    max,
                    min_inclusive,
                    max_inclusive,
                })
            }
        }
    }

    /// Hard pins leave the resolver exactly one choice
    pub fn is_pinned(&self) -> bool {
        matches!(self, VersionConstraint::Exact(_))
    }

    /// Check if a version satisfies this constraint
    pub fn satisfies(&self, candidate: &ArtifactVersion) -> bool {
        match self {
            VersionConstraint::Any => true,
            VersionConstraint::Exact(v) => candidate == v,
            VersionConstraint::GreaterOrEqual(v) => candidate >= v,
            VersionConstraint::GreaterThan(v) => candidate > v,
            VersionConstraint::LessOrEqual(v) => candidate <= v,
            VersionConstraint::LessThan(v) => candidate < v,
            VersionConstraint::Range {
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => {
                let lower_ok = if *min_inclusive { candidate >= min } else { candidate > min };
                let upper_ok = if *max_inclusive { candidate <= max } else { candidate < max };
                lower_ok && upper_ok
            }
        }
    }
}

impl std::fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionConstraint::Exact(v) => write!(f, "[{}]", v),
            VersionConstraint::GreaterOrEqual(v) => write!(f, "[{},)", v),
            VersionConstraint::GreaterThan(v) => write!(f, "({},)", v),
            VersionConstraint::LessOrEqual(v) => write!(f, "(,{}]", v),
            VersionConstraint::LessThan(v) => write!(f, "(,{})", v),
            VersionConstraint::Range {
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => {
                let open = if *min_inclusive { '[' } else { '(' };
                let close = if *max_inclusive { ']' } else { ')' };
                write!(f, "{}{},{}{}", open, min, max, close)
            }
            VersionConstraint::Any => write!(f, "(,)"),
        }
    }
}
