//! npm range dialect on top of the `semver` crate
//!
//! `semver::VersionReq` follows Cargo's rules, which differ from npm's:
//! - bare `1.2.3` is a caret requirement in Cargo but exact in npm
//! - bare `1.2` is `^1.2` in Cargo but `1.2.x` in npm
//! - npm separates comparators with spaces and alternatives with `||`
//! - npm supports hyphen ranges (`1.0.0 - 2.0.0`) and a leading `v`
//!
//! Each `||` alternative is rewritten into a Cargo-style requirement.

use semver::{Version, VersionReq};
use std::fmt;

const OPERATOR_CHARS: [char; 5] = ['<', '>', '=', '~', '^'];

/// A parsed npm version range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmRange {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl NpmRange {
    /// Parse an npm range expression
    ///
    /// Returns `None` if any alternative is not a valid range (tags, URLs,
    /// and other specifiers are not ranges).
    pub fn parse(input: &str) -> Option<Self> {
        let raw = input.trim();
        let alternatives = raw
            .split("||")
            .map(parse_alternative)
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            raw: raw.to_string(),
            alternatives,
        })
    }

    /// The range as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if the version satisfies any alternative
    ///
    /// Prerelease versions only match an alternative that names a
    /// prerelease on the same `major.minor.patch`, as in npm.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// Highest version in `versions` that satisfies the range
    pub fn max_satisfying<'a, I>(&self, versions: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        versions.into_iter().filter(|v| self.matches(v)).max()
    }
}

impl fmt::Display for NpmRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A version with optional trailing components (`1`, `1.2`, `1.2.3-rc.1`)
struct Partial {
    parts: Vec<u64>,
    pre: Option<String>,
}

impl Partial {
    fn parse(input: &str) -> Option<Self> {
        let input = input
            .strip_prefix('v')
            .or_else(|| input.strip_prefix('V'))
            .unwrap_or(input);
        if input.is_empty() {
            return None;
        }

        // Build metadata never affects range matching
        let (core, pre) = match input.find(['-', '+']) {
            Some(idx) => {
                let (core, rest) = input.split_at(idx);
                let pre = rest
                    .strip_prefix('-')
                    .map(|p| p.split('+').next().unwrap_or(p).to_string());
                (core, pre)
            }
            None => (input, None),
        };

        let segments: Vec<&str> = core.split('.').collect();
        if segments.len() > 3 {
            return None;
        }

        let mut parts = Vec::with_capacity(3);
        let mut wildcard = false;
        for segment in segments {
            if matches!(segment, "x" | "X" | "*") {
                wildcard = true;
                continue;
            }
            if wildcard {
                return None;
            }
            parts.push(segment.parse::<u64>().ok()?);
        }

        match pre.as_deref() {
            Some("") => return None,
            Some(_) if parts.len() < 3 => return None,
            _ => {}
        }

        Some(Self { parts, pre })
    }

    fn is_any(&self) -> bool {
        self.parts.is_empty()
    }

    fn is_full(&self) -> bool {
        self.parts.len() == 3
    }

    fn render(&self) -> String {
        let mut out = self
            .parts
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        if let Some(ref pre) = self.pre {
            out.push('-');
            out.push_str(pre);
        }
        out
    }

    /// Exclusive upper bound for a partial (`1.2` -> `1.3`, `1` -> `2`)
    fn bump_last(&self) -> String {
        let mut parts = self.parts.clone();
        if let Some(last) = parts.last_mut() {
            *last += 1;
        }
        parts
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn parse_alternative(alternative: &str) -> Option<VersionReq> {
    let alternative = alternative.trim();
    if alternative.is_empty() {
        return Some(VersionReq::STAR);
    }

    let comparators = match alternative.split_once(" - ") {
        Some((lower, upper)) => hyphen_comparators(lower.trim(), upper.trim())?,
        None => {
            let mut comparators = Vec::new();
            for token in tokenize(alternative) {
                if let Some(comparator) = convert_comparator(&token)? {
                    comparators.push(comparator);
                }
            }
            comparators
        }
    };

    if comparators.is_empty() {
        return Some(VersionReq::STAR);
    }
    VersionReq::parse(&comparators.join(", ")).ok()
}

/// Split on whitespace, re-attaching detached operators (`>= 1.2.3`)
fn tokenize(alternative: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pending = String::new();

    for part in alternative.split_whitespace() {
        if part.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            pending.push_str(part);
            continue;
        }
        tokens.push(format!("{}{}", pending, part));
        pending.clear();
    }

    // A dangling operator stays as-is and fails conversion
    if !pending.is_empty() {
        tokens.push(pending);
    }
    tokens
}

/// Rewrite one npm comparator into Cargo syntax
///
/// Returns `Some(None)` for comparators that match everything (`*`, `x`).
fn convert_comparator(token: &str) -> Option<Option<String>> {
    let split = token
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(token.len());
    let (op, version) = token.split_at(split);
    let op = match op {
        "~>" => "~",
        "==" => "=",
        other => other,
    };
    if !matches!(op, "" | "=" | "<" | "<=" | ">" | ">=" | "~" | "^") {
        return None;
    }

    let partial = Partial::parse(version)?;

    if partial.is_any() {
        return match op {
            "<" | ">" => None,
            _ => Some(None),
        };
    }

    let rendered = partial.render();
    let comparator = match op {
        // Bare or `=` partials are x-ranges in npm
        "" | "=" if !partial.is_full() => format!("~{}", rendered),
        "" => format!("={}", rendered),
        _ => format!("{}{}", op, rendered),
    };
    Some(Some(comparator))
}

fn hyphen_comparators(lower: &str, upper: &str) -> Option<Vec<String>> {
    let lower = Partial::parse(lower)?;
    let upper = Partial::parse(upper)?;
    let mut comparators = Vec::new();

    if !lower.is_any() {
        comparators.push(format!(">={}", lower.render()));
    }
    if upper.is_full() {
        comparators.push(format!("<={}", upper.render()));
    } else if !upper.is_any() {
        comparators.push(format!("<{}", upper.bump_last()));
    }

    Some(comparators)
}
