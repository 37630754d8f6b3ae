//! Major-version normalization for runtime probes

use pbo_errors::ResolveError;
use serde::{Deserialize, Serialize};

/// Minimum version a probed command must report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRequirement {
    /// Arguments that make the command print its version
    pub args: Vec<String>,
    /// Lowest acceptable major version
    pub min_major: u32,
}

impl VersionRequirement {
    pub fn new<I, S>(args: I, min_major: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            min_major,
        }
    }

    #[must_use]
    pub fn is_satisfied_by(&self, major: u32) -> bool {
        major >= self.min_major
    }
}

/// Parse the major version out of a version string
///
/// Legacy `1.x` forms report `x`, so `1.8.0_301` is 8 and `17.0.2` is 17.
/// Separators `.`, `_`, `-` and `+` all delimit tokens.
///
/// # Errors
///
/// Returns `ResolveError::VersionParseFailure` when the major token is not
/// numeric.
pub fn parse_major_version(input: &str) -> Result<u32, ResolveError> {
    let parse_failure = || ResolveError::VersionParseFailure {
        capability: String::new(),
        input: input.to_string(),
        family: None,
        step: None,
    };

    let mut tokens = input.trim().split(['.', '_', '-', '+']);
    let first = tokens.next().ok_or_else(parse_failure)?;
    let first = parse_numeric(first).ok_or_else(parse_failure)?;

    if first != 1 {
        return Ok(first);
    }

    match tokens.next() {
        Some(second) => parse_numeric(second).ok_or_else(parse_failure),
        None => Ok(first),
    }
}

fn parse_numeric(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Pull the quoted version string out of `java -version` style output
///
/// Returns the text between the first pair of double quotes following the
/// word `version`, e.g. `17.0.2` from `openjdk version "17.0.2" 2022-01-18`.
/// Falls back to the first whitespace token after `version` when unquoted.
#[must_use]
pub fn extract_version_string(output: &str) -> Option<&str> {
    for line in output.lines() {
        let Some(idx) = line.find("version") else {
            continue;
        };
        let rest = line[idx + "version".len()..].trim_start();
        if let Some(quoted) = rest.strip_prefix('"') {
            if let Some(end) = quoted.find('"') {
                return Some(&quoted[..end]);
            }
        }
        if let Some(token) = rest.split_whitespace().next() {
            return Some(token);
        }
    }
    None
}
