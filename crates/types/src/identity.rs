//! Platform identity parsed from an os-release descriptor

use serde::{Deserialize, Serialize};

/// Identity used when no descriptor is available
pub const UNKNOWN_ID: &str = "unknown";

/// Declared identity of the running distribution
///
/// Built once at startup from the `ID` and `ID_LIKE` keys and passed by
/// reference into every resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformIdentity {
    pub id: String,
    pub id_like: Vec<String>,
}

impl PlatformIdentity {
    /// Create an identity, lower-casing every token
    pub fn new<I, S>(id: impl AsRef<str>, id_like: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: id.as_ref().trim().to_lowercase(),
            id_like: id_like
                .into_iter()
                .map(|token| token.as_ref().trim().to_lowercase())
                .filter(|token| !token.is_empty())
                .collect(),
        }
    }

    /// Identity reported when the descriptor file is absent
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            id: UNKNOWN_ID.to_string(),
            id_like: Vec::new(),
        }
    }

    /// Parse the contents of an os-release style file
    ///
    /// Only `ID` and `ID_LIKE` are read. Values may be single- or
    /// double-quoted; comments and blank lines are skipped. A file without
    /// an `ID` key yields the unknown identity's id.
    #[must_use]
    pub fn parse_os_release(contents: &str) -> Self {
        let mut id = None;
        let mut id_like = Vec::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = unquote(value.trim());
            match key.trim() {
                "ID" => id = Some(value.to_string()),
                "ID_LIKE" => {
                    id_like = value.split_whitespace().map(str::to_string).collect();
                }
                _ => {}
            }
        }

        let id = id.filter(|id| !id.trim().is_empty());
        Self::new(id.as_deref().unwrap_or(UNKNOWN_ID), id_like)
    }
}

impl Default for PlatformIdentity {
    fn default() -> Self {
        Self::unknown()
    }
}

impl std::fmt::Display for PlatformIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.id_like.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} (like {})", self.id, self.id_like.join(" "))
        }
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ubuntu() {
        let contents = r#"NAME="Ubuntu"
VERSION="22.04.3 LTS (Jammy Jellyfish)"
ID=ubuntu
ID_LIKE=debian
PRETTY_NAME="Ubuntu 22.04.3 LTS"
"#;
        let identity = PlatformIdentity::parse_os_release(contents);
        assert_eq!(identity.id, "ubuntu");
        assert_eq!(identity.id_like, vec!["debian"]);
    }

    #[test]
    fn test_parse_quoted_and_mixed_case() {
        let contents = "# comment\nID=\"Rocky\"\nID_LIKE='RHEL centos  Fedora'\n";
        let identity = PlatformIdentity::parse_os_release(contents);
        assert_eq!(identity.id, "rocky");
        assert_eq!(identity.id_like, vec!["rhel", "centos", "fedora"]);
    }

    #[test]
    fn test_parse_without_id() {
        let identity = PlatformIdentity::parse_os_release("NAME=Thing\n");
        assert_eq!(identity, PlatformIdentity::unknown());
    }

    #[test]
    fn test_display() {
        let identity = PlatformIdentity::new("pop", ["ubuntu", "debian"]);
        assert_eq!(identity.to_string(), "pop (like ubuntu debian)");
    }
}
