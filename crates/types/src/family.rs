//! Package manager families and the distribution lookup table

use serde::{Deserialize, Serialize};

use crate::identity::PlatformIdentity;

/// Class of package manager associated with a distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFamily {
    Apt,
    Dnf,
    Yum,
    Zypper,
    Pacman,
    Apk,
    Unknown,
}

/// Distribution tokens recognized for each family
///
/// The same table is consulted for `ID` and for every `ID_LIKE` token.
pub const FAMILY_TABLE: &[(PackageFamily, &[&str])] = &[
    (
        PackageFamily::Apt,
        &[
            "debian",
            "ubuntu",
            "linuxmint",
            "pop",
            "elementary",
            "zorin",
            "kali",
            "raspbian",
            "neon",
            "deepin",
            "mx",
        ],
    ),
    (
        PackageFamily::Dnf,
        &["fedora", "rhel", "centos", "rocky", "almalinux", "nobara", "ol"],
    ),
    (PackageFamily::Yum, &["amzn", "scientific"]),
    (
        PackageFamily::Zypper,
        &[
            "opensuse",
            "opensuse-leap",
            "opensuse-tumbleweed",
            "sles",
            "sled",
            "suse",
        ],
    ),
    (
        PackageFamily::Pacman,
        &[
            "arch",
            "archlinux",
            "manjaro",
            "endeavouros",
            "garuda",
            "artix",
            "arcolinux",
            "cachyos",
        ],
    ),
    (PackageFamily::Apk, &["alpine", "postmarketos"]),
];

impl PackageFamily {
    /// Every family that has a package manager
    pub const KNOWN: [PackageFamily; 6] = [
        Self::Apt,
        Self::Dnf,
        Self::Yum,
        Self::Zypper,
        Self::Pacman,
        Self::Apk,
    ];

    /// Look up a single distribution token in the static table
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        FAMILY_TABLE
            .iter()
            .find(|(_, tokens)| tokens.contains(&token))
            .map(|(family, _)| *family)
    }

    /// Resolve the family for a platform identity
    ///
    /// An exact `id` match wins. Otherwise `id_like` is scanned in declared
    /// order and the first recognized token decides. Anything else is
    /// `Unknown`.
    #[must_use]
    pub fn classify(identity: &PlatformIdentity) -> Self {
        Self::from_token(&identity.id)
            .or_else(|| {
                identity
                    .id_like
                    .iter()
                    .find_map(|token| Self::from_token(token))
            })
            .unwrap_or(Self::Unknown)
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::Zypper => "zypper",
            Self::Pacman => "pacman",
            Self::Apk => "apk",
            Self::Unknown => "unknown",
        }
    }

    /// Package manager executable, if the family has one
    #[must_use]
    pub fn manager(self) -> Option<&'static str> {
        match self {
            Self::Apt => Some("apt-get"),
            Self::Dnf => Some("dnf"),
            Self::Yum => Some("yum"),
            Self::Zypper => Some("zypper"),
            Self::Pacman => Some("pacman"),
            Self::Apk => Some("apk"),
            Self::Unknown => None,
        }
    }

    /// Arguments for the separate index refresh, for families that need one
    #[must_use]
    pub fn refresh_args(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Apt | Self::Apk => Some(&["update"]),
            Self::Zypper => Some(&["--non-interactive", "refresh"]),
            Self::Pacman => Some(&["-Sy", "--noconfirm"]),
            Self::Dnf | Self::Yum | Self::Unknown => None,
        }
    }

    /// Arguments that install `package` non-interactively
    #[must_use]
    pub fn install_args(self, package: &str) -> Vec<String> {
        let args: &[&str] = match self {
            Self::Apt | Self::Dnf | Self::Yum => &["install", "-y"],
            Self::Zypper => &["--non-interactive", "install"],
            Self::Pacman => &["-S", "--needed", "--noconfirm"],
            Self::Apk => &["add"],
            Self::Unknown => return Vec::new(),
        };
        args.iter()
            .map(|arg| (*arg).to_string())
            .chain(std::iter::once(package.to_string()))
            .collect()
    }
}

impl std::fmt::Display for PackageFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the package family for `identity`
#[must_use]
pub fn classify_family(identity: &PlatformIdentity) -> PackageFamily {
    PackageFamily::classify(identity)
}
