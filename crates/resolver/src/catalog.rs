//! Capabilities the installer knows how to provide

use pbo_config::Config;
use pbo_types::{
    CapabilityRequirement, PackageCandidates, PackageFamily, PortableFallback, VersionRequirement,
};

/// Relative path of the Java binary inside a portable runtime
pub const JAVA_BINARY: &str = "bin/java";

/// Capability names accepted by [`Catalog::get`]
pub const CAPABILITY_NAMES: [&str; 4] = ["java", "unzip", "curl", "wget"];

/// Java runtime requirement of at least `min_major`
///
/// Package names follow each family's naming scheme for the requested
/// major version; the JRE is tried before the JDK. `fallback` is the
/// portable runtime used when the package manager cannot help.
pub fn java(min_major: u32, fallback: Option<PortableFallback>) -> CapabilityRequirement {
    let rpm_style = PackageCandidates::with_alternate(
        format!("java-{min_major}-openjdk"),
        format!("java-{min_major}-openjdk-devel"),
    );

    let mut req = CapabilityRequirement::new("java", "java")
        .with_package(
            PackageFamily::Apt,
            PackageCandidates::with_alternate(
                format!("openjdk-{min_major}-jre"),
                format!("openjdk-{min_major}-jdk"),
            ),
        )
        .with_package(PackageFamily::Dnf, rpm_style.clone())
        .with_package(PackageFamily::Yum, rpm_style.clone())
        .with_package(PackageFamily::Zypper, rpm_style)
        .with_package(
            PackageFamily::Pacman,
            PackageCandidates::with_alternate(
                format!("jre{min_major}-openjdk"),
                format!("jdk{min_major}-openjdk"),
            ),
        )
        .with_package(
            PackageFamily::Apk,
            PackageCandidates::with_alternate(
                format!("openjdk{min_major}-jre"),
                format!("openjdk{min_major}"),
            ),
        )
        .with_min_version(VersionRequirement::new(["-version"], min_major));

    if let Some(fallback) = fallback {
        req = req.with_fallback(fallback);
    }
    req
}

pub fn unzip() -> CapabilityRequirement {
    CapabilityRequirement::command("unzip")
}

pub fn curl() -> CapabilityRequirement {
    CapabilityRequirement::command("curl")
}

pub fn wget() -> CapabilityRequirement {
    CapabilityRequirement::command("wget")
}

/// Requirements built from the effective configuration
#[derive(Debug, Clone)]
pub struct Catalog {
    java: CapabilityRequirement,
}

impl Catalog {
    pub fn from_config(config: &Config) -> Self {
        let fallback = config.java.allow_fallback.then(|| PortableFallback {
            url_template: config.java.fallback_url_template.clone(),
            version: config.java_fallback_version(),
            binary: JAVA_BINARY.to_string(),
        });
        Self {
            java: java(config.java.min_major, fallback),
        }
    }

    pub fn java(&self) -> &CapabilityRequirement {
        &self.java
    }

    /// Look up a capability by name
    pub fn get(&self, name: &str) -> Option<CapabilityRequirement> {
        match name {
            "java" => Some(self.java.clone()),
            "unzip" => Some(unzip()),
            "curl" => Some(curl()),
            "wget" => Some(wget()),
            _ => None,
        }
    }

    /// Every capability, in display order
    pub fn all(&self) -> Vec<CapabilityRequirement> {
        CAPABILITY_NAMES
            .iter()
            .filter_map(|name| self.get(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_package_names() {
        let req = java(17, None);
        let apt = req.packages_for(PackageFamily::Apt).unwrap();
        assert_eq!(apt.primary, "openjdk-17-jre");
        assert_eq!(apt.alternate.as_deref(), Some("openjdk-17-jdk"));
        assert_eq!(
            req.packages_for(PackageFamily::Zypper).unwrap().primary,
            "java-17-openjdk"
        );
        assert_eq!(
            req.packages_for(PackageFamily::Pacman).unwrap().alternate.as_deref(),
            Some("jdk17-openjdk")
        );
        assert_eq!(
            req.packages_for(PackageFamily::Apk).unwrap().primary,
            "openjdk17-jre"
        );
        assert!(req.packages_for(PackageFamily::Unknown).is_none());
        assert_eq!(req.min_version.as_ref().unwrap().min_major, 17);
    }

    #[test]
    fn test_java_names_follow_min_major() {
        let req = java(21, None);
        assert_eq!(
            req.packages_for(PackageFamily::Dnf).unwrap().alternate.as_deref(),
            Some("java-21-openjdk-devel")
        );
    }

    #[test]
    fn test_catalog_from_config() {
        let mut config = Config::default();
        let catalog = Catalog::from_config(&config);
        let fallback = catalog.java().fallback.as_ref().unwrap();
        assert_eq!(fallback.version, 17);
        assert_eq!(fallback.binary, JAVA_BINARY);

        config.java.allow_fallback = false;
        assert!(Catalog::from_config(&config).java().fallback.is_none());

        assert!(catalog.get("unzip").is_some());
        assert!(catalog.get("python").is_none());
        assert_eq!(catalog.all().len(), CAPABILITY_NAMES.len());
    }
}
