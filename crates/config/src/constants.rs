//! Fixed names and default locations for pbo
//!
//! Everything here can be overridden through `[paths]`, `[game]` or `[java]`
//! in the configuration file except the application identifiers, which the
//! uninstaller relies on to find what it created.

/// Desktop application identifier (desktop file and icon basename)
pub const APP_ID: &str = "pokemon-blaze-online";

/// Display name written into the desktop entry
pub const APP_NAME: &str = "Pokemon Blaze Online";

/// Launcher script written into the install directory
pub const LAUNCHER_NAME: &str = "pbo-launch.sh";

/// Game archive download location
pub const DEFAULT_GAME_URL: &str = "https://pokemonblaze.online/downloads/PokemonBlazeOnline.zip";

/// Adoptium JRE download, `{version}` and `{arch}` are substituted
pub const DEFAULT_JAVA_URL_TEMPLATE: &str =
    "https://api.adoptium.net/v3/binary/latest/{version}/ga/linux/{arch}/jre/hotspot/normal/eclipse";

/// Minimum Java major version the game runs on
pub const DEFAULT_JAVA_MIN_MAJOR: u32 = 17;

/// Standard os-release locations, checked in order
pub const OS_RELEASE_PATHS: &[&str] = &["/etc/os-release", "/usr/lib/os-release"];

/// Directory under the XDG data dir that holds pbo's own files
pub const DATA_SUBDIR: &str = "pbo";
