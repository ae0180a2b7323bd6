pub mod catalog;
pub mod config;
pub mod manifest;
pub mod overrides;
pub mod platform;
pub mod resolver;
pub mod ripple;

pub use catalog::{Pack, PackCatalog, THEME_SIGNATURES};
pub use config::{Settings, SettingsOverrides};
pub use manifest::{APPFILTER_ASSET, ComponentTable, ManifestError, parse_appfilter};
pub use overrides::{JsonFileStore, OverrideMapping, OverrideStore, PackAndDrawable};
pub use platform::{
    ComponentName, DirectoryService, Drawable, PlatformError, ResourceId, ResourceNamespace,
    SdkLevel,
};
pub use resolver::IconResolver;

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Marker file identifying a packages root.
pub const ROOT_SENTINEL: &str = ".iconpack-root";

fn is_packages_root(candidate: &Path) -> bool {
    candidate.join(ROOT_SENTINEL).is_file()
}

fn packages_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.is_dir() {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_packages_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locates the directory holding unpacked packages.
///
/// Tries `ICONPACK_PACKAGES_ROOT`, then the current directory and its
/// ancestors for a `.iconpack-root` marker, then the same walk from the
/// executable's directory, then the build-time `ICONPACK_ROOT_HINT`.
pub fn find_packages_root() -> Result<PathBuf> {
    locate_packages_root(env::var(config::ENV_PACKAGES_ROOT).ok().as_deref())
}

fn locate_packages_root(env_root: Option<&str>) -> Result<PathBuf> {
    if let Some(root) = env_root.and_then(packages_root_from_hint) {
        return Ok(root);
    }

    if let Ok(cwd) = env::current_dir() {
        if let Some(root) = search_upwards(&cwd) {
            return Ok(root);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(root) = search_upwards(exe_dir) {
                return Ok(root);
            }
        }
    }

    if let Some(hint) = option_env!("ICONPACK_ROOT_HINT") {
        if let Some(root) = packages_root_from_hint(hint) {
            return Ok(root);
        }
    }

    bail!(
        "Unable to locate a packages root. Pass --packages-root, set {}, or create {ROOT_SENTINEL} in the directory holding the packages.",
        config::ENV_PACKAGES_ROOT
    );
}

/// Splits a comma- or whitespace-separated list, dropping empty items.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
