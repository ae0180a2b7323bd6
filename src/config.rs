//! Runtime settings for the command-line front end.
//!
//! Precedence: explicit values (CLI flags) → environment → `iconpack.json` in
//! the packages root → built-in defaults. The packages root itself comes from
//! the CLI or from `find_packages_root`.

use crate::find_packages_root;
use crate::platform::SdkLevel;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const ENV_PACKAGES_ROOT: &str = "ICONPACK_PACKAGES_ROOT";
pub const ENV_OVERRIDES: &str = "ICONPACK_OVERRIDES";
pub const ENV_SDK_LEVEL: &str = "ICONPACK_SDK_LEVEL";
pub const ENV_SELECTED_PACK: &str = "ICONPACK_SELECTED_PACK";

pub const SETTINGS_FILE: &str = "iconpack.json";
pub const DEFAULT_OVERRIDES_FILE: &str = "icon_mappings.json";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default)]
    sdk_level: Option<SdkLevel>,
    #[serde(default)]
    selected_pack: Option<String>,
    #[serde(default)]
    overrides_path: Option<PathBuf>,
}

/// Values supplied on the command line; `None` defers to the next source.
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    pub packages_root: Option<PathBuf>,
    pub overrides_path: Option<PathBuf>,
    pub sdk_level: Option<SdkLevel>,
    pub selected_pack: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub packages_root: PathBuf,
    pub overrides_path: PathBuf,
    pub sdk_level: SdkLevel,
    pub selected_pack: Option<String>,
}

impl Settings {
    pub fn resolve(explicit: SettingsOverrides) -> Result<Self> {
        Self::resolve_with(explicit, env_non_empty)
    }

    fn resolve_with(
        explicit: SettingsOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let packages_root = match explicit.packages_root {
            Some(root) => root,
            None => find_packages_root()?,
        };
        let file = load_settings_file(&packages_root)?;

        let sdk_level = match explicit.sdk_level {
            Some(level) => level,
            None => match env(ENV_SDK_LEVEL) {
                Some(raw) => SdkLevel::try_from(raw.as_str())
                    .with_context(|| format!("reading {ENV_SDK_LEVEL}"))?,
                None => file.sdk_level.unwrap_or_default(),
            },
        };

        let overrides_path = explicit
            .overrides_path
            .or_else(|| env(ENV_OVERRIDES).map(PathBuf::from))
            .or_else(|| {
                file.overrides_path
                    .map(|path| relative_to(&packages_root, path))
            })
            .unwrap_or_else(|| packages_root.join(DEFAULT_OVERRIDES_FILE));

        let selected_pack = explicit
            .selected_pack
            .or_else(|| env(ENV_SELECTED_PACK))
            .or(file.selected_pack)
            .filter(|pack| !pack.is_empty());

        Ok(Self {
            packages_root,
            overrides_path,
            sdk_level,
            selected_pack,
        })
    }
}

fn load_settings_file(packages_root: &Path) -> Result<SettingsFile> {
    let path = packages_root.join(SETTINGS_FILE);
    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(SettingsFile::default()),
        Err(err) => return Err(err).with_context(|| format!("reading {}", path.display())),
    };
    serde_json::from_str(&data).with_context(|| format!("parsing settings {}", path.display()))
}

fn relative_to(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    // Tests go through `resolve_with` so the ICONPACK_* variables of the
    // calling shell never leak in.
    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn root_only(root: &Path) -> SettingsOverrides {
        SettingsOverrides {
            packages_root: Some(root.to_path_buf()),
            ..SettingsOverrides::default()
        }
    }

    fn write_settings(root: &Path, body: &str) {
        fs::write(root.join(SETTINGS_FILE), body).unwrap();
    }

    #[test]
    fn explicit_values_win() {
        let temp = TempDir::new().unwrap();
        write_settings(
            temp.path(),
            r#"{"sdk_level": 33, "selected_pack": "pack.file", "overrides_path": "file.json"}"#,
        );
        let explicit = SettingsOverrides {
            packages_root: Some(temp.path().to_path_buf()),
            overrides_path: Some(temp.path().join("explicit.json")),
            sdk_level: Some(SdkLevel(30)),
            selected_pack: Some("pack.cli".to_string()),
        };
        let env = env_of(&[
            (ENV_SDK_LEVEL, "29"),
            (ENV_SELECTED_PACK, "pack.env"),
            (ENV_OVERRIDES, "/env/mappings.json"),
        ]);
        let settings = Settings::resolve_with(explicit, env).unwrap();
        assert_eq!(settings.sdk_level, SdkLevel(30));
        assert_eq!(settings.selected_pack.as_deref(), Some("pack.cli"));
        assert_eq!(settings.overrides_path, temp.path().join("explicit.json"));
    }

    #[test]
    fn environment_beats_settings_file() {
        let temp = TempDir::new().unwrap();
        write_settings(
            temp.path(),
            r#"{"sdk_level": 33, "selected_pack": "pack.file", "overrides_path": "file.json"}"#,
        );
        let env = env_of(&[
            (ENV_SDK_LEVEL, "29"),
            (ENV_SELECTED_PACK, "pack.env"),
            (ENV_OVERRIDES, "/env/mappings.json"),
        ]);
        let settings = Settings::resolve_with(root_only(temp.path()), env).unwrap();
        assert_eq!(settings.sdk_level, SdkLevel(29));
        assert_eq!(settings.selected_pack.as_deref(), Some("pack.env"));
        assert_eq!(settings.overrides_path, PathBuf::from("/env/mappings.json"));
    }

    #[test]
    fn settings_file_fills_unset_values() {
        let temp = TempDir::new().unwrap();
        write_settings(
            temp.path(),
            r#"{"sdk_level": 30, "selected_pack": "pack.file", "overrides_path": "state/mappings.json"}"#,
        );
        let settings = Settings::resolve_with(root_only(temp.path()), env_of(&[])).unwrap();
        assert_eq!(settings.packages_root, temp.path());
        assert_eq!(settings.sdk_level, SdkLevel(30));
        assert_eq!(settings.selected_pack.as_deref(), Some("pack.file"));
        assert_eq!(settings.overrides_path, temp.path().join("state/mappings.json"));
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::resolve_with(root_only(temp.path()), env_of(&[])).unwrap();
        assert_eq!(settings.sdk_level, SdkLevel(34));
        assert_eq!(settings.selected_pack, None);
        assert_eq!(settings.overrides_path, temp.path().join(DEFAULT_OVERRIDES_FILE));
    }

    #[test]
    fn empty_selected_pack_means_none() {
        let temp = TempDir::new().unwrap();
        write_settings(temp.path(), r#"{"selected_pack": ""}"#);
        let settings = Settings::resolve_with(root_only(temp.path()), env_of(&[])).unwrap();
        assert_eq!(settings.selected_pack, None);
    }

    #[test]
    fn zero_sdk_level_is_rejected_from_every_source() {
        let temp = TempDir::new().unwrap();
        write_settings(temp.path(), r#"{"sdk_level": 0}"#);
        assert!(Settings::resolve_with(root_only(temp.path()), env_of(&[])).is_err());

        let clean = TempDir::new().unwrap();
        let env = env_of(&[(ENV_SDK_LEVEL, "0")]);
        assert!(Settings::resolve_with(root_only(clean.path()), env).is_err());
    }

    #[test]
    fn unknown_settings_fields_are_rejected() {
        let temp = TempDir::new().unwrap();
        write_settings(temp.path(), r#"{"sdk": 33}"#);
        assert!(load_settings_file(temp.path()).is_err());
    }

    #[test]
    fn missing_settings_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let file = load_settings_file(temp.path()).unwrap();
        assert!(file.sdk_level.is_none());
        assert!(file.selected_pack.is_none());
    }
}
