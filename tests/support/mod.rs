#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use iconpack::platform::fs::FsDirectory;
use iconpack::{DirectoryService, SdkLevel, THEME_SIGNATURES};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::rc::Rc;
use tempfile::TempDir;

/// Throwaway packages root laid out the way `FsDirectory` reads it.
pub struct Device {
    temp: TempDir,
}

impl Device {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("creating packages root")?;
        fs::write(temp.path().join(iconpack::ROOT_SENTINEL), "")?;
        Ok(Self { temp })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn overrides_path(&self) -> PathBuf {
        self.root().join("icon_mappings.json")
    }

    /// Installs an icon pack answering `THEME_SIGNATURES[signature]` with the
    /// given manifest and drawable files.
    pub fn install_pack(
        &self,
        package: &str,
        label: &str,
        signature: usize,
        appfilter: Option<&str>,
        drawables: &[&str],
    ) -> Result<()> {
        let dir = self.write_manifest(
            package,
            json!({"label": label, "capabilities": [THEME_SIGNATURES[signature]]}),
        )?;
        if let Some(appfilter) = appfilter {
            fs::create_dir_all(dir.join("assets"))?;
            fs::write(dir.join("assets/appfilter.xml"), appfilter)?;
        }
        let drawable_dir = dir.join("res/drawable");
        fs::create_dir_all(&drawable_dir)?;
        for name in drawables {
            fs::write(drawable_dir.join(format!("{name}.png")), b"\x89PNG")?;
        }
        Ok(())
    }

    /// Installs a plain application with an optional launcher activity.
    pub fn install_app(&self, package: &str, label: &str, launch_activity: Option<&str>) -> Result<()> {
        let manifest = match launch_activity {
            Some(activity) => json!({"label": label, "launch_activity": activity}),
            None => json!({"label": label}),
        };
        self.write_manifest(package, manifest)?;
        Ok(())
    }

    /// Writes `iconpack.json` into the packages root.
    pub fn write_settings(&self, settings: serde_json::Value) -> Result<()> {
        fs::write(
            self.root().join(iconpack::config::SETTINGS_FILE),
            serde_json::to_string_pretty(&settings)?,
        )
        .context("writing settings file")
    }

    pub fn uninstall(&self, package: &str) -> Result<()> {
        fs::remove_dir_all(self.root().join(package))
            .with_context(|| format!("uninstalling {package}"))
    }

    pub fn directory(&self) -> Rc<dyn DirectoryService> {
        Rc::new(FsDirectory::new(self.root(), SdkLevel(34)))
    }

    fn write_manifest(&self, package: &str, manifest: serde_json::Value) -> Result<PathBuf> {
        let dir = self.root().join(package);
        fs::create_dir_all(&dir)?;
        fs::write(
            dir.join("package.json"),
            serde_json::to_string_pretty(&manifest)?,
        )?;
        Ok(dir)
    }
}

/// `appfilter.xml` body mapping each `(package, class, drawable)`.
pub fn appfilter(items: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n");
    for (package, class, drawable) in items {
        xml.push_str(&format!(
            "  <item component=\"ComponentInfo{{{package}/{class}}}\" drawable=\"{drawable}\"/>\n"
        ));
    }
    xml.push_str("</resources>\n");
    xml
}

/// The `iconpack` binary pointed at `device`, isolated from the caller's
/// ICONPACK_* environment.
pub fn cli(device: &Device) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_iconpack"));
    cmd.env_remove("ICONPACK_PACKAGES_ROOT")
        .env_remove("ICONPACK_OVERRIDES")
        .env_remove("ICONPACK_SDK_LEVEL")
        .env_remove("ICONPACK_SELECTED_PACK")
        .env_remove("RUST_LOG")
        .arg("--packages-root")
        .arg(device.root());
    cmd
}

/// Runs `cmd` and fails with its captured output unless it exits cleanly.
pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd.output().with_context(|| format!("spawning {cmd:?}"))?;
    if !output.status.success() {
        bail!(
            "{cmd:?} exited with {}\nstdout: {}\nstderr: {}",
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}
