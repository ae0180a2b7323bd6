//! Directory service backed by a tree of unpacked packages.
//!
//! ```text
//! <root>/<package>/package.json
//! <root>/<package>/assets/appfilter.xml
//! <root>/<package>/res/drawable/<name>.<ext>
//! ```
//!
//! A package directory without a readable `package.json` does not count as
//! installed. Parsed `package.json` files are cached until their size or
//! modification time changes, so one catalog refresh reads each file once.

use super::{
    ComponentName, DRAWABLE_KIND, DirectoryService, Drawable, PlatformError, QueryFlags,
    ResolvedActivity, ResourceId, ResourceNamespace, SdkLevel,
};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File, Metadata};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

const PACKAGE_MANIFEST: &str = "package.json";
const ASSETS_DIR: &str = "assets";
const DRAWABLE_DIR: &str = "res/drawable";
const FIRST_DRAWABLE_ID: u32 = 0x7f02_0001;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageManifest {
    label: String,
    #[serde(default)]
    capabilities: Vec<String>,
    #[serde(default)]
    launch_activity: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl Stamp {
    fn of(meta: &Metadata) -> Self {
        Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        }
    }
}

/// Last parse of a `package.json`; `None` when it was malformed.
type CachedManifest = (Stamp, Option<Rc<PackageManifest>>);

#[derive(Debug)]
pub struct FsDirectory {
    root: PathBuf,
    sdk: SdkLevel,
    manifests: RefCell<HashMap<String, CachedManifest>>,
}

impl FsDirectory {
    pub fn new(root: impl Into<PathBuf>, sdk: SdkLevel) -> Self {
        Self {
            root: root.into(),
            sdk,
            manifests: RefCell::new(HashMap::new()),
        }
    }

    /// Installed package names in sorted order.
    pub fn installed_packages(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            warn!("packages root {} is not readable", self.root.display());
            return Vec::new();
        };
        let mut packages: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().join(PACKAGE_MANIFEST).is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        packages.sort();
        packages
    }

    fn package_dir(&self, package: &str) -> Result<PathBuf, PlatformError> {
        // Package names never contain separators; reject anything that would
        // escape the root.
        if package.is_empty() || package.contains(['/', '\\']) || package.starts_with('.') {
            return Err(PlatformError::NameNotFound(package.to_string()));
        }
        let dir = self.root.join(package);
        if dir.join(PACKAGE_MANIFEST).is_file() {
            Ok(dir)
        } else {
            Err(PlatformError::NameNotFound(package.to_string()))
        }
    }

    fn manifest(&self, package: &str) -> Result<Rc<PackageManifest>, PlatformError> {
        let path = self.package_dir(package)?.join(PACKAGE_MANIFEST);
        let stamp = fs::metadata(&path)
            .map(|meta| Stamp::of(&meta))
            .map_err(|source| io_error(package, source))?;
        if let Some((cached, parsed)) = self.manifests.borrow().get(package) {
            if *cached == stamp {
                return parsed
                    .clone()
                    .ok_or_else(|| PlatformError::NameNotFound(package.to_string()));
            }
        }

        let file = File::open(&path).map_err(|source| io_error(package, source))?;
        let parsed = match serde_json::from_reader::<_, PackageManifest>(BufReader::new(file)) {
            Ok(manifest) => Some(Rc::new(manifest)),
            Err(err) => {
                warn!("ignoring {}: {err}", path.display());
                None
            }
        };
        self.manifests
            .borrow_mut()
            .insert(package.to_string(), (stamp, parsed.clone()));
        parsed.ok_or_else(|| PlatformError::NameNotFound(package.to_string()))
    }
}

impl DirectoryService for FsDirectory {
    fn sdk_level(&self) -> SdkLevel {
        self.sdk
    }

    fn query_by_capability(&self, action: &str, flags: QueryFlags) -> Vec<ResolvedActivity> {
        debug!(
            "querying {action} with {} flags {:#x}",
            flags.shape.as_str(),
            flags.bits
        );
        self.installed_packages()
            .into_iter()
            .filter(|package| match self.manifest(package) {
                Ok(manifest) => manifest.capabilities.iter().any(|c| c == action),
                Err(_) => false,
            })
            .map(|package| ResolvedActivity { package })
            .collect()
    }

    fn application_label(&self, package: &str, _flags: QueryFlags) -> Result<String, PlatformError> {
        self.manifest(package).map(|manifest| manifest.label.clone())
    }

    fn resources_for(&self, package: &str) -> Result<Rc<dyn ResourceNamespace>, PlatformError> {
        let dir = self.package_dir(package)?;
        let drawables = index_drawables(&dir.join(DRAWABLE_DIR))
            .map_err(|source| io_error(package, source))?;
        Ok(Rc::new(FsResources {
            package: package.to_string(),
            dir,
            drawables,
        }))
    }

    fn launch_component(&self, package: &str) -> Option<ComponentName> {
        let manifest = self.manifest(package).ok()?;
        let class = manifest.launch_activity.as_deref()?.trim();
        if class.is_empty() {
            return None;
        }
        Some(ComponentName::new(package, class))
    }
}

fn io_error(package: &str, source: io::Error) -> PlatformError {
    PlatformError::Io {
        package: package.to_string(),
        source,
    }
}

/// Drawable files keyed by resource name (file stem), in sorted file order.
fn index_drawables(dir: &Path) -> io::Result<IndexMap<String, PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(IndexMap::new()),
        Err(err) => return Err(err),
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut drawables = IndexMap::new();
    for path in files {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        drawables.entry(stem.to_string()).or_insert(path);
    }
    Ok(drawables)
}

pub struct FsResources {
    package: String,
    dir: PathBuf,
    drawables: IndexMap<String, PathBuf>,
}

impl ResourceNamespace for FsResources {
    fn identifier(&self, name: &str, kind: &str, package: &str) -> Option<ResourceId> {
        if kind != DRAWABLE_KIND || package != self.package {
            return None;
        }
        let index = self.drawables.get_index_of(name)?;
        ResourceId::new(FIRST_DRAWABLE_ID + index as u32)
    }

    fn drawable(&self, id: ResourceId) -> Option<Drawable> {
        let index = id.get().checked_sub(FIRST_DRAWABLE_ID)? as usize;
        let (name, path) = self.drawables.get_index(index)?;
        Some(Drawable {
            package: self.package.clone(),
            name: name.clone(),
            id,
            path: Some(path.clone()),
        })
    }

    fn open_asset(&self, name: &str) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(self.dir.join(ASSETS_DIR).join(name))?;
        Ok(Box::new(BufReader::new(file)))
    }
}
