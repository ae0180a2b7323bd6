//! Host-platform seams.
//!
//! The engine never talks to a package manager directly. It goes through the
//! `DirectoryService` capability (capability queries, labels, launch entry
//! points, per-package resources) and the `ResourceNamespace` capability
//! (resolve a string name inside one package's resources, open its assets).
//! `memory` provides an in-process double for tests; `fs` maps the same
//! contract onto a directory tree so the CLI can run off-device.

pub mod fs;
pub mod memory;
pub mod query;

pub use query::{FlagShape, QueryFlags, SdkLevel};

use serde::Serialize;
use std::fmt;
use std::io::{self, Read};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;

/// Resource kind used for every by-name lookup.
pub const DRAWABLE_KIND: &str = "drawable";

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The package disappeared (or never existed) between query and lookup.
    #[error("package '{0}' not found")]
    NameNotFound(String),

    #[error("reading package metadata for '{package}': {source}")]
    Io {
        package: String,
        #[source]
        source: io::Error,
    },
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlatformError::NameNotFound(_))
    }
}

/// Fully-qualified launchable component (package + class).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentName {
    package: String,
    class: String,
}

impl ComponentName {
    /// Builds a component, expanding a leading `.` in `class` against the
    /// package name.
    pub fn new(package: impl Into<String>, class: impl AsRef<str>) -> Self {
        let package = package.into();
        let class = class.as_ref();
        let class = if class.starts_with('.') {
            format!("{package}{class}")
        } else {
            class.to_string()
        };
        Self { package, class }
    }
}

// Matches the key format used by appfilter.xml manifests.
impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentInfo{{{}/{}}}", self.package, self.class)
    }
}

/// Resource identifier inside one package namespace. Zero is never valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(NonZeroU32);

impl ResourceId {
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Renderable image handle returned by a successful resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Drawable {
    pub package: String,
    pub name: String,
    pub id: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Resources scoped to a single package.
pub trait ResourceNamespace {
    /// Looks up a resource identifier by `name` and `kind` inside `package`.
    fn identifier(&self, name: &str, kind: &str, package: &str) -> Option<ResourceId>;

    /// Materialises a drawable for an identifier previously returned by
    /// `identifier`.
    fn drawable(&self, id: ResourceId) -> Option<Drawable>;

    /// Opens a bundled asset stream.
    fn open_asset(&self, name: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// One match of a capability query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedActivity {
    pub package: String,
}

/// Package-manager style directory of installed applications.
pub trait DirectoryService {
    /// Platform API level of the running host.
    fn sdk_level(&self) -> SdkLevel;

    /// Installed activities answering `action`.
    fn query_by_capability(&self, action: &str, flags: QueryFlags) -> Vec<ResolvedActivity>;

    /// Human-readable application label.
    fn application_label(&self, package: &str, flags: QueryFlags) -> Result<String, PlatformError>;

    /// Resource namespace of an installed package.
    fn resources_for(&self, package: &str) -> Result<Rc<dyn ResourceNamespace>, PlatformError>;

    /// Launchable entry point of a package, if it has one.
    fn launch_component(&self, package: &str) -> Option<ComponentName>;
}
