//! In-process directory service.
//!
//! Packages, their capabilities, drawables and assets are registered up front;
//! every query answers from that table. Lookups are recorded so tests can
//! assert which call shape the engine picked.

use super::{
    ComponentName, DirectoryService, Drawable, PlatformError, QueryFlags, ResolvedActivity,
    ResourceId, ResourceNamespace, SdkLevel,
};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read};
use std::rc::Rc;

const FIRST_DRAWABLE_ID: u32 = 0x7f02_0001;

/// One registered package.
#[derive(Clone, Debug, Default)]
pub struct MemoryPackage {
    pub label: String,
    pub capabilities: Vec<String>,
    pub launch_class: Option<String>,
    pub drawables: Vec<String>,
    pub assets: BTreeMap<String, Vec<u8>>,
}

impl MemoryPackage {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn capability(mut self, action: impl Into<String>) -> Self {
        self.capabilities.push(action.into());
        self
    }

    pub fn launchable(mut self, class: impl Into<String>) -> Self {
        self.launch_class = Some(class.into());
        self
    }

    pub fn drawable(mut self, name: impl Into<String>) -> Self {
        self.drawables.push(name.into());
        self
    }

    pub fn asset(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.assets.insert(name.into(), contents.into());
        self
    }
}

#[derive(Default)]
pub struct MemoryDirectory {
    sdk: SdkLevel,
    packages: RefCell<IndexMap<String, MemoryPackage>>,
    label_misses: RefCell<Vec<String>>,
    seen_flags: RefCell<Vec<QueryFlags>>,
}

impl MemoryDirectory {
    pub fn new(sdk: SdkLevel) -> Self {
        Self {
            sdk,
            ..Self::default()
        }
    }

    /// Registers (or replaces) a package.
    pub fn install(&self, package: impl Into<String>, pkg: MemoryPackage) {
        self.packages.borrow_mut().insert(package.into(), pkg);
    }

    pub fn uninstall(&self, package: &str) {
        self.packages.borrow_mut().shift_remove(package);
    }

    /// Makes the next label lookup for `package` fail as if the package was
    /// removed between query and lookup.
    pub fn race_uninstall(&self, package: impl Into<String>) {
        self.label_misses.borrow_mut().push(package.into());
    }

    /// Flags received by queries and label lookups, in call order.
    pub fn seen_flags(&self) -> Vec<QueryFlags> {
        self.seen_flags.borrow().clone()
    }
}

impl DirectoryService for MemoryDirectory {
    fn sdk_level(&self) -> SdkLevel {
        self.sdk
    }

    fn query_by_capability(&self, action: &str, flags: QueryFlags) -> Vec<ResolvedActivity> {
        self.seen_flags.borrow_mut().push(flags);
        self.packages
            .borrow()
            .iter()
            .filter(|(_, pkg)| pkg.capabilities.iter().any(|c| c == action))
            .map(|(package, _)| ResolvedActivity {
                package: package.clone(),
            })
            .collect()
    }

    fn application_label(&self, package: &str, flags: QueryFlags) -> Result<String, PlatformError> {
        self.seen_flags.borrow_mut().push(flags);
        let mut misses = self.label_misses.borrow_mut();
        if let Some(pos) = misses.iter().position(|p| p == package) {
            misses.remove(pos);
            return Err(PlatformError::NameNotFound(package.to_string()));
        }
        self.packages
            .borrow()
            .get(package)
            .map(|pkg| pkg.label.clone())
            .ok_or_else(|| PlatformError::NameNotFound(package.to_string()))
    }

    fn resources_for(&self, package: &str) -> Result<Rc<dyn ResourceNamespace>, PlatformError> {
        let packages = self.packages.borrow();
        let pkg = packages
            .get(package)
            .ok_or_else(|| PlatformError::NameNotFound(package.to_string()))?;
        Ok(Rc::new(MemoryResources {
            package: package.to_string(),
            drawables: pkg.drawables.clone(),
            assets: pkg.assets.clone(),
        }))
    }

    fn launch_component(&self, package: &str) -> Option<ComponentName> {
        let packages = self.packages.borrow();
        let class = packages.get(package)?.launch_class.as_deref()?;
        Some(ComponentName::new(package, class))
    }
}

/// Snapshot of one package's resources, taken when the namespace is opened.
pub struct MemoryResources {
    package: String,
    drawables: Vec<String>,
    assets: BTreeMap<String, Vec<u8>>,
}

impl ResourceNamespace for MemoryResources {
    fn identifier(&self, name: &str, kind: &str, package: &str) -> Option<ResourceId> {
        if kind != super::DRAWABLE_KIND || package != self.package {
            return None;
        }
        let index = self.drawables.iter().position(|d| d == name)?;
        ResourceId::new(FIRST_DRAWABLE_ID + index as u32)
    }

    fn drawable(&self, id: ResourceId) -> Option<Drawable> {
        let index = id.get().checked_sub(FIRST_DRAWABLE_ID)? as usize;
        let name = self.drawables.get(index)?;
        Some(Drawable {
            package: self.package.clone(),
            name: name.clone(),
            id,
            path: None,
        })
    }

    fn open_asset(&self, name: &str) -> io::Result<Box<dyn Read + '_>> {
        match self.assets.get(name) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.as_slice()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("asset {name} not found in {}", self.package),
            )),
        }
    }
}
