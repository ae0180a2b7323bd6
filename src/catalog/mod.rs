//! Icon-pack catalog.
//!
//! Providers advertise themselves through one of two legacy theming intent
//! actions. The catalog asks the directory service for both, resolves each
//! match's label and resources, and keeps the result keyed by package name in
//! discovery order. It is rebuilt wholesale on every refresh; there is no
//! incremental update.

pub mod pack;

pub use pack::Pack;

use crate::platform::{DirectoryService, QueryFlags};
use indexmap::IndexMap;
use log::{debug, warn};

/// Intent actions advertising icon-pack support, in query order.
pub const THEME_SIGNATURES: [&str; 2] = ["org.adw.launcher.THEMES", "com.gau.go.launcherex.theme"];

#[derive(Debug, Default)]
pub struct PackCatalog {
    packs: IndexMap<String, Pack>,
}

impl PackCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the catalog with the providers currently installed.
    ///
    /// A package that vanishes between the query and the lookup is skipped. A
    /// package advertising both signatures keeps its first position.
    pub fn refresh(&mut self, directory: &dyn DirectoryService) {
        self.packs.clear();
        let flags = QueryFlags::for_sdk(directory.sdk_level());
        for signature in THEME_SIGNATURES {
            for activity in directory.query_by_capability(signature, flags) {
                let package = activity.package;
                let label = directory.application_label(&package, flags);
                let resources = label.and_then(|label| {
                    directory
                        .resources_for(&package)
                        .map(|resources| (label, resources))
                });
                match resources {
                    Ok((label, resources)) => {
                        self.packs
                            .insert(package.clone(), Pack::new(package, label, resources));
                    }
                    Err(err) if err.is_not_found() => debug!("skipping {package}: {err}"),
                    Err(err) => warn!("skipping {package}: {err}"),
                }
            }
        }
        debug!("catalog holds {} icon packs", self.packs.len());
    }

    pub fn get(&self, package: &str) -> Option<&Pack> {
        self.packs.get(package)
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// Packs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Pack> {
        self.packs.values()
    }

    /// Package name → display name, in discovery order.
    pub fn names(&self) -> IndexMap<String, String> {
        self.packs
            .values()
            .map(|pack| (pack.package_name.clone(), pack.name.clone()))
            .collect()
    }
}
