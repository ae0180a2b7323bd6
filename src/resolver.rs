//! Icon selection and resolution.
//!
//! `IconResolver` is the surface the launcher UI talks to. It owns the pack
//! catalog, the selected pack with its parsed manifest, and the user override
//! mapping. It is single-threaded and synchronous: `select` refreshes the
//! catalog and parses a manifest on the calling thread, so callers that need a
//! responsive UI run it off the render thread themselves.
//!
//! Resolution order for an application:
//!
//! 1. an override naming the selected pack supplies the drawable name,
//! 2. an override naming another installed pack resolves directly in that pack,
//! 3. with no pack selected there is no icon,
//! 4. otherwise the application's launch component is looked up in the
//!    selected pack's manifest.

use crate::catalog::{Pack, PackCatalog};
use crate::manifest::ComponentTable;
use crate::overrides::{OverrideMapping, OverrideStore, PackAndDrawable};
use crate::platform::{DirectoryService, Drawable};
use anyhow::Result;
use indexmap::IndexMap;
use log::{debug, info};
use std::rc::Rc;

#[derive(Default)]
pub struct IconResolver {
    catalog: PackCatalog,
    component_drawables: ComponentTable,
    overrides: OverrideMapping,
    directory: Option<Rc<dyn DirectoryService>>,
    selected: Option<Pack>,
}

impl IconResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_packs(&self) -> bool {
        !self.catalog.is_empty()
    }

    /// Package name → display name of every known pack.
    pub fn icon_packs(&self) -> IndexMap<String, String> {
        self.catalog.names()
    }

    pub fn catalog(&self) -> &PackCatalog {
        &self.catalog
    }

    pub fn selected_pack_name(&self) -> Option<&str> {
        self.selected.as_ref().map(|pack| pack.package_name.as_str())
    }

    /// Manifest entries of the selected pack; empty when nothing is selected.
    pub fn component_drawables(&self) -> &ComponentTable {
        &self.component_drawables
    }

    /// Refreshes the catalog from `directory`.
    pub fn update_packs(&mut self, directory: &dyn DirectoryService) {
        self.catalog.refresh(directory);
    }

    /// Selects `package` as the active pack.
    ///
    /// Prior selection state is always cleared. The catalog is refreshed before
    /// the lookup and the manifest re-parsed, since packs may have been
    /// installed, removed or updated since the last selection. An empty or
    /// unknown package name leaves nothing selected.
    pub fn select(&mut self, directory: Option<Rc<dyn DirectoryService>>, package: Option<&str>) {
        self.selected = None;
        self.directory = None;
        self.component_drawables.clear();
        let Some(directory) = directory else {
            return;
        };
        self.catalog.refresh(directory.as_ref());
        let Some(package) = package.filter(|p| !p.is_empty()) else {
            info!("icon pack deselected");
            return;
        };
        let Some(pack) = self.catalog.get(package).cloned() else {
            info!("icon pack {package} is not installed; nothing selected");
            return;
        };
        pack.load_component_drawables(&mut self.component_drawables);
        info!(
            "selected icon pack {package} with {} manifest entries",
            self.component_drawables.len()
        );
        self.selected = Some(pack);
        self.directory = Some(directory);
    }

    /// Drawable to render for application `package`, if any.
    pub fn icon(&self, package: &str) -> Option<Drawable> {
        let mut drawable_name: Option<&str> = None;
        if let Some(pad) = self.overrides.get(package) {
            match &self.selected {
                Some(selected) if selected.package_name == pad.package_name => {
                    drawable_name = pad.drawable_name.as_deref();
                }
                _ => {
                    if let Some(pack) = self.catalog.get(&pad.package_name) {
                        return pack.drawable(pad.drawable_name.as_deref());
                    }
                    debug!(
                        "override for {package} names missing pack {}",
                        pad.package_name
                    );
                }
            }
        }

        let selected = self.selected.as_ref()?;
        if drawable_name.is_none() {
            let directory = self.directory.as_ref()?;
            let component = directory.launch_component(package)?;
            drawable_name = self.component_drawables.get(&component.to_string());
        }
        selected.drawable(drawable_name)
    }

    /// Distinct drawable names of an installed pack, for pack browsing.
    pub fn drawable_names(&self, package: &str) -> Option<Vec<String>> {
        self.catalog.get(package).map(Pack::drawable_names)
    }

    pub fn has_mapping(&self, package: &str) -> bool {
        self.overrides.contains_key(package)
    }

    /// Pins `package` to `drawable_name` from `icon_package`, replacing any
    /// previous override.
    pub fn add_mapping(&mut self, icon_package: &str, package: &str, drawable_name: Option<&str>) {
        self.overrides.insert(
            package.to_string(),
            PackAndDrawable::new(icon_package, drawable_name.map(str::to_string)),
        );
    }

    pub fn remove_mapping(&mut self, package: &str) {
        self.overrides.remove(package);
    }

    pub fn overrides(&self) -> &OverrideMapping {
        &self.overrides
    }

    /// Loads persisted overrides unless some are already in memory.
    pub fn restore_mappings_if_empty(&mut self, store: &dyn OverrideStore) -> Result<()> {
        if self.overrides.is_empty() {
            store.restore(&mut self.overrides)?;
            debug!("restored {} icon mappings", self.overrides.len());
        }
        Ok(())
    }

    /// Discards in-memory overrides and loads the persisted ones.
    pub fn reload_overrides(&mut self, store: &dyn OverrideStore) -> Result<()> {
        self.overrides.clear();
        store.restore(&mut self.overrides)
    }

    pub fn store_mappings(&self, store: &dyn OverrideStore) -> Result<()> {
        store.store(&self.overrides)
    }
}
