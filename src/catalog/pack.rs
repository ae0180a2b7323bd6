use crate::manifest::{APPFILTER_ASSET, ComponentTable, ManifestError, parse_appfilter};
use crate::platform::{DRAWABLE_KIND, Drawable, ResourceNamespace};
use log::debug;
use std::fmt;
use std::io::BufReader;
use std::rc::Rc;

/// An installed icon-pack provider.
#[derive(Clone)]
pub struct Pack {
    pub package_name: String,
    pub name: String,
    resources: Rc<dyn ResourceNamespace>,
}

impl Pack {
    pub fn new(
        package_name: impl Into<String>,
        name: impl Into<String>,
        resources: Rc<dyn ResourceNamespace>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            name: name.into(),
            resources,
        }
    }

    /// Resolves `drawable_name` inside this pack's own resources.
    pub fn drawable(&self, drawable_name: Option<&str>) -> Option<Drawable> {
        let name = drawable_name?;
        let id = self
            .resources
            .identifier(name, DRAWABLE_KIND, &self.package_name)?;
        self.resources.drawable(id)
    }

    /// Distinct drawable names listed by the pack's manifest.
    pub fn drawable_names(&self) -> Vec<String> {
        let mut table = ComponentTable::new();
        self.load_component_drawables(&mut table);
        table.distinct_drawables()
    }

    /// Adds the pack's manifest entries to `table`, keeping whatever was read
    /// when the manifest is missing or malformed.
    pub fn load_component_drawables(&self, table: &mut ComponentTable) {
        if let Err(err) = self.try_load_component_drawables(table) {
            debug!("{}: {err}; kept {} entries", self.package_name, table.len());
        }
    }

    pub fn try_load_component_drawables(&self, table: &mut ComponentTable) -> Result<(), ManifestError> {
        let asset = self
            .resources
            .open_asset(APPFILTER_ASSET)
            .map_err(ManifestError::Open)?;
        parse_appfilter(BufReader::new(asset), table)
    }
}

impl fmt::Debug for Pack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pack")
            .field("package_name", &self.package_name)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
