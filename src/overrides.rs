//! User icon overrides and their persistence.
//!
//! An override pins one application to a drawable from a specific pack. The
//! mapping is independent of the catalog: an entry may name a pack that is no
//! longer installed, in which case resolution simply finds nothing for it.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

const MAPPINGS_VERSION: u32 = 1;

/// Pack package name plus the drawable chosen from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackAndDrawable {
    pub package_name: String,
    #[serde(default)]
    pub drawable_name: Option<String>,
}

impl PackAndDrawable {
    pub fn new(package_name: impl Into<String>, drawable_name: Option<String>) -> Self {
        Self {
            package_name: package_name.into(),
            drawable_name,
        }
    }
}

/// Application package name → chosen pack drawable.
pub type OverrideMapping = BTreeMap<String, PackAndDrawable>;

/// External home of the override mapping.
pub trait OverrideStore {
    /// Adds every persisted entry to `sink`.
    fn restore(&self, sink: &mut OverrideMapping) -> Result<()>;

    /// Persists `source` in full.
    fn store(&self, source: &OverrideMapping) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingsFile {
    version: u32,
    mappings: OverrideMapping,
}

/// JSON file store. Writes go through a temporary file in the same directory
/// and are renamed into place.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OverrideStore for JsonFileStore {
    fn restore(&self, sink: &mut OverrideMapping) -> Result<()> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(err).with_context(|| format!("opening {}", self.path.display()));
            }
        };
        let parsed: MappingsFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing icon mappings {}", self.path.display()))?;
        if parsed.version != MAPPINGS_VERSION {
            bail!(
                "unsupported icon mappings version {} in {}, expected {}",
                parsed.version,
                self.path.display(),
                MAPPINGS_VERSION
            );
        }
        sink.extend(parsed.mappings);
        Ok(())
    }

    fn store(&self, source: &OverrideMapping) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        let mut temp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("creating temporary file in {}", dir.display()))?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(
                &mut writer,
                &MappingsFile {
                    version: MAPPINGS_VERSION,
                    mappings: source.clone(),
                },
            )
            .context("serializing icon mappings")?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.persist(&self.path)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}
