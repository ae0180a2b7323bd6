//! `appfilter.xml` parsing.
//!
//! Icon packs ship a manifest of `<item component="..." drawable="..."/>`
//! entries. Everything else in the document is ignored. Third-party manifests
//! are frequently sloppy, so the loader keeps whatever it managed to read
//! before the first error instead of failing the whole pack.

use indexmap::{IndexMap, IndexSet};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::{self, BufRead};

/// Asset name of the component→drawable manifest.
pub const APPFILTER_ASSET: &str = "appfilter.xml";

const ITEM_TAG: &[u8] = b"item";
const COMPONENT_ATTR: &[u8] = b"component";
const DRAWABLE_ATTR: &[u8] = b"drawable";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("opening {APPFILTER_ASSET}: {0}")]
    Open(#[source] io::Error),

    #[error("malformed {APPFILTER_ASSET} at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
}

/// Component identifier → drawable name, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentTable {
    entries: IndexMap<String, String>,
}

impl ComponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry. A repeated component keeps its first position and
    /// takes the new drawable.
    pub fn insert(&mut self, component: impl Into<String>, drawable: impl Into<String>) {
        self.entries.insert(component.into(), drawable.into());
    }

    pub fn get(&self, component: &str) -> Option<&str> {
        self.entries.get(component).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, d)| (c.as_str(), d.as_str()))
    }

    /// Unique drawable names in first-seen order.
    pub fn distinct_drawables(&self) -> Vec<String> {
        self.entries
            .values()
            .cloned()
            .collect::<IndexSet<String>>()
            .into_iter()
            .collect()
    }
}

/// Streams `source` and adds every complete `item` entry to `table`.
///
/// Entries read before an error stay in `table`.
pub fn parse_appfilter<R: BufRead>(source: R, table: &mut ComponentTable) -> Result<(), ManifestError> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| ManifestError::Xml {
                position: reader.error_position() as u64,
                source,
            })?;
        match event {
            Event::Eof => return Ok(()),
            Event::Start(tag) | Event::Empty(tag) if tag.name().as_ref() == ITEM_TAG => {
                let item = read_item(&tag).map_err(|source| ManifestError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                })?;
                if let Some((component, drawable)) = item {
                    table.insert(component, drawable);
                }
            }
            _ => {}
        }
    }
}

fn read_item(tag: &BytesStart<'_>) -> Result<Option<(String, String)>, quick_xml::Error> {
    let mut component = None;
    let mut drawable = None;
    for attr in tag.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            COMPONENT_ATTR => component = Some(attr.unescape_value()?.into_owned()),
            DRAWABLE_ATTR => drawable = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }
    match (component, drawable) {
        (Some(c), Some(d)) if !c.is_empty() && !d.is_empty() => Ok(Some((c, d))),
        _ => Ok(None),
    }
}
