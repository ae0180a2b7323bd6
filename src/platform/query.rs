//! Query flag construction for capability and application-info lookups.
//!
//! Hosts at API level 33 and above take typed flag wrappers; older hosts take
//! a raw integer. Both request the same metadata, so callers build flags with
//! `QueryFlags::for_sdk` and let the shape follow the running platform.

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Include `<meta-data>` in query results.
pub const GET_META_DATA: u64 = 0x0000_0080;

/// First API level that takes typed flag wrappers.
pub const TIRAMISU: u32 = 33;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SdkLevel(pub u32);

impl SdkLevel {
    pub fn uses_typed_flags(self) -> bool {
        self.0 >= TIRAMISU
    }
}

impl Default for SdkLevel {
    fn default() -> Self {
        SdkLevel(34)
    }
}

impl fmt::Display for SdkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SdkLevel> for u32 {
    fn from(level: SdkLevel) -> u32 {
        level.0
    }
}

impl TryFrom<u32> for SdkLevel {
    type Error = anyhow::Error;

    fn try_from(level: u32) -> Result<Self> {
        if level == 0 {
            bail!("invalid SDK level: 0");
        }
        Ok(SdkLevel(level))
    }
}

impl TryFrom<&str> for SdkLevel {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        let level = value
            .trim()
            .parse::<u32>()
            .map_err(|_| anyhow!("invalid SDK level: {value}"))?;
        SdkLevel::try_from(level)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagShape {
    /// `int flags` call shape.
    Legacy,
    /// `ResolveInfoFlags.of(..)` / `ApplicationInfoFlags.of(..)` call shape.
    Typed,
}

impl FlagShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagShape::Legacy => "legacy",
            FlagShape::Typed => "typed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryFlags {
    pub shape: FlagShape,
    pub bits: u64,
}

impl QueryFlags {
    /// Metadata-bearing flags in the call shape matching `sdk`.
    pub fn for_sdk(sdk: SdkLevel) -> Self {
        let shape = if sdk.uses_typed_flags() {
            FlagShape::Typed
        } else {
            FlagShape::Legacy
        };
        Self {
            shape,
            bits: GET_META_DATA,
        }
    }
}
