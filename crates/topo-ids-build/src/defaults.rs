//! Assembly defaults file.
//!
//! ```toml
//! [assembly]
//! base_id = "0x100"
//! window = 20
//! ```
//!
//! A missing file, table or key falls back to [`AssemblyDefaults::default`].

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use topo_ids::AssemblyDefaults;

use crate::toml_parser::{read, ConfigError, RawLiteral};

/// File name looked up next to the topology file.
pub const DEFAULTS_FILE_NAME: &str = "assembly.toml";

#[derive(Debug, Deserialize)]
struct RawDefaultsFile {
    #[serde(default)]
    assembly: RawAssembly,
}

#[derive(Debug, Default, Deserialize)]
struct RawAssembly {
    base_id: Option<RawLiteral>,
    window: Option<RawLiteral>,
}

/// Load defaults from `path`, or the built-in values if it does not exist.
pub fn load_defaults(path: impl AsRef<Path>) -> Result<AssemblyDefaults, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no assembly defaults file, using built-in values");
        return Ok(AssemblyDefaults::default());
    }
    parse_defaults(&read(path)?)
}

/// Parse defaults from a TOML string.
pub fn parse_defaults(content: &str) -> Result<AssemblyDefaults, ConfigError> {
    let raw: RawDefaultsFile = toml::from_str(content)?;
    let builtin = AssemblyDefaults::default();

    Ok(AssemblyDefaults {
        base_id: match raw.assembly.base_id {
            Some(v) => v.assembly_base("assembly.base_id")?,
            None => builtin.base_id,
        },
        window: match raw.assembly.window {
            Some(v) => v.magnitude("assembly.window")?,
            None => builtin.window,
        },
    })
}
