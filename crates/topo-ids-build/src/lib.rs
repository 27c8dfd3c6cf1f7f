//! Build-time utilities for topo-ids.
//!
//! This crate provides tools for:
//! - Parsing topology and component definition TOML files
//! - Loading assembly defaults from `assembly.toml`
//! - Writing the allocation report and the resolved id table
//!
//! # Usage in build.rs
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     println!("cargo:rerun-if-changed=topology/Ref.toml");
//!     topo_ids_build::generate("topology/Ref.toml")
//!         .expect("Failed to allocate topology ids");
//! }
//! ```
//!
//! # Artifacts
//!
//! For a topology file `Ref.toml`, [`generate`] writes next to it:
//!
//! - `Ref_IDTableLog.txt`: the allocation report, with a timestamped header
//!   and any diagnostics raised while building the model
//! - `Ref.ids.toml`: every instance with its final base id and window, for
//!   the code generator
//!
//! Nothing is written if the topology fails to parse, an imported component
//! has colliding ids, or two explicit windows overlap.

mod defaults;
mod toml_parser;

pub use defaults::{load_defaults, parse_defaults, DEFAULTS_FILE_NAME};
pub use toml_parser::{component_from_file, component_from_str, ConfigError, TopologyFile};

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use topo_ids::{Assignment, ComponentRegistry, Id, ModelContext, ModelError, TopologyModel};

/// Appended to the topology file stem to name the report.
pub const REPORT_SUFFIX: &str = "_IDTableLog.txt";

/// Extension of the resolved id table.
pub const TABLE_EXTENSION: &str = "ids.toml";

/// Which artifacts [`generate_with_paths`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub write_report: bool,
    pub write_table: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            write_report: true,
            write_table: true,
        }
    }
}

/// Main entry point for build.rs integration.
///
/// Reads the topology, its imported components and `assembly.toml` from the
/// topology's directory, and writes both artifacts next to the topology.
///
/// # Errors
///
/// Returns an error if:
/// - a topology, component or defaults file cannot be read or parsed
/// - model building fails (id collisions, bad literals, duplicate components)
/// - an artifact cannot be written
pub fn generate(topology_path: impl AsRef<Path>) -> Result<TopologyModel, GenerateError> {
    let topology_path = topology_path.as_ref();
    let defaults_path = topology_path.with_file_name(DEFAULTS_FILE_NAME);
    let (report_path, table_path) = artifact_paths(topology_path);

    generate_with_paths(
        topology_path,
        &defaults_path,
        &report_path,
        &table_path,
        BuildOptions::default(),
    )
}

/// Generate with explicit defaults and artifact paths.
pub fn generate_with_paths(
    topology_path: impl AsRef<Path>,
    defaults_path: impl AsRef<Path>,
    report_path: impl AsRef<Path>,
    table_path: impl AsRef<Path>,
    options: BuildOptions,
) -> Result<TopologyModel, GenerateError> {
    let report_path = report_path.as_ref();
    let table_path = table_path.as_ref();

    // 1. Build the whole model; every fatal error surfaces here
    let model = load_model(topology_path, defaults_path)?;

    // 2. Render artifacts before touching the filesystem
    let report = if options.write_report {
        report_text(&model)
    } else {
        None
    };
    let table = if options.write_table {
        Some(table_text(&model)?)
    } else {
        None
    };

    // 3. Write
    if let Some(report) = report {
        write(report_path, &report)?;
        info!(path = %report_path.display(), "wrote allocation report");
    }
    if let Some(table) = table {
        write(table_path, &table)?;
        info!(path = %table_path.display(), "wrote id table");
    }

    Ok(model)
}

/// Parse a topology with its imports and defaults and build its model,
/// without writing anything.
pub fn load_model(
    topology_path: impl AsRef<Path>,
    defaults_path: impl AsRef<Path>,
) -> Result<TopologyModel, GenerateError> {
    let topology_path = topology_path.as_ref();
    let defaults_path = defaults_path.as_ref();

    let file = TopologyFile::from_file(topology_path).map_err(|source| GenerateError::Topology {
        path: topology_path.to_path_buf(),
        source,
    })?;

    let defaults = load_defaults(defaults_path).map_err(|source| GenerateError::Defaults {
        path: defaults_path.to_path_buf(),
        source,
    })?;

    let base_dir = topology_path.parent().unwrap_or_else(|| Path::new(""));
    let registry = load_registry(base_dir, &file.imports)?;

    let context = ModelContext::new(registry).with_defaults(defaults);
    Ok(context.build(file.topology)?)
}

/// Parse every imported component file, resolving paths against `base_dir`.
pub fn load_registry(
    base_dir: &Path,
    imports: &[PathBuf],
) -> Result<ComponentRegistry, GenerateError> {
    let mut registry = ComponentRegistry::new();
    for import in imports {
        let path = base_dir.join(import);
        let def = component_from_file(&path)
            .map_err(|source| GenerateError::Import { path, source })?;
        registry.register(def)?;
    }
    Ok(registry)
}

/// Report and table paths derived from the topology file name.
pub fn artifact_paths(topology_path: &Path) -> (PathBuf, PathBuf) {
    let stem = topology_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (
        topology_path.with_file_name(format!("{stem}{REPORT_SUFFIX}")),
        topology_path.with_file_name(format!("{stem}.{TABLE_EXTENSION}")),
    )
}

fn report_text(model: &TopologyModel) -> Option<String> {
    let table = model.report.as_deref()?;

    let mut out = String::new();
    out.push_str(&format!(
        "Topology {} id allocation ({})\n",
        model.topology.name,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!(
        "Assembly base id {} ({:#x}), window {}\n\n",
        model.assembly_base_id, model.assembly_base_id, model.assembly_window
    ));
    out.push_str(table);
    if !model.diagnostics.is_empty() {
        out.push_str("\nDiagnostics:\n");
        for diagnostic in &model.diagnostics {
            let level = if diagnostic.is_warning() { "warning" } else { "note" };
            out.push_str(&format!("  {level}: {diagnostic}\n"));
        }
    }
    Some(out)
}

/// Resolved id table as written to `<stem>.ids.toml`.
#[derive(Serialize)]
struct IdTable<'a> {
    topology: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
    base_id: Id,
    window: Id,
    instances: &'a [Assignment],
}

fn table_text(model: &TopologyModel) -> Result<String, GenerateError> {
    let table = IdTable {
        topology: &model.topology.name,
        namespace: model.topology.namespace.as_deref(),
        base_id: model.assembly_base_id,
        window: model.assembly_window,
        instances: model.allocation.assignments(),
    };
    Ok(toml::to_string_pretty(&table)?)
}

fn write(path: &Path, content: &str) -> Result<(), GenerateError> {
    std::fs::write(path, content).map_err(|source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors that can occur during generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("topology {}: {source}", path.display())]
    Topology {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("component import {}: {source}", path.display())]
    Import {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("assembly defaults {}: {source}", path.display())]
    Defaults {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("failed to serialize id table: {0}")]
    Table(#[from] toml::ser::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_follow_topology_stem() {
        let (report, table) = artifact_paths(Path::new("deploy/RefTopology.toml"));
        assert_eq!(report, PathBuf::from("deploy/RefTopology_IDTableLog.txt"));
        assert_eq!(table, PathBuf::from("deploy/RefTopology.ids.toml"));
    }

    #[test]
    fn artifact_paths_without_directory() {
        let (report, table) = artifact_paths(Path::new("Ref.toml"));
        assert_eq!(report, PathBuf::from("Ref_IDTableLog.txt"));
        assert_eq!(table, PathBuf::from("Ref.ids.toml"));
    }

    #[test]
    fn options_default_to_writing_everything() {
        let options = BuildOptions::default();
        assert!(options.write_report);
        assert!(options.write_table);
    }
}
