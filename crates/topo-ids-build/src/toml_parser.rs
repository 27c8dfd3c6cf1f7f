//! TOML parsers for topology and component definition files.
//!
//! Ids and windows may be written as TOML integers or as strings holding a
//! decimal or hexadecimal literal:
//!
//! ```toml
//! [[events]]
//! name = "SETTING_CHANGED"
//! id = "0x10"
//!
//! [[channels]]
//! name = "Output"
//! id = 3
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use topo_ids::{
    Channel, Command, ComponentDefinition, Event, Id, Instance, Parameter, Topology,
};

/// A numeric field as written in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawLiteral {
    Integer(i64),
    Text(String),
}

impl RawLiteral {
    /// The literal text, interpreted later by the core parser.
    pub(crate) fn into_text(self) -> String {
        match self {
            Self::Integer(v) => v.to_string(),
            Self::Text(s) => s,
        }
    }

    /// Assembly base id: negative values clamp to 0, which the allocation
    /// floor lifts to 1.
    pub(crate) fn assembly_base(&self, field: &'static str) -> Result<Id, ConfigError> {
        match self {
            Self::Integer(v) => Ok(topo_ids::clamp_non_negative(*v)),
            Self::Text(s) => topo_ids::parse_assembly_base(s).ok_or_else(|| {
                ConfigError::InvalidLiteral {
                    field,
                    literal: s.clone(),
                }
            }),
        }
    }

    /// Absolute value of the literal, as used for windows.
    pub(crate) fn magnitude(&self, field: &'static str) -> Result<Id, ConfigError> {
        match self {
            Self::Integer(v) => Ok(v.unsigned_abs()),
            Self::Text(s) => topo_ids::parse_magnitude(s).ok_or_else(|| {
                ConfigError::InvalidLiteral {
                    field,
                    literal: s.clone(),
                }
            }),
        }
    }
}

/// A parsed topology file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyFile {
    pub topology: Topology,
    /// Component definition files, as written (relative to the topology file).
    pub imports: Vec<PathBuf>,
}

/// Raw TOML structure.
#[derive(Debug, Deserialize)]
struct RawTopology {
    name: String,
    namespace: Option<String>,
    base_id: Option<RawLiteral>,
    window: Option<RawLiteral>,
    #[serde(default)]
    imports: Vec<PathBuf>,
    #[serde(default)]
    instances: Vec<RawInstance>,
}

#[derive(Debug, Deserialize)]
struct RawInstance {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    base_id: Option<RawLiteral>,
    window: Option<RawLiteral>,
}

impl TopologyFile {
    /// Parse from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_str(&read(path.as_ref())?)
    }

    /// Parse from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawTopology = toml::from_str(content)?;

        if raw.name.trim().is_empty() {
            return Err(ConfigError::Validation("topology name is empty".into()));
        }

        let mut seen = HashSet::new();
        let mut instances = Vec::with_capacity(raw.instances.len());
        for inst in raw.instances {
            if inst.name.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "instance of type '{}' has an empty name",
                    inst.type_name
                )));
            }
            if inst.type_name.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "instance '{}' has an empty type",
                    inst.name
                )));
            }
            if !seen.insert(inst.name.clone()) {
                return Err(ConfigError::Validation(format!(
                    "instance '{}' is declared more than once",
                    inst.name
                )));
            }
            instances.push(Instance {
                name: inst.name,
                type_name: inst.type_name,
                base_id: inst.base_id.map(RawLiteral::into_text),
                window: inst.window.map(RawLiteral::into_text),
            });
        }

        let topology = Topology {
            name: raw.name,
            namespace: raw.namespace,
            base_id: raw.base_id.map(|v| v.assembly_base("base_id")).transpose()?,
            window: raw.window.map(|v| v.magnitude("window")).transpose()?,
            instances,
        };

        Ok(Self {
            topology,
            imports: raw.imports,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    name: String,
    namespace: Option<String>,
    type_id: Option<String>,
    #[serde(default)]
    events: Vec<RawItem>,
    #[serde(default)]
    channels: Vec<RawItem>,
    #[serde(default)]
    commands: Vec<RawCommand>,
    #[serde(default)]
    parameters: Vec<RawParameter>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    name: String,
    id: RawLiteral,
}

#[derive(Debug, Deserialize)]
struct RawCommand {
    name: String,
    opcode: RawLiteral,
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    name: String,
    id: RawLiteral,
    set_opcode: RawLiteral,
    save_opcode: RawLiteral,
}

/// Parse a component definition from a TOML file.
pub fn component_from_file(path: impl AsRef<Path>) -> Result<ComponentDefinition, ConfigError> {
    component_from_str(&read(path.as_ref())?)
}

/// Parse a component definition from a TOML string.
pub fn component_from_str(content: &str) -> Result<ComponentDefinition, ConfigError> {
    let raw: RawComponent = toml::from_str(content)?;

    if raw.name.trim().is_empty() {
        return Err(ConfigError::Validation("component name is empty".into()));
    }

    Ok(ComponentDefinition {
        name: raw.name,
        namespace: raw.namespace,
        type_id: raw.type_id,
        events: raw
            .events
            .into_iter()
            .map(|e| Event {
                name: e.name,
                id: e.id.into_text(),
            })
            .collect(),
        channels: raw
            .channels
            .into_iter()
            .map(|c| Channel {
                name: c.name,
                id: c.id.into_text(),
            })
            .collect(),
        commands: raw
            .commands
            .into_iter()
            .map(|c| Command {
                name: c.name,
                opcode: c.opcode.into_text(),
            })
            .collect(),
        parameters: raw
            .parameters
            .into_iter()
            .map(|p| Parameter {
                name: p.name,
                id: p.id.into_text(),
                set_opcode: p.set_opcode.into_text(),
                save_opcode: p.save_opcode.into_text(),
            })
            .collect(),
    })
}

pub(crate) fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors while reading a topology, component or defaults file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid numeric literal '{literal}' for {field}")]
    InvalidLiteral { field: &'static str, literal: String },

    #[error("validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_topology() {
        let toml = r#"
name = "Ref"
namespace = "Ref"
base_id = "0x100"
window = 20
imports = ["components/SignalGen.toml"]

[[instances]]
name = "sigGen"
type = "SignalGen"

[[instances]]
name = "rateGroup"
type = "Svc::RateGroup"
base_id = 512
window = "0x40"
"#;
        let file = TopologyFile::from_str(toml).unwrap();
        let topo = &file.topology;

        assert_eq!(topo.name, "Ref");
        assert_eq!(topo.namespace.as_deref(), Some("Ref"));
        assert_eq!(topo.base_id, Some(0x100));
        assert_eq!(topo.window, Some(20));
        assert_eq!(file.imports, vec![PathBuf::from("components/SignalGen.toml")]);

        assert_eq!(topo.instances.len(), 2);
        assert_eq!(topo.instances[0], Instance::new("sigGen", "SignalGen"));
        assert_eq!(
            topo.instances[1],
            Instance::new("rateGroup", "Svc::RateGroup")
                .with_base_id("512")
                .with_window("0x40")
        );
    }

    #[test]
    fn assembly_values_are_optional() {
        let file = TopologyFile::from_str(r#"name = "Bare""#).unwrap();
        assert_eq!(file.topology.base_id, None);
        assert_eq!(file.topology.window, None);
        assert!(file.topology.instances.is_empty());
        assert!(file.imports.is_empty());
    }

    #[test]
    fn negative_assembly_base_id_clamps_to_zero() {
        let file = TopologyFile::from_str(
            r#"
name = "Neg"
base_id = -16
window = "-0x10"
"#,
        )
        .unwrap();
        assert_eq!(file.topology.base_id, Some(0));
        assert_eq!(file.topology.window, Some(16));

        let file = TopologyFile::from_str("name = \"Neg\"\nbase_id = \"-0x10\"").unwrap();
        assert_eq!(file.topology.base_id, Some(0));
    }

    #[test]
    fn instance_literals_are_kept_verbatim() {
        let file = TopologyFile::from_str(
            r#"
name = "T"

[[instances]]
name = "x"
type = "X"
base_id = "garbage"
"#,
        )
        .unwrap();
        assert_eq!(file.topology.instances[0].base_id.as_deref(), Some("garbage"));
    }

    #[test]
    fn rejects_bad_assembly_literal() {
        let err = TopologyFile::from_str(
            r#"
name = "T"
window = "twenty"
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidLiteral { field: "window", .. }
        ));
        assert!(err.to_string().contains("twenty"));
    }

    #[test]
    fn rejects_invalid_topologies() {
        let cases = [
            // empty topology name
            "name = \"\"",
            // duplicate instance
            "name = \"T\"\n[[instances]]\nname = \"a\"\ntype = \"A\"\n[[instances]]\nname = \"a\"\ntype = \"B\"",
            // empty instance name
            "name = \"T\"\n[[instances]]\nname = \"\"\ntype = \"A\"",
            // empty type
            "name = \"T\"\n[[instances]]\nname = \"a\"\ntype = \"\"",
        ];
        for case in cases {
            assert!(
                matches!(TopologyFile::from_str(case), Err(ConfigError::Validation(_))),
                "Should reject: {case}"
            );
        }
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = TopologyFile::from_str("name = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        // missing `type`
        let err = TopologyFile::from_str("name = \"T\"\n[[instances]]\nname = \"a\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn parse_component() {
        let toml = r#"
name = "SignalGen"
namespace = "Ref"

[[events]]
name = "SETTING_CHANGED"
id = "0x0"

[[channels]]
name = "Output"
id = 1

[[commands]]
name = "SET_FREQ"
opcode = "0x2"

[[parameters]]
name = "AMPLITUDE"
id = 0
set_opcode = 10
save_opcode = "0xB"
"#;
        let def = component_from_str(toml).unwrap();
        let expected = ComponentDefinition::new("SignalGen")
            .with_namespace("Ref")
            .with_event("SETTING_CHANGED", "0x0")
            .with_channel("Output", "1")
            .with_command("SET_FREQ", "0x2")
            .with_parameter("AMPLITUDE", "0", "10", "0xB");
        assert_eq!(def, expected);
        assert_eq!(def.qualified_name(), "Ref::SignalGen");
    }

    #[test]
    fn component_sections_are_optional() {
        let def = component_from_str(r#"name = "Empty""#).unwrap();
        assert!(def.is_empty());
        assert_eq!(def.type_id, None);
    }

    #[test]
    fn explicit_type_id_is_kept() {
        let def = component_from_str(
            r#"
name = "Typed"
type_id = "0xDEADBEEF"
"#,
        )
        .unwrap();
        assert_eq!(def.type_id().unwrap(), "0xDEADBEEF");
    }

    #[test]
    fn rejects_unnamed_component() {
        assert!(matches!(
            component_from_str(r#"name = " ""#),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = component_from_file("/nonexistent/dir/Comp.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/Comp.toml"));
    }
}
