//! Component definitions: the declared events, channels, commands and parameters
//! of one component type.
//!
//! Ids are kept as the raw text found in the source description; they are
//! only interpreted by the [`analyze`](crate::analyze) pass.

use serde::{Deserialize, Serialize};

use crate::type_id::content_type_id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    pub opcode: String,
}

/// A parameter owns one id plus two opcodes that live in the command namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub id: String,
    pub set_opcode: String,
    pub save_opcode: String,
}

/// A parsed component type.
///
/// Identified by `(namespace, name)`; immutable once registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Explicit type id. Derived from the content when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl ComponentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_event(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.events.push(Event {
            name: name.into(),
            id: id.into(),
        });
        self
    }

    pub fn with_channel(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.channels.push(Channel {
            name: name.into(),
            id: id.into(),
        });
        self
    }

    pub fn with_command(mut self, name: impl Into<String>, opcode: impl Into<String>) -> Self {
        self.commands.push(Command {
            name: name.into(),
            opcode: opcode.into(),
        });
        self
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        id: impl Into<String>,
        set_opcode: impl Into<String>,
        save_opcode: impl Into<String>,
    ) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            id: id.into(),
            set_opcode: set_opcode.into(),
            save_opcode: save_opcode.into(),
        });
        self
    }

    /// `namespace::name`, or just `name` without a namespace.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}::{}", ns, self.name),
            _ => self.name.clone(),
        }
    }

    /// True if the component declares no events, channels, commands or parameters.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
            && self.channels.is_empty()
            && self.commands.is_empty()
            && self.parameters.is_empty()
    }

    /// The explicit type id, or one derived from the canonical JSON form of
    /// this definition.
    pub fn type_id(&self) -> serde_json::Result<String> {
        match &self.type_id {
            Some(explicit) => Ok(explicit.clone()),
            None => Ok(content_type_id(&serde_json::to_string(self)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_includes_namespace() {
        let def = ComponentDefinition::new("SignalGen").with_namespace("Ref");
        assert_eq!(def.qualified_name(), "Ref::SignalGen");
        assert_eq!(ComponentDefinition::new("Bare").qualified_name(), "Bare");
    }

    #[test]
    fn explicit_type_id_wins() {
        let mut def = ComponentDefinition::new("A").with_event("E", "1");
        def.type_id = Some("0x1234ABCD".into());
        assert_eq!(def.type_id().unwrap(), "0x1234ABCD");
    }

    #[test]
    fn derived_type_id_tracks_content() {
        let a = ComponentDefinition::new("A").with_event("E", "1");
        let b = ComponentDefinition::new("A").with_event("E", "2");
        let id_a = a.type_id().unwrap();
        assert_eq!(id_a, a.clone().type_id().unwrap());
        assert_ne!(id_a, b.type_id().unwrap());
        assert!(id_a.starts_with("0x"));
        assert_eq!(id_a.len(), 10);
    }

    #[test]
    fn empty_definition() {
        assert!(ComponentDefinition::new("A").is_empty());
        assert!(!ComponentDefinition::new("A").with_command("C", "0").is_empty());
    }
}
