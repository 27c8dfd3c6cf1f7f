//! Fatal errors and non-fatal diagnostics raised while building a topology model.

use std::fmt;

use thiserror::Error;

use crate::Id;

/// Which namespace of a component an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Event,
    Channel,
    Command,
    Parameter,
    ParameterSetOpcode,
    ParameterSaveOpcode,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Event => "event",
            Self::Channel => "channel",
            Self::Command => "command",
            Self::Parameter => "parameter",
            Self::ParameterSetOpcode => "parameter set opcode",
            Self::ParameterSaveOpcode => "parameter save opcode",
        };
        f.write_str(s)
    }
}

/// Errors that abort model building.
///
/// Every variant is raised before any artifact leaves the core, so a caller
/// holding an `Err` never has a partial model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A literal is neither decimal nor hexadecimal.
    #[error("invalid numeric literal '{literal}' in {origin}")]
    InvalidNumericLiteral {
        literal: String,
        /// Where the literal came from (instance or component item).
        origin: String,
    },

    /// Two items of one component share an identifier.
    #[error(
        "IdCollisionError: {kind} {id} of '{entity}' in component {component} collides with {conflicts_with}"
    )]
    IntraComponentIdCollision {
        component: String,
        kind: IdKind,
        id: Id,
        entity: String,
        conflicts_with: String,
    },

    /// Two explicitly placed instances have overlapping windows.
    #[error(
        "component {instance} has a base ID {base_id} (window {window}) which collides with the allocated IDs for component {previous} (base ID {previous_base_id}, window {previous_window})"
    )]
    BaseIdCollision {
        instance: String,
        base_id: Id,
        window: Id,
        previous: String,
        previous_base_id: Id,
        previous_window: Id,
    },

    /// Placing an instance would run past the end of the id space.
    #[error("id space exhausted while placing instance {instance}")]
    IdSpaceOverflow { instance: String },

    /// A component type name was registered twice.
    #[error("component type {name} is defined more than once")]
    DuplicateComponent { name: String },
}

impl ModelError {
    pub(crate) fn invalid_literal(literal: &str, origin: impl Into<String>) -> Self {
        Self::InvalidNumericLiteral {
            literal: literal.to_string(),
            origin: origin.into(),
        }
    }
}

/// Result type for model building.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Non-fatal findings collected while building a model.
///
/// None of these change the produced layout; they are surfaced so callers
/// can display them next to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An instance names a component type that was never imported.
    MissingComponentReference { instance: String, type_name: String },
    /// A resolved window is smaller than the component's required range.
    UndersizedWindow {
        instance: String,
        window: Id,
        required_range: Id,
    },
    /// The topology omitted an assembly value and the configured default was used.
    AssemblyDefaultApplied { field: &'static str, value: Id },
    /// An explicit base id below the assembly floor was treated as an offset.
    BaseIdOffsetApplied {
        instance: String,
        requested: Id,
        resolved: Id,
    },
}

impl Diagnostic {
    /// True for diagnostics that point at a likely configuration mistake.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::MissingComponentReference { .. } | Self::UndersizedWindow { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingComponentReference {
                instance,
                type_name,
            } => write!(
                f,
                "component type {type_name} of instance {instance} was not imported by the topology"
            ),
            Self::UndersizedWindow {
                instance,
                window,
                required_range,
            } => write!(
                f,
                "window for instance {instance} is {window}, smaller than the calculated range of {required_range}"
            ),
            Self::AssemblyDefaultApplied { field, value } => {
                write!(f, "no assembly {field} set, defaulting to {value}")
            }
            Self::BaseIdOffsetApplied {
                instance,
                requested,
                resolved,
            } => write!(
                f,
                "instance {instance} base ID {requested} is below the assembly base ID, using {resolved}"
            ),
        }
    }
}
