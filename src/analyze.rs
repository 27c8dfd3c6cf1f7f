//! ID range analysis for a single component type.
//!
//! Walks the declared items once, in declaration order, and:
//!
//! 1. Rejects duplicate ids inside each namespace. Events and channels have
//!    their own namespaces; parameters have their own id namespace; commands
//!    share the opcode namespace with every parameter's set and save opcode.
//! 2. Records the highest id seen anywhere, giving the required range
//!    (`highest + 1`).
//! 3. Computes the worst-case number of ids in use at once.

use std::collections::HashMap;

use tracing::debug;

use crate::component::ComponentDefinition;
use crate::error::{IdKind, ModelError, Result};
use crate::literal::parse_id;
use crate::Id;

/// Result of analyzing one component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentAnalysis {
    /// One plus the largest id or opcode declared. `None` for a component
    /// without items, or one that could not be resolved.
    pub required_range: Option<Id>,
    /// Most ids the component can consume at once. `None` only when the
    /// component could not be resolved.
    pub required_amount: Option<Id>,
}

impl ComponentAnalysis {
    /// Analysis for an instance whose component type is unknown.
    pub const UNRESOLVED: Self = Self {
        required_range: None,
        required_amount: None,
    };
}

/// Analyze a component definition.
///
/// Pure: the same definition always yields the same analysis or the same error.
pub fn analyze(def: &ComponentDefinition) -> Result<ComponentAnalysis> {
    let component = def.qualified_name();
    let mut scan = Scan::new(&component);

    let mut events = Namespace::default();
    for event in &def.events {
        let id = scan.id(&event.id, IdKind::Event, &event.name)?;
        events.claim(&component, IdKind::Event, id, &event.name)?;
    }

    let mut channels = Namespace::default();
    for channel in &def.channels {
        let id = scan.id(&channel.id, IdKind::Channel, &channel.name)?;
        channels.claim(&component, IdKind::Channel, id, &channel.name)?;
    }

    let mut opcodes = Namespace::default();
    for command in &def.commands {
        let id = scan.id(&command.opcode, IdKind::Command, &command.name)?;
        opcodes.claim(&component, IdKind::Command, id, &command.name)?;
    }

    let mut parameters = Namespace::default();
    for param in &def.parameters {
        let id = scan.id(&param.id, IdKind::Parameter, &param.name)?;
        parameters.claim(&component, IdKind::Parameter, id, &param.name)?;

        let set = scan.id(&param.set_opcode, IdKind::ParameterSetOpcode, &param.name)?;
        opcodes.claim(&component, IdKind::ParameterSetOpcode, set, &param.name)?;

        let save = scan.id(&param.save_opcode, IdKind::ParameterSaveOpcode, &param.name)?;
        opcodes.claim(&component, IdKind::ParameterSaveOpcode, save, &param.name)?;
    }

    let analysis = ComponentAnalysis {
        required_range: scan.highest.map(|h| h + 1),
        required_amount: Some(required_amount(def)),
    };
    debug!(
        component = %component,
        required_range = ?analysis.required_range,
        required_amount = ?analysis.required_amount,
        "analyzed component"
    );
    Ok(analysis)
}

/// Worst-case simultaneous id consumption across the four namespaces.
///
/// Each parameter publishes a channel-like update for both its set and save
/// path, hence `channels + 2 * parameters`.
pub fn required_amount(def: &ComponentDefinition) -> Id {
    let events = def.events.len();
    let channels = def.channels.len() + 2 * def.parameters.len();
    let commands = def.commands.len();
    let parameters = def.parameters.len();
    events.max(channels).max(commands).max(parameters) as Id
}

/// Running state shared by every namespace: literal parsing and the high-water mark.
struct Scan<'a> {
    component: &'a str,
    highest: Option<Id>,
}

impl<'a> Scan<'a> {
    fn new(component: &'a str) -> Self {
        Self {
            component,
            highest: None,
        }
    }

    fn id(&mut self, literal: &str, kind: IdKind, entity: &str) -> Result<Id> {
        let id = parse_id(literal).ok_or_else(|| {
            ModelError::invalid_literal(
                literal,
                format!("{kind} '{entity}' of component {}", self.component),
            )
        })?;
        self.highest = Some(self.highest.map_or(id, |h| h.max(id)));
        Ok(id)
    }
}

/// Ids already taken in one namespace, with the item that took them.
#[derive(Default)]
struct Namespace<'a> {
    taken: HashMap<Id, (IdKind, &'a str)>,
}

impl<'a> Namespace<'a> {
    fn claim(&mut self, component: &str, kind: IdKind, id: Id, entity: &'a str) -> Result<()> {
        if let Some((prev_kind, prev_entity)) = self.taken.get(&id) {
            return Err(ModelError::IntraComponentIdCollision {
                component: component.to_string(),
                kind,
                id,
                entity: entity.to_string(),
                conflicts_with: format!("{prev_kind} '{prev_entity}'"),
            });
        }
        self.taken.insert(id, (kind, entity));
        Ok(())
    }
}
