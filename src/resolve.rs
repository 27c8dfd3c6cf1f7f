//! Instance resolution: turns one topology instance into an allocation candidate.
//!
//! Base id:
//! 1. No explicit base id: left open for the allocator.
//! 2. Explicit base id at or above the assembly floor: used as-is.
//! 3. Explicit base id below the floor: treated as an offset from the floor.
//!
//! Window, first match wins:
//! 1. Explicit instance window.
//! 2. Assembly window, when larger than the component's required range.
//! 3. The component's required range.
//!
//! A window below the required range is reported but kept.

use tracing::{info, warn};

use crate::analyze::ComponentAnalysis;
use crate::error::{Diagnostic, ModelError, Result};
use crate::literal::parse_magnitude;
use crate::registry::ComponentRegistry;
use crate::topology::Instance;
use crate::Id;

/// An instance with its base id (if fixed) and window decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationCandidate {
    pub name: String,
    /// `Some` for explicitly placed instances, `None` for floating ones.
    pub base_id: Option<Id>,
    pub window: Id,
    /// Position of the source instance in the topology.
    pub instance_index: usize,
    pub type_name: String,
    pub required_range: Option<Id>,
    pub required_amount: Option<Id>,
}

impl AllocationCandidate {
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.base_id.is_some()
    }
}

/// Lowest base id an assembly can hand out. Non-positive values clamp to 1.
#[inline]
pub fn base_floor(assembly_base_id: Id) -> Id {
    assembly_base_id.max(1)
}

/// Resolves instances against a registry and the assembly values.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a ComponentRegistry,
    floor: Id,
    assembly_window: Id,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a ComponentRegistry, assembly_base_id: Id, assembly_window: Id) -> Self {
        Self {
            registry,
            floor: base_floor(assembly_base_id),
            assembly_window,
        }
    }

    /// Resolve one instance. Non-fatal findings are appended to `diagnostics`.
    pub fn resolve(
        &self,
        instance_index: usize,
        inst: &Instance,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<AllocationCandidate> {
        let analysis = match self.registry.analysis(&inst.type_name)? {
            Some(analysis) => analysis,
            None => {
                warn!(
                    instance = %inst.name,
                    type_name = %inst.type_name,
                    "component type was not imported by the topology"
                );
                diagnostics.push(Diagnostic::MissingComponentReference {
                    instance: inst.name.clone(),
                    type_name: inst.type_name.clone(),
                });
                ComponentAnalysis::UNRESOLVED
            }
        };

        let base_id = self.resolve_base_id(inst, diagnostics)?;
        let window = self.resolve_window(inst, analysis.required_range)?;

        if let Some(required) = analysis.required_range
            && window < required
        {
            warn!(
                instance = %inst.name,
                window,
                required_range = required,
                "window is smaller than the calculated range, check the instance definition"
            );
            diagnostics.push(Diagnostic::UndersizedWindow {
                instance: inst.name.clone(),
                window,
                required_range: required,
            });
        }

        Ok(AllocationCandidate {
            name: inst.name.clone(),
            base_id,
            window,
            instance_index,
            type_name: inst.type_name.clone(),
            required_range: analysis.required_range,
            required_amount: analysis.required_amount,
        })
    }

    fn resolve_base_id(
        &self,
        inst: &Instance,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Option<Id>> {
        let Some(literal) = inst.base_id.as_deref() else {
            return Ok(None);
        };
        let requested = parse_magnitude(literal).ok_or_else(|| {
            ModelError::invalid_literal(literal, format!("base ID of instance {}", inst.name))
        })?;

        if self.floor > requested {
            let resolved =
                self.floor
                    .checked_add(requested)
                    .ok_or_else(|| ModelError::IdSpaceOverflow {
                        instance: inst.name.clone(),
                    })?;
            info!(
                instance = %inst.name,
                requested,
                resolved,
                "base ID is below the assembly base ID, adding the two"
            );
            diagnostics.push(Diagnostic::BaseIdOffsetApplied {
                instance: inst.name.clone(),
                requested,
                resolved,
            });
            Ok(Some(resolved))
        } else {
            info!(instance = %inst.name, base_id = requested, "using instance base ID");
            Ok(Some(requested))
        }
    }

    fn resolve_window(&self, inst: &Instance, required_range: Option<Id>) -> Result<Id> {
        if let Some(literal) = inst.window.as_deref() {
            let window = parse_magnitude(literal).ok_or_else(|| {
                ModelError::invalid_literal(literal, format!("window of instance {}", inst.name))
            })?;
            info!(instance = %inst.name, window, "using instance window");
            return Ok(window);
        }

        match required_range {
            Some(required) if required >= self.assembly_window => {
                info!(instance = %inst.name, window = required, "using window calculated from the component");
                Ok(required)
            }
            _ => {
                info!(instance = %inst.name, window = self.assembly_window, "using assembly window");
                Ok(self.assembly_window)
            }
        }
    }
}
