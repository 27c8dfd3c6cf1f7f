//! Model building: topology + component registry → resolved topology model.

use tracing::info;

use crate::allocate::{allocate, AllocationResult};
use crate::error::{Diagnostic, Result};
use crate::registry::ComponentRegistry;
use crate::report;
use crate::resolve::Resolver;
use crate::topology::{AssemblyDefaults, Topology};
use crate::Id;

/// Everything model building needs besides the topology itself.
///
/// Owned by the caller and passed by reference; nothing here is global.
#[derive(Debug)]
pub struct ModelContext {
    pub registry: ComponentRegistry,
    pub defaults: AssemblyDefaults,
    /// When false, instances keep no ids and no report is produced.
    pub generate_ids: bool,
}

impl Default for ModelContext {
    fn default() -> Self {
        Self::new(ComponentRegistry::default())
    }
}

impl ModelContext {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry,
            defaults: AssemblyDefaults::default(),
            generate_ids: true,
        }
    }

    pub fn with_defaults(mut self, defaults: AssemblyDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_generate_ids(mut self, generate_ids: bool) -> Self {
        self.generate_ids = generate_ids;
        self
    }

    /// Resolve and allocate every instance of `topology`.
    ///
    /// Any fatal error aborts the whole pass; on success the model carries the
    /// allocation, its report, and every non-fatal diagnostic.
    pub fn build(&self, topology: Topology) -> Result<TopologyModel> {
        let mut diagnostics = Vec::new();
        let (assembly_base_id, assembly_window) =
            topology.assembly(&self.defaults, &mut diagnostics);

        let (allocation, report) = if self.generate_ids {
            let resolver = Resolver::new(&self.registry, assembly_base_id, assembly_window);
            let candidates = topology
                .instances
                .iter()
                .enumerate()
                .map(|(i, inst)| resolver.resolve(i, inst, &mut diagnostics))
                .collect::<Result<Vec<_>>>()?;
            let allocation = allocate(assembly_base_id, candidates)?;
            let report = report::render(&allocation);
            (allocation, Some(report))
        } else {
            info!(topology = %topology.name, "id generation disabled");
            (AllocationResult::default(), None)
        };

        info!(
            topology = %topology.name,
            instances = topology.instances.len(),
            assigned = allocation.len(),
            diagnostics = diagnostics.len(),
            "built topology model"
        );

        Ok(TopologyModel {
            topology,
            assembly_base_id,
            assembly_window,
            allocation,
            report,
            diagnostics,
        })
    }
}

/// A topology with its ids resolved, ready for code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyModel {
    pub topology: Topology,
    pub assembly_base_id: Id,
    pub assembly_window: Id,
    pub allocation: AllocationResult,
    /// Rendered allocation report; `None` when ids were not generated.
    pub report: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TopologyModel {
    /// Final base id of an instance.
    pub fn base_id_of(&self, instance: &str) -> Option<Id> {
        self.allocation.get(instance).map(|a| a.base_id)
    }

    /// Diagnostics that point at likely configuration mistakes.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }
}
