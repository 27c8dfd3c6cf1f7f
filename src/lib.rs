//! # Topology ID allocation (topo-ids)
//!
//! Turns a component/topology description into a resolved model in which every
//! component instance owns a collision-free window of numeric ids. Events,
//! telemetry channels, commands and parameters of an instance derive their
//! wire-level ids from that window's base id.
//!
//! ## Pipeline
//!
//! ```text
//! ComponentDefinition ──analyze──▶ ComponentAnalysis (required range / amount)
//!                                        │
//! Topology.instances ──resolve──▶ AllocationCandidate (fixed or floating)
//!                                        │
//!                      allocate ──▶ AllocationResult ──render──▶ report
//! ```
//!
//! ## Guarantees
//!
//! - Explicit base ids are never moved.
//! - No two windows in an [`AllocationResult`] overlap.
//! - Id collisions inside a component and overlapping explicit windows are
//!   fatal; unknown component types and undersized windows are only reported.
//!
//! ```ignore
//! use topo_ids::{ComponentDefinition, ComponentRegistry, Instance, ModelContext, Topology};
//!
//! let registry = ComponentRegistry::build([
//!     ComponentDefinition::new("SignalGen").with_event("SETTING_CHANGED", "0x0"),
//! ])?;
//! let topology = Topology::new("Ref")
//!     .with_base_id(0x100)
//!     .with_window(20)
//!     .with_instance(Instance::new("sigGen", "SignalGen"));
//!
//! let model = ModelContext::new(registry).build(topology)?;
//! assert_eq!(model.base_id_of("sigGen"), Some(0x100));
//! ```

pub mod allocate;
pub mod analyze;
pub mod component;
pub mod error;
pub mod literal;
pub mod model;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod topology;
pub mod type_id;

pub use allocate::{allocate, AllocationResult, Assignment};
pub use analyze::{analyze, ComponentAnalysis};
pub use component::{Channel, Command, ComponentDefinition, Event, Parameter};
pub use error::{Diagnostic, IdKind, ModelError, Result};
pub use literal::{clamp_non_negative, parse_assembly_base, parse_id, parse_int, parse_magnitude};
pub use model::{ModelContext, TopologyModel};
pub use registry::ComponentRegistry;
pub use report::{render, AllocationReport};
pub use resolve::{AllocationCandidate, Resolver};
pub use topology::{AssemblyDefaults, Instance, Topology};
pub use type_id::content_type_id;

/// A numeric id, opcode, base id or window size.
pub type Id = u64;
