//! Component registry — lookup and memoized analysis for component types.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use tracing::warn;

use crate::analyze::{analyze, ComponentAnalysis};
use crate::component::ComponentDefinition;
use crate::error::{ModelError, Result};

/// Registry of parsed component definitions.
///
/// Provides:
/// - Lookup by qualified name (`Ns::Type`) or bare type name
/// - At-most-once analysis per type, safe under concurrent callers
///
/// A bare name that two namespaces both define is ambiguous and only
/// reachable through the qualified name.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    definitions: Vec<ComponentDefinition>,
    qualified_to_idx: HashMap<String, usize>,
    name_to_idx: HashMap<String, usize>,
    ambiguous: HashSet<String>,
    analyses: Mutex<HashMap<usize, Result<ComponentAnalysis>>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from definitions, rejecting duplicate qualified names.
    pub fn build(defs: impl IntoIterator<Item = ComponentDefinition>) -> Result<Self> {
        let mut registry = Self::new();
        for def in defs {
            registry.register(def)?;
        }
        Ok(registry)
    }

    /// Register one definition.
    pub fn register(&mut self, def: ComponentDefinition) -> Result<()> {
        let qualified = def.qualified_name();
        if self.qualified_to_idx.contains_key(&qualified) {
            return Err(ModelError::DuplicateComponent { name: qualified });
        }

        let idx = self.definitions.len();
        if qualified != def.name {
            if self.ambiguous.contains(&def.name) {
                // stays ambiguous
            } else if let Some(&other) = self.name_to_idx.get(&def.name) {
                warn!(
                    name = %def.name,
                    first = %self.definitions[other].qualified_name(),
                    second = %qualified,
                    "component type name is ambiguous, use the qualified name"
                );
                self.name_to_idx.remove(&def.name);
                self.ambiguous.insert(def.name.clone());
            } else {
                self.name_to_idx.insert(def.name.clone(), idx);
            }
        }
        self.qualified_to_idx.insert(qualified, idx);
        self.definitions.push(def);
        Ok(())
    }

    fn index_of(&self, type_name: &str) -> Option<usize> {
        self.qualified_to_idx
            .get(type_name)
            .or_else(|| self.name_to_idx.get(type_name))
            .copied()
    }

    /// Type name → definition
    #[inline]
    pub fn get(&self, type_name: &str) -> Option<&ComponentDefinition> {
        self.index_of(type_name).map(|i| &self.definitions[i])
    }

    #[inline]
    pub fn contains(&self, type_name: &str) -> bool {
        self.index_of(type_name).is_some()
    }

    /// Analysis of the named type, computed on first request.
    ///
    /// Returns `Ok(None)` for an unknown type. A failed analysis is memoized
    /// and returned again on every later request.
    pub fn analysis(&self, type_name: &str) -> Result<Option<ComponentAnalysis>> {
        let Some(idx) = self.index_of(type_name) else {
            return Ok(None);
        };
        // The lock is held across `analyze` so concurrent callers never
        // analyze the same type twice.
        let mut analyses = self.analyses.lock();
        analyses
            .entry(idx)
            .or_insert_with(|| analyze(&self.definitions[idx]))
            .clone()
            .map(Some)
    }

    /// Analyze every registered type, stopping at the first fatal collision.
    pub fn warm_up(&self) -> Result<()> {
        for def in &self.definitions {
            self.analysis(&def.qualified_name())?;
        }
        Ok(())
    }

    /// Number of types analyzed so far.
    pub fn analyzed_len(&self) -> usize {
        self.analyses.lock().len()
    }

    /// Total number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// All definitions in registration order.
    pub fn definitions(&self) -> &[ComponentDefinition] {
        &self.definitions
    }
}
