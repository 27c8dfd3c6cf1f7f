//! Base id allocation — merges fixed and floating candidates into one
//! non-overlapping layout.
//!
//! ## Algorithm
//!
//! ```text
//! fixed    = candidates with a base id, ascending by base id
//! floating = candidates without one,  ascending by window (stable)
//!
//! cursor = max(assembly_base_id, 1), prev_window = 0
//! while either stream has items:
//!     gap = cursor + prev_window
//!     only fixed left            → place fixed at its own base id
//!     only floating left         → place floating at gap
//!     gap + floating.window <= fixed.base_id
//!                                → place floating at gap
//!     otherwise                  → place fixed at its own base id
//!     cursor, prev_window = placed base id, placed window
//! ```
//!
//! Fixed candidates never move. Floating candidates take the earliest gap
//! reachable in processing order; the packing is greedy, not optimal.

use serde::Serialize;
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::resolve::{base_floor, AllocationCandidate};
use crate::Id;

/// A candidate with its final base id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub name: String,
    pub base_id: Id,
    pub window: Id,
    /// True if the base id came from the instance rather than the allocator.
    pub fixed: bool,
    #[serde(skip)]
    pub instance_index: usize,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_range: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_amount: Option<Id>,
}

impl Assignment {
    fn place(candidate: AllocationCandidate, base_id: Id) -> Self {
        Self {
            fixed: candidate.base_id.is_some(),
            name: candidate.name,
            base_id,
            window: candidate.window,
            instance_index: candidate.instance_index,
            type_name: candidate.type_name,
            required_range: candidate.required_range,
            required_amount: candidate.required_amount,
        }
    }

    /// First id past this assignment's window.
    #[inline]
    pub fn end(&self) -> Option<Id> {
        self.base_id.checked_add(self.window)
    }

    /// Largest id declared by the instance's component.
    #[inline]
    pub fn largest_component_id(&self) -> Option<Id> {
        self.required_range.map(|r| r - 1)
    }
}

/// Final instance → (base id, window) table, in assignment order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocationResult {
    assignments: Vec<Assignment>,
}

impl AllocationResult {
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Assignment for an instance name.
    pub fn get(&self, name: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.name == name)
    }

    /// Ids actually available to the entry at `index`: the distance to the
    /// next base id. `None` for the last entry, whose span is unbounded.
    pub fn actual_window(&self, index: usize) -> Option<Id> {
        let current = self.assignments.get(index)?;
        let next = self.assignments.get(index + 1)?;
        Some(next.base_id.saturating_sub(current.base_id))
    }

    /// True if every entry ends at or before the next one starts.
    pub fn is_disjoint(&self) -> bool {
        self.assignments
            .windows(2)
            .all(|pair| pair[0].end().is_some_and(|end| pair[1].base_id >= end))
    }
}

impl<'a> IntoIterator for &'a AllocationResult {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.assignments.iter()
    }
}

/// Assign every candidate a base id.
///
/// Takes no assembly window: each candidate already carries the window the
/// [`Resolver`](crate::resolve::Resolver) chose for it.
///
/// Fails only when two fixed candidates overlap, or when a floating window
/// would run past the end of the id space.
pub fn allocate(
    assembly_base_id: Id,
    candidates: impl IntoIterator<Item = AllocationCandidate>,
) -> Result<AllocationResult> {
    let mut fixed: Vec<(Id, AllocationCandidate)> = Vec::new();
    let mut floating: Vec<AllocationCandidate> = Vec::new();
    for candidate in candidates {
        match candidate.base_id {
            Some(base_id) => fixed.push((base_id, candidate)),
            None => floating.push(candidate),
        }
    }

    fixed.sort_by_key(|(base_id, _)| *base_id);
    floating.sort_by_key(|c| c.window);
    check_fixed(&fixed)?;

    let mut assignments = Vec::with_capacity(fixed.len() + floating.len());
    let mut fixed = fixed.into_iter().peekable();
    let mut floating = floating.into_iter().peekable();

    let mut cursor = base_floor(assembly_base_id);
    let mut prev_window: Id = 0;

    loop {
        let gap = cursor.checked_add(prev_window);
        let take_floating = match (fixed.peek(), floating.peek()) {
            (None, None) => break,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (Some((base_id, _)), Some(next)) => gap
                .and_then(|g| g.checked_add(next.window))
                .is_some_and(|end| end <= *base_id),
        };

        let assignment = if take_floating {
            let Some(candidate) = floating.next() else {
                break;
            };
            let base_id = gap
                .filter(|g| g.checked_add(candidate.window).is_some())
                .ok_or_else(|| ModelError::IdSpaceOverflow {
                    instance: candidate.name.clone(),
                })?;
            Assignment::place(candidate, base_id)
        } else {
            let Some((base_id, candidate)) = fixed.next() else {
                break;
            };
            Assignment::place(candidate, base_id)
        };

        debug!(
            instance = %assignment.name,
            base_id = assignment.base_id,
            window = assignment.window,
            fixed = assignment.fixed,
            "assigned base ID"
        );
        cursor = assignment.base_id;
        prev_window = assignment.window;
        assignments.push(assignment);
    }

    Ok(AllocationResult { assignments })
}

/// Reject overlapping windows among fixed candidates, sorted by base id.
fn check_fixed(fixed: &[(Id, AllocationCandidate)]) -> Result<()> {
    for pair in fixed.windows(2) {
        let (prev_base, prev) = &pair[0];
        let (base, current) = &pair[1];
        match prev_base.checked_add(prev.window) {
            Some(end) if *base >= end => {}
            _ => {
                return Err(ModelError::BaseIdCollision {
                    instance: current.name.clone(),
                    base_id: *base,
                    window: current.window,
                    previous: prev.name.clone(),
                    previous_base_id: *prev_base,
                    previous_window: prev.window,
                });
            }
        }
    }
    Ok(())
}
