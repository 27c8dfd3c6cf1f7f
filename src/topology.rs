//! Topology description: instances of component types plus assembly-wide defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Diagnostic;
use crate::Id;

/// One instantiated component.
///
/// `base_id` and `window` keep their raw text; they are interpreted by the
/// [`resolve`](crate::resolve) pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    /// Component type name, bare or `Ns::Type`.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
}

impl Instance {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            base_id: None,
            window: None,
        }
    }

    pub fn with_base_id(mut self, base_id: impl Into<String>) -> Self {
        self.base_id = Some(base_id.into());
        self
    }

    pub fn with_window(mut self, window: impl Into<String>) -> Self {
        self.window = Some(window.into());
        self
    }
}

/// An assembly of instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Assembly base id; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_id: Option<Id>,
    /// Assembly window; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<Id>,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

impl Topology {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_base_id(mut self, base_id: Id) -> Self {
        self.base_id = Some(base_id);
        self
    }

    pub fn with_window(mut self, window: Id) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instances.push(instance);
        self
    }

    /// Find an instance by name.
    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.name == name)
    }

    /// Assembly base id and window, falling back to `defaults` for missing values.
    ///
    /// Each fallback is recorded in `diagnostics`.
    pub fn assembly(
        &self,
        defaults: &AssemblyDefaults,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (Id, Id) {
        let base_id = self.base_id.unwrap_or_else(|| {
            warn!(base_id = defaults.base_id, "no assembly base ID set, using default");
            diagnostics.push(Diagnostic::AssemblyDefaultApplied {
                field: "base ID",
                value: defaults.base_id,
            });
            defaults.base_id
        });
        let window = self.window.unwrap_or_else(|| {
            warn!(window = defaults.window, "no assembly window set, using default");
            diagnostics.push(Diagnostic::AssemblyDefaultApplied {
                field: "window",
                value: defaults.window,
            });
            defaults.window
        });
        (base_id, window)
    }
}

/// Assembly values used when a topology does not set its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyDefaults {
    pub base_id: Id,
    pub window: Id,
}

impl AssemblyDefaults {
    pub const DEFAULT_BASE_ID: Id = 0x100;
    pub const DEFAULT_WINDOW: Id = 20;
}

impl Default for AssemblyDefaults {
    fn default() -> Self {
        Self {
            base_id: Self::DEFAULT_BASE_ID,
            window: Self::DEFAULT_WINDOW,
        }
    }
}
