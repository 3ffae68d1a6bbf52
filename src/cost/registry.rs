use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{CostFunctional, Shannon, ThresholdCount};

/// Metadata describing a registered cost functional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostInfo {
    /// Lookup name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

struct CostEntry {
    cost: Arc<dyn CostFunctional>,
    description: String,
}

/// Registry of named cost functionals.
#[derive(Default)]
pub struct CostRegistry {
    entries: HashMap<String, CostEntry>,
}

impl CostRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry holding `shannon` and `threshold` (with the given threshold).
    pub fn with_defaults(threshold: f64) -> Self {
        let mut registry = Self::new();
        registry.register(Shannon, "Shannon-type entropy -sum c^2 log2|c|");
        registry.register(
            ThresholdCount::new(threshold),
            format!("number of coefficients with |c| > {threshold}"),
        );
        registry
    }

    /// Register a cost functional under its own name and return a shared
    /// handle to it. A previous entry with the same name is replaced.
    pub fn register<C>(&mut self, cost: C, description: impl Into<String>) -> Arc<dyn CostFunctional>
    where
        C: CostFunctional + 'static,
    {
        let name = cost.name().to_string();
        self.register_as(name, cost, description)
    }

    /// Register a cost functional under an explicit name (closures all
    /// report the same default name).
    pub fn register_as<C>(
        &mut self,
        name: impl Into<String>,
        cost: C,
        description: impl Into<String>,
    ) -> Arc<dyn CostFunctional>
    where
        C: CostFunctional + 'static,
    {
        let arc: Arc<dyn CostFunctional> = Arc::new(cost);
        self.entries.insert(
            name.into(),
            CostEntry {
                cost: Arc::clone(&arc),
                description: description.into(),
            },
        );
        arc
    }

    /// Retrieve a cost functional by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CostFunctional>> {
        self.entries.get(name).map(|entry| Arc::clone(&entry.cost))
    }

    /// List all registered cost functionals, sorted by name.
    pub fn list(&self) -> Vec<CostInfo> {
        let mut infos: Vec<CostInfo> = self
            .entries
            .iter()
            .map(|(name, entry)| CostInfo {
                name: name.clone(),
                description: entry.description.clone(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

impl fmt::Debug for CostRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("CostRegistry").field("entries", &names).finish()
    }
}
