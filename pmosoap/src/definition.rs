//! Modèle de définition du service, vu par le client
//!
//! Le client ne lit que l'espace de noms cible et l'existence des opérations.
//! Le chargement du WSDL vit ailleurs (crate `pmowsdl`).

use std::collections::BTreeSet;

/// Read-only view of a service description.
pub trait ServiceDefinition: Send + Sync {
    /// Namespace qualifying the operation element and its parameters.
    fn target_namespace(&self) -> &str;

    /// Whether the service defines `operation`.
    fn has_operation(&self, operation: &str) -> bool;
}

/// Hand-built service description.
#[derive(Debug, Clone, Default)]
pub struct StaticDefinition {
    target_namespace: String,
    operations: BTreeSet<String>,
}

impl StaticDefinition {
    pub fn new(target_namespace: impl Into<String>) -> Self {
        Self {
            target_namespace: target_namespace.into(),
            operations: BTreeSet::new(),
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operations.insert(operation.into());
        self
    }

    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(String::as_str)
    }
}

impl ServiceDefinition for StaticDefinition {
    fn target_namespace(&self) -> &str {
        &self.target_namespace
    }

    fn has_operation(&self, operation: &str) -> bool {
        self.operations.contains(operation)
    }
}
