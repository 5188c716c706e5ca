/// How far a change on a source field propagates to dependent rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Re-evaluate the rule listening on the changed field, then the rules
    /// whose source is one of its targets. Grandchildren are only updated
    /// through their own source's change events.
    #[default]
    Shallow,
    /// Re-evaluate every rule reachable through the target graph, each at
    /// most once per change.
    Transitive,
}

/// Per-mount configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountOptions {
    input_prefix: String,
    propagation: Propagation,
}

impl MountOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix prepended to a rule's source when looking up its inputs, for
    /// forms rendered inside a formset (e.g. `accessibilite-0-`). Container
    /// lookups use the bare field name.
    #[must_use]
    pub fn with_input_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.input_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_propagation(mut self, propagation: Propagation) -> Self {
        self.propagation = propagation;
        self
    }

    #[must_use]
    pub fn input_prefix(&self) -> &str {
        &self.input_prefix
    }

    #[must_use]
    pub fn propagation(&self) -> Propagation {
        self.propagation
    }

    /// The input `name` attribute for a field.
    #[must_use]
    pub fn input_name(&self, field: &str) -> String {
        format!("{}{field}", self.input_prefix)
    }
}
