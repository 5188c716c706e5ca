use thiserror::Error;

/// Errors detected while compiling a [`RuleTable`](super::RuleTable).
///
/// Rules have no names of their own, so they are identified by their position
/// in the table and their source field.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid field name '{name}' in rule #{rule} (source '{source_field}')")]
    InvalidFieldName {
        rule: usize,
        source_field: String,
        name: String,
    },

    #[error("rule #{rule} (source '{source_field}') has no targets")]
    NoTargets { rule: usize, source_field: String },

    #[error("rule #{rule} (source '{source_field}') sets both a value list and a minimum value")]
    ConflictingCondition { rule: usize, source_field: String },

    #[error("cyclic dependency detected: {}", path.join(" -> "))]
    CyclicDependency { path: Vec<String> },
}
