mod condition;
mod error;
mod field_name;
mod form_state;
mod options;
mod rule;
mod surface;
mod table;

pub use condition::Condition;
pub use error::CompileError;
pub use field_name::FieldName;
pub use form_state::{
    FieldBuilder, FormState, FormStateBuilder, HIDDEN_CLASS, Input, SectionBuilder, indent_class,
};
pub use options::{MountOptions, Propagation};
pub use rule::{CompiledRule, Rule};
pub use surface::{FieldChange, FormSurface, InputKind, InputSnapshot, read_value};
pub use table::{RuleBuilder, RuleTable, RuleTableBuilder};
