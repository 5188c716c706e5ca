//! Declarative conditional field visibility for server-rendered forms.
//!
//! A [`RuleTable`] lists rules of the form "when source field S has one of
//! these values (or a number at least N), show target fields T1..Tn;
//! otherwise hide them and reset their inputs". Mounting the table on a
//! [`FormSurface`] evaluates every rule once, then re-evaluates on each
//! change event of a source field.
//!
//! ```
//! use condform::{FormState, MountOptions, RuleTableBuilder};
//!
//! let table = RuleTableBuilder::new()
//!     .rule("stationnement_presence", |r| {
//!         r.values(["True"]).target("stationnement_pmr").indent(1)
//!     })
//!     .compile()
//!     .unwrap();
//!
//! let form = FormState::builder()
//!     .field("stationnement_presence", |f| {
//!         f.null_boolean("stationnement_presence", None)
//!     })
//!     .field("stationnement_pmr", |f| f.null_boolean("stationnement_pmr", None))
//!     .build();
//!
//! let mut mounted = table.mount(form, MountOptions::new());
//! assert_eq!(mounted.surface().is_hidden("stationnement_pmr"), Some(true));
//!
//! mounted.choose("stationnement_presence", "True");
//! assert_eq!(mounted.surface().is_hidden("stationnement_pmr"), Some(false));
//! ```

pub mod builtin;
mod compile;
mod error;
mod mount;
pub mod parse;
#[cfg(feature = "binary-cache")]
pub mod serial;
mod types;

pub use error::CondformError;
pub use mount::{MountedForm, process_targets};
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use types::{
    CompileError, CompiledRule, Condition, FieldBuilder, FieldChange, FieldName, FormState,
    FormStateBuilder, FormSurface, HIDDEN_CLASS, Input, InputKind, InputSnapshot, MountOptions,
    Propagation, Rule, RuleBuilder, RuleTable, RuleTableBuilder, SectionBuilder, indent_class,
    read_value,
};
