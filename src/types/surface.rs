/// Kinds of form inputs the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Radio,
    Checkbox,
    Text,
    Url,
    Date,
    Number,
    TextArea,
    Hidden,
    Other,
}

impl InputKind {
    /// Whether a reset empties this input's value.
    #[must_use]
    pub fn is_clearable(self) -> bool {
        matches!(
            self,
            InputKind::Text | InputKind::Url | InputKind::Date | InputKind::Number | InputKind::TextArea
        )
    }

    /// Whether the input carries a selection state rather than a typed value.
    #[must_use]
    pub fn is_checkable(self) -> bool {
        matches!(self, InputKind::Radio | InputKind::Checkbox)
    }
}

/// Read-only view of one input, as returned by [`FormSurface::inputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSnapshot {
    pub kind: InputKind,
    pub value: String,
    pub checked: bool,
}

/// A change event raised on an input group: the group's `name` and the value
/// carried by the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub name: String,
    pub value: String,
}

impl FieldChange {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The form the engine reads from and writes to.
///
/// Input groups are addressed by their `name` attribute (including any
/// formset prefix). Field containers are addressed by the bare field name
/// they carry as a `field-<name>` class. Visibility is applied to the
/// container's enclosing section, or to the container itself when it has no
/// section.
///
/// Every operation tolerates unknown names: lookups return nothing and
/// mutations do nothing.
pub trait FormSurface {
    /// All inputs named `name`, in document order.
    fn inputs(&self, name: &str) -> Vec<InputSnapshot>;

    /// Whether a container for `field` exists.
    fn has_field(&self, field: &str) -> bool;

    /// Remove `hidden` and, when `indent > 0`, add `indented<indent>`.
    fn show_field(&mut self, field: &str, indent: u8);

    /// Add `hidden`.
    fn hide_field(&mut self, field: &str);

    /// Reset the container's inputs: click the empty-valued radio, empty
    /// every text-like input and textarea. Returns the change events the
    /// radio click produced.
    fn clear_field(&mut self, field: &str) -> Vec<FieldChange>;

    /// Select the radio (or tick the checkbox) named `name` whose value is
    /// `value`. Returns `true` if the selection changed.
    fn check(&mut self, name: &str, value: &str) -> bool;

    /// Set the value of the first typed input named `name`. Returns `true` if
    /// the value changed.
    fn set_value(&mut self, name: &str, value: &str) -> bool;
}

impl<S: FormSurface + ?Sized> FormSurface for &mut S {
    fn inputs(&self, name: &str) -> Vec<InputSnapshot> {
        (**self).inputs(name)
    }

    fn has_field(&self, field: &str) -> bool {
        (**self).has_field(field)
    }

    fn show_field(&mut self, field: &str, indent: u8) {
        (**self).show_field(field, indent);
    }

    fn hide_field(&mut self, field: &str) {
        (**self).hide_field(field);
    }

    fn clear_field(&mut self, field: &str) -> Vec<FieldChange> {
        (**self).clear_field(field)
    }

    fn check(&mut self, name: &str, value: &str) -> bool {
        (**self).check(name, value)
    }

    fn set_value(&mut self, name: &str, value: &str) -> bool {
        (**self).set_value(name, value)
    }
}

/// Read the current value of the input group `name`.
///
/// Returns `None` when no input has that name, or when none of them is
/// checked or numeric. Otherwise returns the value of the first input that is
/// checked or is a number input.
pub fn read_value<S: FormSurface + ?Sized>(surface: &S, name: &str) -> Option<String> {
    surface
        .inputs(name)
        .into_iter()
        .find(|input| input.checked || input.kind == InputKind::Number)
        .map(|input| input.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormState;

    #[test]
    fn read_value_missing_group() {
        let form = FormState::builder().build();
        assert_eq!(read_value(&form, "entree_pmr"), None);
    }

    #[test]
    fn read_value_checked_radio() {
        let form = FormState::builder()
            .field("entree_pmr", |f| f.null_boolean("entree_pmr", Some("False")))
            .build();
        assert_eq!(read_value(&form, "entree_pmr").as_deref(), Some("False"));
    }

    #[test]
    fn read_value_nothing_checked() {
        let form = FormState::builder()
            .field("entree_pmr", |f| f.radios("entree_pmr", ["True", "False"], None))
            .build();
        assert_eq!(read_value(&form, "entree_pmr"), None);
    }

    #[test]
    fn read_value_number_input() {
        let form = FormState::builder()
            .field("nombre", |f| f.number("nombre", "3"))
            .build();
        assert_eq!(read_value(&form, "nombre").as_deref(), Some("3"));
    }

    #[test]
    fn read_value_ignores_unchecked_text() {
        let form = FormState::builder()
            .field("commentaire", |f| f.text("commentaire", "hello"))
            .build();
        assert_eq!(read_value(&form, "commentaire"), None);
    }

    #[test]
    fn clearable_kinds() {
        assert!(InputKind::Text.is_clearable());
        assert!(InputKind::TextArea.is_clearable());
        assert!(InputKind::Number.is_clearable());
        assert!(!InputKind::Radio.is_clearable());
        assert!(!InputKind::Hidden.is_clearable());
        assert!(!InputKind::Checkbox.is_clearable());
    }
}
