use std::collections::BTreeSet;

use super::surface::{FieldChange, FormSurface, InputKind, InputSnapshot};

/// Class toggled on a section to hide it.
pub const HIDDEN_CLASS: &str = "hidden";

/// The class applied to a shown section for the given indent level.
#[must_use]
pub fn indent_class(indent: u8) -> String {
    format!("indented{indent}")
}

/// One input element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub name: String,
    pub kind: InputKind,
    pub value: String,
    pub checked: bool,
}

#[derive(Debug, Clone, Default)]
struct Section {
    classes: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct Container {
    field: String,
    classes: BTreeSet<String>,
    section: Option<usize>,
    inputs: Vec<Input>,
}

/// In-memory form model implementing [`FormSurface`].
///
/// A form is a list of field containers in document order. Each container
/// carries the `field-<name>` identity, its own classes and inputs, and
/// optionally belongs to a section. Sections own the `hidden` and
/// `indented<N>` classes for all their containers; a container outside any
/// section carries them itself.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    sections: Vec<Section>,
    containers: Vec<Container>,
}

impl FormState {
    #[must_use]
    pub fn builder() -> FormStateBuilder {
        FormStateBuilder::default()
    }

    /// Field names of all containers, in document order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(|c| c.field.as_str())
    }

    /// Whether the element controlling `field`'s visibility carries `hidden`.
    /// `None` if the form has no container for `field`.
    #[must_use]
    pub fn is_hidden(&self, field: &str) -> Option<bool> {
        self.has_class(field, HIDDEN_CLASS)
    }

    /// Whether the element controlling `field`'s visibility carries `class`.
    #[must_use]
    pub fn has_class(&self, field: &str, class: &str) -> Option<bool> {
        let idx = self.container_index(field)?;
        Some(self.visibility_classes(idx).contains(class))
    }

    /// Classes of the element controlling `field`'s visibility, sorted.
    #[must_use]
    pub fn classes(&self, field: &str) -> Option<Vec<&str>> {
        let idx = self.container_index(field)?;
        Some(self.visibility_classes(idx).iter().map(String::as_str).collect())
    }

    /// The inputs inside `field`'s container.
    #[must_use]
    pub fn field_inputs(&self, field: &str) -> Option<&[Input]> {
        let idx = self.container_index(field)?;
        Some(&self.containers[idx].inputs)
    }

    /// Value of the first typed (non radio/checkbox) input named `name`.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.all_inputs()
            .find(|i| i.name == name && !i.kind.is_checkable())
            .map(|i| i.value.as_str())
    }

    /// Value of the checked radio named `name`.
    #[must_use]
    pub fn checked_value(&self, name: &str) -> Option<&str> {
        self.all_inputs()
            .find(|i| i.name == name && i.kind == InputKind::Radio && i.checked)
            .map(|i| i.value.as_str())
    }

    fn container_index(&self, field: &str) -> Option<usize> {
        self.containers.iter().position(|c| c.field == field)
    }

    fn visibility_classes(&self, idx: usize) -> &BTreeSet<String> {
        let container = &self.containers[idx];
        match container.section.and_then(|s| self.sections.get(s)) {
            Some(section) => &section.classes,
            None => &container.classes,
        }
    }

    fn visibility_classes_mut(&mut self, idx: usize) -> &mut BTreeSet<String> {
        let section = self.containers[idx].section;
        match section {
            Some(s) if s < self.sections.len() => &mut self.sections[s].classes,
            _ => &mut self.containers[idx].classes,
        }
    }

    fn all_inputs(&self) -> impl Iterator<Item = &Input> {
        self.containers.iter().flat_map(|c| c.inputs.iter())
    }

    fn all_inputs_mut(&mut self) -> impl Iterator<Item = &mut Input> {
        self.containers.iter_mut().flat_map(|c| c.inputs.iter_mut())
    }

    /// Check the radio `name=value` and uncheck the rest of its group.
    fn select_radio(&mut self, name: &str, value: &str) -> bool {
        let mut exists = false;
        for input in self.all_inputs() {
            if input.kind == InputKind::Radio && input.name == name && input.value == value {
                if input.checked {
                    return false;
                }
                exists = true;
            }
        }
        if !exists {
            return false;
        }
        let mut selected = false;
        for input in self.all_inputs_mut() {
            if input.kind == InputKind::Radio && input.name == name {
                input.checked = !selected && input.value == value;
                selected |= input.checked;
            }
        }
        true
    }
}

impl FormSurface for FormState {
    fn inputs(&self, name: &str) -> Vec<InputSnapshot> {
        self.all_inputs()
            .filter(|i| i.name == name)
            .map(|i| InputSnapshot {
                kind: i.kind,
                value: i.value.clone(),
                checked: i.checked,
            })
            .collect()
    }

    fn has_field(&self, field: &str) -> bool {
        self.container_index(field).is_some()
    }

    fn show_field(&mut self, field: &str, indent: u8) {
        let Some(idx) = self.container_index(field) else {
            return;
        };
        let classes = self.visibility_classes_mut(idx);
        classes.remove(HIDDEN_CLASS);
        if indent > 0 {
            classes.insert(indent_class(indent));
        }
    }

    fn hide_field(&mut self, field: &str) {
        let Some(idx) = self.container_index(field) else {
            return;
        };
        self.visibility_classes_mut(idx).insert(HIDDEN_CLASS.to_owned());
    }

    fn clear_field(&mut self, field: &str) -> Vec<FieldChange> {
        let Some(idx) = self.container_index(field) else {
            return Vec::new();
        };
        let mut changes = Vec::new();

        let empty_radio = self.containers[idx]
            .inputs
            .iter()
            .find(|i| i.kind == InputKind::Radio && i.value.is_empty())
            .map(|i| i.name.clone());
        if let Some(name) = empty_radio {
            if self.select_radio(&name, "") {
                changes.push(FieldChange::new(name, ""));
            }
        }

        for input in &mut self.containers[idx].inputs {
            if input.kind.is_clearable() {
                input.value.clear();
            }
        }
        changes
    }

    fn check(&mut self, name: &str, value: &str) -> bool {
        let checkbox = self
            .all_inputs_mut()
            .find(|i| i.kind == InputKind::Checkbox && i.name == name && i.value == value);
        if let Some(input) = checkbox {
            if input.checked {
                return false;
            }
            input.checked = true;
            return true;
        }
        self.select_radio(name, value)
    }

    fn set_value(&mut self, name: &str, value: &str) -> bool {
        let Some(input) = self
            .all_inputs_mut()
            .find(|i| i.name == name && !i.kind.is_checkable())
        else {
            return false;
        };
        if input.value == value {
            return false;
        }
        value.clone_into(&mut input.value);
        true
    }
}

/// Builder for [`FormState`].
///
/// # Example
///
/// ```
/// use condform::FormState;
///
/// let form = FormState::builder()
///     .field("stationnement_presence", |f| {
///         f.null_boolean("stationnement_presence", None)
///     })
///     .section(|s| {
///         s.hidden()
///             .field("stationnement_pmr", |f| f.null_boolean("stationnement_pmr", None))
///     })
///     .build();
///
/// assert_eq!(form.is_hidden("stationnement_pmr"), Some(true));
/// ```
#[derive(Debug, Default)]
pub struct FormStateBuilder {
    state: FormState,
}

impl FormStateBuilder {
    /// Add a section and the field containers it holds.
    #[must_use]
    pub fn section(mut self, f: impl FnOnce(SectionBuilder) -> SectionBuilder) -> Self {
        let built = f(SectionBuilder::default());
        let idx = self.state.sections.len();
        self.state.sections.push(Section {
            classes: built.classes,
        });
        for field in built.fields {
            self.state.containers.push(field.into_container(Some(idx)));
        }
        self
    }

    /// Add a field container outside any section.
    #[must_use]
    pub fn field(mut self, field: &str, f: impl FnOnce(FieldBuilder) -> FieldBuilder) -> Self {
        let built = f(FieldBuilder::new(field));
        self.state.containers.push(built.into_container(None));
        self
    }

    #[must_use]
    pub fn build(self) -> FormState {
        self.state
    }
}

/// Builder for one section, passed to [`FormStateBuilder::section`].
#[derive(Debug, Default)]
pub struct SectionBuilder {
    classes: BTreeSet<String>,
    fields: Vec<FieldBuilder>,
}

impl SectionBuilder {
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_owned());
        self
    }

    #[must_use]
    pub fn hidden(self) -> Self {
        self.class(HIDDEN_CLASS)
    }

    #[must_use]
    pub fn field(mut self, field: &str, f: impl FnOnce(FieldBuilder) -> FieldBuilder) -> Self {
        self.fields.push(f(FieldBuilder::new(field)));
        self
    }
}

/// Builder for one field container.
#[derive(Debug)]
pub struct FieldBuilder {
    field: String,
    classes: BTreeSet<String>,
    inputs: Vec<Input>,
}

impl FieldBuilder {
    fn new(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            classes: BTreeSet::from(["form-row".to_owned()]),
            inputs: Vec::new(),
        }
    }

    fn into_container(self, section: Option<usize>) -> Container {
        Container {
            field: self.field,
            classes: self.classes,
            section,
            inputs: self.inputs,
        }
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_owned());
        self
    }

    #[must_use]
    pub fn hidden(self) -> Self {
        self.class(HIDDEN_CLASS)
    }

    #[must_use]
    pub fn input(mut self, kind: InputKind, name: &str, value: &str, checked: bool) -> Self {
        self.inputs.push(Input {
            name: name.to_owned(),
            kind,
            value: value.to_owned(),
            checked,
        });
        self
    }

    #[must_use]
    pub fn radio(self, name: &str, value: &str, checked: bool) -> Self {
        self.input(InputKind::Radio, name, value, checked)
    }

    /// A radio group with one option per value; `selected` is checked.
    #[must_use]
    pub fn radios<'a>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = &'a str>,
        selected: Option<&str>,
    ) -> Self {
        for value in values {
            self = self.radio(name, value, selected == Some(value));
        }
        self
    }

    /// The three-way "unknown / yes / no" radio group: values `""`, `"True"`
    /// and `"False"`. `None` selects nothing.
    #[must_use]
    pub fn null_boolean(self, name: &str, selected: Option<&str>) -> Self {
        self.radios(name, ["", "True", "False"], selected)
    }

    #[must_use]
    pub fn checkbox(self, name: &str, value: &str, checked: bool) -> Self {
        self.input(InputKind::Checkbox, name, value, checked)
    }

    #[must_use]
    pub fn text(self, name: &str, value: &str) -> Self {
        self.input(InputKind::Text, name, value, false)
    }

    #[must_use]
    pub fn url(self, name: &str, value: &str) -> Self {
        self.input(InputKind::Url, name, value, false)
    }

    #[must_use]
    pub fn date(self, name: &str, value: &str) -> Self {
        self.input(InputKind::Date, name, value, false)
    }

    #[must_use]
    pub fn number(self, name: &str, value: &str) -> Self {
        self.input(InputKind::Number, name, value, false)
    }

    #[must_use]
    pub fn textarea(self, name: &str, value: &str) -> Self {
        self.input(InputKind::TextArea, name, value, false)
    }
}
