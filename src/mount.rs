use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, trace};

use crate::{CompiledRule, FieldChange, FormSurface, MountOptions, Propagation, RuleTable, read_value};

/// A rule table mounted on one form.
///
/// Created by [`RuleTable::mount()`]. Holds the form surface and one listener
/// per rule whose source was present at mount time. User input goes through
/// [`choose()`](Self::choose), [`fill()`](Self::fill), or
/// [`dispatch_change()`](Self::dispatch_change); each change runs the
/// listening rules synchronously.
///
/// Mounting takes the surface by value, so a form cannot be mounted twice.
/// Pass `&mut form` to keep ownership outside the handle.
#[derive(Debug)]
pub struct MountedForm<'t, S> {
    table: &'t RuleTable,
    surface: S,
    options: MountOptions,
    /// Rule indices per input name, in attach order.
    listeners: HashMap<String, Vec<usize>>,
    skipped: Vec<usize>,
}

pub(crate) fn mount<S: FormSurface>(
    table: &RuleTable,
    surface: S,
    options: MountOptions,
) -> MountedForm<'_, S> {
    let mut form = MountedForm {
        table,
        surface,
        options,
        listeners: HashMap::new(),
        skipped: Vec::new(),
    };

    for rule in &table.rules {
        let name = form.options.input_name(rule.source.as_str());
        if form.surface.inputs(&name).is_empty() {
            debug!("skipping rule #{}: no input named '{}'", rule.index, name);
            form.skipped.push(rule.index);
            continue;
        }
        trace!("listening on '{}' for rule #{}", name, rule.index);
        form.listeners.entry(name.clone()).or_default().push(rule.index);
        let value = read_value(&form.surface, &name);
        form.apply(rule, value.as_deref());
    }

    debug!(
        "mounted {} of {} rules ({} skipped)",
        table.rules.len() - form.skipped.len(),
        table.rules.len(),
        form.skipped.len()
    );
    form
}

impl<'t, S: FormSurface> MountedForm<'t, S> {
    /// Select the radio `name=value` as a user would. Fires a change event
    /// if the selection moved.
    pub fn choose(&mut self, name: &str, value: &str) {
        if self.surface.check(name, value) {
            self.dispatch_change(name, value);
        }
    }

    /// Type `value` into the input `name` as a user would. Fires a change
    /// event if the value differs from the current one.
    pub fn fill(&mut self, name: &str, value: &str) {
        if self.surface.set_value(name, value) {
            self.dispatch_change(name, value);
        }
    }

    /// Deliver a change event for the input group `name` carrying `value`.
    ///
    /// Every rule listening on `name` is applied with `value`, then its
    /// dependent rules are re-evaluated from the form's current values.
    /// Events on names nobody listens to are ignored.
    pub fn dispatch_change(&mut self, name: &str, value: &str) {
        let Some(indices) = self.listeners.get(name).cloned() else {
            trace!("change on '{}' has no listener", name);
            return;
        };
        let table = self.table;
        for idx in indices {
            let rule = &table.rules[idx];
            self.apply(rule, Some(value));
            self.propagate(rule);
        }
    }

    /// Re-run the mount-time pass over the listening rules, in table order,
    /// from current values. Attaches nothing.
    pub fn refresh(&mut self) {
        let table = self.table;
        for rule in &table.rules {
            if !self.skipped.contains(&rule.index) {
                self.reevaluate(rule);
            }
        }
    }

    fn propagate(&mut self, rule: &CompiledRule) {
        let table = self.table;
        match self.options.propagation() {
            Propagation::Shallow => {
                for target in &rule.targets {
                    if let Some(child) = table.child_rule(target.as_str()) {
                        self.reevaluate(child);
                    }
                }
            }
            Propagation::Transitive => {
                let mut visited = HashSet::from([rule.index]);
                let mut queue = VecDeque::from([rule]);
                while let Some(parent) = queue.pop_front() {
                    for target in &parent.targets {
                        if let Some(child) = table.child_rule(target.as_str()) {
                            if visited.insert(child.index) {
                                self.reevaluate(child);
                                queue.push_back(child);
                            }
                        }
                    }
                }
            }
        }
    }

    fn reevaluate(&mut self, rule: &CompiledRule) {
        let name = self.options.input_name(rule.source.as_str());
        let value = read_value(&self.surface, &name);
        self.apply(rule, value.as_deref());
    }

    fn apply(&mut self, rule: &CompiledRule, value: Option<&str>) {
        let show = rule.shows(value);
        for target in &rule.targets {
            // Reset clicks fire their change events before the next target.
            for change in apply_target(&mut self.surface, rule, target.as_str(), show) {
                self.dispatch_change(&change.name, &change.value);
            }
        }
    }
}

impl<'t, S> MountedForm<'t, S> {
    #[must_use]
    pub fn table(&self) -> &'t RuleTable {
        self.table
    }

    #[must_use]
    pub fn options(&self) -> &MountOptions {
        &self.options
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Release the form.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Number of attached listeners. Two rules on the same source count twice.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Whether any rule listens on the input group `name`.
    #[must_use]
    pub fn is_listening(&self, name: &str) -> bool {
        self.listeners.contains_key(name)
    }

    /// Rules skipped at mount time because their source had no inputs.
    pub fn skipped(&self) -> impl Iterator<Item = &'t CompiledRule> + '_ {
        let table = self.table;
        self.skipped.iter().map(move |&idx| &table.rules[idx])
    }
}

/// Apply `rule` to its targets for the source value `value`: show every
/// present target container, or hide and reset it.
///
/// Targets without a container are skipped. Returns the change events raised
/// by resets, in order; the caller decides whether to dispatch them.
pub fn process_targets<S: FormSurface + ?Sized>(
    surface: &mut S,
    rule: &CompiledRule,
    value: Option<&str>,
) -> Vec<FieldChange> {
    let show = rule.shows(value);
    let mut changes = Vec::new();
    for target in &rule.targets {
        changes.extend(apply_target(surface, rule, target.as_str(), show));
    }
    changes
}

fn apply_target<S: FormSurface + ?Sized>(
    surface: &mut S,
    rule: &CompiledRule,
    field: &str,
    show: bool,
) -> Vec<FieldChange> {
    if !surface.has_field(field) {
        trace!("rule #{}: no container for '{}'", rule.index, field);
        return Vec::new();
    }
    if show {
        trace!("rule #{}: show '{}'", rule.index, field);
        surface.show_field(field, rule.indent);
        Vec::new()
    } else {
        trace!("rule #{}: hide '{}'", rule.index, field);
        surface.hide_field(field);
        surface.clear_field(field)
    }
}

#[cfg(test)]
mod tests {
    use crate::{FormState, MountOptions, Propagation, RuleTable, RuleTableBuilder, process_targets};

    fn stationnement() -> RuleTable {
        RuleTableBuilder::new()
            .rule("stationnement_presence", |r| {
                r.values(["True"]).target("stationnement_pmr").indent(1)
            })
            .compile()
            .unwrap()
    }

    fn stationnement_form(selected: Option<&str>) -> FormState {
        FormState::builder()
            .field("stationnement_presence", |f| {
                f.null_boolean("stationnement_presence", selected)
            })
            .field("stationnement_pmr", |f| {
                f.hidden()
                    .null_boolean("stationnement_pmr", None)
                    .text("stationnement_pmr_details", "")
            })
            .build()
    }

    /// presence -> plain_pied -> nombre_marches -> reperage
    fn three_levels() -> RuleTable {
        RuleTableBuilder::new()
            .rule("presence", |r| r.values(["True"]).target("plain_pied").indent(1))
            .rule("plain_pied", |r| r.values(["False"]).target("nombre_marches").indent(2))
            .rule("nombre_marches", |r| r.min_value(1).target("reperage").indent(3))
            .compile()
            .unwrap()
    }

    fn three_levels_form() -> FormState {
        FormState::builder()
            .field("presence", |f| f.null_boolean("presence", Some("True")))
            .field("plain_pied", |f| f.null_boolean("plain_pied", Some("False")))
            .field("nombre_marches", |f| f.number("nombre_marches", "3"))
            .field("reperage", |f| f.null_boolean("reperage", Some("True")))
            .build()
    }

    #[test]
    fn initial_pass_hides_when_unset() {
        let table = stationnement();
        let mounted = table.mount(stationnement_form(None), MountOptions::new());
        assert_eq!(mounted.surface().is_hidden("stationnement_pmr"), Some(true));
        assert_eq!(mounted.listener_count(), 1);
    }

    #[test]
    fn initial_pass_shows_when_set() {
        let table = stationnement();
        let mounted = table.mount(stationnement_form(Some("True")), MountOptions::new());
        let form = mounted.surface();
        assert_eq!(form.is_hidden("stationnement_pmr"), Some(false));
        assert_eq!(form.has_class("stationnement_pmr", "indented1"), Some(true));
    }

    #[test]
    fn choose_toggles_visibility() {
        let table = stationnement();
        let mut mounted = table.mount(stationnement_form(None), MountOptions::new());

        mounted.choose("stationnement_presence", "True");
        assert_eq!(mounted.surface().is_hidden("stationnement_pmr"), Some(false));

        mounted.fill("stationnement_pmr_details", "2 places");
        mounted.choose("stationnement_pmr", "True");

        mounted.choose("stationnement_presence", "False");
        let form = mounted.surface();
        assert_eq!(form.is_hidden("stationnement_pmr"), Some(true));
        assert_eq!(form.value_of("stationnement_pmr_details"), Some(""));
        assert_eq!(form.checked_value("stationnement_pmr"), Some(""));
    }

    #[test]
    fn choosing_same_value_fires_nothing() {
        let table = stationnement();
        let mut form = stationnement_form(Some("True"));
        let mut mounted = table.mount(&mut form, MountOptions::new());
        mounted.fill("stationnement_pmr_details", "kept");
        mounted.choose("stationnement_presence", "True");
        drop(mounted);
        assert_eq!(form.value_of("stationnement_pmr_details"), Some("kept"));
    }

    #[test]
    fn missing_source_is_skipped() {
        let table = RuleTableBuilder::new()
            .rule("absent", |r| r.values(["True"]).target("stationnement_pmr"))
            .rule("stationnement_presence", |r| {
                r.values(["True"]).target("stationnement_pmr").indent(1)
            })
            .compile()
            .unwrap();
        let mounted = table.mount(stationnement_form(Some("True")), MountOptions::new());

        assert!(!mounted.is_listening("absent"));
        assert_eq!(mounted.listener_count(), 1);
        let skipped: Vec<usize> = mounted.skipped().map(|r| r.index()).collect();
        assert_eq!(skipped, [0]);
        assert_eq!(mounted.surface().is_hidden("stationnement_pmr"), Some(false));
    }

    #[test]
    fn unknown_change_is_ignored() {
        let table = stationnement();
        let mut mounted = table.mount(stationnement_form(Some("True")), MountOptions::new());
        mounted.dispatch_change("nobody", "True");
        assert_eq!(mounted.surface().is_hidden("stationnement_pmr"), Some(false));
    }

    #[test]
    fn dispatch_uses_event_value() {
        let table = stationnement();
        let mut mounted = table.mount(stationnement_form(Some("True")), MountOptions::new());
        // The event value wins over the form's checked radio.
        mounted.dispatch_change("stationnement_presence", "False");
        assert_eq!(mounted.surface().is_hidden("stationnement_pmr"), Some(true));
    }

    #[test]
    fn shallow_propagation_reads_live_child_value() {
        let table = three_levels();
        let mut mounted = table.mount(three_levels_form(), MountOptions::new());
        assert_eq!(mounted.surface().is_hidden("nombre_marches"), Some(false));
        assert_eq!(mounted.surface().is_hidden("reperage"), Some(false));

        // Hiding plain_pied resets it to "", which fires its own change and
        // hides nombre_marches, whose reset empties the number and whose
        // change hides reperage.
        mounted.choose("presence", "False");
        let form = mounted.surface();
        assert_eq!(form.is_hidden("plain_pied"), Some(true));
        assert_eq!(form.is_hidden("nombre_marches"), Some(true));
        assert_eq!(form.value_of("nombre_marches"), Some(""));
        assert_eq!(form.is_hidden("reperage"), Some(true));
    }

    /// plain_pied has no empty choice, so hiding it keeps "False" and the
    /// number keeps its value.
    fn stale_grandchild_form() -> FormState {
        FormState::builder()
            .field("presence", |f| f.null_boolean("presence", Some("False")))
            .field("plain_pied", |f| f.radios("plain_pied", ["True", "False"], Some("False")))
            .field("nombre_marches", |f| f.number("nombre_marches", "3"))
            .field("reperage", |f| f.null_boolean("reperage", None))
            .build()
    }

    #[test]
    fn shallow_propagation_stops_at_one_level() {
        let table = three_levels();
        let mut mounted = table.mount(stale_grandchild_form(), MountOptions::new());
        assert_eq!(mounted.surface().is_hidden("reperage"), Some(false));

        // An event value that disagrees with the form hides reperage.
        mounted.dispatch_change("nombre_marches", "0");
        assert_eq!(mounted.surface().is_hidden("reperage"), Some(true));

        // presence re-evaluates plain_pied's rule but not the grandchild rule
        // on nombre_marches, so reperage stays hidden despite the live "3".
        mounted.choose("presence", "True");
        let form = mounted.surface();
        assert_eq!(form.is_hidden("plain_pied"), Some(false));
        assert_eq!(form.is_hidden("nombre_marches"), Some(false));
        assert_eq!(form.is_hidden("reperage"), Some(true));
    }

    #[test]
    fn transitive_propagation_reaches_grandchildren() {
        let table = three_levels();
        let mut form = stale_grandchild_form();
        let opts = MountOptions::new().with_propagation(Propagation::Transitive);
        let mut mounted = table.mount(&mut form, opts);
        mounted.dispatch_change("nombre_marches", "0");
        mounted.choose("presence", "True");
        drop(mounted);
        assert_eq!(form.is_hidden("plain_pied"), Some(false));
        assert_eq!(form.is_hidden("nombre_marches"), Some(false));
        assert_eq!(form.is_hidden("reperage"), Some(false));
        assert_eq!(form.has_class("reperage", "indented3"), Some(true));
    }

    #[test]
    fn refresh_matches_initial_pass() {
        let table = three_levels();
        let mut mounted = table.mount(three_levels_form(), MountOptions::new());
        let before: Vec<Option<bool>> = ["plain_pied", "nombre_marches", "reperage"]
            .iter()
            .map(|f| mounted.surface().is_hidden(f))
            .collect();
        mounted.refresh();
        let after: Vec<Option<bool>> = ["plain_pied", "nombre_marches", "reperage"]
            .iter()
            .map(|f| mounted.surface().is_hidden(f))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn process_targets_collects_reset_changes() {
        let table = stationnement();
        let mut form = FormState::builder()
            .field("stationnement_pmr", |f| f.null_boolean("stationnement_pmr", Some("True")))
            .build();
        let changes = process_targets(&mut form, &table.rules()[0], Some("False"));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].name, "stationnement_pmr");
        assert_eq!(changes[0].value, "");
        assert_eq!(form.is_hidden("stationnement_pmr"), Some(true));
    }

    #[test]
    fn process_targets_skips_missing_containers() {
        let table = RuleTableBuilder::new()
            .rule("a", |r| r.values(["True"]).targets(["missing", "present"]).indent(1))
            .compile()
            .unwrap();
        let mut form = FormState::builder()
            .field("present", |f| f.hidden().text("present", ""))
            .build();
        let changes = process_targets(&mut form, &table.rules()[0], Some("True"));
        assert!(changes.is_empty());
        assert_eq!(form.is_hidden("present"), Some(false));
    }
}
