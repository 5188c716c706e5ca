use condform::builtin::accessibility_rules;
use condform::{FormState, MountOptions};

/// One form of a formset, with every input name carrying the form's prefix.
fn formset_form(prefix: &str, answer: &str) -> FormState {
    let name = |field: &str| format!("{prefix}{field}");
    FormState::builder()
        .field("sanitaires_presence", |f| {
            f.null_boolean(&name("sanitaires_presence"), Some(answer))
        })
        .field("sanitaires_adaptes", |f| {
            f.hidden().null_boolean(&name("sanitaires_adaptes"), None)
        })
        .build()
}

fn main() {
    let table = accessibility_rules().expect("shipped rules compile");

    for (i, answer) in ["True", "False"].into_iter().enumerate() {
        let prefix = format!("accessibilite-{i}-");
        let options = MountOptions::new().with_input_prefix(prefix.clone());
        let mounted = table.mount(formset_form(&prefix, answer), options);

        println!(
            "{prefix}: {} listener(s), sanitaires_adaptes hidden = {:?}",
            mounted.listener_count(),
            mounted.surface().is_hidden("sanitaires_adaptes"),
        );
    }
}
