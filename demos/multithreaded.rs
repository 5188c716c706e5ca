use std::sync::Arc;
use std::thread;

use condform::builtin::accessibility_rules;
use condform::{FormState, MountOptions};

fn main() {
    let table = Arc::new(accessibility_rules().expect("failed to compile rule table"));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                // Each request renders and mounts its own form
                let form = FormState::builder()
                    .field("accueil_chambre_nombre_accessibles", |f| {
                        f.number("accueil_chambre_nombre_accessibles", &i.to_string())
                    })
                    .field("accueil_chambre_douche_siege", |f| {
                        f.null_boolean("accueil_chambre_douche_siege", Some("True"))
                    })
                    .build();

                let mounted = table.mount(form, MountOptions::new());
                let hidden = mounted.surface().is_hidden("accueil_chambre_douche_siege");
                println!("Thread {i}: douche_siege hidden = {hidden:?}");
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
