use condform::{FormState, MountOptions, RuleTableBuilder};

fn main() {
    // Define rules
    let table = RuleTableBuilder::new()
        .rule("stationnement_presence", |r| {
            r.values(["True"]).target("stationnement_pmr").indent(1)
        })
        .rule("accueil_chambre_nombre_accessibles", |r| {
            r.min_value(1)
                .targets(["accueil_chambre_douche_plain_pied", "accueil_chambre_douche_siege"])
                .indent(1)
        })
        .compile()
        .expect("failed to compile rule table");

    println!("{table}");

    // Describe the form as the server rendered it
    let form = FormState::builder()
        .field("stationnement_presence", |f| {
            f.null_boolean("stationnement_presence", None)
        })
        .field("stationnement_pmr", |f| {
            f.hidden().null_boolean("stationnement_pmr", None)
        })
        .field("accueil_chambre_nombre_accessibles", |f| {
            f.number("accueil_chambre_nombre_accessibles", "0")
        })
        .section(|s| {
            s.field("accueil_chambre_douche_plain_pied", |f| {
                f.null_boolean("accueil_chambre_douche_plain_pied", None)
            })
            .field("accueil_chambre_douche_siege", |f| {
                f.null_boolean("accueil_chambre_douche_siege", None)
            })
        })
        .build();

    let mut mounted = table.mount(form, MountOptions::new());
    print_visibility(mounted.surface());

    println!("\n> stationnement_presence = True, 2 chambres accessibles");
    mounted.choose("stationnement_presence", "True");
    mounted.fill("accueil_chambre_nombre_accessibles", "2");
    print_visibility(mounted.surface());
}

fn print_visibility(form: &FormState) {
    for field in form.fields() {
        let classes = form.classes(field).unwrap_or_default().join(" ");
        println!("  {field:<40} [{classes}]");
    }
}
