use condform::{FormState, MountOptions, RuleTable};

fn main() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "condform=debug".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();

    let dsl = r#"
# Entrée
rule entree_porte_presence in ["True"] (indent 1):
    entree_porte_manoeuvre,
    entree_vitree

rule entree_vitree in ["True"] (indent 2):
    entree_vitree_vitrophanie

# Publication
rule user_type in ["gestionnaire", "admin"] (indent 1):
    registre_url
"#;

    let table = match RuleTable::from_dsl(dsl) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    println!("Parsed {table}:\n");
    println!("{}", table.to_dsl());

    let form = FormState::builder()
        .field("entree_porte_presence", |f| {
            f.null_boolean("entree_porte_presence", Some("True"))
        })
        .field("entree_porte_manoeuvre", |f| {
            f.radios("entree_porte_manoeuvre", ["battante", "coulissante"], None)
        })
        .field("entree_vitree", |f| f.null_boolean("entree_vitree", Some("True")))
        .field("entree_vitree_vitrophanie", |f| {
            f.null_boolean("entree_vitree_vitrophanie", Some("False"))
        })
        .build();

    let mut mounted = table.mount(form, MountOptions::new());
    for rule in mounted.skipped() {
        println!("skipped: rule #{} on '{}'", rule.index(), rule.source());
    }

    mounted.choose("entree_porte_presence", "False");
    let form = mounted.surface();
    println!(
        "vitrophanie hidden: {:?}, answer: {:?}",
        form.is_hidden("entree_vitree_vitrophanie"),
        form.checked_value("entree_vitree_vitrophanie"),
    );
}
