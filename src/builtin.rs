//! The accessibility questionnaire rules shipped with the crate.
//!
//! Each rule reveals follow-up questions once an earlier answer makes them
//! relevant, e.g. the parking details only after "is there parking" is
//! answered "True".

use crate::{CompileError, RuleTable, RuleTableBuilder};

/// Indent level of a first-order follow-up question.
pub const INDENT_FIRST: u8 = 1;
/// Indent level of a follow-up to a follow-up.
pub const INDENT_SECOND: u8 = 2;

/// Build the accessibility questionnaire rule table.
///
/// # Errors
///
/// Never fails for the shipped rules; the `Result` surfaces
/// [`CompileError`] the same way a user-authored table would.
pub fn accessibility_rules() -> Result<RuleTable, CompileError> {
    RuleTableBuilder::new()
        // Transport
        .rule("transport_station_presence", |r| {
            r.values(["True"]).target("transport_information")
        })
        // Stationnement
        .rule("stationnement_presence", |r| {
            r.values(["True"])
                .target("stationnement_pmr")
                .indent(INDENT_FIRST)
        })
        .rule("stationnement_ext_presence", |r| {
            r.values(["True"])
                .target("stationnement_ext_pmr")
                .indent(INDENT_FIRST)
        })
        // Extérieur et cheminement
        .rule("cheminement_ext_presence", |r| {
            r.values(["True"])
                .targets([
                    "cheminement_ext_terrain_stable",
                    "cheminement_ext_plain_pied",
                    "cheminement_ext_nombre_marches",
                    "cheminement_ext_reperage_marches",
                    "cheminement_ext_main_courante",
                    "cheminement_ext_rampe",
                    "cheminement_ext_ascenseur",
                    "cheminement_ext_pente_presence",
                    "cheminement_ext_devers",
                    "cheminement_ext_bande_guidage",
                    "cheminement_ext_retrecissement",
                ])
                .indent(INDENT_FIRST)
        })
        .rule("cheminement_ext_plain_pied", |r| {
            r.values(["False"])
                .targets([
                    "cheminement_ext_nombre_marches",
                    "cheminement_ext_sens_marches",
                    "cheminement_ext_reperage_marches",
                    "cheminement_ext_main_courante",
                    "cheminement_ext_rampe",
                    "cheminement_ext_ascenseur",
                ])
                .indent(INDENT_SECOND)
        })
        .rule("cheminement_ext_pente_presence", |r| {
            r.values(["True"])
                .targets([
                    "cheminement_ext_pente_degre_difficulte",
                    "cheminement_ext_pente_longueur",
                ])
                .indent(INDENT_SECOND)
        })
        // Entrée
        .rule("entree_porte_presence", |r| {
            r.values(["True"])
                .targets(["entree_porte_manoeuvre", "entree_porte_type", "entree_vitree"])
                .indent(INDENT_FIRST)
        })
        .rule("entree_vitree", |r| {
            r.values(["True"])
                .target("entree_vitree_vitrophanie")
                .indent(INDENT_SECOND)
        })
        .rule("entree_dispositif_appel", |r| {
            r.values(["True"])
                .target("entree_dispositif_appel_type")
                .indent(INDENT_FIRST)
        })
        .rule("entree_plain_pied", |r| {
            r.values(["False"])
                .targets([
                    "entree_marches",
                    "entree_marches_sens",
                    "entree_marches_reperage",
                    "entree_marches_main_courante",
                    "entree_marches_rampe",
                    "entree_ascenseur",
                ])
                .indent(INDENT_FIRST)
        })
        .rule("entree_pmr", |r| {
            r.values(["True"])
                .target("entree_pmr_informations")
                .indent(INDENT_FIRST)
        })
        // Accueil
        .rule("accueil_audiodescription_presence", |r| {
            r.values(["True"])
                .target("accueil_audiodescription")
                .indent(INDENT_FIRST)
        })
        .rule("accueil_equipements_malentendants_presence", |r| {
            r.values(["True"])
                .target("accueil_equipements_malentendants")
                .indent(INDENT_FIRST)
        })
        .rule("accueil_cheminement_plain_pied", |r| {
            r.values(["False"])
                .targets([
                    "accueil_cheminement_nombre_marches",
                    "accueil_cheminement_sens_marches",
                    "accueil_cheminement_reperage_marches",
                    "accueil_cheminement_main_courante",
                    "accueil_cheminement_rampe",
                    "accueil_cheminement_ascenseur",
                ])
                .indent(INDENT_FIRST)
        })
        .rule("accueil_ascenceur_etage", |r| {
            r.values(["True"])
                .target("accueil_ascenceur_accessibilite")
                .indent(INDENT_FIRST)
        })
        // Sanitaires
        .rule("sanitaires_presence", |r| {
            r.values(["True"])
                .target("sanitaires_adaptes")
                .indent(INDENT_FIRST)
        })
        // Chambres accessibles
        .rule("accueil_chambre_nombre_accessibles", |r| {
            r.min_value(1)
                .targets([
                    "accueil_chambre_douche_plain_pied",
                    "accueil_chambre_douche_siege",
                    "accueil_chambre_douche_barre_appui",
                    "accueil_chambre_sanitaires_barre_appui",
                    "accueil_chambre_sanitaires_espace_usage",
                ])
                .indent(INDENT_FIRST)
        })
        // Publication: registre for managers, conformité for administrations
        .rule("user_type", |r| {
            r.values(["gestionnaire", "admin"])
                .target("registre_url")
                .indent(INDENT_FIRST)
        })
        .rule("user_type", |r| {
            r.values(["admin"])
                .target("conformite")
                .indent(INDENT_FIRST)
        })
        .compile()
}
