//! Text format for rule tables.
//!
//! ```text
//! # Stationnement
//! rule stationnement_presence in ["True"] (indent 1):
//!     stationnement_pmr
//!
//! rule accueil_chambre_nombre_accessibles >= 1 (indent 1):
//!     accueil_chambre_douche_plain_pied,
//!     accueil_chambre_douche_siege
//! ```
//!
//! A rule without `in [...]` or `>= n` always hides its targets. A rule
//! without `(indent n)` has indent 0.

mod error;
mod grammar;
mod parser;

pub use error::ParseError;
pub use parser::ParsedRuleTable;

/// Parse rule DSL text into a [`ParsedRuleTable`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid DSL syntax.
pub fn parse(input: &str) -> Result<ParsedRuleTable, ParseError> {
    use winnow::Parser;
    grammar::parse_rule_table
        .parse(input)
        .map_err(|e| ParseError::at_offset(input, e.offset(), e.inner().to_string()))
}
