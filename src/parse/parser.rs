use crate::Rule;

/// The result of parsing rule DSL text.
#[derive(Debug)]
pub struct ParsedRuleTable {
    pub rules: Vec<Rule>,
}
