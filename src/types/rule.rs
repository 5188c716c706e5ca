use std::fmt;

use super::condition::Condition;
use super::field_name::FieldName;

/// A dependency rule as authored: source field, the value test, and the
/// fields it shows or hides.
///
/// Rules are created via [`RuleTableBuilder`](super::RuleTableBuilder) or by
/// parsing rule DSL text with [`RuleTable::from_dsl()`](super::RuleTable::from_dsl).
/// At most one of `values` and `min_value` may be set; a rule with neither
/// always hides its targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    pub source: String,
    pub values: Option<Vec<String>>,
    pub min_value: Option<i64>,
    pub targets: Vec<String>,
    pub indent: u8,
}

/// A validated rule stored inside a compiled [`RuleTable`](super::RuleTable).
///
/// The `index` is the rule's position in the table, which is also the order of
/// the initial evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    pub(crate) source: FieldName,
    pub(crate) condition: Condition,
    pub(crate) targets: Vec<FieldName>,
    pub(crate) indent: u8,
    pub(crate) index: usize,
}

impl CompiledRule {
    #[must_use]
    pub fn source(&self) -> &FieldName {
        &self.source
    }

    #[must_use]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    #[must_use]
    pub fn targets(&self) -> &[FieldName] {
        &self.targets
    }

    /// Nesting depth used for the `indented<N>` class. Zero means no class.
    #[must_use]
    pub fn indent(&self) -> u8 {
        self.indent
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether this rule's targets should be visible for the given source value.
    #[must_use]
    pub fn shows(&self, value: Option<&str>) -> bool {
        self.condition.matches(value)
    }

    pub(crate) fn to_rule(&self) -> Rule {
        let (values, min_value) = match &self.condition {
            Condition::OneOf(values) => (Some(values.clone()), None),
            Condition::AtLeast(min) => (None, Some(*min)),
            Condition::Never => (None, None),
        };
        Rule {
            source: self.source.to_string(),
            values,
            min_value,
            targets: self.targets.iter().map(ToString::to_string).collect(),
            indent: self.indent,
        }
    }
}

/// Renders the rule in DSL syntax, so a table's rules can be written back out
/// and parsed again.
impl fmt::Display for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {}", self.source)?;
        if self.condition != Condition::Never {
            write!(f, " {}", self.condition)?;
        }
        if self.indent > 0 {
            write!(f, " (indent {})", self.indent)?;
        }
        write!(f, ":")?;
        for (i, target) in self.targets.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "\n    {target}")?;
        }
        Ok(())
    }
}
