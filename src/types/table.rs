use std::collections::HashMap;
use std::fmt;

use super::error::CompileError;
use super::field_name::FieldName;
use super::options::MountOptions;
use super::rule::{CompiledRule, Rule};
use super::surface::FormSurface;
use crate::mount::MountedForm;

/// Builder for constructing a [`RuleTable`].
///
/// Rules are defined via closures and compiled into an immutable, thread-safe
/// table. Rule order is kept: it is the order of the initial evaluation pass.
///
/// # Example
///
/// ```
/// use condform::RuleTableBuilder;
///
/// let table = RuleTableBuilder::new()
///     .rule("stationnement_presence", |r| {
///         r.values(["True"]).targets(["stationnement_pmr"]).indent(1)
///     })
///     .rule("accueil_chambre_nombre_accessibles", |r| {
///         r.min_value(1).targets(["accueil_chambre_douche_siege"]).indent(1)
///     })
///     .compile()
///     .unwrap();
///
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    rules: Vec<Rule>,
}

/// Intermediate builder passed to the rule definition closure.
#[derive(Debug)]
pub struct RuleBuilder {
    rule: Rule,
}

impl RuleTableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a rule driven by the field `source`.
    #[must_use]
    pub fn rule(mut self, source: &str, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        let builder = f(RuleBuilder {
            rule: Rule {
                source: source.to_owned(),
                ..Rule::default()
            },
        });
        self.rules.push(builder.rule);
        self
    }

    /// Append an already-authored rule.
    #[must_use]
    pub fn push(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Compile the rules into an immutable `RuleTable`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if a field name is invalid, a rule has no
    /// targets or two conditions, or the rules depend on each other in a cycle.
    pub fn compile(self) -> Result<RuleTable, CompileError> {
        crate::compile::compile(&self.rules)
    }
}

impl RuleBuilder {
    /// Show the targets when the source value is one of `values`.
    #[must_use]
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.rule.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Show the targets when the source value is a number `>= min`.
    #[must_use]
    pub fn min_value(mut self, min: i64) -> Self {
        self.rule.min_value = Some(min);
        self
    }

    /// Append target fields.
    #[must_use]
    pub fn targets<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.rule.targets.extend(targets.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn target(mut self, target: &str) -> Self {
        self.rule.targets.push(target.to_owned());
        self
    }

    #[must_use]
    pub fn indent(mut self, indent: u8) -> Self {
        self.rule.indent = indent;
        self
    }
}

/// A compiled, immutable rule table. Thread-safe and designed to live behind
/// `Arc`; each form mounts it independently.
#[derive(Debug, Clone)]
pub struct RuleTable {
    pub(crate) rules: Vec<CompiledRule>,
    /// Rule indices per source field, in table order.
    pub(crate) by_source: HashMap<FieldName, Vec<usize>>,
}

impl RuleTable {
    /// Mount the table on a form: evaluate every rule once and return a
    /// handle that re-evaluates on each change of a source field.
    ///
    /// Rules whose source has no inputs in `surface` are skipped and get no
    /// listener. Mounting never fails.
    pub fn mount<S: FormSurface>(&self, surface: S, options: MountOptions) -> MountedForm<'_, S> {
        crate::mount::mount(self, surface, options)
    }

    /// Parse rule DSL text and compile it into a `RuleTable`.
    ///
    /// # Errors
    ///
    /// Returns [`CondformError`](crate::CondformError) on parse or compile failure.
    pub fn from_dsl(input: &str) -> Result<Self, crate::CondformError> {
        let parsed = crate::parse::parse(input)?;
        let table = crate::compile::compile(&parsed.rules)?;
        Ok(table)
    }

    /// Read a rule DSL file and compile it into a `RuleTable`.
    ///
    /// # Errors
    ///
    /// Returns [`CondformError`](crate::CondformError) on I/O, parse, or compile failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::CondformError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_dsl(&input)
    }

    /// Render the table as rule DSL text that [`from_dsl`](Self::from_dsl)
    /// parses back into an equivalent table.
    #[must_use]
    pub fn to_dsl(&self) -> String {
        let mut out = String::new();
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            out.push_str(&rule.to_string());
        }
        out.push('\n');
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules in table order.
    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// The rules driven by `source`, in table order.
    pub fn rules_for<'a>(&'a self, source: &str) -> impl Iterator<Item = &'a CompiledRule> + 'a {
        self.by_source
            .get(source)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.rules[idx])
    }

    /// The first rule driven by `field`, which is the one re-evaluated when a
    /// parent rule changes `field`'s visibility.
    #[must_use]
    pub fn child_rule(&self, field: &str) -> Option<&CompiledRule> {
        self.by_source
            .get(field)
            .and_then(|indices| indices.first())
            .map(|&idx| &self.rules[idx])
    }

    /// Whether any rule is driven by `field`.
    #[must_use]
    pub fn is_source(&self, field: &str) -> bool {
        self.by_source.contains_key(field)
    }

    /// Distinct source fields in table order.
    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for rule in &self.rules {
            let source = rule.source.as_str();
            if !seen.contains(&source) {
                seen.push(source);
            }
        }
        seen
    }

    /// Targets of `source`'s rules that are themselves sources: the fields
    /// whose rules are re-evaluated when `source` changes.
    ///
    /// Returns `None` if no rule is driven by `source`.
    #[must_use]
    pub fn dependents_of(&self, source: &str) -> Option<Vec<&str>> {
        let indices = self.by_source.get(source)?;
        let mut out = Vec::new();
        for &idx in indices {
            for target in &self.rules[idx].targets {
                if self.is_source(target.as_str()) && !out.contains(&target.as_str()) {
                    out.push(target.as_str());
                }
            }
        }
        Some(out)
    }
}

#[cfg(feature = "binary-cache")]
impl RuleTable {
    /// Serialize this compiled table to a byte vector.
    ///
    /// The optional `source_text` is hashed (BLAKE3) and embedded in the
    /// payload metadata so callers can detect a stale cache.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding fails.
    pub fn to_bytes(
        &self,
        source_text: Option<&str>,
    ) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self, source_text)
    }

    /// Deserialize a table previously produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes)
    }

    /// Serialize this table and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) on
    /// encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), crate::serial::SerializeError> {
        let bytes = self.to_bytes(source_text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a file and deserialize the table it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// I/O, format, integrity, or validation failure.
    pub fn from_binary_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl PartialEq for RuleTable {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl fmt::Display for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleTable({} rules, {} sources)",
            self.rules.len(),
            self.by_source.len(),
        )
    }
}
